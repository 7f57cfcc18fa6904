use opal_scene::geometry::cube;
use opal_scene::loader::{load_scene, DetectedFormat};
use opal_scene::{FormatError, Importer, Model3D, Scene, SceneError, Texture, DEFAULT_OUTPUT};

fn demo_scene() -> Scene {
    let mut scene = Scene::new("demo");
    scene
        .add_texture("brick", Texture::from_raw(4, 4, vec![0xAB; 64]).unwrap())
        .unwrap();
    scene
        .add_model("cube", Model3D::new(vec![cube(1.0).with_material(0, "brick")]))
        .unwrap();
    scene
}

#[test]
fn save_and_load_pack_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(DEFAULT_OUTPUT);

    let scene = demo_scene();
    scene.save_to_file(&path).unwrap();
    let loaded = Scene::load_from_file(&path).unwrap();

    assert_eq!(loaded.name(), "demo");
    assert_eq!(loaded.model("cube"), scene.model("cube"));
    assert_eq!(loaded.texture("brick"), scene.texture("brick"));
    assert_eq!(std::fs::read(&path).unwrap(), scene.to_bytes().unwrap());
}

#[test]
fn save_replaces_existing_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("scene.opl");
    std::fs::write(&path, vec![0xFF; 4096]).unwrap();

    Scene::new("small").save_to_file(&path).unwrap();

    let loaded = Scene::load_from_file(&path).unwrap();
    assert_eq!(loaded.name(), "small");
    assert!(loaded.is_empty());
}

#[test]
fn failed_save_keeps_existing_pack() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("level.opl");
    demo_scene().save_to_file(&path).unwrap();
    let good = std::fs::read(&path).unwrap();

    let result = Scene::new("bad\0name").save_to_file(&path);

    assert!(matches!(result, Err(FormatError::EmbeddedNul(_))));
    assert_eq!(std::fs::read(&path).unwrap(), good);
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    assert!(Scene::load_from_file(&path).unwrap().contains_model("cube"));
}

#[test]
fn load_scene_detects_pack_without_extension() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("compiled");
    demo_scene().save_to_file(&path).unwrap();

    let loaded = load_scene(&path, &Importer::default()).unwrap();

    assert_eq!(loaded.format, DetectedFormat::Pack);
    assert_eq!(loaded.scene.model_count(), 1);
    assert_eq!(loaded.scene.texture_count(), 1);
}

#[test]
fn load_truncated_pack_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.opl");
    let bytes = demo_scene().to_bytes().unwrap();
    std::fs::write(&path, &bytes[..bytes.len() - 1]).unwrap();

    let result = Scene::load_from_file(&path);

    assert!(matches!(
        result,
        Err(SceneError::MalformedPack(FormatError::Truncated("texture pixels")))
    ));
}

#[test]
fn edit_and_recompile() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("level.opl");
    demo_scene().save_to_file(&path).unwrap();

    let mut scene = Scene::load_from_file(&path).unwrap();
    scene.remove_model("cube").unwrap();
    scene.add_model("big", Model3D::new(vec![cube(4.0)])).unwrap();
    scene.save_to_file(&path).unwrap();

    let reloaded = Scene::load_from_file(&path).unwrap();
    assert!(!reloaded.contains_model("cube"));
    assert!(reloaded.contains_model("big"));
    assert!(reloaded.contains_texture("brick"));
}
