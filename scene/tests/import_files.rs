use std::fs;
use std::path::Path;

use image::{Rgba, RgbaImage};
use opal_scene::loader::{load_scene, DetectedFormat};
use opal_scene::{ImportConfig, ImportError, Importer, ResourceKind, Scene, SceneError};

const CRATE_OBJ: &str = "\
mtllib crate.mtl
o box
v 0 0 0
v 1 0 0
v 1 1 0
v 0 1 0
vt 0 0
vt 1 0
vt 1 1
vt 0 1
vn 0 0 1
usemtl wood
f 1/1/1 2/2/1 3/3/1 4/4/1
";

const CRATE_MTL: &str = "\
newmtl wood
Kd 1 1 1
";

/// Lays out `Models/crate.obj`, its material and textures under `root`.
fn write_assets(root: &Path) -> ImportConfig {
    let models = root.join("Models");
    let textures = root.join("Textures");
    fs::create_dir_all(&models).unwrap();
    fs::create_dir_all(textures.join("crate")).unwrap();

    fs::write(models.join("crate.obj"), CRATE_OBJ).unwrap();
    fs::write(models.join("crate.mtl"), CRATE_MTL).unwrap();

    let mut wood = RgbaImage::from_pixel(2, 2, Rgba([200, 100, 50, 255]));
    wood.put_pixel(0, 1, Rgba([1, 2, 3, 4]));
    wood.save(textures.join("crate/wood.tga")).unwrap();

    RgbaImage::from_pixel(3, 1, Rgba([0, 0, 0, 255]))
        .save(textures.join("brick.tga"))
        .unwrap();

    ImportConfig::default()
        .with_model_dir(models)
        .with_texture_dir(textures)
}

#[test]
fn import_tga_texture() {
    let dir = tempfile::tempdir().unwrap();
    let importer = Importer::new(write_assets(dir.path()));
    let mut scene = Scene::new("t");

    importer.add(&mut scene, ResourceKind::Texture, "crate/wood", "wood").unwrap();

    let texture = scene.texture("wood").unwrap();
    assert_eq!(texture.dimensions(), (2, 2));
    // Bottom row first, channels in B, G, R, A order.
    assert_eq!(&texture.pixels()[0..8], &[3, 2, 1, 4, 50, 100, 200, 255]);
}

#[test]
fn import_obj_model_with_material_texture() {
    let dir = tempfile::tempdir().unwrap();
    let importer = Importer::new(write_assets(dir.path()));
    let mut scene = Scene::new("t");

    importer.add_model(&mut scene, "crate", "box").unwrap();

    let model = scene.model("box").unwrap();
    assert_eq!(model.meshes.len(), 1);
    let mesh = &model.meshes[0];
    assert_eq!(mesh.vertices.len(), 4);
    assert_eq!(mesh.indices.len(), 6);
    assert_eq!(mesh.material_index, 0);
    assert_eq!(mesh.material_name, "tex_crate_wood");
    assert!(mesh.vertices.iter().all(|v| v.normal == [0.0, 0.0, 1.0]));

    assert_eq!(scene.texture("tex_crate_wood").unwrap().dimensions(), (2, 2));
}

#[test]
fn import_missing_model_file() {
    let dir = tempfile::tempdir().unwrap();
    let importer = Importer::new(write_assets(dir.path()));
    let mut scene = Scene::new("t");

    let result = importer.add_model(&mut scene, "barrel", "barrel");

    assert!(matches!(result, Err(SceneError::ImportFailure(ImportError::ModelLoad { .. }))));
    assert!(scene.is_empty());
}

#[test]
fn model_without_its_texture_is_not_added() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_assets(dir.path());
    fs::remove_file(config.texture_path("crate/wood")).unwrap();
    let importer = Importer::new(config);
    let mut scene = Scene::new("t");

    let result = importer.add_model(&mut scene, "crate", "box");

    assert!(matches!(result, Err(SceneError::UnresolvedReference { .. })));
    assert!(scene.is_empty());
}

#[test]
fn compile_manifest_to_pack() {
    let dir = tempfile::tempdir().unwrap();
    let importer = Importer::new(write_assets(dir.path()));
    let manifest = dir.path().join("level.json");
    fs::write(
        &manifest,
        r#"{
            "name": "level1",
            "resources": [
                { "resourcename": "crate", "type": "model3d", "filename": "crate" },
                { "resourcename": "brick", "type": "texture", "filename": "brick" }
            ]
        }"#,
    )
    .unwrap();

    let loaded = load_scene(&manifest, &importer).unwrap();
    assert_eq!(loaded.format, DetectedFormat::Manifest);

    let output = dir.path().join("level1.opl");
    loaded.scene.save_to_file(&output).unwrap();

    let packed = load_scene(&output, &importer).unwrap();
    assert_eq!(packed.format, DetectedFormat::Pack);
    assert_eq!(packed.scene.name(), "level1");
    assert_eq!(packed.scene.info(), loaded.scene.info());
    assert_eq!(
        packed.scene.info().to_string(),
        "Texture count: 2\n\tbrick [3,1]\n\ttex_crate_wood [2,2]\nModel3D count: 1\n\tcrate [1]\n"
    );
}
