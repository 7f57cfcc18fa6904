//! Format-agnostic scene loading.
//!
//! A scene source is either a compiled scene pack (.opl) or a JSON manifest
//! (.json) whose resources are imported from source assets. The format is
//! detected from the leading bytes, falling back to the file extension.
//!
//! # Examples
//!
//! ```no_run
//! use opal_scene::import::Importer;
//! use opal_scene::loader::load_scene;
//!
//! let loaded = load_scene("level1.json", &Importer::default()).unwrap();
//! println!("{}", loaded.scene.info());
//! ```

use std::path::{Path, PathBuf};

use log::info;

use crate::format::MAGIC;
use crate::import::Importer;
use crate::manifest::Manifest;
use crate::scene::{Scene, SceneError};

// ============================================================================
// Types
// ============================================================================

/// Where scene data comes from.
pub enum SceneSource {
    /// Load from a filesystem path. Format is auto-detected from magic bytes,
    /// falling back to file extension.
    Path(PathBuf),
    /// Load from bytes already in memory. Format is auto-detected from magic bytes.
    Bytes(Vec<u8>),
}

/// The result of a successful scene load.
pub struct SceneLoadResult {
    pub scene: Scene,
    /// Which format was detected and loaded.
    pub format: DetectedFormat,
}

/// The file format that was detected and used for loading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectedFormat {
    Pack,
    Manifest,
}

// ============================================================================
// Format Detection
// ============================================================================

/// Detect format from leading bytes, then from the extension of `path` if given.
pub fn detect_format(bytes: &[u8], path: Option<&Path>) -> Result<DetectedFormat, SceneError> {
    detect_format_from_bytes(bytes)
        .or_else(|| path.and_then(detect_format_from_extension))
        .ok_or_else(|| {
            SceneError::UnknownFormat(
                path.map(|p| p.display().to_string())
                    .unwrap_or_else(|| "<bytes>".to_string()),
            )
        })
}

fn detect_format_from_bytes(bytes: &[u8]) -> Option<DetectedFormat> {
    if bytes.starts_with(&MAGIC) {
        return Some(DetectedFormat::Pack);
    }

    // Manifest JSON starts with '{' (possibly with leading whitespace)
    let first = bytes.iter().position(|&b| !b.is_ascii_whitespace())?;
    (bytes[first] == b'{').then_some(DetectedFormat::Manifest)
}

fn detect_format_from_extension(path: &Path) -> Option<DetectedFormat> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("opl") => Some(DetectedFormat::Pack),
        Some("json") => Some(DetectedFormat::Manifest),
        _ => None,
    }
}

// ============================================================================
// Loading
// ============================================================================

/// Load a scene from a pack or manifest file.
pub fn load_scene(path: impl Into<PathBuf>, importer: &Importer) -> Result<SceneLoadResult, SceneError> {
    load(SceneSource::Path(path.into()), importer)
}

/// Load a scene from any source. Manifest resources are imported with `importer`.
pub fn load(source: SceneSource, importer: &Importer) -> Result<SceneLoadResult, SceneError> {
    let (bytes, path_hint) = match source {
        SceneSource::Path(path) => {
            let bytes = std::fs::read(&path)?;
            (bytes, Some(path))
        }
        SceneSource::Bytes(bytes) => (bytes, None),
    };

    let format = detect_format(&bytes, path_hint.as_deref())?;
    if let Some(path) = &path_hint {
        info!("Loading {} as {:?}", path.display(), format);
    }

    let scene = match format {
        DetectedFormat::Pack => Scene::from_bytes(&bytes)?,
        DetectedFormat::Manifest => importer.build_scene(&Manifest::from_slice(&bytes)?)?,
    };

    Ok(SceneLoadResult { scene, format })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{cube, Model3D};

    fn create_test_scene_bytes() -> Vec<u8> {
        let mut scene = Scene::new("packed");
        scene.add_model("cube", Model3D::new(vec![cube(1.0)])).unwrap();
        scene.to_bytes().unwrap()
    }

    #[test]
    fn test_detect_pack() {
        let bytes = b"OPL\x01\x00demo\x00";
        assert_eq!(detect_format(bytes, None).unwrap(), DetectedFormat::Pack);
    }

    #[test]
    fn test_detect_manifest_json() {
        let bytes = b"  \n{ \"name\": \"demo\" }";
        assert_eq!(detect_format(bytes, None).unwrap(), DetectedFormat::Manifest);
    }

    #[test]
    fn test_detect_unknown() {
        let bytes = b"\x00\x00\x00\x00";
        assert!(matches!(detect_format(bytes, None), Err(SceneError::UnknownFormat(_))));
        assert!(detect_format(b"", None).is_err());
    }

    #[test]
    fn test_detect_from_extension() {
        assert_eq!(
            detect_format(b"", Some(Path::new("level.opl"))).unwrap(),
            DetectedFormat::Pack
        );
        assert_eq!(
            detect_format(b"", Some(Path::new("level.json"))).unwrap(),
            DetectedFormat::Manifest
        );
        assert!(detect_format(b"", Some(Path::new("model.obj"))).is_err());
    }

    #[test]
    fn test_bytes_take_precedence_over_extension() {
        let bytes = create_test_scene_bytes();
        assert_eq!(
            detect_format(&bytes, Some(Path::new("level.json"))).unwrap(),
            DetectedFormat::Pack
        );
    }

    #[test]
    fn test_load_pack_from_bytes() {
        let result = load(SceneSource::Bytes(create_test_scene_bytes()), &Importer::default()).unwrap();

        assert_eq!(result.format, DetectedFormat::Pack);
        assert_eq!(result.scene.name(), "packed");
        assert!(result.scene.contains_model("cube"));
    }

    #[test]
    fn test_load_empty_manifest_from_bytes() {
        let bytes = br#"{ "name": "empty", "resources": [] }"#.to_vec();
        let result = load(SceneSource::Bytes(bytes), &Importer::default()).unwrap();

        assert_eq!(result.format, DetectedFormat::Manifest);
        assert_eq!(result.scene.name(), "empty");
        assert!(result.scene.is_empty());
    }

    #[test]
    fn test_load_corrupt_pack() {
        let mut bytes = create_test_scene_bytes();
        bytes.truncate(bytes.len() - 3);
        let result = load(SceneSource::Bytes(bytes), &Importer::default());
        assert!(matches!(result, Err(SceneError::MalformedPack(_))));
    }

    #[test]
    fn test_load_missing_file() {
        let result = load_scene("does/not/exist.opl", &Importer::default());
        assert!(matches!(result, Err(SceneError::Io(_))));
    }
}
