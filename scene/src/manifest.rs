//! JSON scene manifests.
//!
//! A manifest names a scene and lists the resources to import into it:
//!
//! ```json
//! {
//!     "name": "demo",
//!     "resources": [
//!         { "resourcename": "brick", "type": "texture", "filename": "brick" },
//!         { "resourcename": "cube", "type": "model3d", "filename": "cube" }
//!     ]
//! }
//! ```
//!
//! `filename` is a source name resolved through the [`ImportConfig`](crate::import::ImportConfig),
//! not a path.

use std::path::Path;

use log::{info, warn};
use serde::Deserialize;

use crate::format::ResourceKind;
use crate::import::Importer;
use crate::scene::{Scene, SceneError};

/// A validated manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
    pub name: String,
    pub resources: Vec<ManifestResource>,
}

/// One resource to import.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestResource {
    /// Resource name in the scene.
    pub name: String,
    pub kind: ResourceKind,
    /// Source name handed to the importer.
    pub source: String,
}

// Every field is optional here so a missing one can be reported by name.
#[derive(Deserialize)]
struct RawManifest {
    name: Option<String>,
    resources: Option<Vec<RawResource>>,
}

#[derive(Deserialize)]
struct RawResource {
    resourcename: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
    filename: Option<String>,
}

impl Manifest {
    /// Parses and validates manifest JSON.
    ///
    /// Resources of an unknown type are skipped with a warning.
    pub fn parse(json: &str) -> Result<Self, SceneError> {
        let raw: RawManifest = serde_json::from_str(json)?;
        Self::validate(raw)
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self, SceneError> {
        let raw: RawManifest = serde_json::from_slice(bytes)?;
        Self::validate(raw)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, SceneError> {
        let bytes = std::fs::read(path)?;
        Self::from_slice(&bytes)
    }

    fn validate(raw: RawManifest) -> Result<Self, SceneError> {
        let name = raw.name.ok_or_else(|| missing("manifest", "name"))?;
        let raw_resources = raw.resources.ok_or_else(|| missing(&name, "resources"))?;

        let mut resources = Vec::with_capacity(raw_resources.len());
        for resource in raw_resources {
            let resource_name = resource.resourcename.ok_or_else(|| missing("resource", "resourcename"))?;
            let kind = resource.kind.ok_or_else(|| missing(&resource_name, "type"))?;
            let source = resource.filename.ok_or_else(|| missing(&resource_name, "filename"))?;

            match kind.parse::<ResourceKind>() {
                Ok(kind) => resources.push(ManifestResource {
                    name: resource_name,
                    kind,
                    source,
                }),
                Err(e) => warn!("{}: {}, skipping", resource_name, e),
            }
        }

        Ok(Self { name, resources })
    }
}

fn missing(resource: &str, field: &'static str) -> SceneError {
    SceneError::MissingField {
        resource: resource.to_string(),
        field,
    }
}

impl Importer {
    /// Builds a scene by importing every manifest resource in order.
    ///
    /// The first failure aborts the whole build. A texture whose name is
    /// already taken, typically by a model's material import, is skipped.
    pub fn build_scene(&self, manifest: &Manifest) -> Result<Scene, SceneError> {
        info!("Building scene {} from {} resources", manifest.name, manifest.resources.len());
        let mut scene = Scene::default();
        scene.set_name(manifest.name.clone())?;

        for resource in &manifest.resources {
            if resource.kind == ResourceKind::Texture && scene.contains_texture(&resource.name) {
                warn!("Texture {} already exists, skipping", resource.name);
                continue;
            }
            self.add(&mut scene, resource.kind, &resource.source, &resource.name)?;
        }

        Ok(scene)
    }
}
