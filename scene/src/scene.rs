//! The scene resource registry.
//!
//! A [`Scene`] owns two name-keyed resource tables, one for models and one for
//! textures. Names are unique within a table; a model and a texture may share a
//! name. Every mutating operation either fully succeeds or leaves the scene as it
//! was.

mod info;

pub use info::{MeshSummary, ModelSummary, SceneInfo, TextureSummary};

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use log::debug;
use thiserror::Error;

use crate::format::{FormatError, ResourceKind, ResourceRecord};
use crate::geometry::Model3D;
use crate::import::ImportError;
use crate::texture::Texture;

/// Errors reported by registry operations and by the scene loaders built on them.
#[derive(Debug, Error)]
pub enum SceneError {
    #[error("{kind} {name} already exists")]
    DuplicateResource { kind: ResourceKind, name: String },

    #[error("{kind} {name} does not exist")]
    ResourceNotFound { kind: ResourceKind, name: String },

    #[error("Malformed scene pack: {0}")]
    MalformedPack(#[from] FormatError),

    #[error("Name {0:?} contains a NUL byte")]
    InvalidName(String),

    #[error("{resource} missing {field} field")]
    MissingField { resource: String, field: &'static str },

    #[error("Model {model} references missing texture {material}")]
    UnresolvedReference { model: String, material: String },

    #[error("Import failed: {0}")]
    ImportFailure(#[from] ImportError),

    #[error("Invalid manifest: {0}")]
    Manifest(#[from] serde_json::Error),

    #[error("Unknown file format: {0}")]
    UnknownFormat(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Fails with [`SceneError::InvalidName`] if `name` cannot be written as a
/// null-terminated pack string.
pub(crate) fn check_name(name: &str) -> Result<(), SceneError> {
    if name.contains('\0') {
        return Err(SceneError::InvalidName(name.to_string()));
    }
    Ok(())
}

/// A named scene and its model and texture tables.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    name: String,
    models: HashMap<String, Model3D>,
    textures: HashMap<String, Texture>,
}

impl Scene {
    /// Creates an empty scene.
    ///
    /// The name is not checked here; a name holding a NUL byte makes encoding
    /// fail. Use [`Scene::set_name`] for names from outside input.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            models: HashMap::new(),
            textures: HashMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Renames the scene, rejecting names that cannot be stored in a pack.
    pub fn set_name(&mut self, name: impl Into<String>) -> Result<(), SceneError> {
        let name = name.into();
        check_name(&name)?;
        self.name = name;
        Ok(())
    }

    pub fn model(&self, name: &str) -> Option<&Model3D> {
        self.models.get(name)
    }

    pub fn texture(&self, name: &str) -> Option<&Texture> {
        self.textures.get(name)
    }

    pub fn contains_model(&self, name: &str) -> bool {
        self.models.contains_key(name)
    }

    pub fn contains_texture(&self, name: &str) -> bool {
        self.textures.contains_key(name)
    }

    /// Models in table order, which is unspecified.
    pub fn models(&self) -> impl Iterator<Item = (&str, &Model3D)> {
        self.models.iter().map(|(name, model)| (name.as_str(), model))
    }

    /// Textures in table order, which is unspecified.
    pub fn textures(&self) -> impl Iterator<Item = (&str, &Texture)> {
        self.textures.iter().map(|(name, texture)| (name.as_str(), texture))
    }

    pub fn model_count(&self) -> usize {
        self.models.len()
    }

    pub fn texture_count(&self) -> usize {
        self.textures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty() && self.textures.is_empty()
    }

    /// Adds a model under `name`.
    ///
    /// Fails with [`SceneError::DuplicateResource`] if the name is taken and with
    /// [`SceneError::UnresolvedReference`] if a mesh names a texture that is not
    /// in the scene.
    pub fn add_model(&mut self, name: impl Into<String>, model: Model3D) -> Result<(), SceneError> {
        self.add_model_with_textures(name, model, Vec::new())
    }

    /// Adds a model together with the textures its meshes reference.
    ///
    /// All names are checked and every mesh reference is resolved against the
    /// existing textures plus `textures` before anything is inserted.
    pub fn add_model_with_textures(
        &mut self,
        name: impl Into<String>,
        model: Model3D,
        textures: Vec<(String, Texture)>,
    ) -> Result<(), SceneError> {
        let name = name.into();
        check_name(&name)?;
        if self.models.contains_key(&name) {
            return Err(SceneError::DuplicateResource {
                kind: ResourceKind::Model3D,
                name,
            });
        }

        for (i, (texture_name, _)) in textures.iter().enumerate() {
            check_name(texture_name)?;
            let staged_twice = textures[..i].iter().any(|(other, _)| other == texture_name);
            if staged_twice || self.textures.contains_key(texture_name) {
                return Err(SceneError::DuplicateResource {
                    kind: ResourceKind::Texture,
                    name: texture_name.clone(),
                });
            }
        }

        let unresolved = model.material_names().find(|material| {
            !self.textures.contains_key(*material) && !textures.iter().any(|(staged, _)| staged == material)
        });
        if let Some(material) = unresolved {
            return Err(SceneError::UnresolvedReference {
                model: name,
                material: material.to_string(),
            });
        }

        for (texture_name, texture) in textures {
            debug!("Adding Texture {}", texture_name);
            self.textures.insert(texture_name, texture);
        }
        debug!("Adding Model3D {}", name);
        self.models.insert(name, model);
        Ok(())
    }

    /// Adds a texture under `name`, failing if the name is taken.
    pub fn add_texture(&mut self, name: impl Into<String>, texture: Texture) -> Result<(), SceneError> {
        let name = name.into();
        check_name(&name)?;
        match self.textures.entry(name) {
            Entry::Occupied(entry) => Err(SceneError::DuplicateResource {
                kind: ResourceKind::Texture,
                name: entry.key().clone(),
            }),
            Entry::Vacant(entry) => {
                debug!("Adding Texture {}", entry.key());
                entry.insert(texture);
                Ok(())
            }
        }
    }

    /// Removes and returns the model called `name`.
    pub fn remove_model(&mut self, name: &str) -> Result<Model3D, SceneError> {
        self.models.remove(name).ok_or_else(|| SceneError::ResourceNotFound {
            kind: ResourceKind::Model3D,
            name: name.to_string(),
        })
    }

    /// Removes and returns the texture called `name`.
    ///
    /// Models that reference the texture are left as they are.
    pub fn remove_texture(&mut self, name: &str) -> Result<Texture, SceneError> {
        self.textures.remove(name).ok_or_else(|| SceneError::ResourceNotFound {
            kind: ResourceKind::Texture,
            name: name.to_string(),
        })
    }

    /// Removes a resource of the given kind.
    pub fn remove(&mut self, kind: ResourceKind, name: &str) -> Result<(), SceneError> {
        match kind {
            ResourceKind::Model3D => self.remove_model(name).map(drop),
            ResourceKind::Texture => self.remove_texture(name).map(drop),
        }
    }

    /// Inserts a record read from a pack. References are not checked.
    pub(crate) fn insert_record(&mut self, record: ResourceRecord) -> Result<(), FormatError> {
        let kind = record.kind();
        let inserted = match record {
            ResourceRecord::Model { name, model } => match self.models.entry(name) {
                Entry::Occupied(entry) => Err(entry.key().clone()),
                Entry::Vacant(entry) => {
                    entry.insert(model);
                    Ok(())
                }
            },
            ResourceRecord::Texture { name, texture } => match self.textures.entry(name) {
                Entry::Occupied(entry) => Err(entry.key().clone()),
                Entry::Vacant(entry) => {
                    entry.insert(texture);
                    Ok(())
                }
            },
        };
        inserted.map_err(|name| FormatError::DuplicateResource { kind, name })
    }

    /// Summary of both tables, sorted by name.
    pub fn info(&self) -> SceneInfo {
        SceneInfo {
            name: self.name.clone(),
            models: self.list_models(),
            textures: self.list_textures(),
        }
    }

    /// Per-model detail, sorted by name.
    pub fn list_models(&self) -> Vec<ModelSummary> {
        let mut models: Vec<_> = self
            .models
            .iter()
            .map(|(name, model)| ModelSummary::new(name, model))
            .collect();
        models.sort_by(|a, b| a.name.cmp(&b.name));
        models
    }

    /// Per-texture detail, sorted by name.
    pub fn list_textures(&self) -> Vec<TextureSummary> {
        let mut textures: Vec<_> = self
            .textures
            .iter()
            .map(|(name, texture)| TextureSummary::new(name, texture))
            .collect();
        textures.sort_by(|a, b| a.name.cmp(&b.name));
        textures
    }
}

#[cfg(test)]
#[path = "scene_tests.rs"]
mod scene_tests;
