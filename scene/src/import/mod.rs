//! Import of source assets into a [`Scene`].
//!
//! Model and texture decoding is delegated to the [`ModelImporter`] and
//! [`TextureImporter`] collaborators. The [`Importer`] drives them: it resolves
//! file locations and material texture names through an explicit
//! [`ImportConfig`], imports the textures a model's materials need, and commits
//! the result to the registry in one step.

mod images;
mod obj;
#[cfg(feature = "assimp")]
mod assimp;

pub use images::{texture_from_image, ImageImporter};
pub use obj::ObjImporter;
#[cfg(feature = "assimp")]
pub use assimp::AssimpImporter;

use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use thiserror::Error;

use crate::format::ResourceKind;
use crate::geometry::{Mesh, Model3D};
use crate::scene::{check_name, Scene, SceneError};
use crate::texture::Texture;

// ============================================================================
// Configuration
// ============================================================================

/// Where source assets live and how material textures are named.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportConfig {
    pub model_dir: PathBuf,
    /// Extension of model sources, without the dot.
    pub model_extension: String,
    pub texture_dir: PathBuf,
    /// Extension of texture sources, without the dot.
    pub texture_extension: String,
    /// Prefix of the texture resources created for model materials.
    pub material_prefix: String,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            model_dir: PathBuf::from("Resources/Models"),
            model_extension: "obj".to_string(),
            texture_dir: PathBuf::from("Resources/Textures"),
            texture_extension: "tga".to_string(),
            material_prefix: "tex_".to_string(),
        }
    }
}

impl ImportConfig {
    pub fn with_model_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.model_dir = dir.into();
        self
    }

    pub fn with_model_extension(mut self, extension: impl Into<String>) -> Self {
        self.model_extension = extension.into();
        self
    }

    pub fn with_texture_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.texture_dir = dir.into();
        self
    }

    pub fn with_texture_extension(mut self, extension: impl Into<String>) -> Self {
        self.texture_extension = extension.into();
        self
    }

    pub fn with_material_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.material_prefix = prefix.into();
        self
    }

    /// File a model source name refers to: `<model_dir>/<source>.<model_extension>`.
    pub fn model_path(&self, source: &str) -> PathBuf {
        source_path(&self.model_dir, source, &self.model_extension)
    }

    /// File a texture source name refers to: `<texture_dir>/<source>.<texture_extension>`.
    pub fn texture_path(&self, source: &str) -> PathBuf {
        source_path(&self.texture_dir, source, &self.texture_extension)
    }

    /// Resource name of the texture for `material` of the model imported from `model_source`.
    pub fn material_texture_name(&self, model_source: &str, material: &str) -> String {
        format!("{}{}_{}", self.material_prefix, model_source, material)
    }

    /// Texture source name for `material` of the model imported from `model_source`.
    pub fn material_texture_source(&self, model_source: &str, material: &str) -> String {
        format!("{}/{}", model_source, material)
    }
}

fn source_path(dir: &Path, source: &str, extension: &str) -> PathBuf {
    dir.join(format!("{}.{}", source, extension))
}

// ============================================================================
// Collaborators
// ============================================================================

/// Errors reported by import collaborators.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Loading model {} failed: {message}", .path.display())]
    ModelLoad { path: PathBuf, message: String },

    #[error("Mesh {mesh} in {} has no faces", .path.display())]
    MissingFaces { path: PathBuf, mesh: String },

    #[error("{} image data couldn't be loaded: {source}", .path.display())]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Image {} is too large", .path.display())]
    ImageTooLarge { path: PathBuf },

    #[error("No model importer for .{0} files")]
    UnsupportedModelFormat(String),

    #[error("Path {} contains non-UTF8 characters", .0.display())]
    NonUtf8Path(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A decoded model before its materials are resolved to texture resources.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportedModel {
    /// Meshes with `material_index` set and `material_name` still empty.
    pub meshes: Vec<Mesh>,
    /// Material names of the source file, by material index.
    pub materials: Vec<String>,
}

impl ImportedModel {
    pub fn new(meshes: Vec<Mesh>) -> Self {
        Self {
            meshes,
            materials: Vec::new(),
        }
    }

    pub fn with_material_table(mut self, materials: Vec<String>) -> Self {
        self.materials = materials;
        self
    }

    /// Material name of `mesh`, if its index is within the material table.
    pub fn material_of(&self, mesh: &Mesh) -> Option<&str> {
        self.materials
            .get(mesh.material_index as usize)
            .map(String::as_str)
    }
}

/// Decodes a model source into meshes.
pub trait ModelImporter {
    fn import_model(&self, source: &str, config: &ImportConfig) -> Result<ImportedModel, ImportError>;
}

/// Decodes a texture source into 4-byte BGRA pixels.
pub trait TextureImporter {
    fn import_texture(&self, source: &str, config: &ImportConfig) -> Result<Texture, ImportError>;
}

/// Model importer that picks a decoder from the configured model extension.
///
/// OBJ sources always go through [`ObjImporter`]. Every other extension needs
/// the `assimp` feature.
#[derive(Debug, Default, Clone, Copy)]
pub struct FileImporter;

impl ModelImporter for FileImporter {
    fn import_model(&self, source: &str, config: &ImportConfig) -> Result<ImportedModel, ImportError> {
        if config.model_extension.eq_ignore_ascii_case("obj") {
            return ObjImporter.import_model(source, config);
        }

        #[cfg(feature = "assimp")]
        {
            AssimpImporter.import_model(source, config)
        }

        #[cfg(not(feature = "assimp"))]
        {
            Err(ImportError::UnsupportedModelFormat(config.model_extension.clone()))
        }
    }
}

// ============================================================================
// Orchestration
// ============================================================================

/// Imports source assets into scenes using a configuration and two collaborators.
pub struct Importer {
    config: ImportConfig,
    models: Box<dyn ModelImporter>,
    textures: Box<dyn TextureImporter>,
}

impl Default for Importer {
    fn default() -> Self {
        Self::new(ImportConfig::default())
    }
}

impl Importer {
    /// Importer reading files with [`FileImporter`] and [`ImageImporter`].
    pub fn new(config: ImportConfig) -> Self {
        Self::with_collaborators(config, FileImporter, ImageImporter)
    }

    pub fn with_collaborators(
        config: ImportConfig,
        models: impl ModelImporter + 'static,
        textures: impl TextureImporter + 'static,
    ) -> Self {
        Self {
            config,
            models: Box::new(models),
            textures: Box::new(textures),
        }
    }

    pub fn config(&self) -> &ImportConfig {
        &self.config
    }

    /// Imports a resource of the given kind from `source` under `name`.
    pub fn add(&self, scene: &mut Scene, kind: ResourceKind, source: &str, name: &str) -> Result<(), SceneError> {
        match kind {
            ResourceKind::Model3D => self.add_model(scene, source, name),
            ResourceKind::Texture => self.add_texture(scene, source, name),
        }
    }

    /// Imports the model `source` as `name`, along with its material textures.
    ///
    /// Each material gets the texture resource named by
    /// [`ImportConfig::material_texture_name`]. Material textures that are
    /// already in the scene are reused; ones that fail to import are skipped
    /// with a warning, and any mesh that needs them makes the whole import fail
    /// with [`SceneError::UnresolvedReference`]. Nothing is added unless the
    /// model and all its new textures can be added.
    pub fn add_model(&self, scene: &mut Scene, source: &str, name: &str) -> Result<(), SceneError> {
        check_name(name)?;
        if scene.contains_model(name) {
            return Err(SceneError::DuplicateResource {
                kind: ResourceKind::Model3D,
                name: name.to_string(),
            });
        }

        let imported = self.models.import_model(source, &self.config)?;
        debug!(
            "Imported {} with {} meshes and {} materials",
            source,
            imported.meshes.len(),
            imported.materials.len()
        );

        let mut staged: Vec<(String, Texture)> = Vec::new();
        for material in &imported.materials {
            let texture_name = self.config.material_texture_name(source, material);
            if scene.contains_texture(&texture_name) || staged.iter().any(|(staged, _)| *staged == texture_name) {
                debug!("Texture {} already exists, skipping", texture_name);
                continue;
            }

            let texture_source = self.config.material_texture_source(source, material);
            match self.textures.import_texture(&texture_source, &self.config) {
                Ok(texture) => staged.push((texture_name, texture)),
                Err(e) => warn!("Texture {} for {} not imported: {}", texture_name, name, e),
            }
        }

        let meshes = imported
            .meshes
            .iter()
            .map(|mesh| {
                let mut mesh = mesh.clone();
                if let Some(material) = imported.material_of(&mesh) {
                    mesh.material_name = self.config.material_texture_name(source, material);
                }
                mesh
            })
            .collect();

        scene.add_model_with_textures(name, Model3D::new(meshes), staged)?;
        info!("Added Model3D {} from {}", name, source);
        Ok(())
    }

    /// Imports the texture `source` as `name`.
    pub fn add_texture(&self, scene: &mut Scene, source: &str, name: &str) -> Result<(), SceneError> {
        check_name(name)?;
        if scene.contains_texture(name) {
            return Err(SceneError::DuplicateResource {
                kind: ResourceKind::Texture,
                name: name.to_string(),
            });
        }

        let texture = self.textures.import_texture(source, &self.config)?;
        scene.add_texture(name, texture)?;
        info!("Added Texture {} from {}", name, source);
        Ok(())
    }
}
