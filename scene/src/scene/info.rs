//! Read-only summaries of a scene's resources, for presentation.

use std::fmt;

use crate::geometry::{Mesh, Model3D};
use crate::texture::Texture;

/// Counts and one line per resource for both tables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SceneInfo {
    pub name: String,
    pub models: Vec<ModelSummary>,
    pub textures: Vec<TextureSummary>,
}

impl fmt::Display for SceneInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Texture count: {}", self.textures.len())?;
        for texture in &self.textures {
            writeln!(f, "\t{} [{},{}]", texture.name, texture.width, texture.height)?;
        }
        writeln!(f, "Model3D count: {}", self.models.len())?;
        for model in &self.models {
            writeln!(f, "\t{} [{}]", model.name, model.meshes.len())?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeshSummary {
    pub material_name: String,
    pub vertex_count: usize,
    pub index_count: usize,
}

impl From<&Mesh> for MeshSummary {
    fn from(mesh: &Mesh) -> Self {
        Self {
            material_name: mesh.material_name.clone(),
            vertex_count: mesh.vertices.len(),
            index_count: mesh.indices.len(),
        }
    }
}

/// A model's name and per-mesh detail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSummary {
    pub name: String,
    pub meshes: Vec<MeshSummary>,
}

impl ModelSummary {
    pub fn new(name: &str, model: &Model3D) -> Self {
        Self {
            name: name.to_string(),
            meshes: model.meshes.iter().map(MeshSummary::from).collect(),
        }
    }
}

impl fmt::Display for ModelSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.name)?;
        for (i, mesh) in self.meshes.iter().enumerate() {
            writeln!(f, "Mesh [{}]", i)?;
            writeln!(f, "\tTexture: {}", mesh.material_name)?;
            writeln!(f, "\tVertex Size: {}", mesh.vertex_count)?;
            writeln!(f, "\tIndex Size: {}\n", mesh.index_count)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureSummary {
    pub name: String,
    pub width: u32,
    pub height: u32,
}

impl TextureSummary {
    pub fn new(name: &str, texture: &Texture) -> Self {
        Self {
            name: name.to_string(),
            width: texture.width(),
            height: texture.height(),
        }
    }
}

impl fmt::Display for TextureSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.name)?;
        writeln!(f, "\tWidth: {}", self.width)?;
        writeln!(f, "\tHeight: {}", self.height)
    }
}
