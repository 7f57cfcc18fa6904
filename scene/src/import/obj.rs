//! Wavefront OBJ model import.

use std::path::Path;

use log::warn;

use super::{ImportConfig, ImportError, ImportedModel, ModelImporter};
use crate::geometry::{Mesh, Vertex};

/// Loads OBJ files with tobj, one [`Mesh`] per OBJ object or group.
///
/// Faces are triangulated and positions, normals and texture coordinates are
/// merged into a single index buffer. Missing normals or texture coordinates
/// become zero. Material names come from the referenced MTL file; if it cannot
/// be loaded the model is imported without materials.
#[derive(Debug, Default, Clone, Copy)]
pub struct ObjImporter;

impl ObjImporter {
    pub fn load_path(&self, path: &Path) -> Result<ImportedModel, ImportError> {
        let (models, materials) = tobj::load_obj(path, &tobj::GPU_LOAD_OPTIONS).map_err(|e| ImportError::ModelLoad {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        let materials: Vec<String> = match materials {
            Ok(materials) => materials.into_iter().map(|m| m.name).collect(),
            Err(e) => {
                warn!("Materials for {} not loaded: {}", path.display(), e);
                Vec::new()
            }
        };

        let meshes = models
            .iter()
            .map(|model| convert_mesh(path, model))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ImportedModel::new(meshes).with_material_table(materials))
    }
}

impl ModelImporter for ObjImporter {
    fn import_model(&self, source: &str, config: &ImportConfig) -> Result<ImportedModel, ImportError> {
        self.load_path(&config.model_path(source))
    }
}

fn convert_mesh(path: &Path, model: &tobj::Model) -> Result<Mesh, ImportError> {
    let mesh = &model.mesh;
    if mesh.indices.is_empty() {
        return Err(ImportError::MissingFaces {
            path: path.to_path_buf(),
            mesh: model.name.clone(),
        });
    }

    let vertices = (0..mesh.positions.len() / 3)
        .map(|i| {
            Vertex::new(
                [mesh.positions[i * 3], mesh.positions[i * 3 + 1], mesh.positions[i * 3 + 2]],
                [
                    mesh.normals.get(i * 3).map_or(0.0, |f| *f),
                    mesh.normals.get(i * 3 + 1).map_or(0.0, |f| *f),
                    mesh.normals.get(i * 3 + 2).map_or(0.0, |f| *f),
                ],
                [
                    mesh.texcoords.get(i * 2).map_or(0.0, |f| *f),
                    mesh.texcoords.get(i * 2 + 1).map_or(0.0, |f| *f),
                ],
            )
        })
        .collect();

    let material_index = mesh
        .material_id
        .and_then(|id| u32::try_from(id).ok())
        .unwrap_or(Mesh::NO_MATERIAL);

    let mut converted = Mesh::new(vertices, mesh.indices.clone());
    converted.material_index = material_index;
    Ok(converted)
}
