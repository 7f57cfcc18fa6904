//! Assimp-based model import.
//!
//! Uses the russimp crate (Rust bindings for the Open Asset Import Library) to
//! load models in the many formats assimp understands (3DS, FBX, DAE, Blend, ...).
//! Only available with the `assimp` feature, since it links the native library.

use std::path::Path;
use std::rc::Rc;

use cgmath::{Matrix4, Point3, SquareMatrix, Transform};
use russimp::material::{Material as RMaterial, PropertyTypeInfo};
use russimp::node::Node as RNode;
use russimp::scene::{PostProcess, Scene as RScene};

use super::{ImportConfig, ImportError, ImportedModel, ModelImporter};
use crate::geometry::{Mesh, Vertex};

/// Set by assimp when a scene could not be fully imported.
const AI_SCENE_FLAGS_INCOMPLETE: u32 = 0x1;

/// Loads models through assimp.
///
/// The node hierarchy is flattened: every node's transform is accumulated from
/// the root and applied to the positions of the meshes it references. Children
/// are visited before the node's own meshes, so mesh order follows a post-order
/// walk of the hierarchy.
#[derive(Debug, Default, Clone, Copy)]
pub struct AssimpImporter;

/// Post-processing flags applied to every assimp load.
fn default_post_process() -> Vec<PostProcess> {
    vec![
        PostProcess::CalculateTangentSpace,
        PostProcess::Triangulate,
        PostProcess::JoinIdenticalVertices,
        PostProcess::SortByPrimitiveType,
    ]
}

impl AssimpImporter {
    pub fn load_path(&self, path: &Path) -> Result<ImportedModel, ImportError> {
        let path_str = path
            .to_str()
            .ok_or_else(|| ImportError::NonUtf8Path(path.to_path_buf()))?;

        let load_failed = |message: String| ImportError::ModelLoad {
            path: path.to_path_buf(),
            message,
        };

        let scene = RScene::from_file(path_str, default_post_process())
            .map_err(|e| load_failed(format!("{:?}", e)))?;
        if scene.flags & AI_SCENE_FLAGS_INCOMPLETE != 0 {
            return Err(load_failed("incomplete scene".to_string()));
        }
        let root = scene
            .root
            .as_ref()
            .ok_or_else(|| load_failed("no root node".to_string()))?;

        let mut meshes = Vec::new();
        collect_node(&scene, root, Matrix4::identity(), path, &mut meshes)?;

        let materials = scene.materials.iter().map(material_name).collect();
        Ok(ImportedModel::new(meshes).with_material_table(materials))
    }
}

impl ModelImporter for AssimpImporter {
    fn import_model(&self, source: &str, config: &ImportConfig) -> Result<ImportedModel, ImportError> {
        self.load_path(&config.model_path(source))
    }
}

/// Name of an assimp material, or empty if it has none.
fn material_name(mat: &RMaterial) -> String {
    for prop in &mat.properties {
        if prop.key == "?mat.name" {
            if let PropertyTypeInfo::String(ref name) = prop.data {
                return name.clone();
            }
        }
    }
    String::new()
}

/// Appends the meshes of `node` and its descendants, children first.
fn collect_node(
    scene: &RScene,
    node: &Rc<RNode>,
    parent_transform: Matrix4<f32>,
    path: &Path,
    meshes: &mut Vec<Mesh>,
) -> Result<(), ImportError> {
    let t = &node.transformation;
    #[rustfmt::skip]
    let local = Matrix4::new(
        t.a1, t.b1, t.c1, t.d1,
        t.a2, t.b2, t.c2, t.d2,
        t.a3, t.b3, t.c3, t.d3,
        t.a4, t.b4, t.c4, t.d4,
    );
    let transform = parent_transform * local;

    for child in node.children.borrow().iter() {
        collect_node(scene, child, transform, path, meshes)?;
    }

    for &mesh_index in &node.meshes {
        let Some(assimp_mesh) = scene.meshes.get(mesh_index as usize) else {
            log::warn!("Node {} references missing mesh {}", node.name, mesh_index);
            continue;
        };
        meshes.push(convert_mesh(assimp_mesh, &transform, path)?);
    }

    Ok(())
}

fn convert_mesh(assimp_mesh: &russimp::mesh::Mesh, transform: &Matrix4<f32>, path: &Path) -> Result<Mesh, ImportError> {
    if assimp_mesh.faces.is_empty() {
        return Err(ImportError::MissingFaces {
            path: path.to_path_buf(),
            mesh: assimp_mesh.name.clone(),
        });
    }

    let vertices = assimp_mesh
        .vertices
        .iter()
        .enumerate()
        .map(|(i, v)| {
            let position = transform.transform_point(Point3::new(v.x, v.y, v.z));

            let normal = assimp_mesh
                .normals
                .get(i)
                .map(|n| [n.x, n.y, n.z])
                .unwrap_or([0.0, 0.0, 0.0]);

            let tex_coord = assimp_mesh
                .texture_coords
                .first()
                .and_then(|channel| channel.as_ref())
                .and_then(|coords| coords.get(i))
                .map(|tc| [tc.x, tc.y])
                .unwrap_or([0.0, 0.0]);

            Vertex::new([position.x, position.y, position.z], normal, tex_coord)
        })
        .collect();

    let indices = assimp_mesh
        .faces
        .iter()
        .flat_map(|face| face.0.iter().copied())
        .collect();

    let mut mesh = Mesh::new(vertices, indices);
    mesh.material_index = assimp_mesh.material_index;
    Ok(mesh)
}
