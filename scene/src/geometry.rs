//! Geometry value types: [`Vertex`], [`Mesh`] and [`Model3D`].
//!
//! Each type knows its exact encoded size and how to write itself into a scene
//! pack and read itself back. Decoding the bytes of an encoded value yields a
//! value that encodes to the identical byte sequence.

use std::io::{BufRead, Read, Write};
use std::mem::size_of;

use bytemuck::{Pod, Zeroable};

use crate::codec;
use crate::format::FormatError;

/// A single vertex as stored in a scene pack.
///
/// Fixed 32-byte layout (position, normal, texture coordinate) with no padding,
/// so vertex arrays are written to and read from the pack as raw memory.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub tex_coord: [f32; 2],
}

const _: () = assert!(size_of::<Vertex>() == 32);

impl Vertex {
    /// Encoded size of one vertex in bytes.
    pub const SIZE: usize = size_of::<Vertex>();

    pub fn new(position: [f32; 3], normal: [f32; 3], tex_coord: [f32; 2]) -> Self {
        Self {
            position,
            normal,
            tex_coord,
        }
    }

    pub fn write<W: Write>(&self, writer: &mut W) -> Result<(), FormatError> {
        codec::write_pod(writer, self)
    }

    pub fn read<R: Read>(reader: &mut R) -> Result<Self, FormatError> {
        codec::read_pod(reader, "vertex")
    }
}

/// An indexed triangle mesh with the texture it is drawn with.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Mesh {
    /// Index into the importer's material table. Informational only: it is
    /// carried through packs verbatim but means nothing after import.
    pub material_index: u32,
    /// Name of the texture resource this mesh references, or empty for none.
    pub material_name: String,
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl Mesh {
    /// Material index for meshes whose source had no material.
    pub const NO_MATERIAL: u32 = u32::MAX;

    pub fn new(vertices: Vec<Vertex>, indices: Vec<u32>) -> Self {
        Self {
            material_index: Self::NO_MATERIAL,
            material_name: String::new(),
            vertices,
            indices,
        }
    }

    pub fn with_material(mut self, index: u32, name: impl Into<String>) -> Self {
        self.material_index = index;
        self.material_name = name.into();
        self
    }

    /// Whether this mesh references a texture resource.
    pub fn has_material(&self) -> bool {
        !self.material_name.is_empty()
    }

    /// Exact number of bytes [`Mesh::write`] produces, including the leading
    /// size field itself.
    pub fn size(&self) -> usize {
        size_of::<u64>()
            + size_of::<u32>()
            + self.material_name.len()
            + 1
            + size_of::<u64>()
            + Vertex::SIZE * self.vertices.len()
            + size_of::<u64>()
            + size_of::<u32>() * self.indices.len()
    }

    /// Encoding: size (u64, reserved), material index (u32), material name
    /// (null-terminated), vertex count (u64), vertices, index count (u64), indices.
    pub fn write<W: Write>(&self, writer: &mut W) -> Result<(), FormatError> {
        codec::write_count(writer, self.size())?;
        codec::write_pod(writer, &self.material_index)?;
        codec::write_cstring(writer, &self.material_name)?;
        codec::write_count(writer, self.vertices.len())?;
        codec::write_pod_array(writer, &self.vertices)?;
        codec::write_count(writer, self.indices.len())?;
        codec::write_pod_array(writer, &self.indices)?;
        Ok(())
    }

    pub fn read<R: BufRead>(reader: &mut R) -> Result<Self, FormatError> {
        // Reserved: never used to skip ahead, every field is read in order.
        let _size: u64 = codec::read_pod(reader, "mesh size")?;
        let material_index = codec::read_pod(reader, "mesh material index")?;
        let material_name = codec::read_cstring(reader, "mesh material name")?;

        let vertex_count = codec::read_count(reader, "vertex count")?;
        let vertices = codec::read_pod_array(reader, vertex_count, "vertex data")?;

        let index_count = codec::read_count(reader, "index count")?;
        let indices = codec::read_pod_array(reader, index_count, "index data")?;

        Ok(Self {
            material_index,
            material_name,
            vertices,
            indices,
        })
    }
}

/// A model made of one or more meshes, owned exclusively.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Model3D {
    pub meshes: Vec<Mesh>,
}

impl Model3D {
    pub fn new(meshes: Vec<Mesh>) -> Self {
        Self { meshes }
    }

    /// Exact number of bytes [`Model3D::write`] produces.
    pub fn size(&self) -> usize {
        size_of::<u64>() + self.meshes.iter().map(Mesh::size).sum::<usize>()
    }

    pub fn vertex_count(&self) -> usize {
        self.meshes.iter().map(|m| m.vertices.len()).sum()
    }

    pub fn index_count(&self) -> usize {
        self.meshes.iter().map(|m| m.indices.len()).sum()
    }

    /// Texture resource names referenced by this model's meshes, in mesh order.
    pub fn material_names(&self) -> impl Iterator<Item = &str> {
        self.meshes
            .iter()
            .filter(|m| m.has_material())
            .map(|m| m.material_name.as_str())
    }

    pub fn write<W: Write>(&self, writer: &mut W) -> Result<(), FormatError> {
        codec::write_count(writer, self.meshes.len())?;
        for mesh in &self.meshes {
            mesh.write(writer)?;
        }
        Ok(())
    }

    pub fn read<R: BufRead>(reader: &mut R) -> Result<Self, FormatError> {
        let mesh_count = codec::read_count(reader, "mesh count")?;
        let mut meshes = Vec::new();
        for _ in 0..mesh_count {
            meshes.push(Mesh::read(reader)?);
        }
        Ok(Self { meshes })
    }
}

/// An axis-aligned cube centered at the origin, 24 vertices (4 per face) and 36 indices.
///
/// Useful as fixture geometry.
pub fn cube(size: f32) -> Mesh {
    let h = size / 2.0;
    // (normal, tangent u, tangent v) per face
    let faces: [([f32; 3], [f32; 3], [f32; 3]); 6] = [
        ([0.0, 0.0, 1.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
        ([0.0, 0.0, -1.0], [-1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
        ([1.0, 0.0, 0.0], [0.0, 0.0, -1.0], [0.0, 1.0, 0.0]),
        ([-1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0, 0.0]),
        ([0.0, 1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, -1.0]),
        ([0.0, -1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]),
    ];
    let corners: [([f32; 2], [f32; 2]); 4] = [
        ([-1.0, -1.0], [0.0, 1.0]),
        ([1.0, -1.0], [1.0, 1.0]),
        ([1.0, 1.0], [1.0, 0.0]),
        ([-1.0, 1.0], [0.0, 0.0]),
    ];

    let mut vertices = Vec::with_capacity(24);
    let mut indices = Vec::with_capacity(36);
    for (normal, u, v) in faces {
        let base = vertices.len() as u32;
        for (corner, tex_coord) in corners {
            let position = [0usize, 1, 2].map(|axis| {
                h * (normal[axis] + corner[0] * u[axis] + corner[1] * v[axis])
            });
            vertices.push(Vertex::new(position, normal, tex_coord));
        }
        indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    Mesh::new(vertices, indices)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn sample_mesh() -> Mesh {
        let vertices = vec![
            Vertex::new([0.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 0.0]),
            Vertex::new([1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [1.0, 0.0]),
            Vertex::new([0.0, 1.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0]),
        ];
        Mesh::new(vertices, vec![0, 1, 2]).with_material(3, "tex_crate_wood")
    }

    #[test]
    fn test_vertex_layout() {
        let vertex = Vertex::new([1.0, 2.0, 3.0], [4.0, 5.0, 6.0], [7.0, 8.0]);
        let mut bytes = Vec::new();
        vertex.write(&mut bytes).unwrap();

        assert_eq!(bytes.len(), 32);
        let expected: Vec<u8> = [1.0f32, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0]
            .iter()
            .flat_map(|f| f.to_ne_bytes())
            .collect();
        assert_eq!(bytes, expected);

        let decoded = Vertex::read(&mut Cursor::new(bytes)).unwrap();
        assert_eq!(decoded, vertex);
    }

    #[test]
    fn test_mesh_size_matches_encoding() {
        let mesh = sample_mesh();
        let mut bytes = Vec::new();
        mesh.write(&mut bytes).unwrap();

        assert_eq!(bytes.len(), mesh.size());
        // 8 + 4 + ("tex_crate_wood" + NUL) + 8 + 3 * 32 + 8 + 3 * 4
        assert_eq!(mesh.size(), 8 + 4 + 15 + 8 + 96 + 8 + 12);

        let stored_size = u64::from_ne_bytes(bytes[0..8].try_into().unwrap());
        assert_eq!(stored_size as usize, mesh.size());
    }

    #[test]
    fn test_mesh_reencodes_identically() {
        let mesh = sample_mesh();
        let mut bytes = Vec::new();
        mesh.write(&mut bytes).unwrap();

        let decoded = Mesh::read(&mut Cursor::new(&bytes)).unwrap();
        assert_eq!(decoded, mesh);
        assert_eq!(decoded.material_index, 3);

        let mut reencoded = Vec::new();
        decoded.write(&mut reencoded).unwrap();
        assert_eq!(reencoded, bytes);
    }

    #[test]
    fn test_mesh_reserved_size_is_not_trusted() {
        let mesh = sample_mesh();
        let mut bytes = Vec::new();
        mesh.write(&mut bytes).unwrap();
        bytes[0..8].copy_from_slice(&0u64.to_ne_bytes());

        let decoded = Mesh::read(&mut Cursor::new(&bytes)).unwrap();
        assert_eq!(decoded.vertices.len(), 3);
        assert_eq!(decoded.indices, vec![0, 1, 2]);
    }

    #[test]
    fn test_mesh_without_material() {
        let mesh = Mesh::new(Vec::new(), Vec::new());
        assert!(!mesh.has_material());
        assert_eq!(mesh.material_index, Mesh::NO_MATERIAL);
        assert_eq!(mesh.size(), 8 + 4 + 1 + 8 + 8);
    }

    #[test]
    fn test_truncated_mesh_fails() {
        let mesh = sample_mesh();
        let mut bytes = Vec::new();
        mesh.write(&mut bytes).unwrap();
        bytes.truncate(bytes.len() - 1);

        let result = Mesh::read(&mut Cursor::new(&bytes));
        assert!(matches!(result, Err(FormatError::Truncated("index data"))));
    }

    #[test]
    fn test_model_size_and_counts() {
        let model = Model3D::new(vec![sample_mesh(), cube(1.0)]);
        let mut bytes = Vec::new();
        model.write(&mut bytes).unwrap();

        assert_eq!(bytes.len(), model.size());
        assert_eq!(model.vertex_count(), 3 + 24);
        assert_eq!(model.index_count(), 3 + 36);
        assert_eq!(model.material_names().collect::<Vec<_>>(), vec!["tex_crate_wood"]);

        let decoded = Model3D::read(&mut Cursor::new(&bytes)).unwrap();
        assert_eq!(decoded, model);
    }

    #[test]
    fn test_cube_geometry() {
        let mesh = cube(2.0);
        assert_eq!(mesh.vertices.len(), 24);
        assert_eq!(mesh.indices.len(), 36);
        assert!(mesh.indices.iter().all(|&i| (i as usize) < mesh.vertices.len()));
        for vertex in &mesh.vertices {
            assert!(vertex.position.iter().all(|c| (c.abs() - 1.0).abs() < 1e-6));
        }
    }
}
