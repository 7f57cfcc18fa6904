//! Scene pack serialization.
//!
//! This module provides serialization and deserialization of a [`Scene`] to the
//! OPL scene pack binary format (.opl). A pack holds the scene name and every
//! resource in both resource tables, and is always read or written in full.
//!
//! # File Structure
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │ HEADER                                                       │
//! │  Magic: b"OPL" (3 bytes)                                     │
//! │  Version: u16                                                │
//! │  Scene name: null-terminated string                          │
//! ├──────────────────────────────────────────────────────────────┤
//! │ MODELS                                                       │
//! │  Count: u64                                                  │
//! │  Records: tag 0x01, name, mesh count (u64), meshes           │
//! ├──────────────────────────────────────────────────────────────┤
//! │ TEXTURES                                                     │
//! │  Count: u64                                                  │
//! │  Records: tag 0x02, name, width (u32), height (u32), pixels  │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! All multi-byte scalars are in the byte order of the host that wrote the pack.
//! There is no endianness marker, so a pack is only portable between hosts of
//! the same byte order.
//!
//! Every record carries its own type tag and internal counts, which would let a
//! future reader skip record types it does not know. The current reader does not:
//! a tag that does not match its table is a hard error.

use std::ffi::OsString;
use std::fmt;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use log::{debug, info};
use thiserror::Error;

use crate::codec;
use crate::geometry::Model3D;
use crate::scene::{Scene, SceneError};
use crate::texture::Texture;

// ============================================================================
// Constants
// ============================================================================

/// Magic tag identifying scene packs: "OPL" in ASCII.
pub const MAGIC: [u8; 3] = *b"OPL";

/// Current format version.
pub const VERSION: u16 = 1;

/// File name a compiled pack is written to when no other is given.
pub const DEFAULT_OUTPUT: &str = "output.opl";

// ============================================================================
// Error Types
// ============================================================================

/// Errors that can occur while encoding or decoding a scene pack.
#[derive(Debug, Error)]
pub enum FormatError {
    #[error("Invalid magic tag")]
    InvalidMagic,

    #[error("Unsupported version: {0}")]
    UnsupportedVersion(u16),

    #[error("Unexpected end of pack while reading {0}")]
    Truncated(&'static str),

    #[error("Unexpected resource tag 0x{found:02X} in {table} table")]
    UnexpectedResourceTag { table: ResourceKind, found: u8 },

    #[error("{kind} {name} is duplicated in pack")]
    DuplicateResource { kind: ResourceKind, name: String },

    #[error("{what} count {count} is too large")]
    CountOverflow { what: &'static str, count: u64 },

    #[error("Texture dimensions {width}x{height} are too large")]
    TextureSizeOverflow { width: u32, height: u32 },

    #[error("Invalid UTF-8 in {0}")]
    InvalidString(&'static str),

    #[error("Name {0:?} contains a NUL byte")]
    EmbeddedNul(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

// ============================================================================
// Resource Types
// ============================================================================

/// Identifies the type of a resource record.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Model3D = 0x01,
    Texture = 0x02,
}

impl ResourceKind {
    /// The type tag written in front of each record.
    pub fn tag(self) -> u8 {
        self as u8
    }

    /// Lowercase name used on the command line and in manifests.
    pub fn keyword(self) -> &'static str {
        match self {
            ResourceKind::Model3D => "model3d",
            ResourceKind::Texture => "texture",
        }
    }
}

impl TryFrom<u8> for ResourceKind {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0x01 => Ok(ResourceKind::Model3D),
            0x02 => Ok(ResourceKind::Texture),
            _ => Err(value),
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceKind::Model3D => f.write_str("Model3D"),
            ResourceKind::Texture => f.write_str("Texture"),
        }
    }
}

/// A resource type keyword that is neither `model3d` nor `texture`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown resource type {0}")]
pub struct UnknownResourceKind(pub String);

impl FromStr for ResourceKind {
    type Err = UnknownResourceKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "model3d" => Ok(ResourceKind::Model3D),
            "texture" => Ok(ResourceKind::Texture),
            other => Err(UnknownResourceKind(other.to_string())),
        }
    }
}

// ============================================================================
// Header & Records
// ============================================================================

/// Header at the start of every pack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackHeader {
    pub version: u16,
    pub scene_name: String,
}

impl PackHeader {
    pub fn new(scene_name: impl Into<String>) -> Self {
        Self {
            version: VERSION,
            scene_name: scene_name.into(),
        }
    }

    /// Encoded size in bytes.
    pub fn size(&self) -> usize {
        MAGIC.len() + std::mem::size_of::<u16>() + self.scene_name.len() + 1
    }

    pub fn write<W: Write>(&self, writer: &mut W) -> Result<(), FormatError> {
        codec::write_bytes(writer, &MAGIC)?;
        codec::write_pod(writer, &self.version)?;
        codec::write_cstring(writer, &self.scene_name)
    }

    pub fn read<R: BufRead>(reader: &mut R) -> Result<Self, FormatError> {
        let magic: [u8; 3] = codec::read_pod(reader, "magic tag")?;
        if magic != MAGIC {
            return Err(FormatError::InvalidMagic);
        }

        let version: u16 = codec::read_pod(reader, "version")?;
        if version > VERSION {
            return Err(FormatError::UnsupportedVersion(version));
        }

        let scene_name = codec::read_cstring(reader, "scene name")?;
        Ok(Self {
            version,
            scene_name,
        })
    }
}

/// One tagged resource record of a pack.
#[derive(Debug, Clone, PartialEq)]
pub enum ResourceRecord {
    Model { name: String, model: Model3D },
    Texture { name: String, texture: Texture },
}

impl ResourceRecord {
    pub fn kind(&self) -> ResourceKind {
        match self {
            ResourceRecord::Model { .. } => ResourceKind::Model3D,
            ResourceRecord::Texture { .. } => ResourceKind::Texture,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            ResourceRecord::Model { name, .. } | ResourceRecord::Texture { name, .. } => name,
        }
    }

    /// Encoded size in bytes, tag and name included.
    pub fn size(&self) -> usize {
        let body = match self {
            ResourceRecord::Model { model, .. } => model.size(),
            ResourceRecord::Texture { texture, .. } => 2 * std::mem::size_of::<u32>() + texture.size(),
        };
        1 + self.name().len() + 1 + body
    }

    /// Reads one record that must belong to the `table` resource table.
    ///
    /// The tag is checked before the body is parsed, so a record of the wrong
    /// type is rejected without interpreting its payload.
    pub fn read<R: BufRead>(reader: &mut R, table: ResourceKind) -> Result<Self, FormatError> {
        let tag: u8 = codec::read_pod(reader, "resource tag")?;
        let kind = ResourceKind::try_from(tag)
            .ok()
            .filter(|&kind| kind == table)
            .ok_or(FormatError::UnexpectedResourceTag { table, found: tag })?;

        let name = codec::read_cstring(reader, "resource name")?;
        let record = match kind {
            ResourceKind::Model3D => ResourceRecord::Model {
                name,
                model: Model3D::read(reader)?,
            },
            ResourceKind::Texture => ResourceRecord::Texture {
                name,
                texture: Texture::read(reader)?,
            },
        };
        debug!("Read {} {}", record.kind(), record.name());
        Ok(record)
    }

    pub fn write<W: Write>(&self, writer: &mut W) -> Result<(), FormatError> {
        write_record(writer, self.kind(), self.name(), |w| match self {
            ResourceRecord::Model { model, .. } => model.write(w),
            ResourceRecord::Texture { texture, .. } => texture.write(w),
        })
    }
}

fn write_record<W, F>(writer: &mut W, kind: ResourceKind, name: &str, body: F) -> Result<(), FormatError>
where
    W: Write,
    F: FnOnce(&mut W) -> Result<(), FormatError>,
{
    codec::write_pod(writer, &kind.tag())?;
    codec::write_cstring(writer, name)?;
    body(writer)
}

// ============================================================================
// Scene Serialization
// ============================================================================

impl Scene {
    /// Writes the whole scene as a pack: header, every model, every texture.
    ///
    /// Resources are written in table iteration order, which is not stable
    /// between runs. The registry is never modified.
    pub fn encode<W: Write>(&self, writer: &mut W) -> Result<(), FormatError> {
        PackHeader::new(self.name()).write(writer)?;

        codec::write_count(writer, self.model_count())?;
        for (name, model) in self.models() {
            debug!("Writing Model3D {}", name);
            write_record(writer, ResourceKind::Model3D, name, |w| model.write(w))?;
        }

        codec::write_count(writer, self.texture_count())?;
        for (name, texture) in self.textures() {
            debug!("Writing Texture {}", name);
            write_record(writer, ResourceKind::Texture, name, |w| texture.write(w))?;
        }

        Ok(())
    }

    /// Reads a whole pack into a new scene.
    ///
    /// Mesh material names are taken as stored; packs are trusted not to
    /// reference missing textures.
    pub fn decode<R: BufRead>(reader: &mut R) -> Result<Scene, SceneError> {
        let header = PackHeader::read(reader)?;
        info!("Loading scene {}", header.scene_name);
        let mut scene = Scene::new(header.scene_name);

        let model_count = codec::read_count(reader, "model count")?;
        for _ in 0..model_count {
            scene.insert_record(ResourceRecord::read(reader, ResourceKind::Model3D)?)?;
        }

        let texture_count = codec::read_count(reader, "texture count")?;
        for _ in 0..texture_count {
            scene.insert_record(ResourceRecord::read(reader, ResourceKind::Texture)?)?;
        }

        Ok(scene)
    }

    /// Serializes the scene to pack bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>, FormatError> {
        let mut bytes = Vec::new();
        self.encode(&mut bytes)?;
        Ok(bytes)
    }

    /// Deserializes a scene from pack bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Scene, SceneError> {
        let mut reader = bytes;
        Self::decode(&mut reader)
    }

    /// Saves the scene as a pack file, replacing any existing file.
    ///
    /// The pack is encoded in memory and written to a sibling staging file that
    /// is renamed over `path`, so a failed save leaves the old file untouched.
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<(), FormatError> {
        let path = path.as_ref();
        info!("Compiling {} to {}", self.name(), path.display());
        let bytes = self.to_bytes()?;

        let staging = staging_path(path);
        let written = std::fs::write(&staging, &bytes).and_then(|()| std::fs::rename(&staging, path));
        if let Err(e) = written {
            let _ = std::fs::remove_file(&staging);
            return Err(e.into());
        }
        debug!("Wrote {} bytes", bytes.len());
        Ok(())
    }

    /// Loads a scene from a pack file.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Scene, SceneError> {
        let mut reader = BufReader::new(std::fs::File::open(path)?);
        Self::decode(&mut reader)
    }
}

/// `<path>.tmp`, next to `path` so the final rename stays on one filesystem.
fn staging_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(OsString::from).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

// ============================================================================
// Tests
// ============================================================================
