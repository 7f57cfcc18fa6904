//! Opal scene packs.
//!
//! A [`Scene`] is a named registry of 3D models and raw textures. Scenes are
//! built by importing source assets (directly or from a JSON [`Manifest`]) and
//! persisted as a single binary scene pack (see [`format`]).

pub mod codec;
pub mod format;
pub mod geometry;
pub mod import;
pub mod loader;
pub mod manifest;
pub mod scene;
pub mod texture;

pub use format::{FormatError, ResourceKind, DEFAULT_OUTPUT};
pub use geometry::{Mesh, Model3D, Vertex};
pub use import::{ImportConfig, ImportError, Importer};
pub use loader::{load_scene, DetectedFormat};
pub use manifest::Manifest;
pub use scene::{Scene, SceneError, SceneInfo};
pub use texture::Texture;
