//! CPU mesh generation.

/// Rounded box mesh used for every cube instance.
pub mod rounded_box;

pub use rounded_box::{rounded_box, MeshVertex, RoundedBoxMesh};
