//! Rendering subsystems for the cube field.
//!
//! Contains the instanced cube renderer, the spot light shadow pass, the
//! rounded-box mesh generator, and post-processing effects (SSAO, bloom,
//! composite).

pub mod cube;
pub mod geometry;
pub(crate) mod pipeline_util;
pub mod postprocess;
pub mod shadow;
