// -- Lint policy ---------------------------------------------------------
// Broad groups and cast allowances live in Cargo.toml; these are the
// crate-local additions.

// Documentation
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]
#![deny(rustdoc::bare_urls)]
// No panicking in library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]
// No debug/print artifacts
#![deny(clippy::dbg_macro)]
#![deny(clippy::print_stdout)]
#![deny(clippy::print_stderr)]
// Import hygiene
#![deny(clippy::wildcard_imports)]
// Complexity limits
#![deny(clippy::cognitive_complexity)]
#![deny(clippy::excessive_nesting)]
// Function signature hygiene
#![deny(clippy::too_many_arguments)]
#![deny(clippy::fn_params_excessive_bools)]
// Clone / pass-by-value hygiene
#![deny(clippy::needless_pass_by_value)]
#![deny(clippy::implicit_clone)]
// Unused / redundant code
#![deny(unused_results)]
#![deny(unused_qualifications)]
// Cast hygiene
#![deny(trivial_casts)]
#![deny(trivial_numeric_casts)]

//! A cursor-reactive field of rounded cubes rendered with wgpu.
//!
//! A `stride³` lattice of cubes slowly turns about +Y. Cubes near the point
//! under the cursor are pushed away and tinted blue, then ease back once the
//! cursor moves on. The scene is lit by an ambient term and a shadowed spot
//! light, then post-processed with SSAO and bloom.
//!
//! # Key entry points
//!
//! - [`engine::FieldRenderEngine`] - GPU resources, per-frame update, draw
//! - [`field::FieldAnimator`] - the GPU-free per-instance cursor response
//! - [`options::Options`] - runtime configuration with TOML presets
//! - [`Viewer`] - a ready-made winit window (`viewer` feature)
//!
//! # Frame pipeline
//!
//! shadow map → geometry (HDR color + normals + depth) → SSAO → bloom →
//! composite. All WGSL is composed through naga_oil from shared modules.

pub mod camera;
pub mod engine;
pub mod error;
pub mod field;
pub mod gpu;
pub mod input;
pub mod options;
pub mod renderer;
pub mod util;
#[cfg(feature = "viewer")]
mod viewer;

pub use engine::command::FieldCommand;
pub use engine::FieldRenderEngine;
pub use error::CubefieldError;
pub use input::{InputEvent, InputProcessor, MouseButton};
pub use options::Options;
#[cfg(feature = "viewer")]
pub use viewer::{Viewer, ViewerBuilder};
