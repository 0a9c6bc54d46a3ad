//! Post-processing effect passes.
//!
//! Provides screen-space ambient occlusion (SSAO), mip-chain bloom, and the
//! tone-mapping composite that writes the final image.

pub mod bloom;
pub mod composite;
pub(crate) mod post_process;
pub mod screen_pass;
pub mod ssao;

pub use post_process::SceneTargets;
