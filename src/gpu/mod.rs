//! Low-level wgpu plumbing shared by every pass.
//!
//! Device and surface setup, growable buffers, offscreen targets, the spot
//! light with its shadow map, and naga_oil shader composition.

/// Buffers that reallocate when their contents outgrow them.
pub mod dynamic_buffer;
/// Light uniform, shadow map, and their bind groups.
pub mod lighting;
/// Pipeline and bind group layout helpers for fullscreen passes.
pub mod pipeline_helpers;
/// Device, queue and presentation surface.
pub mod render_context;
/// Composes WGSL modules that `#import` each other.
pub mod shader_composer;
/// Offscreen color and depth targets.
pub mod texture;
