//! Shared utilities: frame-rate independent damping and the frame clock.

pub mod damping;
pub mod frame_timing;
