//! Camera system for 3D scene viewing.
//!
//! Provides a spherical orbit camera with rotation, panning and optional
//! zoom, plus the cursor unprojection the field animator relies on.

/// Orbit camera controller managing rotation, pan, zoom, and GPU resources.
pub mod controller;
/// Core camera struct and GPU uniform types.
pub mod core;
