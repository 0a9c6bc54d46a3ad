//! The animated cube field: lattice layout and per-frame cursor response.

pub mod animator;
pub mod lattice;

pub use animator::{
    cursor_target, FieldAnimator, FrameContext, InstanceState, InstanceTarget,
};
pub use lattice::lattice_positions;
