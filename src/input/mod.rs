//! Input handling: event types, pointer tracking, and the input processor
//! that converts raw window events into field commands.

/// Platform-agnostic input events.
pub mod event;
/// Pointer position tracking and pixel → NDC conversion.
pub(crate) mod mouse;
/// Converts raw events into field commands.
pub mod processor;

pub use event::{InputEvent, MouseButton};
pub use mouse::pointer_ndc;
pub use processor::{InputProcessor, KeyBindings, KeyCommandTag};
