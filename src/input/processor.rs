//! Converts raw platform events into field commands.
//!
//! The `InputProcessor` owns all transient input state (pointer tracking,
//! drag button, modifier keys) and the key-binding map. It is the only thing
//! that sits between raw window events and the engine's
//! [`execute`](crate::engine::FieldRenderEngine::execute) method.

use std::collections::HashMap;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::event::{InputEvent, MouseButton};
use super::mouse::PointerState;
use crate::engine::command::FieldCommand;

/// Maps physical key strings to [`FieldCommand`] variants.
///
/// Key strings use the `winit::keyboard::KeyCode` debug format:
/// `"KeyQ"`, `"Equal"`, `"Minus"`, etc.
///
/// Only discrete commands make sense as key bindings; parameterized
/// commands like `RotateCamera` come from mouse gestures.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct KeyBindings {
    /// Forward map: key string → command tag.
    bindings: HashMap<String, KeyCommandTag>,
}

/// Serializable tag for the subset of [`FieldCommand`] that can be
/// key-bound (discrete, parameterless actions).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyCommandTag {
    /// Restore the initial camera orbit.
    RecenterCamera,
    /// Add one cube per lattice edge.
    GrowStride,
    /// Remove one cube per lattice edge.
    ShrinkStride,
    /// Pause or resume the group rotation.
    ToggleRotation,
}

impl KeyCommandTag {
    fn to_command(self) -> FieldCommand {
        match self {
            Self::RecenterCamera => FieldCommand::RecenterCamera,
            Self::GrowStride => FieldCommand::GrowStride,
            Self::ShrinkStride => FieldCommand::ShrinkStride,
            Self::ToggleRotation => FieldCommand::ToggleRotation,
        }
    }
}

impl Default for KeyBindings {
    fn default() -> Self {
        let bindings = HashMap::from([
            ("KeyQ".into(), KeyCommandTag::RecenterCamera),
            ("Equal".into(), KeyCommandTag::GrowStride),
            ("Minus".into(), KeyCommandTag::ShrinkStride),
            ("KeyP".into(), KeyCommandTag::ToggleRotation),
        ]);
        Self { bindings }
    }
}

impl KeyBindings {
    /// Look up the command for a physical key string.
    #[must_use]
    pub fn lookup(&self, key: &str) -> Option<FieldCommand> {
        self.bindings.get(key).map(|tag| tag.to_command())
    }

    /// Bind `key` to `tag`, replacing any previous binding for that key.
    pub fn bind(&mut self, key: impl Into<String>, tag: KeyCommandTag) {
        let _ = self.bindings.insert(key.into(), tag);
    }
}

/// Converts raw window events into [`FieldCommand`]s.
///
/// Left-drag rotates the orbit, right-drag (or shift + left-drag) pans,
/// and the scroll wheel produces [`FieldCommand::Zoom`], which the camera
/// ignores while zoom is disabled.
pub struct InputProcessor {
    pointer: PointerState,
    shift_pressed: bool,
    key_bindings: KeyBindings,
}

impl InputProcessor {
    /// Create a new processor with default key bindings.
    #[must_use]
    pub fn new() -> Self {
        Self::with_key_bindings(KeyBindings::default())
    }

    /// Create a processor with custom key bindings.
    #[must_use]
    pub fn with_key_bindings(key_bindings: KeyBindings) -> Self {
        Self {
            pointer: PointerState::new(),
            shift_pressed: false,
            key_bindings,
        }
    }

    /// Last known cursor position in physical pixels, if the cursor is over
    /// the window.
    #[must_use]
    pub fn cursor_position(&self) -> Option<Vec2> {
        self.pointer.position
    }

    /// Whether a drag is in progress.
    #[must_use]
    pub fn dragging(&self) -> bool {
        self.pointer.drag_button.is_some()
    }

    /// Whether the shift modifier is held.
    #[must_use]
    pub fn shift_pressed(&self) -> bool {
        self.shift_pressed
    }

    /// Replace the key bindings (e.g. after loading a preset).
    pub fn set_key_bindings(&mut self, key_bindings: KeyBindings) {
        self.key_bindings = key_bindings;
    }

    /// Look up a key press and return the corresponding command, if bound.
    #[must_use]
    pub fn handle_key_press(&self, key: &str) -> Option<FieldCommand> {
        self.key_bindings.lookup(key)
    }

    /// Process a raw input event and return zero or one commands.
    pub fn handle_event(&mut self, event: InputEvent) -> Option<FieldCommand> {
        match event {
            InputEvent::CursorMoved { x, y } => self.handle_cursor_moved(x, y),
            InputEvent::MouseButton { button, pressed } => {
                if pressed {
                    self.pointer.press(button);
                } else {
                    self.pointer.release(button);
                }
                None
            }
            InputEvent::Scroll { delta } => Some(FieldCommand::Zoom { delta }),
            InputEvent::ModifiersChanged { shift } => {
                self.shift_pressed = shift;
                None
            }
            InputEvent::CursorLeft => {
                self.pointer.leave();
                None
            }
        }
    }

    fn handle_cursor_moved(&mut self, x: f32, y: f32) -> Option<FieldCommand> {
        let delta = self.pointer.move_to(x, y);
        if delta == Vec2::ZERO {
            return None;
        }
        match self.pointer.drag_button? {
            MouseButton::Left if !self.shift_pressed => {
                Some(FieldCommand::RotateCamera { delta })
            }
            MouseButton::Left | MouseButton::Right => {
                Some(FieldCommand::PanCamera { delta })
            }
            MouseButton::Middle => None,
        }
    }
}

impl Default for InputProcessor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn moved(x: f32, y: f32) -> InputEvent {
        InputEvent::CursorMoved { x, y }
    }

    fn button(button: MouseButton, pressed: bool) -> InputEvent {
        InputEvent::MouseButton { button, pressed }
    }

    #[test]
    fn hover_produces_no_command() {
        let mut input = InputProcessor::new();
        assert_eq!(input.handle_event(moved(10.0, 10.0)), None);
        assert_eq!(input.handle_event(moved(20.0, 30.0)), None);
        assert_eq!(input.cursor_position(), Some(Vec2::new(20.0, 30.0)));
    }

    #[test]
    fn left_drag_rotates() {
        let mut input = InputProcessor::new();
        let _ = input.handle_event(moved(10.0, 10.0));
        let _ = input.handle_event(button(MouseButton::Left, true));
        assert!(input.dragging());
        assert_eq!(
            input.handle_event(moved(15.0, 8.0)),
            Some(FieldCommand::RotateCamera {
                delta: Vec2::new(5.0, -2.0)
            })
        );
        let _ = input.handle_event(button(MouseButton::Left, false));
        assert_eq!(input.handle_event(moved(20.0, 8.0)), None);
    }

    #[test]
    fn right_drag_and_shift_drag_pan() {
        let mut input = InputProcessor::new();
        let _ = input.handle_event(moved(0.0, 0.0));
        let _ = input.handle_event(button(MouseButton::Right, true));
        assert!(matches!(
            input.handle_event(moved(4.0, 0.0)),
            Some(FieldCommand::PanCamera { .. })
        ));
        let _ = input.handle_event(button(MouseButton::Right, false));

        let _ = input.handle_event(InputEvent::ModifiersChanged { shift: true });
        let _ = input.handle_event(button(MouseButton::Left, true));
        assert!(matches!(
            input.handle_event(moved(4.0, 4.0)),
            Some(FieldCommand::PanCamera { .. })
        ));
    }

    #[test]
    fn scroll_maps_to_zoom() {
        let mut input = InputProcessor::new();
        assert_eq!(
            input.handle_event(InputEvent::Scroll { delta: 1.5 }),
            Some(FieldCommand::Zoom { delta: 1.5 })
        );
    }

    #[test]
    fn leaving_window_cancels_drag() {
        let mut input = InputProcessor::new();
        let _ = input.handle_event(moved(0.0, 0.0));
        let _ = input.handle_event(button(MouseButton::Left, true));
        let _ = input.handle_event(InputEvent::CursorLeft);
        assert!(!input.dragging());
        assert_eq!(input.handle_event(moved(50.0, 50.0)), None);
    }

    #[test]
    fn key_bindings_resolve_and_rebind() {
        let mut input = InputProcessor::new();
        assert_eq!(
            input.handle_key_press("KeyP"),
            Some(FieldCommand::ToggleRotation)
        );
        assert_eq!(input.handle_key_press("KeyZ"), None);

        let mut bindings = KeyBindings::default();
        bindings.bind("KeyZ", KeyCommandTag::ShrinkStride);
        input.set_key_bindings(bindings);
        assert_eq!(
            input.handle_key_press("KeyZ"),
            Some(FieldCommand::ShrinkStride)
        );
    }
}
