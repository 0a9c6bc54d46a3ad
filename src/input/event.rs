use glam::Vec2;

/// Pixels of trackpad scroll that count as one wheel line.
pub const PIXELS_PER_LINE: f32 = 100.0;

/// Window input the engine understands, independent of the windowing
/// library.
///
/// Hosts translate their own events into these and hand them to
/// [`FieldRenderEngine::handle_input`](crate::engine::FieldRenderEngine::handle_input),
/// or drive an [`InputProcessor`](super::InputProcessor) themselves:
///
/// ```ignore
/// let event = InputEvent::CursorMoved { x: 100.0, y: 200.0 };
/// if let Some(command) = processor.handle_event(event) {
///     engine.execute(command);
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// The cursor is at a new position.
    CursorMoved {
        /// Physical pixels from the left edge.
        x: f32,
        /// Physical pixels from the top edge.
        y: f32,
    },
    /// A mouse button changed state.
    MouseButton {
        /// The button.
        button: MouseButton,
        /// `true` on press, `false` on release.
        pressed: bool,
    },
    /// Wheel or trackpad scroll, in lines.
    Scroll {
        /// Positive scrolls away from the user (zoom in).
        delta: f32,
    },
    /// Shift was pressed or released.
    ModifiersChanged {
        /// Whether shift is now held.
        shift: bool,
    },
    /// The cursor left the window; any drag in progress ends.
    CursorLeft,
}

impl InputEvent {
    /// Cursor position carried by the event, if any.
    #[must_use]
    pub fn cursor_position(&self) -> Option<Vec2> {
        match *self {
            Self::CursorMoved { x, y } => Some(Vec2::new(x, y)),
            _ => None,
        }
    }

    /// Scroll event from a pixel delta (trackpads).
    #[must_use]
    pub fn scroll_pixels(dy: f32) -> Self {
        Self::Scroll {
            delta: dy / PIXELS_PER_LINE,
        }
    }
}

/// Mouse buttons the orbit controls distinguish.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    /// Rotates the orbit (pans while shift is held).
    Left,
    /// Pans the orbit.
    Right,
    /// Ignored by the orbit controls.
    Middle,
}

#[cfg(feature = "viewer")]
impl From<winit::event::MouseButton> for MouseButton {
    fn from(button: winit::event::MouseButton) -> Self {
        match button {
            winit::event::MouseButton::Right => Self::Right,
            winit::event::MouseButton::Middle => Self::Middle,
            _ => Self::Left,
        }
    }
}

#[cfg(feature = "viewer")]
impl From<winit::event::MouseScrollDelta> for InputEvent {
    fn from(delta: winit::event::MouseScrollDelta) -> Self {
        match delta {
            winit::event::MouseScrollDelta::LineDelta(_, y) => {
                Self::Scroll { delta: y }
            }
            winit::event::MouseScrollDelta::PixelDelta(pos) => {
                Self::scroll_pixels(pos.y as f32)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_cursor_moves_carry_a_position() {
        let moved = InputEvent::CursorMoved { x: 3.0, y: 4.0 };
        assert_eq!(moved.cursor_position(), Some(Vec2::new(3.0, 4.0)));
        assert_eq!(InputEvent::CursorLeft.cursor_position(), None);
        assert_eq!(
            InputEvent::Scroll { delta: 1.0 }.cursor_position(),
            None
        );
    }

    #[test]
    fn pixel_scroll_converts_to_lines() {
        assert_eq!(
            InputEvent::scroll_pixels(250.0),
            InputEvent::Scroll { delta: 2.5 }
        );
    }
}
