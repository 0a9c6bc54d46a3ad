use glam::Vec2;

use super::event::MouseButton;

/// Convert a cursor position in physical pixels to normalized device
/// coordinates: x right in [-1, 1], y up in [-1, 1].
///
/// Positions outside the viewport map outside that range; nothing is
/// clamped. A zero-sized viewport maps everything to the center.
#[must_use]
pub fn pointer_ndc(px: f32, py: f32, width: f32, height: f32) -> Vec2 {
    if width <= 0.0 || height <= 0.0 {
        return Vec2::ZERO;
    }
    Vec2::new(px / width * 2.0 - 1.0, -(py / height * 2.0 - 1.0))
}

/// Tracks cursor position and which button started the current drag.
pub(crate) struct PointerState {
    pub(crate) position: Option<Vec2>,
    pub(crate) drag_button: Option<MouseButton>,
}

impl PointerState {
    pub(crate) fn new() -> Self {
        Self {
            position: None,
            drag_button: None,
        }
    }

    /// Record the new cursor position and return the delta from the last
    /// one (zero for the first sample).
    pub(crate) fn move_to(&mut self, x: f32, y: f32) -> Vec2 {
        let next = Vec2::new(x, y);
        let delta = self.position.map_or(Vec2::ZERO, |prev| next - prev);
        self.position = Some(next);
        delta
    }

    pub(crate) fn press(&mut self, button: MouseButton) {
        if self.drag_button.is_none() {
            self.drag_button = Some(button);
        }
    }

    pub(crate) fn release(&mut self, button: MouseButton) {
        if self.drag_button == Some(button) {
            self.drag_button = None;
        }
    }

    /// Forget the last position so re-entry does not produce a jump.
    pub(crate) fn leave(&mut self) {
        self.position = None;
        self.drag_button = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ndc_corners_and_center() {
        assert_eq!(pointer_ndc(0.0, 0.0, 800.0, 600.0), Vec2::new(-1.0, 1.0));
        assert_eq!(pointer_ndc(800.0, 600.0, 800.0, 600.0), Vec2::new(1.0, -1.0));
        assert_eq!(pointer_ndc(400.0, 300.0, 800.0, 600.0), Vec2::ZERO);
    }

    #[test]
    fn ndc_is_not_clamped() {
        let p = pointer_ndc(1600.0, -600.0, 800.0, 600.0);
        assert_eq!(p, Vec2::new(3.0, 3.0));
    }

    #[test]
    fn first_move_has_no_delta() {
        let mut state = PointerState::new();
        assert_eq!(state.move_to(10.0, 10.0), Vec2::ZERO);
        assert_eq!(state.move_to(13.0, 6.0), Vec2::new(3.0, -4.0));
    }

    #[test]
    fn release_of_other_button_keeps_drag() {
        let mut state = PointerState::new();
        state.press(MouseButton::Left);
        state.release(MouseButton::Right);
        assert_eq!(state.drag_button, Some(MouseButton::Left));
        state.leave();
        assert!(state.drag_button.is_none());
        assert!(state.position.is_none());
    }
}
