//! Input and command dispatch for FieldRenderEngine

use super::command::FieldCommand;
use super::FieldRenderEngine;
use crate::input::{pointer_ndc, InputEvent};

impl FieldRenderEngine {
    /// Process a platform-agnostic input event.
    ///
    /// Cursor motion also moves the pointer the field reacts to; leaving the
    /// window keeps the last pointer. Drags and scrolling are translated into
    /// [`FieldCommand`]s and executed immediately.
    ///
    /// Returns `true` if the event produced a command that changed state.
    ///
    /// # Example
    ///
    /// ```ignore
    /// engine.handle_input(InputEvent::CursorMoved { x, y });
    /// engine.handle_input(InputEvent::Scroll { delta: 1.0 });
    /// ```
    pub fn handle_input(&mut self, event: InputEvent) -> bool {
        if let Some(cursor) = event.cursor_position() {
            let (width, height) = self.context.size();
            self.pointer =
                pointer_ndc(cursor.x, cursor.y, width as f32, height as f32);
        }
        self.input
            .handle_event(event)
            .is_some_and(|command| self.execute(command))
    }

    /// Look up a physical key (in `winit::keyboard::KeyCode` debug format)
    /// and execute its bound command. Returns `true` if state changed.
    pub fn handle_key_press(&mut self, key: &str) -> bool {
        self.input
            .handle_key_press(key)
            .is_some_and(|command| self.execute(command))
    }

    /// Perform a single command. Returns `true` if anything changed.
    pub fn execute(&mut self, command: FieldCommand) -> bool {
        if let Some(stride) = command
            .target_stride(self.field.stride(), self.options.field.stride_limit())
        {
            return self.set_stride(stride);
        }
        match command {
            FieldCommand::RotateCamera { delta } => {
                self.camera_controller.rotate(delta);
                true
            }
            FieldCommand::PanCamera { delta } => {
                self.camera_controller.pan(delta);
                true
            }
            FieldCommand::Zoom { delta } => self.camera_controller.zoom(delta),
            FieldCommand::RecenterCamera => {
                self.camera_controller.reset();
                true
            }
            FieldCommand::ToggleRotation => {
                let rotating = self.field.toggle_rotation();
                log::info!(
                    "field rotation {}",
                    if rotating { "resumed" } else { "paused" }
                );
                true
            }
            FieldCommand::SetStride { .. }
            | FieldCommand::GrowStride
            | FieldCommand::ShrinkStride => false,
        }
    }

    /// Rebuild the lattice at `stride`, keeping the gap.
    fn set_stride(&mut self, stride: u32) -> bool {
        if stride == self.field.stride() {
            return false;
        }
        self.options.field.stride = stride;
        self.field.rebuild(stride, self.options.field.gap);
        self.cubes.update_instances(&self.context, &self.field);
        true
    }
}
