//! Options methods for FieldRenderEngine

use std::path::Path;

use super::FieldRenderEngine;
use crate::error::CubefieldError;
use crate::options::Options;

impl FieldRenderEngine {
    /// Current options.
    #[must_use]
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Replace options and apply all changes to subsystems.
    ///
    /// A changed `stride` or `gap` rebuilds the field; every other field
    /// setting keeps the instances where they are. The camera orbit is only
    /// restarted when the camera section itself changed.
    pub fn set_options(&mut self, new: Options) {
        let camera_changed = new.camera != self.options.camera;
        self.options = new;

        self.apply_field();
        if camera_changed {
            self.camera_controller.apply_options(&self.options.camera);
            self.camera_controller.update_gpu(&self.context.queue);
        }
        self.lighting.apply_options(
            &self.context.device,
            &self.context.queue,
            &self.options.lighting,
        );
        self.post_process
            .apply_options(&self.context, &self.options.post_processing);
        self.apply_display();
        self.input
            .set_key_bindings(self.options.keybindings.clone());
    }

    /// Load a TOML preset and apply it.
    ///
    /// # Errors
    ///
    /// Returns [`CubefieldError`] if the file cannot be read or parsed; the
    /// current options stay in place.
    pub fn load_preset(&mut self, path: &Path) -> Result<(), CubefieldError> {
        let options = Options::load(path)?;
        self.set_options(options);
        Ok(())
    }

    /// Push field options to the animator, re-uploading instances after a
    /// rebuild.
    fn apply_field(&mut self) {
        if self.field.set_options(&self.options.field) {
            self.cubes.update_instances(&self.context, &self.field);
        }
        self.options.field.stride = self.field.stride();
    }

    /// Push presentation options to the surface and frame clock.
    fn apply_display(&mut self) {
        let display = &self.options.display;
        let render_scale = display.render_scale;
        self.context.set_vsync(display.vsync);
        self.frame_timing.set_target_fps(display.target_fps);
        if render_scale > 0 {
            self.set_render_scale(render_scale);
        }
    }
}
