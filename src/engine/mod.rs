//! The cube field engine: GPU resources, per-frame update and draw.

pub mod command;
mod input;
mod options;

use glam::Vec2;

use crate::camera::controller::CameraController;
use crate::error::CubefieldError;
use crate::field::{FieldAnimator, FrameContext};
use crate::gpu::lighting::Lighting;
use crate::gpu::render_context::RenderContext;
use crate::gpu::shader_composer::ShaderComposer;
use crate::input::InputProcessor;
use crate::options::Options;
use crate::renderer::cube::{CubeBindGroups, CubeRenderer};
use crate::renderer::postprocess::post_process::PostProcessStack;
use crate::renderer::shadow::ShadowPass;
use crate::util::frame_timing::FrameTiming;

/// Render scale picked when the configured value is 0: supersample standard
/// DPI displays, render HiDPI displays natively.
#[must_use]
pub fn effective_render_scale(configured: u32, scale_factor: f64) -> u32 {
    match configured {
        0 if scale_factor < 2.0 => 2,
        0 => 1,
        scale => scale,
    }
}

/// The rendering engine for the cube field.
///
/// Owns the GPU context, the orbit camera, the spot light and its shadow
/// map, the instance animator, and the geometry → SSAO → bloom → composite
/// pipeline.
///
/// # Frame loop
///
/// Each frame, call [`render`](Self::render) to advance the animation, draw
/// and present. Call [`resize`](Self::resize) when the window size changes.
/// Raw input is forwarded via [`handle_input`](Self::handle_input); commands
/// can also be issued directly with [`execute`](Self::execute).
///
/// For headless or embedded use, drive [`update`](Self::update) with your
/// own clock and draw with [`render_to_texture`](Self::render_to_texture).
pub struct FieldRenderEngine {
    /// Core wgpu device, queue, and surface.
    pub context: RenderContext,
    _shader_composer: ShaderComposer,

    /// Orbital camera controller.
    pub camera_controller: CameraController,
    /// Spot light uniform and shadow map.
    pub lighting: Lighting,
    /// Per-instance cursor response.
    pub(crate) field: FieldAnimator,
    /// Instanced rounded-box draw.
    pub(crate) cubes: CubeRenderer,
    /// Depth-only pass from the spot light.
    pub(crate) shadow_pass: ShadowPass,
    /// SSAO, bloom and composite.
    pub(crate) post_process: PostProcessStack,

    /// Raw event → command translation.
    input: InputProcessor,
    /// Pointer in normalized device coordinates.
    pointer: Vec2,
    /// Seconds of animation time accumulated by `update`.
    elapsed: f32,
    /// Frame limiting and FPS tracking.
    pub(crate) frame_timing: FrameTiming,
    /// Scene, camera, lighting and presentation options.
    options: Options,
}

impl FieldRenderEngine {
    /// Engine drawing into a window surface.
    ///
    /// # Errors
    ///
    /// Returns [`CubefieldError`] if GPU initialization or shader
    /// composition fails.
    pub async fn new(
        window: impl Into<wgpu::SurfaceTarget<'static>>,
        size: (u32, u32),
        scale_factor: f64,
        options: Options,
    ) -> Result<Self, CubefieldError> {
        let context =
            RenderContext::new(window, size, options.display.vsync).await?;
        Self::new_from_context(context, scale_factor, options)
    }

    /// Engine from a pre-built [`RenderContext`] (for embedding or headless
    /// rendering).
    ///
    /// Use [`RenderContext::from_device`] to create a surface-less context
    /// from an externally-owned `wgpu::Device` and `wgpu::Queue`.
    ///
    /// # Errors
    ///
    /// Returns [`CubefieldError`] if a shader fails to compose.
    pub fn new_from_context(
        mut context: RenderContext,
        scale_factor: f64,
        mut options: Options,
    ) -> Result<Self, CubefieldError> {
        context.render_scale =
            effective_render_scale(options.display.render_scale, scale_factor);

        let mut shader_composer = ShaderComposer::new()?;
        let camera_controller = CameraController::new(
            &context.device,
            context.size(),
            &options.camera,
        );
        let lighting = Lighting::new(&context.device, &options.lighting);
        let field = FieldAnimator::new(&options.field);
        options.field.stride = field.stride();

        let mut cubes = CubeRenderer::new(
            &context,
            &mut shader_composer,
            &camera_controller.layout,
            &lighting.layout,
            field.len(),
        )?;
        cubes.update_instances(&context, &field);
        let shadow_pass =
            ShadowPass::new(&context, &mut shader_composer, &lighting)?;
        let post_process = PostProcessStack::new(
            &context,
            &mut shader_composer,
            &options.post_processing,
        )?;

        let (width, height) = context.size();
        log::info!(
            "cube field engine ready: {width}x{height} at {}x scale, {} instances",
            context.render_scale,
            field.len()
        );

        Ok(Self {
            input: InputProcessor::with_key_bindings(
                options.keybindings.clone(),
            ),
            frame_timing: FrameTiming::new(options.display.target_fps),
            context,
            _shader_composer: shader_composer,
            camera_controller,
            lighting,
            field,
            cubes,
            shadow_pass,
            post_process,
            pointer: Vec2::ZERO,
            elapsed: 0.0,
            options,
        })
    }

    /// Advance the animation by `dt` seconds: run the field animator against
    /// the current pointer and camera, then upload instances and the camera
    /// uniform.
    pub fn update(&mut self, dt: f32) {
        self.elapsed += dt.max(0.0);
        let frame = FrameContext {
            pointer: self.pointer,
            camera: &self.camera_controller.camera,
            elapsed: self.elapsed,
        };
        self.field.update(&frame, dt);
        self.cubes.update_instances(&self.context, &self.field);
        self.camera_controller.update_gpu(&self.context.queue);
    }

    /// Encode the main geometry render pass.
    fn encode_geometry_pass(&self, encoder: &mut wgpu::CommandEncoder) {
        let [r, g, b] = self.options.display.background_linear();
        let targets = &self.post_process.targets;
        let mut rp = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Geometry Pass"),
            color_attachments: &[
                Some(wgpu::RenderPassColorAttachment {
                    view: &targets.color.view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: f64::from(r),
                            g: f64::from(g),
                            b: f64::from(b),
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                }),
                Some(wgpu::RenderPassColorAttachment {
                    view: &targets.normal.view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                }),
            ],
            depth_stencil_attachment: Some(
                wgpu::RenderPassDepthStencilAttachment {
                    view: &targets.depth.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                },
            ),
            ..Default::default()
        });

        self.cubes.draw(
            &mut rp,
            &CubeBindGroups {
                camera: &self.camera_controller.bind_group,
                lighting: &self.lighting.bind_group,
            },
        );
    }

    /// Shadow, geometry and post-processing targeting the given view.
    /// Returns the encoder so the caller can submit it.
    fn render_to_view(&self, view: &wgpu::TextureView) -> wgpu::CommandEncoder {
        let mut encoder = self.context.create_encoder();

        if self.lighting.shadows_enabled() {
            self.shadow_pass
                .render(&mut encoder, &self.lighting, &self.cubes);
        }
        self.encode_geometry_pass(&mut encoder);

        let proj = self.camera_controller.camera.build_projection();
        self.post_process
            .render(&mut encoder, &self.context.queue, proj, view);

        encoder
    }

    /// Execute one frame: advance the animation, draw, and present.
    ///
    /// # Errors
    ///
    /// Returns [`wgpu::SurfaceError`] if the swapchain frame cannot be
    /// acquired.
    pub fn render(&mut self) -> Result<(), wgpu::SurfaceError> {
        if !self.frame_timing.should_render() {
            return Ok(());
        }
        let dt = self.frame_timing.tick();
        self.update(dt);

        let frame = self.context.get_next_frame()?;
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let encoder = self.render_to_view(&view);
        self.context.submit(encoder);
        frame.present();
        Ok(())
    }

    /// Draw the current state into the given texture view (for embedding or
    /// headless capture). The view must use the context's format. No
    /// animation step and no surface present happen here.
    pub fn render_to_texture(&self, view: &wgpu::TextureView) {
        let encoder = self.render_to_view(view);
        self.context.submit(encoder);
    }

    /// Resize the surface, camera projection, and post-processing targets to
    /// the new window size. Zero-sized dimensions are ignored.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.context.resize(width, height);
            self.camera_controller.resize(width, height);
            self.post_process.resize(&self.context);
        }
    }

    /// Change the supersampling factor (clamped to at least 1) and rebuild
    /// the offscreen targets.
    pub fn set_render_scale(&mut self, scale: u32) {
        let scale = scale.max(1);
        if scale != self.context.render_scale {
            self.context.render_scale = scale;
            self.post_process.resize(&self.context);
        }
    }

    /// Pointer position in normalized device coordinates.
    #[must_use]
    pub fn pointer(&self) -> Vec2 {
        self.pointer
    }

    /// Animation time accumulated by [`update`](Self::update), in seconds.
    #[must_use]
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// The instance animator.
    #[must_use]
    pub fn field(&self) -> &FieldAnimator {
        &self.field
    }

    /// Smoothed frames per second.
    #[must_use]
    pub fn fps(&self) -> f32 {
        self.frame_timing.fps()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auto_scale_supersamples_standard_dpi() {
        assert_eq!(effective_render_scale(0, 1.0), 2);
        assert_eq!(effective_render_scale(0, 1.5), 2);
        assert_eq!(effective_render_scale(0, 2.0), 1);
    }

    #[test]
    fn explicit_scale_is_kept() {
        assert_eq!(effective_render_scale(1, 1.0), 1);
        assert_eq!(effective_render_scale(3, 2.0), 3);
    }
}
