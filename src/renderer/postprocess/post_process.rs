use glam::Mat4;

use crate::error::CubefieldError;
use crate::gpu::render_context::RenderContext;
use crate::gpu::shader_composer::ShaderComposer;
use crate::gpu::texture::RenderTarget;
use crate::options::PostProcessingOptions;
use crate::renderer::pipeline_util::{DEPTH_FORMAT, HDR_FORMAT, NORMAL_FORMAT};
use crate::renderer::postprocess::bloom::BloomPass;
use crate::renderer::postprocess::composite::{CompositeInputs, CompositePass};
use crate::renderer::postprocess::screen_pass::ScreenPass;
use crate::renderer::postprocess::ssao::SsaoRenderer;

/// Attachments written by the geometry pass and read by post-processing.
pub struct SceneTargets {
    /// Lit HDR color, cleared to the background.
    pub color: RenderTarget,
    /// View-space normals.
    pub normal: RenderTarget,
    /// Scene depth.
    pub depth: RenderTarget,
}

impl SceneTargets {
    /// Allocate all three targets at the context's render resolution.
    #[must_use]
    pub fn new(context: &RenderContext) -> Self {
        let device = &context.device;
        let size = (context.render_width(), context.render_height());
        Self {
            color: RenderTarget::new(device, "Scene Color", size, HDR_FORMAT),
            normal: RenderTarget::new(device, "Normal G-Buffer", size, NORMAL_FORMAT),
            depth: RenderTarget::new(device, "Depth Texture", size, DEPTH_FORMAT),
        }
    }

    /// Render resolution in pixels.
    #[must_use]
    pub fn size(&self) -> (u32, u32) {
        self.color.size()
    }
}

/// Owns the geometry targets and the SSAO → bloom → composite sequence.
pub(crate) struct PostProcessStack {
    pub(crate) targets: SceneTargets,
    pub(crate) ssao: SsaoRenderer,
    pub(crate) bloom: BloomPass,
    pub(crate) composite: CompositePass,
    ssao_enabled: bool,
    bloom_enabled: bool,
}

impl PostProcessStack {
    /// Build the full post-processing stack (scene targets + all passes).
    pub(crate) fn new(
        context: &RenderContext,
        shader_composer: &mut ShaderComposer,
        options: &PostProcessingOptions,
    ) -> Result<Self, CubefieldError> {
        let targets = SceneTargets::new(context);
        let ssao = SsaoRenderer::new(context, shader_composer, &targets, options)?;
        let bloom = BloomPass::new(context, shader_composer, &targets, options)?;
        let composite = CompositePass::new(
            context,
            shader_composer,
            &composite_inputs(&targets, &ssao, &bloom),
            options,
        )?;

        Ok(Self {
            targets,
            ssao,
            bloom,
            composite,
            ssao_enabled: options.ssao_enabled,
            bloom_enabled: options.bloom_enabled,
        })
    }

    /// Recreate all resolution-dependent resources.
    pub(crate) fn resize(&mut self, context: &RenderContext) {
        self.targets = SceneTargets::new(context);
        let (width, height) = self.targets.size();
        log::debug!("post-process targets resized to {width}x{height}");

        let passes: [&mut dyn ScreenPass; 2] = [&mut self.ssao, &mut self.bloom];
        for pass in passes {
            pass.resize(context, &self.targets);
        }
        self.rebind_composite(&context.device);
    }

    /// Run SSAO → bloom → composite, writing the final image to `output`.
    pub(crate) fn render(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        queue: &wgpu::Queue,
        proj: Mat4,
        output: &wgpu::TextureView,
    ) {
        if self.ssao_enabled {
            self.ssao.update_params(queue, proj);
            self.ssao.render(encoder);
        }
        if self.bloom_enabled {
            self.bloom.render(encoder);
        }
        self.composite.render(encoder, output);
    }

    /// Push post-processing option values to the passes and the GPU.
    pub(crate) fn apply_options(
        &mut self,
        context: &RenderContext,
        options: &PostProcessingOptions,
    ) {
        self.ssao_enabled = options.ssao_enabled;
        self.bloom_enabled = options.bloom_enabled;
        self.ssao.apply_options(options);

        let levels = self.bloom.level_count();
        self.bloom.apply_options(context, options);
        if self.bloom.level_count() != levels {
            self.rebind_composite(&context.device);
        }

        self.composite.apply_options(&context.queue, options);
    }

    fn rebind_composite(&mut self, device: &wgpu::Device) {
        let inputs = composite_inputs(&self.targets, &self.ssao, &self.bloom);
        self.composite.rebind(device, &inputs);
    }
}

fn composite_inputs<'a>(
    targets: &'a SceneTargets,
    ssao: &'a SsaoRenderer,
    bloom: &'a BloomPass,
) -> CompositeInputs<'a> {
    CompositeInputs {
        color: &targets.color.view,
        ao: ssao.output_view(),
        bloom: bloom.output_view(),
        depth: &targets.depth.view,
    }
}
