//! Bloom post-processing pass: extracts bright pixels and creates a soft glow.
//!
//! Pipeline: soft luminance threshold at half resolution → downsample chain
//! with a separable Gaussian blur at each level → tent-filtered additive
//! upsample back to the first level. The composite pass adds that level to
//! the scene before tone mapping.

use wgpu::util::DeviceExt;

use super::screen_pass::ScreenPass;
use crate::error::CubefieldError;
use crate::gpu::pipeline_helpers::{
    begin_screen_pass, buffer_entry, create_screen_space_pipeline,
    filtering_sampler, linear_sampler, sampler_binding, texture_2d,
    uniform_buffer, view_entry, ScreenSpacePipelineDef, ADDITIVE_BLEND,
};
use crate::gpu::render_context::RenderContext;
use crate::gpu::shader_composer::{Shader, ShaderComposer};
use crate::gpu::texture::RenderTarget;
use crate::options::PostProcessingOptions;
use crate::renderer::pipeline_util::HDR_FORMAT;
use crate::renderer::postprocess::post_process::SceneTargets;

/// Upper bound on the mip chain length.
pub const MAX_LEVELS: u32 = 10;

/// Threshold params - must match WGSL struct
#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
struct ThresholdParams {
    threshold: f32,
    smoothing: f32,
    _pad: [f32; 2],
}

/// Blur / upsample params - must match WGSL structs
#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
struct SourceParams {
    texel_size: [f32; 2],
    direction: [f32; 2],
}

/// Sizes of each bloom level, starting at half resolution and halving
/// (never below one texel).
#[must_use]
pub fn mip_sizes(width: u32, height: u32, levels: u32) -> Vec<(u32, u32)> {
    let levels = levels.clamp(1, MAX_LEVELS);
    let mut size = ((width / 2).max(1), (height / 2).max(1));
    let mut sizes = Vec::with_capacity(levels as usize);
    for _ in 0..levels {
        sizes.push(size);
        size = ((size.0 / 2).max(1), (size.1 / 2).max(1));
    }
    sizes
}

fn texel_size((width, height): (u32, u32)) -> [f32; 2] {
    [1.0 / width.max(1) as f32, 1.0 / height.max(1) as f32]
}

/// One level of the chain: its blurred output, the ping texture between
/// the horizontal and vertical blurs, and the bind groups reading them.
struct BloomLevel {
    mip: RenderTarget,
    ping: RenderTarget,
    blur_h: wgpu::BindGroup,
    blur_v: wgpu::BindGroup,
    /// Reads this level for accumulation into the previous one (level 0
    /// has none).
    upsample: Option<wgpu::BindGroup>,
    _params: Vec<wgpu::Buffer>,
}

/// Mip-chain bloom.
pub struct BloomPass {
    threshold_pipeline: wgpu::RenderPipeline,
    threshold_bind_group: wgpu::BindGroup,
    threshold_buffer: wgpu::Buffer,
    blur_pipeline: wgpu::RenderPipeline,
    upsample_pipeline: wgpu::RenderPipeline,
    /// Shared by all three shaders: source texture, sampler, params.
    layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,

    levels: Vec<BloomLevel>,
    level_count: u32,
    size: (u32, u32),

    /// Luminance at which pixels start to bloom.
    pub threshold: f32,
    /// Width of the soft knee above the threshold.
    pub smoothing: f32,
}

impl BloomPass {
    /// Build the pipelines and the mip chain for the current render size.
    ///
    /// # Errors
    ///
    /// Returns [`CubefieldError::ShaderCompose`] if a shader fails to
    /// compose.
    pub fn new(
        context: &RenderContext,
        shader_composer: &mut ShaderComposer,
        targets: &SceneTargets,
        options: &PostProcessingOptions,
    ) -> Result<Self, CubefieldError> {
        let device = &context.device;
        let sampler = linear_sampler(device, "Bloom Sampler");

        let layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Bloom Source Layout"),
                entries: &[texture_2d(0), filtering_sampler(1), uniform_buffer(2)],
            });

        let threshold_pipeline = Self::create_pipeline(
            device,
            shader_composer,
            Shader::BloomThreshold,
            "Bloom Threshold",
            None,
            &layout,
        )?;
        let blur_pipeline = Self::create_pipeline(
            device,
            shader_composer,
            Shader::BloomBlur,
            "Bloom Blur",
            None,
            &layout,
        )?;
        let upsample_pipeline = Self::create_pipeline(
            device,
            shader_composer,
            Shader::BloomUpsample,
            "Bloom Upsample",
            Some(ADDITIVE_BLEND),
            &layout,
        )?;

        let threshold_buffer =
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Bloom Threshold Buffer"),
                contents: bytemuck::cast_slice(&[ThresholdParams {
                    threshold: options.bloom_threshold,
                    smoothing: options.bloom_smoothing,
                    _pad: [0.0; 2],
                }]),
                usage: wgpu::BufferUsages::UNIFORM
                    | wgpu::BufferUsages::COPY_DST,
            });
        let threshold_bind_group = Self::create_source_bind_group(
            device,
            &layout,
            "Bloom Threshold Bind Group",
            &targets.color.view,
            &sampler,
            &threshold_buffer,
        );

        let size = targets.size();
        let level_count = options.bloom_levels.clamp(1, MAX_LEVELS);
        let levels = Self::create_levels(device, &layout, &sampler, size, level_count);

        Ok(Self {
            threshold_pipeline,
            threshold_bind_group,
            threshold_buffer,
            blur_pipeline,
            upsample_pipeline,
            layout,
            sampler,
            levels,
            level_count,
            size,
            threshold: options.bloom_threshold,
            smoothing: options.bloom_smoothing,
        })
    }

    fn create_pipeline(
        device: &wgpu::Device,
        shader_composer: &mut ShaderComposer,
        shader: Shader,
        label: &str,
        blend: Option<wgpu::BlendState>,
        layout: &wgpu::BindGroupLayout,
    ) -> Result<wgpu::RenderPipeline, CubefieldError> {
        let module = shader_composer.compose(device, shader)?;
        Ok(create_screen_space_pipeline(
            device,
            &ScreenSpacePipelineDef {
                label,
                shader: &module,
                format: HDR_FORMAT,
                blend,
                bind_group_layouts: &[layout],
            },
        ))
    }

    fn create_source_bind_group(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        label: &str,
        source: &wgpu::TextureView,
        sampler: &wgpu::Sampler,
        params: &wgpu::Buffer,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout,
            entries: &[
                view_entry(0, source),
                sampler_binding(1, sampler),
                buffer_entry(2, params),
            ],
        })
    }

    fn create_params_buffer(
        device: &wgpu::Device,
        label: &str,
        params: SourceParams,
    ) -> wgpu::Buffer {
        device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: bytemuck::cast_slice(&[params]),
            usage: wgpu::BufferUsages::UNIFORM,
        })
    }

    fn create_levels(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        sampler: &wgpu::Sampler,
        size: (u32, u32),
        level_count: u32,
    ) -> Vec<BloomLevel> {
        let sizes = mip_sizes(size.0, size.1, level_count);
        let targets: Vec<(RenderTarget, RenderTarget)> = sizes
            .iter()
            .enumerate()
            .map(|(i, &level_size)| {
                (
                    RenderTarget::new(
                        device,
                        &format!("Bloom Mip {i}"),
                        level_size,
                        HDR_FORMAT,
                    ),
                    RenderTarget::new(
                        device,
                        &format!("Bloom Ping {i}"),
                        level_size,
                        HDR_FORMAT,
                    ),
                )
            })
            .collect();

        let mut levels = Vec::with_capacity(targets.len());
        for (i, (mip, ping)) in targets.iter().enumerate() {
            // Level 0 blurs the thresholded image in place; deeper levels
            // downsample the previous level during the horizontal blur.
            let source = if i == 0 { mip } else { &targets[i - 1].0 };

            let h_params = Self::create_params_buffer(
                device,
                "Bloom Blur H Params",
                SourceParams {
                    texel_size: texel_size(source.size()),
                    direction: [1.0, 0.0],
                },
            );
            let v_params = Self::create_params_buffer(
                device,
                "Bloom Blur V Params",
                SourceParams {
                    texel_size: texel_size(ping.size()),
                    direction: [0.0, 1.0],
                },
            );
            let blur_h = Self::create_source_bind_group(
                device,
                layout,
                "Bloom Blur H Bind Group",
                &source.view,
                sampler,
                &h_params,
            );
            let blur_v = Self::create_source_bind_group(
                device,
                layout,
                "Bloom Blur V Bind Group",
                &ping.view,
                sampler,
                &v_params,
            );

            let mut params = vec![h_params, v_params];
            let upsample = (i > 0).then(|| {
                let up_params = Self::create_params_buffer(
                    device,
                    "Bloom Upsample Params",
                    SourceParams {
                        texel_size: texel_size(mip.size()),
                        direction: [0.0, 0.0],
                    },
                );
                let bind_group = Self::create_source_bind_group(
                    device,
                    layout,
                    "Bloom Upsample Bind Group",
                    &mip.view,
                    sampler,
                    &up_params,
                );
                params.push(up_params);
                bind_group
            });

            levels.push((blur_h, blur_v, upsample, params));
        }

        targets
            .into_iter()
            .zip(levels)
            .map(|((mip, ping), (blur_h, blur_v, upsample, params))| BloomLevel {
                mip,
                ping,
                blur_h,
                blur_v,
                upsample,
                _params: params,
            })
            .collect()
    }

    /// Copy bloom settings from options, rebuilding the chain when the
    /// level count changed.
    pub fn apply_options(
        &mut self,
        context: &RenderContext,
        options: &PostProcessingOptions,
    ) {
        self.threshold = options.bloom_threshold;
        self.smoothing = options.bloom_smoothing;
        self.update_params(&context.queue);

        let level_count = options.bloom_levels.clamp(1, MAX_LEVELS);
        if level_count != self.level_count {
            self.level_count = level_count;
            self.levels = Self::create_levels(
                &context.device,
                &self.layout,
                &self.sampler,
                self.size,
                level_count,
            );
        }
    }

    /// Upload threshold settings.
    pub fn update_params(&self, queue: &wgpu::Queue) {
        queue.write_buffer(
            &self.threshold_buffer,
            0,
            bytemuck::cast_slice(&[ThresholdParams {
                threshold: self.threshold,
                smoothing: self.smoothing,
                _pad: [0.0; 2],
            }]),
        );
    }

    /// Number of levels in the chain.
    #[must_use]
    pub fn level_count(&self) -> u32 {
        self.level_count
    }

    /// Accumulated bloom (half resolution) for the composite pass.
    #[must_use]
    pub fn output_view(&self) -> &wgpu::TextureView {
        &self.levels[0].mip.view
    }

    fn draw_pass(
        encoder: &mut wgpu::CommandEncoder,
        label: &str,
        target: &wgpu::TextureView,
        load: wgpu::LoadOp<wgpu::Color>,
        pipeline: &wgpu::RenderPipeline,
        bind_group: &wgpu::BindGroup,
    ) {
        let mut pass = begin_screen_pass(encoder, label, target, load);
        pass.set_pipeline(pipeline);
        pass.set_bind_group(0, bind_group, &[]);
        pass.draw(0..3, 0..1);
    }
}

impl ScreenPass for BloomPass {
    fn render(&self, encoder: &mut wgpu::CommandEncoder) {
        let clear = wgpu::LoadOp::Clear(wgpu::Color::BLACK);

        Self::draw_pass(
            encoder,
            "Bloom Threshold",
            &self.levels[0].mip.view,
            clear,
            &self.threshold_pipeline,
            &self.threshold_bind_group,
        );

        for level in &self.levels {
            Self::draw_pass(
                encoder,
                "Bloom Blur H",
                &level.ping.view,
                clear,
                &self.blur_pipeline,
                &level.blur_h,
            );
            Self::draw_pass(
                encoder,
                "Bloom Blur V",
                &level.mip.view,
                clear,
                &self.blur_pipeline,
                &level.blur_v,
            );
        }

        for i in (1..self.levels.len()).rev() {
            if let Some(bind_group) = &self.levels[i].upsample {
                Self::draw_pass(
                    encoder,
                    "Bloom Upsample",
                    &self.levels[i - 1].mip.view,
                    wgpu::LoadOp::Load,
                    &self.upsample_pipeline,
                    bind_group,
                );
            }
        }
    }

    fn resize(&mut self, context: &RenderContext, targets: &SceneTargets) {
        let device = &context.device;
        self.threshold_bind_group = Self::create_source_bind_group(
            device,
            &self.layout,
            "Bloom Threshold Bind Group",
            &targets.color.view,
            &self.sampler,
            &self.threshold_buffer,
        );
        let size = targets.size();
        if size != self.size {
            self.size = size;
            self.levels = Self::create_levels(
                device,
                &self.layout,
                &self.sampler,
                size,
                self.level_count,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chain_starts_at_half_resolution() {
        let sizes = mip_sizes(1280, 800, 7);
        assert_eq!(sizes.len(), 7);
        assert_eq!(sizes[0], (640, 400));
        assert_eq!(sizes[1], (320, 200));
        assert_eq!(sizes[6], (10, 6));
    }

    #[test]
    fn chain_never_drops_below_one_texel() {
        let sizes = mip_sizes(8, 2, 7);
        assert!(sizes.iter().all(|&(w, h)| w >= 1 && h >= 1));
        assert_eq!(sizes[6], (1, 1));
    }

    #[test]
    fn level_count_is_clamped() {
        assert_eq!(mip_sizes(512, 512, 0).len(), 1);
        assert_eq!(mip_sizes(512, 512, 100).len(), MAX_LEVELS as usize);
    }

    #[test]
    fn params_are_16_bytes() {
        assert_eq!(size_of::<ThresholdParams>(), 16);
        assert_eq!(size_of::<SourceParams>(), 16);
    }
}
