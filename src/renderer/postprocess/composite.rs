//! Composite pass: applies ambient occlusion and bloom to the HDR scene,
//! then exposure and tone mapping, writing the final image.
//!
//! Background pixels (depth at the far plane) pass through untouched so the
//! clear color survives tone mapping.

use wgpu::util::DeviceExt;

use crate::error::CubefieldError;
use crate::gpu::pipeline_helpers::{
    begin_screen_pass, buffer_entry, create_screen_space_pipeline,
    depth_texture_2d, filtering_sampler, linear_sampler, sampler_binding,
    texture_2d, uniform_buffer, view_entry, ScreenSpacePipelineDef,
};
use crate::gpu::render_context::RenderContext;
use crate::gpu::shader_composer::{Shader, ShaderComposer};
use crate::options::PostProcessingOptions;

/// External texture views the composite reads.
pub struct CompositeInputs<'a> {
    /// Lit HDR scene color.
    pub color: &'a wgpu::TextureView,
    /// Blurred ambient occlusion.
    pub ao: &'a wgpu::TextureView,
    /// Accumulated bloom.
    pub bloom: &'a wgpu::TextureView,
    /// Scene depth.
    pub depth: &'a wgpu::TextureView,
}

/// Composite parameters - must match `CompositeParams` in `composite.wgsl`
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CompositeParams {
    /// Exposure multiplier applied before tone mapping.
    pub exposure: f32,
    /// Bloom blend intensity.
    pub bloom_intensity: f32,
    /// 1.0 applies the AO term, 0.0 ignores it.
    pub ao_enabled: f32,
    /// 1.0 adds bloom, 0.0 ignores it.
    pub bloom_enabled: f32,
    /// Tone mapping operator id.
    pub tone_mapping: u32,
    /// Output gamma exponent (1.0 for sRGB targets).
    pub gamma: f32,
    /// Padding for GPU alignment.
    _pad: [f32; 2],
}

impl CompositeParams {
    /// Parameters for the given options and output format.
    #[must_use]
    pub fn from_options(
        options: &PostProcessingOptions,
        format: wgpu::TextureFormat,
    ) -> Self {
        Self {
            exposure: options.exposure,
            bloom_intensity: options.bloom_intensity,
            ao_enabled: if options.ssao_enabled { 1.0 } else { 0.0 },
            bloom_enabled: if options.bloom_enabled { 1.0 } else { 0.0 },
            tone_mapping: options.tone_mapping.as_u32(),
            // If sRGB, hardware does gamma correction → gamma = 1.0
            gamma: if format.is_srgb() { 1.0 } else { 1.0 / 2.2 },
            _pad: [0.0; 2],
        }
    }
}

/// Final fullscreen pass into the swapchain (or any view of the context's
/// surface format).
pub struct CompositePass {
    pipeline: wgpu::RenderPipeline,
    layout: wgpu::BindGroupLayout,
    bind_group: wgpu::BindGroup,
    sampler: wgpu::Sampler,
    params_buffer: wgpu::Buffer,
    format: wgpu::TextureFormat,

    /// Current parameters; call [`Self::flush_params`] after editing.
    pub params: CompositeParams,
}

impl CompositePass {
    /// Create the pipeline targeting the context's surface format.
    ///
    /// # Errors
    ///
    /// Returns [`CubefieldError::ShaderCompose`] if a shader fails to
    /// compose.
    pub fn new(
        context: &RenderContext,
        shader_composer: &mut ShaderComposer,
        inputs: &CompositeInputs<'_>,
        options: &PostProcessingOptions,
    ) -> Result<Self, CubefieldError> {
        let device = &context.device;
        let format = context.format();
        let params = CompositeParams::from_options(options, format);
        let params_buffer =
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Composite Params"),
                contents: bytemuck::cast_slice(&[params]),
                usage: wgpu::BufferUsages::UNIFORM
                    | wgpu::BufferUsages::COPY_DST,
            });
        let sampler = linear_sampler(device, "Composite Sampler");

        let layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Composite Bind Group Layout"),
                entries: &[
                    texture_2d(0),
                    texture_2d(1),
                    texture_2d(2),
                    depth_texture_2d(3),
                    filtering_sampler(4),
                    uniform_buffer(5),
                ],
            });

        let shader = shader_composer.compose(device, Shader::Composite)?;
        let pipeline = create_screen_space_pipeline(
            device,
            &ScreenSpacePipelineDef {
                label: "Composite",
                shader: &shader,
                format,
                blend: None,
                bind_group_layouts: &[&layout],
            },
        );

        let bind_group = Self::create_bind_group(
            device,
            &layout,
            inputs,
            &sampler,
            &params_buffer,
        );

        Ok(Self {
            pipeline,
            layout,
            bind_group,
            sampler,
            params_buffer,
            format,
            params,
        })
    }

    fn create_bind_group(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        inputs: &CompositeInputs<'_>,
        sampler: &wgpu::Sampler,
        params_buffer: &wgpu::Buffer,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Composite Bind Group"),
            layout,
            entries: &[
                view_entry(0, inputs.color),
                view_entry(1, inputs.ao),
                view_entry(2, inputs.bloom),
                view_entry(3, inputs.depth),
                sampler_binding(4, sampler),
                buffer_entry(5, params_buffer),
            ],
        })
    }

    /// Point the pass at new input views (after a resize or bloom rebuild).
    pub fn rebind(&mut self, device: &wgpu::Device, inputs: &CompositeInputs<'_>) {
        self.bind_group = Self::create_bind_group(
            device,
            &self.layout,
            inputs,
            &self.sampler,
            &self.params_buffer,
        );
    }

    /// Replace the parameters from options and upload them.
    pub fn apply_options(
        &mut self,
        queue: &wgpu::Queue,
        options: &PostProcessingOptions,
    ) {
        self.params = CompositeParams::from_options(options, self.format);
        self.flush_params(queue);
    }

    /// Upload [`Self::params`].
    pub fn flush_params(&self, queue: &wgpu::Queue) {
        queue.write_buffer(&self.params_buffer, 0, bytemuck::cast_slice(&[self.params]));
    }

    /// Composite into `output`.
    pub fn render(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        output: &wgpu::TextureView,
    ) {
        let mut pass = begin_screen_pass(
            encoder,
            "Composite Pass",
            output,
            wgpu::LoadOp::Clear(wgpu::Color::BLACK),
        );
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.bind_group, &[]);
        pass.draw(0..3, 0..1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::ToneMapping;

    fn count_returns(block: &naga::Block) -> usize {
        block
            .iter()
            .map(|statement| match statement {
                naga::Statement::Return { .. } => 1,
                naga::Statement::Block(inner) => count_returns(inner),
                naga::Statement::If { accept, reject, .. } => {
                    count_returns(accept) + count_returns(reject)
                }
                naga::Statement::Loop {
                    body, continuing, ..
                } => count_returns(body) + count_returns(continuing),
                naga::Statement::Switch { cases, .. } => {
                    cases.iter().map(|case| count_returns(&case.body)).sum()
                }
                _ => 0,
            })
            .sum()
    }

    #[test]
    fn background_pixels_share_the_bloom_path() {
        let module = ShaderComposer::new()
            .unwrap()
            .compose_naga(Shader::Composite)
            .unwrap();
        let fragment = module
            .entry_points
            .iter()
            .find(|ep| ep.name == "fs_main")
            .unwrap();
        assert_eq!(count_returns(&fragment.function.body), 1);
    }

    #[test]
    fn params_are_32_bytes() {
        assert_eq!(size_of::<CompositeParams>(), 32);
    }

    #[test]
    fn srgb_output_skips_gamma() {
        let params = CompositeParams::from_options(
            &PostProcessingOptions::default(),
            wgpu::TextureFormat::Bgra8UnormSrgb,
        );
        assert_eq!(params.gamma, 1.0);
        let linear = CompositeParams::from_options(
            &PostProcessingOptions::default(),
            wgpu::TextureFormat::Bgra8Unorm,
        );
        assert!((linear.gamma - 1.0 / 2.2).abs() < 1e-6);
    }

    #[test]
    fn disabled_effects_zero_their_switches() {
        let options = PostProcessingOptions {
            ssao_enabled: false,
            bloom_enabled: false,
            tone_mapping: ToneMapping::AcesFilmic,
            ..PostProcessingOptions::default()
        };
        let params =
            CompositeParams::from_options(&options, wgpu::TextureFormat::Rgba8UnormSrgb);
        assert_eq!(params.ao_enabled, 0.0);
        assert_eq!(params.bloom_enabled, 0.0);
        assert_eq!(params.tone_mapping, ToneMapping::AcesFilmic.as_u32());
    }

    #[test]
    fn defaults_enable_both_effects() {
        let params = CompositeParams::from_options(
            &PostProcessingOptions::default(),
            wgpu::TextureFormat::Rgba8UnormSrgb,
        );
        assert_eq!(params.ao_enabled, 1.0);
        assert_eq!(params.bloom_enabled, 1.0);
        assert_eq!(params.bloom_intensity, 2.0);
    }
}
