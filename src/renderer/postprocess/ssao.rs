//! Screen-space ambient occlusion: hemisphere sampling against scene depth
//! and normals, followed by a 4x4 blur that cancels the noise pattern.

use glam::{Mat4, Vec3};
use rand::Rng;
use wgpu::util::DeviceExt;

use super::screen_pass::ScreenPass;
use crate::error::CubefieldError;
use crate::gpu::pipeline_helpers::{
    begin_screen_pass, buffer_entry, create_screen_space_pipeline,
    depth_texture_2d, texture_2d_unfilterable, uniform_buffer, view_entry,
    ScreenSpacePipelineDef,
};
use crate::gpu::render_context::RenderContext;
use crate::gpu::shader_composer::{Shader, ShaderComposer};
use crate::gpu::texture::RenderTarget;
use crate::options::PostProcessingOptions;
use crate::renderer::postprocess::post_process::SceneTargets;

const KERNEL_SIZE: usize = 32;
const NOISE_SIZE: u32 = 4;
const AO_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::R8Unorm;
const NOISE_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba32Float;

/// SSAO parameters uniform - must match `SsaoParams` in `ssao.wgsl`
/// (160 bytes).
#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SsaoParams {
    /// View to clip space.
    pub proj: [[f32; 4]; 4],
    /// Clip to view space, for reconstructing positions from depth.
    pub inv_proj: [[f32; 4]; 4],
    /// Render target size in pixels `[width, height]`.
    pub screen_size: [f32; 2],
    /// Sampling radius in view space.
    pub radius: f32,
    /// Depth bias against self-occlusion.
    pub bias: f32,
    /// Power the occlusion term is raised to.
    pub intensity: f32,
    /// Rounds the struct to 16 bytes.
    _pad: [f32; 3],
}

/// Signed unit-range sample.
fn signed(rng: &mut impl Rng) -> f32 {
    rng.random_range(-1.0..=1.0)
}

/// Hemisphere samples along +Z, denser toward the origin.
fn generate_kernel(rng: &mut impl Rng) -> [[f32; 4]; KERNEL_SIZE] {
    std::array::from_fn(|i| {
        let direction = Vec3::new(signed(rng), signed(rng), rng.random())
            .try_normalize()
            .unwrap_or(Vec3::Z);
        let t = i as f32 / KERNEL_SIZE as f32;
        (direction * (0.1 + 0.9 * t * t)).extend(0.0).to_array()
    })
}

/// Unit rotation vectors in the XY plane for the 4×4 noise tile.
fn generate_noise(rng: &mut impl Rng) -> Vec<[f32; 4]> {
    (0..NOISE_SIZE * NOISE_SIZE)
        .map(|_| {
            glam::Vec2::new(signed(rng), signed(rng))
                .try_normalize()
                .unwrap_or(glam::Vec2::X)
                .extend(0.0)
                .extend(0.0)
                .to_array()
        })
        .collect()
}

/// Ambient occlusion pass over the geometry targets.
///
/// Reads scene depth and view-space normals, writes a raw AO term, then a
/// 4×4 box-blurred copy for the composite pass.
pub struct SsaoRenderer {
    pipeline: wgpu::RenderPipeline,
    layout: wgpu::BindGroupLayout,
    bind_group: wgpu::BindGroup,
    blur_pipeline: wgpu::RenderPipeline,
    blur_layout: wgpu::BindGroupLayout,
    blur_bind_group: wgpu::BindGroup,

    raw: RenderTarget,
    blurred: RenderTarget,
    noise: RenderTarget,
    kernel_buffer: wgpu::Buffer,
    params_buffer: wgpu::Buffer,

    width: u32,
    height: u32,

    /// Sampling radius in view space.
    pub radius: f32,
    /// Depth bias against self-occlusion.
    pub bias: f32,
    /// Power the occlusion term is raised to.
    pub intensity: f32,
}

impl SsaoRenderer {
    /// Create the kernel, noise tile, targets, and both pipelines.
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
        let (width, height) = targets.size();
        let mut rng = rand::rng();

        let kernel = generate_kernel(&mut rng);
        let kernel_buffer =
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("SSAO Kernel"),
                contents: bytemuck::cast_slice(&kernel),
                usage: wgpu::BufferUsages::UNIFORM,
            });
        let params_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("SSAO Params"),
            size: size_of::<SsaoParams>() as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let noise = Self::create_noise_texture(context, &mut rng);
        let raw = RenderTarget::new(device, "SSAO Texture", (width, height), AO_FORMAT);
        let blurred =
            RenderTarget::new(device, "SSAO Blurred", (width, height), AO_FORMAT);

        let layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("SSAO Bind Group Layout"),
                entries: &[
                    depth_texture_2d(0),
                    texture_2d_unfilterable(1),
                    texture_2d_unfilterable(2),
                    uniform_buffer(3),
                    uniform_buffer(4),
                ],
            });
        let blur_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("SSAO Blur Layout"),
                entries: &[texture_2d_unfilterable(0)],
            });

        let shader = shader_composer.compose(device, Shader::Ssao)?;
        let pipeline = create_screen_space_pipeline(
            device,
            &ScreenSpacePipelineDef {
                label: "SSAO",
                shader: &shader,
                format: AO_FORMAT,
                blend: None,
                bind_group_layouts: &[&layout],
            },
        );
        let blur_shader = shader_composer.compose(device, Shader::SsaoBlur)?;
        let blur_pipeline = create_screen_space_pipeline(
            device,
            &ScreenSpacePipelineDef {
                label: "SSAO Blur",
                shader: &blur_shader,
                format: AO_FORMAT,
                blend: None,
                bind_group_layouts: &[&blur_layout],
            },
        );

        let bind_group = Self::create_bind_group(
            device,
            &layout,
            targets,
            &noise,
            &kernel_buffer,
            &params_buffer,
        );
        let blur_bind_group = Self::create_blur_bind_group(device, &blur_layout, &raw);

        Ok(Self {
            pipeline,
            layout,
            bind_group,
            blur_pipeline,
            blur_layout,
            blur_bind_group,
            raw,
            blurred,
            noise,
            kernel_buffer,
            params_buffer,
            width,
            height,
            radius: options.ao_radius,
            bias: options.ao_bias,
            intensity: options.ao_intensity,
        })
    }

    fn create_noise_texture(
        context: &RenderContext,
        rng: &mut impl Rng,
    ) -> RenderTarget {
        let noise = RenderTarget::with_usage(
            &context.device,
            "SSAO Noise Texture",
            (NOISE_SIZE, NOISE_SIZE),
            NOISE_FORMAT,
            wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        );
        let data = generate_noise(rng);
        context.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &noise.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            bytemuck::cast_slice(&data),
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(NOISE_SIZE * size_of::<[f32; 4]>() as u32),
                rows_per_image: Some(NOISE_SIZE),
            },
            wgpu::Extent3d {
                width: NOISE_SIZE,
                height: NOISE_SIZE,
                depth_or_array_layers: 1,
            },
        );
        noise
    }

    fn create_bind_group(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        targets: &SceneTargets,
        noise: &RenderTarget,
        kernel_buffer: &wgpu::Buffer,
        params_buffer: &wgpu::Buffer,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("SSAO Bind Group"),
            layout,
            entries: &[
                view_entry(0, &targets.depth.view),
                view_entry(1, &targets.normal.view),
                view_entry(2, &noise.view),
                buffer_entry(3, kernel_buffer),
                buffer_entry(4, params_buffer),
            ],
        })
    }

    fn create_blur_bind_group(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        raw: &RenderTarget,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("SSAO Blur Bind Group"),
            layout,
            entries: &[view_entry(0, &raw.view)],
        })
    }

    /// Copy AO settings from options.
    pub fn apply_options(&mut self, options: &PostProcessingOptions) {
        self.radius = options.ao_radius;
        self.bias = options.ao_bias;
        self.intensity = options.ao_intensity;
    }

    /// Upload the projection and AO settings (call before `render`).
    pub fn update_params(&self, queue: &wgpu::Queue, proj: Mat4) {
        let params = SsaoParams {
            proj: proj.to_cols_array_2d(),
            inv_proj: proj.inverse().to_cols_array_2d(),
            screen_size: [self.width as f32, self.height as f32],
            radius: self.radius,
            bias: self.bias,
            intensity: self.intensity,
            _pad: [0.0; 3],
        };
        queue.write_buffer(&self.params_buffer, 0, bytemuck::cast_slice(&[params]));
    }

    /// Final (blurred) AO view for the composite pass.
    #[must_use]
    pub fn output_view(&self) -> &wgpu::TextureView {
        &self.blurred.view
    }
}

impl ScreenPass for SsaoRenderer {
    fn render(&self, encoder: &mut wgpu::CommandEncoder) {
        {
            let mut pass = begin_screen_pass(
                encoder,
                "SSAO Pass",
                &self.raw.view,
                wgpu::LoadOp::Clear(wgpu::Color::WHITE),
            );
            pass.set_pipeline(&self.pipeline);
            pass.set_bind_group(0, &self.bind_group, &[]);
            pass.draw(0..3, 0..1);
        }

        let mut pass = begin_screen_pass(
            encoder,
            "SSAO Blur Pass",
            &self.blurred.view,
            wgpu::LoadOp::Clear(wgpu::Color::WHITE),
        );
        pass.set_pipeline(&self.blur_pipeline);
        pass.set_bind_group(0, &self.blur_bind_group, &[]);
        pass.draw(0..3, 0..1);
    }

    fn resize(&mut self, context: &RenderContext, targets: &SceneTargets) {
        let device = &context.device;
        let (width, height) = targets.size();
        if (width, height) != (self.width, self.height) {
            self.raw =
                RenderTarget::new(device, "SSAO Texture", (width, height), AO_FORMAT);
            self.blurred =
                RenderTarget::new(device, "SSAO Blurred", (width, height), AO_FORMAT);
            self.blur_bind_group =
                Self::create_blur_bind_group(device, &self.blur_layout, &self.raw);
            self.width = width;
            self.height = height;
        }
        // Scene targets are always reallocated, so the main bind group is
        // rebuilt even at an unchanged size.
        self.bind_group = Self::create_bind_group(
            device,
            &self.layout,
            targets,
            &self.noise,
            &self.kernel_buffer,
            &self.params_buffer,
        );
    }
}
