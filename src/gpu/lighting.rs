use glam::{Mat4, Vec3};
use wgpu::util::DeviceExt;

use crate::gpu::pipeline_helpers::{
    buffer_entry, comparison_sampler, depth_texture_2d, sampler_binding,
    shadow_sampler, uniform_buffer_in, view_entry,
};
use crate::gpu::texture::RenderTarget;
use crate::options::LightingOptions;

/// Depth format of the spot light's shadow map.
pub const SHADOW_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Shadow camera clip planes.
const SHADOW_NEAR: f32 = 0.5;
const SHADOW_FAR: f32 = 500.0;

/// Keeps `smoothstep(outer, inner, ..)` well defined for a zero penumbra.
const MIN_CONE_WIDTH: f32 = 1e-4;

/// Ambient + spot light parameters shared by the cube and shadow shaders.
/// NOTE: Must match `LightingUniform` in `modules/lighting.wgsl` (144 bytes)
///
/// WGSL layout:
///   light_view_proj: mat4x4<f32>  (offset 0)
///   spot_position: vec3<f32>      (offset 64)
///   spot_intensity: f32           (offset 76)
///   spot_direction: vec3<f32>     (offset 80)
///   spot_cos_outer: f32           (offset 92)
///   ambient: vec3<f32>            (offset 96)
///   spot_cos_inner: f32           (offset 108)
///   spot_color: vec3<f32>         (offset 112)
///   spot_decay: f32               (offset 124)
///   shadow_bias: f32              (offset 128)
///   shadows_enabled: u32          (offset 132)
///   shadow_texel: f32             (offset 136)
///   _pad: f32                     (offset 140)
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightingUniform {
    /// World → shadow clip transform of the spot light.
    pub light_view_proj: [[f32; 4]; 4],
    /// Spot light position.
    pub spot_position: [f32; 3],
    /// Spot light intensity.
    pub spot_intensity: f32,
    /// Normalized direction the spot light points in.
    pub spot_direction: [f32; 3],
    /// Cosine of the cone half-angle.
    pub spot_cos_outer: f32,
    /// Ambient radiance (white light scaled by intensity).
    pub ambient: [f32; 3],
    /// Cosine of the fully lit inner cone.
    pub spot_cos_inner: f32,
    /// Spot light color.
    pub spot_color: [f32; 3],
    /// Distance falloff exponent.
    pub spot_decay: f32,
    /// Depth bias for shadow comparisons.
    pub shadow_bias: f32,
    /// Non-zero when shadow lookups are active.
    pub shadows_enabled: u32,
    /// One shadow map texel in UV units.
    pub shadow_texel: f32,
    _pad: f32,
}

impl LightingUniform {
    /// Derive the uniform from lighting options.
    #[must_use]
    pub fn from_options(options: &LightingOptions) -> Self {
        let position = Vec3::from_array(options.spot_position);
        let target = Vec3::from_array(options.spot_target);
        let direction = (target - position).normalize_or(Vec3::NEG_Y);

        let cos_outer = options.spot_angle.cos();
        let cos_inner = (options.spot_angle
            * (1.0 - options.spot_penumbra.clamp(0.0, 1.0)))
        .cos()
        .max(cos_outer + MIN_CONE_WIDTH);

        Self {
            light_view_proj: shadow_view_proj(position, direction, options.spot_angle)
                .to_cols_array_2d(),
            spot_position: options.spot_position,
            spot_intensity: options.spot_intensity,
            spot_direction: direction.to_array(),
            spot_cos_outer: cos_outer,
            ambient: [options.ambient; 3],
            spot_cos_inner: cos_inner,
            spot_color: [1.0; 3],
            spot_decay: options.spot_decay,
            shadow_bias: options.shadow_bias,
            shadows_enabled: u32::from(options.cast_shadows),
            shadow_texel: 1.0 / options.shadow_map_size.max(1) as f32,
            _pad: 0.0,
        }
    }
}

/// Perspective shadow camera covering the spot cone.
fn shadow_view_proj(position: Vec3, direction: Vec3, angle: f32) -> Mat4 {
    let up = if direction.cross(Vec3::Y).length_squared() < 1e-6 {
        Vec3::Z
    } else {
        Vec3::Y
    };
    let view = Mat4::look_to_rh(position, direction, up);
    let fov = (2.0 * angle).clamp(1e-3, std::f32::consts::PI - 1e-3);
    let proj = Mat4::perspective_rh(fov, 1.0, SHADOW_NEAR, SHADOW_FAR);
    proj * view
}

/// GPU state for the scene lights: uniform buffer, shadow map, and the two
/// bind groups that expose them.
pub struct Lighting {
    /// CPU copy of the uniform.
    pub uniform: LightingUniform,
    /// Uniform buffer.
    pub buffer: wgpu::Buffer,
    /// Layout for the shaded pass: uniform, shadow map, comparison sampler.
    pub layout: wgpu::BindGroupLayout,
    /// Bind group for the shaded pass.
    pub bind_group: wgpu::BindGroup,
    /// Layout for the shadow pass: uniform only.
    pub shadow_layout: wgpu::BindGroupLayout,
    /// Bind group for the shadow pass.
    pub shadow_bind_group: wgpu::BindGroup,
    /// Depth target rendered from the spot light.
    pub shadow_map: RenderTarget,
    sampler: wgpu::Sampler,
}

impl Lighting {
    /// Create the light uniform and a shadow map of the configured size.
    #[must_use]
    pub fn new(device: &wgpu::Device, options: &LightingOptions) -> Self {
        let uniform = LightingUniform::from_options(options);

        let buffer =
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Lighting Buffer"),
                contents: bytemuck::cast_slice(&[uniform]),
                usage: wgpu::BufferUsages::UNIFORM
                    | wgpu::BufferUsages::COPY_DST,
            });

        let shadow_map = create_shadow_map(device, options.shadow_map_size);
        let sampler = shadow_sampler(device, "Shadow Sampler");

        let layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Lighting Bind Group Layout"),
                entries: &[
                    uniform_buffer_in(
                        0,
                        wgpu::ShaderStages::VERTEX
                            | wgpu::ShaderStages::FRAGMENT,
                    ),
                    depth_texture_2d(1),
                    comparison_sampler(2),
                ],
            });

        let shadow_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Shadow Lighting Bind Group Layout"),
                entries: &[uniform_buffer_in(0, wgpu::ShaderStages::VERTEX)],
            });

        let bind_group = create_bind_group(
            device,
            &layout,
            &buffer,
            &shadow_map.view,
            &sampler,
        );
        let shadow_bind_group =
            device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("Shadow Lighting Bind Group"),
                layout: &shadow_layout,
                entries: &[buffer_entry(0, &buffer)],
            });

        Self {
            uniform,
            buffer,
            layout,
            bind_group,
            shadow_layout,
            shadow_bind_group,
            shadow_map,
            sampler,
        }
    }

    /// Whether the shadow pass should run this frame.
    #[must_use]
    pub fn shadows_enabled(&self) -> bool {
        self.uniform.shadows_enabled != 0
    }

    /// Push new lighting options, reallocating the shadow map when its size
    /// changed.
    pub fn apply_options(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        options: &LightingOptions,
    ) {
        let size = options.shadow_map_size.max(1);
        if self.shadow_map.size() != (size, size) {
            log::debug!("reallocating shadow map at {size}x{size}");
            self.shadow_map = create_shadow_map(device, size);
            self.bind_group = create_bind_group(
                device,
                &self.layout,
                &self.buffer,
                &self.shadow_map.view,
                &self.sampler,
            );
        }
        self.uniform = LightingUniform::from_options(options);
        queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(&[self.uniform]));
    }
}

fn create_shadow_map(device: &wgpu::Device, size: u32) -> RenderTarget {
    let size = size.max(1);
    RenderTarget::new(device, "Shadow Map", (size, size), SHADOW_FORMAT)
}

fn create_bind_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    buffer: &wgpu::Buffer,
    shadow_view: &wgpu::TextureView,
    sampler: &wgpu::Sampler,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("Lighting Bind Group"),
        layout,
        entries: &[
            buffer_entry(0, buffer),
            view_entry(1, shadow_view),
            sampler_binding(2, sampler),
        ],
    })
}

#[cfg(test)]
mod tests {
    use glam::Vec4Swizzles;

    use super::*;

    #[test]
    fn uniform_is_144_bytes() {
        assert_eq!(size_of::<LightingUniform>(), 144);
    }

    #[test]
    fn default_spot_points_at_origin() {
        let uniform = LightingUniform::from_options(&LightingOptions::default());
        let expected = (-Vec3::new(-10.0, 20.0, 20.0)).normalize();
        let direction = Vec3::from_array(uniform.spot_direction);
        assert!(direction.distance(expected) < 1e-5);
        assert_eq!(uniform.shadows_enabled, 1);
        assert!((uniform.ambient[0] - std::f32::consts::FRAC_PI_2).abs() < 1e-6);
    }

    #[test]
    fn full_penumbra_fades_from_axis() {
        let uniform = LightingUniform::from_options(&LightingOptions::default());
        assert!((uniform.spot_cos_outer - 0.15f32.cos()).abs() < 1e-6);
        assert!((uniform.spot_cos_inner - 1.0).abs() < 1e-6);
    }

    #[test]
    fn zero_penumbra_keeps_cone_width() {
        let options = LightingOptions {
            spot_penumbra: 0.0,
            ..LightingOptions::default()
        };
        let uniform = LightingUniform::from_options(&options);
        assert!(uniform.spot_cos_inner > uniform.spot_cos_outer);
    }

    #[test]
    fn target_projects_to_shadow_map_center() {
        let uniform = LightingUniform::from_options(&LightingOptions::default());
        let view_proj = Mat4::from_cols_array_2d(&uniform.light_view_proj);
        let clip = view_proj * Vec3::ZERO.extend(1.0);
        let ndc = clip.xyz() / clip.w;
        assert!(ndc.x.abs() < 1e-4 && ndc.y.abs() < 1e-4);
        assert!(ndc.z > 0.0 && ndc.z < 1.0);
    }

    #[test]
    fn vertical_spot_stays_finite() {
        let options = LightingOptions {
            spot_position: [0.0, 10.0, 0.0],
            ..LightingOptions::default()
        };
        let uniform = LightingUniform::from_options(&options);
        let view_proj = Mat4::from_cols_array_2d(&uniform.light_view_proj);
        assert!(view_proj.is_finite());
    }

    #[test]
    fn disabled_shadows_clear_flag() {
        let options = LightingOptions {
            cast_shadows: false,
            ..LightingOptions::default()
        };
        assert_eq!(LightingUniform::from_options(&options).shadows_enabled, 0);
    }
}
