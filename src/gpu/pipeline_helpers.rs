//! Shared wgpu boilerplate for bind group layouts and fullscreen pipelines.

/// Fragment-visible, filterable float 2D texture binding.
#[must_use]
pub fn texture_2d(binding: u32) -> wgpu::BindGroupLayoutEntry {
    texture_entry(binding, wgpu::TextureSampleType::Float { filterable: true })
}

/// Fragment-visible, non-filterable float 2D texture binding.
#[must_use]
pub fn texture_2d_unfilterable(binding: u32) -> wgpu::BindGroupLayoutEntry {
    texture_entry(binding, wgpu::TextureSampleType::Float { filterable: false })
}

/// Fragment-visible depth 2D texture binding.
#[must_use]
pub fn depth_texture_2d(binding: u32) -> wgpu::BindGroupLayoutEntry {
    texture_entry(binding, wgpu::TextureSampleType::Depth)
}

fn texture_entry(
    binding: u32,
    sample_type: wgpu::TextureSampleType,
) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Texture {
            sample_type,
            view_dimension: wgpu::TextureViewDimension::D2,
            multisampled: false,
        },
        count: None,
    }
}

/// Fragment-visible filtering sampler binding.
#[must_use]
pub fn filtering_sampler(binding: u32) -> wgpu::BindGroupLayoutEntry {
    sampler_entry(binding, wgpu::SamplerBindingType::Filtering)
}

/// Fragment-visible comparison sampler binding (shadow lookups).
#[must_use]
pub fn comparison_sampler(binding: u32) -> wgpu::BindGroupLayoutEntry {
    sampler_entry(binding, wgpu::SamplerBindingType::Comparison)
}

fn sampler_entry(
    binding: u32,
    ty: wgpu::SamplerBindingType,
) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Sampler(ty),
        count: None,
    }
}

/// Uniform buffer binding visible to the given stages.
#[must_use]
pub fn uniform_buffer_in(
    binding: u32,
    visibility: wgpu::ShaderStages,
) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

/// Fragment-visible uniform buffer binding.
#[must_use]
pub fn uniform_buffer(binding: u32) -> wgpu::BindGroupLayoutEntry {
    uniform_buffer_in(binding, wgpu::ShaderStages::FRAGMENT)
}

/// Bind group entry for a texture view.
#[must_use]
pub fn view_entry(
    binding: u32,
    view: &wgpu::TextureView,
) -> wgpu::BindGroupEntry<'_> {
    wgpu::BindGroupEntry {
        binding,
        resource: wgpu::BindingResource::TextureView(view),
    }
}

/// Bind group entry for a sampler.
#[must_use]
pub fn sampler_binding(
    binding: u32,
    sampler: &wgpu::Sampler,
) -> wgpu::BindGroupEntry<'_> {
    wgpu::BindGroupEntry {
        binding,
        resource: wgpu::BindingResource::Sampler(sampler),
    }
}

/// Bind group entry for a whole buffer.
#[must_use]
pub fn buffer_entry(
    binding: u32,
    buffer: &wgpu::Buffer,
) -> wgpu::BindGroupEntry<'_> {
    wgpu::BindGroupEntry {
        binding,
        resource: buffer.as_entire_binding(),
    }
}

/// Everything needed to build a fullscreen pipeline.
pub struct ScreenSpacePipelineDef<'a> {
    /// Label prefix for the pipeline and its layout.
    pub label: &'a str,
    /// Module providing `vs_main` and `fs_main`.
    pub shader: &'a wgpu::ShaderModule,
    /// Color target format.
    pub format: wgpu::TextureFormat,
    /// Optional blending for the color target.
    pub blend: Option<wgpu::BlendState>,
    /// Bind group layouts in group order.
    pub bind_group_layouts: &'a [&'a wgpu::BindGroupLayout],
}

/// Create a full-screen render pipeline with `vs_main` / `fs_main` entry
/// points, no vertex buffers, and a single color target.
#[must_use]
pub fn create_screen_space_pipeline(
    device: &wgpu::Device,
    def: &ScreenSpacePipelineDef<'_>,
) -> wgpu::RenderPipeline {
    let pipeline_layout =
        device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some(&format!("{} Pipeline Layout", def.label)),
            bind_group_layouts: def.bind_group_layouts,
            push_constant_ranges: &[],
        });
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(&format!("{} Pipeline", def.label)),
        layout: Some(&pipeline_layout),
        vertex: wgpu::VertexState {
            module: def.shader,
            entry_point: Some("vs_main"),
            buffers: &[],
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: def.shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format: def.format,
                blend: def.blend,
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState::default(),
        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
        cache: None,
    })
}

const ADD_ONE_ONE: wgpu::BlendComponent = wgpu::BlendComponent {
    src_factor: wgpu::BlendFactor::One,
    dst_factor: wgpu::BlendFactor::One,
    operation: wgpu::BlendOperation::Add,
};

/// Additive blending (`dst + src`) used when accumulating bloom levels.
pub const ADDITIVE_BLEND: wgpu::BlendState = wgpu::BlendState {
    color: ADD_ONE_ONE,
    alpha: ADD_ONE_ONE,
};

/// Bilinear sampler clamped at the edges, used by every fullscreen pass.
#[must_use]
pub fn linear_sampler(device: &wgpu::Device, label: &str) -> wgpu::Sampler {
    clamped_sampler(device, label, None)
}

/// Linear `LessEqual` comparison sampler for hardware PCF shadow lookups.
#[must_use]
pub fn shadow_sampler(device: &wgpu::Device, label: &str) -> wgpu::Sampler {
    clamped_sampler(device, label, Some(wgpu::CompareFunction::LessEqual))
}

fn clamped_sampler(
    device: &wgpu::Device,
    label: &str,
    compare: Option<wgpu::CompareFunction>,
) -> wgpu::Sampler {
    let clamp = wgpu::AddressMode::ClampToEdge;
    let linear = wgpu::FilterMode::Linear;
    device.create_sampler(&wgpu::SamplerDescriptor {
        label: Some(label),
        address_mode_u: clamp,
        address_mode_v: clamp,
        address_mode_w: clamp,
        mag_filter: linear,
        min_filter: linear,
        compare,
        ..Default::default()
    })
}

/// Begin a render pass with one color attachment and no depth.
#[must_use]
pub fn begin_screen_pass<'e>(
    encoder: &'e mut wgpu::CommandEncoder,
    label: &str,
    target: &wgpu::TextureView,
    load: wgpu::LoadOp<wgpu::Color>,
) -> wgpu::RenderPass<'e> {
    encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
        label: Some(label),
        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
            view: target,
            resolve_target: None,
            ops: wgpu::Operations {
                load,
                store: wgpu::StoreOp::Store,
            },
            depth_slice: None,
        })],
        depth_stencil_attachment: None,
        ..Default::default()
    })
}
