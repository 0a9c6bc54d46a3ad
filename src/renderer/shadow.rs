//! Depth-only render of the cube instances from the spot light.

use crate::error::CubefieldError;
use crate::gpu::lighting::{Lighting, SHADOW_FORMAT};
use crate::gpu::render_context::RenderContext;
use crate::gpu::shader_composer::{Shader, ShaderComposer};
use crate::renderer::cube::{vertex_layouts, CubeRenderer};
use crate::renderer::pipeline_util::depth_stencil_state;

/// Slope-scaled bias against shadow acne on the rounded edges.
const SHADOW_DEPTH_BIAS: wgpu::DepthBiasState = wgpu::DepthBiasState {
    constant: 2,
    slope_scale: 2.0,
    clamp: 0.0,
};

/// Renders the spot light's shadow map.
pub struct ShadowPass {
    pipeline: wgpu::RenderPipeline,
}

impl ShadowPass {
    /// Build the depth-only pipeline against the lighting's shadow layout.
    ///
    /// # Errors
    ///
    /// Returns [`CubefieldError::ShaderCompose`] if a shader fails to
    /// compose.
    pub fn new(
        context: &RenderContext,
        shader_composer: &mut ShaderComposer,
        lighting: &Lighting,
    ) -> Result<Self, CubefieldError> {
        let shader =
            shader_composer.compose(&context.device, Shader::CubeShadow)?;
        let pipeline_layout = context.device.create_pipeline_layout(
            &wgpu::PipelineLayoutDescriptor {
                label: Some("Shadow Pipeline Layout"),
                bind_group_layouts: &[&lighting.shadow_layout],
                push_constant_ranges: &[],
            },
        );
        let pipeline = context.device.create_render_pipeline(
            &wgpu::RenderPipelineDescriptor {
                label: Some("Shadow Pipeline"),
                layout: Some(&pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &shader,
                    entry_point: Some("vs_main"),
                    buffers: &vertex_layouts(),
                    compilation_options: Default::default(),
                },
                fragment: None,
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    cull_mode: None,
                    ..Default::default()
                },
                depth_stencil: Some(depth_stencil_state(
                    SHADOW_FORMAT,
                    SHADOW_DEPTH_BIAS,
                )),
                multisample: wgpu::MultisampleState::default(),
                multiview: None,
                cache: None,
            },
        );
        Ok(Self { pipeline })
    }

    /// Clear the shadow map and draw every instance into it.
    pub fn render(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        lighting: &Lighting,
        cubes: &CubeRenderer,
    ) {
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Shadow Pass"),
            color_attachments: &[],
            depth_stencil_attachment: Some(
                wgpu::RenderPassDepthStencilAttachment {
                    view: &lighting.shadow_map.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                },
            ),
            ..Default::default()
        });
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &lighting.shadow_bind_group, &[]);
        cubes.draw_geometry(&mut pass);
    }
}
