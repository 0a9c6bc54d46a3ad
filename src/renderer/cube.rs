//! Instanced rounded-box renderer for the cube field.
//!
//! One static mesh is drawn `stride³` times. Per-instance data (model matrix
//! and color) is rebuilt from the animator each frame into a reused scratch
//! vector and uploaded to a growable vertex buffer.

use glam::Mat4;
use wgpu::util::DeviceExt;

use crate::error::CubefieldError;
use crate::field::FieldAnimator;
use crate::gpu::dynamic_buffer::TypedBuffer;
use crate::gpu::render_context::RenderContext;
use crate::gpu::shader_composer::{Shader, ShaderComposer};
use crate::renderer::geometry::{rounded_box, MeshVertex};
use crate::renderer::pipeline_util::{
    depth_stencil_state, hdr_fragment_targets, DEPTH_FORMAT,
};

/// Rounded box dimensions shared by every instance.
const CUBE_SIZE: f32 = 1.0;
const CUBE_SEGMENTS: u32 = 2;
const CUBE_RADIUS: f32 = 0.15;

/// Per-instance vertex data.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CubeInstance {
    /// Object → world transform (group rotation · translation).
    pub model: [[f32; 4]; 4],
    /// Linear RGB color, alpha unused.
    pub color: [f32; 4],
}

impl CubeInstance {
    /// Build the instance data for every cube of the field.
    pub fn collect(field: &FieldAnimator, out: &mut Vec<Self>) {
        let group = field.group_transform();
        out.clear();
        out.extend(field.instances().iter().map(|instance| Self {
            model: (group * Mat4::from_translation(instance.position))
                .to_cols_array_2d(),
            color: instance.color.extend(1.0).to_array(),
        }));
    }
}

const MESH_ATTRIBUTES: [wgpu::VertexAttribute; 2] =
    wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3];

const INSTANCE_ATTRIBUTES: [wgpu::VertexAttribute; 5] = wgpu::vertex_attr_array![
    2 => Float32x4,
    3 => Float32x4,
    4 => Float32x4,
    5 => Float32x4,
    6 => Float32x4,
];

/// Vertex buffer layouts: slot 0 mesh vertices, slot 1 instances.
#[must_use]
pub fn vertex_layouts() -> [wgpu::VertexBufferLayout<'static>; 2] {
    [
        wgpu::VertexBufferLayout {
            array_stride: size_of::<MeshVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &MESH_ATTRIBUTES,
        },
        wgpu::VertexBufferLayout {
            array_stride: size_of::<CubeInstance>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &INSTANCE_ATTRIBUTES,
        },
    ]
}

/// Bind groups the shaded cube pass needs.
pub struct CubeBindGroups<'a> {
    /// Camera uniform (group 0).
    pub camera: &'a wgpu::BindGroup,
    /// Lighting uniform, shadow map, and shadow sampler (group 1).
    pub lighting: &'a wgpu::BindGroup,
}

/// Draws the field's instances with Lambert shading into the HDR targets.
pub struct CubeRenderer {
    pipeline: wgpu::RenderPipeline,
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
    instances: TypedBuffer<CubeInstance>,
    scratch: Vec<CubeInstance>,
}

impl CubeRenderer {
    /// Upload the rounded-box mesh and build the shaded pipeline.
    ///
    /// # Errors
    ///
    /// Returns [`CubefieldError::ShaderCompose`] if a shader fails to
    /// compose.
    pub fn new(
        context: &RenderContext,
        shader_composer: &mut ShaderComposer,
        camera_layout: &wgpu::BindGroupLayout,
        lighting_layout: &wgpu::BindGroupLayout,
        capacity: usize,
    ) -> Result<Self, CubefieldError> {
        let mesh = rounded_box(
            CUBE_SIZE,
            CUBE_SIZE,
            CUBE_SIZE,
            CUBE_SEGMENTS,
            CUBE_RADIUS,
        );
        let vertex_buffer = context.device.create_buffer_init(
            &wgpu::util::BufferInitDescriptor {
                label: Some("Cube Vertices"),
                contents: bytemuck::cast_slice(&mesh.vertices),
                usage: wgpu::BufferUsages::VERTEX,
            },
        );
        let index_buffer = context.device.create_buffer_init(
            &wgpu::util::BufferInitDescriptor {
                label: Some("Cube Indices"),
                contents: bytemuck::cast_slice(&mesh.indices),
                usage: wgpu::BufferUsages::INDEX,
            },
        );

        let shader = shader_composer.compose(&context.device, Shader::Cube)?;
        let pipeline_layout = context.device.create_pipeline_layout(
            &wgpu::PipelineLayoutDescriptor {
                label: Some("Cube Pipeline Layout"),
                bind_group_layouts: &[camera_layout, lighting_layout],
                push_constant_ranges: &[],
            },
        );
        let pipeline = context.device.create_render_pipeline(
            &wgpu::RenderPipelineDescriptor {
                label: Some("Cube Pipeline"),
                layout: Some(&pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &shader,
                    entry_point: Some("vs_main"),
                    buffers: &vertex_layouts(),
                    compilation_options: Default::default(),
                },
                fragment: Some(wgpu::FragmentState {
                    module: &shader,
                    entry_point: Some("fs_main"),
                    targets: &hdr_fragment_targets(),
                    compilation_options: Default::default(),
                }),
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    cull_mode: Some(wgpu::Face::Back),
                    ..Default::default()
                },
                depth_stencil: Some(depth_stencil_state(
                    DEPTH_FORMAT,
                    wgpu::DepthBiasState::default(),
                )),
                multisample: wgpu::MultisampleState::default(),
                multiview: None,
                cache: None,
            },
        );

        let instances = TypedBuffer::with_capacity(
            &context.device,
            "Cube Instances",
            capacity,
            wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        );

        Ok(Self {
            pipeline,
            vertex_buffer,
            index_buffer,
            index_count: mesh.indices.len() as u32,
            instances,
            scratch: Vec::with_capacity(capacity),
        })
    }

    /// Rebuild instance data from the animator and upload it.
    pub fn update_instances(
        &mut self,
        context: &RenderContext,
        field: &FieldAnimator,
    ) {
        CubeInstance::collect(field, &mut self.scratch);
        let _ = self.instances.write(
            &context.device,
            &context.queue,
            &self.scratch,
        );
    }

    /// Number of instances uploaded by the last update.
    #[must_use]
    pub fn instance_count(&self) -> u32 {
        self.instances.count() as u32
    }

    /// Draw the shaded instances. The pass must target the HDR color and
    /// normal attachments with scene depth.
    pub fn draw(
        &self,
        pass: &mut wgpu::RenderPass<'_>,
        bind_groups: &CubeBindGroups<'_>,
    ) {
        if self.instances.is_empty() {
            return;
        }
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, bind_groups.camera, &[]);
        pass.set_bind_group(1, bind_groups.lighting, &[]);
        self.draw_geometry(pass);
    }

    /// Bind mesh and instance buffers and issue the instanced draw. The
    /// caller sets the pipeline and bind groups.
    pub fn draw_geometry(&self, pass: &mut wgpu::RenderPass<'_>) {
        if self.instances.is_empty() {
            return;
        }
        pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        pass.set_vertex_buffer(1, self.instances.buffer().slice(..));
        pass.set_index_buffer(
            self.index_buffer.slice(..),
            wgpu::IndexFormat::Uint32,
        );
        pass.draw_indexed(0..self.index_count, 0, 0..self.instance_count());
    }
}

#[cfg(test)]
mod tests {
    use glam::{Vec3, Vec4Swizzles};

    use super::*;
    use crate::options::FieldOptions;

    #[test]
    fn instance_layout_matches_shader() {
        assert_eq!(size_of::<CubeInstance>(), 80);
        assert_eq!(size_of::<MeshVertex>(), 24);
        let layouts = vertex_layouts();
        assert_eq!(layouts[1].attributes.len(), 5);
        assert_eq!(layouts[1].attributes[4].offset, 64);
    }

    #[test]
    fn collect_covers_every_cube() {
        let field = FieldAnimator::new(&FieldOptions::default());
        let mut out = Vec::new();
        CubeInstance::collect(&field, &mut out);
        assert_eq!(out.len(), 64);
        assert!(out.iter().all(|i| i.color == [1.0, 1.0, 1.0, 1.0]));
    }

    #[test]
    fn model_places_cube_at_rotated_position() {
        let mut field = FieldAnimator::new(&FieldOptions::default());
        field.step(Vec3::splat(1000.0), 0.0, 1.0);
        let mut out = Vec::new();
        CubeInstance::collect(&field, &mut out);

        let model = Mat4::from_cols_array_2d(&out[0].model);
        let origin = (model * Vec3::ZERO.extend(1.0)).xyz();
        let expected = field
            .group_transform()
            .transform_point3(field.instances()[0].position);
        assert!(origin.distance(expected) < 1e-5);
        assert!(field.rotation_y() > 0.0);
    }

    #[test]
    fn collect_reuses_scratch() {
        let field = FieldAnimator::new(&FieldOptions::default());
        let mut out = Vec::new();
        CubeInstance::collect(&field, &mut out);
        let capacity = out.capacity();
        CubeInstance::collect(&field, &mut out);
        assert_eq!(out.len(), 64);
        assert_eq!(out.capacity(), capacity);
    }
}
