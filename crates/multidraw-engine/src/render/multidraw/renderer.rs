use anyhow::{Context, Result};
use bytemuck::{Pod, Zeroable};
use glam::Mat4;
use wgpu::util::DeviceExt;

use crate::render::shader::compile_stage;
use crate::render::{RenderCtx, RenderTarget};

use super::geometry::{DrawCommand, DrawScene, Vertex2D};
use super::texture::{LayerColors, LayerTexture};
use super::{FRAGMENT_SHADER, VERTEX_SHADER};

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct LightUniform {
    position: [f32; 2],
    _pad: [f32; 2], // 16-byte alignment
}

impl LightUniform {
    fn new(position: [f32; 2]) -> Self {
        Self {
            position,
            _pad: [0.0; 2],
        }
    }
}

// ── vertex layouts ────────────────────────────────────────────────────────

const VERTEX_ATTRS: [wgpu::VertexAttribute; 2] = wgpu::vertex_attr_array![
    0 => Float32x2, // position
    1 => Float32x2  // tex_coord
];

// The indirect buffer doubles as the per-instance draw id source: instance
// `first_instance` reads the `first_instance` field of its own command.
const DRAW_ID_ATTRS: [wgpu::VertexAttribute; 1] = [wgpu::VertexAttribute {
    format: wgpu::VertexFormat::Uint32,
    offset: std::mem::offset_of!(DrawCommand, first_instance) as u64,
    shader_location: 2,
}];

const TRANSFORM_ATTRS: [wgpu::VertexAttribute; 4] = wgpu::vertex_attr_array![
    3 => Float32x4,
    4 => Float32x4,
    5 => Float32x4,
    6 => Float32x4
];

fn vertex_layouts() -> [wgpu::VertexBufferLayout<'static>; 3] {
    [
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex2D>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &VERTEX_ATTRS,
        },
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<DrawCommand>() as u64,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &DRAW_ID_ATTRS,
        },
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Mat4>() as u64,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &TRANSFORM_ATTRS,
        },
    ]
}

/// Draws a whole [`DrawScene`] with a single indexed multi-draw-indirect call.
///
/// Owns every GPU object the scene needs; they are created once in
/// [`MultiDrawRenderer::new`] and released when the renderer is dropped. The
/// only per-frame upload is the light position.
pub struct MultiDrawRenderer {
    pipeline_format: wgpu::TextureFormat,
    pipeline: wgpu::RenderPipeline,
    bind_group: wgpu::BindGroup,

    light_ubo: wgpu::Buffer,
    light: [f32; 2],

    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    transform_buffer: wgpu::Buffer,
    /// `INDIRECT | VERTEX`: draw commands and the draw id attribute.
    indirect_buffer: wgpu::Buffer,
    draw_count: u32,

    _layers: LayerTexture,
}

impl MultiDrawRenderer {
    pub fn new(ctx: &RenderCtx<'_>, scene: &DrawScene, colors: &LayerColors) -> Result<Self> {
        anyhow::ensure!(!scene.is_empty(), "scene has no draw commands");
        anyhow::ensure!(
            colors.layer_count() >= scene.draw_count(),
            "{} draws need as many texture layers, got {}",
            scene.draw_count(),
            colors.layer_count()
        );

        let vs = compile_stage(ctx.device, &VERTEX_SHADER)?;
        let fs = compile_stage(ctx.device, &FRAGMENT_SHADER)?;

        let layers = LayerTexture::upload(ctx.device, ctx.queue, colors)
            .context("failed to create layer texture")?;

        let bind_group_layout =
            ctx.device
                .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                    label: Some("multidraw bgl"),
                    entries: &[
                        wgpu::BindGroupLayoutEntry {
                            binding: 0,
                            visibility: wgpu::ShaderStages::FRAGMENT,
                            ty: wgpu::BindingType::Buffer {
                                ty: wgpu::BufferBindingType::Uniform,
                                has_dynamic_offset: false,
                                min_binding_size: wgpu::BufferSize::new(
                                    std::mem::size_of::<LightUniform>() as u64,
                                ),
                            },
                            count: None,
                        },
                        wgpu::BindGroupLayoutEntry {
                            binding: 1,
                            visibility: wgpu::ShaderStages::FRAGMENT,
                            ty: wgpu::BindingType::Texture {
                                sample_type: wgpu::TextureSampleType::Float { filterable: true },
                                view_dimension: wgpu::TextureViewDimension::D2Array,
                                multisampled: false,
                            },
                            count: None,
                        },
                        wgpu::BindGroupLayoutEntry {
                            binding: 2,
                            visibility: wgpu::ShaderStages::FRAGMENT,
                            ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                            count: None,
                        },
                    ],
                });

        let pipeline_layout = ctx
            .device
            .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("multidraw pipeline layout"),
                bind_group_layouts: &[&bind_group_layout],
                immediate_size: 0,
            });

        let buffers = vertex_layouts();
        let pipeline = ctx.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("multidraw pipeline"),
            layout: Some(&pipeline_layout),

            vertex: wgpu::VertexState {
                module: &vs,
                entry_point: Some(VERTEX_SHADER.entry_point),
                compilation_options: Default::default(),
                buffers: &buffers,
            },

            fragment: Some(wgpu::FragmentState {
                module: &fs,
                entry_point: Some(FRAGMENT_SHADER.entry_point),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: ctx.surface_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),

            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },

            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        let light = [0.0, 0.0];
        let light_ubo = ctx.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("multidraw light ubo"),
            contents: bytemuck::bytes_of(&LightUniform::new(light)),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("multidraw bind group"),
            layout: &bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: light_ubo.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&layers.view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&layers.sampler),
                },
            ],
        });

        let vertex_buffer = ctx.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("multidraw vertex buffer"),
            contents: bytemuck::cast_slice(&scene.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let index_buffer = ctx.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("multidraw index buffer"),
            contents: bytemuck::cast_slice(&scene.indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        let transform_buffer = ctx.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("multidraw transform buffer"),
            contents: bytemuck::cast_slice(&scene.transforms),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let indirect_buffer = ctx.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("multidraw indirect buffer"),
            contents: bytemuck::cast_slice(&scene.commands),
            usage: wgpu::BufferUsages::INDIRECT | wgpu::BufferUsages::VERTEX,
        });

        log::info!(
            "multidraw scene ready: {} draws, {} vertices, {} indices, {} texture layers",
            scene.draw_count(),
            scene.vertices.len(),
            scene.indices.len(),
            colors.layer_count()
        );

        Ok(Self {
            pipeline_format: ctx.surface_format,
            pipeline,
            bind_group,
            light_ubo,
            light,
            vertex_buffer,
            index_buffer,
            transform_buffer,
            indirect_buffer,
            draw_count: scene.draw_count(),
            _layers: layers,
        })
    }

    /// Format the pipeline was built for; a different surface format needs a
    /// new renderer.
    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.pipeline_format
    }

    pub fn draw_count(&self) -> u32 {
        self.draw_count
    }

    /// Last value written with [`set_light_position`](Self::set_light_position).
    pub fn light_position(&self) -> [f32; 2] {
        self.light
    }

    pub fn set_light_position(&mut self, queue: &wgpu::Queue, position: [f32; 2]) {
        if position == self.light {
            return;
        }
        self.light = position;
        queue.write_buffer(&self.light_ubo, 0, bytemuck::bytes_of(&LightUniform::new(position)));
    }

    /// Records one pass issuing every draw command with a single call.
    pub fn render(&self, target: &mut RenderTarget<'_>) {
        let mut rpass = target.load_pass("multidraw pass");

        rpass.set_pipeline(&self.pipeline);
        rpass.set_bind_group(0, &self.bind_group, &[]);
        rpass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        rpass.set_vertex_buffer(1, self.indirect_buffer.slice(..));
        rpass.set_vertex_buffer(2, self.transform_buffer.slice(..));
        rpass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint32);

        // Commands are tightly packed from offset 0.
        rpass.multi_draw_indexed_indirect(&self.indirect_buffer, 0, self.draw_count);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn light_uniform_is_sixteen_bytes() {
        assert_eq!(std::mem::size_of::<LightUniform>(), 16);
    }

    #[test]
    fn draw_id_reads_first_instance_of_each_command() {
        let [_, draw_id, _] = vertex_layouts();
        assert_eq!(draw_id.array_stride, 20);
        assert_eq!(draw_id.step_mode, wgpu::VertexStepMode::Instance);
        assert_eq!(draw_id.attributes[0].offset, 16);
        assert_eq!(draw_id.attributes[0].format, wgpu::VertexFormat::Uint32);
    }

    #[test]
    fn transform_is_four_instance_columns() {
        let [_, _, transform] = vertex_layouts();
        assert_eq!(transform.array_stride, 64);
        assert_eq!(transform.step_mode, wgpu::VertexStepMode::Instance);
        let locations: Vec<u32> = transform.attributes.iter().map(|a| a.shader_location).collect();
        assert_eq!(locations, vec![3, 4, 5, 6]);
        let offsets: Vec<u64> = transform.attributes.iter().map(|a| a.offset).collect();
        assert_eq!(offsets, vec![0, 16, 32, 48]);
    }

    #[test]
    fn vertex_layout_is_per_vertex() {
        let [vertex, _, _] = vertex_layouts();
        assert_eq!(vertex.array_stride, 16);
        assert_eq!(vertex.step_mode, wgpu::VertexStepMode::Vertex);
    }
}
