use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

use crate::render::{RenderCtx, RenderTarget};
use crate::shading::{FrameUniforms, LitUniforms};

use super::common::{align_to, depth_state, min_binding_size};
use super::mesh::{Mesh, MeshVertex};
use super::texture::TextureImage;
use super::LIT_SHADER;

/// Renderer for textured meshes lit by a single point light.
///
/// Holds one mesh and one texture; `render` draws the mesh once per
/// `LitUniforms` entry. Per-object uniforms live in one buffer addressed with
/// dynamic offsets.
pub struct LitRenderer {
    mesh: Mesh,
    texture: TextureImage,
    texture_dirty: bool,

    pipeline_key: Option<(wgpu::TextureFormat, wgpu::TextureFormat)>,
    pipeline: Option<wgpu::RenderPipeline>,

    bind_group_layout: Option<wgpu::BindGroupLayout>,
    bind_group: Option<wgpu::BindGroup>,

    object_ubo: Option<wgpu::Buffer>,
    object_capacity: usize,
    object_stride: u64,

    vbo: Option<wgpu::Buffer>,
    ibo: Option<wgpu::Buffer>,
    index_count: u32,

    texture_view: Option<wgpu::TextureView>,
    sampler: Option<wgpu::Sampler>,
}

impl LitRenderer {
    pub fn new(mesh: Mesh, texture: TextureImage) -> Self {
        Self {
            mesh,
            texture,
            texture_dirty: true,
            pipeline_key: None,
            pipeline: None,
            bind_group_layout: None,
            bind_group: None,
            object_ubo: None,
            object_capacity: 0,
            object_stride: 0,
            vbo: None,
            ibo: None,
            index_count: 0,
            texture_view: None,
            sampler: None,
        }
    }

    /// Replaces the texture; uploaded on the next `render`.
    pub fn set_texture(&mut self, texture: TextureImage) {
        self.texture = texture;
        self.texture_dirty = true;
    }

    pub fn render(
        &mut self,
        ctx: &RenderCtx<'_>,
        target: &mut RenderTarget<'_>,
        frame: &FrameUniforms,
        objects: &[LitUniforms],
    ) {
        if objects.is_empty() || self.mesh.is_empty() {
            return;
        }

        self.ensure_pipeline(ctx);
        self.ensure_mesh_buffers(ctx);
        self.ensure_texture(ctx);
        self.ensure_object_capacity(ctx, objects.len());
        self.ensure_bindings(ctx);

        let Some(ubo) = self.object_ubo.as_ref() else { return };
        let stride = self.object_stride as usize;
        let mut staging = vec![0u8; stride * objects.len()];
        for (i, object) in objects.iter().enumerate() {
            let uniform = LitUniform::new(frame, object);
            let bytes = bytemuck::bytes_of(&uniform);
            staging[i * stride..i * stride + bytes.len()].copy_from_slice(bytes);
        }
        ctx.queue.write_buffer(ubo, 0, &staging);

        let Some(pipeline) = self.pipeline.as_ref() else { return };
        let Some(bind_group) = self.bind_group.as_ref() else { return };
        let Some(vbo) = self.vbo.as_ref() else { return };
        let Some(ibo) = self.ibo.as_ref() else { return };

        let mut rpass = target.begin_pass("groundline lit pass");
        rpass.set_pipeline(pipeline);
        rpass.set_vertex_buffer(0, vbo.slice(..));
        rpass.set_index_buffer(ibo.slice(..), wgpu::IndexFormat::Uint16);

        for i in 0..objects.len() {
            let offset = (i as u64 * self.object_stride) as u32;
            rpass.set_bind_group(0, bind_group, &[offset]);
            rpass.draw_indexed(0..self.index_count, 0, 0..1);
        }
    }

    // ── private helpers ────────────────────────────────────────────────────

    fn ensure_pipeline(&mut self, ctx: &RenderCtx<'_>) {
        let key = (ctx.surface_format, ctx.depth_format);
        if self.pipeline_key == Some(key) && self.pipeline.is_some() {
            return;
        }
        log::debug!("creating lit pipeline for {:?}/{:?}", key.0, key.1);

        let shader = ctx.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("groundline lit shader"),
            source: wgpu::ShaderSource::Wgsl(LIT_SHADER.into()),
        });

        let bind_group_layout =
            ctx.device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("groundline lit bgl"),
                entries: &[
                    wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                        ty: wgpu::BindingType::Buffer {
                            ty: wgpu::BufferBindingType::Uniform,
                            has_dynamic_offset: true,
                            min_binding_size: Some(min_binding_size::<LitUniform>()),
                        },
                        count: None,
                    },
                    wgpu::BindGroupLayoutEntry {
                        binding: 1,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Texture {
                            sample_type: wgpu::TextureSampleType::Float { filterable: true },
                            view_dimension: wgpu::TextureViewDimension::D2,
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

        let pipeline_layout =
            ctx.device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("groundline lit pipeline layout"),
                bind_group_layouts: &[&bind_group_layout],
                immediate_size: 0,
            });

        let pipeline = ctx.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("groundline lit pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[MeshVertex::layout()],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
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
                cull_mode: Some(wgpu::Face::Back),
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: Some(depth_state(ctx.depth_format, wgpu::CompareFunction::Less)),
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        self.pipeline_key = Some(key);
        self.pipeline = Some(pipeline);
        self.bind_group_layout = Some(bind_group_layout);
        self.bind_group = None;
    }

    fn ensure_mesh_buffers(&mut self, ctx: &RenderCtx<'_>) {
        if self.vbo.is_some() && self.ibo.is_some() {
            return;
        }

        self.vbo = Some(ctx.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("groundline lit vbo"),
            contents: bytemuck::cast_slice(&self.mesh.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        }));

        self.ibo = Some(ctx.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("groundline lit ibo"),
            contents: bytemuck::cast_slice(&self.mesh.indices),
            usage: wgpu::BufferUsages::INDEX,
        }));

        self.index_count = self.mesh.indices.len() as u32;
    }

    fn ensure_texture(&mut self, ctx: &RenderCtx<'_>) {
        if self.sampler.is_none() {
            self.sampler = Some(ctx.device.create_sampler(&wgpu::SamplerDescriptor {
                label: Some("groundline lit sampler"),
                address_mode_u: wgpu::AddressMode::Repeat,
                address_mode_v: wgpu::AddressMode::Repeat,
                address_mode_w: wgpu::AddressMode::Repeat,
                mag_filter: wgpu::FilterMode::Nearest,
                min_filter: wgpu::FilterMode::Linear,
                ..Default::default()
            }));
        }

        if !self.texture_dirty && self.texture_view.is_some() {
            return;
        }

        let size = wgpu::Extent3d {
            width: self.texture.width(),
            height: self.texture.height(),
            depth_or_array_layers: 1,
        };
        let texture = ctx.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("groundline lit texture"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        ctx.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            self.texture.pixels(),
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(self.texture.width() * 4),
                rows_per_image: Some(self.texture.height()),
            },
            size,
        );

        self.texture_view = Some(texture.create_view(&wgpu::TextureViewDescriptor::default()));
        self.texture_dirty = false;
        self.bind_group = None;
    }

    fn ensure_object_capacity(&mut self, ctx: &RenderCtx<'_>, required: usize) {
        if required <= self.object_capacity && self.object_ubo.is_some() {
            return;
        }

        let alignment = ctx.device.limits().min_uniform_buffer_offset_alignment as u64;
        let stride = align_to(std::mem::size_of::<LitUniform>() as u64, alignment);
        let new_cap = required.next_power_of_two().max(8);

        self.object_ubo = Some(ctx.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("groundline lit object ubo"),
            size: stride * new_cap as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        }));
        self.object_stride = stride;
        self.object_capacity = new_cap;
        self.bind_group = None;
    }

    fn ensure_bindings(&mut self, ctx: &RenderCtx<'_>) {
        if self.bind_group.is_some() {
            return;
        }
        let Some(bgl) = self.bind_group_layout.as_ref() else { return };
        let Some(ubo) = self.object_ubo.as_ref() else { return };
        let Some(view) = self.texture_view.as_ref() else { return };
        let Some(sampler) = self.sampler.as_ref() else { return };

        self.bind_group = Some(ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("groundline lit bind group"),
            layout: bgl,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                        buffer: ubo,
                        offset: 0,
                        size: Some(min_binding_size::<LitUniform>()),
                    }),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
            ],
        }));
    }
}

// ── GPU types ─────────────────────────────────────────────────────────────

/// Uniform block layout (224 bytes):
///
///  offset   0  model        mat4x4
///  offset  64  view         mat4x4
///  offset 128  projection   mat4x4
///  offset 192  light_pos    vec4   (.w unused)
///  offset 208  normal_mode  u32
///  offset 212  _pad         u32 x3
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct LitUniform {
    model: [[f32; 4]; 4],
    view: [[f32; 4]; 4],
    projection: [[f32; 4]; 4],
    light_pos: [f32; 4],
    normal_mode: u32,
    _pad: [u32; 3],
}

impl LitUniform {
    fn new(frame: &FrameUniforms, object: &LitUniforms) -> Self {
        Self {
            model: object.model.to_cols_array_2d(),
            view: frame.view.to_cols_array_2d(),
            projection: frame.projection.to_cols_array_2d(),
            light_pos: object.light_position.extend(1.0).to_array(),
            normal_mode: object.normal_mode.as_gpu(),
            _pad: [0; 3],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shading::NormalMode;

    #[test]
    fn uniform_matches_wgsl_layout() {
        assert_eq!(std::mem::size_of::<LitUniform>(), 224);
        assert_eq!(std::mem::offset_of!(LitUniform, light_pos), 192);
        assert_eq!(std::mem::offset_of!(LitUniform, normal_mode), 208);
    }

    #[test]
    fn uniform_encodes_normal_mode() {
        let frame = FrameUniforms::default();
        let flat = LitUniform::new(&frame, &LitUniforms::default());
        let smooth = LitUniform::new(
            &frame,
            &LitUniforms { normal_mode: NormalMode::Vertex, ..Default::default() },
        );
        assert_eq!(flat.normal_mode, 0);
        assert_eq!(smooth.normal_mode, 1);
        assert_eq!(flat.light_pos, [0.0, 0.0, 0.0, 1.0]);
    }
}
