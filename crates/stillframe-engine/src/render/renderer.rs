use bytemuck::{Pod, Zeroable};

use crate::device::DEPTH_FORMAT;
use crate::options::{RenderOptions, ShadeMode};
use crate::render::{Camera, GpuMesh, RenderCtx, RenderTarget};

use super::mesh::{EdgeInstance, Vertex};

// Headlight material: ambient, diffuse, specular, shininess.
const LIGHT: [f32; 4] = [0.25, 0.75, 0.2, 32.0];

/// Draws one mesh per frame: a clear pass, then either the lit surface (with
/// an optional wireframe overlay) or, for point clouds, screen-space sprites.
///
/// Pipelines are built lazily for the target format and culling mode and
/// rebuilt only when either changes.
#[derive(Default)]
pub struct MeshRenderer {
    pipeline_key: Option<PipelineKey>,
    surface_pipeline: Option<wgpu::RenderPipeline>,
    edge_pipeline: Option<wgpu::RenderPipeline>,
    point_pipeline: Option<wgpu::RenderPipeline>,

    bind_group_layout: Option<wgpu::BindGroupLayout>,
    bind_group: Option<wgpu::BindGroup>,
    globals_ubo: Option<wgpu::Buffer>,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
struct PipelineKey {
    format: wgpu::TextureFormat,
    cull_back_faces: bool,
}

impl MeshRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears `target` to the background color and draws `mesh` if present.
    pub fn render(
        &mut self,
        ctx: &RenderCtx<'_>,
        target: &mut RenderTarget<'_>,
        mesh: Option<&GpuMesh>,
        camera: &Camera,
        options: &RenderOptions,
    ) {
        self.ensure_pipelines(
            ctx,
            PipelineKey {
                format: ctx.target_format,
                cull_back_faces: !options.mesh_show_back_face,
            },
        );
        self.ensure_bindings(ctx);

        if let Some(mesh) = mesh {
            self.write_globals(ctx, mesh, camera, options);
        }

        let mut rpass = target.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("stillframe mesh pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target.color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(options.clear_color()),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: target.depth_view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        let Some(mesh) = mesh else { return };
        let Some(bind_group) = self.bind_group.as_ref() else { return };
        rpass.set_bind_group(0, bind_group, &[]);

        match mesh.indices.as_ref() {
            None => {
                let Some(pipeline) = self.point_pipeline.as_ref() else { return };
                rpass.set_pipeline(pipeline);
                rpass.set_vertex_buffer(0, mesh.vertices.slice(..));
                rpass.draw(0..6, 0..mesh.vertex_count);
            }
            Some(indices) => {
                let Some(pipeline) = self.surface_pipeline.as_ref() else { return };
                rpass.set_pipeline(pipeline);
                rpass.set_vertex_buffer(0, mesh.vertices.slice(..));
                rpass.set_index_buffer(indices.slice(..), wgpu::IndexFormat::Uint32);
                rpass.draw_indexed(0..mesh.index_count, 0, 0..1);

                if options.mesh_show_wireframe {
                    if let (Some(pipeline), Some(edges)) =
                        (self.edge_pipeline.as_ref(), mesh.edges.as_ref())
                    {
                        rpass.set_pipeline(pipeline);
                        rpass.set_vertex_buffer(0, edges.slice(..));
                        rpass.draw(0..6, 0..mesh.edge_count);
                    }
                }
            }
        }
    }

    fn ensure_pipelines(&mut self, ctx: &RenderCtx<'_>, key: PipelineKey) {
        if self.pipeline_key == Some(key) && self.surface_pipeline.is_some() {
            return;
        }

        let shader = ctx.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("stillframe mesh shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/mesh.wgsl").into()),
        });

        let bind_group_layout = match self.bind_group_layout.take() {
            Some(bgl) => bgl,
            None => ctx
                .device
                .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                    label: Some("stillframe mesh bgl"),
                    entries: &[wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                        ty: wgpu::BindingType::Buffer {
                            ty: wgpu::BufferBindingType::Uniform,
                            has_dynamic_offset: false,
                            min_binding_size: wgpu::BufferSize::new(
                                std::mem::size_of::<Globals>() as u64,
                            ),
                        },
                        count: None,
                    }],
                }),
        };

        let pipeline_layout = ctx
            .device
            .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("stillframe mesh pipeline layout"),
                bind_group_layouts: &[&bind_group_layout],
                immediate_size: 0,
            });

        let (device, layout, format) = (ctx.device, &pipeline_layout, key.format);

        // The surface is pushed back slightly so wireframe edges win the depth test.
        let surface = create_pipeline(device, layout, &shader, format, PipelineDesc {
            label: "stillframe surface pipeline",
            vs: "vs_surface",
            fs: "fs_surface",
            buffers: &[Vertex::layout(wgpu::VertexStepMode::Vertex)],
            cull_mode: key.cull_back_faces.then_some(wgpu::Face::Back),
            depth_bias: wgpu::DepthBiasState {
                constant: 2,
                slope_scale: 1.0,
                clamp: 0.0,
            },
        });
        let edges = create_pipeline(device, layout, &shader, format, PipelineDesc {
            label: "stillframe edge pipeline",
            vs: "vs_edge",
            fs: "fs_edge",
            buffers: &[EdgeInstance::layout()],
            cull_mode: None,
            depth_bias: wgpu::DepthBiasState::default(),
        });
        let points = create_pipeline(device, layout, &shader, format, PipelineDesc {
            label: "stillframe point pipeline",
            vs: "vs_point",
            fs: "fs_point",
            buffers: &[Vertex::layout(wgpu::VertexStepMode::Instance)],
            cull_mode: None,
            depth_bias: wgpu::DepthBiasState::default(),
        });

        log::debug!("mesh pipelines built for {key:?}");

        self.pipeline_key = Some(key);
        self.surface_pipeline = Some(surface);
        self.edge_pipeline = Some(edges);
        self.point_pipeline = Some(points);
        self.bind_group_layout = Some(bind_group_layout);
    }

    fn ensure_bindings(&mut self, ctx: &RenderCtx<'_>) {
        if self.bind_group.is_some() && self.globals_ubo.is_some() {
            return;
        }
        let Some(bgl) = self.bind_group_layout.as_ref() else { return };

        let globals_ubo = ctx.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("stillframe globals ubo"),
            size: std::mem::size_of::<Globals>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("stillframe globals bind group"),
            layout: bgl,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: globals_ubo.as_entire_binding(),
            }],
        });

        self.globals_ubo = Some(globals_ubo);
        self.bind_group = Some(bind_group);
    }

    fn write_globals(
        &self,
        ctx: &RenderCtx<'_>,
        mesh: &GpuMesh,
        camera: &Camera,
        options: &RenderOptions,
    ) {
        let Some(ubo) = self.globals_ubo.as_ref() else { return };
        let globals = Globals::new(ctx, mesh, camera, options);
        ctx.queue.write_buffer(ubo, 0, bytemuck::bytes_of(&globals));
    }
}

struct PipelineDesc<'a> {
    label: &'a str,
    vs: &'a str,
    fs: &'a str,
    buffers: &'a [wgpu::VertexBufferLayout<'a>],
    cull_mode: Option<wgpu::Face>,
    depth_bias: wgpu::DepthBiasState,
}

fn create_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    shader: &wgpu::ShaderModule,
    format: wgpu::TextureFormat,
    desc: PipelineDesc<'_>,
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(desc.label),
        layout: Some(layout),

        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some(desc.vs),
            compilation_options: Default::default(),
            buffers: desc.buffers,
        },

        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some(desc.fs),
            compilation_options: Default::default(),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: None,
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),

        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: desc.cull_mode,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },

        depth_stencil: Some(wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::LessEqual,
            stencil: wgpu::StencilState::default(),
            bias: desc.depth_bias,
        }),
        multisample: wgpu::MultisampleState::default(),

        multiview_mask: None,
        cache: None,
    })
}

// ── uniforms ──────────────────────────────────────────────────────────────

/// Mirrors `Globals` in `mesh.wgsl`.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
struct Globals {
    view_proj: [[f32; 4]; 4],
    eye: [f32; 4],
    base_color: [f32; 4],
    light: [f32; 4],
    flags: [u32; 4],
    bounds_min: [f32; 4],
    bounds_max: [f32; 4],
    viewport: [f32; 4],
}

impl Globals {
    fn new(ctx: &RenderCtx<'_>, mesh: &GpuMesh, camera: &Camera, options: &RenderOptions) -> Self {
        Self::from_parts(
            ctx.size,
            camera,
            options,
            mesh.is_point_cloud(),
            mesh.has_colors,
            mesh.bounds(),
        )
    }

    fn from_parts(
        size: (u32, u32),
        camera: &Camera,
        options: &RenderOptions,
        point_cloud: bool,
        has_colors: bool,
        bounds: stillframe_ply::Bounds,
    ) -> Self {
        let (w, h) = (size.0.max(1) as f32, size.1.max(1) as f32);

        let color_mode = if point_cloud {
            options.point_color_option
        } else {
            options.mesh_color_option
        };
        // Point clouds have no faces to derive flat normals from.
        let smooth = point_cloud || options.mesh_shade_option == ShadeMode::Smooth;

        let base = options
            .default_mesh_color
            .map(|c| crate::options::srgb_to_linear(c.clamp(0.0, 1.0)));

        Self {
            view_proj: camera.view_proj(w / h).to_cols_array_2d(),
            eye: camera.eye().extend(1.0).to_array(),
            base_color: [base[0], base[1], base[2], 1.0],
            light: LIGHT,
            flags: [
                u32::from(options.light_on),
                u32::from(smooth),
                color_mode.shader_code(),
                u32::from(has_colors),
            ],
            bounds_min: [bounds.min[0], bounds.min[1], bounds.min[2], 0.0],
            bounds_max: [bounds.max[0], bounds.max[1], bounds.max[2], 0.0],
            viewport: [w, h, options.point_size, options.line_width],
        }
    }
}
