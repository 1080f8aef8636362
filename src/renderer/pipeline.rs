//! WebGPU render pipeline setup
//!
//! One pipeline, one static vertex buffer per [`Shape`], and an instance
//! buffer rebuilt every frame from the live drawables.

use std::collections::HashMap;

use bytemuck::{Pod, Zeroable};
use slotmap::SlotMap;
use wgpu::util::DeviceExt;

use super::vertex::{InstanceRaw, Vertex, colors};
use super::{Camera, DrawableDesc, DrawableHandle, RenderBackend, Shape, Transform, shapes};
use crate::hex_to_rgb;

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth24Plus;

// Must match `Globals` in shader.wgsl
#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct Globals {
    view_proj: [[f32; 4]; 4], // offset 0
    eye: [f32; 4],            // offset 64
    fog_color: [f32; 4],      // offset 80
    fog_range: [f32; 4],      // offset 96
}

struct GpuMesh {
    vertices: wgpu::Buffer,
    count: u32,
}

#[derive(Debug, Clone, Copy)]
struct Drawable {
    shape: Shape,
    transform: Transform,
    color: u32,
}

/// How much a shape glows regardless of lighting
fn glow(shape: Shape) -> f32 {
    match shape {
        Shape::Monster => 0.5,
        Shape::Bolt | Shape::Spark | Shape::Crystal => 1.0,
        Shape::Staff | Shape::Floor => 0.0,
    }
}

/// Main render state
pub struct SceneRenderer {
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    pipeline: wgpu::RenderPipeline,
    globals_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    depth_view: wgpu::TextureView,
    meshes: HashMap<Shape, GpuMesh>,
    drawables: SlotMap<DrawableHandle, Drawable>,
    /// Viewport size in pixels
    pub size: (u32, u32),
}

impl SceneRenderer {
    pub async fn new(
        surface: wgpu::Surface<'static>,
        adapter: &wgpu::Adapter,
        width: u32,
        height: u32,
    ) -> Self {
        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("rune-strike-device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::downlevel_webgl2_defaults(),
                memory_hints: Default::default(),
                trace: Default::default(),
                experimental_features: Default::default(),
            })
            .await
            .expect("Failed to create device");

        let surface_caps = surface.get_capabilities(adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .copied()
            .unwrap_or(surface_caps.formats[0]);
        log::info!("Using surface format: {:?}", surface_format);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: width.max(1),
            height: height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("scene_shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shader.wgsl").into()),
        });

        let globals_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("globals"),
            size: std::mem::size_of::<Globals>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("scene_bind_group_layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("scene_bind_group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: globals_buffer.as_entire_binding(),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("pipeline_layout"),
            bind_group_layouts: &[&bind_group_layout],
            immediate_size: 0,
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("render_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[Vertex::desc(), InstanceRaw::desc()],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: config.format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
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
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        // Static meshes, uploaded once
        let meshes = Shape::ALL
            .into_iter()
            .map(|shape| {
                let verts = shapes::mesh(shape);
                let vertices = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("mesh_vertices"),
                    contents: bytemuck::cast_slice(&verts),
                    usage: wgpu::BufferUsages::VERTEX,
                });
                let mesh = GpuMesh {
                    vertices,
                    count: verts.len() as u32,
                };
                (shape, mesh)
            })
            .collect();

        let depth_view = create_depth_view(&device, &config);

        Self {
            surface,
            device,
            queue,
            config,
            pipeline,
            globals_buffer,
            bind_group,
            depth_view,
            meshes,
            drawables: SlotMap::with_key(),
            size: (width, height),
        }
    }

    /// Upload instances and render
    pub fn render(&mut self, camera: &Camera) -> Result<(), wgpu::SurfaceError> {
        let (w, h) = self.size;
        let aspect = w.max(1) as f32 / h.max(1) as f32;
        let bg = colors::BACKGROUND;
        let globals = Globals {
            view_proj: camera.view_proj(aspect).to_cols_array_2d(),
            eye: camera.eye.extend(1.0).to_array(),
            fog_color: [bg[0] as f32, bg[1] as f32, bg[2] as f32, 1.0],
            fog_range: [colors::FOG_NEAR, colors::FOG_FAR, 0.0, 0.0],
        };
        self.queue
            .write_buffer(&self.globals_buffer, 0, bytemuck::bytes_of(&globals));

        // Group instances by shape, in a stable order
        let mut batches: Vec<(Shape, Vec<InstanceRaw>)> =
            Shape::ALL.iter().map(|&s| (s, Vec::new())).collect();
        for d in self.drawables.values() {
            let [r, g, b] = hex_to_rgb(d.color);
            let raw = InstanceRaw {
                model: d.transform.matrix().to_cols_array_2d(),
                color: [r, g, b, glow(d.shape)],
            };
            if let Some((_, batch)) = batches.iter_mut().find(|(s, _)| *s == d.shape) {
                batch.push(raw);
            }
        }

        // Recreate buffers each frame (simple approach; counts stay small)
        let instance_buffers: Vec<(Shape, wgpu::Buffer, u32)> = batches
            .iter()
            .filter(|(_, batch)| !batch.is_empty())
            .map(|(shape, batch)| {
                let buffer = self
                    .device
                    .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                        label: Some("instance_buffer"),
                        contents: bytemuck::cast_slice(batch),
                        usage: wgpu::BufferUsages::VERTEX,
                    });
                (*shape, buffer, batch.len() as u32)
            })
            .collect();

        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("render_encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("render_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: bg[0],
                            g: bg[1],
                            b: bg[2],
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
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

            render_pass.set_pipeline(&self.pipeline);
            render_pass.set_bind_group(0, &self.bind_group, &[]);
            for (shape, instances, count) in &instance_buffers {
                let Some(mesh) = self.meshes.get(shape) else {
                    continue;
                };
                render_pass.set_vertex_buffer(0, mesh.vertices.slice(..));
                render_pass.set_vertex_buffer(1, instances.slice(..));
                render_pass.draw(0..mesh.count, 0..*count);
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }
}

fn create_depth_view(device: &wgpu::Device, config: &wgpu::SurfaceConfiguration) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("depth_texture"),
        size: wgpu::Extent3d {
            width: config.width,
            height: config.height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    texture.create_view(&wgpu::TextureViewDescriptor::default())
}

impl RenderBackend for SceneRenderer {
    fn create(&mut self, desc: &DrawableDesc) -> DrawableHandle {
        self.drawables.insert(Drawable {
            shape: desc.shape,
            transform: desc.transform,
            color: desc.color,
        })
    }

    fn update(&mut self, handle: DrawableHandle, transform: &Transform, color: u32) {
        if let Some(d) = self.drawables.get_mut(handle) {
            d.transform = *transform;
            d.color = color;
        }
    }

    fn destroy(&mut self, handle: DrawableHandle) {
        self.drawables.remove(handle);
    }

    fn draw(&mut self, camera: &Camera) {
        match self.render(camera) {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                let (w, h) = self.size;
                self.resize(w, h);
            }
            Err(e) => log::error!("Render error: {:?}", e),
        }
    }

    fn resize(&mut self, new_width: u32, new_height: u32) {
        if new_width > 0 && new_height > 0 {
            self.size = (new_width, new_height);
            self.config.width = new_width;
            self.config.height = new_height;
            self.surface.configure(&self.device, &self.config);
            self.depth_view = create_depth_view(&self.device, &self.config);
        }
    }
}
