//! WebGPU render pipeline setup
//!
//! Two passes sharing one depth buffer: the floor quad, then the instanced
//! tiles. Geometry and the instance buffer are uploaded once at startup;
//! per-frame work is two uniform writes driven by the frame context.

use glam::Vec3;
use wgpu::util::DeviceExt;

use super::shapes;
use super::vertex::{FloorUniforms, TileInstanceRaw, TileUniforms, Vertex, scene};
use crate::camera::Camera;
use crate::settings::Settings;
use crate::sim::{FieldState, FrameContext};

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Main render state
pub struct RenderState {
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,

    tile_pipeline: wgpu::RenderPipeline,
    floor_pipeline: wgpu::RenderPipeline,

    tile_vertex_buffer: wgpu::Buffer,
    tile_index_buffer: wgpu::Buffer,
    tile_index_count: u32,
    instance_buffer: wgpu::Buffer,
    instance_count: u32,

    floor_vertex_buffer: wgpu::Buffer,
    floor_index_buffer: wgpu::Buffer,
    floor_index_count: u32,

    tile_uniform_buffer: wgpu::Buffer,
    floor_uniform_buffer: wgpu::Buffer,
    tile_bind_group: wgpu::BindGroup,
    floor_bind_group: wgpu::BindGroup,

    depth_view: wgpu::TextureView,

    /// Viewport size in pixels
    pub size: (u32, u32),
}

impl RenderState {
    pub async fn new(
        surface: wgpu::Surface<'static>,
        adapter: &wgpu::Adapter,
        width: u32,
        height: u32,
        field: &FieldState,
    ) -> Self {
        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("hexfloor-device"),
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

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width,
            height,
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let depth_view = Self::create_depth_view(&device, &config);

        // Shared mesh for every tile, sized from the grid config
        let footprint = field.grid.config.footprint;
        let tile_mesh = shapes::hex_prism(footprint.x, footprint.y);
        let floor_mesh = shapes::floor_quad(field.floor.size.x, field.floor.size.y, field.floor.y);

        let tile_vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("tile_vertices"),
            contents: bytemuck::cast_slice(&tile_mesh.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let tile_index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("tile_indices"),
            contents: bytemuck::cast_slice(&tile_mesh.indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        let instances: Vec<TileInstanceRaw> = field
            .grid
            .instances
            .iter()
            .map(TileInstanceRaw::from)
            .collect();
        let instance_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("tile_instances"),
            contents: bytemuck::cast_slice(&instances),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let floor_vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("floor_vertices"),
            contents: bytemuck::cast_slice(&floor_mesh.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let floor_index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("floor_indices"),
            contents: bytemuck::cast_slice(&floor_mesh.indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        let tile_uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("tile_uniforms"),
            size: std::mem::size_of::<TileUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let floor_uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("floor_uniforms"),
            size: std::mem::size_of::<FloorUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("uniform_layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let tile_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("tile_bind_group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: tile_uniform_buffer.as_entire_binding(),
            }],
        });
        let floor_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("floor_bind_group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: floor_uniform_buffer.as_entire_binding(),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("pipeline_layout"),
            bind_group_layouts: &[&bind_group_layout],
            immediate_size: 0,
        });

        let tile_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("tile_shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("tile_shader.wgsl").into()),
        });
        let floor_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("floor_shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("floor_shader.wgsl").into()),
        });

        let depth_stencil = Some(wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        });

        let tile_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("tile_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &tile_shader,
                entry_point: Some("vs_main"),
                buffers: &[Vertex::desc(), TileInstanceRaw::desc()],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &tile_shader,
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
                cull_mode: Some(wgpu::Face::Back),
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: depth_stencil.clone(),
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        let floor_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("floor_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &floor_shader,
                entry_point: Some("vs_main"),
                buffers: &[Vertex::desc()],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &floor_shader,
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
            depth_stencil,
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        log::info!(
            "renderer ready: {} instances, {}x{} surface",
            instances.len(),
            width,
            height
        );

        Self {
            surface,
            device,
            queue,
            config,
            tile_pipeline,
            floor_pipeline,
            tile_vertex_buffer,
            tile_index_buffer,
            tile_index_count: tile_mesh.index_count(),
            instance_buffer,
            instance_count: instances.len() as u32,
            floor_vertex_buffer,
            floor_index_buffer,
            floor_index_count: floor_mesh.index_count(),
            tile_uniform_buffer,
            floor_uniform_buffer,
            tile_bind_group,
            floor_bind_group,
            depth_view,
            size: (width, height),
        }
    }

    fn create_depth_view(
        device: &wgpu::Device,
        config: &wgpu::SurfaceConfiguration,
    ) -> wgpu::TextureView {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("depth_texture"),
            size: wgpu::Extent3d {
                width: config.width.max(1),
                height: config.height.max(1),
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

    pub fn resize(&mut self, new_width: u32, new_height: u32) {
        if new_width > 0 && new_height > 0 {
            self.size = (new_width, new_height);
            self.config.width = new_width;
            self.config.height = new_height;
            self.surface.configure(&self.device, &self.config);
            self.depth_view = Self::create_depth_view(&self.device, &self.config);
        }
    }

    /// Upload this frame's uniforms and draw both passes
    pub fn render(
        &mut self,
        ctx: &FrameContext,
        camera: &Camera,
        floor_size: glam::Vec2,
        floor_y: f32,
        settings: &Settings,
    ) -> Result<(), wgpu::SurfaceError> {
        let view_proj = camera.view_proj().to_cols_array_2d();

        // A contact point that never existed keeps both falloffs flat
        let contact = ctx.contact_point.unwrap_or(Vec3::ZERO);
        let radius = if ctx.contact_point.is_some() {
            ctx.radius
        } else {
            0.0
        };
        let highlight = if ctx.contact_point.is_some() {
            ctx.highlight
        } else {
            0.0
        };

        self.queue.write_buffer(
            &self.tile_uniform_buffer,
            0,
            bytemuck::bytes_of(&TileUniforms {
                view_proj,
                contact_point: contact.to_array(),
                time: ctx.elapsed,
                radius,
                height: ctx.height,
                jitter_amplitude: settings.effective_jitter(),
                shininess: settings.tile_shininess,
                tile_color: settings.tile_color,
                fog_near: scene::FOG_NEAR,
                specular_color: settings.tile_specular,
                fog_far: scene::FOG_FAR,
                light_dir: scene::LIGHT_DIR,
                _pad0: 0.0,
                fog_color: scene::FOG_COLOR,
                _pad1: 0.0,
                camera_pos: camera.eye.to_array(),
                _pad2: 0.0,
            }),
        );

        self.queue.write_buffer(
            &self.floor_uniform_buffer,
            0,
            bytemuck::bytes_of(&FloorUniforms {
                view_proj,
                contact_point: contact.to_array(),
                highlight_radius: highlight,
                size: floor_size.to_array(),
                floor_y,
                _pad0: 0.0,
                color: settings.floor_color,
                fog_near: scene::FOG_NEAR,
                highlight_color: settings.highlight_color,
                fog_far: scene::FOG_FAR,
                fog_color: scene::FOG_COLOR,
                _pad1: 0.0,
                camera_pos: camera.eye.to_array(),
                _pad2: 0.0,
            }),
        );

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
                        load: wgpu::LoadOp::Clear(scene::CLEAR_COLOR),
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

            render_pass.set_pipeline(&self.floor_pipeline);
            render_pass.set_bind_group(0, &self.floor_bind_group, &[]);
            render_pass.set_vertex_buffer(0, self.floor_vertex_buffer.slice(..));
            render_pass
                .set_index_buffer(self.floor_index_buffer.slice(..), wgpu::IndexFormat::Uint16);
            render_pass.draw_indexed(0..self.floor_index_count, 0, 0..1);

            render_pass.set_pipeline(&self.tile_pipeline);
            render_pass.set_bind_group(0, &self.tile_bind_group, &[]);
            render_pass.set_vertex_buffer(0, self.tile_vertex_buffer.slice(..));
            render_pass.set_vertex_buffer(1, self.instance_buffer.slice(..));
            render_pass
                .set_index_buffer(self.tile_index_buffer.slice(..), wgpu::IndexFormat::Uint16);
            render_pass.draw_indexed(0..self.tile_index_count, 0, 0..self.instance_count);
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }
}
