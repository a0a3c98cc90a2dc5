//! WebGPU render pipeline setup

use image::RgbaImage;
use wgpu::util::DeviceExt;

use super::camera::{Camera, CameraUniform};
use super::mesh::{self, InstanceRaw, LineVertex, MeshVertex, colors};
use super::texture::{self, SlotTable};
use crate::consts::*;
use crate::settings::Settings;
use crate::sim::{GameState, TextureSlot};

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// One cube to draw this frame
#[derive(Debug, Clone, Copy)]
pub struct DrawItem {
    pub instance: InstanceRaw,
    /// Texture to sample; `None` uses the white fallback
    pub texture: Option<TextureSlot>,
}

/// Cubes for the current state: the player first, then obstacles in spawn order
pub fn scene_items(state: &GameState) -> Vec<DrawItem> {
    let mut items = Vec::with_capacity(state.obstacles.len() + 1);
    items.push(DrawItem {
        instance: InstanceRaw::cube(
            state.player.pos,
            PLAYER_SIZE,
            colors::PLAYER,
            colors::PLAYER_EMISSIVE,
        ),
        texture: None,
    });
    items.extend(state.obstacles.iter().map(|o| DrawItem {
        instance: InstanceRaw::cube(o.pos, o.size, colors::WHITE, colors::OBSTACLE_EMISSIVE),
        texture: Some(o.texture),
    }));
    items
}

/// Main render state
pub struct SceneRenderState {
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    mesh_pipeline: wgpu::RenderPipeline,
    line_pipeline: wgpu::RenderPipeline,

    camera: Camera,
    camera_buffer: wgpu::Buffer,
    camera_bind_group: wgpu::BindGroup,

    texture_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    fallback_texture: wgpu::BindGroup,
    textures: SlotTable<wgpu::BindGroup>,

    cube_vertex_buffer: wgpu::Buffer,
    cube_index_buffer: wgpu::Buffer,
    cube_index_count: u32,
    grid_vertex_buffer: wgpu::Buffer,
    grid_vertex_count: u32,

    depth_view: wgpu::TextureView,
    /// Multisampled color target, present when antialiasing
    msaa_view: Option<wgpu::TextureView>,
    sample_count: u32,

    /// Viewport size in pixels
    pub size: (u32, u32),
}

impl SceneRenderState {
    pub async fn new(
        surface: wgpu::Surface<'static>,
        adapter: &wgpu::Adapter,
        width: u32,
        height: u32,
        settings: &Settings,
    ) -> Self {
        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("grid-glider-device"),
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

        let sample_count = {
            let wanted = settings.sample_count();
            let flags = adapter.get_texture_format_features(surface_format).flags;
            if wanted > 1 && !flags.sample_count_supported(wanted) {
                log::warn!("{}x MSAA unsupported, rendering without antialiasing", wanted);
                1
            } else {
                wanted
            }
        };

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
            source: wgpu::ShaderSource::Wgsl(include_str!("scene.wgsl").into()),
        });

        // Camera
        let camera = Camera::new(config.width, config.height);
        let camera_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("camera"),
            contents: bytemuck::bytes_of(&CameraUniform::new(&camera)),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let camera_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("camera_bind_group_layout"),
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
        let camera_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("camera_bind_group"),
            layout: &camera_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: camera_buffer.as_entire_binding(),
            }],
        });

        // Textures
        let texture_layout = texture::bind_group_layout(&device);
        let sampler = texture::create_sampler(&device);
        let fallback_texture = texture::upload(
            &device,
            &queue,
            &texture_layout,
            &sampler,
            &texture::white_pixel(),
            "fallback_texture",
        );

        // Pipelines
        let depth_stencil = wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        };
        let multisample = wgpu::MultisampleState {
            count: sample_count,
            ..Default::default()
        };
        let color_target = [Some(wgpu::ColorTargetState {
            format: config.format,
            blend: Some(wgpu::BlendState::ALPHA_BLENDING),
            write_mask: wgpu::ColorWrites::ALL,
        })];

        let mesh_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("mesh_pipeline_layout"),
            bind_group_layouts: &[&camera_layout, &texture_layout],
            immediate_size: 0,
        });
        let mesh_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("mesh_pipeline"),
            layout: Some(&mesh_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_mesh"),
                buffers: &[MeshVertex::desc(), InstanceRaw::desc()],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_mesh"),
                targets: &color_target,
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: Some(wgpu::Face::Back),
                ..Default::default()
            },
            depth_stencil: Some(depth_stencil.clone()),
            multisample,
            multiview_mask: None,
            cache: None,
        });

        let line_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("line_pipeline_layout"),
            bind_group_layouts: &[&camera_layout],
            immediate_size: 0,
        });
        let line_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("line_pipeline"),
            layout: Some(&line_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_line"),
                buffers: &[LineVertex::desc()],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_line"),
                targets: &color_target,
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::LineList,
                ..Default::default()
            },
            depth_stencil: Some(depth_stencil),
            multisample,
            multiview_mask: None,
            cache: None,
        });

        // Static geometry
        let (cube_vertices, cube_indices) = mesh::unit_cube();
        let cube_vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("cube_vertices"),
            contents: bytemuck::cast_slice(&cube_vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let cube_index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("cube_indices"),
            contents: bytemuck::cast_slice(&cube_indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        let grid = mesh::ground_grid(GRID_SIZE, GRID_DIVISIONS, colors::GRID);
        let grid_vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("grid_vertices"),
            contents: bytemuck::cast_slice(&grid),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let (depth_view, msaa_view) = create_targets(&device, &config, sample_count);

        Self {
            surface,
            device,
            queue,
            config,
            mesh_pipeline,
            line_pipeline,
            camera,
            camera_buffer,
            camera_bind_group,
            texture_layout,
            sampler,
            fallback_texture,
            textures: SlotTable::new(OBSTACLE_TEXTURE_COUNT),
            cube_vertex_buffer,
            cube_index_buffer,
            cube_index_count: cube_indices.len() as u32,
            grid_vertex_buffer,
            grid_vertex_count: grid.len() as u32,
            depth_view,
            msaa_view,
            sample_count,
            size: (width, height),
        }
    }

    /// Follow the viewport: surface, render targets and camera aspect
    pub fn resize(&mut self, new_width: u32, new_height: u32) {
        if new_width > 0 && new_height > 0 {
            self.size = (new_width, new_height);
            self.config.width = new_width;
            self.config.height = new_height;
            self.surface.configure(&self.device, &self.config);
            let (depth_view, msaa_view) =
                create_targets(&self.device, &self.config, self.sample_count);
            self.depth_view = depth_view;
            self.msaa_view = msaa_view;
            self.camera.resize(new_width, new_height);
        }
    }

    /// Make a loaded obstacle texture available to its slot
    pub fn install_texture(&mut self, slot: TextureSlot, img: &RgbaImage) {
        let bind_group = texture::upload(
            &self.device,
            &self.queue,
            &self.texture_layout,
            &self.sampler,
            img,
            &slot.file_name(),
        );
        self.textures.install(slot, bind_group);
        log::info!(
            "Texture {} ready ({}/{})",
            slot.file_name(),
            self.textures.loaded_count(),
            OBSTACLE_TEXTURE_COUNT
        );
    }

    /// Draw the scene for the current state
    pub fn render(&mut self, state: &GameState) -> Result<(), wgpu::SurfaceError> {
        self.queue.write_buffer(
            &self.camera_buffer,
            0,
            bytemuck::bytes_of(&CameraUniform::new(&self.camera)),
        );

        let items = scene_items(state);
        let instances: Vec<InstanceRaw> = items.iter().map(|i| i.instance).collect();
        // Recreate buffer each frame (simple approach; obstacle count is small)
        let instance_buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("instances"),
                contents: bytemuck::cast_slice(&instances),
                usage: wgpu::BufferUsages::VERTEX,
            });

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
            let (target, resolve_target) = match &self.msaa_view {
                Some(msaa) => (msaa, Some(&view)),
                None => (&view, None),
            };
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("render_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: target,
                    resolve_target,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Discard,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            render_pass.set_bind_group(0, &self.camera_bind_group, &[]);

            render_pass.set_pipeline(&self.line_pipeline);
            render_pass.set_vertex_buffer(0, self.grid_vertex_buffer.slice(..));
            render_pass.draw(0..self.grid_vertex_count, 0..1);

            render_pass.set_pipeline(&self.mesh_pipeline);
            render_pass.set_vertex_buffer(0, self.cube_vertex_buffer.slice(..));
            render_pass.set_vertex_buffer(1, instance_buffer.slice(..));
            render_pass
                .set_index_buffer(self.cube_index_buffer.slice(..), wgpu::IndexFormat::Uint16);
            for (i, item) in items.iter().enumerate() {
                let texture = item
                    .texture
                    .and_then(|slot| self.textures.get(slot))
                    .unwrap_or(&self.fallback_texture);
                let i = i as u32;
                render_pass.set_bind_group(1, texture, &[]);
                render_pass.draw_indexed(0..self.cube_index_count, 0, i..i + 1);
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }
}

/// Depth buffer and (when multisampling) the MSAA color target
fn create_targets(
    device: &wgpu::Device,
    config: &wgpu::SurfaceConfiguration,
    sample_count: u32,
) -> (wgpu::TextureView, Option<wgpu::TextureView>) {
    let size = wgpu::Extent3d {
        width: config.width,
        height: config.height,
        depth_or_array_layers: 1,
    };
    let depth = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("depth_texture"),
        size,
        mip_level_count: 1,
        sample_count,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    let msaa = (sample_count > 1).then(|| {
        device
            .create_texture(&wgpu::TextureDescriptor {
                label: Some("msaa_color"),
                size,
                mip_level_count: 1,
                sample_count,
                dimension: wgpu::TextureDimension::D2,
                format: config.format,
                usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
                view_formats: &[],
            })
            .create_view(&wgpu::TextureViewDescriptor::default())
    });
    (
        depth.create_view(&wgpu::TextureViewDescriptor::default()),
        msaa,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::Obstacle;
    use glam::Mat4;

    fn translation(item: &DrawItem) -> glam::Vec3 {
        Mat4::from_cols_array_2d(&item.instance.model)
            .w_axis
            .truncate()
    }

    #[test]
    fn test_player_drawn_first_untextured() {
        let state = GameState::new(1);
        let items = scene_items(&state);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].texture, None);
        assert_eq!(items[0].instance.base_color, colors::PLAYER);
        assert_eq!(translation(&items[0]), state.player.pos);
    }

    #[test]
    fn test_obstacles_keep_spawn_order_and_slots() {
        let mut state = GameState::new(1);
        state.obstacles.push(Obstacle::new(1, 0, TextureSlot(4)));
        state.obstacles.push(Obstacle::new(2, 3, TextureSlot(1)));

        let items = scene_items(&state);
        assert_eq!(items.len(), 3);
        assert_eq!(items[1].texture, Some(TextureSlot(4)));
        assert_eq!(items[2].texture, Some(TextureSlot(1)));
        assert_eq!(translation(&items[2]), state.obstacles[1].pos);
        assert_eq!(items[1].instance.emissive, colors::OBSTACLE_EMISSIVE);
    }
}
