use crate::camera;
use crate::constants::{DEPTH_FORMAT, MAX_DRAWS, PER_DRAW_STRIDE};
use cityscape_core::constants::{
    GRID_EXTENT, GRID_HALF_LINES, GRID_SPACING, LIGHT_DIR, PANORAMA_RADIUS, PARTICLE_COUNT,
    SPINNER_BASE_RADIUS, SPINNER_RING_COUNT, SPINNER_RING_STEP, SPINNER_TUBE, VIEW_BUTTON_RADIUS,
};
use glam::{Mat4, Vec3, Vec4};
use std::collections::HashMap;
use web_sys as web;
use wgpu::util::DeviceExt;

pub mod mesh;
pub mod texture;

pub static SCENE_WGSL: &str = include_str!("../shaders/scene.wgsl");
pub static PARTICLES_WGSL: &str = include_str!("../shaders/particles.wgsl");

pub type TextureId = u32;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MeshRef {
    Sphere,
    Pano,
    Quad,
    Cube,
    Pyramid,
    Crystal,
    Ring(usize),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LineRef {
    Grid,
    CrystalWire,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Blend {
    Opaque,
    Alpha,
    Additive,
}

/// One mesh instance for the current frame.
pub struct MeshDraw {
    pub mesh: MeshRef,
    pub model: Mat4,
    pub tint: Vec4,
    pub lit: bool,
    pub brightness: f32,
    pub texture: Option<TextureId>,
    pub blend: Blend,
}

pub struct LineDraw {
    pub lines: LineRef,
    pub model: Mat4,
    pub color: Vec4,
}

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ParticleInstance {
    pub pos_size: [f32; 4],
    pub color: [f32; 4],
}

pub struct PanoramaDraw {
    pub texture: Option<TextureId>,
    pub yaw: f32,
    pub pitch: f32,
}

/// Everything the shell wants on screen this frame. When `panorama` is set
/// the immersive pass replaces the whole scene.
#[derive(Default)]
pub struct SceneFrame {
    pub meshes: Vec<MeshDraw>,
    pub lines: Vec<LineDraw>,
    pub particles: Vec<ParticleInstance>,
    pub panorama: Option<PanoramaDraw>,
}

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct Globals {
    view_proj: [f32; 16],
    light_dir: [f32; 4],
    cam_right: [f32; 4],
    cam_up: [f32; 4],
    misc: [f32; 4],
}

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct PerDraw {
    model: [f32; 16],
    tint: [f32; 4],
    params: [f32; 4],
}

struct GpuMesh {
    vertex_buf: wgpu::Buffer,
    index_buf: wgpu::Buffer,
    index_count: u32,
}

struct GpuLines {
    vertex_buf: wgpu::Buffer,
    vertex_count: u32,
}

struct SceneMeshes {
    sphere: GpuMesh,
    pano: GpuMesh,
    quad: GpuMesh,
    cube: GpuMesh,
    pyramid: GpuMesh,
    crystal: GpuMesh,
    rings: Vec<GpuMesh>,
    crystal_wire: GpuLines,
    grid: GpuLines,
}

pub struct GpuState<'a> {
    surface: wgpu::Surface<'a>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    // Scene pipelines, one per blend mode plus lines and particles
    mesh_opaque_pipeline: wgpu::RenderPipeline,
    mesh_alpha_pipeline: wgpu::RenderPipeline,
    mesh_additive_pipeline: wgpu::RenderPipeline,
    line_pipeline: wgpu::RenderPipeline,
    particle_pipeline: wgpu::RenderPipeline,
    // Shared uniforms
    globals_buffer: wgpu::Buffer,
    globals_bind_group: wgpu::BindGroup,
    per_draw_buffer: wgpu::Buffer,
    per_draw_bind_group: wgpu::BindGroup,
    // Texture plumbing
    texture_bgl: wgpu::BindGroupLayout,
    linear_sampler: wgpu::Sampler,
    white_bind_group: wgpu::BindGroup,
    textures: HashMap<TextureId, wgpu::BindGroup>,
    next_texture_id: TextureId,
    // Geometry and particle buffers
    meshes: SceneMeshes,
    particle_corner_buf: wgpu::Buffer,
    particle_instance_buf: wgpu::Buffer,
    depth_view: wgpu::TextureView,
    width: u32,
    height: u32,
    clear_color: wgpu::Color,
}

impl<'a> GpuState<'a> {
    pub async fn new(canvas: &'a web::HtmlCanvasElement) -> anyhow::Result<Self> {
        let width = canvas.width();
        let height = canvas.height();

        let instance = wgpu::Instance::default();
        let surface = instance.create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))?;
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| anyhow::anyhow!("No WebGPU adapter"))?;
        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    required_features: wgpu::Features::empty(),
                    // Default limits to stay compatible with older WebGPU impls
                    required_limits: wgpu::Limits::default(),
                    memory_hints: wgpu::MemoryHints::Performance,
                    label: None,
                },
                None,
            )
            .await
            .map_err(|e| anyhow::anyhow!(format!("request_device error: {:?}", e)))?;
        let caps = surface.get_capabilities(&adapter);
        let format = caps
            .formats
            .iter()
            .copied()
            .find(|f| {
                matches!(
                    f,
                    wgpu::TextureFormat::Bgra8UnormSrgb | wgpu::TextureFormat::Rgba8UnormSrgb
                )
            })
            .unwrap_or(caps.formats[0]);
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width,
            height,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);
        let depth_view = create_depth_view(&device, width, height);

        // Static geometry
        let meshes = SceneMeshes {
            sphere: upload_mesh(&device, "sphere", &mesh::uv_sphere(1.0, 32, 24)),
            pano: upload_mesh(&device, "pano_sphere", &mesh::uv_sphere(1.0, 60, 40)),
            quad: upload_mesh(&device, "quad", &mesh::quad()),
            cube: upload_mesh(&device, "cube", &mesh::cube()),
            pyramid: upload_mesh(&device, "pyramid", &mesh::pyramid(0.55, 0.5)),
            crystal: upload_mesh(&device, "crystal", &mesh::octahedron(VIEW_BUTTON_RADIUS, 2)),
            rings: (0..SPINNER_RING_COUNT)
                .map(|i| {
                    let r = SPINNER_BASE_RADIUS + i as f32 * SPINNER_RING_STEP;
                    upload_mesh(&device, "ring", &mesh::torus(r, SPINNER_TUBE, 8, 48))
                })
                .collect(),
            crystal_wire: upload_lines(
                &device,
                "crystal_wire",
                &mesh::wireframe(&mesh::octahedron(VIEW_BUTTON_RADIUS, 2)),
            ),
            grid: upload_lines(
                &device,
                "grid",
                &mesh::grid_lines(GRID_HALF_LINES, GRID_SPACING, GRID_EXTENT),
            ),
        };

        // Uniform buffers and layouts
        let globals_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("globals"),
            size: std::mem::size_of::<Globals>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let globals_bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("globals_bgl"),
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
        let globals_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("globals_bg"),
            layout: &globals_bgl,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: globals_buffer.as_entire_binding(),
            }],
        });

        let per_draw_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("per_draw"),
            size: PER_DRAW_STRIDE * MAX_DRAWS as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let per_draw_bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("per_draw_bgl"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: wgpu::BufferSize::new(std::mem::size_of::<PerDraw>() as u64),
                },
                count: None,
            }],
        });
        let per_draw_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("per_draw_bg"),
            layout: &per_draw_bgl,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &per_draw_buffer,
                    offset: 0,
                    size: wgpu::BufferSize::new(std::mem::size_of::<PerDraw>() as u64),
                }),
            }],
        });

        let texture_bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("texture_bgl"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        multisampled: false,
                        view_dimension: wgpu::TextureViewDimension::D2,
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });
        let linear_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("linear_sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });
        let white_view = texture::create_rgba_texture(
            &device,
            &queue,
            "white",
            &texture::RgbaBytes::solid(1, 1, [255, 255, 255, 255]),
        );
        let white_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("white_bg"),
            layout: &texture_bgl,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&white_view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&linear_sampler),
                },
            ],
        });

        // Shaders and pipelines
        let scene_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("scene_shader"),
            source: wgpu::ShaderSource::Wgsl(SCENE_WGSL.into()),
        });
        let particles_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("particles_shader"),
            source: wgpu::ShaderSource::Wgsl(PARTICLES_WGSL.into()),
        });

        let mesh_pl = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("mesh_pl"),
            bind_group_layouts: &[&globals_bgl, &per_draw_bgl, &texture_bgl],
            push_constant_ranges: &[],
        });
        let line_pl = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("line_pl"),
            bind_group_layouts: &[&globals_bgl, &per_draw_bgl],
            push_constant_ranges: &[],
        });
        let particle_pl = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("particle_pl"),
            bind_group_layouts: &[&globals_bgl],
            push_constant_ranges: &[],
        });

        let mesh_vertex_layout = wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<mesh::Vertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3, 2 => Float32x2],
        };
        let mesh_opaque_pipeline = make_mesh_pipeline(
            &device,
            "mesh_opaque",
            &mesh_pl,
            &scene_shader,
            mesh_vertex_layout.clone(),
            format,
            None,
            true,
        );
        let mesh_alpha_pipeline = make_mesh_pipeline(
            &device,
            "mesh_alpha",
            &mesh_pl,
            &scene_shader,
            mesh_vertex_layout.clone(),
            format,
            Some(wgpu::BlendState::ALPHA_BLENDING),
            false,
        );
        let mesh_additive_pipeline = make_mesh_pipeline(
            &device,
            "mesh_additive",
            &mesh_pl,
            &scene_shader,
            mesh_vertex_layout.clone(),
            format,
            Some(ADDITIVE_BLEND),
            false,
        );

        let line_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("line_pipeline"),
            layout: Some(&line_pl),
            vertex: wgpu::VertexState {
                module: &scene_shader,
                entry_point: Some("vs_line"),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: 12,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &wgpu::vertex_attr_array![0 => Float32x3],
                }],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::LineList,
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: false,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            fragment: Some(wgpu::FragmentState {
                module: &scene_shader,
                entry_point: Some("fs_line"),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            cache: None,
            multiview: None,
        });

        let particle_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("particle_pipeline"),
            layout: Some(&particle_pl),
            vertex: wgpu::VertexState {
                module: &particles_shader,
                entry_point: Some("vs_particle"),
                buffers: &[
                    wgpu::VertexBufferLayout {
                        array_stride: 8,
                        step_mode: wgpu::VertexStepMode::Vertex,
                        attributes: &wgpu::vertex_attr_array![0 => Float32x2],
                    },
                    wgpu::VertexBufferLayout {
                        array_stride: std::mem::size_of::<ParticleInstance>() as u64,
                        step_mode: wgpu::VertexStepMode::Instance,
                        attributes: &wgpu::vertex_attr_array![1 => Float32x4, 2 => Float32x4],
                    },
                ],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleStrip,
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: false,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            fragment: Some(wgpu::FragmentState {
                module: &particles_shader,
                entry_point: Some("fs_particle"),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: Some(ADDITIVE_BLEND),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            cache: None,
            multiview: None,
        });

        let corners: [[f32; 2]; 4] = [[-1.0, -1.0], [1.0, -1.0], [-1.0, 1.0], [1.0, 1.0]];
        let particle_corner_buf = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("particle_corners"),
            contents: bytemuck::cast_slice(&corners),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let particle_instance_buf = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("particle_instances"),
            size: (PARTICLE_COUNT * std::mem::size_of::<ParticleInstance>()) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        Ok(Self {
            surface,
            device,
            queue,
            config,
            mesh_opaque_pipeline,
            mesh_alpha_pipeline,
            mesh_additive_pipeline,
            line_pipeline,
            particle_pipeline,
            globals_buffer,
            globals_bind_group,
            per_draw_buffer,
            per_draw_bind_group,
            texture_bgl,
            linear_sampler,
            white_bind_group,
            textures: HashMap::new(),
            next_texture_id: 1,
            meshes,
            particle_corner_buf,
            particle_instance_buf,
            depth_view,
            width,
            height,
            clear_color: wgpu::Color::WHITE,
        })
    }

    /// Upload pixels and hand back an id the scene can reference. Dropping
    /// the id via [`GpuState::release_texture`] frees the GPU memory.
    pub fn create_texture(&mut self, label: &str, img: &texture::RgbaBytes) -> TextureId {
        let view = texture::create_rgba_texture(&self.device, &self.queue, label, img);
        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout: &self.texture_bgl,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&self.linear_sampler),
                },
            ],
        });
        let id = self.next_texture_id;
        self.next_texture_id += 1;
        self.textures.insert(id, bind_group);
        id
    }

    pub fn release_texture(&mut self, id: TextureId) {
        self.textures.remove(&id);
    }

    pub fn resize_if_needed(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        if width != self.width || height != self.height {
            self.width = width;
            self.height = height;
            self.config.width = width;
            self.config.height = height;
            self.surface.configure(&self.device, &self.config);
            self.depth_view = create_depth_view(&self.device, width, height);
        }
    }

    pub fn render(&mut self, scene: &SceneFrame) -> Result<(), wgpu::SurfaceError> {
        let frame = self.surface.get_current_texture()?;
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("encoder"),
            });

        let aspect = self.width as f32 / self.height.max(1) as f32;
        let view_proj = match &scene.panorama {
            Some(p) => camera::panorama_view_proj(aspect, p.yaw, p.pitch),
            None => camera::view_proj(aspect),
        };
        let globals = Globals {
            view_proj: view_proj.to_cols_array(),
            light_dir: [LIGHT_DIR[0], LIGHT_DIR[1], LIGHT_DIR[2], 0.0],
            cam_right: [1.0, 0.0, 0.0, 0.0],
            cam_up: [0.0, 1.0, 0.0, 0.0],
            misc: [0.0; 4],
        };
        self.queue
            .write_buffer(&self.globals_buffer, 0, bytemuck::bytes_of(&globals));

        if let Some(p) = &scene.panorama {
            self.render_panorama(&mut encoder, &view, p);
        } else {
            self.render_scene(&mut encoder, &view, scene);
        }

        self.queue.submit(Some(encoder.finish()));
        frame.present();
        Ok(())
    }
}

impl<'a> GpuState<'a> {
    fn render_panorama(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        view: &wgpu::TextureView,
        p: &PanoramaDraw,
    ) {
        // The photo wraps a sphere around the camera; negating x flips the
        // faces inward so the image reads correctly from inside. Until the
        // download lands we just hold the black clear.
        let pd = PerDraw {
            model: Mat4::from_scale(Vec3::new(-PANORAMA_RADIUS, PANORAMA_RADIUS, PANORAMA_RADIUS))
                .to_cols_array(),
            tint: [1.0, 1.0, 1.0, 1.0],
            params: [0.0, 1.0, 0.0, 0.0],
        };
        let mut staging = vec![0u8; PER_DRAW_STRIDE as usize];
        staging[..std::mem::size_of::<PerDraw>()].copy_from_slice(bytemuck::bytes_of(&pd));
        self.queue.write_buffer(&self.per_draw_buffer, 0, &staging);

        let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("panorama_pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: Some(depth_attachment(&self.depth_view)),
            timestamp_writes: None,
            occlusion_query_set: None,
        });
        let Some(id) = p.texture else {
            return;
        };
        rpass.set_pipeline(&self.mesh_opaque_pipeline);
        rpass.set_bind_group(0, &self.globals_bind_group, &[]);
        rpass.set_bind_group(1, &self.per_draw_bind_group, &[0]);
        rpass.set_bind_group(2, self.texture_bind_group(Some(id)), &[]);
        let m = &self.meshes.pano;
        rpass.set_vertex_buffer(0, m.vertex_buf.slice(..));
        rpass.set_index_buffer(m.index_buf.slice(..), wgpu::IndexFormat::Uint32);
        rpass.draw_indexed(0..m.index_count, 0, 0..1);
    }

    fn render_scene(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        view: &wgpu::TextureView,
        scene: &SceneFrame,
    ) {
        // Draws run opaque, lines, alpha, additive, particles. A stable sort
        // keeps submission order inside each group.
        let mut order: Vec<usize> = (0..scene.meshes.len().min(MAX_DRAWS)).collect();
        order.sort_by_key(|&i| scene.meshes[i].blend);

        let mesh_slots = order.len();
        let line_slots = scene.lines.len().min(MAX_DRAWS - mesh_slots);
        let mut staging = vec![0u8; (mesh_slots + line_slots) * PER_DRAW_STRIDE as usize];
        for (slot, &i) in order.iter().enumerate() {
            let d = &scene.meshes[i];
            let pd = PerDraw {
                model: d.model.to_cols_array(),
                tint: d.tint.to_array(),
                params: [if d.lit { 1.0 } else { 0.0 }, d.brightness, 0.0, 0.0],
            };
            let at = slot * PER_DRAW_STRIDE as usize;
            staging[at..at + std::mem::size_of::<PerDraw>()]
                .copy_from_slice(bytemuck::bytes_of(&pd));
        }
        for (j, l) in scene.lines.iter().take(line_slots).enumerate() {
            let pd = PerDraw {
                model: l.model.to_cols_array(),
                tint: l.color.to_array(),
                params: [0.0, 1.0, 0.0, 0.0],
            };
            let at = (mesh_slots + j) * PER_DRAW_STRIDE as usize;
            staging[at..at + std::mem::size_of::<PerDraw>()]
                .copy_from_slice(bytemuck::bytes_of(&pd));
        }
        if !staging.is_empty() {
            self.queue.write_buffer(&self.per_draw_buffer, 0, &staging);
        }

        let particle_count = scene.particles.len().min(PARTICLE_COUNT);
        if particle_count > 0 {
            self.queue.write_buffer(
                &self.particle_instance_buf,
                0,
                bytemuck::cast_slice(&scene.particles[..particle_count]),
            );
        }

        let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("scene_pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(self.clear_color),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: Some(depth_attachment(&self.depth_view)),
            timestamp_writes: None,
            occlusion_query_set: None,
        });
        rpass.set_bind_group(0, &self.globals_bind_group, &[]);

        let mut slot = 0usize;
        for blend in [Blend::Opaque, Blend::Alpha, Blend::Additive] {
            if blend == Blend::Alpha {
                // Lines sit between the opaque scene and the translucent layer.
                rpass.set_pipeline(&self.line_pipeline);
                for (j, l) in scene.lines.iter().take(line_slots).enumerate() {
                    let offset = ((mesh_slots + j) as u64 * PER_DRAW_STRIDE) as u32;
                    rpass.set_bind_group(1, &self.per_draw_bind_group, &[offset]);
                    let lines = match l.lines {
                        LineRef::Grid => &self.meshes.grid,
                        LineRef::CrystalWire => &self.meshes.crystal_wire,
                    };
                    rpass.set_vertex_buffer(0, lines.vertex_buf.slice(..));
                    rpass.draw(0..lines.vertex_count, 0..1);
                }
            }
            let pipeline = match blend {
                Blend::Opaque => &self.mesh_opaque_pipeline,
                Blend::Alpha => &self.mesh_alpha_pipeline,
                Blend::Additive => &self.mesh_additive_pipeline,
            };
            rpass.set_pipeline(pipeline);
            while slot < order.len() && scene.meshes[order[slot]].blend == blend {
                let d = &scene.meshes[order[slot]];
                let offset = (slot as u64 * PER_DRAW_STRIDE) as u32;
                rpass.set_bind_group(1, &self.per_draw_bind_group, &[offset]);
                rpass.set_bind_group(2, self.texture_bind_group(d.texture), &[]);
                let m = self.mesh_for(d.mesh);
                rpass.set_vertex_buffer(0, m.vertex_buf.slice(..));
                rpass.set_index_buffer(m.index_buf.slice(..), wgpu::IndexFormat::Uint32);
                rpass.draw_indexed(0..m.index_count, 0, 0..1);
                slot += 1;
            }
        }

        if particle_count > 0 {
            rpass.set_pipeline(&self.particle_pipeline);
            rpass.set_vertex_buffer(0, self.particle_corner_buf.slice(..));
            rpass.set_vertex_buffer(1, self.particle_instance_buf.slice(..));
            rpass.draw(0..4, 0..particle_count as u32);
        }
    }

    fn mesh_for(&self, r: MeshRef) -> &GpuMesh {
        match r {
            MeshRef::Sphere => &self.meshes.sphere,
            MeshRef::Pano => &self.meshes.pano,
            MeshRef::Quad => &self.meshes.quad,
            MeshRef::Cube => &self.meshes.cube,
            MeshRef::Pyramid => &self.meshes.pyramid,
            MeshRef::Crystal => &self.meshes.crystal,
            MeshRef::Ring(i) => &self.meshes.rings[i.min(self.meshes.rings.len() - 1)],
        }
    }

    fn texture_bind_group(&self, id: Option<TextureId>) -> &wgpu::BindGroup {
        id.and_then(|id| self.textures.get(&id))
            .unwrap_or(&self.white_bind_group)
    }
}

const ADDITIVE_BLEND: wgpu::BlendState = wgpu::BlendState {
    color: wgpu::BlendComponent {
        src_factor: wgpu::BlendFactor::One,
        dst_factor: wgpu::BlendFactor::One,
        operation: wgpu::BlendOperation::Add,
    },
    alpha: wgpu::BlendComponent {
        src_factor: wgpu::BlendFactor::One,
        dst_factor: wgpu::BlendFactor::One,
        operation: wgpu::BlendOperation::Add,
    },
};

fn create_depth_view(device: &wgpu::Device, width: u32, height: u32) -> wgpu::TextureView {
    let tex = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("depth"),
        size: wgpu::Extent3d {
            width: width.max(1),
            height: height.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    tex.create_view(&wgpu::TextureViewDescriptor::default())
}

fn depth_attachment(view: &wgpu::TextureView) -> wgpu::RenderPassDepthStencilAttachment<'_> {
    wgpu::RenderPassDepthStencilAttachment {
        view,
        depth_ops: Some(wgpu::Operations {
            load: wgpu::LoadOp::Clear(1.0),
            store: wgpu::StoreOp::Store,
        }),
        stencil_ops: None,
    }
}

fn upload_mesh(device: &wgpu::Device, label: &str, data: &mesh::MeshData) -> GpuMesh {
    let vertex_buf = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(label),
        contents: bytemuck::cast_slice(&data.vertices),
        usage: wgpu::BufferUsages::VERTEX,
    });
    let index_buf = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(label),
        contents: bytemuck::cast_slice(&data.indices),
        usage: wgpu::BufferUsages::INDEX,
    });
    GpuMesh {
        vertex_buf,
        index_buf,
        index_count: data.indices.len() as u32,
    }
}

fn upload_lines(device: &wgpu::Device, label: &str, data: &mesh::LineData) -> GpuLines {
    let vertex_buf = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(label),
        contents: bytemuck::cast_slice(&data.positions),
        usage: wgpu::BufferUsages::VERTEX,
    });
    GpuLines {
        vertex_buf,
        vertex_count: data.positions.len() as u32,
    }
}

#[allow(clippy::too_many_arguments)]
fn make_mesh_pipeline(
    device: &wgpu::Device,
    label: &str,
    layout: &wgpu::PipelineLayout,
    shader: &wgpu::ShaderModule,
    vertex_layout: wgpu::VertexBufferLayout<'_>,
    format: wgpu::TextureFormat,
    blend: Option<wgpu::BlendState>,
    depth_write: bool,
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some("vs_mesh"),
            buffers: &[vertex_layout],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        },
        primitive: wgpu::PrimitiveState::default(),
        depth_stencil: Some(wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: depth_write,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState::default(),
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some("fs_mesh"),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend,
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        }),
        cache: None,
        multiview: None,
    })
}
