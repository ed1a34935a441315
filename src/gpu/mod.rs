#[cfg(feature = "egui")]
mod egui_integration;
mod shader;
mod texture;

use std::collections::HashMap;
use std::sync::Arc;

use wgpu::util::DeviceExt;
use winit::window::Window;

#[cfg(feature = "egui")]
pub(crate) use egui_integration::{EguiFrameOutput, EguiIntegration};
use shader::{CameraUniforms, GroupUniforms, POINTS_SHADER};
use texture::GpuTexture;

use crate::error::GpuError;
use crate::material::{BlendMode, PointsMaterial};
use crate::scene::Scene;
use crate::textures::{TextureConfig, TextureRegistry};

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;
/// Vertices per point quad.
const QUAD_VERTICES: u32 = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct PipelineKey {
    blending: BlendMode,
    depth_test: bool,
}

impl PipelineKey {
    fn of(material: &PointsMaterial) -> Self {
        Self {
            blending: material.blending,
            depth_test: material.depth_test,
        }
    }
}

struct GpuGroup {
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    has_map: bool,
    key: PipelineKey,
}

pub(crate) struct GpuState {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    pipelines: HashMap<PipelineKey, wgpu::RenderPipeline>,
    position_buffer: wgpu::Buffer,
    num_points: u32,
    camera_buffer: wgpu::Buffer,
    camera_bind_group: wgpu::BindGroup,
    group_layout: wgpu::BindGroupLayout,
    groups: Vec<GpuGroup>,
    /// One entry per registry slot; `None` for unresolved slots.
    textures: Vec<Option<GpuTexture>>,
    /// Bound in place of a missing sprite so every group has the same layout.
    fallback: GpuTexture,
    depth_texture: wgpu::TextureView,
    #[cfg(feature = "egui")]
    pub egui: EguiIntegration,
    #[cfg(feature = "egui")]
    pending_ui: Option<EguiFrameOutput>,
}

impl GpuState {
    pub async fn new(
        window: Arc<Window>,
        scene: &Scene,
        registry: &TextureRegistry,
    ) -> Result<Self, GpuError> {
        let (width, height) = scene.viewport().physical_size();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let surface = instance.create_surface(window.clone())?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or(GpuError::NoAdapter)?;
        log::info!("Using adapter: {}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: Default::default(),
                },
                None,
            )
            .await?;

        let surface_caps = surface.get_capabilities(&adapter);
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

        let depth_texture = create_depth_texture(&device, &config);

        let positions = scene.positions();
        let position_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Position Buffer"),
            contents: bytemuck::cast_slice(&positions[..]),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let camera_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Camera Buffer"),
            contents: bytemuck::bytes_of(&camera_uniforms(scene, &config)),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let camera_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Camera Bind Group Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let camera_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Camera Bind Group"),
            layout: &camera_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: camera_buffer.as_entire_binding(),
            }],
        });

        let group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Group Bind Group Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
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

        let textures: Vec<Option<GpuTexture>> = registry
            .iter()
            .map(|(handle, tex)| {
                tex.map(|tex| {
                    GpuTexture::upload(&device, &queue, tex, &format!("Sprite {}", handle.index()))
                })
            })
            .collect();
        let fallback = GpuTexture::upload(
            &device,
            &queue,
            &TextureConfig::solid(255, 255, 255, 255),
            "Fallback Sprite",
        );

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Points Shader"),
            source: wgpu::ShaderSource::Wgsl(POINTS_SHADER.into()),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Points Pipeline Layout"),
            bind_group_layouts: &[&camera_layout, &group_layout],
            push_constant_ranges: &[],
        });

        let mut pipelines = HashMap::new();
        let mut groups = Vec::with_capacity(scene.groups().len());
        for (i, group) in scene.groups().iter().enumerate() {
            let key = PipelineKey::of(&group.material);
            pipelines.entry(key).or_insert_with(|| {
                create_points_pipeline(&device, &pipeline_layout, &shader, config.format, key)
            });

            let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
                label: Some(&format!("Group {} Uniforms", i)),
                size: std::mem::size_of::<GroupUniforms>() as wgpu::BufferAddress,
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            });
            let sprite = resolve_sprite(&textures, &group.material);
            let bind_group = create_group_bind_group(
                &device,
                &group_layout,
                &uniform_buffer,
                sprite.unwrap_or(&fallback),
            );

            groups.push(GpuGroup {
                uniform_buffer,
                bind_group,
                has_map: sprite.is_some(),
                key,
            });
        }

        let num_points = positions.len() as u32;
        log::info!(
            "GPU ready: {}x{} {:?}, {} points x {} groups",
            width,
            height,
            surface_format,
            num_points,
            groups.len()
        );

        Ok(Self {
            #[cfg(feature = "egui")]
            egui: EguiIntegration::new(&device, config.format, &window),
            #[cfg(feature = "egui")]
            pending_ui: None,
            surface,
            device,
            queue,
            config,
            pipelines,
            position_buffer,
            num_points,
            camera_buffer,
            camera_bind_group,
            group_layout,
            groups,
            textures,
            fallback,
            depth_texture,
        })
    }

    /// Resize the render target to `(width, height)` physical pixels.
    pub fn resize(&mut self, (width, height): (u32, u32)) {
        if width > 0 && height > 0 {
            self.config.width = width;
            self.config.height = height;
            self.surface.configure(&self.device, &self.config);
            self.depth_texture = create_depth_texture(&self.device, &self.config);
        }
    }

    /// Reconfigure the surface at its current size after it was lost.
    pub fn reconfigure(&mut self) {
        self.resize((self.config.width, self.config.height));
    }

    /// Queue egui output to be drawn over the next frame.
    #[cfg(feature = "egui")]
    pub fn queue_ui(&mut self, output: EguiFrameOutput) {
        self.pending_ui = Some(output);
    }

    /// Upload scene state and draw one frame.
    pub fn render(&mut self, scene: &mut Scene) -> Result<(), wgpu::SurfaceError> {
        self.queue.write_buffer(
            &self.camera_buffer,
            0,
            bytemuck::bytes_of(&camera_uniforms(scene, &self.config)),
        );
        self.sync_groups(scene);

        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Points Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            render_pass.set_bind_group(0, &self.camera_bind_group, &[]);
            render_pass.set_vertex_buffer(0, self.position_buffer.slice(..));
            for group in &self.groups {
                if let Some(pipeline) = self.pipelines.get(&group.key) {
                    render_pass.set_pipeline(pipeline);
                    render_pass.set_bind_group(1, &group.bind_group, &[]);
                    render_pass.draw(0..QUAD_VERTICES, 0..self.num_points);
                }
            }
        }

        #[cfg(feature = "egui")]
        if let Some(ui) = self.pending_ui.take() {
            self.egui.render(
                &self.device,
                &self.queue,
                &mut encoder,
                &view,
                ui,
                [self.config.width, self.config.height],
            );
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }

    /// Write per-group uniforms and rebuild bind groups for changed materials.
    fn sync_groups(&mut self, scene: &mut Scene) {
        for (group, gpu) in scene.groups_mut().iter_mut().zip(&mut self.groups) {
            if group.material.take_needs_update() {
                let sprite = resolve_sprite(&self.textures, &group.material);
                gpu.has_map = sprite.is_some();
                gpu.bind_group = create_group_bind_group(
                    &self.device,
                    &self.group_layout,
                    &gpu.uniform_buffer,
                    sprite.unwrap_or(&self.fallback),
                );
            }

            let rgb = group.material.color.to_linear_rgb();
            let uniforms = GroupUniforms {
                model: group.model_matrix().to_cols_array_2d(),
                color: [rgb.x, rgb.y, rgb.z, 1.0],
                size: group.material.size,
                has_map: gpu.has_map as u32,
                _padding: [0.0; 2],
            };
            self.queue
                .write_buffer(&gpu.uniform_buffer, 0, bytemuck::bytes_of(&uniforms));
        }
    }
}

fn camera_uniforms(scene: &Scene, config: &wgpu::SurfaceConfiguration) -> CameraUniforms {
    let camera = scene.camera();
    CameraUniforms {
        view: camera.view_matrix().to_cols_array_2d(),
        proj: camera.projection_matrix().to_cols_array_2d(),
        viewport: [config.width as f32, config.height as f32],
        _padding: [0.0; 2],
    }
}

fn resolve_sprite<'a>(
    textures: &'a [Option<GpuTexture>],
    material: &PointsMaterial,
) -> Option<&'a GpuTexture> {
    material
        .map()
        .and_then(|handle| textures.get(handle.index()))
        .and_then(Option::as_ref)
}

fn create_group_bind_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    uniform_buffer: &wgpu::Buffer,
    sprite: &GpuTexture,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("Group Bind Group"),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::TextureView(&sprite.view),
            },
            wgpu::BindGroupEntry {
                binding: 2,
                resource: wgpu::BindingResource::Sampler(&sprite.sampler),
            },
        ],
    })
}

fn blend_state(blending: BlendMode) -> wgpu::BlendState {
    match blending {
        BlendMode::Alpha => wgpu::BlendState::ALPHA_BLENDING,
        BlendMode::Additive => wgpu::BlendState {
            color: wgpu::BlendComponent {
                src_factor: wgpu::BlendFactor::SrcAlpha,
                dst_factor: wgpu::BlendFactor::One,
                operation: wgpu::BlendOperation::Add,
            },
            alpha: wgpu::BlendComponent {
                src_factor: wgpu::BlendFactor::One,
                dst_factor: wgpu::BlendFactor::One,
                operation: wgpu::BlendOperation::Add,
            },
        },
    }
}

fn create_points_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    shader: &wgpu::ShaderModule,
    format: wgpu::TextureFormat,
    key: PipelineKey,
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("Points Pipeline"),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some("vs_main"),
            buffers: &[wgpu::VertexBufferLayout {
                array_stride: std::mem::size_of::<glam::Vec3>() as wgpu::BufferAddress,
                step_mode: wgpu::VertexStepMode::Instance,
                attributes: &[wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x3,
                }],
            }],
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(blend_state(key.blending)),
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
        // With depth testing off every sprite is drawn regardless of order
        depth_stencil: Some(wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: key.depth_test,
            depth_compare: if key.depth_test {
                wgpu::CompareFunction::Less
            } else {
                wgpu::CompareFunction::Always
            },
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
        cache: None,
    })
}

fn create_depth_texture(
    device: &wgpu::Device,
    config: &wgpu::SurfaceConfiguration,
) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Depth Texture"),
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
