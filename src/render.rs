//! wgpu forward renderer for the loaded model and the debug hotspot disc.
//! Shared by the web (canvas surface) and native (window surface) front-ends.

use crate::asset::MeshData;
use crate::constants::*;
use crate::scene::{NodeHandle, SceneGraph};
use crate::state::SceneState;
use glam::{Mat4, Vec3};
use wgpu::util::DeviceExt;

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct Globals {
    view_proj: [[f32; 4]; 4],
    camera_pos: [f32; 4],
    lights: [[f32; 4]; 3],
}

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct DrawUniforms {
    model: [[f32; 4]; 4],
    color: [f32; 4],
}

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    pub pos: [f32; 3],
    pub nrm: [f32; 3],
}

impl Vertex {
    const LAYOUT: wgpu::VertexBufferLayout<'static> = wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<Vertex>() as u64,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &[
            wgpu::VertexAttribute {
                format: wgpu::VertexFormat::Float32x3,
                offset: 0,
                shader_location: 0,
            },
            wgpu::VertexAttribute {
                format: wgpu::VertexFormat::Float32x3,
                offset: 12,
                shader_location: 1,
            },
        ],
    };
}

/// Filled disc in the XY plane facing +Z, as a triangle fan.
pub fn disc_geometry(radius: f32, segments: u32) -> (Vec<Vertex>, Vec<u32>) {
    let segments = segments.max(3);
    let mut vertices = Vec::with_capacity(segments as usize + 1);
    vertices.push(Vertex {
        pos: [0.0, 0.0, 0.0],
        nrm: [0.0, 0.0, 1.0],
    });
    for i in 0..segments {
        let a = i as f32 / segments as f32 * std::f32::consts::TAU;
        vertices.push(Vertex {
            pos: [radius * a.cos(), radius * a.sin(), 0.0],
            nrm: [0.0, 0.0, 1.0],
        });
    }
    let mut indices = Vec::with_capacity(segments as usize * 3);
    for i in 0..segments {
        indices.extend_from_slice(&[0, 1 + i, 1 + (i + 1) % segments]);
    }
    (vertices, indices)
}

struct GeometryBuffers {
    vb: wgpu::Buffer,
    ib: wgpu::Buffer,
    index_count: u32,
}

struct DrawSlot {
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

struct DrawItem {
    node: NodeHandle,
    geometry: usize,
    color: [f32; 4],
    slot: DrawSlot,
}

pub struct Renderer<'w> {
    surface: wgpu::Surface<'w>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    depth_view: wgpu::TextureView,
    color_pipeline: wgpu::RenderPipeline,
    depth_only_pipeline: wgpu::RenderPipeline,
    globals_buffer: wgpu::Buffer,
    globals_bind_group: wgpu::BindGroup,
    draw_bgl: wgpu::BindGroupLayout,
    geometries: Vec<GeometryBuffers>,
    items: Vec<DrawItem>,
    model_uploaded: bool,
    hotspot_geometry: GeometryBuffers,
    hotspot_slot: DrawSlot,
    clear_color: wgpu::Color,
}

impl<'w> Renderer<'w> {
    pub async fn new(
        instance: &wgpu::Instance,
        surface: wgpu::Surface<'w>,
        width: u32,
        height: u32,
    ) -> anyhow::Result<Self> {
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| anyhow::anyhow!("No GPU adapter"))?;
        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: wgpu::MemoryHints::Performance,
                    label: None,
                },
                None,
            )
            .await
            .map_err(|e| anyhow::anyhow!("request_device error: {:?}", e))?;

        let caps = surface.get_capabilities(&adapter);
        let format = caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| caps.formats.first().copied())
            .ok_or_else(|| anyhow::anyhow!("surface reports no formats"))?;
        let alpha_mode = caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: width.max(1),
            height: height.max(1),
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);
        let depth_view = create_depth_view(&device, config.width, config.height);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("scene_shader"),
            source: wgpu::ShaderSource::Wgsl(crate::SCENE_WGSL.into()),
        });

        let globals_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("globals"),
            size: std::mem::size_of::<Globals>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let globals_bgl = uniform_bgl(&device, "globals_bgl");
        let globals_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("globals_bg"),
            layout: &globals_bgl,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: globals_buffer.as_entire_binding(),
            }],
        });
        let draw_bgl = uniform_bgl(&device, "draw_bgl");

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("scene_pl"),
            bind_group_layouts: &[&globals_bgl, &draw_bgl],
            push_constant_ranges: &[],
        });
        let color_pipeline = create_pipeline(
            &device,
            &pipeline_layout,
            &shader,
            format,
            wgpu::ColorWrites::ALL,
            "color_pipeline",
        );
        let depth_only_pipeline = create_pipeline(
            &device,
            &pipeline_layout,
            &shader,
            format,
            wgpu::ColorWrites::empty(),
            "depth_only_pipeline",
        );

        let (disc_vertices, disc_indices) = disc_geometry(1.0, HOTSPOT_SEGMENTS);
        let hotspot_geometry = upload_geometry(&device, &disc_vertices, &disc_indices, "hotspot");
        let hotspot_slot = create_draw_slot(&device, &draw_bgl, "hotspot");

        log::info!(
            "[gpu] surface {}x{} format={:?}",
            config.width,
            config.height,
            format
        );

        Ok(Self {
            surface,
            device,
            queue,
            config,
            depth_view,
            color_pipeline,
            depth_only_pipeline,
            globals_buffer,
            globals_bind_group,
            draw_bgl,
            geometries: Vec::new(),
            items: Vec::new(),
            model_uploaded: false,
            hotspot_geometry,
            hotspot_slot,
            clear_color: wgpu::Color {
                r: 0.0,
                g: 0.0,
                b: 0.0,
                a: 1.0,
            },
        })
    }

    #[inline]
    pub fn size(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        if width == self.config.width && height == self.config.height {
            return;
        }
        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);
        self.depth_view = create_depth_view(&self.device, width, height);
    }

    /// Reconfigure after the surface was lost or outdated.
    pub fn reconfigure(&mut self) {
        self.surface.configure(&self.device, &self.config);
    }

    /// Upload vertex/index data for every mesh node. Runs once, the first
    /// frame after the model becomes ready.
    fn upload_model(&mut self, scene: &SceneGraph, meshes: &[MeshData]) {
        let mut offsets = Vec::with_capacity(meshes.len());
        for (mi, mesh) in meshes.iter().enumerate() {
            offsets.push(self.geometries.len());
            for prim in &mesh.primitives {
                let vertices: Vec<Vertex> = prim
                    .positions
                    .iter()
                    .zip(prim.normals.iter().chain(std::iter::repeat(&[0.0, 0.0, 1.0])))
                    .map(|(p, n)| Vertex { pos: *p, nrm: *n })
                    .collect();
                self.geometries.push(upload_geometry(
                    &self.device,
                    &vertices,
                    &prim.indices,
                    &format!("mesh{}", mi),
                ));
            }
        }
        for h in scene.traverse() {
            let Some(mi) = scene.node(h).mesh else {
                continue;
            };
            let Some(mesh) = meshes.get(mi) else {
                log::warn!("[gpu] node {} references missing mesh {}", h.index(), mi);
                continue;
            };
            for (pi, prim) in mesh.primitives.iter().enumerate() {
                self.items.push(DrawItem {
                    node: h,
                    geometry: offsets[mi] + pi,
                    color: prim.base_color,
                    slot: create_draw_slot(&self.device, &self.draw_bgl, "mesh_draw"),
                });
            }
        }
        self.model_uploaded = true;
        log::info!(
            "[gpu] uploaded {} primitives, {} draws",
            self.geometries.len(),
            self.items.len()
        );
    }

    pub fn render(&mut self, state: &SceneState) -> Result<(), wgpu::SurfaceError> {
        if let Some(rig) = state.rig() {
            if !self.model_uploaded {
                self.upload_model(rig.scene(), &rig.asset.meshes);
            }
        }

        let camera = &state.camera;
        let mut lights = [[0.0_f32; 4]; 3];
        for (dst, src) in lights.iter_mut().zip(LIGHT_POSITIONS.iter()) {
            *dst = [src[0], src[1], src[2], LIGHT_INTENSITY];
        }
        let globals = Globals {
            view_proj: camera.view_proj().to_cols_array_2d(),
            camera_pos: camera.eye.extend(1.0).to_array(),
            lights,
        };
        self.queue
            .write_buffer(&self.globals_buffer, 0, bytemuck::bytes_of(&globals));

        // visible draws, stable-sorted by render order
        let mut order: Vec<usize> = Vec::new();
        if let Some(rig) = state.rig() {
            let scene = rig.scene();
            let worlds = scene.world_matrices();
            for (i, item) in self.items.iter().enumerate() {
                if !scene.is_visible(item.node) {
                    continue;
                }
                let u = DrawUniforms {
                    model: worlds[item.node.index()].to_cols_array_2d(),
                    color: item.color,
                };
                self.queue
                    .write_buffer(&item.slot.uniform_buffer, 0, bytemuck::bytes_of(&u));
                order.push(i);
            }
            order.sort_by_key(|&i| scene.node(self.items[i].node).render_order);
        }
        if state.hotspot.visible {
            let u = DrawUniforms {
                model: (Mat4::from_translation(state.hotspot.center)
                    * Mat4::from_scale(Vec3::splat(state.hotspot.radius)))
                .to_cols_array_2d(),
                color: HOTSPOT_COLOR,
            };
            self.queue
                .write_buffer(&self.hotspot_slot.uniform_buffer, 0, bytemuck::bytes_of(&u));
        }

        let frame = self.surface.get_current_texture()?;
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("encoder"),
            });
        {
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("scene_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
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
            });
            rpass.set_bind_group(0, &self.globals_bind_group, &[]);
            if let Some(rig) = state.rig() {
                let scene = rig.scene();
                for &i in &order {
                    let item = &self.items[i];
                    let pipeline = if scene.node(item.node).color_write {
                        &self.color_pipeline
                    } else {
                        &self.depth_only_pipeline
                    };
                    rpass.set_pipeline(pipeline);
                    rpass.set_bind_group(1, &item.slot.bind_group, &[]);
                    draw_geometry(&mut rpass, &self.geometries[item.geometry]);
                }
            }
            if state.hotspot.visible {
                rpass.set_pipeline(&self.color_pipeline);
                rpass.set_bind_group(1, &self.hotspot_slot.bind_group, &[]);
                draw_geometry(&mut rpass, &self.hotspot_geometry);
            }
        }
        self.queue.submit(Some(encoder.finish()));
        frame.present();
        Ok(())
    }
}

fn draw_geometry(rpass: &mut wgpu::RenderPass<'_>, g: &GeometryBuffers) {
    rpass.set_vertex_buffer(0, g.vb.slice(..));
    rpass.set_index_buffer(g.ib.slice(..), wgpu::IndexFormat::Uint32);
    rpass.draw_indexed(0..g.index_count, 0, 0..1);
}

fn uniform_bgl(device: &wgpu::Device, label: &str) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some(label),
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
    })
}

fn create_draw_slot(device: &wgpu::Device, layout: &wgpu::BindGroupLayout, label: &str) -> DrawSlot {
    let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some(label),
        size: std::mem::size_of::<DrawUniforms>() as u64,
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });
    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some(label),
        layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: uniform_buffer.as_entire_binding(),
        }],
    });
    DrawSlot {
        uniform_buffer,
        bind_group,
    }
}

fn upload_geometry(
    device: &wgpu::Device,
    vertices: &[Vertex],
    indices: &[u32],
    label: &str,
) -> GeometryBuffers {
    let vb = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(label),
        contents: bytemuck::cast_slice(vertices),
        usage: wgpu::BufferUsages::VERTEX,
    });
    let ib = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(label),
        contents: bytemuck::cast_slice(indices),
        usage: wgpu::BufferUsages::INDEX,
    });
    GeometryBuffers {
        vb,
        ib,
        index_count: indices.len() as u32,
    }
}

fn create_depth_view(device: &wgpu::Device, width: u32, height: u32) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
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
    texture.create_view(&wgpu::TextureViewDescriptor::default())
}

fn create_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    shader: &wgpu::ShaderModule,
    format: wgpu::TextureFormat,
    write_mask: wgpu::ColorWrites,
    label: &str,
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some("vs_main"),
            buffers: &[Vertex::LAYOUT],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        },
        primitive: wgpu::PrimitiveState {
            cull_mode: None,
            ..Default::default()
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState::default(),
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                write_mask,
            })],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        }),
        cache: None,
        multiview: None,
    })
}
