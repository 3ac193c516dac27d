//! Instanced point-sprite rendering for galaxy point clouds.
//!
//! Each point is one instance expanded to a camera-facing quad in the vertex
//! shader (`PointList` primitives are fixed at one pixel on most backends).
//! Points spin around +Y at an angular speed inversely proportional to their
//! distance from the axis, then get their randomness offset added, so the
//! arms wind up over time while the jitter cloud stays put.

use std::collections::HashMap;
use std::num::NonZeroU64;

use bytemuck::{Pod, Zeroable};
use galaxy_gen::{MAX_POINTS, PointAttributeSet};
use wgpu::util::DeviceExt;

use crate::camera::CameraUniform;
use crate::scene::{PointScene, RenderableId, ShadingConfig};

/// Quad corners per point instance.
const VERTICES_PER_POINT: u32 = 6;

// The largest galaxy the generator accepts must fit a single instance
// buffer on a device with default limits.
const _: () = assert!(
    MAX_POINTS as u64 * std::mem::size_of::<GalaxyVertex>() as u64 <= 256 << 20
        && MAX_POINTS <= u32::MAX as usize
);

/// Per-instance point attributes, interleaved.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct GalaxyVertex {
    pub position: [f32; 3],
    pub color: [f32; 3],
    pub randomness: [f32; 3],
    pub size: f32,
}

impl GalaxyVertex {
    pub const LAYOUT: wgpu::VertexBufferLayout<'static> = wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<GalaxyVertex>() as wgpu::BufferAddress,
        step_mode: wgpu::VertexStepMode::Instance,
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
            wgpu::VertexAttribute {
                format: wgpu::VertexFormat::Float32x3,
                offset: 24,
                shader_location: 2,
            },
            wgpu::VertexAttribute {
                format: wgpu::VertexFormat::Float32,
                offset: 36,
                shader_location: 3,
            },
        ],
    };

    /// Interleave the four attribute buffers.
    pub fn from_attributes(attributes: &PointAttributeSet) -> Vec<GalaxyVertex> {
        attributes
            .positions()
            .iter()
            .zip(attributes.colors())
            .zip(attributes.randomness_offsets())
            .zip(attributes.size_factors())
            .map(|(((position, color), randomness), &size)| GalaxyVertex {
                position: position.to_array(),
                color: color.0,
                randomness: randomness.to_array(),
                size,
            })
            .collect()
    }
}

/// Per-renderable shader uniforms.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct GalaxyUniforms {
    /// Animation time (wall seconds times animation speed).
    pub time: f32,
    pub point_size_scale: f32,
    pub brightness: f32,
    pub _padding: f32,
}

impl GalaxyUniforms {
    pub fn new(shading: &ShadingConfig) -> Self {
        Self {
            time: 0.0,
            point_size_scale: shading.point_size_scale,
            brightness: shading.brightness,
            _padding: 0.0,
        }
    }
}

pub const GALAXY_SHADER_SOURCE: &str = r#"
struct Camera {
    view: mat4x4<f32>,
    proj: mat4x4<f32>,
    viewport: vec4<f32>,
};

struct Galaxy {
    time: f32,
    point_size_scale: f32,
    brightness: f32,
    _padding: f32,
};

struct PointInput {
    @location(0) position: vec3<f32>,
    @location(1) color: vec3<f32>,
    @location(2) randomness: vec3<f32>,
    @location(3) size: f32,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) color: vec3<f32>,
    @location(1) uv: vec2<f32>,
};

@group(0) @binding(0)
var<uniform> camera: Camera;

@group(1) @binding(0)
var<uniform> galaxy: Galaxy;

@vertex
fn vs_galaxy(@builtin(vertex_index) vertex_index: u32, point: PointInput) -> VertexOutput {
    var corners = array<vec2<f32>, 6>(
        vec2<f32>(-1.0, -1.0),
        vec2<f32>(1.0, -1.0),
        vec2<f32>(1.0, 1.0),
        vec2<f32>(-1.0, -1.0),
        vec2<f32>(1.0, 1.0),
        vec2<f32>(-1.0, 1.0),
    );
    let corner = corners[vertex_index];

    // Spin: inner points orbit faster.
    var world = point.position;
    let dist = max(length(world.xz), 1e-4);
    let angle = atan2(world.z, world.x) + (1.0 / dist) * galaxy.time * 0.2;
    world.x = cos(angle) * dist;
    world.z = sin(angle) * dist;
    world += point.randomness;

    let view_pos = camera.view * vec4<f32>(world, 1.0);
    var clip = camera.proj * view_pos;

    // Size attenuation: pixels shrink with view depth.
    let size_px = galaxy.point_size_scale * point.size / max(-view_pos.z, 1e-4);
    clip = vec4<f32>(clip.xy + corner * size_px / camera.viewport.xy * clip.w, clip.zw);

    var out: VertexOutput;
    out.clip_position = clip;
    out.color = point.color;
    out.uv = corner * 0.5 + vec2<f32>(0.5, 0.5);
    return out;
}

@fragment
fn fs_galaxy(in: VertexOutput) -> @location(0) vec4<f32> {
    let strength = pow(1.0 - distance(in.uv, vec2<f32>(0.5, 0.5)), 10.0);
    return vec4<f32>(in.color * strength * galaxy.brightness, 1.0);
}
"#;

/// Render pipeline shared by every galaxy renderable.
pub struct PointCloudPipeline {
    pub pipeline: wgpu::RenderPipeline,
    pub camera_bind_group_layout: wgpu::BindGroupLayout,
    pub galaxy_bind_group_layout: wgpu::BindGroupLayout,
}

impl PointCloudPipeline {
    pub fn new(device: &wgpu::Device, surface_format: wgpu::TextureFormat) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("galaxy-shader"),
            source: wgpu::ShaderSource::Wgsl(GALAXY_SHADER_SOURCE.into()),
        });

        let camera_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("galaxy-camera-bgl"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: NonZeroU64::new(
                            std::mem::size_of::<CameraUniform>() as u64
                        ),
                    },
                    count: None,
                }],
            });

        let galaxy_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("galaxy-uniform-bgl"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: NonZeroU64::new(
                            std::mem::size_of::<GalaxyUniforms>() as u64
                        ),
                    },
                    count: None,
                }],
            });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("galaxy-pipeline-layout"),
            bind_group_layouts: &[&camera_bind_group_layout, &galaxy_bind_group_layout],
            immediate_size: 0,
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("galaxy-pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_galaxy"),
                buffers: &[GalaxyVertex::LAYOUT],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: None,
                ..Default::default()
            },
            // Additive sprites: no depth buffer, draw order does not matter.
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_galaxy"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState {
                        color: wgpu::BlendComponent {
                            src_factor: wgpu::BlendFactor::One,
                            dst_factor: wgpu::BlendFactor::One,
                            operation: wgpu::BlendOperation::Add,
                        },
                        alpha: wgpu::BlendComponent::OVER,
                    }),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            multiview_mask: None,
            cache: None,
        });

        Self {
            pipeline,
            camera_bind_group_layout,
            galaxy_bind_group_layout,
        }
    }
}

struct GpuRenderable {
    instance_buffer: wgpu::Buffer,
    instance_count: u32,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    uniforms: GalaxyUniforms,
}

/// [`PointScene`] backed by wgpu buffers.
pub struct GpuPointScene {
    device: wgpu::Device,
    queue: wgpu::Queue,
    pipeline: PointCloudPipeline,
    camera_buffer: wgpu::Buffer,
    camera_bind_group: wgpu::BindGroup,
    renderables: HashMap<u64, GpuRenderable>,
    /// Draw order of visible renderables.
    visible: Vec<u64>,
    next_id: u64,
}

impl GpuPointScene {
    pub fn new(
        device: wgpu::Device,
        queue: wgpu::Queue,
        surface_format: wgpu::TextureFormat,
    ) -> Self {
        let pipeline = PointCloudPipeline::new(&device, surface_format);

        let camera_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("galaxy-camera"),
            size: std::mem::size_of::<CameraUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let camera_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("galaxy-camera-bg"),
            layout: &pipeline.camera_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: camera_buffer.as_entire_binding(),
            }],
        });

        log::info!("Galaxy point renderer initialized ({surface_format:?})");

        Self {
            device,
            queue,
            pipeline,
            camera_buffer,
            camera_bind_group,
            renderables: HashMap::new(),
            visible: Vec::new(),
            next_id: 0,
        }
    }

    pub fn update_camera(&self, camera: &CameraUniform) {
        self.queue
            .write_buffer(&self.camera_buffer, 0, bytemuck::bytes_of(camera));
    }

    /// Number of renderables still holding GPU resources.
    pub fn live_count(&self) -> usize {
        self.renderables.len()
    }

    /// Number of points currently drawn.
    pub fn visible_points(&self) -> u64 {
        self.visible
            .iter()
            .filter_map(|id| self.renderables.get(id))
            .map(|r| u64::from(r.instance_count))
            .sum()
    }

    /// Current uniforms of a renderable.
    pub fn uniforms(&self, handle: &RenderableId) -> Option<GalaxyUniforms> {
        self.renderables.get(&handle.0).map(|r| r.uniforms)
    }

    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>) {
        if self.visible.is_empty() {
            return;
        }
        pass.set_pipeline(&self.pipeline.pipeline);
        pass.set_bind_group(0, &self.camera_bind_group, &[]);
        for renderable in self.visible.iter().filter_map(|id| self.renderables.get(id)) {
            pass.set_bind_group(1, &renderable.bind_group, &[]);
            pass.set_vertex_buffer(0, renderable.instance_buffer.slice(..));
            pass.draw(0..VERTICES_PER_POINT, 0..renderable.instance_count);
        }
    }
}

impl PointScene for GpuPointScene {
    type Handle = RenderableId;

    fn create(&mut self, attributes: &PointAttributeSet, shading: &ShadingConfig) -> RenderableId {
        let vertices = GalaxyVertex::from_attributes(attributes);
        let instance_buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("galaxy-points"),
                contents: bytemuck::cast_slice(&vertices),
                usage: wgpu::BufferUsages::VERTEX,
            });

        let uniforms = GalaxyUniforms::new(shading);
        let uniform_buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("galaxy-uniforms"),
                contents: bytemuck::bytes_of(&uniforms),
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            });
        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("galaxy-uniform-bg"),
            layout: &self.pipeline.galaxy_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let id = self.next_id;
        self.next_id += 1;
        self.renderables.insert(
            id,
            GpuRenderable {
                instance_buffer,
                instance_count: u32::try_from(vertices.len()).unwrap_or(u32::MAX),
                uniform_buffer,
                bind_group,
                uniforms,
            },
        );
        log::debug!("Uploaded renderable {id}: {} points", vertices.len());
        RenderableId(id)
    }

    fn add(&mut self, handle: &RenderableId) {
        if self.renderables.contains_key(&handle.0) && !self.visible.contains(&handle.0) {
            self.visible.push(handle.0);
        }
    }

    fn remove(&mut self, handle: &RenderableId) {
        self.visible.retain(|id| *id != handle.0);
    }

    fn dispose(&mut self, handle: RenderableId) {
        self.visible.retain(|id| *id != handle.0);
        if let Some(renderable) = self.renderables.remove(&handle.0) {
            renderable.instance_buffer.destroy();
            renderable.uniform_buffer.destroy();
            log::debug!("Disposed renderable {}", handle.0);
        }
    }

    fn set_time(&mut self, handle: &RenderableId, time: f32) {
        if let Some(renderable) = self.renderables.get_mut(&handle.0) {
            renderable.uniforms.time = time;
            self.queue.write_buffer(
                &renderable.uniform_buffer,
                0,
                bytemuck::bytes_of(&renderable.uniforms),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use galaxy_gen::{ParameterSet, RngSource, generate};

    fn create_test_device() -> Option<(wgpu::Device, wgpu::Queue)> {
        pollster::block_on(async {
            let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
                backends: wgpu::Backends::all(),
                ..Default::default()
            });
            let adapter = instance
                .request_adapter(&wgpu::RequestAdapterOptions {
                    power_preference: wgpu::PowerPreference::default(),
                    compatible_surface: None,
                    force_fallback_adapter: false,
                })
                .await
                .ok()?;
            adapter
                .request_device(&wgpu::DeviceDescriptor::default())
                .await
                .ok()
        })
    }

    fn small_galaxy(n: usize) -> PointAttributeSet {
        let params = ParameterSet {
            total_points: n,
            ..Default::default()
        };
        generate(&params, &mut RngSource::seeded(1)).unwrap()
    }

    #[test]
    fn test_vertex_layout_matches_struct() {
        assert_eq!(std::mem::size_of::<GalaxyVertex>(), 40);
        assert_eq!(GalaxyVertex::LAYOUT.array_stride, 40);
        assert_eq!(GalaxyVertex::LAYOUT.step_mode, wgpu::VertexStepMode::Instance);
        let last = GalaxyVertex::LAYOUT.attributes.last().unwrap();
        assert_eq!(last.offset + last.format.size(), 40);
    }

    #[test]
    fn test_largest_galaxy_fits_default_limits() {
        let bytes = (MAX_POINTS * std::mem::size_of::<GalaxyVertex>()) as u64;
        assert!(bytes <= wgpu::Limits::default().max_buffer_size);
        assert!(u32::try_from(MAX_POINTS).is_ok());
    }

    #[test]
    fn test_uniforms_size_is_gpu_aligned() {
        let size = std::mem::size_of::<GalaxyUniforms>();
        assert_eq!(size % 16, 0, "GalaxyUniforms size ({size} bytes) must be 16-byte aligned");
    }

    #[test]
    fn test_interleave_preserves_attributes() {
        let set = small_galaxy(64);
        let vertices = GalaxyVertex::from_attributes(&set);
        assert_eq!(vertices.len(), 64);
        for (i, v) in vertices.iter().enumerate() {
            assert_eq!(v.position, set.positions()[i].to_array());
            assert_eq!(v.color, set.colors()[i].0);
            assert_eq!(v.randomness, set.randomness_offsets()[i].to_array());
            assert_eq!(v.size, set.size_factors()[i]);
        }
    }

    #[test]
    fn test_uniforms_start_at_time_zero() {
        let u = GalaxyUniforms::new(&ShadingConfig::new(20.0, 2.0, 2.0));
        assert_eq!(u.time, 0.0);
        assert_eq!(u.point_size_scale, 40.0);
        assert_eq!(u.brightness, 2.0);
    }

    #[test]
    fn test_shader_declares_entry_points() {
        assert!(GALAXY_SHADER_SOURCE.contains("fn vs_galaxy"));
        assert!(GALAXY_SHADER_SOURCE.contains("fn fs_galaxy"));
    }

    #[test]
    fn test_spin_is_identity_at_time_zero() {
        assert!(GALAXY_SHADER_SOURCE.contains("atan2(world.z, world.x)"));

        // Same math as `vs_galaxy` with `time = 0`.
        for (x, z) in [(3.0_f32, 0.5_f32), (-1.0, 2.0), (0.25, -4.0)] {
            let dist = (x * x + z * z).sqrt();
            let angle = z.atan2(x);
            assert!((angle.cos() * dist - x).abs() < 1e-5);
            assert!((angle.sin() * dist - z).abs() < 1e-5);
        }
    }

    #[test]
    fn test_scene_lifecycle_on_gpu() {
        let Some((device, queue)) = create_test_device() else {
            return;
        };
        let mut scene = GpuPointScene::new(device, queue, wgpu::TextureFormat::Rgba8UnormSrgb);
        let shading = ShadingConfig::new(20.0, 1.0, 2.0);

        let first = scene.create(&small_galaxy(100), &shading);
        assert_eq!(scene.live_count(), 1);
        assert_eq!(scene.visible_points(), 0);

        scene.add(&first);
        scene.add(&first);
        assert_eq!(scene.visible_points(), 100);

        scene.set_time(&first, 1.25);
        assert_eq!(scene.uniforms(&first).unwrap().time, 1.25);

        scene.remove(&first);
        assert_eq!(scene.visible_points(), 0);
        scene.dispose(first);
        assert_eq!(scene.live_count(), 0);

        let second = scene.create(&small_galaxy(10), &shading);
        scene.add(&second);
        assert_eq!(scene.visible_points(), 10);
        assert_eq!(scene.uniforms(&second).unwrap().time, 0.0);
    }
}
