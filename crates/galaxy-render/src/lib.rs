//! wgpu rendering for the galaxy point cloud: device and surface setup, the
//! orbit camera, frame encoding, and the instanced point-sprite pipeline.

pub mod camera;
pub mod gpu;
pub mod pass;
pub mod points;
pub mod scene;
pub mod surface;

pub use camera::{CameraUniform, OrbitCamera};
pub use gpu::{RenderContext, RenderContextError, SurfaceError, init_render_context_blocking};
pub use pass::{FrameEncoder, RenderPassBuilder};
pub use points::{GALAXY_SHADER_SOURCE, GalaxyUniforms, GalaxyVertex, GpuPointScene, PointCloudPipeline};
pub use scene::{PointScene, RenderableId, ShadingConfig};
pub use surface::{PhysicalSize, SurfaceResizeEvent, SurfaceWrapper, pixel_ratio};
