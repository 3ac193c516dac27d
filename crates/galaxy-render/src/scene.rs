//! The narrow interface between the galaxy driver and whatever draws points.

use galaxy_gen::PointAttributeSet;

/// Uniform inputs fixed when a renderable is created.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShadingConfig {
    /// Point size in physical pixels at unit view distance
    /// (`point_size * pixel_ratio`).
    pub point_size_scale: f32,
    pub brightness: f32,
}

impl ShadingConfig {
    pub fn new(point_size: f32, pixel_ratio: f32, brightness: f32) -> Self {
        Self {
            point_size_scale: point_size * pixel_ratio,
            brightness,
        }
    }
}

/// Opaque handle to a renderable living in a [`crate::GpuPointScene`].
///
/// Neither `Clone` nor `Copy`: exactly one owner, and
/// [`PointScene::dispose`] consumes it.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct RenderableId(pub(crate) u64);

/// A place where point clouds are uploaded, shown, and released.
pub trait PointScene {
    type Handle;

    /// Upload attributes and create per-renderable uniforms. Time starts at 0.
    /// The new renderable is not drawn until [`PointScene::add`].
    fn create(&mut self, attributes: &PointAttributeSet, shading: &ShadingConfig) -> Self::Handle;

    /// Start drawing the renderable.
    fn add(&mut self, handle: &Self::Handle);

    /// Stop drawing the renderable. Its resources stay allocated.
    fn remove(&mut self, handle: &Self::Handle);

    /// Release the renderable's GPU resources.
    fn dispose(&mut self, handle: Self::Handle);

    /// Write the animation time uniform.
    fn set_time(&mut self, handle: &Self::Handle, time: f32);
}
