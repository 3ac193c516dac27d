//! Window surface bookkeeping: physical size, scale factor, and the pixel
//! ratio used to scale point sprites.
//!
//! Wayland may report zero-size windows before the compositor assigns a
//! size; dimensions are clamped to 1x1 so wgpu never sees a zero extent.

/// Minimum surface dimension (prevents zero-size panics).
pub const MIN_SURFACE_DIMENSION: u32 = 1;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PhysicalSize {
    pub width: u32,
    pub height: u32,
}

/// Produced when the surface dimensions or scale factor change.
#[derive(Clone, Copy, Debug)]
pub struct SurfaceResizeEvent {
    pub physical: PhysicalSize,
    pub scale_factor: f64,
}

/// Clamp a window scale factor to `max`. Point sizes are authored in logical
/// pixels and multiplied by this ratio.
pub fn pixel_ratio(scale_factor: f64, max: f32) -> f32 {
    (scale_factor as f32).min(max).max(f32::EPSILON)
}

/// Tracks the physical size and scale factor of the window surface.
pub struct SurfaceWrapper {
    physical_width: u32,
    physical_height: u32,
    scale_factor: f64,
}

impl SurfaceWrapper {
    pub fn new(physical_width: u32, physical_height: u32, scale_factor: f64) -> Self {
        Self {
            physical_width: physical_width.max(MIN_SURFACE_DIMENSION),
            physical_height: physical_height.max(MIN_SURFACE_DIMENSION),
            scale_factor,
        }
    }

    /// Handle a window resize. Returns an event only if the clamped
    /// dimensions actually changed.
    pub fn handle_resize(
        &mut self,
        physical_width: u32,
        physical_height: u32,
    ) -> Option<SurfaceResizeEvent> {
        let width = physical_width.max(MIN_SURFACE_DIMENSION);
        let height = physical_height.max(MIN_SURFACE_DIMENSION);

        if width == self.physical_width && height == self.physical_height {
            return None;
        }

        self.physical_width = width;
        self.physical_height = height;

        Some(SurfaceResizeEvent {
            physical: PhysicalSize { width, height },
            scale_factor: self.scale_factor,
        })
    }

    /// Handle a scale factor change (window moved to another display, or the
    /// user changed display scaling). Always returns an event, since the
    /// pixel ratio changes even when the physical size does not.
    pub fn handle_scale_factor_changed(
        &mut self,
        new_scale_factor: f64,
        new_physical_width: u32,
        new_physical_height: u32,
    ) -> SurfaceResizeEvent {
        self.scale_factor = new_scale_factor;
        self.handle_resize(new_physical_width, new_physical_height)
            .unwrap_or(SurfaceResizeEvent {
                physical: self.physical_size(),
                scale_factor: new_scale_factor,
            })
    }

    pub fn physical_size(&self) -> PhysicalSize {
        PhysicalSize {
            width: self.physical_width,
            height: self.physical_height,
        }
    }

    pub fn scale_factor(&self) -> f64 {
        self.scale_factor
    }
}
