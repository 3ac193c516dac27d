//! Orbit camera around the galaxy center: drag to rotate, wheel to zoom,
//! no panning. Rotation input is smoothed by exponential damping.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};

/// Keeps the camera from flipping over the poles.
const MAX_PITCH: f32 = std::f32::consts::FRAC_PI_2 - 0.01;

/// Camera matrices plus the viewport size, which the point shader needs to
/// convert pixel sizes into clip-space offsets.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct CameraUniform {
    pub view: [[f32; 4]; 4],
    pub proj: [[f32; 4]; 4],
    /// `xy` = surface size in physical pixels, `zw` unused.
    pub viewport: [f32; 4],
}

#[derive(Debug, Clone)]
pub struct OrbitCamera {
    pub target: Vec3,
    /// Azimuth around +Y in radians; zero looks down -Z from +Z.
    yaw: f32,
    /// Elevation above the XZ plane in radians.
    pitch: f32,
    distance: f32,
    /// Vertical field of view in radians.
    pub fov_y: f32,
    pub aspect_ratio: f32,
    pub near: f32,
    pub far: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    /// Radians per pixel of drag.
    pub rotate_speed: f32,
    /// Fractional distance change per wheel line.
    pub zoom_speed: f32,
    /// Fraction of pending rotation applied (and removed) per update.
    /// Zero applies rotation immediately.
    pub damping: f32,
    yaw_velocity: f32,
    pitch_velocity: f32,
}

impl OrbitCamera {
    /// Build a camera at `eye` looking at the origin.
    pub fn looking_at_origin(eye: Vec3, fov_y: f32, aspect_ratio: f32) -> Self {
        let distance = eye.length().max(f32::EPSILON);
        Self {
            target: Vec3::ZERO,
            yaw: eye.x.atan2(eye.z),
            pitch: (eye.y / distance).clamp(-1.0, 1.0).asin(),
            distance,
            fov_y,
            aspect_ratio,
            near: 0.1,
            far: 1000.0,
            min_distance: 0.5,
            max_distance: 100.0,
            rotate_speed: 0.005,
            zoom_speed: 0.1,
            damping: 0.05,
            yaw_velocity: 0.0,
            pitch_velocity: 0.0,
        }
    }

    pub fn eye(&self) -> Vec3 {
        let (sin_pitch, cos_pitch) = self.pitch.sin_cos();
        let (sin_yaw, cos_yaw) = self.yaw.sin_cos();
        self.target + self.distance * Vec3::new(cos_pitch * sin_yaw, sin_pitch, cos_pitch * cos_yaw)
    }

    pub fn distance(&self) -> f32 {
        self.distance
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    /// Queue an orbit from a mouse drag of `(dx, dy)` pixels.
    pub fn rotate(&mut self, dx: f32, dy: f32) {
        self.yaw_velocity -= dx * self.rotate_speed;
        self.pitch_velocity += dy * self.rotate_speed;
    }

    /// Zoom by wheel `lines`; positive moves closer.
    pub fn zoom(&mut self, lines: f32) {
        let factor = (1.0 - self.zoom_speed).powf(lines);
        self.distance = (self.distance * factor).clamp(self.min_distance, self.max_distance);
    }

    /// Advance damping by one frame.
    pub fn update(&mut self) {
        let applied = if self.damping > 0.0 {
            self.damping.min(1.0)
        } else {
            1.0
        };
        self.yaw += self.yaw_velocity * applied;
        self.pitch = (self.pitch + self.pitch_velocity * applied).clamp(-MAX_PITCH, MAX_PITCH);
        self.yaw_velocity *= 1.0 - applied;
        self.pitch_velocity *= 1.0 - applied;
    }

    pub fn set_aspect_ratio(&mut self, width: f32, height: f32) {
        self.aspect_ratio = width / height.max(1.0);
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye(), self.target, Vec3::Y)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, self.aspect_ratio, self.near, self.far)
    }

    pub fn to_uniform(&self, viewport_width: u32, viewport_height: u32) -> CameraUniform {
        CameraUniform {
            view: self.view_matrix().to_cols_array_2d(),
            proj: self.projection_matrix().to_cols_array_2d(),
            viewport: [viewport_width as f32, viewport_height as f32, 0.0, 0.0],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_4;

    fn camera() -> OrbitCamera {
        OrbitCamera::looking_at_origin(Vec3::new(0.0, 1.0, 4.0), FRAC_PI_4, 16.0 / 9.0)
    }

    #[test]
    fn test_eye_reconstructs_initial_position() {
        let cam = camera();
        assert!((cam.eye() - Vec3::new(0.0, 1.0, 4.0)).length() < 1e-5);
        assert!((cam.distance() - 17.0f32.sqrt()).abs() < 1e-5);
    }

    #[test]
    fn test_view_looks_at_origin() {
        let cam = camera();
        let origin_view = cam.view_matrix().transform_point3(Vec3::ZERO);
        // Origin is straight ahead (-Z in view space) at the orbit distance.
        assert!(origin_view.x.abs() < 1e-5);
        assert!(origin_view.y.abs() < 1e-5);
        assert!((origin_view.z + cam.distance()).abs() < 1e-4);
    }

    #[test]
    fn test_damped_rotation_converges_to_full_input() {
        let mut cam = camera();
        cam.damping = 0.1;
        let start = cam.yaw();
        cam.rotate(100.0, 0.0);
        cam.update();
        let after_one = cam.yaw();
        assert!((after_one - start).abs() < 0.5 * 100.0 * cam.rotate_speed);
        for _ in 0..500 {
            cam.update();
        }
        assert!(cam.yaw_velocity.abs() < 1e-6 && cam.pitch_velocity.abs() < 1e-6);
        assert!((cam.yaw() - (start - 100.0 * cam.rotate_speed)).abs() < 1e-3);
    }

    #[test]
    fn test_undamped_rotation_is_immediate() {
        let mut cam = camera();
        cam.damping = 0.0;
        cam.rotate(0.0, 10.0);
        let pitch = cam.pitch();
        cam.update();
        assert!((cam.pitch() - (pitch + 10.0 * cam.rotate_speed)).abs() < 1e-6);
        assert!(cam.yaw_velocity.abs() < 1e-6 && cam.pitch_velocity.abs() < 1e-6);
    }

    #[test]
    fn test_pitch_is_clamped_short_of_poles() {
        let mut cam = camera();
        cam.damping = 0.0;
        cam.rotate(0.0, 1e6);
        cam.update();
        assert!(cam.pitch() <= MAX_PITCH);
        cam.rotate(0.0, -1e7);
        cam.update();
        assert!(cam.pitch() >= -MAX_PITCH);
        assert!(cam.view_matrix().is_finite());
    }

    #[test]
    fn test_zoom_moves_closer_and_clamps() {
        let mut cam = camera();
        let d = cam.distance();
        cam.zoom(1.0);
        assert!(cam.distance() < d);
        cam.zoom(-1000.0);
        assert_eq!(cam.distance(), cam.max_distance);
        cam.zoom(1000.0);
        assert_eq!(cam.distance(), cam.min_distance);
    }

    #[test]
    fn test_target_stays_fixed() {
        let mut cam = camera();
        cam.rotate(300.0, -200.0);
        cam.zoom(3.0);
        for _ in 0..100 {
            cam.update();
        }
        assert_eq!(cam.target, Vec3::ZERO);
    }

    #[test]
    fn test_aspect_ratio_update() {
        let mut cam = camera();
        cam.set_aspect_ratio(1000.0, 500.0);
        assert!((cam.aspect_ratio - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_uniform_layout() {
        assert_eq!(std::mem::size_of::<CameraUniform>(), 144);
        let u = camera().to_uniform(1280, 720);
        assert_eq!(u.viewport[0], 1280.0);
        assert_eq!(u.viewport[1], 720.0);
    }
}
