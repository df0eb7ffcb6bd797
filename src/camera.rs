//! Perspective camera and orbit controls
//!
//! Math-only collaborator: supplies the view-projection for rendering and
//! unprojects the smoothed cursor into a world-space ray for the pointer
//! tracker. The orbit controller keeps the eye above the floor plane and
//! inside the fog range, with damped motion toward its drag targets.

use std::f32::consts::PI;

use glam::{Mat4, Vec2, Vec3, Vec4};

use crate::sim::raycast::Ray;
use crate::smooth_factor;

/// Orbit limits (camera never dips below the floor or leaves the fog)
const ORBIT_MIN_DISTANCE: f32 = 0.5;
const ORBIT_MAX_DISTANCE: f32 = 5.0;
const ORBIT_MIN_ELEVATION: f32 = PI / 8.0;
const ORBIT_MAX_ELEVATION: f32 = PI / 2.0 - 0.01;
/// Damping window for orbit motion, seconds
const ORBIT_SMOOTH_DURATION: f32 = 0.25;

/// Perspective camera looking at a fixed target
#[derive(Debug, Clone, Copy)]
pub struct Camera {
    pub eye: Vec3,
    pub target: Vec3,
    /// Vertical field of view, radians
    pub fov_y: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            eye: Vec3::new(1.0, 2.0, -2.0),
            target: Vec3::ZERO,
            fov_y: 70.0_f32.to_radians(),
            aspect: 1.0,
            near: 0.01,
            far: 20.0,
        }
    }
}

impl Camera {
    pub fn new(aspect: f32) -> Self {
        Self {
            aspect,
            ..Default::default()
        }
    }

    pub fn set_viewport(&mut self, width: f32, height: f32) {
        if width > 0.0 && height > 0.0 {
            self.aspect = width / height;
        }
    }

    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.target, Vec3::Y)
    }

    pub fn proj(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, self.aspect, self.near, self.far)
    }

    pub fn view_proj(&self) -> Mat4 {
        self.proj() * self.view()
    }

    /// Unproject a cursor position in normalized device coordinates into a
    /// world-space ray from the near plane toward the far plane. Returns
    /// `None` when the projection is degenerate (zero aspect, collapsed
    /// eye/target), which callers treat as a no-op frame.
    pub fn screen_ray(&self, ndc: Vec2) -> Option<Ray> {
        let view_proj = self.view_proj();
        if !view_proj.is_finite() || view_proj.determinant().abs() < 1e-12 {
            return None;
        }
        let inv = view_proj.inverse();

        // wgpu clip space: near plane at z = 0, far plane at z = 1
        let near_h = inv * Vec4::new(ndc.x, ndc.y, 0.0, 1.0);
        let far_h = inv * Vec4::new(ndc.x, ndc.y, 1.0, 1.0);
        if near_h.w.abs() < 1e-10 || far_h.w.abs() < 1e-10 {
            return None;
        }

        let near_p = near_h.truncate() / near_h.w;
        let far_p = far_h.truncate() / far_h.w;
        let direction = (far_p - near_p).try_normalize()?;

        Some(Ray::new(near_p, direction))
    }
}

/// Damped orbit around the camera's look-at target. Pan is disabled.
#[derive(Debug, Clone, Copy)]
pub struct OrbitController {
    yaw: f32,
    elevation: f32,
    distance: f32,
    target_yaw: f32,
    target_elevation: f32,
    target_distance: f32,
}

impl OrbitController {
    /// Derive the orbit state from the camera's current eye position
    pub fn from_camera(camera: &Camera) -> Self {
        let offset = camera.eye - camera.target;
        let distance = offset.length().clamp(ORBIT_MIN_DISTANCE, ORBIT_MAX_DISTANCE);
        let elevation = (offset.y / offset.length())
            .asin()
            .clamp(ORBIT_MIN_ELEVATION, ORBIT_MAX_ELEVATION);
        let yaw = offset.x.atan2(offset.z);
        Self {
            yaw,
            elevation,
            distance,
            target_yaw: yaw,
            target_elevation: elevation,
            target_distance: distance,
        }
    }

    /// Apply a drag delta (radians)
    pub fn rotate(&mut self, delta_yaw: f32, delta_elevation: f32) {
        self.target_yaw += delta_yaw;
        self.target_elevation = (self.target_elevation + delta_elevation)
            .clamp(ORBIT_MIN_ELEVATION, ORBIT_MAX_ELEVATION);
    }

    /// Apply a zoom delta (world units)
    pub fn zoom(&mut self, delta: f32) {
        self.target_distance =
            (self.target_distance + delta).clamp(ORBIT_MIN_DISTANCE, ORBIT_MAX_DISTANCE);
    }

    /// Damp toward the drag targets and reposition the camera eye
    pub fn update(&mut self, camera: &mut Camera, dt: f32) {
        let k = smooth_factor(dt, ORBIT_SMOOTH_DURATION);
        self.yaw += (self.target_yaw - self.yaw) * k;
        self.elevation += (self.target_elevation - self.elevation) * k;
        self.distance += (self.target_distance - self.distance) * k;

        let (sin_yaw, cos_yaw) = self.yaw.sin_cos();
        let (sin_el, cos_el) = self.elevation.sin_cos();
        camera.eye = camera.target
            + Vec3::new(sin_yaw * cos_el, sin_el, cos_yaw * cos_el) * self.distance;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Shortest distance from a point to the ray's line
    fn ray_distance_to(ray: &Ray, point: Vec3) -> f32 {
        let to_point = point - ray.origin;
        (to_point - ray.direction * to_point.dot(ray.direction)).length()
    }

    #[test]
    fn test_center_ray_passes_through_target() {
        let camera = Camera::new(16.0 / 9.0);
        let ray = camera.screen_ray(Vec2::ZERO).unwrap();
        assert!(ray_distance_to(&ray, camera.target) < 1e-3);
        // Ray points from the eye toward the target
        let to_target = (camera.target - camera.eye).normalize();
        assert!(ray.direction.dot(to_target) > 0.99);
    }

    #[test]
    fn test_degenerate_projection_yields_no_ray() {
        let mut camera = Camera::new(1.0);
        camera.aspect = 0.0;
        assert!(camera.screen_ray(Vec2::ZERO).is_none());

        // Eye collapsed onto the target breaks the view matrix
        let mut camera = Camera::new(1.0);
        camera.eye = camera.target;
        assert!(camera.screen_ray(Vec2::ZERO).is_none());
    }

    #[test]
    fn test_corner_rays_diverge() {
        let camera = Camera::new(1.0);
        let left = camera.screen_ray(Vec2::new(-1.0, 0.0)).unwrap();
        let right = camera.screen_ray(Vec2::new(1.0, 0.0)).unwrap();
        assert!(left.direction.dot(right.direction) < 0.999);
    }

    #[test]
    fn test_orbit_respects_limits() {
        let mut camera = Camera::new(1.0);
        let mut orbit = OrbitController::from_camera(&camera);

        orbit.rotate(0.0, 10.0);
        orbit.zoom(100.0);
        for _ in 0..300 {
            orbit.update(&mut camera, 1.0 / 60.0);
        }

        let offset = camera.eye - camera.target;
        assert!(offset.length() <= ORBIT_MAX_DISTANCE + 1e-3);
        let elevation = (offset.y / offset.length()).asin();
        assert!(elevation <= ORBIT_MAX_ELEVATION + 1e-3);
    }

    #[test]
    fn test_orbit_converges_to_drag_target() {
        let mut camera = Camera::new(1.0);
        let mut orbit = OrbitController::from_camera(&camera);
        let start_eye = camera.eye;

        orbit.rotate(PI / 2.0, 0.0);
        for _ in 0..300 {
            orbit.update(&mut camera, 1.0 / 60.0);
        }

        // Eye moved, but the distance to the target is preserved
        assert!((camera.eye - start_eye).length() > 0.5);
        let d0 = (start_eye - camera.target).length();
        let d1 = (camera.eye - camera.target).length();
        assert!((d0 - d1).abs() < 1e-2);
    }
}
