//! Perspective camera and orbit controls.

use std::f32::consts::{PI, TAU};

use glam::{Mat4, Vec3};

/// Perspective camera looking at a target point.
#[derive(Debug, Clone)]
pub struct PerspectiveCamera {
    /// Vertical field of view in degrees.
    pub fov: f32,
    /// Aspect ratio (width / height).
    pub aspect: f32,
    /// Near clipping plane.
    pub near: f32,
    /// Far clipping plane.
    pub far: f32,
    /// Camera position.
    pub position: Vec3,
    /// Up vector.
    pub up: Vec3,
    target: Vec3,
}

impl PerspectiveCamera {
    pub fn new(fov: f32, aspect: f32, near: f32, far: f32) -> Self {
        Self {
            fov,
            aspect,
            near,
            far,
            position: Vec3::ZERO,
            up: Vec3::Y,
            target: Vec3::NEG_Z,
        }
    }

    /// Point the camera at `target`.
    pub fn look_at(&mut self, target: Vec3) {
        self.target = target;
    }

    /// Point the camera is looking at.
    pub fn target(&self) -> Vec3 {
        self.target
    }

    /// Calculate the view matrix for rendering.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, self.up)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov.to_radians(), self.aspect, self.near, self.far)
    }
}

// Keeps the polar angle off the poles where look_at degenerates.
const POLAR_EPSILON: f32 = 1e-6;

/// Mouse-driven orbit around a target point.
///
/// Input accumulates into pending rotation and zoom. [`OrbitControls::update`]
/// applies them to the camera once per frame. With damping enabled only a
/// fraction of the pending rotation is applied each frame and the rest decays,
/// so the view keeps gliding after the mouse stops.
#[derive(Debug, Clone)]
pub struct OrbitControls {
    /// Point the camera orbits around.
    pub target: Vec3,
    pub enable_damping: bool,
    /// Fraction of pending rotation applied per frame when damping.
    pub damping_factor: f32,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    delta_theta: f32,
    delta_phi: f32,
    scale: f32,
}

impl OrbitControls {
    pub fn new(target: Vec3) -> Self {
        Self {
            target,
            enable_damping: false,
            damping_factor: 0.05,
            rotate_speed: 1.0,
            zoom_speed: 1.0,
            min_distance: 0.0,
            max_distance: f32::INFINITY,
            delta_theta: 0.0,
            delta_phi: 0.0,
            scale: 1.0,
        }
    }

    /// Queue a rotation from a mouse drag of `(dx, dy)` pixels.
    ///
    /// Dragging the full viewport height turns the camera one full circle.
    pub fn rotate(&mut self, dx: f32, dy: f32, viewport_height: f32) {
        let h = viewport_height.max(1.0);
        self.delta_theta -= TAU * dx / h * self.rotate_speed;
        self.delta_phi -= TAU * dy / h * self.rotate_speed;
    }

    /// Queue a zoom from `scroll` wheel lines. Positive scroll moves closer.
    pub fn zoom(&mut self, scroll: f32) {
        self.scale *= 0.95_f32.powf(scroll * self.zoom_speed);
    }

    /// Whether rotation is still pending.
    pub fn is_moving(&self) -> bool {
        self.delta_theta.abs() > f32::EPSILON || self.delta_phi.abs() > f32::EPSILON
    }

    /// Apply pending input to the camera and aim it at the target.
    pub fn update(&mut self, camera: &mut PerspectiveCamera) {
        let offset = camera.position - self.target;
        let mut radius = offset.length();
        let (mut theta, mut phi) = if radius > 0.0 {
            (
                offset.x.atan2(offset.z),
                (offset.y / radius).clamp(-1.0, 1.0).acos(),
            )
        } else {
            (0.0, PI / 2.0)
        };

        if self.enable_damping {
            theta += self.delta_theta * self.damping_factor;
            phi += self.delta_phi * self.damping_factor;
        } else {
            theta += self.delta_theta;
            phi += self.delta_phi;
        }
        phi = phi.clamp(POLAR_EPSILON, PI - POLAR_EPSILON);

        radius = (radius * self.scale).clamp(self.min_distance, self.max_distance);

        camera.position = self.target
            + Vec3::new(
                radius * phi.sin() * theta.sin(),
                radius * phi.cos(),
                radius * phi.sin() * theta.cos(),
            );
        camera.look_at(self.target);

        if self.enable_damping {
            self.delta_theta *= 1.0 - self.damping_factor;
            self.delta_phi *= 1.0 - self.damping_factor;
        } else {
            self.delta_theta = 0.0;
            self.delta_phi = 0.0;
        }
        self.scale = 1.0;
    }
}

impl Default for OrbitControls {
    fn default() -> Self {
        Self::new(Vec3::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera_at(position: Vec3) -> PerspectiveCamera {
        let mut camera = PerspectiveCamera::new(75.0, 1.0, 0.1, 100.0);
        camera.position = position;
        camera
    }

    #[test]
    fn test_update_without_input_keeps_position() {
        let mut camera = camera_at(Vec3::new(1.0, 1.0, 100.0));
        let mut controls = OrbitControls::default();
        controls.update(&mut camera);

        assert!((camera.position - Vec3::new(1.0, 1.0, 100.0)).length() < 1e-3);
        assert_eq!(camera.target(), Vec3::ZERO);
    }

    #[test]
    fn test_rotate_keeps_distance() {
        let mut camera = camera_at(Vec3::new(0.0, 0.0, 10.0));
        let mut controls = OrbitControls::default();
        controls.rotate(100.0, 0.0, 400.0);
        controls.update(&mut camera);

        assert!((camera.position.length() - 10.0).abs() < 1e-4);
        // Dragging right swings the camera towards -x
        assert!(camera.position.x < 0.0);
        assert!(!controls.is_moving());
    }

    #[test]
    fn test_damping_glides() {
        let mut camera = camera_at(Vec3::new(0.0, 0.0, 10.0));
        let mut controls = OrbitControls::default();
        controls.enable_damping = true;
        controls.rotate(100.0, 0.0, 400.0);

        controls.update(&mut camera);
        let first = camera.position;
        assert!(controls.is_moving());

        controls.update(&mut camera);
        assert_ne!(camera.position, first);
    }

    #[test]
    fn test_zoom_in() {
        let mut camera = camera_at(Vec3::new(0.0, 0.0, 10.0));
        let mut controls = OrbitControls::default();
        controls.zoom(1.0);
        controls.update(&mut camera);
        assert!((camera.position.length() - 9.5).abs() < 1e-4);

        // Scale is consumed by the update
        controls.update(&mut camera);
        assert!((camera.position.length() - 9.5).abs() < 1e-4);
    }

    #[test]
    fn test_zoom_respects_limits() {
        let mut camera = camera_at(Vec3::new(0.0, 0.0, 10.0));
        let mut controls = OrbitControls::default();
        controls.min_distance = 9.9;
        controls.zoom(10.0);
        controls.update(&mut camera);
        assert!((camera.position.length() - 9.9).abs() < 1e-4);
    }

    #[test]
    fn test_projection_uses_aspect() {
        let mut camera = PerspectiveCamera::new(75.0, 800.0 / 600.0, 0.1, 100.0);
        let a = camera.projection_matrix();
        camera.aspect = 1024.0 / 768.0;
        assert_eq!(a, camera.projection_matrix());
        camera.aspect = 2.0;
        assert_ne!(a, camera.projection_matrix());
    }
}
