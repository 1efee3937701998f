use core::f32::consts::FRAC_PI_2;

use glam::Vec3;

use super::Camera;

const PITCH_LIMIT: f32 = FRAC_PI_2 - 0.01;

/// Yaw/pitch/distance camera circling a target point.
///
/// Pitch stays away from the poles so the look-at basis never degenerates;
/// distance stays within `[near * 2, far * 0.5]`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct OrbitCamera {
    pub target: Vec3,
    /// Radians around +Y, `0` looks down -Z.
    pub yaw: f32,
    /// Radians above the ground plane.
    pub pitch: f32,
    pub distance: f32,
    pub fov_y: f32,
    pub near: f32,
    pub far: f32,

    /// Radians per pixel of pointer drag.
    pub rotate_speed: f32,
    /// Fractional distance change per wheel line.
    pub zoom_speed: f32,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self {
            target: Vec3::ZERO,
            yaw: 0.6,
            pitch: 0.45,
            distance: 8.0,
            fov_y: 45f32.to_radians(),
            near: 0.01,
            far: 100.0,
            rotate_speed: 0.005,
            zoom_speed: 0.1,
        }
    }
}

impl OrbitCamera {
    /// Rotates by a pointer drag given in pixels.
    pub fn orbit(&mut self, dx: f32, dy: f32) {
        self.yaw -= dx * self.rotate_speed;
        self.pitch = (self.pitch + dy * self.rotate_speed).clamp(-PITCH_LIMIT, PITCH_LIMIT);
    }

    /// Moves towards (positive `lines`) or away from the target.
    pub fn dolly(&mut self, lines: f32) {
        let scaled = self.distance * (1.0 - self.zoom_speed).powf(lines);
        self.distance = scaled.clamp(self.near * 2.0, self.far * 0.5);
    }

    pub fn eye(&self) -> Vec3 {
        let (sy, cy) = self.yaw.sin_cos();
        let (sp, cp) = self.pitch.sin_cos();
        self.target + Vec3::new(sy * cp, sp, cy * cp) * self.distance
    }

    pub fn camera(&self) -> Camera {
        Camera {
            eye: self.eye(),
            target: self.target,
            up: Vec3::Y,
            fov_y: self.fov_y,
            near: self.near,
            far: self.far,
        }
    }
}
