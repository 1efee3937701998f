//! Camera state producing the per-draw [`FrameUniforms`].
//!
//! Projections use the wgpu depth range (`[0, 1]`, right-handed), which is
//! what the grid's depth reconstruction assumes.

mod orbit;

use glam::{Mat4, Vec3};

use crate::coords::Viewport;
use crate::shading::FrameUniforms;

pub use orbit::OrbitCamera;

/// Look-at perspective camera.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Camera {
    pub eye: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    /// Vertical field of view in radians.
    pub fov_y: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            eye: Vec3::new(0.0, 2.0, 6.0),
            target: Vec3::ZERO,
            up: Vec3::Y,
            fov_y: 45f32.to_radians(),
            near: 0.01,
            far: 100.0,
        }
    }
}

impl Camera {
    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.target, self.up)
    }

    pub fn projection(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, aspect, self.near, self.far)
    }

    pub fn uniforms(&self, viewport: Viewport) -> FrameUniforms {
        FrameUniforms::new(
            self.view(),
            self.projection(viewport.aspect()),
            self.near,
            self.far,
        )
    }
}
