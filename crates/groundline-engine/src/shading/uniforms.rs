use glam::Mat4;

/// Per-draw camera state shared by both pipelines.
///
/// Immutable for the duration of a draw; stages receive it by reference.
/// `view` and `projection` must be invertible.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FrameUniforms {
    pub view: Mat4,
    pub projection: Mat4,
    pub near: f32,
    pub far: f32,
}

impl FrameUniforms {
    #[inline]
    pub const fn new(view: Mat4, projection: Mat4, near: f32, far: f32) -> Self {
        Self {
            view,
            projection,
            near,
            far,
        }
    }

    /// `projection * view`.
    #[inline]
    pub fn view_projection(&self) -> Mat4 {
        self.projection * self.view
    }
}

impl Default for FrameUniforms {
    fn default() -> Self {
        Self::new(Mat4::IDENTITY, Mat4::IDENTITY, 0.1, 100.0)
    }
}
