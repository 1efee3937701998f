use glam::Vec2;

/// Drawable size in physical pixels.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    #[inline]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    #[inline]
    pub fn is_valid(self) -> bool {
        self.width > 0.0 && self.height > 0.0 && self.width.is_finite() && self.height.is_finite()
    }

    /// Width over height; `1.0` for a degenerate viewport.
    #[inline]
    pub fn aspect(self) -> f32 {
        if self.is_valid() { self.width / self.height } else { 1.0 }
    }

    /// Maps a framebuffer coordinate to NDC `xy`.
    ///
    /// `(0, 0)` is the top-left corner, `(width, height)` the bottom-right.
    #[inline]
    pub fn pixel_to_ndc(self, px: f32, py: f32) -> Vec2 {
        Vec2::new(px / self.width * 2.0 - 1.0, 1.0 - py / self.height * 2.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corners_and_center_map_to_ndc() {
        let vp = Viewport::new(640.0, 480.0);
        assert_eq!(vp.pixel_to_ndc(0.0, 0.0), Vec2::new(-1.0, 1.0));
        assert_eq!(vp.pixel_to_ndc(640.0, 480.0), Vec2::new(1.0, -1.0));
        assert_eq!(vp.pixel_to_ndc(320.0, 240.0), Vec2::ZERO);
    }

    #[test]
    fn aspect_falls_back_for_zero_size() {
        assert_eq!(Viewport::new(0.0, 100.0).aspect(), 1.0);
        assert_eq!(Viewport::new(200.0, 100.0).aspect(), 2.0);
    }
}
