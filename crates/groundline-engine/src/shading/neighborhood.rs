use core::ops::{Add, Sub};

use glam::{Vec2, Vec3};

/// Values a fragment-stage helper can differentiate.
pub trait Differentiable: Copy + Add<Output = Self> + Sub<Output = Self> {
    fn abs(self) -> Self;
}

impl Differentiable for f32 {
    #[inline]
    fn abs(self) -> Self {
        f32::abs(self)
    }
}

impl Differentiable for Vec2 {
    #[inline]
    fn abs(self) -> Self {
        Vec2::abs(self)
    }
}

impl Differentiable for Vec3 {
    #[inline]
    fn abs(self) -> Self {
        Vec3::abs(self)
    }
}

/// A fragment plus its horizontal and vertical neighbors in the same 2x2 quad.
///
/// Pixel coordinates follow the framebuffer convention: `right` is one pixel
/// towards +X, `below` one pixel towards +Y (down the screen).
///
/// Derivatives are coarse forward differences, matching `dpdx`/`dpdy`/`fwidth`
/// on the GPU up to the choice of quad anchor.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Neighborhood<T> {
    pub origin: T,
    pub right: T,
    pub below: T,
}

impl<T> Neighborhood<T> {
    #[inline]
    pub const fn new(origin: T, right: T, below: T) -> Self {
        Self { origin, right, below }
    }

    /// Evaluates `f` at pixel `(px, py)` and its right/below neighbors.
    pub fn sample<F>(px: f32, py: f32, mut f: F) -> Self
    where
        F: FnMut(f32, f32) -> T,
    {
        Self {
            origin: f(px, py),
            right: f(px + 1.0, py),
            below: f(px, py + 1.0),
        }
    }

    /// Applies a per-fragment function to all three samples.
    ///
    /// Used to differentiate quantities derived from varyings rather than the
    /// varyings themselves.
    pub fn map<U, F>(&self, mut f: F) -> Neighborhood<U>
    where
        F: FnMut(&T) -> U,
    {
        Neighborhood {
            origin: f(&self.origin),
            right: f(&self.right),
            below: f(&self.below),
        }
    }
}

impl<T: Copy> Neighborhood<T> {
    /// A neighborhood whose derivatives are all zero.
    #[inline]
    pub fn constant(value: T) -> Self {
        Self::new(value, value, value)
    }
}

impl<T: Differentiable> Neighborhood<T> {
    #[inline]
    pub fn dpdx(&self) -> T {
        self.right - self.origin
    }

    #[inline]
    pub fn dpdy(&self) -> T {
        self.below - self.origin
    }

    /// `abs(dpdx) + abs(dpdy)`.
    #[inline]
    pub fn fwidth(&self) -> T {
        self.dpdx().abs() + self.dpdy().abs()
    }
}
