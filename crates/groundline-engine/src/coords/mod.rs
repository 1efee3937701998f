//! Screen-space coordinate types shared by the runtime and renderers.
//!
//! Framebuffer space:
//! - origin top-left, +X right, +Y down
//! - pixel centers at half-integers
//!
//! NDC follows wgpu: +Y up, depth in `[0, 1]`.

mod color;
mod viewport;

pub use color::ColorRgba;
pub use viewport::Viewport;
