//! GPU rendering subsystem.
//!
//! Each renderer owns its GPU resources (pipelines, buffers, bind groups) and
//! creates them lazily on first use or when the surface format changes.
//!
//! Convention:
//! - all passes load the color and depth attachments cleared by the frame
//! - opaque geometry first, then the grid (it blends and depth-tests against it)
//! - shaders mirror the CPU stages in `crate::shading`

mod common;
mod ctx;
mod grid;
mod lit;
mod mesh;
mod texture;

pub use ctx::{RenderCtx, RenderTarget};
pub use grid::GridRenderer;
pub use lit::LitRenderer;
pub use mesh::{Mesh, MeshVertex};
pub use texture::TextureImage;

/// WGSL source of the grid pipeline.
pub const GRID_SHADER: &str = include_str!("shaders/grid.wgsl");

/// WGSL source of the lighting pipeline.
pub const LIT_SHADER: &str = include_str!("shaders/lit.wgsl");
