//! CPU reference of the vertex and fragment stages.
//!
//! Every function here mirrors a WGSL entry point or helper in
//! `render/shaders/*.wgsl` and operates on `glam` types. Stages are pure:
//! uniforms come in as a read-only [`FrameUniforms`] value, varyings are plain
//! structs produced by the vertex stage and consumed by the fragment stage.
//!
//! Screen-space derivatives are modeled by [`Neighborhood`]: a fragment and
//! its right/below neighbors from the same 2x2 quad. Derivatives are only
//! meaningful when all three samples come from the same primitive, which is
//! the same precondition the GPU imposes.
//!
//! Non-invertible `view`/`projection` matrices are not checked; the resulting
//! NaN/Inf values flow through the arithmetic exactly as they would on the GPU.

mod grid;
mod lighting;
mod neighborhood;
mod uniforms;
mod unproject;

pub use grid::{
    compute_depth, compute_linear_depth, distance_fade, grid_distance, grid_fragment,
    grid_pattern, grid_vertex, intersect_ground, GridFragment, GridStyle, GridVaryings, GroundHit,
};
pub use lighting::{
    diffuse_term, estimate_normal, lit_fragment, lit_vertex, LitUniforms, LitVaryings, NormalMode,
    AMBIENT_FLOOR,
};
pub use neighborhood::{Differentiable, Neighborhood};
pub use uniforms::FrameUniforms;
pub use unproject::{project_point, unproject_point};
