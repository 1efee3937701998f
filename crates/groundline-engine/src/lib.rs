//! Groundline engine crate.
//!
//! Owns the platform + GPU runtime pieces and the two per-draw pipelines:
//! an infinite ground-plane grid and a derivative-lit textured mesh pass.

pub mod device;
pub mod window;
pub mod input;
pub mod time;
pub mod core;

pub mod logging;
pub mod coords;
pub mod camera;
pub mod shading;
pub mod render;
