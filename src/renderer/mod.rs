//! WebGPU rendering module
//!
//! Thin consumer of the per-frame context: the floor quad and the instanced
//! tile field, with the displacement policy mirrored in the tile shader.

pub mod pipeline;
pub mod shapes;
pub mod vertex;

pub use pipeline::RenderState;
