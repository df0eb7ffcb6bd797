//! Interaction core
//!
//! Everything that decides how the field responds to the pointer lives
//! here, with no rendering or platform dependencies:
//! - Batch construction: grid layout and its bounds envelope
//! - Per-frame loop: pointer tracking, hover easing, displacement policy
//! - Single-writer state: the frame tick is the only mutator

pub mod animate;
pub mod bounds;
pub mod displace;
pub mod floor;
pub mod grid;
pub mod pointer;
pub mod raycast;
pub mod tick;

pub use animate::{AnimatedParam, TileResponse, ease_out_cubic};
pub use bounds::BoundsEnvelope;
pub use displace::{falloff, highlight_factor, idle_jitter_y, vertical_offset};
pub use floor::FloorHighlight;
pub use grid::{ConfigError, GridConfig, GridLayout, TileInstance};
pub use pointer::{HoverEdge, PointerState, PointerTracker};
pub use raycast::{Intersectable, IntersectableSet, Plane, Ray};
pub use tick::{FieldState, FrameContext, FrameInput};
