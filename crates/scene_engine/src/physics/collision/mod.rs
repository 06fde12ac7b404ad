//! Collision geometry
//!
//! # Module Organization
//!
//! - [`primitives`] - Rectangles and circles with their intersection tests
//! - [`shape`] - World-space shape enum with pairwise dispatch

pub mod primitives;
pub mod shape;

pub use primitives::{Circle, Rect};
pub use shape::WorldShape;
