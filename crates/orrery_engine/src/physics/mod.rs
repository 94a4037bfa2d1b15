//! Geometric queries used by picking

pub mod primitives;

pub use primitives::{Ray, RayHit, BoundingSphere};
