//! Scene management
//!
//! The scene graph arena, the node types it owns, and bulk population from
//! feed descriptors.

pub mod entity;
pub mod scene_graph;
pub mod population;

pub use entity::{OrbitParams, OrbitingEntity, Visual, Label, StaticBody};
pub use scene_graph::{SceneGraph, EntityHandle, VisualHandle, LabelHandle};
pub use population::populate;
