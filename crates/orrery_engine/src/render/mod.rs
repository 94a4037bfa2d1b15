//! Rendering surface
//!
//! The camera, colours, label fonts, and the backend boundary. The engine
//! flattens the scene into [`FrameData`] once per tick; a [`RenderBackend`]
//! presents it. [`HeadlessRenderer`] is the backend shipped with the crate.

pub mod camera;
pub mod color;
pub mod backend;
pub mod headless;
pub mod text;

pub use camera::Camera;
pub use color::Color;
pub use backend::{RenderBackend, RenderError, FrameData, InstanceData, LabelInstance, OrbitPath};
pub use headless::{HeadlessRenderer, SurfaceHandle};
