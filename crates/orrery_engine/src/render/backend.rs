//! Backend abstraction for the rendering system
//!
//! Each tick the engine flattens the scene into a [`FrameData`] and hands it
//! to a [`RenderBackend`]. Backends never see the scene graph itself.

use bytemuck::{Pod, Zeroable};

use crate::core::config::ViewConfig;
use crate::foundation::math::{Mat4, Vec3, constants::TAU};
use crate::render::Camera;
use crate::render::color::Color;
use crate::scene::SceneGraph;
use crate::systems::LabelSystem;

/// Rendering failures
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    /// The render target was disposed; drawing can never succeed again
    #[error("render target has been disposed")]
    TargetDisposed,

    /// Backend-specific failure
    #[error("render backend error: {0}")]
    Backend(String),
}

/// Per-sphere instance data, laid out for direct upload
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct InstanceData {
    /// World position of the centre
    pub position: [f32; 3],
    /// Sphere radius
    pub radius: f32,
    /// Linear RGBA colour
    pub color: [f32; 4],
    /// Axial rotation in radians
    pub spin: f32,
    /// Keeps the struct a multiple of 16 bytes
    pub padding: [f32; 3],
}

/// A label to draw this frame
#[derive(Debug, Clone, PartialEq)]
pub struct LabelInstance {
    /// Text
    pub text: String,
    /// Anchor in world space
    pub position: Vec3,
    /// Glyph height
    pub size: f32,
    /// Measured width
    pub width: f32,
    /// Text colour
    pub color: Color,
}

/// A closed orbit ring
#[derive(Debug, Clone, PartialEq)]
pub struct OrbitPath {
    /// Orbit centre in world space
    pub center: Vec3,
    /// Ring radius
    pub radius: f32,
    /// Plane normal
    pub normal: Vec3,
    /// Ring vertices; the last connects back to the first
    pub points: Vec<Vec3>,
    /// Line colour
    pub color: Color,
}

impl OrbitPath {
    /// Ring of `segments` points around `center` in the XZ plane
    pub fn ring(center: Vec3, radius: f32, segments: u32) -> Self {
        let segments = segments.max(3);
        let points = (0..segments)
            .map(|i| {
                let angle = TAU * i as f32 / segments as f32;
                center + Vec3::new(radius * angle.cos(), 0.0, radius * angle.sin())
            })
            .collect();
        Self {
            center,
            radius,
            normal: Vec3::y(),
            points,
            color: Color::TRAJECTORY,
        }
    }
}

/// Everything a backend needs to draw one frame
#[derive(Debug, Clone, PartialEq)]
pub struct FrameData {
    /// Frame counter
    pub frame_index: u64,
    /// Camera view-projection
    pub view_projection: Mat4,
    /// One instance per sphere, static bodies included
    pub instances: Vec<InstanceData>,
    /// Labels to draw; empty when labels are hidden
    pub labels: Vec<LabelInstance>,
    /// Orbit rings; empty when trajectories are hidden
    pub orbits: Vec<OrbitPath>,
}

impl FrameData {
    /// Flatten the scene as seen through `camera`
    pub fn build(
        scene: &SceneGraph,
        camera: &Camera,
        labels: &LabelSystem,
        view: &ViewConfig,
        orbit_segments: u32,
        frame_index: u64,
    ) -> Self {
        let instances = scene
            .visuals()
            .map(|(_, visual)| InstanceData {
                position: visual.position.into(),
                radius: visual.radius,
                color: visual.color.to_rgba(),
                spin: visual.spin,
                padding: [0.0; 3],
            })
            .collect();

        let labels = labels
            .visible_labels(scene)
            .into_iter()
            .map(|label| LabelInstance {
                text: label.text.clone(),
                position: label.world_position,
                size: label.size,
                width: label.width,
                color: label.color,
            })
            .collect();

        let orbits = if view.show_trajectories {
            scene
                .entities()
                .map(|(_, entity)| OrbitPath::ring(entity.orbit_center(), entity.orbit().radius(), orbit_segments))
                .collect()
        } else {
            Vec::new()
        };

        Self {
            frame_index,
            view_projection: camera.get_view_projection_matrix(),
            instances,
            labels,
            orbits,
        }
    }
}

/// Something that can present frames
pub trait RenderBackend {
    /// Draw one frame
    ///
    /// Must return [`RenderError::TargetDisposed`] once the target is gone.
    fn draw(&mut self, frame: &FrameData) -> Result<(), RenderError>;

    /// Viewport size changed
    fn resize(&mut self, width: u32, height: u32) {
        let _ = (width, height);
    }

    /// Release the render target; later draws fail
    fn dispose(&mut self);

    /// Whether [`dispose`](Self::dispose) has happened
    fn is_disposed(&self) -> bool;

    /// Frames successfully presented so far
    fn frames_presented(&self) -> u64;

    /// The most recently presented frame, if the backend keeps it
    fn last_frame(&self) -> Option<&FrameData> {
        None
    }
}
