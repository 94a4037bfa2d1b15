//! Renderer without a window
//!
//! Packs every frame's instances into a byte buffer, the way a GPU backend
//! would before upload, and keeps the last frame for inspection. The target
//! can be detached from outside through a [`SurfaceHandle`], which is how a
//! host tears the drawing surface away underneath a running loop.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use super::backend::{FrameData, InstanceData, RenderBackend, RenderError};

/// Shared view of a headless render target
#[derive(Debug, Clone)]
pub struct SurfaceHandle {
    disposed: Arc<AtomicBool>,
}

impl SurfaceHandle {
    /// Remove the surface; every later draw fails with [`RenderError::TargetDisposed`]
    pub fn detach(&self) {
        self.disposed.store(true, Ordering::Release);
    }

    /// Whether the surface is gone
    pub fn is_detached(&self) -> bool {
        self.disposed.load(Ordering::Acquire)
    }
}

/// Headless rendering backend
#[derive(Debug, Default)]
pub struct HeadlessRenderer {
    disposed: Arc<AtomicBool>,
    frames_presented: u64,
    viewport: (u32, u32),
    instance_buffer: Vec<u8>,
    last_frame: Option<FrameData>,
}

impl HeadlessRenderer {
    /// Create a renderer with an attached surface
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle for detaching the surface from elsewhere
    pub fn surface(&self) -> SurfaceHandle {
        SurfaceHandle {
            disposed: Arc::clone(&self.disposed),
        }
    }

    /// Raw instance bytes of the last frame
    pub fn instance_buffer(&self) -> &[u8] {
        &self.instance_buffer
    }

    /// Instances decoded back from the byte buffer
    pub fn decoded_instances(&self) -> Vec<InstanceData> {
        self.instance_buffer
            .chunks_exact(std::mem::size_of::<InstanceData>())
            .map(bytemuck::pod_read_unaligned)
            .collect()
    }

    /// Last reported viewport size
    pub fn viewport(&self) -> (u32, u32) {
        self.viewport
    }
}

impl RenderBackend for HeadlessRenderer {
    fn draw(&mut self, frame: &FrameData) -> Result<(), RenderError> {
        if self.is_disposed() {
            return Err(RenderError::TargetDisposed);
        }

        self.instance_buffer.clear();
        self.instance_buffer.extend_from_slice(bytemuck::cast_slice(&frame.instances));
        self.last_frame = Some(frame.clone());
        self.frames_presented += 1;

        log::trace!(
            "Frame {}: {} instances, {} labels, {} orbits",
            frame.frame_index,
            frame.instances.len(),
            frame.labels.len(),
            frame.orbits.len()
        );
        Ok(())
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.viewport = (width, height);
    }

    fn dispose(&mut self) {
        if !self.disposed.swap(true, Ordering::AcqRel) {
            log::debug!("Headless surface disposed after {} frame(s)", self.frames_presented);
        }
        self.instance_buffer = Vec::new();
    }

    fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::Acquire)
    }

    fn frames_presented(&self) -> u64 {
        self.frames_presented
    }

    fn last_frame(&self) -> Option<&FrameData> {
        self.last_frame.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Mat4;

    fn frame(instances: Vec<InstanceData>) -> FrameData {
        FrameData {
            frame_index: 7,
            view_projection: Mat4::identity(),
            instances,
            labels: Vec::new(),
            orbits: Vec::new(),
        }
    }

    #[test]
    fn test_instances_survive_byte_packing() {
        let mut renderer = HeadlessRenderer::new();
        let instance = InstanceData {
            position: [1.0, 2.0, 3.0],
            radius: 0.5,
            color: [1.0, 0.0, 0.0, 1.0],
            spin: 0.25,
            padding: [0.0; 3],
        };

        renderer.draw(&frame(vec![instance, instance])).unwrap();
        assert_eq!(renderer.instance_buffer().len(), 96);
        assert_eq!(renderer.decoded_instances(), vec![instance, instance]);
        assert_eq!(renderer.frames_presented(), 1);
        assert_eq!(renderer.last_frame().unwrap().frame_index, 7);
    }

    #[test]
    fn test_draw_after_dispose_fails() {
        let mut renderer = HeadlessRenderer::new();
        renderer.dispose();
        assert!(renderer.is_disposed());
        assert_eq!(renderer.draw(&frame(Vec::new())), Err(RenderError::TargetDisposed));
        assert_eq!(renderer.frames_presented(), 0);
    }

    #[test]
    fn test_surface_detached_externally() {
        let mut renderer = HeadlessRenderer::new();
        let surface = renderer.surface();
        renderer.draw(&frame(Vec::new())).unwrap();

        surface.detach();
        assert!(surface.is_detached());
        assert_eq!(renderer.draw(&frame(Vec::new())), Err(RenderError::TargetDisposed));
    }
}
