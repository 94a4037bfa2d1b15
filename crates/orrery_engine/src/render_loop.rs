//! Cooperative render loop
//!
//! The loop never blocks or spins. Each frame callback does its work and
//! then asks the [`FrameScheduler`] for the next frame, so at most one frame
//! request is ever outstanding. Cancelling that request is all it takes to
//! stop the loop; a callback that still arrives for an older request is
//! recognised as stale and ignored.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use crate::core::config::ViewConfig;
use crate::render::{Camera, FrameData, RenderBackend, RenderError};
use crate::scene::SceneGraph;
use crate::systems::{orbit_system, sync_labels, LabelSystem};

/// Identifies one frame request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FrameHandle(u64);

impl FrameHandle {
    /// Raw request number
    pub fn id(self) -> u64 {
        self.0
    }
}

/// The display refresh signal
pub trait FrameScheduler {
    /// Ask for a callback on the next refresh
    fn request_frame(&mut self) -> FrameHandle;

    /// Withdraw a request; unknown or already-delivered handles are ignored
    fn cancel_frame(&mut self, handle: FrameHandle);

    /// Requests not yet delivered
    fn pending_count(&self) -> usize;
}

/// Single-threaded stand-in for a vsync callback queue
#[derive(Debug, Default)]
pub struct VsyncClock {
    next_id: u64,
    pending: VecDeque<FrameHandle>,
    interval: Option<Duration>,
    last_frame: Option<Instant>,
}

impl VsyncClock {
    /// A clock that delivers frames as fast as they are requested
    pub fn new() -> Self {
        Self::default()
    }

    /// A clock paced to `hz` refreshes per second
    pub fn with_refresh_rate(hz: u32) -> Self {
        Self {
            interval: Some(Duration::from_secs(1) / hz.max(1)),
            ..Self::default()
        }
    }

    /// Deliver the oldest pending request, waiting for the next refresh if paced
    pub fn next_frame(&mut self) -> Option<FrameHandle> {
        let handle = self.pending.pop_front()?;

        if let Some(interval) = self.interval {
            if let Some(last) = self.last_frame {
                let due = last + interval;
                let now = Instant::now();
                if due > now {
                    std::thread::sleep(due - now);
                }
            }
            self.last_frame = Some(Instant::now());
        }
        Some(handle)
    }
}

impl FrameScheduler for VsyncClock {
    fn request_frame(&mut self) -> FrameHandle {
        self.next_id += 1;
        let handle = FrameHandle(self.next_id);
        self.pending.push_back(handle);
        handle
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        self.pending.retain(|&pending| pending != handle);
    }

    fn pending_count(&self) -> usize {
        self.pending.len()
    }
}

/// What one frame works on
pub struct FrameContext<'a> {
    /// Scene to advance and draw
    pub scene: &'a mut SceneGraph,
    /// Active camera
    pub camera: &'a Camera,
    /// Label visibility
    pub labels: &'a LabelSystem,
    /// View toggles for this frame
    pub view: ViewConfig,
    /// Segments per orbit ring
    pub orbit_segments: u32,
    /// Where to draw
    pub backend: &'a mut dyn RenderBackend,
}

/// Self-rescheduling frame driver
#[derive(Debug, Default)]
pub struct RenderLoop {
    pending: Option<FrameHandle>,
    frame_index: u64,
}

impl RenderLoop {
    /// Create a stopped loop
    pub fn new() -> Self {
        Self::default()
    }

    /// Request the first frame; does nothing if a request is already out
    pub fn start(&mut self, scheduler: &mut dyn FrameScheduler) {
        if self.pending.is_none() {
            self.pending = Some(scheduler.request_frame());
            log::debug!("Render loop started");
        }
    }

    /// Run one frame for `handle`
    ///
    /// Kinematics run before labels are synced and both before the draw.
    /// Returns `Ok(false)` for a stale handle. A draw failure stops the loop
    /// without rescheduling.
    pub fn on_frame(
        &mut self,
        handle: FrameHandle,
        scheduler: &mut dyn FrameScheduler,
        ctx: FrameContext<'_>,
    ) -> Result<bool, RenderError> {
        if self.pending != Some(handle) {
            log::trace!("Ignoring stale frame {}", handle.id());
            return Ok(false);
        }
        self.pending = None;
        self.frame_index += 1;

        orbit_system::step(ctx.scene, ctx.view.speed);
        sync_labels(ctx.scene);

        let frame = FrameData::build(
            ctx.scene,
            ctx.camera,
            ctx.labels,
            &ctx.view,
            ctx.orbit_segments,
            self.frame_index,
        );
        if let Err(e) = ctx.backend.draw(&frame) {
            log::error!("Render loop stopped at frame {}: {e}", self.frame_index);
            return Err(e);
        }

        self.pending = Some(scheduler.request_frame());
        Ok(true)
    }

    /// Withdraw the outstanding request
    pub fn cancel(&mut self, scheduler: &mut dyn FrameScheduler) {
        if let Some(handle) = self.pending.take() {
            scheduler.cancel_frame(handle);
            log::debug!("Render loop cancelled after {} frame(s)", self.frame_index);
        }
    }

    /// Whether a frame request is outstanding
    pub fn is_running(&self) -> bool {
        self.pending.is_some()
    }

    /// The outstanding request
    pub fn pending(&self) -> Option<FrameHandle> {
        self.pending
    }

    /// Frames run so far
    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }
}
