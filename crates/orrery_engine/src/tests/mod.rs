//! End-to-end engine scenarios
//!
//! Stub feeds and fonts stand in for the proxy service and the font file so
//! the whole orrery can run headless and deterministically.


use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, Sender, bounded};

use crate::core::config::{ApplicationConfig, DatasetSource};
use crate::feeds::{DataFeed, FeedError, ObjectDescriptor, ObjectKind};
use crate::render::text::{FontError, FontResource, FontSource};
use crate::render_loop::VsyncClock;
use crate::Orrery;

/// Upper bound on how long a scenario waits for feed workers
pub(crate) const WAIT: Duration = Duration::from_secs(5);

/// Feed answering immediately with numbered descriptors
pub(crate) struct InstantFeed {
    pub fireballs: usize,
    pub small_bodies: usize,
    /// Extra attributes stamped on every descriptor
    pub attributes: Vec<(&'static str, f64)>,
}

impl InstantFeed {
    pub fn new(fireballs: usize, small_bodies: usize) -> Self {
        Self {
            fireballs,
            small_bodies,
            attributes: Vec::new(),
        }
    }

    fn batch(&self, kind: ObjectKind, count: usize) -> Vec<ObjectDescriptor> {
        (0..count)
            .map(|i| {
                self.attributes.iter().fold(
                    ObjectDescriptor::new(format!("{kind} {i}"), kind),
                    |descriptor, &(key, value)| descriptor.with_attribute(key, value),
                )
            })
            .collect()
    }
}

impl DataFeed for InstantFeed {
    fn fetch_fireballs(&self) -> Result<Vec<ObjectDescriptor>, FeedError> {
        Ok(self.batch(ObjectKind::Fireball, self.fireballs))
    }

    fn fetch_small_bodies(&self) -> Result<Vec<ObjectDescriptor>, FeedError> {
        Ok(self.batch(ObjectKind::SmallBody, self.small_bodies))
    }
}

/// Feed whose requests block until the test releases them
pub(crate) struct GatedFeed {
    gate: Receiver<()>,
    started: AtomicUsize,
    completed: AtomicUsize,
}

impl GatedFeed {
    /// The feed plus the sender whose drop opens the gate
    pub fn new() -> (Self, Sender<()>) {
        let (release, gate) = bounded(0);
        let feed = Self {
            gate,
            started: AtomicUsize::new(0),
            completed: AtomicUsize::new(0),
        };
        (feed, release)
    }

    pub fn started(&self) -> usize {
        self.started.load(Ordering::SeqCst)
    }

    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }

    fn gated(&self, kind: ObjectKind) -> Vec<ObjectDescriptor> {
        self.started.fetch_add(1, Ordering::SeqCst);
        let _ = self.gate.recv();
        self.completed.fetch_add(1, Ordering::SeqCst);
        (0..5).map(|i| ObjectDescriptor::new(format!("late {kind} {i}"), kind)).collect()
    }
}

impl DataFeed for GatedFeed {
    fn fetch_fireballs(&self) -> Result<Vec<ObjectDescriptor>, FeedError> {
        Ok(self.gated(ObjectKind::Fireball))
    }

    fn fetch_small_bodies(&self) -> Result<Vec<ObjectDescriptor>, FeedError> {
        Ok(self.gated(ObjectKind::SmallBody))
    }
}

/// Font source that needs no file
pub(crate) struct PlaceholderFont;

impl FontSource for PlaceholderFont {
    fn load(&self) -> Result<FontResource, FontError> {
        Ok(FontResource::placeholder("placeholder"))
    }
}

/// Seeded configuration for `dataset`
pub(crate) fn config(dataset: DatasetSource) -> ApplicationConfig {
    ApplicationConfig::default().with_dataset(dataset).with_seed(42)
}

/// Tick until no feed is pending, then once more so the last batch is drawn
pub(crate) fn run_until_feeds_settle(orrery: &mut Orrery, clock: &mut VsyncClock) {
    let deadline = Instant::now() + WAIT;
    while !orrery.pending_feeds().is_empty() {
        assert!(Instant::now() < deadline, "feeds did not settle");
        let frame = clock.next_frame().expect("render loop stopped");
        orrery.tick(frame, clock).unwrap();
        std::thread::sleep(Duration::from_millis(1));
    }
    let frame = clock.next_frame().expect("render loop stopped");
    orrery.tick(frame, clock).unwrap();
}

/// Run `frames` ticks
pub(crate) fn run_frames(orrery: &mut Orrery, clock: &mut VsyncClock, frames: usize) {
    for _ in 0..frames {
        let frame = clock.next_frame().expect("render loop stopped");
        orrery.tick(frame, clock).unwrap();
    }
}
