//! The orrery facade
//!
//! Owns the scene graph and every subsystem around it. All of it lives on
//! the render thread; feed workers only ever talk to it through the
//! [`FeedLoader`] channel, which is drained at the top of each tick.

use std::sync::Arc;
use std::thread::JoinHandle;

use rand::SeedableRng;
use rand::rngs::StdRng;
use thiserror::Error;

use crate::config::ConfigError;
use crate::core::config::{ApplicationConfig, ViewConfig};
use crate::feeds::{DataFeed, FeedBatch, FeedLoader, ObjectDescriptor, ObjectKind, PlanetaryDataset};
use crate::render::text::FontCache;
use crate::render::{Camera, Color, RenderBackend, RenderError};
use crate::render_loop::{FrameContext, FrameHandle, FrameScheduler, RenderLoop};
use crate::scene::{populate, EntityHandle, SceneGraph, Visual};
use crate::systems::{LabelStyle, LabelSystem, PickingSystem, Tooltip};

/// Name of the central body
const CENTRAL_BODY: &str = "Sun";

/// Engine errors
#[derive(Error, Debug)]
pub enum EngineError {
    /// Invalid or unreadable configuration
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Drawing failed; the render loop has stopped
    #[error("render error: {0}")]
    Render(#[from] RenderError),
}

/// Where the orrery is in its life
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    /// Built, no frame requested yet
    Created,
    /// Feeds requested and the render loop scheduled
    Running,
    /// Torn down; nothing more will happen
    TornDown,
}

/// A running orrery
pub struct Orrery {
    config: ApplicationConfig,
    scene: SceneGraph,
    camera: Camera,
    feed: Arc<dyn DataFeed>,
    loader: Option<FeedLoader>,
    fonts: FontCache,
    labels: LabelSystem,
    picking: PickingSystem,
    renderer: Box<dyn RenderBackend>,
    render_loop: RenderLoop,
    rng: StdRng,
    state: LifecycleState,
}

impl Orrery {
    /// Build an orrery; nothing is fetched or drawn until [`start`](Self::start)
    pub fn new(
        mut config: ApplicationConfig,
        feed: Arc<dyn DataFeed>,
        renderer: Box<dyn RenderBackend>,
        fonts: FontCache,
    ) -> Result<Self, EngineError> {
        config.validate()?;
        config.view = config.view.sanitized();

        let rng = match config.engine.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let mut scene = SceneGraph::new();
        scene.add_static_body(CENTRAL_BODY, Visual::sphere(config.scene.central_body_radius, Color::SUN));

        log::info!(
            "Orrery created: dataset {:?}, limit {} per kind, speed x{}",
            config.engine.dataset,
            config.view.limit_neos,
            config.view.speed
        );

        Ok(Self {
            camera: Camera::from_settings(&config.camera),
            labels: LabelSystem::new(LabelStyle::from(&config.scene), config.view.show_labels),
            picking: PickingSystem::new(
                config.camera.viewport_width,
                config.camera.viewport_height,
                config.scene.pick_radius_scale,
            ),
            config,
            scene,
            feed,
            loader: None,
            fonts,
            renderer,
            render_loop: RenderLoop::new(),
            rng,
            state: LifecycleState::Created,
        })
    }

    /// Populate the fixed dataset, request the live feeds and schedule the first frame
    pub fn start(&mut self, scheduler: &mut dyn FrameScheduler) {
        match self.state {
            LifecycleState::Created => {}
            LifecycleState::Running => return,
            LifecycleState::TornDown => {
                log::warn!("Ignoring start after teardown");
                return;
            }
        }

        self.load_sources();
        self.render_loop.start(scheduler);
        self.state = LifecycleState::Running;
        log::info!("Orrery started");
    }

    /// Handle one frame callback
    ///
    /// Delivered feed results are inserted first, then the render loop runs
    /// kinematics and draws. Frames arriving outside the running state are
    /// ignored. A render error is fatal: the loop is not rescheduled.
    pub fn tick(&mut self, frame: FrameHandle, scheduler: &mut dyn FrameScheduler) -> Result<(), EngineError> {
        if self.state != LifecycleState::Running {
            log::trace!("Ignoring frame {} while {:?}", frame.id(), self.state);
            return Ok(());
        }

        let batches = self.loader.as_mut().map(FeedLoader::poll).unwrap_or_default();
        for batch in batches {
            self.ingest(batch);
        }

        let ctx = FrameContext {
            scene: &mut self.scene,
            camera: &self.camera,
            labels: &self.labels,
            view: self.config.view,
            orbit_segments: self.config.scene.orbit_segments,
            backend: self.renderer.as_mut(),
        };
        self.render_loop.on_frame(frame, scheduler, ctx)?;
        Ok(())
    }

    /// Click at window pixel `(x, y)`; returns the entity hit
    pub fn pointer_click(&mut self, x: f64, y: f64) -> Option<EntityHandle> {
        if self.state == LifecycleState::TornDown {
            return None;
        }
        self.picking.select_at(&mut self.scene, &self.camera, x, y)
    }

    /// Pointer moved to window pixel `(x, y)`; returns the tooltip for what is under it
    pub fn pointer_move(&mut self, x: f64, y: f64) -> Option<Tooltip> {
        if self.state == LifecycleState::TornDown {
            return None;
        }
        self.picking.hover_at(&self.scene, &self.camera, x, y).cloned()
    }

    /// Drop the current selection
    pub fn clear_selection(&mut self) {
        self.picking.clear_selection(&mut self.scene);
    }

    /// The viewport changed size
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.camera.set_aspect_ratio(width as f32 / height as f32);
        self.picking.resize(width, height);
        self.renderer.resize(width, height);
        self.config.camera.viewport_width = width;
        self.config.camera.viewport_height = height;
    }

    /// Apply new view toggles
    ///
    /// Speed and visibility take effect on the next tick. A new object limit
    /// rebuilds the scene and re-requests the feeds.
    pub fn apply_config(&mut self, view: ViewConfig) {
        let view = view.sanitized();
        let previous = std::mem::replace(&mut self.config.view, view);
        self.labels.set_visible(view.show_labels);

        if view.limit_neos != previous.limit_neos && self.state == LifecycleState::Running {
            log::info!("Object limit changed {} -> {}, rebuilding scene", previous.limit_neos, view.limit_neos);
            self.rebuild();
        }
    }

    /// Stop everything
    ///
    /// Cancels the pending frame, stops accepting feed results, disposes the
    /// render target and empties the scene. Feed workers still in flight are
    /// returned so callers may join them; their results are discarded.
    pub fn teardown(&mut self, scheduler: &mut dyn FrameScheduler) -> Vec<JoinHandle<()>> {
        if self.state == LifecycleState::TornDown {
            return Vec::new();
        }

        self.render_loop.cancel(scheduler);
        let workers = self.loader.take().map(FeedLoader::shutdown).unwrap_or_default();
        self.renderer.dispose();
        self.picking.reset();
        self.scene.clear();
        self.state = LifecycleState::TornDown;

        log::info!("Orrery torn down after {} frame(s)", self.render_loop.frame_index());
        workers
    }

    /// Lifecycle state
    pub fn state(&self) -> LifecycleState {
        self.state
    }

    /// Frames run so far
    pub fn frame_index(&self) -> u64 {
        self.render_loop.frame_index()
    }

    /// Scene graph
    pub fn scene(&self) -> &SceneGraph {
        &self.scene
    }

    /// Active camera
    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// Active camera, for orbit controls
    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    /// Current view toggles
    pub fn view(&self) -> &ViewConfig {
        &self.config.view
    }

    /// Full configuration
    pub fn config(&self) -> &ApplicationConfig {
        &self.config
    }

    /// Selection and hover state
    pub fn picking(&self) -> &PickingSystem {
        &self.picking
    }

    /// Selected entity's record as pretty JSON
    pub fn selection_info(&self) -> Option<String> {
        self.picking.selection_info(&self.scene)
    }

    /// Label visibility
    pub fn labels(&self) -> &LabelSystem {
        &self.labels
    }

    /// Shared label font
    pub fn fonts(&self) -> &FontCache {
        &self.fonts
    }

    /// Render backend
    pub fn renderer(&self) -> &dyn RenderBackend {
        self.renderer.as_ref()
    }

    /// Feeds that have not delivered yet
    pub fn pending_feeds(&self) -> &[ObjectKind] {
        match &self.loader {
            Some(loader) => loader.pending_feeds(),
            None => &[],
        }
    }

    fn load_sources(&mut self) {
        let dataset = self.config.engine.dataset;

        if dataset.includes_planets() {
            let handles = populate(
                &mut self.scene,
                fetch_kinds(&PlanetaryDataset, &[ObjectKind::Planet, ObjectKind::Moon]),
                usize::MAX,
                &self.config.scene.orbit_ranges,
                &mut self.rng,
            );
            self.labels.attach_all(&mut self.scene, &self.fonts, &handles);
        }

        if dataset.includes_feeds() {
            self.loader = Some(FeedLoader::spawn(
                Arc::clone(&self.feed),
                &[ObjectKind::Fireball, ObjectKind::SmallBody],
                &self.config.feeds,
            ));
        }
    }

    fn ingest(&mut self, batch: FeedBatch) {
        let limit = self.config.view.limit_neos as usize;
        let received = batch.descriptors.len();
        let handles = populate(
            &mut self.scene,
            batch.descriptors,
            limit,
            &self.config.scene.orbit_ranges,
            &mut self.rng,
        );
        self.labels.attach_all(&mut self.scene, &self.fonts, &handles);
        log::info!("{}: {} of {received} added to the scene", batch.kind, handles.len());
    }

    fn rebuild(&mut self) {
        if let Some(loader) = self.loader.take() {
            drop(loader.shutdown());
        }
        self.picking.reset();
        self.scene.clear_entities();
        self.load_sources();
    }
}

/// Fetch `kinds` in order from a local source; a failed kind contributes nothing
fn fetch_kinds(source: &dyn DataFeed, kinds: &[ObjectKind]) -> Vec<ObjectDescriptor> {
    let mut descriptors = Vec::new();
    for &kind in kinds {
        match source.fetch(kind) {
            Ok(batch) => descriptors.extend(batch),
            Err(e) => log::error!("Could not load {kind} data: {e}"),
        }
    }
    descriptors
}

impl std::fmt::Debug for Orrery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orrery")
            .field("state", &self.state)
            .field("entities", &self.scene.len())
            .field("frame_index", &self.frame_index())
            .field("pending_feeds", &self.pending_feeds())
            .finish_non_exhaustive()
    }
}
