//! # Unified Configuration System
//!
//! All configuration records for the orrery live here. Every record is
//! serializable (TOML or RON through [`Config`]) and has sensible defaults,
//! so a partial file only needs to name what it overrides.
//!
//! ## Configuration Categories
//!
//! - **View Config**: the UI-facing toggles (labels, trajectories, speed, NEO limit)
//! - **Feed Config**: proxy location, timeouts, retry policy
//! - **Scene Config**: synthetic orbit ranges, body sizes, label placement
//! - **Camera Config**: initial viewpoint and viewport size
//! - **Engine Config**: logging, dataset selection, frame pacing

use serde::{Serialize, Deserialize};
use std::time::Duration;

use crate::config::{Config, ConfigError};

/// Largest accepted global speed multiplier
pub const MAX_SPEED: f32 = 10.0;

/// Largest accepted per-kind limit for near-earth objects
pub const MAX_LIMIT_NEOS: u32 = 50;

/// Which datasets populate the scene
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DatasetSource {
    /// Fireballs and small bodies from the live proxy feeds
    NearEarthObjects,
    /// The fixed planetary dataset (planets and moons)
    SolarSystem,
    /// Both of the above in one scene
    Combined,
}

impl DatasetSource {
    /// Whether the live feeds should be requested
    pub fn includes_feeds(self) -> bool {
        matches!(self, Self::NearEarthObjects | Self::Combined)
    }

    /// Whether the planetary dataset should be loaded
    pub fn includes_planets(self) -> bool {
        matches!(self, Self::SolarSystem | Self::Combined)
    }
}

/// # View Configuration
///
/// The record owned by the UI chrome. It is passed by value into every tick,
/// so there is no shared binding between widgets and scene state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    /// Draw billboard labels above entities
    pub show_labels: bool,
    /// Draw orbit paths
    pub show_trajectories: bool,
    /// Global angular speed multiplier, `[0, 10]`
    pub speed: f32,
    /// Maximum entities per near-earth kind, `[0, 50]`
    pub limit_neos: u32,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            show_labels: true,
            show_trajectories: true,
            speed: 1.0,
            limit_neos: 10,
        }
    }
}

impl ViewConfig {
    /// Clamp every field into its accepted range
    #[must_use]
    pub fn sanitized(mut self) -> Self {
        self.speed = if self.speed.is_finite() {
            self.speed.clamp(0.0, MAX_SPEED)
        } else {
            1.0
        };
        self.limit_neos = self.limit_neos.min(MAX_LIMIT_NEOS);
        self
    }

    /// Set the speed multiplier
    #[must_use]
    pub fn with_speed(mut self, speed: f32) -> Self {
        self.speed = speed;
        self
    }

    /// Set the near-earth object limit
    #[must_use]
    pub fn with_limit_neos(mut self, limit: u32) -> Self {
        self.limit_neos = limit;
        self
    }

    /// Enable or disable labels
    #[must_use]
    pub fn with_labels(mut self, enabled: bool) -> Self {
        self.show_labels = enabled;
        self
    }

    /// Enable or disable orbit paths
    #[must_use]
    pub fn with_trajectories(mut self, enabled: bool) -> Self {
        self.show_trajectories = enabled;
        self
    }
}

/// Ranges for synthetic orbital parameters
///
/// Live feeds carry no orbital elements, so population draws radius and
/// angular speed uniformly from these half-open ranges.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrbitRanges {
    /// Inclusive lower bound of the orbit radius
    pub radius_min: f32,
    /// Exclusive upper bound of the orbit radius
    pub radius_max: f32,
    /// Inclusive lower bound of the angular speed (radians per tick)
    pub speed_min: f32,
    /// Exclusive upper bound of the angular speed (radians per tick)
    pub speed_max: f32,
}

impl Default for OrbitRanges {
    fn default() -> Self {
        Self {
            radius_min: 2.0,
            radius_max: 5.0,
            speed_min: 0.005,
            speed_max: 0.03,
        }
    }
}

impl OrbitRanges {
    /// Validate the ranges
    ///
    /// Every bound must be finite and each range non-empty with a finite
    /// width, so that sampling from it cannot fail. NaN fails every check.
    pub fn validate(&self) -> Result<(), String> {
        if !(finite_range(self.radius_min, self.radius_max) && self.radius_min > 0.0) {
            return Err(format!(
                "orbit radius range [{}, {}) must be finite, positive and non-empty",
                self.radius_min, self.radius_max
            ));
        }
        if !finite_range(self.speed_min, self.speed_max) {
            return Err(format!(
                "angular speed range [{}, {}) must be finite and non-empty",
                self.speed_min, self.speed_max
            ));
        }
        Ok(())
    }
}

fn finite_range(min: f32, max: f32) -> bool {
    min.is_finite() && max.is_finite() && min < max && (max - min).is_finite()
}

/// # Feed Configuration
///
/// Where the proxy lives and how patiently to talk to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    /// Base URL of the proxy service
    pub base_url: String,
    /// Per-request timeout in milliseconds
    pub timeout_ms: u64,
    /// Retries after the first attempt for transient failures
    pub max_retries: u32,
    /// Backoff before the first retry; doubles on each further retry
    pub retry_backoff_ms: u64,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            timeout_ms: 10_000,
            max_retries: 2,
            retry_backoff_ms: 250,
        }
    }
}

impl FeedConfig {
    /// Create a feed configuration for a proxy at `base_url`
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// URL of the fireball endpoint
    pub fn fireball_url(&self) -> String {
        format!("{}/api/fireball", self.base_url.trim_end_matches('/'))
    }

    /// URL of the small-body endpoint
    pub fn small_body_url(&self) -> String {
        format!("{}/api/sbdb", self.base_url.trim_end_matches('/'))
    }

    /// Request timeout
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Delay before retry number `attempt` (1-based)
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        let factor = 1_u64 << attempt.saturating_sub(1).min(16);
        Duration::from_millis(self.retry_backoff_ms.saturating_mul(factor))
    }
}

/// # Scene Configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneSettings {
    /// Radius of the central body
    pub central_body_radius: f32,
    /// Multiplier applied to visual radii when building pick spheres
    pub pick_radius_scale: f32,
    /// Font file used for labels
    pub font_path: String,
    /// Label glyph height in scene units
    pub label_size: f32,
    /// Vertical offset of a label above its entity
    pub label_offset: f32,
    /// Segments per orbit path
    pub orbit_segments: u32,
    /// Synthetic orbit parameter ranges
    pub orbit_ranges: OrbitRanges,
}

impl Default for SceneSettings {
    fn default() -> Self {
        Self {
            central_body_radius: 0.5,
            pick_radius_scale: 1.0,
            font_path: "resources/fonts/helvetiker_regular.ttf".to_string(),
            label_size: 0.1,
            label_offset: 0.1,
            orbit_segments: 64,
            orbit_ranges: OrbitRanges::default(),
        }
    }
}

/// # Camera Configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraSettings {
    /// Camera position in world space
    pub position: [f32; 3],
    /// Look-at point in world space
    pub target: [f32; 3],
    /// Vertical field of view in degrees
    pub fov_degrees: f32,
    /// Near clipping plane
    pub near: f32,
    /// Far clipping plane
    pub far: f32,
    /// Viewport width in pixels
    pub viewport_width: u32,
    /// Viewport height in pixels
    pub viewport_height: u32,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            position: [0.0, 8.0, 10.0],
            target: [0.0, 0.0, 0.0],
            fov_degrees: 75.0,
            near: 0.1,
            far: 1000.0,
            viewport_width: 1280,
            viewport_height: 720,
        }
    }
}

/// # Engine Configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Default log filter when `RUST_LOG` is unset
    pub log_level: String,
    /// Datasets to load
    pub dataset: DatasetSource,
    /// Display refresh rate the frame clock paces to
    pub refresh_rate_hz: u32,
    /// Stop after this many frames (run until interrupted when absent)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub run_frames: Option<u64>,
    /// Seed for synthetic orbit parameters (random when absent)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rng_seed: Option<u64>,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            dataset: DatasetSource::Combined,
            refresh_rate_hz: 60,
            run_frames: None,
            rng_seed: None,
        }
    }
}

/// # Complete Application Configuration
///
/// Top-level configuration that encompasses all engine subsystems.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplicationConfig {
    /// Engine core configuration
    pub engine: EngineSettings,
    /// UI-facing view toggles
    pub view: ViewConfig,
    /// Data feed configuration
    pub feeds: FeedConfig,
    /// Scene construction configuration
    pub scene: SceneSettings,
    /// Camera configuration
    pub camera: CameraSettings,
}

impl ApplicationConfig {
    /// Set the dataset source
    #[must_use]
    pub fn with_dataset(mut self, dataset: DatasetSource) -> Self {
        self.engine.dataset = dataset;
        self
    }

    /// Set the view toggles
    #[must_use]
    pub fn with_view(mut self, view: ViewConfig) -> Self {
        self.view = view;
        self
    }

    /// Fix the random seed used for synthetic orbits
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.engine.rng_seed = Some(seed);
        self
    }

    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.scene.orbit_ranges.validate().map_err(ConfigError::Invalid)?;

        if !(self.scene.central_body_radius.is_finite() && self.scene.central_body_radius > 0.0) {
            return Err(ConfigError::Invalid("central body radius must be positive".into()));
        }
        if !(self.scene.pick_radius_scale.is_finite() && self.scene.pick_radius_scale > 0.0) {
            return Err(ConfigError::Invalid("pick radius scale must be positive".into()));
        }
        if self.camera.viewport_width == 0 || self.camera.viewport_height == 0 {
            return Err(ConfigError::Invalid("viewport must not be empty".into()));
        }
        if !(self.camera.near > 0.0 && self.camera.near < self.camera.far) {
            return Err(ConfigError::Invalid("camera clip planes must satisfy 0 < near < far".into()));
        }
        if self.engine.refresh_rate_hz == 0 {
            return Err(ConfigError::Invalid("refresh rate must be at least 1 Hz".into()));
        }
        if self.feeds.base_url.is_empty() {
            return Err(ConfigError::Invalid("feed base URL cannot be empty".into()));
        }
        Ok(())
    }
}

impl Config for ApplicationConfig {}
