//! Data ingestion
//!
//! Every source (the two live proxy feeds and the built-in planetary dataset)
//! is normalised into [`ObjectDescriptor`]s. Descriptors are immutable once
//! received and are shared with the entities built from them.

pub mod jpl;
pub mod planets;
pub mod loader;

pub use jpl::JplProxyFeed;
pub use planets::PlanetaryDataset;
pub use loader::{FeedLoader, FeedBatch};

use serde::{Serialize, Deserialize};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Opaque attribute bag carried verbatim from the source
pub type Attributes = BTreeMap<String, serde_json::Value>;

/// Attribute keys that population understands when a source provides them
pub mod keys {
    /// Orbit radius in scene units
    pub const ORBIT_RADIUS: &str = "orbit_radius";
    /// Angular speed in radians per tick
    pub const ANGULAR_SPEED: &str = "angular_speed";
    /// Visual radius in scene units
    pub const BODY_RADIUS: &str = "body_radius";
    /// Base colour as a `0xRRGGBB` integer
    pub const COLOR: &str = "color";
    /// Name of the body this one orbits
    pub const PARENT: &str = "parent";
    /// Axial rotation of the visual in radians per tick
    pub const SPIN_RATE: &str = "spin_rate";
}

/// Kind of celestial object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectKind {
    /// Atmospheric fireball event
    Fireball,
    /// Asteroid or comet from the small-body database
    SmallBody,
    /// Planet of the fixed dataset
    Planet,
    /// Moon of the fixed dataset
    Moon,
}

impl ObjectKind {
    /// Default visual radius for this kind
    pub fn default_body_radius(self) -> f32 {
        match self {
            Self::Fireball => 0.02,
            Self::SmallBody => 0.05,
            Self::Planet => 0.4,
            Self::Moon => 0.1,
        }
    }

    /// Default base colour for this kind
    pub fn default_color(self) -> u32 {
        match self {
            Self::Fireball => 0x00ff_4500,
            Self::SmallBody => 0x0080_8080,
            Self::Planet => 0x0041_69e1,
            Self::Moon => 0x00aa_aaaa,
        }
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Fireball => "fireball",
            Self::SmallBody => "small body",
            Self::Planet => "planet",
            Self::Moon => "moon",
        };
        f.write_str(name)
    }
}

/// Externally sourced record describing one celestial object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectDescriptor {
    /// Display name
    pub name: String,
    /// Object kind
    pub kind: ObjectKind,
    /// Everything else the source said, for the info panel
    #[serde(default)]
    pub attributes: Attributes,
}

impl ObjectDescriptor {
    /// Create a descriptor without attributes
    pub fn new(name: impl Into<String>, kind: ObjectKind) -> Self {
        Self {
            name: name.into(),
            kind,
            attributes: Attributes::new(),
        }
    }

    /// Add an attribute
    #[must_use]
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Numeric attribute, if present and numeric (numeric strings are accepted)
    pub fn number(&self, key: &str) -> Option<f64> {
        match self.attributes.get(key)? {
            serde_json::Value::Number(n) => n.as_f64(),
            serde_json::Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// String attribute, if present
    pub fn text(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).and_then(serde_json::Value::as_str)
    }
}

/// Feed fetch failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FeedError {
    /// The proxy answered with a non-success status
    #[error("HTTP {status} from {url}")]
    Status {
        /// Requested URL
        url: String,
        /// HTTP status code
        status: u16,
    },

    /// Connection, DNS, TLS or timeout failure
    #[error("transport error for {url}: {message}")]
    Transport {
        /// Requested URL
        url: String,
        /// Underlying error text
        message: String,
    },

    /// The response arrived but its body could not be read
    #[error("failed reading response from {url}: {message}")]
    Http {
        /// Requested URL
        url: String,
        /// Underlying error text
        message: String,
    },

    /// The payload could not be interpreted
    #[error("malformed payload: {0}")]
    Parse(String),
}

impl FeedError {
    /// Whether a retry could plausibly succeed
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport { .. } | Self::Http { .. } => true,
            Self::Status { status, .. } => *status >= 500 || *status == 429,
            Self::Parse(_) => false,
        }
    }
}

/// A source of near-earth object descriptors
///
/// Implementations block; [`FeedLoader`] runs them off the render thread.
pub trait DataFeed: Send + Sync {
    /// Fetch the fireball feed
    fn fetch_fireballs(&self) -> Result<Vec<ObjectDescriptor>, FeedError>;

    /// Fetch the small-body feed
    fn fetch_small_bodies(&self) -> Result<Vec<ObjectDescriptor>, FeedError>;

    /// Fetch the feed for `kind`; kinds without a feed yield nothing
    fn fetch(&self, kind: ObjectKind) -> Result<Vec<ObjectDescriptor>, FeedError> {
        match kind {
            ObjectKind::Fireball => self.fetch_fireballs(),
            ObjectKind::SmallBody => self.fetch_small_bodies(),
            ObjectKind::Planet | ObjectKind::Moon => Ok(Vec::new()),
        }
    }
}
