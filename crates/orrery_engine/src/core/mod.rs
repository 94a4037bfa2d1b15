//! # Core Engine Module
//!
//! Shared configuration records consumed by every subsystem.

pub mod config;

// Re-export commonly used config types
pub use config::{
    ApplicationConfig,
    EngineSettings,
    ViewConfig,
    FeedConfig,
    SceneSettings,
    CameraSettings,
    OrbitRanges,
    DatasetSource,
};
pub use crate::config::{Config, ConfigError};
