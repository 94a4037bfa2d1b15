//! # Orrery Engine
//!
//! A real-time orrery: celestial objects from live data feeds (and a fixed
//! planetary dataset) orbit a central body on planar circular paths, can be
//! picked with the pointer, carry billboard labels, and are drawn by a
//! cooperative render loop that can be cancelled cleanly on teardown.
//!
//! ## Features
//!
//! - **Orbit kinematics**: frame-stepped angular motion for every entity
//! - **Scene population**: bulk creation from feed descriptors, bounded per kind
//! - **Picking**: pointer → ray → nearest bounding sphere, with selection state
//! - **Labels**: billboard text attached as a child of its entity
//! - **Render loop**: self-rescheduling frame callbacks with explicit cancellation
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use orrery_engine::prelude::*;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ApplicationConfig::default();
//!     let feed = Arc::new(JplProxyFeed::new(&config.feeds));
//!     let fonts = FontCache::new(FileFontSource::new(&config.scene.font_path));
//!     let mut orrery = Orrery::new(config, feed, Box::new(HeadlessRenderer::new()), fonts)?;
//!
//!     let mut clock = VsyncClock::with_refresh_rate(60);
//!     orrery.start(&mut clock);
//!     while let Some(frame) = clock.next_frame() {
//!         orrery.tick(frame, &mut clock)?;
//!         if orrery.frame_index() >= 600 {
//!             orrery.teardown(&mut clock);
//!         }
//!     }
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

// Core engine modules
pub mod core;

pub mod foundation;
pub mod config;
pub mod feeds;
pub mod physics;
pub mod scene;
pub mod systems;
pub mod input;
pub mod render;
pub mod render_loop;

mod engine;

pub use engine::{Orrery, EngineError, LifecycleState};

#[cfg(test)]
mod tests;

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        Orrery, EngineError,
        foundation::math::{Vec3, Mat4},
        core::config::{ApplicationConfig, ViewConfig, FeedConfig, DatasetSource},
        config::{Config, ConfigError},
        feeds::{DataFeed, JplProxyFeed, ObjectDescriptor, ObjectKind},
        scene::{SceneGraph, EntityHandle},
        render::{Camera, HeadlessRenderer, RenderBackend},
        render::text::{FontCache, FileFontSource},
        render_loop::{FrameScheduler, VsyncClock},
    };
}
