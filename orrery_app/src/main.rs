//! Orrery demo application
//!
//! Runs the orrery headless against the proxy configured in `orrery.toml`
//! (or the path given as the first argument), logging frame rate and the
//! scene as feeds arrive, then tears everything down.

use std::path::PathBuf;
use std::sync::Arc;

use orrery_engine::foundation::{logging, time::FrameStats};
use orrery_engine::prelude::*;
use thiserror::Error;

const DEFAULT_CONFIG: &str = "orrery.toml";

/// Frames to run when the configuration does not say
const DEFAULT_RUN_FRAMES: u64 = 600;

#[derive(Error, Debug)]
enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Engine(#[from] EngineError),
}

struct OrreryApp {
    orrery: Orrery,
    clock: VsyncClock,
    stats: FrameStats,
    run_frames: u64,
    demo_click_frame: u64,
}

impl OrreryApp {
    fn new(config: ApplicationConfig) -> Result<Self, AppError> {
        let run_frames = config.engine.run_frames.unwrap_or(DEFAULT_RUN_FRAMES);
        let clock = VsyncClock::with_refresh_rate(config.engine.refresh_rate_hz);

        log::info!("Feeds from {}", config.feeds.base_url);
        let feed = Arc::new(JplProxyFeed::new(&config.feeds));
        let fonts = FontCache::new(FileFontSource::new(&config.scene.font_path));
        let orrery = Orrery::new(config, feed, Box::new(HeadlessRenderer::new()), fonts)?;

        Ok(Self {
            orrery,
            clock,
            stats: FrameStats::default(),
            run_frames,
            demo_click_frame: run_frames / 2,
        })
    }

    fn run(&mut self) -> Result<(), AppError> {
        self.orrery.start(&mut self.clock);

        while let Some(frame) = self.clock.next_frame() {
            if let Err(e) = self.orrery.tick(frame, &mut self.clock) {
                self.shutdown();
                return Err(e.into());
            }

            if let Some(fps) = self.stats.record_frame() {
                log::info!(
                    "{fps:.1} fps, {} entities, pending feeds: {:?}",
                    self.orrery.scene().len(),
                    self.orrery.pending_feeds()
                );
            }

            let frame_index = self.orrery.frame_index();
            if frame_index == self.demo_click_frame {
                self.click_center();
            }
            if frame_index >= self.run_frames {
                self.shutdown();
            }
        }
        Ok(())
    }

    /// Click the middle of the viewport and report what was there
    fn click_center(&mut self) {
        let camera = &self.orrery.config().camera;
        let x = f64::from(camera.viewport_width) / 2.0;
        let y = f64::from(camera.viewport_height) / 2.0;

        if let Some(tooltip) = self.orrery.pointer_move(x, y) {
            log::info!("Hovering {}", tooltip.text());
        }
        match self.orrery.pointer_click(x, y) {
            Some(_) => {
                if let Some(info) = self.orrery.selection_info() {
                    log::info!("Selected:\n{info}");
                }
            }
            None => log::info!("Nothing at the viewport centre"),
        }
    }

    fn shutdown(&mut self) {
        let workers = self.orrery.teardown(&mut self.clock);
        if !workers.is_empty() {
            log::info!("Leaving {} feed request(s) to finish in the background", workers.len());
        }
        log::info!("Ran {} frame(s)", self.stats.total_frames());
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let path = std::env::args_os()
        .nth(1)
        .map_or_else(|| PathBuf::from(DEFAULT_CONFIG), PathBuf::from);

    let config = ApplicationConfig::load_or_default(&path)?;
    logging::init(&config.engine.log_level);
    log::info!("Starting orrery with {}", path.display());

    let mut app = OrreryApp::new(config)?;
    match app.run() {
        Ok(()) => {
            log::info!("Orrery finished");
            Ok(())
        }
        Err(e) => {
            log::error!("Orrery stopped: {e}");
            Err(e.into())
        }
    }
}
