//! Label font loading
//!
//! Labels share one font. It is loaded lazily the first time a label is
//! attached and never again for the lifetime of the [`FontCache`], even when
//! the load failed.
//!
//! # Example
//!
//! ```no_run
//! use orrery_engine::render::text::{FontCache, FileFontSource};
//!
//! let fonts = FontCache::new(FileFontSource::new("resources/fonts/helvetiker_regular.ttf"));
//! let font = fonts.get()?;
//! println!("{} is {} units wide", font.family(), font.measure("Earth", 0.1));
//! # Ok::<(), orrery_engine::render::text::FontError>(())
//! ```

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};

use fontdue::{Font, FontSettings};

/// Advance per character, in ems, when the face has no glyph metrics
const FALLBACK_ADVANCE: f32 = 0.6;

/// Errors that can occur while loading a font
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FontError {
    /// The font file could not be read
    #[error("Failed to read font {path}: {message}")]
    Io {
        /// File that was read
        path: String,
        /// Underlying error text
        message: String,
    },

    /// The bytes are not a usable TrueType/OpenType font
    #[error("Failed to load font: {0}")]
    LoadError(String),
}

/// A loaded font, shared by every label
pub struct FontResource {
    family: String,
    face: Option<Font>,
}

impl FontResource {
    /// Wrap a parsed `fontdue` face
    pub fn new(family: impl Into<String>, face: Font) -> Self {
        Self {
            family: family.into(),
            face: Some(face),
        }
    }

    /// A font without glyph data; text is measured with a fixed advance
    pub fn placeholder(family: impl Into<String>) -> Self {
        Self {
            family: family.into(),
            face: None,
        }
    }

    /// Font family name
    pub fn family(&self) -> &str {
        &self.family
    }

    /// Whether real glyph metrics are available
    pub fn has_glyphs(&self) -> bool {
        self.face.is_some()
    }

    /// Width of `text` set at glyph height `size`, in the same units as `size`
    pub fn measure(&self, text: &str, size: f32) -> f32 {
        match &self.face {
            Some(face) => text
                .chars()
                .map(|ch| face.metrics(ch, size).advance_width)
                .sum(),
            None => text.chars().count() as f32 * size * FALLBACK_ADVANCE,
        }
    }
}

impl fmt::Debug for FontResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FontResource")
            .field("family", &self.family)
            .field("has_glyphs", &self.has_glyphs())
            .finish()
    }
}

/// Where the label font comes from
pub trait FontSource: Send + Sync {
    /// Load the font; called at most once per [`FontCache`]
    fn load(&self) -> Result<FontResource, FontError>;
}

/// Loads a TTF/OTF file from disk
#[derive(Debug, Clone)]
pub struct FileFontSource {
    path: PathBuf,
}

impl FileFontSource {
    /// Source reading the font at `path`
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl FontSource for FileFontSource {
    fn load(&self) -> Result<FontResource, FontError> {
        let bytes = std::fs::read(&self.path).map_err(|e| FontError::Io {
            path: self.path.display().to_string(),
            message: e.to_string(),
        })?;

        let face = Font::from_bytes(bytes, FontSettings::default())
            .map_err(|e| FontError::LoadError(format!("fontdue error: {e}")))?;

        let family = face
            .name()
            .map(str::to_string)
            .or_else(|| self.path.file_stem().map(|stem| stem.to_string_lossy().into_owned()))
            .unwrap_or_else(|| "unnamed".to_string());

        Ok(FontResource::new(family, face))
    }
}

/// Write-once, read-many holder of the shared label font
pub struct FontCache {
    source: Box<dyn FontSource>,
    font: OnceLock<Result<Arc<FontResource>, FontError>>,
    loads: AtomicUsize,
}

impl FontCache {
    /// Create a cache over `source`; nothing is loaded yet
    pub fn new(source: impl FontSource + 'static) -> Self {
        Self {
            source: Box::new(source),
            font: OnceLock::new(),
            loads: AtomicUsize::new(0),
        }
    }

    /// The shared font, loading it on first use
    ///
    /// A failed load is remembered and returned to every later caller.
    pub fn get(&self) -> Result<Arc<FontResource>, FontError> {
        self.font
            .get_or_init(|| {
                self.loads.fetch_add(1, Ordering::Relaxed);
                match self.source.load() {
                    Ok(font) => {
                        log::info!("Loaded label font '{}'", font.family());
                        Ok(Arc::new(font))
                    }
                    Err(e) => {
                        log::warn!("Label font unavailable: {e}");
                        Err(e)
                    }
                }
            })
            .clone()
    }

    /// Whether a load has been attempted
    pub fn is_initialized(&self) -> bool {
        self.font.get().is_some()
    }

    /// Number of times the source has been asked to load
    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::Relaxed)
    }
}

impl fmt::Debug for FontCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FontCache")
            .field("initialized", &self.is_initialized())
            .field("loads", &self.load_count())
            .finish_non_exhaustive()
    }
}
