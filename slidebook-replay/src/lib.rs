//! # Slidebook Replay
//!
//! Headless host for the Slidebook viewer. Loads a deck manifest and a timed
//! input script, drives the viewer at a fixed frame rate and reports what
//! happened.
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p slidebook-replay -- --deck deck.json --script swipe.json
//! ```
//!
//! ## With per-frame output:
//!
//! ```bash
//! cargo run -p slidebook-replay -- --slides 12 --script swipe.json --frames
//! ```
//!
//! ## Architecture
//!
//! - `CliArgs` - Command-line arguments parsed with clap
//! - `ReplayConfig` - Deck source, viewport, frame rate and viewer tuning
//! - `Script` - Timed input steps
//! - `FileLoader` - Preloads slides by checking local image files
//! - `run` - Drives `SlideViewer` and produces a `SessionReport`

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]

mod loader;
mod runner;
mod script;

pub use loader::FileLoader;
pub use runner::{run, run_script, SessionReport};
pub use script::{Script, ScriptStep};

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use slidebook_core::{Deck, ViewerConfig, Viewport};

/// Command-line arguments for slidebook-replay.
#[derive(Debug, Clone, Parser)]
#[command(name = "slidebook-replay")]
#[command(about = "Replay scripted touch, key and button input against a slide deck")]
#[command(version)]
pub struct CliArgs {
    /// Deck manifest (JSON array of `{index, imageLocator, altText}`)
    #[arg(long, env = "SLIDEBOOK_DECK", conflicts_with = "slides")]
    pub deck: Option<PathBuf>,

    /// Use a generated deck of this many slides instead of a manifest
    #[arg(long)]
    pub slides: Option<usize>,

    /// Input script (JSON)
    #[arg(long)]
    pub script: PathBuf,

    /// Viewer configuration overrides (JSON)
    #[arg(long, env = "SLIDEBOOK_CONFIG")]
    pub config: Option<PathBuf>,

    /// Viewport width in pixels
    #[arg(long, default_value = "1280")]
    pub width: u32,

    /// Viewport height in pixels
    #[arg(long, default_value = "720")]
    pub height: u32,

    /// Ticks per second
    #[arg(long, default_value = "60")]
    pub fps: u32,

    /// Keep ticking this long after the last scripted step
    #[arg(long, default_value = "1000")]
    pub tail_ms: u64,

    /// Print every frame as a JSON line
    #[arg(long)]
    pub frames: bool,

    /// Emit logs as JSON
    #[arg(long, env = "SLIDEBOOK_LOG_JSON")]
    pub log_json: bool,
}

/// Where the deck comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeckSource {
    /// A manifest file on disk.
    Manifest(PathBuf),
    /// A generated deck of `n` slides.
    Numbered(usize),
}

/// Replay configuration.
#[derive(Debug, Clone)]
pub struct ReplayConfig {
    /// Deck to show.
    pub deck: DeckSource,
    /// Script to replay.
    pub script: PathBuf,
    /// Viewer tuning file, if any.
    pub viewer_config: Option<PathBuf>,
    /// Viewport width in pixels.
    pub width: u32,
    /// Viewport height in pixels.
    pub height: u32,
    /// Ticks per second.
    pub fps: u32,
    /// Settling time after the last step.
    pub tail_ms: u64,
}

impl ReplayConfig {
    /// Configuration for replaying `script` against a generated deck.
    #[must_use]
    pub fn new(slides: usize, script: impl Into<PathBuf>) -> Self {
        Self {
            deck: DeckSource::Numbered(slides),
            script: script.into(),
            viewer_config: None,
            width: 1280,
            height: 720,
            fps: 60,
            tail_ms: 1_000,
        }
    }

    /// Viewport for the configured size.
    #[must_use]
    #[allow(clippy::cast_precision_loss)] // Window dimensions fit in f32
    pub fn viewport(&self) -> Viewport {
        Viewport::new(self.width as f32, self.height as f32)
    }

    /// Milliseconds between ticks, at least 1.
    #[must_use]
    pub fn frame_ms(&self) -> u64 {
        (1_000 / u64::from(self.fps.max(1))).max(1)
    }

    /// Load the deck.
    ///
    /// # Errors
    ///
    /// Returns an error if the manifest cannot be read or is invalid.
    pub fn load_deck(&self) -> anyhow::Result<Deck> {
        let deck = match &self.deck {
            DeckSource::Manifest(path) => {
                let json = std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read deck manifest {}", path.display()))?;
                Deck::from_manifest_json(&json)
                    .with_context(|| format!("Invalid deck manifest {}", path.display()))?
            }
            DeckSource::Numbered(count) => Deck::numbered(*count, "slide-", ".png")?,
        };
        Ok(deck)
    }

    /// Directory that relative image locators resolve against.
    #[must_use]
    pub fn asset_root(&self) -> PathBuf {
        match &self.deck {
            DeckSource::Manifest(path) => path
                .parent()
                .map_or_else(|| PathBuf::from("."), PathBuf::from),
            DeckSource::Numbered(_) => PathBuf::from("."),
        }
    }

    /// Load viewer tuning, or defaults when no file is configured.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or fails validation.
    pub fn load_viewer_config(&self) -> anyhow::Result<ViewerConfig> {
        let Some(path) = &self.viewer_config else {
            return Ok(ViewerConfig::default());
        };
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read viewer config {}", path.display()))?;
        ViewerConfig::from_json(&json)
            .with_context(|| format!("Invalid viewer config {}", path.display()))
    }
}

impl TryFrom<CliArgs> for ReplayConfig {
    type Error = anyhow::Error;

    fn try_from(args: CliArgs) -> anyhow::Result<Self> {
        let deck = match (args.deck, args.slides) {
            (Some(path), _) => DeckSource::Manifest(path),
            (None, Some(count)) => DeckSource::Numbered(count),
            (None, None) => anyhow::bail!("Either --deck or --slides is required"),
        };
        Ok(Self {
            deck,
            script: args.script,
            viewer_config: args.config,
            width: args.width,
            height: args.height,
            fps: args.fps,
            tail_ms: args.tail_ms,
        })
    }
}
