//! Drives a viewer through a script at a fixed frame rate.

use serde::{Deserialize, Serialize};
use slidebook_core::{Frame, PreloadStats, SlideLoader, SlideViewer, ViewerStats};

use crate::loader::FileLoader;
use crate::script::Script;
use crate::ReplayConfig;

/// Summary of a replayed session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionReport {
    /// Slides in the deck.
    pub slides: usize,
    /// Page shown at the end (0-based).
    pub final_page: usize,
    /// Page number shown at the end (1-based).
    pub final_display_number: usize,
    /// Every page shown, in order, starting with the first.
    pub pages_visited: Vec<usize>,
    /// Whether the session ended zoomed in.
    pub is_zoomed: bool,
    /// Frames produced.
    pub frames: usize,
    /// Simulated session length.
    pub duration_ms: u64,
    /// Gesture and navigation totals.
    pub stats: ViewerStats,
    /// Preload totals.
    pub preload: PreloadStats,
}

/// Replay `script` against `viewer`, ticking every `frame_ms` until
/// `tail_ms` after the last step. Each produced frame is passed to `on_frame`.
pub fn run_script<L: SlideLoader>(
    viewer: &mut SlideViewer<L>,
    script: &Script,
    frame_ms: u64,
    tail_ms: u64,
    mut on_frame: impl FnMut(&Frame),
) -> SessionReport {
    let frame_ms = frame_ms.max(1);
    let end_ms = script.end_ms().saturating_add(tail_ms);
    let mut steps = script.steps.iter().peekable();
    let mut pages_visited = vec![viewer.page()];
    let mut frames = 0;
    let mut now = 0;

    loop {
        while let Some(step) = steps.next_if(|s| s.at_ms <= now) {
            viewer.handle_input(&step.stamped_event());
            record_page(&mut pages_visited, viewer.page());
        }

        let frame = viewer.tick(now);
        frames += 1;
        record_page(&mut pages_visited, frame.page);
        on_frame(&frame);

        if now >= end_ms {
            break;
        }
        now = now.saturating_add(frame_ms).min(end_ms);
    }

    let report = SessionReport {
        slides: viewer.deck().len(),
        final_page: viewer.page(),
        final_display_number: viewer.page() + 1,
        pages_visited,
        is_zoomed: viewer.view().is_zoomed(),
        frames,
        duration_ms: now,
        stats: viewer.stats(),
        preload: viewer.preload_stats(),
    };
    tracing::info!(
        final_page = report.final_display_number,
        frames = report.frames,
        page_changes = report.stats.page_changes,
        bounces = report.stats.edge_bounces,
        "replay finished"
    );
    report
}

/// Load everything `config` names and replay it.
///
/// # Errors
///
/// Returns an error if the deck, script or viewer configuration cannot be
/// loaded.
pub fn run(config: &ReplayConfig, on_frame: impl FnMut(&Frame)) -> anyhow::Result<SessionReport> {
    let deck = config.load_deck()?;
    let viewer_config = config.load_viewer_config()?;
    let script = Script::load(&config.script)?;
    tracing::debug!(
        slides = deck.len(),
        steps = script.steps.len(),
        "replay loaded"
    );

    let loader = FileLoader::new(config.asset_root());
    let mut viewer = SlideViewer::new(deck, viewer_config, config.viewport(), loader)?;
    Ok(run_script(
        &mut viewer,
        &script,
        config.frame_ms(),
        config.tail_ms,
        on_frame,
    ))
}

fn record_page(pages: &mut Vec<usize>, page: usize) {
    if pages.last() != Some(&page) {
        pages.push(page);
    }
}
