//! Render-ready snapshot of the viewer, produced once per tick.

use serde::{Deserialize, Serialize};

use crate::deck::ImageRef;

/// Translation, scale and opacity of one image layer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayerTransform {
    /// Horizontal translation in pixels.
    pub translate_x: f32,
    /// Vertical translation in pixels.
    pub translate_y: f32,
    /// Scale about the viewport center.
    pub scale: f32,
    /// Opacity in `[0, 1]`.
    pub opacity: f32,
}

impl Default for LayerTransform {
    fn default() -> Self {
        Self {
            translate_x: 0.0,
            translate_y: 0.0,
            scale: 1.0,
            opacity: 1.0,
        }
    }
}

/// A page that is sliding out after a page change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutgoingLayer {
    /// Page being left (0-based).
    pub page: usize,
    /// Its image.
    pub image: ImageRef,
    /// Its transform.
    pub transform: LayerTransform,
}

/// The "n / N" page counter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CounterState {
    /// Text to display.
    pub label: String,
    /// Current opacity.
    pub opacity: f32,
    /// Whether the counter should be drawn at all.
    pub visible: bool,
}

/// Below this opacity a layer is not worth drawing.
pub const VISIBLE_OPACITY: f32 = 0.01;

impl CounterState {
    /// Counter for `page` (0-based) of `page_count` at `opacity`.
    #[must_use]
    pub fn new(page: usize, page_count: usize, opacity: f32) -> Self {
        Self {
            label: counter_label(page, page_count),
            opacity,
            visible: opacity > VISIBLE_OPACITY,
        }
    }
}

/// `"{n} / {N}"` with a one-based `n`.
#[must_use]
pub fn counter_label(page: usize, page_count: usize) -> String {
    format!("{} / {}", page + 1, page_count)
}

/// Progress dots: one flag per slide, set for the current page.
#[must_use]
pub fn progress_dots(page: usize, page_count: usize) -> Vec<bool> {
    (0..page_count).map(|i| i == page).collect()
}

/// Everything a presentation adapter needs to paint one frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    /// Viewer clock at which the frame was produced.
    pub timestamp_ms: u64,
    /// Current page (0-based).
    pub page: usize,
    /// Number of pages.
    pub page_count: usize,
    /// One-based page number for display.
    pub display_number: usize,
    /// Image of the current page.
    pub image: ImageRef,
    /// Accessible description of the current page.
    pub alt_text: String,
    /// Transform of the current page layer.
    pub current: LayerTransform,
    /// Page sliding out, while it is still visible.
    pub outgoing: Option<OutgoingLayer>,
    /// Page counter.
    pub counter: CounterState,
    /// Progress dots.
    pub dots: Vec<bool>,
    /// Whether a double-tap zoom session is active.
    pub is_zoomed: bool,
    /// Whether every animation has come to rest.
    pub settled: bool,
}
