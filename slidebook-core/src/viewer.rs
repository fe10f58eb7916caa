//! # Slide Viewer
//!
//! Owns every component and wires them together:
//!
//! ```text
//! InputEvent ──► GestureClassifier ──► GestureEvent ──► ViewState
//!                                                          │
//!                       ┌──────────── ViewEffect ◄─────────┘
//!                       ▼
//!     MotionModel · Scheduler · PreloadCoordinator · stats
//!                       │
//!     tick(now) ────────┴──► Frame
//! ```
//!
//! Everything runs on the caller's thread. Input and ticks carry the caller's
//! millisecond clock; the viewer never reads a system clock.

use serde::{Deserialize, Serialize};

use crate::config::ViewerConfig;
use crate::deck::Deck;
use crate::event::{InputEvent, PointerEvent};
use crate::frame::{
    progress_dots, CounterState, Frame, LayerTransform, OutgoingLayer, VISIBLE_OPACITY,
};
use crate::geometry::Viewport;
use crate::gesture::{GestureClassifier, GestureContext};
use crate::motion::{ChannelId, MotionCommand, MotionModel};
use crate::preload::{PreloadCoordinator, PreloadStats, SlideLoader};
use crate::schedule::{Scheduler, TimerAction};
use crate::view::{ViewEffect, ViewState};
use crate::{SlideError, SlideResult};

/// Running totals of what happened in a session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewerStats {
    /// Committed page changes.
    pub page_changes: usize,
    /// Rejected navigations.
    pub edge_bounces: usize,
    /// Single taps recognised.
    pub taps: usize,
    /// Double taps recognised.
    pub double_taps: usize,
    /// Double-tap zoom sessions entered.
    pub zoom_entries: usize,
}

/// The interactive slide viewer.
pub struct SlideViewer<L: SlideLoader> {
    deck: Deck,
    config: ViewerConfig,
    classifier: GestureClassifier,
    view: ViewState,
    motion: MotionModel,
    scheduler: Scheduler,
    preloader: PreloadCoordinator,
    loader: L,
    outgoing_page: Option<usize>,
    now_ms: u64,
    last_tick_ms: Option<u64>,
    started: bool,
    stats: ViewerStats,
}

impl<L: SlideLoader> SlideViewer<L> {
    /// Create a viewer on page 0 and request the first preload window.
    ///
    /// # Errors
    ///
    /// Returns an error if `config` fails validation or `viewport` has a
    /// negative or non-finite extent.
    pub fn new(
        deck: Deck,
        config: ViewerConfig,
        viewport: Viewport,
        loader: L,
    ) -> SlideResult<Self> {
        config.validate()?;
        if !viewport.is_usable() {
            return Err(SlideError::InvalidViewport {
                width: viewport.width,
                height: viewport.height,
            });
        }

        let mut viewer = Self {
            classifier: GestureClassifier::new(config.gesture.clone(), &config.zoom),
            view: ViewState::new(deck.len(), viewport, config.clone()),
            motion: MotionModel::new(&config.motion),
            scheduler: Scheduler::new(),
            preloader: PreloadCoordinator::new(),
            loader,
            outgoing_page: None,
            now_ms: 0,
            last_tick_ms: None,
            started: false,
            stats: ViewerStats::default(),
            deck,
            config,
        };
        viewer.preloader.on_page(0, &viewer.deck, &mut viewer.loader);

        tracing::info!(
            slides = viewer.deck.len(),
            width = viewport.width,
            height = viewport.height,
            "viewer created"
        );
        Ok(viewer)
    }

    /// Feed one input event. Returns the effects it caused.
    pub fn handle_input(&mut self, event: &InputEvent) -> Vec<ViewEffect> {
        match event {
            InputEvent::Pointer(pointer) => self.handle_pointer(pointer),
            InputEvent::Key(key) => {
                let effects = self.view.handle_key(*key);
                self.apply(&effects);
                effects
            }
            InputEvent::Button(button) => {
                let effects = self.view.handle_button(*button);
                self.apply(&effects);
                effects
            }
            InputEvent::Resize(viewport) => {
                tracing::debug!(width = viewport.width, height = viewport.height, "resize");
                let effects = self.view.resize(*viewport);
                self.apply(&effects);
                effects
            }
        }
    }

    /// Feed a pointer sample.
    pub fn handle_pointer(&mut self, pointer: &PointerEvent) -> Vec<ViewEffect> {
        self.observe_clock(pointer.timestamp_ms);

        let mut effects = self.flush_pending_tap(pointer.timestamp_ms);
        let ctx = GestureContext {
            is_zoomed: self.view.is_zoomed(),
            viewport: self.view.viewport(),
        };
        if let Some(gesture) = self.classifier.on_pointer(pointer, &ctx) {
            tracing::debug!(gesture = gesture.name(), "gesture");
            let produced = self.view.handle_gesture(gesture);
            self.apply(&produced);
            effects.extend(produced);
        }
        effects
    }

    /// Advance timers and springs to `now_ms` and return the frame to paint.
    pub fn tick(&mut self, now_ms: u64) -> Frame {
        self.observe_clock(now_ms);
        self.flush_pending_tap(now_ms);

        for action in self.scheduler.drain_due(now_ms) {
            match action {
                TimerAction::ReleaseBounce => self
                    .motion
                    .apply(ChannelId::BounceX, MotionCommand::Animate(0.0)),
                TimerAction::HideCounter => self
                    .motion
                    .apply(ChannelId::CounterOpacity, MotionCommand::Animate(0.0)),
            }
        }

        let elapsed = self
            .last_tick_ms
            .map_or(0, |last| now_ms.saturating_sub(last))
            .min(self.config.motion.max_frame_ms);
        self.last_tick_ms = Some(now_ms);
        #[allow(clippy::cast_precision_loss)] // Clamped to a few frames
        self.motion.step(elapsed as f32 / 1000.0);

        if self.outgoing_page.is_some()
            && self.motion.channel(ChannelId::OutgoingOpacity).is_settled()
            && self.motion.value(ChannelId::OutgoingOpacity) < VISIBLE_OPACITY
        {
            self.outgoing_page = None;
        }

        self.frame()
    }

    /// Snapshot of the current visual state.
    #[must_use]
    pub fn frame(&self) -> Frame {
        let page = self.view.page();
        let page_count = self.deck.len();
        let current_slide = self.deck.get(page);

        let current = LayerTransform {
            translate_x: self.motion.value(ChannelId::PageX)
                + self.motion.value(ChannelId::BounceX)
                + self.motion.value(ChannelId::ZoomX),
            translate_y: self.motion.value(ChannelId::ZoomY),
            scale: self.motion.value(ChannelId::ZoomScale),
            opacity: self.motion.value(ChannelId::PageOpacity),
        };

        let outgoing = self.outgoing_page.and_then(|index| {
            let slide = self.deck.get(index)?;
            Some(OutgoingLayer {
                page: index,
                image: slide.image.clone(),
                transform: LayerTransform {
                    translate_x: self.motion.value(ChannelId::OutgoingX),
                    translate_y: 0.0,
                    scale: 1.0,
                    opacity: self.motion.value(ChannelId::OutgoingOpacity),
                },
            })
        });

        Frame {
            timestamp_ms: self.now_ms,
            page,
            page_count,
            display_number: page + 1,
            image: current_slide.map(|s| s.image.clone()).unwrap_or_default(),
            alt_text: current_slide.map(|s| s.alt_text.clone()).unwrap_or_default(),
            current,
            outgoing,
            counter: CounterState::new(
                page,
                page_count,
                self.motion.value(ChannelId::CounterOpacity),
            ),
            dots: progress_dots(page, page_count),
            is_zoomed: self.view.is_zoomed(),
            settled: self.motion.is_settled() && self.scheduler.is_empty(),
        }
    }

    /// The deck being shown.
    #[must_use]
    pub fn deck(&self) -> &Deck {
        &self.deck
    }

    /// Active configuration.
    #[must_use]
    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    /// Page, zoom and pan state.
    #[must_use]
    pub fn view(&self) -> &ViewState {
        &self.view
    }

    /// Spring channels.
    #[must_use]
    pub fn motion(&self) -> &MotionModel {
        &self.motion
    }

    /// Gesture classifier.
    #[must_use]
    pub fn classifier(&self) -> &GestureClassifier {
        &self.classifier
    }

    /// Current page (0-based).
    #[must_use]
    pub fn page(&self) -> usize {
        self.view.page()
    }

    /// Latest time seen on the caller's clock.
    #[must_use]
    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    /// Session totals.
    #[must_use]
    pub fn stats(&self) -> ViewerStats {
        self.stats
    }

    /// Preload totals.
    #[must_use]
    pub fn preload_stats(&self) -> PreloadStats {
        self.preloader.stats()
    }

    /// The slide loader.
    #[must_use]
    pub fn loader(&self) -> &L {
        &self.loader
    }

    /// Whether any animation or timer is still running.
    #[must_use]
    pub fn is_animating(&self) -> bool {
        !self.motion.is_settled() || !self.scheduler.is_empty()
    }

    fn observe_clock(&mut self, now_ms: u64) {
        self.now_ms = self.now_ms.max(now_ms);
        if !self.started {
            self.started = true;
            self.show_counter();
        }
    }

    fn flush_pending_tap(&mut self, now_ms: u64) -> Vec<ViewEffect> {
        let Some(tap) = self.classifier.poll(now_ms) else {
            return Vec::new();
        };
        let effects = self.view.handle_gesture(tap);
        self.apply(&effects);
        effects
    }

    fn show_counter(&mut self) {
        self.motion
            .apply(ChannelId::CounterOpacity, MotionCommand::Animate(1.0));
        self.scheduler.schedule(
            self.now_ms.saturating_add(self.config.feedback.counter_hide_ms),
            TimerAction::HideCounter,
        );
    }

    fn apply(&mut self, effects: &[ViewEffect]) {
        for effect in effects {
            match *effect {
                ViewEffect::Motion { channel, command } => self.motion.apply(channel, command),
                ViewEffect::PageCommitted { from, to, .. } => {
                    if self.classifier.active_pointers() > 0 {
                        self.classifier.abandon_session();
                    }
                    self.stats.page_changes += 1;
                    self.outgoing_page = Some(from);
                    self.preloader.on_page(to, &self.deck, &mut self.loader);
                    self.show_counter();
                }
                ViewEffect::PageTransition { direction } => {
                    let width = self.view.viewport().width;
                    self.motion.begin_page_transition(direction, width);
                }
                ViewEffect::EdgeBounce { .. } => {
                    self.stats.edge_bounces += 1;
                    self.scheduler.schedule(
                        self.now_ms.saturating_add(self.config.feedback.bounce_release_ms),
                        TimerAction::ReleaseBounce,
                    );
                }
                ViewEffect::TapDetected { .. } => self.stats.taps += 1,
                ViewEffect::DoubleTapDetected { .. } => self.stats.double_taps += 1,
                ViewEffect::ZoomEntered { .. } => self.stats.zoom_entries += 1,
                ViewEffect::ZoomExited => {}
            }
        }
    }
}

impl<L: SlideLoader> std::fmt::Debug for SlideViewer<L> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlideViewer")
            .field("page", &self.view.page())
            .field("slides", &self.deck.len())
            .field("is_zoomed", &self.view.is_zoomed())
            .field("now_ms", &self.now_ms)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{Key, NavButton};
    use crate::preload::NoopLoader;

    fn viewer(slides: usize) -> SlideViewer<NoopLoader> {
        let deck = Deck::numbered(slides, "slides/", ".png").expect("deck");
        SlideViewer::new(
            deck,
            ViewerConfig::default(),
            Viewport::new(300.0, 500.0),
            NoopLoader,
        )
        .expect("viewer")
    }

    fn run_until(viewer: &mut SlideViewer<NoopLoader>, from_ms: u64, to_ms: u64) -> Frame {
        let mut frame = viewer.tick(from_ms);
        let mut now = from_ms;
        while now < to_ms {
            now += 16;
            frame = viewer.tick(now);
        }
        frame
    }

    #[test]
    fn test_invalid_config_rejected() {
        let deck = Deck::numbered(2, "s", ".png").expect("deck");
        let mut config = ViewerConfig::default();
        config.motion.max_frame_ms = 0;
        assert!(SlideViewer::new(deck, config, Viewport::default(), NoopLoader).is_err());
    }

    #[test]
    fn test_counter_shows_then_hides() {
        let mut viewer = viewer(3);
        let frame = run_until(&mut viewer, 0, 500);
        assert!(frame.counter.visible);
        assert_eq!(frame.counter.label, "1 / 3");

        let frame = run_until(&mut viewer, 500, 3_500);
        assert!(!frame.counter.visible);
    }

    #[test]
    fn test_next_button_slides_pages() {
        let mut viewer = viewer(3);
        viewer.tick(0);
        viewer.handle_input(&InputEvent::Button(NavButton::Next));

        let frame = viewer.tick(16);
        assert_eq!(frame.page, 1);
        assert_eq!(frame.display_number, 2);
        assert_eq!(frame.dots, vec![false, true, false]);
        let outgoing = frame.outgoing.expect("outgoing layer");
        assert_eq!(outgoing.page, 0);
        assert!(frame.current.translate_x > 0.0);

        let frame = run_until(&mut viewer, 16, 2_000);
        assert!(frame.outgoing.is_none());
        assert!(frame.current.translate_x.abs() < 0.01);
        assert!((frame.current.opacity - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_bounce_releases_after_delay() {
        let mut viewer = viewer(3);
        viewer.tick(0);
        let effects = viewer.handle_input(&InputEvent::Key(Key::ArrowLeft));
        assert!(effects.contains(&ViewEffect::EdgeBounce { offset: -15.0 }));
        assert!(
            (viewer.motion().channel(ChannelId::BounceX).target() + 15.0).abs() < f32::EPSILON
        );

        viewer.tick(60);
        assert!(viewer.motion().channel(ChannelId::BounceX).target().abs() < f32::EPSILON);
        let frame = run_until(&mut viewer, 60, 1_500);
        assert!(frame.current.translate_x.abs() < 0.01);
        assert_eq!(viewer.stats().edge_bounces, 1);
    }

    #[test]
    fn test_unusable_viewport_rejected() {
        let deck = Deck::numbered(2, "s", ".png").expect("deck");
        let result = SlideViewer::new(
            deck,
            ViewerConfig::default(),
            Viewport::new(f32::NAN, 500.0),
            NoopLoader,
        );
        assert!(matches!(result, Err(SlideError::InvalidViewport { .. })));
    }

    #[test]
    fn test_timers_saturate_near_clock_limit() {
        let mut viewer = viewer(3);
        viewer.tick(u64::MAX - 10);
        viewer.handle_input(&InputEvent::Key(Key::ArrowLeft));
        viewer.handle_input(&InputEvent::Key(Key::ArrowRight));

        let frame = viewer.tick(u64::MAX);
        assert_eq!(frame.page, 1);
        assert_eq!(viewer.stats().edge_bounces, 1);
    }

    #[test]
    fn test_stalled_frame_is_clamped() {
        let mut viewer = viewer(3);
        viewer.tick(0);
        viewer.handle_input(&InputEvent::Button(NavButton::Next));
        let frame = viewer.tick(10_000);
        assert!(frame.current.translate_x.is_finite());
        assert!(frame.current.translate_x > 0.0);
    }
}
