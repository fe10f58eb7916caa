//! # View State Machine
//!
//! Authoritative page, zoom and pan state. Consumes gestures, keys and
//! buttons and answers with [`ViewEffect`]s: motion commands for the spring
//! channels plus transient signals (page commits, edge bounces, detected
//! taps) for the orchestrator.
//!
//! Rejected transitions are never errors: out-of-range navigation becomes an
//! edge bounce, out-of-range pans are clamped.

use serde::{Deserialize, Serialize};

use crate::config::ViewerConfig;
use crate::event::{GestureEvent, Key, NavButton};
use crate::geometry::{Point, Viewport, ZoomTransform};
use crate::gesture::{swipe_direction, tap_zone, TapZone};
use crate::motion::{ChannelId, MotionCommand};

/// Something the view machine asks the rest of the viewer to do.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "effect", rename_all = "snake_case")]
pub enum ViewEffect {
    /// Drive a motion channel.
    Motion {
        /// Channel to drive.
        channel: ChannelId,
        /// What to do with it.
        command: MotionCommand,
    },

    /// Start the slide-past transition for a committed page change.
    PageTransition {
        /// `+1` forward, `-1` back.
        direction: i8,
    },

    /// The current page changed.
    PageCommitted {
        /// Previous page (0-based).
        from: usize,
        /// New page (0-based).
        to: usize,
        /// `+1` forward, `-1` back.
        direction: i8,
    },

    /// Navigation past either end was rejected; the bounce channel was nudged.
    EdgeBounce {
        /// Nudge applied to the bounce channel, in pixels.
        offset: f32,
    },

    /// A single tap was recognised.
    TapDetected {
        /// Local X coordinate.
        x: f32,
        /// Local Y coordinate.
        y: f32,
    },

    /// A double tap was recognised.
    DoubleTapDetected {
        /// Local X coordinate.
        x: f32,
        /// Local Y coordinate.
        y: f32,
    },

    /// A double-tap zoom session started.
    ZoomEntered {
        /// Scale zoomed to.
        scale: f32,
    },

    /// The zoom transform returned to identity.
    ZoomExited,
}

/// Page, zoom and pan state for one deck.
#[derive(Debug, Clone)]
pub struct ViewState {
    page: usize,
    page_count: usize,
    navigation_direction: i8,
    zoom: ZoomTransform,
    is_zoomed: bool,
    pan_anchor: Point,
    viewport: Viewport,
    config: ViewerConfig,
}

impl ViewState {
    /// Start at page 0 with identity zoom.
    ///
    /// `page_count` must be at least 1; [`crate::Deck`] guarantees this.
    #[must_use]
    pub fn new(page_count: usize, viewport: Viewport, config: ViewerConfig) -> Self {
        Self {
            page: 0,
            page_count: page_count.max(1),
            navigation_direction: 0,
            zoom: ZoomTransform::IDENTITY,
            is_zoomed: false,
            pan_anchor: Point::default(),
            viewport,
            config,
        }
    }

    /// Current page (0-based).
    #[must_use]
    pub fn page(&self) -> usize {
        self.page
    }

    /// Number of pages.
    #[must_use]
    pub fn page_count(&self) -> usize {
        self.page_count
    }

    /// Direction of the last committed page change (`0` before any).
    #[must_use]
    pub fn navigation_direction(&self) -> i8 {
        self.navigation_direction
    }

    /// Current zoom transform.
    #[must_use]
    pub fn zoom(&self) -> ZoomTransform {
        self.zoom
    }

    /// Whether a double-tap zoom session is active.
    #[must_use]
    pub fn is_zoomed(&self) -> bool {
        self.is_zoomed
    }

    /// Offset captured at the start of the current pan.
    #[must_use]
    pub fn pan_anchor(&self) -> Point {
        self.pan_anchor
    }

    /// Current viewport.
    #[must_use]
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Route a classified gesture.
    pub fn handle_gesture(&mut self, gesture: GestureEvent) -> Vec<ViewEffect> {
        match gesture {
            GestureEvent::Tap { x, y } => self.tap(Point::new(x, y)),
            GestureEvent::DoubleTap { x, y } => self.double_tap(Point::new(x, y)),
            GestureEvent::DragUpdate { offset_x } => self.drag_update(offset_x),
            GestureEvent::DragEnd {
                offset_x,
                velocity_x,
            } => self.drag_end(offset_x, velocity_x),
            GestureEvent::PinchStart { .. } => self.pinch_start(),
            GestureEvent::PinchUpdate { scale, origin } => self.pinch_update(scale, origin),
            GestureEvent::PinchEnd => self.pinch_end(),
            GestureEvent::PanUpdate { dx, dy } => self.pan_update(dx, dy),
            GestureEvent::PanEnd => self.pan_end(),
        }
    }

    /// Arrow keys paginate; anything else is ignored.
    pub fn handle_key(&mut self, key: Key) -> Vec<ViewEffect> {
        match key {
            Key::ArrowLeft => self.paginate(-1),
            Key::ArrowRight => self.paginate(1),
            Key::Other => Vec::new(),
        }
    }

    /// Prev/next controls paginate.
    pub fn handle_button(&mut self, button: NavButton) -> Vec<ViewEffect> {
        match button {
            NavButton::Prev => self.paginate(-1),
            NavButton::Next => self.paginate(1),
        }
    }

    /// Move one page in `direction`, or bounce if that leaves the deck.
    pub fn paginate(&mut self, direction: i8) -> Vec<ViewEffect> {
        let direction = direction.signum();
        if direction == 0 {
            return Vec::new();
        }

        let target = if direction > 0 {
            self.page.checked_add(1).filter(|p| *p < self.page_count)
        } else {
            self.page.checked_sub(1)
        };

        let Some(target) = target else {
            let offset = self.config.feedback.bounce_distance_px * f32::from(direction);
            tracing::debug!(page = self.page, direction, offset, "edge bounce");
            return vec![
                ViewEffect::EdgeBounce { offset },
                ViewEffect::Motion {
                    channel: ChannelId::BounceX,
                    command: MotionCommand::Animate(offset),
                },
            ];
        };

        let from = self.page;
        self.page = target;
        self.navigation_direction = direction;
        tracing::info!(from, to = target, direction, "page committed");

        let mut effects = vec![
            ViewEffect::PageCommitted {
                from,
                to: target,
                direction,
            },
            ViewEffect::PageTransition { direction },
        ];
        effects.extend(self.reset_zoom(MotionCommand::Snap));
        effects
    }

    /// Finger-driven page offset while dragging.
    pub fn drag_update(&mut self, offset_x: f32) -> Vec<ViewEffect> {
        if self.is_zoomed {
            return Vec::new();
        }
        vec![ViewEffect::Motion {
            channel: ChannelId::PageX,
            command: MotionCommand::Snap(offset_x),
        }]
    }

    /// Decide whether a released drag turns the page.
    pub fn drag_end(&mut self, offset_x: f32, velocity_x: f32) -> Vec<ViewEffect> {
        let spring_back = ViewEffect::Motion {
            channel: ChannelId::PageX,
            command: MotionCommand::Animate(0.0),
        };
        if self.is_zoomed {
            return vec![spring_back];
        }

        match swipe_direction(offset_x, velocity_x, self.config.gesture.swipe_threshold) {
            Some(direction) => {
                let mut effects = self.paginate(direction);
                if !effects
                    .iter()
                    .any(|e| matches!(e, ViewEffect::PageCommitted { .. }))
                {
                    effects.push(spring_back);
                }
                effects
            }
            None => {
                tracing::debug!(offset_x, velocity_x, "swipe rejected");
                vec![spring_back]
            }
        }
    }

    /// Edge taps navigate unless zoomed; middle taps do nothing.
    pub fn tap(&mut self, at: Point) -> Vec<ViewEffect> {
        let mut effects = vec![ViewEffect::TapDetected { x: at.x, y: at.y }];
        if self.is_zoomed {
            return effects;
        }
        match tap_zone(at, &self.viewport, self.config.gesture.edge_zone_fraction) {
            TapZone::Back => effects.extend(self.paginate(-1)),
            TapZone::Forward => effects.extend(self.paginate(1)),
            TapZone::Middle => {}
        }
        effects
    }

    /// Toggle the double-tap zoom session.
    pub fn double_tap(&mut self, at: Point) -> Vec<ViewEffect> {
        let mut effects = vec![ViewEffect::DoubleTapDetected { x: at.x, y: at.y }];
        if self.is_zoomed {
            effects.extend(self.exit_zoom());
        } else {
            effects.extend(self.enter_zoom(at));
        }
        effects
    }

    /// Zoom to the double-tap scale keeping `origin` fixed.
    pub fn enter_zoom(&mut self, origin: Point) -> Vec<ViewEffect> {
        let scale = self.config.zoom.double_tap_scale;
        let anchored = ZoomTransform::anchored(scale, origin, &self.viewport);
        let offset = ZoomTransform::clamp_offset(scale, anchored.offset(), &self.viewport);

        self.zoom = ZoomTransform {
            scale,
            offset_x: offset.x,
            offset_y: offset.y,
        };
        self.is_zoomed = true;
        self.pan_anchor = offset;
        tracing::debug!(scale, offset_x = offset.x, offset_y = offset.y, "zoom entered");

        let mut effects = vec![ViewEffect::ZoomEntered { scale }];
        effects.extend(self.zoom_motion(MotionCommand::Animate));
        effects
    }

    /// Return to the identity transform.
    pub fn exit_zoom(&mut self) -> Vec<ViewEffect> {
        self.reset_zoom(MotionCommand::Animate)
    }

    /// A pinch took over: any drag offset springs home.
    pub fn pinch_start(&mut self) -> Vec<ViewEffect> {
        vec![ViewEffect::Motion {
            channel: ChannelId::PageX,
            command: MotionCommand::Animate(0.0),
        }]
    }

    /// Track the fingers: scale about the pinch origin.
    pub fn pinch_update(&mut self, scale: f32, origin: Point) -> Vec<ViewEffect> {
        let scale = scale.clamp(self.config.zoom.min_scale, self.config.zoom.max_scale);
        self.zoom = ZoomTransform::anchored(scale, origin, &self.viewport);
        self.zoom_motion(MotionCommand::Snap)
    }

    /// A released pinch always returns to identity.
    pub fn pinch_end(&mut self) -> Vec<ViewEffect> {
        self.exit_zoom()
    }

    /// Pan a zoomed page, clamped so it keeps covering the viewport.
    pub fn pan_update(&mut self, dx: f32, dy: f32) -> Vec<ViewEffect> {
        if !self.is_zoomed {
            return Vec::new();
        }
        let wanted = Point::new(self.pan_anchor.x + dx, self.pan_anchor.y + dy);
        let offset = ZoomTransform::clamp_offset(self.zoom.scale, wanted, &self.viewport);
        self.zoom.offset_x = offset.x;
        self.zoom.offset_y = offset.y;
        vec![
            ViewEffect::Motion {
                channel: ChannelId::ZoomX,
                command: MotionCommand::Snap(offset.x),
            },
            ViewEffect::Motion {
                channel: ChannelId::ZoomY,
                command: MotionCommand::Snap(offset.y),
            },
        ]
    }

    /// Rebase the pan anchor on the current offset.
    pub fn pan_end(&mut self) -> Vec<ViewEffect> {
        if self.is_zoomed {
            self.pan_anchor = self.zoom.offset();
        }
        Vec::new()
    }

    /// Adopt a new viewport, re-clamping any live pan.
    ///
    /// Viewports with negative or non-finite extents are ignored.
    pub fn resize(&mut self, viewport: Viewport) -> Vec<ViewEffect> {
        if !viewport.is_usable() {
            tracing::warn!(
                width = viewport.width,
                height = viewport.height,
                "ignoring unusable viewport"
            );
            return Vec::new();
        }
        self.viewport = viewport;
        if !self.is_zoomed {
            return Vec::new();
        }
        let offset = ZoomTransform::clamp_offset(self.zoom.scale, self.zoom.offset(), &viewport);
        self.zoom.offset_x = offset.x;
        self.zoom.offset_y = offset.y;
        self.pan_anchor =
            ZoomTransform::clamp_offset(self.zoom.scale, self.pan_anchor, &viewport);
        self.zoom_motion(MotionCommand::Animate)
    }

    fn reset_zoom(&mut self, command: fn(f32) -> MotionCommand) -> Vec<ViewEffect> {
        let was_zoomed = self.is_zoomed || !self.zoom.is_identity();
        self.zoom = ZoomTransform::IDENTITY;
        self.is_zoomed = false;
        self.pan_anchor = Point::default();

        let mut effects = Vec::with_capacity(4);
        if was_zoomed {
            tracing::debug!("zoom exited");
            effects.push(ViewEffect::ZoomExited);
        }
        effects.extend(self.zoom_motion(command));
        effects
    }

    fn zoom_motion(&self, command: fn(f32) -> MotionCommand) -> Vec<ViewEffect> {
        vec![
            ViewEffect::Motion {
                channel: ChannelId::ZoomScale,
                command: command(self.zoom.scale),
            },
            ViewEffect::Motion {
                channel: ChannelId::ZoomX,
                command: command(self.zoom.offset_x),
            },
            ViewEffect::Motion {
                channel: ChannelId::ZoomY,
                command: command(self.zoom.offset_y),
            },
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view(pages: usize) -> ViewState {
        ViewState::new(pages, Viewport::new(300.0, 500.0), ViewerConfig::default())
    }

    fn bounces(effects: &[ViewEffect]) -> Vec<f32> {
        effects
            .iter()
            .filter_map(|e| match e {
                ViewEffect::EdgeBounce { offset } => Some(*offset),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_paginate_forward_commits() {
        let mut view = view(3);
        let effects = view.paginate(1);
        assert_eq!(view.page(), 1);
        assert_eq!(view.navigation_direction(), 1);
        assert!(effects.contains(&ViewEffect::PageCommitted {
            from: 0,
            to: 1,
            direction: 1
        }));
        assert!(effects.contains(&ViewEffect::PageTransition { direction: 1 }));
    }

    #[test]
    fn test_paginate_back_at_start_bounces() {
        let mut view = view(3);
        let effects = view.paginate(-1);
        assert_eq!(view.page(), 0);
        assert_eq!(bounces(&effects), vec![-15.0]);
        assert!(effects.contains(&ViewEffect::Motion {
            channel: ChannelId::BounceX,
            command: MotionCommand::Animate(-15.0)
        }));
    }

    #[test]
    fn test_paginate_forward_at_end_bounces() {
        let mut view = view(2);
        view.paginate(1);
        let effects = view.paginate(1);
        assert_eq!(view.page(), 1);
        assert_eq!(bounces(&effects), vec![15.0]);
    }

    #[test]
    fn test_single_page_deck_always_bounces() {
        let mut view = view(1);
        assert_eq!(bounces(&view.paginate(1)).len(), 1);
        assert_eq!(bounces(&view.paginate(-1)).len(), 1);
        assert_eq!(view.page(), 0);
    }

    #[test]
    fn test_page_change_resets_zoom() {
        let mut view = view(3);
        view.enter_zoom(Point::new(50.0, 50.0));
        view.pan_update(-20.0, 10.0);
        assert!(view.is_zoomed());

        let effects = view.paginate(1);
        assert_eq!(view.zoom(), ZoomTransform::IDENTITY);
        assert!(!view.is_zoomed());
        assert_eq!(view.pan_anchor(), Point::default());
        assert!(effects.contains(&ViewEffect::ZoomExited));
        assert!(effects.contains(&ViewEffect::Motion {
            channel: ChannelId::ZoomScale,
            command: MotionCommand::Snap(1.0)
        }));
    }

    #[test]
    fn test_enter_then_exit_zoom_is_identity() {
        let mut view = view(3);
        view.double_tap(Point::new(120.0, 90.0));
        assert!(view.is_zoomed());
        assert!((view.zoom().scale - 2.0).abs() < f32::EPSILON);
        assert!((view.zoom().offset_x - 30.0).abs() < 1e-4);
        assert!((view.zoom().offset_y - 160.0).abs() < 1e-4);
        assert_eq!(view.pan_anchor(), view.zoom().offset());

        view.double_tap(Point::new(120.0, 90.0));
        assert!(!view.is_zoomed());
        assert_eq!(view.zoom(), ZoomTransform::IDENTITY);
    }

    #[test]
    fn test_swipe_scenario_turns_page() {
        let mut view = view(12);
        let effects = view.drag_end(-150.0, 80.0);
        assert_eq!(view.page(), 1);
        assert_eq!(view.navigation_direction(), 1);
        assert!(!effects.contains(&ViewEffect::Motion {
            channel: ChannelId::PageX,
            command: MotionCommand::Animate(0.0)
        }));
    }

    #[test]
    fn test_weak_swipe_springs_back() {
        let mut view = view(12);
        let effects = view.drag_end(-50.0, 100.0);
        assert_eq!(view.page(), 0);
        assert_eq!(
            effects,
            vec![ViewEffect::Motion {
                channel: ChannelId::PageX,
                command: MotionCommand::Animate(0.0)
            }]
        );
    }

    #[test]
    fn test_swipe_past_start_bounces_and_springs_back() {
        let mut view = view(12);
        let effects = view.drag_end(200.0, -300.0);
        assert_eq!(view.page(), 0);
        assert_eq!(bounces(&effects), vec![-15.0]);
        assert!(effects.contains(&ViewEffect::Motion {
            channel: ChannelId::PageX,
            command: MotionCommand::Animate(0.0)
        }));
    }

    #[test]
    fn test_middle_tap_does_not_navigate() {
        let mut view = view(3);
        let effects = view.tap(Point::new(150.0, 250.0));
        assert_eq!(effects, vec![ViewEffect::TapDetected { x: 150.0, y: 250.0 }]);
        assert_eq!(view.page(), 0);
    }

    #[test]
    fn test_edge_taps_navigate() {
        let mut view = view(3);
        view.tap(Point::new(290.0, 250.0));
        assert_eq!(view.page(), 1);
        view.tap(Point::new(10.0, 250.0));
        assert_eq!(view.page(), 0);
    }

    #[test]
    fn test_edge_taps_ignored_while_zoomed() {
        let mut view = view(3);
        view.enter_zoom(Point::new(150.0, 250.0));
        view.tap(Point::new(290.0, 250.0));
        assert_eq!(view.page(), 0);
        assert!(view.is_zoomed());
    }

    #[test]
    fn test_pinch_scenario() {
        let mut view = view(3);
        view.pinch_start();
        let effects = view.pinch_update(1.5, Point::new(50.0, 50.0));
        assert_eq!(effects.len(), 3);
        assert!(effects.contains(&ViewEffect::Motion {
            channel: ChannelId::ZoomScale,
            command: MotionCommand::Snap(1.5)
        }));
        let zoom = view.zoom();
        assert!((zoom.scale - 1.5).abs() < f32::EPSILON);
        assert!((zoom.offset_x - 50.0).abs() < 1e-4);
        assert!((zoom.offset_y - 100.0).abs() < 1e-4);
        assert!(!view.is_zoomed());

        view.pinch_end();
        assert_eq!(view.zoom(), ZoomTransform::IDENTITY);
    }

    #[test]
    fn test_pinch_release_ends_double_tap_zoom() {
        let mut view = view(3);
        view.enter_zoom(Point::new(150.0, 250.0));
        view.pinch_update(2.5, Point::new(100.0, 100.0));
        assert!(view.is_zoomed());
        view.pinch_end();
        assert!(!view.is_zoomed());
        assert_eq!(view.zoom(), ZoomTransform::IDENTITY);
    }

    #[test]
    fn test_pan_ignored_when_not_zoomed() {
        let mut view = view(3);
        assert!(view.pan_update(40.0, 40.0).is_empty());
        assert_eq!(view.zoom(), ZoomTransform::IDENTITY);
    }

    #[test]
    fn test_pan_rebases_anchor() {
        let mut view = view(3);
        view.enter_zoom(Point::new(150.0, 250.0));
        view.pan_update(30.0, -40.0);
        view.pan_end();
        assert_eq!(view.pan_anchor(), Point::new(30.0, -40.0));
        view.pan_update(10.0, 10.0);
        assert_eq!(view.zoom().offset(), Point::new(40.0, -30.0));
    }

    #[test]
    fn test_resize_reclamps_pan() {
        let mut view = view(3);
        view.enter_zoom(Point::new(150.0, 250.0));
        view.pan_update(150.0, 250.0);
        view.pan_end();
        let effects = view.resize(Viewport::new(100.0, 100.0));
        assert_eq!(view.zoom().offset(), Point::new(50.0, 50.0));
        assert_eq!(view.pan_anchor(), Point::new(50.0, 50.0));
        assert!(effects.contains(&ViewEffect::Motion {
            channel: ChannelId::ZoomX,
            command: MotionCommand::Animate(50.0)
        }));
    }

    #[test]
    fn test_unusable_resize_is_ignored() {
        let mut view = view(3);
        view.enter_zoom(Point::new(100.0, 100.0));
        let before = view.zoom();

        assert!(view.resize(Viewport::new(-10.0, 500.0)).is_empty());
        assert!(view.resize(Viewport::new(300.0, f32::NAN)).is_empty());
        assert!(view.resize(Viewport::new(f32::INFINITY, 500.0)).is_empty());
        assert_eq!(view.viewport(), Viewport::new(300.0, 500.0));
        assert_eq!(view.zoom(), before);

        view.pan_update(500.0, 500.0);
        assert!(view.zoom().offset_x <= 150.0);
    }

    #[test]
    fn test_keys_and_buttons() {
        let mut view = view(3);
        view.handle_key(Key::ArrowRight);
        view.handle_button(NavButton::Next);
        assert_eq!(view.page(), 2);
        view.handle_key(Key::ArrowLeft);
        assert_eq!(view.page(), 1);
        assert!(view.handle_key(Key::Other).is_empty());
        view.handle_button(NavButton::Prev);
        assert_eq!(view.page(), 0);
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn prop_pan_stays_within_limits(
                origin_x in 0.0f32..300.0,
                origin_y in 0.0f32..500.0,
                pans in prop::collection::vec((-2000.0f32..2000.0, -2000.0f32..2000.0, any::<bool>()), 0..20)
            ) {
                let mut view = view(3);
                view.enter_zoom(Point::new(origin_x, origin_y));
                let limit = ZoomTransform::pan_limit(view.zoom().scale, &view.viewport());

                for (dx, dy, release) in pans {
                    view.pan_update(dx, dy);
                    if release {
                        view.pan_end();
                    }
                    let offset = view.zoom().offset();
                    prop_assert!(offset.x.abs() <= limit.x + 1e-3, "x {} > {}", offset.x, limit.x);
                    prop_assert!(offset.y.abs() <= limit.y + 1e-3, "y {} > {}", offset.y, limit.y);
                }
            }

            #[test]
            fn prop_paginate_moves_or_bounces_once(
                pages in 1usize..20,
                moves in prop::collection::vec(prop_oneof![Just(-1i8), Just(1i8)], 0..40)
            ) {
                let mut view = view(pages);
                for direction in moves {
                    let before = view.page();
                    let effects = view.paginate(direction);
                    let bounced = bounces(&effects).len();
                    let in_range = before.checked_add_signed(isize::from(direction))
                        .is_some_and(|p| p < pages);

                    if in_range {
                        prop_assert_eq!(view.page(), before.wrapping_add_signed(isize::from(direction)));
                        prop_assert_eq!(bounced, 0);
                    } else {
                        prop_assert_eq!(view.page(), before);
                        prop_assert_eq!(bounced, 1);
                    }
                    prop_assert!(view.page() < pages);
                }
            }
        }
    }
}
