//! # Gesture Classifier
//!
//! Turns raw pointer streams into typed [`GestureEvent`]s. Each entry point
//! returns at most one event.
//!
//! ```text
//!  down ──► tentative tap ──(up, fast & still)──► pending tap ──(300 ms)──► Tap
//!    │                                                 └──(2nd tap)────────► DoubleTap
//!    ├──(move past slop, not zoomed)──► Dragging ──► DragUpdate … DragEnd
//!    ├──(move past slop, zoomed)──────► Panning  ──► PanUpdate  … PanEnd
//!    └──(second pointer down)─────────► Pinching ──► PinchStart, PinchUpdate … PinchEnd
//! ```
//!
//! Only one of dragging, panning or pinching owns the pointer stream at a
//! time. A pinch ends any drag or pan in the same call. After a pinch the
//! remaining finger stays inert until it is lifted.

use serde::{Deserialize, Serialize};

use crate::config::{GestureConfig, ZoomConfig};
use crate::event::{GestureEvent, PointerEvent, PointerPhase};
use crate::geometry::{Point, Viewport};

/// Which gesture currently owns the pointer stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GestureOwner {
    /// Nothing is being tracked beyond a possible tap.
    None,
    /// A horizontal page drag.
    Dragging,
    /// A two-finger pinch.
    Pinching,
    /// A one-finger pan over a zoomed page.
    Panning,
}

/// Viewer state the classifier needs when a gesture starts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureContext {
    /// Whether a double-tap zoom session is active.
    pub is_zoomed: bool,
    /// Current interaction surface.
    pub viewport: Viewport,
}

/// Where a tap landed horizontally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TapZone {
    /// Left edge zone: previous page.
    Back,
    /// Middle of the surface: no navigation.
    Middle,
    /// Right edge zone: next page.
    Forward,
}

/// Classify a local tap position into a navigation zone.
#[must_use]
pub fn tap_zone(local: Point, viewport: &Viewport, edge_fraction: f32) -> TapZone {
    let relative = viewport.relative_x(local);
    if relative < edge_fraction {
        TapZone::Back
    } else if relative > 1.0 - edge_fraction {
        TapZone::Forward
    } else {
        TapZone::Middle
    }
}

/// `|offset| * |velocity|`: how convincingly a drag asked for a page turn.
#[must_use]
pub fn swipe_score(offset_x: f32, velocity_x: f32) -> f32 {
    offset_x.abs() * velocity_x.abs()
}

/// Page direction requested by a released drag, if any.
///
/// Content dragged right (positive offset) asks for the previous page.
#[must_use]
pub fn swipe_direction(offset_x: f32, velocity_x: f32, threshold: f32) -> Option<i8> {
    if swipe_score(offset_x, velocity_x) > threshold {
        Some(if offset_x > 0.0 { -1 } else { 1 })
    } else {
        None
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Sample {
    time_ms: u64,
    x: f32,
}

/// Horizontal release-velocity estimate over a short sample horizon.
#[derive(Debug, Clone, Default)]
pub struct VelocityTracker {
    samples: Vec<Sample>,
}

/// Samples kept regardless of horizon.
const VELOCITY_HISTORY: usize = 20;

impl VelocityTracker {
    /// Create an empty tracker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a position at a time.
    pub fn add(&mut self, time_ms: u64, x: f32) {
        if self.samples.len() == VELOCITY_HISTORY {
            self.samples.remove(0);
        }
        self.samples.push(Sample { time_ms, x });
    }

    /// Velocity in pixels per second using samples within `horizon_ms` of the newest.
    #[must_use]
    #[allow(clippy::cast_precision_loss)] // Millisecond spans fit in f32
    pub fn velocity(&self, horizon_ms: u64) -> f32 {
        let Some(newest) = self.samples.last() else {
            return 0.0;
        };
        let oldest = self
            .samples
            .iter()
            .find(|s| newest.time_ms.saturating_sub(s.time_ms) <= horizon_ms)
            .unwrap_or(newest);
        let span_ms = newest.time_ms.saturating_sub(oldest.time_ms);
        if span_ms == 0 {
            return 0.0;
        }
        (newest.x - oldest.x) / span_ms as f32 * 1000.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct TrackedPointer {
    id: u32,
    position: Point,
    down_at: Point,
    /// Cleared when the pointer outlived a pinch; inert until lifted.
    armed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct TapSession {
    pointer_id: u32,
    start: Point,
    start_ms: u64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct AcceptedTap {
    at: Point,
    time_ms: u64,
}

#[derive(Debug, Clone)]
struct DragSession {
    pointer_id: u32,
    start_x: f32,
    offset_x: f32,
    velocity: VelocityTracker,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct PanSession {
    pointer_id: u32,
    start: Point,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct PinchSession {
    pointers: [u32; 2],
    initial_distance: f32,
    origin: Point,
}

/// The live gesture session; its variant is the [`GestureOwner`] tag.
#[derive(Debug, Clone)]
enum Session {
    Idle,
    Dragging(DragSession),
    Pinching(PinchSession),
    Panning(PanSession),
}

impl Session {
    fn owner(&self) -> GestureOwner {
        match self {
            Session::Idle => GestureOwner::None,
            Session::Dragging(_) => GestureOwner::Dragging,
            Session::Pinching(_) => GestureOwner::Pinching,
            Session::Panning(_) => GestureOwner::Panning,
        }
    }
}

/// Smallest finger separation accepted as a pinch baseline.
const MIN_PINCH_DISTANCE: f32 = 1.0;

/// Classifies pointer streams into gestures.
#[derive(Debug, Clone)]
pub struct GestureClassifier {
    config: GestureConfig,
    min_scale: f32,
    max_scale: f32,
    pointers: Vec<TrackedPointer>,
    session: Session,
    tap: Option<TapSession>,
    pending_tap: Option<AcceptedTap>,
}

impl GestureClassifier {
    /// Create a classifier with the given thresholds and zoom limits.
    #[must_use]
    pub fn new(config: GestureConfig, zoom: &ZoomConfig) -> Self {
        Self {
            config,
            min_scale: zoom.min_scale,
            max_scale: zoom.max_scale,
            pointers: Vec::with_capacity(2),
            session: Session::Idle,
            tap: None,
            pending_tap: None,
        }
    }

    /// Thresholds in use.
    #[must_use]
    pub fn config(&self) -> &GestureConfig {
        &self.config
    }

    /// Which gesture owns the pointer stream.
    #[must_use]
    pub fn owner(&self) -> GestureOwner {
        self.session.owner()
    }

    /// Whether a single tap is waiting out the double-tap window.
    #[must_use]
    pub fn has_pending_tap(&self) -> bool {
        self.pending_tap.is_some()
    }

    /// Number of pointers currently pressed.
    #[must_use]
    pub fn active_pointers(&self) -> usize {
        self.pointers.len()
    }

    /// Dispatch a pointer event by phase.
    pub fn on_pointer(
        &mut self,
        event: &PointerEvent,
        ctx: &GestureContext,
    ) -> Option<GestureEvent> {
        match event.phase {
            PointerPhase::Down => self.on_pointer_down(event, ctx),
            PointerPhase::Move => self.on_pointer_move(event, ctx),
            PointerPhase::Up => self.on_pointer_up(event, ctx),
            PointerPhase::Cancel => self.on_pointer_cancel(event),
        }
    }

    /// Emit a pending single tap once its double-tap window has lapsed.
    ///
    /// Nothing is emitted while a pointer is pressed: the pressed pointer
    /// either completes a tap, which resolves the pending one, or starts a
    /// drag, pan or pinch, which discards it.
    pub fn poll(&mut self, now_ms: u64) -> Option<GestureEvent> {
        if !self.pointers.is_empty() {
            return None;
        }
        let pending = self.pending_tap?;
        if now_ms.saturating_sub(pending.time_ms) > self.config.double_tap_window_ms {
            self.pending_tap = None;
            tracing::debug!(x = pending.at.x, y = pending.at.y, "tap");
            return Some(GestureEvent::Tap {
                x: pending.at.x,
                y: pending.at.y,
            });
        }
        None
    }

    /// Handle a pointer press.
    pub fn on_pointer_down(
        &mut self,
        event: &PointerEvent,
        ctx: &GestureContext,
    ) -> Option<GestureEvent> {
        if self.pointers.iter().any(|p| p.id == event.pointer_id) {
            return None;
        }
        let local = ctx.viewport.to_local(event.position());

        match self.pointers.len() {
            0 => {
                self.pointers.push(TrackedPointer {
                    id: event.pointer_id,
                    position: local,
                    down_at: local,
                    armed: true,
                });
                self.session = Session::Idle;
                self.tap = Some(TapSession {
                    pointer_id: event.pointer_id,
                    start: local,
                    start_ms: event.timestamp_ms,
                });
                None
            }
            1 => {
                let first = self.pointers[0];
                self.pointers.push(TrackedPointer {
                    id: event.pointer_id,
                    position: local,
                    down_at: local,
                    armed: true,
                });
                self.pointers[0].armed = true;
                Some(self.start_pinch(first, local, event.pointer_id))
            }
            _ => None,
        }
    }

    /// Handle pointer movement.
    pub fn on_pointer_move(
        &mut self,
        event: &PointerEvent,
        ctx: &GestureContext,
    ) -> Option<GestureEvent> {
        let local = ctx.viewport.to_local(event.position());
        let pointer = self.pointers.iter_mut().find(|p| p.id == event.pointer_id)?;
        pointer.position = local;
        let pointer = *pointer;
        if !pointer.armed {
            return None;
        }

        match &mut self.session {
            Session::Pinching(pinch) => {
                let pinch = *pinch;
                let positions = self.pinch_positions(&pinch)?;
                let distance = positions.0.distance_to(positions.1);
                let scale =
                    (distance / pinch.initial_distance).clamp(self.min_scale, self.max_scale);
                Some(GestureEvent::PinchUpdate {
                    scale,
                    origin: pinch.origin,
                })
            }
            Session::Dragging(drag) => {
                if drag.pointer_id != event.pointer_id {
                    return None;
                }
                drag.offset_x = local.x - drag.start_x;
                drag.velocity.add(event.timestamp_ms, local.x);
                Some(GestureEvent::DragUpdate {
                    offset_x: drag.offset_x,
                })
            }
            Session::Panning(pan) => {
                if pan.pointer_id != event.pointer_id {
                    return None;
                }
                Some(GestureEvent::PanUpdate {
                    dx: local.x - pan.start.x,
                    dy: local.y - pan.start.y,
                })
            }
            Session::Idle => self.maybe_start_drag_or_pan(pointer, event.timestamp_ms, ctx),
        }
    }

    /// Handle a pointer release.
    pub fn on_pointer_up(
        &mut self,
        event: &PointerEvent,
        ctx: &GestureContext,
    ) -> Option<GestureEvent> {
        let index = self.pointers.iter().position(|p| p.id == event.pointer_id)?;
        let pointer = self.pointers.remove(index);
        let local = ctx.viewport.to_local(event.position());

        match std::mem::replace(&mut self.session, Session::Idle) {
            Session::Pinching(_) => {
                for remaining in &mut self.pointers {
                    remaining.armed = false;
                }
                tracing::debug!("pinch ended");
                Some(GestureEvent::PinchEnd)
            }
            Session::Dragging(mut drag) if drag.pointer_id == pointer.id => {
                drag.offset_x = local.x - drag.start_x;
                drag.velocity.add(event.timestamp_ms, local.x);
                let velocity_x = drag.velocity.velocity(self.config.velocity_horizon_ms);
                tracing::debug!(offset_x = drag.offset_x, velocity_x, "drag ended");
                Some(GestureEvent::DragEnd {
                    offset_x: drag.offset_x,
                    velocity_x,
                })
            }
            Session::Panning(pan) if pan.pointer_id == pointer.id => {
                tracing::debug!("pan ended");
                Some(GestureEvent::PanEnd)
            }
            Session::Idle if pointer.armed => {
                self.finish_tap(pointer.id, local, event.timestamp_ms)
            }
            other => {
                self.session = other;
                None
            }
        }
    }

    /// Handle a platform cancel: end the session without navigating.
    pub fn on_pointer_cancel(&mut self, event: &PointerEvent) -> Option<GestureEvent> {
        let index = self.pointers.iter().position(|p| p.id == event.pointer_id)?;
        self.pointers.remove(index);
        self.tap = None;

        match std::mem::replace(&mut self.session, Session::Idle) {
            Session::Pinching(_) => {
                for remaining in &mut self.pointers {
                    remaining.armed = false;
                }
                Some(GestureEvent::PinchEnd)
            }
            Session::Dragging(drag) => Some(GestureEvent::DragEnd {
                offset_x: drag.offset_x,
                velocity_x: 0.0,
            }),
            Session::Panning(_) => Some(GestureEvent::PanEnd),
            Session::Idle => None,
        }
    }

    /// End whatever owns the pointer stream without emitting anything.
    ///
    /// Pressed pointers become inert until lifted. Used when the page changes
    /// underneath a live gesture. Returns the owner that was abandoned.
    pub fn abandon_session(&mut self) -> GestureOwner {
        let previous = std::mem::replace(&mut self.session, Session::Idle);
        self.tap = None;
        for pointer in &mut self.pointers {
            pointer.armed = false;
        }
        if previous.owner() != GestureOwner::None {
            tracing::debug!(abandoned = ?previous.owner(), "gesture abandoned");
        }
        previous.owner()
    }

    fn discard_pending_tap(&mut self) {
        if let Some(pending) = self.pending_tap.take() {
            tracing::debug!(x = pending.at.x, y = pending.at.y, "pending tap superseded");
        }
    }

    fn start_pinch(
        &mut self,
        first: TrackedPointer,
        second: Point,
        second_id: u32,
    ) -> GestureEvent {
        let initial_distance = first.position.distance_to(second).max(MIN_PINCH_DISTANCE);
        let origin = first.position.midpoint(second);
        let previous = std::mem::replace(
            &mut self.session,
            Session::Pinching(PinchSession {
                pointers: [first.id, second_id],
                initial_distance,
                origin,
            }),
        );
        self.tap = None;
        self.discard_pending_tap();
        tracing::debug!(
            origin_x = origin.x,
            origin_y = origin.y,
            initial_distance,
            superseded = ?previous.owner(),
            "pinch started"
        );
        GestureEvent::PinchStart { origin }
    }

    fn pinch_positions(&self, pinch: &PinchSession) -> Option<(Point, Point)> {
        let a = self.pointers.iter().find(|p| p.id == pinch.pointers[0])?;
        let b = self.pointers.iter().find(|p| p.id == pinch.pointers[1])?;
        Some((a.position, b.position))
    }

    fn maybe_start_drag_or_pan(
        &mut self,
        pointer: TrackedPointer,
        timestamp_ms: u64,
        ctx: &GestureContext,
    ) -> Option<GestureEvent> {
        let dx = pointer.position.x - pointer.down_at.x;
        let dy = pointer.position.y - pointer.down_at.y;
        let slop = self.config.tap_slop_px;
        if dx.abs() < slop && dy.abs() < slop {
            return None;
        }
        self.tap = None;
        self.discard_pending_tap();

        if ctx.is_zoomed {
            self.session = Session::Panning(PanSession {
                pointer_id: pointer.id,
                start: pointer.down_at,
            });
            tracing::debug!("pan started");
            return Some(GestureEvent::PanUpdate { dx, dy });
        }

        let mut velocity = VelocityTracker::new();
        velocity.add(timestamp_ms, pointer.position.x);
        self.session = Session::Dragging(DragSession {
            pointer_id: pointer.id,
            start_x: pointer.down_at.x,
            offset_x: dx,
            velocity,
        });
        tracing::debug!("drag started");
        Some(GestureEvent::DragUpdate { offset_x: dx })
    }

    fn finish_tap(
        &mut self,
        pointer_id: u32,
        release: Point,
        timestamp_ms: u64,
    ) -> Option<GestureEvent> {
        let tap = self.tap.take().filter(|t| t.pointer_id == pointer_id)?;
        let elapsed = timestamp_ms.saturating_sub(tap.start_ms);
        let slop = self.config.tap_slop_px;
        if elapsed >= self.config.tap_max_duration_ms
            || (release.x - tap.start.x).abs() >= slop
            || (release.y - tap.start.y).abs() >= slop
        {
            return None;
        }

        let accepted = AcceptedTap {
            at: tap.start,
            time_ms: timestamp_ms,
        };
        match self.pending_tap.take() {
            Some(previous)
                if timestamp_ms.saturating_sub(previous.time_ms)
                    <= self.config.double_tap_window_ms
                    && previous.at.distance_to(accepted.at) <= self.config.double_tap_radius_px =>
            {
                tracing::debug!(x = accepted.at.x, y = accepted.at.y, "double tap");
                Some(GestureEvent::DoubleTap {
                    x: accepted.at.x,
                    y: accepted.at.y,
                })
            }
            Some(previous) => {
                self.pending_tap = Some(accepted);
                tracing::debug!(x = previous.at.x, y = previous.at.y, "tap");
                Some(GestureEvent::Tap {
                    x: previous.at.x,
                    y: previous.at.y,
                })
            }
            None => {
                self.pending_tap = Some(accepted);
                None
            }
        }
    }
}
