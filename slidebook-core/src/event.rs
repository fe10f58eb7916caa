//! Input events fed to the viewer and gesture events produced from them.

use serde::{Deserialize, Serialize};

use crate::geometry::{Point, Viewport};

/// Phase of a pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointerPhase {
    /// Pointer pressed (finger down).
    Down,
    /// Pointer moved while pressed.
    Move,
    /// Pointer released (finger up).
    Up,
    /// Pointer stream cancelled by the platform (e.g. palm rejection).
    Cancel,
}

/// A single pointer or touch sample in client coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerEvent {
    /// Pointer identifier (for multi-touch).
    pub pointer_id: u32,
    /// Phase of this sample.
    pub phase: PointerPhase,
    /// X position in client coordinates.
    pub x: f32,
    /// Y position in client coordinates.
    pub y: f32,
    /// Timestamp in milliseconds on the viewer's clock.
    #[serde(default)]
    pub timestamp_ms: u64,
}

impl PointerEvent {
    /// Create a new pointer event.
    #[must_use]
    pub fn new(pointer_id: u32, phase: PointerPhase, x: f32, y: f32, timestamp_ms: u64) -> Self {
        Self {
            pointer_id,
            phase,
            x,
            y,
            timestamp_ms,
        }
    }

    /// Pointer-down for the primary pointer.
    #[must_use]
    pub fn down(x: f32, y: f32, timestamp_ms: u64) -> Self {
        Self::new(0, PointerPhase::Down, x, y, timestamp_ms)
    }

    /// Pointer-move for the primary pointer.
    #[must_use]
    pub fn moved(x: f32, y: f32, timestamp_ms: u64) -> Self {
        Self::new(0, PointerPhase::Move, x, y, timestamp_ms)
    }

    /// Pointer-up for the primary pointer.
    #[must_use]
    pub fn up(x: f32, y: f32, timestamp_ms: u64) -> Self {
        Self::new(0, PointerPhase::Up, x, y, timestamp_ms)
    }

    /// Same sample for a different pointer id.
    #[must_use]
    pub fn with_id(mut self, pointer_id: u32) -> Self {
        self.pointer_id = pointer_id;
        self
    }

    /// Position in client coordinates.
    #[must_use]
    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// Discrete keys the viewer reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Key {
    /// Previous page.
    ArrowLeft,
    /// Next page.
    ArrowRight,
    /// Any other key; ignored.
    Other,
}

impl Key {
    /// Map a DOM-style key name (`KeyboardEvent.key`) to a [`Key`].
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name {
            "ArrowLeft" | "Left" => Self::ArrowLeft,
            "ArrowRight" | "Right" => Self::ArrowRight,
            _ => Self::Other,
        }
    }
}

/// On-screen navigation controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NavButton {
    /// "Previous" control.
    Prev,
    /// "Next" control.
    Next,
}

/// All input events the viewer can receive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum InputEvent {
    /// Raw pointer or touch sample.
    Pointer(PointerEvent),
    /// Key pressed.
    Key(Key),
    /// Navigation button activated.
    Button(NavButton),
    /// The interaction surface was resized or moved.
    Resize(Viewport),
}

/// Typed gestures produced by the classifier.
///
/// Positions are viewport-local.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "gesture", content = "data")]
pub enum GestureEvent {
    /// Single tap, emitted once the double-tap window has lapsed.
    Tap {
        /// Local X coordinate.
        x: f32,
        /// Local Y coordinate.
        y: f32,
    },

    /// Second tap close enough in time and space to the previous one.
    DoubleTap {
        /// Local X coordinate.
        x: f32,
        /// Local Y coordinate.
        y: f32,
    },

    /// Horizontal drag in progress.
    DragUpdate {
        /// Horizontal displacement from the drag start.
        offset_x: f32,
    },

    /// Drag released.
    DragEnd {
        /// Horizontal displacement at release.
        offset_x: f32,
        /// Horizontal release velocity in pixels per second.
        velocity_x: f32,
    },

    /// A second pointer went down; any drag is cancelled.
    PinchStart {
        /// Finger midpoint in local coordinates.
        origin: Point,
    },

    /// Pinch distance changed.
    PinchUpdate {
        /// `d / d0`, clamped to the configured zoom range.
        scale: f32,
        /// Origin captured at pinch start.
        origin: Point,
    },

    /// One of the pinching pointers was lifted.
    PinchEnd,

    /// Single-pointer movement while zoomed.
    PanUpdate {
        /// Horizontal displacement from the pan start.
        dx: f32,
        /// Vertical displacement from the pan start.
        dy: f32,
    },

    /// Pan released.
    PanEnd,
}

impl GestureEvent {
    /// Short name for logging.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Tap { .. } => "tap",
            Self::DoubleTap { .. } => "double_tap",
            Self::DragUpdate { .. } => "drag_update",
            Self::DragEnd { .. } => "drag_end",
            Self::PinchStart { .. } => "pinch_start",
            Self::PinchUpdate { .. } => "pinch_update",
            Self::PinchEnd => "pinch_end",
            Self::PanUpdate { .. } => "pan_update",
            Self::PanEnd => "pan_end",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_from_name() {
        assert_eq!(Key::from_name("ArrowLeft"), Key::ArrowLeft);
        assert_eq!(Key::from_name("ArrowRight"), Key::ArrowRight);
        assert_eq!(Key::from_name("Escape"), Key::Other);
    }

    #[test]
    fn test_input_event_json_shape() {
        let event = InputEvent::Pointer(PointerEvent::down(10.0, 20.0, 5));
        let json = serde_json::to_string(&event).expect("serialize");
        assert!(json.contains(r#""type":"Pointer""#));
        assert!(json.contains(r#""phase":"down""#));

        let parsed: InputEvent =
            serde_json::from_str(r#"{"type":"Button","data":"next"}"#).expect("deserialize");
        assert_eq!(parsed, InputEvent::Button(NavButton::Next));
    }

    #[test]
    fn test_pointer_with_id() {
        let event = PointerEvent::moved(1.0, 2.0, 3).with_id(7);
        assert_eq!(event.pointer_id, 7);
        assert_eq!(event.phase, PointerPhase::Move);
        assert_eq!(event.position(), Point::new(1.0, 2.0));
    }
}
