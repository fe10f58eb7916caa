//! # Slidebook Core
//!
//! Interactive core of a full-screen, book-like slide viewer.
//! Pure state machines with no I/O: adapters feed input and a clock, and
//! paint the frames that come back.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │               slidebook-core                │
//! ├─────────────────────────────────────────────┤
//! │  Gesture Classifier │  View State Machine   │
//! │  - Tap / double tap │  - Page + direction   │
//! │  - Drag + velocity  │  - Zoom / pan clamps  │
//! │  - Pinch / pan      │  - Edge bounce        │
//! ├─────────────────────────────────────────────┤
//! │  Motion Model       │  Preload Coordinator  │
//! │  - Spring channels  │  - Look-ahead window  │
//! │  - Page transition  │  - Scheduler timers   │
//! └─────────────────────────────────────────────┘
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod deck;
pub mod error;
pub mod event;
pub mod frame;
pub mod geometry;
pub mod gesture;
pub mod motion;
pub mod preload;
pub mod schedule;
pub mod view;
pub mod viewer;

pub use config::{
    FeedbackConfig, GestureConfig, MotionConfig, SpringParams, ViewerConfig, ZoomConfig,
};
pub use deck::{Deck, ImageRef, ManifestEntry, Slide};
pub use error::{SlideError, SlideResult};
pub use event::{GestureEvent, InputEvent, Key, NavButton, PointerEvent, PointerPhase};
pub use frame::{CounterState, Frame, LayerTransform, OutgoingLayer};
pub use geometry::{Point, Viewport, ZoomTransform};
pub use gesture::{GestureClassifier, GestureContext, GestureOwner, TapZone};
pub use motion::{ChannelId, MotionChannel, MotionCommand, MotionModel};
pub use preload::{NoopLoader, PreloadCoordinator, PreloadStats, SlideLoader};
pub use schedule::{Scheduler, TimerAction};
pub use view::{ViewEffect, ViewState};
pub use viewer::{SlideViewer, ViewerStats};

/// Slidebook core version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
