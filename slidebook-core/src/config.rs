//! Tunable thresholds, spring parameters and feedback timings.
//!
//! Every field has a default matching the reference interaction feel, so a
//! partial JSON document only overrides what it names.

use serde::{Deserialize, Serialize};

use crate::{SlideError, SlideResult};

/// Parameters of a damped spring (unit mass).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpringParams {
    /// Spring constant. Higher values converge faster.
    pub stiffness: f32,
    /// Velocity damping coefficient.
    pub damping: f32,
}

impl SpringParams {
    /// Create spring parameters.
    #[must_use]
    pub const fn new(stiffness: f32, damping: f32) -> Self {
        Self { stiffness, damping }
    }

    /// The spring used by page, zoom and counter channels.
    #[must_use]
    pub const fn standard() -> Self {
        Self::new(300.0, 30.0)
    }

    /// The stiffer spring used by the edge-bounce pulse.
    #[must_use]
    pub const fn bounce() -> Self {
        Self::new(400.0, 25.0)
    }
}

impl Default for SpringParams {
    fn default() -> Self {
        Self::standard()
    }
}

/// Gesture classification thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureConfig {
    /// A tap must be released within this many milliseconds.
    pub tap_max_duration_ms: u64,
    /// A tap may move at most this far on each axis (exclusive).
    pub tap_slop_px: f32,
    /// Second tap must follow the first within this window.
    pub double_tap_window_ms: u64,
    /// Second tap must land within this distance of the first.
    pub double_tap_radius_px: f32,
    /// Fraction of the viewport width on each side that acts as a nav zone.
    pub edge_zone_fraction: f32,
    /// Minimum `|offset| * |velocity|` for a drag to turn the page.
    pub swipe_threshold: f32,
    /// Only pointer samples this recent contribute to release velocity.
    pub velocity_horizon_ms: u64,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            tap_max_duration_ms: 200,
            tap_slop_px: 10.0,
            double_tap_window_ms: 300,
            double_tap_radius_px: 30.0,
            edge_zone_fraction: 0.20,
            swipe_threshold: 10_000.0,
            velocity_horizon_ms: 100,
        }
    }
}

/// Zoom limits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoomConfig {
    /// Smallest scale a pinch may reach.
    pub min_scale: f32,
    /// Largest scale a pinch may reach.
    pub max_scale: f32,
    /// Scale entered by a double tap.
    pub double_tap_scale: f32,
}

impl Default for ZoomConfig {
    fn default() -> Self {
        Self {
            min_scale: 0.5,
            max_scale: 3.0,
            double_tap_scale: 2.0,
        }
    }
}

/// Spring parameters per channel family.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionConfig {
    /// Page slide, zoom, pan and counter channels.
    pub standard: SpringParams,
    /// Edge-bounce channel.
    pub bounce: SpringParams,
    /// Largest `dt` fed to the integrator in one tick, in milliseconds.
    pub max_frame_ms: u64,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            standard: SpringParams::standard(),
            bounce: SpringParams::bounce(),
            max_frame_ms: 64,
        }
    }
}

/// Transient UI feedback timings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedbackConfig {
    /// Magnitude of the edge-bounce nudge in pixels.
    pub bounce_distance_px: f32,
    /// Delay before the bounce channel is released back to zero.
    pub bounce_release_ms: u64,
    /// Delay after a page change before the counter fades out.
    pub counter_hide_ms: u64,
}

impl Default for FeedbackConfig {
    fn default() -> Self {
        Self {
            bounce_distance_px: 15.0,
            bounce_release_ms: 50,
            counter_hide_ms: 2_000,
        }
    }
}

/// Complete viewer configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Gesture thresholds.
    pub gesture: GestureConfig,
    /// Zoom limits.
    pub zoom: ZoomConfig,
    /// Spring parameters.
    pub motion: MotionConfig,
    /// Feedback timings.
    pub feedback: FeedbackConfig,
}

impl ViewerConfig {
    /// Parse a (possibly partial) JSON configuration and validate it.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or values are unusable.
    pub fn from_json(json: &str) -> SlideResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        if let Err(e) = config.validate() {
            tracing::warn!(error = %e, "rejected viewer configuration");
            return Err(e);
        }
        Ok(config)
    }

    /// Check that thresholds and limits are internally consistent.
    ///
    /// # Errors
    ///
    /// Returns [`SlideError::InvalidConfig`] describing the first problem found.
    pub fn validate(&self) -> SlideResult<()> {
        let zoom = &self.zoom;
        if !(zoom.min_scale > 0.0 && zoom.min_scale <= 1.0 && zoom.max_scale >= 1.0) {
            return Err(SlideError::InvalidConfig(format!(
                "zoom range [{}, {}] must be positive and contain 1.0",
                zoom.min_scale, zoom.max_scale
            )));
        }
        if !(zoom.min_scale..=zoom.max_scale).contains(&zoom.double_tap_scale) {
            return Err(SlideError::InvalidConfig(format!(
                "double-tap scale {} outside [{}, {}]",
                zoom.double_tap_scale, zoom.min_scale, zoom.max_scale
            )));
        }
        let edge = self.gesture.edge_zone_fraction;
        if !(0.0..0.5).contains(&edge) {
            return Err(SlideError::InvalidConfig(format!(
                "edge zone fraction {edge} must be in [0, 0.5)"
            )));
        }
        if self.gesture.tap_slop_px < 0.0 || self.gesture.double_tap_radius_px < 0.0 {
            return Err(SlideError::InvalidConfig(
                "tap distances must not be negative".to_string(),
            ));
        }
        for (name, spring) in [
            ("standard", self.motion.standard),
            ("bounce", self.motion.bounce),
        ] {
            if spring.stiffness <= 0.0 || spring.damping < 0.0 {
                return Err(SlideError::InvalidConfig(format!(
                    "{name} spring needs positive stiffness and non-negative damping"
                )));
            }
        }
        if self.motion.max_frame_ms == 0 {
            return Err(SlideError::InvalidConfig(
                "max_frame_ms must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
