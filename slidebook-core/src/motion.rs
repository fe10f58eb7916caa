//! # Motion Model
//!
//! Continuous values (page slide, zoom, pan, edge bounce, counter fade) that
//! converge toward targets under a damped spring:
//!
//! ```text
//! a = stiffness * (target - current) - damping * velocity
//! ```
//!
//! Integration is semi-implicit Euler with bounded sub-steps so large frame
//! gaps stay stable. Retargeting keeps position and velocity, so a new target
//! mid-flight never produces a jump.

use serde::{Deserialize, Serialize};

use crate::config::{MotionConfig, SpringParams};

/// Largest integration step in seconds.
const MAX_SUBSTEP_SECS: f32 = 1.0 / 240.0;

/// Distance from target below which a channel may settle.
const SETTLE_EPSILON: f32 = 0.01;

/// Speed below which a channel may settle (units per second).
const SETTLE_VELOCITY: f32 = 0.01;

/// A single spring-driven scalar.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionChannel {
    current: f32,
    target: f32,
    velocity: f32,
    spring: SpringParams,
}

impl MotionChannel {
    /// Create a channel at rest at `value`.
    #[must_use]
    pub fn new(value: f32, spring: SpringParams) -> Self {
        Self {
            current: value,
            target: value,
            velocity: 0.0,
            spring,
        }
    }

    /// Current (displayed) value.
    #[must_use]
    pub fn value(&self) -> f32 {
        self.current
    }

    /// Value the channel is converging to.
    #[must_use]
    pub fn target(&self) -> f32 {
        self.target
    }

    /// Current velocity in units per second.
    #[must_use]
    pub fn velocity(&self) -> f32 {
        self.velocity
    }

    /// Spring parameters.
    #[must_use]
    pub fn spring(&self) -> SpringParams {
        self.spring
    }

    /// Retarget without touching position or velocity.
    pub fn set_target(&mut self, target: f32) {
        self.target = target;
    }

    /// Pin current and target to `value` and stop (finger-driven values).
    pub fn snap(&mut self, value: f32) {
        self.current = value;
        self.target = value;
        self.velocity = 0.0;
    }

    /// Restart from `from` at rest and animate to `to`.
    pub fn launch(&mut self, from: f32, to: f32) {
        self.current = from;
        self.target = to;
        self.velocity = 0.0;
    }

    /// Whether the channel is at rest on its target.
    #[must_use]
    pub fn is_settled(&self) -> bool {
        (self.target - self.current).abs() < SETTLE_EPSILON && self.velocity.abs() < SETTLE_VELOCITY
    }

    /// Advance by `dt` seconds. Returns the new value.
    pub fn step(&mut self, dt: f32) -> f32 {
        let mut remaining = dt.max(0.0);
        while remaining > 0.0 {
            let h = remaining.min(MAX_SUBSTEP_SECS);
            let acceleration = self.spring.stiffness * (self.target - self.current)
                - self.spring.damping * self.velocity;
            self.velocity += acceleration * h;
            self.current += self.velocity * h;
            remaining -= h;
        }
        if (self.target - self.current).abs() < SETTLE_EPSILON
            && self.velocity.abs() < SETTLE_EPSILON * 10.0
        {
            self.current = self.target;
            self.velocity = 0.0;
        }
        self.current
    }
}

/// Identifies one animated value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelId {
    /// Horizontal offset of the current page (drag and enter transition).
    PageX,
    /// Opacity of the current page.
    PageOpacity,
    /// Horizontal offset of the page being navigated away from.
    OutgoingX,
    /// Opacity of the page being navigated away from.
    OutgoingOpacity,
    /// Zoom scale.
    ZoomScale,
    /// Zoom/pan horizontal offset.
    ZoomX,
    /// Zoom/pan vertical offset.
    ZoomY,
    /// Edge-bounce nudge.
    BounceX,
    /// Page counter opacity.
    CounterOpacity,
}

impl ChannelId {
    /// Every channel, in storage order.
    pub const ALL: [ChannelId; 9] = [
        ChannelId::PageX,
        ChannelId::PageOpacity,
        ChannelId::OutgoingX,
        ChannelId::OutgoingOpacity,
        ChannelId::ZoomScale,
        ChannelId::ZoomX,
        ChannelId::ZoomY,
        ChannelId::BounceX,
        ChannelId::CounterOpacity,
    ];

    const fn slot(self) -> usize {
        self as usize
    }
}

/// What to do with a channel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum MotionCommand {
    /// Spring toward the value.
    Animate(f32),
    /// Jump to the value and stay there.
    Snap(f32),
}

/// The set of channels backing one viewer.
#[derive(Debug, Clone)]
pub struct MotionModel {
    channels: [MotionChannel; 9],
}

impl MotionModel {
    /// Create the model with every channel at its resting value.
    #[must_use]
    pub fn new(config: &MotionConfig) -> Self {
        let channels = ChannelId::ALL.map(|id| {
            let (value, spring) = match id {
                ChannelId::PageOpacity | ChannelId::ZoomScale => (1.0, config.standard),
                ChannelId::BounceX => (0.0, config.bounce),
                _ => (0.0, config.standard),
            };
            MotionChannel::new(value, spring)
        });
        Self { channels }
    }

    /// Borrow a channel.
    #[must_use]
    pub fn channel(&self, id: ChannelId) -> &MotionChannel {
        &self.channels[id.slot()]
    }

    /// Current value of a channel.
    #[must_use]
    pub fn value(&self, id: ChannelId) -> f32 {
        self.channel(id).value()
    }

    /// Apply a command to a channel.
    pub fn apply(&mut self, id: ChannelId, command: MotionCommand) {
        let channel = &mut self.channels[id.slot()];
        match command {
            MotionCommand::Animate(target) => channel.set_target(target),
            MotionCommand::Snap(value) => channel.snap(value),
        }
    }

    /// Start the slide-past transition for a page change in `direction`.
    ///
    /// The outgoing layer leaves from wherever the page currently sits toward
    /// `-direction * width` while fading out; the incoming page enters from
    /// `+direction * width` and fades in.
    pub fn begin_page_transition(&mut self, direction: i8, width: f32) {
        let sign = f32::from(direction.signum());
        let page_x = self.value(ChannelId::PageX);
        let page_opacity = self.value(ChannelId::PageOpacity);

        self.channels[ChannelId::OutgoingX.slot()].launch(page_x, -sign * width);
        self.channels[ChannelId::OutgoingOpacity.slot()].launch(page_opacity, 0.0);
        self.channels[ChannelId::PageX.slot()].launch(sign * width, 0.0);
        self.channels[ChannelId::PageOpacity.slot()].launch(0.0, 1.0);
    }

    /// Advance every channel by `dt` seconds.
    pub fn step(&mut self, dt: f32) {
        for channel in &mut self.channels {
            channel.step(dt);
        }
        tracing::trace!(
            page_x = self.value(ChannelId::PageX),
            scale = self.value(ChannelId::ZoomScale),
            bounce = self.value(ChannelId::BounceX),
            "motion step"
        );
    }

    /// Whether every channel is at rest.
    #[must_use]
    pub fn is_settled(&self) -> bool {
        self.channels.iter().all(MotionChannel::is_settled)
    }
}

impl Default for MotionModel {
    fn default() -> Self {
        Self::new(&MotionConfig::default())
    }
}
