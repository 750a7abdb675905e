//! Swipe-to-mark-seen sessions over a person's filmography
//!
//! A [`SwipeSession`] freezes the unseen part of a filmography into a deck at
//! construction and walks a cursor through it, one gesture at a time. Right
//! swipes are reported to a [`SeenSink`]; left swipes report nothing.

use serde::{Deserialize, Serialize};
use std::time::Duration;

pub mod animation;
pub mod registry;
pub mod session;
pub mod sink;
pub mod stack;

pub use animation::SpringParams;
pub use registry::{HostedSession, SessionRegistry};
pub use session::{
    CardView, CompletionSummary, Decision, GesturePhase, Release, SessionView, SwipeDirection,
    SwipeSession,
};
pub use sink::{NoFeedback, SeenSink, TactileFeedback};
pub use stack::CardTransform;

/// Tunables for gesture thresholds and card animations
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SwipeConfig {
    /// Width of the screen the deck is rendered on, in points
    pub screen_width: f64,
    /// Fraction of the screen width a drag must pass to commit
    pub commit_fraction: f64,
    /// Release speed (points per second) that commits regardless of distance
    pub velocity_threshold: f64,
    /// Exit distance as a multiple of the screen width
    pub exit_multiplier: f64,
    /// Duration of the exit animation
    pub exit_duration: Duration,
    /// Spring used to return a card below the threshold
    pub return_spring: SpringParams,
}

impl SwipeConfig {
    pub fn with_screen_width(screen_width: f64) -> Self {
        Self {
            screen_width,
            ..Self::default()
        }
    }

    pub fn commit_distance(&self) -> f64 {
        self.screen_width * self.commit_fraction
    }

    pub fn exit_distance(&self) -> f64 {
        self.screen_width * self.exit_multiplier
    }
}

impl Default for SwipeConfig {
    fn default() -> Self {
        Self {
            screen_width: 390.0,
            commit_fraction: 0.4,
            velocity_threshold: 500.0,
            exit_multiplier: 1.5,
            exit_duration: Duration::from_millis(300),
            return_spring: SpringParams::default(),
        }
    }
}
