//! Frame-stepped drivers for the card's horizontal displacement

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Integration step for the spring, in seconds
const SPRING_STEP: f64 = 0.001;
/// Displacement within this distance of the target counts as settled
const REST_DISPLACEMENT: f64 = 0.01;
/// Speed below this (points per second) counts as settled
const REST_SPEED: f64 = 2.0;
/// Longest stretch of spring time simulated by one step, in seconds
const MAX_SPRING_TIME: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpringParams {
    pub damping: f64,
    pub stiffness: f64,
    pub mass: f64,
}

impl Default for SpringParams {
    fn default() -> Self {
        Self {
            damping: 15.0,
            stiffness: 150.0,
            mass: 1.0,
        }
    }
}

/// Result of stepping an animation by one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Step {
    Running(f64),
    Finished(f64),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Animation {
    /// Fixed-duration move with ease-in-out
    Timing {
        from: f64,
        to: f64,
        duration: Duration,
        elapsed: Duration,
    },
    /// Damped spring toward `target`
    Spring {
        target: f64,
        velocity: f64,
        params: SpringParams,
    },
}

impl Animation {
    pub fn timing(from: f64, to: f64, duration: Duration) -> Self {
        Animation::Timing {
            from,
            to,
            duration,
            elapsed: Duration::ZERO,
        }
    }

    pub fn spring(target: f64, params: SpringParams) -> Self {
        Animation::Spring {
            target,
            velocity: 0.0,
            params,
        }
    }

    pub fn target(&self) -> f64 {
        match self {
            Animation::Timing { to, .. } => *to,
            Animation::Spring { target, .. } => *target,
        }
    }

    /// Advances the animation from `position` by `dt`
    pub fn step(&mut self, position: f64, dt: Duration) -> Step {
        match self {
            Animation::Timing {
                from,
                to,
                duration,
                elapsed,
            } => {
                *elapsed = elapsed.saturating_add(dt);
                if duration.is_zero() || *elapsed >= *duration {
                    return Step::Finished(*to);
                }
                let t = elapsed.as_secs_f64() / duration.as_secs_f64();
                Step::Running(*from + (*to - *from) * ease_in_out_quad(t))
            }
            Animation::Spring {
                target,
                velocity,
                params,
            } => {
                let mut x = position;
                let mut remaining = dt.as_secs_f64().min(MAX_SPRING_TIME);
                while remaining > 0.0 && !at_rest(x, *target, *velocity) {
                    let h = remaining.min(SPRING_STEP);
                    let accel =
                        (-params.stiffness * (x - *target) - params.damping * *velocity) / params.mass;
                    *velocity += accel * h;
                    x += *velocity * h;
                    remaining -= h;
                }

                if at_rest(x, *target, *velocity) {
                    *velocity = 0.0;
                    Step::Finished(*target)
                } else {
                    Step::Running(x)
                }
            }
        }
    }
}

fn at_rest(x: f64, target: f64, velocity: f64) -> bool {
    (x - target).abs() < REST_DISPLACEMENT && velocity.abs() < REST_SPEED
}

fn ease_in_out_quad(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        2.0 * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
    }
}
