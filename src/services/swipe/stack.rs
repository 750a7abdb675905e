//! Visual transforms for the rendered card stack
//!
//! Only the top card follows the gesture. Cards behind it derive their pose
//! from their depth and from how far the top card has travelled, so a
//! partial drag eases them toward the next slot up without any direct
//! gesture coupling.

use serde::{Deserialize, Serialize};

/// Maximum rotation of the top card at one screen width of travel, in degrees
const MAX_ROTATION_DEG: f64 = 15.0;
/// Scale lost per level of depth
const DEPTH_SCALE_STEP: f64 = 0.05;
/// Vertical offset per level of depth, in points
const DEPTH_OFFSET_STEP: f64 = 10.0;
/// Label opacity reaches 1 at this fraction of the screen width
const LABEL_FULL_FRACTION: f64 = 0.4;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CardTransform {
    pub translate_x: f64,
    pub translate_y: f64,
    pub rotate_deg: f64,
    pub scale: f64,
    /// Opacity of the SEEN stamp (right drag)
    pub seen_label_opacity: f64,
    /// Opacity of the SKIP stamp (left drag)
    pub skip_label_opacity: f64,
}

impl CardTransform {
    pub const REST: CardTransform = CardTransform {
        translate_x: 0.0,
        translate_y: 0.0,
        rotate_deg: 0.0,
        scale: 1.0,
        seen_label_opacity: 0.0,
        skip_label_opacity: 0.0,
    };

    /// Pose of the card under the user's finger
    pub fn top(displacement: f64, screen_width: f64) -> Self {
        if screen_width <= 0.0 {
            return Self {
                translate_x: displacement,
                ..Self::REST
            };
        }

        let label_span = screen_width * LABEL_FULL_FRACTION;
        Self {
            translate_x: displacement,
            translate_y: 0.0,
            rotate_deg: displacement / screen_width * MAX_ROTATION_DEG,
            scale: 1.0,
            seen_label_opacity: (displacement / label_span).clamp(0.0, 1.0),
            skip_label_opacity: (-displacement / label_span).clamp(0.0, 1.0),
        }
    }

    /// Pose of a card `depth` levels below the top card
    pub fn behind(depth: usize, displacement: f64, screen_width: f64) -> Self {
        let depth = depth as f64;
        let progress = if screen_width > 0.0 {
            (displacement.abs() / screen_width).clamp(0.0, 1.0)
        } else {
            0.0
        };

        Self {
            translate_x: 0.0,
            translate_y: DEPTH_OFFSET_STEP * (depth - progress),
            rotate_deg: 0.0,
            scale: 1.0 - DEPTH_SCALE_STEP * (depth - progress),
            seen_label_opacity: 0.0,
            skip_label_opacity: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const W: f64 = 400.0;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_top_at_rest() {
        assert_eq!(CardTransform::top(0.0, W), CardTransform::REST);
    }

    #[test]
    fn test_top_rotation_follows_drag() {
        assert!(approx(CardTransform::top(W, W).rotate_deg, 15.0));
        assert!(approx(CardTransform::top(-W / 2.0, W).rotate_deg, -7.5));
    }

    #[test]
    fn test_top_labels() {
        let right = CardTransform::top(80.0, W);
        assert!(approx(right.seen_label_opacity, 0.5));
        assert_eq!(right.skip_label_opacity, 0.0);

        let far_left = CardTransform::top(-300.0, W);
        assert_eq!(far_left.skip_label_opacity, 1.0);
        assert_eq!(far_left.seen_label_opacity, 0.0);
    }

    #[test]
    fn test_behind_rest_positions() {
        let first = CardTransform::behind(1, 0.0, W);
        assert!(approx(first.scale, 0.95));
        assert!(approx(first.translate_y, 10.0));

        let second = CardTransform::behind(2, 0.0, W);
        assert!(approx(second.scale, 0.90));
        assert!(approx(second.translate_y, 20.0));
    }

    #[test]
    fn test_behind_moves_up_one_slot_at_full_width() {
        let first = CardTransform::behind(1, -W, W);
        assert!(approx(first.scale, 1.0));
        assert!(approx(first.translate_y, 0.0));
    }

    #[test]
    fn test_behind_clamps_past_full_width() {
        let exit = CardTransform::behind(2, W * 1.5, W);
        assert!(approx(exit.scale, 0.95));
        assert!(approx(exit.translate_y, 10.0));
    }

    #[test]
    fn test_behind_ignores_direction() {
        assert_eq!(
            CardTransform::behind(1, 120.0, W),
            CardTransform::behind(1, -120.0, W)
        );
    }
}
