//! Ghost-hand selection.
//!
//! The ghost marks where a hand stood at a trigger moment (a lap tap, a
//! phase change). It is computed only at those moments and then drawn frozen
//! until the next trigger.

use crate::hand::{Hand, Rgb, SECONDS_PER_TURN};

/// Seconds after the top that still count as "arriving".
pub const WINDOW_AFTER_TOP: f64 = 2.0;
/// Seconds before the top that count as "arriving".
pub const WINDOW_BEFORE_TOP: f64 = 15.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GhostHandTarget {
    angular_position_seconds: f64,
    color: Rgb,
    offset_seconds: f64,
}

impl GhostHandTarget {
    fn new(position: f64, hand: &Hand) -> Self {
        Self {
            angular_position_seconds: position.rem_euclid(SECONDS_PER_TURN),
            color: hand.color(),
            offset_seconds: hand.offset_seconds(),
        }
    }

    /// Frozen position on the face, always in `[0, 60)`.
    pub fn angular_position_seconds(&self) -> f64 {
        self.angular_position_seconds
    }

    pub fn color(&self) -> Rgb {
        self.color
    }

    /// Offset of the hand this target was taken from, so a session can keep
    /// following the same hand.
    pub fn offset_seconds(&self) -> f64 {
        self.offset_seconds
    }

    /// Re-freeze the same hand at a new base second.
    pub fn advanced_to(&self, base_seconds: f64) -> Self {
        Self {
            angular_position_seconds: (base_seconds + self.offset_seconds)
                .rem_euclid(SECONDS_PER_TURN),
            ..*self
        }
    }
}

fn in_window(position: f64) -> bool {
    position <= WINDOW_AFTER_TOP || position >= SECONDS_PER_TURN - WINDOW_BEFORE_TOP
}

fn distance_in_window(position: f64) -> f64 {
    if position <= WINDOW_AFTER_TOP {
        position
    } else {
        SECONDS_PER_TURN - position
    }
}

/// Pick the hand arriving at the top soonest.
///
/// Hands inside the approach window compete on distance to the top, the
/// first hand in iteration order winning ties. When no hand is in the window
/// the nearest hand overall wins and the target snaps to exactly `0`.
/// In single-hand mode the reference hand is returned at its true position.
///
/// Returns `None` only for an empty hand list.
pub fn select_ghost_hand(
    hands: &[Hand],
    base_seconds: f64,
    single_hand: bool,
) -> Option<GhostHandTarget> {
    if single_hand {
        let reference = hands.iter().find(|h| h.is_reference()).or(hands.first())?;
        return Some(GhostHandTarget::new(
            reference.position(base_seconds),
            reference,
        ));
    }

    let mut best: Option<(f64, &Hand, f64)> = None;
    for hand in hands {
        let position = hand.position(base_seconds);
        if !in_window(position) {
            continue;
        }
        let distance = distance_in_window(position);
        if best.map_or(true, |(d, _, _)| distance < d) {
            best = Some((distance, hand, position));
        }
    }
    if let Some((_, hand, position)) = best {
        return Some(GhostHandTarget::new(position, hand));
    }

    let mut closest: Option<(f64, &Hand)> = None;
    for hand in hands {
        let position = hand.position(base_seconds);
        let distance = position.min(SECONDS_PER_TURN - position);
        if closest.map_or(true, |(d, _)| distance < d) {
            closest = Some((distance, hand));
        }
    }
    closest.map(|(_, hand)| GhostHandTarget::new(0.0, hand))
}
