use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{ClockError, Result};

/// Seconds in one revolution of the face.
pub const SECONDS_PER_TURN: f64 = 60.0;

/// Plain 24-bit colour. Hands treat it as an opaque token; only the drawing
/// surface interprets it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Mix `self` over `background` with the given opacity (0.0..=1.0).
    pub fn blend_over(self, background: Rgb, alpha: f64) -> Rgb {
        let a = alpha.clamp(0.0, 1.0);
        let mix = |fg: u8, bg: u8| (fg as f64 * a + bg as f64 * (1.0 - a)).round() as u8;
        Rgb::new(
            mix(self.r, background.r),
            mix(self.g, background.g),
            mix(self.b, background.b),
        )
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// One of the rotating indicators on the face.
///
/// Hands are fixed once configured; both timers only ever read them.
#[derive(Debug, Clone, PartialEq)]
pub struct Hand {
    color: Rgb,
    offset_seconds: f64,
}

impl Hand {
    pub fn new(color: Rgb, offset_seconds: f64) -> Result<Self> {
        if !offset_seconds.is_finite() || !(0.0..SECONDS_PER_TURN).contains(&offset_seconds) {
            return Err(ClockError::InvalidOffset(offset_seconds));
        }
        Ok(Self {
            color,
            offset_seconds,
        })
    }

    pub fn color(&self) -> Rgb {
        self.color
    }

    pub fn offset_seconds(&self) -> f64 {
        self.offset_seconds
    }

    /// Where this hand sits for a given base second, in `[0, 60)`.
    pub fn position(&self, base_seconds: f64) -> f64 {
        (base_seconds + self.offset_seconds).rem_euclid(SECONDS_PER_TURN)
    }

    /// The hand every single-hand display and fallback refers to.
    pub fn is_reference(&self) -> bool {
        self.offset_seconds == 0.0
    }
}

/// Red, blue, green and yellow hands, a quarter turn apart.
pub fn default_hands() -> Vec<Hand> {
    vec![
        Hand {
            color: Rgb::new(0xff, 0x4d, 0x4d),
            offset_seconds: 0.0,
        },
        Hand {
            color: Rgb::new(0x4d, 0xa3, 0xff),
            offset_seconds: 15.0,
        },
        Hand {
            color: Rgb::new(0x4d, 0xff, 0x88),
            offset_seconds: 30.0,
        },
        Hand {
            color: Rgb::new(0xff, 0xd2, 0x4d),
            offset_seconds: 45.0,
        },
    ]
}

/// Convert a wall-clock timestamp into the base second of the sweep.
pub fn base_seconds(now_ms: u64) -> f64 {
    (now_ms as f64 / 1000.0).rem_euclid(SECONDS_PER_TURN)
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum HandStyle {
    #[default]
    Straight,
    Tapered,
    Diamond,
    /// Straight silhouette pinned to the bold width.
    Bold,
    /// Straight silhouette pinned to a hairline width.
    Thin,
}

impl HandStyle {
    pub fn next(self) -> Self {
        match self {
            HandStyle::Straight => HandStyle::Tapered,
            HandStyle::Tapered => HandStyle::Diamond,
            HandStyle::Diamond => HandStyle::Bold,
            HandStyle::Bold => HandStyle::Thin,
            HandStyle::Thin => HandStyle::Straight,
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum HandWidth {
    Thin,
    #[default]
    Standard,
    Bold,
}

impl HandWidth {
    pub fn pixels(self) -> f64 {
        match self {
            HandWidth::Thin => 6.0,
            HandWidth::Standard => 8.0,
            HandWidth::Bold => 12.0,
        }
    }

    pub fn next(self) -> Self {
        match self {
            HandWidth::Thin => HandWidth::Standard,
            HandWidth::Standard => HandWidth::Bold,
            HandWidth::Bold => HandWidth::Thin,
        }
    }
}

/// Width actually used for a style; the legacy bold/thin styles ignore the
/// selected category.
pub fn effective_width(style: HandStyle, width: HandWidth) -> f64 {
    match style {
        HandStyle::Bold => 12.0,
        HandStyle::Thin => 4.0,
        _ => width.pixels(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_default_hands_are_quarter_turns() {
        let offsets: Vec<f64> = default_hands().iter().map(|h| h.offset_seconds()).collect();
        assert_eq!(offsets, vec![0.0, 15.0, 30.0, 45.0]);
        assert!(default_hands()[0].is_reference());
    }

    #[test]
    fn test_negative_offset_rejected() {
        assert_matches!(
            Hand::new(Rgb::new(1, 2, 3), -1.0),
            Err(ClockError::InvalidOffset(_))
        );
        assert_matches!(
            Hand::new(Rgb::new(1, 2, 3), 60.0),
            Err(ClockError::InvalidOffset(_))
        );
        assert!(Hand::new(Rgb::new(1, 2, 3), 59.5).is_ok());
    }

    #[test]
    fn test_position_wraps() {
        let hand = Hand::new(Rgb::new(0, 0, 0), 45.0).unwrap();
        assert_eq!(hand.position(20.0), 5.0);
        assert_eq!(hand.position(15.0), 0.0);
    }

    #[test]
    fn test_base_seconds() {
        assert_eq!(base_seconds(0), 0.0);
        assert_eq!(base_seconds(61_500), 1.5);
        assert_eq!(base_seconds(120_000), 0.0);
    }

    #[test]
    fn test_width_categories() {
        assert_eq!(effective_width(HandStyle::Straight, HandWidth::Thin), 6.0);
        assert_eq!(effective_width(HandStyle::Tapered, HandWidth::Standard), 8.0);
        assert_eq!(effective_width(HandStyle::Diamond, HandWidth::Bold), 12.0);
        assert_eq!(effective_width(HandStyle::Bold, HandWidth::Thin), 12.0);
        assert_eq!(effective_width(HandStyle::Thin, HandWidth::Bold), 4.0);
    }

    #[test]
    fn test_style_cycle_returns_to_start() {
        let mut style = HandStyle::Straight;
        for _ in 0..5 {
            style = style.next();
        }
        assert_eq!(style, HandStyle::Straight);
        assert_eq!(HandStyle::Diamond.to_string(), "diamond");
    }

    #[test]
    fn test_blend() {
        let white = Rgb::new(255, 255, 255);
        let black = Rgb::new(0, 0, 0);
        assert_eq!(white.blend_over(black, 0.5), Rgb::new(128, 128, 128));
        assert_eq!(white.blend_over(black, 1.0), white);
        assert_eq!(white.to_string(), "#ffffff");
    }
}
