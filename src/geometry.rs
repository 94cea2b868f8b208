//! Hand silhouettes.
//!
//! Every shape is built around the rotation origin with the hand pointing
//! "up" (towards negative y, the canvas convention). Callers rotate and
//! translate with [`place`].

use std::f64::consts::PI;

use crate::error::{ClockError, Result};
use crate::hand::{effective_width, HandStyle, HandWidth};

/// Extra units the black border adds on each side of a hand.
const BORDER: f64 = 1.0;
/// Extra units the neutral ghost halo adds across the full width.
const GHOST_HALO: f64 = 3.0;

const TAPER_BASE_MULTIPLIER: f64 = 1.4;
const TAPER_TIP_FRACTION: f64 = 0.2;
const DIAMOND_HEAD_WIDTH: f64 = 1.2;
const DIAMOND_HEAD_LENGTH: f64 = 5.0;

/// Arc segments used when a capsule is flattened into a polygon.
pub const CAP_SEGMENTS: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum HandShape {
    /// Rounded bar of constant width from the origin to `length`.
    Capsule { width: f64, length: f64 },
    /// Closed, non-self-intersecting polygon.
    Polygon(Vec<Point>),
}

impl HandShape {
    /// Flatten into a closed polygon (capsules get `cap_segments` per end).
    pub fn to_polygon(&self, cap_segments: usize) -> Vec<Point> {
        match self {
            HandShape::Polygon(points) => points.clone(),
            HandShape::Capsule { width, length } => {
                let r = width / 2.0;
                let n = cap_segments.max(2);
                let mut points = Vec::with_capacity(2 * (n + 1));
                // tip cap, left to right over the top
                for i in 0..=n {
                    let phi = PI - PI * i as f64 / n as f64;
                    points.push(Point::new(r * phi.cos(), -length - r * phi.sin()));
                }
                // base cap, right to left under the hub
                for i in 0..=n {
                    let phi = -PI * i as f64 / n as f64;
                    points.push(Point::new(r * phi.cos(), -r * phi.sin()));
                }
                points
            }
        }
    }
}

/// Border painted first in a neutral colour, fill painted over it.
#[derive(Debug, Clone, PartialEq)]
pub struct HandOutline {
    pub border: HandShape,
    pub fill: HandShape,
}

/// A ghost is a regular hand with a wider translucent halo under it.
#[derive(Debug, Clone, PartialEq)]
pub struct GhostOutline {
    pub halo: HandShape,
    pub hand: HandOutline,
}

/// Outline for a style and width category.
pub fn compute_hand_outline(style: HandStyle, width: HandWidth, length: f64) -> Result<HandOutline> {
    hand_outline(style, effective_width(style, width), length)
}

/// Outline for an explicit width in canvas units.
pub fn hand_outline(style: HandStyle, width: f64, length: f64) -> Result<HandOutline> {
    validate(width, length)?;
    match style {
        HandStyle::Straight | HandStyle::Bold | HandStyle::Thin => Ok(HandOutline {
            border: HandShape::Capsule {
                width: width + 2.0 * BORDER,
                length,
            },
            fill: HandShape::Capsule { width, length },
        }),
        HandStyle::Tapered => {
            let base = width * TAPER_BASE_MULTIPLIER;
            let tip = base * TAPER_TIP_FRACTION;
            Ok(HandOutline {
                border: HandShape::Polygon(taper(base / 2.0 + BORDER, tip / 2.0 + BORDER, length)),
                fill: HandShape::Polygon(taper(base / 2.0, tip / 2.0, length)),
            })
        }
        HandStyle::Diamond => {
            let head_length = width * DIAMOND_HEAD_LENGTH;
            if head_length >= length {
                return Err(ClockError::HeadExceedsLength {
                    head: head_length,
                    length,
                });
            }
            let head = width * DIAMOND_HEAD_WIDTH;
            let neck = -length + head_length;
            Ok(HandOutline {
                border: HandShape::Polygon(diamond(
                    width / 2.0 + BORDER,
                    head / 2.0 + BORDER,
                    neck,
                    length + BORDER,
                )),
                fill: HandShape::Polygon(diamond(width / 2.0, head / 2.0, neck, length)),
            })
        }
    }
}

/// Ghost variant: the regular outline plus a widened neutral halo.
pub fn ghost_outline(style: HandStyle, width: f64, length: f64) -> Result<GhostOutline> {
    let hand = hand_outline(style, width, length)?;
    let halo = match style {
        HandStyle::Straight | HandStyle::Bold | HandStyle::Thin => HandShape::Capsule {
            width: width + GHOST_HALO,
            length,
        },
        HandStyle::Tapered => {
            let base = width * TAPER_BASE_MULTIPLIER;
            let tip = base * TAPER_TIP_FRACTION;
            HandShape::Polygon(taper(
                (base + GHOST_HALO) / 2.0,
                (tip + GHOST_HALO) / 2.0,
                length,
            ))
        }
        HandStyle::Diamond => {
            let neck = -length + width * DIAMOND_HEAD_LENGTH;
            HandShape::Polygon(diamond(
                (width + 2.0) / 2.0,
                (width * DIAMOND_HEAD_WIDTH + 2.0) / 2.0,
                neck,
                length + BORDER,
            ))
        }
    };
    Ok(GhostOutline { halo, hand })
}

/// Rotate `points` by the angle of `seconds` on the face and move them to
/// `center`.
pub fn place(points: &[Point], center: Point, seconds: f64) -> Vec<Point> {
    let theta = seconds * PI / 30.0;
    let (sin, cos) = theta.sin_cos();
    points
        .iter()
        .map(|p| {
            Point::new(
                center.x + p.x * cos - p.y * sin,
                center.y + p.x * sin + p.y * cos,
            )
        })
        .collect()
}

/// Canvas angle (radians, 0 = 3 o'clock) of a position on the face.
pub fn face_angle(seconds: f64) -> f64 {
    seconds * PI / 30.0 - PI / 2.0
}

fn validate(width: f64, length: f64) -> Result<()> {
    if !width.is_finite() || width <= 0.0 {
        return Err(ClockError::InvalidWidth(width));
    }
    if !length.is_finite() || length <= 0.0 {
        return Err(ClockError::InvalidLength(length));
    }
    Ok(())
}

fn taper(half_base: f64, half_tip: f64, length: f64) -> Vec<Point> {
    vec![
        Point::new(-half_base, 0.0),
        Point::new(-half_tip, -length),
        Point::new(half_tip, -length),
        Point::new(half_base, 0.0),
    ]
}

fn diamond(half_shaft: f64, half_head: f64, neck: f64, tip: f64) -> Vec<Point> {
    vec![
        Point::new(-half_shaft, 0.0),
        Point::new(-half_shaft, neck),
        Point::new(-half_head, neck),
        Point::new(0.0, -tip),
        Point::new(half_head, neck),
        Point::new(half_shaft, neck),
        Point::new(half_shaft, 0.0),
    ]
}
