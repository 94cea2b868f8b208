//! Clock-face composition and drawing.
//!
//! [`compose_frame`] is pure: it turns the display settings, the hands and a
//! base second into a [`FrameModel`] in canvas units (origin top-left, y
//! growing downwards). [`draw_frame`] replays that model onto any
//! [`DrawingSurface`]. The [`RenderLoop`] guards the per-frame redraw.

use std::f64::consts::TAU;

use log::{error, info};

use crate::config::DisplaySettings;
use crate::error::{ClockError, Result};
use crate::geometry::{face_angle, ghost_outline, hand_outline, place, Point, CAP_SEGMENTS};
use crate::ghost::GhostHandTarget;
use crate::hand::{effective_width, Hand, Rgb};

/// Canvas size all face constants are specified at.
pub const REFERENCE_SIZE: f64 = 540.0;
pub const GHOST_ALPHA: f64 = 0.5;
/// Interval-mode ghosts are drawn wider than the live hands.
pub const INTERVAL_GHOST_WIDTH_FACTOR: f64 = 1.3;

const HAND_BORDER: Rgb = Rgb::new(0, 0, 0);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Palette {
    pub background: Rgb,
    pub face: Rgb,
    pub rim: Rgb,
    pub tick: Rgb,
    pub label: Rgb,
    pub hub: Rgb,
    pub ghost_halo: Rgb,
}

impl Palette {
    pub const fn dark() -> Self {
        Self {
            background: Rgb::new(0x00, 0x00, 0x00),
            face: Rgb::new(0x0b, 0x0f, 0x14),
            rim: Rgb::new(0x44, 0x44, 0x44),
            tick: Rgb::new(0x55, 0x55, 0x55),
            label: Rgb::new(0x9a, 0xa4, 0xb2),
            hub: Rgb::new(0x77, 0x77, 0x77),
            ghost_halo: Rgb::new(0x88, 0x88, 0x88),
        }
    }

    pub const fn light() -> Self {
        Self {
            background: Rgb::new(0xff, 0xff, 0xff),
            face: Rgb::new(0xf2, 0xf2, 0xf2),
            rim: Rgb::new(0x11, 0x11, 0x11),
            tick: Rgb::new(0x11, 0x11, 0x11),
            label: Rgb::new(0x00, 0x00, 0x00),
            hub: Rgb::new(0x00, 0x00, 0x00),
            ghost_halo: Rgb::new(0x00, 0x00, 0x00),
        }
    }

    pub const fn for_mode(dark: bool) -> Self {
        if dark {
            Self::dark()
        } else {
            Self::light()
        }
    }
}

/// Face dimensions for one canvas size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FaceLayout {
    pub size: f64,
    pub scale: f64,
    pub center: Point,
    pub radius: f64,
    pub rim_width: f64,
    pub major_tick: f64,
    pub minor_tick: f64,
    pub major_tick_width: f64,
    pub minor_tick_width: f64,
    pub label_radius: f64,
    pub hand_length: f64,
    pub hub_radius: f64,
}

impl FaceLayout {
    pub fn new(size: f64) -> Result<Self> {
        if !size.is_finite() || size <= 0.0 {
            return Err(ClockError::InvalidCanvas(size));
        }
        Ok(Self::scaled(size))
    }

    fn scaled(size: f64) -> Self {
        let k = size / REFERENCE_SIZE;
        let radius = size * 0.45;
        Self {
            size,
            scale: k,
            center: Point::new(size / 2.0, size / 2.0),
            radius,
            rim_width: 5.0 * k,
            major_tick: 32.0 * k,
            minor_tick: 16.0 * k,
            major_tick_width: 4.0 * k,
            minor_tick_width: 2.0 * k,
            label_radius: radius - 58.0 * k,
            hand_length: radius - 32.0 * k,
            hub_radius: 10.0 * k,
        }
    }

    fn on_circle(&self, radius: f64, seconds: f64) -> Point {
        let (sin, cos) = face_angle(seconds).sin_cos();
        Point::new(self.center.x + radius * cos, self.center.y + radius * sin)
    }
}

impl Default for FaceLayout {
    fn default() -> Self {
        Self::scaled(REFERENCE_SIZE)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickMark {
    pub from: Point,
    pub to: Point,
    pub width: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FaceLabel {
    pub text: String,
    pub at: Point,
}

/// A filled polygon in canvas coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct Fill {
    pub points: Vec<Point>,
    pub color: Rgb,
    pub alpha: f64,
}

/// A frozen ghost plus how much wider than the live hands to draw it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GhostMarker {
    pub target: GhostHandTarget,
    pub width_factor: f64,
}

impl GhostMarker {
    pub fn lap(target: GhostHandTarget) -> Self {
        Self {
            target,
            width_factor: 1.0,
        }
    }

    pub fn interval(target: GhostHandTarget) -> Self {
        Self {
            target,
            width_factor: INTERVAL_GHOST_WIDTH_FACTOR,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FrameModel {
    pub layout: FaceLayout,
    pub palette: Palette,
    pub ticks: Vec<TickMark>,
    pub labels: Vec<FaceLabel>,
    /// Halo first, then the translucent hand.
    pub ghost: Vec<Fill>,
    /// Border then fill for each visible hand, in hand order.
    pub hands: Vec<Fill>,
}

/// Compute everything one redraw needs.
pub fn compose_frame(
    layout: &FaceLayout,
    display: &DisplaySettings,
    hands: &[Hand],
    base_seconds: f64,
    ghost: Option<&GhostMarker>,
) -> Result<FrameModel> {
    let palette = Palette::for_mode(display.dark);
    let width = effective_width(display.hand_style, display.hand_width) * layout.scale;

    let ticks = (0..60)
        .map(|i| {
            let major = i % 5 == 0;
            let length = if major {
                layout.major_tick
            } else {
                layout.minor_tick
            };
            TickMark {
                from: layout.on_circle(layout.radius - length, i as f64),
                to: layout.on_circle(layout.radius, i as f64),
                width: if major {
                    layout.major_tick_width
                } else {
                    layout.minor_tick_width
                },
            }
        })
        .collect();

    let labels = (1..=12)
        .map(|i| {
            let seconds = i * 5;
            FaceLabel {
                text: seconds.to_string(),
                at: layout.on_circle(layout.label_radius, seconds as f64),
            }
        })
        .collect();

    let mut ghost_fills = Vec::new();
    if let Some(marker) = ghost.filter(|_| display.ghost_hand) {
        let outline = ghost_outline(
            display.hand_style,
            width * marker.width_factor,
            layout.hand_length,
        )?;
        let at = marker.target.angular_position_seconds();
        ghost_fills.push(Fill {
            points: place(&outline.halo.to_polygon(CAP_SEGMENTS), layout.center, at),
            color: palette.ghost_halo,
            alpha: GHOST_ALPHA,
        });
        ghost_fills.push(Fill {
            points: place(&outline.hand.fill.to_polygon(CAP_SEGMENTS), layout.center, at),
            color: marker.target.color(),
            alpha: GHOST_ALPHA,
        });
    }

    let outline = hand_outline(display.hand_style, width, layout.hand_length)?;
    let border = outline.border.to_polygon(CAP_SEGMENTS);
    let fill = outline.fill.to_polygon(CAP_SEGMENTS);
    let mut hand_fills = Vec::new();
    for hand in visible_hands(hands, display.single_hand) {
        let at = hand.position(base_seconds);
        hand_fills.push(Fill {
            points: place(&border, layout.center, at),
            color: HAND_BORDER,
            alpha: 1.0,
        });
        hand_fills.push(Fill {
            points: place(&fill, layout.center, at),
            color: hand.color(),
            alpha: 1.0,
        });
    }

    Ok(FrameModel {
        layout: *layout,
        palette,
        ticks,
        labels,
        ghost: ghost_fills,
        hands: hand_fills,
    })
}

fn visible_hands(hands: &[Hand], single_hand: bool) -> Vec<&Hand> {
    if !single_hand {
        return hands.iter().collect();
    }
    hands
        .iter()
        .find(|h| h.is_reference())
        .or(hands.first())
        .into_iter()
        .collect()
}

/// Primitive drawing operations, in canvas units. Angles are radians with
/// 0 at three o'clock, growing clockwise on screen.
pub trait DrawingSurface {
    fn clear(&mut self, color: Rgb);
    fn fill_arc(&mut self, center: Point, radius: f64, start: f64, end: f64, color: Rgb, alpha: f64);
    fn stroke_arc(&mut self, center: Point, radius: f64, start: f64, end: f64, width: f64, color: Rgb);
    fn fill_polygon(&mut self, points: &[Point], color: Rgb, alpha: f64);
    fn stroke_path(&mut self, points: &[Point], width: f64, color: Rgb);
    fn draw_text(&mut self, at: Point, text: &str, color: Rgb);
}

/// Full redraw: face, rim, ticks, labels, ghost, hands, hub.
pub fn draw_frame<S: DrawingSurface + ?Sized>(surface: &mut S, frame: &FrameModel) {
    let layout = &frame.layout;
    let palette = &frame.palette;

    surface.clear(palette.background);
    surface.fill_arc(layout.center, layout.radius, 0.0, TAU, palette.face, 1.0);
    surface.stroke_arc(
        layout.center,
        layout.radius,
        0.0,
        TAU,
        layout.rim_width,
        palette.rim,
    );
    for tick in &frame.ticks {
        surface.stroke_path(&[tick.from, tick.to], tick.width, palette.tick);
    }
    for label in &frame.labels {
        surface.draw_text(label.at, &label.text, palette.label);
    }
    for fill in frame.ghost.iter().chain(&frame.hands) {
        surface.fill_polygon(&fill.points, fill.color, fill.alpha);
    }
    surface.fill_arc(layout.center, layout.hub_radius, 0.0, TAU, palette.hub, 1.0);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderState {
    Running,
    /// No usable surface; stays halted until re-armed.
    Halted,
}

/// Tracks whether redraws should still be attempted.
#[derive(Debug, Clone)]
pub struct RenderLoop {
    frames: u64,
    state: RenderState,
}

impl Default for RenderLoop {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderLoop {
    pub fn new() -> Self {
        Self {
            frames: 0,
            state: RenderState::Running,
        }
    }

    /// Returns true when this frame should be drawn. A missing surface halts
    /// the loop and is reported once.
    pub fn begin_frame(&mut self, surface_available: bool) -> bool {
        if self.state == RenderState::Halted {
            return false;
        }
        if !surface_available {
            error!("no usable drawing surface, rendering stopped");
            self.state = RenderState::Halted;
            return false;
        }
        self.frames += 1;
        true
    }

    /// Resume after the surface may have become usable again.
    pub fn rearm(&mut self) {
        if self.state == RenderState::Halted {
            info!("rendering resumed");
            self.state = RenderState::Running;
        }
    }

    pub fn state(&self) -> RenderState {
        self.state
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }
}
