use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::{
        canvas::{Canvas, Context, Line as CanvasLine, Points},
        Block, Borders, Paragraph, Widget, Wrap,
    },
    Frame,
};
use itertools::{Itertools, MinMaxResult};
use unicode_width::UnicodeWidthStr;

use crate::app::App;
use crate::config::Mode;
use crate::format::{format_millis, format_signed_millis};
use crate::geometry::Point;
use crate::hand::Rgb;
use crate::interval_editor::IntervalField;
use crate::lap_timer::LapKind;
use crate::render::{draw_frame, DrawingSurface, FrameModel};

const PANEL_WIDTH: u16 = 34;
/// Anything smaller cannot hold a readable face.
pub const MIN_WIDTH: u16 = 60;
pub const MIN_HEIGHT: u16 = 12;

fn color(rgb: Rgb) -> Color {
    Color::Rgb(rgb.r, rgb.g, rgb.b)
}

pub fn draw(app: &mut App, f: &mut Frame, now_ms: u64) {
    let area = f.area();
    render_app(app, now_ms, area, f.buffer_mut());
}

/// Draw the face and the side panel, or nothing once rendering has halted.
pub fn render_app(app: &mut App, now_ms: u64, area: Rect, buf: &mut Buffer) {
    let frame = app.compose_frame(now_ms);
    let fits = area.width >= MIN_WIDTH && area.height >= MIN_HEIGHT;
    let frame = match frame {
        Ok(frame) if fits => Some(frame),
        Ok(_) => None,
        Err(e) => {
            log::error!("cannot compose clock face: {e}");
            None
        }
    };
    if !app.render_loop_mut().begin_frame(frame.is_some()) {
        Paragraph::new(Span::styled(
            "terminal too small, resize to continue",
            Style::default().add_modifier(Modifier::DIM | Modifier::ITALIC),
        ))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .render(area, buf);
        return;
    }
    let Some(frame) = frame else {
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(1), Constraint::Length(PANEL_WIDTH)])
        .split(area);

    ClockView { frame: &frame }.render(face_rect(chunks[0]), buf);
    StatusPanel { app, now_ms }.render(chunks[1], buf);
}

/// Largest area of roughly square shape (cells are about twice as tall as
/// they are wide), centred in `area`.
fn face_rect(area: Rect) -> Rect {
    let width = area.width.min(area.height.saturating_mul(2));
    let height = area.height.min(width / 2).max(1);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}

/// Braille rendering of a composed frame.
pub struct ClockView<'a> {
    pub frame: &'a FrameModel,
}

impl Widget for ClockView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }
        let size = self.frame.layout.size;
        let grid = DotGrid {
            size,
            step_x: size / (area.width as f64 * 2.0),
            step_y: size / (area.height as f64 * 4.0),
            cell_width: size / area.width as f64,
            backdrop: self.frame.palette.face,
        };
        Canvas::default()
            .marker(Marker::Braille)
            .background_color(color(self.frame.palette.background))
            .x_bounds([0.0, size])
            .y_bounds([0.0, size])
            .paint(|ctx| {
                let mut surface = CanvasSurface { ctx, grid };
                draw_frame(&mut surface, self.frame);
            })
            .render(area, buf);
    }
}

/// Canvas resolution in face units.
#[derive(Debug, Clone, Copy)]
struct DotGrid {
    size: f64,
    step_x: f64,
    step_y: f64,
    cell_width: f64,
    backdrop: Rgb,
}

impl DotGrid {
    /// Face coordinates grow downwards, the canvas grows upwards.
    fn flip(&self, p: Point) -> (f64, f64) {
        (p.x, self.size - p.y)
    }

    /// Translucent fills are pre-blended against the face.
    fn paint(&self, rgb: Rgb, alpha: f64) -> Color {
        if alpha >= 1.0 {
            color(rgb)
        } else {
            color(rgb.blend_over(self.backdrop, alpha))
        }
    }

    fn rows(&self, from: f64, to: f64) -> impl Iterator<Item = f64> {
        let step = self.step_y;
        let first = (from / step).ceil() as i64;
        let last = (to / step).floor() as i64;
        (first..=last).map(move |i| i as f64 * step)
    }

    fn span(&self, y: f64, x0: f64, x1: f64, coords: &mut Vec<(f64, f64)>) {
        let first = (x0 / self.step_x).ceil() as i64;
        let last = (x1 / self.step_x).floor() as i64;
        for i in first..=last {
            coords.push(self.flip(Point::new(i as f64 * self.step_x, y)));
        }
    }
}

struct CanvasSurface<'a, 'b> {
    ctx: &'a mut Context<'b>,
    grid: DotGrid,
}

impl DrawingSurface for CanvasSurface<'_, '_> {
    fn clear(&mut self, _color: Rgb) {
        // the canvas background already covers this
    }

    fn fill_arc(&mut self, center: Point, radius: f64, start: f64, end: f64, rgb: Rgb, alpha: f64) {
        let full = (end - start).abs() >= std::f64::consts::TAU;
        let mut coords = Vec::new();
        for y in self.grid.rows(center.y - radius, center.y + radius) {
            let dy = y - center.y;
            let half = (radius * radius - dy * dy).max(0.0).sqrt();
            if full {
                self.grid.span(y, center.x - half, center.x + half, &mut coords);
            } else {
                let mut row = Vec::new();
                self.grid.span(y, center.x - half, center.x + half, &mut row);
                coords.extend(row.into_iter().filter(|&(x, _)| {
                    let angle = dy.atan2(x - center.x).rem_euclid(std::f64::consts::TAU);
                    angle >= start && angle <= end
                }));
            }
        }
        self.ctx.draw(&Points {
            coords: &coords,
            color: self.grid.paint(rgb, alpha),
        });
    }

    fn stroke_arc(&mut self, center: Point, radius: f64, start: f64, end: f64, width: f64, rgb: Rgb) {
        let step = self.grid.step_x.min(self.grid.step_y);
        let rings = ((width / step).ceil() as usize).max(1);
        let mut coords = Vec::new();
        for ring in 0..rings {
            let r = radius - ring as f64 * step;
            let samples = ((r * (end - start).abs() / step).ceil() as usize).max(8);
            for i in 0..=samples {
                let angle = start + (end - start) * i as f64 / samples as f64;
                coords.push(self.grid.flip(Point::new(
                    center.x + r * angle.cos(),
                    center.y + r * angle.sin(),
                )));
            }
        }
        self.ctx.draw(&Points {
            coords: &coords,
            color: color(rgb),
        });
    }

    fn fill_polygon(&mut self, points: &[Point], rgb: Rgb, alpha: f64) {
        if points.len() < 3 {
            return;
        }
        let (min_y, max_y) = match points.iter().map(|p| p.y).minmax_by(|a, b| a.total_cmp(b)) {
            MinMaxResult::MinMax(lo, hi) => (lo, hi),
            MinMaxResult::OneElement(y) => (y, y),
            MinMaxResult::NoElements => return,
        };
        let mut coords = Vec::new();
        for y in self.grid.rows(min_y, max_y) {
            // even-odd scanline
            let mut crossings: Vec<f64> = points
                .iter()
                .circular_tuple_windows()
                .filter(|(a, b)| (a.y <= y) != (b.y <= y))
                .map(|(a, b)| a.x + (y - a.y) / (b.y - a.y) * (b.x - a.x))
                .collect();
            crossings.sort_by(|a, b| a.total_cmp(b));
            for pair in crossings.chunks_exact(2) {
                self.grid.span(y, pair[0], pair[1], &mut coords);
            }
        }
        if coords.is_empty() {
            // thinner than one dot: keep it visible
            coords.extend(points.iter().map(|p| self.grid.flip(*p)));
        }
        self.ctx.draw(&Points {
            coords: &coords,
            color: self.grid.paint(rgb, alpha),
        });
    }

    fn stroke_path(&mut self, points: &[Point], _width: f64, rgb: Rgb) {
        for (a, b) in points.iter().tuple_windows() {
            let (x1, y1) = self.grid.flip(*a);
            let (x2, y2) = self.grid.flip(*b);
            self.ctx.draw(&CanvasLine {
                x1,
                y1,
                x2,
                y2,
                color: color(rgb),
            });
        }
    }

    fn draw_text(&mut self, at: Point, text: &str, rgb: Rgb) {
        let (x, y) = self.grid.flip(at);
        let x = x - text.width() as f64 * self.grid.cell_width / 2.0;
        self.ctx.print(
            x,
            y,
            Line::styled(text.to_string(), Style::default().fg(color(rgb))),
        );
    }
}

/// Digital readouts, lap list and key legend.
struct StatusPanel<'a> {
    app: &'a App,
    now_ms: u64,
}

impl Widget for StatusPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let app = self.app;
        let bold = Style::default().add_modifier(Modifier::BOLD);
        let dim = Style::default().add_modifier(Modifier::DIM);
        let italic = Style::default().add_modifier(Modifier::ITALIC);
        let readout = app.readout(self.now_ms);

        let digital_style = match (app.phase_accent(), app.mode()) {
            (Some(accent), _) => bold.fg(color(accent)),
            (None, Mode::LapTimer) if app.lap_timer().phase() == LapKind::Rest => {
                bold.fg(Color::Cyan)
            }
            _ => bold,
        };

        let title = match app.mode() {
            Mode::LapTimer => " Lap Timer ",
            Mode::IntervalTimer => " Interval Timer ",
        };
        let block = Block::default().borders(Borders::LEFT).title(title);
        let inner = block.inner(area);
        block.render(area, buf);

        let mut lines = vec![
            Line::from(Span::styled(readout.digital, digital_style)),
            Line::from(vec![Span::styled("Total ", dim), Span::raw(readout.total)]),
            Line::from(Span::styled(readout.status, bold)),
            Line::from(readout.detail),
        ];
        if app.mode() == Mode::IntervalTimer {
            lines.push(Line::from(Span::styled(app.interval_summary(), dim)));
        }
        lines.push(Line::default());

        if let Some(editor) = app.interval_editor() {
            lines.push(Line::from(Span::styled(
                "Edit (tab) field (←/→) value",
                bold.fg(Color::Yellow),
            )));
            for field in IntervalField::ALL {
                let selected = field == editor.field();
                let marker = if selected { "> " } else { "  " };
                let style = if selected { bold } else { Style::default() };
                lines.push(Line::from(vec![
                    Span::raw(marker),
                    Span::styled(format!("{:<10}{}", field.to_string(), editor.value_text(field)), style),
                ]));
            }
            lines.push(Line::from(Span::styled("(enter) save (esc) cancel", italic)));
        } else if app.mode_switch_pending() {
            lines.push(Line::from(Span::styled(
                "Switch mode and discard session? (y/n)",
                bold.fg(Color::Yellow),
            )));
        } else if let Some(message) = app.message() {
            lines.push(Line::from(Span::styled(message.to_string(), italic)));
        }

        let legend_height = 4;
        let reserved = lines.len() as u16 + legend_height;
        let room = inner.height.saturating_sub(reserved) as usize;
        match app.mode() {
            Mode::LapTimer => lines.extend(lap_lines(app).into_iter().take(room)),
            Mode::IntervalTimer => lines.extend(round_lines(app).into_iter().take(room)),
        }

        let legend = Paragraph::new(vec![
            Line::from(Span::styled("(space) tap (^s) finish (R)eset", italic)),
            Line::from(Span::styled("(x) stop (m)ode (d)ark (g)host", italic)),
            Line::from(Span::styled("(1) single (s)tyle (w)idth (e)dit", italic)),
            Line::from(Span::styled("(r)est (G)uard (b)eep (esc)", italic)),
        ]);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(1), Constraint::Length(legend_height)])
            .split(inner);

        Paragraph::new(lines)
            .wrap(Wrap { trim: true })
            .render(chunks[0], buf);
        legend.render(chunks[1], buf);
    }
}

/// Newest record first, laps with their change against the previous lap.
fn lap_lines(app: &App) -> Vec<Line<'static>> {
    let timer = app.lap_timer();
    let deltas = timer.lap_deltas();
    timer
        .records()
        .iter()
        .zip(deltas)
        .rev()
        .map(|(record, delta)| {
            let label = match (record.kind, record.sequence_number) {
                (LapKind::Lap, Some(n)) => format!("Lap {n:<3}"),
                _ => "Rest    ".to_string(),
            };
            let mut spans = vec![
                Span::raw(label),
                Span::styled(
                    format_millis(record.elapsed_ms),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
            ];
            if let Some(delta) = delta {
                let style = if delta > 0 {
                    Style::default().fg(Color::Red)
                } else {
                    Style::default().fg(Color::Green)
                };
                spans.push(Span::styled(format!("  {}", format_signed_millis(delta)), style));
            }
            Line::from(spans)
        })
        .collect()
}

/// Finished work phases, newest first. Kept after stop until reset.
fn round_lines(app: &App) -> Vec<Line<'static>> {
    app.interval_timer()
        .completed_rounds()
        .iter()
        .rev()
        .map(|done| {
            Line::from(vec![
                Span::raw(format!("Round {:<3} done ", done.round)),
                Span::styled(
                    format_millis(done.session_elapsed_ms),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
            ])
        })
        .collect()
}
