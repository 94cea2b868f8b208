use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use log::{debug, info, warn};

use crate::app_dirs::AppDirs;
use crate::config::{Mode, Settings, SettingsStore};
use crate::cue::{Cue, CuePlayer, SilentPlayer};
use crate::error::{ClockError, Result};
use crate::export::{CsvExporter, SessionExport, SessionExporter};
use crate::format::format_millis;
use crate::hand::{base_seconds, default_hands, Hand, Rgb};
use crate::interval_editor::IntervalEditor;
use crate::interval_timer::{IntervalEffect, IntervalPhase, IntervalTap, IntervalTimer};
use crate::lap_timer::{FinishedSession, LapKind, LapStatus, LapTimer, TapOutcome};
use crate::render::{compose_frame, FaceLayout, FrameModel, GhostMarker, RenderLoop};
use crate::runtime::ClockEvent;
use crate::wake_lock::{LoggingWakeLock, WakeLock};

const COUNTDOWN_ACCENT: Rgb = Rgb::new(0x88, 0x88, 0x88);
const WORK_ACCENT: Rgb = Rgb::new(0x4d, 0xff, 0x88);
const REST_ACCENT: Rgb = Rgb::new(0x4d, 0xa3, 0xff);
const PAUSED_ACCENT: Rgb = Rgb::new(0xff, 0xd2, 0x4d);

/// Unix time in milliseconds.
pub fn wall_clock_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}

/// Text shown next to the face.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Readout {
    /// Large digital value (current interval or time remaining).
    pub digital: String,
    /// Session total.
    pub total: String,
    /// Mode-specific status line.
    pub status: String,
    /// Round line in interval mode, next-tap kind in lap mode.
    pub detail: String,
}

/// Whether the event loop keeps going after an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Continue,
    Quit,
}

pub struct App {
    settings: Settings,
    hands: Vec<Hand>,
    lap: LapTimer,
    interval: IntervalTimer,
    render_loop: RenderLoop,
    layout: FaceLayout,
    store: Box<dyn SettingsStore>,
    player: Box<dyn CuePlayer>,
    exporter: Box<dyn SessionExporter>,
    wake_lock: Box<dyn WakeLock>,
    session_name: Option<String>,
    finished: Option<FinishedSession>,
    pending_mode_switch: bool,
    editor: Option<IntervalEditor>,
    message: Option<String>,
}

impl App {
    pub fn new(settings: Settings, store: Box<dyn SettingsStore>) -> Self {
        let settings = settings.sanitized();
        Self {
            hands: default_hands(),
            lap: LapTimer::new(settings.lap_timer_config()),
            interval: IntervalTimer::new(settings.interval_config()),
            render_loop: RenderLoop::new(),
            layout: FaceLayout::default(),
            store,
            player: Box::new(SilentPlayer),
            exporter: Box::new(CsvExporter::new(AppDirs::export_dir())),
            wake_lock: Box::new(LoggingWakeLock::new()),
            session_name: None,
            finished: None,
            pending_mode_switch: false,
            editor: None,
            message: None,
            settings,
        }
    }

    pub fn with_player(mut self, mut player: Box<dyn CuePlayer>) -> Self {
        player.set_volume(self.settings.interval_timer.volume);
        self.player = player;
        self
    }

    pub fn with_exporter(mut self, exporter: Box<dyn SessionExporter>) -> Self {
        self.exporter = exporter;
        self
    }

    pub fn with_wake_lock(mut self, wake_lock: Box<dyn WakeLock>) -> Self {
        self.wake_lock = wake_lock;
        self
    }

    pub fn with_session_name(mut self, name: Option<String>) -> Self {
        self.session_name = name;
        self
    }

    pub fn with_layout(mut self, layout: FaceLayout) -> Self {
        self.layout = layout;
        self
    }

    // ---------------------------
    // Events
    // ---------------------------

    /// Apply one runtime event, then advance the timers to `now_ms`.
    pub fn handle_event(&mut self, event: ClockEvent, now_ms: u64) -> Control {
        match event {
            ClockEvent::Tick => {}
            ClockEvent::Closed => {
                warn!("input closed, shutting down");
                return Control::Quit;
            }
            ClockEvent::Resize => self.render_loop.rearm(),
            ClockEvent::Focus(gained) => self.on_focus(gained),
            ClockEvent::Key(key) => {
                if self.on_key(key, now_ms) == Control::Quit {
                    return Control::Quit;
                }
            }
        }
        self.on_tick(now_ms);
        Control::Continue
    }

    fn on_key(&mut self, key: KeyEvent, now_ms: u64) -> Control {
        if key.kind == KeyEventKind::Release {
            return Control::Continue;
        }
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        if ctrl && key.code == KeyCode::Char('c') {
            return Control::Quit;
        }
        if self.editor.is_some() {
            self.on_editor_key(key);
            return Control::Continue;
        }
        if self.pending_mode_switch {
            if key.code == KeyCode::Char('y') {
                self.confirm_mode_switch();
            } else {
                self.cancel_mode_switch();
            }
            return Control::Continue;
        }

        match key.code {
            KeyCode::Esc => return Control::Quit,
            KeyCode::Char('s') if ctrl => {
                self.finish(now_ms);
            }
            KeyCode::Char(' ') => self.on_tap(now_ms),
            KeyCode::Delete if key.modifiers.contains(KeyModifiers::SHIFT) => self.reset(),
            KeyCode::Char('R') => self.reset(),
            KeyCode::Char('x') => self.stop(),
            KeyCode::Char('m') => {
                self.request_mode_switch();
            }
            KeyCode::Char('d') => self.toggle_dark(),
            KeyCode::Char('g') => self.toggle_ghost(),
            KeyCode::Char('1') => self.toggle_single_hand(now_ms),
            KeyCode::Char('s') => self.cycle_hand_style(),
            KeyCode::Char('w') => self.cycle_hand_width(),
            KeyCode::Char('r') => self.toggle_track_rest(),
            KeyCode::Char('G') => self.toggle_guard(),
            KeyCode::Char('b') => self.toggle_beep(),
            KeyCode::Char('e') => {
                self.open_interval_editor();
            }
            _ => {}
        }
        Control::Continue
    }

    fn on_editor_key(&mut self, key: KeyEvent) {
        let Some(editor) = self.editor.as_mut() else {
            return;
        };
        match key.code {
            KeyCode::Tab | KeyCode::Down => editor.select_next(),
            KeyCode::BackTab | KeyCode::Up => editor.select_prev(),
            KeyCode::Right | KeyCode::Char('+') | KeyCode::Char('=') => editor.adjust(1),
            KeyCode::Left | KeyCode::Char('-') => editor.adjust(-1),
            KeyCode::Enter => self.save_interval_editor(),
            KeyCode::Esc => self.cancel_interval_editor(),
            _ => {}
        }
    }

    // ---------------------------
    // Timing
    // ---------------------------

    /// The main button: lap tap or interval start/pause/resume.
    pub fn on_tap(&mut self, now_ms: u64) {
        self.message = None;
        let single = self.settings.display.single_hand;
        match self.settings.current_mode {
            Mode::LapTimer => match self.lap.tap(now_ms, &self.hands, single) {
                TapOutcome::Started => {
                    info!("lap session started");
                    self.acquire_wake_lock();
                }
                TapOutcome::Recorded(record) => {
                    debug!("{} recorded: {}ms", record.kind, record.elapsed_ms)
                }
                TapOutcome::Ignored(reason) => debug!("tap ignored: {reason:?}"),
            },
            Mode::IntervalTimer => {
                if self.interval.tap(now_ms, &self.hands, single) == IntervalTap::Started {
                    self.acquire_wake_lock();
                }
            }
        }
    }

    /// Advance deadlines and release due cues.
    pub fn on_tick(&mut self, now_ms: u64) {
        if let Some(token) = self.interval.ticker_token() {
            for effect in self.interval.tick(token, now_ms) {
                match effect {
                    IntervalEffect::Cue(cue) => self.play(cue),
                    IntervalEffect::Transition(t) => {
                        info!("{} -> {} (round {})", t.from, t.to, t.round)
                    }
                }
            }
        }
        for cue in self.interval.take_due_cues(now_ms) {
            self.play(cue);
        }
    }

    fn play(&mut self, cue: Cue) {
        if let Err(e) = self.player.play(cue.frequency_hz, cue.duration_ms) {
            warn!("cue playback failed: {e}");
        }
    }

    /// Freeze the lap session and export it. A failed export keeps the
    /// session so it can be retried.
    pub fn finish(&mut self, now_ms: u64) -> Option<PathBuf> {
        if self.settings.current_mode != Mode::LapTimer {
            return None;
        }
        if let Some(session) = self.lap.finish(now_ms) {
            self.finished = Some(session);
        }
        let session = self.finished.as_ref()?;
        let export = SessionExport::from_session(session, self.session_name.as_deref());
        match self.exporter.export(&export) {
            Ok(path) => {
                self.message = Some(format!("Saved {}", path.display()));
                Some(path)
            }
            Err(ClockError::NothingToExport) => {
                info!("nothing to export");
                self.message = Some("No workout data to export".to_string());
                None
            }
            Err(e) => {
                warn!("export failed: {e}");
                self.message = Some(format!("Export failed: {e}"));
                None
            }
        }
    }

    /// Clear the active mode's session.
    pub fn reset(&mut self) {
        match self.settings.current_mode {
            Mode::LapTimer => {
                self.lap.reset();
                self.finished = None;
            }
            Mode::IntervalTimer => self.interval.reset(),
        }
        self.message = None;
        self.release_wake_lock();
    }

    /// Cancel a running interval session, keeping its round history.
    pub fn stop(&mut self) {
        if self.settings.current_mode == Mode::IntervalTimer {
            self.interval.stop();
            self.release_wake_lock();
        }
    }

    pub fn has_active_session(&self) -> bool {
        match self.settings.current_mode {
            Mode::LapTimer => self.lap.status() == LapStatus::Running,
            Mode::IntervalTimer => self.interval.phase().is_active(),
        }
    }

    // ---------------------------
    // Mode switching
    // ---------------------------

    /// Switch right away when idle; otherwise wait for
    /// [`confirm_mode_switch`](Self::confirm_mode_switch). Returns true if
    /// the mode changed.
    pub fn request_mode_switch(&mut self) -> bool {
        if self.has_active_session() {
            self.pending_mode_switch = true;
            false
        } else {
            self.switch_mode();
            true
        }
    }

    pub fn confirm_mode_switch(&mut self) -> bool {
        if std::mem::take(&mut self.pending_mode_switch) {
            self.switch_mode();
            true
        } else {
            false
        }
    }

    pub fn cancel_mode_switch(&mut self) {
        self.pending_mode_switch = false;
    }

    pub fn mode_switch_pending(&self) -> bool {
        self.pending_mode_switch
    }

    fn switch_mode(&mut self) {
        self.reset();
        self.settings.current_mode = match self.settings.current_mode {
            Mode::LapTimer => Mode::IntervalTimer,
            Mode::IntervalTimer => Mode::LapTimer,
        };
        info!("switched to {:?}", self.settings.current_mode);
        self.persist();
    }

    // ---------------------------
    // Settings
    // ---------------------------

    pub fn toggle_dark(&mut self) {
        self.settings.display.dark = !self.settings.display.dark;
        self.persist();
    }

    pub fn toggle_ghost(&mut self) {
        self.settings.display.ghost_hand = !self.settings.display.ghost_hand;
        self.persist();
    }

    pub fn toggle_single_hand(&mut self, now_ms: u64) {
        let single = !self.settings.display.single_hand;
        self.settings.display.single_hand = single;
        self.lap.retarget_ghost(now_ms, &self.hands, single);
        self.interval.retarget_ghost(now_ms, &self.hands, single);
        self.persist();
    }

    pub fn cycle_hand_style(&mut self) {
        self.settings.display.hand_style = self.settings.display.hand_style.next();
        self.persist();
    }

    pub fn cycle_hand_width(&mut self) {
        self.settings.display.hand_width = self.settings.display.hand_width.next();
        self.persist();
    }

    pub fn toggle_track_rest(&mut self) {
        self.settings.track_rest = !self.settings.track_rest;
        self.lap.set_track_rest(self.settings.track_rest);
        self.persist();
    }

    pub fn toggle_guard(&mut self) {
        self.settings.guard = !self.settings.guard;
        self.lap.set_guard(self.settings.guard);
        self.persist();
    }

    pub fn toggle_beep(&mut self) {
        let enabled = !self.settings.interval_timer.beep_enabled;
        self.settings.interval_timer.beep_enabled = enabled;
        self.interval.set_beep_enabled(enabled);
        self.persist();
    }

    // ---------------------------
    // Interval settings editor
    // ---------------------------

    /// Open a draft of the interval settings. Only available in interval
    /// mode; returns whether the editor is open.
    pub fn open_interval_editor(&mut self) -> bool {
        if self.settings.current_mode == Mode::IntervalTimer && self.editor.is_none() {
            self.editor = Some(IntervalEditor::new(self.settings.interval_timer));
        }
        self.editor.is_some()
    }

    pub fn interval_editor(&self) -> Option<&IntervalEditor> {
        self.editor.as_ref()
    }

    /// Apply the draft. A running session keeps its durations until it is
    /// stopped; volume applies at once.
    pub fn save_interval_editor(&mut self) {
        let Some(editor) = self.editor.take() else {
            return;
        };
        let beep_enabled = self.settings.interval_timer.beep_enabled;
        self.settings.interval_timer = editor.draft();
        self.settings.interval_timer.beep_enabled = beep_enabled;
        self.settings = self.settings.clone().sanitized();
        self.interval.set_config(self.settings.interval_config());
        self.player.set_volume(self.settings.interval_timer.volume);
        info!("interval settings: {}", self.interval_summary());
        self.message = Some("Interval settings saved".to_string());
        self.persist();
    }

    pub fn cancel_interval_editor(&mut self) {
        self.editor = None;
    }

    fn persist(&mut self) {
        if let Err(e) = self.store.save(&self.settings) {
            warn!("failed to save settings: {e}");
        }
    }

    // ---------------------------
    // Wake lock
    // ---------------------------

    /// Focus changes re-acquire the lock for a running session and drop it
    /// otherwise.
    pub fn on_focus(&mut self, gained: bool) {
        if gained && self.has_active_session() {
            self.acquire_wake_lock();
        } else if !gained {
            self.release_wake_lock();
        }
    }

    fn acquire_wake_lock(&mut self) {
        if let Err(e) = self.wake_lock.request() {
            warn!("wake lock request failed: {e}");
        }
    }

    pub fn release_wake_lock(&mut self) {
        if let Err(e) = self.wake_lock.release() {
            warn!("wake lock release failed: {e}");
        }
    }

    pub fn wake_lock_held(&self) -> bool {
        self.wake_lock.is_held()
    }

    // ---------------------------
    // Presentation
    // ---------------------------

    pub fn compose_frame(&self, now_ms: u64) -> Result<FrameModel> {
        let ghost = match self.settings.current_mode {
            Mode::LapTimer => self.lap.ghost().copied().map(GhostMarker::lap),
            Mode::IntervalTimer => self.interval.ghost().copied().map(GhostMarker::interval),
        };
        compose_frame(
            &self.layout,
            &self.settings.display,
            &self.hands,
            base_seconds(now_ms),
            ghost.as_ref(),
        )
    }

    pub fn readout(&self, now_ms: u64) -> Readout {
        match self.settings.current_mode {
            Mode::LapTimer => {
                let digital = match self.lap.status() {
                    LapStatus::Finished => "Session Finished".to_string(),
                    _ => format_millis(self.lap.current_interval_ms(now_ms).unwrap_or(0)),
                };
                let next = match self.lap.phase() {
                    LapKind::Lap => "LAP",
                    LapKind::Rest => "REST",
                };
                Readout {
                    digital,
                    total: format_millis(self.lap.session_elapsed_ms(now_ms).unwrap_or(0)),
                    status: format!("Laps: {}", self.lap.records().len()),
                    detail: format!("Next: {next}"),
                }
            }
            Mode::IntervalTimer => Readout {
                digital: format_millis(self.interval.remaining_ms(now_ms).unwrap_or(0)),
                total: format_millis(self.interval.session_elapsed_ms(now_ms).unwrap_or(0)),
                status: self.interval.status_text(),
                detail: self.interval.rounds_text(),
            },
        }
    }

    /// Accent for the current interval phase, if any.
    pub fn phase_accent(&self) -> Option<Rgb> {
        if self.settings.current_mode != Mode::IntervalTimer {
            return None;
        }
        if self.interval.is_paused() {
            return Some(PAUSED_ACCENT);
        }
        match self.interval.phase() {
            IntervalPhase::Countdown => Some(COUNTDOWN_ACCENT),
            IntervalPhase::Work => Some(WORK_ACCENT),
            IntervalPhase::Rest => Some(REST_ACCENT),
            IntervalPhase::Waiting | IntervalPhase::Done => None,
        }
    }

    /// One-line summary of the interval configuration.
    pub fn interval_summary(&self) -> String {
        let it = &self.settings.interval_timer;
        let rounds = it
            .total_rounds
            .map_or_else(|| "∞".to_string(), |n| n.to_string());
        format!(
            "countdown {}s · work {}s · rest {}s · rounds {}",
            it.countdown, it.work_time, it.rest_time, rounds
        )
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn mode(&self) -> Mode {
        self.settings.current_mode
    }

    pub fn hands(&self) -> &[Hand] {
        &self.hands
    }

    pub fn lap_timer(&self) -> &LapTimer {
        &self.lap
    }

    pub fn interval_timer(&self) -> &IntervalTimer {
        &self.interval
    }

    pub fn render_loop(&self) -> &RenderLoop {
        &self.render_loop
    }

    pub fn render_loop_mut(&mut self) -> &mut RenderLoop {
        &mut self.render_loop
    }
}
