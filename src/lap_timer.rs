use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::ghost::{select_ghost_hand, GhostHandTarget};
use crate::hand::{base_seconds, Hand};
use crate::scheduler::PollTicker;

pub const DEFAULT_GUARD_INTERVAL_MS: u64 = 1000;
const GUARD_INTERVAL_RANGE_MS: std::ops::RangeInclusive<u64> = 100..=10_000;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum LapKind {
    Lap,
    Rest,
}

/// One finished interval between two taps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LapRecord {
    pub kind: LapKind,
    pub elapsed_ms: u64,
    /// Only laps are numbered; rests carry `None`.
    pub sequence_number: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LapTimerConfig {
    pub track_rest: bool,
    pub guard: bool,
    pub guard_interval_ms: u64,
}

impl Default for LapTimerConfig {
    fn default() -> Self {
        Self {
            track_rest: true,
            guard: true,
            guard_interval_ms: DEFAULT_GUARD_INTERVAL_MS,
        }
    }
}

impl LapTimerConfig {
    /// Replace an out-of-range guard interval with the default.
    pub fn sanitized(self) -> Self {
        let guard_interval_ms = if GUARD_INTERVAL_RANGE_MS.contains(&self.guard_interval_ms) {
            self.guard_interval_ms
        } else {
            warn!(
                "guard interval {}ms out of range, using {}ms",
                self.guard_interval_ms,
                DEFAULT_GUARD_INTERVAL_MS
            );
            DEFAULT_GUARD_INTERVAL_MS
        };
        Self {
            guard_interval_ms,
            ..self
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LapStatus {
    Idle,
    Running,
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoredTap {
    Finished,
    Debounced,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TapOutcome {
    /// First tap: the session clock starts, nothing is recorded.
    Started,
    Recorded(LapRecord),
    Ignored(IgnoredTap),
}

/// Everything the exporter needs once a session is frozen.
#[derive(Debug, Clone, PartialEq)]
pub struct FinishedSession {
    pub records: Vec<LapRecord>,
    pub started_at_ms: u64,
    pub finished_at_ms: u64,
}

impl FinishedSession {
    pub fn total_ms(&self) -> u64 {
        self.finished_at_ms.saturating_sub(self.started_at_ms)
    }
}

/// Tap-driven lap/rest recorder.
#[derive(Debug, Clone)]
pub struct LapTimer {
    config: LapTimerConfig,
    phase: LapKind,
    session_start: Option<u64>,
    last_tap: Option<u64>,
    finished_at: Option<u64>,
    records: Vec<LapRecord>,
    next_lap_number: u32,
    last_split: i64,
    ghost: Option<GhostHandTarget>,
    display_ticker: PollTicker,
}

impl LapTimer {
    pub fn new(config: LapTimerConfig) -> Self {
        let config = config.sanitized();
        Self {
            config,
            phase: Self::initial_phase(&config),
            session_start: None,
            last_tap: None,
            finished_at: None,
            records: Vec::new(),
            next_lap_number: 1,
            last_split: 0,
            ghost: None,
            display_ticker: PollTicker::new(),
        }
    }

    // With rest tracking the first recorded interval must be a lap, and the
    // phase flips on the opening tap, so start from rest.
    fn initial_phase(config: &LapTimerConfig) -> LapKind {
        if config.track_rest {
            LapKind::Rest
        } else {
            LapKind::Lap
        }
    }

    pub fn tap(&mut self, now_ms: u64, hands: &[Hand], single_hand: bool) -> TapOutcome {
        if self.finished_at.is_some() {
            return TapOutcome::Ignored(IgnoredTap::Finished);
        }

        if self.session_start.is_none() {
            self.session_start = Some(now_ms);
        }

        if let Some(last) = self.last_tap {
            if self.config.guard && now_ms.saturating_sub(last) < self.config.guard_interval_ms {
                debug!("tap {}ms after previous one ignored", now_ms.saturating_sub(last));
                return TapOutcome::Ignored(IgnoredTap::Debounced);
            }
        }

        let outcome = match self.last_tap {
            Some(last) => {
                let sequence_number = match self.phase {
                    LapKind::Lap => {
                        let n = self.next_lap_number;
                        self.next_lap_number += 1;
                        Some(n)
                    }
                    LapKind::Rest => None,
                };
                let record = LapRecord {
                    kind: self.phase,
                    elapsed_ms: now_ms.saturating_sub(last),
                    sequence_number,
                };
                if let Some(prev) = self.records.last() {
                    self.last_split = record.elapsed_ms as i64 - prev.elapsed_ms as i64;
                }
                self.records.push(record);
                TapOutcome::Recorded(record)
            }
            None => TapOutcome::Started,
        };

        self.last_tap = Some(now_ms);
        self.phase = match (self.config.track_rest, self.phase) {
            (true, LapKind::Lap) => LapKind::Rest,
            _ => LapKind::Lap,
        };
        self.ghost = select_ghost_hand(hands, base_seconds(now_ms), single_hand);

        if !self.display_ticker.is_running() {
            self.display_ticker.start();
        }
        outcome
    }

    /// Freeze the session. Returns `None` when there is nothing to finish.
    pub fn finish(&mut self, now_ms: u64) -> Option<FinishedSession> {
        if self.finished_at.is_some() {
            return None;
        }
        let started_at_ms = self.session_start?;
        self.display_ticker.stop();
        self.finished_at = Some(now_ms);
        info!(
            "lap session finished: {} records over {}ms",
            self.records.len(),
            now_ms.saturating_sub(started_at_ms)
        );
        Some(FinishedSession {
            records: self.records.clone(),
            started_at_ms,
            finished_at_ms: now_ms,
        })
    }

    pub fn reset(&mut self) {
        self.display_ticker.stop();
        *self = Self {
            display_ticker: self.display_ticker.clone(),
            ..Self::new(self.config)
        };
    }

    pub fn set_track_rest(&mut self, track_rest: bool) {
        self.config.track_rest = track_rest;
        if !track_rest {
            self.phase = LapKind::Lap;
        } else if self.phase == LapKind::Lap {
            self.phase = LapKind::Rest;
        }
    }

    pub fn set_guard(&mut self, guard: bool) {
        self.config.guard = guard;
    }

    /// Recompute an existing ghost, e.g. after the single-hand setting flips.
    pub fn retarget_ghost(&mut self, now_ms: u64, hands: &[Hand], single_hand: bool) {
        if self.ghost.is_some() {
            self.ghost = select_ghost_hand(hands, base_seconds(now_ms), single_hand);
        }
    }

    pub fn config(&self) -> LapTimerConfig {
        self.config
    }

    pub fn status(&self) -> LapStatus {
        match (self.session_start, self.finished_at) {
            (_, Some(_)) => LapStatus::Finished,
            (Some(_), None) => LapStatus::Running,
            (None, None) => LapStatus::Idle,
        }
    }

    pub fn has_session(&self) -> bool {
        self.session_start.is_some()
    }

    /// Kind the next recorded tap will carry.
    pub fn phase(&self) -> LapKind {
        self.phase
    }

    pub fn records(&self) -> &[LapRecord] {
        &self.records
    }

    pub fn ghost(&self) -> Option<&GhostHandTarget> {
        self.ghost.as_ref()
    }

    pub fn session_start(&self) -> Option<u64> {
        self.session_start
    }

    /// Difference between the two most recent records of any kind.
    pub fn last_split(&self) -> i64 {
        self.last_split
    }

    pub fn display_ticking(&self) -> bool {
        self.display_ticker.is_running()
    }

    /// Time since the last accepted tap, while running.
    pub fn current_interval_ms(&self, now_ms: u64) -> Option<u64> {
        match self.status() {
            LapStatus::Running => self.last_tap.map(|t| now_ms.saturating_sub(t)),
            _ => None,
        }
    }

    /// Total session time, frozen once finished.
    pub fn session_elapsed_ms(&self, now_ms: u64) -> Option<u64> {
        let end = self.finished_at.unwrap_or(now_ms);
        self.session_start.map(|s| end.saturating_sub(s))
    }

    /// For each record, the change against the previous lap (laps only).
    pub fn lap_deltas(&self) -> Vec<Option<i64>> {
        let mut previous_lap: Option<u64> = None;
        self.records
            .iter()
            .map(|record| match record.kind {
                LapKind::Lap => {
                    let delta = previous_lap.map(|p| record.elapsed_ms as i64 - p as i64);
                    previous_lap = Some(record.elapsed_ms);
                    delta
                }
                LapKind::Rest => None,
            })
            .collect()
    }
}

impl Default for LapTimer {
    fn default() -> Self {
        Self::new(LapTimerConfig::default())
    }
}
