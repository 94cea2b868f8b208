use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::cue::{Cue, COMPLETION_CUE, COMPLETION_DELAYS_MS, TRANSITION_CUE, WARNING_CUE};
use crate::ghost::{select_ghost_hand, GhostHandTarget};
use crate::hand::{base_seconds, Hand};
use crate::scheduler::{PollTicker, Scheduler, TickToken};

pub const DEFAULT_COUNTDOWN_SECS: u32 = 5;
pub const DEFAULT_WORK_SECS: u32 = 60;
pub const DEFAULT_REST_SECS: u32 = 60;

/// Whole seconds remaining at which a warning cue sounds.
const WARNING_SECONDS: std::ops::RangeInclusive<u64> = 1..=3;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum IntervalPhase {
    Waiting,
    Countdown,
    Work,
    Rest,
    Done,
}

impl IntervalPhase {
    /// Phases with a running deadline.
    pub fn is_active(self) -> bool {
        matches!(
            self,
            IntervalPhase::Countdown | IntervalPhase::Work | IntervalPhase::Rest
        )
    }
}

/// Durations are whole seconds; `total_rounds == None` runs until stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntervalConfig {
    pub countdown_secs: u32,
    pub work_secs: u32,
    pub rest_secs: u32,
    pub total_rounds: Option<u32>,
    pub beep_enabled: bool,
}

impl Default for IntervalConfig {
    fn default() -> Self {
        Self {
            countdown_secs: DEFAULT_COUNTDOWN_SECS,
            work_secs: DEFAULT_WORK_SECS,
            rest_secs: DEFAULT_REST_SECS,
            total_rounds: None,
            beep_enabled: true,
        }
    }
}

impl IntervalConfig {
    /// Zero durations take their defaults; zero rounds means unbounded.
    pub fn sanitized(self) -> Self {
        fn or_default(name: &str, value: u32, default: u32) -> u32 {
            if value == 0 {
                warn!("{name} of 0s is not usable, using {default}s");
                default
            } else {
                value
            }
        }
        Self {
            countdown_secs: or_default("countdown", self.countdown_secs, DEFAULT_COUNTDOWN_SECS),
            work_secs: or_default("work", self.work_secs, DEFAULT_WORK_SECS),
            rest_secs: or_default("rest", self.rest_secs, DEFAULT_REST_SECS),
            total_rounds: self.total_rounds.filter(|&n| n > 0),
            beep_enabled: self.beep_enabled,
        }
    }

    fn phase_ms(&self, phase: IntervalPhase) -> u64 {
        let secs = match phase {
            IntervalPhase::Countdown => self.countdown_secs,
            IntervalPhase::Work => self.work_secs,
            IntervalPhase::Rest => self.rest_secs,
            IntervalPhase::Waiting | IntervalPhase::Done => 0,
        };
        secs as u64 * 1000
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseTransition {
    pub from: IntervalPhase,
    pub to: IntervalPhase,
    pub round: u32,
    pub at_ms: u64,
}

/// Side effects produced by a tick, in the order they happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntervalEffect {
    Cue(Cue),
    Transition(PhaseTransition),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntervalTap {
    Started,
    Paused,
    Resumed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompletedRound {
    pub round: u32,
    pub completed_at_ms: u64,
    /// Session time when the work phase ended, pauses excluded.
    pub session_elapsed_ms: u64,
}

/// Countdown → work → rest → … → done.
#[derive(Debug, Clone)]
pub struct IntervalTimer {
    config: IntervalConfig,
    next_config: Option<IntervalConfig>,
    phase: IntervalPhase,
    current_round: u32,
    session_start: Option<u64>,
    phase_deadline: Option<u64>,
    paused_at: Option<u64>,
    finished_at: Option<u64>,
    last_beep: Option<(IntervalPhase, u64)>,
    ghost: Option<GhostHandTarget>,
    completed_rounds: Vec<CompletedRound>,
    ticker: PollTicker,
    delayed_cues: Scheduler<Cue>,
}

impl IntervalTimer {
    pub fn new(config: IntervalConfig) -> Self {
        Self {
            config: config.sanitized(),
            next_config: None,
            phase: IntervalPhase::Waiting,
            current_round: 0,
            session_start: None,
            phase_deadline: None,
            paused_at: None,
            finished_at: None,
            last_beep: None,
            ghost: None,
            completed_rounds: Vec::new(),
            ticker: PollTicker::new(),
            delayed_cues: Scheduler::new(),
        }
    }

    /// Begin a session with the countdown phase.
    pub fn start(&mut self, now_ms: u64, hands: &[Hand], single_hand: bool) -> Vec<IntervalEffect> {
        if self.phase.is_active() {
            return Vec::new();
        }
        if self.phase == IntervalPhase::Done {
            self.reset();
        }
        if let Some(config) = self.next_config.take() {
            self.config = config;
        }

        self.session_start = Some(now_ms);
        self.finished_at = None;
        self.paused_at = None;
        self.current_round = 1;
        self.ghost = Self::pick_ghost(now_ms, hands, single_hand);
        self.enter(IntervalPhase::Countdown, now_ms);
        self.ticker.start();
        info!(
            "interval session started: {}s countdown, {}s work, {}s rest, rounds {:?}",
            self.config.countdown_secs,
            self.config.work_secs,
            self.config.rest_secs,
            self.config.total_rounds
        );

        vec![IntervalEffect::Transition(PhaseTransition {
            from: IntervalPhase::Waiting,
            to: IntervalPhase::Countdown,
            round: 1,
            at_ms: now_ms,
        })]
    }

    /// A tap starts an idle or finished timer and pauses/resumes a running one.
    pub fn tap(&mut self, now_ms: u64, hands: &[Hand], single_hand: bool) -> IntervalTap {
        match self.phase {
            IntervalPhase::Waiting | IntervalPhase::Done => {
                self.start(now_ms, hands, single_hand);
                IntervalTap::Started
            }
            _ => {
                if self.toggle_pause(now_ms) {
                    IntervalTap::Paused
                } else {
                    IntervalTap::Resumed
                }
            }
        }
    }

    /// Returns true when the timer is now paused. Ignored outside an active
    /// phase.
    pub fn toggle_pause(&mut self, now_ms: u64) -> bool {
        if !self.phase.is_active() {
            return false;
        }
        match self.paused_at.take() {
            None => {
                self.paused_at = Some(now_ms);
                debug!("interval timer paused in {}", self.phase);
                true
            }
            Some(paused_at) => {
                let pause_ms = now_ms.saturating_sub(paused_at);
                self.phase_deadline = self.phase_deadline.map(|d| d + pause_ms);
                self.session_start = self.session_start.map(|s| s + pause_ms);
                debug!("interval timer resumed after {pause_ms}ms");
                false
            }
        }
    }

    /// Evaluate the deadline. Only ticks carrying the current run's token
    /// are honoured.
    pub fn tick(&mut self, token: TickToken, now_ms: u64) -> Vec<IntervalEffect> {
        let mut effects = Vec::new();
        if !self.ticker.accepts(token) || self.paused_at.is_some() {
            return effects;
        }
        let Some(deadline) = self.phase_deadline else {
            return effects;
        };

        let remaining = deadline as i64 - now_ms as i64;
        if remaining > 0 {
            let whole_seconds = (remaining as u64).div_ceil(1000);
            if WARNING_SECONDS.contains(&whole_seconds) {
                let key = (self.phase, whole_seconds);
                if self.last_beep != Some(key) {
                    self.last_beep = Some(key);
                    self.push_cue(&mut effects, WARNING_CUE);
                }
            }
            return effects;
        }

        self.transition(now_ms, &mut effects);
        effects
    }

    /// Delayed cues (the completion sequence) that are due by `now_ms`.
    pub fn take_due_cues(&mut self, now_ms: u64) -> Vec<Cue> {
        self.delayed_cues.take_due(now_ms)
    }

    fn transition(&mut self, now_ms: u64, effects: &mut Vec<IntervalEffect>) {
        self.push_cue(effects, TRANSITION_CUE);
        self.ghost = self.ghost.map(|g| g.advanced_to(base_seconds(now_ms)));

        let from = self.phase;
        match from {
            IntervalPhase::Countdown => self.enter(IntervalPhase::Work, now_ms),
            IntervalPhase::Work => {
                self.completed_rounds.push(CompletedRound {
                    round: self.current_round,
                    completed_at_ms: now_ms,
                    session_elapsed_ms: self
                        .session_start
                        .map_or(0, |start| now_ms.saturating_sub(start)),
                });
                let last_round = self
                    .config
                    .total_rounds
                    .is_some_and(|total| self.current_round >= total);
                if last_round {
                    self.finish(now_ms);
                } else {
                    self.enter(IntervalPhase::Rest, now_ms);
                }
            }
            IntervalPhase::Rest => {
                self.current_round += 1;
                self.enter(IntervalPhase::Work, now_ms);
            }
            IntervalPhase::Waiting | IntervalPhase::Done => return,
        }

        effects.push(IntervalEffect::Transition(PhaseTransition {
            from,
            to: self.phase,
            round: self.current_round,
            at_ms: now_ms,
        }));
    }

    fn finish(&mut self, now_ms: u64) {
        self.phase = IntervalPhase::Done;
        self.phase_deadline = None;
        self.last_beep = None;
        self.finished_at = Some(now_ms);
        self.ticker.stop();
        if self.config.beep_enabled {
            for delay in COMPLETION_DELAYS_MS {
                self.delayed_cues.schedule(now_ms + delay, COMPLETION_CUE);
            }
        }
        info!("interval session done after {} rounds", self.current_round);
    }

    fn enter(&mut self, phase: IntervalPhase, now_ms: u64) {
        self.phase = phase;
        self.phase_deadline = Some(now_ms + self.config.phase_ms(phase));
        self.last_beep = None;
    }

    fn push_cue(&self, effects: &mut Vec<IntervalEffect>, cue: Cue) {
        if self.config.beep_enabled {
            effects.push(IntervalEffect::Cue(cue));
        }
    }

    fn pick_ghost(now_ms: u64, hands: &[Hand], single_hand: bool) -> Option<GhostHandTarget> {
        let base = base_seconds(now_ms);
        // Track the chosen hand at its real position, even when the selector
        // fell back to the top.
        select_ghost_hand(hands, base, single_hand).map(|g| g.advanced_to(base))
    }

    /// Cancel the session and go back to waiting. Completed rounds stay
    /// available for review.
    pub fn stop(&mut self) {
        self.ticker.stop();
        self.delayed_cues.cancel_all();
        self.phase = IntervalPhase::Waiting;
        self.current_round = 0;
        self.session_start = None;
        self.phase_deadline = None;
        self.paused_at = None;
        self.finished_at = None;
        self.last_beep = None;
        self.ghost = None;
        if let Some(config) = self.next_config.take() {
            self.config = config;
        }
    }

    pub fn reset(&mut self) {
        self.stop();
        self.completed_rounds.clear();
    }

    /// New settings apply immediately when idle, otherwise from the next
    /// session on.
    pub fn set_config(&mut self, config: IntervalConfig) {
        let config = config.sanitized();
        if self.phase.is_active() {
            self.next_config = Some(config);
        } else {
            self.config = config;
            self.next_config = None;
        }
    }

    /// Muting applies at once, including to a running session, and drops
    /// any completion cues still queued.
    pub fn set_beep_enabled(&mut self, enabled: bool) {
        self.config.beep_enabled = enabled;
        if let Some(next) = self.next_config.as_mut() {
            next.beep_enabled = enabled;
        }
        if !enabled {
            self.delayed_cues.cancel_all();
        }
    }

    /// Re-select the tracked hand, e.g. after the single-hand setting flips.
    pub fn retarget_ghost(&mut self, now_ms: u64, hands: &[Hand], single_hand: bool) {
        if self.session_start.is_some() && self.ghost.is_some() {
            self.ghost = Self::pick_ghost(now_ms, hands, single_hand);
        }
    }

    pub fn config(&self) -> IntervalConfig {
        self.next_config.unwrap_or(self.config)
    }

    pub fn phase(&self) -> IntervalPhase {
        self.phase
    }

    pub fn is_paused(&self) -> bool {
        self.paused_at.is_some()
    }

    pub fn current_round(&self) -> u32 {
        self.current_round
    }

    pub fn has_session(&self) -> bool {
        self.session_start.is_some()
    }

    pub fn ghost(&self) -> Option<&GhostHandTarget> {
        self.ghost.as_ref()
    }

    pub fn completed_rounds(&self) -> &[CompletedRound] {
        &self.completed_rounds
    }

    pub fn ticker_token(&self) -> Option<TickToken> {
        self.ticker.token()
    }

    pub fn phase_deadline(&self) -> Option<u64> {
        self.phase_deadline
    }

    /// Time left in the current phase; frozen while paused.
    pub fn remaining_ms(&self, now_ms: u64) -> Option<u64> {
        let at = self.paused_at.unwrap_or(now_ms);
        self.phase_deadline.map(|d| d.saturating_sub(at))
    }

    pub fn session_elapsed_ms(&self, now_ms: u64) -> Option<u64> {
        let end = self.finished_at.or(self.paused_at).unwrap_or(now_ms);
        self.session_start.map(|s| end.saturating_sub(s))
    }

    pub fn status_text(&self) -> String {
        if self.is_paused() {
            return "PAUSED".to_string();
        }
        match self.phase {
            IntervalPhase::Waiting => "TAP TO START".to_string(),
            IntervalPhase::Countdown => "GET READY".to_string(),
            IntervalPhase::Work => format!("WORK: {}", self.current_round),
            IntervalPhase::Rest => format!("REST: {}", self.current_round),
            IntervalPhase::Done => "DONE!".to_string(),
        }
    }

    pub fn rounds_text(&self) -> String {
        if self.current_round == 0 {
            return String::new();
        }
        match self.config.total_rounds {
            Some(total) => format!("Round {}/{}", self.current_round, total),
            None => format!("Round {}", self.current_round),
        }
    }
}

impl Default for IntervalTimer {
    fn default() -> Self {
        Self::new(IntervalConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hand::default_hands;

    const STEP_MS: u64 = 50;

    fn short_config(rounds: Option<u32>) -> IntervalConfig {
        IntervalConfig {
            countdown_secs: 3,
            work_secs: 5,
            rest_secs: 2,
            total_rounds: rounds,
            beep_enabled: true,
        }
    }

    /// Tick from `from` to `until` (inclusive) collecting effects.
    fn run(timer: &mut IntervalTimer, from: u64, until: u64) -> Vec<IntervalEffect> {
        let mut effects = Vec::new();
        let mut now = from;
        while now <= until {
            if let Some(token) = timer.ticker_token() {
                effects.extend(timer.tick(token, now));
            }
            now += STEP_MS;
        }
        effects
    }

    fn transitions(effects: &[IntervalEffect]) -> Vec<(IntervalPhase, IntervalPhase, u32)> {
        effects
            .iter()
            .filter_map(|e| match e {
                IntervalEffect::Transition(t) => Some((t.from, t.to, t.round)),
                IntervalEffect::Cue(_) => None,
            })
            .collect()
    }

    fn count_cues(effects: &[IntervalEffect], cue: Cue) -> usize {
        effects
            .iter()
            .filter(|e| **e == IntervalEffect::Cue(cue))
            .count()
    }

    #[test]
    fn test_two_round_session_sequence() {
        let hands = default_hands();
        let mut timer = IntervalTimer::new(short_config(Some(2)));
        timer.start(0, &hands, false);
        assert_eq!(timer.phase(), IntervalPhase::Countdown);
        assert_eq!(timer.current_round(), 1);

        let effects = run(&mut timer, 0, 20_000);
        assert_eq!(
            transitions(&effects),
            vec![
                (IntervalPhase::Countdown, IntervalPhase::Work, 1),
                (IntervalPhase::Work, IntervalPhase::Rest, 1),
                (IntervalPhase::Rest, IntervalPhase::Work, 2),
                (IntervalPhase::Work, IntervalPhase::Done, 2),
            ]
        );
        assert_eq!(timer.phase(), IntervalPhase::Done);
        assert!(timer.ticker_token().is_none());
    }

    #[test]
    fn test_round_bound_terminates() {
        for rounds in 1..=4u32 {
            let hands = default_hands();
            let mut timer = IntervalTimer::new(short_config(Some(rounds)));
            timer.start(0, &hands, false);
            let effects = run(&mut timer, 0, 120_000);
            let t = transitions(&effects);
            let work = t.iter().filter(|(_, to, _)| *to == IntervalPhase::Work).count();
            let rest = t.iter().filter(|(_, to, _)| *to == IntervalPhase::Rest).count();
            assert_eq!(work as u32, rounds);
            assert_eq!(rest as u32, rounds - 1);
            assert_eq!(timer.current_round(), rounds);
            assert_eq!(timer.completed_rounds().len() as u32, rounds);
        }
    }

    #[test]
    fn test_unbounded_never_finishes() {
        let hands = default_hands();
        let mut timer = IntervalTimer::new(short_config(None));
        timer.start(0, &hands, false);
        run(&mut timer, 0, 60_000);
        assert_ne!(timer.phase(), IntervalPhase::Done);
        assert!(timer.current_round() > 5);
        assert_eq!(timer.rounds_text(), format!("Round {}", timer.current_round()));
    }

    #[test]
    fn test_warning_cues_once_per_second() {
        let hands = default_hands();
        let mut timer = IntervalTimer::new(short_config(Some(1)));
        timer.start(0, &hands, false);
        let effects = run(&mut timer, 0, 3_000);
        assert_eq!(count_cues(&effects, WARNING_CUE), 3);
        assert_eq!(count_cues(&effects, TRANSITION_CUE), 1);
        assert_eq!(timer.phase(), IntervalPhase::Work);
    }

    #[test]
    fn test_completion_sequence_is_scheduled() {
        let hands = default_hands();
        let mut timer = IntervalTimer::new(short_config(Some(1)));
        timer.start(0, &hands, false);
        run(&mut timer, 0, 8_000);
        assert_eq!(timer.phase(), IntervalPhase::Done);

        assert_eq!(timer.take_due_cues(8_000), vec![COMPLETION_CUE]);
        assert_eq!(timer.take_due_cues(8_450), vec![COMPLETION_CUE]);
        assert_eq!(timer.take_due_cues(9_000), vec![COMPLETION_CUE]);
        assert!(timer.take_due_cues(20_000).is_empty());
    }

    #[test]
    fn test_no_cues_when_beep_disabled() {
        let hands = default_hands();
        let mut timer = IntervalTimer::new(IntervalConfig {
            beep_enabled: false,
            ..short_config(Some(1))
        });
        timer.start(0, &hands, false);
        let effects = run(&mut timer, 0, 10_000);
        assert!(effects.iter().all(|e| matches!(e, IntervalEffect::Transition(_))));
        assert!(timer.take_due_cues(20_000).is_empty());
    }

    #[test]
    fn test_mute_mid_session_silences_remaining_cues() {
        let hands = default_hands();
        let mut timer = IntervalTimer::new(short_config(Some(1)));
        timer.start(0, &hands, false);
        run(&mut timer, 0, 1_000);
        timer.set_beep_enabled(false);
        assert!(!timer.config().beep_enabled);

        let effects = run(&mut timer, 1_050, 10_000);
        assert_eq!(timer.phase(), IntervalPhase::Done);
        assert!(effects.iter().all(|e| matches!(e, IntervalEffect::Transition(_))));
        assert!(timer.take_due_cues(20_000).is_empty());
    }

    #[test]
    fn test_mute_after_done_drops_queued_completion() {
        let hands = default_hands();
        let mut timer = IntervalTimer::new(short_config(Some(1)));
        timer.start(0, &hands, false);
        run(&mut timer, 0, 8_000);
        assert_eq!(timer.take_due_cues(8_000), vec![COMPLETION_CUE]);
        timer.set_beep_enabled(false);
        assert!(timer.take_due_cues(20_000).is_empty());
    }

    #[test]
    fn test_mute_updates_pending_config() {
        let hands = default_hands();
        let mut timer = IntervalTimer::new(short_config(None));
        timer.start(0, &hands, false);
        timer.set_config(IntervalConfig {
            work_secs: 30,
            ..short_config(None)
        });
        timer.set_beep_enabled(false);
        timer.stop();
        assert_eq!(timer.config().work_secs, 30);
        assert!(!timer.config().beep_enabled);
    }

    #[test]
    fn test_pause_preserves_remaining() {
        let hands = default_hands();
        let mut timer = IntervalTimer::new(short_config(Some(2)));
        timer.start(0, &hands, false);
        run(&mut timer, 0, 4_000); // in work, deadline 8_000
        let remaining = timer.remaining_ms(4_200).unwrap();

        assert!(timer.toggle_pause(4_200));
        // ticks while paused change nothing
        let effects = run(&mut timer, 4_250, 60_000);
        assert!(effects.is_empty());
        assert_eq!(timer.phase(), IntervalPhase::Work);
        assert_eq!(timer.remaining_ms(60_000), Some(remaining));
        assert_eq!(timer.status_text(), "PAUSED");

        assert!(!timer.toggle_pause(90_000));
        assert_eq!(timer.remaining_ms(90_000), Some(remaining));
        assert_eq!(timer.session_elapsed_ms(90_000), Some(4_200));
    }

    #[test]
    fn test_tap_cycles_start_pause_resume() {
        let hands = default_hands();
        let mut timer = IntervalTimer::new(short_config(Some(1)));
        assert_eq!(timer.tap(0, &hands, false), IntervalTap::Started);
        assert_eq!(timer.tap(500, &hands, false), IntervalTap::Paused);
        assert_eq!(timer.tap(700, &hands, false), IntervalTap::Resumed);
        assert_eq!(timer.phase_deadline(), Some(3_200));
    }

    #[test]
    fn test_tap_after_done_starts_fresh_session() {
        let hands = default_hands();
        let mut timer = IntervalTimer::new(short_config(Some(1)));
        timer.start(0, &hands, false);
        run(&mut timer, 0, 9_000);
        assert_eq!(timer.phase(), IntervalPhase::Done);

        assert_eq!(timer.tap(30_000, &hands, false), IntervalTap::Started);
        assert_eq!(timer.phase(), IntervalPhase::Countdown);
        assert_eq!(timer.current_round(), 1);
        assert!(timer.completed_rounds().is_empty());
        assert!(timer.take_due_cues(40_000).is_empty());
    }

    #[test]
    fn test_pause_ignored_without_active_phase() {
        let mut timer = IntervalTimer::default();
        assert!(!timer.toggle_pause(100));
        assert!(!timer.is_paused());
    }

    #[test]
    fn test_stale_tick_after_restart_is_ignored() {
        let hands = default_hands();
        let mut timer = IntervalTimer::new(short_config(Some(2)));
        timer.start(0, &hands, false);
        let stale = timer.ticker_token().unwrap();
        timer.stop();
        timer.start(100_000, &hands, false);

        assert!(timer.tick(stale, 200_000).is_empty());
        assert_eq!(timer.phase(), IntervalPhase::Countdown);
    }

    #[test]
    fn test_stop_keeps_completed_rounds() {
        let hands = default_hands();
        let mut timer = IntervalTimer::new(short_config(None));
        timer.start(0, &hands, false);
        run(&mut timer, 0, 9_000); // first work phase done
        timer.stop();

        assert_eq!(timer.phase(), IntervalPhase::Waiting);
        assert!(timer.ghost().is_none());
        assert_eq!(timer.completed_rounds().len(), 1);
        // countdown 3s + work 5s
        assert_eq!(timer.completed_rounds()[0].session_elapsed_ms, 8_000);
        assert_eq!(timer.status_text(), "TAP TO START");

        timer.reset();
        assert!(timer.completed_rounds().is_empty());
    }

    #[test]
    fn test_ghost_follows_tracked_hand() {
        let hands = default_hands();
        let mut timer = IntervalTimer::new(short_config(Some(1)));
        // base 14: yellow sits at 59 and is chosen
        timer.start(14_000, &hands, false);
        let ghost = *timer.ghost().unwrap();
        assert_eq!(ghost.color(), hands[3].color());
        assert_eq!(ghost.angular_position_seconds(), 59.0);

        run(&mut timer, 14_000, 17_000); // countdown ends at 17_000, base 17
        let ghost = *timer.ghost().unwrap();
        assert_eq!(ghost.color(), hands[3].color());
        assert_eq!(ghost.angular_position_seconds(), 2.0);
    }

    #[test]
    fn test_single_hand_tracks_reference() {
        let hands = default_hands();
        let mut timer = IntervalTimer::new(short_config(Some(1)));
        timer.start(30_000, &hands, true);
        let ghost = timer.ghost().unwrap();
        assert_eq!(ghost.color(), hands[0].color());
        assert_eq!(ghost.angular_position_seconds(), 30.0);
    }

    #[test]
    fn test_config_change_mid_session_waits() {
        let hands = default_hands();
        let mut timer = IntervalTimer::new(short_config(Some(1)));
        timer.start(0, &hands, false);
        timer.set_config(IntervalConfig {
            work_secs: 90,
            ..short_config(Some(3))
        });
        run(&mut timer, 0, 3_000);
        assert_eq!(timer.phase_deadline(), Some(8_000));
        assert_eq!(timer.config().work_secs, 90);

        timer.stop();
        timer.start(100_000, &hands, false);
        assert_eq!(timer.rounds_text(), "Round 1/3");
    }

    #[test]
    fn test_sanitized_config() {
        let config = IntervalConfig {
            countdown_secs: 0,
            work_secs: 0,
            rest_secs: 10,
            total_rounds: Some(0),
            beep_enabled: true,
        }
        .sanitized();
        assert_eq!(config.countdown_secs, DEFAULT_COUNTDOWN_SECS);
        assert_eq!(config.work_secs, DEFAULT_WORK_SECS);
        assert_eq!(config.rest_secs, 10);
        assert_eq!(config.total_rounds, None);
    }

    #[test]
    fn test_status_texts() {
        let hands = default_hands();
        let mut timer = IntervalTimer::new(short_config(Some(2)));
        assert_eq!(timer.rounds_text(), "");
        timer.start(0, &hands, false);
        assert_eq!(timer.status_text(), "GET READY");
        assert_eq!(timer.rounds_text(), "Round 1/2");
        run(&mut timer, 0, 3_000);
        assert_eq!(timer.status_text(), "WORK: 1");
        run(&mut timer, 3_050, 8_000);
        assert_eq!(timer.status_text(), "REST: 1");
    }
}
