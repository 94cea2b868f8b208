//! Draft editing of the interval settings, applied only on save.

use strum_macros::Display;

use crate::config::IntervalSettings;

const SECONDS_STEP: u32 = 5;
const VOLUME_STEP: u8 = 10;
const MAX_PHASE_SECS: u32 = 3600;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum IntervalField {
    Countdown,
    Work,
    Rest,
    Rounds,
    Volume,
}

impl IntervalField {
    pub const ALL: [IntervalField; 5] = [
        IntervalField::Countdown,
        IntervalField::Work,
        IntervalField::Rest,
        IntervalField::Rounds,
        IntervalField::Volume,
    ];

    pub fn next(self) -> Self {
        match self {
            IntervalField::Countdown => IntervalField::Work,
            IntervalField::Work => IntervalField::Rest,
            IntervalField::Rest => IntervalField::Rounds,
            IntervalField::Rounds => IntervalField::Volume,
            IntervalField::Volume => IntervalField::Countdown,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            IntervalField::Countdown => IntervalField::Volume,
            IntervalField::Work => IntervalField::Countdown,
            IntervalField::Rest => IntervalField::Work,
            IntervalField::Rounds => IntervalField::Rest,
            IntervalField::Volume => IntervalField::Rounds,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntervalEditor {
    field: IntervalField,
    draft: IntervalSettings,
}

impl IntervalEditor {
    pub fn new(current: IntervalSettings) -> Self {
        Self {
            field: IntervalField::Countdown,
            draft: current,
        }
    }

    pub fn field(&self) -> IntervalField {
        self.field
    }

    pub fn draft(&self) -> IntervalSettings {
        self.draft
    }

    pub fn select_next(&mut self) {
        self.field = self.field.next();
    }

    pub fn select_prev(&mut self) {
        self.field = self.field.prev();
    }

    /// Move the selected field `steps` notches up (positive) or down.
    /// The countdown moves by one second, work and rest by five, volume by
    /// ten percent. Rounds below one become unbounded.
    pub fn adjust(&mut self, steps: i32) {
        let d = &mut self.draft;
        match self.field {
            IntervalField::Countdown => d.countdown = shift(d.countdown, steps, 1),
            IntervalField::Work => d.work_time = shift(d.work_time, steps, SECONDS_STEP),
            IntervalField::Rest => d.rest_time = shift(d.rest_time, steps, SECONDS_STEP),
            IntervalField::Rounds => {
                let current = d.total_rounds.unwrap_or(0) as i64;
                let next = current + steps as i64;
                d.total_rounds = (next >= 1).then(|| next.min(u32::MAX as i64) as u32);
            }
            IntervalField::Volume => {
                let next = d.volume as i32 + steps * VOLUME_STEP as i32;
                d.volume = next.clamp(0, 100) as u8;
            }
        }
    }

    /// Display value of a field in the draft.
    pub fn value_text(&self, field: IntervalField) -> String {
        let d = &self.draft;
        match field {
            IntervalField::Countdown => format!("{}s", d.countdown),
            IntervalField::Work => format!("{}s", d.work_time),
            IntervalField::Rest => format!("{}s", d.rest_time),
            IntervalField::Rounds => d
                .total_rounds
                .map_or_else(|| "∞".to_string(), |n| n.to_string()),
            IntervalField::Volume => format!("{}%", d.volume),
        }
    }
}

fn shift(value: u32, steps: i32, step: u32) -> u32 {
    let next = value as i64 + steps as i64 * step as i64;
    next.clamp(1, MAX_PHASE_SECS as i64) as u32
}
