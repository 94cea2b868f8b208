//! Crate-wide error type.
//!
//! Configuration problems (bad widths, lengths, offsets) surface as errors at
//! construction time. Everything that talks to the outside world (settings
//! file, audio device, export directory) also maps into `ClockError`, but
//! those are absorbed and logged by `App` instead of being propagated.

use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClockError {
    // ---------------------------
    // Configuration
    // ---------------------------
    #[error("hand width must be positive, got {0}")]
    InvalidWidth(f64),

    #[error("hand length must be positive, got {0}")]
    InvalidLength(f64),

    #[error("hand offset must be within 0..60 seconds, got {0}")]
    InvalidOffset(f64),

    #[error("diamond head ({head}) does not fit in a hand of length {length}")]
    HeadExceedsLength { head: f64, length: f64 },

    #[error("canvas size must be positive, got {0}")]
    InvalidCanvas(f64),

    // ---------------------------
    // Collaborators
    // ---------------------------
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("settings encoding error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("export error: {0}")]
    Csv(#[from] csv::Error),

    #[error("audio error: {0}")]
    Audio(String),

    #[error("wake lock error: {0}")]
    WakeLock(String),

    #[error("no recorded laps to export")]
    NothingToExport,
}

pub type Result<T> = std::result::Result<T, ClockError>;
