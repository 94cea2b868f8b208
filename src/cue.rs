//! Audio cues.
//!
//! Timers only describe the tones they want; a [`CuePlayer`] makes the
//! noise. Playback is best-effort: callers log failures and move on.

use std::io::{self, Write};

use log::debug;

use crate::error::{ClockError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cue {
    pub frequency_hz: u32,
    pub duration_ms: u64,
}

impl Cue {
    pub const fn new(frequency_hz: u32, duration_ms: u64) -> Self {
        Self {
            frequency_hz,
            duration_ms,
        }
    }
}

/// Short blip at 3, 2 and 1 seconds remaining.
pub const WARNING_CUE: Cue = Cue::new(600, 100);
/// Long tone on every phase timeout.
pub const TRANSITION_CUE: Cue = Cue::new(1000, 500);
/// One beep of the session-complete sequence.
pub const COMPLETION_CUE: Cue = Cue::new(1000, 200);
/// Delays of the completion beeps after the final transition.
pub const COMPLETION_DELAYS_MS: [u64; 3] = [0, 400, 800];

pub trait CuePlayer {
    fn play(&mut self, frequency_hz: u32, duration_ms: u64) -> Result<()>;

    /// Volume in percent, 0..=100.
    fn set_volume(&mut self, _volume: u8) {}
}

/// Drops every cue. Used when no output is wanted or available.
#[derive(Debug, Default)]
pub struct SilentPlayer;

impl CuePlayer for SilentPlayer {
    fn play(&mut self, frequency_hz: u32, duration_ms: u64) -> Result<()> {
        debug!("silent cue {frequency_hz}Hz for {duration_ms}ms");
        Ok(())
    }
}

/// Rings the terminal bell; pitch and length are not expressible, volume
/// zero mutes it.
#[derive(Debug)]
pub struct TerminalBell {
    muted: bool,
}

impl TerminalBell {
    pub fn new() -> Self {
        Self { muted: false }
    }
}

impl Default for TerminalBell {
    fn default() -> Self {
        Self::new()
    }
}

impl CuePlayer for TerminalBell {
    fn play(&mut self, _frequency_hz: u32, _duration_ms: u64) -> Result<()> {
        if self.muted {
            return Ok(());
        }
        let mut out = io::stdout();
        out.write_all(b"\x07")
            .and_then(|_| out.flush())
            .map_err(|e| ClockError::Audio(e.to_string()))
    }

    fn set_volume(&mut self, volume: u8) {
        self.muted = volume == 0;
    }
}

#[cfg(feature = "audio")]
pub use tone::TonePlayer;

#[cfg(feature = "audio")]
mod tone {
    use std::time::Duration;

    use rodio::source::{SineWave, Source};
    use rodio::{OutputStream, OutputStreamHandle, Sink};

    use super::CuePlayer;
    use crate::error::{ClockError, Result};

    /// Sine tones through the default output device.
    pub struct TonePlayer {
        _stream: OutputStream,
        handle: OutputStreamHandle,
        volume: f32,
    }

    impl TonePlayer {
        pub fn try_new() -> Result<Self> {
            let (stream, handle) = OutputStream::try_default()
                .map_err(|e| ClockError::Audio(format!("failed to open output stream: {e}")))?;
            Ok(Self {
                _stream: stream,
                handle,
                volume: 0.7,
            })
        }
    }

    impl CuePlayer for TonePlayer {
        fn play(&mut self, frequency_hz: u32, duration_ms: u64) -> Result<()> {
            let sink = Sink::try_new(&self.handle)
                .map_err(|e| ClockError::Audio(format!("failed to create sink: {e}")))?;
            let tone = SineWave::new(frequency_hz as f32)
                .take_duration(Duration::from_millis(duration_ms))
                .amplify(self.volume * 0.3);
            sink.append(tone);
            sink.detach();
            Ok(())
        }

        fn set_volume(&mut self, volume: u8) {
            self.volume = (volume.min(100) as f32) / 100.0;
        }
    }
}
