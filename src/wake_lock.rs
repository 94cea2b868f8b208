use log::{debug, info};

use crate::error::Result;

/// Best-effort "keep the display awake" handle.
pub trait WakeLock {
    fn request(&mut self) -> Result<()>;
    fn release(&mut self) -> Result<()>;
    fn is_held(&self) -> bool;
}

/// A terminal has no portable way to hold the display awake, so this only
/// tracks and logs the state the front end asked for.
#[derive(Debug, Default)]
pub struct LoggingWakeLock {
    held: bool,
}

impl LoggingWakeLock {
    pub fn new() -> Self {
        Self::default()
    }
}

impl WakeLock for LoggingWakeLock {
    fn request(&mut self) -> Result<()> {
        if self.held {
            debug!("wake lock already held");
        } else {
            self.held = true;
            info!("wake lock acquired");
        }
        Ok(())
    }

    fn release(&mut self) -> Result<()> {
        if self.held {
            self.held = false;
            info!("wake lock released");
        }
        Ok(())
    }

    fn is_held(&self) -> bool {
        self.held
    }
}
