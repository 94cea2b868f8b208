use clap::ValueEnum;
use directories::ProjectDirs;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::hand::{HandStyle, HandWidth};
use crate::interval_timer::{
    IntervalConfig, DEFAULT_COUNTDOWN_SECS, DEFAULT_REST_SECS, DEFAULT_WORK_SECS,
};
use crate::lap_timer::{LapTimerConfig, DEFAULT_GUARD_INTERVAL_MS};

pub const DEFAULT_VOLUME: u8 = 70;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "camelCase")]
pub enum Mode {
    #[default]
    LapTimer,
    IntervalTimer,
}

/// Face appearance, shared by both modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DisplaySettings {
    pub dark: bool,
    pub ghost_hand: bool,
    pub hand_style: HandStyle,
    pub hand_width: HandWidth,
    pub single_hand: bool,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            dark: true,
            ghost_hand: true,
            hand_style: HandStyle::default(),
            hand_width: HandWidth::default(),
            single_hand: false,
        }
    }
}

/// Interval-timer configuration as persisted (whole seconds).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IntervalSettings {
    pub countdown: u32,
    pub work_time: u32,
    pub rest_time: u32,
    pub total_rounds: Option<u32>,
    pub beep_enabled: bool,
    pub volume: u8,
}

impl Default for IntervalSettings {
    fn default() -> Self {
        Self {
            countdown: DEFAULT_COUNTDOWN_SECS,
            work_time: DEFAULT_WORK_SECS,
            rest_time: DEFAULT_REST_SECS,
            total_rounds: None,
            beep_enabled: true,
            volume: DEFAULT_VOLUME,
        }
    }
}

impl IntervalSettings {
    pub fn to_config(&self) -> IntervalConfig {
        IntervalConfig {
            countdown_secs: self.countdown,
            work_secs: self.work_time,
            rest_secs: self.rest_time,
            total_rounds: self.total_rounds,
            beep_enabled: self.beep_enabled,
        }
        .sanitized()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    #[serde(flatten)]
    pub display: DisplaySettings,
    pub track_rest: bool,
    pub guard: bool,
    pub guard_interval_ms: u64,
    pub current_mode: Mode,
    pub interval_timer: IntervalSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            display: DisplaySettings::default(),
            track_rest: true,
            guard: true,
            guard_interval_ms: DEFAULT_GUARD_INTERVAL_MS,
            current_mode: Mode::default(),
            interval_timer: IntervalSettings::default(),
        }
    }
}

impl Settings {
    /// Fold out-of-range values back to their defaults.
    pub fn sanitized(mut self) -> Self {
        let interval = self.interval_timer.to_config();
        self.interval_timer = IntervalSettings {
            countdown: interval.countdown_secs,
            work_time: interval.work_secs,
            rest_time: interval.rest_secs,
            total_rounds: interval.total_rounds,
            beep_enabled: interval.beep_enabled,
            volume: self.interval_timer.volume.min(100),
        };
        self.guard_interval_ms = self.lap_timer_config().guard_interval_ms;
        self
    }

    pub fn lap_timer_config(&self) -> LapTimerConfig {
        LapTimerConfig {
            track_rest: self.track_rest,
            guard: self.guard,
            guard_interval_ms: self.guard_interval_ms,
        }
        .sanitized()
    }

    pub fn interval_config(&self) -> IntervalConfig {
        self.interval_timer.to_config()
    }
}

pub trait SettingsStore {
    fn load(&self) -> Settings;
    fn save(&self, settings: &Settings) -> Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileSettingsStore {
    path: PathBuf,
}

impl FileSettingsStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let path = if let Some(pd) = ProjectDirs::from("", "", "paceclock") {
            pd.config_dir().join("config.json")
        } else {
            PathBuf::from("paceclock_config.json")
        };
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileSettingsStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SettingsStore for FileSettingsStore {
    fn load(&self) -> Settings {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("no settings at {}, using defaults", self.path.display());
                return Settings::default();
            }
            Err(e) => {
                warn!("failed to read settings {}: {e}", self.path.display());
                return Settings::default();
            }
        };
        match serde_json::from_slice::<Settings>(&bytes) {
            Ok(settings) => settings.sanitized(),
            Err(e) => {
                warn!("malformed settings {}: {e}", self.path.display());
                Settings::default()
            }
        }
    }

    fn save(&self, settings: &Settings) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(settings)?;
        fs::write(&self.path, data)?;
        Ok(())
    }
}

/// Keeps settings in memory only.
#[derive(Debug, Default)]
pub struct MemorySettingsStore {
    saved: std::cell::RefCell<Option<Settings>>,
}

impl MemorySettingsStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_saved(&self) -> Option<Settings> {
        self.saved.borrow().clone()
    }
}

impl SettingsStore for MemorySettingsStore {
    fn load(&self) -> Settings {
        self.last_saved().unwrap_or_default()
    }

    fn save(&self, settings: &Settings) -> Result<()> {
        *self.saved.borrow_mut() = Some(settings.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn roundtrip_default_settings() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        let store = FileSettingsStore::with_path(&path);
        let settings = Settings::default();
        store.save(&settings).unwrap();
        let loaded = store.load();
        assert_eq!(settings, loaded);
    }

    #[test]
    fn save_and_load_custom_settings() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let store = FileSettingsStore::with_path(&path);
        let settings = Settings {
            display: DisplaySettings {
                dark: false,
                ghost_hand: false,
                hand_style: HandStyle::Diamond,
                hand_width: HandWidth::Bold,
                single_hand: true,
            },
            track_rest: false,
            guard: false,
            guard_interval_ms: 500,
            current_mode: Mode::IntervalTimer,
            interval_timer: IntervalSettings {
                countdown: 3,
                work_time: 40,
                rest_time: 20,
                total_rounds: Some(8),
                beep_enabled: false,
                volume: 30,
            },
        };
        store.save(&settings).unwrap();
        assert_eq!(store.load(), settings);
    }

    #[test]
    fn json_uses_flat_camel_case_keys() {
        let value = serde_json::to_value(Settings::default()).unwrap();
        assert_eq!(value["dark"], true);
        assert_eq!(value["ghostHand"], true);
        assert_eq!(value["handStyle"], "straight");
        assert_eq!(value["handWidth"], "standard");
        assert_eq!(value["currentMode"], "lapTimer");
        assert_eq!(value["trackRest"], true);
        assert_eq!(value["intervalTimer"]["workTime"], 60);
        assert!(value["intervalTimer"]["totalRounds"].is_null());
    }

    #[test]
    fn missing_keys_take_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"dark": false, "intervalTimer": {"workTime": 45}}"#).unwrap();
        let loaded = FileSettingsStore::with_path(&path).load();
        assert!(!loaded.display.dark);
        assert!(loaded.display.ghost_hand);
        assert_eq!(loaded.interval_timer.work_time, 45);
        assert_eq!(loaded.interval_timer.rest_time, 60);
        assert_eq!(loaded.interval_timer.volume, 70);
    }

    #[test]
    fn malformed_file_yields_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, b"{not json").unwrap();
        assert_eq!(FileSettingsStore::with_path(&path).load(), Settings::default());
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempdir().unwrap();
        let store = FileSettingsStore::with_path(dir.path().join("absent.json"));
        assert_eq!(store.load(), Settings::default());
    }

    #[test]
    fn out_of_range_values_are_sanitized() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(
            &path,
            r#"{"guardIntervalMs": 5, "intervalTimer": {"countdown": 0, "totalRounds": 0, "volume": 250}}"#,
        )
        .unwrap();
        let loaded = FileSettingsStore::with_path(&path).load();
        assert_eq!(loaded.guard_interval_ms, DEFAULT_GUARD_INTERVAL_MS);
        assert_eq!(loaded.interval_timer.countdown, DEFAULT_COUNTDOWN_SECS);
        assert_eq!(loaded.interval_timer.total_rounds, None);
        assert_eq!(loaded.interval_timer.volume, 100);
    }

    #[test]
    fn save_into_unwritable_location_errors() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("file");
        fs::write(&blocker, b"x").unwrap();
        let store = FileSettingsStore::with_path(blocker.join("config.json"));
        assert!(store.save(&Settings::default()).is_err());
    }

    #[test]
    fn memory_store_keeps_last_save() {
        let store = MemorySettingsStore::new();
        assert_eq!(store.load(), Settings::default());
        let settings = Settings {
            current_mode: Mode::IntervalTimer,
            ..Settings::default()
        };
        store.save(&settings).unwrap();
        assert_eq!(store.load().current_mode, Mode::IntervalTimer);
    }
}
