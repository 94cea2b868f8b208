use directories::ProjectDirs;
use std::path::PathBuf;

const APP_NAME: &str = "paceclock";

/// Centralized application directory resolution
pub struct AppDirs;

impl AppDirs {
    /// Directory for the log file and other runtime state.
    pub fn state_dir() -> Option<PathBuf> {
        if let Ok(home) = std::env::var("HOME") {
            Some(PathBuf::from(home).join(".local").join("state").join(APP_NAME))
        } else {
            ProjectDirs::from("", "", APP_NAME).map(|pd| pd.data_local_dir().to_path_buf())
        }
    }

    pub fn log_path() -> Option<PathBuf> {
        Self::state_dir().map(|dir| dir.join(format!("{APP_NAME}.log")))
    }

    /// Default destination for exported sessions.
    pub fn export_dir() -> PathBuf {
        ProjectDirs::from("", "", APP_NAME)
            .map(|pd| pd.data_dir().join("sessions"))
            .unwrap_or_else(|| PathBuf::from("."))
    }
}
