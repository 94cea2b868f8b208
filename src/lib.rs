// Library surface for the binary, headless integration tests and reuse.
pub mod app;
pub mod app_dirs;
pub mod config;
pub mod cue;
pub mod error;
pub mod export;
pub mod format;
pub mod geometry;
pub mod ghost;
pub mod hand;
pub mod interval_editor;
pub mod interval_timer;
pub mod lap_timer;
pub mod render;
pub mod runtime;
pub mod scheduler;
pub mod ui;
pub mod wake_lock;
