use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::{DisableFocusChange, EnableFocusChange},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use log::{info, warn};
use paceclock::{
    app::{wall_clock_ms, App, Control},
    app_dirs::AppDirs,
    config::{FileSettingsStore, Mode, Settings, SettingsStore},
    cue::CuePlayer,
    export::CsvExporter,
    runtime::{ClockEventSource, CrosstermEventSource, FixedTicker, Runner, Ticker},
    ui,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{
    error::Error,
    fs::OpenOptions,
    io::{self, stdin},
    path::PathBuf,
};

/// analog lap and interval timer for the terminal
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "An analog workout clock: a lap timer with rest tracking and CSV export, and an interval timer with countdown, work and rest phases and audible cues."
)]
pub struct Cli {
    /// timer to open with (remembered for next time)
    #[clap(short = 'm', long, value_enum)]
    mode: Option<Mode>,

    /// interval countdown in seconds
    #[clap(long)]
    countdown: Option<u32>,

    /// interval work phase in seconds
    #[clap(short = 'w', long)]
    work: Option<u32>,

    /// interval rest phase in seconds
    #[clap(short = 'r', long)]
    rest: Option<u32>,

    /// number of interval rounds
    #[clap(short = 'n', long, conflicts_with = "infinite")]
    rounds: Option<u32>,

    /// run interval rounds until stopped
    #[clap(long)]
    infinite: bool,

    /// disable interval cues
    #[clap(long)]
    mute: bool,

    /// cue volume in percent
    #[clap(long, value_parser = clap::value_parser!(u8).range(0..=100))]
    volume: Option<u8>,

    /// name used for the exported lap history
    #[clap(long)]
    session_name: Option<String>,

    /// directory exports are written to
    #[clap(long)]
    export_dir: Option<PathBuf>,

    /// settings file to use instead of the default location
    #[clap(long)]
    config: Option<PathBuf>,
}

impl Cli {
    /// Fold command-line overrides into the settings. Returns true when
    /// anything changed.
    fn apply(&self, settings: &mut Settings) -> bool {
        let before = settings.clone();
        if let Some(mode) = self.mode {
            settings.current_mode = mode;
        }
        let interval = &mut settings.interval_timer;
        if let Some(secs) = self.countdown {
            interval.countdown = secs;
        }
        if let Some(secs) = self.work {
            interval.work_time = secs;
        }
        if let Some(secs) = self.rest {
            interval.rest_time = secs;
        }
        if let Some(rounds) = self.rounds {
            interval.total_rounds = Some(rounds);
        }
        if self.infinite {
            interval.total_rounds = None;
        }
        if self.mute {
            interval.beep_enabled = false;
        }
        if let Some(volume) = self.volume {
            interval.volume = volume;
        }
        *settings = settings.clone().sanitized();
        *settings != before
    }

    fn store(&self) -> FileSettingsStore {
        match &self.config {
            Some(path) => FileSettingsStore::with_path(path),
            None => FileSettingsStore::new(),
        }
    }
}

fn init_logging() {
    let mut builder = env_logger::Builder::from_default_env();
    builder.filter_level(log::LevelFilter::Info);

    if let Some(path) = AppDirs::log_path() {
        let file = path
            .parent()
            .map_or(Ok(()), std::fs::create_dir_all)
            .and_then(|_| OpenOptions::new().create(true).append(true).open(&path));
        match file {
            Ok(file) => {
                builder.target(env_logger::Target::Pipe(Box::new(file)));
            }
            Err(e) => eprintln!("could not open log file {}: {e}", path.display()),
        }
    }
    let _ = builder.try_init();
}

#[cfg(feature = "audio")]
fn cue_player() -> Box<dyn CuePlayer> {
    match paceclock::cue::TonePlayer::try_new() {
        Ok(player) => Box::new(player),
        Err(e) => {
            warn!("{e}; falling back to the terminal bell");
            Box::new(paceclock::cue::TerminalBell::new())
        }
    }
}

#[cfg(not(feature = "audio"))]
fn cue_player() -> Box<dyn CuePlayer> {
    Box::new(paceclock::cue::TerminalBell::new())
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    init_logging();

    let store = cli.store();
    let mut settings = store.load();
    if cli.apply(&mut settings) {
        if let Err(e) = store.save(&settings) {
            warn!("failed to persist command-line settings: {e}");
        }
    }
    info!("starting in {:?} mode", settings.current_mode);

    let mut app = App::new(settings, Box::new(store))
        .with_player(cue_player())
        .with_session_name(cli.session_name.clone());
    if let Some(dir) = &cli.export_dir {
        app = app.with_exporter(Box::new(CsvExporter::new(dir)));
    }

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableFocusChange)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let runner = Runner::new(CrosstermEventSource::new(), FixedTicker::default());
    let result = start_tui(&mut terminal, &mut app, &runner);

    app.release_wake_lock();
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        DisableFocusChange,
        LeaveAlternateScreen
    )?;
    terminal.show_cursor()?;

    result
}

fn start_tui<B: Backend, E: ClockEventSource, T: Ticker>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    runner: &Runner<E, T>,
) -> Result<(), Box<dyn Error>> {
    let now = wall_clock_ms();
    terminal.draw(|f| ui::draw(app, f, now))?;

    loop {
        let event = runner.step();
        let now = wall_clock_ms();
        if app.handle_event(event, now) == Control::Quit {
            info!("quit requested");
            return Ok(());
        }
        terminal.draw(|f| ui::draw(app, f, now))?;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::path::Path;

    #[test]
    fn test_cli_default_values() {
        let cli = Cli::parse_from(["paceclock"]);

        assert_eq!(cli.mode, None);
        assert_eq!(cli.countdown, None);
        assert_eq!(cli.rounds, None);
        assert!(!cli.infinite);
        assert!(!cli.mute);
        assert_eq!(cli.volume, None);
        assert_eq!(cli.config, None);
    }

    #[test]
    fn test_cli_mode() {
        let cli = Cli::parse_from(["paceclock", "--mode", "interval-timer"]);
        assert_eq!(cli.mode, Some(Mode::IntervalTimer));

        let cli = Cli::parse_from(["paceclock", "-m", "lap-timer"]);
        assert_eq!(cli.mode, Some(Mode::LapTimer));
    }

    #[test]
    fn test_cli_interval_durations() {
        let cli = Cli::parse_from(["paceclock", "-w", "40", "-r", "20", "--countdown", "3"]);
        assert_eq!(cli.work, Some(40));
        assert_eq!(cli.rest, Some(20));
        assert_eq!(cli.countdown, Some(3));
    }

    #[test]
    fn test_cli_rounds_conflict_with_infinite() {
        let res = Cli::try_parse_from(["paceclock", "--rounds", "4", "--infinite"]);
        assert!(res.is_err());
    }

    #[test]
    fn test_cli_volume_range() {
        let cli = Cli::parse_from(["paceclock", "--volume", "100"]);
        assert_eq!(cli.volume, Some(100));
        assert!(Cli::try_parse_from(["paceclock", "--volume", "101"]).is_err());
    }

    #[test]
    fn test_apply_without_overrides_changes_nothing() {
        let cli = Cli::parse_from(["paceclock"]);
        let mut settings = Settings::default();
        assert!(!cli.apply(&mut settings));
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_apply_overrides() {
        let cli = Cli::parse_from([
            "paceclock",
            "--mode",
            "interval-timer",
            "-w",
            "45",
            "-n",
            "8",
            "--mute",
            "--volume",
            "30",
        ]);
        let mut settings = Settings::default();
        assert!(cli.apply(&mut settings));
        assert_eq!(settings.current_mode, Mode::IntervalTimer);
        assert_eq!(settings.interval_timer.work_time, 45);
        assert_eq!(settings.interval_timer.total_rounds, Some(8));
        assert!(!settings.interval_timer.beep_enabled);
        assert_eq!(settings.interval_timer.volume, 30);
    }

    #[test]
    fn test_apply_infinite_clears_rounds() {
        let cli = Cli::parse_from(["paceclock", "--infinite"]);
        let mut settings = Settings::default();
        settings.interval_timer.total_rounds = Some(5);
        assert!(cli.apply(&mut settings));
        assert_eq!(settings.interval_timer.total_rounds, None);
    }

    #[test]
    fn test_apply_zero_work_falls_back_to_default() {
        let cli = Cli::parse_from(["paceclock", "-w", "0"]);
        let mut settings = Settings::default();
        cli.apply(&mut settings);
        assert_eq!(
            settings.interval_timer.work_time,
            Settings::default().interval_timer.work_time
        );
    }

    #[test]
    fn test_config_flag_selects_store_path() {
        let cli = Cli::parse_from(["paceclock", "--config", "/tmp/pace.json"]);
        assert_eq!(cli.store().path(), Path::new("/tmp/pace.json"));
    }
}
