//! HR Attendance - in-memory employee directory, attendance and timesheets.

use std::io;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use hr_attendance as app;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

use app::clock::{Clock, SystemClock};
use app::config::{AppConfig, ConfigLoadResult, LoggingConfig};
use app::console::Console;
use app::notify::NotificationLog;
use app::tracker::{AttendanceTracker, TrackerState};
use app::seed;

/// In-memory HR demo: employee directory, attendance clock-in/out and timesheets.
#[derive(Parser)]
#[command(name = "hr-attendance", version)]
struct Cli {
    /// Use config.toml from current directory (dev mode)
    #[arg(long)]
    dev: bool,

    /// Explicit config file path
    #[arg(long, conflicts_with = "dev")]
    config: Option<PathBuf>,

    /// Seed file to load instead of the configured data
    #[arg(long)]
    seed: Option<PathBuf>,

    /// Print snapshots and notifications as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Determine config path based on mode
    let config_path = match (&cli.config, cli.dev) {
        (Some(path), _) => path.clone(),
        (None, true) => PathBuf::from("config.toml"),
        (None, false) => AppConfig::locate(),
    };

    let (config, config_status) = match AppConfig::try_load(&config_path) {
        ConfigLoadResult::Loaded(config) => (config, "loaded".to_string()),
        ConfigLoadResult::Missing => (AppConfig::default(), "missing, using defaults".to_string()),
        ConfigLoadResult::Invalid(e) => {
            anyhow::bail!("Config {} is invalid: {e}", config_path.display());
        }
    };

    let _guard = init_logging(&config.logging)?;
    tracing::info!("HR Attendance starting...");
    tracing::info!("Config {:?}: {}", config_path, config_status);

    let clock = SystemClock;
    let state = load_state(&cli, &config, clock.now().date())?;
    tracing::info!(
        "State ready: {} employees, {} attendance records, {} timesheets",
        state.employees().len(),
        state.attendance().len(),
        state.timesheets().len()
    );

    let notifications = NotificationLog::default();
    let tracker = AttendanceTracker::new(state, clock, notifications.clone())
        .with_departments(config.roster.departments.clone())
        .with_end_of_day(config.attendance.end_of_day);

    if !cli.json {
        println!("{} - type `help` for commands, `quit` to leave", config.company.name);
    }

    let stdin = io::stdin();
    let mut console = Console::new(tracker, notifications, io::stdout(), cli.json);
    console.run(stdin.lock())?;

    tracing::info!("HR Attendance exiting");
    Ok(())
}

/// Initial state from `--seed`, the configured seed file, or the sample data.
fn load_state(cli: &Cli, config: &AppConfig, today: chrono::NaiveDate) -> anyhow::Result<TrackerState> {
    if let Some(path) = cli.seed.as_ref().or(config.seed.path.as_ref()) {
        return seed::load(path).with_context(|| format!("Failed to load seed file {}", path.display()));
    }
    if config.seed.use_sample_data {
        Ok(seed::sample_state(today))
    } else {
        Ok(TrackerState::default())
    }
}

/// Initialize stderr logging, plus a daily log file when configured.
///
/// The returned guard must live until exit so buffered lines are flushed.
fn init_logging(logging: &LoggingConfig) -> anyhow::Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&logging.level))
        .context("Invalid log filter")?;

    let stderr_layer = tracing_subscriber::fmt::layer().with_writer(io::stderr);

    match &logging.directory {
        Some(directory) => {
            let appender = tracing_appender::rolling::daily(directory, "hr-attendance.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::registry()
                .with(filter)
                .with(stderr_layer)
                .with(tracing_subscriber::fmt::layer().with_ansi(false).with_writer(writer))
                .init();
            Ok(Some(guard))
        }
        None => {
            tracing_subscriber::registry().with(filter).with(stderr_layer).init();
            Ok(None)
        }
    }
}
