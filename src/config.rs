//! Configuration management module.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use chrono::NaiveTime;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing_subscriber::EnvFilter;

use crate::tracker::DEFAULT_DEPARTMENTS;

/// Configuration load result.
#[derive(Debug)]
pub enum ConfigLoadResult {
    /// Config loaded successfully.
    Loaded(AppConfig),
    /// Config file missing (first run).
    Missing,
    /// Config file exists but invalid.
    Invalid(ConfigError),
}

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Read(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Validation failed: {0}")]
    Validation(String),
}

/// Main application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub company: CompanyConfig,
    pub roster: RosterConfig,
    pub attendance: AttendanceConfig,
    pub seed: SeedConfig,
    pub logging: LoggingConfig,
}

/// Company shown in the console banner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompanyConfig {
    pub name: String,
}

/// Directory settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RosterConfig {
    pub departments: Vec<String>,
}

/// Attendance settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttendanceConfig {
    /// End shown on the calendar for records still open (default: 23:59:59).
    #[serde(default = "default_end_of_day")]
    pub end_of_day: NaiveTime,
}

fn default_end_of_day() -> NaiveTime {
    NaiveTime::from_hms_opt(23, 59, 59).unwrap_or(NaiveTime::MIN)
}

/// Initial data settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedConfig {
    /// Start with the built-in sample roster and timesheets.
    pub use_sample_data: bool,
    /// Seed file loaded instead of the sample data.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `tracing` filter directive, e.g. `info` or `hr_attendance=debug`.
    pub level: String,
    /// Directory for a daily-rolling log file; stderr only when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub directory: Option<PathBuf>,
}

impl AppConfig {
    /// Get config file path (same directory as executable).
    pub fn default_path() -> PathBuf {
        std::env::current_exe()
            .ok()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()))
            .unwrap_or_else(|| PathBuf::from("."))
            .join("config.toml")
    }

    /// Per-user config path, e.g. `~/.config/hr-attendance/config.toml`.
    pub fn user_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "hr-attendance").map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// First existing candidate among the executable and per-user paths.
    pub fn locate() -> PathBuf {
        let exe_path = Self::default_path();
        if exe_path.exists() {
            return exe_path;
        }
        Self::user_path().filter(|p| p.exists()).unwrap_or(exe_path)
    }

    /// Attempt to load config with detailed result.
    pub fn try_load(path: &Path) -> ConfigLoadResult {
        if !path.exists() {
            return ConfigLoadResult::Missing;
        }

        match std::fs::read_to_string(path) {
            Ok(content) => match toml::from_str::<AppConfig>(&content) {
                Ok(config) => match config.validate() {
                    Ok(()) => ConfigLoadResult::Loaded(config),
                    Err(e) => ConfigLoadResult::Invalid(e),
                },
                Err(e) => ConfigLoadResult::Invalid(ConfigError::Parse(e)),
            },
            Err(e) => ConfigLoadResult::Invalid(ConfigError::Read(e)),
        }
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.company.name.trim().is_empty() {
            return Err(ConfigError::Validation("Company name cannot be empty".to_string()));
        }
        if self.roster.departments.is_empty() {
            return Err(ConfigError::Validation(
                "At least one department is required".to_string(),
            ));
        }
        let mut seen = HashSet::new();
        for department in &self.roster.departments {
            if department.trim().is_empty() {
                return Err(ConfigError::Validation("Department names cannot be empty".to_string()));
            }
            if !seen.insert(department.as_str()) {
                return Err(ConfigError::Validation(format!("Duplicate department: {department}")));
            }
        }
        if self.attendance.end_of_day == NaiveTime::MIN {
            return Err(ConfigError::Validation(
                "End of day must be later than midnight".to_string(),
            ));
        }
        if EnvFilter::try_new(&self.logging.level).is_err() {
            return Err(ConfigError::Validation(format!(
                "Invalid log level: {}",
                self.logging.level
            )));
        }
        Ok(())
    }

    /// Save configuration to file.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

impl Default for CompanyConfig {
    fn default() -> Self {
        Self {
            name: "HR Manager".to_string(),
        }
    }
}

impl Default for RosterConfig {
    fn default() -> Self {
        Self {
            departments: DEFAULT_DEPARTMENTS.iter().map(|d| d.to_string()).collect(),
        }
    }
}

impl Default for AttendanceConfig {
    fn default() -> Self {
        Self {
            end_of_day: default_end_of_day(),
        }
    }
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            use_sample_data: true,
            path: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            directory: None,
        }
    }
}
