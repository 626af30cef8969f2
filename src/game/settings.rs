use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::ops::RangeInclusive;
use std::path::Path;
use thiserror::Error;

use crate::model::SettingsChange;

pub const PIN_ATTEMPTS_FIELD: &str = "pin_max_attempts";
pub const GRID_ROWS_FIELD: &str = "grid_rows";
pub const GRID_COLS_FIELD: &str = "grid_cols";
pub const TARGET_STREAK_FIELD: &str = "target_streak";
pub const GRID_TIMER_FIELD: &str = "grid_timer_seconds";
pub const HINT_INTERVAL_FIELD: &str = "hint_interval_seconds";
pub const SOUND_FIELD: &str = "sound_on";

pub const GRID_SIZE_RANGE: RangeInclusive<i64> = 3..=7;
pub const TARGET_STREAK_RANGE: RangeInclusive<i64> = 3..=10;
pub const GRID_TIMER_RANGE: RangeInclusive<i64> = 60..=600;
pub const HINT_INTERVALS: [u32; 4] = [15, 30, 45, 60];

const CONFIG_ENV: &str = "PHONE_UNLOCK_CONFIG";

/// A single settings field that was refused; the previous value stays in effect.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SettingsError {
    #[error("unknown setting: {0}")]
    UnknownField(String),

    #[error("{field}: {value:?} is not a number")]
    NotNumeric { field: &'static str, value: String },

    #[error("{field}: {value} is outside {allowed}")]
    OutOfRange {
        field: &'static str,
        value: i64,
        allowed: String,
    },
}

/// Failure to read a configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[readonly::make]
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Settings {
    #[serde(default = "default_version")]
    pub version: u32,

    #[serde(default = "default_pin_max_attempts")]
    pub pin_max_attempts: u32,

    #[serde(default = "default_grid_size")]
    pub grid_rows: usize,

    #[serde(default = "default_grid_size")]
    pub grid_cols: usize,

    #[serde(default = "default_target_streak")]
    pub target_streak: u32,

    #[serde(default = "default_grid_timer_seconds")]
    pub grid_timer_seconds: u32,

    #[serde(default = "default_hint_interval_seconds")]
    pub hint_interval_seconds: u32,

    #[serde(default = "default_true")]
    pub sound_on: bool,
}

// Helper functions for default values
fn default_version() -> u32 {
    1
}
fn default_pin_max_attempts() -> u32 {
    10
}
fn default_grid_size() -> usize {
    5
}
fn default_target_streak() -> u32 {
    5
}
fn default_grid_timer_seconds() -> u32 {
    300
}
fn default_hint_interval_seconds() -> u32 {
    30
}
fn default_true() -> bool {
    true
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            version: default_version(),
            pin_max_attempts: default_pin_max_attempts(),
            grid_rows: default_grid_size(),
            grid_cols: default_grid_size(),
            target_streak: default_target_streak(),
            grid_timer_seconds: default_grid_timer_seconds(),
            hint_interval_seconds: default_hint_interval_seconds(),
            sound_on: true,
        }
    }
}

fn check_range(
    field: &'static str,
    value: i64,
    range: &RangeInclusive<i64>,
) -> Result<i64, SettingsError> {
    if range.contains(&value) {
        Ok(value)
    } else {
        Err(SettingsError::OutOfRange {
            field,
            value,
            allowed: format!("{}..={}", range.start(), range.end()),
        })
    }
}

impl Settings {
    /// Applies every valid field of `change` and returns the rejected ones.
    ///
    /// Fields are validated independently: one bad value never blocks the others.
    pub fn apply(&mut self, change: &SettingsChange) -> Vec<SettingsError> {
        let mut rejected = Vec::new();

        if let Some(value) = change.pin_max_attempts {
            match check_range(PIN_ATTEMPTS_FIELD, value, &(1..=i64::from(u32::MAX))) {
                Ok(v) => self.pin_max_attempts = v as u32,
                Err(e) => rejected.push(e),
            }
        }
        if let Some(value) = change.grid_rows {
            match check_range(GRID_ROWS_FIELD, value, &GRID_SIZE_RANGE) {
                Ok(v) => self.grid_rows = v as usize,
                Err(e) => rejected.push(e),
            }
        }
        if let Some(value) = change.grid_cols {
            match check_range(GRID_COLS_FIELD, value, &GRID_SIZE_RANGE) {
                Ok(v) => self.grid_cols = v as usize,
                Err(e) => rejected.push(e),
            }
        }
        if let Some(value) = change.target_streak {
            match check_range(TARGET_STREAK_FIELD, value, &TARGET_STREAK_RANGE) {
                Ok(v) => self.target_streak = v as u32,
                Err(e) => rejected.push(e),
            }
        }
        if let Some(value) = change.grid_timer_seconds {
            match check_range(GRID_TIMER_FIELD, value, &GRID_TIMER_RANGE) {
                Ok(v) => self.grid_timer_seconds = v as u32,
                Err(e) => rejected.push(e),
            }
        }
        if let Some(value) = change.hint_interval_seconds {
            match HINT_INTERVALS.iter().find(|&&i| i64::from(i) == value) {
                Some(&interval) => self.hint_interval_seconds = interval,
                None => rejected.push(SettingsError::OutOfRange {
                    field: HINT_INTERVAL_FIELD,
                    value,
                    allowed: format!("{:?}", HINT_INTERVALS),
                }),
            }
        }
        if let Some(sound_on) = change.sound_on {
            self.sound_on = sound_on;
        }

        for error in &rejected {
            warn!(target: "settings", "Rejected setting: {}", error);
        }
        rejected
    }

    /// Reads a JSON configuration file. Missing fields keep their defaults and
    /// out-of-range fields are dropped with a warning.
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        let mut change: SettingsChange = serde_json::from_str(&contents)?;
        let version = change.version.take().unwrap_or_else(default_version);

        let mut settings = Settings {
            version,
            ..Settings::default()
        };
        settings.apply(&change);
        settings.migrate();
        info!(target: "settings", "Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Settings from the file named by `PHONE_UNLOCK_CONFIG`, or the defaults.
    pub fn from_env() -> Self {
        let Ok(path) = std::env::var(CONFIG_ENV) else {
            return Settings::default();
        };
        match Self::load_from_path(Path::new(&path)) {
            Ok(settings) => settings,
            Err(e) => {
                warn!(target: "settings", "Ignoring config {}: {}", path, e);
                Settings::default()
            }
        }
    }

    fn migrate(&mut self) {
        if self.version == 0 {
            self.version = 1;
        }
    }

    pub fn is_debug_mode() -> bool {
        std::env::var("DEBUG").map(|v| v == "1").unwrap_or(false)
    }

    pub fn seed_from_env() -> Option<u64> {
        std::env::var("SEED").ok().and_then(|v| v.parse::<u64>().ok())
    }
}
