use serde::{Deserialize, Serialize};

use super::DialerKey;
use crate::game::settings::{
    SettingsError, GRID_COLS_FIELD, GRID_ROWS_FIELD, GRID_TIMER_FIELD, HINT_INTERVAL_FIELD,
    PIN_ATTEMPTS_FIELD, SOUND_FIELD, TARGET_STREAK_FIELD,
};

/// A partial settings update. Numbers are kept wide so out-of-range input survives
/// until validation instead of wrapping.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettingsChange {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<u32>,
    pub pin_max_attempts: Option<i64>,
    pub grid_rows: Option<i64>,
    pub grid_cols: Option<i64>,
    pub target_streak: Option<i64>,
    pub grid_timer_seconds: Option<i64>,
    pub hint_interval_seconds: Option<i64>,
    pub sound_on: Option<bool>,
}

impl SettingsChange {
    /// Parses one textual field, as typed into a settings form.
    pub fn set_field(&mut self, field: &str, raw: &str) -> Result<(), SettingsError> {
        let raw = raw.trim();
        if field == SOUND_FIELD {
            self.sound_on = Some(matches!(raw, "1" | "true" | "on" | "yes"));
            return Ok(());
        }

        let (name, slot) = match field {
            PIN_ATTEMPTS_FIELD => (PIN_ATTEMPTS_FIELD, &mut self.pin_max_attempts),
            GRID_ROWS_FIELD => (GRID_ROWS_FIELD, &mut self.grid_rows),
            GRID_COLS_FIELD => (GRID_COLS_FIELD, &mut self.grid_cols),
            TARGET_STREAK_FIELD => (TARGET_STREAK_FIELD, &mut self.target_streak),
            GRID_TIMER_FIELD => (GRID_TIMER_FIELD, &mut self.grid_timer_seconds),
            HINT_INTERVAL_FIELD => (HINT_INTERVAL_FIELD, &mut self.hint_interval_seconds),
            _ => return Err(SettingsError::UnknownField(field.to_string())),
        };

        let value = raw.parse::<i64>().map_err(|_| SettingsError::NotNumeric {
            field: name,
            value: raw.to_string(),
        })?;
        *slot = Some(value);
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum GameEngineCommand {
    StartRun,
    PinDigit(u8),
    GridTap(usize),
    DialerKey(DialerKey),
    DialerBackspace,
    DialerCall,
    ApplySettings(SettingsChange),
    /// Fire every scheduled task that has come due.
    Poll,
    DismissOutcome,
}
