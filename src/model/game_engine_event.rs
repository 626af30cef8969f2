use std::time::Duration;

use super::{RunOutcome, Stage};
use crate::game::dialer::Dialer;
use crate::game::pin_lock::PinLock;
use crate::game::settings::{Settings, SettingsError};
use crate::game::streak_grid::StreakGrid;

/// A transient toast. A later message replaces an earlier one on screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub id: u64,
    pub text: String,
    pub expires_after: Duration,
}

#[derive(Debug, Clone)]
pub enum GameEngineEvent {
    StageChanged(Stage),
    PinUpdated(PinLock),
    GridUpdated(StreakGrid),
    DialerUpdated(Dialer),
    StatusShown(StatusMessage),
    /// The toast with this id expired without being replaced.
    StatusCleared(u64),
    SettingsChanged(Settings),
    SettingsRejected(Vec<SettingsError>),
    BestTimeChanged(Option<u32>),
    RunCompleted(RunOutcome),
}
