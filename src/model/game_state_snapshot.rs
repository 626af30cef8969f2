use serde::Serialize;
use uuid::Uuid;

use super::Stage;
use crate::game::dialer::Dialer;
use crate::game::pin_lock::PinLock;
use crate::game::run_session::RunSession;
use crate::game::settings::Settings;
use crate::game::streak_grid::StreakGrid;

/// Everything a presentation layer needs to redraw from scratch. Secrets are omitted.
#[derive(Debug, Clone, Serialize)]
pub struct RunSnapshot {
    pub stage: Stage,
    pub run_id: Option<Uuid>,
    pub settings: Settings,
    pub session: RunSession,
    pub pin: Option<PinLock>,
    pub grid: Option<StreakGrid>,
    pub dialer: Option<Dialer>,
}

impl RunSnapshot {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
