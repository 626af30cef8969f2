mod app_color;
mod app_icon;
mod dialer_key;
mod game_engine_command;
mod game_engine_event;
pub mod game_state_snapshot;
mod run_outcome;
mod settings_projection;
mod stage;
mod timer_state;

pub use app_color::AppColor;
pub use app_icon::{AppIcon, APP_LIST};
pub use dialer_key::DialerKey;
pub use game_engine_command::{GameEngineCommand, SettingsChange};
pub use game_engine_event::{GameEngineEvent, StatusMessage};
pub use game_state_snapshot::RunSnapshot;
pub use run_outcome::RunOutcome;
pub use settings_projection::SettingsProjection;
pub use stage::Stage;
pub use timer_state::TimerState;
