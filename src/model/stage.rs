use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Which screen of the phone the run is on.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum Stage {
    #[default]
    Splash,
    Lock,
    Home,
    Dialer,
    Finished,
}

impl Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Stage::Splash => "splash",
            Stage::Lock => "lock",
            Stage::Home => "home",
            Stage::Dialer => "dialer",
            Stage::Finished => "finished",
        };
        f.write_str(name)
    }
}
