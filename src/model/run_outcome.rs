use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::helpers::format_total_time;

pub const WIN_SUMMARY: &str = "You completed all three puzzles and unlocked the phone!";

/// How a run ended.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RunOutcome {
    pub run_id: Uuid,
    pub won: bool,
    pub message: String,
    pub elapsed_seconds: u32,
    pub is_new_best: bool,
    pub best_seconds: Option<u32>,
}

impl RunOutcome {
    pub fn title(&self) -> &'static str {
        if self.won {
            "🎉 Congratulations!"
        } else {
            "Game Over"
        }
    }

    /// Lines of the end-of-run dialog, below the title. A loss shows its reason; a
    /// win shows the unlock line and the times.
    pub fn summary_lines(&self) -> Vec<String> {
        if !self.won {
            return vec![self.message.clone()];
        }
        let mut lines = vec![
            WIN_SUMMARY.to_string(),
            format!("Your time: {}", format_total_time(self.elapsed_seconds)),
        ];
        if self.is_new_best {
            lines.push("New record! This is your time to beat.".to_string());
        } else if let Some(best) = self.best_seconds {
            lines.push(format!("Best time: {}", format_total_time(best)));
        }
        lines
    }
}
