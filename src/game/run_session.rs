use serde::Serialize;
use std::time::SystemTime;

use crate::model::TimerState;

/// Timing of the current run and the best completion time seen so far.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
pub struct RunSession {
    timer: Option<TimerState>,
    best_time_seconds: Option<u32>,
}

impl RunSession {
    pub fn new(best_time_seconds: Option<u32>) -> Self {
        Self {
            timer: None,
            best_time_seconds,
        }
    }

    pub fn start(&mut self, now: SystemTime) {
        self.timer = Some(TimerState::started(now));
    }

    /// Stamps the end of the run and returns its length in whole seconds.
    pub fn finish(&mut self, now: SystemTime) -> u32 {
        match self.timer.as_mut() {
            Some(timer) => {
                if !timer.is_ended() {
                    *timer = timer.ended(now);
                }
                timer.elapsed_seconds(now)
            }
            None => 0,
        }
    }

    pub fn timer(&self) -> Option<&TimerState> {
        self.timer.as_ref()
    }

    pub fn is_running(&self) -> bool {
        self.timer.as_ref().is_some_and(|timer| !timer.is_ended())
    }

    pub fn elapsed_seconds(&self, now: SystemTime) -> u32 {
        self.timer
            .as_ref()
            .map_or(0, |timer| timer.elapsed_seconds(now))
    }

    pub fn best_time_seconds(&self) -> Option<u32> {
        self.best_time_seconds
    }

    /// Records a winning time, returning true when it beats the stored best.
    pub fn record_win(&mut self, elapsed_seconds: u32) -> bool {
        let is_new_best = self
            .best_time_seconds
            .is_none_or(|best| elapsed_seconds < best);
        if is_new_best {
            self.best_time_seconds = Some(elapsed_seconds);
        }
        is_new_best
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, UNIX_EPOCH};

    #[test]
    fn test_first_win_sets_best() {
        let mut session = RunSession::new(None);
        assert!(session.record_win(120));
        assert_eq!(session.best_time_seconds(), Some(120));
    }

    #[test]
    fn test_best_only_improves_on_strictly_faster_win() {
        let mut session = RunSession::new(Some(90));
        assert!(!session.record_win(90));
        assert!(!session.record_win(200));
        assert_eq!(session.best_time_seconds(), Some(90));
        assert!(session.record_win(89));
        assert_eq!(session.best_time_seconds(), Some(89));
    }

    #[test]
    fn test_finish_stamps_end_once() {
        let start = UNIX_EPOCH + Duration::from_secs(100);
        let mut session = RunSession::new(None);
        assert_eq!(session.finish(start), 0);

        session.start(start);
        assert!(session.is_running());
        assert_eq!(session.elapsed_seconds(start + Duration::from_secs(3)), 3);

        assert_eq!(session.finish(start + Duration::from_millis(42_600)), 43);
        assert!(!session.is_running());
        assert_eq!(session.finish(start + Duration::from_secs(500)), 43);
    }
}
