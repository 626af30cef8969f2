use std::time::{Duration, SystemTime};

use serde_with::serde_as;
use serde_with::TimestampMilliSeconds;

/// Start and end stamps of one run. The end is clamped so it never precedes the start.
#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct TimerState {
    #[serde_as(as = "TimestampMilliSeconds")]
    pub started_timestamp: SystemTime,
    #[serde_as(as = "Option<TimestampMilliSeconds>")]
    pub ended_timestamp: Option<SystemTime>,
}

impl TimerState {
    pub fn started(now: SystemTime) -> Self {
        Self {
            started_timestamp: now,
            ended_timestamp: None,
        }
    }

    pub fn is_ended(&self) -> bool {
        self.ended_timestamp.is_some()
    }

    /// Time between start and the end stamp, or `now` while still running.
    pub fn elapsed(&self, now: SystemTime) -> Duration {
        let until_time = self.ended_timestamp.unwrap_or(now);

        until_time
            .duration_since(self.started_timestamp)
            .unwrap_or(Duration::default())
    }

    /// Elapsed time rounded to the nearest whole second.
    pub fn elapsed_seconds(&self, now: SystemTime) -> u32 {
        let millis = self.elapsed(now).as_millis();
        u32::try_from((millis + 500) / 1000).unwrap_or(u32::MAX)
    }

    pub fn ended(&self, now: SystemTime) -> TimerState {
        let mut new_state = self.clone();
        new_state.ended_timestamp = Some(now.max(self.started_timestamp));
        new_state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::UNIX_EPOCH;

    fn at(millis: u64) -> SystemTime {
        UNIX_EPOCH + Duration::from_millis(millis)
    }

    #[test]
    fn test_elapsed_running() {
        let timer = TimerState::started(at(1_000));
        assert_eq!(timer.elapsed(at(6_000)), Duration::from_secs(5));
        assert!(!timer.is_ended());
    }

    #[test]
    fn test_elapsed_with_end() {
        let timer = TimerState::started(at(1_000)).ended(at(11_000));

        // the end stamp wins over whatever "now" is
        assert_eq!(timer.elapsed(at(99_000)), Duration::from_secs(10));
        assert!(timer.is_ended());
    }

    #[test]
    fn test_elapsed_seconds_rounds_to_nearest() {
        let timer = TimerState::started(at(0));
        assert_eq!(timer.elapsed_seconds(at(1_499)), 1);
        assert_eq!(timer.elapsed_seconds(at(1_500)), 2);
        assert_eq!(timer.elapsed_seconds(at(400)), 0);
    }

    #[test]
    fn test_end_never_precedes_start() {
        let timer = TimerState::started(at(5_000)).ended(at(2_000));
        assert_eq!(timer.ended_timestamp, Some(at(5_000)));
        assert_eq!(timer.elapsed_seconds(at(9_000)), 0);
    }
}
