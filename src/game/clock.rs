use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Source of "now" for the engine's timers and the run timer.
pub trait Clock {
    fn now(&self) -> SystemTime;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> SystemTime {
        SystemTime::now()
    }
}

/// A clock that only moves when told to. Clones share the same time.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Rc<Cell<SystemTime>>,
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::starting_at(UNIX_EPOCH + Duration::from_secs(1_700_000_000))
    }
}

impl ManualClock {
    fn starting_at(now: SystemTime) -> Self {
        Self {
            now: Rc::new(Cell::new(now)),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> SystemTime {
        self.now.get()
    }
}
