use log::trace;
use std::time::{Duration, SystemTime};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerHandle(u64);

/// A task handed back by [`TimerQueue::pop_due`], with the time it was due.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FiredTask<T> {
    pub handle: TimerHandle,
    pub due: SystemTime,
    pub task: T,
}

#[derive(Debug, Clone)]
struct Entry<T> {
    handle: TimerHandle,
    due: SystemTime,
    period: Option<Duration>,
    task: T,
}

/// One-shot and repeating tasks keyed by due time.
///
/// Nothing fires on its own: the owner calls [`TimerQueue::pop_due`] with the current
/// time and runs each returned task before asking for the next, so a task may cancel
/// tasks that were due at the same moment.
#[derive(Debug, Clone)]
pub struct TimerQueue<T> {
    entries: Vec<Entry<T>>,
    next_handle: u64,
}

impl<T> Default for TimerQueue<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            next_handle: 0,
        }
    }
}

impl<T: Clone + std::fmt::Debug> TimerQueue<T> {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, due: SystemTime, period: Option<Duration>, task: T) -> TimerHandle {
        let handle = TimerHandle(self.next_handle);
        self.next_handle += 1;
        trace!(target: "timer_queue", "Scheduled {:?} as {:?} (period {:?})", task, handle, period);
        self.entries.push(Entry {
            handle,
            due,
            period,
            task,
        });
        handle
    }

    pub fn schedule_once(&mut self, now: SystemTime, delay: Duration, task: T) -> TimerHandle {
        self.push(now + delay, None, task)
    }

    /// Fires every `period`, first at `now + period`. A zero period is treated as one
    /// millisecond so the queue always drains.
    pub fn schedule_repeating(&mut self, now: SystemTime, period: Duration, task: T) -> TimerHandle {
        let period = period.max(Duration::from_millis(1));
        self.push(now + period, Some(period), task)
    }

    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.handle != handle);
        before != self.entries.len()
    }

    pub fn clear(&mut self) {
        if !self.entries.is_empty() {
            trace!(target: "timer_queue", "Cancelling {} pending tasks", self.entries.len());
        }
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Removes and returns the earliest task due at or before `now`. Repeating tasks
    /// are put back one period later. Ties go to the task scheduled first.
    pub fn pop_due(&mut self, now: SystemTime) -> Option<FiredTask<T>> {
        let index = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, entry)| entry.due <= now)
            .min_by_key(|(_, entry)| (entry.due, entry.handle))
            .map(|(index, _)| index)?;

        let entry = &self.entries[index];
        let fired = FiredTask {
            handle: entry.handle,
            due: entry.due,
            task: entry.task.clone(),
        };
        let period = entry.period;
        match period {
            Some(period) => self.entries[index].due += period,
            None => {
                self.entries.swap_remove(index);
            }
        }
        Some(fired)
    }
}
