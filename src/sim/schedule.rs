/// Scheduler: single-threaded, virtual-time timer wheel for the session.
///
/// Time is a `Duration` since the session was created; whoever owns the
/// scheduler feeds it the current time through `pop_due`. Entries are
/// one-shot or repeating and are identified by a `ScheduleHandle` that is
/// never reused, so cancelling a stale handle can never hit a newer timer.
///
/// A repeating entry is re-armed before `pop_due` hands it out. Cancelling
/// its handle while its task is being run therefore stops it for good.

use std::time::Duration;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct ScheduleHandle(u64);

/// Work the session performs when a timer fires.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Task {
    /// Deferred first `advance_quarter()` after `start()`.
    OpenFirstQuarter,
    /// One second of quarter clock.
    QuarterTick,
    /// One second of inter-quarter pause.
    PauseTick,
    /// Open the next quarter immediately (zero-length pause).
    NextQuarter,
}

#[derive(Debug)]
struct Entry {
    handle: ScheduleHandle,
    due: Duration,
    every: Option<Duration>,
    task: Task,
}

#[derive(Debug, Default)]
pub struct Scheduler {
    entries: Vec<Entry>,
    next_id: u64,
}

impl Scheduler {
    pub fn new() -> Self {
        Scheduler { entries: Vec::new(), next_id: 0 }
    }

    pub fn schedule_once(&mut self, now: Duration, delay: Duration, task: Task) -> ScheduleHandle {
        self.insert(now + delay, None, task)
    }

    /// First firing is one `interval` after `now`.
    pub fn schedule_repeating(&mut self, now: Duration, interval: Duration, task: Task) -> ScheduleHandle {
        // A zero interval would fire forever within a single pop loop.
        let interval = interval.max(Duration::from_millis(1));
        self.insert(now + interval, Some(interval), task)
    }

    /// Returns whether anything was removed. Unknown handles are ignored.
    pub fn cancel(&mut self, handle: ScheduleHandle) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.handle != handle);
        self.entries.len() != before
    }

    pub fn cancel_all(&mut self) {
        self.entries.clear();
    }

    #[allow(dead_code)]
    pub fn is_scheduled(&self, handle: ScheduleHandle) -> bool {
        self.entries.iter().any(|e| e.handle == handle)
    }

    #[allow(dead_code)]
    pub fn pending(&self) -> usize {
        self.entries.len()
    }

    /// Take the earliest entry due at or before `now`, with the time it was
    /// due. Ties go to the entry scheduled first.
    pub fn pop_due(&mut self, now: Duration) -> Option<(ScheduleHandle, Task, Duration)> {
        let idx = self.entries.iter()
            .enumerate()
            .filter(|(_, e)| e.due <= now)
            .min_by_key(|(_, e)| (e.due, e.handle.0))
            .map(|(i, _)| i)?;

        let entry = &mut self.entries[idx];
        let fired = (entry.handle, entry.task, entry.due);
        match entry.every {
            Some(every) => entry.due += every,
            None => { self.entries.remove(idx); }
        }
        Some(fired)
    }

    fn insert(&mut self, due: Duration, every: Option<Duration>, task: Task) -> ScheduleHandle {
        self.next_id += 1;
        let handle = ScheduleHandle(self.next_id);
        self.entries.push(Entry { handle, due, every, task });
        handle
    }
}
