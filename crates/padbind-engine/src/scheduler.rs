use std::mem;
use std::time::{Duration, Instant};

use crate::types::Source;

/// Delay between a synthetic press and its release.
pub const RELEASE_DELAY: Duration = Duration::from_millis(100);

/// Deferred work. Targets are named, not captured: they are resolved through
/// the bindings that are current when the task fires.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Task {
    /// Press the action bound to a source, release it after [`RELEASE_DELAY`].
    Click(Source),
    Release(Source),
    /// Press a menu item's action, release it after [`RELEASE_DELAY`].
    MenuPress { menu: String, item: String },
    MenuRelease { menu: String, item: String },
    /// Forget a half-finished pad stroke after the pad binding changed.
    ResetPad(Source),
}

#[derive(Debug)]
struct Entry {
    due: Instant,
    task: Task,
}

/// One-shot timer queue, consulted once per poll tick.
#[derive(Debug, Default)]
pub struct Scheduler {
    entries: Vec<Entry>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, due: Instant, task: Task) {
        self.entries.push(Entry { due, task });
    }

    /// Remove and return every task due at or before `now`, in enqueue order.
    ///
    /// Tasks scheduled while the returned ones run are not part of this batch.
    pub fn take_due(&mut self, now: Instant) -> Vec<Task> {
        if !self.entries.iter().any(|entry| entry.due <= now) {
            return Vec::new();
        }
        let (due, pending): (Vec<Entry>, Vec<Entry>) = mem::take(&mut self.entries)
            .into_iter()
            .partition(|entry| entry.due <= now);
        self.entries = pending;
        due.into_iter().map(|entry| entry.task).collect()
    }

    /// Earliest fire time, if anything is pending.
    pub fn next_due(&self) -> Option<Instant> {
        self.entries.iter().map(|entry| entry.due).min()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nothing_fires_early() {
        let start = Instant::now();
        let mut scheduler = Scheduler::new();
        scheduler.schedule(start + Duration::from_millis(50), Task::Release(Source::A));

        assert!(scheduler.take_due(start).is_empty());
        assert!(scheduler
            .take_due(start + Duration::from_millis(49))
            .is_empty());
        assert_eq!(
            scheduler.take_due(start + Duration::from_millis(50)),
            vec![Task::Release(Source::A)]
        );
        assert!(scheduler.is_empty());
    }

    #[test]
    fn due_entries_fire_in_enqueue_order() {
        let start = Instant::now();
        let mut scheduler = Scheduler::new();
        scheduler.schedule(start + Duration::from_millis(30), Task::Release(Source::B));
        scheduler.schedule(start + Duration::from_millis(10), Task::Release(Source::A));
        scheduler.schedule(start + Duration::from_millis(90), Task::Release(Source::X));
        scheduler.schedule(start + Duration::from_millis(20), Task::Click(Source::Y));

        let fired = scheduler.take_due(start + Duration::from_millis(40));
        assert_eq!(
            fired,
            vec![
                Task::Release(Source::B),
                Task::Release(Source::A),
                Task::Click(Source::Y),
            ]
        );
        assert_eq!(scheduler.len(), 1);
        assert_eq!(scheduler.next_due(), Some(start + Duration::from_millis(90)));
    }

    #[test]
    fn entries_fire_exactly_once() {
        let start = Instant::now();
        let mut scheduler = Scheduler::new();
        scheduler.schedule(start, Task::ResetPad(Source::LeftPad));

        assert_eq!(scheduler.take_due(start).len(), 1);
        assert!(scheduler.take_due(start + Duration::from_secs(1)).is_empty());
        assert_eq!(scheduler.next_due(), None);
    }
}
