//=========================================================================
// Tick Scheduler
//
// Deferred and repeating task execution keyed to simulation ticks.
//
// Architecture:
// ```text
//   schedule_after(task, d) ──> pending[current + max(d, 1)].push(task)
//
//   advance():
//     current += 1
//     bucket = pending.remove(current)
//     for task in bucket (FIFO):
//        skip if inactive
//        run (panic → cancel + drop)
//        notify observers
//        repeating → schedule_after(task, task.delay())
// ```
//
// Invariants:
// - `current_tick` grows by exactly one per `advance()`
// - every insert targets a tick strictly after `current_tick`, so a
//   drained bucket can never be refilled
// - a bucket never holds the same task twice
// - a task rescheduled during a drain lands in a future bucket and is
//   not seen again by the same `advance()`
//
//=========================================================================

//=== Submodules ==========================================================

mod observer;
mod task;

//=== Public API ==========================================================

pub use observer::{ObserverId, SchedulerObserver};
pub use task::Task;

//=== Standard Library Imports ============================================

use std::collections::BTreeMap;
use std::fmt;

//=== External Crates =====================================================

use log::{debug, trace};
use thiserror::Error;

//=== Internal Dependencies ===============================================

use crate::core::guard::run_guarded;

//=== SchedulerError ======================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SchedulerError {
    #[error("task #{id} is cancelled and cannot be scheduled")]
    TaskInactive { id: u64 },

    #[error("repeat interval must be at least one tick")]
    ZeroInterval,
}

//=== Scheduler ===========================================================

/// Tick counter plus a tick-bucketed queue of pending tasks.
///
/// Owned by the logic thread; every call is synchronous.
///
/// # Examples
///
/// ```
/// use kindle_engine::core::scheduler::{Scheduler, Task};
///
/// let mut scheduler = Scheduler::new();
/// let task = Task::new(|| println!("three ticks later"));
/// scheduler.schedule_after(&task, 3).unwrap();
///
/// assert_eq!(scheduler.advance(), 0);
/// assert_eq!(scheduler.advance(), 0);
/// assert_eq!(scheduler.advance(), 1);
/// ```
#[derive(Default)]
pub struct Scheduler {
    current_tick: u64,
    pending: BTreeMap<u64, Vec<Task>>,
    observers: Vec<(ObserverId, Box<dyn SchedulerObserver>)>,
    next_observer_id: u64,
}

impl Scheduler {
    //--- Construction -----------------------------------------------------

    pub fn new() -> Self {
        Self::default()
    }

    //--- Scheduling -------------------------------------------------------

    /// Queues `task` to run `delay` ticks from now.
    ///
    /// A delay of `0` is treated as `1` (next tick). Scheduling the same
    /// task twice for the same tick is a no-op. Returns the target tick.
    ///
    /// # Errors
    ///
    /// [`SchedulerError::TaskInactive`] if the task was cancelled; nothing
    /// is queued and observers are not notified.
    pub fn schedule_after(&mut self, task: &Task, delay: u64) -> Result<u64, SchedulerError> {
        if !task.is_active() {
            return Err(SchedulerError::TaskInactive { id: task.id() });
        }

        let target = self.current_tick.saturating_add(delay.max(1));
        let bucket = self.pending.entry(target).or_default();

        if bucket.iter().any(|queued| queued.ptr_eq(task)) {
            trace!(target: "scheduler", "Task #{} already queued for tick {}", task.id(), target);
            return Ok(target);
        }

        bucket.push(task.clone());

        for (_, observer) in self.observers.iter_mut() {
            observer.on_task_scheduled(task, target);
        }

        Ok(target)
    }

    /// Queues `task` for the next tick.
    pub fn schedule_next_tick(&mut self, task: &Task) -> Result<u64, SchedulerError> {
        self.schedule_after(task, 1)
    }

    /// Queues `task` using its own preset delay (see [`Task::with_delay`]).
    pub fn schedule(&mut self, task: &Task) -> Result<u64, SchedulerError> {
        self.schedule_after(task, task.delay())
    }

    /// Marks `task` repeating every `interval` ticks and queues its first
    /// run `interval` ticks from now.
    ///
    /// # Errors
    ///
    /// [`SchedulerError::ZeroInterval`] if `interval == 0`;
    /// [`SchedulerError::TaskInactive`] if the task was cancelled.
    pub fn schedule_repeating(&mut self, task: &Task, interval: u64) -> Result<u64, SchedulerError> {
        if interval < 1 {
            return Err(SchedulerError::ZeroInterval);
        }
        if !task.is_active() {
            return Err(SchedulerError::TaskInactive { id: task.id() });
        }

        task.mark_repeating(interval);
        self.schedule_after(task, interval)
    }

    //--- Convenience ------------------------------------------------------

    /// Wraps `action` in a task, queues it `delay` ticks out and returns
    /// the handle.
    pub fn run_after<F>(&mut self, delay: u64, action: F) -> Task
    where
        F: FnMut() + Send + 'static,
    {
        let task = Task::new(action);
        // A freshly created task is always active.
        let _ = self.schedule_after(&task, delay);
        task
    }

    /// Wraps `action` in a repeating task firing every `interval` ticks.
    pub fn run_every<F>(&mut self, interval: u64, action: F) -> Result<Task, SchedulerError>
    where
        F: FnMut() + Send + 'static,
    {
        let task = Task::new(action);
        self.schedule_repeating(&task, interval)?;
        Ok(task)
    }

    //--- Tick Advancement -------------------------------------------------

    /// Advances one tick and drains that tick's bucket.
    ///
    /// Returns the number of tasks that ran to completion. A task that
    /// panics is cancelled, dropped and not counted; the rest of the
    /// bucket still runs.
    pub fn advance(&mut self) -> usize {
        self.current_tick += 1;
        let tick = self.current_tick;

        let Some(bucket) = self.pending.remove(&tick) else {
            return 0;
        };

        let mut ran = 0;
        for task in bucket {
            if !task.is_active() {
                continue;
            }

            let completed = run_guarded("scheduler", TaskLabel(&task), || task.run());
            if !completed {
                task.cancel();
                continue;
            }
            ran += 1;

            for (_, observer) in self.observers.iter_mut() {
                observer.on_task_run(&task, tick);
            }

            if task.is_repeating() && task.is_active() {
                let _ = self.schedule_after(&task, task.delay());
            }
        }

        ran
    }

    //--- Observers --------------------------------------------------------

    /// Registers an observer; notifications follow registration order.
    pub fn subscribe(&mut self, observer: Box<dyn SchedulerObserver>) -> ObserverId {
        let id = ObserverId(self.next_observer_id);
        self.next_observer_id += 1;
        self.observers.push((id, observer));
        debug!(target: "scheduler", "Observer {:?} subscribed", id);
        id
    }

    /// Removes an observer. Returns `false` if `id` was not registered.
    pub fn unsubscribe(&mut self, id: ObserverId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(observer_id, _)| *observer_id != id);
        self.observers.len() != before
    }

    //--- Queries ----------------------------------------------------------

    pub fn current_tick(&self) -> u64 {
        self.current_tick
    }

    /// Number of queued entries across all future buckets, cancelled
    /// tasks included until their bucket is drained.
    pub fn pending_tasks(&self) -> usize {
        self.pending.values().map(Vec::len).sum()
    }

    pub fn is_idle(&self) -> bool {
        self.pending.is_empty()
    }

    /// Earliest tick that currently has a bucket.
    pub fn next_due_tick(&self) -> Option<u64> {
        self.pending.keys().next().copied()
    }

    /// Drops every queued task without cancelling the handles.
    pub fn clear(&mut self) {
        self.pending.clear();
    }
}

impl fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scheduler")
            .field("current_tick", &self.current_tick)
            .field("pending_tasks", &self.pending_tasks())
            .field("observers", &self.observers.len())
            .finish()
    }
}

struct TaskLabel<'a>(&'a Task);

impl fmt::Display for TaskLabel<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Task #{}", self.0.id())
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    //--- Test Helpers -----------------------------------------------------

    fn counting_task() -> (Task, Arc<AtomicUsize>) {
        let hits = Arc::new(AtomicUsize::new(0));
        let h = hits.clone();
        let task = Task::new(move || {
            h.fetch_add(1, Ordering::SeqCst);
        });
        (task, hits)
    }

    fn recording_task(log: &Arc<Mutex<Vec<&'static str>>>, name: &'static str) -> Task {
        let log = log.clone();
        Task::new(move || log.lock().push(name))
    }

    #[derive(Default)]
    struct Recorder {
        events: Arc<Mutex<Vec<(String, u64, u64)>>>,
        tag: &'static str,
    }

    impl SchedulerObserver for Recorder {
        fn on_task_scheduled(&mut self, task: &Task, tick: u64) {
            self.events.lock().push((format!("{}:scheduled", self.tag), task.id(), tick));
        }

        fn on_task_run(&mut self, task: &Task, tick: u64) {
            self.events.lock().push((format!("{}:ran", self.tag), task.id(), tick));
        }
    }

    //=====================================================================
    // Delayed Execution Tests
    //=====================================================================

    #[test]
    fn delayed_task_fires_exactly_on_target_tick() {
        let mut scheduler = Scheduler::new();
        let (task, hits) = counting_task();

        assert_eq!(scheduler.schedule_after(&task, 3), Ok(3));

        scheduler.advance();
        scheduler.advance();
        assert_eq!(hits.load(Ordering::SeqCst), 0);

        scheduler.advance();
        assert_eq!(hits.load(Ordering::SeqCst), 1);

        for _ in 0..5 {
            scheduler.advance();
        }
        assert_eq!(hits.load(Ordering::SeqCst), 1, "One-shot task must fire once");
        assert!(scheduler.is_idle());
    }

    #[test]
    fn delay_is_relative_to_current_tick() {
        let mut scheduler = Scheduler::new();
        for _ in 0..10 {
            scheduler.advance();
        }

        let (task, _) = counting_task();
        assert_eq!(scheduler.schedule_after(&task, 4), Ok(14));
    }

    #[test]
    fn zero_delay_means_next_tick() {
        let mut scheduler = Scheduler::new();
        let (task, hits) = counting_task();

        assert_eq!(scheduler.schedule_after(&task, 0), Ok(1));
        scheduler.advance();
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn schedule_next_tick_targets_following_tick() {
        let mut scheduler = Scheduler::new();
        scheduler.advance();

        let (task, hits) = counting_task();
        assert_eq!(scheduler.schedule_next_tick(&task), Ok(2));

        scheduler.advance();
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn schedule_uses_preset_delay() {
        let mut scheduler = Scheduler::new();
        let task = Task::with_delay(2, || {});
        assert_eq!(scheduler.schedule(&task), Ok(2));
    }

    #[test]
    fn advance_increments_tick_even_without_tasks() {
        let mut scheduler = Scheduler::new();
        assert_eq!(scheduler.advance(), 0);
        assert_eq!(scheduler.advance(), 0);
        assert_eq!(scheduler.current_tick(), 2);
    }

    //=====================================================================
    // Ordering Tests
    //=====================================================================

    #[test]
    fn same_tick_tasks_run_fifo() {
        let mut scheduler = Scheduler::new();
        let log = Arc::new(Mutex::new(Vec::new()));

        scheduler.schedule_after(&recording_task(&log, "a"), 2).unwrap();
        scheduler.schedule_after(&recording_task(&log, "b"), 2).unwrap();
        scheduler.schedule_after(&recording_task(&log, "c"), 2).unwrap();

        scheduler.advance();
        scheduler.advance();

        assert_eq!(*log.lock(), vec!["a", "b", "c"]);
    }

    #[test]
    fn earlier_ticks_run_before_later_ticks() {
        let mut scheduler = Scheduler::new();
        let log = Arc::new(Mutex::new(Vec::new()));

        scheduler.schedule_after(&recording_task(&log, "late"), 2).unwrap();
        scheduler.schedule_after(&recording_task(&log, "early"), 1).unwrap();

        scheduler.advance();
        scheduler.advance();

        assert_eq!(*log.lock(), vec!["early", "late"]);
    }

    #[test]
    fn duplicate_insert_in_same_bucket_is_ignored() {
        let mut scheduler = Scheduler::new();
        let (task, hits) = counting_task();

        scheduler.schedule_after(&task, 2).unwrap();
        scheduler.schedule_after(&task, 2).unwrap();
        assert_eq!(scheduler.pending_tasks(), 1);

        scheduler.advance();
        scheduler.advance();
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn same_task_may_sit_in_different_buckets() {
        let mut scheduler = Scheduler::new();
        let (task, hits) = counting_task();

        scheduler.schedule_after(&task, 1).unwrap();
        scheduler.schedule_after(&task, 2).unwrap();

        scheduler.advance();
        scheduler.advance();
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    //=====================================================================
    // Repeating Tests
    //=====================================================================

    #[test]
    fn repeating_task_fires_every_interval() {
        let mut scheduler = Scheduler::new();
        let (task, hits) = counting_task();

        scheduler.schedule_repeating(&task, 2).unwrap();

        for _ in 0..10 {
            scheduler.advance();
        }
        assert_eq!(hits.load(Ordering::SeqCst), 5);
    }

    #[test]
    fn repeating_task_stops_after_cancel() {
        let mut scheduler = Scheduler::new();
        let (task, hits) = counting_task();

        scheduler.schedule_repeating(&task, 1).unwrap();
        scheduler.advance();
        scheduler.advance();
        task.cancel();
        scheduler.advance();
        scheduler.advance();

        assert_eq!(hits.load(Ordering::SeqCst), 2);
        assert!(scheduler.is_idle());
    }

    #[test]
    fn zero_interval_is_rejected() {
        let mut scheduler = Scheduler::new();
        let (task, _) = counting_task();

        assert_eq!(scheduler.schedule_repeating(&task, 0), Err(SchedulerError::ZeroInterval));
        assert!(!task.is_repeating());
        assert!(scheduler.is_idle());
    }

    #[test]
    fn repeating_task_runs_once_per_advance() {
        let mut scheduler = Scheduler::new();
        let (task, hits) = counting_task();

        scheduler.schedule_repeating(&task, 1).unwrap();
        assert_eq!(scheduler.advance(), 1);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert_eq!(scheduler.next_due_tick(), Some(2));
    }

    #[test]
    fn run_every_returns_cancellable_handle() {
        let mut scheduler = Scheduler::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let h = hits.clone();

        let task = scheduler
            .run_every(3, move || {
                h.fetch_add(1, Ordering::SeqCst);
            })
            .unwrap();

        for _ in 0..6 {
            scheduler.advance();
        }
        task.cancel();
        for _ in 0..6 {
            scheduler.advance();
        }
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    //=====================================================================
    // Cancellation Tests
    //=====================================================================

    #[test]
    fn cancelled_task_is_rejected() {
        let mut scheduler = Scheduler::new();
        let (task, _) = counting_task();
        task.cancel();

        assert_eq!(
            scheduler.schedule_after(&task, 1),
            Err(SchedulerError::TaskInactive { id: task.id() })
        );
        assert!(scheduler.is_idle());
    }

    #[test]
    fn cancel_before_drain_skips_task() {
        let mut scheduler = Scheduler::new();
        let (task, hits) = counting_task();

        scheduler.schedule_after(&task, 2).unwrap();
        scheduler.advance();
        task.cancel();
        assert_eq!(scheduler.advance(), 0);

        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn task_cancelled_by_earlier_task_in_bucket_is_skipped() {
        let mut scheduler = Scheduler::new();
        let (victim, hits) = counting_task();
        let v = victim.clone();
        let killer = Task::new(move || v.cancel());

        scheduler.schedule_after(&killer, 1).unwrap();
        scheduler.schedule_after(&victim, 1).unwrap();
        scheduler.advance();

        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    //=====================================================================
    // Failure Isolation Tests
    //=====================================================================

    #[test]
    fn panicking_task_does_not_block_bucket() {
        let mut scheduler = Scheduler::new();
        let bad = Task::new(|| panic!("broken task"));
        let (good, hits) = counting_task();

        scheduler.schedule_repeating(&bad, 1).unwrap();
        scheduler.schedule_after(&good, 1).unwrap();

        assert_eq!(scheduler.advance(), 1, "Only the completed task counts");

        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert!(!bad.is_active(), "Panicking task should be cancelled");
        assert!(scheduler.is_idle(), "Panicking repeating task must not be requeued");
    }

    //=====================================================================
    // Observer Tests
    //=====================================================================

    #[test]
    fn observers_see_schedule_and_run_in_registration_order() {
        let mut scheduler = Scheduler::new();
        let events = Arc::new(Mutex::new(Vec::new()));

        scheduler.subscribe(Box::new(Recorder { events: events.clone(), tag: "first" }));
        scheduler.subscribe(Box::new(Recorder { events: events.clone(), tag: "second" }));

        let (task, _) = counting_task();
        scheduler.schedule_after(&task, 1).unwrap();
        scheduler.advance();

        let id = task.id();
        assert_eq!(
            *events.lock(),
            vec![
                ("first:scheduled".to_string(), id, 1),
                ("second:scheduled".to_string(), id, 1),
                ("first:ran".to_string(), id, 1),
                ("second:ran".to_string(), id, 1),
            ]
        );
    }

    #[test]
    fn repeating_reschedule_is_observed() {
        let mut scheduler = Scheduler::new();
        let events = Arc::new(Mutex::new(Vec::new()));
        scheduler.subscribe(Box::new(Recorder { events: events.clone(), tag: "obs" }));

        let (task, _) = counting_task();
        scheduler.schedule_repeating(&task, 2).unwrap();
        scheduler.advance();
        scheduler.advance();

        let kinds: Vec<(String, u64)> = events
            .lock()
            .iter()
            .map(|(kind, _, tick)| (kind.clone(), *tick))
            .collect();
        assert_eq!(
            kinds,
            vec![
                ("obs:scheduled".to_string(), 2),
                ("obs:ran".to_string(), 2),
                ("obs:scheduled".to_string(), 4),
            ]
        );
    }

    #[test]
    fn rejected_schedule_is_not_observed() {
        let mut scheduler = Scheduler::new();
        let events = Arc::new(Mutex::new(Vec::new()));
        scheduler.subscribe(Box::new(Recorder { events: events.clone(), tag: "obs" }));

        let (task, _) = counting_task();
        task.cancel();
        let _ = scheduler.schedule_after(&task, 1);

        assert!(events.lock().is_empty());
    }

    #[test]
    fn unsubscribe_stops_notifications() {
        let mut scheduler = Scheduler::new();
        let events = Arc::new(Mutex::new(Vec::new()));
        let id = scheduler.subscribe(Box::new(Recorder { events: events.clone(), tag: "obs" }));

        assert!(scheduler.unsubscribe(id));
        assert!(!scheduler.unsubscribe(id));

        let (task, _) = counting_task();
        scheduler.schedule_after(&task, 1).unwrap();
        scheduler.advance();
        assert!(events.lock().is_empty());
    }

    #[test]
    fn clear_drops_pending_tasks() {
        let mut scheduler = Scheduler::new();
        let (task, hits) = counting_task();
        scheduler.schedule_after(&task, 1).unwrap();

        scheduler.clear();
        scheduler.advance();

        assert_eq!(hits.load(Ordering::SeqCst), 0);
        assert!(task.is_active(), "clear() does not cancel handles");
    }
}
