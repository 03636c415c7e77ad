//=========================================================================
// Scheduler Observers
//=========================================================================

use super::task::Task;

/// Receives scheduler notifications synchronously on the logic thread.
///
/// Observers are called in registration order.
pub trait SchedulerObserver: Send {
    /// `task` was inserted into the bucket for `tick`.
    fn on_task_scheduled(&mut self, _task: &Task, _tick: u64) {}

    /// `task` ran during `tick`.
    fn on_task_run(&mut self, _task: &Task, _tick: u64) {}
}

/// Handle returned by `Scheduler::subscribe`, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(pub(crate) u64);
