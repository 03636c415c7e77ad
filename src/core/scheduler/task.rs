//=========================================================================
// Task
//=========================================================================
//
// Cancellable, optionally repeating unit of deferred work.
//
// A `Task` is a shared handle: the scheduler keeps one clone in a tick
// bucket, the caller keeps another to cancel it later. Identity (not
// value) decides whether two handles are "the same task".
//
// Lifecycle:
// ```text
//   new ──schedule──> queued ──advance──> ran ──(repeating)──> queued
//     │                 │                  │
//     └── cancel() ─────┴──────────────────┴──> inactive (terminal)
// ```
//
//=========================================================================

//=== Standard Library Imports ============================================

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

//=== External Crates =====================================================

use log::warn;
use parking_lot::Mutex;

//=== Task ================================================================

static NEXT_TASK_ID: AtomicU64 = AtomicU64::new(1);

type Action = Box<dyn FnMut() + Send>;

struct TaskInner {
    id: u64,
    active: AtomicBool,
    repeating: AtomicBool,
    delay: AtomicU64,
    action: Mutex<Action>,
}

/// Handle to a scheduled unit of work.
///
/// Cloning yields another handle to the same task.
#[derive(Clone)]
pub struct Task {
    inner: Arc<TaskInner>,
}

impl Task {
    //--- Construction -----------------------------------------------------

    /// Creates an active, one-shot task with no preset delay.
    pub fn new<F>(action: F) -> Self
    where
        F: FnMut() + Send + 'static,
    {
        Self::with_delay(0, action)
    }

    /// Creates an active, one-shot task carrying its own delay, used by
    /// [`Scheduler::schedule`](super::Scheduler::schedule).
    pub fn with_delay<F>(delay: u64, action: F) -> Self
    where
        F: FnMut() + Send + 'static,
    {
        Self {
            inner: Arc::new(TaskInner {
                id: NEXT_TASK_ID.fetch_add(1, Ordering::Relaxed),
                active: AtomicBool::new(true),
                repeating: AtomicBool::new(false),
                delay: AtomicU64::new(delay),
                action: Mutex::new(Box::new(action)),
            }),
        }
    }

    //--- State ------------------------------------------------------------

    /// Process-unique id, for logs.
    pub fn id(&self) -> u64 {
        self.inner.id
    }

    /// Deactivates the task. Idempotent; a queued task is skipped when
    /// its bucket is drained and is never rescheduled.
    pub fn cancel(&self) {
        self.inner.active.store(false, Ordering::Release);
    }

    pub fn is_active(&self) -> bool {
        self.inner.active.load(Ordering::Acquire)
    }

    pub fn is_repeating(&self) -> bool {
        self.inner.repeating.load(Ordering::Acquire)
    }

    /// Ticks between firings (repeating) or the preset delay (one-shot).
    pub fn delay(&self) -> u64 {
        self.inner.delay.load(Ordering::Acquire)
    }

    pub(crate) fn mark_repeating(&self, interval: u64) {
        self.inner.delay.store(interval, Ordering::Release);
        self.inner.repeating.store(true, Ordering::Release);
    }

    /// Returns `true` if both handles refer to the same task.
    pub fn ptr_eq(&self, other: &Task) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    //--- Execution --------------------------------------------------------

    /// Invokes the action once.
    ///
    /// A task that runs itself from inside its own action is skipped
    /// rather than deadlocking.
    pub fn run(&self) {
        match self.inner.action.try_lock() {
            Some(mut action) => (*action)(),
            None => warn!(target: "scheduler", "Task #{} is already running, skipped", self.id()),
        }
    }
}

impl PartialEq for Task {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for Task {}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("id", &self.id())
            .field("active", &self.is_active())
            .field("repeating", &self.is_repeating())
            .field("delay", &self.delay())
            .finish()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
