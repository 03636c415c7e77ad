//=========================================================================
// Panic Guard
//=========================================================================
//
// Runs user-supplied code (task actions, binding callbacks) so that a
// panic inside it is logged and contained instead of unwinding through
// the tick loop.
//
//=========================================================================

//=== Standard Library Imports ============================================

use std::any::Any;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};

//=== External Crates =====================================================

use log::error;

//=== run_guarded() =======================================================

/// Runs `f`, returning `false` if it panicked.
///
/// `label` identifies the failing unit in the log line.
pub(crate) fn run_guarded<F: FnOnce()>(target: &str, label: impl fmt::Display, f: F) -> bool {
    match catch_unwind(AssertUnwindSafe(f)) {
        Ok(()) => true,
        Err(payload) => {
            error!(target: target, "{} panicked: {}", label, panic_message(&*payload));
            false
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "<non-string panic payload>"
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completed_closure_reports_true() {
        let mut ran = false;
        assert!(run_guarded("test", "ok", || ran = true));
        assert!(ran);
    }

    #[test]
    fn panicking_closure_is_contained() {
        assert!(!run_guarded("test", "boom", || panic!("boom")));
    }

    #[test]
    fn panic_message_extracts_strings() {
        let owned: Box<dyn Any + Send> = Box::new(String::from("owned"));
        let borrowed: Box<dyn Any + Send> = Box::new("static");
        let other: Box<dyn Any + Send> = Box::new(42_u8);

        assert_eq!(panic_message(&*owned), "owned");
        assert_eq!(panic_message(&*borrowed), "static");
        assert_eq!(panic_message(&*other), "<non-string panic payload>");
    }
}
