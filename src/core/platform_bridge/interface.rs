//=========================================================================
// Platform Bridge Interface
//=========================================================================
//
// Messages from the platform (main) thread to the logic thread, and the
// errors raised while running the platform event loop.
//
//=========================================================================

//=== External Crates =====================================================

use thiserror::Error;
use winit::error::EventLoopError;

//=== Internal Dependencies ===============================================

use crate::core::input::event::InputEvent;

//=== PlatformEvent =======================================================

/// Events sent from platform to core over the bounded bridge channel.
#[derive(Debug, Clone)]
pub(crate) enum PlatformEvent {
    /// Input gathered since the last redraw.
    Inputs {
        discrete: Vec<InputEvent>,
        continuous: Vec<InputEvent>,
    },

    /// Inner window size in physical pixels.
    Resized { width: u32, height: u32 },

    /// Window close requested.
    WindowClosed,
}

//=== PlatformError =======================================================

#[derive(Debug, Error)]
pub enum PlatformError {
    /// Event loop creation failed (OS-level issue).
    #[error("event loop creation failed: {0}")]
    EventLoopCreation(#[source] EventLoopError),

    #[error("event loop error: {0}")]
    EventLoopExecution(#[source] EventLoopError),
}
