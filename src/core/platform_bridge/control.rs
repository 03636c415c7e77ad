//=========================================================================
// Platform Control
//=========================================================================
//
// Core → platform requests that cannot travel over the event channel
// (which only flows platform → core).
//
// Architecture:
//   Logic thread: InputManager / orchestrator write flags
//   Main thread:  Platform reads flags on every RedrawRequested
//
// Window mode is a level (the platform converges on it); minimize and
// center are one-shot requests the platform takes and clears.
//
//=========================================================================

//=== Standard Library Imports ============================================

use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::Arc;

//=== WindowMode ==========================================================

/// Display mode requested for the game window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum WindowMode {
    #[default]
    Windowed = 0,

    /// Exclusive fullscreen at the monitor's video mode.
    Fullscreen = 1,

    /// Borderless window covering the current monitor.
    BorderlessFullscreen = 2,
}

impl WindowMode {
    fn from_u8(value: u8) -> Self {
        match value {
            1 => Self::Fullscreen,
            2 => Self::BorderlessFullscreen,
            _ => Self::Windowed,
        }
    }
}

//=== PlatformControl =====================================================

#[derive(Debug)]
struct ControlFlags {
    cursor_enabled: AtomicBool,
    exit_requested: AtomicBool,
    window_mode: AtomicU8,
    minimize_requested: AtomicBool,
    center_requested: AtomicBool,
}

/// Shared flags the platform layer polls once per frame.
///
/// Cloning yields a handle to the same flags.
#[derive(Debug, Clone)]
pub struct PlatformControl {
    flags: Arc<ControlFlags>,
}

impl PlatformControl {
    pub fn new(cursor_enabled: bool) -> Self {
        Self {
            flags: Arc::new(ControlFlags {
                cursor_enabled: AtomicBool::new(cursor_enabled),
                exit_requested: AtomicBool::new(false),
                window_mode: AtomicU8::new(WindowMode::Windowed as u8),
                minimize_requested: AtomicBool::new(false),
                center_requested: AtomicBool::new(false),
            }),
        }
    }

    //--- Cursor -----------------------------------------------------------

    /// `true` = normal visible cursor, `false` = hidden and grabbed.
    pub fn cursor_enabled(&self) -> bool {
        self.flags.cursor_enabled.load(Ordering::Acquire)
    }

    pub fn set_cursor_enabled(&self, enabled: bool) {
        self.flags.cursor_enabled.store(enabled, Ordering::Release);
    }

    //--- Window -----------------------------------------------------------

    pub fn window_mode(&self) -> WindowMode {
        WindowMode::from_u8(self.flags.window_mode.load(Ordering::Acquire))
    }

    pub fn set_window_mode(&self, mode: WindowMode) {
        self.flags.window_mode.store(mode as u8, Ordering::Release);
    }

    /// Switches to `mode`, or back to windowed if already in it. Returns
    /// the new mode.
    pub fn toggle_window_mode(&self, mode: WindowMode) -> WindowMode {
        let target = mode as u8;
        let windowed = WindowMode::Windowed as u8;
        let previous = self
            .flags
            .window_mode
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |current| {
                Some(if current == target { windowed } else { target })
            })
            .unwrap_or_else(|current| current);
        WindowMode::from_u8(if previous == target { windowed } else { target })
    }

    pub fn request_minimize(&self) {
        self.flags.minimize_requested.store(true, Ordering::Release);
    }

    /// Returns and clears a pending minimize request.
    pub fn take_minimize_request(&self) -> bool {
        self.flags.minimize_requested.swap(false, Ordering::AcqRel)
    }

    pub fn request_center(&self) {
        self.flags.center_requested.store(true, Ordering::Release);
    }

    /// Returns and clears a pending center request.
    pub fn take_center_request(&self) -> bool {
        self.flags.center_requested.swap(false, Ordering::AcqRel)
    }

    //--- Shutdown ---------------------------------------------------------

    /// Asks the platform to close the window and leave its event loop.
    pub fn request_exit(&self) {
        self.flags.exit_requested.store(true, Ordering::Release);
    }

    pub fn exit_requested(&self) -> bool {
        self.flags.exit_requested.load(Ordering::Acquire)
    }
}

impl Default for PlatformControl {
    fn default() -> Self {
        Self::new(true)
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_visible_cursor_and_no_exit() {
        let control = PlatformControl::default();
        assert!(control.cursor_enabled());
        assert!(!control.exit_requested());
        assert_eq!(control.window_mode(), WindowMode::Windowed);
    }

    #[test]
    fn toggle_window_mode_returns_to_windowed() {
        let control = PlatformControl::default();

        assert_eq!(control.toggle_window_mode(WindowMode::Fullscreen), WindowMode::Fullscreen);
        assert_eq!(
            control.toggle_window_mode(WindowMode::BorderlessFullscreen),
            WindowMode::BorderlessFullscreen
        );
        assert_eq!(
            control.toggle_window_mode(WindowMode::BorderlessFullscreen),
            WindowMode::Windowed
        );
        assert_eq!(control.window_mode(), WindowMode::Windowed);
    }

    #[test]
    fn window_requests_are_one_shot() {
        let control = PlatformControl::default();
        let platform_side = control.clone();
        assert!(!platform_side.take_minimize_request());

        control.request_minimize();
        control.request_center();

        assert!(platform_side.take_minimize_request());
        assert!(!platform_side.take_minimize_request());
        assert!(platform_side.take_center_request());
        assert!(!platform_side.take_center_request());
    }

    #[test]
    fn clones_share_flags() {
        let control = PlatformControl::new(true);
        let platform_side = control.clone();

        control.set_cursor_enabled(false);
        control.request_exit();

        assert!(!platform_side.cursor_enabled());
        assert!(platform_side.exit_requested());
    }
}
