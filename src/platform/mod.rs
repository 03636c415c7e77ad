//=========================================================================
// Platform Subsystem
//
// Bridges Winit (OS-level events) with the engine's logic thread.
//
// Architecture:
// ```text
//  Main Thread:                     Logic Thread:
//  ┌──────────────────────────┐    ┌──────────────────────┐
//  │  Winit Event Loop        │    │  Orchestrator        │
//  │   ↓                      │    │   ├─ Scheduler       │
//  │  InputProcessor          │    │   ├─ InputManager    │
//  │   ├─ Converts Winit      │    │   └─ Game            │
//  │   └─ Tracks modifiers    │    │                      │
//  │   ↓                      │    └──────────────────────┘
//  │  InputBuffer             │          ↑          │
//  │   ↓                      │          │          │
//  │  RedrawRequested (flush) │          │          │
//  │   ↓                      │          │          │
//  │  Bridge channel ─────────┼──────────┘          │
//  │                          │   PlatformEvent     │
//  │  PlatformControl  <──────┼─────────────────────┘
//  └──────────────────────────┘   cursor / window / exit flags
//
//  Frame Boundary: RedrawRequested
//    → buffered input sent as one message
//    → cursor capture, window mode and exit flags applied
// ```
//
// Notes:
// - Winit requires the main thread on macOS/iOS, so this runs on the
//   thread that called `Engine::run()`.
// - If the logic thread has gone away the platform keeps running so the
//   window can still be closed.
//
//=========================================================================

//=== Submodules ==========================================================

mod input_buffer;
mod input_processor;

//=== External Crates =====================================================

use crossbeam_channel::Sender;
use log::*;
use winit::{
    application::ApplicationHandler,
    dpi::{LogicalSize, PhysicalPosition, PhysicalSize},
    event::WindowEvent,
    event_loop::{ActiveEventLoop, EventLoop},
    window::{CursorGrabMode, Fullscreen, Window, WindowAttributes, WindowId},
};

//=== Internal Imports ====================================================

use crate::core::platform_bridge::{PlatformControl, PlatformError, PlatformEvent, WindowMode};
use input_buffer::InputBuffer;
use input_processor::InputProcessor;

//=== WindowSettings ======================================================

/// Initial window configuration.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct WindowSettings {
    pub(crate) title: String,
    pub(crate) width: u32,
    pub(crate) height: u32,
}

impl Default for WindowSettings {
    fn default() -> Self {
        Self {
            title: "Kindle Engine".to_string(),
            width: 800,
            height: 600,
        }
    }
}

//=== Platform ============================================================

/// Window owner and input aggregator for the main thread.
///
/// # Lifecycle
///
/// 1. `Platform::new(..)`: no window yet
/// 2. `run()`: starts the Winit event loop (blocks)
/// 3. `resumed()`: window created, initial size reported
/// 4. `RedrawRequested`: input flushed, control flags applied
/// 5. Close button or exit flag: `WindowClosed` sent, loop exits
pub(crate) struct Platform {
    /// OS window handle (None until `resumed()` called).
    window: Option<Window>,

    settings: WindowSettings,

    /// Buffers input until the frame boundary.
    buffer: InputBuffer,

    event_sender: Sender<PlatformEvent>,

    input_processor: InputProcessor,

    control: PlatformControl,

    /// Cursor mode currently applied to the window.
    applied_cursor: Option<bool>,

    /// Display mode currently applied to the window.
    applied_mode: WindowMode,
}

impl Platform {
    //--- Construction -----------------------------------------------------

    /// Does not create the window yet; that happens in `resumed()`.
    pub(crate) fn new(
        event_sender: Sender<PlatformEvent>,
        control: PlatformControl,
        settings: WindowSettings,
    ) -> Self {
        info!(target: "platform", "Platform subsystem initialized");
        Self {
            window: None,
            settings,
            buffer: InputBuffer::new(),
            event_sender,
            input_processor: InputProcessor::new(),
            control,
            applied_cursor: None,
            applied_mode: WindowMode::Windowed,
        }
    }

    //--- Execution --------------------------------------------------------

    /// Runs the Winit event loop until the window closes.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError`] if the event loop cannot be created or
    /// fails while running.
    ///
    /// # Panics
    ///
    /// Panics if called off the main thread on platforms where Winit
    /// requires it.
    pub(crate) fn run(mut self) -> Result<(), PlatformError> {
        debug!(target: "platform", "Starting Winit event loop");

        let event_loop = EventLoop::new().map_err(PlatformError::EventLoopCreation)?;

        event_loop
            .run_app(&mut self)
            .map_err(PlatformError::EventLoopExecution)
    }

    //--- Internal Helpers -------------------------------------------------

    /// Sends buffered input to the logic thread as one `Inputs` message.
    ///
    /// Empty buffers are not sent. On a disconnected channel the events are
    /// dropped with a warning.
    fn flush_input_buffer(&mut self) {
        if let Some((discrete, continuous)) = self.buffer.drain() {
            let discrete_count = discrete.len();
            let continuous_count = continuous.len();

            trace!(
                target: "platform::input",
                "Flushing {} discrete + {} continuous events",
                discrete_count,
                continuous_count
            );

            if self.event_sender.send(PlatformEvent::Inputs { discrete, continuous }).is_err() {
                warn!(
                    target: "platform::input",
                    "Channel disconnected, dropping {} discrete and {} continuous events",
                    discrete_count,
                    continuous_count
                );
            }
        }
    }

    fn send_resize(&self, size: PhysicalSize<u32>) {
        let event = PlatformEvent::Resized {
            width: size.width,
            height: size.height,
        };
        if self.event_sender.send(event).is_err() {
            debug!(target: "platform", "Channel disconnected, resize not delivered");
        }
    }

    fn close(&mut self, event_loop: &ActiveEventLoop) {
        let _ = self.event_sender.send(PlatformEvent::WindowClosed);
        event_loop.exit();
    }

    /// Applies the cursor flag to the window when it changed.
    fn sync_cursor(&mut self) {
        let enabled = self.control.cursor_enabled();
        if self.applied_cursor == Some(enabled) {
            return;
        }
        let Some(window) = &self.window else {
            return;
        };

        window.set_cursor_visible(enabled);
        let grab = if enabled {
            window.set_cursor_grab(CursorGrabMode::None)
        } else {
            window
                .set_cursor_grab(CursorGrabMode::Locked)
                .or_else(|_| window.set_cursor_grab(CursorGrabMode::Confined))
        };
        if let Err(e) = grab {
            warn!(target: "platform", "Cursor grab change failed: {}", e);
        }

        debug!(target: "platform", "Cursor {}", if enabled { "released" } else { "captured" });
        self.applied_cursor = Some(enabled);
    }

    /// Applies a window mode change and pending minimize / center
    /// requests. Requests stay pending until a window exists.
    fn sync_window(&mut self) {
        let Some(window) = &self.window else {
            return;
        };

        let mode = self.control.window_mode();
        if mode != self.applied_mode {
            window.set_fullscreen(fullscreen_for(window, mode));
            debug!(target: "platform", "Window mode {:?}", mode);
            self.applied_mode = mode;
        }

        if self.control.take_minimize_request() {
            window.set_minimized(true);
        }

        if self.control.take_center_request() {
            match window.current_monitor() {
                Some(monitor) => {
                    let position =
                        centered_position(monitor.position(), monitor.size(), window.outer_size());
                    window.set_outer_position(position);
                    debug!(target: "platform", "Window centered at {:?}", position);
                }
                None => warn!(target: "platform", "Cannot center window: no current monitor"),
            }
        }
    }

    //--- Test Accessors ---------------------------------------------------

    #[cfg(test)]
    pub(crate) fn window(&self) -> Option<&Window> {
        self.window.as_ref()
    }
}

//=== Winit Integration ===================================================

impl ApplicationHandler for Platform {
    /// Creates the window on first resume and reports its size.
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            debug!(target: "platform", "Window already exists (mobile resume?)");
            return;
        }

        let attrs = WindowAttributes::default()
            .with_title(self.settings.title.clone())
            .with_inner_size(LogicalSize::new(self.settings.width, self.settings.height));

        match event_loop.create_window(attrs) {
            Ok(window) => {
                let size = window.inner_size();
                info!(
                    target: "platform",
                    "Window created: {}x{} @ {}x DPI",
                    size.width,
                    size.height,
                    window.scale_factor()
                );
                self.send_resize(size);
                window.request_redraw();
                self.window = Some(window);
                self.sync_cursor();
                self.sync_window();
            }
            Err(e) => {
                error!(target: "platform", "Window creation failed: {}", e);
                self.close(event_loop);
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        match &event {
            WindowEvent::CloseRequested => {
                info!(target: "platform", "Window close requested");
                self.close(event_loop);
            }

            WindowEvent::Resized(size) => {
                self.send_resize(*size);
            }

            WindowEvent::ModifiersChanged(state) => {
                trace!(target: "platform::input", "Modifiers changed: {:?}", state);
                self.input_processor.update_modifiers(state.state());
            }

            WindowEvent::CursorMoved { position, .. } => {
                let event = self.input_processor.process_mouse_move(position.x, position.y);
                self.buffer.push_continuous(event);
            }

            WindowEvent::MouseWheel { delta, .. } => {
                let event = self.input_processor.process_scroll(*delta);
                self.buffer.push_continuous(event);
            }

            WindowEvent::KeyboardInput { event: key_event, .. } => {
                match self.input_processor.process_key_event(key_event) {
                    Some(event) => self.buffer.push_discrete(event),
                    None => trace!(target: "platform::input", "Unmapped key ignored"),
                }
                for event in self.input_processor.process_key_text(key_event) {
                    self.buffer.push_discrete(event);
                }
            }

            WindowEvent::MouseInput { state, button, .. } => {
                match self.input_processor.process_mouse_button(*button, *state) {
                    Some(event) => self.buffer.push_discrete(event),
                    None => trace!(target: "platform::input", "Unmapped mouse button {:?} ignored", button),
                }
            }

            WindowEvent::RedrawRequested => {
                // Frame boundary
                self.flush_input_buffer();
                self.sync_cursor();
                self.sync_window();

                if self.control.exit_requested() {
                    info!(target: "platform", "Exit requested by core");
                    self.close(event_loop);
                    return;
                }

                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }

            _ => {}
        }
    }
}

//=== Window Geometry =====================================================

/// Winit fullscreen setting for `mode`. Exclusive mode uses the largest
/// video mode of the current monitor and falls back to borderless.
fn fullscreen_for(window: &Window, mode: WindowMode) -> Option<Fullscreen> {
    match mode {
        WindowMode::Windowed => None,
        WindowMode::BorderlessFullscreen => Some(Fullscreen::Borderless(window.current_monitor())),
        WindowMode::Fullscreen => {
            let video_mode = window.current_monitor().and_then(|monitor| {
                monitor.video_modes().max_by_key(|v| {
                    let size = v.size();
                    (u64::from(size.width) * u64::from(size.height), v.refresh_rate_millihertz())
                })
            });
            match video_mode {
                Some(video_mode) => Some(Fullscreen::Exclusive(video_mode)),
                None => {
                    warn!(target: "platform", "No video mode available, using borderless fullscreen");
                    Some(Fullscreen::Borderless(None))
                }
            }
        }
    }
}

/// Top-left position that centers a window of `window_size` on a monitor.
fn centered_position(
    monitor_position: PhysicalPosition<i32>,
    monitor_size: PhysicalSize<u32>,
    window_size: PhysicalSize<u32>,
) -> PhysicalPosition<i32> {
    let offset = |outer: u32, inner: u32| ((i64::from(outer) - i64::from(inner)) / 2) as i32;
    PhysicalPosition::new(
        monitor_position.x + offset(monitor_size.width, window_size.width),
        monitor_position.y + offset(monitor_size.height, window_size.height),
    )
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::input::event::{InputEvent, KeyCode, KeyState, Modifiers};
    use crossbeam_channel::unbounded;

    fn platform() -> (Platform, crossbeam_channel::Receiver<PlatformEvent>) {
        let (tx, rx) = unbounded();
        (Platform::new(tx, PlatformControl::default(), WindowSettings::default()), rx)
    }

    fn space_down() -> InputEvent {
        InputEvent::key(KeyCode::Space, KeyState::Pressed, Modifiers::NONE)
    }

    //=====================================================================
    // PlatformEvent Tests
    //=====================================================================

    #[test]
    fn platform_event_is_debug() {
        let debug_str = format!("{:?}", PlatformEvent::Resized { width: 1, height: 2 });
        assert!(debug_str.contains("Resized"));
    }

    //=====================================================================
    // Platform Tests
    //=====================================================================

    #[test]
    fn platform_creation() {
        let (platform, _rx) = platform();
        assert!(platform.window().is_none(), "Window should be created lazily");
        assert_eq!(platform.settings, WindowSettings::default());
    }

    #[test]
    fn flush_empty_buffer_is_noop() {
        let (mut platform, rx) = platform();

        platform.flush_input_buffer();

        assert!(rx.try_recv().is_err(), "No events should be sent for empty buffer");
    }

    #[test]
    fn flush_sends_buffered_events() {
        let (mut platform, rx) = platform();
        platform.buffer.push_discrete(space_down());
        platform.buffer.push_continuous(InputEvent::Scroll { dx: 0.0, dy: 1.0 });

        platform.flush_input_buffer();

        match rx.try_recv() {
            Ok(PlatformEvent::Inputs { discrete, continuous }) => {
                assert_eq!(discrete, vec![space_down()]);
                assert_eq!(continuous.len(), 1);
            }
            other => panic!("Expected Inputs event, got {:?}", other),
        }
    }

    #[test]
    fn flush_handles_disconnected_channel() {
        let (mut platform, rx) = platform();
        platform.buffer.push_discrete(space_down());
        drop(rx);

        platform.flush_input_buffer();
        assert!(platform.buffer.is_empty());
    }

    #[test]
    fn multiple_flushes_clear_buffer() {
        let (mut platform, rx) = platform();
        platform.buffer.push_discrete(space_down());

        platform.flush_input_buffer();
        platform.flush_input_buffer();

        assert!(rx.try_recv().is_ok(), "First flush should send");
        assert!(rx.try_recv().is_err(), "Second flush should not send");
    }

    #[test]
    fn resize_is_forwarded() {
        let (platform, rx) = platform();

        platform.send_resize(PhysicalSize::new(1024, 768));

        match rx.try_recv() {
            Ok(PlatformEvent::Resized { width, height }) => assert_eq!((width, height), (1024, 768)),
            other => panic!("Expected Resized event, got {:?}", other),
        }
    }

    #[test]
    fn cursor_sync_waits_for_window() {
        let (mut platform, _rx) = platform();

        platform.sync_cursor();
        assert_eq!(platform.applied_cursor, None);
    }

    #[test]
    fn window_requests_wait_for_window() {
        let (mut platform, _rx) = platform();
        platform.control.request_center();
        platform.control.set_window_mode(WindowMode::Fullscreen);

        platform.sync_window();

        assert_eq!(platform.applied_mode, WindowMode::Windowed);
        assert!(platform.control.take_center_request(), "Request must stay pending");
    }

    //=====================================================================
    // Window Geometry Tests
    //=====================================================================

    #[test]
    fn centered_on_secondary_monitor() {
        let position = centered_position(
            PhysicalPosition::new(1920, 0),
            PhysicalSize::new(1920, 1080),
            PhysicalSize::new(800, 600),
        );
        assert_eq!(position, PhysicalPosition::new(2480, 240));
    }

    #[test]
    fn oversized_window_overhangs_evenly() {
        let position = centered_position(
            PhysicalPosition::new(0, 0),
            PhysicalSize::new(800, 600),
            PhysicalSize::new(1000, 700),
        );
        assert_eq!(position, PhysicalPosition::new(-100, -50));
    }

    //=====================================================================
    // PlatformError Tests
    //=====================================================================

    #[test]
    fn platform_error_is_error_trait() {
        fn assert_error<T: std::error::Error>() {}
        assert_error::<PlatformError>();
    }
}
