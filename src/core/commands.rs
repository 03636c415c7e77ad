//=========================================================================
// Engine Commands
//=========================================================================
//
// Built-in named callbacks and the deferred commands they raise.
//
// Binding callbacks cannot borrow the InputManager that is dispatching
// them, so engine built-ins only enqueue an `EngineCommand`. The
// orchestrator drains the queue after input dispatch each tick.
//
// Architecture:
// ```text
//   key press ─> callback "reset_keys" ─> Sender<EngineCommand>
//                                              │
//   orchestrator tick: drain Receiver ─> apply(command, &mut input, &platform)
// ```
//
// Window commands only flip PlatformControl flags; the platform applies
// them on its next frame.
//
//=========================================================================

//=== External Crates =====================================================

use crossbeam_channel::{unbounded, Receiver, Sender};
use log::{info, warn};

//=== Internal Dependencies ===============================================

use crate::core::input::{CallbackRegistry, InputManager, KeyCode, Modifiers};
use crate::core::platform_bridge::{PlatformControl, TickControl, WindowMode};

//=== EngineCommand =======================================================

/// Engine-level request raised by a built-in named callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineCommand {
    /// Leave the game loop and shut down.
    Stop,

    /// Flip between captured and free cursor.
    ToggleCursor,

    /// Layer the default bindings over the current ones.
    ResetBindingsToDefaults,

    /// Drop every live binding, then apply the defaults.
    ResetBindings,

    /// Write named bindings to the bindings file.
    SaveBindings,

    /// Exclusive fullscreen on, or back to windowed.
    ToggleFullscreen,

    /// Borderless fullscreen on, or back to windowed.
    ToggleBorderlessFullscreen,

    MinimizeWindow,

    /// Move the window to the middle of its monitor.
    CenterWindow,
}

impl EngineCommand {
    pub const ALL: [EngineCommand; 9] = [
        EngineCommand::Stop,
        EngineCommand::ToggleCursor,
        EngineCommand::ResetBindingsToDefaults,
        EngineCommand::ResetBindings,
        EngineCommand::SaveBindings,
        EngineCommand::ToggleFullscreen,
        EngineCommand::ToggleBorderlessFullscreen,
        EngineCommand::MinimizeWindow,
        EngineCommand::CenterWindow,
    ];

    /// Registry id of the callback that raises this command.
    pub const fn callback_id(self) -> &'static str {
        match self {
            Self::Stop => "stop",
            Self::ToggleCursor => "toggle_cursor",
            Self::ResetBindingsToDefaults => "bind_keys_to_defaults",
            Self::ResetBindings => "reset_keys",
            Self::SaveBindings => "save_bindings",
            Self::ToggleFullscreen => "toggle_windowstate_fullscreen",
            Self::ToggleBorderlessFullscreen => "toggle_windowstate_fullwindowed",
            Self::MinimizeWindow => "minimize_window",
            Self::CenterWindow => "center_window",
        }
    }
}

//=== Engine Default Bindings =============================================

/// Default key map for the engine built-ins.
///
/// A code holds one live binding, so of two entries on the same key the
/// later one wins once the defaults are applied.
pub const ENGINE_DEFAULT_BINDINGS: [(KeyCode, Modifiers, EngineCommand); 9] = [
    (KeyCode::Escape, Modifiers::SHIFT, EngineCommand::Stop),
    (KeyCode::KeyC, Modifiers::ALT, EngineCommand::ToggleCursor),
    (KeyCode::Home, Modifiers::SHIFT_CTRL, EngineCommand::ResetBindingsToDefaults),
    (KeyCode::Home, Modifiers::SHIFT_CTRL_ALT, EngineCommand::ResetBindings),
    (KeyCode::KeyS, Modifiers::CTRL_ALT, EngineCommand::SaveBindings),
    (KeyCode::Enter, Modifiers::ALT, EngineCommand::ToggleFullscreen),
    (KeyCode::ArrowUp, Modifiers::ALT, EngineCommand::ToggleBorderlessFullscreen),
    (KeyCode::ArrowDown, Modifiers::ALT, EngineCommand::MinimizeWindow),
    (KeyCode::End, Modifiers::ALT, EngineCommand::CenterWindow),
];

//=== Channel =============================================================

pub(crate) fn command_channel() -> (Sender<EngineCommand>, Receiver<EngineCommand>) {
    unbounded()
}

/// Registers one named callback per [`EngineCommand`], each sending its
/// command on `sender`.
pub fn register_engine_callbacks(registry: &CallbackRegistry, sender: &Sender<EngineCommand>) {
    for command in EngineCommand::ALL {
        let tx = sender.clone();
        registry.register(command.callback_id(), move || {
            if tx.send(command).is_err() {
                warn!(target: "engine", "Command queue closed, dropping {:?}", command);
            }
        });
    }
}

//=== apply() =============================================================

/// Executes one command against the input manager and platform flags.
pub(crate) fn apply(
    command: EngineCommand,
    input: &mut InputManager,
    platform: &PlatformControl,
) -> TickControl {
    match command {
        EngineCommand::Stop => {
            info!(target: "engine", "Stop requested");
            return TickControl::Exit;
        }
        EngineCommand::ToggleCursor => {
            input.toggle_cursor();
        }
        EngineCommand::ResetBindingsToDefaults => {
            input.reset_to_defaults();
        }
        EngineCommand::ResetBindings => {
            input.reset_bindings();
        }
        EngineCommand::SaveBindings => match input.save_bindings() {
            Ok(count) => info!(target: "input", "Saved {} bindings", count),
            Err(e) => warn!(target: "input", "{}", e),
        },
        EngineCommand::ToggleFullscreen => {
            let mode = platform.toggle_window_mode(WindowMode::Fullscreen);
            info!(target: "engine", "Window mode: {:?}", mode);
        }
        EngineCommand::ToggleBorderlessFullscreen => {
            let mode = platform.toggle_window_mode(WindowMode::BorderlessFullscreen);
            info!(target: "engine", "Window mode: {:?}", mode);
        }
        EngineCommand::MinimizeWindow => platform.request_minimize(),
        EngineCommand::CenterWindow => platform.request_center(),
    }
    TickControl::Continue
}

//=========================================================================
// Unit Tests
//=========================================================================
