//=========================================================================
// Engine Context
//=========================================================================
//
// State owned by the logic thread and handed to every game hook.
//
// Architecture:
//   EngineContext
//     ├─ scheduler   tick scheduler
//     ├─ input       primary InputManager
//     ├─ callbacks   named-callback registry (shared by all managers)
//     ├─ platform    cursor / window / exit flags read by the main thread
//     └─ commands    queue for engine built-ins (stop, reset keys, ...)
//
// There is no global engine state: anything that needs the registry or
// the scheduler receives this context explicitly.
//
//=========================================================================

//=== Standard Library Imports ============================================

use std::path::PathBuf;

//=== External Crates =====================================================

use crossbeam_channel::{Receiver, Sender};
use log::warn;

//=== Internal Dependencies ===============================================

use crate::core::commands::{self, command_channel, EngineCommand};
use crate::core::input::{CallbackRegistry, InputManager};
use crate::core::platform_bridge::{PlatformControl, TickControl};
use crate::core::scheduler::Scheduler;

//=== EngineContext =======================================================

/// Scheduler, input and shared handles for one running engine.
///
/// Game code receives `&mut EngineContext` in every [`Game`] hook and in
/// [`Engine::init`].
///
/// [`Game`]: crate::core::game::Game
/// [`Engine::init`]: crate::Engine::init
pub struct EngineContext {
    /// Tick scheduler, advanced once at the start of every tick.
    pub scheduler: Scheduler,

    /// Primary input manager, fed with platform events every tick.
    pub input: InputManager,

    callbacks: CallbackRegistry,
    platform: PlatformControl,
    command_tx: Sender<EngineCommand>,
    command_rx: Receiver<EngineCommand>,
}

impl EngineContext {
    //--- Construction -----------------------------------------------------

    /// Creates a context with the engine built-ins registered and the
    /// engine default key map added to the input defaults.
    pub(crate) fn new(platform: PlatformControl, bindings_path: impl Into<PathBuf>) -> Self {
        let callbacks = CallbackRegistry::new();
        let (command_tx, command_rx) = command_channel();
        commands::register_engine_callbacks(&callbacks, &command_tx);

        let mut input = InputManager::new(callbacks.clone(), platform.clone(), bindings_path);
        input.add_engine_default_bindings();

        Self {
            scheduler: Scheduler::new(),
            input,
            callbacks,
            platform,
            command_tx,
            command_rx,
        }
    }

    //--- Shared Handles ---------------------------------------------------

    pub fn callbacks(&self) -> &CallbackRegistry {
        &self.callbacks
    }

    pub fn platform(&self) -> &PlatformControl {
        &self.platform
    }

    /// Creates another InputManager sharing this context's registry and
    /// platform flags, with its own bindings file.
    pub fn new_input_manager(&self, bindings_path: impl Into<PathBuf>) -> InputManager {
        InputManager::new(self.callbacks.clone(), self.platform.clone(), bindings_path)
    }

    //--- Commands ---------------------------------------------------------

    /// Sender for engine commands, usable from any thread.
    pub fn command_sender(&self) -> Sender<EngineCommand> {
        self.command_tx.clone()
    }

    /// Queues `command`; it runs after input dispatch this tick.
    pub fn send_command(&self, command: EngineCommand) {
        if self.command_tx.send(command).is_err() {
            warn!(target: "engine", "Command queue closed, dropping {:?}", command);
        }
    }

    /// Requests shutdown at the end of the current tick.
    pub fn stop(&self) {
        self.send_command(EngineCommand::Stop);
    }

    /// Applies every queued command in order. Commands queued after a
    /// `Stop` are left in the queue.
    pub(crate) fn apply_commands(&mut self) -> TickControl {
        while let Ok(command) = self.command_rx.try_recv() {
            if commands::apply(command, &mut self.input, &self.platform) == TickControl::Exit {
                return TickControl::Exit;
            }
        }
        TickControl::Continue
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
