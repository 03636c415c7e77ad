//=========================================================================
// Core Systems Orchestrator
//
// Central coordinator for the logic (non-platform) thread.
//
// Responsibilities:
// - Own the EngineContext (scheduler, input, callbacks) and the Game
// - Receive platform events through the EventCollector
// - Run every tick in a fixed order at a fixed rate (TPS)
// - Open and close the game, load and save bindings
//
// Tick order:
// ```text
//   scheduler.advance()
//   game.on_tick(ctx)
//   input.poll_held()
//   dispatch platform input batches
//   apply queued engine commands      (Stop ends the loop here)
//   game.render(ctx)
// ```
//
// Notes:
// The orchestrator talks to the platform only through the bridge channel
// (platform → core) and PlatformControl flags (core → platform).
//
//=========================================================================

//=== Module Declarations =================================================

pub mod commands;
pub mod context;
pub mod game;
pub mod input;
pub mod scheduler;

pub(crate) mod guard;
pub(crate) mod platform_bridge;

//=== Public API ==========================================================

pub use context::EngineContext;
pub use game::{EntryError, EntryRegistry, Game};
pub use platform_bridge::{PlatformControl, PlatformError, WindowMode};

//=== Standard Library Imports ============================================

use std::thread;
use std::time::{Duration, Instant};

//=== External Crates =====================================================

use crossbeam_channel::Receiver;
use log::{debug, info, warn};

//=== Internal Dependencies ===============================================

use guard::run_guarded;
use input::{BindingsSource, InputEvent};
use platform_bridge::{EventCollector, PlatformEvent, TickControl};

//=== CoreSystemsOrchestrator =============================================

/// Owns the logic-thread state and drives the game lifecycle.
///
/// Dropping an opened orchestrator runs the shutdown sequence, so the game
/// is closed and bindings are saved even if the loop unwinds.
pub(crate) struct CoreSystemsOrchestrator {
    context: EngineContext,
    game: Box<dyn Game>,
    opened: bool,
    closed: bool,
}

impl CoreSystemsOrchestrator {
    //--- Construction -----------------------------------------------------

    pub(crate) fn new(context: EngineContext, game: Box<dyn Game>) -> Self {
        Self {
            context,
            game,
            opened: false,
            closed: false,
        }
    }

    #[cfg(test)]
    pub(crate) fn context(&self) -> &EngineContext {
        &self.context
    }

    pub(crate) fn context_mut(&mut self) -> &mut EngineContext {
        &mut self.context
    }

    //--- Lifecycle --------------------------------------------------------

    /// Loads bindings and opens the game. Runs once.
    pub(crate) fn open(&mut self) {
        if self.opened {
            return;
        }
        self.opened = true;

        match self.context.input.load_bindings() {
            BindingsSource::File { applied, skipped } => {
                debug!(target: "engine", "Bindings from file: {} applied, {} skipped", applied, skipped)
            }
            BindingsSource::Defaults => debug!(target: "engine", "Bindings from defaults"),
        }

        let (game, ctx) = (&mut self.game, &mut self.context);
        run_guarded("engine", "Game::on_open", || game.on_open(ctx));
        info!(target: "engine", "Game opened");
    }

    /// Closes the game, saves bindings, closes input and asks the platform
    /// to exit. Runs once; a never-opened orchestrator only signals exit.
    pub(crate) fn shutdown(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;

        if self.opened {
            let (game, ctx) = (&mut self.game, &mut self.context);
            run_guarded("engine", "Game::on_close", || game.on_close(ctx));

            match self.context.input.save_bindings() {
                Ok(count) => debug!(target: "engine", "Saved {} bindings on shutdown", count),
                Err(e) => warn!(target: "engine", "{}", e),
            }
        }

        self.context.input.close();
        self.context.platform().request_exit();
        info!(target: "engine", "Core shut down");
    }

    //--- tick() -----------------------------------------------------------

    /// Runs one tick over the input batches collected for it.
    pub(crate) fn tick(&mut self, batches: &[Vec<InputEvent>]) -> TickControl {
        self.context.scheduler.advance();

        let (game, ctx) = (&mut self.game, &mut self.context);
        run_guarded("engine", "Game::on_tick", || game.on_tick(ctx));

        self.context.input.poll_held();

        for event in batches.iter().flatten() {
            self.context.input.handle_event(event);
        }

        if self.context.apply_commands() == TickControl::Exit {
            return TickControl::Exit;
        }

        let (game, ctx) = (&mut self.game, &mut self.context);
        run_guarded("engine", "Game::render", || game.render(ctx));
        TickControl::Continue
    }

    //--- spawn_core_thread() ---------------------------------------------

    /// Spawns the logic thread ticking at `tps` until the window closes,
    /// the platform hangs up or a Stop command is applied.
    pub(crate) fn spawn_core_thread(
        self,
        receiver: Receiver<PlatformEvent>,
        tps: f64,
    ) -> thread::JoinHandle<()> {
        let frame_duration = Duration::from_secs_f64(1.0 / tps);

        thread::spawn(move || {
            let mut orchestrator = self;
            let mut collector = EventCollector::new(receiver);

            orchestrator.open();

            loop {
                let frame_start = Instant::now();

                //--- Step 1: Gather platform events ------------------------
                let platform_closed = collector.collect_frame() == TickControl::Exit;
                if let Some((width, height)) = collector.take_resize() {
                    orchestrator.context.input.set_viewport(width, height);
                }
                let batches = collector.take_batches();

                if platform_closed {
                    // Input that arrived ahead of the close still gets a tick.
                    if !batches.is_empty() {
                        orchestrator.tick(&batches);
                    }
                    info!(target: "engine", "Platform closed, core thread exiting");
                    break;
                }

                //--- Step 2: Tick ------------------------------------------
                if orchestrator.tick(&batches) == TickControl::Exit {
                    info!(target: "engine", "Stop applied, core thread exiting");
                    break;
                }

                //--- Step 3: Maintain fixed pacing -------------------------
                let elapsed = frame_start.elapsed();
                if elapsed < frame_duration {
                    thread::sleep(frame_duration - elapsed);
                }
            }

            orchestrator.shutdown();
        })
    }
}

impl Drop for CoreSystemsOrchestrator {
    fn drop(&mut self) {
        self.shutdown();
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
