//=========================================================================
// Kindle Engine
//
// Main entry point and coordinator for the engine.
//
// Architecture:
// ```text
//     EngineBuilder  ──build()──>  Engine  ──init()──>  Engine  ──run()──>  [Runtime]
//         │                                  │                            │
//         ├─ with_tps()                      └─ &mut EngineContext        ├─ logic thread
//         ├─ with_channel_capacity()                                      ├─ platform loop
//         ├─ with_bindings_path()                                         └─ blocks until exit
//         ├─ with_window_title() / with_window_size()
//         ├─ with_cursor_enabled()
//         └─ with_game()
// ```
//
//=========================================================================

//=== Standard Library Imports ============================================

use std::path::PathBuf;

//=== External Dependencies ===============================================

use crossbeam_channel::{bounded, Receiver, Sender};
use log::{error, info, warn};

//=== Internal Dependencies ===============================================

use crate::core::game::IdleGame;
use crate::core::platform_bridge::PlatformEvent;
use crate::core::{CoreSystemsOrchestrator, EngineContext, Game, PlatformControl};
use crate::platform::{Platform, WindowSettings};

//=== Defaults ============================================================

/// Default location of the bindings file, relative to the working directory.
pub const DEFAULT_BINDINGS_PATH: &str = "etc/keys.dat";

//=== EngineBuilder =======================================================

/// Builder for configuring and constructing an [`Engine`].
///
/// # Default Values
///
/// - **TPS**: 60.0 (logic ticks per second)
/// - **Channel capacity**: 128 platform messages
/// - **Bindings file**: `etc/keys.dat`
/// - **Window**: "Kindle Engine", 800x600
/// - **Cursor**: visible and free
///
/// # Examples
///
/// ```no_run
/// use kindle_engine::core::{EngineContext, Game};
/// use kindle_engine::core::input::{KeyCode, Modifiers, Trigger};
/// use kindle_engine::EngineBuilder;
///
/// struct Sandbox;
///
/// impl Game for Sandbox {
///     fn render(&mut self, _ctx: &mut EngineContext) {}
/// }
///
/// EngineBuilder::new()
///     .with_tps(120.0)
///     .with_window_title("Sandbox")
///     .with_game(Sandbox)
///     .build()
///     .init(|ctx| {
///         ctx.input.add_named_callback("jump", || println!("jump"));
///         ctx.input
///             .add_default_named_binding(KeyCode::Space, Trigger::Press, Modifiers::NONE, "jump")
///             .expect("registered above");
///     })
///     .run();
/// ```
pub struct EngineBuilder {
    tps: f64,
    channel_capacity: usize,
    bindings_path: PathBuf,
    window: WindowSettings,
    cursor_enabled: bool,
    game: Option<Box<dyn Game>>,
}

impl EngineBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            tps: 60.0,
            channel_capacity: 128,
            bindings_path: PathBuf::from(DEFAULT_BINDINGS_PATH),
            window: WindowSettings::default(),
            cursor_enabled: true,
            game: None,
        }
    }

    /// Sets the target ticks per second for the logic thread.
    ///
    /// Scheduler delays are counted in these ticks.
    ///
    /// # Panics
    ///
    /// Panics if `tps <= 0.0`.
    pub fn with_tps(mut self, tps: f64) -> Self {
        assert!(tps > 0.0, "TPS must be positive, got {}", tps);
        self.tps = tps;
        self
    }

    /// Sets the capacity of the platform → core channel.
    ///
    /// # Panics
    ///
    /// Panics if `capacity == 0`.
    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        assert!(capacity > 0, "Channel capacity must be positive");
        self.channel_capacity = capacity;
        self
    }

    /// Sets the file the primary input manager loads and saves bindings to.
    pub fn with_bindings_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.bindings_path = path.into();
        self
    }

    pub fn with_window_title(mut self, title: impl Into<String>) -> Self {
        self.window.title = title.into();
        self
    }

    /// Sets the initial inner window size in logical pixels.
    ///
    /// # Panics
    ///
    /// Panics if either dimension is zero.
    pub fn with_window_size(mut self, width: u32, height: u32) -> Self {
        assert!(width > 0 && height > 0, "Window size must be positive, got {}x{}", width, height);
        self.window.width = width;
        self.window.height = height;
        self
    }

    /// `false` starts with the cursor hidden and grabbed.
    pub fn with_cursor_enabled(mut self, enabled: bool) -> Self {
        self.cursor_enabled = enabled;
        self
    }

    pub fn with_game(mut self, game: impl Game + 'static) -> Self {
        self.game = Some(Box::new(game));
        self
    }

    /// Same as [`with_game`](Self::with_game) for an already boxed game,
    /// e.g. one returned by [`EntryRegistry::resolve`](crate::core::EntryRegistry::resolve).
    pub fn with_boxed_game(mut self, game: Box<dyn Game>) -> Self {
        self.game = Some(game);
        self
    }

    /// Builds the engine, creating the engine context with the built-in
    /// callbacks and default key map in place.
    pub fn build(self) -> Engine {
        info!(
            target: "engine",
            "Building engine (TPS: {}, channel: {}, bindings: {})",
            self.tps,
            self.channel_capacity,
            self.bindings_path.display()
        );

        let game = self.game.unwrap_or_else(|| {
            warn!(target: "engine", "No game attached, running idle");
            Box::new(IdleGame)
        });

        let control = PlatformControl::new(self.cursor_enabled);
        let context = EngineContext::new(control.clone(), self.bindings_path);

        Engine {
            orchestrator: CoreSystemsOrchestrator::new(context, game),
            control,
            tps: self.tps,
            channel_capacity: self.channel_capacity,
            window: self.window,
        }
    }
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

//=== Engine ==============================================================

/// Kindle Engine runtime.
///
/// # Architecture
///
/// ```text
/// Engine (Main Thread)
///   ├─► CoreSystemsOrchestrator (Logic Thread @ TPS)
///   │     └─► Scheduler, InputManager, Game
///   │
///   └─► Platform (Event Loop)
///         └─► Window, Input Polling
///
/// Communication: crossbeam channel (PlatformEvent) + PlatformControl
/// ```
pub struct Engine {
    orchestrator: CoreSystemsOrchestrator,
    control: PlatformControl,
    tps: f64,
    channel_capacity: usize,
    window: WindowSettings,
}

impl Engine {
    //--- Initialization ---------------------------------------------------

    /// Gives mutable access to the [`EngineContext`] before the engine
    /// starts: register named callbacks, add default bindings, schedule
    /// start-up tasks.
    ///
    /// Runs before bindings are loaded, so defaults added here are what a
    /// missing or corrupt bindings file falls back to.
    pub fn init<F>(mut self, init_fn: F) -> Self
    where
        F: FnOnce(&mut EngineContext),
    {
        info!(target: "engine", "Initializing engine context");
        init_fn(self.orchestrator.context_mut());
        self
    }

    //--- Execution --------------------------------------------------------

    /// Starts the engine runtime and blocks until the application exits.
    ///
    /// # Lifecycle
    ///
    /// 1. Creates the bounded platform → core channel
    /// 2. Spawns the logic thread (loads bindings, opens the game, ticks)
    /// 3. Runs the platform event loop on this thread
    /// 4. On window close or `Stop`: both sides wind down, the logic thread
    ///    closes the game and saves bindings, then is joined
    ///
    /// # Panics
    ///
    /// Panics if called off the main thread on platforms where Winit
    /// requires it.
    pub fn run(self) {
        info!(target: "engine", "Starting engine runtime (TPS: {})", self.tps);

        //--- 1. Create communication channel -----------------------------
        let (tx, rx): (Sender<PlatformEvent>, Receiver<PlatformEvent>) =
            bounded(self.channel_capacity);

        //--- 2. Spawn the core logic thread -------------------------------
        let core_handle = self.orchestrator.spawn_core_thread(rx, self.tps);
        info!(target: "engine", "Core logic thread spawned");

        //--- 3. Launch the platform subsystem -----------------------------
        let platform = Platform::new(tx, self.control, self.window);

        if let Err(e) = platform.run() {
            error!(target: "engine", "Platform error: {}", e);
        }

        info!(target: "engine", "Platform event loop exited");

        //--- 4. Wait for logic thread to terminate ------------------------
        // Dropping the platform closed the channel, so the core loop sees a
        // disconnect even if WindowClosed was never sent.
        match core_handle.join() {
            Ok(()) => info!(target: "engine", "Core thread terminated cleanly"),
            Err(e) => error!(target: "engine", "Core thread panicked: {:?}", e),
        }

        info!(target: "engine", "Engine shutdown complete");
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::commands::ENGINE_DEFAULT_BINDINGS;
    use crate::core::input::{KeyCode, Modifiers, Trigger};

    struct NullGame;

    impl Game for NullGame {
        fn render(&mut self, _ctx: &mut EngineContext) {}
    }

    //=====================================================================
    // EngineBuilder Tests
    //=====================================================================

    #[test]
    fn builder_defaults() {
        let builder = EngineBuilder::new();
        assert_eq!(builder.tps, 60.0);
        assert_eq!(builder.channel_capacity, 128);
        assert_eq!(builder.bindings_path, PathBuf::from("etc/keys.dat"));
        assert_eq!(builder.window, WindowSettings::default());
        assert!(builder.cursor_enabled);
        assert!(builder.game.is_none());
    }

    #[test]
    fn builder_with_tps() {
        let builder = EngineBuilder::new().with_tps(120.0);
        assert_eq!(builder.tps, 120.0);
    }

    #[test]
    #[should_panic(expected = "TPS must be positive")]
    fn builder_with_tps_panics_on_zero() {
        EngineBuilder::new().with_tps(0.0);
    }

    #[test]
    #[should_panic(expected = "TPS must be positive")]
    fn builder_with_tps_panics_on_negative() {
        EngineBuilder::new().with_tps(-60.0);
    }

    #[test]
    fn builder_with_channel_capacity() {
        let builder = EngineBuilder::new().with_channel_capacity(256);
        assert_eq!(builder.channel_capacity, 256);
    }

    #[test]
    #[should_panic(expected = "Channel capacity must be positive")]
    fn builder_with_channel_capacity_panics_on_zero() {
        EngineBuilder::new().with_channel_capacity(0);
    }

    #[test]
    #[should_panic(expected = "Window size must be positive")]
    fn builder_with_window_size_panics_on_zero() {
        EngineBuilder::new().with_window_size(0, 600);
    }

    #[test]
    fn builder_window_settings() {
        let builder = EngineBuilder::new()
            .with_window_title("Sandbox")
            .with_window_size(1280, 720);

        assert_eq!(builder.window.title, "Sandbox");
        assert_eq!((builder.window.width, builder.window.height), (1280, 720));
    }

    #[test]
    fn builder_fluent_api_chaining() {
        let engine = EngineBuilder::new()
            .with_tps(120.0)
            .with_channel_capacity(256)
            .with_bindings_path("config/controls.dat")
            .with_cursor_enabled(false)
            .with_game(NullGame)
            .build();

        assert_eq!(engine.tps, 120.0);
        assert_eq!(engine.channel_capacity, 256);
        assert!(!engine.control.cursor_enabled());
        assert_eq!(
            engine.orchestrator.context().input.bindings_path(),
            std::path::Path::new("config/controls.dat")
        );
    }

    #[test]
    fn build_without_game_runs_idle() {
        let engine = EngineBuilder::new().build();
        assert!(engine.orchestrator.context().callbacks().contains("stop"));
    }

    //=====================================================================
    // Engine Tests
    //=====================================================================

    #[test]
    fn init_configures_context() {
        let engine = EngineBuilder::new()
            .with_game(NullGame)
            .build()
            .init(|ctx| {
                ctx.input.add_named_callback("jump", || {});
                ctx.input
                    .add_default_named_binding(KeyCode::Space, Trigger::Press, Modifiers::NONE, "jump")
                    .unwrap();
                ctx.scheduler.run_after(10, || {});
            });

        let ctx = engine.orchestrator.context();
        assert!(ctx.callbacks().contains("jump"));
        assert_eq!(ctx.input.default_bindings().len(), ENGINE_DEFAULT_BINDINGS.len() + 1);
        assert_eq!(ctx.scheduler.pending_tasks(), 1);
    }

    #[test]
    fn engine_shares_control_with_context() {
        let engine = EngineBuilder::new().build();

        engine.orchestrator.context().platform().set_cursor_enabled(false);
        assert!(!engine.control.cursor_enabled());
    }
}
