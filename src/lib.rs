//=========================================================================
// Kindle Engine - Library Root
//
// Fixed-tick game engine shell: a tick scheduler, rebindable input
// dispatch with persisted key maps, and a winit window feeding both.
//
// Responsibilities:
// - Expose the engine facade (`EngineBuilder`, `Engine`)
// - Expose the logic-thread systems under `core` (scheduler, input,
//   engine context, game entry)
// - Keep the windowing layer (`platform`) private
//
// Typical usage:
// ```no_run
// use kindle_engine::core::{EngineContext, Game};
// use kindle_engine::EngineBuilder;
//
// struct MyGame;
//
// impl Game for MyGame {
//     fn render(&mut self, _ctx: &mut EngineContext) {}
// }
//
// fn main() {
//     EngineBuilder::new().with_game(MyGame).build().run();
// }
// ```
//
//=========================================================================

//--- Public Modules ------------------------------------------------------
//
// `core` holds everything that runs on the logic thread. Applications
// mostly touch it through `EngineContext` and the `Game` trait.
//
pub mod core;
pub mod prelude;

//--- Internal Modules ----------------------------------------------------
//
// `platform` owns the window and the Winit event loop on the main thread.
// `engine` wires platform and core together.
//
mod engine;
mod platform;

//--- Public Exports ------------------------------------------------------

pub use engine::{Engine, EngineBuilder, DEFAULT_BINDINGS_PATH};
