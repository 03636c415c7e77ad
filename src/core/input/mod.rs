//=========================================================================
// Input System
//
// Maps raw device events to user-defined actions with press / release /
// hold-down semantics and modifier-key gating.
//
// Components:
// - `event`: device codes, modifiers and platform input events
// - `binding`: immutable key bindings and trigger phases
// - `registry`: shared named-callback table
// - `input_manager`: live table, hold set, dispatch, persistence
// - `bindings_file`: on-disk format for named bindings
// - `handler`: game-side sink for text, cursor and scroll events
//
// Notes:
// The InputManager is owned by the engine context and updated by the
// orchestrator on the logic thread.
//
//=========================================================================

//=== Submodules ==========================================================

pub mod event;

mod binding;
mod bindings_file;
mod error;
mod handler;
mod input_manager;
mod registry;

//=== Public API ==========================================================

pub use binding::{KeyBinding, Trigger};
pub use error::{BindingsError, InputError};
pub use event::{InputCode, InputEvent, KeyCode, KeyState, Modifiers, MouseButton};
pub use handler::InputEventHandler;
pub use input_manager::{BindingsSource, InputManager};
pub use registry::{Callback, CallbackRegistry};
