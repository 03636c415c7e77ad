//=========================================================================
// Prelude
//=========================================================================
//
// Convenience module that re-exports commonly used types and traits.
//
// Usage:
//   use kindle_engine::prelude::*;
//
//=========================================================================

//=== Public API ==========================================================

// Engine facade
pub use crate::engine::{Engine, EngineBuilder};

// Context and game entry
pub use crate::core::commands::EngineCommand;
pub use crate::core::{EngineContext, EntryRegistry, Game, WindowMode};

// Scheduler
pub use crate::core::scheduler::{Scheduler, Task};

// Input system
pub use crate::core::input::{
    InputEventHandler, InputManager, KeyCode, KeyState, Modifiers, MouseButton, Trigger,
};
