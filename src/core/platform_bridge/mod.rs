//=========================================================================
// Platform Bridge
//=========================================================================
//
// Contract between the windowing thread and the logic thread.
//
// Components:
// - `interface`: events flowing platform → core, platform errors
// - `event_collector`: per-tick draining of the bridge channel
// - `control`: flags flowing core → platform (cursor, window mode, exit)
//
//=========================================================================

//=== Module Declarations =================================================

pub(crate) mod control;
pub(crate) mod event_collector;
pub(crate) mod interface;

//=== Internal API ========================================================

pub use control::{PlatformControl, WindowMode};
pub(crate) use event_collector::{EventCollector, TickControl};
pub use interface::PlatformError;
pub(crate) use interface::PlatformEvent;
