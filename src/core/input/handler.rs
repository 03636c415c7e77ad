//=========================================================================
// Input Event Handler
//=========================================================================
//
// Game-side sink for device events the binding table does not consume:
// text input, cursor motion and scroll.
//
//=========================================================================

/// Receives non-button device events from an [`InputManager`].
///
/// All hooks default to no-ops; implement the ones the game needs.
///
/// [`InputManager`]: super::InputManager
pub trait InputEventHandler: Send {
    /// Unicode text input.
    fn on_char_input(&mut self, _c: char) {}

    /// Cursor moved. Coordinates are normalised to `[-1, 1]` with `+y` up.
    fn on_cursor_move(&mut self, _x: f32, _y: f32) {}

    fn on_scroll(&mut self, _dx: f64, _dy: f64) {}
}
