//=========================================================================
// Input Processor
//=========================================================================
//
// Converts Winit window events into engine InputEvents.
//
// Architecture:
//   Winit Events → InputProcessor → InputEvent (engine type) → InputBuffer
//
// Stateful modifier tracking: the latest ModifiersChanged state is
// attached to every button event. Keys without an engine code (media
// keys, F26 and above, IME keys) are filtered (returns None).
//
//=========================================================================

//=== External Dependencies ===============================================

use winit::{
    event::{ElementState, KeyEvent, MouseButton as WinitMouseButton, MouseScrollDelta},
    keyboard::{KeyCode as WinitKeyCode, ModifiersState, PhysicalKey},
};

//=== Internal Dependencies ===============================================

use crate::core::input::event::{InputEvent, KeyCode, KeyState, Modifiers, MouseButton};

//=== InputProcessor ======================================================

/// Converts Winit events to engine InputEvents with stateful modifier tracking.
pub(crate) struct InputProcessor {
    current_modifiers: Modifiers,
}

impl InputProcessor {
    //--- Construction -----------------------------------------------------

    pub(crate) fn new() -> Self {
        Self {
            current_modifiers: Modifiers::NONE,
        }
    }

    //--- Modifier State Management ----------------------------------------

    /// Updates cached modifier state (applied to subsequent events).
    pub(crate) fn update_modifiers(&mut self, modifiers_state: ModifiersState) {
        self.current_modifiers = Modifiers::from(modifiers_state);
    }

    #[cfg(test)]
    pub(crate) fn current_modifiers(&self) -> Modifiers {
        self.current_modifiers
    }

    //--- Event Processing -------------------------------------------------

    /// Converts a Winit KeyEvent to a button event (filters unmapped keys).
    pub(crate) fn process_key_event(&self, key_event: &KeyEvent) -> Option<InputEvent> {
        let key_code = match key_event.physical_key {
            PhysicalKey::Code(code) => KeyCode::from(code),
            _ => return None,
        };

        if key_code == KeyCode::Unidentified {
            return None;
        }

        Some(self.key_transition(key_code, key_event.state, key_event.repeat))
    }

    /// Characters typed by a key press, one `CharInput` per char.
    pub(crate) fn process_key_text(&self, key_event: &KeyEvent) -> Vec<InputEvent> {
        if key_event.state != ElementState::Pressed {
            return Vec::new();
        }
        key_event.text.as_deref().map(text_events).unwrap_or_default()
    }

    /// Converts a mouse button transition (filters buttons past 8).
    pub(crate) fn process_mouse_button(
        &self,
        button: WinitMouseButton,
        state: ElementState,
    ) -> Option<InputEvent> {
        let button = mouse_button(button)?;
        Some(InputEvent::mouse(button, key_state(state, false), self.current_modifiers))
    }

    /// Cursor position in window pixels (no modifiers).
    pub(crate) fn process_mouse_move(&self, x: f64, y: f64) -> InputEvent {
        InputEvent::CursorMoved { x, y }
    }

    /// Wheel motion; line deltas stay in lines, touchpad deltas in pixels.
    pub(crate) fn process_scroll(&self, delta: MouseScrollDelta) -> InputEvent {
        match delta {
            MouseScrollDelta::LineDelta(dx, dy) => InputEvent::Scroll {
                dx: f64::from(dx),
                dy: f64::from(dy),
            },
            MouseScrollDelta::PixelDelta(position) => InputEvent::Scroll {
                dx: position.x,
                dy: position.y,
            },
        }
    }

    //--- Internal Helpers -------------------------------------------------

    fn key_transition(&self, key: KeyCode, state: ElementState, repeat: bool) -> InputEvent {
        InputEvent::key(key, key_state(state, repeat), self.current_modifiers)
    }
}

fn key_state(state: ElementState, repeat: bool) -> KeyState {
    match (state, repeat) {
        (ElementState::Pressed, false) => KeyState::Pressed,
        (ElementState::Pressed, true) => KeyState::Repeated,
        (ElementState::Released, _) => KeyState::Released,
    }
}

/// Printable characters of `text` as input events.
fn text_events(text: &str) -> Vec<InputEvent> {
    text.chars()
        .filter(|c| !c.is_control())
        .map(InputEvent::CharInput)
        .collect()
}

//=========================================================================
// Winit Conversions
//=========================================================================

/// Winit normalizes platform keys (macOS Cmd → Super, Option → Alt).
impl From<ModifiersState> for Modifiers {
    fn from(state: ModifiersState) -> Self {
        Self {
            shift: state.shift_key(),
            ctrl: state.control_key(),
            alt: state.alt_key(),
            super_key: state.super_key(),
        }
    }
}

/// Converts Winit physical key codes to engine key codes.
impl From<WinitKeyCode> for KeyCode {
    fn from(code: WinitKeyCode) -> Self {
        use WinitKeyCode::*;
        match code {
            //--- Punctuation --------------------------------------------------

            Quote => KeyCode::Apostrophe,
            Comma => KeyCode::Comma,
            Minus => KeyCode::Minus,
            Period => KeyCode::Period,
            Slash => KeyCode::Slash,
            Semicolon => KeyCode::Semicolon,
            Equal => KeyCode::Equal,
            BracketLeft => KeyCode::BracketLeft,
            Backslash => KeyCode::Backslash,
            BracketRight => KeyCode::BracketRight,
            Backquote => KeyCode::Grave,
            IntlBackslash => KeyCode::World1,

            //--- Digits -------------------------------------------------------

            Digit0 => KeyCode::Digit0,
            Digit1 => KeyCode::Digit1,
            Digit2 => KeyCode::Digit2,
            Digit3 => KeyCode::Digit3,
            Digit4 => KeyCode::Digit4,
            Digit5 => KeyCode::Digit5,
            Digit6 => KeyCode::Digit6,
            Digit7 => KeyCode::Digit7,
            Digit8 => KeyCode::Digit8,
            Digit9 => KeyCode::Digit9,

            //--- Letters ------------------------------------------------------

            KeyA => KeyCode::KeyA,
            KeyB => KeyCode::KeyB,
            KeyC => KeyCode::KeyC,
            KeyD => KeyCode::KeyD,
            KeyE => KeyCode::KeyE,
            KeyF => KeyCode::KeyF,
            KeyG => KeyCode::KeyG,
            KeyH => KeyCode::KeyH,
            KeyI => KeyCode::KeyI,
            KeyJ => KeyCode::KeyJ,
            KeyK => KeyCode::KeyK,
            KeyL => KeyCode::KeyL,
            KeyM => KeyCode::KeyM,
            KeyN => KeyCode::KeyN,
            KeyO => KeyCode::KeyO,
            KeyP => KeyCode::KeyP,
            KeyQ => KeyCode::KeyQ,
            KeyR => KeyCode::KeyR,
            KeyS => KeyCode::KeyS,
            KeyT => KeyCode::KeyT,
            KeyU => KeyCode::KeyU,
            KeyV => KeyCode::KeyV,
            KeyW => KeyCode::KeyW,
            KeyX => KeyCode::KeyX,
            KeyY => KeyCode::KeyY,
            KeyZ => KeyCode::KeyZ,

            //--- Navigation ---------------------------------------------------

            ArrowUp => KeyCode::ArrowUp,
            ArrowDown => KeyCode::ArrowDown,
            ArrowLeft => KeyCode::ArrowLeft,
            ArrowRight => KeyCode::ArrowRight,
            PageUp => KeyCode::PageUp,
            PageDown => KeyCode::PageDown,
            Home => KeyCode::Home,
            End => KeyCode::End,
            Insert => KeyCode::Insert,
            Delete => KeyCode::Delete,

            //--- Function Keys ------------------------------------------------

            F1 => KeyCode::F1,
            F2 => KeyCode::F2,
            F3 => KeyCode::F3,
            F4 => KeyCode::F4,
            F5 => KeyCode::F5,
            F6 => KeyCode::F6,
            F7 => KeyCode::F7,
            F8 => KeyCode::F8,
            F9 => KeyCode::F9,
            F10 => KeyCode::F10,
            F11 => KeyCode::F11,
            F12 => KeyCode::F12,
            F13 => KeyCode::F13,
            F14 => KeyCode::F14,
            F15 => KeyCode::F15,
            F16 => KeyCode::F16,
            F17 => KeyCode::F17,
            F18 => KeyCode::F18,
            F19 => KeyCode::F19,
            F20 => KeyCode::F20,
            F21 => KeyCode::F21,
            F22 => KeyCode::F22,
            F23 => KeyCode::F23,
            F24 => KeyCode::F24,
            F25 => KeyCode::F25,

            //--- Numpad -------------------------------------------------------

            Numpad0 => KeyCode::Numpad0,
            Numpad1 => KeyCode::Numpad1,
            Numpad2 => KeyCode::Numpad2,
            Numpad3 => KeyCode::Numpad3,
            Numpad4 => KeyCode::Numpad4,
            Numpad5 => KeyCode::Numpad5,
            Numpad6 => KeyCode::Numpad6,
            Numpad7 => KeyCode::Numpad7,
            Numpad8 => KeyCode::Numpad8,
            Numpad9 => KeyCode::Numpad9,
            NumpadDecimal => KeyCode::NumpadDecimal,
            NumpadDivide => KeyCode::NumpadDivide,
            NumpadMultiply => KeyCode::NumpadMultiply,
            NumpadSubtract => KeyCode::NumpadSubtract,
            NumpadAdd => KeyCode::NumpadAdd,
            NumpadEnter => KeyCode::NumpadEnter,
            NumpadEqual => KeyCode::NumpadEqual,

            //--- Locks / System -----------------------------------------------

            CapsLock => KeyCode::CapsLock,
            ScrollLock => KeyCode::ScrollLock,
            NumLock => KeyCode::NumLock,
            PrintScreen => KeyCode::PrintScreen,
            Pause => KeyCode::Pause,
            ContextMenu => KeyCode::Menu,

            //--- Modifiers ----------------------------------------------------

            ShiftLeft => KeyCode::ShiftLeft,
            ShiftRight => KeyCode::ShiftRight,
            ControlLeft => KeyCode::ControlLeft,
            ControlRight => KeyCode::ControlRight,
            AltLeft => KeyCode::AltLeft,
            AltRight => KeyCode::AltRight,
            SuperLeft => KeyCode::SuperLeft,
            SuperRight => KeyCode::SuperRight,

            //--- Special ------------------------------------------------------

            Space => KeyCode::Space,
            Enter => KeyCode::Enter,
            Escape => KeyCode::Escape,
            Tab => KeyCode::Tab,
            Backspace => KeyCode::Backspace,

            _ => KeyCode::Unidentified,
        }
    }
}

/// Maps a Winit button onto buttons 1 to 8. `Other(n)` counts from
/// `Left = 0`, so only `Other(5..=7)` has an engine code.
fn mouse_button(button: WinitMouseButton) -> Option<MouseButton> {
    match button {
        WinitMouseButton::Left => Some(MouseButton::Left),
        WinitMouseButton::Right => Some(MouseButton::Right),
        WinitMouseButton::Middle => Some(MouseButton::Middle),
        WinitMouseButton::Back => Some(MouseButton::Back),
        WinitMouseButton::Forward => Some(MouseButton::Forward),
        WinitMouseButton::Other(n) if n >= 5 => MouseButton::from_code(i32::from(n)),
        WinitMouseButton::Other(_) => None,
    }
}

//=========================================================================
// Tests
//=========================================================================
