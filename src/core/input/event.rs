//=========================================================================
// Device Event Types
//
// Defines the engine-side representation of low-level device input.
//
// This module abstracts platform input (Winit) into a portable format
// consumed by the binding dispatcher.
//
// Responsibilities:
// - Represent keys and mouse buttons in ONE integer code space
// - Carry modifier state as a persisted bitmask
// - Distinguish press / release / OS key-repeat transitions
// - Provide equality and hashing semantics for per-frame coalescing
//
// Code Space:
// ```text
//   0 ..=  7   mouse buttons   (Left = 0, Right = 1, Middle = 2, 4..8)
//  32 ..= 348  keyboard keys   (Space = 32, A = 65, Escape = 256, ...)
//  -1          unidentified key
// ```
// The numbering matches the GLFW tables so that persisted binding files
// stay readable across backends.
//
//=========================================================================

//=== Standard Library Imports ============================================

use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::BitOr;

//=== MouseButton =========================================================

/// Physical mouse button identifier.
///
/// Buttons 4 and 5 are the usual side buttons; 6 to 8 cover extra
/// buttons on gaming mice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(i32)]
pub enum MouseButton {
    /// Primary button (typically left).
    Left = 0,

    /// Secondary button (typically right).
    Right = 1,

    /// Middle button (wheel click).
    Middle = 2,

    /// Button 4, the "back" side button.
    Back = 3,

    /// Button 5, the "forward" side button.
    Forward = 4,

    Button6 = 5,
    Button7 = 6,
    Button8 = 7,
}

impl MouseButton {
    pub const ALL: [MouseButton; 8] = [
        MouseButton::Left,
        MouseButton::Right,
        MouseButton::Middle,
        MouseButton::Back,
        MouseButton::Forward,
        MouseButton::Button6,
        MouseButton::Button7,
        MouseButton::Button8,
    ];

    /// Raw device code of this button.
    pub const fn code(self) -> i32 {
        self as i32
    }

    pub fn from_code(code: i32) -> Option<Self> {
        Self::ALL.iter().copied().find(|b| b.code() == code)
    }
}

//=== KeyCode =============================================================

/// Physical keyboard key identifier.
///
/// Represents the physical key location, not the character produced.
/// Each variant carries its raw device code as discriminant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(i32)]
pub enum KeyCode {
    //--- Printable Keys ---------------------------------------------------

    Space = 32,
    Apostrophe = 39,
    Comma = 44,
    Minus = 45,
    Period = 46,
    Slash = 47,

    Digit0 = 48, Digit1 = 49, Digit2 = 50, Digit3 = 51, Digit4 = 52,
    Digit5 = 53, Digit6 = 54, Digit7 = 55, Digit8 = 56, Digit9 = 57,

    Semicolon = 59,
    Equal = 61,

    KeyA = 65, KeyB = 66, KeyC = 67, KeyD = 68, KeyE = 69, KeyF = 70,
    KeyG = 71, KeyH = 72, KeyI = 73, KeyJ = 74, KeyK = 75, KeyL = 76,
    KeyM = 77, KeyN = 78, KeyO = 79, KeyP = 80, KeyQ = 81, KeyR = 82,
    KeyS = 83, KeyT = 84, KeyU = 85, KeyV = 86, KeyW = 87, KeyX = 88,
    KeyY = 89, KeyZ = 90,

    BracketLeft = 91,
    Backslash = 92,
    BracketRight = 93,
    Grave = 96,

    /// Non-US key #1 (ISO key left of Z on most layouts).
    World1 = 161,
    /// Non-US key #2.
    World2 = 162,

    //--- Editing / Navigation ---------------------------------------------

    Escape = 256,
    Enter = 257,
    Tab = 258,
    Backspace = 259,
    Insert = 260,
    Delete = 261,
    ArrowRight = 262,
    ArrowLeft = 263,
    ArrowDown = 264,
    ArrowUp = 265,
    PageUp = 266,
    PageDown = 267,
    Home = 268,
    End = 269,

    //--- Locks / System ---------------------------------------------------

    CapsLock = 280,
    ScrollLock = 281,
    NumLock = 282,
    PrintScreen = 283,
    Pause = 284,

    //--- Function Keys ----------------------------------------------------

    F1 = 290, F2 = 291, F3 = 292, F4 = 293, F5 = 294, F6 = 295,
    F7 = 296, F8 = 297, F9 = 298, F10 = 299, F11 = 300, F12 = 301,
    F13 = 302, F14 = 303, F15 = 304, F16 = 305, F17 = 306, F18 = 307,
    F19 = 308, F20 = 309, F21 = 310, F22 = 311, F23 = 312, F24 = 313,
    F25 = 314,

    //--- Numpad -----------------------------------------------------------

    Numpad0 = 320, Numpad1 = 321, Numpad2 = 322, Numpad3 = 323, Numpad4 = 324,
    Numpad5 = 325, Numpad6 = 326, Numpad7 = 327, Numpad8 = 328, Numpad9 = 329,
    NumpadDecimal = 330,
    NumpadDivide = 331,
    NumpadMultiply = 332,
    NumpadSubtract = 333,
    NumpadAdd = 334,
    NumpadEnter = 335,
    NumpadEqual = 336,

    //--- Modifier Keys ----------------------------------------------------

    ShiftLeft = 340,
    ControlLeft = 341,
    AltLeft = 342,
    SuperLeft = 343,
    ShiftRight = 344,
    ControlRight = 345,
    AltRight = 346,
    SuperRight = 347,
    Menu = 348,

    /// Fallback for keys not mapped by the input layer.
    Unidentified = -1,
}

impl KeyCode {
    /// Every mapped key, in code order. `Unidentified` is excluded.
    pub const ALL: [KeyCode; 120] = {
        use KeyCode::*;
        [
            Space, Apostrophe, Comma, Minus, Period, Slash,
            Digit0, Digit1, Digit2, Digit3, Digit4, Digit5, Digit6, Digit7, Digit8, Digit9,
            Semicolon, Equal,
            KeyA, KeyB, KeyC, KeyD, KeyE, KeyF, KeyG, KeyH, KeyI, KeyJ, KeyK, KeyL, KeyM,
            KeyN, KeyO, KeyP, KeyQ, KeyR, KeyS, KeyT, KeyU, KeyV, KeyW, KeyX, KeyY, KeyZ,
            BracketLeft, Backslash, BracketRight, Grave, World1, World2,
            Escape, Enter, Tab, Backspace, Insert, Delete,
            ArrowRight, ArrowLeft, ArrowDown, ArrowUp, PageUp, PageDown, Home, End,
            CapsLock, ScrollLock, NumLock, PrintScreen, Pause,
            F1, F2, F3, F4, F5, F6, F7, F8, F9, F10, F11, F12, F13,
            F14, F15, F16, F17, F18, F19, F20, F21, F22, F23, F24, F25,
            Numpad0, Numpad1, Numpad2, Numpad3, Numpad4,
            Numpad5, Numpad6, Numpad7, Numpad8, Numpad9,
            NumpadDecimal, NumpadDivide, NumpadMultiply, NumpadSubtract,
            NumpadAdd, NumpadEnter, NumpadEqual,
            ShiftLeft, ControlLeft, AltLeft, SuperLeft,
            ShiftRight, ControlRight, AltRight, SuperRight, Menu,
        ]
    };

    /// Raw device code of this key.
    pub const fn code(self) -> i32 {
        self as i32
    }

    /// Looks up a key by raw device code.
    pub fn from_code(code: i32) -> Option<Self> {
        Self::ALL.iter().copied().find(|k| k.code() == code)
    }
}

//=== InputCode ===========================================================

/// A bindable device input: a keyboard key or a mouse button.
///
/// Keys and buttons share one integer space (see module header), so a
/// binding table keyed by `InputCode` holds at most one binding per
/// physical input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum InputCode {
    Key(KeyCode),
    Mouse(MouseButton),
}

impl InputCode {
    pub const fn raw(self) -> i32 {
        match self {
            Self::Key(key) => key.code(),
            Self::Mouse(button) => button.code(),
        }
    }

    /// Resolves a raw code. Keys are tried before buttons, which is
    /// unambiguous because the two ranges never overlap.
    pub fn from_raw(code: i32) -> Option<Self> {
        KeyCode::from_code(code)
            .map(Self::Key)
            .or_else(|| MouseButton::from_code(code).map(Self::Mouse))
    }
}

impl From<KeyCode> for InputCode {
    fn from(key: KeyCode) -> Self {
        Self::Key(key)
    }
}

impl From<MouseButton> for InputCode {
    fn from(button: MouseButton) -> Self {
        Self::Mouse(button)
    }
}

impl fmt::Display for InputCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Key(key) => write!(f, "{:?}({})", key, key.code()),
            Self::Mouse(button) => write!(f, "Mouse{:?}({})", button, button.code()),
        }
    }
}

//=== KeyState ============================================================

/// Device transition reported with a button event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyState {
    Pressed,
    Released,

    /// OS auto-repeat while a key stays down. Never matches a binding.
    Repeated,
}

//=== Modifiers ===========================================================

/// Modifier key state (Shift, Ctrl, Alt, Super).
///
/// # Usage in Bindings
///
/// A binding with a non-empty mask fires only on an EXACT match:
/// - Binding `Ctrl+S` will NOT match `Ctrl+Shift+S`
/// - Binding `Ctrl+S` will NOT match plain `S`
///
/// A binding with [`Modifiers::NONE`] fires regardless of held modifiers.
///
/// # Persisted Form
///
/// ```text
/// SHIFT = 1, CTRL = 2, ALT = 4, SUPER = 8
/// ```
/// `0` and `-1` both decode to `NONE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Modifiers {
    /// Either Shift key held.
    pub shift: bool,

    /// Either Ctrl key held.
    pub ctrl: bool,

    /// Either Alt key held (Option on macOS).
    pub alt: bool,

    /// Either Super key held (Windows key, Command on macOS).
    pub super_key: bool,
}

//--- Modifier Constants --------------------------------------------------

impl Modifiers {
    const SHIFT_BIT: i32 = 0x1;
    const CTRL_BIT: i32 = 0x2;
    const ALT_BIT: i32 = 0x4;
    const SUPER_BIT: i32 = 0x8;

    pub const NONE: Self = Self { shift: false, ctrl: false, alt: false, super_key: false };
    pub const SHIFT: Self = Self { shift: true, ..Self::NONE };
    pub const CTRL: Self = Self { ctrl: true, ..Self::NONE };
    pub const ALT: Self = Self { alt: true, ..Self::NONE };
    pub const SUPER: Self = Self { super_key: true, ..Self::NONE };
    pub const SHIFT_CTRL: Self = Self { shift: true, ctrl: true, ..Self::NONE };
    pub const SHIFT_ALT: Self = Self { shift: true, alt: true, ..Self::NONE };
    pub const CTRL_ALT: Self = Self { ctrl: true, alt: true, ..Self::NONE };
    pub const SHIFT_CTRL_ALT: Self = Self { shift: true, ctrl: true, alt: true, super_key: false };
}

//--- Mask Conversion -----------------------------------------------------

impl Modifiers {
    /// Encodes this state as a bitmask.
    pub const fn mask(self) -> i32 {
        let mut mask = 0;
        if self.shift { mask |= Self::SHIFT_BIT; }
        if self.ctrl { mask |= Self::CTRL_BIT; }
        if self.alt { mask |= Self::ALT_BIT; }
        if self.super_key { mask |= Self::SUPER_BIT; }
        mask
    }

    /// Decodes a bitmask. Negative masks mean "no modifier required".
    pub const fn from_mask(mask: i32) -> Self {
        if mask <= 0 {
            return Self::NONE;
        }
        Self {
            shift: mask & Self::SHIFT_BIT != 0,
            ctrl: mask & Self::CTRL_BIT != 0,
            alt: mask & Self::ALT_BIT != 0,
            super_key: mask & Self::SUPER_BIT != 0,
        }
    }

    pub const fn is_none(self) -> bool {
        self.mask() == 0
    }
}

impl BitOr for Modifiers {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self::from_mask(self.mask() | rhs.mask())
    }
}

//=== InputEvent ==========================================================

/// Low-level input event from the platform layer.
///
/// # Equality & Hashing Semantics
///
/// Button events compare by code + state + modifiers. `CursorMoved` and
/// `Scroll` compare equal regardless of payload so the platform buffer can
/// coalesce them per frame.
///
/// ```text
/// Button{A, Pressed, CTRL} == Button{A, Pressed, CTRL}   ✓
/// Button{A, Pressed}       == Button{A, Released}        ✗
/// CursorMoved{..}          == CursorMoved{..}            ✓ (always equal)
/// Scroll{..}               == Scroll{..}                 ✓ (always equal)
/// ```
#[derive(Debug, Clone)]
pub enum InputEvent {
    /// Key or mouse-button transition. The only kind the binding
    /// dispatcher consumes.
    Button {
        code: InputCode,
        state: KeyState,
        modifiers: Modifiers,
    },

    /// Text input (unicode scalar), forwarded to the game handler.
    CharInput(char),

    /// Cursor position in window pixels, top-left origin.
    CursorMoved { x: f64, y: f64 },

    /// Wheel / trackpad scroll delta.
    Scroll { dx: f64, dy: f64 },

    /// Unrecognized event, ignored by the input system.
    Unidentified,
}

//--- Implementation ------------------------------------------------------

impl InputEvent {
    pub fn key(key: KeyCode, state: KeyState, modifiers: Modifiers) -> Self {
        Self::Button { code: InputCode::Key(key), state, modifiers }
    }

    pub fn mouse(button: MouseButton, state: KeyState, modifiers: Modifiers) -> Self {
        Self::Button { code: InputCode::Mouse(button), state, modifiers }
    }

    /// Returns `true` for events coalesced per frame (last or summed wins).
    pub fn is_continuous(&self) -> bool {
        matches!(self, Self::CursorMoved { .. } | Self::Scroll { .. })
    }
}

//--- Trait Implementations -----------------------------------------------

impl PartialEq for InputEvent {
    fn eq(&self, other: &Self) -> bool {
        use InputEvent::*;
        match (self, other) {
            (
                Button { code: a, state: sa, modifiers: ma },
                Button { code: b, state: sb, modifiers: mb },
            ) => a == b && sa == sb && ma == mb,
            (CharInput(a), CharInput(b)) => a == b,
            (CursorMoved { .. }, CursorMoved { .. }) => true,
            (Scroll { .. }, Scroll { .. }) => true,
            (Unidentified, Unidentified) => true,
            _ => false,
        }
    }
}

impl Eq for InputEvent {}

/// Hashes discriminant + payload, skipping the coordinates of
/// continuous events (consistent with equality).
impl Hash for InputEvent {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);

        match self {
            Self::Button { code, state: key_state, modifiers } => {
                code.hash(state);
                key_state.hash(state);
                modifiers.hash(state);
            }
            Self::CharInput(c) => c.hash(state),
            _ => {}
        }
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
