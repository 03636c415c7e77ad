//=========================================================================
// Key Binding
//=========================================================================
//
// Immutable association of a device code, a modifier mask, a trigger
// phase and a callback.
//
// Matching rules:
// ```text
//   Trigger::Press   fires on KeyState::Pressed
//   Trigger::Release fires on KeyState::Released
//   Trigger::Hold    fires on KeyState::Pressed, then every tick until
//                    the code is released
//   KeyState::Repeated never fires anything
//
//   mask NONE  → accepts any modifier state
//   mask M     → accepts exactly M
// ```
//
//=========================================================================

//=== Standard Library Imports ============================================

use std::fmt;
use std::str::FromStr;

//=== Internal Dependencies ===============================================

use super::event::{InputCode, KeyState, Modifiers};
use super::registry::{normalize_id, Callback};

//=== Trigger =============================================================

/// Phase on which a binding fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Trigger {
    Press,
    Release,
    Hold,
}

impl Trigger {
    /// Device transition this trigger reacts to.
    ///
    /// `Hold` fires on the press and is then driven by the per-tick poll.
    pub const fn fires_on(self) -> KeyState {
        match self {
            Self::Press | Self::Hold => KeyState::Pressed,
            Self::Release => KeyState::Released,
        }
    }

    /// Token used in the persisted bindings file.
    pub const fn token(self) -> &'static str {
        match self {
            Self::Press => "press",
            Self::Release => "release",
            Self::Hold => "hold",
        }
    }
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

impl FromStr for Trigger {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "press" => Ok(Self::Press),
            "release" => Ok(Self::Release),
            "hold" => Ok(Self::Hold),
            other => Err(format!("unknown trigger phase '{}'", other)),
        }
    }
}

//=== KeyBinding ==========================================================

/// A single entry of the live binding table.
///
/// Bindings built with [`KeyBinding::named`] remember the registry id of
/// their callback and are the only ones written by `save_bindings`.
#[derive(Clone)]
pub struct KeyBinding {
    code: InputCode,
    modifiers: Modifiers,
    trigger: Trigger,
    callback: Callback,
    name: Option<String>,
}

impl KeyBinding {
    //--- Construction -----------------------------------------------------

    pub fn new(
        code: impl Into<InputCode>,
        trigger: Trigger,
        modifiers: Modifiers,
        callback: Callback,
    ) -> Self {
        Self {
            code: code.into(),
            modifiers,
            trigger,
            callback,
            name: None,
        }
    }

    pub fn named(
        code: impl Into<InputCode>,
        trigger: Trigger,
        modifiers: Modifiers,
        name: &str,
        callback: Callback,
    ) -> Self {
        Self {
            name: Some(normalize_id(name)),
            ..Self::new(code, trigger, modifiers, callback)
        }
    }

    //--- Accessors --------------------------------------------------------

    pub fn code(&self) -> InputCode {
        self.code
    }

    pub fn modifiers(&self) -> Modifiers {
        self.modifiers
    }

    pub fn trigger(&self) -> Trigger {
        self.trigger
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn callback(&self) -> &Callback {
        &self.callback
    }

    //--- Matching ---------------------------------------------------------

    /// Returns `true` if a transition with `state` and `modifiers` fires
    /// this binding.
    pub fn matches(&self, state: KeyState, modifiers: Modifiers) -> bool {
        self.trigger.fires_on() == state
            && (self.modifiers.is_none() || self.modifiers == modifiers)
    }
}

impl fmt::Debug for KeyBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyBinding")
            .field("code", &self.code)
            .field("modifiers", &self.modifiers)
            .field("trigger", &self.trigger)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::input::event::{KeyCode, MouseButton};
    use std::sync::Arc;

    fn noop() -> Callback {
        Arc::new(|| {})
    }

    //=====================================================================
    // Trigger Tests
    //=====================================================================

    #[test]
    fn hold_fires_on_press() {
        assert_eq!(Trigger::Hold.fires_on(), KeyState::Pressed);
        assert_eq!(Trigger::Press.fires_on(), KeyState::Pressed);
        assert_eq!(Trigger::Release.fires_on(), KeyState::Released);
    }

    #[test]
    fn trigger_tokens_parse_back() {
        for trigger in [Trigger::Press, Trigger::Release, Trigger::Hold] {
            assert_eq!(trigger.token().parse::<Trigger>(), Ok(trigger));
        }
        assert_eq!(" HOLD ".parse::<Trigger>(), Ok(Trigger::Hold));
        assert!("tap".parse::<Trigger>().is_err());
    }

    //=====================================================================
    // Matching Tests
    //=====================================================================

    #[test]
    fn exact_modifier_match_required() {
        let binding = KeyBinding::new(KeyCode::KeyS, Trigger::Press, Modifiers::CTRL, noop());

        assert!(binding.matches(KeyState::Pressed, Modifiers::CTRL));
        assert!(!binding.matches(KeyState::Pressed, Modifiers::SHIFT_CTRL));
        assert!(!binding.matches(KeyState::Pressed, Modifiers::NONE));
    }

    #[test]
    fn empty_mask_accepts_any_modifiers() {
        let binding = KeyBinding::new(KeyCode::KeyW, Trigger::Press, Modifiers::NONE, noop());

        assert!(binding.matches(KeyState::Pressed, Modifiers::NONE));
        assert!(binding.matches(KeyState::Pressed, Modifiers::SHIFT_CTRL_ALT));
    }

    #[test]
    fn wrong_phase_never_matches() {
        let binding = KeyBinding::new(MouseButton::Left, Trigger::Release, Modifiers::NONE, noop());

        assert!(binding.matches(KeyState::Released, Modifiers::NONE));
        assert!(!binding.matches(KeyState::Pressed, Modifiers::NONE));
        assert!(!binding.matches(KeyState::Repeated, Modifiers::NONE));
    }

    #[test]
    fn named_binding_normalises_name() {
        let binding = KeyBinding::named(KeyCode::F3, Trigger::Press, Modifiers::NONE, " Toggle_FPS ", noop());
        assert_eq!(binding.name(), Some("toggle_fps"));
        assert_eq!(binding.code(), InputCode::Key(KeyCode::F3));
    }
}
