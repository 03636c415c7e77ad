//=========================================================================
// Input Buffer
//
// Per-frame store for input gathered between two RedrawRequested events.
//
// Responsibilities:
// - Keep discrete events (buttons, text) in arrival order
// - Drop consecutive duplicate button events (OS auto-repeat floods)
// - Coalesce continuous events: latest cursor position, summed scroll
//
// Notes:
// The buffer lives on the platform thread and is drained into one
// `PlatformEvent::Inputs` message per frame.
//=========================================================================

//=== Standard Library Imports ============================================

use std::collections::HashSet;

//=== Internal Modules ====================================================

use crate::core::input::event::InputEvent;

//=== InputBuffer =========================================================

pub(crate) struct InputBuffer {
    discrete: Vec<InputEvent>,
    continuous: HashSet<InputEvent>,
}

impl InputBuffer {
    pub(crate) fn new() -> Self {
        const DISCRETE_BASE: usize = 128;
        const CONTINUOUS_BASE: usize = 4;

        Self {
            discrete: Vec::with_capacity(DISCRETE_BASE),
            continuous: HashSet::with_capacity(CONTINUOUS_BASE),
        }
    }

    //--- Continuous Event Handling ---------------------------------------

    /// Cursor moves replace the previous position; scroll deltas add up.
    pub(crate) fn push_continuous(&mut self, event: InputEvent) {
        match (self.continuous.take(&event), event) {
            (Some(InputEvent::Scroll { dx: ax, dy: ay }), InputEvent::Scroll { dx, dy }) => {
                self.continuous.insert(InputEvent::Scroll { dx: ax + dx, dy: ay + dy });
            }
            (_, event) => {
                self.continuous.insert(event);
            }
        }
    }

    //--- Discrete Event Handling -----------------------------------------

    /// Appends a button or text event. A button event equal to the
    /// previous one is dropped; typed characters are always kept.
    pub(crate) fn push_discrete(&mut self, event: InputEvent) {
        let is_text = matches!(event, InputEvent::CharInput(_));
        if is_text || self.discrete.last() != Some(&event) {
            self.discrete.push(event);
        }
    }

    //--- Drain ------------------------------------------------------------

    /// Takes this frame's events as `(discrete, continuous)`, or `None`
    /// when nothing was buffered.
    pub(crate) fn drain(&mut self) -> Option<(Vec<InputEvent>, Vec<InputEvent>)> {
        if self.is_empty() {
            return None;
        }
        let capacity = self.discrete.capacity();
        let discrete = std::mem::replace(&mut self.discrete, Vec::with_capacity(capacity));
        let continuous = self.continuous.drain().collect();
        Some((discrete, continuous))
    }

    //--- Utilities --------------------------------------------------------

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.discrete.len() + self.continuous.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.discrete.is_empty() && self.continuous.is_empty()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
