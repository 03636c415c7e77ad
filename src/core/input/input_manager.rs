//=========================================================================
// Input Manager
//=========================================================================
//
// Resolves device transitions to at most one binding invocation and
// drives hold-down callbacks once per tick.
//
// Architecture:
// ```text
//   InputEvent ──handle_event()──┬─ Button ──> on_device_event()
//                                │               ├─ release of held code → stop holding
//                                │               └─ live[code] matches → invoke
//                                │                    (Hold: also insert into held)
//                                ├─ CharInput / Scroll ──> InputEventHandler
//                                └─ CursorMoved ──> cursor state ──> handler (normalised)
//
//   per tick: poll_held() ──> every held callback, insertion order
// ```
//
// Per-code state:
// ```text
//   UNBOUND ──bind──> BOUND(trigger) ──press (Hold)──> HOLDING
//      ↑                 │     ↑                          │
//      └──unbind(_all)───┘     └────────release───────────┘
// ```
//
// The named-callback registry is shared with every other manager built
// from the same engine context. Defaults are a separate list layered onto
// the live table by `reset_to_defaults()`.
//
//=========================================================================

//=== Standard Library Imports ============================================

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

//=== External Crates =====================================================

use indexmap::IndexMap;
use log::{debug, info, trace, warn};

//=== Internal Dependencies ===============================================

use super::binding::{KeyBinding, Trigger};
use super::bindings_file::{self, BindingRecord};
use super::error::{BindingsError, InputError};
use super::event::{InputCode, InputEvent, KeyState, Modifiers};
use super::handler::InputEventHandler;
use super::registry::{Callback, CallbackRegistry};
use crate::core::commands::ENGINE_DEFAULT_BINDINGS;
use crate::core::guard::run_guarded;
use crate::core::platform_bridge::PlatformControl;

//=== BindingsSource ======================================================

/// Where the live bindings came from after [`InputManager::load_bindings`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingsSource {
    /// Entries were read from the bindings file.
    File { applied: usize, skipped: usize },

    /// The file was missing, empty, unreadable or had no usable entry.
    Defaults,
}

//=== CursorState =========================================================

#[derive(Debug, Clone, Copy)]
struct CursorState {
    x: f64,
    y: f64,
    width: u32,
    height: u32,
}

impl CursorState {
    /// Normalised device coordinates, `+y` up. `(0, 0)` for an empty
    /// viewport.
    fn normalized(&self) -> (f32, f32) {
        if self.width == 0 || self.height == 0 {
            return (0.0, 0.0);
        }
        let x = 2.0 * self.x / f64::from(self.width) - 1.0;
        let y = -(2.0 * self.y / f64::from(self.height) - 1.0);
        (x as f32, y as f32)
    }
}

//=== InputManager ========================================================

/// Live binding table, hold-down set and input persistence.
///
/// # Examples
///
/// ```
/// use kindle_engine::core::input::{CallbackRegistry, InputManager, KeyCode, KeyState, Modifiers, Trigger};
/// use kindle_engine::core::PlatformControl;
///
/// let mut input = InputManager::new(CallbackRegistry::new(), PlatformControl::default(), "etc/keys.dat");
/// input.bind(KeyCode::Space, Trigger::Press, Modifiers::NONE, || println!("jump"));
///
/// assert!(input.on_device_event(KeyCode::Space, KeyState::Pressed, Modifiers::NONE));
/// ```
pub struct InputManager {
    live: IndexMap<InputCode, KeyBinding>,
    held: IndexMap<InputCode, Callback>,
    defaults: Vec<KeyBinding>,
    registry: CallbackRegistry,
    control: PlatformControl,
    cursor: CursorState,
    handler: Option<Box<dyn InputEventHandler>>,
    bindings_path: PathBuf,
    closed: bool,
}

impl InputManager {
    //--- Construction -----------------------------------------------------

    pub fn new(
        registry: CallbackRegistry,
        control: PlatformControl,
        bindings_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            live: IndexMap::new(),
            held: IndexMap::new(),
            defaults: Vec::new(),
            registry,
            control,
            cursor: CursorState { x: 0.0, y: 0.0, width: 0, height: 0 },
            handler: None,
            bindings_path: bindings_path.into(),
            closed: false,
        }
    }

    //--- Binding ----------------------------------------------------------

    /// Binds `callback` to `code`, replacing any existing binding.
    ///
    /// With [`Trigger::Hold`] the callback fires on press and then once per
    /// tick until the code is released.
    pub fn bind<F>(&mut self, code: impl Into<InputCode>, trigger: Trigger, modifiers: Modifiers, callback: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.install(KeyBinding::new(code, trigger, modifiers, Arc::new(callback)));
    }

    /// Binds the registry callback `name` to `code`.
    ///
    /// The name is resolved now; re-registering it later does not affect
    /// this binding.
    ///
    /// # Errors
    ///
    /// [`InputError::UnknownCallback`] if `name` is not registered. No
    /// binding is created.
    pub fn bind_named(
        &mut self,
        code: impl Into<InputCode>,
        trigger: Trigger,
        modifiers: Modifiers,
        name: &str,
    ) -> Result<(), InputError> {
        let binding = self.named_binding(code.into(), trigger, modifiers, name)?;
        self.install(binding);
        Ok(())
    }

    /// Inserts a prepared binding, returning the one it replaced.
    pub fn install(&mut self, binding: KeyBinding) -> Option<KeyBinding> {
        let code = binding.code();
        self.held.shift_remove(&code);
        trace!(target: "input", "Bound {} ({})", code, binding.trigger());
        self.live.insert(code, binding)
    }

    /// Removes the binding for `code` and stops holding it.
    pub fn unbind(&mut self, code: impl Into<InputCode>) -> Option<KeyBinding> {
        let code = code.into();
        self.held.shift_remove(&code);
        self.live.shift_remove(&code)
    }

    /// Clears every live binding and held code. The registry and the
    /// default list are kept.
    pub fn unbind_all(&mut self) {
        self.live.clear();
        self.held.clear();
        debug!(target: "input", "All bindings cleared");
    }

    fn named_binding(
        &self,
        code: InputCode,
        trigger: Trigger,
        modifiers: Modifiers,
        name: &str,
    ) -> Result<KeyBinding, InputError> {
        let callback = self
            .registry
            .get(name)
            .ok_or_else(|| InputError::UnknownCallback(name.trim().to_lowercase()))?;
        Ok(KeyBinding::named(code, trigger, modifiers, name, callback))
    }

    //--- Defaults ---------------------------------------------------------

    /// Adds a default binding. A default already present for the same code
    /// is replaced.
    pub fn add_default_binding<F>(
        &mut self,
        code: impl Into<InputCode>,
        trigger: Trigger,
        modifiers: Modifiers,
        callback: F,
    ) where
        F: Fn() + Send + Sync + 'static,
    {
        self.push_default(KeyBinding::new(code, trigger, modifiers, Arc::new(callback)));
    }

    /// Adds a default binding to the registry callback `name`.
    pub fn add_default_named_binding(
        &mut self,
        code: impl Into<InputCode>,
        trigger: Trigger,
        modifiers: Modifiers,
        name: &str,
    ) -> Result<(), InputError> {
        let binding = self.named_binding(code.into(), trigger, modifiers, name)?;
        self.push_default(binding);
        Ok(())
    }

    /// Adds the engine's built-in key map (stop, cursor toggle, binding
    /// reset/save) to the defaults. Entries whose callback is not
    /// registered are skipped.
    pub fn add_engine_default_bindings(&mut self) {
        for (key, modifiers, command) in ENGINE_DEFAULT_BINDINGS {
            if let Err(e) = self.add_default_named_binding(key, Trigger::Press, modifiers, command.callback_id()) {
                warn!(target: "input", "Skipping engine default for {:?}: {}", key, e);
            }
        }
    }

    fn push_default(&mut self, binding: KeyBinding) {
        match self.defaults.iter_mut().find(|d| d.code() == binding.code()) {
            Some(slot) => *slot = binding,
            None => self.defaults.push(binding),
        }
    }

    /// Copies every default into the live table.
    ///
    /// Additive: live bindings on other codes survive. Use
    /// [`reset_bindings`](Self::reset_bindings) for an exact reset.
    pub fn reset_to_defaults(&mut self) {
        let defaults = self.defaults.clone();
        for binding in defaults {
            self.install(binding);
        }
        debug!(target: "input", "Applied {} default bindings", self.defaults.len());
    }

    /// [`unbind_all`](Self::unbind_all) followed by
    /// [`reset_to_defaults`](Self::reset_to_defaults).
    pub fn reset_bindings(&mut self) {
        self.unbind_all();
        self.reset_to_defaults();
    }

    //--- Dispatch ---------------------------------------------------------

    /// Handles one button transition. Returns `true` if a callback ran.
    ///
    /// A release of a held code only ends the hold. Otherwise the bound
    /// callback runs when the transition matches the binding's phase and
    /// modifier mask.
    pub fn on_device_event(
        &mut self,
        code: impl Into<InputCode>,
        state: KeyState,
        modifiers: Modifiers,
    ) -> bool {
        if self.closed {
            return false;
        }
        let code = code.into();

        if state == KeyState::Released && self.held.shift_remove(&code).is_some() {
            trace!(target: "input", "Released held {}", code);
            return false;
        }

        let Some(binding) = self.live.get(&code) else {
            return false;
        };
        if !binding.matches(state, modifiers) {
            return false;
        }

        let callback = Arc::clone(binding.callback());
        if binding.trigger() == Trigger::Hold {
            self.held.insert(code, Arc::clone(&callback));
        }

        run_guarded("input", code, || callback());
        true
    }

    /// Invokes every held callback once, in the order the codes were
    /// pressed. Returns the number invoked.
    pub fn poll_held(&mut self) -> usize {
        if self.held.is_empty() {
            return 0;
        }

        let held: Vec<(InputCode, Callback)> = self
            .held
            .iter()
            .map(|(code, callback)| (*code, Arc::clone(callback)))
            .collect();

        for (code, callback) in &held {
            run_guarded("input", code, || callback());
        }
        held.len()
    }

    /// Routes a platform event to the dispatcher or the event handler.
    pub fn handle_event(&mut self, event: &InputEvent) {
        match *event {
            InputEvent::Button { code, state, modifiers } => {
                self.on_device_event(code, state, modifiers);
            }
            InputEvent::CharInput(c) => {
                if let Some(handler) = self.handler.as_mut() {
                    handler.on_char_input(c);
                }
            }
            InputEvent::CursorMoved { x, y } => {
                self.cursor.x = x;
                self.cursor.y = y;
                let (nx, ny) = self.cursor.normalized();
                if let Some(handler) = self.handler.as_mut() {
                    handler.on_cursor_move(nx, ny);
                }
            }
            InputEvent::Scroll { dx, dy } => {
                if let Some(handler) = self.handler.as_mut() {
                    handler.on_scroll(dx, dy);
                }
            }
            InputEvent::Unidentified => {}
        }
    }

    pub fn set_event_handler(&mut self, handler: Box<dyn InputEventHandler>) {
        self.handler = Some(handler);
    }

    pub fn clear_event_handler(&mut self) -> Option<Box<dyn InputEventHandler>> {
        self.handler.take()
    }

    //--- Named Callbacks --------------------------------------------------

    pub fn add_named_callback<F>(&self, id: &str, callback: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.registry.register(id, callback);
    }

    pub fn named_callback(&self, id: &str) -> Option<Callback> {
        self.registry.get(id)
    }

    pub fn registry(&self) -> &CallbackRegistry {
        &self.registry
    }

    //--- Queries ----------------------------------------------------------

    pub fn is_bound(&self, code: impl Into<InputCode>) -> bool {
        self.live.contains_key(&code.into())
    }

    pub fn is_holding(&self, code: impl Into<InputCode>) -> bool {
        self.held.contains_key(&code.into())
    }

    pub fn binding(&self, code: impl Into<InputCode>) -> Option<&KeyBinding> {
        self.live.get(&code.into())
    }

    /// Live bindings in binding order.
    pub fn bindings(&self) -> impl Iterator<Item = &KeyBinding> {
        self.live.values()
    }

    pub fn held_count(&self) -> usize {
        self.held.len()
    }

    pub fn default_bindings(&self) -> &[KeyBinding] {
        &self.defaults
    }

    //--- Cursor -----------------------------------------------------------

    /// Cursor position in normalised device coordinates: `[-1, 1]` on both
    /// axes, `(-1, 1)` at the top-left corner.
    pub fn cursor_position(&self) -> (f32, f32) {
        self.cursor.normalized()
    }

    /// Cursor position in window pixels.
    pub fn raw_cursor_position(&self) -> (f64, f64) {
        (self.cursor.x, self.cursor.y)
    }

    pub fn set_viewport(&mut self, width: u32, height: u32) {
        self.cursor.width = width;
        self.cursor.height = height;
    }

    pub fn viewport(&self) -> (u32, u32) {
        (self.cursor.width, self.cursor.height)
    }

    /// `false` hides and grabs the cursor; applied by the platform on its
    /// next frame.
    pub fn set_cursor_enabled(&mut self, enabled: bool) {
        self.control.set_cursor_enabled(enabled);
    }

    pub fn is_cursor_enabled(&self) -> bool {
        self.control.cursor_enabled()
    }

    pub fn toggle_cursor(&mut self) {
        let enabled = !self.is_cursor_enabled();
        self.set_cursor_enabled(enabled);
        debug!(target: "input", "Cursor {}", if enabled { "released" } else { "captured" });
    }

    //--- Persistence ------------------------------------------------------

    pub fn bindings_path(&self) -> &Path {
        &self.bindings_path
    }

    pub fn set_bindings_path(&mut self, path: impl Into<PathBuf>) {
        self.bindings_path = path.into();
    }

    /// Writes every named live binding to the bindings file. Bindings
    /// holding a plain closure are not written. Returns the count written.
    pub fn save_bindings(&self) -> Result<usize, BindingsError> {
        let records: Vec<BindingRecord> = self
            .live
            .values()
            .filter_map(BindingRecord::from_binding)
            .collect();

        bindings_file::write_atomic(&self.bindings_path, &bindings_file::render(&records)).map_err(
            |source| BindingsError::Write {
                path: self.bindings_path.clone(),
                source,
            },
        )?;

        debug!(target: "input", "Wrote {} bindings to {}", records.len(), self.bindings_path.display());
        Ok(records.len())
    }

    /// Loads bindings from the bindings file, falling back to the defaults.
    ///
    /// - missing file: defaults are applied and written out
    /// - empty or unreadable file: defaults
    /// - bad lines and unknown callback ids: skipped with a warning
    /// - no usable line at all: defaults
    pub fn load_bindings(&mut self) -> BindingsSource {
        let text = match fs::read_to_string(&self.bindings_path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                info!(
                    target: "input",
                    "No bindings file at {}, creating one from defaults",
                    self.bindings_path.display()
                );
                self.reset_to_defaults();
                if let Err(e) = self.save_bindings() {
                    warn!(target: "input", "{}", e);
                }
                return BindingsSource::Defaults;
            }
            Err(source) => {
                let e = BindingsError::Read { path: self.bindings_path.clone(), source };
                warn!(target: "input", "{}; using defaults", e);
                self.reset_to_defaults();
                return BindingsSource::Defaults;
            }
        };

        if text.trim().is_empty() {
            debug!(target: "input", "Bindings file is empty, using defaults");
            self.reset_to_defaults();
            return BindingsSource::Defaults;
        }

        let (records, errors) = bindings_file::parse(&text);
        let mut skipped = errors.len();
        for e in &errors {
            warn!(target: "input", "Skipping bindings entry, {}", e);
        }

        let mut applied = 0;
        for record in records {
            match self.bind_named(record.code, record.trigger, record.modifiers, &record.name) {
                Ok(()) => applied += 1,
                Err(e) => {
                    warn!(target: "input", "Skipping binding for {}: {}", record.code, e);
                    skipped += 1;
                }
            }
        }

        if applied == 0 {
            let e = BindingsError::Corrupt { path: self.bindings_path.clone() };
            warn!(target: "input", "{}; using defaults", e);
            self.reset_to_defaults();
            return BindingsSource::Defaults;
        }

        info!(target: "input", "Loaded {} bindings ({} skipped)", applied, skipped);
        BindingsSource::File { applied, skipped }
    }

    //--- Shutdown ---------------------------------------------------------

    /// Releases the device side: held inputs are dropped, the event handler
    /// is detached and further device events are ignored. Idempotent.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        self.held.clear();
        self.handler = None;
        debug!(target: "input", "Input manager closed");
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl Drop for InputManager {
    fn drop(&mut self) {
        self.close();
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
