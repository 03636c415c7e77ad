//=========================================================================
// Named Callback Registry
//=========================================================================
//
// String-keyed table of reusable callbacks. Bindings that reference a
// callback by name are the only ones that can be written to disk.
//
// One registry is created per engine context and cloned into every
// InputManager built from it, so all managers see the same names.
// Ids are normalised (trimmed, lowercased); the last registration for a
// given id wins.
//
//=========================================================================

//=== Standard Library Imports ============================================

use std::fmt;
use std::sync::Arc;

//=== External Crates =====================================================

use indexmap::IndexMap;
use log::{debug, warn};
use parking_lot::RwLock;

//=== Callback ============================================================

/// Zero-argument action invoked by bindings and engine built-ins.
pub type Callback = Arc<dyn Fn() + Send + Sync>;

/// Normalises a callback id for lookup and storage.
pub(crate) fn normalize_id(id: &str) -> String {
    id.trim().to_lowercase()
}

//=== CallbackRegistry ====================================================

/// Shared handle to the named-callback table.
///
/// Cloning is cheap and yields a handle to the SAME table.
#[derive(Clone, Default)]
pub struct CallbackRegistry {
    entries: Arc<RwLock<IndexMap<String, Callback>>>,
}

impl CallbackRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    //--- Registration -----------------------------------------------------

    /// Registers `callback` under `id`, replacing any previous entry.
    ///
    /// Blank ids and ids containing control characters (newlines, tabs)
    /// are rejected with a warning, since neither survives a save.
    pub fn register<F>(&self, id: &str, callback: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.register_arc(id, Arc::new(callback));
    }

    pub fn register_arc(&self, id: &str, callback: Callback) {
        let key = normalize_id(id);
        if key.is_empty() {
            warn!(target: "input", "Ignoring named callback with blank id");
            return;
        }
        if key.chars().any(char::is_control) {
            warn!(target: "input", "Ignoring named callback {:?}: id contains control characters", key);
            return;
        }

        if self.entries.write().insert(key.clone(), callback).is_some() {
            debug!(target: "input", "Named callback '{}' replaced", key);
        }
    }

    pub fn remove(&self, id: &str) -> Option<Callback> {
        self.entries.write().shift_remove(&normalize_id(id))
    }

    //--- Queries ----------------------------------------------------------

    pub fn get(&self, id: &str) -> Option<Callback> {
        self.entries.read().get(&normalize_id(id)).cloned()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.read().contains_key(&normalize_id(id))
    }

    /// Registered ids in registration order.
    pub fn names(&self) -> Vec<String> {
        self.entries.read().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl fmt::Debug for CallbackRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallbackRegistry")
            .field("names", &self.names())
            .finish()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn ids_are_trimmed_and_lowercased() {
        let registry = CallbackRegistry::new();
        registry.register("  Jump ", || {});

        assert!(registry.contains("jump"));
        assert!(registry.contains("JUMP"));
        assert_eq!(registry.names(), vec!["jump".to_string()]);
    }

    #[test]
    fn last_registration_wins() {
        let registry = CallbackRegistry::new();
        let hits = Arc::new(AtomicUsize::new(0));

        registry.register("fire", || {});
        let h = hits.clone();
        registry.register("FIRE", move || {
            h.fetch_add(10, Ordering::SeqCst);
        });

        assert_eq!(registry.len(), 1);
        (registry.get("fire").unwrap())();
        assert_eq!(hits.load(Ordering::SeqCst), 10);
    }

    #[test]
    fn blank_id_is_rejected() {
        let registry = CallbackRegistry::new();
        registry.register("   ", || {});
        assert!(registry.is_empty());
    }

    #[test]
    fn control_characters_in_id_are_rejected() {
        let registry = CallbackRegistry::new();
        registry.register("open\nmenu", || {});
        registry.register("open\tmenu", || {});
        registry.register("open menu", || {});

        assert_eq!(registry.names(), vec!["open menu".to_string()]);
    }

    #[test]
    fn clones_share_the_same_table() {
        let a = CallbackRegistry::new();
        let b = a.clone();

        a.register("stop", || {});
        assert!(b.contains("stop"));

        b.remove("stop");
        assert!(!a.contains("stop"));
    }

    #[test]
    fn missing_id_returns_none() {
        let registry = CallbackRegistry::new();
        assert!(registry.get("nothing").is_none());
    }
}
