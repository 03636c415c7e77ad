//=========================================================================
// Game Entry
//=========================================================================
//
// The game plugs into the engine through the `Game` trait. Several games
// can be compiled into one binary and registered by name in an
// `EntryRegistry`; an init file or a config value picks which one runs.
//
// Lifecycle (driven by the orchestrator on the logic thread):
// ```text
//   on_open ──> [ on_tick ─> render ]* ──> on_close
// ```
//
//=========================================================================

//=== Standard Library Imports ============================================

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

//=== External Crates =====================================================

use indexmap::IndexMap;
use log::info;
use thiserror::Error;

//=== Internal Dependencies ===============================================

use super::context::EngineContext;

//=== Game ================================================================

/// Game-side hooks called by the engine.
pub trait Game: Send {
    /// Called once after bindings are loaded, before the first tick.
    fn on_open(&mut self, _ctx: &mut EngineContext) {}

    /// Called every tick after the scheduler has advanced.
    fn on_tick(&mut self, _ctx: &mut EngineContext) {}

    /// Called once per tick after input and engine commands are handled.
    fn render(&mut self, ctx: &mut EngineContext);

    /// Called once on shutdown, before bindings are saved.
    fn on_close(&mut self, _ctx: &mut EngineContext) {}
}

/// Placeholder game used when none is attached.
pub(crate) struct IdleGame;

impl Game for IdleGame {
    fn render(&mut self, _ctx: &mut EngineContext) {}
}

//=== EntryError ==========================================================

#[derive(Debug, Error)]
pub enum EntryError {
    #[error("no game entry named '{0}'")]
    Unknown(String),

    #[error("failed to read init file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("init file {} does not name an entry", .path.display())]
    EmptyInitFile { path: PathBuf },
}

//=== EntryRegistry =======================================================

type GameFactory = Box<dyn Fn() -> Box<dyn Game> + Send + Sync>;

/// Named game factories.
#[derive(Default)]
pub struct EntryRegistry {
    entries: IndexMap<String, GameFactory>,
}

impl EntryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `factory` under `name` (trimmed, case-insensitive).
    /// A later registration with the same name replaces the earlier one.
    pub fn register<F, G>(&mut self, name: &str, factory: F) -> &mut Self
    where
        F: Fn() -> G + Send + Sync + 'static,
        G: Game + 'static,
    {
        self.entries.insert(
            name.trim().to_lowercase(),
            Box::new(move || Box::new(factory()) as Box<dyn Game>),
        );
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(&name.trim().to_lowercase())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Instantiates the entry called `name`.
    pub fn resolve(&self, name: &str) -> Result<Box<dyn Game>, EntryError> {
        let key = name.trim().to_lowercase();
        let factory = self.entries.get(&key).ok_or(EntryError::Unknown(key.clone()))?;
        info!(target: "engine", "Starting game entry '{}'", key);
        Ok(factory())
    }

    /// Instantiates the entry named by the first non-blank line of the init
    /// file at `path`.
    pub fn resolve_from_file(&self, path: impl AsRef<Path>) -> Result<Box<dyn Game>, EntryError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| EntryError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let name = text
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .ok_or_else(|| EntryError::EmptyInitFile { path: path.to_path_buf() })?;

        self.resolve(name)
    }
}

impl fmt::Debug for EntryRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.entries.keys()).finish()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
