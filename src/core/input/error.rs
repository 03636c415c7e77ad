//=========================================================================
// Input Errors
//=========================================================================

use std::io;
use std::path::PathBuf;

use thiserror::Error;

//=== InputError ==========================================================

/// Caller-facing failures of binding operations.
///
/// A failed call leaves the manager untouched.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("no named callback registered as '{0}'")]
    UnknownCallback(String),

    #[error(transparent)]
    Bindings(#[from] BindingsError),
}

//=== BindingsError =======================================================

/// Failures of the persisted bindings file.
#[derive(Debug, Error)]
pub enum BindingsError {
    #[error("failed to read bindings file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write bindings file {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("line {line}: {reason}")]
    Parse { line: usize, reason: String },

    #[error("bindings file {} has no usable entry", .path.display())]
    Corrupt { path: PathBuf },
}
