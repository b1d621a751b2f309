use std::path::PathBuf;

use thiserror::Error;

/// Error type for chdb operations
#[derive(Debug, Error)]
pub enum ChdbError {
    /// The native shared library could not be opened.
    #[error("Failed to load chdb library: {message}\nCheck if the library exists at: {}", .path.display())]
    LibraryLoad { path: PathBuf, message: String },

    /// The library opened but one or more entry points were missing.
    #[error("Symbol loading failed, missing functions: {}", .missing.join(", "))]
    SymbolResolution { missing: Vec<&'static str> },

    /// A native call failed: connect returned null, a query returned a nil
    /// result, or the engine reported an error message.
    #[error("{0}")]
    Native(String),

    /// A host-side value could not be encoded for the native call.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// An operation was invoked on a closed object or before initialization.
    #[error("{0}")]
    Usage(String),

    /// The session data directory does not exist and CREATE was not set.
    #[error("Directory {} required", .0.display())]
    DirectoryNotFound(PathBuf),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for chdb operations
pub type Result<T> = std::result::Result<T, ChdbError>;
