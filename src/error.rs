//! Error types shared by the dispatch core and the process layer.

use std::path::PathBuf;

/// Convenience alias used throughout the library.
pub type Result<T> = std::result::Result<T, DeskError>;

#[derive(Debug, thiserror::Error)]
pub enum DeskError {
    /// The user submitted a blank search.
    #[error("Please enter a search query.")]
    EmptyQuery,

    /// No actionable menu entry was selected.
    #[error("Please select a valid action.")]
    NoActionSelected,

    /// A checker was asked to run a file type it has no command for.
    #[error("Unsupported file type. Only .java and .py are supported.")]
    UnsupportedFileType,

    /// Spawning an external program failed.
    #[error("failed to launch '{program}': {source}")]
    ProcessLaunch {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// Reading a child's output failed part way through.
    #[error("failed to read output of '{program}': {source}")]
    ProcessOutput {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// A command line had nothing to run.
    #[error("empty command line")]
    EmptyCommand,

    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {path}: {message}")]
    Config { path: PathBuf, message: String },
}

impl DeskError {
    /// Whether the error is a user-facing validation warning rather than a
    /// failure of the system.
    pub fn is_warning(&self) -> bool {
        matches!(self, Self::EmptyQuery | Self::NoActionSelected)
    }

    pub(crate) fn launch(program: impl Into<String>, source: std::io::Error) -> Self {
        Self::ProcessLaunch {
            program: program.into(),
            source,
        }
    }
}
