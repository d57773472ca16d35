//! Error types for content rendering and external program handoff

use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

/// Errors raised by the rendering and launch core
#[derive(Error, Debug)]
pub enum Error {
    /// A routing rule's glob pattern does not compile
    #[error("Invalid pattern `{pattern}` in rule `{name}`: {source}")]
    InvalidPattern {
        /// Rule name from the config file
        name: String,
        /// The offending pattern
        pattern: String,
        /// Underlying glob error
        #[source]
        source: glob::PatternError,
    },

    /// A configuration value is unusable
    #[error("Configuration error: {0}")]
    Config(String),

    /// The external program could not be started
    #[error("Failed to launch {program}: {source}")]
    Launch {
        /// Program that failed to start
        program: String,
        /// Underlying spawn error
        #[source]
        source: std::io::Error,
    },

    /// The external program ran but exited unsuccessfully
    #[error("{program} exited with {status}")]
    Exited {
        /// Program that failed
        program: String,
        /// Its exit status
        status: ExitStatus,
    },

    /// Leaving or re-entering the TUI failed
    #[error("Terminal error: {0}")]
    Terminal(#[source] std::io::Error),

    /// An attachment could not be fetched
    #[error("Download of {url} failed: {reason}")]
    Download {
        /// Attachment URL
        url: String,
        /// What went wrong
        reason: String,
    },

    /// A temporary file could not be persisted
    #[error("Could not keep temporary file {path}: {source}")]
    Persist {
        /// Path of the temp file
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Other I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether the error came from an external program rather than from us
    pub const fn is_launch_failure(&self) -> bool {
        matches!(self, Self::Launch { .. } | Self::Exited { .. })
    }
}

/// Result alias for the core
pub type Result<T> = std::result::Result<T, Error>;
