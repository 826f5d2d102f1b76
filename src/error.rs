// CLASSIFICATION: COMMUNITY
// Filename: error.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-14

use std::io;
use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

use crate::diagnostic::CompilationError;

/// Errors surfaced by a compiler session.
#[derive(Debug, Error)]
pub enum CompilerError {
    /// Persisting a source unit to disk failed; the unit was not added.
    #[error("failed to write source unit {}: {source}", .path.display())]
    Io {
        /// Resolved path the unit was written to.
        path: PathBuf,
        /// Underlying filesystem error.
        #[source]
        source: io::Error,
    },
    /// The toolchain reported build-blocking diagnostics.
    #[error(transparent)]
    Compilation(#[from] CompilationError),
    /// No executable could be resolved for the requested tool.
    #[error("compiler `{tool}` not found")]
    ToolNotFound {
        /// Tool name that was looked up.
        tool: String,
    },
    /// The configured backend name is not recognised.
    #[error("unknown backend {0}")]
    UnknownBackend(String),
    /// The compiler process could not be started.
    #[error("failed to spawn {tool}: {source}")]
    Spawn {
        /// Tool that failed to start.
        tool: String,
        /// Underlying spawn error.
        #[source]
        source: io::Error,
    },
    /// The compiler exited unsuccessfully without reporting an error diagnostic.
    #[error("{tool} exited with {status}: {stderr}")]
    ToolFailed {
        /// Tool that failed.
        tool: String,
        /// Exit status of the process.
        status: ExitStatus,
        /// Tail of the captured standard error.
        stderr: String,
    },
    /// An extra compiler argument would change the output kind or location.
    #[error("compiler argument {0} is not allowed")]
    RejectedArgument(String),
    /// Scratch space for the toolchain could not be prepared or read back.
    #[error("scratch directory: {0}")]
    Scratch(#[source] io::Error),
    /// The emitted image could not be mapped into the process.
    #[error("failed to load module {module}: {message}")]
    Load {
        /// Generated module name.
        module: String,
        /// Loader failure description.
        message: String,
    },
    /// Options could not be read or parsed.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl CompilerError {
    /// Diagnostics carried by a compilation failure, empty for any other error.
    pub fn diagnostics(&self) -> &[crate::diagnostic::Diagnostic] {
        match self {
            CompilerError::Compilation(err) => err.diagnostics(),
            _ => &[],
        }
    }
}

/// Result alias used across the crate.
pub type Result<T, E = CompilerError> = std::result::Result<T, E>;
