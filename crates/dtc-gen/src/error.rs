//! Error types for assembly generation.

use std::process::ExitStatus;
use thiserror::Error;

/// Error type for the emitter and the external assemble/link step.
#[derive(Debug, Error)]
pub enum EmitError {
    /// No zero-parameter function named `main` to wire `_start` to.
    #[error("no zero-parameter 'main' function found")]
    MissingMain,

    /// A construct the thin emitter does not lower.
    #[error("unsupported construct in code generation: {0}")]
    Unsupported(String),

    /// An identifier with no stack slot in the current frame.
    #[error("unknown variable '{0}'")]
    UnknownVariable(String),

    /// Internal error - indicates a bug, not a user mistake.
    #[error("internal error: {0}")]
    Internal(String),

    /// Writing the assembly file or spawning a tool failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// An external tool ran but reported failure.
    #[error("{tool} failed with {status}")]
    ToolFailed { tool: String, status: ExitStatus },
}

/// Result type alias for code generation operations.
pub type Result<T> = std::result::Result<T, EmitError>;
