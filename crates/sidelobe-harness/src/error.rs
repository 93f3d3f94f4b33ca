//! Harness error types.

use sidelobe_io::LinkError;

/// Errors from an evidence harness.
#[derive(Debug, thiserror::Error)]
pub enum HarnessError {
    /// The interface failed during a synchronous operation.
    #[error(transparent)]
    Link(#[from] LinkError),

    /// `is_valid` was called before any expectation was set.
    #[error("no expected frame set")]
    NoExpectation,

    /// The harness does not implement an operation.
    #[error("harness {harness} does not support {operation}")]
    Unsupported {
        harness: &'static str,
        operation: &'static str,
    },

    /// The interface cannot receive frames.
    #[error("interface {interface} does not support receive")]
    ReceiveUnsupported { interface: &'static str },

    /// No harness is registered under this name.
    #[error("unknown harness: {name}")]
    Unknown { name: String },

    #[error("failed to spawn poller thread: {source}")]
    Spawn { source: std::io::Error },
}
