//! Run error types.

use sidelobe_gen::GeneratorError;
use sidelobe_harness::HarnessError;
use sidelobe_io::LinkError;
use sidelobe_types::ConstraintError;

/// Errors that end a run.
///
/// A control case that is not observed is not an error: it is recovered by
/// reset-and-retry and counted in [`crate::RunStats`].
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    /// The transmit interface failed.
    #[error(transparent)]
    Link(#[from] LinkError),

    /// The harness failed, including receive errors during its forced drain.
    #[error(transparent)]
    Harness(#[from] HarnessError),

    #[error(transparent)]
    Generator(#[from] GeneratorError),

    /// Constraints were rejected before any case was produced.
    #[error(transparent)]
    Constraint(#[from] ConstraintError),

    /// The interface declined to send a test case, so no verdict exists.
    #[error("interface did not transmit test case {case_index}")]
    TransmitRejected { case_index: usize },

    /// The opt-in control attempt cap was reached.
    #[error("control case not observed after {attempts} attempts")]
    ControlGateExhausted { attempts: u32 },
}

pub type Result<T> = std::result::Result<T, RunError>;
