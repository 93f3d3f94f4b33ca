//! Generator error types.

use sidelobe_codec::{DecodeError, OversizedFrame};
use sidelobe_types::ConstraintError;

/// Errors raised while producing a case.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GeneratorError {
    /// Invalid or missing constraint.
    #[error(transparent)]
    Constraint(#[from] ConstraintError),

    /// Every regenerated candidate was rejected by the codec.
    #[error("no decodable frame after {attempts} attempts (last: {last})")]
    RetriesExhausted { attempts: u32, last: DecodeError },

    /// The encoded frame does not fit in a PHY packet.
    #[error(transparent)]
    Oversized(#[from] OversizedFrame),

    /// `produce` was handed a variant its plan does not cover.
    #[error("variant {variant} is outside the plan of generator '{generator}'")]
    VariantOutOfPlan { generator: &'static str, variant: i64 },

    /// The control constraints resolved to no variant at all.
    #[error("generator '{generator}' has no control variant")]
    NoControlVariant { generator: &'static str },

    /// No generator is registered under this name.
    #[error("unknown generator '{name}'")]
    Unknown { name: String },
}
