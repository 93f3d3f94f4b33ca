//! # sidelobe-harness: Evidence harnesses
//!
//! A harness answers one question for the orchestrator: is the target still
//! behaving as expected? The over-the-air harness answers it from frames the
//! target sends back, collected by a background poller.
//!
//! # Concurrency
//!
//! ```text
//!   orchestrator thread               poller thread (every tick)
//!   ───────────────────               ──────────────────────────
//!   is_valid: acquire gate ──┐        try_acquire gate
//!             drain          │          └─ held? skip tick
//!             release        │        drain interface ──► EvidenceQueue
//!             scan queue ◄───┴────────────────────────────────┘
//!   reset:    acquire gate, cycle interface, release
//! ```
//!
//! The [`AccessGate`] guarantees that no two operations touch the interface
//! at once. The [`EvidenceQueue`] is bounded and drops the oldest frame on
//! overflow.

mod error;
mod evidence;
mod gate;
mod matching;
mod poller;
mod received_frame;
mod registry;

use sidelobe_types::{Case, Verdict};

pub use error::HarnessError;
pub use evidence::EvidenceQueue;
pub use gate::{AccessGate, GateGuard};
pub use matching::MatchMode;
pub use received_frame::{HarnessSettings, ReceivedFrameHarness};
pub use registry::{create, names};

/// Judges target health against the case last sent.
///
/// `Closed -> Open -> Closed`. Harnesses are driven from a single thread;
/// any background activity is owned and joined by the harness itself.
pub trait Harness: Send {
    /// Registry name.
    fn name(&self) -> &'static str;

    fn open(&mut self) -> Result<(), HarnessError>;

    /// Stops all background activity before returning.
    fn close(&mut self) -> Result<(), HarnessError>;

    fn is_open(&self) -> bool;

    /// Replaces the expectation. Queued evidence is kept.
    fn set_expected(&mut self, case: &Case);

    fn is_valid(&mut self) -> Result<Verdict, HarnessError>;

    /// Positive evidence of failure. Harnesses with independent failure
    /// signals need not return the negation of [`Harness::is_valid`].
    fn is_invalid(&mut self) -> Result<Verdict, HarnessError>;

    fn supports_reset(&self) -> bool {
        false
    }

    /// Drives the target back to a known-good state.
    ///
    /// Check [`Harness::supports_reset`] first.
    fn reset(&mut self) -> Result<bool, HarnessError> {
        Err(HarnessError::Unsupported {
            harness: self.name(),
            operation: "reset",
        })
    }

    /// Evidence discarded on overflow since the harness was built.
    fn dropped_evidence(&self) -> u64 {
        0
    }
}
