//! # sidelobe
//!
//! Over-the-air fuzzing orchestration for IEEE 802.15.4 stacks.
//!
//! A run alternates control cases, which must be observed for the
//! observation channel to count as healthy, with test cases, whose
//! observation is the verdict being measured:
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                         Alternator                         │
//! │  ┌───────────┐    ┌───────────────┐    ┌────────────────┐  │
//! │  │ Generator │ →  │  Transceiver  │ ~> │    Harness     │  │
//! │  │ (cases)   │    │  (transmit)   │    │ (evidence,     │  │
//! │  └───────────┘    └───────────────┘    │  reset)        │  │
//! │                                        └────────────────┘  │
//! └────────────────────────────────────────────────────────────┘
//!                            │
//!                            ▼
//!                        ResultSet
//! ```
//!
//! # Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use sidelobe::{Alternator, AlternatorConfig, ConstraintSet};
//!
//! let link: Arc<dyn sidelobe::Transceiver> = Arc::new(sidelobe::LoopbackTransceiver::new());
//! let generator = sidelobe::generators::create("preamble-fill", &Default::default())?;
//! let harness = sidelobe::harness::create("received-frame", link.clone(), &Default::default())?;
//!
//! let mut alternator = Alternator::new(generator, harness, link, AlternatorConfig::plain())
//!     .with_constraints(ConstraintSet::new().with("max_fill", 3i64));
//! let results = alternator.run(5)?;
//! println!("{}", results.to_json_pretty()?);
//! ```

mod alternator;
mod error;
mod result;
pub mod summary;

pub use alternator::{Alternator, AlternatorConfig, AlternatorMode};
pub use error::{Result, RunError};
pub use result::{
    GeneratorInfo, HarnessInfo, RAW_CONTROL_CASE, RAW_TEST_CASE, ResultSet, RunStats, TestResult,
};

// Component crates, for registry access and concrete implementations.
pub use sidelobe_codec as codec;
pub use sidelobe_gen as generators;
pub use sidelobe_harness as harness;
pub use sidelobe_io as io;

pub use sidelobe_gen::{CaseGenerator, GeneratorError, GeneratorOptions};
pub use sidelobe_harness::{Harness, HarnessError, HarnessSettings, MatchMode};
pub use sidelobe_io::{InterfaceOptions, InterfaceStatus, LinkError, LoopbackTransceiver, Transceiver};
pub use sidelobe_types::{
    Case, CaseKind, Channel, ConstraintError, ConstraintSet, ConstraintValue, SequenceNumber,
    Verdict,
};
