//! # sidelobe-gen: Case generators
//!
//! A generator produces ordered, reproducible sequences of control cases and
//! test cases under a [`ConstraintSet`]. Every emitted case (control or test)
//! consumes exactly one MAC sequence number from the generator's counter.
//!
//! Production is split in two so constraint errors surface before anything
//! is produced:
//!
//! 1. [`CaseGenerator::plan`] merges the per-call constraints over the
//!    generator defaults, validates them, and derives the parameter range.
//! 2. [`TestCases::next_case`] produces one case at a time from that plan.
//!
//! Generators are not thread-safe; the caller serializes all access.
//!
//! | Name | Layers | Varies |
//! |------|--------|--------|
//! | `preamble-fill` | PHY + MAC | trailing preamble nibbles forced to a fill pattern |
//! | `preamble-length` | PHY + MAC | number of zero preamble nibbles |
//! | `random-payload` | MAC | data frame payload length and content |

mod error;
pub mod nibble;
mod plan;
mod preamble_fill;
mod preamble_length;
mod random_payload;
mod registry;

use sidelobe_types::{
    Case, CaseKind, ConstraintError, ConstraintSet, ConstraintValue, SequenceCounter,
    SequenceNumber,
};

pub use error::GeneratorError;
pub use plan::{CasePlan, TestCases, collect_cases};
pub use preamble_fill::PreambleFill;
pub use preamble_length::PreambleLength;
pub use random_payload::RandomPayload;
pub use registry::{GeneratorOptions, create, names};

/// State every generator carries: defaults, sequencing, and addressing.
#[derive(Debug, Clone)]
pub struct GeneratorState {
    defaults: ConstraintSet,
    sequence: SequenceCounter,
    target_pan: u16,
    target_addr: u16,
    source_addr: u16,
}

impl GeneratorState {
    pub fn new(defaults: ConstraintSet) -> Self {
        Self {
            defaults,
            ..Self::default()
        }
    }

    /// Consumes the next sequence number.
    pub fn next_sequence(&mut self) -> SequenceNumber {
        self.sequence.advance()
    }

    /// The next sequence number, without consuming it.
    pub fn peek_sequence(&self) -> SequenceNumber {
        self.sequence.peek()
    }

    pub fn defaults(&self) -> &ConstraintSet {
        &self.defaults
    }

    pub fn target_pan(&self) -> u16 {
        self.target_pan
    }

    pub fn target_addr(&self) -> u16 {
        self.target_addr
    }

    pub fn source_addr(&self) -> u16 {
        self.source_addr
    }
}

impl Default for GeneratorState {
    fn default() -> Self {
        Self {
            defaults: ConstraintSet::new(),
            sequence: SequenceCounter::default(),
            target_pan: 0xFFFF,
            target_addr: 0x0000,
            source_addr: 0x0000,
        }
    }
}

/// A pluggable producer of control and test cases.
pub trait CaseGenerator: Send {
    /// Registry name.
    fn name(&self) -> &'static str;

    /// Whether produced cases carry their own PHY framing.
    fn includes_phy(&self) -> bool;

    /// Whether produced cases carry a MAC header and FCS.
    fn includes_mac(&self) -> bool;

    fn state(&self) -> &GeneratorState;

    fn state_mut(&mut self) -> &mut GeneratorState;

    /// Validates `constraints` merged over the defaults and derives the
    /// parameter range for `count` repetitions.
    fn plan(&self, count: usize, constraints: &ConstraintSet) -> Result<CasePlan, ConstraintError>;

    /// Produces the case for one point of a plan, consuming one sequence
    /// number.
    fn produce(&mut self, plan: &CasePlan, variant: i64) -> Result<Case, GeneratorError>;

    /// Per-call constraints that force the degenerate, known-good variant.
    fn control_constraints(&self) -> ConstraintSet;

    /// Returns exactly one case known to elicit valid target behavior.
    fn control_case(&mut self) -> Result<Case, GeneratorError> {
        let plan = self.plan(1, &self.control_constraints())?;
        if plan.is_empty() {
            return Err(GeneratorError::NoControlVariant {
                generator: self.name(),
            });
        }
        let case = self.produce(&plan, plan.variants().start)?;
        Ok(case.with_kind(CaseKind::Control))
    }

    /// Lazy sequence of `count × range_size` test cases.
    ///
    /// Constraint errors are reported here, before any case is produced.
    fn test_cases(
        &self,
        count: usize,
        constraints: &ConstraintSet,
    ) -> Result<TestCases, ConstraintError> {
        Ok(TestCases::new(self.plan(count, constraints)?))
    }

    fn default_constraints(&self) -> &ConstraintSet {
        &self.state().defaults
    }

    /// Replaces the generator-scoped defaults.
    fn set_default_constraints(&mut self, constraints: ConstraintSet) {
        self.state_mut().defaults = constraints;
    }

    fn set_default_constraint(&mut self, name: &str, value: ConstraintValue) {
        self.state_mut().defaults.insert(name, value);
    }

    fn set_target(&mut self, pan: u16, addr: u16) {
        let state = self.state_mut();
        state.target_pan = pan;
        state.target_addr = addr;
    }

    fn set_source(&mut self, addr: u16) {
        self.state_mut().source_addr = addr;
    }

    /// The sequence number the next emitted case will carry.
    fn sequence(&self) -> SequenceNumber {
        self.state().sequence.peek()
    }

    fn set_sequence(&mut self, sequence: SequenceNumber) {
        self.state_mut().sequence.reset(sequence);
    }
}
