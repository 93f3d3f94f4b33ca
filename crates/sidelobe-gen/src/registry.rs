//! Generator lookup by name.

use sidelobe_types::{ConstraintSet, SequenceNumber};

use crate::{CaseGenerator, GeneratorError, PreambleFill, PreambleLength, RandomPayload};

/// Construction-time settings shared by every generator.
#[derive(Debug, Clone)]
pub struct GeneratorOptions {
    pub start_sequence: SequenceNumber,
    pub target_pan: u16,
    pub target_addr: u16,
    pub source_addr: u16,
    /// Seed for generators that draw random bytes.
    pub seed: u64,
    /// Generator-scoped default constraints.
    pub defaults: ConstraintSet,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            start_sequence: SequenceNumber::new(0),
            target_pan: 0xFFFF,
            target_addr: 0x0000,
            source_addr: 0x0000,
            seed: 0,
            defaults: ConstraintSet::new(),
        }
    }
}

const NAMES: &[&str] = &["preamble-fill", "preamble-length", "random-payload"];

/// Registered generator names.
pub fn names() -> &'static [&'static str] {
    NAMES
}

/// Builds the generator registered under `name`.
pub fn create(
    name: &str,
    options: &GeneratorOptions,
) -> Result<Box<dyn CaseGenerator>, GeneratorError> {
    let mut generator: Box<dyn CaseGenerator> = match name {
        "preamble-fill" => Box::new(PreambleFill::new()),
        "preamble-length" => Box::new(PreambleLength::new()),
        "random-payload" => Box::new(RandomPayload::with_seed(options.seed)),
        _ => {
            return Err(GeneratorError::Unknown {
                name: name.to_string(),
            });
        }
    };
    generator.set_target(options.target_pan, options.target_addr);
    generator.set_source(options.source_addr);
    generator.set_sequence(options.start_sequence);
    generator.set_default_constraints(options.defaults.clone());
    Ok(generator)
}
