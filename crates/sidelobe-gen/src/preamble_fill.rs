//! Preamble notch generator.
//!
//! Sends a beacon request behind a preamble whose trailing symbols are
//! forced to a fill pattern, modeling a partially-settled preamble
//! detection window.

use sidelobe_codec::{Dot15d4Codec, MacFrame, PacketCodec, phy};
use sidelobe_types::{Case, ConstraintError, ConstraintSet};

use crate::nibble::{PREAMBLE_SYMBOLS, notched_preamble};
use crate::{CaseGenerator, CasePlan, GeneratorError, GeneratorState};

pub const MIN_FILL: &str = "min_fill";
pub const MAX_FILL: &str = "max_fill";
pub const FILL_BYTE: &str = "fill_byte";

const DEFAULT_FILL_BYTE: u8 = 0xFF;

struct Settings {
    min_fill: i64,
    max_fill: i64,
    fill_byte: u8,
}

impl Settings {
    fn resolve(constraints: &ConstraintSet) -> Result<Self, ConstraintError> {
        let max = PREAMBLE_SYMBOLS as i64;
        Ok(Self {
            min_fill: constraints.int_in(MIN_FILL, 0, max)?.unwrap_or(0),
            max_fill: constraints.int_in(MAX_FILL, 0, max)?.unwrap_or(max),
            fill_byte: constraints.byte(FILL_BYTE)?.unwrap_or(DEFAULT_FILL_BYTE),
        })
    }
}

/// Beacon requests behind preambles with 0..=8 trailing fill symbols.
///
/// Constraints: `min_fill` (0), `max_fill` (8, at most 8), `fill_byte`
/// (0xFF). The range is inclusive of both bounds.
#[derive(Debug, Clone, Default)]
pub struct PreambleFill<C = Dot15d4Codec> {
    state: GeneratorState,
    codec: C,
}

impl PreambleFill {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<C: PacketCodec> PreambleFill<C> {
    pub fn with_codec(codec: C) -> Self {
        Self {
            state: GeneratorState::default(),
            codec,
        }
    }
}

impl<C: PacketCodec> CaseGenerator for PreambleFill<C> {
    fn name(&self) -> &'static str {
        "preamble-fill"
    }

    fn includes_phy(&self) -> bool {
        true
    }

    fn includes_mac(&self) -> bool {
        true
    }

    fn state(&self) -> &GeneratorState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut GeneratorState {
        &mut self.state
    }

    fn plan(&self, count: usize, constraints: &ConstraintSet) -> Result<CasePlan, ConstraintError> {
        let merged = constraints.merged_over(self.state.defaults());
        let settings = Settings::resolve(&merged)?;
        Ok(CasePlan::new(
            merged,
            settings.min_fill..settings.max_fill + 1,
            count,
        ))
    }

    fn produce(&mut self, plan: &CasePlan, variant: i64) -> Result<Case, GeneratorError> {
        let settings = Settings::resolve(plan.constraints())?;
        if !plan.covers(variant) || !(0..=PREAMBLE_SYMBOLS as i64).contains(&variant) {
            return Err(GeneratorError::VariantOutOfPlan {
                generator: self.name(),
                variant,
            });
        }
        let sequence = self.state.next_sequence();
        let frame = MacFrame::beacon_request(
            sequence,
            self.state.target_pan(),
            self.state.target_addr(),
        );
        let sync = phy::with_sync_header(&self.codec.encode(&frame))?;

        let fill_count = usize::try_from(variant).unwrap_or(0);
        let mut bytes = Vec::with_capacity(4 + sync.len());
        bytes.extend_from_slice(&notched_preamble(fill_count, settings.fill_byte));
        bytes.extend_from_slice(&sync);
        Ok(Case::test(sequence, bytes))
    }

    fn control_constraints(&self) -> ConstraintSet {
        ConstraintSet::new().with(MIN_FILL, 0i64).with(MAX_FILL, 0i64)
    }
}
