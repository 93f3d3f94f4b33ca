//! Preamble length sweep.

use sidelobe_codec::{Dot15d4Codec, MacFrame, PacketCodec, phy};
use sidelobe_types::{Case, ConstraintError, ConstraintSet};

use crate::nibble::insert_first_last;
use crate::{CaseGenerator, CasePlan, GeneratorError, GeneratorState};

/// Exclusive upper bound on preamble length, in symbols. Required.
pub const PREAMB_LEN: &str = "preamb_len";
pub const MIN_PREAMB_LEN: &str = "min_preamb_len";

const MAX_PREAMBLE_SYMBOLS: i64 = 256;

// Sent after the frame when the length is odd.
const ODD_FILL: u8 = 0x0F;

/// Beacon requests behind zero preambles of `min_preamb_len..preamb_len`
/// symbols.
///
/// Odd lengths shift the whole PHY frame by one zero symbol and append a
/// `0xF` symbol so the frame stays byte-aligned.
#[derive(Debug, Clone, Default)]
pub struct PreambleLength<C = Dot15d4Codec> {
    state: GeneratorState,
    codec: C,
}

impl PreambleLength {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<C: PacketCodec> PreambleLength<C> {
    pub fn with_codec(codec: C) -> Self {
        Self {
            state: GeneratorState::default(),
            codec,
        }
    }
}

fn bounds(constraints: &ConstraintSet) -> Result<(i64, i64), ConstraintError> {
    let max = constraints.require_int(PREAMB_LEN)?;
    if !(0..=MAX_PREAMBLE_SYMBOLS).contains(&max) {
        return Err(ConstraintError::OutOfRange {
            name: PREAMB_LEN.to_string(),
            value: max,
            min: 0,
            max: MAX_PREAMBLE_SYMBOLS,
        });
    }
    let min = constraints
        .int_in(MIN_PREAMB_LEN, 0, MAX_PREAMBLE_SYMBOLS)?
        .unwrap_or(0);
    Ok((min, max))
}

impl<C: PacketCodec> CaseGenerator for PreambleLength<C> {
    fn name(&self) -> &'static str {
        "preamble-length"
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
        let (min, max) = bounds(&merged)?;
        Ok(CasePlan::new(merged, min..max, count))
    }

    fn produce(&mut self, plan: &CasePlan, variant: i64) -> Result<Case, GeneratorError> {
        if !plan.covers(variant) || !(0..=MAX_PREAMBLE_SYMBOLS).contains(&variant) {
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

        let symbols = usize::try_from(variant).unwrap_or(0);
        let mut bytes = vec![0u8; symbols / 2];
        if symbols % 2 == 1 {
            bytes.extend_from_slice(&insert_first_last(&sync, ODD_FILL));
        } else {
            bytes.extend_from_slice(&sync);
        }
        Ok(Case::test(sequence, bytes))
    }

    fn control_constraints(&self) -> ConstraintSet {
        ConstraintSet::new()
            .with(MIN_PREAMB_LEN, 8i64)
            .with(PREAMB_LEN, 9i64)
    }
}
