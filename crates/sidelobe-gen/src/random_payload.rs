//! Random payload data frames.

use bytes::Bytes;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use sidelobe_codec::{Dot15d4Codec, MacFrame, PacketCodec};
use sidelobe_types::{Case, ConstraintError, ConstraintSet};
use tracing::debug;

use crate::{CaseGenerator, CasePlan, GeneratorError, GeneratorState};

pub const CHECK_VALID: &str = "check_valid";
pub const MAX_RETRIES: &str = "max_retries";
pub const MAX_PAYLOAD_LEN: &str = "max_payload_len";

/// Longest frame produced, FCS included.
pub const MAX_FRAME_LEN: usize = 120;

const DEFAULT_MAX_RETRIES: i64 = 16;
const RETRY_CEILING: i64 = 1024;

struct Settings {
    check_valid: bool,
    max_retries: u32,
    max_payload: Option<usize>,
}

impl Settings {
    fn resolve(constraints: &ConstraintSet) -> Result<Self, ConstraintError> {
        let max_retries = constraints
            .int_in(MAX_RETRIES, 0, RETRY_CEILING)?
            .unwrap_or(DEFAULT_MAX_RETRIES);
        let max_payload = constraints
            .int_in(MAX_PAYLOAD_LEN, 0, MAX_FRAME_LEN as i64)?
            .map(|v| v as usize);
        Ok(Self {
            check_valid: constraints.flag(CHECK_VALID)?.unwrap_or(true),
            max_retries: max_retries as u32,
            max_payload,
        })
    }
}

/// Intra-PAN data frames carrying a random payload of random length.
///
/// Frames never exceed [`MAX_FRAME_LEN`]. With `check_valid` (default
/// true) each candidate is decoded by the codec and regenerated, at most
/// `max_retries` (16) times, until it decodes. Payload bytes come from a
/// seeded [`SmallRng`], so a fixed seed reproduces a run.
#[derive(Debug, Clone)]
pub struct RandomPayload<C = Dot15d4Codec> {
    state: GeneratorState,
    codec: C,
    rng: SmallRng,
}

impl RandomPayload {
    pub fn new() -> Self {
        Self::with_seed(0)
    }

    pub fn with_seed(seed: u64) -> Self {
        Self::with_codec(Dot15d4Codec, seed)
    }
}

impl Default for RandomPayload {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: PacketCodec> RandomPayload<C> {
    pub fn with_codec(codec: C, seed: u64) -> Self {
        Self {
            state: GeneratorState::default(),
            codec,
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    fn candidate(&mut self, base: &MacFrame, max_payload: usize) -> Bytes {
        let len = self.rng.gen_range(0..=max_payload);
        let mut payload = vec![0u8; len];
        self.rng.fill(&mut payload[..]);
        let mut frame = base.clone();
        frame.payload = Bytes::from(payload);
        self.codec.encode(&frame)
    }
}

impl<C: PacketCodec> CaseGenerator for RandomPayload<C> {
    fn name(&self) -> &'static str {
        "random-payload"
    }

    fn includes_phy(&self) -> bool {
        false
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
        Settings::resolve(&merged)?;
        Ok(CasePlan::new(merged, 0..1, count))
    }

    fn produce(&mut self, plan: &CasePlan, _variant: i64) -> Result<Case, GeneratorError> {
        let settings = Settings::resolve(plan.constraints())?;
        let sequence = self.state.peek_sequence();
        let base = MacFrame::data(
            sequence,
            self.state.target_pan(),
            self.state.target_addr(),
            self.state.source_addr(),
            Bytes::new(),
        );
        let room = MAX_FRAME_LEN.saturating_sub(base.buffer_len());
        let max_payload = settings.max_payload.map_or(room, |cap| cap.min(room));

        let mut attempts = 0u32;
        let bytes = loop {
            let bytes = self.candidate(&base, max_payload);
            attempts += 1;
            if !settings.check_valid {
                break bytes;
            }
            match self.codec.decode(&bytes) {
                Ok(_) => break bytes,
                Err(last) if attempts > settings.max_retries => {
                    return Err(GeneratorError::RetriesExhausted { attempts, last });
                }
                Err(error) => {
                    debug!(attempt = attempts, %error, "candidate rejected by codec, regenerating");
                }
            }
        };

        self.state.next_sequence();
        Ok(Case::test(sequence, bytes))
    }

    fn control_constraints(&self) -> ConstraintSet {
        ConstraintSet::new()
            .with(MAX_PAYLOAD_LEN, 0i64)
            .with(CHECK_VALID, false)
    }
}
