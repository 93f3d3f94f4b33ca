//! # sidelobe-types: Core types for `sidelobe`
//!
//! This crate contains the vocabulary shared by every other `sidelobe` crate:
//! - Frame instances under test ([`Case`], [`CaseKind`])
//! - Generator-owned sequencing ([`SequenceNumber`], [`SequenceCounter`])
//! - Generator parameterization ([`ConstraintSet`], [`ConstraintValue`], [`ConstraintError`])
//! - Harness answers ([`Verdict`])
//! - Radio tuning ([`Channel`])

use std::fmt::{self, Display};

use bytes::Bytes;
use serde::{Deserialize, Serialize};

mod constraint;

pub use constraint::{ConstraintError, ConstraintSet, ConstraintValue};

// ============================================================================
// Sequence Numbers
// ============================================================================

/// An 802.15.4 MAC sequence number.
///
/// Wraps modulo 256: the successor of 255 is 0.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct SequenceNumber(u8);

impl SequenceNumber {
    pub fn new(value: u8) -> Self {
        Self(value)
    }

    pub fn as_u8(self) -> u8 {
        self.0
    }

    /// Returns the next sequence number, wrapping 255 → 0.
    pub fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

impl Display for SequenceNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u8> for SequenceNumber {
    fn from(value: u8) -> Self {
        Self(value)
    }
}

impl From<SequenceNumber> for u8 {
    fn from(seq: SequenceNumber) -> Self {
        seq.0
    }
}

/// Generator-owned sequence counter.
///
/// Every emitted case consumes exactly one number, so the numbers observed
/// across a run are gap-free modulo 256. The counter is only rewound by an
/// explicit [`SequenceCounter::reset`].
#[derive(Debug, Clone, Default)]
pub struct SequenceCounter {
    next: SequenceNumber,
}

impl SequenceCounter {
    pub fn new(start: SequenceNumber) -> Self {
        Self { next: start }
    }

    /// Returns the number the next emitted case will carry.
    pub fn peek(&self) -> SequenceNumber {
        self.next
    }

    /// Consumes the current number and advances the counter.
    pub fn advance(&mut self) -> SequenceNumber {
        let current = self.next;
        self.next = current.next();
        current
    }

    pub fn reset(&mut self, start: SequenceNumber) {
        self.next = start;
    }
}

// ============================================================================
// Cases
// ============================================================================

/// Whether a case is a sanity check or a fuzz input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaseKind {
    /// Expected to provoke a known-valid target response.
    Control,
    /// The fuzz input under study.
    Test,
}

impl Display for CaseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Control => write!(f, "control"),
            Self::Test => write!(f, "test"),
        }
    }
}

/// One immutable protocol frame instance, as it will go on the air.
///
/// Cases are produced by a generator and handed to the orchestrator by
/// value; the byte buffer is reference counted so cloning is cheap.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Case {
    kind: CaseKind,
    sequence: SequenceNumber,
    bytes: Bytes,
}

impl Case {
    pub fn new(kind: CaseKind, sequence: SequenceNumber, bytes: impl Into<Bytes>) -> Self {
        Self {
            kind,
            sequence,
            bytes: bytes.into(),
        }
    }

    pub fn control(sequence: SequenceNumber, bytes: impl Into<Bytes>) -> Self {
        Self::new(CaseKind::Control, sequence, bytes)
    }

    pub fn test(sequence: SequenceNumber, bytes: impl Into<Bytes>) -> Self {
        Self::new(CaseKind::Test, sequence, bytes)
    }

    pub fn kind(&self) -> CaseKind {
        self.kind
    }

    /// The MAC sequence number stamped into this frame.
    pub fn sequence(&self) -> SequenceNumber {
        self.sequence
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Returns a cheap handle to the underlying buffer.
    pub fn bytes(&self) -> Bytes {
        self.bytes.clone()
    }

    pub fn into_bytes(self) -> Bytes {
        self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Lowercase hex rendering used in logs and result files.
    pub fn to_hex(&self) -> String {
        hex::encode(&self.bytes)
    }

    /// Re-labels the case, keeping bytes and sequence number.
    pub fn with_kind(mut self, kind: CaseKind) -> Self {
        self.kind = kind;
        self
    }
}

impl AsRef<[u8]> for Case {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

impl Display for Case {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}[{}]", self.kind, self.sequence, self.to_hex())
    }
}

// ============================================================================
// Verdicts
// ============================================================================

/// A harness answer: valid, invalid, or undeterminable.
///
/// Serializes as `true`, `false` or `null`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "Option<bool>", into = "Option<bool>")]
pub enum Verdict {
    Valid,
    Invalid,
    #[default]
    Unknown,
}

impl Verdict {
    pub fn is_valid(self) -> bool {
        self == Self::Valid
    }

    pub fn is_invalid(self) -> bool {
        self == Self::Invalid
    }

    /// Swaps valid and invalid; unknown stays unknown.
    pub fn negate(self) -> Self {
        match self {
            Self::Valid => Self::Invalid,
            Self::Invalid => Self::Valid,
            Self::Unknown => Self::Unknown,
        }
    }
}

impl From<bool> for Verdict {
    fn from(value: bool) -> Self {
        if value { Self::Valid } else { Self::Invalid }
    }
}

impl From<Option<bool>> for Verdict {
    fn from(value: Option<bool>) -> Self {
        value.map_or(Self::Unknown, Self::from)
    }
}

impl From<Verdict> for Option<bool> {
    fn from(verdict: Verdict) -> Self {
        match verdict {
            Verdict::Valid => Some(true),
            Verdict::Invalid => Some(false),
            Verdict::Unknown => None,
        }
    }
}

impl Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Valid => write!(f, "valid"),
            Self::Invalid => write!(f, "invalid"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

// ============================================================================
// Channels
// ============================================================================

/// An IEEE 802.15.4 2.4 GHz O-QPSK channel, 11 through 26.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Channel(u8);

impl Channel {
    pub const MIN: u8 = 11;
    pub const MAX: u8 = 26;

    pub fn new(number: u8) -> Result<Self, InvalidChannel> {
        if (Self::MIN..=Self::MAX).contains(&number) {
            Ok(Self(number))
        } else {
            Err(InvalidChannel(number))
        }
    }

    pub fn number(self) -> u8 {
        self.0
    }

    /// Centre frequency in Hz: `2405 + 5·(channel − 11)` MHz.
    pub fn frequency_hz(self) -> u64 {
        (2405 + 5 * u64::from(self.0 - Self::MIN)) * 1_000_000
    }
}

impl Default for Channel {
    fn default() -> Self {
        Self(Self::MIN)
    }
}

impl Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<u8> for Channel {
    type Error = InvalidChannel;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Channel> for u8 {
    fn from(channel: Channel) -> Self {
        channel.0
    }
}

/// A channel number outside 11..=26.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("channel {0} is outside the 2.4 GHz band (11..=26)")]
pub struct InvalidChannel(pub u8);
