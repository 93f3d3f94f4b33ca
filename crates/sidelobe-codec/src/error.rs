//! Codec error types.

/// Reasons a byte string is not a well-formed 802.15.4 MAC frame.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    /// Fewer bytes than the header announced.
    #[error("frame truncated: {len} bytes, need at least {needed}")]
    Truncated { len: usize, needed: usize },

    /// Longer than the PHY allows.
    #[error("frame is {len} bytes, maximum PSDU is {max}")]
    TooLong { len: usize, max: usize },

    /// FCS trailer does not match the frame body.
    #[error("bad FCS: computed {computed:#06x}, frame carries {carried:#06x}")]
    BadFcs { computed: u16, carried: u16 },

    /// Addressing mode `0b01` is reserved.
    #[error("reserved {field} addressing mode")]
    ReservedAddressMode { field: &'static str },

    /// Frame version `0b11` is reserved.
    #[error("reserved frame version {0}")]
    ReservedFrameVersion(u8),

    /// Auxiliary security headers are not parsed.
    #[error("secured frames are not supported")]
    SecurityUnsupported,
}

/// A PSDU too long to carry in a single PHY packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("PSDU of {len} bytes exceeds the {max}-byte PHY limit")]
pub struct OversizedFrame {
    pub len: usize,
    pub max: usize,
}
