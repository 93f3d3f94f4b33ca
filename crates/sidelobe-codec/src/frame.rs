//! MAC frame representation.
//!
//! # Frame Format
//!
//! ```text
//! [fcf:u16][seq:u8][dst_pan:u16][dst_addr:2|8B][src_pan:u16][src_addr:2|8B][payload][fcs:u16]
//!    2B       1B      optional      optional      optional      optional     variable   2B
//! ```
//!
//! All multi-byte fields are little-endian. The source PAN is omitted when
//! PAN ID compression is set.

use bytes::Bytes;
use sidelobe_types::SequenceNumber;

use crate::phy::MAX_PSDU_LEN;
use crate::{DecodeError, crc};

/// Broadcast PAN identifier.
pub const BROADCAST_PAN: u16 = 0xFFFF;

/// MAC command identifier of a beacon request.
pub const BEACON_REQUEST: u8 = 0x07;

// FCF + sequence number + FCS.
const MIN_FRAME_LEN: usize = 5;

const FCS_LEN: usize = 2;

// ============================================================================
// Frame Control
// ============================================================================

/// The three-bit frame type field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FrameType {
    Beacon,
    #[default]
    Data,
    Ack,
    Command,
    Reserved(u8),
}

impl FrameType {
    fn from_bits(bits: u16) -> Self {
        match bits & 0b111 {
            0 => Self::Beacon,
            1 => Self::Data,
            2 => Self::Ack,
            3 => Self::Command,
            other => Self::Reserved(other as u8),
        }
    }

    fn bits(self) -> u16 {
        match self {
            Self::Beacon => 0,
            Self::Data => 1,
            Self::Ack => 2,
            Self::Command => 3,
            Self::Reserved(raw) => u16::from(raw & 0b111),
        }
    }
}

/// Frame control flags, excluding the addressing modes.
///
/// Addressing modes are derived from which addresses a [`MacFrame`] carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct FrameControl {
    pub frame_type: FrameType,
    pub security_enabled: bool,
    pub frame_pending: bool,
    pub ack_request: bool,
    pub pan_id_compression: bool,
    /// Two-bit frame version; 3 is reserved.
    pub frame_version: u8,
}

impl FrameControl {
    fn from_bits(bits: u16) -> Result<Self, DecodeError> {
        let frame_version = ((bits >> 12) & 0b11) as u8;
        if frame_version == 0b11 {
            return Err(DecodeError::ReservedFrameVersion(frame_version));
        }
        Ok(Self {
            frame_type: FrameType::from_bits(bits),
            security_enabled: bits & (1 << 3) != 0,
            frame_pending: bits & (1 << 4) != 0,
            ack_request: bits & (1 << 5) != 0,
            pan_id_compression: bits & (1 << 6) != 0,
            frame_version,
        })
    }

    fn bits(self) -> u16 {
        let mut bits = self.frame_type.bits();
        if self.security_enabled {
            bits |= 1 << 3;
        }
        if self.frame_pending {
            bits |= 1 << 4;
        }
        if self.ack_request {
            bits |= 1 << 5;
        }
        if self.pan_id_compression {
            bits |= 1 << 6;
        }
        bits | (u16::from(self.frame_version & 0b11) << 12)
    }
}

// ============================================================================
// Addresses
// ============================================================================

/// A device address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Address {
    Short(u16),
    Extended(u64),
}

impl Address {
    /// Short broadcast address.
    pub const BROADCAST: Self = Self::Short(0xFFFF);

    fn mode_bits(self) -> u16 {
        match self {
            Self::Short(_) => 0b10,
            Self::Extended(_) => 0b11,
        }
    }

    /// Encoded length in bytes.
    pub fn encoded_len(self) -> usize {
        match self {
            Self::Short(_) => 2,
            Self::Extended(_) => 8,
        }
    }

    fn write_into(self, buf: &mut Vec<u8>) {
        match self {
            Self::Short(addr) => buf.extend_from_slice(&addr.to_le_bytes()),
            Self::Extended(addr) => buf.extend_from_slice(&addr.to_le_bytes()),
        }
    }
}

fn address_mode(bits: u16, field: &'static str) -> Result<Option<usize>, DecodeError> {
    match bits & 0b11 {
        0b00 => Ok(None),
        0b10 => Ok(Some(2)),
        0b11 => Ok(Some(8)),
        _ => Err(DecodeError::ReservedAddressMode { field }),
    }
}

// ============================================================================
// Frames
// ============================================================================

/// Structural view of one MAC frame, without its FCS.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MacFrame {
    pub frame_control: FrameControl,
    pub sequence: SequenceNumber,
    pub dst_pan: Option<u16>,
    pub dst_addr: Option<Address>,
    /// Ignored when PAN ID compression is set.
    pub src_pan: Option<u16>,
    pub src_addr: Option<Address>,
    /// MAC payload; for command frames the first byte is the command id.
    pub payload: Bytes,
}

impl MacFrame {
    /// A beacon request command, acknowledgement requested, no source address.
    pub fn beacon_request(sequence: SequenceNumber, dst_pan: u16, dst_addr: u16) -> Self {
        Self {
            frame_control: FrameControl {
                frame_type: FrameType::Command,
                ack_request: true,
                ..FrameControl::default()
            },
            sequence,
            dst_pan: Some(dst_pan),
            dst_addr: Some(Address::Short(dst_addr)),
            src_pan: None,
            src_addr: None,
            payload: Bytes::from_static(&[BEACON_REQUEST]),
        }
    }

    /// An intra-PAN data frame between two short addresses.
    pub fn data(
        sequence: SequenceNumber,
        dst_pan: u16,
        dst_addr: u16,
        src_addr: u16,
        payload: impl Into<Bytes>,
    ) -> Self {
        Self {
            frame_control: FrameControl {
                frame_type: FrameType::Data,
                ack_request: true,
                pan_id_compression: true,
                ..FrameControl::default()
            },
            sequence,
            dst_pan: Some(dst_pan),
            dst_addr: Some(Address::Short(dst_addr)),
            src_pan: None,
            src_addr: Some(Address::Short(src_addr)),
            payload: payload.into(),
        }
    }

    pub fn frame_type(&self) -> FrameType {
        self.frame_control.frame_type
    }

    /// The MAC command id, for command frames with a payload.
    pub fn command_id(&self) -> Option<u8> {
        match self.frame_control.frame_type {
            FrameType::Command => self.payload.first().copied(),
            _ => None,
        }
    }

    fn writes_src_pan(&self) -> bool {
        self.src_addr.is_some() && !self.frame_control.pan_id_compression
    }

    /// Length of the encoded frame, FCS included.
    pub fn buffer_len(&self) -> usize {
        let dst = self.dst_addr.map_or(0, |addr| 2 + addr.encoded_len());
        let src_pan = if self.writes_src_pan() { 2 } else { 0 };
        let src = self.src_addr.map_or(0, Address::encoded_len);
        3 + dst + src_pan + src + self.payload.len() + FCS_LEN
    }

    fn fcf_bits(&self) -> u16 {
        let dst_mode = self.dst_addr.map_or(0, Address::mode_bits);
        let src_mode = self.src_addr.map_or(0, Address::mode_bits);
        self.frame_control.bits() | (dst_mode << 10) | (src_mode << 14)
    }

    /// Serializes the frame and appends its FCS.
    ///
    /// A destination address without a PAN is written with the broadcast PAN.
    pub fn to_bytes(&self) -> Bytes {
        let mut buf = Vec::with_capacity(self.buffer_len());
        buf.extend_from_slice(&self.fcf_bits().to_le_bytes());
        buf.push(self.sequence.as_u8());

        if let Some(addr) = self.dst_addr {
            buf.extend_from_slice(&self.dst_pan.unwrap_or(BROADCAST_PAN).to_le_bytes());
            addr.write_into(&mut buf);
        }
        if let Some(addr) = self.src_addr {
            if self.writes_src_pan() {
                let pan = self.src_pan.or(self.dst_pan).unwrap_or(BROADCAST_PAN);
                buf.extend_from_slice(&pan.to_le_bytes());
            }
            addr.write_into(&mut buf);
        }

        buf.extend_from_slice(&self.payload);
        crc::append_fcs(&mut buf);
        Bytes::from(buf)
    }

    /// Parses a frame, FCS included.
    ///
    /// # Errors
    ///
    /// - [`DecodeError::TooLong`] above 127 bytes
    /// - [`DecodeError::Truncated`] if the header runs past the FCS
    /// - [`DecodeError::BadFcs`] if the trailer does not verify
    /// - [`DecodeError::ReservedAddressMode`] / [`DecodeError::ReservedFrameVersion`]
    /// - [`DecodeError::SecurityUnsupported`] for secured frames
    pub fn from_bytes(data: &[u8]) -> Result<Self, DecodeError> {
        if data.len() > MAX_PSDU_LEN {
            return Err(DecodeError::TooLong {
                len: data.len(),
                max: MAX_PSDU_LEN,
            });
        }
        if data.len() < MIN_FRAME_LEN {
            return Err(DecodeError::Truncated {
                len: data.len(),
                needed: MIN_FRAME_LEN,
            });
        }

        let (body, trailer) = data.split_at(data.len() - FCS_LEN);
        let carried = u16::from_le_bytes([trailer[0], trailer[1]]);
        let computed = crc::fcs(body);
        if carried != computed {
            return Err(DecodeError::BadFcs { computed, carried });
        }

        let fcf = u16::from_le_bytes([body[0], body[1]]);
        let frame_control = FrameControl::from_bits(fcf)?;
        if frame_control.security_enabled {
            return Err(DecodeError::SecurityUnsupported);
        }
        let dst_len = address_mode(fcf >> 10, "destination")?;
        let src_len = address_mode(fcf >> 14, "source")?;

        let mut cursor = Cursor {
            buf: body,
            pos: 2,
            frame_len: data.len(),
        };
        let sequence = SequenceNumber::new(cursor.take(1)?[0]);

        let (dst_pan, dst_addr) = match dst_len {
            Some(len) => (Some(cursor.u16()?), Some(cursor.address(len)?)),
            None => (None, None),
        };
        let (src_pan, src_addr) = match src_len {
            Some(len) => {
                let pan = if frame_control.pan_id_compression {
                    None
                } else {
                    Some(cursor.u16()?)
                };
                (pan, Some(cursor.address(len)?))
            }
            None => (None, None),
        };

        Ok(Self {
            frame_control,
            sequence,
            dst_pan,
            dst_addr,
            src_pan,
            src_addr,
            payload: Bytes::copy_from_slice(cursor.rest()),
        })
    }
}

struct Cursor<'a> {
    buf: &'a [u8],
    pos: usize,
    frame_len: usize,
}

impl<'a> Cursor<'a> {
    fn take(&mut self, n: usize) -> Result<&'a [u8], DecodeError> {
        let end = self.pos + n;
        if end > self.buf.len() {
            return Err(DecodeError::Truncated {
                len: self.frame_len,
                needed: end + FCS_LEN,
            });
        }
        let slice = &self.buf[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn u16(&mut self) -> Result<u16, DecodeError> {
        let bytes = self.take(2)?;
        Ok(u16::from_le_bytes([bytes[0], bytes[1]]))
    }

    fn address(&mut self, len: usize) -> Result<Address, DecodeError> {
        let bytes = self.take(len)?;
        Ok(match *bytes {
            [a, b] => Address::Short(u16::from_le_bytes([a, b])),
            _ => {
                let mut raw = [0u8; 8];
                raw.copy_from_slice(bytes);
                Address::Extended(u64::from_le_bytes(raw))
            }
        })
    }

    fn rest(&self) -> &'a [u8] {
        &self.buf[self.pos..]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn beacon_request_layout() {
        let frame = MacFrame::beacon_request(SequenceNumber::new(0), 0xFFFF, 0x0000);
        let bytes = frame.to_bytes();
        assert_eq!(hex::encode(&bytes), "230800ffff000007fba6");
        assert_eq!(frame.buffer_len(), bytes.len());
        assert_eq!(frame.command_id(), Some(BEACON_REQUEST));
    }

    #[test]
    fn data_frame_layout() {
        let frame = MacFrame::data(SequenceNumber::new(5), 0xABCD, 0xBEEF, 0xDEAD, vec![1, 2]);
        assert_eq!(hex::encode(frame.to_bytes()), "618805cdabefbeadde0102c148");
        assert_eq!(frame.command_id(), None);
    }

    #[test]
    fn parses_what_it_writes() {
        let frame = MacFrame::data(SequenceNumber::new(200), 0x1234, 0x0001, 0x0002, vec![0xAA]);
        let parsed = MacFrame::from_bytes(&frame.to_bytes()).unwrap();
        assert_eq!(parsed, frame);
    }

    #[test]
    fn uncompressed_source_pan_is_kept() {
        let frame = MacFrame {
            frame_control: FrameControl::default(),
            sequence: SequenceNumber::new(1),
            dst_pan: Some(0x0001),
            dst_addr: Some(Address::Extended(0x0011_2233_4455_6677)),
            src_pan: Some(0x0002),
            src_addr: Some(Address::Short(0x0003)),
            payload: Bytes::new(),
        };
        let bytes = frame.to_bytes();
        assert_eq!(bytes.len(), 3 + 10 + 4 + 2);
        assert_eq!(MacFrame::from_bytes(&bytes).unwrap(), frame);
    }

    #[test]
    fn rejects_bad_fcs() {
        let mut bytes = MacFrame::beacon_request(SequenceNumber::new(0), 0xFFFF, 0)
            .to_bytes()
            .to_vec();
        bytes[2] = 0x01;
        assert!(matches!(
            MacFrame::from_bytes(&bytes),
            Err(DecodeError::BadFcs { .. })
        ));
    }

    #[test]
    fn rejects_header_past_fcs() {
        // FCF claims a short destination but the body stops after the sequence number.
        let mut bytes = vec![0x01, 0x08, 0x00];
        crc::append_fcs(&mut bytes);
        assert_eq!(
            MacFrame::from_bytes(&bytes),
            Err(DecodeError::Truncated { len: 5, needed: 7 })
        );
    }

    #[test]
    fn rejects_reserved_address_mode() {
        let mut bytes = vec![0x01, 0x04, 0x00];
        crc::append_fcs(&mut bytes);
        assert_eq!(
            MacFrame::from_bytes(&bytes),
            Err(DecodeError::ReservedAddressMode {
                field: "destination"
            })
        );
    }

    #[test]
    fn rejects_oversized() {
        let bytes = vec![0u8; MAX_PSDU_LEN + 1];
        assert!(matches!(
            MacFrame::from_bytes(&bytes),
            Err(DecodeError::TooLong { len: 128, .. })
        ));
    }
}
