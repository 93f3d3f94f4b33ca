//! O-QPSK PHY framing.
//!
//! ```text
//! [preamble:4B = 00 00 00 00][sfd:1B = A7][phr:1B = psdu len][psdu]
//! ```

use crate::OversizedFrame;

/// Start-of-frame delimiter.
pub const SFD: u8 = 0xA7;

/// Nominal preamble: eight zero symbols.
pub const PREAMBLE: [u8; 4] = [0x00; 4];

/// Largest PSDU the PHY header can describe.
pub const MAX_PSDU_LEN: usize = 127;

/// Prefixes `psdu` with the SFD and the PHY length byte.
///
/// Generators that shape their own preamble start from this.
pub fn with_sync_header(psdu: &[u8]) -> Result<Vec<u8>, OversizedFrame> {
    let len = phr(psdu)?;
    let mut out = Vec::with_capacity(2 + psdu.len());
    out.push(SFD);
    out.push(len);
    out.extend_from_slice(psdu);
    Ok(out)
}

/// Full PPDU with the nominal preamble.
pub fn ppdu(psdu: &[u8]) -> Result<Vec<u8>, OversizedFrame> {
    let sync = with_sync_header(psdu)?;
    let mut out = Vec::with_capacity(PREAMBLE.len() + sync.len());
    out.extend_from_slice(&PREAMBLE);
    out.extend_from_slice(&sync);
    Ok(out)
}

fn phr(psdu: &[u8]) -> Result<u8, OversizedFrame> {
    if psdu.len() > MAX_PSDU_LEN {
        return Err(OversizedFrame {
            len: psdu.len(),
            max: MAX_PSDU_LEN,
        });
    }
    Ok(psdu.len() as u8)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sync_header_carries_length() {
        let framed = with_sync_header(&[0x01, 0x02, 0x03]).unwrap();
        assert_eq!(framed, vec![0xA7, 0x03, 0x01, 0x02, 0x03]);
    }

    #[test]
    fn ppdu_starts_with_zero_preamble() {
        let framed = ppdu(&[0xEE]).unwrap();
        assert_eq!(framed, vec![0, 0, 0, 0, 0xA7, 0x01, 0xEE]);
    }

    #[test]
    fn oversized_psdu_is_rejected() {
        let err = with_sync_header(&[0u8; 128]).unwrap_err();
        assert_eq!(err, OversizedFrame { len: 128, max: 127 });
        assert!(with_sync_header(&[0u8; 127]).is_ok());
    }
}
