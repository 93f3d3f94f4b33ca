//! CRC-16/KERMIT, the 802.15.4 frame check sequence.
//!
//! Reflected polynomial `0x8408` (x^16 + x^12 + x^5 + 1), initial value 0,
//! no final XOR. The FCS is appended to the MAC frame little-endian.

/// Reflected CCITT polynomial.
const POLYNOMIAL: u16 = 0x8408;

/// Precomputed lookup table, built at compile time.
const CRC16_TABLE: [u16; 256] = generate_table();

const fn generate_table() -> [u16; 256] {
    let mut table = [0u16; 256];
    let mut i = 0;
    while i < 256 {
        let mut crc = i as u16;
        let mut j = 0;
        while j < 8 {
            if crc & 1 == 1 {
                crc = (crc >> 1) ^ POLYNOMIAL;
            } else {
                crc >>= 1;
            }
            j += 1;
        }
        table[i] = crc;
        i += 1;
    }
    table
}

/// Computes the frame check sequence over `data`.
pub fn fcs(data: &[u8]) -> u16 {
    let mut crc = 0u16;
    for &byte in data {
        let index = ((crc ^ u16::from(byte)) & 0xFF) as usize;
        crc = (crc >> 8) ^ CRC16_TABLE[index];
    }
    crc
}

/// Appends the little-endian FCS of `frame` to it.
pub fn append_fcs(frame: &mut Vec<u8>) {
    let crc = fcs(frame);
    frame.extend_from_slice(&crc.to_le_bytes());
}

/// Returns true if the last two bytes of `frame` are a valid FCS over the rest.
pub fn check_fcs(frame: &[u8]) -> bool {
    match frame.len().checked_sub(2) {
        Some(split) => {
            let (body, trailer) = frame.split_at(split);
            fcs(body).to_le_bytes() == trailer
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kermit_check_value() {
        assert_eq!(fcs(b"123456789"), 0x2189);
    }

    #[test]
    fn empty_input_is_zero() {
        assert_eq!(fcs(&[]), 0);
    }

    #[test]
    fn appended_fcs_verifies() {
        let mut frame = vec![0x23, 0x08, 0x00, 0xff, 0xff, 0x00, 0x00, 0x07];
        append_fcs(&mut frame);
        assert_eq!(&frame[8..], &[0xfb, 0xa6]);
        assert!(check_fcs(&frame));

        frame[3] ^= 0x01;
        assert!(!check_fcs(&frame));
    }

    #[test]
    fn short_frames_never_verify() {
        assert!(!check_fcs(&[]));
        assert!(!check_fcs(&[0x00]));
    }
}
