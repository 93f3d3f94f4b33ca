//! Nibble-level preamble shaping.
//!
//! O-QPSK sends each byte low nibble first, one symbol per nibble. These
//! helpers work in that symbol order.

/// Number of symbols in the nominal preamble.
pub const PREAMBLE_SYMBOLS: usize = 8;

/// Shifts `bytes` by one symbol: the high nibble of `fill` is sent before
/// the first symbol and its low nibble after the last.
///
/// The result is one byte longer than the input.
pub fn insert_first_last(bytes: &[u8], fill: u8) -> Vec<u8> {
    let mut out = Vec::with_capacity(bytes.len() + 1);
    let mut carry = fill >> 4;
    for &byte in bytes {
        out.push((byte << 4) | carry);
        carry = byte >> 4;
    }
    out.push((fill << 4) | carry);
    out
}

/// Builds the 4-byte preamble with its last `fill_count` symbols forced to
/// `fill_byte`.
///
/// Full fill bytes sit at the end. For an odd count the byte before them
/// carries only the fill's high nibble, which is the symbol sent last.
///
/// Counts above [`PREAMBLE_SYMBOLS`] fill the whole preamble.
pub fn notched_preamble(fill_count: usize, fill_byte: u8) -> [u8; 4] {
    let fill_count = fill_count.min(PREAMBLE_SYMBOLS);
    let mut preamble = [0u8; 4];
    let first_full = preamble.len() - fill_count / 2;
    for byte in &mut preamble[first_full..] {
        *byte = fill_byte;
    }
    if fill_count % 2 == 1 {
        preamble[first_full - 1] = fill_byte & 0xF0;
    }
    preamble
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn symbols(bytes: &[u8]) -> Vec<u8> {
        bytes.iter().flat_map(|b| [b & 0x0F, b >> 4]).collect()
    }

    #[test]
    fn insertion_shifts_by_one_symbol() {
        let out = insert_first_last(&[0xA7, 0x0A], 0x0F);
        assert_eq!(out, vec![0x70, 0xAA, 0xF0]);
        assert_eq!(symbols(&out), vec![0x0, 0x7, 0xA, 0xA, 0x0, 0xF]);
    }

    #[test_case(0, [0x00, 0x00, 0x00, 0x00]; "no fill")]
    #[test_case(1, [0x00, 0x00, 0x00, 0xF0]; "one nibble")]
    #[test_case(3, [0x00, 0x00, 0xF0, 0xFF]; "three nibbles")]
    #[test_case(4, [0x00, 0x00, 0xFF, 0xFF]; "four nibbles")]
    #[test_case(7, [0xF0, 0xFF, 0xFF, 0xFF]; "seven nibbles")]
    #[test_case(8, [0xFF, 0xFF, 0xFF, 0xFF]; "full fill")]
    fn notch_with_ff(count: usize, expected: [u8; 4]) {
        assert_eq!(notched_preamble(count, 0xFF), expected);
    }

    #[test_case(9; "one past")]
    #[test_case(usize::MAX; "far past")]
    fn oversized_notch_fills_everything(count: usize) {
        assert_eq!(notched_preamble(count, 0xFF), [0xFF; 4]);
    }

    #[test]
    fn odd_notch_keeps_only_high_nibble() {
        assert_eq!(notched_preamble(3, 0x5A), [0x00, 0x00, 0x50, 0x5A]);
    }
}
