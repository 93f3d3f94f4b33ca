//! Match predicates between received frames and the expectation.

use serde::{Deserialize, Serialize};

/// Which side of a comparison must contain the other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MatchMode {
    /// The received frame contains the expected bytes. Suits receivers that
    /// capture framing the sender's codec did not emit.
    #[default]
    FrameContainsExpected,
    /// The expected bytes contain the received frame. Suits sniffers that
    /// strip PHY framing the case carries.
    ExpectedContainsFrame,
}

impl MatchMode {
    /// Empty frames and empty expectations never match.
    pub fn matches(self, frame: &[u8], expected: &[u8]) -> bool {
        if frame.is_empty() {
            return false;
        }
        match self {
            Self::FrameContainsExpected => contains(frame, expected),
            Self::ExpectedContainsFrame => contains(expected, frame),
        }
    }
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    !needle.is_empty() && haystack.windows(needle.len()).any(|w| w == needle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(&[1, 2, 3], &[1, 2, 3], true ; "equal")]
    #[test_case(&[0, 0, 0xA7, 1, 2, 3, 9], &[1, 2, 3], true ; "framing around")]
    #[test_case(&[1, 2], &[1, 2, 3], false ; "truncated")]
    #[test_case(&[1, 3, 2], &[1, 2, 3], false ; "reordered")]
    #[test_case(&[], &[1], false ; "empty frame")]
    #[test_case(&[1], &[], false ; "empty expectation")]
    fn frame_contains_expected(frame: &[u8], expected: &[u8], outcome: bool) {
        assert_eq!(MatchMode::FrameContainsExpected.matches(frame, expected), outcome);
    }

    #[test_case(&[1, 2, 3], &[0, 0, 0xA7, 1, 2, 3], true ; "stripped framing")]
    #[test_case(&[0, 0, 0xA7, 1, 2, 3], &[1, 2, 3], false ; "extra framing")]
    #[test_case(&[], &[1, 2], false ; "empty frame")]
    fn expected_contains_frame(frame: &[u8], expected: &[u8], outcome: bool) {
        assert_eq!(MatchMode::ExpectedContainsFrame.matches(frame, expected), outcome);
    }

    #[test]
    fn serializes_kebab_case() {
        let json = serde_json::to_string(&MatchMode::ExpectedContainsFrame).unwrap();
        assert_eq!(json, "\"expected-contains-frame\"");
    }
}
