//! Property tests for case generation.

use proptest::prelude::*;
use sidelobe_gen::nibble::{insert_first_last, notched_preamble};
use sidelobe_gen::{CaseGenerator, PreambleFill, PreambleLength, RandomPayload, collect_cases};
use sidelobe_types::{ConstraintSet, SequenceNumber};

fn symbols(bytes: &[u8]) -> Vec<u8> {
    bytes.iter().flat_map(|b| [b & 0x0F, b >> 4]).collect()
}

proptest! {
    #[test]
    fn fill_case_count_is_count_times_range(max in 0i64..=8, count in 1usize..4) {
        let mut generator = PreambleFill::new();
        let constraints = ConstraintSet::new().with("max_fill", max);
        let cases = collect_cases(&mut generator, count, &constraints).unwrap();
        prop_assert_eq!(cases.len(), count * (max as usize + 1));
        if max >= 1 {
            prop_assert_ne!(&cases[0], &cases[1]);
        }
    }

    #[test]
    fn length_case_count_is_count_times_range(min in 0i64..6, span in 0i64..6, count in 1usize..3) {
        let mut generator = PreambleLength::new();
        let constraints = ConstraintSet::new()
            .with("min_preamb_len", min)
            .with("preamb_len", min + span);
        let cases = collect_cases(&mut generator, count, &constraints).unwrap();
        prop_assert_eq!(cases.len(), count * span as usize);
    }

    #[test]
    fn sequence_numbers_are_gap_free(start in any::<u8>(), n in 1usize..40) {
        let mut generator = RandomPayload::with_seed(u64::from(start));
        generator.set_sequence(SequenceNumber::new(start));

        // Interleave control cases the way the orchestrator does.
        let mut cursor = generator.test_cases(n, &ConstraintSet::new()).unwrap();
        let mut seen = Vec::new();
        while let Some(case) = cursor.next_case(&mut generator) {
            seen.push(generator.control_case().unwrap().sequence());
            seen.push(case.unwrap().sequence());
        }

        // Each test case was drawn before its control case.
        for pair in seen.chunks(2) {
            prop_assert_eq!(pair[0], pair[1].next());
        }
        let mut sorted: Vec<u8> = seen.iter().map(|s| s.as_u8().wrapping_sub(start)).collect();
        sorted.sort_unstable();
        prop_assert_eq!(sorted, (0..2 * n).map(|i| i as u8).collect::<Vec<_>>());
    }

    #[test]
    fn notch_fills_trailing_symbols(count in 0usize..=8, fill in any::<u8>()) {
        let preamble = symbols(&notched_preamble(count, fill));
        let split = 8 - count;
        prop_assert!(preamble[..split].iter().all(|&s| s == 0));
        // Sent order ends on the fill's high nibble.
        if count > 0 {
            prop_assert_eq!(preamble[7], fill >> 4);
        }
        if count % 2 == 0 {
            for pair in preamble[split..].chunks(2) {
                prop_assert_eq!(pair, &[fill & 0x0F, fill >> 4][..]);
            }
        } else {
            prop_assert_eq!(preamble[split], fill >> 4);
        }
    }

    #[test]
    fn insertion_adds_one_symbol_each_side(bytes in proptest::collection::vec(any::<u8>(), 0..64), fill in any::<u8>()) {
        let out = insert_first_last(&bytes, fill);
        let mut expected = vec![fill >> 4];
        expected.extend(symbols(&bytes));
        expected.push(fill & 0x0F);
        prop_assert_eq!(symbols(&out), expected);
    }

    #[test]
    fn random_frames_fit(seed in any::<u64>()) {
        let mut generator = RandomPayload::with_seed(seed);
        for case in collect_cases(&mut generator, 16, &ConstraintSet::new()).unwrap() {
            prop_assert!(case.len() <= 120);
        }
    }
}
