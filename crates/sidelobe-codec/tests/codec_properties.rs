//! Property tests for the MAC codec.

use proptest::prelude::*;
use sidelobe_codec::{Address, Dot15d4Codec, FrameControl, FrameType, MacFrame, PacketCodec};
use sidelobe_types::SequenceNumber;

fn arb_address() -> impl Strategy<Value = Option<Address>> {
    prop_oneof![
        Just(None),
        any::<u16>().prop_map(|a| Some(Address::Short(a))),
        any::<u64>().prop_map(|a| Some(Address::Extended(a))),
    ]
}

prop_compose! {
    fn arb_frame()(
        frame_type in prop_oneof![
            Just(FrameType::Beacon),
            Just(FrameType::Data),
            Just(FrameType::Ack),
            Just(FrameType::Command),
        ],
        ack_request in any::<bool>(),
        frame_pending in any::<bool>(),
        compress in any::<bool>(),
        frame_version in 0u8..3,
        seq in any::<u8>(),
        dst_pan in any::<u16>(),
        dst_addr in arb_address(),
        src_pan in any::<u16>(),
        src_addr in arb_address(),
        payload in proptest::collection::vec(any::<u8>(), 0..80),
    ) -> MacFrame {
        let pan_id_compression = compress && src_addr.is_some();
        MacFrame {
            frame_control: FrameControl {
                frame_type,
                security_enabled: false,
                frame_pending,
                ack_request,
                pan_id_compression,
                frame_version,
            },
            sequence: SequenceNumber::new(seq),
            dst_pan: dst_addr.map(|_| dst_pan),
            dst_addr,
            src_pan: (src_addr.is_some() && !pan_id_compression).then_some(src_pan),
            src_addr,
            payload: payload.into(),
        }
    }
}

proptest! {
    #[test]
    fn decode_recovers_encoded_frame(frame in arb_frame()) {
        let codec = Dot15d4Codec;
        let bytes = codec.encode(&frame);
        prop_assert_eq!(bytes.len(), frame.buffer_len());
        prop_assert_eq!(codec.decode(&bytes).unwrap(), frame);
    }

    #[test]
    fn decode_never_panics(bytes in proptest::collection::vec(any::<u8>(), 0..140)) {
        let _ = Dot15d4Codec.decode(&bytes);
    }

    #[test]
    fn any_single_bit_flip_is_caught(frame in arb_frame(), bit in 0usize..1016) {
        let mut bytes = Dot15d4Codec.encode(&frame).to_vec();
        let bit = bit % (bytes.len() * 8);
        bytes[bit / 8] ^= 1 << (bit % 8);
        prop_assert!(Dot15d4Codec.decode(&bytes).is_err());
    }
}
