//! Integration tests for the interface registry.

use sidelobe_types::Channel;
use test_case::test_case;

use crate::{InterfaceOptions, LinkError, create, names};

#[test]
fn every_name_builds_closed() {
    for name in names() {
        let link = create(name, &InterfaceOptions::default()).unwrap();
        assert_eq!(link.name(), *name);
        assert!(!link.is_running());
    }
}

#[test]
fn unknown_name_is_an_error() {
    assert!(matches!(
        create("killerbee", &InterfaceOptions::default()),
        Err(LinkError::Unknown { .. })
    ));
}

#[test_case(11, 2_405_000_000 ; "lowest channel")]
#[test_case(15, 2_425_000_000 ; "channel 15")]
#[test_case(26, 2_480_000_000 ; "highest channel")]
fn registry_tunes_the_interface(channel: u8, freq_hz: u64) {
    let options = InterfaceOptions {
        channel: Channel::new(channel).unwrap(),
        ..InterfaceOptions::default()
    };
    for name in names() {
        let status = create(name, &options).unwrap().status();
        assert_eq!(status.channel, Some(options.channel));
        assert_eq!(status.freq_hz, Some(freq_hz));
    }
}

#[test]
fn loopback_lifecycle_through_trait_object() {
    let link = create("loopback", &InterfaceOptions::default()).unwrap();
    assert!(link.supports_receive());
    link.open().unwrap();
    link.rx_start().unwrap();
    assert!(link.transmit(b"frame").unwrap());
    assert_eq!(link.receive_nonblocking().unwrap().as_deref(), Some(&b"frame"[..]));
    link.rx_stop().unwrap();
    link.close().unwrap();
    assert!(!link.is_running());
}

#[test]
fn status_serializes_channel_as_number() {
    let link = create("loopback", &InterfaceOptions::default()).unwrap();
    let json = serde_json::to_value(link.status()).unwrap();
    assert_eq!(json["channel"], 11);
    assert_eq!(json["name"], "loopback");
}
