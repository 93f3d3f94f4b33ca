//! Poller behaviour against a live loopback interface.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use bytes::Bytes;
use sidelobe_harness::{Harness, HarnessError, HarnessSettings, ReceivedFrameHarness, create, names};
use sidelobe_io::{InterfaceStatus, LinkError, LoopbackTransceiver, Transceiver};
use sidelobe_types::{Case, Channel, SequenceNumber, Verdict};

const TICK: Duration = Duration::from_millis(2);

fn open_harness() -> (Arc<LoopbackTransceiver>, ReceivedFrameHarness) {
    let link = Arc::new(LoopbackTransceiver::new());
    let settings = HarnessSettings {
        tick: TICK,
        ..HarnessSettings::default()
    };
    let mut harness = ReceivedFrameHarness::new(link.clone(), settings);
    harness.open().unwrap();
    (link, harness)
}

fn wait_until(mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_secs(5);
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        thread::sleep(TICK);
    }
    false
}

#[test]
fn poller_collects_evidence_in_the_background() {
    let (link, harness) = open_harness();
    link.transmit(&[1, 2, 3]).unwrap();
    link.transmit(&[4, 5, 6]).unwrap();
    assert!(wait_until(|| harness.evidence_len() == 2));
    assert_eq!(link.pending_len(), 0);
}

#[test]
fn poller_survives_receive_errors() {
    let (link, mut harness) = open_harness();
    link.fail_receives(3);
    link.inject(vec![0xAAu8]);
    assert!(wait_until(|| harness.evidence_len() == 1));

    harness.set_expected(&Case::test(SequenceNumber::new(0), vec![0xAAu8]));
    assert_eq!(harness.is_valid().unwrap(), Verdict::Valid);
}

#[test]
fn no_mutation_after_close() {
    let (link, mut harness) = open_harness();
    link.transmit(&[1]).unwrap();
    assert!(wait_until(|| harness.evidence_len() == 1));

    harness.close().unwrap();
    let settled = harness.evidence_len();
    link.inject(vec![2u8]);
    link.inject(vec![3u8]);
    thread::sleep(TICK * 20);
    assert_eq!(harness.evidence_len(), settled);
    assert_eq!(link.pending_len(), 2);
}

#[test]
fn validity_and_polling_interleave() {
    let (link, mut harness) = open_harness();
    for seq in 0..50u8 {
        let case = Case::test(SequenceNumber::new(seq), vec![0xA7, seq, !seq]);
        harness.set_expected(&case);
        link.transmit(case.as_bytes()).unwrap();
        if seq % 3 == 0 {
            thread::sleep(TICK);
        }
        assert_eq!(harness.is_valid().unwrap(), Verdict::Valid, "case {seq}");
    }
}

#[test]
fn reset_while_polling() {
    let (link, mut harness) = open_harness();
    for _ in 0..10 {
        assert!(harness.reset().unwrap());
    }
    assert_eq!(link.opens(), 11);
    harness.set_expected(&Case::test(SequenceNumber::new(0), vec![1u8]));
    link.transmit(&[1]).unwrap();
    assert_eq!(harness.is_valid().unwrap(), Verdict::Valid);
}

#[test]
fn registry_builds_closed_harnesses() {
    for name in names() {
        let link: Arc<dyn Transceiver> = Arc::new(LoopbackTransceiver::new());
        let harness = create(name, link, &HarnessSettings::default()).unwrap();
        assert_eq!(harness.name(), *name);
        assert!(!harness.is_open());
    }
    let link: Arc<dyn Transceiver> = Arc::new(LoopbackTransceiver::new());
    assert!(matches!(
        create("serial-monitor", link, &HarnessSettings::default()),
        Err(HarnessError::Unknown { .. })
    ));
}

/// Loopback wrapper that records when the receiver is polled relative to
/// `rx_stop`.
struct Recording {
    inner: LoopbackTransceiver,
    stopping: AtomicBool,
    stopped: AtomicBool,
    receives_during_stop: AtomicUsize,
    receives_after_stop: AtomicUsize,
}

impl Recording {
    fn new() -> Self {
        Self {
            inner: LoopbackTransceiver::new(),
            stopping: AtomicBool::new(false),
            stopped: AtomicBool::new(false),
            receives_during_stop: AtomicUsize::new(0),
            receives_after_stop: AtomicUsize::new(0),
        }
    }
}

impl Transceiver for Recording {
    fn name(&self) -> &'static str {
        "recording"
    }

    fn open(&self) -> Result<(), LinkError> {
        self.inner.open()
    }

    fn close(&self) -> Result<(), LinkError> {
        self.inner.close()
    }

    fn is_running(&self) -> bool {
        self.inner.is_running()
    }

    fn transmit(&self, frame: &[u8]) -> Result<bool, LinkError> {
        self.inner.transmit(frame)
    }

    fn set_channel(&self, channel: Channel) -> Result<(), LinkError> {
        self.inner.set_channel(channel)
    }

    fn channel(&self) -> Option<Channel> {
        self.inner.channel()
    }

    fn status(&self) -> InterfaceStatus {
        self.inner.status()
    }

    fn supports_receive(&self) -> bool {
        true
    }

    fn rx_start(&self) -> Result<(), LinkError> {
        self.inner.rx_start()
    }

    fn rx_stop(&self) -> Result<(), LinkError> {
        self.stopping.store(true, Ordering::SeqCst);
        // Hold the receiver long enough for several poll ticks to land.
        thread::sleep(TICK * 10);
        let result = self.inner.rx_stop();
        self.stopping.store(false, Ordering::SeqCst);
        self.stopped.store(true, Ordering::SeqCst);
        result
    }

    fn receive_nonblocking(&self) -> Result<Option<Bytes>, LinkError> {
        if self.stopping.load(Ordering::SeqCst) {
            self.receives_during_stop.fetch_add(1, Ordering::SeqCst);
        }
        if self.stopped.load(Ordering::SeqCst) {
            self.receives_after_stop.fetch_add(1, Ordering::SeqCst);
        }
        self.inner.receive_nonblocking()
    }
}

#[test]
fn close_never_polls_a_stopping_receiver() {
    let link = Arc::new(Recording::new());
    let settings = HarnessSettings {
        tick: Duration::from_millis(1),
        ..HarnessSettings::default()
    };
    let mut harness = ReceivedFrameHarness::new(link.clone(), settings);
    harness.open().unwrap();
    link.transmit(&[7]).unwrap();
    assert!(wait_until(|| harness.evidence_len() == 1));

    harness.close().unwrap();
    thread::sleep(TICK * 5);
    assert!(link.stopped.load(Ordering::SeqCst));
    assert_eq!(link.receives_during_stop.load(Ordering::SeqCst), 0);
    assert_eq!(link.receives_after_stop.load(Ordering::SeqCst), 0);
}
