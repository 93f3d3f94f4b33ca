//! Over-the-air evidence: is the target still sending what we expect?

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use sidelobe_io::{LinkError, Transceiver};
use sidelobe_types::{Case, Verdict};
use tracing::{debug, info, warn};

use crate::poller::{Poller, Shared};
use crate::{EvidenceQueue, Harness, HarnessError, MatchMode};

const NAME: &str = "received-frame";

/// Tuning for [`ReceivedFrameHarness`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HarnessSettings {
    /// Poll interval; also how quickly `close` takes effect.
    pub tick: Duration,
    pub queue_capacity: usize,
    pub match_mode: MatchMode,
}

impl Default for HarnessSettings {
    fn default() -> Self {
        Self {
            tick: Duration::from_millis(50),
            queue_capacity: 1024,
            match_mode: MatchMode::default(),
        }
    }
}

/// Watches a receive interface for the expected frame.
///
/// While open, a poller thread drains the interface into a bounded
/// evidence queue every tick. [`Harness::is_valid`] forces one more drain,
/// then consumes queued frames until one matches the expectation.
/// [`Harness::reset`] cycles the interface with the poller locked out.
pub struct ReceivedFrameHarness {
    shared: Arc<Shared>,
    settings: HarnessSettings,
    expectation: Option<Bytes>,
    poller: Option<Poller>,
}

impl ReceivedFrameHarness {
    /// # Panics
    ///
    /// Panics if `settings.queue_capacity` is 0.
    pub fn new(link: Arc<dyn Transceiver>, settings: HarnessSettings) -> Self {
        Self {
            shared: Arc::new(Shared {
                link,
                evidence: EvidenceQueue::new(settings.queue_capacity),
                gate: crate::AccessGate::new(),
            }),
            settings,
            expectation: None,
            poller: None,
        }
    }

    pub fn settings(&self) -> &HarnessSettings {
        &self.settings
    }

    /// Frames currently awaiting a match decision.
    pub fn evidence_len(&self) -> usize {
        self.shared.evidence.len()
    }

    pub fn expectation(&self) -> Option<&[u8]> {
        self.expectation.as_deref()
    }

    fn drain_now(&self) -> Result<usize, LinkError> {
        let _guard = self.shared.gate.acquire();
        self.shared.drain()
    }

    fn cycle_link(&self) -> Result<(), LinkError> {
        let link = &self.shared.link;
        link.rx_stop()?;
        link.close()?;
        link.open()?;
        link.rx_start()
    }
}

impl Harness for ReceivedFrameHarness {
    fn name(&self) -> &'static str {
        NAME
    }

    /// Opens the interface if needed, enables its receiver and starts the
    /// poller.
    fn open(&mut self) -> Result<(), HarnessError> {
        if self.poller.is_some() {
            return Ok(());
        }
        let link = &self.shared.link;
        if !link.supports_receive() {
            return Err(HarnessError::ReceiveUnsupported {
                interface: link.name(),
            });
        }
        if !link.is_running() {
            link.open()?;
        }
        link.rx_start()?;
        self.poller = Some(Poller::spawn(Arc::clone(&self.shared), self.settings.tick)?);
        info!(interface = link.name(), tick_ms = self.settings.tick.as_millis() as u64, "harness open");
        Ok(())
    }

    /// Joins the poller, then stops the receiver under the gate.
    fn close(&mut self) -> Result<(), HarnessError> {
        let Some(mut poller) = self.poller.take() else {
            return Ok(());
        };
        poller.stop();
        let stopped = {
            let _guard = self.shared.gate.acquire();
            self.shared.link.rx_stop()
        };
        info!(dropped = self.shared.evidence.dropped(), "harness closed");
        Ok(stopped?)
    }

    fn is_open(&self) -> bool {
        self.poller.is_some()
    }

    fn set_expected(&mut self, case: &Case) {
        debug!(expected = %case.to_hex(), "expecting frame");
        self.expectation = Some(case.bytes());
    }

    fn is_valid(&mut self) -> Result<Verdict, HarnessError> {
        let expected = self.expectation.as_ref().ok_or(HarnessError::NoExpectation)?;
        self.drain_now()?;

        let mode = self.settings.match_mode;
        let mut discarded = 0usize;
        while let Some(frame) = self.shared.evidence.pop() {
            if mode.matches(&frame, expected) {
                debug!(discarded, remaining = self.shared.evidence.len(), "expected frame observed");
                return Ok(Verdict::Valid);
            }
            discarded += 1;
        }
        debug!(discarded, "expected frame not observed");
        Ok(Verdict::Invalid)
    }

    /// The check is reliable, so invalid is exactly not-valid.
    fn is_invalid(&mut self) -> Result<Verdict, HarnessError> {
        Ok(self.is_valid()?.negate())
    }

    fn supports_reset(&self) -> bool {
        true
    }

    fn reset(&mut self) -> Result<bool, HarnessError> {
        let _guard = self.shared.gate.acquire();
        warn!(interface = self.shared.link.name(), "resetting receive interface");
        match self.cycle_link() {
            Ok(()) => {
                info!("reset complete");
                Ok(true)
            }
            Err(error) => {
                warn!(%error, "reset failed");
                Ok(false)
            }
        }
    }

    fn dropped_evidence(&self) -> u64 {
        self.shared.evidence.dropped()
    }
}

impl Drop for ReceivedFrameHarness {
    fn drop(&mut self) {
        if let Err(error) = self.close() {
            warn!(%error, "error closing harness on drop");
        }
    }
}
