//! Background poller that drains the receive interface into the evidence
//! queue.
//!
//! # Lifecycle
//!
//! 1. [`Poller::spawn`] starts the thread.
//! 2. Every tick the thread drains the interface unless the access gate is
//!    held, in which case the tick is skipped.
//! 3. [`Poller::stop`] signals the thread and joins it. The thread observes
//!    the signal within one tick, and nothing touches the interface or the
//!    queue after `stop` returns.

use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::time::Duration;

use sidelobe_io::{LinkError, Transceiver};
use tracing::{debug, warn};

use crate::{AccessGate, EvidenceQueue, HarnessError};

/// State shared between a harness and its poller thread.
pub(crate) struct Shared {
    pub(crate) link: Arc<dyn Transceiver>,
    pub(crate) evidence: EvidenceQueue,
    pub(crate) gate: AccessGate,
}

impl Shared {
    /// Moves every frame currently waiting on the interface into the queue.
    ///
    /// The caller must hold the gate. Frames received before an error stay
    /// queued.
    pub(crate) fn drain(&self) -> Result<usize, LinkError> {
        let mut drained = 0;
        while let Some(frame) = self.link.receive_nonblocking()? {
            self.evidence.push(frame);
            drained += 1;
        }
        Ok(drained)
    }

    fn tick(&self) {
        let Some(_guard) = self.gate.try_acquire() else {
            debug!("interface reserved, skipping poll tick");
            return;
        };
        match self.drain() {
            Ok(0) => {}
            Ok(drained) => debug!(drained, queued = self.evidence.len(), "polled frames"),
            Err(error) => warn!(%error, "poll failed, treating tick as empty"),
        }
    }
}

pub(crate) struct Poller {
    shutdown: Option<Sender<()>>,
    handle: Option<thread::JoinHandle<()>>,
}

impl Poller {
    pub(crate) fn spawn(shared: Arc<Shared>, tick: Duration) -> Result<Self, HarnessError> {
        let (shutdown, signal) = mpsc::channel();
        let handle = thread::Builder::new()
            .name("sidelobe-poller".to_string())
            .spawn(move || Self::poll_loop(&shared, &signal, tick))
            .map_err(|source| HarnessError::Spawn { source })?;
        Ok(Self {
            shutdown: Some(shutdown),
            handle: Some(handle),
        })
    }

    fn poll_loop(shared: &Shared, signal: &Receiver<()>, tick: Duration) {
        debug!(tick_ms = tick.as_millis() as u64, "poller started");
        loop {
            match signal.recv_timeout(tick) {
                Err(RecvTimeoutError::Timeout) => shared.tick(),
                Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
            }
        }
        debug!("poller stopped");
    }

    /// Signals the thread and waits for it to exit. Safe to call twice.
    pub(crate) fn stop(&mut self) {
        // Dropping the sender wakes the thread immediately.
        drop(self.shutdown.take());
        let Some(handle) = self.handle.take() else {
            return;
        };
        if handle.join().is_err() {
            warn!("poller thread panicked");
        }
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        self.stop();
    }
}
