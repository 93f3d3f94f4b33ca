//! In-memory loopback interface.
//!
//! Every frame transmitted while the receiver is enabled is echoed into the
//! interface's own receive buffer. An [`EchoFault`] policy can corrupt
//! selected echoes, which is how harness and orchestrator behaviour under a
//! misbehaving target is exercised without a radio.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use bytes::Bytes;
use sidelobe_types::Channel;
use tracing::debug;

use crate::{InterfaceStatus, LinkError, Transceiver};

const NAME: &str = "loopback";

/// Decides which echoes come back corrupted.
pub trait EchoFault: Send {
    /// `echo` counts every echo since the interface was created, starting at
    /// zero, corrupted or not.
    fn corrupt(&mut self, echo: u64, frame: &[u8]) -> bool;
}

impl<F> EchoFault for F
where
    F: FnMut(u64, &[u8]) -> bool + Send,
{
    fn corrupt(&mut self, echo: u64, frame: &[u8]) -> bool {
        self(echo, frame)
    }
}

/// Corrupts echoes `offset`, `offset + n`, `offset + 2n`, ...
#[derive(Debug, Clone, Copy)]
pub struct CorruptEveryNth {
    n: u64,
    offset: u64,
}

impl CorruptEveryNth {
    /// # Panics
    ///
    /// Panics if `n` is 0.
    pub fn new(n: u64, offset: u64) -> Self {
        assert!(n > 0, "corruption period must be positive");
        Self {
            n,
            offset: offset % n,
        }
    }
}

impl EchoFault for CorruptEveryNth {
    fn corrupt(&mut self, echo: u64, _frame: &[u8]) -> bool {
        echo % self.n == self.offset
    }
}

/// Inverts the second half of a frame, so a corrupted echo never contains
/// the transmitted frame.
fn corrupted(frame: &[u8]) -> Bytes {
    let mut bytes = frame.to_vec();
    let half = bytes.len() / 2;
    for b in &mut bytes[half..] {
        *b ^= 0xFF;
    }
    Bytes::from(bytes)
}

struct State {
    running: bool,
    receiving: bool,
    channel: Channel,
    pending: VecDeque<Bytes>,
    fault: Option<Box<dyn EchoFault>>,
    echoes: u64,
    receive_failures: u32,
}

/// Loopback transceiver. See the module documentation.
pub struct LoopbackTransceiver {
    state: Mutex<State>,
    opens: AtomicU64,
    transmitted: AtomicU64,
}

impl LoopbackTransceiver {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State {
                running: false,
                receiving: false,
                channel: Channel::default(),
                pending: VecDeque::new(),
                fault: None,
                echoes: 0,
                receive_failures: 0,
            }),
            opens: AtomicU64::new(0),
            transmitted: AtomicU64::new(0),
        }
    }

    /// Installs an echo fault policy.
    pub fn with_fault(self, fault: impl EchoFault + 'static) -> Self {
        self.state().fault = Some(Box::new(fault));
        self
    }

    /// Makes the next `count` receive calls fail with a device error.
    pub fn fail_receives(&self, count: u32) {
        self.state().receive_failures = count;
    }

    /// Queues a frame on the receive path as if it had arrived over the air.
    pub fn inject(&self, frame: impl Into<Bytes>) {
        self.state().pending.push_back(frame.into());
    }

    /// How many times the interface has been opened.
    pub fn opens(&self) -> u64 {
        self.opens.load(Ordering::SeqCst)
    }

    /// Frames accepted for transmission.
    pub fn transmitted(&self) -> u64 {
        self.transmitted.load(Ordering::SeqCst)
    }

    /// Frames waiting on the receive path.
    pub fn pending_len(&self) -> usize {
        self.state().pending.len()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for LoopbackTransceiver {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for LoopbackTransceiver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoopbackTransceiver")
            .field("opens", &self.opens())
            .field("transmitted", &self.transmitted())
            .finish_non_exhaustive()
    }
}

impl Transceiver for LoopbackTransceiver {
    fn name(&self) -> &'static str {
        NAME
    }

    fn open(&self) -> Result<(), LinkError> {
        let mut state = self.state();
        if !state.running {
            state.running = true;
            self.opens.fetch_add(1, Ordering::SeqCst);
        }
        Ok(())
    }

    /// Stops the interface and discards anything not yet received.
    fn close(&self) -> Result<(), LinkError> {
        let mut state = self.state();
        state.running = false;
        state.receiving = false;
        state.pending.clear();
        Ok(())
    }

    fn is_running(&self) -> bool {
        self.state().running
    }

    fn transmit(&self, frame: &[u8]) -> Result<bool, LinkError> {
        let mut state = self.state();
        if !state.running {
            return Ok(false);
        }
        self.transmitted.fetch_add(1, Ordering::SeqCst);
        if !state.receiving {
            return Ok(true);
        }

        let echo = state.echoes;
        state.echoes += 1;
        let corrupt = state
            .fault
            .as_mut()
            .is_some_and(|fault| fault.corrupt(echo, frame));
        let bytes = if corrupt {
            debug!(echo, len = frame.len(), "corrupting echoed frame");
            corrupted(frame)
        } else {
            Bytes::copy_from_slice(frame)
        };
        state.pending.push_back(bytes);
        Ok(true)
    }

    fn set_channel(&self, channel: Channel) -> Result<(), LinkError> {
        self.state().channel = channel;
        Ok(())
    }

    fn channel(&self) -> Option<Channel> {
        Some(self.state().channel)
    }

    fn status(&self) -> InterfaceStatus {
        let state = self.state();
        InterfaceStatus {
            name: NAME.to_string(),
            driver: "in-memory echo".to_string(),
            running: state.running,
            channel: Some(state.channel),
            freq_hz: Some(state.channel.frequency_hz()),
            tx_gain: None,
        }
    }

    fn supports_receive(&self) -> bool {
        true
    }

    fn rx_start(&self) -> Result<(), LinkError> {
        let mut state = self.state();
        if !state.running {
            return Err(LinkError::NotOpen { interface: NAME });
        }
        state.receiving = true;
        Ok(())
    }

    fn rx_stop(&self) -> Result<(), LinkError> {
        self.state().receiving = false;
        Ok(())
    }

    fn receive_nonblocking(&self) -> Result<Option<Bytes>, LinkError> {
        let mut state = self.state();
        if !state.running {
            return Err(LinkError::NotOpen { interface: NAME });
        }
        if state.receive_failures > 0 {
            state.receive_failures -= 1;
            return Err(LinkError::Device {
                interface: NAME,
                reason: "injected receive failure".to_string(),
            });
        }
        Ok(state.pending.pop_front())
    }
}
