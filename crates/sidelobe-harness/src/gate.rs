//! Exclusive-access gate for the receive interface.
//!
//! Advisory: the poller uses [`AccessGate::try_acquire`] and skips its tick
//! when the gate is held. Synchronous operations on the orchestrator thread
//! use [`AccessGate::acquire`], which waits out an in-flight poll so every
//! frame the poller already took off the interface is queued first.

use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

#[derive(Debug, Default)]
pub struct AccessGate {
    held: AtomicBool,
}

/// Releases the gate on drop.
#[derive(Debug)]
pub struct GateGuard<'a> {
    gate: &'a AccessGate,
}

impl AccessGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes the gate if it is free.
    pub fn try_acquire(&self) -> Option<GateGuard<'_>> {
        self.held
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .ok()
            .map(|_| GateGuard { gate: self })
    }

    /// Takes the gate, yielding until the current holder releases it.
    pub fn acquire(&self) -> GateGuard<'_> {
        loop {
            if let Some(guard) = self.try_acquire() {
                return guard;
            }
            thread::yield_now();
        }
    }

    pub fn is_held(&self) -> bool {
        self.held.load(Ordering::Acquire)
    }
}

impl Drop for GateGuard<'_> {
    fn drop(&mut self) {
        self.gate.held.store(false, Ordering::Release);
    }
}
