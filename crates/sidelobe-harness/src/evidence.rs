//! Bounded evidence queue with drop-oldest overflow.
//!
//! Uses `crossbeam-queue::ArrayQueue`, so the poller thread can push while
//! the orchestrator thread pops. When the queue is full the oldest unread
//! frame is discarded and counted: evidence for a case the orchestrator has
//! moved past has no value.

use std::sync::atomic::{AtomicU64, Ordering};

use bytes::Bytes;
use crossbeam_queue::ArrayQueue;
use tracing::debug;

/// FIFO of received frames awaiting a match decision.
#[derive(Debug)]
pub struct EvidenceQueue {
    inner: ArrayQueue<Bytes>,
    dropped: AtomicU64,
}

impl EvidenceQueue {
    /// # Panics
    ///
    /// Panics if `capacity` is 0.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "evidence capacity must be positive");
        Self {
            inner: ArrayQueue::new(capacity),
            dropped: AtomicU64::new(0),
        }
    }

    /// Appends a frame, evicting the oldest one if the queue is full.
    ///
    /// Returns the evicted frame.
    pub fn push(&self, frame: Bytes) -> Option<Bytes> {
        let evicted = self.inner.force_push(frame)?;
        let dropped = self.dropped.fetch_add(1, Ordering::Relaxed) + 1;
        debug!(len = evicted.len(), dropped, "evidence queue full, dropped oldest frame");
        Some(evicted)
    }

    pub fn pop(&self) -> Option<Bytes> {
        self.inner.pop()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.inner.capacity()
    }

    /// Frames evicted on overflow since creation.
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}
