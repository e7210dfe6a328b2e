//! Latest-wins sample ring shared between the capture callback and the
//! analyzer worker.
//!
//! Strict single-producer / single-consumer, no locks. The write counter is
//! monotonic and published with release ordering after the slot store, so a
//! reader that observes `W` also observes every slot written before it. The
//! producer is allowed to overwrite samples mid-snapshot; a torn frame is an
//! acceptable glitch for visualization, and because slots hold `f32` bit
//! patterns in `AtomicU32`, a torn read still yields valid floats.

use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};

pub struct SampleRing {
    slots: Box<[AtomicU32]>,
    written: AtomicU64,
}

impl SampleRing {
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0);
        let slots = (0..capacity).map(|_| AtomicU32::new(0)).collect();
        Self {
            slots,
            written: AtomicU64::new(0),
        }
    }

    /// Store one sample and advance the write counter. Never blocks, never
    /// fails; called from the audio callback, so it must stay allocation-free.
    pub fn push(&self, sample: f32) {
        let w = self.written.load(Ordering::Relaxed);
        let slot = (w % self.slots.len() as u64) as usize;
        self.slots[slot].store(sample.to_bits(), Ordering::Relaxed);
        self.written.store(w + 1, Ordering::Release);
    }

    /// Copy the newest `out.len()` samples into `out`, oldest first.
    /// Returns false while fewer than `out.len()` samples have been written.
    pub fn snapshot(&self, out: &mut [f32]) -> bool {
        let n = out.len() as u64;
        let w = self.written.load(Ordering::Acquire);
        if w < n {
            return false;
        }
        let cap = self.slots.len() as u64;
        let start = w - n;
        for (i, sample) in out.iter_mut().enumerate() {
            let slot = ((start + i as u64) % cap) as usize;
            *sample = f32::from_bits(self.slots[slot].load(Ordering::Relaxed));
        }
        true
    }
}
