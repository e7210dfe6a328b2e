//! Downmixer from interleaved capture blocks to mono ring samples.
//!
//! The capture collaborator delivers contiguous byte blocks of interleaved
//! IEEE-754 32-bit little-endian frames. Each frame is averaged across
//! channels and pushed to the sample ring. The downmixer depends only on the
//! byte-block contract, not on how the capture backend invokes it.

use std::sync::Arc;

use log::debug;

use super::ring::SampleRing;

const BYTES_PER_SAMPLE: usize = std::mem::size_of::<f32>();

pub struct Downmixer {
    ring: Arc<SampleRing>,
    channels: usize,
}

impl Downmixer {
    pub fn new(ring: Arc<SampleRing>, channels: usize) -> Self {
        assert!(channels > 0, "capture stream reported zero channels");
        Self { ring, channels }
    }

    /// Downmix one capture block into the ring. A tail shorter than a full
    /// frame is truncated and the stream continues at the next block.
    pub fn push_block(&self, block: &[u8]) {
        let frame_bytes = BYTES_PER_SAMPLE * self.channels;
        let remainder = block.len() % frame_bytes;
        if remainder != 0 {
            debug!("capture block misaligned, dropping {remainder} tail bytes");
        }

        for frame in block[..block.len() - remainder].chunks_exact(frame_bytes) {
            let mut sum = 0.0f32;
            for channel in frame.chunks_exact(BYTES_PER_SAMPLE) {
                sum += f32::from_le_bytes(channel.try_into().unwrap());
            }
            self.ring.push(sum / self.channels as f32);
        }
    }
}
