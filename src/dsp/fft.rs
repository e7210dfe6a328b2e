//! Hann-windowed FFT stage producing a magnitude spectrum.

use std::sync::Arc;

use rustfft::num_complex::Complex;
use rustfft::{Fft, FftPlanner};

/// Symmetric Hann window: w(n) = 0.5 * (1 - cos(2πn / (N-1))).
/// Zero at both endpoints.
pub fn hann_window(len: usize) -> Vec<f32> {
    let denom = (len - 1) as f32;
    (0..len)
        .map(|n| 0.5 * (1.0 - (2.0 * std::f32::consts::PI * n as f32 / denom).cos()))
        .collect()
}

/// One FFT frame worth of state: precomputed window, plan, and scratch
/// buffers. Everything is allocated once so `magnitudes` is allocation-free
/// on the tick path.
pub struct FftStage {
    fft: Arc<dyn Fft<f32>>,
    window: Vec<f32>,
    buffer: Vec<Complex<f32>>,
    scratch: Vec<Complex<f32>>,
    magnitudes: Vec<f32>,
    scale: f32,
}

impl FftStage {
    pub fn new(fft_size: usize) -> Self {
        let fft = FftPlanner::new().plan_fft_forward(fft_size);
        let scratch = vec![Complex::default(); fft.get_inplace_scratch_len()];
        Self {
            fft,
            window: hann_window(fft_size),
            buffer: vec![Complex::default(); fft_size],
            scratch,
            magnitudes: vec![0.0; fft_size / 2 + 1],
            // rustfft is unnormalized; 2/N keeps a unit sine near 0 dBFS so
            // the fixed dB display window keeps its tuning.
            scale: 2.0 / fft_size as f32,
        }
    }

    pub fn fft_size(&self) -> usize {
        self.window.len()
    }

    /// Window the frame, transform it, and return the N/2 + 1 bin magnitudes.
    /// The scale factor is identical every call.
    pub fn magnitudes(&mut self, frame: &[f32]) -> &[f32] {
        debug_assert_eq!(frame.len(), self.window.len());
        for ((out, &sample), &w) in self.buffer.iter_mut().zip(frame).zip(&self.window) {
            *out = Complex::new(sample * w, 0.0);
        }
        self.fft
            .process_with_scratch(&mut self.buffer, &mut self.scratch);
        for (mag, bin) in self.magnitudes.iter_mut().zip(&self.buffer) {
            *mag = bin.norm() * self.scale;
        }
        &self.magnitudes
    }
}
