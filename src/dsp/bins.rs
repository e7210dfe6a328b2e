//! Log-frequency binning of the smoothed spectrum into display columns, and
//! the dB-to-bar-height mapping.
//!
//! Columns partition [FREQ_MIN, FREQ_MAX) into equal log-width ranges,
//! inclusive lower edge, exclusive upper. A column whose range covers no FFT
//! bin averages to zero and renders empty; this keeps the display stable
//! across terminal widths.

use crate::constants::{DB_MAX, DB_MIN, FREQ_MAX, FREQ_MIN};

/// Floor added before the log so silent columns map to a finite -200 dB.
const DB_FLOOR: f32 = 1e-10;

pub struct LogBinner {
    averages: Vec<f32>,
}

impl LogBinner {
    pub fn new() -> Self {
        Self {
            averages: Vec::new(),
        }
    }

    /// Frequency range [start, end) of column `x` out of `width`.
    pub fn column_range(x: usize, width: usize) -> (f32, f32) {
        let log_min = FREQ_MIN.log10();
        let log_max = FREQ_MAX.log10();
        let span = log_max - log_min;
        let start = 10f32.powf(log_min + span * x as f32 / width as f32);
        let end = 10f32.powf(log_min + span * (x + 1) as f32 / width as f32);
        (start, end)
    }

    /// Average the spectrum into `width` columns. The output buffer is
    /// reused across ticks and only resized when the width changes.
    pub fn bin(&mut self, spectrum: &[f32], sample_rate: u32, width: usize) -> &[f32] {
        self.averages.resize(width, 0.0);
        let bin_hz = sample_rate as f32 / ((spectrum.len() - 1) * 2) as f32;

        for x in 0..width {
            let (f_start, f_end) = Self::column_range(x, width);
            let mut sum = 0.0f32;
            let mut count = 0u32;
            for (k, &mag) in spectrum.iter().enumerate() {
                let bin_freq = k as f32 * bin_hz;
                if bin_freq >= f_start && bin_freq < f_end {
                    sum += mag;
                    count += 1;
                }
            }
            self.averages[x] = if count > 0 { sum / count as f32 } else { 0.0 };
        }
        &self.averages
    }
}

/// Decibel value of a column average; -200 for a silent column.
pub fn to_db(avg: f32) -> f32 {
    20.0 * (avg + DB_FLOOR).log10()
}

/// Map a dB value onto [0, height] over the fixed display window,
/// truncating toward zero.
pub fn bar_height(db: f32, height: u16) -> u16 {
    let scaled = (db - DB_MIN) / (DB_MAX - DB_MIN) * height as f32;
    (scaled as i32).clamp(0, height as i32) as u16
}
