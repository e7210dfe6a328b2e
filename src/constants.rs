//! Tunable compile-time constants for the analyzer.
//!
//! The dB window is tuned against the 2/N magnitude normalization applied in
//! `dsp::fft`; changing one without the other shifts every bar on screen.

use std::time::Duration;

/// Number of time-domain samples per FFT frame. Must be a power of two.
pub const FFT_SIZE: usize = 1024;

/// Ring capacity as a multiple of `FFT_SIZE`. The headroom lets a snapshot
/// finish well before the capture callback wraps around to overwrite it.
pub const RING_FACTOR: usize = 10;

/// Target frame period of the analyzer worker (~60 Hz).
pub const FRAME_PERIOD: Duration = Duration::from_millis(16);

/// One-pole IIR smoothing factor; higher means more inertia.
pub const SMOOTHING: f32 = 0.4;

/// Lower edge of the displayed frequency range (Hz).
pub const FREQ_MIN: f32 = 20.0;

/// Upper edge of the displayed frequency range (Hz).
pub const FREQ_MAX: f32 = 22_000.0;

/// Bottom of the fixed dB display window; anything quieter renders empty.
pub const DB_MIN: f32 = -85.0;

/// Top of the fixed dB display window; anything louder clamps to full height.
pub const DB_MAX: f32 = -25.0;

/// Glyph drawn for one cell of a bar (U+2506, dotted vertical).
pub const BAR_GLYPH: char = '┆';
