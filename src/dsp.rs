//! The spectrum pipeline: windowed FFT, temporal smoothing, and
//! log-frequency binning with dB mapping.

pub mod bins;
pub mod fft;
pub mod smooth;

pub use bins::LogBinner;
pub use fft::FftStage;
pub use smooth::Smoother;
