//! Analyzer worker: drives the spectrum pipeline at a fixed cadence.
//!
//! Each tick pulls the newest frame from the ring and runs
//! FFT → smooth → bin → dB map → differential render, in that order. The
//! smoother carries state across ticks, so ticks are not independent. A tick
//! that outruns the frame period is followed immediately by the next one;
//! there is no catch-up.

use std::io::{self, Write};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Instant;

use anyhow::{Context, Result};
use crossterm::terminal;

use crate::audio::{SampleRing, StreamFault};
use crate::constants::{FFT_SIZE, FRAME_PERIOD, SMOOTHING};
use crate::dsp::bins::{bar_height, to_db};
use crate::dsp::{FftStage, LogBinner, Smoother};
use crate::render::DiffRenderer;

pub struct Analyzer<W: Write> {
    ring: Arc<SampleRing>,
    sample_rate: u32,
    frame: Vec<f32>,
    fft: FftStage,
    smoother: Smoother,
    binner: LogBinner,
    heights: Vec<u16>,
    renderer: DiffRenderer<W>,
}

impl<W: Write> Analyzer<W> {
    pub fn new(ring: Arc<SampleRing>, sample_rate: u32, out: W) -> Self {
        Self {
            ring,
            sample_rate,
            frame: vec![0.0; FFT_SIZE],
            fft: FftStage::new(FFT_SIZE),
            smoother: Smoother::new(SMOOTHING),
            binner: LogBinner::new(),
            heights: Vec::new(),
            renderer: DiffRenderer::new(out),
        }
    }

    /// Run one analysis frame against the given display geometry.
    /// Skips silently while the ring is underfilled or the stream reports
    /// no sample rate.
    pub fn tick(&mut self, width: u16, height: u16) -> io::Result<()> {
        if self.sample_rate == 0 || width == 0 || height == 0 {
            return Ok(());
        }
        if !self.ring.snapshot(&mut self.frame) {
            return Ok(());
        }

        let magnitudes = self.fft.magnitudes(&self.frame);
        let smoothed = self.smoother.apply(magnitudes);
        let averages = self.binner.bin(smoothed, self.sample_rate, width as usize);

        self.heights.clear();
        self.heights
            .extend(averages.iter().map(|&avg| bar_height(to_db(avg), height)));
        self.renderer.draw(&self.heights, height)
    }

    /// Tick until `stop` is raised or the capture stream faults. Terminal
    /// failures and capture faults are fatal and returned to the caller.
    pub fn run(&mut self, stop: &AtomicBool, fault: &StreamFault) -> Result<()> {
        while !stop.load(Ordering::Relaxed) {
            if fault.is_raised() {
                return Err(fault.take()).context("capture stream failed");
            }

            let started = Instant::now();
            let (cols, rows) = terminal::size().context("terminal size unavailable")?;
            if cols >= 2 && rows >= 3 {
                self.tick(cols - 1, rows - 2)
                    .context("terminal write failed")?;
            }
            thread::sleep(FRAME_PERIOD.saturating_sub(started.elapsed()));
        }
        Ok(())
    }

    /// Leave the cursor below the display area before the process exits.
    pub fn park_cursor(&mut self, rows: u16) -> io::Result<()> {
        self.renderer.park_cursor(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::Downmixer;
    use crate::constants::{FREQ_MIN, RING_FACTOR};

    const FS: u32 = 44_100;
    const WIDTH: u16 = 80;
    const HEIGHT: u16 = 30;

    fn analyzer_with_ring() -> (Analyzer<Vec<u8>>, Arc<SampleRing>) {
        let ring = Arc::new(SampleRing::new(FFT_SIZE * RING_FACTOR));
        let analyzer = Analyzer::new(ring.clone(), FS, Vec::new());
        (analyzer, ring)
    }

    fn push_tone(ring: &SampleRing, freq: f32, amplitude: f32, count: usize) {
        for n in 0..count {
            let t = n as f32 / FS as f32;
            ring.push(amplitude * (2.0 * std::f32::consts::PI * freq * t).sin());
        }
    }

    fn heights(analyzer: &Analyzer<Vec<u8>>) -> Vec<u16> {
        analyzer.heights.clone()
    }

    #[test]
    fn test_underfilled_ring_skips_tick() {
        let (mut analyzer, ring) = analyzer_with_ring();
        for _ in 0..FFT_SIZE - 1 {
            ring.push(0.1);
        }

        analyzer.tick(WIDTH, HEIGHT).unwrap();
        assert!(analyzer.heights.is_empty());
        assert!(analyzer.renderer.sink().is_empty());
    }

    #[test]
    fn test_zero_sample_rate_skips_tick() {
        let ring = Arc::new(SampleRing::new(FFT_SIZE * RING_FACTOR));
        let mut analyzer = Analyzer::new(ring.clone(), 0, Vec::new());
        push_tone(&ring, 440.0, 0.5, 2 * FFT_SIZE);

        analyzer.tick(WIDTH, HEIGHT).unwrap();
        assert!(analyzer.renderer.sink().is_empty());
    }

    #[test]
    fn test_scenario_silence_renders_blank() {
        let (mut analyzer, ring) = analyzer_with_ring();
        for _ in 0..2 * FFT_SIZE {
            ring.push(0.0);
        }

        analyzer.tick(WIDTH, HEIGHT).unwrap();

        assert_eq!(heights(&analyzer), vec![0; WIDTH as usize]);
        // Every bar was already at zero, so nothing is painted.
        assert!(analyzer.renderer.sink().is_empty());
    }

    #[test]
    fn test_scenario_tone_peaks_in_matching_column() {
        let (mut analyzer, ring) = analyzer_with_ring();
        push_tone(&ring, 1000.0, 0.5, 4 * FFT_SIZE);

        // Let the smoother converge on the static ring content.
        for _ in 0..25 {
            analyzer.tick(WIDTH, HEIGHT).unwrap();
        }

        let h = heights(&analyzer);
        let nonzero: Vec<usize> = h
            .iter()
            .enumerate()
            .filter(|&(_, &v)| v > 0)
            .map(|(x, _)| x)
            .collect();
        assert!(!nonzero.is_empty());

        // Energy stays localized around the tone: columns well below and
        // well above 1 kHz (outside roughly 275 Hz..3.8 kHz here) stay dark.
        assert!(
            nonzero.iter().all(|&x| (30..60).contains(&x)),
            "leakage escaped the tone's neighborhood: {nonzero:?}"
        );

        // The tallest bar sits in (or right next to, when leakage ties two
        // columns) the column whose range contains 1 kHz.
        let peak = h.iter().enumerate().max_by_key(|&(_, &v)| v).unwrap().0;
        let tone_column = (0..WIDTH as usize)
            .find(|&x| {
                let (f_start, f_end) = LogBinner::column_range(x, WIDTH as usize);
                f_start <= 1000.0 && 1000.0 < f_end
            })
            .unwrap();
        assert!(
            peak.abs_diff(tone_column) <= 1,
            "peak at column {peak}, tone in column {tone_column}"
        );
        assert!(h[tone_column] > 0);
    }

    #[test]
    fn test_scenario_dc_offset_leaves_first_column_empty() {
        let (mut analyzer, ring) = analyzer_with_ring();
        for _ in 0..2 * FFT_SIZE {
            ring.push(1.0);
        }

        analyzer.tick(WIDTH, HEIGHT).unwrap();

        // Bin 0 sits at 0 Hz, below FREQ_MIN; column 0 covers [20, ~22) Hz
        // and holds no bin at all, so DC cannot leak into it.
        let (f_start, f_end) = LogBinner::column_range(0, WIDTH as usize);
        let bin_hz = FS as f32 / FFT_SIZE as f32;
        assert!(f_start >= FREQ_MIN && f_end < bin_hz);
        assert_eq!(heights(&analyzer)[0], 0);
    }

    #[test]
    fn test_scenario_stereo_downmix_cancels_to_silence() {
        let (mut analyzer, ring) = analyzer_with_ring();
        let mixer = Downmixer::new(ring, 2);

        let block: Vec<u8> = (0..2 * FFT_SIZE)
            .flat_map(|_| {
                let mut frame = 1.0f32.to_le_bytes().to_vec();
                frame.extend_from_slice(&(-1.0f32).to_le_bytes());
                frame
            })
            .collect();
        mixer.push_block(&block);

        analyzer.tick(WIDTH, HEIGHT).unwrap();
        assert_eq!(heights(&analyzer), vec![0; WIDTH as usize]);
        assert!(analyzer.renderer.sink().is_empty());
    }

    #[test]
    fn test_scenario_resize_repaints_from_zero() {
        let (mut analyzer, ring) = analyzer_with_ring();
        push_tone(&ring, 1000.0, 0.5, 4 * FFT_SIZE);

        for _ in 0..10 {
            analyzer.tick(WIDTH, HEIGHT).unwrap();
        }
        assert!(heights(&analyzer).iter().any(|&v| v > 0));

        // Terminal narrows; the next frame must diff against a fresh
        // zero state, not the stale 80-column heights.
        analyzer.renderer.sink_mut().clear();
        analyzer.tick(40, HEIGHT).unwrap();

        assert_eq!(analyzer.renderer.prev_heights().len(), 40);
        let text = String::from_utf8(analyzer.renderer.sink().clone()).unwrap();
        assert!(!text.contains(' '), "resize frame erased stale cells");
    }

    #[test]
    fn test_row_shrink_repaints_from_zero() {
        let (mut analyzer, ring) = analyzer_with_ring();
        // Full-scale tone so some bar reaches the display ceiling before
        // the terminal loses rows.
        push_tone(&ring, 1000.0, 1.0, 4 * FFT_SIZE);

        for _ in 0..10 {
            analyzer.tick(WIDTH, HEIGHT).unwrap();
        }
        assert_eq!(*heights(&analyzer).iter().max().unwrap(), HEIGHT);

        // Rows 32 -> 12 at constant width: stale 30-cell bars must not be
        // diffed against the 10-row display.
        analyzer.renderer.sink_mut().clear();
        analyzer.tick(WIDTH, 10).unwrap();

        assert!(heights(&analyzer).iter().all(|&v| v <= 10));
        let text = String::from_utf8(analyzer.renderer.sink().clone()).unwrap();
        assert!(!text.contains(' '), "shrink frame erased stale cells");
    }

    #[test]
    fn test_scenario_saturating_tone_clamps_to_height() {
        let (mut analyzer, ring) = analyzer_with_ring();
        // A full-scale tone puts its column far above DB_MAX.
        push_tone(&ring, 1000.0, 1.0, 4 * FFT_SIZE);

        for _ in 0..30 {
            analyzer.tick(WIDTH, HEIGHT).unwrap();
            let h = heights(&analyzer);
            assert!(h.iter().all(|&v| v <= HEIGHT));
        }
        assert_eq!(*heights(&analyzer).iter().max().unwrap(), HEIGHT);
    }

    #[test]
    fn test_identical_ticks_render_once() {
        let (mut analyzer, ring) = analyzer_with_ring();
        push_tone(&ring, 500.0, 0.25, 2 * FFT_SIZE);

        // Converge, then confirm a steady frame emits nothing new.
        for _ in 0..40 {
            analyzer.tick(WIDTH, HEIGHT).unwrap();
        }
        analyzer.renderer.sink_mut().clear();
        analyzer.tick(WIDTH, HEIGHT).unwrap();
        assert!(analyzer.renderer.sink().is_empty());
    }
}
