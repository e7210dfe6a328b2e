mod analyzer;
mod audio;
mod constants;
mod dsp;
mod render;

use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use crossterm::event::{self, Event, KeyEventKind};
use crossterm::terminal;

use crate::analyzer::Analyzer;
use crate::audio::{Capture, SampleRing, StreamFault};
use crate::constants::{FFT_SIZE, RING_FACTOR};

/// Restores the terminal mode on every exit path, including panics.
struct RawModeGuard;

impl RawModeGuard {
    fn enable() -> Result<Self> {
        terminal::enable_raw_mode().context("failed to enable raw terminal mode")?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

fn main() -> Result<()> {
    // Diagnostics go to stderr only; stdout belongs to the display.
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("error")).init();

    let ring = Arc::new(SampleRing::new(FFT_SIZE * RING_FACTOR));
    let fault = Arc::new(StreamFault::default());
    let capture =
        Capture::start(ring.clone(), fault.clone()).context("cannot start audio capture")?;

    println!("Press any key to exit...");
    let _raw = RawModeGuard::enable()?;

    let stop = Arc::new(AtomicBool::new(false));
    let worker = {
        let ring = ring.clone();
        let stop = stop.clone();
        let fault = fault.clone();
        let sample_rate = capture.sample_rate();
        thread::spawn(move || -> Result<()> {
            let mut analyzer = Analyzer::new(ring, sample_rate, io::stdout());
            let result = analyzer.run(&stop, &fault);
            // Leave the cursor below the bars so shell output (or our own
            // diagnostic) does not land inside the display.
            if let Ok((_, rows)) = terminal::size() {
                let _ = analyzer.park_cursor(rows);
            }
            result
        })
    };

    // Block on a keypress; bail out early if the worker dies on a capture
    // fault or terminal failure.
    while !worker.is_finished() {
        if event::poll(Duration::from_millis(100)).context("keyboard poll failed")? {
            match event::read().context("keyboard read failed")? {
                Event::Key(key) if key.kind == KeyEventKind::Press => break,
                _ => {}
            }
        }
    }

    // Shutdown order: stop the worker first, then the capture stream.
    stop.store(true, Ordering::Relaxed);
    let worker_result = match worker.join() {
        Ok(result) => result,
        Err(_) => Err(anyhow!("analyzer thread panicked")),
    };
    drop(capture);

    worker_result
}
