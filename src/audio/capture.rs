//! Audio capture via cpal.
//!
//! Prefers a loopback/monitor source (the system output mix) when one is
//! exposed as an input device, falling back to the default input. The stream
//! callback only downmixes into the sample ring; errors raised inside the
//! callback are parked in a shared [`StreamFault`] for the analyzer to
//! observe, never propagated by unwinding.

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{BuildStreamError, Device, PlayStreamError, SampleFormat, StreamConfig};
use log::debug;
use thiserror::Error;

use super::downmix::Downmixer;
use super::ring::SampleRing;

#[derive(Error, Debug)]
pub enum CaptureError {
    #[error("no audio capture device available")]
    DeviceUnavailable,
    #[error("device has no default input config: {0}")]
    NoConfig(#[from] cpal::DefaultStreamConfigError),
    #[error("unsupported sample format {0:?} (32-bit float required)")]
    UnsupportedFormat(SampleFormat),
    #[error("failed to build capture stream: {0}")]
    Build(#[from] BuildStreamError),
    #[error("failed to start capture stream: {0}")]
    Play(#[from] PlayStreamError),
    #[error("capture stream error: {0}")]
    Stream(String),
}

/// Fatal mid-stream fault recorded by the capture error callback and polled
/// by the analyzer each tick.
#[derive(Default)]
pub struct StreamFault {
    raised: AtomicBool,
    message: Mutex<String>,
}

impl StreamFault {
    pub fn raise(&self, message: String) {
        if let Ok(mut slot) = self.message.lock() {
            *slot = message;
        }
        self.raised.store(true, Ordering::Release);
    }

    pub fn is_raised(&self) -> bool {
        self.raised.load(Ordering::Acquire)
    }

    pub fn take(&self) -> CaptureError {
        let message = self
            .message
            .lock()
            .map(|slot| slot.clone())
            .unwrap_or_default();
        CaptureError::Stream(message)
    }
}

/// A running capture stream feeding the sample ring. Capture stops when this
/// is dropped.
pub struct Capture {
    _stream: cpal::Stream,
    sample_rate: u32,
}

impl Capture {
    /// Open the capture device and start delivering samples to `ring`.
    pub fn start(ring: Arc<SampleRing>, fault: Arc<StreamFault>) -> Result<Self, CaptureError> {
        let host = cpal::default_host();
        let device = pick_device(&host).ok_or(CaptureError::DeviceUnavailable)?;
        debug!(
            "capture device: {}",
            device.name().unwrap_or_else(|_| "<unknown>".into())
        );

        let supported = device.default_input_config()?;
        if supported.sample_format() != SampleFormat::F32 {
            return Err(CaptureError::UnsupportedFormat(supported.sample_format()));
        }
        let config: StreamConfig = supported.into();
        let sample_rate = config.sample_rate.0;
        let channels = config.channels;
        debug!("capture config: {sample_rate} Hz, {channels} channels");

        let downmixer = Downmixer::new(ring, channels as usize);
        let stream = device.build_input_stream(
            &config,
            move |data: &[f32], _: &cpal::InputCallbackInfo| {
                downmixer.push_block(bytemuck::cast_slice(data));
            },
            move |err| fault.raise(err.to_string()),
            None,
        )?;
        stream.play()?;

        Ok(Self {
            _stream: stream,
            sample_rate,
        })
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }
}

/// Prefer a monitor source (PulseAudio/PipeWire expose the output mix as
/// `<sink>.monitor`), otherwise take the default input device.
fn pick_device(host: &cpal::Host) -> Option<Device> {
    if let Ok(devices) = host.input_devices() {
        for device in devices {
            if let Ok(name) = device.name() {
                if name.ends_with(".monitor") {
                    return Some(device);
                }
            }
        }
    }
    host.default_input_device()
}
