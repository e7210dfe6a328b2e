//! Audio input: capture device glue, channel downmixing, and the shared
//! sample ring between the capture callback and the analyzer.

pub mod capture;
pub mod downmix;
pub mod ring;

pub use capture::{Capture, CaptureError, StreamFault};
pub use downmix::Downmixer;
pub use ring::SampleRing;
