//! Audio output device abstraction.
//!
//! The scheduler treats the device as a fire-and-forget sink: buffers
//! queued here play back-to-back on the device's own thread, and nothing
//! ever waits on or queries that thread.

use cpal::traits::{DeviceTrait, HostTrait};
use rodio::buffer::SamplesBuffer;
use rodio::{OutputStream, OutputStreamHandle, Sink};

use crate::error::{JukeboxError, Result};

/// Sequential, asynchronous audio sink.
pub trait OutputDevice {
    /// Rate the device was opened at. Checked against the beat store
    /// before playback starts.
    fn sample_rate(&self) -> u32;

    /// Queue one interleaved buffer behind everything already queued.
    /// Returns once the buffer is enqueued, not once it has played.
    fn queue(&mut self, buffer: &[f32]) -> Result<()>;

    /// Stop playback and drop anything still queued.
    fn stop(&mut self);
}

/// System audio output backed by a rodio sink. Appended sources play
/// gaplessly in append order, which is exactly the queueing contract the
/// scheduler needs.
pub struct RodioOutput {
    _stream: OutputStream,
    _handle: OutputStreamHandle,
    sink: Sink,
    sample_rate: u32,
    channels: u16,
}

impl RodioOutput {
    pub fn open(sample_rate: u32, channels: u16) -> Result<Self> {
        let (stream, handle) = OutputStream::try_default()
            .map_err(|e| JukeboxError::Output(format!("failed to open audio output: {e}")))?;
        let sink = Sink::try_new(&handle)
            .map_err(|e| JukeboxError::Output(format!("failed to create audio sink: {e}")))?;

        log::info!(
            "audio output open on '{}' at {} Hz, {} channel(s)",
            default_device_name(),
            sample_rate,
            channels
        );

        Ok(Self {
            _stream: stream,
            _handle: handle,
            sink,
            sample_rate,
            channels,
        })
    }
}

impl OutputDevice for RodioOutput {
    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn queue(&mut self, buffer: &[f32]) -> Result<()> {
        self.sink.append(SamplesBuffer::new(
            self.channels,
            self.sample_rate,
            buffer.to_vec(),
        ));
        Ok(())
    }

    fn stop(&mut self) {
        self.sink.stop();
    }
}

/// Name of the default output device, for startup diagnostics.
pub fn default_device_name() -> String {
    cpal::default_host()
        .default_output_device()
        .and_then(|d| d.name().ok())
        .unwrap_or_else(|| "default".to_string())
}
