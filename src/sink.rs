//! Pull-driven audio output.
//!
//! [`AudioSink`] is the seam to the audio output device: the device asks for
//! samples on its own schedule, the application never pushes on a schedule of
//! its own. [`CpalSink`] implements the seam with cpal against the default
//! output device, dispatching on the device's native sample format at
//! runtime.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{FromSample, SampleFormat, SizedSample};

use crate::error::PlaybackError;

/// Callback that fills a buffer of interleaved signed 16-bit samples.
///
/// Invoked from the audio device's own execution context, which may preempt
/// at arbitrary times. Underrun is the callee's concern (silence back-fill),
/// never an error.
pub type SamplePull = Box<dyn FnMut(&mut [i16]) + Send + 'static>;

/// Pull-driven audio output device.
pub trait AudioSink: Send {
    /// Opens the device for the given format and starts pulling samples.
    fn open(
        &mut self,
        sample_rate: u32,
        channels: u16,
        pull: SamplePull,
    ) -> Result<(), PlaybackError>;

    /// Stops the device and releases it. Idempotent.
    fn close(&mut self);
}

/// cpal-backed [`AudioSink`].
///
/// The output stream is kept alive for the lifetime of the open; closing or
/// dropping the sink stops audio.
#[derive(Default)]
pub struct CpalSink {
    stream: Option<cpal::Stream>,
}

impl CpalSink {
    /// Creates a sink with no device open yet.
    pub fn new() -> Self {
        Self { stream: None }
    }
}

impl AudioSink for CpalSink {
    fn open(
        &mut self,
        sample_rate: u32,
        channels: u16,
        pull: SamplePull,
    ) -> Result<(), PlaybackError> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| PlaybackError::Device("no audio output device available".into()))?;

        let supported = device
            .default_output_config()
            .map_err(|e| PlaybackError::Device(format!("failed to get output config: {e}")))?;
        let sample_format = supported.sample_format();

        let config = cpal::StreamConfig {
            channels,
            sample_rate,
            buffer_size: cpal::BufferSize::Default,
        };

        let stream = build_stream(&device, &config, sample_format, pull)?;
        stream
            .play()
            .map_err(|e| PlaybackError::Device(format!("failed to start audio stream: {e}")))?;

        tracing::info!(sample_rate, channels, ?sample_format, "audio sink opened");
        self.stream = Some(stream);
        Ok(())
    }

    fn close(&mut self) {
        if let Some(stream) = self.stream.take() {
            let _ = stream.pause();
            drop(stream);
            tracing::debug!("audio sink closed");
        }
    }
}

impl Drop for CpalSink {
    fn drop(&mut self) {
        self.close();
    }
}

fn build_stream(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    sample_format: SampleFormat,
    pull: SamplePull,
) -> Result<cpal::Stream, PlaybackError> {
    match sample_format {
        SampleFormat::I8 => build_stream_typed::<i8>(device, config, pull),
        SampleFormat::I16 => build_stream_typed::<i16>(device, config, pull),
        SampleFormat::I32 => build_stream_typed::<i32>(device, config, pull),
        SampleFormat::U8 => build_stream_typed::<u8>(device, config, pull),
        SampleFormat::U16 => build_stream_typed::<u16>(device, config, pull),
        SampleFormat::U32 => build_stream_typed::<u32>(device, config, pull),
        SampleFormat::F32 => build_stream_typed::<f32>(device, config, pull),
        SampleFormat::F64 => build_stream_typed::<f64>(device, config, pull),
        other => Err(PlaybackError::Device(format!(
            "unsupported output sample format: {other:?}"
        ))),
    }
}

fn build_stream_typed<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    mut pull: SamplePull,
) -> Result<cpal::Stream, PlaybackError>
where
    T: SizedSample + FromSample<f32>,
{
    let mut scratch: Vec<i16> = Vec::new();

    let stream = device
        .build_output_stream(
            config,
            move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                scratch.resize(data.len(), 0);
                pull(&mut scratch);
                for (out, &sample) in data.iter_mut().zip(scratch.iter()) {
                    // normalize to [-1, 1] before converting to the device format
                    *out = T::from_sample(f32::from(sample) / 32768.0);
                }
            },
            |err| tracing::error!("cpal audio error: {err}"),
            None,
        )
        .map_err(|e| PlaybackError::Device(format!("failed to build cpal stream: {e}")))?;

    Ok(stream)
}
