//! Real-time duplex audio stream built on CPAL
//!
//! The input callback ships captured buffers over a bounded channel; the
//! output callback pulls the next buffer, runs it through the equalizer
//! engine and writes the result, filling silence on underrun. The engine is
//! owned by the output callback, so all chain state stays on the audio
//! thread.

use crate::audio::engine::EqEngine;
use contour_core::domain::audio::{AudioError, Result, StreamConfig};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Stream, StreamConfig as CpalStreamConfig};
use crossbeam::channel::{bounded, Receiver, Sender};
use tracing::{error, info};

/// Audio buffer containing interleaved samples
pub type AudioBuffer = Vec<f32>;

/// Running duplex stream: capture, equalize, play back
pub struct EqStream {
    _input: Stream,
    _output: Stream,
    config: StreamConfig,
}

impl EqStream {
    /// Build and start the duplex stream
    ///
    /// Device names are matched by substring; `None` picks the default
    /// device on either side.
    pub fn duplex(
        input_name: Option<&str>,
        output_name: Option<&str>,
        config: &StreamConfig,
        mut engine: EqEngine,
    ) -> Result<Self> {
        let host = cpal::default_host();
        let input_device = find_device(&host, input_name, true)?;
        let output_device = find_device(&host, output_name, false)?;

        #[allow(deprecated)]
        {
            info!(
                input = input_device.name().unwrap_or_else(|_| "unknown".to_string()),
                output = output_device.name().unwrap_or_else(|_| "unknown".to_string()),
                sample_rate = config.sample_rate.hz(),
                channels = config.channels.count(),
                "Starting duplex equalizer stream"
            );
        }

        let (sender, receiver): (Sender<AudioBuffer>, Receiver<AudioBuffer>) = bounded(8);

        let cpal_config = CpalStreamConfig {
            channels: config.channels.count(),
            sample_rate: config.sample_rate.hz(),
            buffer_size: cpal::BufferSize::Fixed(config.buffer_size),
        };

        let input = input_device
            .build_input_stream(
                &cpal_config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    // Dropped when the output side is behind; it will fill
                    // silence rather than block here.
                    let _ = sender.try_send(data.to_vec());
                },
                |err| error!("Input stream error: {}", err),
                None,
            )
            .map_err(|e| AudioError::StreamError(format!("Failed to build input stream: {}", e)))?;

        let output = output_device
            .build_output_stream(
                &cpal_config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    match receiver.try_recv() {
                        Ok(mut buffer) => {
                            engine.process_block(&mut buffer);

                            let len = data.len().min(buffer.len());
                            data[..len].copy_from_slice(&buffer[..len]);
                            if len < data.len() {
                                data[len..].fill(0.0);
                            }
                        }
                        Err(_) => {
                            // No captured data available, output silence
                            data.fill(0.0);
                        }
                    }
                },
                |err| error!("Output stream error: {}", err),
                None,
            )
            .map_err(|e| AudioError::StreamError(format!("Failed to build output stream: {}", e)))?;

        input
            .play()
            .map_err(|e| AudioError::StreamError(format!("Failed to start input stream: {}", e)))?;
        output
            .play()
            .map_err(|e| AudioError::StreamError(format!("Failed to start output stream: {}", e)))?;

        Ok(Self {
            _input: input,
            _output: output,
            config: config.clone(),
        })
    }

    pub fn config(&self) -> &StreamConfig {
        &self.config
    }
}

/// Pick a device by name substring, falling back to the host default
#[allow(deprecated)]
fn find_device(host: &cpal::Host, name: Option<&str>, input: bool) -> Result<cpal::Device> {
    match name {
        Some(name) => host
            .devices()
            .map_err(|e| AudioError::OsError(e.to_string()))?
            .find(|d| d.name().map(|n| n.contains(name)).unwrap_or(false))
            .ok_or_else(|| AudioError::DeviceNotFound(name.to_string())),
        None => {
            let device = if input {
                host.default_input_device()
            } else {
                host.default_output_device()
            };
            device.ok_or_else(|| {
                AudioError::DeviceNotFound(
                    if input { "no default input device" } else { "no default output device" }
                        .to_string(),
                )
            })
        }
    }
}
