//! Rodio-based playback backend for desktop platforms (Linux, macOS, Windows)
//!
//! rodio's `OutputStream` is not `Send`, so it lives on a dedicated thread for
//! the lifetime of the backend. The mixer handle, the sinks created from it
//! and the engine clock are shared with the caller. Dropping the backend
//! signals that thread and joins it, which closes the device.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::mpsc;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use cpal::traits::{DeviceTrait, HostTrait};
use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink, Source};

use super::{AudioBackend, BackendFactory, DeviceEnumerator, PlayingSound};
use crate::api::{DeviceInfo, DeviceList};
use crate::config::EngineConfig;
use crate::engine::clock::{ClockSource, EngineClock};
use crate::error::PlaybackError;

/// Placeholder used when the host cannot report a device name
pub const UNKNOWN_DEVICE_NAME: &str = "Unknown device";

/// How often a playing sound re-reads the master volume
const VOLUME_REFRESH: Duration = Duration::from_millis(10);

/// Opens [`RodioBackend`] instances on the host's output device
#[derive(Debug, Default, Clone, Copy)]
pub struct RodioBackendFactory;

impl BackendFactory for RodioBackendFactory {
    fn create(&self, config: &EngineConfig) -> Result<Box<dyn AudioBackend>, PlaybackError> {
        Ok(Box::new(RodioBackend::open(config)?))
    }
}

/// Format negotiated with the output device
struct OutputFormat {
    device_name: String,
    sample_rate: u32,
    channels: u16,
}

/// Live output stream with master volume and clock
pub struct RodioBackend {
    handle: OutputStreamHandle,
    clock: Arc<EngineClock>,
    volume: Arc<AtomicU32>,
    device_name: String,
    shutdown_tx: Option<mpsc::Sender<()>>,
    stream_thread: Option<JoinHandle<()>>,
}

impl RodioBackend {
    /// Open the configured (or default) output device and start the clock
    pub fn open(config: &EngineConfig) -> Result<Self, PlaybackError> {
        let (ready_tx, ready_rx) = mpsc::channel();
        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>();
        let requested = config.output_device.clone();

        let stream_thread = thread::Builder::new()
            .name("miniplay-output".to_string())
            .spawn(move || match open_output_stream(requested.as_deref()) {
                Ok((stream, handle, format)) => {
                    if ready_tx.send(Ok((handle, format))).is_err() {
                        return;
                    }
                    // Parked until the backend drops its sender.
                    let _ = shutdown_rx.recv();
                    drop(stream);
                    tracing::debug!("[RodioBackend] Output stream closed");
                }
                Err(err) => {
                    let _ = ready_tx.send(Err(err));
                }
            })
            .map_err(|e| PlaybackError::EngineInitFailed {
                reason: format!("Failed to spawn output thread: {}", e),
            })?;

        let opened = ready_rx.recv().unwrap_or_else(|_| {
            Err(PlaybackError::EngineInitFailed {
                reason: "Output thread exited before opening the stream".to_string(),
            })
        });

        let (handle, format) = match opened {
            Ok(opened) => opened,
            Err(err) => {
                let _ = stream_thread.join();
                return Err(err);
            }
        };

        let clock = Arc::new(EngineClock::new(format.sample_rate, format.channels));
        let backend = Self {
            handle,
            clock: Arc::clone(&clock),
            volume: Arc::new(AtomicU32::new(initial_volume(config).to_bits())),
            device_name: format.device_name,
            shutdown_tx: Some(shutdown_tx),
            stream_thread: Some(stream_thread),
        };

        // On failure `backend` drops here and joins the output thread.
        backend
            .handle
            .play_raw(ClockSource::new(clock))
            .map_err(|e| PlaybackError::EngineInitFailed {
                reason: format!("Failed to attach engine clock: {}", e),
            })?;

        tracing::info!(
            "[RodioBackend] Engine started on '{}' ({} Hz, {} channels)",
            backend.device_name,
            backend.clock.sample_rate(),
            backend.clock.channels()
        );
        Ok(backend)
    }

    pub fn device_name(&self) -> &str {
        &self.device_name
    }
}

impl Drop for RodioBackend {
    fn drop(&mut self) {
        self.shutdown_tx.take();
        if let Some(thread) = self.stream_thread.take() {
            if thread.join().is_err() {
                tracing::error!("[RodioBackend] Output thread panicked during shutdown");
            }
        }
        tracing::info!("[RodioBackend] Engine released ({})", self.device_name);
    }
}

impl AudioBackend for RodioBackend {
    fn start_sound(&mut self, path: &Path) -> Result<Box<dyn PlayingSound>, PlaybackError> {
        let file = File::open(path).map_err(|e| PlaybackError::SoundInitFailed {
            reason: format!("{}: {}", path.display(), e),
        })?;
        let decoder =
            Decoder::new(BufReader::new(file)).map_err(|e| PlaybackError::SoundInitFailed {
                reason: format!("{}: {}", path.display(), e),
            })?;

        let volume = Arc::clone(&self.volume);
        let source = decoder
            .convert_samples::<f32>()
            .amplify(load_volume(&self.volume))
            .periodic_access(VOLUME_REFRESH, move |amplify| {
                amplify.set_factor(load_volume(&volume))
            });

        let sink = Sink::try_new(&self.handle).map_err(|e| PlaybackError::PlaybackStartFailed {
            reason: e.to_string(),
        })?;
        sink.append(source);
        sink.play();

        Ok(Box::new(RodioSound { sink }))
    }

    fn time_in_pcm_frames(&self) -> u64 {
        self.clock.time_in_pcm_frames()
    }

    fn set_time_in_pcm_frames(&mut self, frames: u64) -> Result<(), PlaybackError> {
        self.clock.set_time_in_pcm_frames(frames);
        Ok(())
    }

    fn time_in_milliseconds(&self) -> u64 {
        self.clock.time_in_milliseconds()
    }

    fn set_time_in_milliseconds(&mut self, millis: u64) -> Result<(), PlaybackError> {
        self.clock.set_time_in_milliseconds(millis);
        Ok(())
    }

    fn channels(&self) -> u32 {
        u32::from(self.clock.channels())
    }

    fn sample_rate(&self) -> u32 {
        self.clock.sample_rate()
    }

    fn volume(&self) -> f32 {
        load_volume(&self.volume)
    }

    fn set_volume(&mut self, volume: f32) -> Result<(), PlaybackError> {
        self.volume.store(volume.to_bits(), Ordering::Relaxed);
        Ok(())
    }
}

/// Sound queued on its own sink; dropping the sink stops it
struct RodioSound {
    sink: Sink,
}

impl PlayingSound for RodioSound {
    fn is_finished(&self) -> bool {
        self.sink.empty()
    }

    fn stop(&mut self) {
        self.sink.stop();
    }
}

/// Lists devices of the default cpal host
#[derive(Debug, Default, Clone, Copy)]
pub struct CpalDeviceEnumerator;

impl DeviceEnumerator for CpalDeviceEnumerator {
    fn enumerate(&self) -> Result<DeviceList, PlaybackError> {
        let host = cpal::default_host();

        let playback = host
            .output_devices()
            .map_err(|e| PlaybackError::DeviceEnumerationFailed {
                reason: format!("playback devices: {}", e),
            })?
            .map(|device| device_info(&device))
            .collect();

        let capture = host
            .input_devices()
            .map_err(|e| PlaybackError::DeviceEnumerationFailed {
                reason: format!("capture devices: {}", e),
            })?
            .map(|device| device_info(&device))
            .collect();

        Ok(DeviceList { playback, capture })
    }
}

fn device_info(device: &cpal::Device) -> DeviceInfo {
    DeviceInfo {
        name: device
            .name()
            .unwrap_or_else(|_| UNKNOWN_DEVICE_NAME.to_string()),
    }
}

fn open_output_stream(
    requested: Option<&str>,
) -> Result<(OutputStream, OutputStreamHandle, OutputFormat), PlaybackError> {
    let host = cpal::default_host();
    let device = select_output_device(&host, requested)?;
    let device_name = device
        .name()
        .unwrap_or_else(|_| UNKNOWN_DEVICE_NAME.to_string());

    let config = device
        .default_output_config()
        .map_err(|e| PlaybackError::EngineInitFailed {
            reason: format!("Failed to get default output config: {}", e),
        })?;

    let format = OutputFormat {
        device_name,
        sample_rate: config.sample_rate().0,
        channels: config.channels(),
    };

    let (stream, handle) = OutputStream::try_from_device_config(&device, config).map_err(|e| {
        PlaybackError::EngineInitFailed {
            reason: format!("Failed to open output stream: {}", e),
        }
    })?;

    Ok((stream, handle, format))
}

fn select_output_device(
    host: &cpal::Host,
    requested: Option<&str>,
) -> Result<cpal::Device, PlaybackError> {
    if let Some(name) = requested {
        let found = host
            .output_devices()
            .ok()
            .and_then(|mut devices| devices.find(|d| d.name().map(|n| n == name).unwrap_or(false)));
        match found {
            Some(device) => return Ok(device),
            None => tracing::warn!(
                "[RodioBackend] Output device '{}' not found, using host default",
                name
            ),
        }
    }

    host.default_output_device()
        .ok_or_else(|| PlaybackError::EngineInitFailed {
            reason: "No default output device found".to_string(),
        })
}

fn initial_volume(config: &EngineConfig) -> f32 {
    let volume = config.initial_volume;
    if volume.is_finite() && volume >= 0.0 {
        volume
    } else {
        tracing::warn!(
            "[RodioBackend] Ignoring invalid initial volume {}, using 1.0",
            volume
        );
        1.0
    }
}

fn load_volume(volume: &AtomicU32) -> f32 {
    f32::from_bits(volume.load(Ordering::Relaxed))
}
