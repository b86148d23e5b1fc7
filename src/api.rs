// Public API for flutter_rust_bridge integration
// This module provides FFI functions for the host to drive the playback engine

#![allow(dead_code)] // FFI functions are called from Dart, not detected by Rust analyzer

use anyhow::Result;
use flutter_rust_bridge::DartFnFuture;
use once_cell::sync::Lazy;

use crate::engine::AudioService;
use crate::error::PlaybackError;

mod types;

pub use types::{DeviceInfo, DeviceKind, DeviceList, EngineProperties};

// Re-export error code constants for FFI exposure
pub use crate::error::PlaybackErrorCodes;

/// Process-wide service used by the FFI surface.
///
/// The service itself is an ordinary owned object (see [`AudioService`]);
/// only this FFI edge keeps it in a global, because host calls carry no
/// receiver. The engine inside is created on the first call that needs it
/// and can be released early with [`shutdown_engine`].
static SERVICE: Lazy<AudioService> = Lazy::new(AudioService::new);

/// Get the version of the playback bridge
#[flutter_rust_bridge::frb(sync)]
pub fn get_version() -> Result<String> {
    Ok(env!("CARGO_PKG_VERSION").to_string())
}

/// Install the tracing subscriber for host-side diagnostics
///
/// Safe to call more than once; later calls are ignored.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging() {
    crate::init_logging();
}

/// Play an audio file to completion
///
/// Blocks the bridge worker running this future until the engine has drained
/// the sound, so a long clip holds that worker for its whole length. Set
/// `playback.max_wait_ms` to bound the wait. Afterwards the sound is released
/// and `on_complete` is awaited once with the completion message.
///
/// # Arguments
/// * `file_path` - Path to a file in a format the decoder supports
/// * `on_complete` - Host callback receiving the completion message
///
/// # Returns
/// * `Ok("Playing: <file_path>")`
///
/// # Errors
/// - `InvalidArgument` for an empty path
/// - `FileNotFound` when the path is not a readable file
/// - `EngineInitFailed`, `SoundInitFailed`, `PlaybackStartFailed`
///
/// `on_complete` is not called when an error is returned.
#[flutter_rust_bridge::frb]
pub async fn play_audio(
    file_path: String,
    on_complete: impl Fn(String) -> DartFnFuture<()>,
) -> Result<String, PlaybackError> {
    let (started, message) = play_and_collect(&SERVICE, &file_path)?;
    on_complete(message).await;
    Ok(started)
}

/// Run playback on `service` and hand back the result string together with
/// the completion message for the host callback.
fn play_and_collect(
    service: &AudioService,
    file_path: &str,
) -> Result<(String, String), PlaybackError> {
    let mut message = String::new();
    let started = service.play_audio(file_path, |msg| message = msg.to_string())?;
    Ok((started, message))
}

/// List playback and capture devices by name
///
/// # Errors
/// - `DeviceEnumerationFailed` unless lenient enumeration is configured
#[flutter_rust_bridge::frb(sync)]
pub fn get_devices() -> Result<DeviceList, PlaybackError> {
    SERVICE.get_devices()
}

/// Engine clock in PCM frames
#[flutter_rust_bridge::frb(sync)]
pub fn get_time_in_pcm_frames() -> Result<u64, PlaybackError> {
    SERVICE.get_time_in_pcm_frames()
}

/// Engine clock in milliseconds
#[flutter_rust_bridge::frb(sync)]
pub fn get_time_in_milliseconds() -> Result<u64, PlaybackError> {
    SERVICE.get_time_in_milliseconds()
}

/// Move the engine clock to `frames`
#[flutter_rust_bridge::frb(sync)]
pub fn set_time_in_pcm_frames(frames: u64) -> Result<(), PlaybackError> {
    SERVICE.set_time_in_pcm_frames(frames)
}

/// Move the engine clock to `millis`
#[flutter_rust_bridge::frb(sync)]
pub fn set_time_in_milliseconds(millis: u64) -> Result<(), PlaybackError> {
    SERVICE.set_time_in_milliseconds(millis)
}

/// Output channel count
#[flutter_rust_bridge::frb(sync)]
pub fn get_channels() -> Result<u32, PlaybackError> {
    SERVICE.get_channels()
}

/// Output sample rate in Hz
#[flutter_rust_bridge::frb(sync)]
pub fn get_sample_rate() -> Result<u32, PlaybackError> {
    SERVICE.get_sample_rate()
}

/// Set the master volume (1.0 is unity gain, larger values amplify)
///
/// # Errors
/// - `InvalidArgument` for NaN, infinite or negative values
/// - `OperationFailed` if the engine rejects the value
#[flutter_rust_bridge::frb(sync)]
pub fn set_volume(volume: f32) -> Result<(), PlaybackError> {
    SERVICE.set_volume(volume)
}

/// Current master volume
#[flutter_rust_bridge::frb(sync)]
pub fn get_volume() -> Result<f32, PlaybackError> {
    SERVICE.get_volume()
}

/// Channels, sample rate, volume and clock in one call
#[flutter_rust_bridge::frb(sync)]
pub fn get_engine_properties() -> Result<EngineProperties, PlaybackError> {
    SERVICE.engine_properties()
}

/// Release the engine and its output device now
///
/// Returns `true` if an engine was running. Later calls start a new engine.
#[flutter_rust_bridge::frb(sync)]
pub fn shutdown_engine() -> Result<bool, PlaybackError> {
    SERVICE.shutdown()
}
