//! Backend abstractions for the playback engine.

use std::path::Path;

use crate::api::DeviceList;
use crate::config::EngineConfig;
use crate::error::PlaybackError;

/// A live engine instance: output stream, master volume and clock.
///
/// Implementations are owned by [`crate::engine::AudioService`], which
/// serializes every call behind one lock.
pub trait AudioBackend: Send {
    /// Create a sound for `path` and start it on the output.
    fn start_sound(&mut self, path: &Path) -> Result<Box<dyn PlayingSound>, PlaybackError>;

    fn time_in_pcm_frames(&self) -> u64;
    fn set_time_in_pcm_frames(&mut self, frames: u64) -> Result<(), PlaybackError>;
    fn time_in_milliseconds(&self) -> u64;
    fn set_time_in_milliseconds(&mut self, millis: u64) -> Result<(), PlaybackError>;

    fn channels(&self) -> u32;
    fn sample_rate(&self) -> u32;

    fn volume(&self) -> f32;
    fn set_volume(&mut self, volume: f32) -> Result<(), PlaybackError>;
}

/// A sound started by [`AudioBackend::start_sound`].
///
/// Dropping the sound releases it; `stop` cuts playback immediately.
pub trait PlayingSound: Send {
    /// True once the engine has rendered the whole sound.
    fn is_finished(&self) -> bool;
    fn stop(&mut self);
}

/// Creates engine instances on demand.
pub trait BackendFactory: Send + Sync {
    fn create(&self, config: &EngineConfig) -> Result<Box<dyn AudioBackend>, PlaybackError>;
}

/// Lists devices through a short-lived host context.
pub trait DeviceEnumerator: Send + Sync {
    fn enumerate(&self) -> Result<DeviceList, PlaybackError>;
}

mod rodio;
pub use self::rodio::{CpalDeviceEnumerator, RodioBackend, RodioBackendFactory};

mod stub;
pub use stub::{StubBackend, StubBackendFactory, StubDeviceEnumerator, StubProbe, StubSettings};
