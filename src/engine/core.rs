//! AudioService: owner of the playback engine.
//!
//! One service owns at most one engine backend, created lazily on the first
//! call that needs it. A single mutex serializes every operation, including
//! lazy initialization and the wait inside `play_audio`, so no two calls ever
//! reach the engine at the same time. The engine is released on `shutdown()`
//! or when the service is dropped.

use std::fs::File;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread;
use std::time::Instant;

use crate::api::{DeviceList, EngineProperties};
use crate::config::{AppConfig, CompletionMode};
use crate::engine::backend::{
    AudioBackend, BackendFactory, CpalDeviceEnumerator, DeviceEnumerator, PlayingSound,
    RodioBackendFactory,
};
use crate::error::{log_playback_error, PlaybackError};

type EngineSlot = Option<Box<dyn AudioBackend>>;

/// Explicitly owned engine service shared by the FFI, bridge and CLI surfaces.
pub struct AudioService {
    config: AppConfig,
    factory: Arc<dyn BackendFactory>,
    devices: Arc<dyn DeviceEnumerator>,
    engine: Mutex<EngineSlot>,
}

impl AudioService {
    /// Create a service on the host audio stack with the configuration file
    /// named by `MINIPLAY_CONFIG` (or `miniplay.json`).
    pub fn new() -> Self {
        Self::from_config(AppConfig::load())
    }

    pub fn from_config(config: AppConfig) -> Self {
        Self::with_backends(
            config,
            Arc::new(RodioBackendFactory),
            Arc::new(CpalDeviceEnumerator),
        )
    }

    /// Create a service with injected engine and device backends.
    pub fn with_backends(
        config: AppConfig,
        factory: Arc<dyn BackendFactory>,
        devices: Arc<dyn DeviceEnumerator>,
    ) -> Self {
        Self {
            config,
            factory,
            devices,
            engine: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    // ========================================================================
    // LOCK HELPERS
    // ========================================================================

    fn lock_engine(&self) -> Result<MutexGuard<'_, EngineSlot>, PlaybackError> {
        self.engine.lock().map_err(|_| PlaybackError::LockPoisoned {
            component: "audio_engine".to_string(),
        })
    }

    fn ensure<'a>(
        &self,
        slot: &'a mut EngineSlot,
    ) -> Result<&'a mut Box<dyn AudioBackend>, PlaybackError> {
        let engine = match slot.take() {
            Some(engine) => engine,
            None => {
                tracing::info!("[AudioService] Creating audio engine");
                self.factory.create(&self.config.engine)?
            }
        };
        Ok(slot.insert(engine))
    }

    /// Run `op` against the engine under the lock, creating the engine first
    /// if needed. Errors are logged under `context`.
    fn with_engine<T>(
        &self,
        context: &str,
        op: impl FnOnce(&mut dyn AudioBackend) -> Result<T, PlaybackError>,
    ) -> Result<T, PlaybackError> {
        let result = self.lock_engine().and_then(|mut guard| {
            let engine = self.ensure(&mut guard)?;
            op(&mut **engine)
        });
        result.map_err(|err| {
            log_playback_error(&err, context);
            err
        })
    }

    // ========================================================================
    // LIFECYCLE
    // ========================================================================

    /// Whether an engine is currently live.
    pub fn is_initialized(&self) -> Result<bool, PlaybackError> {
        Ok(self.lock_engine()?.is_some())
    }

    /// Release the engine now instead of at drop.
    ///
    /// Returns `true` if an engine was live. The next operation that needs an
    /// engine creates a fresh one.
    pub fn shutdown(&self) -> Result<bool, PlaybackError> {
        let mut guard = self.lock_engine().map_err(|err| {
            log_playback_error(&err, "shutdown");
            err
        })?;
        let released = guard.take().is_some();
        if released {
            tracing::info!("[AudioService] Audio engine shut down");
        }
        Ok(released)
    }

    // ========================================================================
    // PLAYBACK
    // ========================================================================

    /// Play `file_path` to completion on the default output.
    ///
    /// `on_complete` is called exactly once with the completion message after
    /// the sound has been released and the engine lock dropped. It is not
    /// called when the operation fails.
    ///
    /// # Returns
    /// * `Ok("Playing: <path>")`
    ///
    /// # Errors
    /// - `InvalidArgument` for an empty path
    /// - `FileNotFound` when the path is not a readable file (no engine work happens)
    /// - `EngineInitFailed`, `SoundInitFailed`, `PlaybackStartFailed` from the engine
    pub fn play_audio<F>(&self, file_path: &str, on_complete: F) -> Result<String, PlaybackError>
    where
        F: FnOnce(&str),
    {
        if let Err(err) = self.play_to_completion(file_path) {
            log_playback_error(&err, "play_audio");
            return Err(err);
        }

        on_complete(&self.config.playback.completion_message);
        Ok(format!("Playing: {}", file_path))
    }

    fn play_to_completion(&self, file_path: &str) -> Result<(), PlaybackError> {
        probe_file(file_path)?;

        let mut guard = self.lock_engine()?;
        let engine = self.ensure(&mut guard)?;
        let mut sound = engine.start_sound(Path::new(file_path))?;
        tracing::info!("[AudioService] Playing {}", file_path);

        self.wait_for_completion(&*sound);
        sound.stop();
        drop(sound);

        tracing::debug!("[AudioService] Released sound for {}", file_path);
        Ok(())
    }

    fn wait_for_completion(&self, sound: &dyn PlayingSound) {
        let playback = &self.config.playback;
        match playback.completion {
            CompletionMode::FixedDelay => thread::sleep(playback.fixed_delay()),
            CompletionMode::UntilFinished => {
                let started = Instant::now();
                while !sound.is_finished() {
                    if let Some(max_wait) = playback.max_wait() {
                        if started.elapsed() >= max_wait {
                            tracing::warn!(
                                "[AudioService] Sound still playing after {:?}, stopping it",
                                max_wait
                            );
                            break;
                        }
                    }
                    thread::sleep(playback.poll_interval());
                }
            }
        }
    }

    // ========================================================================
    // DEVICES
    // ========================================================================

    /// List playback and capture devices.
    ///
    /// Serialized with the other operations but never creates the engine.
    /// With `devices.lenient_enumeration` a failure yields empty lists.
    pub fn get_devices(&self) -> Result<DeviceList, PlaybackError> {
        let result = self
            .lock_engine()
            .and_then(|_guard| self.devices.enumerate());

        match result {
            Ok(devices) => {
                tracing::debug!(
                    "[AudioService] Enumerated {} playback / {} capture devices",
                    devices.playback.len(),
                    devices.capture.len()
                );
                Ok(devices)
            }
            Err(err) if self.config.devices.lenient_enumeration => {
                tracing::warn!(
                    "[AudioService] Device enumeration failed, reporting no devices: {}",
                    err
                );
                Ok(DeviceList::default())
            }
            Err(err) => {
                log_playback_error(&err, "get_devices");
                Err(err)
            }
        }
    }

    // ========================================================================
    // CLOCK & VOLUME
    // ========================================================================

    pub fn get_time_in_pcm_frames(&self) -> Result<u64, PlaybackError> {
        self.with_engine("get_time_in_pcm_frames", |engine| {
            Ok(engine.time_in_pcm_frames())
        })
    }

    pub fn get_time_in_milliseconds(&self) -> Result<u64, PlaybackError> {
        self.with_engine("get_time_in_milliseconds", |engine| {
            Ok(engine.time_in_milliseconds())
        })
    }

    pub fn set_time_in_pcm_frames(&self, frames: u64) -> Result<(), PlaybackError> {
        self.with_engine("set_time_in_pcm_frames", |engine| {
            engine
                .set_time_in_pcm_frames(frames)
                .map_err(|_| PlaybackError::operation_failed("set time in PCM frames"))
        })
    }

    pub fn set_time_in_milliseconds(&self, millis: u64) -> Result<(), PlaybackError> {
        self.with_engine("set_time_in_milliseconds", |engine| {
            engine
                .set_time_in_milliseconds(millis)
                .map_err(|_| PlaybackError::operation_failed("set time in milliseconds"))
        })
    }

    pub fn get_channels(&self) -> Result<u32, PlaybackError> {
        self.with_engine("get_channels", |engine| Ok(engine.channels()))
    }

    pub fn get_sample_rate(&self) -> Result<u32, PlaybackError> {
        self.with_engine("get_sample_rate", |engine| Ok(engine.sample_rate()))
    }

    pub fn get_volume(&self) -> Result<f32, PlaybackError> {
        self.with_engine("get_volume", |engine| Ok(engine.volume()))
    }

    /// Set the master volume.
    ///
    /// 0.0 is silence and 1.0 unity gain; larger values amplify.
    ///
    /// # Errors
    /// - `InvalidArgument` for NaN, infinite or negative values
    /// - `OperationFailed` if the engine rejects the value
    pub fn set_volume(&self, volume: f32) -> Result<(), PlaybackError> {
        if !volume.is_finite() || volume < 0.0 {
            let err = PlaybackError::invalid_argument(format!(
                "Expected a finite, non-negative volume (got {})",
                volume
            ));
            log_playback_error(&err, "set_volume");
            return Err(err);
        }

        self.with_engine("set_volume", |engine| {
            engine
                .set_volume(volume)
                .map_err(|_| PlaybackError::operation_failed("set volume"))
        })
    }

    /// Format, clock and volume read under one lock acquisition.
    pub fn engine_properties(&self) -> Result<EngineProperties, PlaybackError> {
        self.with_engine("engine_properties", |engine| {
            Ok(EngineProperties {
                channels: engine.channels(),
                sample_rate: engine.sample_rate(),
                volume: engine.volume(),
                time_in_pcm_frames: engine.time_in_pcm_frames(),
                time_in_milliseconds: engine.time_in_milliseconds(),
            })
        })
    }
}

impl Default for AudioService {
    fn default() -> Self {
        Self::new()
    }
}

/// Readability probe run before any engine work.
fn probe_file(file_path: &str) -> Result<(), PlaybackError> {
    if file_path.is_empty() {
        return Err(PlaybackError::invalid_argument(
            "Expected a non-empty file path.",
        ));
    }

    let not_found = || PlaybackError::FileNotFound {
        path: file_path.to_string(),
    };
    let file = File::open(file_path).map_err(|_| not_found())?;
    match file.metadata() {
        Ok(metadata) if metadata.is_file() => Ok(()),
        _ => Err(not_found()),
    }
}

#[cfg(test)]
mod tests;
