use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use super::{AudioBackend, BackendFactory, DeviceEnumerator, PlayingSound};
use crate::api::{DeviceInfo, DeviceList};
use crate::config::EngineConfig;
use crate::engine::clock::EngineClock;
use crate::error::PlaybackError;

/// Behaviour of engines created by [`StubBackendFactory`].
#[derive(Debug, Clone)]
pub struct StubSettings {
    pub sample_rate: u32,
    pub channels: u16,
    /// How long every stub sound "plays" before it reports finished
    pub sound_duration: Duration,
    pub fail_init: bool,
    pub fail_sound_init: bool,
    pub fail_start: bool,
    pub fail_setters: bool,
}

impl Default for StubSettings {
    fn default() -> Self {
        Self {
            sample_rate: 48_000,
            channels: 2,
            sound_duration: Duration::from_millis(20),
            fail_init: false,
            fail_sound_init: false,
            fail_start: false,
            fail_setters: false,
        }
    }
}

/// Lifecycle counters shared between a factory, its engines and their sounds.
#[derive(Debug, Default)]
pub struct StubProbe {
    engines_created: AtomicUsize,
    engines_released: AtomicUsize,
    sounds_started: AtomicUsize,
    sounds_released: AtomicUsize,
}

impl StubProbe {
    pub fn engines_created(&self) -> usize {
        self.engines_created.load(Ordering::SeqCst)
    }

    pub fn engines_released(&self) -> usize {
        self.engines_released.load(Ordering::SeqCst)
    }

    pub fn sounds_started(&self) -> usize {
        self.sounds_started.load(Ordering::SeqCst)
    }

    pub fn sounds_released(&self) -> usize {
        self.sounds_released.load(Ordering::SeqCst)
    }
}

/// Factory for hardware-free engines, used by tests and `miniplay --stub`.
#[derive(Default)]
pub struct StubBackendFactory {
    settings: StubSettings,
    probe: Arc<StubProbe>,
}

impl StubBackendFactory {
    pub fn new(settings: StubSettings) -> Self {
        Self {
            settings,
            probe: Arc::new(StubProbe::default()),
        }
    }

    pub fn probe(&self) -> Arc<StubProbe> {
        Arc::clone(&self.probe)
    }
}

impl BackendFactory for StubBackendFactory {
    fn create(&self, config: &EngineConfig) -> Result<Box<dyn AudioBackend>, PlaybackError> {
        if self.settings.fail_init {
            return Err(PlaybackError::EngineInitFailed {
                reason: "stub engine configured to fail".to_string(),
            });
        }
        self.probe.engines_created.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(StubBackend {
            clock: EngineClock::new(self.settings.sample_rate, self.settings.channels),
            volume: config.initial_volume,
            settings: self.settings.clone(),
            probe: Arc::clone(&self.probe),
        }))
    }
}

/// Engine without audio I/O.
///
/// The clock only moves when set, which keeps clock reads deterministic.
pub struct StubBackend {
    clock: EngineClock,
    volume: f32,
    settings: StubSettings,
    probe: Arc<StubProbe>,
}

impl StubBackend {
    fn check_setter(&self, operation: &str) -> Result<(), PlaybackError> {
        if self.settings.fail_setters {
            return Err(PlaybackError::operation_failed(operation));
        }
        Ok(())
    }
}

impl Drop for StubBackend {
    fn drop(&mut self) {
        self.probe.engines_released.fetch_add(1, Ordering::SeqCst);
    }
}

impl AudioBackend for StubBackend {
    fn start_sound(&mut self, path: &Path) -> Result<Box<dyn PlayingSound>, PlaybackError> {
        if self.settings.fail_sound_init {
            return Err(PlaybackError::SoundInitFailed {
                reason: format!("{}: unsupported format", path.display()),
            });
        }
        if self.settings.fail_start {
            return Err(PlaybackError::PlaybackStartFailed {
                reason: "stub output refused the sound".to_string(),
            });
        }

        self.probe.sounds_started.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(StubSound {
            started: Instant::now(),
            duration: self.settings.sound_duration,
            stopped: false,
            probe: Arc::clone(&self.probe),
        }))
    }

    fn time_in_pcm_frames(&self) -> u64 {
        self.clock.time_in_pcm_frames()
    }

    fn set_time_in_pcm_frames(&mut self, frames: u64) -> Result<(), PlaybackError> {
        self.check_setter("set time in PCM frames")?;
        self.clock.set_time_in_pcm_frames(frames);
        Ok(())
    }

    fn time_in_milliseconds(&self) -> u64 {
        self.clock.time_in_milliseconds()
    }

    fn set_time_in_milliseconds(&mut self, millis: u64) -> Result<(), PlaybackError> {
        self.check_setter("set time in milliseconds")?;
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
        self.volume
    }

    fn set_volume(&mut self, volume: f32) -> Result<(), PlaybackError> {
        self.check_setter("set volume")?;
        self.volume = volume;
        Ok(())
    }
}

struct StubSound {
    started: Instant,
    duration: Duration,
    stopped: bool,
    probe: Arc<StubProbe>,
}

impl PlayingSound for StubSound {
    fn is_finished(&self) -> bool {
        self.stopped || self.started.elapsed() >= self.duration
    }

    fn stop(&mut self) {
        self.stopped = true;
    }
}

impl Drop for StubSound {
    fn drop(&mut self) {
        self.probe.sounds_released.fetch_add(1, Ordering::SeqCst);
    }
}

/// Fixed device list, or a fixed failure.
pub struct StubDeviceEnumerator {
    result: Result<DeviceList, PlaybackError>,
}

impl StubDeviceEnumerator {
    pub fn with_devices(playback: &[&str], capture: &[&str]) -> Self {
        let to_infos = |names: &[&str]| -> Vec<DeviceInfo> {
            names
                .iter()
                .map(|name| DeviceInfo {
                    name: name.to_string(),
                })
                .collect()
        };
        Self {
            result: Ok(DeviceList {
                playback: to_infos(playback),
                capture: to_infos(capture),
            }),
        }
    }

    pub fn failing(reason: &str) -> Self {
        Self {
            result: Err(PlaybackError::DeviceEnumerationFailed {
                reason: reason.to_string(),
            }),
        }
    }
}

impl Default for StubDeviceEnumerator {
    fn default() -> Self {
        Self::with_devices(&["Stub Speakers"], &["Stub Microphone"])
    }
}

impl DeviceEnumerator for StubDeviceEnumerator {
    fn enumerate(&self) -> Result<DeviceList, PlaybackError> {
        self.result.clone()
    }
}
