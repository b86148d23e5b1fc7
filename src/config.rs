//! Configuration management for the playback bridge
//!
//! Runtime configuration is loaded from a JSON file so playback behaviour can
//! be tuned without recompiling the host binding. Every section falls back to
//! defaults when absent.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Environment variable naming an alternative config file
pub const CONFIG_ENV_VAR: &str = "MINIPLAY_CONFIG";

/// Config file looked up when the environment variable is unset
pub const DEFAULT_CONFIG_PATH: &str = "miniplay.json";

/// Message handed to the completion callback
pub const DEFAULT_COMPLETION_MESSAGE: &str = "Audio finished playing!";

/// Complete application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub engine: EngineConfig,
    pub playback: PlaybackConfig,
    pub devices: DeviceConfig,
}

/// Output engine parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Output device name; the host default is used when unset or not found
    pub output_device: Option<String>,
    /// Master volume applied when the engine is created
    pub initial_volume: f32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            output_device: None,
            initial_volume: 1.0,
        }
    }
}

/// How `play_audio` decides that a sound has completed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionMode {
    /// Poll the sound until the engine has drained it
    UntilFinished,
    /// Sleep for `fixed_delay_ms` regardless of clip length, then release the sound
    FixedDelay,
}

/// Playback wait parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    pub completion: CompletionMode,
    /// Wait used by [`CompletionMode::FixedDelay`]
    pub fixed_delay_ms: u64,
    /// Poll period used by [`CompletionMode::UntilFinished`]
    pub poll_interval_ms: u64,
    /// Upper bound on the wait; the sound is stopped when it is reached
    pub max_wait_ms: Option<u64>,
    pub completion_message: String,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            completion: CompletionMode::UntilFinished,
            fixed_delay_ms: 500,
            poll_interval_ms: 10,
            max_wait_ms: None,
            completion_message: DEFAULT_COMPLETION_MESSAGE.to_string(),
        }
    }
}

impl PlaybackConfig {
    pub fn fixed_delay(&self) -> Duration {
        Duration::from_millis(self.fixed_delay_ms)
    }

    /// Poll period, never zero
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }

    pub fn max_wait(&self) -> Option<Duration> {
        self.max_wait_ms.map(Duration::from_millis)
    }
}

/// Device enumeration parameters
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceConfig {
    /// Report enumeration failures as empty lists instead of errors
    pub lenient_enumeration: bool,
}

impl AppConfig {
    /// Load configuration from JSON file
    ///
    /// # Arguments
    /// * `path` - Path to JSON config file
    ///
    /// # Returns
    /// The parsed configuration, or defaults when the file is missing or
    /// invalid (a warning is logged in both cases)
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Self {
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(config) => {
                    log::info!("[Config] Loaded configuration from {:?}", path.as_ref());
                    config
                }
                Err(err) => {
                    log::warn!(
                        "[Config] Failed to parse JSON from {:?}: {}. Using defaults.",
                        path.as_ref(),
                        err
                    );
                    Self::default()
                }
            },
            Err(err) => {
                log::warn!(
                    "[Config] Failed to read config file {:?}: {}. Using defaults.",
                    path.as_ref(),
                    err
                );
                Self::default()
            }
        }
    }

    /// Load configuration from `$MINIPLAY_CONFIG`, else `miniplay.json`
    pub fn load() -> Self {
        match std::env::var(CONFIG_ENV_VAR) {
            Ok(path) if !path.is_empty() => Self::load_from_file(path),
            _ => Self::load_from_file(DEFAULT_CONFIG_PATH),
        }
    }
}
