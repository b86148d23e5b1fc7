use serde::{Deserialize, Serialize};

/// Whether a device renders or records audio
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeviceKind {
    Playback,
    Capture,
}

/// A single audio device as reported by the host audio API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInfo {
    pub name: String,
}

/// Playback and capture devices, in host enumeration order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceList {
    pub playback: Vec<DeviceInfo>,
    pub capture: Vec<DeviceInfo>,
}

impl DeviceList {
    /// All devices tagged with their kind, playback first
    pub fn iter(&self) -> impl Iterator<Item = (DeviceKind, &DeviceInfo)> {
        self.playback
            .iter()
            .map(|device| (DeviceKind::Playback, device))
            .chain(self.capture.iter().map(|device| (DeviceKind::Capture, device)))
    }
}

/// Snapshot of the engine's format, clock and volume
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineProperties {
    pub channels: u32,
    pub sample_rate: u32,
    pub volume: f32,
    pub time_in_pcm_frames: u64,
    pub time_in_milliseconds: u64,
}
