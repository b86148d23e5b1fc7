//! WAV fixtures for exercising playback without bundled assets.
//!
//! `write_tone` renders a short sine tone to a 16-bit PCM WAV that every
//! decoder understands; `read_wav_info` reads back its format and length.

use std::path::Path;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use serde::Serialize;

/// Parameters for a generated sine tone.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToneSpec {
    pub frequency_hz: f32,
    pub duration: Duration,
    pub sample_rate: u32,
    pub channels: u16,
    /// Peak amplitude in 0.0..=1.0
    pub amplitude: f32,
}

impl Default for ToneSpec {
    fn default() -> Self {
        Self {
            frequency_hz: 440.0,
            duration: Duration::from_millis(250),
            sample_rate: 48_000,
            channels: 2,
            amplitude: 0.5,
        }
    }
}

impl ToneSpec {
    pub fn frames(&self) -> u64 {
        self.duration.as_millis() as u64 * self.sample_rate as u64 / 1000
    }
}

/// Format and length of a WAV file on disk.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WavInfo {
    pub sample_rate: u32,
    pub channels: u16,
    pub frames: u64,
    pub duration_ms: u64,
}

/// Render `spec` to `path`, overwriting any existing file.
pub fn write_tone(path: &Path, spec: &ToneSpec) -> Result<()> {
    if spec.sample_rate == 0 || spec.channels == 0 {
        return Err(anyhow!(
            "Tone needs a positive sample rate and channel count (got {} Hz, {} ch)",
            spec.sample_rate,
            spec.channels
        ));
    }

    let wav_spec = hound::WavSpec {
        channels: spec.channels,
        sample_rate: spec.sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, wav_spec)
        .with_context(|| format!("creating {}", path.display()))?;

    let amplitude = spec.amplitude.clamp(0.0, 1.0) * i16::MAX as f32;
    let step = 2.0 * std::f32::consts::PI * spec.frequency_hz / spec.sample_rate as f32;
    for frame in 0..spec.frames() {
        let value = ((frame as f32 * step).sin() * amplitude) as i16;
        for _ in 0..spec.channels {
            writer
                .write_sample(value)
                .with_context(|| format!("writing {}", path.display()))?;
        }
    }

    writer
        .finalize()
        .with_context(|| format!("finalizing {}", path.display()))?;
    log::debug!(
        "[Fixtures] Wrote {} frames of {} Hz tone to {}",
        spec.frames(),
        spec.frequency_hz,
        path.display()
    );
    Ok(())
}

pub fn read_wav_info(path: &Path) -> Result<WavInfo> {
    let reader =
        hound::WavReader::open(path).with_context(|| format!("opening {}", path.display()))?;
    let spec = reader.spec();
    let frames = reader.duration() as u64;

    Ok(WavInfo {
        sample_rate: spec.sample_rate,
        channels: spec.channels,
        frames,
        duration_ms: frames * 1000 / spec.sample_rate.max(1) as u64,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("miniplay-fixture-{}-{}.wav", name, std::process::id()))
    }

    #[test]
    fn test_tone_frame_count() {
        let spec = ToneSpec {
            duration: Duration::from_millis(500),
            sample_rate: 44_100,
            ..ToneSpec::default()
        };
        assert_eq!(spec.frames(), 22_050);
    }

    #[test]
    fn test_written_tone_reports_format() {
        let path = scratch("format");
        let spec = ToneSpec {
            duration: Duration::from_millis(100),
            sample_rate: 8_000,
            channels: 1,
            ..ToneSpec::default()
        };
        write_tone(&path, &spec).unwrap();

        let info = read_wav_info(&path).unwrap();
        assert_eq!(info.sample_rate, 8_000);
        assert_eq!(info.channels, 1);
        assert_eq!(info.frames, 800);
        assert_eq!(info.duration_ms, 100);
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_tone_is_not_silent() {
        let path = scratch("loud");
        write_tone(&path, &ToneSpec::default()).unwrap();

        let mut reader = hound::WavReader::open(&path).unwrap();
        let peak = reader
            .samples::<i16>()
            .map(|s| s.unwrap().unsigned_abs())
            .max()
            .unwrap();
        assert!(peak > i16::MAX as u16 / 4);
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_zero_channels_rejected() {
        let spec = ToneSpec {
            channels: 0,
            ..ToneSpec::default()
        };
        assert!(write_tone(&scratch("zero"), &spec).is_err());
    }

    #[test]
    fn test_missing_file_has_context() {
        let err = read_wav_info(Path::new("/no/such/tone.wav")).unwrap_err();
        assert!(format!("{:#}", err).contains("/no/such/tone.wav"));
    }
}
