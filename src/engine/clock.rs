//! Engine playback clock.
//!
//! The clock counts PCM frames rendered by the output stream. The rodio
//! backend advances it from a silent source mixed into the output; the stub
//! backend advances it by hand. Both share the frame/millisecond conversion.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use rodio::Source;

/// Frame counter plus the stream format it is measured in.
#[derive(Debug)]
pub struct EngineClock {
    frames: AtomicU64,
    sample_rate: u32,
    channels: u16,
}

impl EngineClock {
    pub fn new(sample_rate: u32, channels: u16) -> Self {
        Self {
            frames: AtomicU64::new(0),
            sample_rate: sample_rate.max(1),
            channels: channels.max(1),
        }
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }

    pub fn time_in_pcm_frames(&self) -> u64 {
        self.frames.load(Ordering::Relaxed)
    }

    pub fn set_time_in_pcm_frames(&self, frames: u64) {
        self.frames.store(frames, Ordering::Relaxed);
    }

    pub fn time_in_milliseconds(&self) -> u64 {
        frames_to_millis(self.time_in_pcm_frames(), self.sample_rate)
    }

    pub fn set_time_in_milliseconds(&self, millis: u64) {
        self.set_time_in_pcm_frames(millis_to_frames(millis, self.sample_rate));
    }

    pub fn advance(&self, frames: u64) {
        self.frames.fetch_add(frames, Ordering::Relaxed);
    }
}

/// Convert a frame count to whole milliseconds at `sample_rate`.
///
/// Saturates at `u64::MAX` for rates below 1 kHz.
pub fn frames_to_millis(frames: u64, sample_rate: u32) -> u64 {
    let rate = u128::from(sample_rate.max(1));
    u64::try_from(u128::from(frames) * 1000 / rate).unwrap_or(u64::MAX)
}

/// Convert milliseconds to a frame count at `sample_rate`, saturating at `u64::MAX`.
pub fn millis_to_frames(millis: u64, sample_rate: u32) -> u64 {
    u64::try_from(u128::from(millis) * u128::from(sample_rate) / 1000).unwrap_or(u64::MAX)
}

/// Endless silent source that drives an [`EngineClock`].
///
/// Emits interleaved zero samples in the clock's format and bumps the frame
/// counter once per complete frame.
pub struct ClockSource {
    clock: Arc<EngineClock>,
    channel_cursor: u16,
}

impl ClockSource {
    pub fn new(clock: Arc<EngineClock>) -> Self {
        Self {
            clock,
            channel_cursor: 0,
        }
    }
}

impl Iterator for ClockSource {
    type Item = f32;

    fn next(&mut self) -> Option<f32> {
        self.channel_cursor += 1;
        if self.channel_cursor == self.clock.channels() {
            self.channel_cursor = 0;
            self.clock.advance(1);
        }
        Some(0.0)
    }
}

impl Source for ClockSource {
    fn current_frame_len(&self) -> Option<usize> {
        None
    }

    fn channels(&self) -> u16 {
        self.clock.channels()
    }

    fn sample_rate(&self) -> u32 {
        self.clock.sample_rate()
    }

    fn total_duration(&self) -> Option<Duration> {
        None
    }
}
