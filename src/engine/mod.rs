//! Engine module housing the playback core.
//!
//! `backend` holds the trait seams and the rodio/stub implementations,
//! `clock` the engine's frame clock, and `core` the `AudioService` that owns
//! an engine and serializes access to it.

pub mod backend;
pub mod clock;
pub mod core;

pub use backend::{
    AudioBackend, BackendFactory, CpalDeviceEnumerator, DeviceEnumerator, PlayingSound,
    RodioBackend, RodioBackendFactory, StubBackend, StubBackendFactory, StubDeviceEnumerator,
    StubProbe, StubSettings,
};
pub use clock::EngineClock;
pub use core::AudioService;
