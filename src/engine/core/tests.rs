use super::*;

use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::config::PlaybackConfig;
use crate::engine::backend::{StubBackendFactory, StubDeviceEnumerator, StubProbe, StubSettings};

fn service_with(settings: StubSettings, config: AppConfig) -> (AudioService, Arc<StubProbe>) {
    let factory = StubBackendFactory::new(settings);
    let probe = factory.probe();
    let service = AudioService::with_backends(
        config,
        Arc::new(factory),
        Arc::new(StubDeviceEnumerator::default()),
    );
    (service, probe)
}

fn stub_service() -> (AudioService, Arc<StubProbe>) {
    service_with(StubSettings::default(), AppConfig::default())
}

/// Existing file to hand to the stub engine; contents are never decoded.
fn scratch_file(name: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!(
        "miniplay-core-{}-{}.wav",
        name,
        std::process::id()
    ));
    std::fs::write(&path, b"RIFF").unwrap();
    path
}

/// Writer collecting formatted tracing output for assertions.
#[derive(Clone, Default)]
struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn test_engine_lifecycle_is_traced() {
    let logs = CapturedLogs::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();

    tracing::subscriber::with_default(subscriber, || {
        let (service, _probe) = stub_service();
        let path = scratch_file("traced");
        service.play_audio(&path.to_string_lossy(), |_| {}).unwrap();
        service.shutdown().unwrap();
    });

    let output = logs.contents();
    assert!(output.contains("[AudioService] Creating audio engine"), "{}", output);
    assert!(output.contains("[AudioService] Playing"), "{}", output);
    assert!(output.contains("[AudioService] Audio engine shut down"), "{}", output);
}

#[test]
fn test_engine_created_lazily_once() {
    let (service, probe) = stub_service();
    assert!(!service.is_initialized().unwrap());
    assert_eq!(probe.engines_created(), 0);

    service.get_volume().unwrap();
    service.get_channels().unwrap();
    service.get_sample_rate().unwrap();

    assert!(service.is_initialized().unwrap());
    assert_eq!(probe.engines_created(), 1);
}

#[test]
fn test_play_returns_path_and_calls_back_once() {
    let (service, probe) = stub_service();
    let path = scratch_file("play");
    let path_str = path.to_string_lossy().into_owned();

    let calls = AtomicUsize::new(0);
    let mut message = String::new();
    let result = service
        .play_audio(&path_str, |msg| {
            calls.fetch_add(1, Ordering::SeqCst);
            message = msg.to_string();
        })
        .unwrap();

    assert_eq!(result, format!("Playing: {}", path_str));
    assert!(result.contains(&path_str));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(message, "Audio finished playing!");
    assert_eq!(probe.sounds_started(), 1);
    assert_eq!(probe.sounds_released(), 1);
}

#[test]
fn test_play_missing_file_fails_before_engine_work() {
    let (service, probe) = stub_service();
    let mut called = false;

    let err = service
        .play_audio("/definitely/not/here.wav", |_| called = true)
        .unwrap_err();

    assert!(matches!(err, PlaybackError::FileNotFound { ref path } if path == "/definitely/not/here.wav"));
    assert!(!called);
    assert_eq!(probe.engines_created(), 0);
    assert_eq!(probe.sounds_started(), 0);
}

#[test]
fn test_play_directory_is_not_a_file() {
    let (service, _probe) = stub_service();
    let dir = std::env::temp_dir();
    let err = service
        .play_audio(&dir.to_string_lossy(), |_| {})
        .unwrap_err();
    assert!(matches!(err, PlaybackError::FileNotFound { .. }));
}

#[test]
fn test_play_empty_path_is_argument_error() {
    let (service, _probe) = stub_service();
    let err = service.play_audio("", |_| {}).unwrap_err();
    assert!(matches!(err, PlaybackError::InvalidArgument { .. }));
}

#[test]
fn test_play_surfaces_sound_init_failure() {
    let settings = StubSettings {
        fail_sound_init: true,
        ..StubSettings::default()
    };
    let (service, probe) = service_with(settings, AppConfig::default());
    let path = scratch_file("sound-init");

    let err = service
        .play_audio(&path.to_string_lossy(), |_| panic!("callback must not run"))
        .unwrap_err();

    assert!(matches!(err, PlaybackError::SoundInitFailed { .. }));
    assert_eq!(probe.sounds_started(), 0);
}

#[test]
fn test_play_surfaces_start_failure() {
    let settings = StubSettings {
        fail_start: true,
        ..StubSettings::default()
    };
    let (service, _probe) = service_with(settings, AppConfig::default());
    let path = scratch_file("start");

    let err = service
        .play_audio(&path.to_string_lossy(), |_| panic!("callback must not run"))
        .unwrap_err();

    assert!(matches!(err, PlaybackError::PlaybackStartFailed { .. }));
}

#[test]
fn test_play_waits_until_sound_finishes() {
    let settings = StubSettings {
        sound_duration: Duration::from_millis(120),
        ..StubSettings::default()
    };
    let (service, _probe) = service_with(settings, AppConfig::default());
    let path = scratch_file("until-finished");

    let started = Instant::now();
    service.play_audio(&path.to_string_lossy(), |_| {}).unwrap();

    assert!(started.elapsed() >= Duration::from_millis(120));
}

#[test]
fn test_fixed_delay_mode_ignores_clip_length() {
    let settings = StubSettings {
        sound_duration: Duration::from_secs(30),
        ..StubSettings::default()
    };
    let config = AppConfig {
        playback: PlaybackConfig {
            completion: CompletionMode::FixedDelay,
            fixed_delay_ms: 50,
            ..PlaybackConfig::default()
        },
        ..AppConfig::default()
    };
    let (service, probe) = service_with(settings, config);
    let path = scratch_file("fixed-delay");

    let started = Instant::now();
    service.play_audio(&path.to_string_lossy(), |_| {}).unwrap();
    let elapsed = started.elapsed();

    assert!(elapsed >= Duration::from_millis(50));
    assert!(elapsed < Duration::from_secs(10));
    assert_eq!(probe.sounds_released(), 1);
}

#[test]
fn test_max_wait_truncates_long_sounds() {
    let settings = StubSettings {
        sound_duration: Duration::from_secs(30),
        ..StubSettings::default()
    };
    let config = AppConfig {
        playback: PlaybackConfig {
            max_wait_ms: Some(40),
            ..PlaybackConfig::default()
        },
        ..AppConfig::default()
    };
    let (service, _probe) = service_with(settings, config);
    let path = scratch_file("max-wait");

    let started = Instant::now();
    let mut completed = false;
    service
        .play_audio(&path.to_string_lossy(), |_| completed = true)
        .unwrap();

    assert!(completed);
    assert!(started.elapsed() < Duration::from_secs(10));
}

#[test]
fn test_callback_may_reenter_service() {
    let (service, _probe) = stub_service();
    let path = scratch_file("reenter");
    let mut volume_seen = None;

    service
        .play_audio(&path.to_string_lossy(), |_| {
            volume_seen = service.get_volume().ok();
        })
        .unwrap();

    assert_eq!(volume_seen, Some(1.0));
}

#[test]
fn test_volume_round_trip() {
    let (service, _probe) = stub_service();
    service.set_volume(0.5).unwrap();
    assert!((service.get_volume().unwrap() - 0.5).abs() < f32::EPSILON);

    service.set_volume(1.2).unwrap();
    assert!((service.get_volume().unwrap() - 1.2).abs() < f32::EPSILON);
}

#[test]
fn test_invalid_volume_rejected() {
    let (service, probe) = stub_service();
    for bad in [f32::NAN, f32::INFINITY, -0.5] {
        let err = service.set_volume(bad).unwrap_err();
        assert!(matches!(err, PlaybackError::InvalidArgument { .. }));
    }
    assert_eq!(probe.engines_created(), 0);
}

#[test]
fn test_clock_round_trip() {
    let (service, _probe) = stub_service();

    service.set_time_in_pcm_frames(1000).unwrap();
    assert_eq!(service.get_time_in_pcm_frames().unwrap(), 1000);

    service.set_time_in_milliseconds(5000).unwrap();
    assert_eq!(service.get_time_in_milliseconds().unwrap(), 5000);
    assert_eq!(service.get_time_in_pcm_frames().unwrap(), 240_000);
}

#[test]
fn test_setter_failure_is_generic() {
    let settings = StubSettings {
        fail_setters: true,
        ..StubSettings::default()
    };
    let (service, _probe) = service_with(settings, AppConfig::default());

    let err = service.set_volume(0.5).unwrap_err();
    assert_eq!(err, PlaybackError::operation_failed("set volume"));

    let err = service.set_time_in_pcm_frames(10).unwrap_err();
    assert_eq!(err, PlaybackError::operation_failed("set time in PCM frames"));

    let err = service.set_time_in_milliseconds(10).unwrap_err();
    assert_eq!(
        err,
        PlaybackError::operation_failed("set time in milliseconds")
    );
}

#[test]
fn test_engine_properties_snapshot() {
    let settings = StubSettings {
        sample_rate: 44_100,
        channels: 1,
        ..StubSettings::default()
    };
    let (service, _probe) = service_with(settings, AppConfig::default());
    service.set_time_in_pcm_frames(44_100).unwrap();

    let props = service.engine_properties().unwrap();
    assert_eq!(props.channels, 1);
    assert_eq!(props.sample_rate, 44_100);
    assert_eq!(props.time_in_pcm_frames, 44_100);
    assert_eq!(props.time_in_milliseconds, 1000);
}

#[test]
fn test_init_failure_is_not_cached() {
    let settings = StubSettings {
        fail_init: true,
        ..StubSettings::default()
    };
    let (service, _probe) = service_with(settings, AppConfig::default());

    let err = service.get_channels().unwrap_err();
    assert!(matches!(err, PlaybackError::EngineInitFailed { .. }));
    assert!(!service.is_initialized().unwrap());
}

#[test]
fn test_shutdown_releases_engine() {
    let (service, probe) = stub_service();
    service.get_volume().unwrap();

    assert!(service.shutdown().unwrap());
    assert_eq!(probe.engines_released(), 1);
    assert!(!service.shutdown().unwrap());

    service.get_volume().unwrap();
    assert_eq!(probe.engines_created(), 2);
}

#[test]
fn test_drop_releases_engine() {
    let (service, probe) = stub_service();
    service.get_sample_rate().unwrap();
    drop(service);
    assert_eq!(probe.engines_released(), 1);
}

#[test]
fn test_devices_do_not_create_engine() {
    let (service, probe) = stub_service();
    let devices = service.get_devices().unwrap();

    assert_eq!(devices.playback.len(), 1);
    assert_eq!(devices.capture[0].name, "Stub Microphone");
    assert_eq!(probe.engines_created(), 0);
}

#[test]
fn test_device_failure_propagates() {
    let service = AudioService::with_backends(
        AppConfig::default(),
        Arc::new(StubBackendFactory::default()),
        Arc::new(StubDeviceEnumerator::failing("host unavailable")),
    );
    let err = service.get_devices().unwrap_err();
    assert!(matches!(err, PlaybackError::DeviceEnumerationFailed { .. }));
}

#[test]
fn test_lenient_device_failure_yields_empty_lists() {
    let mut config = AppConfig::default();
    config.devices.lenient_enumeration = true;
    let service = AudioService::with_backends(
        config,
        Arc::new(StubBackendFactory::default()),
        Arc::new(StubDeviceEnumerator::failing("host unavailable")),
    );

    let devices = service.get_devices().unwrap();
    assert!(devices.playback.is_empty());
    assert!(devices.capture.is_empty());
}

#[test]
fn test_getter_waits_behind_playback() {
    let settings = StubSettings {
        sound_duration: Duration::from_millis(300),
        ..StubSettings::default()
    };
    let (service, _probe) = service_with(settings, AppConfig::default());
    let service = Arc::new(service);
    let path = scratch_file("serialize");

    let player = {
        let service = Arc::clone(&service);
        let path = path.to_string_lossy().into_owned();
        thread::spawn(move || service.play_audio(&path, |_| {}))
    };

    thread::sleep(Duration::from_millis(50));
    let started = Instant::now();
    service.get_volume().unwrap();
    let waited = started.elapsed();

    player.join().unwrap().unwrap();
    assert!(
        waited >= Duration::from_millis(100),
        "getter ran concurrently with playback (waited {:?})",
        waited
    );
}
