use super::*;

use std::sync::mpsc;
use std::sync::Arc;

use serde_json::json;

use crate::config::AppConfig;
use crate::engine::backend::{StubBackendFactory, StubDeviceEnumerator, StubSettings};

fn stub_service() -> AudioService {
    AudioService::with_backends(
        AppConfig::default(),
        Arc::new(StubBackendFactory::new(StubSettings::default())),
        Arc::new(StubDeviceEnumerator::default()),
    )
}

fn value(v: Value) -> HostArg {
    HostArg::Value(v)
}

#[test]
fn test_play_audio_requires_two_arguments() {
    let service = stub_service();
    let err = invoke(&service, "playAudio", vec![value(json!("a.wav"))]).unwrap_err();
    assert_eq!(
        err,
        PlaybackError::invalid_argument("Expected a file path (string) and a callback function.")
    );
}

#[test]
fn test_play_audio_requires_callable_second_argument() {
    let service = stub_service();
    let err = invoke(
        &service,
        "playAudio",
        vec![value(json!("a.wav")), value(json!(42))],
    )
    .unwrap_err();
    assert!(matches!(err, PlaybackError::InvalidArgument { .. }));
}

#[test]
fn test_play_audio_requires_string_path() {
    let service = stub_service();
    let err = invoke(
        &service,
        "playAudio",
        vec![value(json!(7)), HostArg::callback(|_| panic!("not called"))],
    )
    .unwrap_err();
    assert!(matches!(err, PlaybackError::InvalidArgument { .. }));
}

#[test]
fn test_play_audio_runs_callback() {
    let service = stub_service();
    let path = std::env::temp_dir().join(format!("miniplay-bridge-{}.wav", std::process::id()));
    std::fs::write(&path, b"RIFF").unwrap();
    let path = path.to_string_lossy().into_owned();

    let (tx, rx) = mpsc::channel();
    let result = invoke(
        &service,
        "playAudio",
        vec![
            value(json!(path)),
            HostArg::callback(move |msg| tx.send(msg).unwrap()),
        ],
    )
    .unwrap();

    assert_eq!(result, json!(format!("Playing: {}", path)));
    assert_eq!(rx.try_recv().unwrap(), "Audio finished playing!");
}

#[test]
fn test_play_audio_missing_file_skips_callback() {
    let service = stub_service();
    let (tx, rx) = mpsc::channel::<String>();
    let err = invoke(
        &service,
        "playAudio",
        vec![
            value(json!("/missing/clip.wav")),
            HostArg::callback(move |msg| tx.send(msg).unwrap()),
        ],
    )
    .unwrap_err();

    assert!(matches!(err, PlaybackError::FileNotFound { .. }));
    assert!(rx.try_recv().is_err());
}

#[test]
fn test_set_volume_requires_number() {
    let service = stub_service();
    let err = invoke(&service, "setVolume", vec![value(json!("loud"))]).unwrap_err();
    assert_eq!(
        err,
        PlaybackError::invalid_argument("Expected a volume value (number).")
    );

    let err = invoke(&service, "setVolume", vec![]).unwrap_err();
    assert!(matches!(err, PlaybackError::InvalidArgument { .. }));
}

#[test]
fn test_volume_round_trip() {
    let service = stub_service();
    let result = invoke(&service, "setVolume", vec![value(json!(0.25))]).unwrap();
    assert_eq!(result, Value::Null);

    let volume = invoke(&service, "getVolume", vec![]).unwrap();
    assert!((volume.as_f64().unwrap() - 0.25).abs() < 1e-6);
}

#[test]
fn test_time_setters_convert_numbers() {
    let service = stub_service();
    invoke(&service, "setTimeInPcmFrames", vec![value(json!(1000))]).unwrap();
    assert_eq!(
        invoke(&service, "getTimeInPcmFrames", vec![]).unwrap(),
        json!(1000)
    );

    invoke(&service, "setTimeInMilliseconds", vec![value(json!(250.9))]).unwrap();
    assert_eq!(
        invoke(&service, "getTimeInMilliseconds", vec![]).unwrap(),
        json!(250)
    );
}

#[test]
fn test_out_of_range_time_saturates_clock() {
    let service = stub_service();
    invoke(&service, "setTimeInMilliseconds", vec![value(json!(1e20))]).unwrap();
    assert_eq!(
        invoke(&service, "getTimeInPcmFrames", vec![]).unwrap(),
        json!(u64::MAX)
    );
}

#[test]
fn test_time_setters_reject_bad_values() {
    let service = stub_service();
    for bad in [json!("soon"), json!(-5), json!(null)] {
        let err = invoke(&service, "setTimeInPcmFrames", vec![value(bad)]).unwrap_err();
        assert!(matches!(err, PlaybackError::InvalidArgument { .. }));
    }
}

#[test]
fn test_format_getters() {
    let service = stub_service();
    assert_eq!(invoke(&service, "getChannels", vec![]).unwrap(), json!(2));
    assert_eq!(invoke(&service, "getSampleRate", vec![]).unwrap(), json!(48_000));
}

#[test]
fn test_get_devices_shape() {
    let service = stub_service();
    let devices = invoke(&service, "getDevices", vec![]).unwrap();
    assert_eq!(devices["playback"][0]["name"], "Stub Speakers");
    assert_eq!(devices["capture"][0]["name"], "Stub Microphone");
}

#[test]
fn test_unknown_operation() {
    let service = stub_service();
    let err = invoke(&service, "rewind", vec![]).unwrap_err();
    assert_eq!(
        err,
        PlaybackError::UnknownOperation {
            name: "rewind".to_string()
        }
    );
}

#[test]
fn test_every_listed_operation_dispatches() {
    let service = stub_service();
    for op in OPERATIONS {
        let result = invoke(&service, op, vec![]);
        assert!(
            !matches!(result, Err(PlaybackError::UnknownOperation { .. })),
            "{} not dispatched",
            op
        );
    }
}
