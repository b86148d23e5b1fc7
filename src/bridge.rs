//! Dynamic host-call dispatcher.
//!
//! Scripting hosts call operations by name with untyped arguments. This
//! module checks argument count and types the way such a host binding does,
//! converts them, forwards to [`AudioService`] and returns a JSON value in
//! the shape the host expects (`null` for setters).

use std::fmt;

use serde_json::{json, Value};

use crate::engine::AudioService;
use crate::error::{log_playback_error, PlaybackError};

/// Callback supplied by the host
pub type HostCallback = Box<dyn FnOnce(String) + Send>;

/// One argument of a host call
pub enum HostArg {
    Value(Value),
    Callback(HostCallback),
}

impl HostArg {
    pub fn callback(f: impl FnOnce(String) + Send + 'static) -> Self {
        HostArg::Callback(Box::new(f))
    }

    fn as_value(&self) -> Option<&Value> {
        match self {
            HostArg::Value(value) => Some(value),
            HostArg::Callback(_) => None,
        }
    }
}

impl From<Value> for HostArg {
    fn from(value: Value) -> Self {
        HostArg::Value(value)
    }
}

impl fmt::Debug for HostArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HostArg::Value(value) => write!(f, "Value({})", value),
            HostArg::Callback(_) => f.write_str("Callback"),
        }
    }
}

/// Operation names accepted by [`invoke`]
pub const OPERATIONS: &[&str] = &[
    "playAudio",
    "getDevices",
    "getTimeInPcmFrames",
    "getTimeInMilliseconds",
    "setTimeInPcmFrames",
    "setTimeInMilliseconds",
    "getChannels",
    "getSampleRate",
    "setVolume",
    "getVolume",
];

const EXPECTED_PLAY_ARGS: &str = "Expected a file path (string) and a callback function.";
const EXPECTED_TIME_ARG: &str = "Expected a time value (number).";
const EXPECTED_VOLUME_ARG: &str = "Expected a volume value (number).";

/// Call `operation` on `service` with host arguments.
///
/// Extra trailing arguments are ignored, as hosts commonly do.
///
/// # Errors
/// - `UnknownOperation` for a name outside [`OPERATIONS`]
/// - `InvalidArgument` for missing or wrong-typed arguments
/// - whatever the forwarded service operation returns
pub fn invoke(
    service: &AudioService,
    operation: &str,
    args: Vec<HostArg>,
) -> Result<Value, PlaybackError> {
    let result = dispatch(service, operation, args);
    // Service errors are already logged by the service.
    if let Err(
        err @ (PlaybackError::InvalidArgument { .. } | PlaybackError::UnknownOperation { .. }),
    ) = &result
    {
        log_playback_error(err, operation);
    }
    result
}

fn dispatch(
    service: &AudioService,
    operation: &str,
    mut args: Vec<HostArg>,
) -> Result<Value, PlaybackError> {
    match operation {
        "playAudio" => {
            if args.len() < 2 {
                return Err(PlaybackError::invalid_argument(EXPECTED_PLAY_ARGS));
            }
            let callback = match args.swap_remove(1) {
                HostArg::Callback(callback) => callback,
                HostArg::Value(_) => {
                    return Err(PlaybackError::invalid_argument(EXPECTED_PLAY_ARGS))
                }
            };
            let path = match args[0].as_value() {
                Some(Value::String(path)) => path.clone(),
                _ => return Err(PlaybackError::invalid_argument(EXPECTED_PLAY_ARGS)),
            };

            let started = service.play_audio(&path, |message| callback(message.to_string()))?;
            Ok(Value::String(started))
        }
        "getDevices" => Ok(json!(service.get_devices()?)),
        "getTimeInPcmFrames" => Ok(json!(service.get_time_in_pcm_frames()?)),
        "getTimeInMilliseconds" => Ok(json!(service.get_time_in_milliseconds()?)),
        "setTimeInPcmFrames" => {
            service.set_time_in_pcm_frames(time_arg(&args)?)?;
            Ok(Value::Null)
        }
        "setTimeInMilliseconds" => {
            service.set_time_in_milliseconds(time_arg(&args)?)?;
            Ok(Value::Null)
        }
        "getChannels" => Ok(json!(service.get_channels()?)),
        "getSampleRate" => Ok(json!(service.get_sample_rate()?)),
        "setVolume" => {
            service.set_volume(volume_arg(&args)?)?;
            Ok(Value::Null)
        }
        "getVolume" => Ok(json!(service.get_volume()?)),
        other => Err(PlaybackError::UnknownOperation {
            name: other.to_string(),
        }),
    }
}

/// First argument as a non-negative whole number of frames or milliseconds.
///
/// Fractional values are truncated toward zero.
fn time_arg(args: &[HostArg]) -> Result<u64, PlaybackError> {
    let number = first_number(args, EXPECTED_TIME_ARG)?;
    if let Some(value) = number.as_u64() {
        return Ok(value);
    }
    match number.as_f64() {
        Some(value) if value.is_finite() && value >= 0.0 => Ok(value.trunc() as u64),
        _ => Err(PlaybackError::invalid_argument(format!(
            "{} Got {}",
            EXPECTED_TIME_ARG, number
        ))),
    }
}

fn volume_arg(args: &[HostArg]) -> Result<f32, PlaybackError> {
    let number = first_number(args, EXPECTED_VOLUME_ARG)?;
    number
        .as_f64()
        .map(|value| value as f32)
        .ok_or_else(|| PlaybackError::invalid_argument(EXPECTED_VOLUME_ARG))
}

fn first_number<'a>(
    args: &'a [HostArg],
    expected: &str,
) -> Result<&'a serde_json::Number, PlaybackError> {
    match args.first().and_then(HostArg::as_value) {
        Some(Value::Number(number)) => Ok(number),
        _ => Err(PlaybackError::invalid_argument(expected)),
    }
}

#[cfg(test)]
mod tests;
