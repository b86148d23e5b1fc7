// Playback error types and constants

use crate::error::{ErrorCategory, ErrorCode};
use flutter_rust_bridge::frb;
use log::error;
use std::fmt;

/// Playback error code constants exposed to Dart via FFI
///
/// These constants provide a single source of truth for error codes
/// shared between Rust and the host. The flutter_rust_bridge will
/// generate corresponding Dart constants.
///
/// Error code range: 3001-3009
#[frb(unignore)]
pub struct PlaybackErrorCodes {}

#[frb]
impl PlaybackErrorCodes {
    /// Argument missing, of the wrong type, or out of range
    pub const INVALID_ARGUMENT: i32 = 3001;

    /// Host asked for an operation that does not exist
    pub const UNKNOWN_OPERATION: i32 = 3002;

    /// Audio file could not be opened for reading
    pub const FILE_NOT_FOUND: i32 = 3003;

    /// Engine (output stream) construction failed
    pub const ENGINE_INIT_FAILED: i32 = 3004;

    /// Device enumeration context failed
    pub const DEVICE_ENUMERATION_FAILED: i32 = 3005;

    /// Sound object could not be created from the file
    pub const SOUND_INIT_FAILED: i32 = 3006;

    /// Sound was created but playback could not start
    pub const PLAYBACK_START_FAILED: i32 = 3007;

    /// Engine rejected a setter
    pub const OPERATION_FAILED: i32 = 3008;

    /// Mutex was poisoned
    pub const LOCK_POISONED: i32 = 3009;

    /// Get INVALID_ARGUMENT error code
    #[flutter_rust_bridge::frb(sync, getter)]
    pub fn invalid_argument() -> i32 {
        Self::INVALID_ARGUMENT
    }

    /// Get UNKNOWN_OPERATION error code
    #[flutter_rust_bridge::frb(sync, getter)]
    pub fn unknown_operation() -> i32 {
        Self::UNKNOWN_OPERATION
    }

    /// Get FILE_NOT_FOUND error code
    #[flutter_rust_bridge::frb(sync, getter)]
    pub fn file_not_found() -> i32 {
        Self::FILE_NOT_FOUND
    }

    /// Get ENGINE_INIT_FAILED error code
    #[flutter_rust_bridge::frb(sync, getter)]
    pub fn engine_init_failed() -> i32 {
        Self::ENGINE_INIT_FAILED
    }

    /// Get DEVICE_ENUMERATION_FAILED error code
    #[flutter_rust_bridge::frb(sync, getter)]
    pub fn device_enumeration_failed() -> i32 {
        Self::DEVICE_ENUMERATION_FAILED
    }

    /// Get SOUND_INIT_FAILED error code
    #[flutter_rust_bridge::frb(sync, getter)]
    pub fn sound_init_failed() -> i32 {
        Self::SOUND_INIT_FAILED
    }

    /// Get PLAYBACK_START_FAILED error code
    #[flutter_rust_bridge::frb(sync, getter)]
    pub fn playback_start_failed() -> i32 {
        Self::PLAYBACK_START_FAILED
    }

    /// Get OPERATION_FAILED error code
    #[flutter_rust_bridge::frb(sync, getter)]
    pub fn operation_failed() -> i32 {
        Self::OPERATION_FAILED
    }

    /// Get LOCK_POISONED error code
    #[flutter_rust_bridge::frb(sync, getter)]
    pub fn lock_poisoned() -> i32 {
        Self::LOCK_POISONED
    }
}

/// Log a playback error with structured context
///
/// Emits the numeric code, the error category and the message under the
/// name of the operation that failed.
pub fn log_playback_error(err: &PlaybackError, context: &str) {
    error!(
        "Playback error in {}: code={}, category={}, message={}",
        context,
        err.code(),
        err.category().name(),
        err.message()
    );
}

/// Errors surfaced by every host-visible operation
#[derive(Debug, Clone, PartialEq)]
pub enum PlaybackError {
    /// Argument missing, of the wrong type, or out of range
    InvalidArgument { details: String },

    /// Host asked for an operation that does not exist
    UnknownOperation { name: String },

    /// Audio file could not be opened for reading
    FileNotFound { path: String },

    /// Engine construction failed
    EngineInitFailed { reason: String },

    /// Device enumeration failed
    DeviceEnumerationFailed { reason: String },

    /// Sound object could not be created from the file
    SoundInitFailed { reason: String },

    /// Playback could not start
    PlaybackStartFailed { reason: String },

    /// Engine rejected a setter; carries no engine detail
    OperationFailed { operation: String },

    /// Mutex was poisoned
    LockPoisoned { component: String },
}

impl PlaybackError {
    /// Shorthand for [`PlaybackError::InvalidArgument`]
    pub fn invalid_argument(details: impl Into<String>) -> Self {
        PlaybackError::InvalidArgument {
            details: details.into(),
        }
    }

    /// Shorthand for [`PlaybackError::OperationFailed`]
    pub fn operation_failed(operation: impl Into<String>) -> Self {
        PlaybackError::OperationFailed {
            operation: operation.into(),
        }
    }

    /// Taxonomy bucket the host sees this error as
    pub fn category(&self) -> ErrorCategory {
        match self {
            PlaybackError::InvalidArgument { .. } | PlaybackError::UnknownOperation { .. } => {
                ErrorCategory::Argument
            }
            PlaybackError::FileNotFound { .. } => ErrorCategory::ResourceNotFound,
            PlaybackError::EngineInitFailed { .. }
            | PlaybackError::DeviceEnumerationFailed { .. } => ErrorCategory::Initialization,
            PlaybackError::SoundInitFailed { .. }
            | PlaybackError::PlaybackStartFailed { .. }
            | PlaybackError::OperationFailed { .. }
            | PlaybackError::LockPoisoned { .. } => ErrorCategory::OperationFailure,
        }
    }
}

impl ErrorCode for PlaybackError {
    fn code(&self) -> i32 {
        match self {
            PlaybackError::InvalidArgument { .. } => PlaybackErrorCodes::INVALID_ARGUMENT,
            PlaybackError::UnknownOperation { .. } => PlaybackErrorCodes::UNKNOWN_OPERATION,
            PlaybackError::FileNotFound { .. } => PlaybackErrorCodes::FILE_NOT_FOUND,
            PlaybackError::EngineInitFailed { .. } => PlaybackErrorCodes::ENGINE_INIT_FAILED,
            PlaybackError::DeviceEnumerationFailed { .. } => {
                PlaybackErrorCodes::DEVICE_ENUMERATION_FAILED
            }
            PlaybackError::SoundInitFailed { .. } => PlaybackErrorCodes::SOUND_INIT_FAILED,
            PlaybackError::PlaybackStartFailed { .. } => PlaybackErrorCodes::PLAYBACK_START_FAILED,
            PlaybackError::OperationFailed { .. } => PlaybackErrorCodes::OPERATION_FAILED,
            PlaybackError::LockPoisoned { .. } => PlaybackErrorCodes::LOCK_POISONED,
        }
    }

    fn message(&self) -> String {
        match self {
            PlaybackError::InvalidArgument { details } => {
                format!("Invalid argument: {}", details)
            }
            PlaybackError::UnknownOperation { name } => format!("Unknown operation: {}", name),
            PlaybackError::FileNotFound { path } => {
                format!("Audio file not found at path: {}", path)
            }
            PlaybackError::EngineInitFailed { reason } => {
                format!("Failed to initialize audio engine: {}", reason)
            }
            PlaybackError::DeviceEnumerationFailed { reason } => {
                format!("Failed to enumerate audio devices: {}", reason)
            }
            PlaybackError::SoundInitFailed { reason } => {
                format!("Sound initialization failed: {}", reason)
            }
            PlaybackError::PlaybackStartFailed { reason } => {
                format!("Failed to start sound playback: {}", reason)
            }
            PlaybackError::OperationFailed { operation } => format!("Failed to {}.", operation),
            PlaybackError::LockPoisoned { component } => {
                format!("Lock poisoned on {}", component)
            }
        }
    }
}

impl fmt::Display for PlaybackError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (code {}): {}",
            self.category().name(),
            self.code(),
            self.message()
        )
    }
}

impl std::error::Error for PlaybackError {}
