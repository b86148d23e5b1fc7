// Error types for the playback bridge
//
// Every host-visible operation fails with a PlaybackError carrying a numeric
// code suitable for FFI communication and a category matching the host's
// exception taxonomy.

mod playback;

pub use playback::{log_playback_error, PlaybackError, PlaybackErrorCodes};

/// Error codes for structured error reporting
///
/// This trait provides a standard way to get error codes and messages
/// from custom error types, enabling consistent error handling across
/// the FFI boundary.
pub trait ErrorCode {
    /// Get the numeric error code
    fn code(&self) -> i32;

    /// Get the human-readable error message
    fn message(&self) -> String;
}

/// Host-facing error taxonomy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Missing or wrong-typed input
    Argument,
    /// File path did not resolve to a readable file
    ResourceNotFound,
    /// Engine or enumeration context construction failed
    Initialization,
    /// Start/set call failed inside the engine
    OperationFailure,
}

impl ErrorCategory {
    /// Exception name reported to the host
    pub fn name(&self) -> &'static str {
        match self {
            ErrorCategory::Argument => "ArgumentError",
            ErrorCategory::ResourceNotFound => "ResourceNotFoundError",
            ErrorCategory::Initialization => "InitializationError",
            ErrorCategory::OperationFailure => "OperationFailureError",
        }
    }
}
