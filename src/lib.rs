// Miniplay - audio playback engine
// Lazily created engine behind a single lock, exposed to Dart hosts,
// dynamic script hosts and a desktop CLI.

// Module declarations
pub mod api;
pub mod bridge;
pub mod config;
pub mod engine;
pub mod error;
pub mod fixtures;

// Re-exports for convenience
pub use config::AppConfig;
pub use engine::AudioService;
pub use error::{PlaybackError, PlaybackErrorCodes};

use std::sync::OnceLock;

use tracing_subscriber::EnvFilter;

/// Default filter when `RUST_LOG` is unset.
const DEFAULT_LOG_FILTER: &str = "warn,miniplay=info";

/// Install the global tracing subscriber.
///
/// `log` records from this crate are forwarded to it. Only the first call
/// has an effect; if another subscriber was already installed it is kept.
pub fn init_logging() {
    static INIT: OnceLock<()> = OnceLock::new();
    INIT.get_or_init(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
        let installed = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_thread_names(true)
            .with_writer(std::io::stderr)
            .try_init();
        if installed.is_ok() {
            log::debug!("[Logging] Tracing subscriber installed");
        }
    });
}
