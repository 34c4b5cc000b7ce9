use tracing_error::ErrorLayer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use crate::formatter::FrameFormatter;

static SUBSCRIBER_INIT: std::sync::Once = std::sync::Once::new();

/// Configure and initialize logging for the application.
///
/// Safe to call more than once; only the first call installs the subscriber.
pub fn setup_logging() {
    SUBSCRIBER_INIT.call_once(|| {
        // Allow RUST_LOG to override levels; default to info (debug in debug builds) for our crate and warn elsewhere
        let crate_level = if cfg!(debug_assertions) { "debug" } else { "info" };
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(format!("warn,{}={crate_level}", env!("CARGO_CRATE_NAME"))));

        let subscriber = FmtSubscriber::builder()
            .with_ansi(cfg!(not(target_os = "emscripten")))
            .event_format(FrameFormatter)
            .with_env_filter(filter)
            .finish()
            .with(ErrorLayer::default());

        if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
            eprintln!("Could not install the tracing subscriber: {e}");
        }
    });
}
