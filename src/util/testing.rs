//! Test setup: one global tracing subscriber for all tests

use std::path::PathBuf;
use std::sync::Once;

use tempfile::TempDir;
use tracing::{debug, info};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    prelude::*,
    EnvFilter,
};

use crate::config::Settings;

static TEST_SETUP: Once = Once::new();

pub fn init_test_setup() {
    TEST_SETUP.call_once(|| {
        // global logging subscriber, used by all tracing log macros
        setup_test_logging();
        info!("Test Setup complete");
    });
}

fn setup_test_logging() {
    debug!("INIT: Attempting logger init from testing.rs");

    // RUST_LOG wins; otherwise debug for this crate only
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("trackops=debug"));

    let subscriber = tracing_subscriber::registry().with(
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_thread_names(false)
            .with_span_events(FmtSpan::CLOSE)
            .with_filter(env_filter),
    );

    // Only set if we haven't already set a global subscriber
    if tracing::dispatcher::has_been_set() {
        debug!("Tracing subscriber already set");
    } else {
        subscriber.try_init().unwrap_or_else(|e| {
            eprintln!("Error: Failed to set up logging: {}", e);
        });
    }
}

/// Settings whose stores live in a fresh temporary directory.
///
/// Keep the returned `TempDir` alive for as long as the settings are used.
pub fn temp_settings() -> (TempDir, Settings) {
    let dir = TempDir::new().unwrap_or_else(|e| panic!("create temp dir: {e}"));
    let settings = Settings {
        data_dir: PathBuf::from(dir.path()),
        ..Settings::default()
    };
    (dir, settings)
}
