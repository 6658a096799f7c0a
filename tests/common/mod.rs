#![allow(dead_code)]

use chat_feed_lib::libs::config::Config;
use chat_feed_lib::ChatBackend;
use std::sync::Once;
use tempfile::TempDir;
use tracing_subscriber::EnvFilter;

static TRACING: Once = Once::new();

pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

// each test gets its own database file so tests can run in parallel
pub fn test_config(dir: &TempDir, prefix: &str) -> Config {
    let db_path = dir.path().join(format!("{prefix}.db"));
    Config::with_database_path(db_path.to_string_lossy().into_owned())
}

pub fn open_backend(prefix: &str) -> (TempDir, ChatBackend) {
    init_tracing();
    let dir = TempDir::new().expect("Failed to create test directory");
    let config = test_config(&dir, prefix);
    let backend = ChatBackend::open(&config).expect("Failed to open chat backend");
    assert!(
        std::path::Path::new(&config.database_path).exists(),
        "Database file should exist after initialization"
    );
    (dir, backend)
}
