pub mod builders;
pub mod fake_executor;

use std::path::Path;
use std::sync::Once;

use photopipe::fs::mock::MockFileSystem;
use photopipe::layout::ProjectLayout;
use tracing_subscriber::{fmt, EnvFilter};

static INIT: Once = Once::new();

/// Initialise tracing for tests.
///
/// - Uses `with_test_writer()`, so logs are captured per-test.
/// - The Rust test harness only prints captured output for **failing** tests
///   (unless you run with `-- --nocapture`).
///
/// Enable levels with e.g.:
/// `RUST_LOG=debug cargo test`
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        fmt()
            .with_env_filter(filter)
            .with_test_writer() // print only for failing tests unless --nocapture
            .with_target(true)
            .init();
    });
}

/// Run a future with a 5-second timeout.
#[allow(dead_code)]
pub async fn with_timeout<F, T>(f: F) -> T
where
    F: std::future::Future<Output = T>,
{
    tokio::time::timeout(std::time::Duration::from_secs(5), f)
        .await
        .expect("Test timed out after 5 seconds")
}

/// Mock project at `root` with `frames` images in `images/`.
pub fn mock_project(root: impl AsRef<Path>, frames: usize) -> (MockFileSystem, ProjectLayout) {
    let fs = MockFileSystem::new();
    let layout = ProjectLayout::new(root.as_ref());
    fs.add_dir(layout.images());
    for i in 0..frames {
        fs.add_file(layout.images().join(format!("frame_{i:04}.jpg")), b"jpeg".to_vec());
    }
    (fs, layout)
}
