//! Run logging.
//!
//! One subscriber per process with two layers:
//!
//! - **console**: human-readable, filtered by `RUST_LOG` (default from
//!   `logging.level`).
//! - **file**: `<logging.dir>/test_log_YYYYMMDD_HHMMSS.log`, written through a
//!   non-blocking `tracing-appender` worker. The returned [`LogGuard`] flushes
//!   it on drop, so keep it alive for the whole run.
//!
//! Scenarios log a start marker, their observations, and a pass marker.
//! Failures are never logged as markers; they propagate as errors.

use crate::config::LoggingSettings;
use crate::result::{E2eError, E2eResult};
use chrono::{DateTime, Local};
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer};

/// Keeps the file writer alive; dropping it flushes pending lines
#[derive(Debug)]
pub struct LogGuard {
    _worker: WorkerGuard,
    path: PathBuf,
}

impl LogGuard {
    /// Log file written by this run
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// File name for a run started at `now`
#[must_use]
pub fn log_file_name(now: DateTime<Local>) -> String {
    format!("test_log_{}.log", now.format("%Y%m%d_%H%M%S"))
}

/// Start marker written when a scenario begins
#[must_use]
pub fn start_marker(id: &str, name: &str) -> String {
    format!("*** Test {id}: {name} ***")
}

/// Marker written when a scenario passes
#[must_use]
pub fn pass_marker(id: &str) -> String {
    format!("*** Test {id}: PASSED ***")
}

/// Install the console + file subscriber.
///
/// Fails when the log directory cannot be created or a global subscriber is
/// already installed.
pub fn init(settings: &LoggingSettings) -> E2eResult<LogGuard> {
    std::fs::create_dir_all(&settings.dir)?;
    let path = settings.dir.join(log_file_name(Local::now()));
    let file = File::create(&path)?;
    let (writer, worker) = tracing_appender::non_blocking(file);

    let console_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.level));
    let console = fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_filter(console_filter);

    let file_layer = fmt::layer()
        .with_ansi(false)
        .with_target(true)
        .with_writer(writer)
        .with_filter(EnvFilter::new("debug"));

    tracing_subscriber::registry()
        .with(console)
        .with(file_layer)
        .try_init()
        .map_err(|e| E2eError::config(format!("logging already initialised: {e}")))?;

    tracing::info!(path = %path.display(), "logging to file");
    Ok(LogGuard {
        _worker: worker,
        path,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_log_file_name_is_timestamped() {
        let at = Local.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap();
        assert_eq!(log_file_name(at), "test_log_20240309_140507.log");
    }

    #[test]
    fn test_markers() {
        assert_eq!(
            start_marker("TC-AUTH-001", "Valid Admin Login"),
            "*** Test TC-AUTH-001: Valid Admin Login ***"
        );
        assert_eq!(pass_marker("TC-AUTH-001"), "*** Test TC-AUTH-001: PASSED ***");
    }

    #[test]
    fn test_init_creates_log_file_once() {
        let dir = tempfile::tempdir().unwrap();
        let settings = LoggingSettings {
            dir: dir.path().join("logs"),
            level: "debug".to_string(),
        };
        let guard = init(&settings).unwrap();
        assert!(guard.path().starts_with(dir.path()));
        assert!(guard.path().exists());

        assert!(init(&settings).is_err());
    }
}
