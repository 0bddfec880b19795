//! Logging system initialization
//!
//! Sets up tracing-based logging, either to %APPDATA%\AiCartoonizer\app.log with
//! rotation on every startup (keeping 9 historical files) or to stderr.

use crate::config::ConfigManager;
use crate::error::{CartoonizerError, Result, StringError};
use std::path::Path;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt};

/// Maximum number of historical log files to keep (app.log.1 through app.log.9)
const MAX_LOG_FILES: u8 = 9;

/// Where log output goes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTarget {
    /// Rotating file in the application directory
    File,
    /// Standard error
    Stderr,
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Initialize the logging system
///
/// Log level defaults to INFO but can be configured via `RUST_LOG` environment variable.
/// File output rotates existing logs on startup to keep the last 10 sessions.
pub fn init_logging(target: LogTarget) -> Result<()> {
    match target {
        LogTarget::File => init_file_logging()?,
        LogTarget::Stderr => {
            let subscriber = fmt()
                .with_writer(std::io::stderr)
                .with_env_filter(env_filter())
                .with_target(false)
                .finish();
            tracing::subscriber::set_global_default(subscriber)
                .map_err(|e| CartoonizerError::ConfigError(Box::new(e)))?;
        }
    }

    tracing::info!("ai-cartoonizer v{} started", env!("CARGO_PKG_VERSION"));

    Ok(())
}

fn init_file_logging() -> Result<()> {
    let log_dir = ConfigManager::get_app_dir();
    std::fs::create_dir_all(&log_dir)?;

    let log_path = log_dir.join("app.log");
    rotate_logs_on_startup(&log_path)?;

    // Rotation happens above, once per startup
    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix("app")
        .filename_suffix("log")
        .build(&log_dir)
        .map_err(|e| {
            // Preserve error chain by wrapping the source error
            CartoonizerError::ConfigError(Box::new(e))
        })?;

    let subscriber = fmt()
        .with_writer(file_appender)
        .with_env_filter(env_filter())
        .with_ansi(false) // Disable ANSI colors for file output
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| CartoonizerError::ConfigError(Box::new(e)))?;

    Ok(())
}

/// Rotate log files on application startup
///
/// - app.log.9 is deleted (oldest log)
/// - app.log.N -> app.log.N+1 for N = 8 down to 1
/// - app.log -> app.log.1
/// - A fresh app.log will be created by the logger
fn rotate_logs_on_startup(log_path: &Path) -> Result<()> {
    if !log_path.exists() {
        return Ok(());
    }

    let log_dir = log_path
        .parent()
        .ok_or_else(|| CartoonizerError::ConfigError(StringError::new("Invalid log path")))?;

    let log_name = log_path
        .file_name()
        .ok_or_else(|| CartoonizerError::ConfigError(StringError::new("Invalid log filename")))?
        .to_string_lossy();

    let oldest_log = log_dir.join(format!("{log_name}.{MAX_LOG_FILES}"));
    if oldest_log.exists() {
        std::fs::remove_file(&oldest_log)?;
    }

    for i in (1..MAX_LOG_FILES).rev() {
        let current_log = log_dir.join(format!("{log_name}.{i}"));
        let next_log = log_dir.join(format!("{log_name}.{}", i + 1));

        if current_log.exists() {
            std::fs::rename(&current_log, &next_log)?;
        }
    }

    let log_1 = log_dir.join(format!("{log_name}.1"));
    std::fs::rename(log_path, &log_1)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::create_test_dir;
    use std::fs;

    fn write_session(path: &Path, session: u32) {
        fs::write(path, format!("Session {session} log content")).unwrap();
    }

    #[test]
    fn test_rotate_moves_current_log_aside() {
        let temp_dir = create_test_dir();
        let log_path = temp_dir.path().join("app.log");
        write_session(&log_path, 1);

        rotate_logs_on_startup(&log_path).unwrap();

        let log_1 = temp_dir.path().join("app.log.1");
        assert!(!log_path.exists());
        assert_eq!(fs::read_to_string(log_1).unwrap(), "Session 1 log content");
    }

    #[test]
    fn test_rotate_keeps_at_most_max_files() {
        let temp_dir = create_test_dir();
        let log_path = temp_dir.path().join("app.log");

        for session in 1..=12 {
            write_session(&log_path, session);
            rotate_logs_on_startup(&log_path).unwrap();
        }

        for i in 1..=MAX_LOG_FILES {
            assert!(temp_dir.path().join(format!("app.log.{i}")).exists());
        }
        assert!(!temp_dir.path().join("app.log.10").exists());

        // Sessions 1-3 fell off the end
        let oldest = fs::read_to_string(temp_dir.path().join("app.log.9")).unwrap();
        assert_eq!(oldest, "Session 4 log content");
        let newest = fs::read_to_string(temp_dir.path().join("app.log.1")).unwrap();
        assert_eq!(newest, "Session 12 log content");
    }

    #[test]
    fn test_rotate_without_existing_log_is_noop() {
        let temp_dir = create_test_dir();
        let log_path = temp_dir.path().join("app.log");

        rotate_logs_on_startup(&log_path).unwrap();

        assert!(!log_path.exists());
        assert!(!temp_dir.path().join("app.log.1").exists());
    }

    #[test]
    fn test_rotate_with_gaps_in_history() {
        let temp_dir = create_test_dir();
        let log_path = temp_dir.path().join("app.log");
        fs::write(&log_path, "Current session").unwrap();
        fs::write(temp_dir.path().join("app.log.1"), "Previous session").unwrap();
        fs::write(temp_dir.path().join("app.log.5"), "Very old session").unwrap();

        rotate_logs_on_startup(&log_path).unwrap();

        let read = |name: &str| fs::read_to_string(temp_dir.path().join(name)).unwrap();
        assert_eq!(read("app.log.1"), "Current session");
        assert_eq!(read("app.log.2"), "Previous session");
        assert_eq!(read("app.log.6"), "Very old session");
    }
}
