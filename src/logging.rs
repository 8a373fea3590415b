//! Tracing setup: console output plus a plain-text log file.
//!
//! Components never hold a logger; they emit through the `tracing` macros and
//! whichever subscriber is installed receives the events. The binary installs
//! one here at startup; tests can scope their own with
//! `tracing::subscriber::with_default`.

use std::error::Error;
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::time::UtcTime;
use tracing_subscriber::{EnvFilter, fmt as tfmt, layer::SubscriberExt as _, util::SubscriberInitExt as _};

pub const LOG_DIR: &str = "logs";
pub const LOG_FILE: &str = "run.log";

/// Flushes the log file when dropped; keep it alive for the whole run.
pub struct LogGuard {
    _worker: WorkerGuard,
    pub path: PathBuf,
}

pub fn log_file_path(output_dir: &Path) -> PathBuf {
    output_dir.join(LOG_DIR).join(LOG_FILE)
}

/// Install the global subscriber. `RUST_LOG` overrides the default `info` level.
pub fn init(output_dir: &Path) -> Result<LogGuard, Box<dyn Error>> {
    let path = log_file_path(output_dir);
    std::fs::create_dir_all(output_dir.join(LOG_DIR))?;

    let file_appender = tracing_appender::rolling::never(output_dir.join(LOG_DIR), LOG_FILE);
    let (file_writer, worker) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let console_layer = tfmt::layer()
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(UtcTime::rfc_3339());
    let file_layer = tfmt::layer()
        .with_ansi(false)
        .with_target(true)
        .with_timer(UtcTime::rfc_3339())
        .with_writer(file_writer);

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()?;

    Ok(LogGuard {
        _worker: worker,
        path,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_file_path() {
        assert_eq!(
            log_file_path(Path::new("output")),
            PathBuf::from("output/logs/run.log")
        );
    }

    #[test]
    fn test_scoped_subscriber_receives_component_events() {
        use std::io::Write;
        use std::sync::{Arc, Mutex};

        #[derive(Clone, Default)]
        struct Buffer(Arc<Mutex<Vec<u8>>>);

        impl Write for Buffer {
            fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
                self.0.lock().unwrap().extend_from_slice(buf);
                Ok(buf.len())
            }
            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }

        let buffer = Buffer::default();
        let writer = buffer.clone();
        let subscriber = tfmt()
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            let window = crate::window::MonthWindow::ending_at(
                chrono::NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
                0,
            );
            let mut source = EmptySource;
            let item = crate::models::WorkItem {
                query: "q".to_string(),
                order_by: crate::models::OrderBy::Date,
                months: 0,
            };
            crate::pagination::Paginator::new(window)
                .run(&mut source, &item)
                .unwrap();
        });

        let output = String::from_utf8(buffer.0.lock().unwrap().clone()).unwrap();
        assert!(output.contains("Pagination finished"));
    }

    struct EmptySource;

    impl crate::pagination::PageSource for EmptySource {
        fn search(&mut self, _: &str, _: crate::models::OrderBy) -> crate::error::Result<()> {
            Ok(())
        }
        fn extract_chunk(&mut self, _: &str) -> crate::error::Result<Vec<crate::models::Article>> {
            Ok(Vec::new())
        }
        fn request_more(&mut self) -> crate::error::Result<bool> {
            Ok(false)
        }
    }
}
