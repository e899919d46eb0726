//! Console + file logger behind the `log` facade.
//!
//! Every line is timestamped, printed to stderr and appended to the run's
//! log file so a board can be audited after the fact.

use chrono::Local;
use log::{LevelFilter, Log, Metadata, Record};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Log file name inside the logs directory.
pub const LOG_FILE_NAME: &str = "draftboard-ocr.log";

struct BoardLogger {
    file: Option<Mutex<File>>,
}

impl Log for BoardLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        // Follows log::max_level so the level can be raised after init
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = format_line(record.level(), &record.args().to_string());
        eprint!("{}", line);
        if let Some(file) = &self.file {
            if let Ok(mut file) = file.lock() {
                let _ = file.write_all(line.as_bytes());
            }
        }
    }

    fn flush(&self) {
        if let Some(file) = &self.file {
            if let Ok(mut file) = file.lock() {
                let _ = file.flush();
            }
        }
    }
}

fn format_line(level: log::Level, msg: &str) -> String {
    let timestamp = Local::now().format("%H:%M:%S%.3f");
    format!("[{}] {:<5} {}\n", timestamp, level, msg)
}

/// Parses a level name from config ("debug", "info", ...). Unknown names map to Info.
pub fn parse_level(name: &str) -> LevelFilter {
    name.parse().unwrap_or(LevelFilter::Info)
}

/// Installs the global logger. `log_dir` receives the log file; if it
/// cannot be opened, logging continues on stderr only.
pub fn init(level: LevelFilter, log_dir: Option<&Path>) -> PathBuf {
    let log_path = log_dir
        .map(|d| d.join(LOG_FILE_NAME))
        .unwrap_or_else(|| PathBuf::from(LOG_FILE_NAME));

    let file = log_dir.and_then(|_| {
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)
            .ok()
            .map(Mutex::new)
    });

    let logger = BoardLogger { file };
    if log::set_boxed_logger(Box::new(logger)).is_ok() {
        log::set_max_level(level);
    }
    log_path
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_installs_file_logger() {
        let dir = tempfile::tempdir().unwrap();
        let path = init(LevelFilter::Info, Some(dir.path()));
        assert_eq!(path, dir.path().join(LOG_FILE_NAME));

        log::info!("pick 12 reconciled");
        log::debug!("below the level");
        log::logger().flush();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("pick 12 reconciled"));
        assert!(!contents.contains("below the level"));
    }

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("debug"), LevelFilter::Debug);
        assert_eq!(parse_level("WARN"), LevelFilter::Warn);
        assert_eq!(parse_level("nonsense"), LevelFilter::Info);
    }

    #[test]
    fn test_format_line_has_level_and_message() {
        let line = format_line(log::Level::Warn, "cell r0c1 unreadable");
        assert!(line.starts_with('['));
        assert!(line.contains("WARN"));
        assert!(line.ends_with("cell r0c1 unreadable\n"));
    }
}
