use chrono::{DateTime, Local};
use log::{Level, LevelFilter, Metadata, Record};
use std::io::Write;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

struct LogEntry {
    timestamp: DateTime<Local>,
    level: Level,
    message: String,
}

/// Writes records to stderr and counts warnings for an end-of-run summary
#[derive(Clone)]
pub struct CliLogger {
    level: LevelFilter,
    warnings: Arc<AtomicUsize>,
}

impl CliLogger {
    pub fn new(debug: bool) -> Self {
        Self {
            level: if debug {
                LevelFilter::Debug
            } else {
                LevelFilter::Info
            },
            warnings: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn init(self) -> Result<Self, log::SetLoggerError> {
        log::set_boxed_logger(Box::new(self.clone()))?;
        log::set_max_level(self.level);
        Ok(self)
    }

    pub fn warning_count(&self) -> usize {
        self.warnings.load(Ordering::Relaxed)
    }

    fn format(&self, entry: &LogEntry, target: &str) -> String {
        if self.level >= LevelFilter::Debug {
            format!(
                "[{} {:<5} {}] {}",
                entry.timestamp.format("%H:%M:%S%.3f"),
                entry.level,
                target,
                entry.message
            )
        } else {
            format!(
                "[{} {:<5}] {}",
                entry.timestamp.format("%H:%M:%S"),
                entry.level,
                entry.message
            )
        }
    }
}

impl log::Log for CliLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let entry = LogEntry {
            timestamp: Local::now(),
            level: record.level(),
            message: format!("{}", record.args()),
        };
        let line = self.format(&entry, record.target());
        let _ = writeln!(std::io::stderr().lock(), "{}", line);

        if entry.level <= Level::Warn {
            self.warnings.fetch_add(1, Ordering::Relaxed);
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}
