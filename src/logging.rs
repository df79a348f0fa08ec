// Logging module for geosearch
// Structured logging on stderr, optionally mirrored to a file
//
// - Output formats: Text and JSON lines
// - Destinations: Console, or Console plus File
// - Independent log levels for console and file output
// - Timestamps formatted as YYYY-MM-DD HH:mm:ss
//
// stdout is reserved for the filter JSON the tool prints, so log records
// never go there.

use log::{Level, LevelFilter};
use serde::{Deserialize, Serialize};
use chrono::{DateTime, Local};
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use anyhow::{Context, Result};

/// Log output format options
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LogFormat {
    Text,
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            _ => Err(format!("Invalid log format: {}. Valid options: text, json", s)),
        }
    }
}

/// Log destination options
#[derive(Debug, Clone, PartialEq)]
pub enum LogDestination {
    Console,
    Both(PathBuf),
}

/// JSON log entry structure
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonLogEntry {
    pub timestamp: String,
    pub level: String,
    pub target: String,
    pub message: String,
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LogConfig {
    pub console_level: LevelFilter,
    pub file_level: Option<LevelFilter>,
    pub format: LogFormat,
    pub destination: LogDestination,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            console_level: LevelFilter::Warn,
            file_level: None,
            format: LogFormat::Text,
            destination: LogDestination::Console,
        }
    }
}

impl LogConfig {
    /// Most verbose level any destination wants
    pub fn max_level(&self) -> LevelFilter {
        match self.file_level {
            Some(file_level) => file_level.max(self.console_level),
            None => self.console_level,
        }
    }
}

/// Logger writing formatted records to stderr and an optional file
pub struct GeosearchLogger {
    config: LogConfig,
    file: Option<Mutex<File>>,
}

impl GeosearchLogger {
    pub fn new(config: LogConfig) -> Result<Self> {
        let file = match &config.destination {
            LogDestination::Console => None,
            LogDestination::Both(path) => Some(Mutex::new(open_log_file(path)?)),
        };
        Ok(Self { config, file })
    }

    fn format_timestamp() -> String {
        let now: DateTime<Local> = Local::now();
        now.format("%Y-%m-%d %H:%M:%S").to_string()
    }

    fn format_text_message(&self, level: Level, message: &str) -> String {
        format!("{} [{}] {}", Self::format_timestamp(), level.as_str(), message)
    }

    fn format_json_message(&self, level: Level, target: &str, message: &str) -> Result<String> {
        let entry = JsonLogEntry {
            timestamp: Self::format_timestamp(),
            level: level.as_str().to_string(),
            target: target.to_string(),
            message: message.to_string(),
        };

        serde_json::to_string(&entry)
            .context("Failed to serialize log entry to JSON")
    }

    fn format_record(&self, record: &log::Record) -> String {
        let message = record.args().to_string();
        match self.config.format {
            LogFormat::Text => self.format_text_message(record.level(), &message),
            LogFormat::Json => self
                .format_json_message(record.level(), record.target(), &message)
                .unwrap_or_else(|_| self.format_text_message(record.level(), &message)),
        }
    }

    fn should_log_to_console(&self, level: Level) -> bool {
        level <= self.config.console_level
    }

    fn should_log_to_file(&self, level: Level) -> bool {
        self.file.is_some() && self.config.file_level.is_some_and(|file_level| level <= file_level)
    }

    fn write_to_file(&self, formatted_message: &str) -> Result<()> {
        let Some(file) = &self.file else {
            return Ok(());
        };
        let mut file = file
            .lock()
            .map_err(|_| anyhow::anyhow!("Log file lock poisoned"))?;
        writeln!(file, "{}", formatted_message)
            .context("Failed to write to log file")
    }
}

impl log::Log for GeosearchLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        self.should_log_to_console(metadata.level()) ||
        self.should_log_to_file(metadata.level())
    }

    fn log(&self, record: &log::Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let formatted_message = self.format_record(record);

        if self.should_log_to_console(record.level()) {
            let _ = writeln!(io::stderr(), "{}", formatted_message);
        }
        if self.should_log_to_file(record.level()) {
            if let Err(e) = self.write_to_file(&formatted_message) {
                eprintln!("File logging error: {}", e);
            }
        }
    }

    fn flush(&self) {
        let _ = io::stderr().flush();
        if let Some(file) = &self.file {
            if let Ok(mut file) = file.lock() {
                let _ = file.flush();
            }
        }
    }
}

fn open_log_file(path: &Path) -> Result<File> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file: {}", path.display()))
}

/// Initialize the logging system with the given configuration
pub fn init_logger(config: LogConfig) -> Result<()> {
    let max_level = config.max_level();
    let logger = GeosearchLogger::new(config)?;

    log::set_boxed_logger(Box::new(logger))
        .context("Failed to set global logger")?;

    log::set_max_level(max_level);

    Ok(())
}

/// Parse a level name (`error` .. `trace`, or `off`), ignoring case
pub fn parse_log_level(level_str: &str) -> Result<LevelFilter> {
    level_str.trim().parse::<LevelFilter>().map_err(|_| {
        anyhow::anyhow!("Invalid log level: {}. Valid levels: error, warn, info, debug, trace, off", level_str)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use log::Log;
    use std::fs;
    use tempfile::NamedTempFile;

    #[test]
    fn test_log_format_parsing() {
        assert_eq!("Text".parse::<LogFormat>(), Ok(LogFormat::Text));
        assert_eq!("json".parse::<LogFormat>(), Ok(LogFormat::Json));
        assert!("yaml".parse::<LogFormat>().unwrap_err().contains("yaml"));
    }

    #[test]
    fn test_log_level_parsing() {
        let cases = [
            ("error", LevelFilter::Error),
            ("Warn", LevelFilter::Warn),
            ("info", LevelFilter::Info),
            ("DEBUG", LevelFilter::Debug),
            ("trace", LevelFilter::Trace),
            ("off", LevelFilter::Off),
        ];
        for (name, expected) in cases {
            assert_eq!(parse_log_level(name).unwrap(), expected, "level {}", name);
        }
        assert!(parse_log_level("loud").is_err());
    }

    #[test]
    fn test_max_level_takes_more_verbose() {
        let config = LogConfig {
            console_level: LevelFilter::Error,
            file_level: Some(LevelFilter::Debug),
            ..LogConfig::default()
        };
        assert_eq!(config.max_level(), LevelFilter::Debug);
        assert_eq!(LogConfig::default().max_level(), LevelFilter::Warn);
    }

    #[test]
    fn test_timestamp_format() {
        let timestamp = GeosearchLogger::format_timestamp();
        // YYYY-MM-DD HH:MM:SS
        assert_eq!(timestamp.len(), 19);
        assert_eq!(timestamp.chars().nth(4), Some('-'));
        assert_eq!(timestamp.chars().nth(7), Some('-'));
        assert_eq!(timestamp.chars().nth(10), Some(' '));
        assert_eq!(timestamp.chars().nth(13), Some(':'));
        assert_eq!(timestamp.chars().nth(16), Some(':'));
    }

    #[test]
    fn test_text_message_formatting() {
        let logger = GeosearchLogger::new(LogConfig::default()).unwrap();

        let formatted = logger.format_text_message(Level::Info, "Test message");
        assert!(formatted.contains("[INFO]"));
        assert!(formatted.ends_with("Test message"));
    }

    #[test]
    fn test_json_message_formatting() {
        let logger = GeosearchLogger::new(LogConfig::default()).unwrap();

        let formatted = logger
            .format_json_message(Level::Debug, "geosearch::cli", "Test message")
            .unwrap();
        let entry: JsonLogEntry = serde_json::from_str(&formatted).unwrap();
        assert_eq!(entry.level, "DEBUG");
        assert_eq!(entry.target, "geosearch::cli");
        assert_eq!(entry.message, "Test message");
    }

    #[test]
    fn test_file_destination_respects_file_level() {
        let temp_file = NamedTempFile::new().unwrap();
        let config = LogConfig {
            console_level: LevelFilter::Off,
            file_level: Some(LevelFilter::Info),
            format: LogFormat::Text,
            destination: LogDestination::Both(temp_file.path().to_path_buf()),
        };
        let logger = GeosearchLogger::new(config).unwrap();

        logger.log(
            &log::Record::builder()
                .level(Level::Info)
                .args(format_args!("kept"))
                .build(),
        );
        logger.log(
            &log::Record::builder()
                .level(Level::Debug)
                .args(format_args!("dropped"))
                .build(),
        );
        logger.flush();

        let content = fs::read_to_string(temp_file.path()).unwrap();
        assert!(content.contains("[INFO] kept"));
        assert!(!content.contains("dropped"));
    }

    #[test]
    fn test_console_only_never_logs_to_file() {
        let logger = GeosearchLogger::new(LogConfig {
            file_level: Some(LevelFilter::Trace),
            ..LogConfig::default()
        })
        .unwrap();
        assert!(!logger.should_log_to_file(Level::Error));
    }
}
