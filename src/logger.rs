//! Production-ready logging module with structured logging support
//!
//! This module provides a centralized logging system with:
//! - Log levels (ERROR, WARN, INFO, DEBUG)
//! - Structured JSON logging for production
//! - Human-readable logging for development
//! - File rotation for production deployments
//! - Sensitive data redaction on structured payloads

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, OnceLock};

use crate::config::LoggingConfig;

/// Log levels following RFC 5424
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    Error = 0,
    Warn = 1,
    Info = 2,
    Debug = 3,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "ERROR",
            LogLevel::Warn => "WARN",
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s.to_uppercase().as_str() {
            "DEBUG" => LogLevel::Debug,
            "INFO" => LogLevel::Info,
            "WARN" => LogLevel::Warn,
            "ERROR" => LogLevel::Error,
            _ => LogLevel::Info,
        }
    }
}

/// Structured log entry
#[derive(Debug, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Local>,
    pub level: LogLevel,
    pub target: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Main logger instance
pub struct Logger {
    config: LoggingConfig,
    level: LogLevel,
    log_dir: PathBuf,
    current_file: Mutex<Option<BufWriter<File>>>,
}

impl Logger {
    /// Initialize the logger with the given configuration
    pub fn init(app_data_dir: &Path, config: LoggingConfig) -> Result<Self, String> {
        let log_dir = app_data_dir.join("logs");

        std::fs::create_dir_all(&log_dir)
            .map_err(|e| format!("Failed to create log directory: {}", e))?;

        let logger = Self {
            level: LogLevel::parse(&config.level),
            config,
            log_dir,
            current_file: Mutex::new(None),
        };

        logger.open_log_file()?;

        Ok(logger)
    }

    /// Log file path for today
    fn log_file_path(&self) -> PathBuf {
        let date = Local::now().format("%Y-%m-%d");
        self.log_dir.join(format!("prizebox-{}.log", date))
    }

    /// Rotate today's log file when it exceeds the size limit, then
    /// (re)open it for appending.
    fn open_log_file(&self) -> Result<(), String> {
        let log_path = self.log_file_path();

        if log_path.exists() {
            let size = std::fs::metadata(&log_path)
                .map_err(|e| format!("Failed to read log file metadata: {}", e))?
                .len();

            if size >= self.config.max_file_size_mb * 1024 * 1024 {
                let date = Local::now().format("%Y-%m-%d");

                // Shift prizebox-DATE.N.log up by one, oldest falls off
                for i in (1..self.config.max_log_files).rev() {
                    let from = self.log_dir.join(format!("prizebox-{}.{}.log", date, i));
                    let to = self.log_dir.join(format!("prizebox-{}.{}.log", date, i + 1));
                    if from.exists() {
                        let _ = std::fs::rename(&from, &to);
                    }
                }

                let rotated = self.log_dir.join(format!("prizebox-{}.1.log", date));
                let _ = std::fs::rename(&log_path, &rotated);

                let oldest = self
                    .log_dir
                    .join(format!("prizebox-{}.{}.log", date, self.config.max_log_files));
                if oldest.exists() {
                    let _ = std::fs::remove_file(&oldest);
                }
            }
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)
            .map_err(|e| format!("Failed to open log file: {}", e))?;

        *self.current_file.lock().unwrap() = Some(BufWriter::new(file));

        Ok(())
    }

    /// Write a log entry
    fn write(&self, entry: &LogEntry) {
        if entry.level > self.level {
            return;
        }

        let log_line = if self.config.json_format {
            serde_json::to_string(entry).unwrap_or_else(|_| "{}".to_string())
        } else {
            format!(
                "{} [{}] [{}] {}{}{}",
                entry.timestamp.format("%Y-%m-%d %H:%M:%S%.3f"),
                entry.level.as_str(),
                entry.target,
                entry.message,
                entry
                    .data
                    .as_ref()
                    .map(|d| format!(" | {}", d))
                    .unwrap_or_default(),
                entry
                    .error
                    .as_ref()
                    .map(|e| format!(" | error: {}", e))
                    .unwrap_or_default()
            )
        };

        if self.config.log_to_stdout {
            match entry.level {
                LogLevel::Error | LogLevel::Warn => eprintln!("{}", log_line),
                _ => println!("{}", log_line),
            }
        }

        if self.config.log_to_file {
            if let Ok(mut guard) = self.current_file.lock() {
                if let Some(writer) = guard.as_mut() {
                    let _ = writeln!(writer, "{}", log_line);
                    let _ = writer.flush();
                }
            }
        }
    }

    /// Log an error message
    pub fn error(&self, target: &'static str, message: &str, error: Option<&str>) {
        self.write(&LogEntry {
            timestamp: Local::now(),
            level: LogLevel::Error,
            target,
            message: message.to_string(),
            data: None,
            error: error.map(String::from),
        });
    }

    /// Log a warning message
    pub fn warn(&self, target: &'static str, message: &str) {
        self.write(&LogEntry {
            timestamp: Local::now(),
            level: LogLevel::Warn,
            target,
            message: message.to_string(),
            data: None,
            error: None,
        });
    }

    /// Log an info message with optional data (sensitive fields redacted)
    pub fn info(&self, target: &'static str, message: &str, data: Option<serde_json::Value>) {
        self.write(&LogEntry {
            timestamp: Local::now(),
            level: LogLevel::Info,
            target,
            message: message.to_string(),
            data: data.map(redact_sensitive_data),
            error: None,
        });
    }

    /// Log a debug message with optional data (sensitive fields redacted)
    pub fn debug(&self, target: &'static str, message: &str, data: Option<serde_json::Value>) {
        self.write(&LogEntry {
            timestamp: Local::now(),
            level: LogLevel::Debug,
            target,
            message: message.to_string(),
            data: data.map(redact_sensitive_data),
            error: None,
        });
    }
}

/// Redact credential-looking fields from structured payloads before
/// they hit disk.
fn redact_sensitive_data(value: serde_json::Value) -> serde_json::Value {
    match value {
        serde_json::Value::Object(mut map) => {
            for (key, val) in map.iter_mut() {
                let key_lower = key.to_lowercase();
                if key_lower.contains("password")
                    || key_lower.contains("token")
                    || key_lower.contains("secret")
                    || key_lower.contains("hash")
                {
                    *val = serde_json::Value::String("***REDACTED***".to_string());
                } else {
                    *val = redact_sensitive_data(val.clone());
                }
            }
            serde_json::Value::Object(map)
        }
        serde_json::Value::Array(arr) => {
            serde_json::Value::Array(arr.into_iter().map(redact_sensitive_data).collect())
        }
        _ => value,
    }
}

/// Global logger instance
static GLOBAL_LOGGER: OnceLock<Mutex<Logger>> = OnceLock::new();

/// Initialize the global logger
pub fn init_global_logger(app_data_dir: &Path) -> Result<(), String> {
    let config = crate::config::get_config().logging.clone();
    let logger = Logger::init(app_data_dir, config)?;

    GLOBAL_LOGGER
        .set(Mutex::new(logger))
        .map_err(|_| "Logger already initialized")?;

    Ok(())
}

/// Get the global logger instance
pub fn get_logger() -> Option<&'static Mutex<Logger>> {
    GLOBAL_LOGGER.get()
}

/// Convenience macros for logging
#[macro_export]
macro_rules! log_error {
    ($target:expr, $msg:expr) => {
        if let Some(logger) = $crate::logger::get_logger() {
            if let Ok(l) = logger.lock() {
                l.error($target, $msg, None);
            }
        }
    };
    ($target:expr, $msg:expr, $err:expr) => {
        if let Some(logger) = $crate::logger::get_logger() {
            if let Ok(l) = logger.lock() {
                l.error($target, $msg, Some(&$err));
            }
        }
    };
}

#[macro_export]
macro_rules! log_warn {
    ($target:expr, $msg:expr) => {
        if let Some(logger) = $crate::logger::get_logger() {
            if let Ok(l) = logger.lock() {
                l.warn($target, $msg);
            }
        }
    };
}

#[macro_export]
macro_rules! log_info {
    ($target:expr, $msg:expr) => {
        if let Some(logger) = $crate::logger::get_logger() {
            if let Ok(l) = logger.lock() {
                l.info($target, $msg, None);
            }
        }
    };
    ($target:expr, $msg:expr, $data:expr) => {
        if let Some(logger) = $crate::logger::get_logger() {
            if let Ok(l) = logger.lock() {
                let opt_data: ::std::option::Option<serde_json::Value> =
                    ::std::option::Option::Some($data);
                l.info($target, $msg, opt_data);
            }
        }
    };
}

#[macro_export]
macro_rules! log_debug {
    ($target:expr, $msg:expr) => {
        if let Some(logger) = $crate::logger::get_logger() {
            if let Ok(l) = logger.lock() {
                l.debug($target, $msg, None);
            }
        }
    };
    ($target:expr, $msg:expr, $data:expr) => {
        if let Some(logger) = $crate::logger::get_logger() {
            if let Ok(l) = logger.lock() {
                let opt_data: ::std::option::Option<serde_json::Value> =
                    ::std::option::Option::Some($data);
                l.debug($target, $msg, opt_data);
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redaction_masks_credentials() {
        let payload = serde_json::json!({
            "username": "alice",
            "password": "hunter2",
            "session_token": "abc",
            "nested": { "password_hash": "xyz" }
        });
        let redacted = redact_sensitive_data(payload);
        assert_eq!(redacted["username"], "alice");
        assert_eq!(redacted["password"], "***REDACTED***");
        assert_eq!(redacted["session_token"], "***REDACTED***");
        assert_eq!(redacted["nested"]["password_hash"], "***REDACTED***");
    }

    #[test]
    fn test_level_parsing_defaults_to_info() {
        assert_eq!(LogLevel::parse("debug"), LogLevel::Debug);
        assert_eq!(LogLevel::parse("WARN"), LogLevel::Warn);
        assert_eq!(LogLevel::parse("bogus"), LogLevel::Info);
    }
}
