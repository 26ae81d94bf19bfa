//! Environment-based configuration module
//!
//! This module provides configuration management for different environments:
//! - Development: Verbose logging, relaxed security
//! - Production: Minimal logging, strict security
//!
//! Configuration can be set via:
//! 1. Environment variables (highest priority)
//! 2. .env file
//! 3. Default values (lowest priority)

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::OnceLock;
use std::{env, fs};

use crate::scan::session::{CameraFacing, ScanType};

/// Application environment mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Production => "production",
        }
    }

    /// Get environment from APP_ENV variable or default to Development
    pub fn from_env() -> Self {
        match env::var("APP_ENV")
            .unwrap_or_else(|_| "development".to_string())
            .as_str()
        {
            "production" => Environment::Production,
            _ => Environment::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        *self == Environment::Production
    }
}

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Environment mode
    pub environment: Environment,

    /// Application name
    pub app_name: String,

    /// Application version
    pub version: String,

    /// Database configuration
    pub database: DatabaseConfig,

    /// Security configuration
    pub security: SecurityConfig,

    /// Logging configuration
    pub logging: LoggingConfig,

    /// Scanner configuration
    pub scanner: ScannerConfig,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite database path (relative to app data dir)
    pub path: String,

    /// Maximum number of connections
    pub max_connections: u32,

    /// Minimum number of connections
    pub min_connections: u32,

    /// Connection timeout in seconds
    pub connect_timeout_secs: u64,

    /// Idle timeout in seconds
    pub idle_timeout_secs: u64,
}

/// Security configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    /// Session timeout in minutes
    pub session_timeout_mins: u64,

    /// bcrypt cost factor for password hashing
    pub bcrypt_cost: u32,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    pub level: String,

    /// Log to file
    pub log_to_file: bool,

    /// Log to stdout
    pub log_to_stdout: bool,

    /// Use JSON format (true for production)
    pub json_format: bool,

    /// Maximum log file size in MB
    pub max_file_size_mb: u64,

    /// Maximum number of log files to keep
    pub max_log_files: u32,
}

/// Scanner configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScannerConfig {
    /// Scan mode when the scan screen opens ("barcode" or "qr")
    pub default_scan_type: String,

    /// Camera facing when the scan screen opens ("back" or "front")
    pub default_facing: String,
}

impl ScannerConfig {
    pub fn default_scan_type(&self) -> ScanType {
        ScanType::parse(&self.default_scan_type).unwrap_or(ScanType::Barcode)
    }

    pub fn default_facing(&self) -> CameraFacing {
        CameraFacing::parse(&self.default_facing).unwrap_or(CameraFacing::Back)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        let env = Environment::from_env();

        Self {
            environment: env,
            app_name: env::var("APP_NAME").unwrap_or_else(|_| "PrizeBox".to_string()),
            version: env!("CARGO_PKG_VERSION").to_string(),

            database: DatabaseConfig {
                path: env::var("DB_PATH").unwrap_or_else(|_| "prizebox.db".to_string()),
                max_connections: env::var("DB_MAX_CONNECTIONS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(10),
                min_connections: env::var("DB_MIN_CONNECTIONS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(2),
                connect_timeout_secs: 30,
                idle_timeout_secs: 600,
            },

            security: SecurityConfig {
                session_timeout_mins: env::var("SESSION_TIMEOUT_MINS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(480), // 8 hours
                bcrypt_cost: env::var("BCRYPT_COST")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(12),
            },

            logging: LoggingConfig {
                level: env::var("RUST_LOG").unwrap_or_else(|_| {
                    if env.is_production() {
                        "warn".to_string()
                    } else {
                        "debug".to_string()
                    }
                }),
                log_to_file: true,
                log_to_stdout: env::var("LOG_TO_STDOUT")
                    .map(|s| s == "true")
                    .unwrap_or(true),
                json_format: env.is_production(),
                max_file_size_mb: 10,
                max_log_files: 5,
            },

            scanner: ScannerConfig {
                default_scan_type: env::var("SCANNER_DEFAULT_MODE")
                    .unwrap_or_else(|_| "barcode".to_string()),
                default_facing: env::var("SCANNER_DEFAULT_FACING")
                    .unwrap_or_else(|_| "back".to_string()),
            },
        }
    }
}

impl AppConfig {
    /// Load configuration from environment and defaults
    pub fn load() -> Self {
        Self::default()
    }

    /// Load configuration from a .env file (if exists)
    pub fn load_from_file(path: &Path) -> Option<Self> {
        if !path.exists() {
            return None;
        }

        let content = fs::read_to_string(path).ok()?;

        // Simple .env parser (key=value format)
        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            if let Some((key, value)) = line.split_once('=') {
                let key = key.trim();
                let value = value.trim().trim_matches('"').trim_matches('\'');

                // Set environment variable (will be picked up by load())
                env::set_var(key, value);
            }
        }

        Some(Self::default())
    }

    pub fn is_production(&self) -> bool {
        self.environment.is_production()
    }
}

/// Global configuration instance
static GLOBAL_CONFIG: OnceLock<AppConfig> = OnceLock::new();

/// Initialize the global configuration
pub fn init_config() -> &'static AppConfig {
    GLOBAL_CONFIG.get_or_init(AppConfig::load)
}

/// Get the global configuration
pub fn get_config() -> &'static AppConfig {
    GLOBAL_CONFIG
        .get()
        .expect("Configuration not initialized. Call init_config() first.")
}
