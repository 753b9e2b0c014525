//! Per-channel logging configuration.
//!
//! Levels are given by name in the config document and stored as their
//! numeric severity code. An unknown name keeps the built-in default for
//! that field instead of failing the load.

use std::fmt;
use std::path::PathBuf;

use serde::Deserialize;
use serde_json::Value;
use tracing::level_filters::LevelFilter;

use crate::common::error::{ConfigError, ConfigResult};

/// Level used when a configured level name is not recognised (INFO).
pub const DEFAULT_LEVEL: u8 = 20;

/// Recognised severity names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Critical,
    Error,
    Warning,
    Info,
    Debug,
    NotSet,
}

impl LogLevel {
    /// Match a severity name exactly. `FATAL` and `WARN` are accepted aliases.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "CRITICAL" | "FATAL" => Some(Self::Critical),
            "ERROR" => Some(Self::Error),
            "WARNING" | "WARN" => Some(Self::Warning),
            "INFO" => Some(Self::Info),
            "DEBUG" => Some(Self::Debug),
            "NOTSET" => Some(Self::NotSet),
            _ => None,
        }
    }

    /// Look up a level by its numeric code.
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            50 => Some(Self::Critical),
            40 => Some(Self::Error),
            30 => Some(Self::Warning),
            20 => Some(Self::Info),
            10 => Some(Self::Debug),
            0 => Some(Self::NotSet),
            _ => None,
        }
    }

    pub fn code(self) -> u8 {
        match self {
            Self::Critical => 50,
            Self::Error => 40,
            Self::Warning => 30,
            Self::Info => 20,
            Self::Debug => 10,
            Self::NotSet => 0,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Critical => "CRITICAL",
            Self::Error => "ERROR",
            Self::Warning => "WARNING",
            Self::Info => "INFO",
            Self::Debug => "DEBUG",
            Self::NotSet => "NOTSET",
        }
    }

    /// Closest tracing filter. NOTSET lets everything through.
    pub fn level_filter(self) -> LevelFilter {
        match self {
            Self::Critical | Self::Error => LevelFilter::ERROR,
            Self::Warning => LevelFilter::WARN,
            Self::Info => LevelFilter::INFO,
            Self::Debug => LevelFilter::DEBUG,
            Self::NotSet => LevelFilter::TRACE,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Raw logging document as it appears in the config tree.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingDocument {
    pub stream_level: Value,
    pub file_level: Value,
    pub backup_count: i64,
    pub file_name: String,
    pub dir_path: String,
}

/// Validated logging settings for one channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    /// Console verbosity, as a severity code.
    pub stream_level: u8,
    /// Log file verbosity, as a severity code.
    pub file_level: u8,
    /// Number of rotated log files to keep.
    pub backup_count: u32,
    pub file_name: String,
    pub dir_path: String,
}

impl LoggingConfig {
    /// Build from a raw document. Each level falls back to [`DEFAULT_LEVEL`]
    /// on its own when its name is not recognised.
    pub fn from_document(doc: LoggingDocument) -> Self {
        Self {
            stream_level: level_code(&doc.stream_level),
            file_level: level_code(&doc.file_level),
            backup_count: u32::try_from(doc.backup_count.unsigned_abs()).unwrap_or(u32::MAX),
            file_name: doc.file_name,
            dir_path: doc.dir_path,
        }
    }

    /// Build from an untyped config value. Missing keys are an error.
    pub fn from_value(channel: LogChannel, value: &Value) -> ConfigResult<Self> {
        let doc = LoggingDocument::deserialize(value).map_err(|e| ConfigError::MissingField {
            path: format!("logging.{}", channel),
            message: e.to_string(),
        })?;
        Ok(Self::from_document(doc))
    }

    pub fn stream_filter(&self) -> LevelFilter {
        filter_for(self.stream_level)
    }

    pub fn file_filter(&self) -> LevelFilter {
        filter_for(self.file_level)
    }

    /// Full path of the active log file.
    pub fn file_path(&self) -> PathBuf {
        PathBuf::from(&self.dir_path).join(format!("{}.log", self.file_name))
    }
}

fn level_code(value: &Value) -> u8 {
    value
        .as_str()
        .and_then(LogLevel::from_name)
        .map(LogLevel::code)
        .unwrap_or(DEFAULT_LEVEL)
}

fn filter_for(code: u8) -> LevelFilter {
    LogLevel::from_code(code)
        .unwrap_or(LogLevel::Info)
        .level_filter()
}

/// Named logging channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogChannel {
    Main,
    Discord,
    Web,
    Rcon,
}

impl LogChannel {
    pub const ALL: [LogChannel; 4] = [Self::Main, Self::Discord, Self::Web, Self::Rcon];

    /// Key in the `logging` section, also used as the tracing target.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Main => "main",
            Self::Discord => "discord",
            Self::Web => "web",
            Self::Rcon => "rcon",
        }
    }
}

impl fmt::Display for LogChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Logging settings for every channel.
#[derive(Debug, Clone)]
pub struct LoggingChannels {
    pub main: LoggingConfig,
    pub discord: LoggingConfig,
    pub web: LoggingConfig,
    pub rcon: LoggingConfig,
}

impl LoggingChannels {
    /// Build from the `logging` section of the resolved tree.
    pub fn from_section(section: &Value) -> ConfigResult<Self> {
        let channel = |c: LogChannel| -> ConfigResult<LoggingConfig> {
            let value = section.get(c.as_str()).ok_or_else(|| ConfigError::MissingField {
                path: "logging".to_string(),
                message: format!("missing channel `{}`", c),
            })?;
            LoggingConfig::from_value(c, value)
        };

        Ok(Self {
            main: channel(LogChannel::Main)?,
            discord: channel(LogChannel::Discord)?,
            web: channel(LogChannel::Web)?,
            rcon: channel(LogChannel::Rcon)?,
        })
    }

    pub fn get(&self, channel: LogChannel) -> &LoggingConfig {
        match channel {
            LogChannel::Main => &self.main,
            LogChannel::Discord => &self.discord,
            LogChannel::Web => &self.web,
            LogChannel::Rcon => &self.rcon,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (LogChannel, &LoggingConfig)> {
        LogChannel::ALL.into_iter().map(move |c| (c, self.get(c)))
    }
}
