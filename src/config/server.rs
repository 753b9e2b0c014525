//! Per-server configuration documents.

use std::path::{Path, PathBuf};

use chrono::{NaiveTime, Timelike};
use serde::Deserialize;

use crate::common::error::{ConfigError, ConfigResult};
use crate::config::store;

/// One scheduled action at a time of day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeEntry {
    pub time: NaiveTime,
    /// Wipe wild dinos as part of the action.
    pub clear_dino: bool,
}

/// Schedule entry as written in a server document.
#[derive(Debug, Clone, Deserialize)]
pub struct TimeRecord {
    pub time: String,
    pub clear_dino: bool,
}

impl TimeEntry {
    pub fn new(time: &str, clear_dino: bool) -> ConfigResult<Self> {
        Ok(Self {
            time: parse_time(time)?,
            clear_dino,
        })
    }
}

impl TryFrom<TimeRecord> for TimeEntry {
    type Error = ConfigError;

    fn try_from(record: TimeRecord) -> ConfigResult<Self> {
        Self::new(&record.time, record.clear_dino)
    }
}

/// Parse an ISO-8601 time of day (`HH`, `HH:MM`, `HH:MM:SS[.ffffff]`).
pub fn parse_time(value: &str) -> ConfigResult<NaiveTime> {
    let invalid = |message: &str| ConfigError::InvalidTime {
        value: value.to_string(),
        message: message.to_string(),
    };

    let (clock, fraction) = match value.split_once('.') {
        Some((clock, fraction)) => (clock, Some(fraction)),
        None => (value, None),
    };
    let fields: Vec<&str> = clock.split(':').collect();
    if fields.len() > 3 || !fields.iter().all(|f| is_digits(f, 2..=2)) {
        return Err(invalid("expected HH, HH:MM or HH:MM:SS"));
    }
    if let Some(fraction) = fraction {
        if fields.len() != 3 || !is_digits(fraction, 1..=6) {
            return Err(invalid("fraction needs HH:MM:SS and 1 to 6 digits"));
        }
    }

    // chrono needs every clock field present.
    let candidate = match fields.len() {
        1 => format!("{}:00:00", value),
        2 => format!("{}:00", value),
        _ => value.to_string(),
    };
    let time = NaiveTime::parse_from_str(&candidate, "%H:%M:%S%.f")
        .map_err(|e| invalid(&e.to_string()))?;

    // chrono encodes a leap second as second 59 with an extra second of nanos.
    if time.second() == 59 && time.nanosecond() >= 1_000_000_000 {
        return Err(invalid("second out of range"));
    }
    Ok(time)
}

fn is_digits(field: &str, len: std::ops::RangeInclusive<usize>) -> bool {
    len.contains(&field.len()) && field.bytes().all(|b| b.is_ascii_digit())
}

/// RCON endpoint for a server.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RconConfig {
    pub address: String,
    pub port: u16,
    pub password: String,
    /// Seconds.
    pub timeout: u64,
}

/// Discord channels bound to a server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct ServerDiscordConfig {
    pub text_channel_id: u64,
    pub state_channel_id: u64,
}

/// Server document as stored on disk.
#[derive(Debug, Clone, Deserialize)]
struct ServerDocument {
    #[serde(rename = "unique-key")]
    unique_key: String,
    dir_path: String,
    file_name: String,
    display_name: String,
    rcon: RconConfig,
    discord: ServerDiscordConfig,
    save_time: Vec<TimeRecord>,
    restart_time: Vec<TimeRecord>,
}

/// Validated configuration for one ARK server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub unique_key: String,
    pub dir_path: String,
    pub file_name: String,
    pub display_name: String,
    pub rcon: RconConfig,
    pub discord: ServerDiscordConfig,
    pub save_time: Vec<TimeEntry>,
    pub restart_time: Vec<TimeEntry>,
}

impl ServerConfig {
    /// Path of the server executable.
    pub fn executable_path(&self) -> PathBuf {
        Path::new(&self.dir_path).join(&self.file_name)
    }

    fn from_document(doc: ServerDocument) -> ConfigResult<Self> {
        Ok(Self {
            unique_key: doc.unique_key,
            dir_path: doc.dir_path,
            file_name: doc.file_name,
            display_name: doc.display_name,
            rcon: doc.rcon,
            discord: doc.discord,
            save_time: schedule(doc.save_time)?,
            restart_time: schedule(doc.restart_time)?,
        })
    }
}

fn schedule(records: Vec<TimeRecord>) -> ConfigResult<Vec<TimeEntry>> {
    records.into_iter().map(TimeEntry::try_from).collect()
}

/// Load one server document. Every field is required.
pub fn load_server(path: impl AsRef<Path>) -> ConfigResult<ServerConfig> {
    let path = path.as_ref();
    let wrap = |e: ConfigError| ConfigError::Server {
        path: path.display().to_string(),
        source: Box::new(e),
    };

    let value = store::load_value(path).map_err(wrap)?;
    let doc = ServerDocument::deserialize(&value)
        .map_err(|e| ConfigError::MissingField {
            path: path.display().to_string(),
            message: e.to_string(),
        })
        .map_err(wrap)?;

    ServerConfig::from_document(doc).map_err(wrap)
}
