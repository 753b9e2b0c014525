//! Configuration type definitions.

use std::fmt;
use std::path::PathBuf;

use chrono::FixedOffset;
use serde::Deserialize;
use serde_json::Value;

use crate::common::error::{ConfigError, ConfigResult};
use crate::config::defaults::TIME_PLACEHOLDER;
use crate::config::logging::LoggingChannels;
use crate::config::registry::ServerRegistry;

/// Character set used for networked SQL connections.
pub const SQL_CHARSET: &str = "utf-8";

/// Fully resolved application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub web: WebConfig,
    pub sql: SqlConfig,
    pub server_paths: Vec<PathBuf>,
    pub servers: ServerRegistry,
    pub message_filter: ArkMessageFilterConfig,
    pub discord: DiscordConfig,
    pub broadcast: BroadcastConfig,
    pub state_message: StateMessages,
    pub logging: LoggingChannels,
    /// Battery percentage below which a low-battery warning is raised.
    pub low_battery: i64,
    pub timezone: FixedOffset,
}

/// Sections of the resolved tree that deserialize directly.
#[derive(Debug, Clone, Deserialize)]
struct RawConfig {
    web: WebConfig,
    sql: SqlConfig,
    servers: Vec<PathBuf>,
    ark_message_filter: ArkMessageFilterConfig,
    discord: DiscordConfig,
    broadcast: BroadcastConfig,
    state_message: StateMessages,
    logging: Value,
    low_battery: i64,
    timezone: i32,
}

impl AppConfig {
    /// Extract typed sections from a resolved tree and load every server
    /// document it lists. Any missing key is an error.
    pub fn from_tree(tree: &Value) -> ConfigResult<Self> {
        let raw = RawConfig::deserialize(tree).map_err(|e| ConfigError::MissingField {
            path: "resolved configuration".to_string(),
            message: e.to_string(),
        })?;

        let servers = ServerRegistry::build(raw.servers.as_slice())?;

        Ok(Self {
            web: raw.web,
            sql: raw.sql,
            server_paths: raw.servers,
            servers,
            message_filter: raw.ark_message_filter,
            discord: raw.discord,
            broadcast: raw.broadcast,
            state_message: raw.state_message,
            logging: LoggingChannels::from_section(&raw.logging)?,
            low_battery: raw.low_battery,
            timezone: timezone_from_hours(raw.timezone)?,
        })
    }
}

/// Build a fixed UTC offset from whole hours.
pub fn timezone_from_hours(hours: i32) -> ConfigResult<FixedOffset> {
    hours
        .checked_mul(3600)
        .and_then(FixedOffset::east_opt)
        .ok_or_else(|| ConfigError::InvalidValue {
            field: "timezone".to_string(),
            message: format!("{} is not a valid UTC offset in hours", hours),
        })
}

/// Web dashboard bind settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WebConfig {
    pub host: String,
    pub port: u16,
    pub debug: bool,
}

impl fmt::Display for WebConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// SQL section as written in the config file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SqlConfig {
    /// Use a networked MySQL server instead of the embedded SQLite file.
    pub mysql: bool,
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
}

/// Storage backend selected by [`SqlConfig`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SqlBackend {
    /// SQLite file on local disk.
    Embedded { database: PathBuf },
    Networked {
        host: String,
        port: u16,
        user: String,
        password: String,
        database: String,
        charset: &'static str,
    },
}

impl SqlConfig {
    pub fn backend(&self) -> SqlBackend {
        if self.mysql {
            SqlBackend::Networked {
                host: self.host.clone(),
                port: self.port,
                user: self.user.clone(),
                password: self.password.clone(),
                database: self.database.clone(),
                charset: SQL_CHARSET,
            }
        } else {
            SqlBackend::Embedded {
                database: PathBuf::from(format!("{}.db", self.database)),
            }
        }
    }
}

impl fmt::Display for SqlBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Embedded { database } => write!(f, "sqlite:{}", database.display()),
            Self::Networked {
                host,
                port,
                user,
                database,
                ..
            } => write!(f, "mysql://{}@{}:{}/{}", user, host, port, database),
        }
    }
}

/// Match lists used to pick interesting lines out of the server chat log.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ArkMessageFilterConfig {
    pub startswith: Vec<String>,
    pub include: Vec<String>,
    pub endswith: Vec<String>,
}

/// Discord bot settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DiscordConfig {
    pub token: String,
    /// Command prefixes.
    pub prefixs: Vec<String>,
    pub admin_role: u64,
}

/// Kind of in-game broadcast.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BroadcastKind {
    Save,
    Stop,
    Restart,
    Saving,
}

impl BroadcastKind {
    pub const ALL: [BroadcastKind; 4] = [Self::Save, Self::Stop, Self::Restart, Self::Saving];
}

/// In-game broadcast templates. `$TIME` is replaced with minutes remaining.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BroadcastConfig {
    pub save: String,
    pub stop: String,
    pub restart: String,
    pub saving: String,
}

impl BroadcastConfig {
    pub fn template(&self, kind: BroadcastKind) -> &str {
        match kind {
            BroadcastKind::Save => &self.save,
            BroadcastKind::Stop => &self.stop,
            BroadcastKind::Restart => &self.restart,
            BroadcastKind::Saving => &self.saving,
        }
    }

    /// Render a broadcast for the given number of minutes.
    pub fn render(&self, kind: BroadcastKind, minutes: u32) -> String {
        self.template(kind)
            .replace(TIME_PLACEHOLDER, &minutes.to_string())
    }
}

/// Text shown in a server's Discord state channel.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StateMessages {
    pub running: String,
    pub stopped: String,
    pub starting: String,
    pub rcon_disconnect: String,
    pub network_disconnect: String,
}
