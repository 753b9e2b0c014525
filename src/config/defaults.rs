//! Built-in configuration tree.
//!
//! Every configurable key has a default here. The override file is merged
//! on top of this tree, so keys missing from an older override file are
//! filled in on the next start.

use serde_json::{json, Value};

/// Default override file location, relative to the working directory.
pub const CONFIG_PATH: &str = "config.json";

/// Placeholder substituted by broadcast templates.
pub const TIME_PLACEHOLDER: &str = "$TIME";

/// Build the default configuration tree.
pub fn default_tree() -> Value {
    json!({
        "web": {
            "host": "0.0.0.0",
            "port": 5000,
            "debug": true,
        },
        "sql": {
            "mysql": false,
            "host": "",
            "port": 0,
            "user": "",
            "password": "",
            "database": "data",
        },
        "servers": [],
        "ark_message_filter": {
            "startswith": [
                "SERVER:",
            ],
            "include": [
                "has entered your zone.",
                "Souls were destroyed by ",
                "Soul was destroyed by ",
                "killed!",
            ],
            "endswith": [],
        },
        "discord": {
            "token": "",
            "prefixs": [],
            "admin_role": 0,
        },
        "broadcast": {
            "save": "Server will save in $TIME min.",
            "stop": "Server will shutdown in $TIME min.",
            "restart": "Server will restart in $TIME min.",
            "saving": "Saving...",
        },
        "state_message": {
            "running": "🟢 Running",
            "stopped": "🔴 Stopped",
            "starting": "🟡 Starting",
            "rcon_disconnect": "🟠 RCON disconnected",
            "network_disconnect": "⚫ Network disconnected",
        },
        "logging": {
            "main": logging_document("INFO", "main"),
            "discord": logging_document("WARNING", "discord"),
            "web": logging_document("INFO", "web"),
            "rcon": logging_document("INFO", "rcon"),
        },
        "low_battery": 30,
        "timezone": 8,
    })
}

fn logging_document(stream_level: &str, file_name: &str) -> Value {
    json!({
        "stream_level": stream_level,
        "file_level": "INFO",
        "backup_count": 3,
        "file_name": file_name,
        "dir_path": "logs",
    })
}
