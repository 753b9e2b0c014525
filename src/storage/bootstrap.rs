//! First-run schema creation for the embedded SQLite database.
//!
//! The schema is created only when the database file does not exist yet.
//! An existing file is never opened or checked here.

use std::path::Path;

use rusqlite::Connection;
use tracing::{debug, info};

use crate::common::error::{StorageError, StorageResult};
use crate::config::SqlBackend;

/// Users table linking Discord accounts to web accounts.
const USERS_SCHEMA: &str = r#"
CREATE TABLE "Users" (
    "discord_id" INTEGER NOT NULL UNIQUE,
    "account" TEXT NOT NULL UNIQUE,
    "password" TEXT NOT NULL,
    "token" TEXT UNIQUE,
    PRIMARY KEY("discord_id")
);
"#;

/// What [`ensure_schema`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootstrapOutcome {
    /// The database file was created along with its schema.
    Created,
    /// The database file already existed.
    AlreadyPresent,
    /// The backend is networked; nothing to do locally.
    Skipped,
}

/// Create the embedded database and its schema if the file is missing.
pub fn ensure_schema(backend: &SqlBackend) -> StorageResult<BootstrapOutcome> {
    match backend {
        SqlBackend::Embedded { database } => create_if_missing(database),
        SqlBackend::Networked { .. } => {
            debug!("Networked SQL backend selected, skipping local schema bootstrap");
            Ok(BootstrapOutcome::Skipped)
        }
    }
}

fn create_if_missing(path: &Path) -> StorageResult<BootstrapOutcome> {
    if path.exists() {
        debug!("Database {} already exists", path.display());
        return Ok(BootstrapOutcome::AlreadyPresent);
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| StorageError::Io {
            path: parent.display().to_string(),
            source: e,
        })?;
    }

    let mut conn = Connection::open(path)?;
    let tx = conn.transaction()?;
    tx.execute_batch(USERS_SCHEMA)?;
    tx.commit()?;
    conn.close().map_err(|(_, e)| StorageError::Sqlite(e))?;

    info!("Created database {} with Users table", path.display());
    Ok(BootstrapOutcome::Created)
}
