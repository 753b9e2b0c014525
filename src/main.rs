//! Arkkeeper - configuration bootstrap for an ARK server manager
//!
//! Resolves `config.json` onto the built-in defaults, writes the merged
//! result back, loads every per-server config, sets up logging and makes
//! sure the local database exists before the Discord, RCON and web
//! services read the resolved configuration.

mod common;
mod config;
mod filter;
mod storage;

use anyhow::Result;
use tracing::{debug, error, info, warn};

use common::error::AppError;
use config::{validate::config_warnings, AppConfig, BroadcastKind, ResolveOutcome, CONFIG_PATH};
use filter::ArkMessageFilter;
use storage::BootstrapOutcome;

fn main() -> Result<()> {
    // Logging is configured from the resolved config, so resolution runs first.
    let (config, outcome) = match config::load(CONFIG_PATH) {
        Ok(loaded) => loaded,
        Err(e) => {
            tracing_subscriber::fmt()
                .with_writer(std::io::stderr)
                .init();
            error!("Failed to load configuration: {}", e);
            error!("Please check {} and the server configs it lists.", CONFIG_PATH);
            return Err(e.into());
        }
    };

    common::logging::init(&config.logging)?;

    info!("Arkkeeper v{} starting...", env!("CARGO_PKG_VERSION"));
    match &outcome {
        ResolveOutcome::Loaded { sections } => {
            info!("Configuration loaded from {}", CONFIG_PATH);
            debug!("Merged {} override section(s)", sections);
        }
        ResolveOutcome::Defaulted(reason) => {
            warn!("Could not read {} ({}), using defaults", CONFIG_PATH, reason);
            info!("Wrote default configuration to {}", CONFIG_PATH);
        }
    }

    for key in config.servers.duplicates() {
        warn!("Duplicate server key '{}': the later config replaces the earlier one", key);
    }

    for warning in config_warnings(&config) {
        warn!("{}", warning);
    }

    match bootstrap_storage(&config) {
        Ok(BootstrapOutcome::Created) => info!("Database initialised"),
        Ok(_) => {}
        Err(e) => {
            error!("Failed to prepare storage: {}", e);
            return Err(e.into());
        }
    }

    log_summary(&config);
    info!("Configuration ready");
    Ok(())
}

fn bootstrap_storage(config: &AppConfig) -> common::error::Result<BootstrapOutcome> {
    let backend = config.sql.backend();
    info!("SQL backend: {}", backend);
    storage::ensure_schema(&backend).map_err(AppError::from)
}

fn log_summary(config: &AppConfig) {
    info!("  Web: {} (debug: {})", config.web, config.web.debug);
    info!("  Timezone: UTC{}", config.timezone);
    info!("  Low battery threshold: {}%", config.low_battery);
    info!(
        "  Discord: {} prefix(es), admin role {}",
        config.discord.prefixs.len(),
        config.discord.admin_role
    );

    let filter = ArkMessageFilter::new(&config.message_filter);
    info!("  Log filter patterns: {}", filter.pattern_count());

    for (channel, logging) in config.logging.iter() {
        debug!(
            "  Logging {}: stream {}, file {} -> {} ({} backups)",
            channel,
            logging.stream_filter(),
            logging.file_filter(),
            logging.file_path().display(),
            logging.backup_count
        );
    }

    info!(
        "  Servers: {} from {} config file(s)",
        config.servers.len(),
        config.server_paths.len()
    );
    for server in config.servers.iter() {
        info!(
            "    [{}] {} - rcon {}:{}, {} save(s), {} restart(s)",
            server.unique_key,
            server.display_name,
            server.rcon.address,
            server.rcon.port,
            server.save_time.len(),
            server.restart_time.len()
        );
        debug!("      executable: {}", server.executable_path().display());
    }

    for kind in BroadcastKind::ALL {
        debug!("  Broadcast {:?}: {}", kind, config.broadcast.render(kind, 5));
    }

    let state = &config.state_message;
    debug!(
        "  State messages: {} / {} / {} / {} / {}",
        state.running, state.stopped, state.starting, state.rcon_disconnect, state.network_disconnect
    );
}
