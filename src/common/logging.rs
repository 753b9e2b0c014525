//! Tracing subscriber setup driven by the per-channel logging config.
//!
//! Each channel is a tracing target (`main`, `discord`, `web`, `rcon`).
//! Console output uses the stream levels, and every channel gets its own log
//! file at its file level. Events whose target is not one of the named
//! channels are written to the `main` file.

use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::filter::Targets;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

use crate::config::logging::{LogChannel, LoggingChannels, LoggingConfig};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Install the global subscriber. `RUST_LOG` overrides the console filter.
pub fn init(channels: &LoggingChannels) -> Result<()> {
    let stream_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(stream_directives(channels)))
        .context("invalid console log filter")?;

    let mut layers: Vec<BoxedLayer> = vec![tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_filter(stream_filter)
        .boxed()];

    for (channel, config) in channels.iter() {
        let file = open_log_file(config)?;
        layers.push(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .with_filter(file_targets(channel, config))
                .boxed(),
        );
    }

    tracing_subscriber::registry()
        .with(layers)
        .try_init()
        .context("failed to install tracing subscriber")?;

    Ok(())
}

/// Console filter directives: the `main` level by default, each other
/// channel at its own level.
pub fn stream_directives(channels: &LoggingChannels) -> String {
    let mut directives = vec![channels.main.stream_filter().to_string()];
    for (channel, config) in channels.iter().filter(|(c, _)| *c != LogChannel::Main) {
        directives.push(format!("{}={}", channel, config.stream_filter()));
    }
    directives.join(",")
}

/// File filter for one channel. `main` takes everything the other
/// channels do not own.
pub fn file_targets(channel: LogChannel, config: &LoggingConfig) -> Targets {
    match channel {
        LogChannel::Main => LogChannel::ALL
            .into_iter()
            .filter(|c| *c != LogChannel::Main)
            .fold(Targets::new().with_default(config.file_filter()), |t, c| {
                t.with_target(c.as_str(), LevelFilter::OFF)
            }),
        other => Targets::new().with_target(other.as_str(), config.file_filter()),
    }
}

fn open_log_file(config: &LoggingConfig) -> Result<fs::File> {
    let path = config.file_path();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create log directory {}", parent.display()))?;
    }

    rotate_backups(&path, config.backup_count)
        .with_context(|| format!("failed to rotate {}", path.display()))?;

    OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("failed to open log file {}", path.display()))
}

fn backup_path(path: &Path, index: u32) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(format!(".{}", index));
    PathBuf::from(name)
}

/// Shift `name.log` to `name.log.1`, `name.log.1` to `name.log.2`, and so
/// on, keeping at most `backup_count` old files. Zero disables rotation.
pub fn rotate_backups(path: &Path, backup_count: u32) -> std::io::Result<()> {
    if backup_count == 0 || !path.exists() {
        return Ok(());
    }

    let oldest = backup_path(path, backup_count);
    if oldest.exists() {
        fs::remove_file(&oldest)?;
    }
    for index in (1..backup_count).rev() {
        let from = backup_path(path, index);
        if from.exists() {
            fs::rename(&from, backup_path(path, index + 1))?;
        }
    }
    fs::rename(path, backup_path(path, 1))
}
