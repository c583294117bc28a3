#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Streaming ingestion for the live ward file.
//!
//! Watches the source CSV and republishes it as JSON lines whenever it
//! changes. Each publish writes a temporary sibling file and renames it into
//! place, so the server only ever reads a complete old or new file. The
//! server never calls into this crate; the live file is the only contract.

use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use ward_map_source::fallback::StaticSource;
use ward_map_source::{SourceError, WardSource};
use ward_map_ward_models::WardRecord;

/// Default polling interval for source changes.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(2);

/// Errors that can occur during ingestion.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    /// The source CSV could not be read.
    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    /// A record could not be serialized.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error (file read/write).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Settings for [`watch`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchOptions {
    /// Source CSV to watch.
    pub source: PathBuf,
    /// Live JSON-lines file to keep current.
    pub output: PathBuf,
    /// How often the source's modification time is checked.
    pub interval: Duration,
}

/// Renders records as JSON lines, one object per line.
///
/// # Errors
///
/// Returns [`IngestError::Json`] if a record cannot be serialized.
pub fn render_lines(records: &[WardRecord]) -> Result<String, IngestError> {
    let mut out = String::new();
    for record in records {
        out.push_str(&serde_json::to_string(record)?);
        out.push('\n');
    }
    Ok(out)
}

/// Temporary sibling used for atomic replacement of `output`.
fn staging_path(output: &Path) -> PathBuf {
    let name = output
        .file_name()
        .map_or_else(|| "live".into(), |n| n.to_string_lossy().into_owned());
    output.with_file_name(format!(".{name}.tmp"))
}

/// Reads `source` and atomically replaces `output` with its records.
///
/// Returns the number of records written. On failure `output` is left as
/// it was.
///
/// # Errors
///
/// Returns [`IngestError`] if the source cannot be read or parsed, or the
/// output cannot be written.
pub fn publish(source: &Path, output: &Path) -> Result<usize, IngestError> {
    let records = StaticSource::new(source).read()?;
    let contents = render_lines(&records)?;

    if let Some(parent) = output.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }

    let staging = staging_path(output);
    std::fs::write(&staging, contents)?;
    std::fs::rename(&staging, output)?;

    Ok(records.len())
}

/// Outcome of one poll of the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// The source changed and this many records were published.
    Published(usize),
    /// The source has not changed since the last successful publish.
    Unchanged,
}

/// Tracks the source's modification time between polls.
#[derive(Debug)]
pub struct Poller {
    source: PathBuf,
    output: PathBuf,
    last_published: Option<SystemTime>,
}

impl Poller {
    /// Creates a poller that publishes on its first poll.
    #[must_use]
    pub const fn new(source: PathBuf, output: PathBuf) -> Self {
        Self {
            source,
            output,
            last_published: None,
        }
    }

    /// Republishes if the source changed since the last successful publish.
    ///
    /// A failed publish is not recorded, so the next poll retries it.
    ///
    /// # Errors
    ///
    /// Returns [`IngestError`] if the source metadata cannot be read or the
    /// publish fails.
    pub fn poll(&mut self) -> Result<PollOutcome, IngestError> {
        let modified = std::fs::metadata(&self.source)?.modified()?;
        if self.last_published == Some(modified) {
            return Ok(PollOutcome::Unchanged);
        }

        let count = publish(&self.source, &self.output)?;
        self.last_published = Some(modified);
        Ok(PollOutcome::Published(count))
    }
}

/// Publishes on every source change until interrupted with Ctrl-C.
///
/// Poll failures are logged and retried on the next tick.
///
/// # Errors
///
/// Returns [`IngestError::Io`] if the Ctrl-C handler cannot be installed.
pub async fn watch(options: &WatchOptions) -> Result<(), IngestError> {
    let mut poller = Poller::new(options.source.clone(), options.output.clone());
    let mut ticker = tokio::time::interval(options.interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    log::info!(
        "Watching {} every {:?}, publishing to {}",
        options.source.display(),
        options.interval,
        options.output.display()
    );

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                match poller.poll() {
                    Ok(PollOutcome::Published(count)) => {
                        log::info!("Published {count} records to {}", options.output.display());
                    }
                    Ok(PollOutcome::Unchanged) => {}
                    Err(e) => log::warn!("Publish failed, will retry: {e}"),
                }
            }
            signal = tokio::signal::ctrl_c() => {
                signal?;
                log::info!("Interrupted, stopping watch");
                return Ok(());
            }
        }
    }
}
