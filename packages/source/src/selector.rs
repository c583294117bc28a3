//! Per-request choice between the live and static sources.
//!
//! This is an availability check, not a staleness check: live data is used
//! whenever it can be read in full and holds at least one record. Nothing
//! is remembered between calls, so a live file that appears after startup
//! is picked up by the next request.

use crate::fallback::StaticSource;
use crate::live::LiveSource;
use crate::{Snapshot, SourceError, SourcePaths, WardSource};

/// Chooses the freshest readable source on every call.
pub struct SourceSelector {
    live: Box<dyn WardSource>,
    fallback: Box<dyn WardSource>,
}

impl SourceSelector {
    /// Creates a selector over arbitrary sources.
    #[must_use]
    pub fn new(live: Box<dyn WardSource>, fallback: Box<dyn WardSource>) -> Self {
        Self { live, fallback }
    }

    /// Creates a selector over the live JSON-lines file and the CSV fallback
    /// at `paths`.
    #[must_use]
    pub fn from_paths(paths: &SourcePaths) -> Self {
        Self::new(
            Box::new(LiveSource::new(&paths.live)),
            Box::new(StaticSource::new(&paths.fallback)),
        )
    }

    /// Reads a fresh snapshot.
    ///
    /// Failures of the live source are logged and absorbed by falling back.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] only if the static fallback itself cannot be
    /// read, which indicates a broken deployment.
    pub fn snapshot(&self) -> Result<Snapshot, SourceError> {
        match self.live.read() {
            Ok(records) => {
                log::info!("Using {} data ({} records)", self.live.kind(), records.len());
                return Ok(Snapshot {
                    origin: self.live.kind(),
                    records,
                });
            }
            Err(SourceError::Unavailable { path, .. }) => {
                log::warn!(
                    "Live source {} not available yet, using fallback CSV",
                    path.display()
                );
            }
            Err(SourceError::Empty { path }) => {
                log::warn!(
                    "Live source {} has no records, using fallback CSV",
                    path.display()
                );
            }
            Err(e) => {
                log::warn!("Live source unreadable ({e}), using fallback CSV");
            }
        }

        let records = self.fallback.read().inspect_err(|e| {
            log::error!("Fallback source failed: {e}");
        })?;

        Ok(Snapshot {
            origin: self.fallback.kind(),
            records,
        })
    }
}
