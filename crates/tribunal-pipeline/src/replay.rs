//! Append-only JSON-lines replay log

use crate::{SnapshotError, StateSnapshot};
use std::fs::OpenOptions;
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// One snapshot per line
#[derive(Debug, Clone)]
pub struct ReplayLog {
    path: PathBuf,
}

impl ReplayLog {
    /// Open a log at `path`; the file is created on first append
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the log file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Validate and append a snapshot, returning its digest
    pub fn append(&self, snapshot: &StateSnapshot) -> Result<String, SnapshotError> {
        snapshot.validate()?;
        let digest = snapshot.digest()?;
        let line = snapshot.to_json_line()?;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{line}")?;

        info!(path = %self.path.display(), digest = %digest, "snapshot appended");
        Ok(digest)
    }

    /// Every stored snapshot, oldest first
    ///
    /// A missing file is an empty log. Blank lines are skipped.
    pub fn entries(&self) -> Result<Vec<StateSnapshot>, SnapshotError> {
        let file = match std::fs::File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut snapshots = Vec::new();
        for (index, line) in BufReader::new(file).lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let snapshot = StateSnapshot::from_json_line(&line).map_err(|e| {
                SnapshotError::Invalid(format!("line {}: {e}", index + 1))
            })?;
            snapshots.push(snapshot);
        }

        debug!(path = %self.path.display(), entries = snapshots.len(), "replay log read");
        Ok(snapshots)
    }

    /// Digest of the most recent snapshot, if any
    pub fn last_digest(&self) -> Result<Option<String>, SnapshotError> {
        self.entries()?
            .last()
            .map(StateSnapshot::digest)
            .transpose()
    }

    /// Compare `snapshot` with the most recent stored one
    pub fn verify(&self, snapshot: &StateSnapshot) -> Result<bool, SnapshotError> {
        let stored = self.last_digest()?.ok_or(SnapshotError::EmptyLog)?;
        let fresh = snapshot.digest()?;
        let matches = stored == fresh;
        if matches {
            info!(digest = %fresh, "replay verified");
        } else {
            warn!(stored = %stored, fresh = %fresh, "replay digest mismatch");
        }
        Ok(matches)
    }
}
