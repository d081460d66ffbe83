//! Advisory lock on the state directory
//!
//! Two runs against the same project would interleave record writes and
//! marker publication; the second one is refused instead.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use tracing::debug;

use crate::error::{LiftoffError, LiftoffResult};

const LOCK_FILE: &str = "run.lock";

/// Held for the duration of a deploy or destroy; released on drop
#[derive(Debug)]
pub struct StateLock {
    file: File,
    path: PathBuf,
}

impl StateLock {
    pub fn acquire(state_dir: &Path) -> LiftoffResult<Self> {
        std::fs::create_dir_all(state_dir)?;
        let path = state_dir.join(LOCK_FILE);
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&path)?;
        file.try_lock_exclusive()
            .map_err(|_| LiftoffError::Locked { path: path.clone() })?;
        debug!(path = %path.display(), "acquired state lock");
        Ok(Self { file, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for StateLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
    }
}
