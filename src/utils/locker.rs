//! File-based locking to prevent two setup runs from interleaving.

use anyhow::{Context, Result};
use fd_lock::RwLock;
use std::fs::{File, OpenOptions};
use std::path::PathBuf;
use tracing::{debug, info};

/// Exclusive lock held for the lifetime of a setup run.
///
/// The write guard is acquired once and forgotten; the flock is released
/// when the file descriptor closes, which happens when the `RunLock` is
/// dropped.
pub struct RunLock {
    _lock: RwLock<File>,
    lock_path: PathBuf,
}

impl RunLock {
    /// Acquire the setup lock, failing if another run holds it.
    pub fn acquire() -> Result<Self> {
        let lock_path = std::env::temp_dir().join("aegis-setup.lock");

        debug!("Attempting to acquire lock: {:?}", lock_path);

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)
            .with_context(|| format!("Failed to open lock file: {lock_path:?}"))?;

        let mut lock = RwLock::new(file);
        match lock.try_write() {
            Ok(guard) => std::mem::forget(guard),
            Err(_) => anyhow::bail!("another aegis-setup run is already in progress"),
        }

        info!("Acquired setup lock");

        Ok(Self {
            _lock: lock,
            lock_path,
        })
    }
}

impl Drop for RunLock {
    fn drop(&mut self) {
        debug!("Released setup lock: {:?}", self.lock_path);

        // Best effort; a stale file does not block the next run
        let _ = std::fs::remove_file(&self.lock_path);
    }
}
