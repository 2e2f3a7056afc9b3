//! Filesystem layout provisioning.
//!
//! Creates the full directory tree with default permissions, then
//! tightens the secret-holding paths. Broad creation runs first, the
//! narrowing pass second.

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::SetupPaths;
use crate::error::{Result, SetupError};

/// Subdirectories created under the config dir
pub const CONFIG_SUBDIRS: [&str; 5] = ["providers", "backups", "encryption", "templates", "backends"];

const DEFAULT_DIR_MODE: u32 = 0o755;
const SECRET_DIR_MODE: u32 = 0o700;

/// The full set of directories the pipeline requires.
pub fn required_directories(paths: &SetupPaths) -> Vec<PathBuf> {
    let mut dirs = vec![paths.config_dir.clone()];
    dirs.extend(
        CONFIG_SUBDIRS
            .iter()
            .map(|sub| paths.config_dir.join(sub)),
    );
    dirs.push(paths.log_dir.clone());
    dirs.push(paths.scripts_dir.clone());
    dirs.push(paths.temp_dir.clone());
    dirs.push(paths.backup_root.clone());
    dirs.push(paths.monitoring_dir.clone());
    dirs
}

/// Create every required directory, then restrict the encryption
/// subdirectory and the temp dir to owner-only access. Idempotent:
/// already-existing directories are fine.
pub fn provision(paths: &SetupPaths) -> Result<()> {
    for dir in required_directories(paths) {
        create_dir(&dir)?;
    }

    tighten(&paths.config_dir.join("encryption"))?;
    tighten(&paths.temp_dir)?;

    Ok(())
}

fn create_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir).map_err(|e| SetupError::filesystem(dir, e))?;
    fs::set_permissions(dir, fs::Permissions::from_mode(DEFAULT_DIR_MODE))
        .map_err(|e| SetupError::filesystem(dir, e))?;
    debug!("Provisioned {}", dir.display());
    Ok(())
}

fn tighten(dir: &Path) -> Result<()> {
    fs::set_permissions(dir, fs::Permissions::from_mode(SECRET_DIR_MODE))
        .map_err(|e| SetupError::filesystem(dir, e))?;
    debug!("Restricted {} to owner-only access", dir.display());
    Ok(())
}
