//! Pre-flight environment checks.
//!
//! Validates the injected path set before anything touches the
//! filesystem, and warns about conditions that will bite later steps.

use tracing::warn;

use crate::config::SetupPaths;
use crate::error::Result;
use crate::utils::installer::ToolInstaller;

pub fn run(paths: &SetupPaths, installer: &dyn ToolInstaller) -> Result<()> {
    paths.validate()?;

    // Missing package manager only matters once a tool is actually
    // absent, so this is a warning rather than a failure.
    if !installer.is_installed("apt-get") {
        warn!("apt-get not found; dependency installation will fail if tools are missing");
    }

    Ok(())
}
