//! Required tool checks and backend installation.

use std::path::Path;

use crate::error::Result;
use crate::utils::installer::ToolInstaller;

/// Tools every installation needs, regardless of backend or provider
pub const BASE_TOOLS: [&str; 7] = ["curl", "tar", "gzip", "openssl", "jq", "crontab", "parallel"];

/// Ensure the fixed dependency list is present. Any install failure
/// aborts immediately; later steps assume availability without
/// re-checking.
pub fn ensure_base_tools(installer: &dyn ToolInstaller) -> Result<()> {
    for tool in BASE_TOOLS {
        installer.ensure_installed(tool)?;
    }
    Ok(())
}

/// Ensure both selectable backends are installed: borg from the package
/// manager, restic via the prebuilt-binary download chain.
pub fn ensure_backends(installer: &dyn ToolInstaller, temp_dir: &Path) -> Result<()> {
    installer.ensure_installed("borg")?;
    installer.ensure_restic(temp_dir)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::installer::fake::FakeInstaller;

    #[test]
    fn test_all_present_installs_nothing() {
        let installer = FakeInstaller::all_present();

        ensure_base_tools(&installer).unwrap();
        ensure_backends(&installer, Path::new("/tmp/aegis-setup")).unwrap();

        assert!(installer.installs().is_empty());
    }

    #[test]
    fn test_missing_tools_are_installed_in_order() {
        let installer = FakeInstaller::none_present();

        ensure_base_tools(&installer).unwrap();

        assert_eq!(installer.installs(), BASE_TOOLS.to_vec());
    }

    #[test]
    fn test_install_failure_aborts_remaining() {
        let installer = FakeInstaller::none_present().failing_on("openssl");

        assert!(ensure_base_tools(&installer).is_err());

        // Nothing after the failing tool was attempted
        assert_eq!(installer.installs(), vec!["curl", "tar", "gzip", "openssl"]);
    }

    #[test]
    fn test_backends_installed_when_missing() {
        let installer = FakeInstaller::none_present();

        ensure_backends(&installer, Path::new("/tmp/aegis-setup")).unwrap();

        assert_eq!(installer.installs(), vec!["borg", "restic"]);
    }
}
