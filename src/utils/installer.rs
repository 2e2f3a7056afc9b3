//! Idempotent installation of external tools.
//!
//! Presence is checked with a PATH lookup; missing tools are installed
//! through the platform package manager. Restic is not assumed to be
//! packaged, so it is fetched as a prebuilt binary archive instead.

use std::path::Path;

use tracing::{debug, info};

use super::executor::CommandExecutor;
use crate::error::Result;

/// Download location for the prebuilt restic binary
pub const RESTIC_DOWNLOAD_URL: &str =
    "https://github.com/restic/restic/releases/latest/download/restic_linux_amd64.bz2";

/// Where the downloaded restic binary is relocated to
pub const RESTIC_INSTALL_PATH: &str = "/usr/local/bin/restic";

/// Narrow interface over tool provisioning so steps can be tested with a
/// fake collaborator instead of a real package manager.
pub trait ToolInstaller: Send + Sync {
    /// Whether the tool resolves on the executable search path
    fn is_installed(&self, tool: &str) -> bool;

    /// Install the tool if absent. A present tool is a no-op.
    fn ensure_installed(&self, tool: &str) -> Result<()>;

    /// Ensure restic is present, downloading a prebuilt binary into
    /// `temp_dir` and relocating it onto the search path if needed.
    fn ensure_restic(&self, temp_dir: &Path) -> Result<()>;
}

/// Map a tool name to the package that provides it
fn package_for(tool: &str) -> &str {
    match tool {
        "crontab" => "cron",
        "aws" => "awscli",
        "borg" => "borgbackup",
        other => other,
    }
}

/// Real installer backed by apt-get and the download chain
pub struct AptInstaller<E: CommandExecutor> {
    executor: E,
}

impl AptInstaller<super::executor::RealExecutor> {
    pub fn new() -> Self {
        Self {
            executor: super::executor::RealExecutor::new(),
        }
    }
}

impl Default for AptInstaller<super::executor::RealExecutor> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: CommandExecutor> AptInstaller<E> {
    pub fn with_executor(executor: E) -> Self {
        Self { executor }
    }

    /// Fetch, decompress, mark executable, and relocate the restic
    /// binary. Each sub-operation failure aborts the chain.
    fn download_restic(&self, temp_dir: &Path) -> Result<()> {
        let archive = temp_dir.join("restic_linux_amd64.bz2");
        let binary = temp_dir.join("restic_linux_amd64");
        let archive_arg = archive.display().to_string();
        let binary_arg = binary.display().to_string();

        info!("Downloading restic from {}", RESTIC_DOWNLOAD_URL);
        self.executor
            .run("wget", &["-q", RESTIC_DOWNLOAD_URL, "-O", &archive_arg])?;
        self.executor.run("bzip2", &["-d", "-f", &archive_arg])?;
        self.executor.run("chmod", &["+x", &binary_arg])?;
        self.executor.run("mv", &[&binary_arg, RESTIC_INSTALL_PATH])?;

        info!("Installed restic to {}", RESTIC_INSTALL_PATH);
        Ok(())
    }
}

impl<E: CommandExecutor> ToolInstaller for AptInstaller<E> {
    fn is_installed(&self, tool: &str) -> bool {
        which::which(tool).is_ok()
    }

    fn ensure_installed(&self, tool: &str) -> Result<()> {
        if self.is_installed(tool) {
            debug!("{} already installed", tool);
            return Ok(());
        }

        info!("Installing {}", tool);
        self.executor
            .run("apt-get", &["install", "-y", package_for(tool)])
    }

    fn ensure_restic(&self, temp_dir: &Path) -> Result<()> {
        if self.is_installed("restic") {
            debug!("restic already installed");
            return Ok(());
        }
        self.download_restic(temp_dir)
    }
}

/// A fake installer that records requested installs. Available to
/// integration tests as well.
#[allow(dead_code)]
pub mod fake {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Mutex;

    pub struct FakeInstaller {
        /// Tools reported as present
        present: HashSet<String>,
        /// Report every tool as present regardless of the set above
        all_present: bool,
        /// Tools whose installation should fail
        fail_on: HashSet<String>,
        /// Recorded install requests
        installs: Mutex<Vec<String>>,
    }

    impl FakeInstaller {
        /// Every tool is already installed
        pub fn all_present() -> Self {
            Self {
                present: HashSet::new(),
                all_present: true,
                fail_on: HashSet::new(),
                installs: Mutex::new(Vec::new()),
            }
        }

        /// No tool is installed; installs succeed
        pub fn none_present() -> Self {
            Self {
                present: HashSet::new(),
                all_present: false,
                fail_on: HashSet::new(),
                installs: Mutex::new(Vec::new()),
            }
        }

        /// Make installation of `tool` fail
        pub fn failing_on(mut self, tool: &str) -> Self {
            self.fail_on.insert(tool.to_string());
            self
        }

        /// Mark a tool as already present
        pub fn with_present(mut self, tool: &str) -> Self {
            self.present.insert(tool.to_string());
            self
        }

        pub fn installs(&self) -> Vec<String> {
            self.installs.lock().unwrap().clone()
        }

        fn request_install(&self, tool: &str) -> Result<()> {
            self.installs.lock().unwrap().push(tool.to_string());
            if self.fail_on.contains(tool) {
                return Err(crate::error::SetupError::command(
                    "apt-get",
                    format!("failed to install {tool}"),
                ));
            }
            Ok(())
        }
    }

    impl ToolInstaller for FakeInstaller {
        fn is_installed(&self, tool: &str) -> bool {
            self.all_present || self.present.contains(tool)
        }

        fn ensure_installed(&self, tool: &str) -> Result<()> {
            if self.is_installed(tool) {
                return Ok(());
            }
            self.request_install(tool)
        }

        fn ensure_restic(&self, _temp_dir: &Path) -> Result<()> {
            if self.is_installed("restic") {
                return Ok(());
            }
            self.request_install("restic")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SetupError;
    use crate::utils::executor::mock::MockExecutor;

    #[test]
    fn test_present_tool_triggers_no_install() {
        let executor = MockExecutor::new();
        let installer = AptInstaller::with_executor(executor.clone());

        // `sh` exists on any unix host this runs on
        installer.ensure_installed("sh").unwrap();
        assert_eq!(executor.call_count("apt-get"), 0);
    }

    #[test]
    fn test_missing_tool_installed_via_apt() {
        let executor = MockExecutor::new();
        let installer = AptInstaller::with_executor(executor.clone());

        installer
            .ensure_installed("definitely-not-a-real-tool-xyz")
            .unwrap();

        let calls = executor.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].program, "apt-get");
        assert_eq!(
            calls[0].args,
            vec!["install", "-y", "definitely-not-a-real-tool-xyz"]
        );
    }

    #[test]
    fn test_package_name_mapping() {
        assert_eq!(package_for("crontab"), "cron");
        assert_eq!(package_for("aws"), "awscli");
        assert_eq!(package_for("borg"), "borgbackup");
        assert_eq!(package_for("jq"), "jq");
    }

    #[test]
    fn test_restic_download_chain_order() {
        let executor = MockExecutor::new();
        let installer = AptInstaller::with_executor(executor.clone());

        installer
            .download_restic(std::path::Path::new("/tmp/aegis-setup"))
            .unwrap();

        let programs: Vec<String> = executor.calls().into_iter().map(|c| c.program).collect();
        assert_eq!(programs, vec!["wget", "bzip2", "chmod", "mv"]);
    }

    #[test]
    fn test_restic_chain_stops_at_first_failure() {
        let executor = MockExecutor::new().fail_on("bzip2", "corrupt archive");
        let installer = AptInstaller::with_executor(executor.clone());

        let err = installer
            .download_restic(std::path::Path::new("/tmp/aegis-setup"))
            .unwrap_err();
        assert!(matches!(err, SetupError::CommandFailed { .. }));

        // The chain aborted: nothing was marked executable or moved
        assert!(!executor.was_called("chmod"));
        assert!(!executor.was_called("mv"));
    }

    #[test]
    fn test_fake_installer_records_and_fails() {
        use fake::FakeInstaller;

        let installer = FakeInstaller::none_present().failing_on("jq");

        installer.ensure_installed("curl").unwrap();
        assert!(installer.ensure_installed("jq").is_err());
        assert_eq!(installer.installs(), vec!["curl", "jq"]);
    }
}
