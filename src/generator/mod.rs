//! Renders the finished configuration into executable artifacts.
//!
//! Deterministic by contract: the same configuration always yields
//! byte-identical scripts and cron entries, so generated artifacts can be
//! audited and diffed.

pub mod scripts;

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::PathBuf;

use tracing::info;

use crate::config::SetupConfig;
use crate::error::{Result, SetupError};
use crate::utils::cron;

/// Name of the generated backup script inside the scripts dir
pub const BACKUP_SCRIPT_NAME: &str = "backup.sh";

/// Name of the generated cron file inside the cron dir
pub const CRON_FILE_NAME: &str = "aegis-backup";

const SCRIPT_MODE: u32 = 0o755;

/// Paths of the generated artifacts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedArtifacts {
    pub script_path: PathBuf,
    pub cron_path: PathBuf,
}

/// Write the backup script and cron entry for a finished configuration.
pub fn generate(config: &SetupConfig) -> Result<GeneratedArtifacts> {
    let paths = &config.paths;

    for dir in [&paths.scripts_dir, &paths.cron_dir] {
        if !dir.is_dir() {
            return Err(SetupError::generation(format!(
                "missing directory: {}",
                dir.display()
            )));
        }
    }

    let scheduling = config
        .scheduling
        .as_ref()
        .ok_or_else(|| SetupError::validation("schedule not configured"))?;
    if !cron::validate_cron_schedule(&scheduling.cron_schedule) {
        return Err(SetupError::generation(format!(
            "invalid cron expression: {}",
            scheduling.cron_schedule
        )));
    }

    let script = scripts::render_backup_script(config)?;
    let script_path = paths.scripts_dir.join(BACKUP_SCRIPT_NAME);
    fs::write(&script_path, script).map_err(|e| SetupError::filesystem(script_path.clone(), e))?;
    fs::set_permissions(&script_path, fs::Permissions::from_mode(SCRIPT_MODE))
        .map_err(|e| SetupError::filesystem(script_path.clone(), e))?;

    let cron_path = paths.cron_dir.join(CRON_FILE_NAME);
    let cron_file = render_cron_file(&scheduling.cron_schedule, &script_path, config);
    fs::write(&cron_path, cron_file).map_err(|e| SetupError::filesystem(cron_path.clone(), e))?;

    info!(
        "Generated backup script {} and cron entry {}",
        script_path.display(),
        cron_path.display()
    );

    Ok(GeneratedArtifacts {
        script_path,
        cron_path,
    })
}

fn render_cron_file(schedule: &str, script_path: &std::path::Path, config: &SetupConfig) -> String {
    let command = format!(
        "{} >> {}/backup.log 2>&1",
        script_path.display(),
        config.paths.log_dir.display()
    );

    format!(
        "# Aegis backup schedule\n# m h dom mon dow user command\n{}\n",
        cron::format_cron_entry(schedule, "root", &command)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::*;
    use std::path::Path;

    #[test]
    fn test_render_cron_file_format() {
        let config = SetupConfig::new(SetupPaths::default());
        let rendered = render_cron_file(
            "0 2 * * *",
            Path::new("/usr/local/bin/aegis/backup.sh"),
            &config,
        );

        assert!(rendered.ends_with(
            "0 2 * * * root /usr/local/bin/aegis/backup.sh >> /var/log/aegis-backup/backup.log 2>&1\n"
        ));
        assert!(rendered.starts_with("# Aegis backup schedule\n"));
    }
}
