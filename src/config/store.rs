//! Staged persistence of the setup configuration.
//!
//! During the run the configuration lives in memory. Finalization
//! serializes it into the temp dir first and only then copies it into the
//! config dir, so a failed run never leaves a partial configuration in
//! the published location.

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::PathBuf;

use tracing::{debug, info};

use super::types::SetupConfig;
use crate::error::{Result, SetupError};
use crate::utils::cron;

/// Name of the published configuration file inside the config dir
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Name of the staged configuration file inside the temp dir
pub const STAGED_FILE_NAME: &str = "config.staged.toml";

// The published file holds credentials, so it gets owner-only access.
const CONFIG_FILE_MODE: u32 = 0o600;

/// Check that every required field of the configuration is present and
/// coherent before it is published.
pub fn validate_complete(config: &SetupConfig) -> Result<()> {
    config.paths.validate()?;

    if config.backend.is_none() {
        return Err(SetupError::validation("backup backend not configured"));
    }
    if config.provider.is_none() {
        return Err(SetupError::validation("cloud provider not configured"));
    }
    if config.jobs.is_empty() {
        return Err(SetupError::validation("no backup sources configured"));
    }
    if config.monitoring.is_none() {
        return Err(SetupError::validation("monitoring not configured"));
    }

    match &config.scheduling {
        None => return Err(SetupError::validation("schedule not configured")),
        Some(scheduling) => {
            if !cron::validate_cron_schedule(&scheduling.cron_schedule) {
                return Err(SetupError::validation(format!(
                    "invalid cron expression: {}",
                    scheduling.cron_schedule
                )));
            }
        }
    }

    match &config.retention {
        None => return Err(SetupError::validation("retention not configured")),
        Some(retention) => {
            if !retention.any_retained() {
                return Err(SetupError::validation(
                    "at least one retention count must be positive",
                ));
            }
        }
    }

    Ok(())
}

/// Serialize the configuration into the staging file under the temp dir.
pub fn write_staged_config(config: &SetupConfig) -> Result<PathBuf> {
    let serialized = toml::to_string_pretty(config)
        .map_err(|e| SetupError::generation(format!("failed to serialize configuration: {e}")))?;

    let staged_path = config.paths.temp_dir.join(STAGED_FILE_NAME);
    fs::write(&staged_path, serialized)
        .map_err(|e| SetupError::filesystem(staged_path.clone(), e))?;
    fs::set_permissions(&staged_path, fs::Permissions::from_mode(CONFIG_FILE_MODE))
        .map_err(|e| SetupError::filesystem(staged_path.clone(), e))?;

    debug!("Staged configuration at {}", staged_path.display());
    Ok(staged_path)
}

/// Validate, stage, and publish the configuration into the config dir.
///
/// Returns the path of the published file.
pub fn publish_config(config: &SetupConfig) -> Result<PathBuf> {
    validate_complete(config)?;

    let staged_path = write_staged_config(config)?;
    let final_path = config.paths.config_dir.join(CONFIG_FILE_NAME);

    // Copy rather than rename: temp dir and config dir may be on
    // different filesystems.
    fs::copy(&staged_path, &final_path)
        .map_err(|e| SetupError::filesystem(final_path.clone(), e))?;
    fs::set_permissions(&final_path, fs::Permissions::from_mode(CONFIG_FILE_MODE))
        .map_err(|e| SetupError::filesystem(final_path.clone(), e))?;

    if let Err(e) = fs::remove_file(&staged_path) {
        debug!("Could not remove staged config {}: {}", staged_path.display(), e);
    }

    info!("Published configuration to {}", final_path.display());
    Ok(final_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::types::*;
    use tempfile::TempDir;

    fn complete_config(root: &TempDir) -> SetupConfig {
        let base = root.path();
        let paths = SetupPaths {
            config_dir: base.join("etc"),
            log_dir: base.join("log"),
            scripts_dir: base.join("scripts"),
            cron_dir: base.join("cron.d"),
            temp_dir: base.join("tmp"),
            backup_root: base.join("backups"),
            monitoring_dir: base.join("monitoring"),
        };
        std::fs::create_dir_all(&paths.config_dir).unwrap();
        std::fs::create_dir_all(&paths.temp_dir).unwrap();

        let mut config = SetupConfig::new(paths);
        config.backend = Some(BackendConfig::Restic {
            repository: "/backups/restic".into(),
            password: "hunter2".into(),
        });
        config.provider = Some(ProviderConfig {
            kind: ProviderKind::Wasabi,
            settings: ProviderSettings::S3Compatible {
                endpoint: "s3.wasabisys.com".into(),
                region: "us-east-1".into(),
                bucket: "backups".into(),
                access_key: "AKIA".into(),
                secret_key: "secret".into(),
            },
        });
        config.jobs = vec![JobConfig {
            name: "etc".into(),
            source: "/etc".into(),
            excludes: vec![],
        }];
        config.monitoring = Some(MonitoringConfig {
            enable_prometheus: false,
            enable_email_alerts: false,
            enable_slack_alerts: false,
            alert_email: String::new(),
            smtp_server: String::new(),
            smtp_port: 0,
            slack_webhook: String::new(),
        });
        config.scheduling = Some(SchedulingConfig {
            cron_schedule: "0 2 * * *".into(),
        });
        config.retention = Some(RetentionConfig {
            hourly: 0,
            daily: 7,
            weekly: 4,
            monthly: 6,
        });
        config
    }

    #[test]
    fn test_validate_incomplete_config() {
        let root = TempDir::new().unwrap();
        let mut config = complete_config(&root);
        config.backend = None;
        let err = validate_complete(&config).unwrap_err();
        assert!(matches!(err, SetupError::Validation(_)));
    }

    #[test]
    fn test_validate_zero_retention() {
        let root = TempDir::new().unwrap();
        let mut config = complete_config(&root);
        config.retention = Some(RetentionConfig {
            hourly: 0,
            daily: 0,
            weekly: 0,
            monthly: 0,
        });
        assert!(validate_complete(&config).is_err());
    }

    #[test]
    fn test_validate_bad_cron() {
        let root = TempDir::new().unwrap();
        let mut config = complete_config(&root);
        config.scheduling = Some(SchedulingConfig {
            cron_schedule: "not a schedule".into(),
        });
        assert!(validate_complete(&config).is_err());
    }

    #[test]
    fn test_publish_roundtrip() {
        let root = TempDir::new().unwrap();
        let config = complete_config(&root);

        let published = publish_config(&config).unwrap();
        assert!(published.ends_with(CONFIG_FILE_NAME));

        let mode = std::fs::metadata(&published).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o600);

        // The staged copy is cleaned up after publishing
        assert!(!config.paths.temp_dir.join(STAGED_FILE_NAME).exists());

        let raw = std::fs::read_to_string(&published).unwrap();
        let reloaded: SetupConfig = toml::from_str(&raw).unwrap();
        assert_eq!(reloaded, config);
    }

    #[test]
    fn test_publish_refuses_partial_config() {
        let root = TempDir::new().unwrap();
        let mut config = complete_config(&root);
        config.provider = None;

        assert!(publish_config(&config).is_err());
        assert!(!config.paths.config_dir.join(CONFIG_FILE_NAME).exists());
    }
}
