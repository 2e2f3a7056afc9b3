use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Result, SetupError};

/// Filesystem layout for the provisioned host.
///
/// Every field must be an absolute path; the defaults match the layout
/// the generated scripts and cron entry expect. Overridable from the CLI
/// so tests can run against a throwaway root.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SetupPaths {
    pub config_dir: PathBuf,
    pub log_dir: PathBuf,
    pub scripts_dir: PathBuf,
    pub cron_dir: PathBuf,
    pub temp_dir: PathBuf,
    pub backup_root: PathBuf,
    pub monitoring_dir: PathBuf,
}

impl Default for SetupPaths {
    fn default() -> Self {
        Self {
            config_dir: PathBuf::from("/etc/aegis-backup"),
            log_dir: PathBuf::from("/var/log/aegis-backup"),
            scripts_dir: PathBuf::from("/usr/local/bin/aegis"),
            cron_dir: PathBuf::from("/etc/cron.d"),
            temp_dir: PathBuf::from("/tmp/aegis-setup"),
            backup_root: PathBuf::from("/backups"),
            monitoring_dir: PathBuf::from("/var/lib/aegis-monitoring"),
        }
    }
}

impl SetupPaths {
    /// Check that every path is set and absolute.
    pub fn validate(&self) -> Result<()> {
        for (name, path) in [
            ("config dir", &self.config_dir),
            ("log dir", &self.log_dir),
            ("scripts dir", &self.scripts_dir),
            ("cron dir", &self.cron_dir),
            ("temp dir", &self.temp_dir),
            ("backup root", &self.backup_root),
            ("monitoring dir", &self.monitoring_dir),
        ] {
            if path.as_os_str().is_empty() {
                return Err(SetupError::validation(format!("{name} is empty")));
            }
            if !path.is_absolute() {
                return Err(SetupError::validation(format!(
                    "{name} must be an absolute path, got {}",
                    path.display()
                )));
            }
        }
        Ok(())
    }
}

/// Backup backend discriminator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    Traditional,
    Borg,
    Restic,
}

impl BackendKind {
    pub const ALL: [BackendKind; 3] = [
        BackendKind::Traditional,
        BackendKind::Borg,
        BackendKind::Restic,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            BackendKind::Traditional => "Traditional (tar/gzip)",
            BackendKind::Borg => "BorgBackup (Deduplicating)",
            BackendKind::Restic => "Restic (Encrypted Deduplication)",
        }
    }
}

/// Backend configuration, one variant per backend kind
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum BackendConfig {
    Traditional { compression_level: u32 },
    Borg { repository: String, passphrase: String },
    Restic { repository: String, password: String },
}

impl BackendConfig {
    pub fn kind(&self) -> BackendKind {
        match self {
            BackendConfig::Traditional { .. } => BackendKind::Traditional,
            BackendConfig::Borg { .. } => BackendKind::Borg,
            BackendConfig::Restic { .. } => BackendKind::Restic,
        }
    }
}

/// Cloud storage provider discriminator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    S3,
    B2,
    Gcs,
    Wasabi,
    Digitalocean,
    Minio,
    Ftp,
    Sftp,
}

impl ProviderKind {
    pub const ALL: [ProviderKind; 8] = [
        ProviderKind::S3,
        ProviderKind::B2,
        ProviderKind::Gcs,
        ProviderKind::Wasabi,
        ProviderKind::Digitalocean,
        ProviderKind::Minio,
        ProviderKind::Ftp,
        ProviderKind::Sftp,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ProviderKind::S3 => "Amazon S3",
            ProviderKind::B2 => "Backblaze B2",
            ProviderKind::Gcs => "Google Cloud Storage",
            ProviderKind::Wasabi => "Wasabi",
            ProviderKind::Digitalocean => "DigitalOcean Spaces",
            ProviderKind::Minio => "MinIO",
            ProviderKind::Ftp => "FTP/FTPS",
            ProviderKind::Sftp => "SFTP",
        }
    }

    /// Providers that speak the S3 protocol share one configuration
    /// surface and differ only in their default endpoint.
    pub fn is_s3_compatible(&self) -> bool {
        matches!(
            self,
            ProviderKind::S3 | ProviderKind::Wasabi | ProviderKind::Digitalocean | ProviderKind::Minio
        )
    }

    pub fn default_endpoint(&self) -> Option<&'static str> {
        match self {
            ProviderKind::S3 => Some("s3.amazonaws.com"),
            ProviderKind::Wasabi => Some("s3.wasabisys.com"),
            ProviderKind::Digitalocean => Some("nyc3.digitaloceanspaces.com"),
            ProviderKind::Minio => Some("127.0.0.1:9000"),
            _ => None,
        }
    }
}

/// Provider configuration: the chosen kind plus its collected settings.
///
/// The kind is stored alongside the settings because the four
/// S3-compatible providers share the same settings variant.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ProviderConfig {
    pub kind: ProviderKind,
    pub settings: ProviderSettings,
}

/// Per-provider-family connection settings
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProviderSettings {
    S3Compatible {
        endpoint: String,
        region: String,
        bucket: String,
        access_key: String,
        secret_key: String,
    },
    B2 {
        account_id: String,
        application_key: String,
        bucket: String,
    },
    Gcs {
        project: String,
        bucket: String,
        credentials_path: String,
    },
    Ftp {
        host: String,
        port: u16,
        username: String,
        password: String,
    },
    Sftp {
        host: String,
        port: u16,
        username: String,
        key_path: String,
    },
}

/// A single backup source
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct JobConfig {
    pub name: String,
    pub source: PathBuf,
    #[serde(default)]
    pub excludes: Vec<String>,
}

/// Alerting toggles and endpoints
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct MonitoringConfig {
    pub enable_prometheus: bool,
    pub enable_email_alerts: bool,
    pub enable_slack_alerts: bool,
    #[serde(default)]
    pub alert_email: String,
    #[serde(default)]
    pub smtp_server: String,
    #[serde(default)]
    pub smtp_port: u16,
    #[serde(default)]
    pub slack_webhook: String,
}

/// Backup schedule
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SchedulingConfig {
    pub cron_schedule: String,
}

/// How many backups to keep per granularity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct RetentionConfig {
    #[serde(default)]
    pub hourly: u32,
    #[serde(default = "default_retention_daily")]
    pub daily: u32,
    #[serde(default = "default_retention_weekly")]
    pub weekly: u32,
    #[serde(default = "default_retention_monthly")]
    pub monthly: u32,
}

impl RetentionConfig {
    /// Retention is meaningless unless at least one count is positive.
    pub fn any_retained(&self) -> bool {
        self.hourly > 0 || self.daily > 0 || self.weekly > 0 || self.monthly > 0
    }

    /// Total archive count kept by the traditional backend's pruning.
    pub fn total_kept(&self) -> u32 {
        self.hourly + self.daily + self.weekly + self.monthly
    }
}

/// The single mutable aggregate describing the desired end state.
///
/// Built incrementally by the pipeline; only complete once every step has
/// run. Partial configurations are never written to the config dir.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SetupConfig {
    #[serde(flatten)]
    pub paths: SetupPaths,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backend: Option<BackendConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<ProviderConfig>,

    #[serde(default)]
    pub jobs: Vec<JobConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monitoring: Option<MonitoringConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduling: Option<SchedulingConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retention: Option<RetentionConfig>,
}

impl SetupConfig {
    pub fn new(paths: SetupPaths) -> Self {
        Self {
            paths,
            backend: None,
            provider: None,
            jobs: Vec::new(),
            monitoring: None,
            scheduling: None,
            retention: None,
        }
    }
}

/// Expand a leading tilde to the home directory
pub fn expand_tilde(path: &Path) -> PathBuf {
    if let Ok(stripped) = path.strip_prefix("~") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    path.to_path_buf()
}

// Default value functions

fn default_retention_daily() -> u32 {
    7
}
fn default_retention_weekly() -> u32 {
    4
}
fn default_retention_monthly() -> u32 {
    6
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_paths_are_absolute() {
        SetupPaths::default().validate().unwrap();
    }

    #[test]
    fn test_relative_path_rejected() {
        let mut paths = SetupPaths::default();
        paths.backup_root = PathBuf::from("backups");
        let err = paths.validate().unwrap_err();
        assert!(matches!(err, SetupError::Validation(_)));
    }

    #[test]
    fn test_empty_path_rejected() {
        let mut paths = SetupPaths::default();
        paths.temp_dir = PathBuf::new();
        assert!(paths.validate().is_err());
    }

    #[test]
    fn test_s3_compatible_kinds() {
        for kind in [
            ProviderKind::S3,
            ProviderKind::Wasabi,
            ProviderKind::Digitalocean,
            ProviderKind::Minio,
        ] {
            assert!(kind.is_s3_compatible());
            assert!(kind.default_endpoint().is_some());
        }
        assert!(!ProviderKind::B2.is_s3_compatible());
        assert!(!ProviderKind::Sftp.is_s3_compatible());
    }

    #[test]
    fn test_s3_endpoint_hints_differ() {
        let endpoints: Vec<_> = [
            ProviderKind::S3,
            ProviderKind::Wasabi,
            ProviderKind::Digitalocean,
            ProviderKind::Minio,
        ]
        .iter()
        .map(|k| k.default_endpoint().unwrap())
        .collect();
        for (i, a) in endpoints.iter().enumerate() {
            for b in &endpoints[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_backend_config_kind() {
        let cfg = BackendConfig::Borg {
            repository: "/backups/borg".into(),
            passphrase: "secret".into(),
        };
        assert_eq!(cfg.kind(), BackendKind::Borg);
    }

    #[test]
    fn test_retention_any_retained() {
        let none = RetentionConfig {
            hourly: 0,
            daily: 0,
            weekly: 0,
            monthly: 0,
        };
        assert!(!none.any_retained());

        let some = RetentionConfig {
            hourly: 0,
            daily: 7,
            weekly: 0,
            monthly: 0,
        };
        assert!(some.any_retained());
        assert_eq!(some.total_kept(), 7);
    }

    #[test]
    fn test_expand_tilde() {
        let expanded = expand_tilde(Path::new("~/logs"));
        assert!(!expanded.starts_with("~"));
    }

    #[test]
    fn test_expand_tilde_no_tilde() {
        let expanded = expand_tilde(Path::new("/var/log"));
        assert_eq!(expanded, PathBuf::from("/var/log"));
    }
}
