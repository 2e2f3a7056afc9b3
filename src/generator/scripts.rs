//! Backup script rendering.
//!
//! The script is assembled from three sections: provider credential
//! exports, per-job backend commands with retention pruning, and a
//! remote-sync section for providers that receive a copy of the local
//! archive or repository tree.

use std::fmt::Write;

use crate::config::{
    BackendConfig, JobConfig, ProviderConfig, ProviderSettings, RetentionConfig, SetupConfig,
};
use crate::error::{Result, SetupError};

/// Render the complete backup script for a finished configuration.
pub fn render_backup_script(config: &SetupConfig) -> Result<String> {
    let backend = config
        .backend
        .as_ref()
        .ok_or_else(|| SetupError::validation("backup backend not configured"))?;
    let provider = config
        .provider
        .as_ref()
        .ok_or_else(|| SetupError::validation("cloud provider not configured"))?;
    let retention = config
        .retention
        .as_ref()
        .ok_or_else(|| SetupError::validation("retention not configured"))?;
    if config.jobs.is_empty() {
        return Err(SetupError::validation("no backup sources configured"));
    }

    let backup_root = config.paths.backup_root.display().to_string();

    let mut out = String::new();
    out.push_str("#!/usr/bin/env bash\n");
    out.push_str("# Generated by aegis-setup. Do not edit by hand.\n");
    out.push_str("set -euo pipefail\n\n");

    let _ = writeln!(out, "BACKUP_ROOT={}", sh_quote(&backup_root));
    out.push('\n');

    out.push_str(&provider_env(provider));
    out.push('\n');

    out.push_str(&backend_section(backend, &config.jobs, retention));

    if let Some(sync_source) = sync_source(backend, &backup_root) {
        out.push('\n');
        out.push_str(&sync_section(provider, &sync_source));
    }

    out.push('\n');
    out.push_str(&monitoring_section(config));

    Ok(out)
}

/// Credential and endpoint exports for the chosen provider.
fn provider_env(provider: &ProviderConfig) -> String {
    let mut out = String::new();
    match &provider.settings {
        ProviderSettings::S3Compatible {
            endpoint,
            region,
            bucket,
            access_key,
            secret_key,
        } => {
            let _ = writeln!(out, "export AWS_ACCESS_KEY_ID={}", sh_quote(access_key));
            let _ = writeln!(out, "export AWS_SECRET_ACCESS_KEY={}", sh_quote(secret_key));
            let _ = writeln!(out, "AEGIS_S3_ENDPOINT={}", sh_quote(endpoint));
            let _ = writeln!(out, "AEGIS_S3_REGION={}", sh_quote(region));
            let _ = writeln!(out, "AEGIS_S3_BUCKET={}", sh_quote(bucket));
        }
        ProviderSettings::B2 {
            account_id,
            application_key,
            bucket,
        } => {
            let _ = writeln!(out, "export B2_APPLICATION_KEY_ID={}", sh_quote(account_id));
            let _ = writeln!(out, "export B2_APPLICATION_KEY={}", sh_quote(application_key));
            let _ = writeln!(out, "AEGIS_B2_BUCKET={}", sh_quote(bucket));
        }
        ProviderSettings::Gcs {
            project,
            bucket,
            credentials_path,
        } => {
            let _ = writeln!(
                out,
                "export GOOGLE_APPLICATION_CREDENTIALS={}",
                sh_quote(credentials_path)
            );
            let _ = writeln!(out, "export CLOUDSDK_CORE_PROJECT={}", sh_quote(project));
            let _ = writeln!(out, "AEGIS_GCS_BUCKET={}", sh_quote(bucket));
        }
        ProviderSettings::Ftp {
            host,
            port,
            username,
            password,
        } => {
            let _ = writeln!(out, "AEGIS_FTP_HOST={}", sh_quote(host));
            let _ = writeln!(out, "AEGIS_FTP_PORT={port}");
            let _ = writeln!(out, "AEGIS_FTP_USER={}", sh_quote(username));
            let _ = writeln!(out, "AEGIS_FTP_PASSWORD={}", sh_quote(password));
        }
        ProviderSettings::Sftp {
            host,
            port,
            username,
            key_path,
        } => {
            let _ = writeln!(out, "AEGIS_SFTP_HOST={}", sh_quote(host));
            let _ = writeln!(out, "AEGIS_SFTP_PORT={port}");
            let _ = writeln!(out, "AEGIS_SFTP_USER={}", sh_quote(username));
            let _ = writeln!(out, "AEGIS_SFTP_KEY={}", sh_quote(key_path));
        }
    }
    out
}

/// Per-job backup commands plus retention pruning for the chosen backend.
fn backend_section(backend: &BackendConfig, jobs: &[JobConfig], retention: &RetentionConfig) -> String {
    let mut out = String::new();
    match backend {
        BackendConfig::Traditional { compression_level } => {
            out.push_str("STAMP=\"$(date +%Y%m%d%H%M%S)\"\n\n");
            let keep = retention.total_kept();
            for job in jobs {
                let _ = writeln!(out, "# job: {}", job.name);
                let mut tar = String::from("tar -cf -");
                for exclude in &job.excludes {
                    let _ = write!(tar, " --exclude={}", sh_quote(exclude));
                }
                let _ = write!(tar, " {}", sh_quote(&job.source.display().to_string()));
                let _ = writeln!(
                    out,
                    "{tar} | gzip -{compression_level} > \"$BACKUP_ROOT/{}-$STAMP.tar.gz\"",
                    job.name
                );
                let _ = writeln!(
                    out,
                    "ls -1t \"$BACKUP_ROOT\"/{}-*.tar.gz | tail -n +{} | xargs -r rm -f",
                    job.name,
                    keep + 1
                );
                out.push('\n');
            }
        }
        BackendConfig::Borg {
            repository,
            passphrase,
        } => {
            let _ = writeln!(out, "export BORG_REPO={}", sh_quote(repository));
            let _ = writeln!(out, "export BORG_PASSPHRASE={}", sh_quote(passphrase));
            out.push('\n');
            out.push_str("borg init --encryption=repokey 2>/dev/null || true\n\n");
            for job in jobs {
                let _ = writeln!(out, "# job: {}", job.name);
                let mut create = format!(
                    "borg create --stats \"::{}-{{now:%Y-%m-%d_%H:%M}}\" {}",
                    job.name,
                    sh_quote(&job.source.display().to_string())
                );
                for exclude in &job.excludes {
                    let _ = write!(create, " --exclude {}", sh_quote(exclude));
                }
                let _ = writeln!(out, "{create}");
                out.push('\n');
            }
            let _ = writeln!(out, "borg prune{}", keep_flags(retention, "--keep"));
        }
        BackendConfig::Restic {
            repository,
            password,
        } => {
            let _ = writeln!(out, "export RESTIC_REPOSITORY={}", sh_quote(repository));
            let _ = writeln!(out, "export RESTIC_PASSWORD={}", sh_quote(password));
            out.push('\n');
            out.push_str("restic snapshots >/dev/null 2>&1 || restic init\n\n");
            for job in jobs {
                let _ = writeln!(out, "# job: {}", job.name);
                let mut backup = format!(
                    "restic backup {} --tag {}",
                    sh_quote(&job.source.display().to_string()),
                    sh_quote(&job.name)
                );
                for exclude in &job.excludes {
                    let _ = write!(backup, " --exclude {}", sh_quote(exclude));
                }
                let _ = writeln!(out, "{backup}");
                out.push('\n');
            }
            let _ = writeln!(out, "restic forget --prune{}", keep_flags(retention, "--keep"));
        }
    }
    out
}

/// `--keep-*` flags, emitting only the positive counts.
fn keep_flags(retention: &RetentionConfig, prefix: &str) -> String {
    let mut out = String::new();
    for (granularity, count) in [
        ("hourly", retention.hourly),
        ("daily", retention.daily),
        ("weekly", retention.weekly),
        ("monthly", retention.monthly),
    ] {
        if count > 0 {
            let _ = write!(out, " {prefix}-{granularity} {count}");
        }
    }
    out
}

/// The local tree to copy offsite, if any. A repository that is already
/// remote (not a plain absolute path) has nothing to sync.
fn sync_source(backend: &BackendConfig, backup_root: &str) -> Option<String> {
    match backend {
        BackendConfig::Traditional { .. } => Some(backup_root.to_string()),
        BackendConfig::Borg { repository, .. } | BackendConfig::Restic { repository, .. } => {
            repository.starts_with('/').then(|| repository.clone())
        }
    }
}

/// Copy the local archives or repository to the chosen provider.
fn sync_section(provider: &ProviderConfig, sync_source: &str) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "SYNC_SOURCE={}", sh_quote(sync_source));
    match &provider.settings {
        ProviderSettings::S3Compatible { .. } => {
            out.push_str(
                "aws s3 sync \"$SYNC_SOURCE\" \"s3://$AEGIS_S3_BUCKET/aegis\" \
                 --endpoint-url \"https://$AEGIS_S3_ENDPOINT\" --region \"$AEGIS_S3_REGION\"\n",
            );
        }
        ProviderSettings::B2 { .. } => {
            out.push_str("b2 sync \"$SYNC_SOURCE\" \"b2://$AEGIS_B2_BUCKET/aegis\"\n");
        }
        ProviderSettings::Gcs { .. } => {
            out.push_str("gsutil -m rsync -r \"$SYNC_SOURCE\" \"gs://$AEGIS_GCS_BUCKET/aegis\"\n");
        }
        ProviderSettings::Ftp { .. } => {
            out.push_str(
                "find \"$SYNC_SOURCE\" -type f -print0 | while IFS= read -r -d '' f; do\n    \
                 curl -sS --ftp-create-dirs -T \"$f\" \
                 --user \"$AEGIS_FTP_USER:$AEGIS_FTP_PASSWORD\" \
                 \"ftp://$AEGIS_FTP_HOST:$AEGIS_FTP_PORT/aegis/${f#\"$SYNC_SOURCE\"/}\"\ndone\n",
            );
        }
        ProviderSettings::Sftp { .. } => {
            out.push_str(
                "scp -i \"$AEGIS_SFTP_KEY\" -P \"$AEGIS_SFTP_PORT\" -r \"$SYNC_SOURCE\" \
                 \"$AEGIS_SFTP_USER@$AEGIS_SFTP_HOST:aegis/\"\n",
            );
        }
    }
    out
}

/// Heartbeat for the monitoring directory; a Prometheus textfile metric
/// when the exporter integration is enabled.
fn monitoring_section(config: &SetupConfig) -> String {
    let monitoring_dir = config.paths.monitoring_dir.display();
    let mut out = String::new();
    let _ = writeln!(out, "date +%s > {}", sh_quote(&format!("{monitoring_dir}/last-run")));
    if config
        .monitoring
        .as_ref()
        .is_some_and(|m| m.enable_prometheus)
    {
        let _ = writeln!(
            out,
            "printf 'aegis_backup_last_run_timestamp %s\\n' \"$(date +%s)\" > {}",
            sh_quote(&format!("{monitoring_dir}/aegis_backup.prom"))
        );
    }
    out
}

/// Quote a value for safe interpolation into the generated shell script.
fn sh_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}
