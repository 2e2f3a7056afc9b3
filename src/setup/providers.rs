//! Cloud storage provider selection and configuration.
//!
//! The four S3-protocol providers share one configuration handler and
//! differ only in their pre-filled endpoint hint.

use crate::config::{ProviderConfig, ProviderKind, ProviderSettings};
use crate::error::{Result, SetupError};
use crate::utils::prompt::Prompter;

/// Present the provider menu and return the chosen kind.
pub fn select(prompter: &dyn Prompter) -> Result<ProviderKind> {
    let items: Vec<String> = ProviderKind::ALL.iter().map(|p| p.label().to_string()).collect();
    let choice = prompter.select("Choose your cloud storage provider", &items)?;
    Ok(ProviderKind::ALL[choice])
}

/// Collect the variant-specific provider settings.
pub fn configure(kind: ProviderKind, prompter: &dyn Prompter) -> Result<ProviderConfig> {
    let settings = match kind {
        ProviderKind::S3
        | ProviderKind::Wasabi
        | ProviderKind::Digitalocean
        | ProviderKind::Minio => configure_s3_compatible(kind, prompter)?,
        ProviderKind::B2 => configure_b2(prompter)?,
        ProviderKind::Gcs => configure_gcs(prompter)?,
        ProviderKind::Ftp => configure_ftp(prompter)?,
        ProviderKind::Sftp => configure_sftp(prompter)?,
    };

    Ok(ProviderConfig { kind, settings })
}

fn configure_s3_compatible(kind: ProviderKind, prompter: &dyn Prompter) -> Result<ProviderSettings> {
    let endpoint = prompter.input("S3 endpoint", kind.default_endpoint())?;
    let region = prompter.input("Region", Some("us-east-1"))?;
    let bucket = prompter.input("Bucket name", None)?;
    let access_key = prompter.input("Access key ID", None)?;
    let secret_key = prompter.password("Secret access key")?;

    Ok(ProviderSettings::S3Compatible {
        endpoint,
        region,
        bucket,
        access_key,
        secret_key,
    })
}

fn configure_b2(prompter: &dyn Prompter) -> Result<ProviderSettings> {
    let account_id = prompter.input("B2 account ID", None)?;
    let application_key = prompter.password("B2 application key")?;
    let bucket = prompter.input("Bucket name", None)?;

    Ok(ProviderSettings::B2 {
        account_id,
        application_key,
        bucket,
    })
}

fn configure_gcs(prompter: &dyn Prompter) -> Result<ProviderSettings> {
    let project = prompter.input("GCP project ID", None)?;
    let bucket = prompter.input("Bucket name", None)?;
    let credentials_path = prompter.input(
        "Service account credentials path",
        Some("/etc/aegis-backup/encryption/gcs-credentials.json"),
    )?;

    Ok(ProviderSettings::Gcs {
        project,
        bucket,
        credentials_path,
    })
}

fn configure_ftp(prompter: &dyn Prompter) -> Result<ProviderSettings> {
    let host = prompter.input("FTP host", None)?;
    let port = parse_port(&prompter.input("FTP port", Some("21"))?)?;
    let username = prompter.input("Username", None)?;
    let password = prompter.password("Password")?;

    Ok(ProviderSettings::Ftp {
        host,
        port,
        username,
        password,
    })
}

fn configure_sftp(prompter: &dyn Prompter) -> Result<ProviderSettings> {
    let host = prompter.input("SFTP host", None)?;
    let port = parse_port(&prompter.input("SFTP port", Some("22"))?)?;
    let username = prompter.input("Username", None)?;
    let key_path = prompter.input("SSH key path", Some("~/.ssh/id_rsa"))?;

    Ok(ProviderSettings::Sftp {
        host,
        port,
        username,
        key_path,
    })
}

fn parse_port(raw: &str) -> Result<u16> {
    raw.parse()
        .map_err(|_| SetupError::validation(format!("invalid port: {raw}")))
}
