//! Backup backend selection and configuration.
//!
//! Selection presents the closed set of backends; configuration
//! dispatches exhaustively on the chosen kind, so an unhandled variant
//! cannot exist at runtime.

use crate::config::{BackendConfig, BackendKind, SetupPaths};
use crate::error::{Result, SetupError};
use crate::utils::prompt::Prompter;

/// Present the backend menu and return the chosen kind.
pub fn select(prompter: &dyn Prompter) -> Result<BackendKind> {
    let items: Vec<String> = BackendKind::ALL.iter().map(|b| b.label().to_string()).collect();
    let choice = prompter.select("Choose your backup backend", &items)?;
    Ok(BackendKind::ALL[choice])
}

/// Collect the variant-specific backend settings.
pub fn configure(
    kind: BackendKind,
    prompter: &dyn Prompter,
    paths: &SetupPaths,
) -> Result<BackendConfig> {
    match kind {
        BackendKind::Traditional => configure_traditional(prompter),
        BackendKind::Borg => configure_borg(prompter, paths),
        BackendKind::Restic => configure_restic(prompter, paths),
    }
}

fn configure_traditional(prompter: &dyn Prompter) -> Result<BackendConfig> {
    let raw = prompter.input("Compression level (1-9)", Some("6"))?;
    let compression_level: u32 = raw
        .parse()
        .map_err(|_| SetupError::validation(format!("invalid compression level: {raw}")))?;
    if !(1..=9).contains(&compression_level) {
        return Err(SetupError::validation(format!(
            "compression level must be between 1 and 9, got {compression_level}"
        )));
    }

    Ok(BackendConfig::Traditional { compression_level })
}

fn configure_borg(prompter: &dyn Prompter, paths: &SetupPaths) -> Result<BackendConfig> {
    let default_repo = paths.backup_root.join("borg");
    let repository = prompter.input(
        "Borg repository location",
        Some(&default_repo.display().to_string()),
    )?;
    let passphrase = prompter.password("Borg encryption passphrase")?;

    Ok(BackendConfig::Borg {
        repository,
        passphrase,
    })
}

fn configure_restic(prompter: &dyn Prompter, paths: &SetupPaths) -> Result<BackendConfig> {
    let default_repo = paths.backup_root.join("restic");
    let repository = prompter.input(
        "Restic repository location",
        Some(&default_repo.display().to_string()),
    )?;
    let password = prompter.password("Restic repository password")?;

    Ok(BackendConfig::Restic {
        repository,
        password,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::prompt::scripted::{Answer, ScriptedPrompter};

    #[test]
    fn test_select_maps_every_menu_index() {
        for (i, expected) in BackendKind::ALL.iter().enumerate() {
            let prompter = ScriptedPrompter::new(vec![Answer::Select(i)]);
            assert_eq!(select(&prompter).unwrap(), *expected);
        }
    }

    #[test]
    fn test_select_abort_propagates() {
        let prompter = ScriptedPrompter::aborting();
        assert!(matches!(
            select(&prompter).unwrap_err(),
            SetupError::PromptAborted
        ));
    }

    #[test]
    fn test_configure_borg_collects_repo_and_passphrase() {
        let prompter = ScriptedPrompter::new(vec![
            Answer::Input("/backups/borg-repo".into()),
            Answer::Password("s3cret".into()),
        ]);

        let config = configure(BackendKind::Borg, &prompter, &SetupPaths::default()).unwrap();
        assert_eq!(
            config,
            BackendConfig::Borg {
                repository: "/backups/borg-repo".into(),
                passphrase: "s3cret".into(),
            }
        );
    }

    #[test]
    fn test_configure_restic_defaults_repo_under_backup_root() {
        let prompter = ScriptedPrompter::new(vec![
            Answer::Input(String::new()),
            Answer::Password("pw".into()),
        ]);

        let config = configure(BackendKind::Restic, &prompter, &SetupPaths::default()).unwrap();
        assert_eq!(
            config,
            BackendConfig::Restic {
                repository: "/backups/restic".into(),
                password: "pw".into(),
            }
        );
    }

    #[test]
    fn test_configure_traditional_rejects_bad_level() {
        let prompter = ScriptedPrompter::new(vec![Answer::Input("12".into())]);
        let err = configure(BackendKind::Traditional, &prompter, &SetupPaths::default())
            .unwrap_err();
        assert!(matches!(err, SetupError::Validation(_)));
    }

    #[test]
    fn test_configure_traditional_accepts_default() {
        let prompter = ScriptedPrompter::new(vec![Answer::Input(String::new())]);
        let config =
            configure(BackendKind::Traditional, &prompter, &SetupPaths::default()).unwrap();
        assert_eq!(config, BackendConfig::Traditional { compression_level: 6 });
    }
}
