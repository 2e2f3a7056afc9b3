//! Backup source collection.

use std::path::PathBuf;

use crate::config::JobConfig;
use crate::error::{Result, SetupError};
use crate::utils::prompt::Prompter;

/// Prompt for one or more backup jobs. Each needs an absolute source
/// path; names must be unique.
pub fn collect(prompter: &dyn Prompter) -> Result<Vec<JobConfig>> {
    let mut jobs: Vec<JobConfig> = Vec::new();

    loop {
        let default_name = format!("job-{}", jobs.len() + 1);
        let name = prompter.input("Backup job name", Some(&default_name))?;
        if jobs.iter().any(|j| j.name == name) {
            return Err(SetupError::validation(format!(
                "duplicate backup job name: {name}"
            )));
        }

        let source = PathBuf::from(prompter.input("Source path to back up", None)?);
        if !source.is_absolute() {
            return Err(SetupError::validation(format!(
                "source path must be absolute, got {}",
                source.display()
            )));
        }

        let raw_excludes =
            prompter.input("Exclude patterns (comma-separated, blank for none)", Some(""))?;
        let excludes = raw_excludes
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect();

        jobs.push(JobConfig {
            name,
            source,
            excludes,
        });

        if !prompter.confirm("Add another backup source?", false)? {
            break;
        }
    }

    Ok(jobs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::prompt::scripted::{Answer, ScriptedPrompter};

    #[test]
    fn test_collect_single_job() {
        let prompter = ScriptedPrompter::new(vec![
            Answer::Input(String::new()), // name, take default
            Answer::Input("/var/lib/postgresql".into()),
            Answer::Input("*.tmp, lost+found".into()),
            Answer::Confirm(false),
        ]);

        let jobs = collect(&prompter).unwrap();
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].name, "job-1");
        assert_eq!(jobs[0].source, PathBuf::from("/var/lib/postgresql"));
        assert_eq!(jobs[0].excludes, vec!["*.tmp", "lost+found"]);
    }

    #[test]
    fn test_collect_multiple_jobs() {
        let prompter = ScriptedPrompter::new(vec![
            Answer::Input("etc".into()),
            Answer::Input("/etc".into()),
            Answer::Input(String::new()),
            Answer::Confirm(true),
            Answer::Input("home".into()),
            Answer::Input("/home".into()),
            Answer::Input(String::new()),
            Answer::Confirm(false),
        ]);

        let jobs = collect(&prompter).unwrap();
        assert_eq!(jobs.len(), 2);
        assert_eq!(jobs[0].name, "etc");
        assert_eq!(jobs[1].name, "home");
    }

    #[test]
    fn test_relative_source_rejected() {
        let prompter = ScriptedPrompter::new(vec![
            Answer::Input("etc".into()),
            Answer::Input("etc/config".into()),
        ]);

        let err = collect(&prompter).unwrap_err();
        assert!(matches!(err, SetupError::Validation(_)));
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let prompter = ScriptedPrompter::new(vec![
            Answer::Input("etc".into()),
            Answer::Input("/etc".into()),
            Answer::Input(String::new()),
            Answer::Confirm(true),
            Answer::Input("etc".into()),
        ]);

        let err = collect(&prompter).unwrap_err();
        assert!(matches!(err, SetupError::Validation(_)));
    }
}
