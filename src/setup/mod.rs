//! The setup orchestration engine.
//!
//! A fixed, ordered sequence of named fallible steps, executed once per
//! run. The pipeline stops at the first failure and reports which step
//! failed; there is no rollback and no retry. Steps are idempotent, so
//! recovery means re-running the wizard from the top.

pub mod backends;
pub mod dependencies;
pub mod directories;
pub mod jobs;
pub mod policies;
pub mod preflight;
pub mod providers;

use std::fmt;

use console::style;
use tracing::info;

use crate::config::{self, BackendKind, ProviderKind, SetupConfig, SetupPaths};
use crate::error::{Result, SetupError};
use crate::generator;
use crate::utils::installer::ToolInstaller;
use crate::utils::prompt::Prompter;

/// A named, zero-argument fallible provisioning operation.
pub struct Step {
    pub name: &'static str,
    run: fn(&mut Setup) -> Result<()>,
}

/// Terminal state of a failed run: which step (1-based) failed and why.
#[derive(Debug)]
pub struct PipelineFailure {
    pub index: usize,
    pub total: usize,
    pub name: &'static str,
    pub error: SetupError,
}

impl fmt::Display for PipelineFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "step {}/{} ({}) failed: {}",
            self.index, self.total, self.name, self.error
        )
    }
}

impl std::error::Error for PipelineFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

/// The setup orchestrator: owns the configuration being built, the
/// selection state, and the collaborators behind the interactive and
/// process boundaries.
pub struct Setup {
    config: SetupConfig,
    selected_backend: Option<BackendKind>,
    selected_provider: Option<ProviderKind>,
    prompter: Box<dyn Prompter>,
    installer: Box<dyn ToolInstaller>,
    steps: Vec<Step>,
}

impl Setup {
    pub fn new(
        paths: SetupPaths,
        prompter: Box<dyn Prompter>,
        installer: Box<dyn ToolInstaller>,
    ) -> Self {
        let steps = vec![
            Step {
                name: "Run preflight checks",
                run: Setup::run_preflight,
            },
            Step {
                name: "Initialize directories",
                run: Setup::init_directories,
            },
            Step {
                name: "Check dependencies",
                run: Setup::check_dependencies,
            },
            Step {
                name: "Install backup backends",
                run: Setup::install_backends,
            },
            Step {
                name: "Select backup backend",
                run: Setup::select_backend,
            },
            Step {
                name: "Configure backup backend",
                run: Setup::configure_backend,
            },
            Step {
                name: "Select cloud provider",
                run: Setup::select_provider,
            },
            Step {
                name: "Configure cloud provider",
                run: Setup::configure_provider,
            },
            Step {
                name: "Configure backup sources",
                run: Setup::configure_sources,
            },
            Step {
                name: "Configure monitoring",
                run: Setup::configure_monitoring,
            },
            Step {
                name: "Configure scheduling and retention",
                run: Setup::configure_scheduling,
            },
            Step {
                name: "Generate backup scripts",
                run: Setup::generate_scripts,
            },
            Step {
                name: "Finalize setup",
                run: Setup::finalize,
            },
        ];

        Self {
            config: SetupConfig::new(paths),
            selected_backend: None,
            selected_provider: None,
            prompter,
            installer,
            steps,
        }
    }

    /// The configuration as built so far
    pub fn config(&self) -> &SetupConfig {
        &self.config
    }

    /// Names of the pipeline steps, in execution order
    pub fn step_names(&self) -> Vec<&'static str> {
        self.steps.iter().map(|s| s.name).collect()
    }

    /// Run every step in order, stopping at the first failure.
    pub fn run(&mut self) -> std::result::Result<(), PipelineFailure> {
        println!("{}", style("=== Aegis backup setup ===").bold());
        println!();

        let steps = std::mem::take(&mut self.steps);
        let total = steps.len();
        let mut failure = None;

        for (i, step) in steps.iter().enumerate() {
            let index = i + 1;
            println!(
                "{}",
                style(format!("[{index}/{total}] {}...", step.name)).blue()
            );
            if let Err(error) = (step.run)(self) {
                failure = Some(PipelineFailure {
                    index,
                    total,
                    name: step.name,
                    error,
                });
                break;
            }
        }

        self.steps = steps;

        match failure {
            Some(failure) => Err(failure),
            None => Ok(()),
        }
    }

    fn run_preflight(&mut self) -> Result<()> {
        preflight::run(&self.config.paths, self.installer.as_ref())
    }

    fn init_directories(&mut self) -> Result<()> {
        directories::provision(&self.config.paths)
    }

    fn check_dependencies(&mut self) -> Result<()> {
        dependencies::ensure_base_tools(self.installer.as_ref())
    }

    fn install_backends(&mut self) -> Result<()> {
        dependencies::ensure_backends(self.installer.as_ref(), &self.config.paths.temp_dir)
    }

    fn select_backend(&mut self) -> Result<()> {
        self.selected_backend = Some(backends::select(self.prompter.as_ref())?);
        Ok(())
    }

    fn configure_backend(&mut self) -> Result<()> {
        let kind = self
            .selected_backend
            .ok_or_else(|| SetupError::validation("no backup backend selected"))?;
        self.config.backend = Some(backends::configure(
            kind,
            self.prompter.as_ref(),
            &self.config.paths,
        )?);
        Ok(())
    }

    fn select_provider(&mut self) -> Result<()> {
        self.selected_provider = Some(providers::select(self.prompter.as_ref())?);
        Ok(())
    }

    fn configure_provider(&mut self) -> Result<()> {
        let kind = self
            .selected_provider
            .ok_or_else(|| SetupError::validation("no cloud provider selected"))?;
        let provider = providers::configure(kind, self.prompter.as_ref())?;

        // The aws CLI is only needed for S3-protocol providers
        if kind.is_s3_compatible() {
            self.installer.ensure_installed("aws")?;
        }

        self.config.provider = Some(provider);
        Ok(())
    }

    fn configure_sources(&mut self) -> Result<()> {
        self.config.jobs = jobs::collect(self.prompter.as_ref())?;
        Ok(())
    }

    fn configure_monitoring(&mut self) -> Result<()> {
        self.config.monitoring = Some(policies::configure_monitoring(self.prompter.as_ref())?);
        Ok(())
    }

    fn configure_scheduling(&mut self) -> Result<()> {
        let (scheduling, retention) = policies::configure_scheduling(self.prompter.as_ref())?;
        self.config.scheduling = Some(scheduling);
        self.config.retention = Some(retention);
        Ok(())
    }

    fn generate_scripts(&mut self) -> Result<()> {
        let artifacts = generator::generate(&self.config)?;
        info!(
            "Generated {} and {}",
            artifacts.script_path.display(),
            artifacts.cron_path.display()
        );
        Ok(())
    }

    fn finalize(&mut self) -> Result<()> {
        let published = config::publish_config(&self.config)?;

        println!();
        println!("{}", style("=== Setup complete ===").green().bold());
        println!();
        println!("Configuration: {}", published.display());
        println!(
            "Backup script: {}",
            self.config
                .paths
                .scripts_dir
                .join(generator::BACKUP_SCRIPT_NAME)
                .display()
        );
        println!(
            "Cron entry:    {}",
            self.config
                .paths
                .cron_dir
                .join(generator::CRON_FILE_NAME)
                .display()
        );
        println!();
        println!("Next steps:");
        println!("  1. Review the generated script before the first scheduled run");
        println!("  2. Trigger a manual backup to verify credentials");
        println!(
            "  3. Watch logs in {}",
            self.config.paths.log_dir.display()
        );
        Ok(())
    }
}
