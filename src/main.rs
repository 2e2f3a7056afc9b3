mod config;
mod error;
mod generator;
mod managers;
mod setup;
mod utils;

use anyhow::Result;
use clap::Parser;
use console::style;
use std::path::PathBuf;

use config::{expand_tilde, SetupPaths};
use setup::Setup;
use utils::installer::AptInstaller;
use utils::locker::RunLock;
use utils::prompt::TerminalPrompter;

#[derive(Parser)]
#[command(name = "aegis-setup")]
#[command(about = "Interactive setup wizard for automated host backups", long_about = None)]
#[command(version)]
struct Cli {
    /// Override the configuration directory
    #[arg(long)]
    config_dir: Option<PathBuf>,

    /// Override the log directory
    #[arg(long)]
    log_dir: Option<PathBuf>,

    /// Override the generated-scripts directory
    #[arg(long)]
    scripts_dir: Option<PathBuf>,

    /// Override the cron.d directory
    #[arg(long)]
    cron_dir: Option<PathBuf>,

    /// Override the temporary staging directory
    #[arg(long)]
    temp_dir: Option<PathBuf>,

    /// Override the backup root directory
    #[arg(long)]
    backup_root: Option<PathBuf>,

    /// Override the monitoring state directory
    #[arg(long)]
    monitoring_dir: Option<PathBuf>,
}

impl Cli {
    fn paths(&self) -> SetupPaths {
        let mut paths = SetupPaths::default();
        let overrides = [
            (&self.config_dir, &mut paths.config_dir),
            (&self.log_dir, &mut paths.log_dir),
            (&self.scripts_dir, &mut paths.scripts_dir),
            (&self.cron_dir, &mut paths.cron_dir),
            (&self.temp_dir, &mut paths.temp_dir),
            (&self.backup_root, &mut paths.backup_root),
            (&self.monitoring_dir, &mut paths.monitoring_dir),
        ];
        for (value, target) in overrides {
            if let Some(path) = value {
                *target = expand_tilde(path);
            }
        }
        paths
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let paths = cli.paths();

    // File logging only once a previous run has provisioned the log dir;
    // the guard must stay alive until exit.
    let _log_guard = if paths.log_dir.is_dir() {
        Some(managers::logging::init_logging(&paths.log_dir)?)
    } else {
        managers::logging::init_console_logging();
        None
    };

    let _lock = RunLock::acquire()?;

    let mut setup = Setup::new(
        paths,
        Box::new(TerminalPrompter::new()),
        Box::new(AptInstaller::new()),
    );

    if let Err(failure) = setup.run() {
        eprintln!(
            "{}",
            style(format!(
                "Error: step {}/{} ({}) failed: {}",
                failure.index, failure.total, failure.name, failure.error
            ))
            .red()
        );
        std::process::exit(1);
    }

    Ok(())
}
