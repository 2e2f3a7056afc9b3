//! Aegis Setup Library
//!
//! Provisions a host for automated backups: directory layout, tool
//! installation, backend/provider configuration, and generated backup
//! scripts plus a cron schedule.

pub mod config;
pub mod error;
pub mod generator;
pub mod managers;
pub mod setup;
pub mod utils;

// Re-export commonly used types
pub use config::{
    BackendConfig, BackendKind, JobConfig, MonitoringConfig, ProviderConfig, ProviderKind,
    ProviderSettings, RetentionConfig, SchedulingConfig, SetupConfig, SetupPaths,
};
pub use error::{Result, SetupError};
pub use managers::logging::{init_console_logging, init_logging, LogGuard};
pub use setup::{PipelineFailure, Setup, Step};
