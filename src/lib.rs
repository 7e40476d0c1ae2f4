#[cfg(feature = "cli")]
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use config::cli::LocalReportStore;
pub use config::suite_config::SuiteConfig;
pub use config::target::RunSettings;
pub use core::{engine::ProbeEngine, summary::RunSummary};
pub use utils::error::{ProbeError, Result};
