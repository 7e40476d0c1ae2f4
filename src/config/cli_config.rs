use crate::config::suite_config::SuiteConfig;
use crate::utils::error::{ProbeError, Result};
use crate::utils::validation::{self, Validate};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "cms-probe")]
#[command(about = "Acceptance checks against the institute CMS backend")]
pub struct CliConfig {
    /// Path to a TOML suite file (overrides --builtin)
    #[arg(short, long)]
    pub suite: Option<PathBuf>,

    /// Built-in suite to run when no suite file is given
    #[arg(long, default_value = "cms")]
    pub builtin: String,

    /// Backend base URL, e.g. https://cms.example.com
    #[arg(long)]
    pub base_url: Option<String>,

    /// Env file searched for the backend URL
    #[arg(long)]
    pub env_file: Option<PathBuf>,

    /// Per-request timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Only run these checks (plus their dependencies)
    #[arg(long, value_delimiter = ',')]
    pub only: Vec<String>,

    /// Write the JSON results to this file
    #[arg(short, long)]
    pub output: Option<String>,

    /// Print the plan without sending any request
    #[arg(long)]
    pub dry_run: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    /// Log format: compact or json
    #[arg(long, default_value = "compact")]
    pub log_format: String,
}

impl CliConfig {
    /// Loads the selected suite and applies `--only`.
    pub fn load_suite(&self) -> Result<SuiteConfig> {
        let suite = match &self.suite {
            Some(path) => {
                tracing::info!("📁 Loading suite from: {}", path.display());
                SuiteConfig::from_file(path)?
            }
            None => {
                tracing::info!("📁 Using built-in suite: {}", self.builtin);
                SuiteConfig::builtin(&self.builtin)?
            }
        };
        suite.validate()?;
        suite.select(&self.only)
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        if let Some(url) = &self.base_url {
            validation::validate_url("--base-url", url)?;
        }
        if let Some(timeout) = self.timeout {
            validation::validate_positive_number("--timeout", timeout as usize, 1)?;
        }
        if let Some(output) = &self.output {
            validation::validate_path("--output", output)?;
        }
        if self.log_format != "compact" && self.log_format != "json" {
            return Err(ProbeError::InvalidConfigValueError {
                field: "--log-format".to_string(),
                value: self.log_format.clone(),
                reason: "Valid formats: compact, json".to_string(),
            });
        }
        Ok(())
    }
}
