use crate::config::suite_config::SuiteConfig;
use crate::core::TargetProvider;
use crate::utils::error::{ProbeError, Result};
use crate::utils::validation;
use std::collections::HashMap;
use std::path::Path;

/// Environment keys consulted for the backend URL, highest priority first.
pub const BASE_URL_ENV_KEYS: [&str; 3] =
    ["CMS_PROBE_BASE_URL", "BACKEND_URL", "REACT_APP_BACKEND_URL"];

/// The frontend's env file is where the deployed backend URL usually lives.
pub const DEFAULT_ENV_FILE: &str = "frontend/.env";

pub const DEFAULT_BASE_URL: &str = "http://localhost:8001";

/// Reads `KEY=value` pairs from an env file. A missing file yields no pairs.
pub fn read_env_file(path: &Path) -> Result<HashMap<String, String>> {
    if !path.exists() {
        tracing::debug!("Env file {} not found, skipping", path.display());
        return Ok(HashMap::new());
    }

    let parse_error = |e: dotenvy::Error| ProbeError::ConfigValidationError {
        field: "env_file".to_string(),
        message: format!("{}: {}", path.display(), e),
    };

    let mut vars = HashMap::new();
    for item in dotenvy::from_path_iter(path).map_err(parse_error)? {
        let (key, value) = item.map_err(parse_error)?;
        vars.insert(key, value);
    }
    Ok(vars)
}

/// First non-empty hit wins: flag, process env, env file, suite, default.
pub fn pick_base_url(
    cli: Option<&str>,
    process_env: impl Fn(&str) -> Option<String>,
    file_vars: &HashMap<String, String>,
    suite_default: Option<&str>,
) -> String {
    let non_empty = |s: &str| !s.trim().is_empty();

    if let Some(url) = cli.filter(|s| non_empty(s)) {
        return url.to_string();
    }
    for key in BASE_URL_ENV_KEYS {
        if let Some(url) = process_env(key).filter(|s| non_empty(s)) {
            return url;
        }
    }
    for key in BASE_URL_ENV_KEYS {
        if let Some(url) = file_vars.get(key).filter(|s| non_empty(s)) {
            return url.clone();
        }
    }
    suite_default
        .filter(|s| non_empty(s))
        .unwrap_or(DEFAULT_BASE_URL)
        .to_string()
}

pub fn resolve_base_url(
    cli: Option<&str>,
    env_file: &Path,
    suite_default: Option<&str>,
) -> Result<String> {
    let file_vars = read_env_file(env_file)?;
    let url = pick_base_url(cli, |key| std::env::var(key).ok(), &file_vars, suite_default);
    let url = url.trim().trim_end_matches('/').to_string();
    validation::validate_url("base_url", &url)?;
    Ok(url)
}

/// Resolved settings for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSettings {
    pub base_url: String,
    pub timeout_seconds: u64,
    pub stop_on_failure: bool,
}

impl RunSettings {
    pub fn resolve(
        suite: &SuiteConfig,
        base_url: Option<&str>,
        env_file: Option<&Path>,
        timeout_seconds: Option<u64>,
    ) -> Result<Self> {
        let env_file = env_file.unwrap_or(Path::new(DEFAULT_ENV_FILE));
        let base_url = resolve_base_url(base_url, env_file, suite.suite.base_url.as_deref())?;
        let timeout_seconds = timeout_seconds.unwrap_or_else(|| suite.timeout_seconds());
        validation::validate_positive_number("timeout", timeout_seconds as usize, 1)?;

        Ok(Self {
            base_url,
            timeout_seconds,
            stop_on_failure: suite.stop_on_failure(),
        })
    }
}

impl TargetProvider for RunSettings {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    fn timeout_seconds(&self) -> u64 {
        self.timeout_seconds
    }

    fn stop_on_failure(&self) -> bool {
        self.stop_on_failure
    }
}
