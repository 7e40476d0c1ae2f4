use crate::core::expect::Assertion;
use crate::utils::error::{ProbeError, Result};
use crate::utils::template::substitute_env_vars;
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;

/// Suites compiled into the binary, addressable with `--builtin`.
pub const BUILTIN_SUITES: &[(&str, &str)] = &[
    ("cms", include_str!("../../suites/cms.toml")),
    ("maintenance", include_str!("../../suites/maintenance.toml")),
];

pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuiteConfig {
    pub suite: SuiteInfo,
    #[serde(default)]
    pub checks: Vec<CheckDefinition>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuiteInfo {
    pub name: String,
    pub description: Option<String>,
    pub version: Option<String>,
    pub base_url: Option<String>,
    pub timeout_seconds: Option<u64>,
    pub on_failure: Option<String>, // "continue" or "stop"
    pub default_headers: Option<BTreeMap<String, String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckDefinition {
    pub name: String,
    pub description: Option<String>,
    pub enabled: Option<bool>,
    pub method: Option<String>,
    pub path: String,
    pub query: Option<BTreeMap<String, String>>,
    pub headers: Option<BTreeMap<String, String>>,
    pub body: Option<serde_json::Value>,
    pub expect_status: Option<Vec<u16>>,
    #[serde(default, rename = "assert")]
    pub assertions: Vec<AssertSpec>,
    pub capture: Option<BTreeMap<String, String>>, // variable name -> JSON pointer
    pub depends_on: Option<Vec<String>>,
}

/// One `[[checks.assert]]` table. Exactly one operator field may be set.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssertSpec {
    pub pointer: Option<String>,
    pub exists: Option<bool>,
    pub equals: Option<serde_json::Value>,
    pub equals_var: Option<String>,
    pub kind: Option<String>,
    pub min_items: Option<usize>,
    pub max_items: Option<usize>,
    pub len_equals_var: Option<String>,
    pub contains: Option<String>,
    pub content_type: Option<String>,
    pub body_starts_with: Option<String>,
}

impl CheckDefinition {
    pub fn method(&self) -> String {
        self.method
            .as_deref()
            .unwrap_or("GET")
            .to_ascii_uppercase()
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.unwrap_or(true)
    }

    pub fn dependencies(&self) -> &[String] {
        self.depends_on.as_deref().unwrap_or(&[])
    }

    pub fn compiled_assertions(&self) -> Result<Vec<Assertion>> {
        self.assertions.iter().map(Assertion::try_from).collect()
    }
}

impl SuiteConfig {
    /// 從 TOML 檔案載入套件
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(ProbeError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// Parses a suite, then expands `${VAR}` placeholders inside string
    /// values so that environment values never reach the TOML parser.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let parse_error = |e: toml::de::Error| ProbeError::ConfigValidationError {
            field: "suite_toml_parsing".to_string(),
            message: format!("Suite TOML parsing error: {}", e),
        };

        let table: toml::Table = toml::from_str(content).map_err(parse_error)?;
        let mut document = toml::Value::Table(table);
        expand_env_vars(&mut document);
        document.try_into().map_err(parse_error)
    }

    pub fn builtin(name: &str) -> Result<Self> {
        let (_, content) = BUILTIN_SUITES
            .iter()
            .find(|(builtin, _)| *builtin == name)
            .ok_or_else(|| ProbeError::InvalidConfigValueError {
                field: "builtin".to_string(),
                value: name.to_string(),
                reason: format!(
                    "Unknown built-in suite. Available: {}",
                    BUILTIN_SUITES
                        .iter()
                        .map(|(n, _)| *n)
                        .collect::<Vec<_>>()
                        .join(", ")
                ),
            })?;
        Self::from_toml_str(content)
    }

    pub fn timeout_seconds(&self) -> u64 {
        self.suite.timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECONDS)
    }

    pub fn stop_on_failure(&self) -> bool {
        self.suite.on_failure.as_deref() == Some("stop")
    }

    pub fn get_check(&self, name: &str) -> Option<&CheckDefinition> {
        self.checks.iter().find(|c| c.name == name)
    }

    /// Enabled checks in declared order.
    pub fn enabled_checks(&self) -> Vec<&CheckDefinition> {
        self.checks.iter().filter(|c| c.is_enabled()).collect()
    }

    /// Keeps only the named checks and everything they depend on,
    /// in declared order.
    pub fn select(&self, only: &[String]) -> Result<Self> {
        if only.is_empty() {
            return Ok(self.clone());
        }

        let mut wanted: HashSet<&str> = HashSet::new();
        let mut stack: Vec<&str> = Vec::new();

        for name in only {
            if self.get_check(name).is_none() {
                return Err(ProbeError::InvalidConfigValueError {
                    field: "only".to_string(),
                    value: name.clone(),
                    reason: "No check with this name in the suite".to_string(),
                });
            }
            stack.push(name.as_str());
        }

        while let Some(name) = stack.pop() {
            if !wanted.insert(name) {
                continue;
            }
            if let Some(check) = self.get_check(name) {
                stack.extend(check.dependencies().iter().map(String::as_str));
            }
        }

        let mut selected = self.clone();
        selected
            .checks
            .retain(|c| wanted.contains(c.name.as_str()));
        Ok(selected)
    }

    pub fn validate_suite(&self) -> Result<()> {
        validation::validate_non_empty_string("suite.name", &self.suite.name)?;

        if let Some(base_url) = &self.suite.base_url {
            validation::validate_url("suite.base_url", base_url)?;
        }

        if let Some(timeout) = self.suite.timeout_seconds {
            validation::validate_positive_number("suite.timeout_seconds", timeout as usize, 1)?;
        }

        if let Some(policy) = &self.suite.on_failure {
            if policy != "continue" && policy != "stop" {
                return Err(ProbeError::InvalidConfigValueError {
                    field: "suite.on_failure".to_string(),
                    value: policy.clone(),
                    reason: "Valid values: continue, stop".to_string(),
                });
            }
        }

        validation::validate_unique_names(
            "checks.name",
            self.checks.iter().map(|c| c.name.as_str()),
        )?;

        // depends_on may only point backwards, which also rules out cycles
        let mut declared: HashSet<&str> = HashSet::new();
        for check in &self.checks {
            self.validate_check(check, &declared)?;
            declared.insert(check.name.as_str());
        }

        Ok(())
    }

    fn validate_check(&self, check: &CheckDefinition, declared: &HashSet<&str>) -> Result<()> {
        let field = |name: &str| format!("checks.{}.{}", check.name, name);

        validation::validate_non_empty_string("checks.name", &check.name)?;
        validation::validate_http_method(&field("method"), &check.method())?;
        validation::validate_request_path(&field("path"), &check.path)?;

        if let Some(codes) = &check.expect_status {
            if codes.is_empty() {
                return Err(ProbeError::ConfigValidationError {
                    field: field("expect_status"),
                    message: "List of expected status codes is empty".to_string(),
                });
            }
            for code in codes {
                validation::validate_range(&field("expect_status"), *code, 100, 599)?;
            }
        }

        if let Some(captures) = &check.capture {
            for (var, pointer) in captures {
                validation::validate_non_empty_string(&field("capture"), var)?;
                validation::validate_json_pointer(&field(&format!("capture.{}", var)), pointer)?;
            }
        }

        check.compiled_assertions().map_err(|e| ProbeError::ConfigValidationError {
            field: field("assert"),
            message: e.to_string(),
        })?;

        for dep in check.dependencies() {
            let Some(dependency) = self.get_check(dep) else {
                return Err(ProbeError::ConfigValidationError {
                    field: field("depends_on"),
                    message: format!("Dependency check '{}' not found", dep),
                });
            };
            if check.is_enabled() && !dependency.is_enabled() {
                return Err(ProbeError::ConfigValidationError {
                    field: field("depends_on"),
                    message: format!("Dependency check '{}' is disabled", dep),
                });
            }
            if !declared.contains(dep.as_str()) {
                return Err(ProbeError::ConfigValidationError {
                    field: field("depends_on"),
                    message: format!(
                        "Dependency check '{}' must be declared before '{}'",
                        dep, check.name
                    ),
                });
            }
        }

        Ok(())
    }
}

fn expand_env_vars(value: &mut toml::Value) {
    match value {
        toml::Value::String(s) => *s = substitute_env_vars(s),
        toml::Value::Array(items) => items.iter_mut().for_each(expand_env_vars),
        toml::Value::Table(table) => table.iter_mut().for_each(|(_, v)| expand_env_vars(v)),
        _ => {}
    }
}

impl Validate for SuiteConfig {
    fn validate(&self) -> Result<()> {
        self.validate_suite()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SUITE: &str = r#"
[suite]
name = "unit"
timeout_seconds = 5

[[checks]]
name = "health"
path = "/api/health"

[[checks.assert]]
pointer = "/status"
exists = true

[[checks]]
name = "login"
method = "post"
path = "/api/admin/login"
body = { username = "admin", password = "secret" }
capture = { token = "/token" }

[[checks]]
name = "leads"
path = "/api/leads"
depends_on = ["login"]
headers = { Authorization = "Bearer {{token}}" }
expect_status = [200]
"#;

    #[test]
    fn test_parse_suite() {
        let config = SuiteConfig::from_toml_str(SUITE).unwrap();
        assert_eq!(config.suite.name, "unit");
        assert_eq!(config.checks.len(), 3);
        assert_eq!(config.checks[1].method(), "POST");
        assert_eq!(config.checks[0].method(), "GET");
        assert_eq!(config.timeout_seconds(), 5);
        assert!(!config.stop_on_failure());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_dependency_must_be_declared_earlier() {
        let toml_content = r#"
[suite]
name = "order"

[[checks]]
name = "first"
path = "/a"
depends_on = ["second"]

[[checks]]
name = "second"
path = "/b"
depends_on = ["first"]
"#;
        let config = SuiteConfig::from_toml_str(toml_content).unwrap();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("declared before"));
    }

    #[test]
    fn test_unknown_dependency_rejected() {
        let toml_content = r#"
[suite]
name = "missing"

[[checks]]
name = "only"
path = "/a"
depends_on = ["ghost"]
"#;
        let config = SuiteConfig::from_toml_str(toml_content).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let toml_content = r#"
[suite]
name = "dupes"

[[checks]]
name = "a"
path = "/a"

[[checks]]
name = "a"
path = "/b"
"#;
        let config = SuiteConfig::from_toml_str(toml_content).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_assertion_with_two_operators_rejected() {
        let toml_content = r#"
[suite]
name = "bad-assert"

[[checks]]
name = "a"
path = "/a"

[[checks.assert]]
pointer = "/x"
exists = true
equals = 1
"#;
        let config = SuiteConfig::from_toml_str(toml_content).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_on_failure_rejected() {
        let toml_content = r#"
[suite]
name = "policy"
on_failure = "retry"
"#;
        let config = SuiteConfig::from_toml_str(toml_content).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_select_pulls_in_dependencies() {
        let config = SuiteConfig::from_toml_str(SUITE).unwrap();
        let selected = config.select(&["leads".to_string()]).unwrap();
        let names: Vec<_> = selected.checks.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["login", "leads"]);
    }

    #[test]
    fn test_select_unknown_name() {
        let config = SuiteConfig::from_toml_str(SUITE).unwrap();
        assert!(config.select(&["nope".to_string()]).is_err());
    }

    #[test]
    fn test_env_default_in_suite() {
        let toml_content = r#"
[suite]
name = "env"
base_url = "${CMS_PROBE_SUITE_TEST_URL:-http://localhost:9999}"
"#;
        let config = SuiteConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.suite.base_url.as_deref(), Some("http://localhost:9999"));
    }

    #[test]
    fn test_dependency_on_disabled_check_rejected() {
        let toml_content = r#"
[suite]
name = "disabled-dep"

[[checks]]
name = "login"
path = "/api/admin/login"
enabled = false

[[checks]]
name = "leads"
path = "/api/leads"
depends_on = ["login"]
"#;
        let config = SuiteConfig::from_toml_str(toml_content).unwrap();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("'login' is disabled"));
    }

    #[test]
    fn test_env_value_with_quotes_and_backslashes() {
        std::env::set_var("CMS_ADMIN_PASSWORD", r#"pa"ss\w"#);
        let config = SuiteConfig::builtin("cms");
        std::env::remove_var("CMS_ADMIN_PASSWORD");

        let config = config.unwrap();
        let login = config.get_check("admin-login").unwrap();
        assert_eq!(login.body.as_ref().unwrap()["password"], r#"pa"ss\w"#);
    }

    #[test]
    fn test_env_placeholder_is_not_parsed_as_toml() {
        std::env::set_var("CMS_PROBE_SUITE_TEST_NAME", "x\"\ny = 1");
        let config = SuiteConfig::from_toml_str(
            r#"
[suite]
name = "${CMS_PROBE_SUITE_TEST_NAME}"
"#,
        );
        std::env::remove_var("CMS_PROBE_SUITE_TEST_NAME");
        assert_eq!(config.unwrap().suite.name, "x\"\ny = 1");
    }

    #[test]
    fn test_builtin_suites_are_valid() {
        for (name, _) in BUILTIN_SUITES {
            let config = SuiteConfig::builtin(name).unwrap();
            config.validate().unwrap();
            assert!(!config.checks.is_empty());
        }
        assert!(SuiteConfig::builtin("nope").is_err());
    }

    #[test]
    fn test_suite_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(SUITE.as_bytes()).unwrap();

        let config = SuiteConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.suite.name, "unit");
    }
}
