use crate::config::suite_config::SuiteConfig;
use crate::core::check::HttpCheck;
use crate::core::sequence::CheckSequence;
use crate::core::summary::RunSummary;
use crate::domain::ports::TargetProvider;
use crate::utils::error::Result;
use chrono::Utc;
use reqwest::Client;
use std::time::Duration;

pub struct ProbeEngine<T: TargetProvider> {
    suite: SuiteConfig,
    target: T,
}

impl<T: TargetProvider> ProbeEngine<T> {
    pub fn new(suite: SuiteConfig, target: T) -> Self {
        Self { suite, target }
    }

    pub fn suite(&self) -> &SuiteConfig {
        &self.suite
    }

    /// One client for the whole run; the timeout applies to every request.
    pub fn build_client(&self) -> Result<Client> {
        let client = Client::builder()
            .timeout(Duration::from_secs(self.target.timeout_seconds()))
            .user_agent(concat!("cms-probe/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(client)
    }

    pub fn build_sequence(&self, client: &Client, run_id: String) -> Result<CheckSequence> {
        let mut sequence =
            CheckSequence::new(run_id).with_stop_on_failure(self.target.stop_on_failure());
        let default_headers = self.suite.suite.default_headers.clone().unwrap_or_default();

        for definition in self.suite.enabled_checks() {
            let check = HttpCheck::new(
                definition.clone(),
                self.target.base_url(),
                default_headers.clone(),
                client.clone(),
            )?;
            sequence.add_check(Box::new(check));
        }

        Ok(sequence)
    }

    /// Human readable execution plan, used by `--dry-run`.
    pub fn plan(&self) -> Vec<String> {
        self.suite
            .checks
            .iter()
            .map(|check| {
                let mut line = format!(
                    "{} {}{}",
                    check.method(),
                    self.target.base_url(),
                    check.path
                );
                if !check.is_enabled() {
                    line.push_str(" (disabled)");
                }
                if !check.dependencies().is_empty() {
                    line.push_str(&format!(" after {}", check.dependencies().join(", ")));
                }
                format!("{}: {}", check.name, line)
            })
            .collect()
    }

    pub async fn run(&self) -> Result<RunSummary> {
        let started_at = Utc::now();
        let run_id = format!("run_{}", started_at.format("%Y%m%dT%H%M%S"));

        tracing::info!(
            "🚀 Running suite '{}' against {} ({} checks)",
            self.suite.suite.name,
            self.target.base_url(),
            self.suite.enabled_checks().len()
        );

        let client = self.build_client()?;
        let sequence = self.build_sequence(&client, run_id)?;
        let context = sequence.execute_all().await;

        let summary = RunSummary::from_context(
            &self.suite.suite.name,
            self.target.base_url(),
            context,
            started_at,
        );
        tracing::info!(
            "📊 Suite '{}' finished: {} passed, {} failed, {} skipped",
            summary.suite,
            summary.passed,
            summary.failed,
            summary.skipped
        );
        Ok(summary)
    }
}
