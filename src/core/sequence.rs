use crate::core::context::RunContext;
use crate::domain::model::{CheckEvidence, CheckOutcome, CheckStatus};
use crate::utils::error::Result;
use std::time::Instant;

/// 帶上下文的檢查介面
#[async_trait::async_trait]
pub trait ContextualCheck: Send + Sync {
    fn name(&self) -> &str;

    /// Checks that must have passed before this one runs.
    fn dependencies(&self) -> &[String] {
        &[]
    }

    async fn execute(&self, context: &RunContext) -> Result<CheckEvidence>;
}

/// 依序執行多個檢查，失敗時記錄並繼續
pub struct CheckSequence {
    checks: Vec<Box<dyn ContextualCheck>>,
    run_id: String,
    stop_on_failure: bool,
}

impl CheckSequence {
    pub fn new(run_id: String) -> Self {
        Self {
            checks: Vec::new(),
            run_id,
            stop_on_failure: false,
        }
    }

    pub fn with_stop_on_failure(mut self, stop: bool) -> Self {
        self.stop_on_failure = stop;
        self
    }

    pub fn add_check(&mut self, check: Box<dyn ContextualCheck>) {
        self.checks.push(check);
    }

    /// Runs every check once, in order. Never returns early on a failing
    /// check; the outcomes carry the verdicts.
    pub async fn execute_all(&self) -> RunContext {
        let mut context = RunContext::new(self.run_id.clone());
        let mut stopped = false;

        for check in &self.checks {
            let name = check.name();

            if stopped {
                context.add_outcome(CheckOutcome::skipped(
                    name,
                    "run stopped after an earlier failure".to_string(),
                ));
                continue;
            }

            if let Some(dep) = check.dependencies().iter().find(|d| !context.passed(d)) {
                tracing::info!(
                    "⏭️ Skipping check: {} (dependency '{}' did not pass)",
                    name,
                    dep
                );
                context.add_outcome(CheckOutcome::skipped(
                    name,
                    format!("dependency '{}' did not pass", dep),
                ));
                continue;
            }

            let start_time = Instant::now();
            let outcome = match check.execute(&context).await {
                Ok(evidence) => {
                    for (var, value) in &evidence.captured {
                        tracing::debug!("📌 {}: captured '{}'", name, var);
                        context.set_variable(var.clone(), value.clone());
                    }
                    let outcome = CheckOutcome::passed(name, &evidence, start_time.elapsed());
                    tracing::info!("✅ {} ({} ms)", name, outcome.duration_ms);
                    outcome
                }
                Err(e) => {
                    tracing::error!("❌ {}: {}", name, e);
                    let mut outcome =
                        CheckOutcome::failed(name, e.to_string(), start_time.elapsed());
                    outcome.http_status = e.http_status();
                    if self.stop_on_failure {
                        stopped = true;
                    }
                    outcome
                }
            };

            context.add_outcome(outcome);
        }

        context
    }
}

/// Counts outcomes by status.
pub fn tally(outcomes: &[CheckOutcome]) -> (usize, usize, usize) {
    outcomes.iter().fold((0, 0, 0), |(pass, fail, skip), o| match o.status {
        CheckStatus::Pass => (pass + 1, fail, skip),
        CheckStatus::Fail => (pass, fail + 1, skip),
        CheckStatus::Skip => (pass, fail, skip + 1),
    })
}
