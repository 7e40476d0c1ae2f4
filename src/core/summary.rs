use crate::core::context::RunContext;
use crate::core::sequence::tally;
use crate::domain::model::{CheckOutcome, CheckStatus};
use crate::domain::ports::ReportStore;
use crate::utils::error::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Result of one suite run, as printed and as written to the results file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub suite: String,
    pub base_url: String,
    pub run_id: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub success_rate: f64,
    pub errors: Vec<String>,
    pub results: Vec<CheckOutcome>,
}

impl RunSummary {
    pub fn from_context(
        suite: &str,
        base_url: &str,
        context: RunContext,
        started_at: DateTime<Utc>,
    ) -> Self {
        Self::from_outcomes(
            suite,
            base_url,
            context.run_id,
            context.outcomes,
            started_at,
            Utc::now(),
        )
    }

    pub fn from_outcomes(
        suite: &str,
        base_url: &str,
        run_id: String,
        results: Vec<CheckOutcome>,
        started_at: DateTime<Utc>,
        finished_at: DateTime<Utc>,
    ) -> Self {
        let (passed, failed, skipped) = tally(&results);
        let executed = passed + failed;
        let success_rate = if executed > 0 {
            (passed as f64 / executed as f64) * 100.0
        } else {
            0.0
        };
        let errors = results
            .iter()
            .filter(|o| o.status == CheckStatus::Fail)
            .map(|o| format!("{}: {}", o.name, o.message))
            .collect();

        Self {
            suite: suite.to_string(),
            base_url: base_url.to_string(),
            run_id,
            started_at,
            finished_at,
            total: results.len(),
            passed,
            failed,
            skipped,
            success_rate,
            errors,
            results,
        }
    }

    pub fn is_success(&self) -> bool {
        self.failed == 0
    }

    pub fn exit_code(&self) -> i32 {
        if self.is_success() {
            0
        } else {
            1
        }
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Plain text report for the terminal.
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("📋 Suite: {} against {}\n", self.suite, self.base_url));
        for outcome in &self.results {
            out.push_str(&format!(
                "  [{}] {} - {}\n",
                outcome.status.label(),
                outcome.name,
                outcome.message
            ));
        }
        out.push_str(&format!(
            "📊 Total: {}, Passed: {}, Failed: {}, Skipped: {}, Success rate: {:.1}%\n",
            self.total, self.passed, self.failed, self.skipped, self.success_rate
        ));
        if !self.errors.is_empty() {
            out.push_str("❌ Errors:\n");
            for error in &self.errors {
                out.push_str(&format!("  - {}\n", error));
            }
        }
        out
    }

    pub fn print_summary(&self) {
        print!("{}", self.render_text());
    }

    /// Writes the JSON report through `store` and returns where it landed.
    pub async fn save<S: ReportStore>(&self, store: &S, filename: &str) -> Result<String> {
        let json = self.to_json_pretty()?;
        let written = store.put_report(filename, json.as_bytes()).await?;
        let location = written.display().to_string();
        tracing::info!("💾 Results written to {}", location);
        Ok(location)
    }
}
