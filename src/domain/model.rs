use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    Pass,
    Fail,
    Skip,
}

impl CheckStatus {
    pub fn label(&self) -> &'static str {
        match self {
            CheckStatus::Pass => "PASS",
            CheckStatus::Fail => "FAIL",
            CheckStatus::Skip => "SKIP",
        }
    }
}

/// What a successful check observed.
#[derive(Debug, Clone, Default)]
pub struct CheckEvidence {
    pub http_status: Option<u16>,
    pub message: String,
    pub captured: Vec<(String, serde_json::Value)>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckOutcome {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
    pub http_status: Option<u16>,
    pub duration_ms: u64,
}

impl CheckOutcome {
    pub fn passed(name: &str, evidence: &CheckEvidence, duration: Duration) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Pass,
            message: evidence.message.clone(),
            http_status: evidence.http_status,
            duration_ms: duration.as_millis() as u64,
        }
    }

    pub fn failed(name: &str, message: String, duration: Duration) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Fail,
            message,
            http_status: None,
            duration_ms: duration.as_millis() as u64,
        }
    }

    pub fn skipped(name: &str, message: String) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Skip,
            message,
            http_status: None,
            duration_ms: 0,
        }
    }
}
