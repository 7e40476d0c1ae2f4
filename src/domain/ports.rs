use crate::utils::error::Result;
use std::future::Future;
use std::path::PathBuf;

/// Where run reports are persisted.
pub trait ReportStore: Send + Sync {
    /// Stores `data` under `name` and returns the location it landed at.
    fn put_report(&self, name: &str, data: &[u8]) -> impl Future<Output = Result<PathBuf>> + Send;
}

/// Settings that decide which backend a run talks to and how.
pub trait TargetProvider: Send + Sync {
    fn base_url(&self) -> &str;
    fn timeout_seconds(&self) -> u64;
    fn stop_on_failure(&self) -> bool;
}
