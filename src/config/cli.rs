use crate::core::ReportStore;
use crate::utils::error::Result;
use std::path::PathBuf;

/// Writes reports below a directory on the local disk. Absolute report
/// names bypass the root.
#[derive(Debug, Clone)]
pub struct LocalReportStore {
    root: PathBuf,
}

impl LocalReportStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl ReportStore for LocalReportStore {
    async fn put_report(&self, name: &str, data: &[u8]) -> Result<PathBuf> {
        let target = self.root.join(name);
        if let Some(dir) = target.parent().filter(|d| !d.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(dir).await?;
        }
        tokio::fs::write(&target, data).await?;
        Ok(target)
    }
}
