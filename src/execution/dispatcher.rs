use std::sync::Arc;

use tracing::{info, warn};

use crate::api::PocBackend;
use crate::errors::PocForgeError;
use crate::models::{ExecutionHeadline, ExecutionReport};

/// Runs one stored POC against one target. No retries, no client timeout.
pub struct ExecutionDispatcher {
    backend: Arc<dyn PocBackend>,
}

impl ExecutionDispatcher {
    pub fn new(backend: Arc<dyn PocBackend>) -> Self {
        Self { backend }
    }

    pub async fn execute(&self, poc_id: u64, target_url: &str) -> Result<ExecutionReport, PocForgeError> {
        let target_url = target_url.trim();
        if target_url.is_empty() {
            return Err(PocForgeError::Validation("Target URL is required".into()));
        }

        info!(poc_id, target = target_url, "Executing POC");
        let report = self.backend.execute_poc(poc_id, target_url).await?;

        match report.headline() {
            ExecutionHeadline::Vulnerable => info!(poc_id, "Target is vulnerable"),
            ExecutionHeadline::NotVulnerable => info!(poc_id, "Target not vulnerable"),
            ExecutionHeadline::Failed => warn!(poc_id, error = %report.failure_message(), "Execution failed"),
        }
        Ok(report)
    }
}
