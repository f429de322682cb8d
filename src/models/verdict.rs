use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::PocForgeError;

/// Outcome of running a POC against a live target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionVerdict {
    #[serde(default)]
    pub vulnerable: bool,
    #[serde(default)]
    pub reason: String,
    #[serde(default)]
    pub details: Option<VerdictDetails>,
}

/// POC scripts report details either as a message or as arbitrary JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VerdictDetails {
    Text(String),
    Structured(Value),
}

impl VerdictDetails {
    pub fn render(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Structured(value) => {
                serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
            }
        }
    }
}

/// Envelope returned by `POST pocs/{id}/execute`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionReport {
    pub success: bool,
    #[serde(default)]
    pub poc_id: Option<u64>,
    #[serde(default)]
    pub target_url: String,
    #[serde(default)]
    pub result: Option<ExecutionVerdict>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionHeadline {
    Vulnerable,
    NotVulnerable,
    Failed,
}

impl ExecutionReport {
    pub fn headline(&self) -> ExecutionHeadline {
        match (&self.result, self.success) {
            (Some(verdict), true) if verdict.vulnerable => ExecutionHeadline::Vulnerable,
            (Some(_), true) => ExecutionHeadline::NotVulnerable,
            _ => ExecutionHeadline::Failed,
        }
    }

    /// Render-ready details text. The underlying verdict is left untouched.
    pub fn render_details(&self) -> Option<String> {
        self.result
            .as_ref()
            .and_then(|v| v.details.as_ref())
            .map(VerdictDetails::render)
    }

    /// The server's failure message, verbatim when present.
    pub fn failure_message(&self) -> String {
        self.error
            .clone()
            .filter(|e| !e.trim().is_empty())
            .unwrap_or_else(|| "execution failed".to_string())
    }

    pub fn into_verdict(self) -> Result<ExecutionVerdict, PocForgeError> {
        match self.headline() {
            ExecutionHeadline::Failed => Err(PocForgeError::Application(self.failure_message())),
            _ => self
                .result
                .ok_or_else(|| PocForgeError::Application("execution failed".into())),
        }
    }
}
