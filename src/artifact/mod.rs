//! Downloadable POC files.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;

use crate::errors::PocForgeError;
use crate::models::{GenerationResult, PocRecord};

pub const CONTENT_TYPE: &str = "text/plain";

static UNSAFE_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[\s/\\]+").unwrap());

/// A named text file ready to be written out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PocArtifact {
    pub filename: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

impl PocArtifact {
    /// Name a freshly generated script `poc_<type>_<timestamp>.py`.
    pub fn from_generation(result: &GenerationResult, now: DateTime<Utc>) -> Result<Self, PocForgeError> {
        let stamp = now.format("%Y-%m-%dT%H-%M-%S");
        let filename = format!("poc_{}_{}.py", sanitize(&result.vulnerability_type), stamp);
        Self::build(filename, &result.poc_code)
    }

    /// Name a stored POC `<type>_<id>.py`.
    pub fn from_library(record: &PocRecord, code: &str) -> Result<Self, PocForgeError> {
        let filename = format!("{}_{}.py", sanitize(&record.vuln_type), record.id);
        Self::build(filename, code)
    }

    fn build(filename: String, code: &str) -> Result<Self, PocForgeError> {
        if code.trim().is_empty() {
            return Err(PocForgeError::Validation("no code to download".into()));
        }
        Ok(Self {
            filename,
            content_type: CONTENT_TYPE,
            bytes: code.as_bytes().to_vec(),
        })
    }

    /// Write into `dir` under the artifact's own filename.
    pub async fn save_to(&self, dir: &Path) -> Result<PathBuf, PocForgeError> {
        tokio::fs::create_dir_all(dir).await?;
        let path = dir.join(&self.filename);
        tokio::fs::write(&path, &self.bytes).await?;
        tracing::info!(path = %path.display(), bytes = self.bytes.len(), "Artifact written");
        Ok(path)
    }
}

fn sanitize(vuln_type: &str) -> String {
    let trimmed = vuln_type.trim();
    if trimmed.is_empty() {
        return "unknown".to_string();
    }
    UNSAFE_RUN.replace_all(trimmed, "_").into_owned()
}
