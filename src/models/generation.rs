use serde::{Deserialize, Serialize};

use crate::errors::PocForgeError;
use super::guide::ManualGuide;

/// Inputs of one generate action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub vulnerability_info: String,
    pub target_info: Option<String>,
}

impl GenerationRequest {
    /// Trim both inputs and reject an empty vulnerability description.
    /// A blank target is sent as null.
    pub fn new(vulnerability_info: &str, target_info: Option<&str>) -> Result<Self, PocForgeError> {
        let vulnerability_info = vulnerability_info.trim();
        if vulnerability_info.is_empty() {
            return Err(PocForgeError::Validation("Vulnerability information is required".into()));
        }
        let target_info = target_info
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string);
        Ok(Self {
            vulnerability_info: vulnerability_info.to_string(),
            target_info,
        })
    }
}

/// Terminal success payload of a generation session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationResult {
    pub vulnerability_type: String,
    pub poc_code: String,
    pub explanation: String,
    pub original_vulnerability_info: String,
    pub verifiable: bool,
    /// Whether the server reports having stored the POC in the library.
    pub saved: bool,
    pub manual_steps: Option<ManualGuide>,
    pub warning: Option<String>,
}
