use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::warn;

/// Structured human-executable procedure for POCs that cannot be run
/// automatically.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManualGuide {
    pub summary: Option<String>,
    /// Free-text procedure some generations return instead of discrete steps.
    pub description: Option<String>,
    pub required_tools: Vec<ToolEntry>,
    pub steps: Vec<StepEntry>,
    pub verification: Option<VerificationBlock>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolEntry {
    pub name: String,
    pub version: Option<String>,
    pub purpose: String,
    pub install_command: Option<String>,
    pub download_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StepEntry {
    pub step_number: u32,
    pub title: String,
    pub description: String,
    pub commands: Vec<String>,
    pub expected_result: Option<String>,
    pub notes: Option<String>,
}

impl StepEntry {
    /// The number to show for this step. Generated guides sometimes omit
    /// `step_number`, in which case the 1-based position is used.
    pub fn display_number(&self, index: usize) -> usize {
        if self.step_number > 0 {
            self.step_number as usize
        } else {
            index + 1
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VerificationBlock {
    pub success_indicators: Vec<String>,
    pub failure_indicators: Vec<String>,
    pub example_output: Option<String>,
}

impl ManualGuide {
    pub fn has_steps(&self) -> bool {
        !self.steps.is_empty()
    }
}

/// What a view layer should show for a record's manual procedure.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GuideView<'a> {
    Structured(&'a ManualGuide),
    Description(&'a str),
    Unavailable,
}

/// Accepts the guide as a JSON object, a JSON-encoded string (how the store
/// keeps it), or null. Anything unparseable degrades to `None`.
pub(crate) fn deserialize_lenient<'de, D>(deserializer: D) -> Result<Option<ManualGuide>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(Value::Null) => None,
        Some(Value::String(raw)) if raw.trim().is_empty() => None,
        Some(Value::String(raw)) => match serde_json::from_str::<ManualGuide>(&raw) {
            Ok(guide) => Some(guide),
            Err(e) => {
                warn!(error = %e, "Discarding unparseable manual_steps string");
                None
            }
        },
        Some(other) => match serde_json::from_value::<ManualGuide>(other) {
            Ok(guide) => Some(guide),
            Err(e) => {
                warn!(error = %e, "Discarding malformed manual_steps object");
                None
            }
        },
    })
}
