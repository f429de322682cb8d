use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::guide::{self, GuideView, ManualGuide};
use super::timestamp;

/// How a stored POC is executed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PocType {
    /// A script exposing a `scan(url)` entry point.
    #[default]
    #[serde(rename = "python", alias = "scripted")]
    Scripted,
    /// A declarative scanner template.
    #[serde(rename = "nuclei", alias = "template")]
    Template,
    /// Guide-only record with no runnable artifact.
    #[serde(rename = "manual")]
    Manual,
}

impl PocType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Scripted => "python",
            Self::Template => "nuclei",
            Self::Manual => "manual",
        }
    }
}

impl std::fmt::Display for PocType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of the POC library as served by the backend store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PocRecord {
    pub id: u64,
    #[serde(default, deserialize_with = "nullable_text")]
    pub vuln_name: String,
    #[serde(default, deserialize_with = "nullable_text")]
    pub vuln_type: String,
    #[serde(default)]
    pub poc_type: PocType,
    #[serde(default = "default_verifiable", deserialize_with = "verifiable_flag")]
    pub verifiable: bool,
    #[serde(default, deserialize_with = "nullable_text")]
    pub vuln_description: String,
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub create_time: DateTime<Utc>,
    #[serde(default, deserialize_with = "timestamp::deserialize_opt")]
    pub last_used: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "guide::deserialize_lenient")]
    pub manual_steps: Option<ManualGuide>,
}

impl PocRecord {
    /// Title for cards and headings; falls back to `POC-<id>`.
    pub fn display_name(&self) -> String {
        if self.vuln_name.trim().is_empty() {
            format!("POC-{}", self.id)
        } else {
            self.vuln_name.clone()
        }
    }

    pub fn is_manual(&self) -> bool {
        !self.verifiable
    }

    /// Resolve what to show as the manual procedure. A non-verifiable record
    /// without a usable guide falls back to its raw description.
    pub fn guide(&self) -> GuideView<'_> {
        if let Some(guide) = &self.manual_steps {
            if !guide.has_steps() {
                if let Some(desc) = guide.description.as_deref().filter(|d| !d.trim().is_empty()) {
                    return GuideView::Description(desc);
                }
            }
            return GuideView::Structured(guide);
        }
        if self.is_manual() && !self.vuln_description.trim().is_empty() {
            return GuideView::Description(&self.vuln_description);
        }
        GuideView::Unavailable
    }
}

fn default_verifiable() -> bool {
    true
}

/// The store keeps `verifiable` as an integer column; only an explicit 0 or
/// `false` marks a record as manual.
fn verifiable_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Bool(flag)) => flag,
        Some(Value::Number(n)) => n.as_f64() != Some(0.0),
        _ => true,
    })
}

fn nullable_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}
