use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::PocRecord;

/// Query parameters of `GET pocs/search`. Unset fields are omitted.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SearchQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keyword: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vuln_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub poc_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verifiable: Option<bool>,
    pub limit: usize,
}

impl SearchQuery {
    /// Unfiltered fetch of up to `limit` records, newest first server-side.
    pub fn page(limit: usize) -> Self {
        Self {
            limit,
            ..Default::default()
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    pub success: bool,
    #[serde(default)]
    pub pocs: Vec<PocRecord>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PocResponse {
    pub success: bool,
    #[serde(default)]
    pub poc: Option<PocRecord>,
}

#[derive(Debug, Deserialize)]
pub struct CodeResponse {
    #[serde(default)]
    pub code: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DeleteResponse {
    pub success: bool,
    #[serde(default)]
    pub error: Option<String>,
}

/// Server-side aggregate counts from `GET pocs/statistics`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerStatistics {
    pub total_pocs: u64,
    pub python_pocs: u64,
    pub nuclei_pocs: u64,
    pub recent_used: Vec<RecentUse>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecentUse {
    pub id: u64,
    pub name: String,
    pub last_used: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StatisticsResponse {
    pub success: bool,
    #[serde(default)]
    pub statistics: ServerStatistics,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VulnTypeCount {
    pub vuln_type: String,
    pub count: u64,
}

#[derive(Debug, Deserialize)]
pub struct VulnTypesResponse {
    pub success: bool,
    #[serde(default)]
    pub vuln_types: Vec<VulnTypeCount>,
}

/// Error bodies: FastAPI-style `{"detail": ...}` or `{"error": "..."}`.
#[derive(Debug, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub detail: Option<Value>,
    #[serde(default)]
    pub error: Option<String>,
}

impl ErrorBody {
    pub fn message(&self) -> Option<String> {
        match (&self.detail, &self.error) {
            (Some(Value::String(detail)), _) => Some(detail.clone()),
            (Some(other), _) if !other.is_null() => Some(other.to_string()),
            (_, Some(error)) => Some(error.clone()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_query_omits_unset() {
        let q = SearchQuery::page(100);
        let encoded = serde_json::to_value(&q).unwrap();
        assert_eq!(encoded, serde_json::json!({"limit": 100}));
    }

    #[test]
    fn test_error_body_detail_preferred() {
        let body: ErrorBody = serde_json::from_str(r#"{"detail": "POC不存在"}"#).unwrap();
        assert_eq!(body.message().as_deref(), Some("POC不存在"));
        let body: ErrorBody = serde_json::from_str(r#"{"error": "boom"}"#).unwrap();
        assert_eq!(body.message().as_deref(), Some("boom"));
        let body: ErrorBody = serde_json::from_str(r#"{}"#).unwrap();
        assert!(body.message().is_none());
    }

    #[test]
    fn test_statistics_defaults() {
        let resp: StatisticsResponse =
            serde_json::from_str(r#"{"success": true, "statistics": {"total_pocs": 4}}"#).unwrap();
        assert_eq!(resp.statistics.total_pocs, 4);
        assert!(resp.statistics.recent_used.is_empty());
    }
}
