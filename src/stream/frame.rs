use serde::Deserialize;

use crate::errors::PocForgeError;
use crate::models::{GenerationResult, ManualGuide};
use crate::utils::truncation::truncate_error;

/// Prefix marking a significant line of the generation feed.
pub const DATA_PREFIX: &str = "data:";

/// Body that closes the feed.
pub const END_SENTINEL: &str = "[DONE]";

const DEFAULT_FAILURE: &str = "POC generation failed";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    Status,
    Result,
    Error,
    End,
}

/// One discrete event extracted from the generation feed.
#[derive(Debug, Clone, PartialEq)]
pub enum EventFrame {
    Status { step: u32, message: String },
    Result(ResultPayload),
    Error { message: String },
    End,
}

impl EventFrame {
    pub fn kind(&self) -> FrameKind {
        match self {
            Self::Status { .. } => FrameKind::Status,
            Self::Result(_) => FrameKind::Result,
            Self::Error { .. } => FrameKind::Error,
            Self::End => FrameKind::End,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ResultPayload {
    pub success: bool,
    #[serde(default)]
    pub vulnerability_type: Option<String>,
    #[serde(default)]
    pub original_vulnerability_info: Option<String>,
    #[serde(default)]
    pub poc_code: Option<String>,
    #[serde(default)]
    pub explanation: Option<String>,
    #[serde(default)]
    pub verifiable: Option<bool>,
    #[serde(default)]
    pub saved: Option<bool>,
    #[serde(default, deserialize_with = "crate::models::guide::deserialize_lenient")]
    pub manual_steps: Option<ManualGuide>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub warning: Option<String>,
}

impl ResultPayload {
    /// Convert into a terminal outcome. `submitted_info` backfills the
    /// original description when the server omits it.
    pub fn into_outcome(self, submitted_info: &str) -> Result<GenerationResult, PocForgeError> {
        if !self.success {
            return Err(PocForgeError::Application(failure_text(self.error)));
        }
        Ok(GenerationResult {
            vulnerability_type: self
                .vulnerability_type
                .filter(|t| !t.trim().is_empty())
                .unwrap_or_else(|| "unknown".to_string()),
            poc_code: self.poc_code.unwrap_or_default(),
            explanation: self.explanation.unwrap_or_default(),
            original_vulnerability_info: self
                .original_vulnerability_info
                .unwrap_or_else(|| submitted_info.to_string()),
            verifiable: self.verifiable.unwrap_or(true),
            saved: self.saved.unwrap_or(false),
            manual_steps: self.manual_steps,
            warning: self.warning,
        })
    }
}

fn failure_text(error: Option<String>) -> String {
    error
        .filter(|e| !e.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_FAILURE.to_string())
}

#[derive(Debug, Default, Deserialize)]
struct ErrorPayload {
    #[serde(default)]
    error: Option<String>,
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum WireFrame {
    Status {
        step: u32,
        #[serde(default)]
        message: String,
    },
    Result {
        data: ResultPayload,
    },
    Error {
        #[serde(default)]
        data: ErrorPayload,
    },
}

/// Parse one line of the feed. Returns `None` for lines without the data
/// prefix (blank separators, comments, other SSE fields).
pub fn parse_line(line: &str) -> Option<Result<EventFrame, PocForgeError>> {
    let line = line.strip_suffix('\r').unwrap_or(line);
    let body = line.strip_prefix(DATA_PREFIX)?;
    let body = body.strip_prefix(' ').unwrap_or(body);
    Some(parse_body(body))
}

pub fn parse_body(body: &str) -> Result<EventFrame, PocForgeError> {
    if body.trim() == END_SENTINEL {
        return Ok(EventFrame::End);
    }
    let wire: WireFrame = serde_json::from_str(body)
        .map_err(|e| PocForgeError::Protocol(format!("{} in frame {:?}", e, truncate_error(body))))?;
    Ok(match wire {
        WireFrame::Status { step, message } => EventFrame::Status { step, message },
        WireFrame::Result { data } => EventFrame::Result(data),
        WireFrame::Error { data } => EventFrame::Error {
            message: failure_text(data.error),
        },
    })
}
