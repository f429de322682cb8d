use crate::models::GenerationResult;
use super::state::StepState;

/// Messages published by a generation session, in order: `Started`, zero or
/// more `Progress`, then exactly one of `Completed` / `Failed`.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    Started {
        session_id: String,
    },
    Progress {
        steps: Vec<StepState>,
    },
    Completed {
        result: GenerationResult,
    },
    Failed {
        error_type: &'static str,
        message: String,
    },
}

impl SessionEvent {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed { .. } | Self::Failed { .. })
    }
}
