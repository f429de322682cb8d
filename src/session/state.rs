use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    Pending,
    Active,
    Completed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepState {
    pub step_id: u32,
    pub status: StepStatus,
    pub message: String,
}

/// Per-step progress of one generation session.
///
/// Invariant: at most one step is active, every step below it is completed
/// and every step above it is pending. Updates are never rejected; any
/// ordering (duplicates, regressions) is folded into that shape.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProgressTracker {
    steps: Vec<StepState>,
}

impl ProgressTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-declare steps `1..=labels.len()` as pending with the given labels.
    pub fn with_steps(labels: &[&str]) -> Self {
        let steps = labels
            .iter()
            .enumerate()
            .map(|(i, label)| StepState {
                step_id: i as u32 + 1,
                status: StepStatus::Pending,
                message: label.to_string(),
            })
            .collect();
        Self { steps }
    }

    /// Apply an update for `step_id`. Step 0 is not a real step and is ignored;
    /// returns whether the update changed anything.
    pub fn update(&mut self, step_id: u32, status: StepStatus, message: &str) -> bool {
        if step_id == 0 {
            return false;
        }
        self.ensure_step(step_id);
        for step in &mut self.steps {
            if step.step_id < step_id {
                step.status = StepStatus::Completed;
            } else if step.step_id > step_id {
                step.status = StepStatus::Pending;
            } else {
                step.status = status;
                step.message = message.to_string();
            }
        }
        true
    }

    /// Mark the active step, or the last known step, completed. Called on a
    /// terminal frame whether or not every status update was seen.
    pub fn complete_current(&mut self) {
        let idx = self
            .steps
            .iter()
            .position(|s| s.status == StepStatus::Active)
            .or_else(|| self.steps.len().checked_sub(1));
        if let Some(idx) = idx {
            self.steps[idx].status = StepStatus::Completed;
        }
    }

    pub fn steps(&self) -> &[StepState] {
        &self.steps
    }

    pub fn active(&self) -> Option<&StepState> {
        self.steps.iter().find(|s| s.status == StepStatus::Active)
    }

    fn ensure_step(&mut self, step_id: u32) {
        let known = self.steps.len() as u32;
        for id in (known + 1)..=step_id {
            self.steps.push(StepState {
                step_id: id,
                status: StepStatus::Pending,
                message: String::new(),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn invariant_holds(steps: &[StepState]) -> bool {
        let active: Vec<&StepState> = steps.iter().filter(|s| s.status == StepStatus::Active).collect();
        if active.len() > 1 {
            return false;
        }
        match active.first() {
            Some(a) => steps.iter().all(|s| {
                (s.step_id < a.step_id && s.status == StepStatus::Completed)
                    || (s.step_id > a.step_id && s.status == StepStatus::Pending)
                    || s.step_id == a.step_id
            }),
            None => true,
        }
    }

    #[test]
    fn test_forward_progress() {
        let mut t = ProgressTracker::new();
        t.update(1, StepStatus::Active, "generating");
        t.update(2, StepStatus::Active, "saving");
        assert_eq!(t.steps()[0].status, StepStatus::Completed);
        assert_eq!(t.active().unwrap().step_id, 2);
        assert_eq!(t.active().unwrap().message, "saving");
    }

    #[test]
    fn test_regression_resets_later_steps() {
        let mut t = ProgressTracker::new();
        t.update(3, StepStatus::Active, "three");
        t.update(1, StepStatus::Active, "one again");
        let statuses: Vec<StepStatus> = t.steps().iter().map(|s| s.status).collect();
        assert_eq!(statuses, vec![StepStatus::Active, StepStatus::Pending, StepStatus::Pending]);
    }

    #[test]
    fn test_heartbeat_ignored() {
        let mut t = ProgressTracker::new();
        assert!(!t.update(0, StepStatus::Active, "starting"));
        assert!(t.steps().is_empty());
    }

    #[test]
    fn test_complete_current_without_updates() {
        let mut t = ProgressTracker::with_steps(&["generate", "save"]);
        t.complete_current();
        assert_eq!(t.steps()[1].status, StepStatus::Completed);
        assert_eq!(t.steps()[0].status, StepStatus::Pending);

        let mut empty = ProgressTracker::new();
        empty.complete_current();
        assert!(empty.steps().is_empty());
    }

    #[test]
    fn test_complete_current_prefers_active() {
        let mut t = ProgressTracker::with_steps(&["a", "b", "c"]);
        t.update(2, StepStatus::Active, "b running");
        t.complete_current();
        let statuses: Vec<StepStatus> = t.steps().iter().map(|s| s.status).collect();
        assert_eq!(statuses, vec![StepStatus::Completed, StepStatus::Completed, StepStatus::Pending]);
    }

    #[test]
    fn test_invariant_for_all_short_update_orderings() {
        let statuses = [StepStatus::Pending, StepStatus::Active, StepStatus::Completed];
        let mut updates = Vec::new();
        for step in 0..=3u32 {
            for status in statuses {
                updates.push((step, status));
            }
        }
        let n = updates.len();
        for a in 0..n {
            for b in 0..n {
                for c in 0..n {
                    let mut t = ProgressTracker::new();
                    for &(step, status) in [updates[a], updates[b], updates[c]].iter() {
                        t.update(step, status, "m");
                        assert!(invariant_holds(t.steps()), "broken after {:?}", (a, b, c));
                    }
                    t.complete_current();
                    assert!(invariant_holds(t.steps()));
                }
            }
        }
    }
}
