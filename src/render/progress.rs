use std::time::{Duration, Instant};

use console::style;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

use crate::session::{SessionEvent, StepState, StepStatus};

/// Live step display for one generation session.
pub struct GenerationProgress {
    multi: MultiProgress,
    step_bars: Vec<ProgressBar>,
    status_bar: ProgressBar,
    start_time: Instant,
}

impl GenerationProgress {
    pub fn new() -> Self {
        let multi = MultiProgress::new();

        let status_bar = multi.add(ProgressBar::new_spinner());
        status_bar.set_style(
            ProgressStyle::default_spinner()
                .template("  {spinner:.cyan} {msg}")
                .unwrap()
        );
        status_bar.set_message("Connecting...");
        status_bar.enable_steady_tick(Duration::from_millis(120));

        Self {
            multi,
            step_bars: Vec::new(),
            status_bar,
            start_time: Instant::now(),
        }
    }

    pub fn handle_event(&mut self, event: &SessionEvent) {
        match event {
            SessionEvent::Started { session_id } => {
                self.status_bar.set_message(format!(
                    "Generating POC {}",
                    style(short_id(session_id)).dim(),
                ));
            }
            SessionEvent::Progress { steps } => {
                self.sync_steps(steps);
                self.update_status();
            }
            SessionEvent::Completed { result } => {
                for bar in &self.step_bars {
                    if !bar.is_finished() {
                        bar.finish();
                    }
                }
                self.status_bar.finish_with_message(format!(
                    "{} {} in {}",
                    style("Generated").green().bold(),
                    style(&result.vulnerability_type).white().bold(),
                    format_elapsed(self.start_time.elapsed()),
                ));
            }
            SessionEvent::Failed { message, .. } => {
                for bar in self.step_bars.drain(..) {
                    bar.abandon();
                }
                self.status_bar.finish_with_message(format!(
                    "{} {}",
                    style("Generation failed:").red().bold(),
                    style(message).red(),
                ));
            }
        }
    }

    fn sync_steps(&mut self, steps: &[StepState]) {
        while self.step_bars.len() < steps.len() {
            let bar = self.multi.insert_before(&self.status_bar, ProgressBar::new_spinner());
            bar.set_style(
                ProgressStyle::default_spinner()
                    .template("    {prefix} {msg}")
                    .unwrap()
            );
            self.step_bars.push(bar);
        }
        for (bar, step) in self.step_bars.iter().zip(steps) {
            bar.set_prefix(step_marker(step.status));
            bar.set_message(step_label(step));
        }
    }

    fn update_status(&self) {
        self.status_bar.set_message(format!(
            "Generating POC | {}",
            format_elapsed(self.start_time.elapsed()),
        ));
    }

    /// Print a line through the multi-progress (won't interfere with bars).
    pub fn println(&self, msg: &str) {
        let _ = self.multi.println(msg);
    }
}

impl Default for GenerationProgress {
    fn default() -> Self {
        Self::new()
    }
}

fn step_marker(status: StepStatus) -> String {
    match status {
        StepStatus::Completed => style("✓").green().to_string(),
        StepStatus::Active => style("⏳").yellow().to_string(),
        StepStatus::Pending => style("·").dim().to_string(),
    }
}

fn step_label(step: &StepState) -> String {
    let text = if step.message.is_empty() {
        format!("Step {}", step.step_id)
    } else {
        step.message.clone()
    };
    match step.status {
        StepStatus::Completed => style(text).green().to_string(),
        StepStatus::Active => style(text).yellow().to_string(),
        StepStatus::Pending => style(text).dim().to_string(),
    }
}

fn short_id(session_id: &str) -> &str {
    session_id.get(..8).unwrap_or(session_id)
}

fn format_elapsed(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    let mins = secs / 60;
    let remaining_secs = secs % 60;
    if mins > 0 {
        format!("{}m{}s", mins, remaining_secs)
    } else {
        format!("{}s", secs)
    }
}
