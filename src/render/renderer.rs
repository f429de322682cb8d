use chrono::{DateTime, Utc};
use console::style;
use serde_json::Value;

use crate::library::LibraryStatistics;
use crate::models::{
    ExecutionHeadline, ExecutionReport, GenerationResult, GuideView, ManualGuide, PocRecord,
};
use crate::notify::{Level, Notification};
use crate::utils::formatting::{format_date_smart, format_timestamp};
use crate::utils::truncation::truncate_description;

/// Render a verifiable/manual badge.
pub fn render_kind_badge(verifiable: bool) -> String {
    if verifiable {
        style(" VERIFIABLE ").green().bold().to_string()
    } else {
        style(" MANUAL ").yellow().bold().to_string()
    }
}

/// One library card: title line, meta line, truncated description.
pub fn render_poc_card(record: &PocRecord, now: DateTime<Utc>) -> String {
    let mut out = format!(
        "  {} {} {}\n",
        style(format!("#{}", record.id)).cyan().bold(),
        style(record.display_name()).white().bold(),
        render_kind_badge(record.verifiable),
    );
    out.push_str(&format!(
        "    {} {} {} {}\n",
        style(&record.vuln_type).magenta(),
        style("·").dim(),
        style(record.poc_type).dim(),
        style(format!("· {}", format_date_smart(Some(record.create_time), now))).dim(),
    ));
    if !record.vuln_description.trim().is_empty() {
        out.push_str(&format!(
            "    {}\n",
            style(truncate_description(&record.vuln_description)).dim(),
        ));
    }
    out
}

pub fn render_statistics(stats: &LibraryStatistics) -> String {
    format!(
        "  {} {}  {} {}  {} {}  {} {}\n",
        style("Total:").dim(),
        style(stats.total).white().bold(),
        style("Verifiable:").dim(),
        style(stats.verifiable_count).green().bold(),
        style("Manual:").dim(),
        style(stats.manual_count).yellow().bold(),
        style("Types:").dim(),
        style(stats.distinct_vuln_type_count).white().bold(),
    )
}

/// Library listing. Statistics cover the whole cache, the cards only the view.
pub fn render_library(view: &[&PocRecord], stats: &LibraryStatistics, now: DateTime<Utc>) -> String {
    let mut out = format!("\n{}\n", style("POC Library").white().bold());
    out.push_str(&render_statistics(stats));
    out.push('\n');

    if view.is_empty() {
        let msg = if stats.total == 0 {
            "The library is empty."
        } else {
            "No POCs match the current filter."
        };
        out.push_str(&format!("  {}\n", style(msg).dim()));
        return out;
    }

    for record in view {
        out.push_str(&render_poc_card(record, now));
        out.push('\n');
    }
    out.push_str(&format!(
        "  {}\n",
        style(format!("Showing {} of {}", view.len(), stats.total)).dim(),
    ));
    out
}

/// Full detail view of one record.
pub fn render_record_detail(record: &PocRecord, now: DateTime<Utc>) -> String {
    let last_used = record
        .last_used
        .map(|t| format!("{} ({})", format_timestamp(t), format_date_smart(Some(t), now)))
        .unwrap_or_else(|| "never".to_string());

    let mut out = format!(
        "\n  {} {}\n\n",
        style(record.display_name()).white().bold(),
        render_kind_badge(record.verifiable),
    );
    for (label, value) in [
        ("ID:", record.id.to_string()),
        ("Type:", record.vuln_type.clone()),
        ("POC type:", record.poc_type.to_string()),
        ("Created:", format_timestamp(record.create_time)),
        ("Last used:", last_used),
    ] {
        out.push_str(&format!("  {:<11} {}\n", style(label).dim(), value));
    }
    if !record.vuln_description.trim().is_empty() {
        out.push_str(&format!("\n  {}\n  {}\n", style("Description").white().bold(), record.vuln_description));
    }
    out
}

/// Manual procedure for a record, whatever shape it was stored in.
pub fn render_guide(view: GuideView<'_>) -> String {
    match view {
        GuideView::Structured(guide) => render_manual_guide(guide),
        GuideView::Description(text) => format!(
            "\n{}\n\n{}\n",
            style("Manual verification").white().bold(),
            text,
        ),
        GuideView::Unavailable => format!("  {}\n", style("No manual guide available.").dim()),
    }
}

fn render_manual_guide(guide: &ManualGuide) -> String {
    let mut out = format!("\n{}\n", style("Manual verification guide").white().bold());

    if let Some(summary) = guide.summary.as_deref().filter(|s| !s.is_empty()) {
        out.push_str(&format!("\n  {}\n", summary));
    }

    if !guide.required_tools.is_empty() {
        out.push_str(&format!("\n{}\n", style("Required tools").cyan().bold()));
        for tool in &guide.required_tools {
            let version = tool.version.as_deref().map(|v| format!(" {}", v)).unwrap_or_default();
            out.push_str(&format!(
                "  {} {}{} {}\n",
                style("•").cyan(),
                style(&tool.name).white().bold(),
                style(version).dim(),
                style(&tool.purpose).dim(),
            ));
            if let Some(cmd) = &tool.install_command {
                out.push_str(&format!("      {}\n", style(format!("$ {}", cmd)).dim()));
            }
            if let Some(url) = &tool.download_url {
                out.push_str(&format!("      {}\n", style(url).underlined()));
            }
        }
    }

    if guide.has_steps() {
        out.push_str(&format!("\n{}\n", style("Steps").cyan().bold()));
        for (i, step) in guide.steps.iter().enumerate() {
            out.push_str(&format!(
                "\n  {} {}\n",
                style(format!("{}.", step.display_number(i))).cyan().bold(),
                style(&step.title).white().bold(),
            ));
            if !step.description.is_empty() {
                out.push_str(&format!("     {}\n", step.description));
            }
            for cmd in &step.commands {
                out.push_str(&format!("     {}\n", style(format!("$ {}", cmd)).yellow()));
            }
            if let Some(expected) = &step.expected_result {
                out.push_str(&format!("     {} {}\n", style("Expected:").dim(), expected));
            }
            if let Some(notes) = &step.notes {
                out.push_str(&format!("     {} {}\n", style("Note:").dim(), notes));
            }
        }
    } else if let Some(desc) = guide.description.as_deref() {
        out.push_str(&format!("\n{}\n", desc));
    }

    if let Some(verification) = &guide.verification {
        out.push_str(&format!("\n{}\n", style("Verification").cyan().bold()));
        for indicator in &verification.success_indicators {
            out.push_str(&format!("  {} {}\n", style("✓").green(), indicator));
        }
        for indicator in &verification.failure_indicators {
            out.push_str(&format!("  {} {}\n", style("✗").red(), indicator));
        }
        if let Some(example) = &verification.example_output {
            out.push_str(&format!("\n  {}\n{}\n", style("Example output:").dim(), example));
        }
    }

    if let Some(notes) = guide.notes.as_deref().filter(|n| !n.is_empty()) {
        out.push_str(&format!("\n{} {}\n", style("Notes:").dim(), notes));
    }
    out
}

pub fn render_generation_result(result: &GenerationResult) -> String {
    let mut out = format!(
        "\n{} {} {}\n",
        style("✓ POC generated:").green().bold(),
        style(&result.vulnerability_type).white().bold(),
        render_kind_badge(result.verifiable),
    );
    let saved = if result.saved {
        style("saved to library").green().to_string()
    } else {
        style("not saved").yellow().to_string()
    };
    out.push_str(&format!("  {} {}\n", style("Library:").dim(), saved));

    if let Some(warning) = &result.warning {
        out.push_str(&format!("  {} {}\n", style("⚠").yellow().bold(), style(warning).yellow()));
    }
    if !result.explanation.is_empty() {
        out.push_str(&format!("\n{}\n{}\n", style("Explanation").white().bold(), result.explanation));
    }
    if !result.poc_code.is_empty() {
        out.push_str(&format!("\n{}\n{}\n", style("Code").white().bold(), result.poc_code));
    }
    if let Some(guide) = &result.manual_steps {
        out.push_str(&render_manual_guide(guide));
    }
    out
}

pub fn render_execution_report(report: &ExecutionReport) -> String {
    let headline = match report.headline() {
        ExecutionHeadline::Vulnerable => style("✓ Target is VULNERABLE").red().bold().to_string(),
        ExecutionHeadline::NotVulnerable => style("✓ Target does not appear vulnerable").green().bold().to_string(),
        ExecutionHeadline::Failed => style("✗ Execution failed").red().bold().to_string(),
    };
    let mut out = format!("\n{}\n", headline);
    if !report.target_url.is_empty() {
        out.push_str(&format!("  {} {}\n", style("Target:").dim(), report.target_url));
    }
    match (&report.result, report.headline()) {
        (_, ExecutionHeadline::Failed) => {
            out.push_str(&format!("  {} {}\n", style("Error:").dim(), style(report.failure_message()).red()));
        }
        (Some(verdict), _) => {
            out.push_str(&format!("  {} {}\n", style("Reason:").dim(), verdict.reason));
        }
        (None, _) => {}
    }
    if let Some(details) = report.render_details() {
        out.push_str(&format!("\n{}\n{}\n", style("Details").white().bold(), details));
    }
    out
}

pub fn render_notification(notification: &Notification) -> String {
    match notification.level {
        Level::Success => render_success(&notification.message),
        Level::Warning => format!("{} {}", style("⚠").yellow(), style(&notification.message).yellow()),
        Level::Error => render_error(&notification.message),
    }
}

pub fn render_health(base_url: &str, body: &Value) -> String {
    let status = body.get("status").and_then(Value::as_str).unwrap_or("unknown");
    let styled = match status {
        "healthy" | "ok" => style(status).green().bold().to_string(),
        other => style(other).yellow().to_string(),
    };
    format!("\n  {} {}\n  {} {}\n", style("Backend:").dim(), base_url, style("Status:").dim(), styled)
}

pub fn render_error(msg: &str) -> String {
    format!("{} {}", style("✗").red(), style(msg).red())
}

pub fn render_success(msg: &str) -> String {
    format!("{} {}", style("✓").green(), msg)
}

pub fn render_version() -> String {
    let version = env!("CARGO_PKG_VERSION");
    let git_hash = option_env!("GIT_HASH").unwrap_or("dev");
    let build_ts = option_env!("BUILD_TIMESTAMP").unwrap_or("unknown");

    format!(
        "\n  {} {}\n  {} {}\n  {} {}\n",
        style("Version:").dim(),
        style(version).white().bold(),
        style("Commit:").dim(),
        style(git_hash).white(),
        style("Built:").dim(),
        style(build_ts).white(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::library::query::fixtures::record;
    use crate::models::{ExecutionVerdict, StepEntry, VerdictDetails};
    use chrono::TimeZone;

    fn plain(s: String) -> String {
        console::strip_ansi_codes(&s).into_owned()
    }

    #[test]
    fn test_card_truncates_description() {
        let mut rec = record(1, "Login SQLi", "sqli", true, 0);
        rec.vuln_description = "x".repeat(300);
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 18, 0, 0).unwrap();
        let card = plain(render_poc_card(&rec, now));
        assert!(card.contains("#1"));
        assert!(card.contains("VERIFIABLE"));
        assert!(card.contains("today"));
        assert!(card.contains("..."));
        assert!(!card.contains(&"x".repeat(121)));
    }

    #[test]
    fn test_empty_library_messages() {
        let now = Utc::now();
        let empty = plain(render_library(&[], &LibraryStatistics::default(), now));
        assert!(empty.contains("The library is empty."));

        let stats = LibraryStatistics { total: 3, ..Default::default() };
        let filtered = plain(render_library(&[], &stats, now));
        assert!(filtered.contains("No POCs match"));
    }

    #[test]
    fn test_guide_step_numbers() {
        let guide = ManualGuide {
            steps: vec![
                StepEntry { title: "Open page".into(), ..Default::default() },
                StepEntry { step_number: 5, title: "Replay".into(), commands: vec!["curl -i".into()], ..Default::default() },
            ],
            ..Default::default()
        };
        let text = plain(render_guide(GuideView::Structured(&guide)));
        assert!(text.contains("1. Open page"));
        assert!(text.contains("5. Replay"));
        assert!(text.contains("$ curl -i"));
    }

    #[test]
    fn test_guide_unavailable() {
        assert!(plain(render_guide(GuideView::Unavailable)).contains("No manual guide"));
    }

    #[test]
    fn test_execution_failed_shows_server_error() {
        let report = ExecutionReport {
            success: false,
            poc_id: Some(3),
            target_url: "http://t/".into(),
            result: None,
            error: Some("POC执行超时".into()),
        };
        let text = plain(render_execution_report(&report));
        assert!(text.contains("Execution failed"));
        assert!(text.contains("POC执行超时"));
    }

    #[test]
    fn test_execution_details_rendered() {
        let report = ExecutionReport {
            success: true,
            poc_id: Some(3),
            target_url: "http://t/".into(),
            result: Some(ExecutionVerdict {
                vulnerable: true,
                reason: "echo".into(),
                details: Some(VerdictDetails::Text("payload reflected".into())),
            }),
            error: None,
        };
        let text = plain(render_execution_report(&report));
        assert!(text.contains("VULNERABLE"));
        assert!(text.contains("payload reflected"));
    }

    #[test]
    fn test_health_status() {
        let text = plain(render_health("http://x", &serde_json::json!({"status": "healthy"})));
        assert!(text.contains("healthy"));
    }
}
