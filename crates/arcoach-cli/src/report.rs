//! Read-only commands: `audit`, `metrics`, and `llm-check`.

use anyhow::Context;
use arcoach_core::{AppConfig, AuditReport, Decision};
use chrono::Utc;

use crate::services::{llm_client, sheet_runner};

const LLM_CHECK_PROMPT: &str = "Reply with one short sentence confirming you can write \
    coaching messages for recruiters.";

fn print_audit(report: &AuditReport) {
    println!(
        "audit at {} (weekend: {})",
        report.generated_at.to_rfc3339(),
        if report.weekend { "yes" } else { "no" }
    );
    if !report.missing_columns.is_empty() {
        println!("missing pipeline columns: {}", report.missing_columns.join(", "));
    }
    println!(
        "rows: {} total, {} counted, {} no timestamp, {} invalid recruiter, \
         {} before start, {} ineligible stage, {} senior",
        report.stats.total_rows,
        report.stats.counted,
        report.stats.missing_timestamp,
        report.stats.invalid_recruiter,
        report.stats.before_historical_start,
        report.stats.ineligible_stage,
        report.stats.senior_position,
    );

    for entry in &report.plan.entries {
        match &entry.decision {
            Decision::Send { email } => println!("  SEND  {} <{email}>", entry.recruiter),
            Decision::Skip { reason } => println!("  skip  {} ({reason})", entry.recruiter),
        }
    }

    println!("would send: {}", report.summary.would_send);
    for (reason, count) in &report.summary.skipped {
        println!("skipped ({reason}): {count}");
    }
    let recipients: Vec<&str> = report.would_receive().collect();
    if !recipients.is_empty() {
        println!("would receive: {}", recipients.join(", "));
    }
}

/// # Errors
///
/// Returns an error if the pipeline or nudge log cannot be read.
pub(crate) async fn run_audit(config: &AppConfig, json: bool) -> anyhow::Result<()> {
    let runner = sheet_runner(config)?;
    let report = runner.audit(Utc::now()).await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_audit(&report);
    }
    Ok(())
}

/// # Errors
///
/// Returns an error if the pipeline cannot be read or `recruiter` has no metrics.
pub(crate) async fn run_metrics(config: &AppConfig, recruiter: Option<&str>) -> anyhow::Result<()> {
    let runner = sheet_runner(config)?;
    let snapshot = runner.snapshot(Utc::now()).await?;

    let output = match recruiter {
        Some(name) => {
            let metrics = snapshot
                .report
                .get(name)
                .with_context(|| format!("no metrics for recruiter '{name}'"))?;
            serde_json::to_string_pretty(metrics)?
        }
        None => serde_json::to_string_pretty(&snapshot.report)?,
    };
    println!("{output}");
    Ok(())
}

/// # Errors
///
/// Returns an error if the key is missing or the model call fails.
pub(crate) async fn run_llm_check(config: &AppConfig) -> anyhow::Result<()> {
    let client = llm_client(config)?;
    let reply = client
        .complete(LLM_CHECK_PROMPT)
        .await
        .with_context(|| format!("calling model {}", client.model()))?;
    println!("{reply}");
    Ok(())
}
