//! `run` and `preview` command handlers.

use arcoach_core::{AppConfig, RunOutcome, RunSummary};
use chrono::Utc;

use crate::services::{llm_client, mail_client, sheet_runner};

fn print_summary(summary: &RunSummary) {
    let prefix = if summary.dry_run { "dry-run: " } else { "" };
    println!(
        "{prefix}{} recruiters evaluated, {} eligible, {} sent, {} generation failures",
        summary.recruiters, summary.planned, summary.sent, summary.generation_failures
    );
    for (reason, count) in &summary.skipped {
        println!("  skipped ({reason}): {count}");
    }
}

/// Run the daily batch against the configured sheets, model, and mail API.
///
/// # Errors
///
/// Returns an error if a collaborator cannot be built or the batch aborts.
pub(crate) async fn run_nudges(
    config: &AppConfig,
    force: bool,
    dry_run: bool,
) -> anyhow::Result<()> {
    let runner = sheet_runner(config)?;
    let now = Utc::now();

    let outcome = if dry_run {
        runner.dry_run(now, force).await?
    } else {
        let generator = llm_client(config)?;
        let sender = mail_client(config)?;
        runner.run(&generator, &sender, now, force).await?
    };

    match outcome {
        RunOutcome::SkippedWeekend => {
            println!("weekend in the configured offset; nothing to do (use --force to override)");
        }
        RunOutcome::Completed(summary) => print_summary(&summary),
    }
    Ok(())
}

/// Send a gate-free test nudge for `recruiter` to the policy's reviewer.
///
/// # Errors
///
/// Returns an error if no reviewer is configured, the recruiter has no
/// metrics, generation fails, or the mail cannot be sent.
pub(crate) async fn run_preview(config: &AppConfig, recruiter: &str) -> anyhow::Result<()> {
    let runner = sheet_runner(config)?;
    let generator = llm_client(config)?;
    let sender = mail_client(config)?;

    let email = runner
        .preview(&generator, &sender, recruiter, Utc::now())
        .await?;
    println!("preview for {recruiter} sent to {}", email.to);
    Ok(())
}
