use std::fmt::Write as _;

use chrono::{DateTime, FixedOffset, Utc};

use crate::metrics::{RecruiterMetrics, SkippedCandidate};
use crate::policy::CoachPolicy;

/// `M/D/YYYY` in the local offset, the way the sheet's users read dates.
#[must_use]
pub fn format_short_date(at: DateTime<Utc>, offset: FixedOffset) -> String {
    at.with_timezone(&offset).format("%-m/%-d/%Y").to_string()
}

/// Signed percentage-point change with one decimal, e.g. `+12.5` or `-50.0`.
#[must_use]
pub fn format_change(change: f64) -> String {
    if change >= 0.0 {
        format!("+{change:.1}")
    } else {
        format!("{change:.1}")
    }
}

/// Markdown cells cannot contain pipes or line breaks.
fn table_cell(value: &str) -> String {
    value.replace('|', "/").replace(['\n', '\r'], " ")
}

fn missed_candidates_table(
    candidates: &[SkippedCandidate],
    limit: usize,
    offset: FixedOffset,
) -> String {
    let mut table = String::from(
        "| Name | Title | Last_stage | Source_name | Application_ts |\n\
         |------|-------|------------|-------------|----------------|\n",
    );
    if candidates.is_empty() {
        table.push_str("| No candidates missed |\n");
        return table;
    }
    for candidate in candidates.iter().take(limit) {
        let _ = writeln!(
            table,
            "| {} | {} | {} | {} | {} |",
            table_cell(&candidate.name),
            table_cell(&candidate.title),
            table_cell(&candidate.stage),
            table_cell(&candidate.source),
            format_short_date(candidate.applied_at, offset),
        );
    }
    table
}

/// Build the language-model prompt for one recruiter's nudge.
///
/// Lists at most `policy.max_listed_candidates` missed candidates and asks for
/// a short message ending with `policy.sign_off`.
#[must_use]
pub fn build_nudge_prompt(
    recruiter: &str,
    metrics: &RecruiterMetrics,
    policy: &CoachPolicy,
    offset: FixedOffset,
) -> String {
    let days = policy.recent_window_days;
    let goal = policy.goal_percent;
    let historical = metrics.historical;
    let recent = metrics.recent;
    let table = missed_candidates_table(
        &metrics.skipped_candidates,
        policy.max_listed_candidates,
        offset,
    );

    format!(
        "You are an AI Productivity Coach for recruiters.\n\
         \n\
         Here is performance data for: {recruiter}\n\
         \n\
         **Historical AI usage:** {h_pct}% ({h_done} of {h_eligible})\n\
         **Recent AI usage (last {days} days):** {r_pct}% ({r_done} of {r_eligible})\n\
         **Change:** {change}%\n\
         **Goal threshold:** {goal}%\n\
         \n\
         **Missed candidates from last {days} days (AI interview not sent):**\n\
         {table}\n\
         Write a professional, direct nudge (2-3 sentences) that:\n\
         1. If recent usage is BELOW {goal}%: Be direct about the gap and emphasize the missed opportunities\n\
         2. If recent usage is ABOVE {goal}% but historical is low: Acknowledge improvement but maintain focus on consistency\n\
         3. If both recent and historical are high: Celebrate the achievement\n\
         4. Always be constructive and provide clear next steps\n\
         5. Focus on the business impact and missed candidates\n\
         6. End with \"{sign_off}\" (no other signatures or names)\n\
         \n\
         Tone: Professional, direct, results-focused. Don't be overly appreciative of poor performance.\n",
        h_pct = historical.percent,
        h_done = historical.ai_done,
        h_eligible = historical.eligible,
        r_pct = recent.percent,
        r_done = recent.ai_done,
        r_eligible = recent.eligible,
        change = format_change(metrics.change()),
        sign_off = policy.sign_off,
    )
}
