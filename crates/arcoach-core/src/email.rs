//! HTML nudge email rendering.

use chrono::FixedOffset;
use serde::Serialize;
use tera::{Context, Tera};
use thiserror::Error;

use crate::metrics::{RecruiterMetrics, WindowCounts};
use crate::policy::CoachPolicy;
use crate::prompt::{format_change, format_short_date};

pub const NUDGE_SUBJECT: &str = "AI Interview Adoption Update";

const TEMPLATE_NAME: &str = "nudge_email.html";
const NUDGE_TEMPLATE: &str = include_str!("../templates/nudge_email.html");

/// Recent adoption within this many points of the goal reads as "close".
const CLOSE_TO_GOAL_POINTS: f64 = 20.0;

const COLOR_GOOD: &str = "#28a745";
const COLOR_CLOSE: &str = "#ffc107";
const COLOR_BAD: &str = "#dc3545";

#[derive(Debug, Error)]
pub enum EmailError {
    #[error("nudge email template error: {0}")]
    Template(#[from] tera::Error),
}

/// A rendered message ready for a [`NotificationSender`](crate::ports::NotificationSender).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutgoingEmail {
    pub to: String,
    pub cc: Option<String>,
    pub subject: String,
    pub html_body: String,
}

#[derive(Serialize)]
struct WindowView {
    percent: String,
    ai_done: u32,
    eligible: u32,
}

impl From<WindowCounts> for WindowView {
    fn from(window: WindowCounts) -> Self {
        Self {
            percent: window.percent.to_string(),
            ai_done: window.ai_done,
            eligible: window.eligible,
        }
    }
}

#[derive(Serialize)]
struct StatusView {
    label: &'static str,
    color: &'static str,
    bar_width: String,
}

impl StatusView {
    fn for_recent(percent: f64, goal: f64) -> Self {
        let (label, color) = if percent >= goal {
            ("✅ Goal Met!", COLOR_GOOD)
        } else if percent >= goal - CLOSE_TO_GOAL_POINTS {
            ("🟡 Getting Close", COLOR_CLOSE)
        } else {
            ("🔴 Needs Work", COLOR_BAD)
        };
        Self {
            label,
            color,
            bar_width: percent.clamp(0.0, 100.0).to_string(),
        }
    }
}

#[derive(Serialize)]
struct CandidateView<'a> {
    name: &'a str,
    title: &'a str,
    stage: &'a str,
    source: &'a str,
    date: String,
}

/// Renders the HTML body of nudge emails. Interpolated text is HTML-escaped.
pub struct EmailRenderer {
    tera: Tera,
}

impl EmailRenderer {
    /// # Errors
    ///
    /// Returns [`EmailError::Template`] if the bundled template fails to parse.
    pub fn new() -> Result<Self, EmailError> {
        let mut tera = Tera::default();
        tera.add_raw_template(TEMPLATE_NAME, NUDGE_TEMPLATE)?;
        tera.autoescape_on(vec![".html"]);
        Ok(Self { tera })
    }

    /// Render the nudge body: stat cards, the generated message with line
    /// breaks kept, the missed-candidate table, and the goal footer.
    ///
    /// # Errors
    ///
    /// Returns [`EmailError::Template`] if rendering fails.
    pub fn render(
        &self,
        recruiter: &str,
        metrics: &RecruiterMetrics,
        message: &str,
        policy: &CoachPolicy,
        offset: FixedOffset,
    ) -> Result<String, EmailError> {
        let change = metrics.change();
        let candidates: Vec<CandidateView<'_>> = metrics
            .skipped_candidates
            .iter()
            .take(policy.max_listed_candidates)
            .map(|c| CandidateView {
                name: &c.name,
                title: &c.title,
                stage: &c.stage,
                source: &c.source,
                date: format_short_date(c.applied_at, offset),
            })
            .collect();

        let mut context = Context::new();
        context.insert("subject", NUDGE_SUBJECT);
        context.insert("recruiter", recruiter);
        context.insert("historical", &WindowView::from(metrics.historical));
        context.insert("recent", &WindowView::from(metrics.recent));
        context.insert("recent_days", &policy.recent_window_days);
        context.insert(
            "status",
            &StatusView::for_recent(metrics.recent.percent, policy.goal_percent),
        );
        context.insert("change", &format_change(change));
        context.insert("change_positive", &(change >= 0.0));
        context.insert("goal", &policy.goal_percent.to_string());
        context.insert("message", message);
        context.insert("candidates", &candidates);

        Ok(self.tera.render(TEMPLATE_NAME, &context)?)
    }
}
