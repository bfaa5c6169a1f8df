//! Text and JSON renderings of a bootstrap run.

use serde::Serialize;
use siteboot_core::{
    BootstrapContext, BootstrapError, MaxOutcome, Phase, SequencerState, server::ServerContext,
};
use std::fmt::Write as _;

const LABEL_WIDTH: usize = 24;

///
/// StatusReport
///

#[derive(Debug, Serialize)]
pub struct StatusReport<'a> {
    pub target: Phase,
    pub state: &'a SequencerState,
    pub context: &'a BootstrapContext,
    pub server: &'a ServerContext,
}

///
/// MaxReport
///

#[derive(Debug, Serialize)]
pub struct MaxReport<'a> {
    #[serde(flatten)]
    pub outcome: &'a MaxOutcome,
    pub context: &'a BootstrapContext,
}

///
/// PathsReport
///

#[derive(Debug, Serialize)]
pub struct PathsReport {
    pub modules: [String; 2],
    pub themes: [String; 2],
}

fn line(out: &mut String, label: &str, value: impl std::fmt::Display) {
    let _ = writeln!(out, "{label:<LABEL_WIDTH$}: {value}");
}

fn context_lines(out: &mut String, context: &BootstrapContext) {
    for (key, value) in context.iter() {
        line(out, key.as_str(), value);
    }
}

fn error_lines(out: &mut String, error: &BootstrapError) {
    line(out, "error", error.code());
    line(out, "message", error.message());
}

#[must_use]
pub fn status_text(report: &StatusReport<'_>) -> String {
    let mut out = String::new();

    match report.state {
        SequencerState::Pending => line(&mut out, "state", "pending"),
        SequencerState::Complete { phase } => line(&mut out, "completed", phase),
        SequencerState::Failed { phase, error } => {
            line(&mut out, "failed", phase);
            error_lines(&mut out, error);
        }
    }
    context_lines(&mut out, report.context);

    out
}

#[must_use]
pub fn max_text(report: &MaxReport<'_>) -> String {
    let mut out = String::new();

    match report.outcome.reached {
        Some(phase) => line(&mut out, "reached", phase),
        None => line(&mut out, "reached", "none"),
    }
    if let Some(error) = &report.outcome.error {
        error_lines(&mut out, error);
    }
    context_lines(&mut out, report.context);

    out
}

#[must_use]
pub fn paths_text(report: &PathsReport) -> String {
    let mut out = String::new();

    for path in &report.modules {
        line(&mut out, "modules", path);
    }
    for path in &report.themes {
        line(&mut out, "themes", path);
    }

    out
}

pub fn json<T: Serialize>(report: &T) -> Result<String, serde_json::Error> {
    let mut text = serde_json::to_string_pretty(report)?;
    text.push('\n');

    Ok(text)
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use siteboot_core::ContextKey;

    fn context() -> BootstrapContext {
        let mut ctx = BootstrapContext::new();
        ctx.set(ContextKey::Root, "/srv/www").unwrap();
        ctx.set(ContextKey::Site, "example.com").unwrap();
        ctx
    }

    #[test]
    fn status_text_lists_phase_then_context() {
        let ctx = context();
        let state = SequencerState::Complete { phase: Phase::Site };
        let text = status_text(&StatusReport {
            target: Phase::Site,
            state: &state,
            context: &ctx,
            server: &ServerContext::default(),
        });

        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], format!("{:<24}: site", "completed"));
        assert!(lines.contains(&format!("{:<24}: /srv/www", "root").as_str()));
    }

    #[test]
    fn failed_status_shows_code() {
        let ctx = BootstrapContext::new();
        let state = SequencerState::Failed {
            phase: Phase::Root,
            error: BootstrapError::root_not_found(),
        };
        let text = status_text(&StatusReport {
            target: Phase::Full,
            state: &state,
            context: &ctx,
            server: &ServerContext::default(),
        });

        assert!(text.contains("ROOT_NOT_FOUND"));
    }

    #[test]
    fn status_json_tags_state() {
        let ctx = context();
        let state = SequencerState::Complete { phase: Phase::Site };
        let text = json(&StatusReport {
            target: Phase::Site,
            state: &state,
            context: &ctx,
            server: &ServerContext::default(),
        })
        .unwrap();

        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["state"]["state"], "complete");
        assert_eq!(value["state"]["phase"], "site");
        assert_eq!(value["context"]["site"], "example.com");
    }

    #[test]
    fn max_json_flattens_outcome() {
        let ctx = BootstrapContext::new();
        let outcome = MaxOutcome {
            reached: Some(Phase::Site),
            error: Some(BootstrapError::database_unavailable("refused")),
        };
        let text = json(&MaxReport {
            outcome: &outcome,
            context: &ctx,
        })
        .unwrap();

        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["reached"], "site");
        assert_eq!(value["error"]["code"], "DATABASE_UNAVAILABLE");
    }
}
