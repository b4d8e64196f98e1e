//! Output formatting for CLI display.

use serde_json::json;

use crate::{agent::Termination, apply::ApplyOutcome, pipeline::Decision};

/// Format a decision as pretty JSON for `run --dry-run`.
pub(super) fn format_decision(decision: &Decision) -> String {
    let value = json!({
        "number": decision.number,
        "action": decision.extraction.action,
        "decoded": decision.extraction.decoded,
        "turns": decision.turns,
        "answered": decision.termination == Termination::Answered,
        "report": decision.extraction.report,
    });

    serde_json::to_string_pretty(&value).unwrap_or_else(|_| value.to_string())
}

/// One-line summary of an applied decision.
pub(super) fn format_outcome(decision: &Decision, applied: &ApplyOutcome) -> String {
    let action = &decision.extraction.action;

    let labels = if action.labels.is_empty() {
        "no labels".to_string()
    } else {
        let names: Vec<&str> = action.labels.iter().map(String::as_str).collect();
        let verb = if applied.label_error.is_some() {
            "failed to label"
        } else {
            "labeled"
        };
        format!("{verb} {}", names.join(", "))
    };

    let state = match (action.state, &applied.state_error) {
        (None, _) => "state unchanged".to_string(),
        (Some(state), None) => format!("state {state}"),
        (Some(state), Some(_)) => format!("failed to set state {state}"),
    };

    format!(
        "#{}: {labels}; {state}; commented after {} turn(s)",
        decision.number, decision.turns
    )
}
