//! Applying a decision to the tracker.
//!
//! Labels and state are attempted first and their failures captured; the
//! report comment is always posted afterwards. The comment is the one side
//! effect every run guarantees.

use crate::{
    model::StructuredAction,
    tracker::{Tracker, TrackerError},
};

/// Banner heading every report comment.
pub const COMMENT_BANNER: &str = "### 🤖 AI Agent Execution\n\n";

/// What happened when a decision was applied.
#[derive(Debug, Default)]
pub struct ApplyOutcome {
    /// Set when adding labels failed.
    pub label_error: Option<TrackerError>,

    /// Set when changing the state failed.
    pub state_error: Option<TrackerError>,
}

impl ApplyOutcome {
    pub fn is_clean(&self) -> bool {
        self.label_error.is_none() && self.state_error.is_none()
    }
}

/// Apply `action` to subject `number` and post `report` as a comment.
///
/// Mutation failures are logged, noted under the report, and returned in
/// the outcome. Only a failure to post the comment itself is an error.
pub fn apply(
    tracker: &impl Tracker,
    number: u64,
    action: &StructuredAction,
    report: &str,
) -> Result<ApplyOutcome, TrackerError> {
    let mut outcome = ApplyOutcome::default();

    if action.is_noop() {
        tracing::info!(number, "no labels or state change requested");
    }

    if !action.labels.is_empty() {
        let labels: Vec<String> = action.labels.iter().cloned().collect();
        match tracker.add_labels(number, &labels) {
            Ok(()) => tracing::info!(number, labels = ?labels, "added labels"),
            Err(e) => {
                tracing::warn!(number, error = %e, "failed to add labels");
                outcome.label_error = Some(e);
            }
        }
    }

    if let Some(state) = action.state {
        match tracker.set_state(number, state) {
            Ok(()) => tracing::info!(number, %state, "set state"),
            Err(e) => {
                tracing::warn!(number, %state, error = %e, "failed to set state");
                outcome.state_error = Some(e);
            }
        }
    }

    let body = comment_body(report, &outcome);
    tracker.comment(number, &body)?;
    tracing::info!(number, "posted report comment");

    Ok(outcome)
}

/// The comment body: banner, report, and a note for each failed mutation.
pub fn comment_body(report: &str, outcome: &ApplyOutcome) -> String {
    let mut body = format!("{COMMENT_BANNER}{report}");

    let notes: Vec<String> = [
        outcome
            .label_error
            .as_ref()
            .map(|e| format!("> ⚠️ Adding labels failed: {e}")),
        outcome
            .state_error
            .as_ref()
            .map(|e| format!("> ⚠️ Changing state failed: {e}")),
    ]
    .into_iter()
    .flatten()
    .collect();

    if !notes.is_empty() {
        body.push_str("\n\n");
        body.push_str(&notes.join("\n>\n"));
    }

    body
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::BTreeSet;

    use crate::{
        model::IssueState,
        tracker::testing::{Call, RecordingTracker},
    };

    fn action(labels: &[&str], state: Option<IssueState>) -> StructuredAction {
        StructuredAction {
            labels: labels.iter().map(ToString::to_string).collect::<BTreeSet<_>>(),
            state,
        }
    }

    #[test]
    fn applies_labels_state_then_comment() {
        let tracker = RecordingTracker::default();

        let outcome = apply(
            &tracker,
            5,
            &action(&["bug", "ui"], Some(IssueState::Closed)),
            "Fixed in #4.",
        )
        .unwrap();

        assert!(outcome.is_clean());
        assert_eq!(
            tracker.calls(),
            [
                Call::AddLabels(5, vec!["bug".to_string(), "ui".to_string()]),
                Call::SetState(5, IssueState::Closed),
                Call::Comment(5, format!("{COMMENT_BANNER}Fixed in #4.")),
            ]
        );
    }

    #[test]
    fn default_action_only_comments() {
        let tracker = RecordingTracker::default();

        apply(&tracker, 5, &StructuredAction::default(), "").unwrap();

        // Empty report still gets the banner.
        assert_eq!(tracker.calls(), [Call::Comment(5, COMMENT_BANNER.to_string())]);
    }

    #[test]
    fn absent_state_is_not_applied() {
        let tracker = RecordingTracker::default();

        apply(&tracker, 5, &action(&["question"], None), "report").unwrap();

        assert!(
            !tracker
                .calls()
                .iter()
                .any(|c| matches!(c, Call::SetState(..)))
        );
    }

    #[test]
    fn mutation_failures_do_not_block_the_comment() {
        let tracker = RecordingTracker {
            fail_labels: true,
            fail_state: true,
            ..RecordingTracker::default()
        };

        let outcome = apply(
            &tracker,
            9,
            &action(&["bug"], Some(IssueState::Closed)),
            "report",
        )
        .unwrap();

        assert!(outcome.label_error.is_some());
        assert!(outcome.state_error.is_some());

        let calls = tracker.calls();
        assert_eq!(calls.len(), 1);
        let Call::Comment(9, body) = &calls[0] else {
            panic!("expected a comment");
        };
        assert!(body.starts_with(&format!("{COMMENT_BANNER}report\n\n")));
        assert!(body.contains("Adding labels failed"));
        assert!(body.contains("Changing state failed"));
    }

    #[test]
    fn comment_failure_is_an_error() {
        let tracker = RecordingTracker {
            fail_comment: true,
            ..RecordingTracker::default()
        };

        let result = apply(&tracker, 1, &action(&["bug"], None), "report");

        assert!(result.is_err());
        // Labels were still attempted first.
        assert_eq!(
            tracker.calls(),
            [Call::AddLabels(1, vec!["bug".to_string()])]
        );
    }
}
