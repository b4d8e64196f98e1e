//! The issue tracker: the external system of record the decision is applied to.

mod github;

pub use github::GhTracker;

use crate::model::IssueState;

/// Errors from tracker operations.
#[derive(Debug, thiserror::Error)]
pub enum TrackerError {
    #[error("failed to run gh: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("gh {command} failed: {stderr}")]
    Command { command: String, stderr: String },

    #[error("unexpected gh output: {0}")]
    Decode(#[from] serde_json::Error),
}

/// The narrow tracker surface the bot needs.
pub trait Tracker {
    /// The repository's label vocabulary.
    fn labels(&self) -> Result<Vec<String>, TrackerError>;

    /// Add labels to an issue or pull request. Existing labels are kept.
    fn add_labels(&self, number: u64, labels: &[String]) -> Result<(), TrackerError>;

    /// Set the lifecycle state. Setting the current state is a no-op.
    fn set_state(&self, number: u64, state: IssueState) -> Result<(), TrackerError>;

    /// Post a new comment.
    fn comment(&self, number: u64, body: &str) -> Result<(), TrackerError>;
}

#[cfg(test)]
pub(crate) mod testing {
    use std::cell::RefCell;

    use super::{Tracker, TrackerError};
    use crate::model::IssueState;

    /// A tracker call, as recorded by [`RecordingTracker`].
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum Call {
        AddLabels(u64, Vec<String>),
        SetState(u64, IssueState),
        Comment(u64, String),
    }

    /// In-memory tracker that records mutations and can be told to fail them.
    #[derive(Default)]
    pub struct RecordingTracker {
        pub vocabulary: Vec<String>,
        pub fail_labels: bool,
        pub fail_state: bool,
        pub fail_comment: bool,
        pub calls: RefCell<Vec<Call>>,
    }

    impl RecordingTracker {
        pub fn with_labels(labels: &[&str]) -> Self {
            Self {
                vocabulary: labels.iter().map(ToString::to_string).collect(),
                ..Self::default()
            }
        }

        pub fn calls(&self) -> Vec<Call> {
            self.calls.borrow().clone()
        }
    }

    fn rejected(command: &str) -> TrackerError {
        TrackerError::Command {
            command: command.to_string(),
            stderr: "HTTP 403: Resource not accessible by integration".to_string(),
        }
    }

    impl Tracker for RecordingTracker {
        fn labels(&self) -> Result<Vec<String>, TrackerError> {
            Ok(self.vocabulary.clone())
        }

        fn add_labels(&self, number: u64, labels: &[String]) -> Result<(), TrackerError> {
            if self.fail_labels {
                return Err(rejected("api"));
            }
            self.calls
                .borrow_mut()
                .push(Call::AddLabels(number, labels.to_vec()));
            Ok(())
        }

        fn set_state(&self, number: u64, state: IssueState) -> Result<(), TrackerError> {
            if self.fail_state {
                return Err(rejected("api"));
            }
            self.calls.borrow_mut().push(Call::SetState(number, state));
            Ok(())
        }

        fn comment(&self, number: u64, body: &str) -> Result<(), TrackerError> {
            if self.fail_comment {
                return Err(rejected("issue comment"));
            }
            self.calls
                .borrow_mut()
                .push(Call::Comment(number, body.to_string()));
            Ok(())
        }
    }
}
