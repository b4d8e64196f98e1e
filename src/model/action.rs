//! The structured decision the bot applies to the tracker.

use std::{collections::BTreeSet, fmt};

use serde::{Deserialize, Serialize};

/// Lifecycle state of an issue or pull request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueState {
    Open,
    Closed,
}

impl IssueState {
    /// Parse the exact wire values `open` and `closed`. Anything else is `None`.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "open" => Some(Self::Open),
            "closed" => Some(Self::Closed),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Closed => "closed",
        }
    }
}

impl fmt::Display for IssueState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Labels to add and an optional lifecycle state to set.
///
/// The default adds nothing and leaves the state alone. A missing or broken
/// decision never closes or mislabels anything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuredAction {
    pub labels: BTreeSet<String>,

    /// `None` means no state change was requested.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<IssueState>,
}

impl StructuredAction {
    /// True when applying this action would change nothing but the comment.
    pub fn is_noop(&self) -> bool {
        self.labels.is_empty() && self.state.is_none()
    }
}
