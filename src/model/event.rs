//! Event records: the triggering platform event, reduced to what the bot reads.

use serde::{Deserialize, de::DeserializeOwned};
use serde_json::Value;

/// Errors raised when a payload does not match a supported event shape.
#[derive(Debug, thiserror::Error)]
pub enum EventError {
    #[error("unsupported event kind '{0}' (expected issues, pull_request, or issue_comment)")]
    UnsupportedKind(String),

    #[error("unsupported {kind} action '{action}'")]
    UnsupportedAction { kind: &'static str, action: String },

    #[error("malformed {kind} payload: {source}")]
    Malformed {
        kind: &'static str,
        source: serde_json::Error,
    },
}

/// Who or what a subject is: number, author, title, body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subject {
    pub number: u64,
    pub author: String,
    pub title: String,
    pub body: String,
}

/// The event that triggered this run. Constructed once, never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventRecord {
    /// An issue was opened or edited.
    Issue(Subject),

    /// A pull request was opened or edited.
    PullRequest(Subject),

    /// Someone commented on an issue (or a pull request's conversation).
    Comment {
        subject: Subject,
        actor: String,
        comment: String,
    },
}

impl EventRecord {
    /// Build an event record from a platform event name and its JSON payload.
    ///
    /// Fails fast on anything that is not one of the three supported shapes,
    /// before any external mutation can happen.
    pub fn from_payload(kind: &str, payload: &Value) -> Result<Self, EventError> {
        match kind {
            "issues" => {
                check_action("issues", payload, &["opened", "edited"])?;
                let p: IssuesPayload = decode("issues", payload)?;
                Ok(Self::Issue(p.issue.into_subject()))
            }
            "pull_request" => {
                check_action("pull_request", payload, &["opened", "edited"])?;
                let p: PullRequestPayload = decode("pull_request", payload)?;
                Ok(Self::PullRequest(p.pull_request.into_subject()))
            }
            "issue_comment" => {
                check_action("issue_comment", payload, &["created"])?;
                let p: CommentPayload = decode("issue_comment", payload)?;
                Ok(Self::Comment {
                    subject: p.issue.into_subject(),
                    actor: p.comment.user.login,
                    comment: p.comment.body.unwrap_or_default(),
                })
            }
            other => Err(EventError::UnsupportedKind(other.to_string())),
        }
    }

    /// The issue or pull request this event is about.
    pub fn subject(&self) -> &Subject {
        match self {
            Self::Issue(subject) | Self::PullRequest(subject) => subject,
            Self::Comment { subject, .. } => subject,
        }
    }
}

/// Reject actions outside `allowed`. A payload without an `action` field passes.
fn check_action(kind: &'static str, payload: &Value, allowed: &[&str]) -> Result<(), EventError> {
    match payload.get("action").and_then(Value::as_str) {
        Some(action) if !allowed.contains(&action) => Err(EventError::UnsupportedAction {
            kind,
            action: action.to_string(),
        }),
        _ => Ok(()),
    }
}

fn decode<T: DeserializeOwned>(kind: &'static str, payload: &Value) -> Result<T, EventError> {
    T::deserialize(payload).map_err(|source| EventError::Malformed { kind, source })
}

// ── Payload shapes ──
//
// Only the fields the bot reads. Unknown fields are ignored.

#[derive(Deserialize)]
struct IssuesPayload {
    issue: RawSubject,
}

#[derive(Deserialize)]
struct PullRequestPayload {
    pull_request: RawSubject,
}

#[derive(Deserialize)]
struct CommentPayload {
    issue: RawSubject,
    comment: RawComment,
}

#[derive(Deserialize)]
struct RawSubject {
    number: u64,
    user: RawUser,
    title: String,
    // GitHub sends `null` for an empty body.
    body: Option<String>,
}

impl RawSubject {
    fn into_subject(self) -> Subject {
        Subject {
            number: self.number,
            author: self.user.login,
            title: self.title,
            body: self.body.unwrap_or_default(),
        }
    }
}

#[derive(Deserialize)]
struct RawComment {
    user: RawUser,
    body: Option<String>,
}

#[derive(Deserialize)]
struct RawUser {
    login: String,
}
