//! Action extraction: mine the final reply for its JSON decision header.
//!
//! The reply is expected to open with `{"labels": [...], "state": "..."}`
//! followed by a free-form report. Extraction is best-effort and total: any
//! problem degrades to the default action with the full text as the report.

use std::collections::BTreeSet;

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::model::{IssueState, StructuredAction};

/// A decision pulled out of the final reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    pub action: StructuredAction,

    /// The reply with the decision fragment removed, trimmed.
    /// The untouched reply when no decision was found.
    pub report: String,

    /// Whether a decision fragment was found and decoded.
    pub decoded: bool,
}

/// Decision fields as they appear in the reply.
#[derive(Deserialize)]
struct RawAction {
    #[serde(default)]
    labels: Vec<String>,
    #[serde(default)]
    state: Option<Value>,
}

/// Extract the structured action and report text from the final reply.
pub fn extract_action(text: &str) -> Extraction {
    let Some((start, end, object)) = find_json_object(text) else {
        tracing::warn!("final reply has no JSON decision; applying no label or state change");
        return fallback(text);
    };

    let raw = match RawAction::deserialize(Value::Object(object)) {
        Ok(raw) => raw,
        Err(e) => {
            tracing::warn!(error = %e, "decision JSON does not decode; applying no label or state change");
            return fallback(text);
        }
    };

    let state = match raw.state {
        None | Some(Value::Null) => None,
        Some(value) => {
            let parsed = value.as_str().and_then(IssueState::parse);
            if parsed.is_none() {
                tracing::warn!(state = %value, "ignoring invalid state in decision");
            }
            parsed
        }
    };

    let labels: BTreeSet<String> = raw
        .labels
        .into_iter()
        .map(|label| label.trim().to_string())
        .filter(|label| !label.is_empty())
        .collect();

    let report = format!("{}{}", &text[..start], &text[end..]).trim().to_string();

    Extraction {
        action: StructuredAction { labels, state },
        report,
        decoded: true,
    }
}

fn fallback(text: &str) -> Extraction {
    Extraction {
        action: StructuredAction::default(),
        report: text.to_string(),
        decoded: false,
    }
}

/// Find the first brace-delimited region that parses as a JSON object.
///
/// Returns its byte range and the parsed object. Each `{` is tried in order;
/// the region runs to its balanced `}`, ignoring braces inside strings.
fn find_json_object(text: &str) -> Option<(usize, usize, Map<String, Value>)> {
    text.match_indices('{').find_map(|(start, _)| {
        let end = balanced_end(&text[start..])? + start;
        serde_json::from_str::<Map<String, Value>>(&text[start..end])
            .ok()
            .map(|object| (start, end, object))
    })
}

/// Byte offset just past the `}` closing the object that opens `fragment`.
fn balanced_end(fragment: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in fragment.char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(i + 1);
                }
            }
            _ => {}
        }
    }

    None
}
