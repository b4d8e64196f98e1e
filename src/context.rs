//! Seed text for the conversation, derived from the triggering event.
//!
//! Pure: no network, no filesystem.

use crate::model::{EventRecord, Subject};

/// Derive the subject number and seed text from an event.
pub fn build_context(event: &EventRecord) -> (u64, String) {
    let subject = event.subject();
    let seed = match event {
        EventRecord::Issue(s) => base_info("Issue Author", s),
        EventRecord::PullRequest(s) => {
            format!("{}\n(This is a Pull Request)", base_info("PR Author", s))
        }
        EventRecord::Comment {
            subject,
            actor,
            comment,
        } => format!(
            "{}\nTriggered by: @{actor}\nCommand: {comment}",
            base_info("Issue Author", subject)
        ),
    };

    (subject.number, seed)
}

fn base_info(role: &str, subject: &Subject) -> String {
    format!(
        "{role}: @{}\nTitle: {}\nBody: {}",
        subject.author, subject.title, subject.body
    )
}
