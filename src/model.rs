//! Core data model for Lookout.
//!
//! These types carry one run from the triggering event to the applied decision:
//! event records, the conversation with the reasoning backend, and the
//! structured action extracted from its final answer.

mod action;
mod event;
mod message;

pub use action::{IssueState, StructuredAction};
pub use event::{EventRecord, Subject};
pub use message::{Conversation, Message, ToolCallRequest};
