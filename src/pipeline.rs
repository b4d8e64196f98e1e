//! One run, end to end: event → context → decision loop → extraction → tracker.

use crate::{
    agent::{DecisionLoop, Termination},
    apply::{ApplyOutcome, apply},
    backend::{Backend, BackendError},
    context::build_context,
    extract::{Extraction, extract_action},
    model::{Conversation, EventRecord},
    tools::Toolbox,
    tracker::{Tracker, TrackerError},
};

/// Errors that abort a run.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("failed to fetch labels: {0}")]
    Labels(#[source] TrackerError),

    #[error("reasoning backend failed: {0}")]
    Backend(#[from] BackendError),

    #[error("failed to post the report comment: {0}")]
    Comment(#[source] TrackerError),
}

/// Backend model and turn budget for a run.
#[derive(Debug, Clone)]
pub struct LoopSettings {
    pub model: String,
    pub max_turns: usize,
}

/// The decision reached for one event, before it is applied.
#[derive(Debug, Clone)]
pub struct Decision {
    pub number: u64,
    pub extraction: Extraction,
    pub turns: usize,
    pub termination: Termination,
}

/// Build the system instructions around the tracker's label vocabulary.
pub fn system_prompt(labels: &[String]) -> String {
    let labels = serde_json::to_string(labels).unwrap_or_else(|_| "[]".to_string());

    format!(
        "You are a repository assistant (@github-actions[bot]). You can read code, \
search files, and manage the state of issues and pull requests.\n\
\n\
Available labels: {labels}\n\
Only use labels from this list.\n\
\n\
Your goals:\n\
1. Understand what the user wants.\n\
2. If needed, use the tools to look at the project structure or specific files.\n\
3. Decide what to do and do it directly (add labels, close, and so on).\n\
\n\
Response format:\n\
Your reply must start with a JSON instruction: {{\"labels\": [], \"state\": \"open\"|\"closed\"}}\n\
followed by your report."
    )
}

/// Reach a decision for `event` without touching the tracker's state.
///
/// Reads the label vocabulary once, then runs the decision loop and extracts
/// the structured action from the final reply.
pub fn decide<B: Backend, T: Tracker>(
    event: &EventRecord,
    backend: &B,
    tracker: &T,
    toolbox: &Toolbox,
    settings: &LoopSettings,
) -> Result<Decision, PipelineError> {
    let (number, seed) = build_context(event);
    let labels = tracker.labels().map_err(PipelineError::Labels)?;
    tracing::info!(number, labels = labels.len(), "starting decision loop");

    let conversation = Conversation::seeded(system_prompt(&labels), seed);
    let outcome = DecisionLoop::new(backend, toolbox, &settings.model, settings.max_turns)
        .run(conversation)?;

    let extraction = extract_action(&outcome.final_text);
    tracing::info!(
        number,
        turns = outcome.turns,
        messages = outcome.conversation.messages().len(),
        decoded = extraction.decoded,
        labels = ?extraction.action.labels,
        state = ?extraction.action.state,
        "decision reached"
    );

    Ok(Decision {
        number,
        extraction,
        turns: outcome.turns,
        termination: outcome.termination,
    })
}

/// Decide and apply: the full run.
pub fn triage<B: Backend, T: Tracker>(
    event: &EventRecord,
    backend: &B,
    tracker: &T,
    toolbox: &Toolbox,
    settings: &LoopSettings,
) -> Result<(Decision, ApplyOutcome), PipelineError> {
    let decision = decide(event, backend, tracker, toolbox, settings)?;
    let applied = apply(
        tracker,
        decision.number,
        &decision.extraction.action,
        &decision.extraction.report,
    )
    .map_err(PipelineError::Comment)?;

    Ok((decision, applied))
}
