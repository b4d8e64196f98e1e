//! The decision loop: a bounded, tool-augmented exchange with the backend.
//!
//! Each turn submits the whole conversation. A reply without tool calls ends
//! the loop; otherwise every requested call is executed in arrival order and
//! its result appended before the next turn. When the turn budget runs out,
//! the last assistant reply is final even if it still asks for tools.

use crate::{
    backend::{Backend, BackendError, ChatRequest},
    model::{Conversation, Message},
    tools::{self, Toolbox},
};

/// Default number of backend turns per run.
pub const DEFAULT_MAX_TURNS: usize = 3;

/// Temperature sent with every request.
const TEMPERATURE: f32 = 0.0;

/// How the loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// The backend answered without requesting tools.
    Answered,

    /// The turn budget ran out while the backend still wanted tools.
    BudgetExhausted,
}

/// The result of one run of the decision loop.
#[derive(Debug, Clone)]
pub struct LoopOutcome {
    /// Text of the last assistant message.
    pub final_text: String,

    /// Backend calls made.
    pub turns: usize,

    pub termination: Termination,

    /// The full exchange, for logging and inspection.
    pub conversation: Conversation,
}

/// Drives the exchange for a single run.
pub struct DecisionLoop<'a, B: Backend> {
    backend: &'a B,
    toolbox: &'a Toolbox,
    model: &'a str,
    max_turns: usize,
}

impl<'a, B: Backend> DecisionLoop<'a, B> {
    pub fn new(backend: &'a B, toolbox: &'a Toolbox, model: &'a str, max_turns: usize) -> Self {
        Self {
            backend,
            toolbox,
            model,
            max_turns,
        }
    }

    /// Run the loop from a seeded conversation.
    ///
    /// Only backend failures are errors. Tool problems become tool results.
    pub fn run(&self, mut conversation: Conversation) -> Result<LoopOutcome, BackendError> {
        let tools = tools::schemas();
        let mut turns = 0;
        let mut termination = Termination::BudgetExhausted;

        while turns < self.max_turns {
            turns += 1;

            let request = ChatRequest {
                model: self.model,
                messages: conversation.messages(),
                tools: &tools,
                temperature: TEMPERATURE,
            };
            let reply = self.backend.complete(&request)?;
            let calls = reply.tool_calls().to_vec();
            conversation.push(reply);

            if calls.is_empty() {
                tracing::info!(turn = turns, "backend answered");
                termination = Termination::Answered;
                break;
            }

            tracing::info!(turn = turns, calls = calls.len(), "dispatching tool calls");
            for call in &calls {
                let content = self.toolbox.dispatch(call);
                tracing::debug!(
                    tool = %call.name,
                    id = %call.id,
                    chars = content.len(),
                    "tool call finished"
                );
                conversation.push(Message::Tool {
                    tool_call_id: call.id.clone(),
                    content,
                });
            }
        }

        if termination == Termination::BudgetExhausted {
            tracing::warn!(
                turns,
                "turn budget exhausted; using the last reply as the final answer"
            );
        }

        let final_text = conversation
            .last_assistant_text()
            .unwrap_or_default()
            .to_string();

        Ok(LoopOutcome {
            final_text,
            turns,
            termination,
            conversation,
        })
    }
}
