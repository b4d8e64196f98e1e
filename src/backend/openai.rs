//! OpenAI-compatible chat-completions backend.
//!
//! Works against any endpoint speaking the `/chat/completions` protocol with
//! function tools. Blocking: one request per turn, no retries.

use std::time::Duration;

use reqwest::{
    blocking::Client,
    header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue},
};
use serde::Deserialize;
use serde_json::{Value, json};

use super::{Backend, BackendError, ChatRequest};
use crate::{
    model::{Message, ToolCallRequest},
    tools::ToolSchema,
};

/// Connection settings for an OpenAI-compatible endpoint.
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    /// Base URL, e.g. `https://api.openai.com/v1`.
    pub api_base: String,
    pub api_key: String,
    pub request_timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct OpenAiBackend {
    client: Client,
    url: String,
}

impl OpenAiBackend {
    pub fn new(config: &OpenAiConfig) -> Result<Self, BackendError> {
        let api_key = config.api_key.trim();
        if api_key.is_empty() {
            return Err(BackendError::MissingApiKey);
        }

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let bearer = HeaderValue::from_str(&format!("Bearer {api_key}"))
            .map_err(|e| BackendError::InvalidResponse(format!("invalid API key header: {e}")))?;
        headers.insert(AUTHORIZATION, bearer);

        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            client,
            url: chat_completions_url(&config.api_base),
        })
    }
}

impl Backend for OpenAiBackend {
    fn complete(&self, request: &ChatRequest<'_>) -> Result<Message, BackendError> {
        let body = request_body(request);
        tracing::debug!(
            url = %self.url,
            messages = request.messages.len(),
            "sending chat completion request"
        );

        let response = self.client.post(&self.url).json(&body).send()?;
        let status = response.status();
        let text = response.text()?;

        if !status.is_success() {
            return Err(BackendError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        parse_response(&text)
    }
}

fn chat_completions_url(api_base: &str) -> String {
    let base = api_base.trim_end_matches('/');
    if base.ends_with("/chat/completions") {
        base.to_string()
    } else {
        format!("{base}/chat/completions")
    }
}

fn request_body(request: &ChatRequest<'_>) -> Value {
    let mut body = json!({
        "model": request.model,
        "messages": request.messages.iter().map(to_wire_message).collect::<Vec<_>>(),
        "temperature": request.temperature,
    });

    if !request.tools.is_empty() {
        body["tools"] = request.tools.iter().map(to_wire_tool).collect();
    }

    body
}

fn to_wire_message(message: &Message) -> Value {
    match message {
        Message::System(content) => json!({ "role": "system", "content": content }),
        Message::User(content) => json!({ "role": "user", "content": content }),
        Message::Assistant {
            content,
            tool_calls,
        } => {
            if tool_calls.is_empty() {
                return json!({ "role": "assistant", "content": content });
            }

            let calls: Vec<Value> = tool_calls
                .iter()
                .map(|call| {
                    json!({
                        "id": call.id,
                        "type": "function",
                        "function": {
                            "name": call.name,
                            "arguments": call.arguments.to_string(),
                        }
                    })
                })
                .collect();
            // The protocol expects null content alongside tool calls with no text.
            let content = if content.trim().is_empty() {
                Value::Null
            } else {
                Value::String(content.clone())
            };

            json!({ "role": "assistant", "content": content, "tool_calls": calls })
        }
        Message::Tool {
            tool_call_id,
            content,
        } => json!({ "role": "tool", "tool_call_id": tool_call_id, "content": content }),
    }
}

fn to_wire_tool(tool: &ToolSchema) -> Value {
    json!({
        "type": "function",
        "function": {
            "name": tool.name,
            "description": tool.description,
            "parameters": tool.parameters,
        }
    })
}

// ── Response shapes ──

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
    // Some servers send `null` rather than omitting the field.
    #[serde(default)]
    tool_calls: Option<Vec<WireToolCall>>,
}

#[derive(Deserialize)]
struct WireToolCall {
    id: String,
    function: WireFunction,
}

#[derive(Deserialize)]
struct WireFunction {
    name: String,
    arguments: String,
}

fn parse_response(raw: &str) -> Result<Message, BackendError> {
    let parsed: ChatResponse = serde_json::from_str(raw)?;
    let choice = parsed
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| BackendError::InvalidResponse("response contained no choices".to_string()))?;

    let content = choice.message.content.unwrap_or_default();
    let calls = choice.message.tool_calls.unwrap_or_default();
    if calls.is_empty() {
        return Ok(Message::assistant(content));
    }

    let tool_calls = calls
        .into_iter()
        .map(|call| ToolCallRequest {
            id: call.id,
            name: call.function.name,
            // Keep undecodable arguments as a string; binding reports the problem.
            arguments: serde_json::from_str(&call.function.arguments)
                .unwrap_or(Value::String(call.function.arguments)),
        })
        .collect();

    Ok(Message::Assistant {
        content,
        tool_calls,
    })
}
