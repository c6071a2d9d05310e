//! Mock LLM backends for integration tests
//!
//! Wraps a `wiremock` server that speaks either the `OpenAI` chat
//! completions or the Anthropic messages wire format with canned replies.

use std::time::Duration;

use serde_json::{Value, json};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// API key the mocks require
pub const API_KEY: &str = "sk-integration";

/// Mock LLM backend that returns predictable responses
pub struct MockLlm {
    server: MockServer,
}

impl MockLlm {
    /// Start an OpenAI-compatible mock replying with `content`
    pub async fn openai_text(content: &str) -> Self {
        Self::openai(200, openai_completion(json!({"role": "assistant", "content": content}))).await
    }

    /// Start an OpenAI-compatible mock replying with tool calls named `names`, in order
    pub async fn openai_tool_calls(names: &[&str]) -> Self {
        let calls: Vec<Value> = names
            .iter()
            .enumerate()
            .map(|(i, name)| {
                json!({
                    "id": format!("call_{i}"),
                    "type": "function",
                    "function": {"name": name, "arguments": format!("{{\"index\":{i}}}")}
                })
            })
            .collect();

        Self::openai(
            200,
            openai_completion(json!({"role": "assistant", "content": null, "tool_calls": calls})),
        )
        .await
    }

    /// Start an OpenAI-compatible mock answering every request with `status` and `body`
    pub async fn openai(status: u16, body: Value) -> Self {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("authorization", format!("Bearer {API_KEY}").as_str()))
            .respond_with(ResponseTemplate::new(status).set_body_json(body))
            .mount(&server)
            .await;

        Self { server }
    }

    /// Start an OpenAI-compatible mock that answers only after `delay`
    pub async fn openai_slow(delay: Duration) -> Self {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(openai_completion(json!({"role": "assistant", "content": "late"})))
                    .set_delay(delay),
            )
            .mount(&server)
            .await;

        Self { server }
    }

    /// Start an Anthropic mock replying with `content` blocks
    pub async fn anthropic(content: Value) -> Self {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .and(header("x-api-key", API_KEY))
            .and(header("anthropic-version", "2023-06-01"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "msg_integration",
                "type": "message",
                "role": "assistant",
                "model": "claude-sonnet-4-20250514",
                "content": content,
                "stop_reason": "end_turn",
                "usage": {"input_tokens": 12, "output_tokens": 6}
            })))
            .mount(&server)
            .await;

        Self { server }
    }

    /// Base URL adapters should be configured with
    pub fn base_url(&self) -> String {
        format!("{}/v1", self.server.uri())
    }

    /// Number of requests the mock has received
    pub async fn request_count(&self) -> usize {
        self.server.received_requests().await.map_or(0, |requests| requests.len())
    }

    /// JSON body of the most recent request
    pub async fn last_request_body(&self) -> Option<Value> {
        let requests = self.server.received_requests().await?;
        requests.last().and_then(|r| serde_json::from_slice(&r.body).ok())
    }
}

fn openai_completion(message: Value) -> Value {
    json!({
        "id": "chatcmpl-integration",
        "object": "chat.completion",
        "model": "mock-model-1",
        "choices": [{"index": 0, "message": message, "finish_reason": "stop"}],
        "usage": {"prompt_tokens": 9, "completion_tokens": 3, "total_tokens": 12}
    })
}
