//! Blocking Ollama chat client.
//!
//! One POST per trial against the `/api/chat` endpoint, streaming
//! disabled. Every failure mode — transport, timeout, non-2xx status,
//! missing content in the reply — surfaces as a `QueryError` for the
//! runner to record as a failed trial.

use std::time::Duration;

use serde_json::{json, Value};
use tracing::debug;

use ctxbench_core::{ModelQuery, QueryError, Turn};

use crate::config::ModelConfig;

/// Fixed wrapper appended as the final user turn of every request.
const QUESTION_PREFIX: &str = "Based on our conversation above, answer this question concisely: ";

pub struct OllamaClient {
    model: String,
    endpoint: String,
    temperature: f32,
    num_predict: u32,
    agent: ureq::Agent,
}

impl OllamaClient {
    pub fn new(config: &ModelConfig) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build();
        Self {
            model: config.name.clone(),
            endpoint: config.endpoint.clone(),
            temperature: config.temperature,
            num_predict: config.num_predict,
            agent,
        }
    }

    /// Full request body: context turns verbatim, then the synthesized
    /// question turn. Pure function of the inputs, kept separate so the
    /// wire format is testable without a server.
    fn request_body(&self, context: &[Turn], question: &str) -> Value {
        let mut messages: Vec<Value> = context
            .iter()
            .map(|t| json!({"role": t.role, "content": t.content}))
            .collect();
        messages.push(json!({
            "role": "user",
            "content": format!("{QUESTION_PREFIX}{question}"),
        }));

        json!({
            "model": self.model,
            "messages": messages,
            "stream": false,
            "options": {
                "temperature": self.temperature,
                "num_predict": self.num_predict,
            },
        })
    }
}

impl ModelQuery for OllamaClient {
    fn query(&self, context: &[Turn], question: &str) -> Result<String, QueryError> {
        let body = self.request_body(context, question);
        debug!(
            context_turns = context.len(),
            model = %self.model,
            "querying model"
        );

        let response = self
            .agent
            .post(&self.endpoint)
            .send_json(body)
            .map_err(|e| match e {
                ureq::Error::Status(status, resp) => QueryError::Status {
                    status,
                    body: resp.into_string().unwrap_or_default(),
                },
                ureq::Error::Transport(t) => QueryError::Transport(t.to_string()),
            })?;

        let json: Value = response
            .into_json()
            .map_err(|e| QueryError::BadResponse(e.to_string()))?;

        json.pointer("/message/content")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| QueryError::BadResponse("response missing message.content".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ctxbench_core::Role;

    fn client() -> OllamaClient {
        OllamaClient::new(&ModelConfig::default())
    }

    #[test]
    fn test_request_body_appends_question_turn() {
        let context = vec![
            Turn::new(Role::User, "hi"),
            Turn::new(Role::Assistant, "hello"),
        ];
        let body = client().request_body(&context, "What did I say?");

        let messages = body["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[0]["role"], "user");
        assert_eq!(messages[0]["content"], "hi");
        assert_eq!(messages[1]["role"], "assistant");

        let last = &messages[2];
        assert_eq!(last["role"], "user");
        assert_eq!(
            last["content"],
            "Based on our conversation above, answer this question concisely: What did I say?"
        );
    }

    #[test]
    fn test_request_body_fixed_fields() {
        let body = client().request_body(&[], "q");
        assert_eq!(body["model"], "llama3.1:latest");
        assert_eq!(body["stream"], false);
        assert_eq!(body["options"]["num_predict"], 150);
        let temp = body["options"]["temperature"].as_f64().unwrap();
        assert!((temp - 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_empty_context_still_has_question_turn() {
        let body = client().request_body(&[], "lonely question");
        let messages = body["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 1);
        assert!(messages[0]["content"]
            .as_str()
            .unwrap()
            .ends_with("lonely question"));
    }
}
