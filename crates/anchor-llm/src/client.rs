use std::time::Duration;

use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::error::LlmError;
use crate::memo::{MemoKey, ResponseMemo};
use crate::parse::parse_tool_call;

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1/responses";
const DEFAULT_RETRIES: u32 = 3;

fn is_reasoning_model(model: &str) -> bool {
    model.starts_with("o1") || model.starts_with("o3") || model.contains("reasoning")
}

/// The single entrypoint Anchor uses to talk to the reasoning service
/// (spec.md §4.4). Deterministic by construction: temperature is pinned to
/// `0` for non-reasoning models, omitted for reasoning-family models, and
/// every call is memoized when `LLM_MEMO_DIR` is set.
#[derive(Clone)]
pub struct LlmClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    retries: u32,
    memo: ResponseMemo,
}

pub struct LlmClientBuilder {
    base_url: String,
    api_key: Option<String>,
    retries: u32,
    memo: ResponseMemo,
}

impl Default for LlmClientBuilder {
    fn default() -> Self {
        Self {
            base_url: std::env::var("ANCHOR_LLM_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
            api_key: std::env::var("OPENAI_API_KEY").ok(),
            retries: std::env::var("ANCHOR_OPENAI_RETRIES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_RETRIES),
            memo: ResponseMemo::from_env(),
        }
    }
}

impl LlmClientBuilder {
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    pub fn memo(mut self, memo: ResponseMemo) -> Self {
        self.memo = memo;
        self
    }

    pub fn build(self) -> Result<LlmClient, LlmError> {
        Ok(LlmClient {
            http: reqwest::Client::new(),
            base_url: self.base_url,
            api_key: self.api_key.ok_or(LlmError::MissingApiKey)?,
            retries: self.retries,
            memo: self.memo,
        })
    }
}

impl LlmClient {
    pub fn builder() -> LlmClientBuilder {
        LlmClientBuilder::default()
    }

    /// Calls the reasoning service and returns `(tool_name, arguments)`
    /// (spec.md §4.4). `tool_choice`, when `Some`, forces selection of that
    /// named tool.
    pub async fn generate(
        &self,
        model: &str,
        messages: &Value,
        tools: &[Value],
        tool_choice: Option<&str>,
        effort: Option<&str>,
        service_tier: Option<&str>,
    ) -> Result<(String, Value), LlmError> {
        let tools_value = Value::Array(tools.to_vec());
        let tool_choice_value = match tool_choice {
            Some(name) => json!({ "type": "function", "name": name }),
            None => Value::String("auto".to_string()),
        };
        let memo_key = MemoKey::new(model, messages, &tools_value, &tool_choice_value);

        if let Some(cached) = self.memo.get(&memo_key) {
            debug!(key = memo_key.as_str(), "llm memo hit");
            return parse_tool_call(&cached).ok_or(LlmError::NoToolCall);
        }

        let mut body = json!({
            "model": model,
            "input": messages,
            "tools": tools_value,
            "tool_choice": tool_choice_value,
        });
        if let Some(effort) = effort {
            body["reasoning"] = json!({ "effort": effort });
        }
        if let Some(service_tier) = service_tier {
            body["service_tier"] = json!(service_tier);
        }
        if !is_reasoning_model(model) {
            body["temperature"] = json!(0);
        }

        let response = self.submit_with_retry(&body).await?;
        self.memo.put(&memo_key, &response)?;
        parse_tool_call(&response).ok_or(LlmError::NoToolCall)
    }

    async fn submit_with_retry(&self, body: &Value) -> Result<Value, LlmError> {
        let mut attempt = 0;
        loop {
            match self.submit_once(body).await {
                Ok(response) => return Ok(response),
                Err(err) if attempt < self.retries => {
                    let seconds = 0.5 * 2f64.powi(attempt as i32);
                    warn!(attempt, error = %err, "llm request failed, retrying");
                    tokio::time::sleep(Duration::from_secs_f64(seconds)).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }

    async fn submit_once(&self, body: &Value) -> Result<Value, LlmError> {
        let response = self
            .http
            .post(&self.base_url)
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(LlmError::Status {
                status: status.as_u16(),
                body: text,
            });
        }
        serde_json::from_str(&text).map_err(LlmError::InvalidJson)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reasoning_models_are_recognized_by_prefix() {
        assert!(is_reasoning_model("o1-preview"));
        assert!(is_reasoning_model("o3-mini"));
        assert!(!is_reasoning_model("gpt-4o"));
    }

    #[test]
    fn builder_requires_api_key() {
        let with_key = LlmClientBuilder::default().api_key("sk-test").build();
        assert!(with_key.is_ok());

        let without_key = LlmClientBuilder {
            base_url: "x".into(),
            api_key: None,
            retries: 0,
            memo: ResponseMemo::disabled(),
        }
        .build();
        assert!(matches!(without_key, Err(LlmError::MissingApiKey)));
    }
}
