use crate::config::LlmConfig;
use crate::error::LlmError;
use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use reqwest::Client;
use serde_json::{json, Value as JsonValue};
use std::time::Duration;

/// Pipeline stages that reach the chat API. Each carries its own sampling
/// budget; the roadmap stage gets the loosest one, schema-bound stages stay
/// tight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Analysis,
    LearningPath,
    ExpertRoadmap,
    TaskBatch,
}

impl Stage {
    pub fn label(&self) -> &'static str {
        match self {
            Stage::Analysis => "analysis",
            Stage::LearningPath => "learning_path",
            Stage::ExpertRoadmap => "expert_roadmap",
            Stage::TaskBatch => "task_batch",
        }
    }

    pub fn temperature(&self) -> f32 {
        match self {
            Stage::Analysis => 0.2,
            Stage::LearningPath => 0.3,
            Stage::ExpertRoadmap => 0.6,
            Stage::TaskBatch => 0.7,
        }
    }

    pub fn max_tokens(&self) -> u32 {
        match self {
            Stage::Analysis => 2000,
            Stage::LearningPath => 2500,
            Stage::ExpertRoadmap => 3000,
            Stage::TaskBatch => 2000,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub stage: Stage,
    pub system: Option<String>,
    pub prompt: String,
}

impl CompletionRequest {
    pub fn staged(stage: Stage, prompt: String) -> Self {
        Self {
            stage,
            system: None,
            prompt,
        }
    }

    pub fn with_system(stage: Stage, system: &str, prompt: String) -> Self {
        Self {
            stage,
            system: Some(system.to_string()),
            prompt,
        }
    }
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// One attempt against the chat-completions endpoint; no retries.
    async fn complete(&self, request: CompletionRequest) -> Result<JsonValue, LlmError>;
}

#[derive(Clone)]
pub struct LlmService {
    client: Client,
    config: LlmConfig,
    api_key: String,
}

impl LlmService {
    pub fn new(config: LlmConfig, client: Client) -> Result<Self, LlmError> {
        let api_key = config
            .api_key
            .clone()
            .filter(|key| !key.is_empty())
            .ok_or_else(|| LlmError::Config("GROQ_API_KEY is not set".to_string()))?;
        Ok(Self {
            client,
            config,
            api_key,
        })
    }

    fn model_for(&self, stage: Stage) -> &str {
        match stage {
            Stage::TaskBatch => &self.config.task_model,
            _ => &self.config.path_model,
        }
    }
}

#[async_trait]
impl LlmClient for LlmService {
    async fn complete(&self, request: CompletionRequest) -> Result<JsonValue, LlmError> {
        let mut messages = Vec::new();
        if let Some(system) = &request.system {
            messages.push(json!({"role": "system", "content": system}));
        }
        messages.push(json!({"role": "user", "content": request.prompt}));

        let payload = json!({
            "model": self.model_for(request.stage),
            "messages": messages,
            "temperature": request.stage.temperature(),
            "max_tokens": request.stage.max_tokens(),
            "response_format": { "type": "json_object" },
        });

        let res = self
            .client
            .post(format!("{}/chat/completions", self.config.api_base))
            .bearer_auth(&self.api_key)
            .json(&payload)
            .timeout(Duration::from_secs(self.config.request_timeout_secs))
            .send()
            .await
            .map_err(|e| LlmError::Transport(e.to_string()))?;

        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_default();
            return Err(LlmError::Transport(format!(
                "chat API returned {}: {}",
                status, text
            )));
        }

        let body: JsonValue = res.json().await.map_err(|e| {
            if e.is_decode() {
                LlmError::Parse(format!("undecodable response body: {}", e))
            } else {
                LlmError::Transport(e.to_string())
            }
        })?;

        extract_content(&body)
    }
}

/// Pulls `choices[0].message.content` out of a chat response and re-parses
/// that text as the stage document.
fn extract_content(body: &JsonValue) -> Result<JsonValue, LlmError> {
    let content = body
        .get("choices")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("message"))
        .and_then(|m| m.get("content"))
        .and_then(|c| c.as_str())
        .ok_or_else(|| LlmError::Parse("completion carries no message content".to_string()))?;

    serde_json::from_str(content)
        .map_err(|e| LlmError::Parse(format!("completion content is not valid JSON: {}", e)))
}
