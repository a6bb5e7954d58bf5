// src/generation/gemini.rs

//! Gemini `generateContent` client.
//!
//! Each task kind gets one model configuration (sampling settings, system
//! instruction and response schema). Configurations are built lazily and
//! live for the whole process.

use std::{
    sync::{
        OnceLock,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{GenerationError, Generator, TaskKind, prompt::SYSTEM_INSTRUCTION, schema::schema_for};
use crate::config::Config;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    top_k: u32,
    top_p: f32,
    max_output_tokens: u32,
    response_mime_type: &'static str,
    response_schema: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: Option<String>,
}

impl Content {
    fn text(role: Option<&str>, text: &str) -> Self {
        Self {
            role: role.map(str::to_string),
            parts: vec![Part {
                text: Some(text.to_string()),
            }],
        }
    }
}

/// The fixed per-kind part of every request.
#[derive(Debug, Clone)]
struct ModelConfig {
    system_instruction: Content,
    generation_config: GenerationConfig,
}

impl ModelConfig {
    fn for_kind(kind: TaskKind) -> Self {
        Self {
            system_instruction: Content::text(None, SYSTEM_INSTRUCTION),
            generation_config: GenerationConfig {
                temperature: 0.0,
                top_k: 40,
                top_p: 0.95,
                max_output_tokens: 8192,
                response_mime_type: "application/json",
                response_schema: schema_for(kind).to_wire(),
            },
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: Vec<Content>,
    system_instruction: &'a Content,
    generation_config: &'a GenerationConfig,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

/// One slot per task kind. A slot is filled at most once, even when several
/// requests race on the first call.
#[derive(Debug, Default)]
struct ModelRegistry {
    slots: [OnceLock<ModelConfig>; 6],
    built: AtomicUsize,
}

impl ModelRegistry {
    fn get(&self, kind: TaskKind) -> &ModelConfig {
        self.slots[kind.index()].get_or_init(|| {
            self.built.fetch_add(1, Ordering::Relaxed);
            tracing::debug!("Building model configuration for {}", kind);
            ModelConfig::for_kind(kind)
        })
    }
}

pub struct GeminiGenerator {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
    registry: ModelRegistry,
}

impl GeminiGenerator {
    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, GenerationError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GenerationError::Request(e.to_string()))?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            model: model.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            registry: ModelRegistry::default(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, GenerationError> {
        Self::new(
            config.gemini_api_key.clone(),
            config.gemini_model.clone(),
            config.gemini_base_url.clone(),
            config.generation_timeout(),
        )
    }

    /// How many per-kind configurations have been built so far.
    pub fn models_built(&self) -> usize {
        self.registry.built.load(Ordering::Relaxed)
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }

    fn extract_text(response: GenerateResponse) -> Result<String, GenerationError> {
        if let Some(error) = response.error {
            return Err(GenerationError::Api(error.message));
        }

        let text: String = response
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|p| p.text)
                    .collect()
            })
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(GenerationError::EmptyResponse);
        }
        Ok(text)
    }

    fn map_send_error(err: reqwest::Error) -> GenerationError {
        if err.is_timeout() {
            GenerationError::Timeout(err.to_string())
        } else {
            GenerationError::Request(err.to_string())
        }
    }
}

#[async_trait]
impl Generator for GeminiGenerator {
    async fn generate(&self, kind: TaskKind, prompt: &str) -> Result<String, GenerationError> {
        let model = self.registry.get(kind);
        let body = GenerateRequest {
            contents: vec![Content::text(Some("user"), prompt)],
            system_instruction: &model.system_instruction,
            generation_config: &model.generation_config,
        };

        tracing::debug!("Sending {} prompt to {}", kind, self.model);

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(Self::map_send_error)?;

        let status = response.status();
        let text = response.text().await.map_err(Self::map_send_error)?;

        if !status.is_success() {
            let message = serde_json::from_str::<GenerateResponse>(&text)
                .ok()
                .and_then(|r| r.error)
                .map_or(text, |e| e.message);
            tracing::error!("Gemini returned {} for {}: {}", status, kind, message);
            return Err(GenerationError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: GenerateResponse = serde_json::from_str(&text).map_err(|e| {
            tracing::error!("Failed to decode Gemini envelope: {:?}", e);
            GenerationError::Api(format!("unreadable response envelope: {}", e))
        })?;

        let content = Self::extract_text(parsed)?;
        tracing::info!("Received {} answer ({} bytes)", kind, content.len());
        Ok(content)
    }
}
