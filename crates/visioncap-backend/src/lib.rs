//! Backend adapter: one uniform `send` over the closed set of
//! supported backends.
//!
//! Each kind translates an [`AnalysisRequest`] into its own HTTP
//! request shape and extracts plain text from the response. The
//! adapter is stateless per call (the pooled HTTP client aside) and
//! never retries; retry policy belongs to the caller.

pub mod ollama;
pub mod openai;
pub mod prompts;
pub mod textgen;

use log::{debug, error, trace};
use std::path::Path;
use std::time::Duration;
use visioncap_types::{AnalysisRequest, BackendConfig, BackendError, BackendKind, Payload};

/// Default attribution title sent to OpenRouter.
pub const DEFAULT_SITE_NAME: &str = "visioncap";

/// HTTP client for one configured backend.
pub struct BackendClient {
    config: BackendConfig,
    http: reqwest::Client,
}

impl BackendClient {
    /// Build a client with the per-request timeout baked in.
    pub fn new(config: BackendConfig) -> Result<Self, BackendError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| BackendError::Network(e.to_string()))?;
        Ok(Self { config, http })
    }

    pub fn config(&self) -> &BackendConfig {
        &self.config
    }

    /// Send one request and return the generated text.
    pub async fn send(&self, request: &AnalysisRequest) -> Result<String, BackendError> {
        if matches!(request.payload, Payload::Image { .. }) && !self.config.kind.supports_images() {
            return Err(BackendError::InvalidRequest(format!(
                "{} does not accept image payloads",
                self.config.kind
            )));
        }

        // TextGen serves whatever model is loaded server-side; every
        // other backend needs an explicit model id.
        if self.config.model.is_empty() && self.config.kind != BackendKind::TextGen {
            return Err(BackendError::InvalidRequest(
                "no model configured".to_string(),
            ));
        }

        debug!(
            "send: backend={} model={}",
            self.config.kind, self.config.model
        );

        match self.config.kind {
            BackendKind::Ollama => self.send_ollama(request).await,
            BackendKind::OpenAi | BackendKind::OpenRouter => self.send_chat(request).await,
            BackendKind::TextGen => self.send_textgen(request).await,
        }
    }

    /// List model identifiers the backend reports as available. Also
    /// serves as the connectivity check.
    pub async fn list_models(&self) -> Result<Vec<String>, BackendError> {
        match self.config.kind {
            BackendKind::Ollama => {
                let url = format!("{}/api/tags", self.config.base_url);
                let response = self.get(&url, false).await?;
                let tags: ollama::TagsResponse = decode(response).await?;
                Ok(tags.models.into_iter().map(|m| m.name).collect())
            }
            BackendKind::OpenAi | BackendKind::OpenRouter => {
                let url = format!("{}{}/models", self.config.base_url, self.api_prefix());
                let response = self.get(&url, true).await?;
                let models: openai::ModelsResponse = decode(response).await?;
                Ok(models.data.into_iter().map(|m| m.id).collect())
            }
            BackendKind::TextGen => {
                let url = format!("{}/v1/models", self.config.base_url);
                let response = self.get(&url, false).await?;
                let models: openai::ModelsResponse = decode(response).await?;
                Ok(models.data.into_iter().map(|m| m.id).collect())
            }
        }
    }

    async fn send_ollama(&self, request: &AnalysisRequest) -> Result<String, BackendError> {
        let body = ollama::build_request(&self.config.model, request);
        trace!("ollama request: model={} prompt_len={}", body.model, body.prompt.len());

        let url = format!("{}/api/generate", self.config.base_url);
        let response = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        let generated: ollama::GenerateResponse = decode(self.check_status(response).await?).await?;
        Ok(generated.response)
    }

    async fn send_chat(&self, request: &AnalysisRequest) -> Result<String, BackendError> {
        let api_key = self.require_api_key()?;
        let body = openai::build_request(&self.config.model, self.config.kind, request);

        let url = format!(
            "{}{}/chat/completions",
            self.config.base_url,
            self.api_prefix()
        );
        let mut builder = self
            .http
            .post(&url)
            .header("Authorization", format!("Bearer {}", api_key))
            .json(&body);

        if self.config.kind == BackendKind::OpenRouter {
            let title = self.config.site_name.as_deref().unwrap_or(DEFAULT_SITE_NAME);
            builder = builder.header("X-Title", title);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        let chat: openai::ChatResponse = decode(self.check_status(response).await?).await?;
        chat.choices
            .first()
            .map(|c| c.message.content.clone())
            .ok_or_else(|| {
                error!("chat response contained no choices");
                BackendError::Parse("response contained no choices".to_string())
            })
    }

    async fn send_textgen(&self, request: &AnalysisRequest) -> Result<String, BackendError> {
        let body = textgen::build_request(request);

        let url = format!("{}/v1/completions", self.config.base_url);
        let response = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        let completion: textgen::CompletionResponse =
            decode(self.check_status(response).await?).await?;
        completion
            .choices
            .first()
            .map(|c| c.text.clone())
            .ok_or_else(|| BackendError::Parse("response contained no choices".to_string()))
    }

    async fn get(&self, url: &str, with_auth: bool) -> Result<reqwest::Response, BackendError> {
        let mut builder = self.http.get(url);
        if with_auth {
            builder = builder.header("Authorization", format!("Bearer {}", self.require_api_key()?));
        }
        let response = builder
            .send()
            .await
            .map_err(|e| self.map_transport_error(e))?;
        self.check_status(response).await
    }

    /// OpenRouter nests its OpenAI-compatible API under `/api`.
    fn api_prefix(&self) -> &'static str {
        match self.config.kind {
            BackendKind::OpenRouter => "/api/v1",
            _ => "/v1",
        }
    }

    fn require_api_key(&self) -> Result<&str, BackendError> {
        match self.config.api_key.as_deref() {
            Some(key) if !key.is_empty() => Ok(key),
            _ => Err(BackendError::Auth(format!(
                "{} requires an API key and none is configured",
                self.config.kind
            ))),
        }
    }

    fn map_transport_error(&self, err: reqwest::Error) -> BackendError {
        if err.is_timeout() {
            error!("request timed out after {}s", self.config.timeout_secs);
            BackendError::Timeout(self.config.timeout_secs)
        } else {
            error!("transport error: {}", err);
            BackendError::Network(err.to_string())
        }
    }

    /// Map non-2xx statuses onto the error taxonomy, pulling the
    /// backend's own error message out of the body when there is one.
    async fn check_status(
        &self,
        response: reqwest::Response,
    ) -> Result<reqwest::Response, BackendError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = extract_error_message(&body).unwrap_or_else(|| {
            if body.trim().is_empty() {
                status.to_string()
            } else {
                body.trim().to_string()
            }
        });

        error!("backend returned {}: {}", status, message);

        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(BackendError::Auth(message));
        }
        Err(BackendError::Api {
            status: status.as_u16(),
            message,
        })
    }
}

async fn decode<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, BackendError> {
    response
        .json::<T>()
        .await
        .map_err(|e| BackendError::Parse(e.to_string()))
}

/// Pull a human-readable message out of a backend error payload.
/// Handles both `{"error": "..."}` and `{"error": {"message": "..."}}`.
fn extract_error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    match value.get("error")? {
        serde_json::Value::String(s) => Some(s.clone()),
        obj => obj
            .get("message")
            .and_then(|m| m.as_str())
            .map(String::from),
    }
}

/// MIME type for an image path, by extension.
pub fn mime_for_path(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase())
        .as_deref()
    {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("bmp") => "image/bmp",
        Some("tiff") => "image/tiff",
        Some("webp") => "image/webp",
        _ => "application/octet-stream",
    }
}
