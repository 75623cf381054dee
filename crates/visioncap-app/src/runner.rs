//! Single-item runner
//!
//! Wraps the backend adapter so that one failed item can never abort a
//! batch: every adapter error is converted into a failure result.

use std::path::Path;
use std::sync::Arc;
use visioncap_backend::BackendClient;
use visioncap_types::{AnalysisRequest, AnalysisResult};

pub struct ItemRunner {
    client: Arc<BackendClient>,
    retries: u32,
}

impl ItemRunner {
    pub fn new(client: Arc<BackendClient>) -> Self {
        Self { client, retries: 0 }
    }

    /// Retry transient failures (network, timeout) this many times.
    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    /// Run one request. Never fails; adapter errors become failure
    /// results carrying the error detail as text.
    pub async fn run(&self, source: &Path, request: &AnalysisRequest) -> AnalysisResult {
        let mut attempt = 0;
        loop {
            match self.client.send(request).await {
                Ok(text) => return AnalysisResult::success(source.to_path_buf(), text),
                Err(err) if err.is_transient() && attempt < self.retries => {
                    attempt += 1;
                }
                Err(err) => return AnalysisResult::failure(source.to_path_buf(), err.to_string()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use visioncap_types::{BackendConfig, BackendKind};

    #[tokio::test]
    async fn adapter_failure_becomes_failure_result() {
        // Nothing listens on this port, so the adapter fails fast.
        let config = BackendConfig::new(BackendKind::Ollama, "llava")
            .with_base_url("http://127.0.0.1:9")
            .with_timeout_secs(2);
        let client = Arc::new(BackendClient::new(config).unwrap());
        let runner = ItemRunner::new(client);

        let request = AnalysisRequest::for_text("hello");
        let result = runner.run(Path::new("a.png"), &request).await;

        assert!(!result.is_success());
        assert!(result.error.is_some());
        assert_eq!(result.source, Path::new("a.png"));
    }

    #[tokio::test]
    async fn missing_key_failure_is_not_retried() {
        let config = BackendConfig::new(BackendKind::OpenAi, "gpt-4o");
        let client = Arc::new(BackendClient::new(config).unwrap());
        let runner = ItemRunner::new(client).with_retries(3);

        let request = AnalysisRequest::for_text("hello");
        let result = runner.run(Path::new("b.png"), &request).await;

        assert!(!result.is_success());
        assert!(result.error.unwrap().contains("API key"));
    }
}
