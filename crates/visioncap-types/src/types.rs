//! Shared data model for backend dispatch and batch runs

use chrono::{DateTime, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// The closed set of supported backend kinds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    #[default]
    #[value(name = "ollama")]
    Ollama,
    #[value(name = "openai")]
    OpenAi,
    #[value(name = "openrouter")]
    OpenRouter,
    #[value(name = "textgen")]
    TextGen,
}

impl BackendKind {
    /// Whether this backend rejects requests without an API key.
    pub fn requires_api_key(&self) -> bool {
        matches!(self, BackendKind::OpenAi | BackendKind::OpenRouter)
    }

    /// Whether this backend accepts image payloads at all.
    pub fn supports_images(&self) -> bool {
        !matches!(self, BackendKind::TextGen)
    }

    pub fn default_base_url(&self) -> &'static str {
        match self {
            BackendKind::Ollama => "http://localhost:11434",
            BackendKind::OpenAi => "https://api.openai.com",
            BackendKind::OpenRouter => "https://openrouter.ai",
            BackendKind::TextGen => "http://localhost:5000",
        }
    }
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendKind::Ollama => write!(f, "ollama"),
            BackendKind::OpenAi => write!(f, "openai"),
            BackendKind::OpenRouter => write!(f, "openrouter"),
            BackendKind::TextGen => write!(f, "textgen"),
        }
    }
}

/// Connection parameters for one backend. Immutable for the duration
/// of a batch run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    pub kind: BackendKind,

    /// Base URL without a trailing slash.
    pub base_url: String,

    /// API key, required for OpenAI and OpenRouter.
    pub api_key: Option<String>,

    /// Model identifier as the backend knows it.
    pub model: String,

    /// Attribution title sent to OpenRouter (`X-Title` header).
    pub site_name: Option<String>,

    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl BackendConfig {
    pub fn new(kind: BackendKind, model: impl Into<String>) -> Self {
        Self {
            kind,
            base_url: kind.default_base_url().to_string(),
            api_key: None,
            model: model.into(),
            site_name: None,
            timeout_secs: default_timeout_secs(),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        let url = url.into();
        self.base_url = url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

pub fn default_timeout_secs() -> u64 {
    120
}

/// Sampling knobs forwarded verbatim to the backend. Knobs a backend
/// does not understand are simply not sent to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationParams {
    pub temperature: f32,
    pub max_tokens: u32,
    pub top_p: f32,
    pub top_k: u32,
    pub repeat_penalty: f32,
    pub seed: Option<i64>,
    pub frequency_penalty: f32,
    pub presence_penalty: f32,
    pub min_p: f32,
    pub top_a: f32,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            temperature: 0.8,
            max_tokens: 500,
            top_p: 0.7,
            top_k: 40,
            repeat_penalty: 1.1,
            seed: None,
            frequency_penalty: 0.0,
            presence_penalty: 0.0,
            min_p: 0.0,
            top_a: 0.0,
        }
    }
}

/// What gets sent to the model.
#[derive(Debug, Clone)]
pub enum Payload {
    /// Raw image bytes plus their MIME type.
    Image { data: Vec<u8>, mime: String },
    /// Plain text, for the enhancement feature.
    Text(String),
}

/// One unit of work for the backend adapter. Created fresh per item.
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    pub payload: Payload,
    pub prompt: String,
    pub system_prompt: Option<String>,
    pub params: GenerationParams,
}

impl AnalysisRequest {
    pub fn for_image(data: Vec<u8>, mime: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            payload: Payload::Image {
                data,
                mime: mime.into(),
            },
            prompt: prompt.into(),
            system_prompt: None,
            params: GenerationParams::default(),
        }
    }

    pub fn for_text(prompt: impl Into<String>) -> Self {
        let prompt = prompt.into();
        Self {
            payload: Payload::Text(prompt.clone()),
            prompt,
            system_prompt: None,
            params: GenerationParams::default(),
        }
    }

    pub fn with_system_prompt(mut self, system: impl Into<String>) -> Self {
        self.system_prompt = Some(system.into());
        self
    }

    pub fn with_params(mut self, params: GenerationParams) -> Self {
        self.params = params;
        self
    }
}

/// Outcome for a single input, immutable once produced. Exactly one of
/// `caption` and `error` is set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub source: PathBuf,
    pub caption: Option<String>,
    pub error: Option<String>,
}

impl AnalysisResult {
    pub fn success(source: PathBuf, caption: impl Into<String>) -> Self {
        Self {
            source,
            caption: Some(caption.into()),
            error: None,
        }
    }

    pub fn failure(source: PathBuf, error: impl Into<String>) -> Self {
        Self {
            source,
            caption: None,
            error: Some(error.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.caption.is_some()
    }
}

/// Aggregate outcome of one folder-wide invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchRun {
    /// Input files in processing order (lexicographic by filename).
    pub files: Vec<PathBuf>,

    /// One entry per processed file. A cancelled run holds fewer
    /// entries than `files`.
    pub results: Vec<AnalysisResult>,

    pub successful: usize,
    pub failed: usize,
    pub cancelled: bool,

    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl BatchRun {
    pub fn total(&self) -> usize {
        self.files.len()
    }

    /// Files never claimed before cancellation took effect.
    pub fn unprocessed(&self) -> usize {
        self.files.len() - self.results.len()
    }
}

/// Cooperative cancellation flag shared between the caller and the
/// batch workers. Checked between items, never mid-request.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Caption style for batch mode, selecting the instruction prompt sent
/// with every image.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CaptionStyle {
    #[default]
    DanbooruTags,
    SimpleDescription,
    DetailedAnalysis,
}

impl std::fmt::Display for CaptionStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CaptionStyle::DanbooruTags => write!(f, "Danbooru Tags"),
            CaptionStyle::SimpleDescription => write!(f, "Simple Description"),
            CaptionStyle::DetailedAnalysis => write!(f, "Detailed Analysis"),
        }
    }
}

/// Which system prompt drives the text-enhancement feature.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnhancementStyle {
    #[default]
    Plain,
    Qwen,
    Wan,
}

/// Output format for results
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}
