//! Settings persistence
//!
//! Settings stored at: ~/.config/visioncap/config.json

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use visioncap_types::{
    default_timeout_secs, BackendConfig, BackendKind, ConfigError, GenerationParams, Result,
};

/// Persisted application settings, loaded once at startup and passed
/// into the orchestrator explicitly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Backend to send requests to
    #[serde(default)]
    pub backend: BackendKind,

    /// Ollama server URL
    #[serde(default = "default_ollama_url")]
    pub ollama_url: String,

    /// TextGen WebUI server URL
    #[serde(default = "default_textgen_url")]
    pub textgen_url: String,

    #[serde(default)]
    pub openai_api_key: String,

    #[serde(default)]
    pub openrouter_api_key: String,

    /// Attribution title sent to OpenRouter
    #[serde(default = "default_site_name")]
    pub site_name: String,

    /// Default model identifier
    #[serde(default)]
    pub default_model: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Retries for transient failures (network, timeout). Off by default.
    #[serde(default)]
    pub retries: u32,

    /// Parallel requests for batch mode. 0 = CPU count.
    #[serde(default = "default_jobs")]
    pub jobs: usize,

    /// Sampling knobs forwarded to the backend
    #[serde(default)]
    pub params: GenerationParams,
}

fn default_ollama_url() -> String {
    BackendKind::Ollama.default_base_url().to_string()
}

fn default_textgen_url() -> String {
    BackendKind::TextGen.default_base_url().to_string()
}

fn default_site_name() -> String {
    visioncap_backend::DEFAULT_SITE_NAME.to_string()
}

fn default_jobs() -> usize {
    4
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            backend: BackendKind::default(),
            ollama_url: default_ollama_url(),
            textgen_url: default_textgen_url(),
            openai_api_key: String::new(),
            openrouter_api_key: String::new(),
            site_name: default_site_name(),
            default_model: String::new(),
            timeout_secs: default_timeout_secs(),
            retries: 0,
            jobs: default_jobs(),
            params: GenerationParams::default(),
        }
    }
}

impl Settings {
    /// Get the config directory path
    pub fn config_dir() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or(ConfigError::NotFound)?
            .join("visioncap");
        Ok(config_dir)
    }

    /// Get the config file path
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.json"))
    }

    /// Load settings from the default location, or create defaults
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let settings: Settings = serde_json::from_str(&content)
                .map_err(|e| ConfigError::ParseError(e.to_string()))?;
            Ok(settings)
        } else {
            Ok(Settings::default())
        }
    }

    /// Save settings to the default location
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::SaveError(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Connection parameters for the selected backend.
    pub fn backend_config(&self) -> BackendConfig {
        let kind = self.backend;

        let base_url = match kind {
            BackendKind::Ollama => self.ollama_url.clone(),
            BackendKind::TextGen => self.textgen_url.clone(),
            BackendKind::OpenAi | BackendKind::OpenRouter => {
                kind.default_base_url().to_string()
            }
        };

        let api_key = match kind {
            BackendKind::OpenAi => non_empty(&self.openai_api_key),
            BackendKind::OpenRouter => non_empty(&self.openrouter_api_key),
            _ => None,
        };

        BackendConfig {
            kind,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            model: self.default_model.clone(),
            site_name: non_empty(&self.site_name),
            timeout_secs: self.timeout_secs,
        }
    }
}

fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

impl std::fmt::Display for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "visioncap configuration")?;
        writeln!(f, "=======================")?;
        writeln!(f)?;
        writeln!(f, "Backend:         {}", self.backend)?;
        writeln!(
            f,
            "Model:           {}",
            if self.default_model.is_empty() {
                "(none)"
            } else {
                &self.default_model
            }
        )?;
        writeln!(f, "Ollama URL:      {}", self.ollama_url)?;
        writeln!(f, "TextGen URL:     {}", self.textgen_url)?;
        writeln!(f, "OpenAI key:      {}", redact(&self.openai_api_key))?;
        writeln!(f, "OpenRouter key:  {}", redact(&self.openrouter_api_key))?;
        writeln!(f, "Site name:       {}", self.site_name)?;
        writeln!(f, "Timeout:         {} s", self.timeout_secs)?;
        writeln!(f, "Retries:         {}", self.retries)?;
        writeln!(f, "Jobs:            {}", self.jobs)?;
        writeln!(f, "Temperature:     {}", self.params.temperature)?;
        writeln!(f, "Max tokens:      {}", self.params.max_tokens)?;

        if let Ok(path) = Self::config_path() {
            writeln!(f)?;
            writeln!(f, "Config file:     {}", path.display())?;
        }

        Ok(())
    }
}

fn redact(key: &str) -> &'static str {
    if key.trim().is_empty() {
        "(not set)"
    } else {
        "(set)"
    }
}
