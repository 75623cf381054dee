//! CLI definition using clap

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use visioncap_types::{BackendKind, CaptionStyle, EnhancementStyle, OutputFormat};

#[derive(Parser)]
#[command(name = "visioncap")]
#[command(version)]
#[command(about = "Image captioning and prompt enhancement via LLM vision backends")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Backend to use (ollama, openai, openrouter, textgen)
    #[arg(long, global = true)]
    pub backend: Option<BackendKind>,

    /// Model name override
    #[arg(long, global = true)]
    pub model: Option<String>,

    /// Backend base URL override
    #[arg(long, global = true)]
    pub url: Option<String>,

    /// API key override
    #[arg(long, global = true)]
    pub api_key: Option<String>,

    /// Output format (text, json)
    #[arg(long, short = 'f', global = true)]
    pub format: Option<OutputFormat>,

    /// Verbose output
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Analyze a single image
    Analyze {
        /// Path to image file
        image: PathBuf,

        /// Prompt sent with the image
        #[arg(long, short = 'p')]
        prompt: Option<String>,

        /// Turn the image into an image-to-video motion prompt
        #[arg(long)]
        wan_i2v: bool,
    },

    /// Caption all images in a folder, writing one sidecar text file
    /// per image
    Batch {
        /// Path to folder containing images
        folder: PathBuf,

        /// Caption style
        #[arg(long, short = 's')]
        style: Option<CaptionStyle>,

        /// Prompt override (takes precedence over --style)
        #[arg(long, short = 'p')]
        prompt: Option<String>,

        /// Token prepended to every caption
        #[arg(long, short = 't')]
        trigger_word: Option<String>,

        /// Number of parallel requests. 0 = auto (CPU count). Uses the
        /// configured value if not specified.
        #[arg(long, short = 'j')]
        jobs: Option<usize>,
    },

    /// Enhance a text prompt
    Enhance {
        /// Text to enhance
        text: Option<String>,

        /// Read the text from a file instead
        #[arg(long, conflicts_with = "text")]
        file: Option<PathBuf>,

        /// Enhancement style (plain, qwen, wan)
        #[arg(long, short = 's')]
        style: Option<EnhancementStyle>,
    },

    /// List models available on the configured backend
    Models,

    /// Manage configuration
    Config {
        /// Show current configuration
        #[arg(long)]
        show: bool,

        /// Set the backend
        #[arg(long)]
        set_backend: Option<BackendKind>,

        /// Set the default model
        #[arg(long)]
        set_model: Option<String>,

        /// Set the Ollama server URL
        #[arg(long)]
        set_ollama_url: Option<String>,

        /// Set the TextGen server URL
        #[arg(long)]
        set_textgen_url: Option<String>,

        /// Set the OpenAI API key
        #[arg(long)]
        set_openai_key: Option<String>,

        /// Set the OpenRouter API key
        #[arg(long)]
        set_openrouter_key: Option<String>,

        /// Set the per-request timeout in seconds
        #[arg(long)]
        set_timeout: Option<u64>,

        /// Set retries for transient failures
        #[arg(long)]
        set_retries: Option<u32>,

        /// Set the default batch worker count (0 = CPU count)
        #[arg(long)]
        set_jobs: Option<usize>,

        /// Set the sampling temperature
        #[arg(long)]
        set_temperature: Option<f32>,

        /// Set the response token budget
        #[arg(long)]
        set_max_tokens: Option<u32>,
    },
}
