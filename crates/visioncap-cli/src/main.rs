//! visioncap - image captioning and prompt enhancement via LLM vision
//! backends
//!
//! Sends images or text to Ollama, OpenAI, OpenRouter or a local
//! TextGen server and prints or writes the generated text.

mod cli;
mod commands;
mod output;

use clap::Parser;
use cli::Cli;

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    if let Err(e) = commands::execute(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
