//! Command handlers

use crate::cli::{Cli, Commands};
use crate::output;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::sync::Arc;
use visioncap_app::batch::{run_batch, BatchOptions, Reporter};
use visioncap_app::runner::ItemRunner;
use visioncap_app::scanner::{scan_directory, validate_image};
use visioncap_app::settings::Settings;
use visioncap_backend::{mime_for_path, prompts, BackendClient};
use visioncap_types::{
    AnalysisRequest, AnalysisResult, BackendError, BackendKind, BatchRun, CancelFlag,
    CaptionStyle, EnhancementStyle, Error, OutputFormat, Result,
};

pub async fn execute(cli: Cli) -> Result<()> {
    let mut settings = Settings::load()?;

    if let Some(backend) = cli.backend {
        settings.backend = backend;
    }
    if let Some(model) = &cli.model {
        settings.default_model = model.clone();
    }

    let format = cli.format.unwrap_or_default();
    let verbose = cli.verbose;
    let url_override = cli.url.clone();
    let key_override = cli.api_key.clone();

    match cli.command {
        Commands::Analyze {
            image,
            prompt,
            wan_i2v,
        } => {
            cmd_analyze(
                &settings,
                &url_override,
                &key_override,
                image,
                prompt,
                wan_i2v,
                format,
                verbose,
            )
            .await
        }
        Commands::Batch {
            folder,
            style,
            prompt,
            trigger_word,
            jobs,
        } => {
            cmd_batch(
                &settings,
                &url_override,
                &key_override,
                folder,
                style.unwrap_or_default(),
                prompt,
                trigger_word,
                jobs,
                format,
                verbose,
            )
            .await
        }
        Commands::Enhance { text, file, style } => {
            cmd_enhance(
                &settings,
                &url_override,
                &key_override,
                text,
                file,
                style.unwrap_or_default(),
                format,
            )
            .await
        }
        Commands::Models => {
            cmd_models(&settings, &url_override, &key_override, format).await
        }
        Commands::Config {
            show,
            set_backend,
            set_model,
            set_ollama_url,
            set_textgen_url,
            set_openai_key,
            set_openrouter_key,
            set_timeout,
            set_retries,
            set_jobs,
            set_temperature,
            set_max_tokens,
        } => cmd_config(
            settings,
            show,
            set_backend,
            set_model,
            set_ollama_url,
            set_textgen_url,
            set_openai_key,
            set_openrouter_key,
            set_timeout,
            set_retries,
            set_jobs,
            set_temperature,
            set_max_tokens,
        ),
    }
}

fn build_client(
    settings: &Settings,
    url_override: &Option<String>,
    key_override: &Option<String>,
) -> Result<Arc<BackendClient>> {
    let mut config = settings.backend_config();
    if let Some(url) = url_override {
        config = config.with_base_url(url.clone());
    }
    if let Some(key) = key_override {
        config = config.with_api_key(key.clone());
    }
    Ok(Arc::new(BackendClient::new(config)?))
}

fn require_model(settings: &Settings) -> Result<()> {
    if settings.default_model.is_empty() && settings.backend != BackendKind::TextGen {
        return Err(Error::Backend(BackendError::InvalidRequest(
            "no model selected; pass --model or set one with 'visioncap config --set-model'"
                .to_string(),
        )));
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
async fn cmd_analyze(
    settings: &Settings,
    url_override: &Option<String>,
    key_override: &Option<String>,
    image: PathBuf,
    prompt: Option<String>,
    wan_i2v: bool,
    format: OutputFormat,
    verbose: bool,
) -> Result<()> {
    validate_image(&image)?;
    require_model(settings)?;

    let client = build_client(settings, url_override, key_override)?;
    let runner = ItemRunner::new(client).with_retries(settings.retries);

    let data = std::fs::read(&image)?;
    let prompt = prompt.unwrap_or_else(|| prompts::DEFAULT_ANALYSIS_PROMPT.to_string());

    let mut request = AnalysisRequest::for_image(data, mime_for_path(&image), prompt)
        .with_params(settings.params.clone());
    if wan_i2v {
        request = request.with_system_prompt(prompts::WAN_I2V_SYSTEM_PROMPT);
    }

    if verbose {
        eprintln!(
            "Analyzing {} with {} ({})",
            image.display(),
            settings.backend,
            settings.default_model
        );
    }

    let result = runner.run(&image, &request).await;
    if let Some(detail) = &result.error {
        return Err(Error::AnalysisFailed(detail.clone()));
    }
    output::print_analysis(format, &result)
}

/// Progress-bar reporter for batch mode. Failures are echoed inline
/// above the bar with the filename and error detail.
struct ProgressReporter {
    pb: ProgressBar,
    verbose: bool,
}

impl Reporter for ProgressReporter {
    fn on_item_complete(&self, result: &AnalysisResult, _completed: usize, _total: usize) {
        if let Some(detail) = &result.error {
            self.pb
                .println(format!("✗ {}: {}", result.source.display(), detail));
        } else if self.verbose {
            self.pb.println(format!("✓ {}", result.source.display()));
        }
        self.pb.inc(1);
    }

    fn on_batch_finished(&self, run: &BatchRun) {
        self.pb.finish_with_message(format!(
            "✓{} ✗{}{}",
            run.successful,
            run.failed,
            if run.cancelled { " (cancelled)" } else { "" }
        ));
    }
}

#[allow(clippy::too_many_arguments)]
async fn cmd_batch(
    settings: &Settings,
    url_override: &Option<String>,
    key_override: &Option<String>,
    folder: PathBuf,
    style: CaptionStyle,
    prompt: Option<String>,
    trigger_word: Option<String>,
    jobs: Option<usize>,
    format: OutputFormat,
    verbose: bool,
) -> Result<()> {
    require_model(settings)?;

    let images = scan_directory(&folder)?;
    if images.is_empty() {
        println!("No image files found in {}", folder.display());
        return Ok(());
    }

    let jobs = jobs.unwrap_or(settings.jobs);
    if verbose {
        eprintln!(
            "Found {} images to caption with {} ({}), style: {}",
            images.len(),
            settings.backend,
            settings.default_model,
            style
        );
    }

    let client = build_client(settings, url_override, key_override)?;

    let pb = ProgressBar::new(images.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}")
            .unwrap()
            .progress_chars("#>-"),
    );

    let reporter = Arc::new(ProgressReporter {
        pb: pb.clone(),
        verbose,
    });

    let options = BatchOptions {
        style,
        prompt,
        trigger_word,
        jobs,
        retries: settings.retries,
        params: settings.params.clone(),
    };

    let run = run_batch(&folder, &options, client, reporter, CancelFlag::new()).await?;
    output::print_batch_summary(format, &run)
}

async fn cmd_enhance(
    settings: &Settings,
    url_override: &Option<String>,
    key_override: &Option<String>,
    text: Option<String>,
    file: Option<PathBuf>,
    style: EnhancementStyle,
    format: OutputFormat,
) -> Result<()> {
    require_model(settings)?;

    let (text, source) = match (text, file) {
        (Some(text), None) => (text, PathBuf::from("-")),
        (None, Some(path)) => {
            let text = std::fs::read_to_string(&path)?.trim().to_string();
            (text, path)
        }
        _ => {
            return Err(Error::Backend(BackendError::InvalidRequest(
                "pass the text to enhance, or --file".to_string(),
            )))
        }
    };

    let client = build_client(settings, url_override, key_override)?;
    let runner = ItemRunner::new(client).with_retries(settings.retries);

    let request = AnalysisRequest::for_text(text)
        .with_system_prompt(prompts::enhancement_system_prompt(style))
        .with_params(settings.params.clone());

    let result = runner.run(&source, &request).await;
    if let Some(detail) = &result.error {
        return Err(Error::AnalysisFailed(detail.clone()));
    }
    output::print_analysis(format, &result)
}

async fn cmd_models(
    settings: &Settings,
    url_override: &Option<String>,
    key_override: &Option<String>,
    format: OutputFormat,
) -> Result<()> {
    let client = build_client(settings, url_override, key_override)?;
    let models = client.list_models().await.map_err(Error::Backend)?;
    output::print_models(format, &models)
}

#[allow(clippy::too_many_arguments)]
fn cmd_config(
    mut settings: Settings,
    show: bool,
    set_backend: Option<BackendKind>,
    set_model: Option<String>,
    set_ollama_url: Option<String>,
    set_textgen_url: Option<String>,
    set_openai_key: Option<String>,
    set_openrouter_key: Option<String>,
    set_timeout: Option<u64>,
    set_retries: Option<u32>,
    set_jobs: Option<usize>,
    set_temperature: Option<f32>,
    set_max_tokens: Option<u32>,
) -> Result<()> {
    let mut changed = false;

    macro_rules! apply {
        ($field:expr, $value:expr) => {
            if let Some(value) = $value {
                $field = value;
                changed = true;
            }
        };
    }

    apply!(settings.backend, set_backend);
    apply!(settings.default_model, set_model);
    apply!(settings.ollama_url, set_ollama_url);
    apply!(settings.textgen_url, set_textgen_url);
    apply!(settings.openai_api_key, set_openai_key);
    apply!(settings.openrouter_api_key, set_openrouter_key);
    apply!(settings.timeout_secs, set_timeout);
    apply!(settings.retries, set_retries);
    apply!(settings.jobs, set_jobs);
    apply!(settings.params.temperature, set_temperature);
    apply!(settings.params.max_tokens, set_max_tokens);

    if changed {
        settings.save()?;
        println!("Settings saved.");
    }

    if show || !changed {
        print!("{}", settings);
    }

    Ok(())
}
