//! Batch orchestrator
//!
//! Enumerates a folder, runs every image through the single-item
//! runner on a bounded pool of workers, writes one sidecar text file
//! per successful image, and reports progress through a [`Reporter`].
//! One failed item never aborts the batch; the only batch-level error
//! is a missing or unreadable folder.

use chrono::Utc;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use visioncap_backend::{prompts, BackendClient};
use visioncap_types::{
    AnalysisRequest, AnalysisResult, BatchRun, CancelFlag, CaptionStyle, GenerationParams, Result,
};

use crate::runner::ItemRunner;
use crate::scanner;

/// Progress sink for a batch run. The orchestrator never renders;
/// the CLI drives a progress bar through this, tests count calls.
pub trait Reporter: Send + Sync {
    fn on_item_complete(&self, result: &AnalysisResult, completed: usize, total: usize);
    fn on_batch_finished(&self, run: &BatchRun);
}

/// Reporter that discards everything, for library use.
pub struct NullReporter;

impl Reporter for NullReporter {
    fn on_item_complete(&self, _result: &AnalysisResult, _completed: usize, _total: usize) {}
    fn on_batch_finished(&self, _run: &BatchRun) {}
}

#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// Caption style selecting the instruction prompt.
    pub style: CaptionStyle,

    /// Explicit prompt override. When set, `style` is ignored.
    pub prompt: Option<String>,

    /// Token prepended to every caption, comma-joined.
    pub trigger_word: Option<String>,

    /// Worker count. 0 = CPU count.
    pub jobs: usize,

    /// Retries for transient per-item failures.
    pub retries: u32,

    pub params: GenerationParams,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            style: CaptionStyle::default(),
            prompt: None,
            trigger_word: None,
            jobs: 4,
            retries: 0,
            params: GenerationParams::default(),
        }
    }
}

#[derive(Debug, Default)]
struct BatchState {
    results: Vec<AnalysisResult>,
    successful: usize,
    failed: usize,
}

/// Caption every image in `folder`. Returns the aggregate run; per-item
/// failures live in its tally, not in the error channel.
pub async fn run_batch(
    folder: &Path,
    options: &BatchOptions,
    client: Arc<BackendClient>,
    reporter: Arc<dyn Reporter>,
    cancel: CancelFlag,
) -> Result<BatchRun> {
    let files = scanner::scan_directory(folder)?;
    let total = files.len();
    let started_at = Utc::now();

    let prompt = options
        .prompt
        .clone()
        .unwrap_or_else(|| prompts::caption_prompt(options.style).to_string());

    let state = Arc::new(Mutex::new(BatchState::default()));
    let next_index = Arc::new(AtomicUsize::new(0));
    let files = Arc::new(files);
    let runner = Arc::new(ItemRunner::new(client).with_retries(options.retries));

    let mut handles = Vec::new();
    for _ in 0..effective_jobs(options.jobs, total) {
        let files = Arc::clone(&files);
        let next_index = Arc::clone(&next_index);
        let state = Arc::clone(&state);
        let runner = Arc::clone(&runner);
        let reporter = Arc::clone(&reporter);
        let cancel = cancel.clone();
        let prompt = prompt.clone();
        let trigger_word = options.trigger_word.clone();
        let params = options.params.clone();

        handles.push(tokio::spawn(async move {
            loop {
                // Cancellation is cooperative: checked before claiming
                // an item, never mid-request.
                if cancel.is_cancelled() {
                    break;
                }

                let idx = next_index.fetch_add(1, Ordering::SeqCst);
                if idx >= files.len() {
                    break;
                }

                let image = &files[idx];
                let result =
                    process_one(&runner, image, &prompt, trigger_word.as_deref(), &params).await;

                // Tally, result list and notification move together so
                // completed counts are exact and never duplicated.
                let mut state = state.lock().unwrap();
                if result.is_success() {
                    state.successful += 1;
                } else {
                    state.failed += 1;
                }
                state.results.push(result);
                let completed = state.results.len();
                let last = state.results.last().unwrap();
                reporter.on_item_complete(last, completed, files.len());
            }
        }));
    }

    for handle in handles {
        let _ = handle.await;
    }

    let state = Arc::try_unwrap(state)
        .expect("all workers joined")
        .into_inner()
        .unwrap();
    let files = Arc::try_unwrap(files).expect("all workers joined");

    let run = BatchRun {
        files,
        results: state.results,
        successful: state.successful,
        failed: state.failed,
        cancelled: cancel.is_cancelled(),
        started_at,
        finished_at: Utc::now(),
    };

    reporter.on_batch_finished(&run);
    Ok(run)
}

/// Process one image: read, caption, write the sidecar. A read or
/// sidecar-write failure is that item's failure, not an abort.
async fn process_one(
    runner: &ItemRunner,
    image: &Path,
    prompt: &str,
    trigger_word: Option<&str>,
    params: &GenerationParams,
) -> AnalysisResult {
    let data = match tokio::fs::read(image).await {
        Ok(data) => data,
        Err(err) => {
            return AnalysisResult::failure(
                image.to_path_buf(),
                format!("cannot read image: {}", err),
            )
        }
    };

    let request = AnalysisRequest::for_image(data, visioncap_backend::mime_for_path(image), prompt)
        .with_params(params.clone());
    let result = runner.run(image, &request).await;

    if let Some(caption) = result.caption.as_deref() {
        let sidecar = sidecar_path(image);
        let text = apply_trigger_word(caption, trigger_word);
        if let Err(err) = tokio::fs::write(&sidecar, text).await {
            return AnalysisResult::failure(
                image.to_path_buf(),
                format!("cannot write sidecar {}: {}", sidecar.display(), err),
            );
        }
    }

    result
}

/// Sidecar text file next to its image: same base name, `.txt`.
pub fn sidecar_path(image: &Path) -> PathBuf {
    image.with_extension("txt")
}

fn apply_trigger_word(caption: &str, trigger_word: Option<&str>) -> String {
    match trigger_word.map(str::trim) {
        Some(word) if !word.is_empty() => format!("{}, {}", word, caption),
        _ => caption.to_string(),
    }
}

fn effective_jobs(jobs: usize, total: usize) -> usize {
    if total == 0 {
        return 0;
    }
    let jobs = if jobs == 0 { num_cpus::get() } else { jobs };
    jobs.clamp(1, total)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sidecar_keeps_base_name() {
        assert_eq!(
            sidecar_path(Path::new("/data/shoot/a.png")),
            PathBuf::from("/data/shoot/a.txt")
        );
    }

    #[test]
    fn trigger_word_is_comma_joined_prefix() {
        assert_eq!(
            apply_trigger_word("1girl, smile", Some("mychar")),
            "mychar, 1girl, smile"
        );
        assert_eq!(apply_trigger_word("a cat", Some("  ")), "a cat");
        assert_eq!(apply_trigger_word("a cat", None), "a cat");
    }

    #[test]
    fn worker_count_is_bounded_by_items() {
        assert_eq!(effective_jobs(4, 2), 2);
        assert_eq!(effective_jobs(2, 100), 2);
        assert_eq!(effective_jobs(4, 0), 0);
        assert!(effective_jobs(0, 100) >= 1);
    }
}
