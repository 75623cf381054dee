//! Output formatting module

use visioncap_types::{AnalysisResult, BatchRun, OutputFormat, Result};

pub fn print_analysis(format: OutputFormat, result: &AnalysisResult) -> Result<()> {
    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(result)?);
    } else {
        println!("{}", result.caption.as_deref().unwrap_or_default());
    }
    Ok(())
}

pub fn print_models(format: OutputFormat, models: &[String]) -> Result<()> {
    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(models)?);
    } else if models.is_empty() {
        println!("(no models reported)");
    } else {
        for model in models {
            println!("{}", model);
        }
    }
    Ok(())
}

pub fn print_batch_summary(format: OutputFormat, run: &BatchRun) -> Result<()> {
    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(run)?);
        return Ok(());
    }

    let elapsed = (run.finished_at - run.started_at).num_seconds();

    println!();
    println!(
        "Batch complete{} in {}s",
        if run.cancelled { " (cancelled)" } else { "" },
        elapsed
    );
    println!("Processed: {}/{}", run.results.len(), run.total());
    println!("Succeeded: {}", run.successful);
    println!("Failed:    {}", run.failed);
    if run.unprocessed() > 0 {
        println!("Skipped:   {}", run.unprocessed());
    }

    Ok(())
}
