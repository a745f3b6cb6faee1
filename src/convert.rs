//! Batch entry points.
//!
//! A batch is: preflight the external tools, create the output root, then
//! feed every enumerated job through the [`ConversionPipeline`] one after
//! another. Only problems that make the whole batch pointless are returned as
//! errors; a failing job is recorded in [`BatchOutput::results`] and the loop
//! moves on.

use crate::config::BatchConfig;
use crate::error::ModsquadError;
use crate::output::{BatchOutput, BatchStats, JobOutcome, JobResult};
use crate::pipeline::guard::InterruptGuard;
use crate::pipeline::job::ConversionPipeline;
use crate::pipeline::walk;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Resolve every tool the configured format needs.
///
/// Returns the resolved paths, decoder first. Fails on the first tool that
/// cannot be found, before any file is touched.
pub fn preflight(config: &BatchConfig) -> Result<Vec<PathBuf>, ModsquadError> {
    config
        .required_tools()
        .into_iter()
        .map(|tool| {
            let path = which::which(tool).map_err(|e| ModsquadError::ToolNotFound {
                tool: tool.to_string(),
                detail: e.to_string(),
            })?;
            debug!("Found {} at {}", tool, path.display());
            Ok(path)
        })
        .collect()
}

/// Convert every module found in `inputs`.
///
/// Uses the process-wide [`InterruptGuard`], so a signal listener installed
/// with [`crate::pipeline::guard::install_signal_handler`] can clean up the
/// job in flight.
///
/// # Errors
/// Returns `Err(ModsquadError)` only for fatal errors:
/// - no inputs
/// - a required tool is missing
/// - the output root cannot be created
pub async fn run_batch<I, P>(inputs: I, config: &BatchConfig) -> Result<BatchOutput, ModsquadError>
where
    I: IntoIterator<Item = P>,
    P: Into<PathBuf>,
{
    run_batch_with_guard(inputs, config, InterruptGuard::global()).await
}

/// [`run_batch`] with an explicit guard instead of the process-wide one.
pub async fn run_batch_with_guard<I, P>(
    inputs: I,
    config: &BatchConfig,
    guard: Arc<InterruptGuard>,
) -> Result<BatchOutput, ModsquadError>
where
    I: IntoIterator<Item = P>,
    P: Into<PathBuf>,
{
    let start = Instant::now();
    let inputs: Vec<PathBuf> = inputs.into_iter().map(Into::into).collect();
    if inputs.is_empty() {
        return Err(ModsquadError::NoInputs);
    }

    // ── Step 1: Preflight ────────────────────────────────────────────────
    preflight(config)?;

    // ── Step 2: Output root ──────────────────────────────────────────────
    tokio::fs::create_dir_all(&config.out_dir)
        .await
        .map_err(|e| ModsquadError::OutputDirFailed {
            path: config.out_dir.clone(),
            source: e,
        })?;

    info!(
        "Converting {} input(s) to {} under {}",
        inputs.len(),
        config.format,
        config.out_dir.display()
    );
    if let Some(ref cb) = config.progress_callback {
        cb.on_batch_start();
    }

    // ── Step 3: Jobs, strictly one at a time ─────────────────────────────
    let pipeline = ConversionPipeline::new(config.clone(), Arc::clone(&guard));
    let mut output = BatchOutput::default();

    for job in walk::enumerate(inputs, config.recursive) {
        if guard.is_interrupted() {
            warn!("Interrupted, not starting {}", job.input.display());
            break;
        }
        if let Some(ref cb) = config.progress_callback {
            cb.on_job_start(&job);
        }

        let outcome = pipeline.process(&job).await;

        if let Some(ref cb) = config.progress_callback {
            match &outcome {
                JobOutcome::Converted { output } => cb.on_job_complete(&job, output),
                JobOutcome::Skipped { output } => cb.on_job_skipped(&job, output),
                JobOutcome::Failed { error } => cb.on_job_error(&job, error),
            }
        }

        output.stats.record(&outcome);
        output.results.push(JobResult {
            input: job.input,
            outcome,
        });
    }

    output.stats.duration_ms = start.elapsed().as_millis() as u64;
    log_summary(&output.stats);

    if let Some(ref cb) = config.progress_callback {
        cb.on_batch_complete(&output.stats);
    }

    Ok(output)
}

/// Synchronous wrapper around [`run_batch`].
///
/// Creates a temporary tokio runtime internally.
pub fn run_batch_sync<I, P>(inputs: I, config: &BatchConfig) -> Result<BatchOutput, ModsquadError>
where
    I: IntoIterator<Item = P>,
    P: Into<PathBuf>,
{
    tokio::runtime::Runtime::new()
        .map_err(|e| ModsquadError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(run_batch(inputs, config))
}

fn log_summary(stats: &BatchStats) {
    info!(
        "Batch complete: {} converted, {} skipped, {} failed ({} jobs, {}ms)",
        stats.converted, stats.skipped, stats.failed, stats.jobs, stats.duration_ms
    );
}
