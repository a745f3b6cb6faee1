//! Progress-callback trait for per-job batch events.
//!
//! Inject an [`Arc<dyn BatchProgressCallback>`] via
//! [`crate::config::BatchConfigBuilder::progress_callback`] to receive events
//! as the pipeline works through each input module.
//!
//! The external tools write straight to the terminal, so the library never
//! prints on its own behalf. Callers decide what a finished, skipped or
//! failed job looks like: a plain log line, a JSON record, a counter.
//!
//! # Example
//!
//! ```rust
//! use modsquad::{BatchConfig, BatchProgressCallback, ConversionJob};
//! use std::path::Path;
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     converted: AtomicUsize,
//! }
//!
//! impl BatchProgressCallback for CountingCallback {
//!     fn on_job_complete(&self, job: &ConversionJob, output: &Path) {
//!         self.converted.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("{} -> {}", job.input.display(), output.display());
//!     }
//! }
//!
//! let counter = Arc::new(CountingCallback { converted: AtomicUsize::new(0) });
//!
//! let config = BatchConfig::builder()
//!     .progress_callback(counter as Arc<dyn BatchProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use crate::error::JobError;
use crate::output::BatchStats;
use crate::pipeline::walk::ConversionJob;
use std::path::Path;
use std::sync::Arc;

/// Called by the batch runner as it processes each job.
///
/// Jobs run strictly one after another, but the trait is `Send + Sync` so a
/// callback can be shared with other tasks (a UI thread, a log forwarder).
/// All methods have default no-op implementations.
pub trait BatchProgressCallback: Send + Sync {
    /// Called once after preflight, before the first job.
    fn on_batch_start(&self) {}

    /// Called when a job is picked up, before the output check.
    fn on_job_start(&self, job: &ConversionJob) {
        let _ = job;
    }

    /// Called when the output already exists and the job does nothing.
    fn on_job_skipped(&self, job: &ConversionJob, output: &Path) {
        let _ = (job, output);
    }

    /// Called when `output` was written successfully.
    fn on_job_complete(&self, job: &ConversionJob, output: &Path) {
        let _ = (job, output);
    }

    /// Called when a job fails at any step.
    fn on_job_error(&self, job: &ConversionJob, error: &JobError) {
        let _ = (job, error);
    }

    /// Called once after the last job.
    fn on_batch_complete(&self, stats: &BatchStats) {
        let _ = stats;
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl BatchProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::BatchConfig`].
pub type ProgressCallback = Arc<dyn BatchProgressCallback>;
