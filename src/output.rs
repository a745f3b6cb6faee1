//! Result types returned by a batch run.

use crate::error::JobError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// What happened to a single job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum JobOutcome {
    /// The output was written.
    Converted { output: PathBuf },
    /// The output already existed; no tool was invoked.
    Skipped { output: PathBuf },
    /// A step failed. Nothing is left behind in the temp directory.
    Failed { error: JobError },
}

impl JobOutcome {
    pub fn is_converted(&self) -> bool {
        matches!(self, JobOutcome::Converted { .. })
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, JobOutcome::Skipped { .. })
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, JobOutcome::Failed { .. })
    }
}

/// One entry per job, in the order jobs were processed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobResult {
    /// Input module path as enumerated.
    pub input: PathBuf,
    #[serde(flatten)]
    pub outcome: JobOutcome,
}

/// Counters for a finished batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchStats {
    /// Jobs enumerated from the inputs.
    pub jobs: usize,
    pub converted: usize,
    pub skipped: usize,
    pub failed: usize,
    /// Wall-clock time for the whole loop.
    pub duration_ms: u64,
}

impl BatchStats {
    /// Count one more job with the given outcome.
    pub fn record(&mut self, outcome: &JobOutcome) {
        self.jobs += 1;
        match outcome {
            JobOutcome::Converted { .. } => self.converted += 1,
            JobOutcome::Skipped { .. } => self.skipped += 1,
            JobOutcome::Failed { .. } => self.failed += 1,
        }
    }
}

/// Everything a batch run produced.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchOutput {
    pub results: Vec<JobResult>,
    pub stats: BatchStats,
}
