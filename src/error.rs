//! Error types for the modsquad library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`ModsquadError`] — **Fatal**: the batch cannot start at all (no
//!   inputs, a required tool is missing, the output root cannot be created).
//!   Returned as `Err(ModsquadError)` from the `run_batch*` entry points.
//!
//! * [`JobError`] — **Non-fatal**: a single input failed (decoder crashed,
//!   destination directory not writable) but the rest of the batch is fine.
//!   Stored inside [`crate::output::JobOutcome::Failed`] so one bad module
//!   never aborts the whole run.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the modsquad library.
///
/// Job-level failures use [`JobError`] and are reported through
/// [`crate::output::JobResult`] rather than propagated here.
#[derive(Debug, Error)]
pub enum ModsquadError {
    // ── Usage errors ──────────────────────────────────────────────────────
    /// No input files or directories were given.
    #[error("No inputs given.\nUsage: modsquad [OPTIONS] <FILE or DIR>...")]
    NoInputs,

    /// The requested output format is not one of wav, flac, mp3.
    #[error("Unknown format: '{format}' (expected one of: wav, flac, mp3)")]
    UnknownFormat { format: String },

    // ── Preflight errors ──────────────────────────────────────────────────
    /// A tool needed for the chosen format could not be resolved.
    #[error("Required tool '{tool}' not found in PATH: {detail}")]
    ToolNotFound { tool: String, detail: String },

    /// The output root could not be created.
    #[error("Failed to create output directory '{path}': {source}")]
    OutputDirFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A non-fatal error for a single conversion job.
///
/// Each variant names the step that failed so the log line alone is enough
/// to tell where a job went wrong. The batch continues with the next job.
#[derive(Debug, Clone, PartialEq, Eq, Error, serde::Serialize, serde::Deserialize)]
pub enum JobError {
    /// The destination's parent directory could not be created.
    #[error("failed to create directory '{path}': {detail}")]
    CreateDirFailed { path: PathBuf, detail: String },

    /// The intermediate WAV file could not be created.
    #[error("failed to create temporary wav file: {detail}")]
    TempFileFailed { detail: String },

    /// The external tool could not be started at all.
    #[error("{tool} could not be started: {detail}")]
    SpawnFailed { tool: String, detail: String },

    /// The external tool ran but exited unsuccessfully.
    ///
    /// `status` is `None` when the tool was killed by a signal.
    #[error("{tool} failed with exit status {}", describe_status(.status))]
    ToolFailed { tool: String, status: Option<i32> },

    /// Moving the decoded WAV into place failed.
    #[error("failed to move wav file '{from}' to '{to}': {detail}")]
    MoveFailed {
        from: PathBuf,
        to: PathBuf,
        detail: String,
    },
}

fn describe_status(status: &Option<i32>) -> String {
    match status {
        Some(code) => code.to_string(),
        None => "<signal>".to_string(),
    }
}
