//! # modsquad
//!
//! Batch-export tracker music modules (MOD, XM, S3M, IT, …) to WAV, FLAC or
//! MP3.
//!
//! The audio work is done by well-known command-line tools: `xmp` renders a
//! module to WAV, `flac` and `lame` compress it. This crate is the batch
//! plumbing around them: finding inputs, mapping each to a stable output
//! path, skipping what is already done, and never leaving a half-written
//! temp file behind, not even when the run is interrupted.
//!
//! ## Pipeline Overview
//!
//! ```text
//! files / dirs
//!  │
//!  ├─ 1. Preflight  every tool the format needs is on PATH
//!  ├─ 2. Walk       files → jobs; directories only with `recursive`
//!  ├─ 3. Resolve    out/<dir>/<name>.<format>; exists → skip
//!  ├─ 4. Decode     xmp -o /tmp/modsquad-*.wav <module>
//!  ├─ 5. Encode     wav: rename · flac: flac -o · mp3: lame --vbr-new -V 6
//!  └─ 6. Cleanup    temp WAV removed on every path, and on SIGINT/SIGTERM
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use modsquad::{install_signal_handler, run_batch, BatchConfig, InterruptGuard, TargetFormat};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     install_signal_handler(InterruptGuard::global());
//!
//!     let config = BatchConfig::builder()
//!         .out_dir("exports")
//!         .format(TargetFormat::Flac)
//!         .recursive(true)
//!         .build()?;
//!     let output = run_batch(["songs"], &config).await?;
//!     eprintln!(
//!         "{} converted, {} skipped, {} failed",
//!         output.stats.converted, output.stats.skipped, output.stats.failed
//!     );
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `modsquad` binary (clap + anyhow + tracing-subscriber) |
//!
//! ## Re-running
//!
//! Outputs that already exist are never touched, so re-running the same
//! command after a failure or Ctrl-C picks up where it stopped.

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{BatchConfig, BatchConfigBuilder, TargetFormat, ToolSet};
pub use convert::{preflight, run_batch, run_batch_sync, run_batch_with_guard};
pub use error::{JobError, ModsquadError};
pub use output::{BatchOutput, BatchStats, JobOutcome, JobResult};
pub use pipeline::guard::{install_signal_handler, InterruptGuard, TempArtifact};
pub use pipeline::job::ConversionPipeline;
pub use pipeline::resolve::resolve;
pub use pipeline::walk::{enumerate, ConversionJob};
pub use progress::{BatchProgressCallback, NoopProgressCallback, ProgressCallback};
