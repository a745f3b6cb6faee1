//! Per-job conversion: decode to a temp WAV, then encode or move into place.
//!
//! ```text
//! resolve ─▶ exists? ─yes─▶ Skipped
//!               │no
//!               ▼
//!          mkdir -p parent ─▶ TempArtifact ─▶ decoder -o tmp.wav in
//!                                                  │
//!                      ┌───────────────────────────┼────────────────────────┐
//!                      ▼ wav                       ▼ flac                   ▼ mp3
//!               rename tmp → out       flac -o out tmp.wav     lame --vbr-new -V 6 tmp.wav out
//! ```
//!
//! The temp artifact is dropped (deleted and deregistered) before
//! [`ConversionPipeline::process`] returns, on every path.

use super::guard::{InterruptGuard, TempArtifact};
use super::resolve::resolve;
use super::tool;
use super::walk::ConversionJob;
use crate::config::{BatchConfig, TargetFormat, LOSSY_QUALITY_ARGS};
use crate::error::JobError;
use crate::output::JobOutcome;
use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Converts jobs one at a time according to a [`BatchConfig`].
pub struct ConversionPipeline {
    config: BatchConfig,
    guard: Arc<InterruptGuard>,
}

impl ConversionPipeline {
    pub fn new(config: BatchConfig, guard: Arc<InterruptGuard>) -> Self {
        Self { config, guard }
    }

    /// Where `job` will be written.
    pub fn destination(&self, job: &ConversionJob) -> PathBuf {
        resolve(&job.relative, &self.config.out_dir, self.config.format)
    }

    /// Process one job. Never fails: every error becomes
    /// [`JobOutcome::Failed`] and is logged with the input and step.
    pub async fn process(&self, job: &ConversionJob) -> JobOutcome {
        let output = self.destination(job);

        match tokio::fs::metadata(&output).await {
            Ok(_) => {
                info!(
                    "Skipping {}: output already exists at {}",
                    job.input.display(),
                    output.display()
                );
                return JobOutcome::Skipped { output };
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            // Treated as absent; a permission problem will surface again when
            // the output is written.
            Err(e) => warn!("Error checking {}: {}", output.display(), e),
        }

        match self.convert(job, &output).await {
            Ok(()) => {
                debug!("Processed {} -> {}", job.input.display(), output.display());
                JobOutcome::Converted { output }
            }
            Err(error) => {
                warn!("{}: {}", job.input.display(), error);
                JobOutcome::Failed { error }
            }
        }
    }

    async fn convert(&self, job: &ConversionJob, output: &Path) -> Result<(), JobError> {
        if let Some(parent) = output.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| JobError::CreateDirFailed {
                    path: parent.to_path_buf(),
                    detail: e.to_string(),
                })?;
        }

        let guard = Arc::clone(&self.guard);
        let artifact = TempArtifact::create(self.config.temp_dir.as_deref(), guard).map_err(
            |e| JobError::TempFileFailed {
                detail: e.to_string(),
            },
        )?;

        let tools = &self.config.tools;
        tool::run(
            &tools.decoder,
            [
                OsString::from("-o"),
                artifact.path().into(),
                job.input.clone().into(),
            ],
        )
        .await?;

        match self.config.format {
            TargetFormat::Wav => {
                let from = artifact.path().to_path_buf();
                artifact
                    .persist(output)
                    .map_err(|e| JobError::MoveFailed {
                        from,
                        to: output.to_path_buf(),
                        detail: e.to_string(),
                    })?;
            }
            TargetFormat::Flac => {
                tool::run(
                    &tools.lossless,
                    [
                        OsString::from("-o"),
                        output.into(),
                        artifact.path().into(),
                    ],
                )
                .await?;
            }
            TargetFormat::Mp3 => {
                let mut args: Vec<OsString> =
                    LOSSY_QUALITY_ARGS.into_iter().map(OsString::from).collect();
                args.push(artifact.path().into());
                args.push(output.into());
                tool::run(&tools.lossy, args).await?;
            }
        }

        debug!("Finished {}", job.input.display());
        Ok(())
    }
}
