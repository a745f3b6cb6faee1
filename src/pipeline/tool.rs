//! External tool invocation.
//!
//! Decoding and encoding are delegated to command-line programs. Their
//! stdout and stderr are inherited, so the user sees xmp's player output and
//! lame's progress meter live, exactly as if the tools were run by hand.
//! No timeout is applied: a hung tool hangs the batch.

use crate::error::JobError;
use std::ffi::OsStr;
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

/// Run `program` with `args` and wait for it to exit.
///
/// Returns `Ok(())` on a zero exit status. A program that cannot be started
/// and one that exits non-zero are both errors; the variant only changes the
/// log message.
pub async fn run<I, S>(program: &str, args: I) -> Result<(), JobError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let mut cmd = Command::new(program);
    cmd.args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit());

    debug!("Running {:?}", cmd.as_std());

    let status = cmd.status().await.map_err(|e| JobError::SpawnFailed {
        tool: program.to_string(),
        detail: e.to_string(),
    })?;

    if status.success() {
        Ok(())
    } else {
        Err(JobError::ToolFailed {
            tool: program.to_string(),
            status: status.code(),
        })
    }
}
