//! CLI binary for modsquad.
//!
//! A thin shim over the library crate that maps CLI flags to `BatchConfig`,
//! installs the interrupt listener and prints results.

use anyhow::{Context, Result};
use clap::Parser;
use modsquad::{
    install_signal_handler, run_batch, BatchConfig, BatchProgressCallback, BatchStats,
    ConversionJob, InterruptGuard, JobError, ProgressCallback, TargetFormat,
};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

// ── CLI progress callback ────────────────────────────────────────────────────

/// Prints one line per finished job. xmp, flac and lame own the terminal
/// while they run, so there is no progress bar to keep in sync.
struct CliProgressCallback {
    quiet: bool,
}

impl BatchProgressCallback for CliProgressCallback {
    fn on_job_complete(&self, job: &ConversionJob, output: &Path) {
        println!("Processed {} -> {}", job.input.display(), output.display());
    }

    fn on_job_skipped(&self, job: &ConversionJob, output: &Path) {
        if !self.quiet {
            eprintln!(
                "  {} {} {}",
                dim("–"),
                job.input.display(),
                dim(&format!("(exists: {})", output.display()))
            );
        }
    }

    fn on_job_error(&self, job: &ConversionJob, error: &JobError) {
        eprintln!("  {} {}  {}", red("✗"), job.input.display(), red(&error.to_string()));
    }

    fn on_batch_complete(&self, stats: &BatchStats) {
        if self.quiet {
            return;
        }
        eprintln!(
            "{} {} converted, {} skipped, {} failed  {}",
            if stats.failed == 0 { green("✔") } else { cyan("⚠") },
            bold(&stats.converted.to_string()),
            stats.skipped,
            if stats.failed == 0 {
                stats.failed.to_string()
            } else {
                red(&stats.failed.to_string())
            },
            dim(&format!("{}ms", stats.duration_ms)),
        );
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Convert one module to MP3 in ./out
  modsquad song.mod

  # A whole library to FLAC, keeping the folder structure
  modsquad --recursive --format flac --out exports ~/music/modules

  # Plain WAV renders
  modsquad -f wav *.xm

  # Resume after Ctrl-C: finished outputs are skipped
  modsquad -r ~/music/modules

REQUIRED TOOLS:
  Format  Tools
  ──────  ─────────────
  wav     xmp
  flac    xmp, flac
  mp3     xmp, lame (VBR, -V 6)

ENVIRONMENT VARIABLES:
  MODSQUAD_OUT        Output directory
  MODSQUAD_FORMAT     Output format (wav, flac, mp3)
  MODSQUAD_XMP        Decoder program
  MODSQUAD_FLAC       Lossless encoder program
  MODSQUAD_LAME       Lossy encoder program
  MODSQUAD_TEMP_DIR   Directory for intermediate WAV files
  RUST_LOG            Log filter, overrides --verbose/--quiet
"#;

/// Batch-export tracker modules to WAV, FLAC or MP3.
#[derive(Parser, Debug)]
#[command(
    name = "modsquad",
    version,
    about = "Batch-export tracker modules to WAV, FLAC or MP3 using xmp, flac and lame",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Module files or directories to convert.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Output directory.
    #[arg(short, long, env = "MODSQUAD_OUT", default_value = "out")]
    out: PathBuf,

    /// Output format.
    #[arg(short, long, env = "MODSQUAD_FORMAT", value_enum, default_value = "mp3")]
    format: FormatArg,

    /// Recurse into directories.
    #[arg(short, long, env = "MODSQUAD_RECURSIVE")]
    recursive: bool,

    /// Module decoder program.
    #[arg(long, env = "MODSQUAD_XMP", default_value = "xmp")]
    xmp: String,

    /// Lossless encoder program.
    #[arg(long, env = "MODSQUAD_FLAC", default_value = "flac")]
    flac: String,

    /// Lossy encoder program.
    #[arg(long, env = "MODSQUAD_LAME", default_value = "lame")]
    lame: String,

    /// Directory for intermediate WAV files (default: system temp dir).
    #[arg(long, env = "MODSQUAD_TEMP_DIR")]
    temp_dir: Option<PathBuf>,

    /// Print the batch results as JSON when done.
    #[arg(long, env = "MODSQUAD_JSON")]
    json: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "MODSQUAD_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "MODSQUAD_QUIET")]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum FormatArg {
    Wav,
    Flac,
    Mp3,
}

impl From<FormatArg> for TargetFormat {
    fn from(v: FormatArg) -> Self {
        match v {
            FormatArg::Wav => TargetFormat::Wav,
            FormatArg::Flac => TargetFormat::Flac,
            FormatArg::Mp3 => TargetFormat::Mp3,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Build config ─────────────────────────────────────────────────────
    let progress_cb: Option<ProgressCallback> = if cli.json {
        None
    } else {
        let cb = Arc::new(CliProgressCallback { quiet: cli.quiet });
        Some(cb as Arc<dyn BatchProgressCallback>)
    };
    let config = build_config(&cli, progress_cb)?;

    // ── Interrupt cleanup ────────────────────────────────────────────────
    install_signal_handler(InterruptGuard::global());

    // ── Run batch ────────────────────────────────────────────────────────
    let output = run_batch(&cli.inputs, &config)
        .await
        .context("Batch conversion failed")?;

    if cli.json {
        let json = serde_json::to_string_pretty(&output).context("Failed to serialise output")?;
        println!("{json}");
    }

    Ok(())
}

/// Map CLI args to `BatchConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<BatchConfig> {
    let mut builder = BatchConfig::builder()
        .out_dir(&cli.out)
        .format(cli.format.into())
        .recursive(cli.recursive)
        .decoder(&cli.xmp)
        .lossless_encoder(&cli.flac)
        .lossy_encoder(&cli.lame);

    if let Some(ref dir) = cli.temp_dir {
        builder = builder.temp_dir(dir);
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}
