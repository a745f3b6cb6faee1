//! Configuration types for a batch conversion run.
//!
//! All batch behaviour is controlled through [`BatchConfig`], built via its
//! [`BatchConfigBuilder`]. Every knob lives in one struct so a run can be
//! logged, diffed against another run, or rebuilt in a test with a single
//! field changed.

use crate::error::ModsquadError;
use crate::progress::ProgressCallback;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Arguments passed to the lossy encoder ahead of the input/output paths:
/// variable bitrate, quality level 6.
pub const LOSSY_QUALITY_ARGS: [&str; 3] = ["--vbr-new", "-V", "6"];

/// Configuration for a batch conversion.
///
/// Built via [`BatchConfig::builder()`] or using [`BatchConfig::default()`].
///
/// # Example
/// ```rust
/// use modsquad::{BatchConfig, TargetFormat};
///
/// let config = BatchConfig::builder()
///     .out_dir("exports")
///     .format(TargetFormat::Flac)
///     .recursive(true)
///     .build()
///     .unwrap();
/// assert_eq!(config.format.extension(), "flac");
/// ```
#[derive(Clone)]
pub struct BatchConfig {
    /// Root directory that receives every output file. Default: `out`.
    ///
    /// Created before the first job if absent. Because outputs are only ever
    /// written here and skipped when present, this tree doubles as the
    /// resume record for interrupted runs.
    pub out_dir: PathBuf,

    /// Output format. Default: [`TargetFormat::Mp3`].
    pub format: TargetFormat,

    /// Walk directories given as inputs. Default: false.
    ///
    /// Without it, directory inputs are skipped with a warning.
    pub recursive: bool,

    /// External programs used for decoding and encoding.
    pub tools: ToolSet,

    /// Directory for the intermediate WAV files. `None` uses the system
    /// temp directory.
    pub temp_dir: Option<PathBuf>,

    /// Optional per-job event sink.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            out_dir: PathBuf::from("out"),
            format: TargetFormat::default(),
            recursive: false,
            tools: ToolSet::default(),
            temp_dir: None,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for BatchConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BatchConfig")
            .field("out_dir", &self.out_dir)
            .field("format", &self.format)
            .field("recursive", &self.recursive)
            .field("tools", &self.tools)
            .field("temp_dir", &self.temp_dir)
            .field(
                "progress_callback",
                &self
                    .progress_callback
                    .as_ref()
                    .map(|_| "<dyn BatchProgressCallback>"),
            )
            .finish()
    }
}

impl BatchConfig {
    /// Create a new builder for `BatchConfig`.
    pub fn builder() -> BatchConfigBuilder {
        BatchConfigBuilder {
            config: Self::default(),
        }
    }

    /// Programs that must be resolvable before any job runs.
    pub fn required_tools(&self) -> Vec<&str> {
        self.format.required_tools(&self.tools)
    }
}

/// Builder for [`BatchConfig`].
#[derive(Debug)]
pub struct BatchConfigBuilder {
    config: BatchConfig,
}

impl BatchConfigBuilder {
    pub fn out_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.out_dir = dir.into();
        self
    }

    pub fn format(mut self, format: TargetFormat) -> Self {
        self.config.format = format;
        self
    }

    pub fn recursive(mut self, v: bool) -> Self {
        self.config.recursive = v;
        self
    }

    pub fn tools(mut self, tools: ToolSet) -> Self {
        self.config.tools = tools;
        self
    }

    pub fn decoder(mut self, program: impl Into<String>) -> Self {
        self.config.tools.decoder = program.into();
        self
    }

    pub fn lossless_encoder(mut self, program: impl Into<String>) -> Self {
        self.config.tools.lossless = program.into();
        self
    }

    pub fn lossy_encoder(mut self, program: impl Into<String>) -> Self {
        self.config.tools.lossy = program.into();
        self
    }

    pub fn temp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.temp_dir = Some(dir.into());
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<BatchConfig, ModsquadError> {
        let c = &self.config;
        if c.out_dir.as_os_str().is_empty() {
            return Err(ModsquadError::InvalidConfig(
                "Output directory must not be empty".into(),
            ));
        }
        for tool in c.required_tools() {
            if tool.trim().is_empty() {
                return Err(ModsquadError::InvalidConfig(format!(
                    "Tool name for {} output must not be empty",
                    c.format
                )));
            }
        }
        Ok(self.config)
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// Output audio format.
///
/// Decides which encoder (if any) runs after decoding and which extension
/// the output file gets.
///
/// | Format | Encoder | Notes |
/// |--------|---------|-------|
/// | `wav`  | none    | decoded file is moved into place |
/// | `flac` | flac    | lossless |
/// | `mp3`  | lame    | VBR quality 6 (default) |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetFormat {
    Wav,
    Flac,
    #[default]
    Mp3,
}

impl TargetFormat {
    /// All formats, in the order they are listed to users.
    pub const ALL: [TargetFormat; 3] = [TargetFormat::Wav, TargetFormat::Flac, TargetFormat::Mp3];

    /// File extension (without the dot), identical to the format name.
    pub fn extension(self) -> &'static str {
        match self {
            TargetFormat::Wav => "wav",
            TargetFormat::Flac => "flac",
            TargetFormat::Mp3 => "mp3",
        }
    }

    /// Decoder first, then this format's encoder.
    pub fn required_tools(self, tools: &ToolSet) -> Vec<&str> {
        let mut required = vec![tools.decoder.as_str()];
        match self {
            TargetFormat::Wav => {}
            TargetFormat::Flac => required.push(tools.lossless.as_str()),
            TargetFormat::Mp3 => required.push(tools.lossy.as_str()),
        }
        required
    }
}

impl fmt::Display for TargetFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for TargetFormat {
    type Err = ModsquadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        TargetFormat::ALL
            .into_iter()
            .find(|f| f.extension() == wanted)
            .ok_or_else(|| ModsquadError::UnknownFormat {
                format: s.to_string(),
            })
    }
}

/// Names (or paths) of the external programs the pipeline delegates to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolSet {
    /// Module decoder, invoked as `decoder -o <wav> <input>`. Default: `xmp`.
    pub decoder: String,
    /// Lossless encoder, invoked as `lossless -o <output> <wav>`. Default: `flac`.
    pub lossless: String,
    /// Lossy encoder, invoked as `lossy --vbr-new -V 6 <wav> <output>`. Default: `lame`.
    pub lossy: String,
}

impl Default for ToolSet {
    fn default() -> Self {
        Self {
            decoder: "xmp".to_string(),
            lossless: "flac".to_string(),
            lossy: "lame".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_cli_defaults() {
        let c = BatchConfig::default();
        assert_eq!(c.out_dir, PathBuf::from("out"));
        assert_eq!(c.format, TargetFormat::Mp3);
        assert!(!c.recursive);
        assert!(c.temp_dir.is_none());
        assert_eq!(c.tools.decoder, "xmp");
    }

    #[test]
    fn parse_format_case_insensitive() {
        assert_eq!("wav".parse::<TargetFormat>().unwrap(), TargetFormat::Wav);
        assert_eq!("FLAC".parse::<TargetFormat>().unwrap(), TargetFormat::Flac);
        assert_eq!(" Mp3 ".parse::<TargetFormat>().unwrap(), TargetFormat::Mp3);
    }

    #[test]
    fn parse_unknown_format_is_error() {
        let err = "ogg".parse::<TargetFormat>().unwrap_err();
        assert!(matches!(err, ModsquadError::UnknownFormat { ref format } if format == "ogg"));
    }

    #[test]
    fn display_matches_extension() {
        for f in TargetFormat::ALL {
            assert_eq!(f.to_string(), f.extension());
        }
    }

    #[test]
    fn required_tools_per_format() {
        let tools = ToolSet::default();
        assert_eq!(TargetFormat::Wav.required_tools(&tools), vec!["xmp"]);
        assert_eq!(TargetFormat::Flac.required_tools(&tools), vec!["xmp", "flac"]);
        assert_eq!(TargetFormat::Mp3.required_tools(&tools), vec!["xmp", "lame"]);
    }

    #[test]
    fn builder_rejects_empty_out_dir() {
        let err = BatchConfig::builder().out_dir("").build().unwrap_err();
        assert!(matches!(err, ModsquadError::InvalidConfig(_)));
    }

    #[test]
    fn builder_rejects_empty_required_tool() {
        let err = BatchConfig::builder()
            .format(TargetFormat::Flac)
            .lossless_encoder("  ")
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("flac"));
    }

    #[test]
    fn builder_ignores_unused_empty_tool() {
        // wav never runs an encoder, so an empty encoder name is harmless
        let config = BatchConfig::builder()
            .format(TargetFormat::Wav)
            .lossy_encoder("")
            .build()
            .expect("valid config");
        assert_eq!(config.required_tools(), vec!["xmp"]);
    }

    #[test]
    fn format_serialises_lowercase() {
        let json = serde_json::to_string(&TargetFormat::Flac).unwrap();
        assert_eq!(json, "\"flac\"");
    }
}
