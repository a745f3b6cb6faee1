//! Pipeline stages for batch module conversion.
//!
//! Each submodule implements exactly one piece of the batch. Keeping them
//! separate makes each independently testable: path resolution is pure, the
//! walker only touches directory metadata, and only [`tool`] spawns processes.
//!
//! ## Data Flow
//!
//! ```text
//! inputs ──▶ walk ──▶ job ──▶ resolve ──▶ guard ──▶ tool (decode) ──▶ tool (encode) / rename
//!           (lazy)   (one at a time)     (temp wav)
//! ```
//!
//! 1. [`walk`]    — expand files and directories into [`walk::ConversionJob`]s
//! 2. [`resolve`] — map a job to its deterministic output path
//! 3. [`guard`]   — own the intermediate WAV and clean it up on exit or signal
//! 4. [`tool`]    — run one external program with inherited stdio
//! 5. [`job`]     — tie the steps together for a single job

pub mod guard;
pub mod job;
pub mod resolve;
pub mod tool;
pub mod walk;
