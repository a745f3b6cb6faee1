//! Output path resolution.
//!
//! The destination of a job depends only on its relative path, the output
//! root and the target format. No filesystem access happens here, which is
//! what makes skip-if-exists a reliable resume check: the same input always
//! maps to the same output path, whatever order the walk visited it in.

use crate::config::TargetFormat;
use std::path::{Component, Path, PathBuf};

/// Compute the final output path for a job.
///
/// The original extension of `relative` is replaced with the format's
/// extension and the result is placed under `out_root`. Root, prefix and
/// `..` components of `relative` are dropped so the result can never escape
/// the output root.
pub fn resolve(relative: &Path, out_root: &Path, format: TargetFormat) -> PathBuf {
    let mut rel = PathBuf::new();
    for component in relative.components() {
        match component {
            Component::Normal(part) => rel.push(part),
            Component::CurDir
            | Component::ParentDir
            | Component::RootDir
            | Component::Prefix(_) => {}
        }
    }
    rel.set_extension(format.extension());
    out_root.join(rel)
}
