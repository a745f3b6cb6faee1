//! Input enumeration: turn user-supplied files and directories into jobs.
//!
//! Enumeration is lazy. Directory trees are walked one entry at a time as the
//! batch loop asks for the next job, so a huge library starts converting
//! immediately and an interrupted run has not stat'ed files it never reached.
//!
//! Every problem found here is non-fatal: a missing input, a directory given
//! without `--recursive`, or an unreadable entry deep in a tree is logged and
//! skipped, and enumeration moves on.

use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// One input module and where its output goes, relative to the output root.
///
/// `relative` keeps its original extension; [`super::resolve`] swaps it for
/// the target format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionJob {
    /// Path of the module file as found on disk.
    pub input: PathBuf,
    /// Output location relative to the output root.
    pub relative: PathBuf,
}

impl ConversionJob {
    pub fn new(input: impl Into<PathBuf>, relative: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            relative: relative.into(),
        }
    }
}

/// Enumerate the jobs for `inputs`, in the order given.
///
/// Files yield one job named after their base name. Directories are walked
/// depth-first in lexical order when `recursive` is set, and skipped otherwise.
pub fn enumerate<I, P>(inputs: I, recursive: bool) -> TreeWalker
where
    I: IntoIterator<Item = P>,
    P: Into<PathBuf>,
{
    TreeWalker {
        inputs: inputs
            .into_iter()
            .map(Into::into)
            .collect::<Vec<_>>()
            .into_iter(),
        recursive,
        current: None,
    }
}

/// Lazy iterator over [`ConversionJob`]s. Created by [`enumerate`].
pub struct TreeWalker {
    inputs: std::vec::IntoIter<PathBuf>,
    recursive: bool,
    current: Option<DirWalk>,
}

/// An in-progress walk of one directory input.
struct DirWalk {
    root: PathBuf,
    /// Folder name the walked subtree is placed under in the output.
    prefix: PathBuf,
    entries: walkdir::IntoIter,
}

impl DirWalk {
    fn new(root: PathBuf) -> Self {
        // `songs/` → `songs`. Roots without a name (`.`, `/`, `a/..`) place
        // their contents directly under the output root.
        let prefix = root
            .file_name()
            .map(PathBuf::from)
            .unwrap_or_default();
        let entries = WalkDir::new(&root).sort_by_file_name().into_iter();
        Self {
            root,
            prefix,
            entries,
        }
    }

    fn next_job(&mut self) -> Option<ConversionJob> {
        for entry in self.entries.by_ref() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    let at = e.path().unwrap_or(self.root.as_path()).display().to_string();
                    warn!("Error reading {}: {}", at, e);
                    continue;
                }
            };
            if entry.file_type().is_dir() {
                continue;
            }
            let path = entry.into_path();
            let rel = match path.strip_prefix(&self.root) {
                Ok(rel) => rel.to_path_buf(),
                Err(_) => path.file_name().map(PathBuf::from).unwrap_or_default(),
            };
            let relative = self.prefix.join(rel);
            debug!("Found {} -> {}", path.display(), relative.display());
            return Some(ConversionJob::new(path, relative));
        }
        None
    }
}

impl TreeWalker {
    fn start_input(&mut self, input: PathBuf) -> Option<ConversionJob> {
        let meta = match fs::metadata(&input) {
            Ok(meta) => meta,
            Err(e) => {
                warn!("Skipping {}: {}", input.display(), e);
                return None;
            }
        };

        if meta.is_dir() {
            if self.recursive {
                self.current = Some(DirWalk::new(input));
            } else {
                warn!("Skipping directory {} (use --recursive)", input.display());
            }
            return None;
        }

        if !meta.is_file() {
            warn!("Skipping {}: not a regular file", input.display());
            return None;
        }

        match base_name(&input) {
            Some(name) => Some(ConversionJob::new(input, name)),
            None => {
                warn!("Skipping {}: path has no file name", input.display());
                None
            }
        }
    }
}

impl Iterator for TreeWalker {
    type Item = ConversionJob;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(walk) = self.current.as_mut() {
                if let Some(job) = walk.next_job() {
                    return Some(job);
                }
                self.current = None;
            }

            let input = self.inputs.next()?;
            if let Some(job) = self.start_input(input) {
                return Some(job);
            }
        }
    }
}

fn base_name(path: &Path) -> Option<PathBuf> {
    path.file_name().map(PathBuf::from)
}
