//! Shared fixtures: a scratch directory with fake xmp/flac/lame scripts.
//!
//! The fake decoder copies the module bytes into the WAV path it is given
//! and appends one line per call to `calls.log`. Inputs whose name contains
//! `fail` make it exit 1 after writing partial output.

#![allow(dead_code)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub struct Sandbox {
    dir: TempDir,
}

impl Sandbox {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("tempdir");
        for sub in ["bin", "tmp"] {
            fs::create_dir_all(dir.path().join(sub)).unwrap();
        }
        let sb = Self { dir };
        let log = sb.log_path();
        sb.tool(
            "xmp",
            &format!(
                r#"echo "xmp $3" >> "{log}"
case "$3" in *fail*) echo partial > "$2"; exit 1;; esac
cp "$3" "$2""#,
                log = log.display()
            ),
        );
        sb.tool(
            "flac",
            &format!(
                r#"echo "flac $3" >> "{log}"
cp "$3" "$2""#,
                log = log.display()
            ),
        );
        sb.tool(
            "lame",
            &format!(
                r#"echo "lame $1 $2 $3" >> "{log}"
cp "$4" "$5""#,
                log = log.display()
            ),
        );
        sb
    }

    pub fn path(&self, rel: &str) -> PathBuf {
        self.dir.path().join(rel)
    }

    pub fn bin(&self) -> PathBuf {
        self.path("bin")
    }

    pub fn tmp(&self) -> PathBuf {
        self.path("tmp")
    }

    pub fn log_path(&self) -> PathBuf {
        self.path("calls.log")
    }

    /// Write an executable script named `name` into `bin/`.
    pub fn tool(&self, name: &str, body: &str) -> PathBuf {
        let path = self.bin().join(name);
        fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    pub fn tool_str(&self, name: &str) -> String {
        self.bin().join(name).to_string_lossy().into_owned()
    }

    /// Create a module file with its own relative path as content.
    pub fn module(&self, rel: &str) -> PathBuf {
        let path = self.path(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, rel.as_bytes()).unwrap();
        path
    }

    /// Every tool call so far, one line each.
    pub fn calls(&self) -> Vec<String> {
        fs::read_to_string(self.log_path())
            .map(|s| s.lines().map(str::to_string).collect())
            .unwrap_or_default()
    }

    pub fn tmp_entries(&self) -> Vec<PathBuf> {
        list(&self.tmp())
    }

    /// `PATH` with the fake tools first.
    pub fn path_env(&self) -> String {
        let system = std::env::var("PATH").unwrap_or_else(|_| "/usr/bin:/bin".into());
        format!("{}:{}", self.bin().display(), system)
    }
}

pub fn list(dir: &Path) -> Vec<PathBuf> {
    let mut entries: Vec<PathBuf> = fs::read_dir(dir)
        .map(|rd| rd.filter_map(|e| e.ok()).map(|e| e.path()).collect())
        .unwrap_or_default();
    entries.sort();
    entries
}
