//! Temp-artifact ownership and interrupt cleanup.
//!
//! Each job decodes into one intermediate WAV file. Two mechanisms make sure
//! it never outlives the job:
//!
//! * [`TempArtifact`] owns the file for the duration of the job and deletes it
//!   on drop, whichever way the job ends (success, failed tool, early return).
//! * [`InterruptGuard`] is a single shared slot naming the artifact currently
//!   in flight. The signal listener installed by [`install_signal_handler`]
//!   reads it once on SIGINT/SIGTERM, deletes the file and exits. Drop-based
//!   cleanup cannot help there because `process::exit` runs no destructors.
//!
//! Jobs run strictly one at a time, so one slot is enough. Processing jobs in
//! parallel would need a slot per worker.

use once_cell::sync::Lazy;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tempfile::TempPath;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Exit status used when the batch is interrupted.
pub const INTERRUPTED_EXIT_CODE: i32 = 1;

static GLOBAL_GUARD: Lazy<Arc<InterruptGuard>> = Lazy::new(|| Arc::new(InterruptGuard::new()));

/// Single-slot registry of the temp artifact currently in flight.
///
/// Also carries the interrupted flag: once set, the batch loop starts no
/// further jobs.
#[derive(Debug, Default)]
pub struct InterruptGuard {
    slot: Mutex<Option<PathBuf>>,
    interrupted: AtomicBool,
}

impl InterruptGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide guard watched by the signal listener.
    pub fn global() -> Arc<InterruptGuard> {
        Arc::clone(&GLOBAL_GUARD)
    }

    /// Record `path` as the artifact in flight, replacing any previous one.
    pub fn register(&self, path: impl Into<PathBuf>) {
        *self.lock() = Some(path.into());
    }

    /// Forget the artifact in flight.
    pub fn clear(&self) {
        *self.lock() = None;
    }

    /// The artifact currently registered, if any.
    pub fn current(&self) -> Option<PathBuf> {
        self.lock().clone()
    }

    /// Delete the registered artifact, ignoring deletion errors.
    ///
    /// Returns the path that was registered. Called from the signal listener
    /// right before the process exits.
    pub fn cleanup(&self) -> Option<PathBuf> {
        let path = self.lock().take()?;
        if let Err(e) = fs::remove_file(&path) {
            if e.kind() != io::ErrorKind::NotFound {
                warn!("Failed to remove {}: {}", path.display(), e);
            }
        }
        Some(path)
    }

    /// Mark the batch as interrupted, then delete the registered artifact.
    pub fn interrupt(&self) -> Option<PathBuf> {
        self.interrupted.store(true, Ordering::SeqCst);
        self.cleanup()
    }

    /// Whether [`interrupt`](Self::interrupt) has been called.
    pub fn is_interrupted(&self) -> bool {
        self.interrupted.load(Ordering::SeqCst)
    }

    // A panic while holding the lock must not stop the interrupt path from
    // reading the slot.
    fn lock(&self) -> MutexGuard<'_, Option<PathBuf>> {
        self.slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Spawn the listener that cleans up and exits on SIGINT or SIGTERM.
///
/// Must be called from within a tokio runtime. The signal handlers are
/// registered before this returns, so a signal arriving right after is not
/// missed. From then on the default Ctrl-C behaviour is replaced for the
/// rest of the process lifetime.
pub fn install_signal_handler(guard: Arc<InterruptGuard>) -> JoinHandle<()> {
    let interrupt = Interrupt::listen();
    tokio::spawn(async move {
        interrupt.recv().await;
        warn!("Interrupted, cleaning up...");
        if let Some(path) = guard.interrupt() {
            debug!("Removed {}", path.display());
        }
        std::process::exit(INTERRUPTED_EXIT_CODE);
    })
}

/// Registered SIGINT/SIGTERM listeners.
#[cfg(unix)]
struct Interrupt {
    int: Option<tokio::signal::unix::Signal>,
    term: Option<tokio::signal::unix::Signal>,
}

#[cfg(unix)]
impl Interrupt {
    fn listen() -> Self {
        use tokio::signal::unix::{signal, SignalKind};
        let int = signal(SignalKind::interrupt())
            .map_err(|e| warn!(error = %e, "failed to install CTRL+C signal handler"))
            .ok();
        let term = signal(SignalKind::terminate())
            .map_err(|e| warn!(error = %e, "failed to install SIGTERM handler"))
            .ok();
        Self { int, term }
    }

    /// Resolves on the first SIGINT or SIGTERM.
    async fn recv(self) {
        let Interrupt { mut int, mut term } = self;
        let on_int = async {
            match int.as_mut() {
                Some(s) => {
                    s.recv().await;
                }
                None => std::future::pending::<()>().await,
            }
        };
        let on_term = async {
            match term.as_mut() {
                Some(s) => {
                    s.recv().await;
                }
                None => std::future::pending::<()>().await,
            }
        };
        tokio::select! {
            _ = on_int => {}
            _ = on_term => {}
        }
    }
}

#[cfg(not(unix))]
struct Interrupt;

#[cfg(not(unix))]
impl Interrupt {
    fn listen() -> Self {
        Interrupt
    }

    async fn recv(self) {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to install CTRL+C signal handler");
            std::future::pending::<()>().await;
        }
    }
}

/// The intermediate WAV file of one job.
///
/// Created empty with a unique `modsquad-*.wav` name and registered with the
/// guard. Dropping it deletes the file (a file that was already moved away is
/// fine) and then clears the guard's slot.
pub struct TempArtifact {
    path: Option<TempPath>,
    guard: Arc<InterruptGuard>,
}

impl TempArtifact {
    /// Create the file in `dir`, or the system temp directory when `None`.
    pub fn create(dir: Option<&Path>, guard: Arc<InterruptGuard>) -> io::Result<Self> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("modsquad-").suffix(".wav");
        let file = match dir {
            Some(dir) => builder.tempfile_in(dir)?,
            None => builder.tempfile()?,
        };
        // Close the handle; the decoder reopens the path itself.
        let path = file.into_temp_path();
        guard.register(path.to_path_buf());
        debug!("Created temp artifact {}", path.display());
        Ok(Self {
            path: Some(path),
            guard,
        })
    }

    pub fn path(&self) -> &Path {
        self.path.as_deref().unwrap_or_else(|| Path::new(""))
    }

    /// Move the artifact to `dest`, handing over ownership of the file.
    ///
    /// Falls back to copy-and-delete when `dest` is on another filesystem.
    /// The copy is staged next to `dest` and renamed into place, so a failed
    /// copy never leaves a partial file at `dest`.
    pub fn persist(mut self, dest: &Path) -> io::Result<()> {
        let Some(path) = self.path.take() else {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                "temp artifact already released",
            ));
        };
        match path.persist(dest) {
            Ok(()) => Ok(()),
            Err(err) => {
                let path = err.path;
                let rename_err = err.error;
                if is_cross_device(&rename_err) {
                    debug!("Rename across filesystems, copying {} instead", path.display());
                    let copied = copy_into_place(&path, dest);
                    self.path = Some(path);
                    copied
                } else {
                    self.path = Some(path);
                    Err(rename_err)
                }
            }
        }
    }
}

impl Drop for TempArtifact {
    fn drop(&mut self) {
        // Delete before clearing so the signal listener never sees an empty
        // slot while the file still exists.
        if let Some(path) = self.path.take() {
            let shown = path.to_path_buf();
            if let Err(e) = path.close() {
                if e.kind() != io::ErrorKind::NotFound {
                    warn!("Failed to remove {}: {}", shown.display(), e);
                }
            }
        }
        self.guard.clear();
    }
}

fn is_cross_device(e: &io::Error) -> bool {
    e.kind() == io::ErrorKind::CrossesDevices
}

/// Copy `src` to a hidden temp file beside `dest`, then rename it over `dest`.
///
/// On failure the staged file is dropped and deleted; `dest` is untouched.
fn copy_into_place(src: &Path, dest: &Path) -> io::Result<()> {
    let parent = match dest.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut staged = tempfile::Builder::new()
        .prefix(".modsquad-")
        .suffix(".part")
        .tempfile_in(parent)?;
    let mut source = fs::File::open(src)?;
    io::copy(&mut source, staged.as_file_mut())?;
    staged.as_file().sync_all()?;
    staged.persist(dest).map_err(|e| e.error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn register_and_clear() {
        let guard = InterruptGuard::new();
        assert_eq!(guard.current(), None);
        guard.register("/tmp/x.wav");
        assert_eq!(guard.current(), Some(PathBuf::from("/tmp/x.wav")));
        guard.clear();
        assert_eq!(guard.current(), None);
    }

    #[test]
    fn cleanup_removes_registered_file() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("modsquad-1.wav");
        fs::write(&file, b"RIFF").unwrap();

        let guard = InterruptGuard::new();
        guard.register(&file);
        assert_eq!(guard.cleanup(), Some(file.clone()));
        assert!(!file.exists());
        assert_eq!(guard.current(), None);
    }

    #[test]
    fn cleanup_tolerates_missing_file_and_empty_slot() {
        let guard = InterruptGuard::new();
        assert_eq!(guard.cleanup(), None);
        guard.register("/definitely/not/here.wav");
        assert_eq!(
            guard.cleanup(),
            Some(PathBuf::from("/definitely/not/here.wav"))
        );
    }

    #[test]
    fn artifact_registers_and_cleans_up_on_drop() {
        let dir = TempDir::new().unwrap();
        let guard = Arc::new(InterruptGuard::new());

        let artifact = TempArtifact::create(Some(dir.path()), Arc::clone(&guard)).unwrap();
        let path = artifact.path().to_path_buf();
        assert!(path.exists());
        assert_eq!(fs::metadata(&path).unwrap().len(), 0);
        assert_eq!(guard.current(), Some(path.clone()));
        let name = path.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with("modsquad-") && name.ends_with(".wav"), "{name}");

        drop(artifact);
        assert!(!path.exists());
        assert_eq!(guard.current(), None);
    }

    #[test]
    fn drop_tolerates_file_deleted_elsewhere() {
        let dir = TempDir::new().unwrap();
        let guard = Arc::new(InterruptGuard::new());
        let artifact = TempArtifact::create(Some(dir.path()), Arc::clone(&guard)).unwrap();
        fs::remove_file(artifact.path()).unwrap();
        drop(artifact);
        assert_eq!(guard.current(), None);
    }

    #[test]
    fn persist_moves_file_and_clears_slot() {
        let dir = TempDir::new().unwrap();
        let guard = Arc::new(InterruptGuard::new());
        let artifact = TempArtifact::create(Some(dir.path()), Arc::clone(&guard)).unwrap();
        let src = artifact.path().to_path_buf();
        fs::write(&src, b"RIFF....WAVE").unwrap();

        let dest = dir.path().join("final.wav");
        artifact.persist(&dest).unwrap();
        assert!(!src.exists());
        assert_eq!(fs::read(&dest).unwrap(), b"RIFF....WAVE");
        assert_eq!(guard.current(), None);
    }

    #[test]
    fn failed_persist_still_cleans_up() {
        let dir = TempDir::new().unwrap();
        let guard = Arc::new(InterruptGuard::new());
        let artifact = TempArtifact::create(Some(dir.path()), Arc::clone(&guard)).unwrap();
        let src = artifact.path().to_path_buf();

        let dest = dir.path().join("no/such/dir/final.wav");
        assert!(artifact.persist(&dest).is_err());
        assert!(!src.exists());
        assert_eq!(guard.current(), None);
    }

    #[test]
    fn interrupt_sets_flag_and_removes_file() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("modsquad-2.wav");
        fs::write(&file, b"RIFF").unwrap();

        let guard = InterruptGuard::new();
        guard.register(&file);
        assert!(!guard.is_interrupted());
        assert_eq!(guard.interrupt(), Some(file.clone()));
        assert!(guard.is_interrupted());
        assert!(!file.exists());
    }

    #[test]
    fn copy_into_place_writes_complete_file() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("src.wav");
        fs::write(&src, vec![7u8; 100_000]).unwrap();
        let dest = dir.path().join("out/final.wav");
        fs::create_dir_all(dest.parent().unwrap()).unwrap();

        copy_into_place(&src, &dest).unwrap();
        assert_eq!(fs::read(&dest).unwrap(), vec![7u8; 100_000]);
        assert_eq!(fs::read_dir(dest.parent().unwrap()).unwrap().count(), 1);
    }

    #[test]
    fn failed_copy_leaves_nothing_at_destination() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("out");
        fs::create_dir_all(&out).unwrap();
        let dest = out.join("final.wav");

        // Reading a directory fails after the staged file already exists.
        let src = dir.path().join("not-a-file");
        fs::create_dir_all(&src).unwrap();
        assert!(copy_into_place(&src, &dest).is_err());
        assert!(!dest.exists());
        assert_eq!(fs::read_dir(&out).unwrap().count(), 0);

        assert!(copy_into_place(&dir.path().join("missing.wav"), &dest).is_err());
        assert!(!dest.exists());
        assert_eq!(fs::read_dir(&out).unwrap().count(), 0);
    }

    /// A directory on a different filesystem from the default temp dir.
    #[cfg(unix)]
    fn other_filesystem(than: &Path) -> Option<TempDir> {
        use std::os::unix::fs::MetadataExt;
        let shm = Path::new("/dev/shm");
        let other = TempDir::new_in(shm).ok()?;
        let a = fs::metadata(than).ok()?.dev();
        let b = fs::metadata(other.path()).ok()?.dev();
        (a != b).then_some(other)
    }

    #[cfg(unix)]
    #[test]
    fn persist_across_filesystems_copies_and_cleans_up() {
        let out = TempDir::new().unwrap();
        let Some(tmp) = other_filesystem(out.path()) else {
            eprintln!("skipping: no second filesystem available");
            return;
        };
        let guard = Arc::new(InterruptGuard::new());
        let artifact = TempArtifact::create(Some(tmp.path()), Arc::clone(&guard)).unwrap();
        let src = artifact.path().to_path_buf();
        fs::write(&src, vec![1u8; 50_000]).unwrap();

        let dest = out.path().join("tune.wav");
        artifact.persist(&dest).unwrap();
        assert_eq!(fs::read(&dest).unwrap(), vec![1u8; 50_000]);
        assert!(!src.exists());
        assert_eq!(fs::read_dir(tmp.path()).unwrap().count(), 0);
        assert_eq!(fs::read_dir(out.path()).unwrap().count(), 1);
        assert_eq!(guard.current(), None);
    }

    #[test]
    fn global_guard_is_shared() {
        assert!(Arc::ptr_eq(&InterruptGuard::global(), &InterruptGuard::global()));
    }
}
