//! Live reload of post sources.
//!
//! A source is either one markdown file or a directory of posts. Events from
//! `notify` arrive on a channel and are polled by the event loop; a burst of
//! events is reported once after it has been quiet for the debounce period.

use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver};
use std::time::{Duration, Instant};

use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};

use crate::blog::is_markdown_path;

/// What a [`PostWatcher`] reacts to.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Target {
    /// A single post file, watched through its parent directory
    File { path: PathBuf, root: PathBuf },
    /// Every markdown file directly inside a directory
    Directory(PathBuf),
}

/// Watches a post file or posts directory and emits debounced changes.
pub struct PostWatcher {
    _watcher: RecommendedWatcher,
    rx: Receiver<notify::Result<Event>>,
    target: Target,
    debounce: Duration,
    pending_since: Option<Instant>,
}

impl PostWatcher {
    /// Start watching `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the watcher cannot be created or the path
    /// cannot be watched.
    pub fn new(path: impl AsRef<Path>, debounce: Duration) -> notify::Result<Self> {
        // Event paths are canonical, so ours must be too.
        let path = path
            .as_ref()
            .canonicalize()
            .unwrap_or_else(|_| path.as_ref().to_path_buf());
        let target = if path.is_dir() {
            Target::Directory(path)
        } else {
            let root = watch_root_for(&path);
            Target::File { path, root }
        };

        let (tx, rx) = mpsc::channel();
        let mut watcher = notify::recommended_watcher(move |res| {
            let _ = tx.send(res);
        })?;
        watcher.watch(target.root(), RecursiveMode::NonRecursive)?;
        tracing::debug!(?target, "watching post source");

        Ok(Self {
            _watcher: watcher,
            rx,
            target,
            debounce,
            pending_since: None,
        })
    }

    /// Returns true once a debounced change is ready.
    pub fn take_change_ready(&mut self) -> bool {
        let mut relevant = 0u32;
        let mut ignored = 0u32;
        while let Ok(event) = self.rx.try_recv() {
            match event {
                Ok(ev) if self.target.is_relevant(&ev) => relevant += 1,
                Ok(_) => ignored += 1,
                Err(err) => {
                    tracing::warn!(%err, "file watcher error");
                    crate::perf::log_event("watcher.error", err.to_string());
                }
            }
        }
        if relevant + ignored > 0 {
            crate::perf::log_event(
                "watcher.poll",
                format!("relevant={relevant} ignored={ignored} root={}", self.target.root().display()),
            );
        }
        if relevant > 0 {
            self.pending_since = Some(Instant::now());
        }

        match self.pending_since {
            Some(since) if since.elapsed() >= self.debounce => {
                self.pending_since = None;
                true
            }
            _ => false,
        }
    }
}

impl Target {
    fn root(&self) -> &Path {
        match self {
            Self::File { root, .. } => root,
            Self::Directory(dir) => dir,
        }
    }

    fn is_relevant(&self, event: &Event) -> bool {
        event.paths.iter().any(|changed| match self {
            // Some backends only report the directory.
            Self::File { path, root } => {
                changed == root
                    || changed == path
                    || path
                        .file_name()
                        .is_some_and(|name| changed.file_name() == Some(name))
            }
            Self::Directory(dir) => changed == dir || is_markdown_path(changed),
        })
    }
}

fn watch_root_for(path: &Path) -> PathBuf {
    path.parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf)
}
