//! Workspace capabilities the registry consumes.
//!
//! The registry never touches the file system directly; it goes through a
//! [`WorkspaceHost`]. [`crate::NativeHost`] backs it with the real file
//! system and [`crate::MemoryHost`] keeps everything in memory.

use std::any::Any;
use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use glob::{MatchOptions, Pattern};
use tokio::sync::mpsc::UnboundedReceiver;

/// Errors setting up host capabilities.
#[derive(Debug, thiserror::Error)]
pub enum HostError {
    #[error("invalid glob pattern: {0}")]
    Pattern(#[from] glob::PatternError),
    #[error("failed to watch workspace: {0}")]
    Watch(#[from] notify::Error),
}

/// A manifest file changed on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchEvent {
    Created(PathBuf),
    Changed(PathBuf),
    Deleted(PathBuf),
}

impl WatchEvent {
    pub fn path(&self) -> &Path {
        match self {
            Self::Created(path) | Self::Changed(path) | Self::Deleted(path) => path,
        }
    }
}

/// Live subscription to manifest events. Dropping it stops the watch.
pub struct ManifestWatch {
    pub events: UnboundedReceiver<WatchEvent>,
    _guard: Box<dyn Any + Send>,
}

impl ManifestWatch {
    /// Wrap a receiver together with whatever keeps the watch alive.
    pub fn new<G>(events: UnboundedReceiver<WatchEvent>, guard: G) -> Self
    where
        G: Any + Send,
    {
        Self {
            events,
            _guard: Box::new(guard),
        }
    }
}

/// Workspace enumeration, file I/O and watching.
#[async_trait]
pub trait WorkspaceHost: Send + Sync {
    /// Workspace root directories.
    fn roots(&self) -> Vec<PathBuf>;

    /// Files under any root matching `include` and not `exclude`, at most
    /// `limit` of them. Patterns are relative to the root.
    async fn find_files(&self, include: &str, exclude: &str, limit: usize) -> Vec<PathBuf>;

    async fn read_to_string(&self, path: &Path) -> io::Result<String>;

    fn read_to_string_sync(&self, path: &Path) -> io::Result<String>;

    fn exists(&self, path: &Path) -> bool;

    /// Subscribe to create/change/delete events for files matching
    /// `include` and not `exclude`.
    fn watch(&self, include: &str, exclude: &str) -> Result<ManifestWatch, HostError>;
}

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// Include/exclude glob pair evaluated against root-relative paths.
#[derive(Debug, Clone)]
pub struct GlobFilter {
    include: Pattern,
    exclude: Pattern,
}

impl GlobFilter {
    pub fn new(include: &str, exclude: &str) -> Result<Self, glob::PatternError> {
        Ok(Self {
            include: Pattern::new(include)?,
            exclude: Pattern::new(exclude)?,
        })
    }

    /// Whether a root-relative file path is selected.
    pub fn matches(&self, relative: &Path) -> bool {
        self.include.matches_path_with(relative, MATCH_OPTIONS)
            && !self.exclude.matches_path_with(relative, MATCH_OPTIONS)
    }

    /// Whether a root-relative directory can be skipped entirely, i.e.
    /// anything directly inside it would be excluded.
    pub fn prunes_dir(&self, relative: &Path) -> bool {
        !relative.as_os_str().is_empty()
            && self
                .exclude
                .matches_path_with(&relative.join("_"), MATCH_OPTIONS)
    }

    /// Whether an absolute path is selected relative to any of `roots`.
    pub fn matches_under(&self, roots: &[PathBuf], path: &Path) -> bool {
        roots.iter().any(|root| {
            path.strip_prefix(root)
                .map(|relative| self.matches(relative))
                .unwrap_or(false)
        })
    }
}
