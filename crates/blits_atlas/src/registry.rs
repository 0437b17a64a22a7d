//! Project registry: discovery plus file-to-project resolution.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use blits_carton::{is_within, normalize_path, FxHashMap};
use dashmap::DashMap;
use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use tokio::sync::OnceCell;
use tokio::task::JoinHandle;
use url::Url;

use crate::config::AtlasConfig;
use crate::host::WorkspaceHost;
use crate::manifest::{ManifestError, PackageManifest};
use crate::watcher::ChangeWatcher;

/// A discovered Blits project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    /// Normalized absolute directory holding the manifest.
    pub root: PathBuf,
    /// Manifest `name`, or the directory name when absent.
    pub name: String,
    /// Whether the companion formatter plugin is declared.
    pub has_formatter_plugin: bool,
}

/// Outcome of re-reading a manifest after a change event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManifestChange {
    Added(Project),
    Updated(Project),
    Removed(PathBuf),
    Unchanged,
}

/// Registry of Blits projects in a workspace.
///
/// Construct once per workspace and share the `Arc`; discovery and the
/// manifest watcher hold on to it.
pub struct ProjectRegistry {
    host: Arc<dyn WorkspaceHost>,
    config: AtlasConfig,
    /// Projects keyed by root
    projects: RwLock<FxHashMap<PathBuf, Project>>,
    /// Normalized file path -> owning project root
    file_cache: DashMap<PathBuf, Option<PathBuf>>,
    /// Bumped on every registry mutation
    generation: AtomicU64,
    discovery: OnceCell<()>,
    initiated: AtomicBool,
    completed: AtomicBool,
    watcher: Mutex<Option<JoinHandle<()>>>,
}

impl ProjectRegistry {
    pub fn new(host: Arc<dyn WorkspaceHost>, config: AtlasConfig) -> Arc<Self> {
        Arc::new(Self {
            host,
            config,
            projects: RwLock::new(FxHashMap::default()),
            file_cache: DashMap::new(),
            generation: AtomicU64::new(0),
            discovery: OnceCell::new(),
            initiated: AtomicBool::new(false),
            completed: AtomicBool::new(false),
            watcher: Mutex::new(None),
        })
    }

    pub fn config(&self) -> &AtlasConfig {
        &self.config
    }

    /// Discover projects in the workspace.
    ///
    /// The scan runs once; concurrent and later callers wait for that same
    /// run and get the current project set.
    pub async fn discover(self: &Arc<Self>) -> Vec<Project> {
        self.discovery.get_or_init(|| self.run_discovery()).await;
        self.projects()
    }

    /// Await discovery unless it already completed.
    pub async fn ensure_discovery_started(self: &Arc<Self>) {
        if !self.is_discovery_completed() {
            self.discover().await;
        }
    }

    /// Kick off discovery in the background without waiting for it.
    pub fn start_discovery(self: &Arc<Self>) {
        if self.initiated.swap(true, Ordering::SeqCst) {
            return;
        }

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let registry = Arc::clone(self);
                handle.spawn(async move {
                    registry.discover().await;
                });
            }
            Err(_) => {
                self.initiated.store(false, Ordering::SeqCst);
                tracing::debug!("no async runtime, discovery deferred");
            }
        }
    }

    pub fn is_discovery_completed(&self) -> bool {
        self.completed.load(Ordering::SeqCst)
    }

    async fn run_discovery(self: &Arc<Self>) {
        self.initiated.store(true, Ordering::SeqCst);

        let roots = self.host.roots();
        if roots.is_empty() {
            tracing::info!("no workspace roots, nothing to discover");
            return;
        }

        tracing::info!(roots = roots.len(), "discovering Blits projects");

        let mut root_project_found = false;
        for root in &roots {
            let root = normalize_path(root);
            let manifest_path = root.join(&self.config.manifest_name);
            if !self.host.exists(&manifest_path) {
                continue;
            }

            let manifest = self
                .host
                .read_to_string_sync(&manifest_path)
                .map_err(|source| ManifestError::Io {
                    path: manifest_path.clone(),
                    source,
                })
                .and_then(|text| parse_manifest(&manifest_path, &text));

            match manifest {
                Ok(manifest) if manifest.declares(&self.config.framework_dependency) => {
                    tracing::info!("found Blits project at workspace root {}", root.display());
                    self.insert_project(self.project_from(&root, &manifest));
                    root_project_found = true;
                }
                Ok(_) => {}
                Err(err) => tracing::warn!("skipping root manifest: {}", err),
            }
        }

        if root_project_found {
            tracing::debug!("workspace root is a project, skipping deep scan");
        } else {
            let manifests = self
                .host
                .find_files(
                    &self.config.manifest_glob(),
                    &self.config.exclude_glob(),
                    self.config.max_manifests,
                )
                .await;
            tracing::debug!(count = manifests.len(), "scanning manifests");

            for manifest_path in manifests {
                let Some(dir) = manifest_path.parent() else {
                    continue;
                };
                match self.load_manifest(&manifest_path).await {
                    Ok(manifest) if manifest.declares(&self.config.framework_dependency) => {
                        let root = normalize_path(dir);
                        tracing::info!("found Blits project at {}", root.display());
                        self.insert_project(self.project_from(&root, &manifest));
                    }
                    Ok(_) => {}
                    Err(err) => tracing::warn!("skipping manifest: {}", err),
                }
            }
        }

        self.completed.store(true, Ordering::SeqCst);
        self.start_watcher();

        tracing::info!(
            projects = self.projects.read().len(),
            "project discovery complete"
        );
    }

    fn start_watcher(self: &Arc<Self>) {
        let watch = match self
            .host
            .watch(&self.config.manifest_glob(), &self.config.exclude_glob())
        {
            Ok(watch) => watch,
            Err(err) => {
                tracing::warn!("manifest changes will not be tracked: {}", err);
                return;
            }
        };

        let handle = ChangeWatcher::new(Arc::downgrade(self), self.config.debounce()).spawn(watch);
        if let Some(previous) = self.watcher.lock().replace(handle) {
            previous.abort();
        }
    }

    /// Root of the innermost project containing `path`.
    ///
    /// Never waits for discovery. Until discovery completes the answer is
    /// provisional and is not cached.
    pub fn project_for_file(self: &Arc<Self>, path: &Path) -> Option<PathBuf> {
        let path = normalize_path(path);

        if let Some(hit) = self.file_cache.get(&path) {
            return hit.value().clone();
        }

        if !self.initiated.load(Ordering::SeqCst) {
            self.start_discovery();
        }

        let generation = self.generation.load(Ordering::SeqCst);
        let result = self.resolve(&path);

        if self.is_discovery_completed() && generation == self.generation.load(Ordering::SeqCst) {
            self.file_cache.insert(path, result.clone());
        }

        result
    }

    fn resolve(&self, path: &Path) -> Option<PathBuf> {
        let projects = self.projects.read();
        let mut roots: Vec<&PathBuf> = projects.keys().collect();
        roots.sort_by(|a, b| b.as_os_str().len().cmp(&a.as_os_str().len()));

        roots
            .into_iter()
            .find(|root| is_within(path, root))
            .cloned()
    }

    pub fn is_file_in_project(self: &Arc<Self>, path: &Path) -> bool {
        self.project_for_file(path).is_some()
    }

    /// Like [`Self::is_file_in_project`], but waits for discovery first.
    pub async fn is_file_in_project_async(self: &Arc<Self>, path: &Path) -> bool {
        self.ensure_discovery_started().await;
        self.project_for_file(path).is_some()
    }

    /// Only `file:` URIs can belong to a project.
    pub fn is_uri_in_project(self: &Arc<Self>, uri: &Url) -> bool {
        if uri.scheme() != "file" {
            return false;
        }
        match uri.to_file_path() {
            Ok(path) => self.is_file_in_project(&path),
            Err(()) => false,
        }
    }

    /// Whether the project owning `path` declares the formatter plugin.
    pub fn has_formatter_plugin(self: &Arc<Self>, path: &Path) -> bool {
        self.project_for_file(path)
            .and_then(|root| self.project(&root))
            .is_some_and(|project| project.has_formatter_plugin)
    }

    pub fn project(&self, root: &Path) -> Option<Project> {
        self.projects.read().get(root).cloned()
    }

    /// All known projects, ordered by root.
    pub fn projects(&self) -> Vec<Project> {
        let mut projects: Vec<Project> = self.projects.read().values().cloned().collect();
        projects.sort_by(|a, b| a.root.cmp(&b.root));
        projects
    }

    /// Re-read a manifest after a change event and update the registry.
    ///
    /// A manifest that can no longer be read or parsed removes its project.
    pub async fn apply_manifest_change(&self, manifest_path: &Path) -> ManifestChange {
        let Some(dir) = manifest_path.parent() else {
            return ManifestChange::Unchanged;
        };
        let root = normalize_path(dir);
        let was_project = self.projects.read().contains_key(&root);

        match self.load_manifest(manifest_path).await {
            Ok(manifest) if manifest.declares(&self.config.framework_dependency) => {
                let project = self.project_from(&root, &manifest);
                if !was_project {
                    tracing::info!("adding Blits project at {}", root.display());
                    self.insert_project(project.clone());
                    return ManifestChange::Added(project);
                }

                let mut projects = self.projects.write();
                if projects.get(&root) == Some(&project) {
                    ManifestChange::Unchanged
                } else {
                    tracing::debug!("updating Blits project at {}", root.display());
                    projects.insert(root, project.clone());
                    ManifestChange::Updated(project)
                }
            }
            Ok(_) if was_project => {
                tracing::info!("removing Blits project at {}", root.display());
                self.remove_project(&root);
                ManifestChange::Removed(root)
            }
            Ok(_) => ManifestChange::Unchanged,
            Err(err) if was_project => {
                tracing::warn!("{}, removing project", err);
                self.remove_project(&root);
                ManifestChange::Removed(root)
            }
            Err(err) => {
                tracing::debug!("ignoring manifest change: {}", err);
                ManifestChange::Unchanged
            }
        }
    }

    /// Drop every cached file lookup.
    pub fn clear_file_cache(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.file_cache.clear();
    }

    /// Number of cached file lookups.
    pub fn cached_lookups(&self) -> usize {
        self.file_cache.len()
    }

    /// Stop watching manifests.
    pub fn dispose(&self) {
        if let Some(handle) = self.watcher.lock().take() {
            handle.abort();
        }
        self.clear_file_cache();
    }

    fn insert_project(&self, project: Project) {
        self.projects.write().insert(project.root.clone(), project);
        self.clear_file_cache();
    }

    fn remove_project(&self, root: &Path) {
        self.projects.write().remove(root);
        self.clear_file_cache();
    }

    fn project_from(&self, root: &Path, manifest: &PackageManifest) -> Project {
        let name = manifest
            .name
            .clone()
            .or_else(|| {
                root.file_name()
                    .map(|name| name.to_string_lossy().into_owned())
            })
            .unwrap_or_else(|| root.display().to_string());

        Project {
            root: root.to_path_buf(),
            name,
            has_formatter_plugin: manifest.declares(&self.config.formatter_dependency),
        }
    }

    async fn load_manifest(&self, path: &Path) -> Result<PackageManifest, ManifestError> {
        let text = self
            .host
            .read_to_string(path)
            .await
            .map_err(|source| ManifestError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        parse_manifest(path, &text)
    }
}

impl Drop for ProjectRegistry {
    fn drop(&mut self) {
        if let Some(handle) = self.watcher.get_mut().take() {
            handle.abort();
        }
    }
}

fn parse_manifest(path: &Path, text: &str) -> Result<PackageManifest, ManifestError> {
    PackageManifest::parse(text).map_err(|source| ManifestError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
