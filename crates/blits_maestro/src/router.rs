//! Per-project script engine routing.
//!
//! One engine runs per Blits project that currently has an open document.
//! Engines are created on first use and shut down as soon as their project
//! has nothing open, so background projects never cost a process.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use blits_atlas::ProjectRegistry;
use blits_canon::{ScriptEngine, ScriptEngineFactory, StubEngine};
use blits_carton::hash::content_hash;
use blits_carton::{contains_component, FxHashMap, FxHashSet};
use dashmap::DashMap;
use parking_lot::{Mutex, RwLock};
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::OnceCell;

use crate::document::{DocumentEvent, DocumentStore};
use crate::virtual_code::document_path;

/// Directories whose files are never analyzed, besides the dependency cache.
const IGNORED_DIRS: &[&str] = &[".git", ".vscode"];

/// Engine slot of one project. Only callers for the same root wait on its start.
type EngineCell = Arc<OnceCell<Arc<dyn ScriptEngine>>>;

/// What the router last sent for a virtual document.
#[derive(Debug, Clone)]
struct SyncedDocument {
    root: PathBuf,
    hash: String,
}

/// Routes script queries to the engine of the owning project.
pub struct ScriptServiceRouter {
    registry: Arc<ProjectRegistry>,
    documents: Arc<DocumentStore>,
    factory: Arc<dyn ScriptEngineFactory>,
    /// Projects with at least one open document
    active: RwLock<FxHashSet<PathBuf>>,
    engines: Mutex<FxHashMap<PathBuf, EngineCell>>,
    /// Roots whose engine failed to start; retried once the project goes idle
    failed: RwLock<FxHashSet<PathBuf>>,
    synced: DashMap<String, SyncedDocument>,
    listening: AtomicBool,
    stub: Arc<StubEngine>,
}

impl ScriptServiceRouter {
    pub fn new(
        registry: Arc<ProjectRegistry>,
        documents: Arc<DocumentStore>,
        factory: Arc<dyn ScriptEngineFactory>,
    ) -> Arc<Self> {
        Arc::new(Self {
            registry,
            documents,
            factory,
            active: RwLock::new(FxHashSet::default()),
            engines: Mutex::new(FxHashMap::default()),
            failed: RwLock::new(FxHashSet::default()),
            synced: DashMap::new(),
            listening: AtomicBool::new(false),
            stub: Arc::new(StubEngine::new()),
        })
    }

    /// Recompute which projects have open documents and shut down engines
    /// of projects that no longer do.
    pub async fn refresh_active_projects(&self) {
        let mut active = FxHashSet::default();
        for uri in self.documents.uris() {
            if uri.scheme() != "file" {
                continue;
            }
            let Ok(path) = uri.to_file_path() else {
                continue;
            };
            if let Some(root) = self.registry.project_for_file(&path) {
                active.insert(root);
            }
        }

        tracing::debug!(projects = active.len(), "active projects with open files");
        self.failed.write().retain(|root| active.contains(root));
        *self.active.write() = active;

        let idle: Vec<(PathBuf, EngineCell)> = {
            let mut engines = self.engines.lock();
            let active = self.active.read();
            let roots: Vec<PathBuf> = engines
                .keys()
                .filter(|root| !active.contains(*root))
                .cloned()
                .collect();
            roots
                .into_iter()
                .filter_map(|root| engines.remove(&root).map(|cell| (root, cell)))
                .collect()
        };

        for (root, cell) in idle {
            self.synced.retain(|_, synced| synced.root != root);
            if let Some(engine) = cell.get() {
                tracing::info!("disposing script engine for inactive project {}", root.display());
                engine.shutdown().await;
            }
        }
    }

    /// Whether `root` currently has an open document.
    pub fn is_active(&self, root: &Path) -> bool {
        self.active.read().contains(root)
    }

    /// Roots of the projects that currently have a running engine.
    pub fn engine_roots(&self) -> Vec<PathBuf> {
        let mut roots: Vec<PathBuf> = self
            .engines
            .lock()
            .iter()
            .filter(|(_, cell)| cell.initialized())
            .map(|(root, _)| root.clone())
            .collect();
        roots.sort();
        roots
    }

    fn engine_cell(&self, root: &Path) -> EngineCell {
        Arc::clone(self.engines.lock().entry(root.to_path_buf()).or_default())
    }

    fn is_current(&self, root: &Path, cell: &EngineCell) -> bool {
        self.engines
            .lock()
            .get(root)
            .is_some_and(|current| Arc::ptr_eq(current, cell))
    }

    /// Remove `cell` from the map unless it was already replaced.
    fn remove_cell(&self, root: &Path, cell: &EngineCell) -> bool {
        let mut engines = self.engines.lock();
        if engines.get(root).is_some_and(|current| Arc::ptr_eq(current, cell)) {
            engines.remove(root);
            true
        } else {
            false
        }
    }

    /// Drop a dead engine so the next query starts a fresh one.
    async fn discard_engine(&self, root: &Path, cell: &EngineCell) {
        if !self.remove_cell(root, cell) {
            return;
        }
        tracing::warn!("script engine for {} stopped, restarting", root.display());
        self.synced.retain(|_, synced| synced.root != root);
        if let Some(engine) = cell.get() {
            engine.shutdown().await;
        }
    }

    /// Engine for the project owning `path`, created on first use.
    ///
    /// `None` for ignored directories, files outside any project, and
    /// projects with nothing open.
    pub async fn service_for_file(&self, path: &Path) -> Option<Arc<dyn ScriptEngine>> {
        let cache_dir = self.registry.config().dependency_cache_dir.as_str();
        if contains_component(path, IGNORED_DIRS) || contains_component(path, &[cache_dir]) {
            return None;
        }

        let root = self.registry.project_for_file(path)?;
        if !self.is_active(&root) || self.failed.read().contains(&root) {
            return None;
        }

        let mut cell = self.engine_cell(&root);
        if cell.get().is_some_and(|engine| !engine.is_alive()) {
            self.discard_engine(&root, &cell).await;
            cell = self.engine_cell(&root);
        }

        let factory = &self.factory;
        let project = root.as_path();
        let started = cell
            .get_or_try_init(move || async move {
                tracing::info!("creating script engine for project {}", project.display());
                factory.create(project).await
            })
            .await;

        match started {
            Ok(engine) => {
                let engine = Arc::clone(engine);
                // The project may have gone idle while the engine started.
                if !self.is_current(&root, &cell) {
                    tracing::info!(
                        "disposing script engine for inactive project {}",
                        root.display()
                    );
                    engine.shutdown().await;
                    return None;
                }
                Some(engine)
            }
            Err(err) => {
                tracing::error!("failed to start script engine for {}: {}", root.display(), err);
                self.failed.write().insert(root.clone());
                self.remove_cell(&root, &cell);
                None
            }
        }
    }

    /// Refresh the active set, start listening for open/close events once,
    /// and hand out the query façade.
    pub async fn service_instance(self: &Arc<Self>) -> ServiceInstance {
        self.refresh_active_projects().await;

        if !self.listening.swap(true, Ordering::SeqCst) {
            self.listen();
        }

        ServiceInstance {
            router: Arc::clone(self),
        }
    }

    fn listen(self: &Arc<Self>) {
        let mut events = self.documents.subscribe();
        let router = Arc::downgrade(self);

        tokio::spawn(async move {
            loop {
                let event = match events.recv().await {
                    Ok(event) => Some(event),
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::debug!(skipped, "document events lagged");
                        None
                    }
                    Err(RecvError::Closed) => break,
                };
                let Some(router) = router.upgrade() else {
                    break;
                };
                if let Some(DocumentEvent::Closed(uri)) = &event {
                    if let Ok(path) = uri.to_file_path() {
                        router.close_virtual_documents(&path).await;
                    }
                }
                router.refresh_active_projects().await;
            }
        });
    }

    /// Close the virtual documents derived from a real document.
    async fn close_virtual_documents(&self, path: &Path) {
        let names: Vec<(String, PathBuf)> = self
            .synced
            .iter()
            .filter(|entry| document_path(entry.key()).as_deref() == Some(path))
            .map(|entry| (entry.key().clone(), entry.value().root.clone()))
            .collect();

        for (name, root) in names {
            self.synced.remove(&name);
            let engine = self
                .engines
                .lock()
                .get(&root)
                .and_then(|cell| cell.get().cloned());
            if let Some(engine) = engine {
                if let Err(err) = engine.close_document(&name).await {
                    tracing::debug!("failed to close {}: {}", name, err);
                }
            }
        }
    }

    /// Shut down every engine.
    pub async fn dispose_language_services(&self) {
        let engines: Vec<(PathBuf, EngineCell)> = self.engines.lock().drain().collect();
        self.synced.clear();

        for (root, cell) in engines {
            if let Some(engine) = cell.get() {
                tracing::info!("disposing script engine for project {}", root.display());
                engine.shutdown().await;
            }
        }
    }
}

/// Query façade over the router.
#[derive(Clone)]
pub struct ServiceInstance {
    router: Arc<ScriptServiceRouter>,
}

impl ServiceInstance {
    /// Engine for a virtual document, or the stub when no project applies.
    pub async fn language_service(&self, name: &str) -> LanguageService {
        let path = document_path(name).unwrap_or_else(|| PathBuf::from(name));
        let engine: Arc<dyn ScriptEngine> = match self.router.service_for_file(&path).await {
            Some(engine) => engine,
            None => self.router.stub.clone(),
        };

        LanguageService {
            engine,
            router: Arc::clone(&self.router),
        }
    }

    pub async fn dispose_language_services(&self) {
        self.router.dispose_language_services().await;
    }
}

/// A resolved engine plus change-aware document sync.
pub struct LanguageService {
    engine: Arc<dyn ScriptEngine>,
    router: Arc<ScriptServiceRouter>,
}

impl LanguageService {
    pub fn engine(&self) -> &Arc<dyn ScriptEngine> {
        &self.engine
    }

    /// Push `text` as the content of `name` unless the engine already has it.
    pub async fn sync(&self, name: &str, text: &str) {
        let hash = content_hash(text);
        let root = self.engine.root().to_path_buf();

        let unchanged = self
            .router
            .synced
            .get(name)
            .is_some_and(|synced| synced.hash == hash && synced.root == root);
        if unchanged {
            return;
        }

        match self.engine.sync_document(name, text).await {
            Ok(()) => {
                self.router
                    .synced
                    .insert(name.to_string(), SyncedDocument { root, hash });
            }
            Err(err) => tracing::warn!("failed to sync {}: {}", name, err),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use async_trait::async_trait;
    use blits_atlas::{AtlasConfig, MemoryHost};
    use blits_canon::{
        CompletionEntry, DefinitionTarget, EngineDiagnostic, EngineError, QuickInfo,
        SignatureHelp,
    };
    use std::sync::atomic::AtomicUsize;
    use tower_lsp::lsp_types::Url;

    pub(crate) const BLITS: &str = r#"{ "dependencies": { "@lightningjs/blits": "^1.0.0" } }"#;

    /// Engine that records what it was asked and answers from fixtures.
    #[derive(Default)]
    pub(crate) struct RecordingEngine {
        pub root: PathBuf,
        pub syncs: AtomicUsize,
        pub closed: parking_lot::Mutex<Vec<String>>,
        pub shut_down: AtomicBool,
        pub dead: AtomicBool,
        pub quick_info: Option<QuickInfo>,
        pub completions: Vec<CompletionEntry>,
        pub definitions: Vec<DefinitionTarget>,
        pub diagnostics: Vec<EngineDiagnostic>,
        pub queries: parking_lot::Mutex<Vec<(String, usize)>>,
    }

    #[async_trait]
    impl ScriptEngine for RecordingEngine {
        fn root(&self) -> &Path {
            &self.root
        }

        async fn sync_document(&self, _name: &str, _text: &str) -> Result<(), EngineError> {
            self.syncs.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn close_document(&self, name: &str) -> Result<(), EngineError> {
            self.closed.lock().push(name.to_string());
            Ok(())
        }

        async fn completions(
            &self,
            name: &str,
            offset: usize,
        ) -> Result<Vec<CompletionEntry>, EngineError> {
            self.queries.lock().push((name.to_string(), offset));
            Ok(self.completions.clone())
        }

        async fn quick_info(
            &self,
            name: &str,
            offset: usize,
        ) -> Result<Option<QuickInfo>, EngineError> {
            self.queries.lock().push((name.to_string(), offset));
            Ok(self.quick_info.clone())
        }

        async fn definition(
            &self,
            name: &str,
            offset: usize,
        ) -> Result<Vec<DefinitionTarget>, EngineError> {
            self.queries.lock().push((name.to_string(), offset));
            Ok(self.definitions.clone())
        }

        async fn signature_help(
            &self,
            _name: &str,
            _offset: usize,
        ) -> Result<Option<SignatureHelp>, EngineError> {
            Ok(None)
        }

        async fn diagnostics(&self, _name: &str) -> Result<Vec<EngineDiagnostic>, EngineError> {
            Ok(self.diagnostics.clone())
        }

        fn is_alive(&self) -> bool {
            !self.dead.load(Ordering::SeqCst)
        }

        async fn shutdown(&self) {
            self.shut_down.store(true, Ordering::SeqCst);
        }
    }

    /// Factory handing out [`RecordingEngine`]s built from a template.
    #[derive(Default)]
    pub(crate) struct RecordingFactory {
        pub template: RecordingEngine,
        pub created: parking_lot::Mutex<Vec<Arc<RecordingEngine>>>,
        pub attempts: AtomicUsize,
        pub fail: bool,
        /// Starts for this root wait until `release` is notified.
        pub blocked_root: Option<PathBuf>,
        pub release: tokio::sync::Notify,
    }

    #[async_trait]
    impl ScriptEngineFactory for RecordingFactory {
        async fn create(&self, root: &Path) -> Result<Arc<dyn ScriptEngine>, EngineError> {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            if self.blocked_root.as_deref() == Some(root) {
                self.release.notified().await;
            }
            if self.fail {
                return Err(EngineError::SpawnFailed("no tsgo".to_string()));
            }
            let engine = Arc::new(RecordingEngine {
                root: root.to_path_buf(),
                quick_info: self.template.quick_info.clone(),
                completions: self.template.completions.clone(),
                definitions: self.template.definitions.clone(),
                diagnostics: self.template.diagnostics.clone(),
                ..Default::default()
            });
            self.created.lock().push(Arc::clone(&engine));
            Ok(engine)
        }
    }

    impl RecordingFactory {
        pub fn engine(&self, index: usize) -> Arc<RecordingEngine> {
            Arc::clone(&self.created.lock()[index])
        }

        pub fn count(&self) -> usize {
            self.created.lock().len()
        }
    }

    pub(crate) async fn workspace(
        factory: Arc<RecordingFactory>,
    ) -> (Arc<DocumentStore>, Arc<ScriptServiceRouter>) {
        let host = Arc::new(MemoryHost::new(vec![PathBuf::from("/ws")]));
        host.write("/ws/app/package.json", BLITS);
        host.write("/ws/tv/package.json", BLITS);

        let registry = ProjectRegistry::new(host, AtlasConfig::default());
        registry.discover().await;

        let documents = Arc::new(DocumentStore::new());
        let router = ScriptServiceRouter::new(registry, Arc::clone(&documents), factory);
        (documents, router)
    }

    pub(crate) fn open(documents: &DocumentStore, path: &str, text: &str) -> Url {
        let uri = Url::from_file_path(path).unwrap();
        documents.open(uri.clone(), text.to_string(), 1, "blits".to_string());
        uri
    }

    #[tokio::test]
    async fn test_engines_only_for_active_projects() {
        let factory = Arc::new(RecordingFactory::default());
        let (documents, router) = workspace(Arc::clone(&factory)).await;

        open(&documents, "/ws/app/src/Home.blits", "");
        router.refresh_active_projects().await;

        let name = "/ws/app/src/Home.blits.__script.js";
        assert!(router.service_for_file(Path::new(name)).await.is_some());
        // Same project, same engine.
        assert!(router
            .service_for_file(Path::new("/ws/app/src/Other.blits.__script.js"))
            .await
            .is_some());
        assert_eq!(factory.count(), 1);

        // The tv project has nothing open.
        assert!(router
            .service_for_file(Path::new("/ws/tv/src/App.blits.__script.js"))
            .await
            .is_none());
        assert!(router
            .service_for_file(Path::new("/elsewhere/a.js"))
            .await
            .is_none());
        assert_eq!(router.engine_roots(), vec![PathBuf::from("/ws/app")]);
    }

    #[tokio::test]
    async fn test_ignored_directories_are_rejected() {
        let factory = Arc::new(RecordingFactory::default());
        let (documents, router) = workspace(Arc::clone(&factory)).await;
        open(&documents, "/ws/app/src/Home.blits", "");
        router.refresh_active_projects().await;

        for path in [
            "/ws/app/node_modules/@lightningjs/blits/index.js",
            "/ws/app/.git/HEAD.js",
            "/ws/app/.vscode/settings.js",
        ] {
            assert!(router.service_for_file(Path::new(path)).await.is_none());
        }
        assert_eq!(factory.count(), 0);
    }

    #[tokio::test]
    async fn test_idle_project_engine_is_disposed() {
        let factory = Arc::new(RecordingFactory::default());
        let (documents, router) = workspace(Arc::clone(&factory)).await;

        let uri = open(&documents, "/ws/app/src/Home.blits", "");
        router.refresh_active_projects().await;
        router
            .service_for_file(Path::new("/ws/app/src/Home.blits.__script.js"))
            .await
            .unwrap();

        documents.close(&uri);
        router.refresh_active_projects().await;

        assert!(factory.engine(0).shut_down.load(Ordering::SeqCst));
        assert!(router.engine_roots().is_empty());
        assert!(!router.is_active(Path::new("/ws/app")));
    }

    #[tokio::test]
    async fn test_facade_falls_back_to_stub() {
        let factory = Arc::new(RecordingFactory::default());
        let (_documents, router) = workspace(Arc::clone(&factory)).await;
        let instance = router.service_instance().await;

        let service = instance
            .language_service("/ws/app/src/Home.blits.__script.js")
            .await;
        service.sync("/ws/app/src/Home.blits.__script.js", "let a").await;

        assert!(service
            .engine()
            .quick_info("/ws/app/src/Home.blits.__script.js", 1)
            .await
            .unwrap()
            .is_none());
        assert_eq!(factory.count(), 0);
    }

    #[tokio::test]
    async fn test_sync_skips_unchanged_content() {
        let factory = Arc::new(RecordingFactory::default());
        let (documents, router) = workspace(Arc::clone(&factory)).await;
        open(&documents, "/ws/app/src/Home.blits", "");
        let instance = router.service_instance().await;

        let name = "/ws/app/src/Home.blits.__script.js";
        let service = instance.language_service(name).await;
        service.sync(name, "let a = 1").await;
        service.sync(name, "let a = 1").await;
        service.sync(name, "let a = 2").await;

        assert_eq!(factory.engine(0).syncs.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_listener_tracks_open_and_close() {
        let factory = Arc::new(RecordingFactory::default());
        let (documents, router) = workspace(Arc::clone(&factory)).await;
        let instance = router.service_instance().await;

        let uri = open(&documents, "/ws/tv/src/App.blits", "");
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        assert!(router.is_active(Path::new("/ws/tv")));

        let name = "/ws/tv/src/App.blits.__script.ts";
        let service = instance.language_service(name).await;
        service.sync(name, "const x = 1").await;

        documents.close(&uri);
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;

        let engine = factory.engine(0);
        assert_eq!(engine.closed.lock().as_slice(), [name.to_string()]);
        assert!(engine.shut_down.load(Ordering::SeqCst));
        assert!(!router.is_active(Path::new("/ws/tv")));
    }

    #[tokio::test]
    async fn test_failed_engine_is_not_retried_while_active() {
        let factory = Arc::new(RecordingFactory {
            fail: true,
            ..Default::default()
        });
        let (documents, router) = workspace(Arc::clone(&factory)).await;
        let uri = open(&documents, "/ws/app/src/Home.blits", "");
        router.refresh_active_projects().await;

        let name = Path::new("/ws/app/src/Home.blits.__script.js");
        assert!(router.service_for_file(name).await.is_none());
        assert!(router.service_for_file(name).await.is_none());
        assert_eq!(factory.attempts.load(Ordering::SeqCst), 1);
        assert!(router.engine_roots().is_empty());

        // Once the project goes idle the failure is forgotten.
        documents.close(&uri);
        router.refresh_active_projects().await;
        open(&documents, "/ws/app/src/Home.blits", "");
        router.refresh_active_projects().await;

        assert!(router.service_for_file(name).await.is_none());
        assert_eq!(factory.attempts.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_slow_engine_start_does_not_block_other_projects() {
        let factory = Arc::new(RecordingFactory {
            blocked_root: Some(PathBuf::from("/ws/app")),
            ..Default::default()
        });
        let (documents, router) = workspace(Arc::clone(&factory)).await;
        open(&documents, "/ws/app/src/Home.blits", "");
        open(&documents, "/ws/tv/src/App.blits", "");
        router.refresh_active_projects().await;

        let pending = tokio::spawn({
            let router = Arc::clone(&router);
            async move {
                router
                    .service_for_file(Path::new("/ws/app/src/Home.blits.__script.js"))
                    .await
                    .is_some()
            }
        });
        while factory.attempts.load(Ordering::SeqCst) == 0 {
            tokio::task::yield_now().await;
        }

        let limit = std::time::Duration::from_secs(1);
        let tv = tokio::time::timeout(
            limit,
            router.service_for_file(Path::new("/ws/tv/src/App.blits.__script.js")),
        )
        .await
        .expect("tv engine waited on the app engine");
        assert!(tv.is_some());
        tokio::time::timeout(limit, router.refresh_active_projects())
            .await
            .expect("refresh waited on the app engine");
        assert_eq!(router.engine_roots(), vec![PathBuf::from("/ws/tv")]);

        factory.release.notify_one();
        assert!(pending.await.unwrap());
        assert_eq!(
            router.engine_roots(),
            vec![PathBuf::from("/ws/app"), PathBuf::from("/ws/tv")]
        );
    }

    #[tokio::test]
    async fn test_engine_started_for_idle_project_is_shut_down() {
        let factory = Arc::new(RecordingFactory {
            blocked_root: Some(PathBuf::from("/ws/app")),
            ..Default::default()
        });
        let (documents, router) = workspace(Arc::clone(&factory)).await;
        let uri = open(&documents, "/ws/app/src/Home.blits", "");
        router.refresh_active_projects().await;

        let pending = tokio::spawn({
            let router = Arc::clone(&router);
            async move {
                router
                    .service_for_file(Path::new("/ws/app/src/Home.blits.__script.js"))
                    .await
                    .is_some()
            }
        });
        while factory.attempts.load(Ordering::SeqCst) == 0 {
            tokio::task::yield_now().await;
        }

        documents.close(&uri);
        router.refresh_active_projects().await;
        factory.release.notify_one();

        assert!(!pending.await.unwrap());
        assert!(factory.engine(0).shut_down.load(Ordering::SeqCst));
        assert!(router.engine_roots().is_empty());
    }

    #[tokio::test]
    async fn test_dead_engine_is_replaced() {
        let factory = Arc::new(RecordingFactory::default());
        let (documents, router) = workspace(Arc::clone(&factory)).await;
        open(&documents, "/ws/app/src/Home.blits", "");
        let instance = router.service_instance().await;

        let name = "/ws/app/src/Home.blits.__script.js";
        instance.language_service(name).await.sync(name, "let a = 1").await;
        factory.engine(0).dead.store(true, Ordering::SeqCst);

        let service = instance.language_service(name).await;
        assert_eq!(factory.count(), 2);
        assert!(factory.engine(0).shut_down.load(Ordering::SeqCst));

        // The fresh engine has never seen the text.
        service.sync(name, "let a = 1").await;
        assert_eq!(factory.engine(1).syncs.load(Ordering::SeqCst), 1);
        assert_eq!(router.engine_roots(), vec![PathBuf::from("/ws/app")]);
    }

    #[tokio::test]
    async fn test_dispose_language_services() {
        let factory = Arc::new(RecordingFactory::default());
        let (documents, router) = workspace(Arc::clone(&factory)).await;
        open(&documents, "/ws/app/src/Home.blits", "");
        open(&documents, "/ws/tv/src/App.blits", "");
        let instance = router.service_instance().await;

        instance.language_service("/ws/app/src/Home.blits.__script.js").await;
        instance.language_service("/ws/tv/src/App.blits.__script.js").await;
        assert_eq!(factory.count(), 2);

        instance.dispose_language_services().await;
        assert!(router.engine_roots().is_empty());
        assert!(factory.engine(0).shut_down.load(Ordering::SeqCst));
        assert!(factory.engine(1).shut_down.load(Ordering::SeqCst));
    }
}
