//! Server state management.

use std::path::PathBuf;
use std::sync::{Arc, OnceLock};

use blits_atlas::{NativeHost, ProjectRegistry};
use blits_canon::ScriptEngineFactory;
use parking_lot::RwLock;

use crate::config::MaestroConfig;
use crate::document::DocumentStore;
use crate::router::{ScriptServiceRouter, ServiceInstance};

/// Everything that exists once the workspace roots are known.
pub struct Workspace {
    pub host: Arc<NativeHost>,
    pub registry: Arc<ProjectRegistry>,
    pub router: Arc<ScriptServiceRouter>,
}

/// Server state containing all runtime data.
pub struct ServerState {
    /// Document store for managing open documents
    pub documents: Arc<DocumentStore>,
    config: RwLock<MaestroConfig>,
    /// Set during `initialize`
    workspace: OnceLock<Workspace>,
    /// Why the script engine could not be set up, reported once
    engine_error: RwLock<Option<String>>,
}

impl ServerState {
    pub fn new(config: MaestroConfig) -> Self {
        Self {
            documents: Arc::new(DocumentStore::new()),
            config: RwLock::new(config),
            workspace: OnceLock::new(),
            engine_error: RwLock::new(None),
        }
    }

    pub fn config(&self) -> MaestroConfig {
        self.config.read().clone()
    }

    pub fn set_config(&self, config: MaestroConfig) {
        *self.config.write() = config;
    }

    /// Build the registry and router for `roots`. Later calls keep the
    /// first workspace.
    pub fn init_workspace(
        &self,
        roots: Vec<PathBuf>,
        factory: Arc<dyn ScriptEngineFactory>,
    ) -> &Workspace {
        self.workspace.get_or_init(|| {
            let host = Arc::new(NativeHost::new(roots));
            let registry = ProjectRegistry::new(host.clone(), self.config().workspace);
            let router = ScriptServiceRouter::new(
                Arc::clone(&registry),
                Arc::clone(&self.documents),
                factory,
            );
            Workspace {
                host,
                registry,
                router,
            }
        })
    }

    pub fn workspace(&self) -> Option<&Workspace> {
        self.workspace.get()
    }

    /// Query façade, once the workspace is initialized.
    pub async fn services(&self) -> Option<ServiceInstance> {
        let workspace = self.workspace()?;
        Some(workspace.router.service_instance().await)
    }

    pub fn set_engine_error(&self, message: String) {
        *self.engine_error.write() = Some(message);
    }

    /// The engine setup error, handed out at most once.
    pub fn take_engine_error(&self) -> Option<String> {
        self.engine_error.write().take()
    }
}

impl Default for ServerState {
    fn default() -> Self {
        Self::new(MaestroConfig::default())
    }
}
