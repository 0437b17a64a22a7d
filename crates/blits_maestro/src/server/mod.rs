//! LSP server implementation.
//!
//! This module contains the core LSP server using tower-lsp.

mod capabilities;
mod state;

pub use capabilities::*;
pub use state::*;

use std::path::PathBuf;
use std::sync::Arc;

use blits_canon::{ScriptEngineFactory, StubEngineFactory, TsgoEngineFactory};
use tower_lsp::jsonrpc::Result;
use tower_lsp::lsp_types::*;
use tower_lsp::{Client, LanguageServer};

use crate::config::MaestroConfig;
use crate::document::DocumentStore;
use crate::ide::{
    CompletionService, DefinitionService, DiagnosticService, HoverService, IdeContext,
    SignatureHelpService, SymbolService,
};

/// The Maestro LSP server.
pub struct MaestroServer {
    /// LSP client for sending notifications
    client: Client,
    /// Server state
    state: ServerState,
}

impl MaestroServer {
    pub fn new(client: Client) -> Self {
        Self::with_config(client, MaestroConfig::default())
    }

    pub fn with_config(client: Client, config: MaestroConfig) -> Self {
        Self {
            client,
            state: ServerState::new(config),
        }
    }

    /// Get the document store.
    pub fn documents(&self) -> &DocumentStore {
        &self.state.documents
    }

    /// Publish diagnostics for a document.
    async fn publish_diagnostics(&self, uri: &Url) {
        let Some(ctx) = IdeContext::whole(&self.state.documents, uri) else {
            return;
        };
        let Some(services) = self.state.services().await else {
            return;
        };

        let diagnostics = DiagnosticService::collect(&ctx, &services).await;
        self.client
            .publish_diagnostics(uri.clone(), diagnostics, None)
            .await;
    }

    /// Workspace roots announced by the client, falling back to the
    /// working directory.
    #[allow(deprecated)]
    fn workspace_roots(params: &InitializeParams) -> Vec<PathBuf> {
        let mut roots: Vec<PathBuf> = params
            .workspace_folders
            .iter()
            .flatten()
            .filter_map(|folder| folder.uri.to_file_path().ok())
            .collect();

        if roots.is_empty() {
            roots.extend(
                params
                    .root_uri
                    .as_ref()
                    .and_then(|uri| uri.to_file_path().ok()),
            );
        }

        if roots.is_empty() {
            roots.extend(std::env::current_dir().ok());
        }
        roots
    }

    fn engine_factory(&self, roots: &[PathBuf]) -> Arc<dyn ScriptEngineFactory> {
        let cwd = roots
            .first()
            .cloned()
            .or_else(|| std::env::current_dir().ok())
            .unwrap_or_default();

        match TsgoEngineFactory::locate(self.state.config().engine, &cwd) {
            Ok(factory) => {
                tracing::info!("using tsgo at {}", factory.tsgo_path().display());
                Arc::new(factory)
            }
            Err(err) => {
                tracing::error!("script engine unavailable: {}", err);
                self.state.set_engine_error(format!(
                    "Blits: script features are disabled because tsgo could not be found ({})",
                    err
                ));
                Arc::new(StubEngineFactory)
            }
        }
    }
}

#[tower_lsp::async_trait]
impl LanguageServer for MaestroServer {
    async fn initialize(&self, params: InitializeParams) -> Result<InitializeResult> {
        if let Some(config) =
            MaestroConfig::from_initialization_options(params.initialization_options.clone())
        {
            self.state.set_config(config);
        }

        let roots = Self::workspace_roots(&params);
        tracing::info!("workspace roots: {:?}", roots);

        let factory = self.engine_factory(&roots);
        self.state.init_workspace(roots, factory);

        Ok(InitializeResult {
            capabilities: server_capabilities(),
            server_info: Some(ServerInfo {
                name: "blits-maestro".to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            }),
        })
    }

    async fn initialized(&self, _params: InitializedParams) {
        if let Some(message) = self.state.take_engine_error() {
            self.client.show_message(MessageType::ERROR, message).await;
        }

        if let Some(workspace) = self.state.workspace() {
            workspace.registry.start_discovery();
        }

        self.client
            .log_message(MessageType::INFO, "blits_maestro LSP server initialized")
            .await;
    }

    async fn shutdown(&self) -> Result<()> {
        if let Some(workspace) = self.state.workspace() {
            workspace.router.dispose_language_services().await;
            workspace.registry.dispose();
        }
        Ok(())
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        let uri = params.text_document.uri;

        self.state.documents.open(
            uri.clone(),
            params.text_document.text,
            params.text_document.version,
            params.text_document.language_id,
        );

        self.publish_diagnostics(&uri).await;
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        let uri = params.text_document.uri;

        self.state.documents.apply_changes(
            &uri,
            params.content_changes,
            params.text_document.version,
        );

        self.publish_diagnostics(&uri).await;
    }

    async fn did_save(&self, params: DidSaveTextDocumentParams) {
        self.publish_diagnostics(&params.text_document.uri).await;
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        let uri = params.text_document.uri;
        self.state.documents.close(&uri);

        // Clear diagnostics
        self.client.publish_diagnostics(uri, vec![], None).await;
    }

    async fn hover(&self, params: HoverParams) -> Result<Option<Hover>> {
        let uri = &params.text_document_position_params.text_document.uri;
        let position = params.text_document_position_params.position;

        let Some(ctx) = IdeContext::new(&self.state.documents, uri, position) else {
            return Ok(None);
        };
        let Some(services) = self.state.services().await else {
            return Ok(None);
        };

        Ok(HoverService::hover(&ctx, &services).await)
    }

    async fn completion(&self, params: CompletionParams) -> Result<Option<CompletionResponse>> {
        let uri = &params.text_document_position.text_document.uri;
        let position = params.text_document_position.position;

        let Some(ctx) = IdeContext::new(&self.state.documents, uri, position) else {
            return Ok(None);
        };
        let Some(services) = self.state.services().await else {
            return Ok(None);
        };

        Ok(CompletionService::complete(&ctx, &services).await)
    }

    async fn signature_help(&self, params: SignatureHelpParams) -> Result<Option<SignatureHelp>> {
        let uri = &params.text_document_position_params.text_document.uri;
        let position = params.text_document_position_params.position;

        let Some(ctx) = IdeContext::new(&self.state.documents, uri, position) else {
            return Ok(None);
        };
        let Some(services) = self.state.services().await else {
            return Ok(None);
        };

        Ok(SignatureHelpService::signature_help(&ctx, &services).await)
    }

    async fn goto_definition(
        &self,
        params: GotoDefinitionParams,
    ) -> Result<Option<GotoDefinitionResponse>> {
        let uri = &params.text_document_position_params.text_document.uri;
        let position = params.text_document_position_params.position;

        let Some(ctx) = IdeContext::new(&self.state.documents, uri, position) else {
            return Ok(None);
        };
        let Some(services) = self.state.services().await else {
            return Ok(None);
        };

        Ok(DefinitionService::definition(&ctx, &services, &self.state.documents).await)
    }

    async fn document_symbol(
        &self,
        params: DocumentSymbolParams,
    ) -> Result<Option<DocumentSymbolResponse>> {
        let Some(ctx) = IdeContext::whole(&self.state.documents, &params.text_document.uri) else {
            return Ok(None);
        };

        let symbols = SymbolService::symbols(&ctx);
        if symbols.is_empty() {
            Ok(None)
        } else {
            Ok(Some(DocumentSymbolResponse::Nested(symbols)))
        }
    }
}
