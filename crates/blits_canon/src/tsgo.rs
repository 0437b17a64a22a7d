//! Script engine backed by tsgo (the Go port of TypeScript).
//!
//! tsgo runs as a child process speaking LSP over stdio. Virtual documents
//! are opened in memory under [`VIRTUAL_URI_SCHEME`]; nothing is written to
//! disk.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::{json, Value};
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt, BufReader, BufWriter};
use tokio::process::{Child, Command};
use tokio::sync::{oneshot, Mutex};
use tokio::task::JoinHandle;

use crate::config::TsgoEngineConfig;
use crate::engine::{
    CompletionEntry, DefinitionTarget, EngineDiagnostic, QuickInfo, ScriptEngine,
    ScriptEngineFactory, SignatureHelp, TextPosition,
};
use crate::error::EngineError;
use crate::protocol::{
    self, Incoming, IncomingMessage, JsonRpcNotification, JsonRpcRequest, LspDiagnostic,
    LspLocation,
};

/// URI scheme for in-memory virtual documents.
pub const VIRTUAL_URI_SCHEME: &str = "blits-virtual";

type Writer = BufWriter<Box<dyn AsyncWrite + Send + Unpin>>;
type SharedWriter = Arc<Mutex<Option<Writer>>>;
type PendingMap = Arc<DashMap<u64, oneshot::Sender<Result<Value, EngineError>>>>;
type DiagnosticsCache = Arc<DashMap<String, Vec<LspDiagnostic>>>;

/// URI a virtual document name is opened under.
pub fn virtual_uri(name: &str) -> String {
    format!("{}://{}", VIRTUAL_URI_SCHEME, name)
}

/// Inverse of [`virtual_uri`].
pub fn virtual_name(uri: &str) -> Option<&str> {
    uri.strip_prefix(VIRTUAL_URI_SCHEME)?.strip_prefix("://")
}

fn file_uri(path: &Path) -> String {
    format!("file://{}", path.display())
}

fn language_id(name: &str) -> &'static str {
    if name.ends_with(".ts") {
        "typescript"
    } else {
        "javascript"
    }
}

async fn write_frame(writer: &SharedWriter, body: &str) -> Result<(), EngineError> {
    let message = protocol::encode_message(body);
    let mut guard = writer.lock().await;
    let Some(stream) = guard.as_mut() else {
        return Err(EngineError::NotInitialized);
    };
    stream
        .write_all(message.as_bytes())
        .await
        .map_err(EngineError::communication)?;
    stream.flush().await.map_err(EngineError::communication)
}

/// Text and version of a document synced to tsgo.
struct OpenDocument {
    version: i32,
    text: String,
}

/// A tsgo language server scoped to one project root.
pub struct TsgoEngine {
    root: PathBuf,
    config: TsgoEngineConfig,
    process: Mutex<Option<Child>>,
    writer: SharedWriter,
    request_id: AtomicU64,
    pending: PendingMap,
    /// Published diagnostics keyed by URI
    diagnostics: DiagnosticsCache,
    documents: DashMap<String, OpenDocument>,
    initialized: AtomicBool,
    alive: Arc<AtomicBool>,
    reader: JoinHandle<()>,
}

impl TsgoEngine {
    /// Start tsgo for `root` and complete the LSP handshake.
    pub async fn spawn(
        tsgo_path: &Path,
        root: &Path,
        config: TsgoEngineConfig,
    ) -> Result<Self, EngineError> {
        let mut child = Command::new(tsgo_path)
            .arg("--lsp")
            .arg("--stdio")
            .current_dir(root)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                EngineError::SpawnFailed(format!("failed to spawn {}: {}", tsgo_path.display(), e))
            })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| EngineError::SpawnFailed("failed to get stdin".to_string()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| EngineError::SpawnFailed("failed to get stdout".to_string()))?;

        tracing::info!("starting tsgo for {}", root.display());
        let engine = Self::connect(stdout, stdin, root, config).await?;
        *engine.process.lock().await = Some(child);
        Ok(engine)
    }

    /// Run the handshake over an existing transport.
    pub async fn connect<R, W>(
        reader: R,
        writer: W,
        root: &Path,
        config: TsgoEngineConfig,
    ) -> Result<Self, EngineError>
    where
        R: AsyncRead + Send + Unpin + 'static,
        W: AsyncWrite + Send + Unpin + 'static,
    {
        let boxed: Box<dyn AsyncWrite + Send + Unpin> = Box::new(writer);
        let writer: SharedWriter = Arc::new(Mutex::new(Some(BufWriter::new(boxed))));
        let pending: PendingMap = Arc::new(DashMap::new());
        let diagnostics: DiagnosticsCache = Arc::new(DashMap::new());
        let alive = Arc::new(AtomicBool::new(true));

        let reader = tokio::spawn(read_loop(
            reader,
            Arc::clone(&writer),
            Arc::clone(&pending),
            Arc::clone(&diagnostics),
            Arc::clone(&alive),
        ));

        let engine = Self {
            root: root.to_path_buf(),
            config,
            process: Mutex::new(None),
            writer,
            request_id: AtomicU64::new(1),
            pending,
            diagnostics,
            documents: DashMap::new(),
            initialized: AtomicBool::new(false),
            alive,
            reader,
        };

        engine.initialize().await?;
        engine.initialized.store(true, Ordering::SeqCst);
        Ok(engine)
    }

    async fn initialize(&self) -> Result<(), EngineError> {
        let params = json!({
            "processId": std::process::id(),
            "capabilities": {
                "textDocument": {
                    "synchronization": { "didSave": true },
                    "publishDiagnostics": { "relatedInformation": true },
                    "hover": { "contentFormat": ["markdown", "plaintext"] },
                    "completion": { "completionItem": { "snippetSupport": false } },
                    "signatureHelp": {
                        "signatureInformation": {
                            "parameterInformation": { "labelOffsetSupport": true }
                        }
                    },
                    "definition": { "linkSupport": true }
                }
            },
            "rootUri": file_uri(&self.root),
            "initializationOptions": {}
        });

        self.send_request("initialize", Some(params)).await?;
        self.send_notification("initialized", Some(json!({}))).await
    }

    async fn send_request(&self, method: &str, params: Option<Value>) -> Result<Value, EngineError> {
        if !self.alive.load(Ordering::SeqCst) {
            return Err(EngineError::ProcessTerminated);
        }

        let id = self.request_id.fetch_add(1, Ordering::SeqCst);
        let request = JsonRpcRequest {
            jsonrpc: "2.0",
            id,
            method,
            params,
        };
        let body = serde_json::to_string(&request).map_err(EngineError::communication)?;

        let (tx, rx) = oneshot::channel();
        self.pending.insert(id, tx);

        if let Err(err) = write_frame(&self.writer, &body).await {
            self.pending.remove(&id);
            return Err(err);
        }

        match tokio::time::timeout(self.config.timeout(), rx).await {
            Ok(Ok(result)) => result,
            Ok(Err(_)) => Err(EngineError::ProcessTerminated),
            Err(_) => {
                self.pending.remove(&id);
                tracing::warn!(method, "tsgo request timed out");
                Err(EngineError::Timeout)
            }
        }
    }

    async fn send_notification(&self, method: &str, params: Option<Value>) -> Result<(), EngineError> {
        let notification = JsonRpcNotification {
            jsonrpc: "2.0",
            method,
            params,
        };
        let body = serde_json::to_string(&notification).map_err(EngineError::communication)?;
        write_frame(&self.writer, &body).await
    }

    fn ensure_initialized(&self) -> Result<(), EngineError> {
        if self.initialized.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(EngineError::NotInitialized)
        }
    }

    /// Build `TextDocumentPositionParams` for an offset into an open document.
    fn position_params(&self, name: &str, offset: usize) -> Result<Value, EngineError> {
        self.ensure_initialized()?;
        let document = self
            .documents
            .get(name)
            .ok_or_else(|| EngineError::UnknownDocument(name.to_string()))?;
        let position = protocol::offset_to_position(&document.text, offset);

        Ok(json!({
            "textDocument": { "uri": virtual_uri(name) },
            "position": position
        }))
    }

    fn document_text(&self, name: &str) -> Option<String> {
        self.documents.get(name).map(|document| document.text.clone())
    }

    fn convert_location(&self, location: LspLocation) -> DefinitionTarget {
        if let Some(name) = virtual_name(&location.uri) {
            if let Some(text) = self.document_text(name) {
                let start = protocol::position_to_offset(&text, location.range.start);
                let end = protocol::position_to_offset(&text, location.range.end);
                return DefinitionTarget::Virtual {
                    name: name.to_string(),
                    span: start..end,
                };
            }
        }

        let position = |p: protocol::LspPosition| TextPosition {
            line: p.line,
            character: p.character,
        };
        DefinitionTarget::External {
            uri: location.uri,
            start: position(location.range.start),
            end: position(location.range.end),
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::SeqCst)
    }

    /// Number of virtual documents currently open.
    pub fn open_documents(&self) -> usize {
        self.documents.len()
    }
}

#[async_trait]
impl ScriptEngine for TsgoEngine {
    fn root(&self) -> &Path {
        &self.root
    }

    fn is_alive(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }

    async fn sync_document(&self, name: &str, text: &str) -> Result<(), EngineError> {
        self.ensure_initialized()?;
        let uri = virtual_uri(name);

        let reopened = match self.documents.get_mut(name) {
            Some(mut document) => {
                document.version += 1;
                document.text = text.to_string();
                Some(document.version)
            }
            None => {
                self.documents.insert(
                    name.to_string(),
                    OpenDocument {
                        version: 1,
                        text: text.to_string(),
                    },
                );
                None
            }
        };

        self.diagnostics.remove(&uri);

        match reopened {
            Some(version) => {
                let params = json!({
                    "textDocument": { "uri": uri, "version": version },
                    "contentChanges": [{ "text": text }]
                });
                self.send_notification("textDocument/didChange", Some(params))
                    .await
            }
            None => {
                let params = json!({
                    "textDocument": {
                        "uri": uri,
                        "languageId": language_id(name),
                        "version": 1,
                        "text": text
                    }
                });
                self.send_notification("textDocument/didOpen", Some(params))
                    .await
            }
        }
    }

    async fn close_document(&self, name: &str) -> Result<(), EngineError> {
        self.ensure_initialized()?;
        if self.documents.remove(name).is_none() {
            return Ok(());
        }

        let uri = virtual_uri(name);
        self.diagnostics.remove(&uri);
        self.send_notification(
            "textDocument/didClose",
            Some(json!({ "textDocument": { "uri": uri } })),
        )
        .await
    }

    async fn completions(
        &self,
        name: &str,
        offset: usize,
    ) -> Result<Vec<CompletionEntry>, EngineError> {
        let params = self.position_params(name, offset)?;
        let result = self
            .send_request("textDocument/completion", Some(params))
            .await?;
        Ok(protocol::decode_completions(&result))
    }

    async fn quick_info(&self, name: &str, offset: usize) -> Result<Option<QuickInfo>, EngineError> {
        let params = self.position_params(name, offset)?;
        let result = self.send_request("textDocument/hover", Some(params)).await?;
        let text = self.document_text(name).unwrap_or_default();
        Ok(protocol::decode_hover(&result, &text))
    }

    async fn definition(
        &self,
        name: &str,
        offset: usize,
    ) -> Result<Vec<DefinitionTarget>, EngineError> {
        let params = self.position_params(name, offset)?;
        let result = self
            .send_request("textDocument/definition", Some(params))
            .await?;

        Ok(protocol::decode_locations(&result)
            .into_iter()
            .map(|location| self.convert_location(location))
            .collect())
    }

    async fn signature_help(
        &self,
        name: &str,
        offset: usize,
    ) -> Result<Option<SignatureHelp>, EngineError> {
        let params = self.position_params(name, offset)?;
        let result = self
            .send_request("textDocument/signatureHelp", Some(params))
            .await?;
        Ok(protocol::decode_signature_help(&result))
    }

    async fn diagnostics(&self, name: &str) -> Result<Vec<EngineDiagnostic>, EngineError> {
        self.ensure_initialized()?;
        let uri = virtual_uri(name);

        if !self.diagnostics.contains_key(&uri) {
            // Diagnostics are pushed; give tsgo a moment after the last sync.
            tokio::time::sleep(self.config.diagnostics_wait()).await;
        }

        let Some(text) = self.document_text(name) else {
            return Ok(Vec::new());
        };

        Ok(self
            .diagnostics
            .get(&uri)
            .map(|published| {
                published
                    .iter()
                    .map(|diagnostic| protocol::convert_diagnostic(diagnostic, &text))
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn shutdown(&self) {
        if !self.initialized.swap(false, Ordering::SeqCst) {
            return;
        }

        tracing::info!("shutting down tsgo for {}", self.root.display());
        let _ = self.send_request("shutdown", None).await;
        let _ = self.send_notification("exit", None).await;

        if let Some(mut process) = self.process.lock().await.take() {
            let _ = process.kill().await;
        }

        self.reader.abort();
        self.documents.clear();
        self.diagnostics.clear();
    }
}

impl Drop for TsgoEngine {
    fn drop(&mut self) {
        self.reader.abort();
    }
}

/// Dispatch everything tsgo sends until the stream ends.
async fn read_loop<R>(
    reader: R,
    writer: SharedWriter,
    pending: PendingMap,
    diagnostics: DiagnosticsCache,
    alive: Arc<AtomicBool>,
) where
    R: AsyncRead + Send + Unpin,
{
    let mut reader = BufReader::new(reader);

    loop {
        let content = match protocol::read_message(&mut reader).await {
            Ok(Some(content)) => content,
            Ok(None) => break,
            Err(err) => {
                tracing::error!("tsgo transport failed: {}", err);
                break;
            }
        };

        let message: IncomingMessage = match serde_json::from_slice(&content) {
            Ok(message) => message,
            Err(err) => {
                tracing::warn!("ignoring malformed tsgo message: {}", err);
                continue;
            }
        };

        match message.classify() {
            Incoming::Response { id, result } => {
                if let Some((_, sender)) = pending.remove(&id) {
                    let result = result.map_err(|error| EngineError::Response {
                        code: error.code,
                        message: error.message,
                    });
                    let _ = sender.send(result);
                }
            }
            Incoming::Notification { method, params } => {
                if method == "textDocument/publishDiagnostics" {
                    publish_diagnostics(&diagnostics, params);
                }
            }
            Incoming::Request { id, method, params } => {
                // We register no capabilities, so an empty answer is always valid.
                let result = match method.as_str() {
                    "workspace/configuration" => {
                        let items = params
                            .get("items")
                            .and_then(Value::as_array)
                            .map_or(0, Vec::len);
                        Value::Array(vec![Value::Null; items])
                    }
                    _ => Value::Null,
                };
                let body = json!({ "jsonrpc": "2.0", "id": id, "result": result }).to_string();
                if let Err(err) = write_frame(&writer, &body).await {
                    tracing::warn!(method = %method, "failed to answer tsgo request: {}", err);
                }
            }
            Incoming::Unknown => {}
        }
    }

    alive.store(false, Ordering::SeqCst);
    let ids: Vec<u64> = pending.iter().map(|entry| *entry.key()).collect();
    for id in ids {
        if let Some((_, sender)) = pending.remove(&id) {
            let _ = sender.send(Err(EngineError::ProcessTerminated));
        }
    }
    tracing::debug!("tsgo reader finished");
}

fn publish_diagnostics(cache: &DiagnosticsCache, params: Value) {
    let Some(uri) = params.get("uri").and_then(Value::as_str) else {
        return;
    };
    let Some(published) = params.get("diagnostics") else {
        return;
    };

    match serde_json::from_value::<Vec<LspDiagnostic>>(published.clone()) {
        Ok(published) => {
            cache.insert(uri.to_string(), published);
        }
        Err(err) => tracing::warn!(uri, "unreadable diagnostics: {}", err),
    }
}

/// Locate the tsgo executable.
///
/// Order: configured path, `PATH`, then the local `node_modules` under `cwd`.
pub fn find_tsgo_path(config: &TsgoEngineConfig, cwd: &Path) -> Result<PathBuf, EngineError> {
    if let Some(ref path) = config.tsgo_path {
        if path.exists() {
            return Ok(path.clone());
        }
        tracing::warn!("configured tsgo path {} does not exist", path.display());
    }

    if let Ok(path) = which::which("tsgo") {
        return Ok(path);
    }

    let candidates = [
        "node_modules/.bin/tsgo",
        "node_modules/@typescript/native-preview/bin/tsgo",
    ];
    for candidate in candidates {
        let path = cwd.join(candidate);
        if path.exists() {
            return Ok(path);
        }
    }

    Err(EngineError::SpawnFailed(
        "tsgo executable not found. Install with: npm install -D @typescript/native-preview"
            .to_string(),
    ))
}

/// Spawns one [`TsgoEngine`] per project root.
#[derive(Debug, Clone)]
pub struct TsgoEngineFactory {
    tsgo_path: PathBuf,
    config: TsgoEngineConfig,
}

impl TsgoEngineFactory {
    /// Resolve the executable once, up front.
    pub fn locate(config: TsgoEngineConfig, cwd: &Path) -> Result<Self, EngineError> {
        let tsgo_path = find_tsgo_path(&config, cwd)?;
        Ok(Self { tsgo_path, config })
    }

    pub fn tsgo_path(&self) -> &Path {
        &self.tsgo_path
    }
}

#[async_trait]
impl ScriptEngineFactory for TsgoEngineFactory {
    async fn create(&self, root: &Path) -> Result<Arc<dyn ScriptEngine>, EngineError> {
        let engine = TsgoEngine::spawn(&self.tsgo_path, root, self.config.clone()).await?;
        Ok(Arc::new(engine))
    }
}
