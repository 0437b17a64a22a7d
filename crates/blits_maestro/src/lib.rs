//! # blits_maestro
//!
//! Maestro - Language Server Protocol implementation for Blits.
//!
//! ## Name Origin
//!
//! **Maestro** is a master conductor who coordinates an orchestra. Here it
//! conducts the Blits toolchain: the project registry decides which
//! components belong to which app, the region extractor finds templates and
//! scripts, and one script engine per active project answers the questions
//! an editor asks.
//!
//! ## Architecture
//!
//! ```text
//! +------------------------------------------------------------------+
//! |                      blits_maestro (LSP Server)                   |
//! +------------------------------------------------------------------+
//! |                                                                    |
//! |  +--------------------+     +-------------------+                  |
//! |  |   LSP Transport    |     |   Server Core     |                  |
//! |  |   (tower-lsp)      |<--->|   (request/event) |                  |
//! |  +--------------------+     +-------------------+                  |
//! |                                      |                             |
//! |                                      v                             |
//! |  +-----------------------------------------------------------+    |
//! |  |          Document Store (Rope) + open/close events        |    |
//! |  +-----------------------------------------------------------+    |
//! |                                      |                             |
//! |                                      v                             |
//! |  +-----------------------------------------------------------+    |
//! |  |   Virtual scripts: Home.blits -> Home.blits.__script.ts   |    |
//! |  +-----------------------------------------------------------+    |
//! |                                      |                             |
//! |                                      v                             |
//! |  +-----------------------------------------------------------+    |
//! |  |   Script Service Router: one engine per active project    |    |
//! |  |   blits_atlas (projects) | blits_canon (engines)          |    |
//! |  +-----------------------------------------------------------+    |
//! +------------------------------------------------------------------+
//! ```
//!
//! ## Features
//!
//! - Hover, completion and signature help in `<script>` blocks
//! - Go to definition, mapped back out of virtual scripts
//! - Script diagnostics
//! - Document symbols for templates and scripts
//! - Block scaffolds between blocks
//!
//! ## Usage
//!
//! ```no_run
//! #[tokio::main]
//! async fn main() {
//!     blits_maestro::serve(Default::default()).await.unwrap();
//! }
//! ```

pub mod config;
pub mod document;
pub mod ide;
pub mod router;
pub mod server;
pub mod utils;
pub mod virtual_code;

pub use config::MaestroConfig;
pub use ide::{
    CompletionService, DefinitionService, DiagnosticService, HoverService, IdeContext,
    SignatureHelpService, SymbolService,
};
pub use router::{LanguageService, ScriptServiceRouter, ServiceInstance};
pub use server::MaestroServer;
pub use virtual_code::{document_path, virtual_name, VirtualScript};

use tower_lsp::{LspService, Server};

/// Initialize logging to node_modules/.blits/lsp.log, tee'd to stderr.
///
/// The level comes from `RUST_LOG`, defaulting to `info` (or `debug`).
/// stdout is left alone: it carries the LSP transport.
pub fn init_logging(debug: bool) {
    use std::fs::{create_dir_all, OpenOptions};
    use std::sync::Once;
    use tracing_subscriber::fmt::writer::MakeWriterExt;
    use tracing_subscriber::EnvFilter;

    static INIT: Once = Once::new();

    INIT.call_once(|| {
        let default_level = if debug { "debug" } else { "info" };
        let filter = || {
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
        };

        let log_dir = std::env::current_dir()
            .ok()
            .map(|p| p.join("node_modules/.blits"))
            .unwrap_or_else(|| std::env::temp_dir().join("blits"));

        let _ = create_dir_all(&log_dir);

        let log_path = log_dir.join("lsp.log");

        // Try to open log file, fall back to stderr
        if let Ok(file) = OpenOptions::new().create(true).append(true).open(&log_path) {
            tracing_subscriber::fmt()
                .with_env_filter(filter())
                .with_writer(file.and(std::io::stderr))
                .with_ansi(false)
                .init();
        } else {
            tracing_subscriber::fmt()
                .with_env_filter(filter())
                .with_writer(std::io::stderr)
                .with_ansi(false)
                .init();
        }
    });
}

/// Start the LSP server using stdio transport.
pub async fn serve(config: MaestroConfig) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing::info!("Starting blits_maestro LSP server");

    let stdin = tokio::io::stdin();
    let stdout = tokio::io::stdout();

    let (service, socket) =
        LspService::new(move |client| MaestroServer::with_config(client, config.clone()));

    Server::new(stdin, stdout, socket).serve(service).await;

    Ok(())
}

/// Start the LSP server on a TCP socket.
///
/// This is useful for debugging and testing.
pub async fn serve_tcp(
    port: u16,
    config: MaestroConfig,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    use tokio::net::TcpListener;

    tracing::info!("Starting blits_maestro LSP server on port {}", port);

    let listener = TcpListener::bind(format!("127.0.0.1:{}", port)).await?;
    tracing::info!("Listening on 127.0.0.1:{}", port);

    let (stream, addr) = listener.accept().await?;
    tracing::info!("Accepted connection from {}", addr);

    let (read, write) = tokio::io::split(stream);

    let (service, socket) =
        LspService::new(move |client| MaestroServer::with_config(client, config.clone()));

    Server::new(read, write, socket).serve(service).await;

    Ok(())
}
