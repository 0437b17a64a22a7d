//! LSP command - Language Server Protocol server

use clap::Args;

use super::CommandResult;
use crate::config::BlitsConfig;

#[derive(Args)]
pub struct LspArgs {
    /// Use stdio for communication (default)
    #[arg(long, default_value = "true")]
    pub stdio: bool,

    /// TCP port for socket communication
    #[arg(long)]
    pub port: Option<u16>,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,
}

pub fn run(args: LspArgs, config: BlitsConfig) -> CommandResult {
    blits_maestro::init_logging(args.debug);

    // Create tokio runtime for async LSP server
    let runtime = tokio::runtime::Runtime::new().expect("Failed to create tokio runtime");

    runtime.block_on(async {
        let config = config.maestro();
        let result = if let Some(port) = args.port {
            blits_maestro::serve_tcp(port, config).await
        } else {
            blits_maestro::serve(config).await
        };

        result.map_err(|e| format!("LSP server error: {}", e).into())
    })
}
