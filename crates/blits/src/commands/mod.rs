pub mod extract;
pub mod lsp;
pub mod projects;

/// Result of a command handler.
pub type CommandResult = Result<(), Box<dyn std::error::Error>>;
