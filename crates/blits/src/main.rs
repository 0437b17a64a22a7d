//! # blits
//!
//! Command-line entry point for the Blits editor tooling: the language
//! server plus a couple of commands for inspecting what it sees.

mod commands;
mod config;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "blits")]
#[command(about = "Editor tooling for Lightning Blits apps", long_about = None)]
#[command(version, disable_version_flag = true)]
struct Cli {
    /// Print version
    #[arg(short = 'v', short_alias = 'V', long, action = clap::ArgAction::Version)]
    version: (),
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start Language Server Protocol server
    #[command(visible_alias = "maestro")]
    Lsp(commands::lsp::LspArgs),

    /// List the Blits projects in a workspace
    #[command(visible_alias = "atlas")]
    Projects(commands::projects::ProjectsArgs),

    /// Print the template and script regions of a file as JSON
    #[command(visible_alias = "atelier")]
    Extract(commands::extract::ExtractArgs),
}

fn main() {
    let cli = Cli::parse();
    let config = config::load_config(None);

    let result = match cli.command {
        Commands::Lsp(args) => commands::lsp::run(args, config),
        Commands::Projects(args) => commands::projects::run(args, config),
        Commands::Extract(args) => commands::extract::run(args),
    };

    if let Err(e) = result {
        eprintln!("\x1b[31mError:\x1b[0m {}", e);
        std::process::exit(1);
    }
}
