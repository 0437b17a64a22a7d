//! Projects command - discover Blits projects under a directory

use std::path::PathBuf;
use std::sync::Arc;

use blits_atlas::{NativeHost, ProjectRegistry};
use clap::Args;

use super::CommandResult;
use crate::config::BlitsConfig;

#[derive(Args)]
pub struct ProjectsArgs {
    /// Workspace root to scan (defaults to the current directory)
    pub dir: Option<PathBuf>,

    /// Print the projects as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: ProjectsArgs, config: BlitsConfig) -> CommandResult {
    let dir = match args.dir {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };
    let root = dir.canonicalize()?;

    let runtime = tokio::runtime::Runtime::new()?;
    let projects = runtime.block_on(async {
        let host = Arc::new(NativeHost::new(vec![root]));
        let registry = ProjectRegistry::new(host, config.workspace);
        let projects = registry.discover().await;
        registry.dispose();
        projects
    });

    if args.json {
        println!("{}", serde_json::to_string_pretty(&projects)?);
        return Ok(());
    }

    if projects.is_empty() {
        eprintln!("No Blits projects found under {}", dir.display());
        return Ok(());
    }

    for project in &projects {
        let formatter = if project.has_formatter_plugin {
            " (formatter)"
        } else {
            ""
        };
        println!("{}  {}{}", project.name, project.root.display(), formatter);
    }

    Ok(())
}
