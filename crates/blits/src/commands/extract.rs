//! Extract command - print the template and script regions of a file

use std::path::PathBuf;

use blits_atelier::{extract_script_region, extract_templates, DocumentKind};
use clap::Args;
use serde_json::json;

use super::CommandResult;

#[derive(Args)]
pub struct ExtractArgs {
    /// A .blits, .js or .ts file
    pub file: PathBuf,
}

pub fn run(args: ExtractArgs) -> CommandResult {
    let kind = DocumentKind::from_path(&args.file)
        .ok_or_else(|| format!("unsupported file type: {}", args.file.display()))?;
    let text = std::fs::read_to_string(&args.file)
        .map_err(|e| format!("failed to read {}: {}", args.file.display(), e))?;

    let templates = extract_templates(&text, kind);
    let script = if kind.is_mixed_content() {
        extract_script_region(&text)
    } else {
        None
    };

    let output = json!({
        "file": args.file.display().to_string(),
        "kind": kind,
        "templates": templates,
        "script": script,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);

    Ok(())
}
