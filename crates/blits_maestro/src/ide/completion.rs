//! Code completion provider.
//!
//! Inside the script block of a `.blits` component, completions come from
//! the project's script engine. Between blocks, block scaffolds are offered.

use blits_atelier::extract_template_region;
use blits_canon::{CompletionEntry, CompletionKind};
use tower_lsp::lsp_types::{
    CompletionItem, CompletionItemKind, CompletionResponse, Documentation, InsertTextFormat,
};

use super::IdeContext;
use crate::router::ServiceInstance;

/// Characters that open a completion session.
pub const TRIGGER_CHARACTERS: &[&str] = &[".", "<", "'", "\"", "/", "@"];

pub struct CompletionService;

impl CompletionService {
    pub async fn complete(
        ctx: &IdeContext,
        services: &ServiceInstance,
    ) -> Option<CompletionResponse> {
        if let Some((script, offset)) = ctx.script_at_cursor() {
            let service = services.language_service(&script.name).await;
            service.sync(&script.name, script.content()).await;

            let entries = match service.engine().completions(&script.name, offset).await {
                Ok(entries) => entries,
                Err(err) => {
                    tracing::debug!("completion failed for {}: {}", script.name, err);
                    return None;
                }
            };
            if entries.is_empty() {
                return None;
            }
            return Some(CompletionResponse::Array(
                entries.into_iter().map(Self::convert_entry).collect(),
            ));
        }

        if ctx.is_blits() && !Self::inside_template(ctx) {
            return Some(CompletionResponse::Array(block_snippets()));
        }

        None
    }

    /// Whether the cursor is within the `<template>` block, tags included.
    /// Right after the closing tag counts as outside.
    fn inside_template(ctx: &IdeContext) -> bool {
        extract_template_region(&ctx.text, true)
            .is_some_and(|span| (span.start..span.end).contains(&ctx.offset))
    }

    fn convert_entry(entry: CompletionEntry) -> CompletionItem {
        CompletionItem {
            label: entry.label,
            kind: Some(Self::convert_kind(entry.kind)),
            detail: entry.detail,
            documentation: entry.documentation.map(Documentation::String),
            insert_text: entry.insert_text,
            sort_text: entry.sort_text,
            ..Default::default()
        }
    }

    fn convert_kind(kind: CompletionKind) -> CompletionItemKind {
        match kind {
            CompletionKind::Text => CompletionItemKind::TEXT,
            CompletionKind::Method => CompletionItemKind::METHOD,
            CompletionKind::Function => CompletionItemKind::FUNCTION,
            CompletionKind::Constructor => CompletionItemKind::CONSTRUCTOR,
            CompletionKind::Field => CompletionItemKind::FIELD,
            CompletionKind::Variable => CompletionItemKind::VARIABLE,
            CompletionKind::Class => CompletionItemKind::CLASS,
            CompletionKind::Interface => CompletionItemKind::INTERFACE,
            CompletionKind::Module => CompletionItemKind::MODULE,
            CompletionKind::Property => CompletionItemKind::PROPERTY,
            CompletionKind::Keyword => CompletionItemKind::KEYWORD,
            CompletionKind::Snippet => CompletionItemKind::SNIPPET,
            CompletionKind::Constant => CompletionItemKind::CONSTANT,
            CompletionKind::Other => CompletionItemKind::TEXT,
        }
    }
}

/// Scaffolds for the blocks of a `.blits` component.
pub fn block_snippets() -> Vec<CompletionItem> {
    vec![
        CompletionItem {
            label: "template".to_string(),
            kind: Some(CompletionItemKind::SNIPPET),
            detail: Some("Add template block".to_string()),
            insert_text: Some("<template>\n\t$1\n</template>".to_string()),
            insert_text_format: Some(InsertTextFormat::SNIPPET),
            ..Default::default()
        },
        CompletionItem {
            label: "script".to_string(),
            kind: Some(CompletionItemKind::SNIPPET),
            detail: Some("Add script block".to_string()),
            insert_text: Some(
                "<script>\nimport Blits from '@lightningjs/blits'\n\nexport default Blits.Component('$1', {\n\t$0\n})\n</script>"
                    .to_string(),
            ),
            insert_text_format: Some(InsertTextFormat::SNIPPET),
            ..Default::default()
        },
        CompletionItem {
            label: "script lang=\"ts\"".to_string(),
            kind: Some(CompletionItemKind::SNIPPET),
            detail: Some("Add TypeScript script block".to_string()),
            insert_text: Some(
                "<script lang=\"ts\">\nimport Blits from '@lightningjs/blits'\n\nexport default Blits.Component('$1', {\n\t$0\n})\n</script>"
                    .to_string(),
            ),
            insert_text_format: Some(InsertTextFormat::SNIPPET),
            ..Default::default()
        },
    ]
}
