//! Hover information provider.
//!
//! Script-block hovers come from the project's script engine. Plain type
//! displays are wrapped in a code block of the block's language; markdown
//! from the engine passes through untouched.

use blits_atelier::ScriptLanguage;
use blits_canon::QuickInfo;
use tower_lsp::lsp_types::{Hover, HoverContents, MarkupContent, MarkupKind};

use super::IdeContext;
use crate::router::ServiceInstance;
use crate::utils::word_range_at;

/// Hover service for script blocks.
pub struct HoverService;

impl HoverService {
    pub async fn hover(ctx: &IdeContext, services: &ServiceInstance) -> Option<Hover> {
        let (script, offset) = ctx.script_at_cursor()?;

        let service = services.language_service(&script.name).await;
        service.sync(&script.name, script.content()).await;

        let info = match service.engine().quick_info(&script.name, offset).await {
            Ok(info) => info?,
            Err(err) => {
                tracing::debug!("hover failed for {}: {}", script.name, err);
                return None;
            }
        };

        let range = word_range_at(&ctx.text, ctx.offset)
            .and_then(|word| ctx.range(word))
            .or_else(|| info.span.clone().and_then(|span| ctx.script_range(span)));

        Some(Hover {
            contents: HoverContents::Markup(MarkupContent {
                kind: MarkupKind::Markdown,
                value: Self::render(info, script.language()),
            }),
            range,
        })
    }

    fn render(info: QuickInfo, language: ScriptLanguage) -> String {
        if info.is_markdown {
            info.contents
        } else {
            Self::wrap_in_code_block(&info.contents, language)
        }
    }

    fn wrap_in_code_block(contents: &str, language: ScriptLanguage) -> String {
        format!("```{}\n{}\n```", language.language_id(), contents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ide::tests::{context_at, COMPONENT};
    use crate::router::tests::{open, workspace, RecordingEngine, RecordingFactory};
    use std::sync::Arc;
    use tower_lsp::lsp_types::{Position, Range};

    fn factory(info: QuickInfo) -> Arc<RecordingFactory> {
        Arc::new(RecordingFactory {
            template: RecordingEngine {
                quick_info: Some(info),
                ..Default::default()
            },
            ..Default::default()
        })
    }

    #[tokio::test]
    async fn test_hover_wraps_type_display() {
        let factory = factory(QuickInfo {
            contents: "const Blits: BlitsStatic".to_string(),
            is_markdown: false,
            span: None,
        });
        let (documents, router) = workspace(Arc::clone(&factory)).await;
        open(&documents, "/ws/app/src/Home.blits", COMPONENT);
        let services = router.service_instance().await;

        let (_store, ctx) = context_at(COMPONENT, "/ws/app/src/Home.blits", "Blits.");
        let hover = HoverService::hover(&ctx, &services).await.unwrap();

        let HoverContents::Markup(markup) = hover.contents else {
            panic!("expected markup");
        };
        assert_eq!(markup.value, "```javascript\nconst Blits: BlitsStatic\n```");
        assert_eq!(
            hover.range,
            Some(Range::new(Position::new(4, 15), Position::new(4, 20)))
        );

        let engine = factory.engine(0);
        let (name, offset) = engine.queries.lock()[0].clone();
        assert_eq!(name, "/ws/app/src/Home.blits.__script.js");
        let script = ctx.script.as_ref().unwrap();
        assert_eq!(&script.content()[offset..offset + 5], "Blits");
    }

    #[tokio::test]
    async fn test_hover_passes_markdown_through() {
        let factory = factory(QuickInfo {
            contents: "**state**".to_string(),
            is_markdown: true,
            span: None,
        });
        let (documents, router) = workspace(Arc::clone(&factory)).await;
        open(&documents, "/ws/app/src/Home.blits", COMPONENT);
        let services = router.service_instance().await;

        let (_store, ctx) = context_at(COMPONENT, "/ws/app/src/Home.blits", "state()");
        let hover = HoverService::hover(&ctx, &services).await.unwrap();

        let HoverContents::Markup(markup) = hover.contents else {
            panic!("expected markup");
        };
        assert_eq!(markup.value, "**state**");
    }

    #[tokio::test]
    async fn test_no_hover_outside_script() {
        let factory = factory(QuickInfo {
            contents: "never".to_string(),
            is_markdown: false,
            span: None,
        });
        let (documents, router) = workspace(Arc::clone(&factory)).await;
        open(&documents, "/ws/app/src/Home.blits", COMPONENT);
        let services = router.service_instance().await;

        let (_store, ctx) = context_at(COMPONENT, "/ws/app/src/Home.blits", "Element");
        assert!(HoverService::hover(&ctx, &services).await.is_none());
        assert_eq!(factory.count(), 0);
    }

    #[tokio::test]
    async fn test_no_hover_without_project() {
        let factory = factory(QuickInfo {
            contents: "never".to_string(),
            is_markdown: false,
            span: None,
        });
        let (_documents, router) = workspace(Arc::clone(&factory)).await;
        let services = router.service_instance().await;

        let (_store, ctx) = context_at(COMPONENT, "/elsewhere/Home.blits", "Blits.");
        assert!(HoverService::hover(&ctx, &services).await.is_none());
    }
}
