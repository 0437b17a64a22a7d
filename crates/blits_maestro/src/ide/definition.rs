//! Go to definition through the script engine.
//!
//! Targets inside a virtual document are mapped back to the real document
//! it was cut from. That works for the current document and for any other
//! open `.blits` document; targets in closed components are dropped.

use blits_canon::DefinitionTarget;
use tower_lsp::lsp_types::{GotoDefinitionResponse, Location, Position, Range, Url};

use super::IdeContext;
use crate::document::DocumentStore;
use crate::router::ServiceInstance;
use crate::virtual_code::document_path;

pub struct DefinitionService;

impl DefinitionService {
    pub async fn definition(
        ctx: &IdeContext,
        services: &ServiceInstance,
        documents: &DocumentStore,
    ) -> Option<GotoDefinitionResponse> {
        let (script, offset) = ctx.script_at_cursor()?;

        let service = services.language_service(&script.name).await;
        service.sync(&script.name, script.content()).await;

        let targets = match service.engine().definition(&script.name, offset).await {
            Ok(targets) => targets,
            Err(err) => {
                tracing::debug!("definition failed for {}: {}", script.name, err);
                return None;
            }
        };

        let locations: Vec<Location> = targets
            .into_iter()
            .filter_map(|target| Self::resolve(ctx, documents, target))
            .collect();

        if locations.is_empty() {
            None
        } else {
            Some(GotoDefinitionResponse::Array(locations))
        }
    }

    fn resolve(
        ctx: &IdeContext,
        documents: &DocumentStore,
        target: DefinitionTarget,
    ) -> Option<Location> {
        match target {
            DefinitionTarget::Virtual { name, span } => {
                if ctx.script.as_ref().is_some_and(|script| script.name == name) {
                    return Some(Location {
                        uri: ctx.uri.clone(),
                        range: ctx.script_range(span)?,
                    });
                }

                let uri = Url::from_file_path(document_path(&name)?).ok()?;
                let other = IdeContext::whole(documents, &uri)?;
                if other.script.as_ref()?.name != name {
                    return None;
                }
                Some(Location {
                    range: other.script_range(span)?,
                    uri,
                })
            }
            DefinitionTarget::External { uri, start, end } => {
                let uri = Url::parse(&uri).ok()?;
                Some(Location {
                    uri,
                    range: Range {
                        start: Position::new(start.line, start.character),
                        end: Position::new(end.line, end.character),
                    },
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ide::tests::{context_at, COMPONENT};
    use crate::router::tests::{open, workspace, RecordingEngine, RecordingFactory};
    use blits_canon::TextPosition;
    use std::sync::Arc;

    const NAME: &str = "/ws/app/src/Home.blits.__script.js";

    fn factory(definitions: Vec<DefinitionTarget>) -> Arc<RecordingFactory> {
        Arc::new(RecordingFactory {
            template: RecordingEngine {
                definitions,
                ..Default::default()
            },
            ..Default::default()
        })
    }

    fn locations(response: GotoDefinitionResponse) -> Vec<Location> {
        match response {
            GotoDefinitionResponse::Array(locations) => locations,
            GotoDefinitionResponse::Scalar(location) => vec![location],
            GotoDefinitionResponse::Link(_) => panic!("unexpected links"),
        }
    }

    #[tokio::test]
    async fn test_virtual_target_maps_to_document() {
        let (_store, ctx) = context_at(COMPONENT, "/ws/app/src/Home.blits", "width:");
        let script = ctx.script.as_ref().unwrap();
        let start = script.content().find("state").unwrap();

        let factory = factory(vec![DefinitionTarget::Virtual {
            name: NAME.to_string(),
            span: start..start + 5,
        }]);
        let (documents, router) = workspace(Arc::clone(&factory)).await;
        open(&documents, "/ws/app/src/Home.blits", COMPONENT);
        let services = router.service_instance().await;

        let response = DefinitionService::definition(&ctx, &services, &documents)
            .await
            .unwrap();
        let locations = locations(response);

        assert_eq!(locations.len(), 1);
        assert_eq!(locations[0].uri, ctx.uri);
        assert_eq!(
            locations[0].range,
            Range::new(Position::new(5, 2), Position::new(5, 7))
        );
    }

    #[tokio::test]
    async fn test_external_target_is_kept() {
        let factory = factory(vec![
            DefinitionTarget::External {
                uri: "file:///ws/app/node_modules/@lightningjs/blits/index.d.ts".to_string(),
                start: TextPosition {
                    line: 3,
                    character: 0,
                },
                end: TextPosition {
                    line: 3,
                    character: 12,
                },
            },
            // Closed component: dropped.
            DefinitionTarget::Virtual {
                name: "/ws/app/src/Closed.blits.__script.js".to_string(),
                span: 0..1,
            },
        ]);
        let (documents, router) = workspace(Arc::clone(&factory)).await;
        open(&documents, "/ws/app/src/Home.blits", COMPONENT);
        let services = router.service_instance().await;

        let (_store, ctx) = context_at(COMPONENT, "/ws/app/src/Home.blits", "Blits.");
        let locations = locations(
            DefinitionService::definition(&ctx, &services, &documents)
                .await
                .unwrap(),
        );

        assert_eq!(locations.len(), 1);
        assert!(locations[0].uri.path().ends_with("index.d.ts"));
        assert_eq!(locations[0].range.end, Position::new(3, 12));
    }

    #[tokio::test]
    async fn test_target_in_other_open_document() {
        let other = "<script>\nexport const width = 10\n</script>\n";
        let script_start = other.find("width").unwrap() - "<script>".len();

        let factory = factory(vec![DefinitionTarget::Virtual {
            name: "/ws/app/src/Theme.blits.__script.js".to_string(),
            span: script_start..script_start + 5,
        }]);
        let (documents, router) = workspace(Arc::clone(&factory)).await;
        open(&documents, "/ws/app/src/Home.blits", COMPONENT);
        let other_uri = open(&documents, "/ws/app/src/Theme.blits", other);
        let services = router.service_instance().await;

        let (_store, ctx) = context_at(COMPONENT, "/ws/app/src/Home.blits", "width:");
        let locations = locations(
            DefinitionService::definition(&ctx, &services, &documents)
                .await
                .unwrap(),
        );

        assert_eq!(locations[0].uri, other_uri);
        assert_eq!(
            locations[0].range,
            Range::new(Position::new(1, 13), Position::new(1, 18))
        );
    }
}
