//! Document symbols: one per template or script region.

use blits_atelier::{extract_templates, RegionKind, Span};
use tower_lsp::lsp_types::{DocumentSymbol, SymbolKind};

use super::IdeContext;

pub struct SymbolService;

impl SymbolService {
    #[allow(deprecated)]
    pub fn symbols(ctx: &IdeContext) -> Vec<DocumentSymbol> {
        let Some(kind) = ctx.kind else {
            return Vec::new();
        };

        let mut regions: Vec<(usize, usize, String, SymbolKind)> = extract_templates(&ctx.text, kind)
            .spans
            .iter()
            .map(|span| (span.start, span.end, Self::name(span), SymbolKind::MODULE))
            .collect();

        if let Some(script) = &ctx.script {
            let span = &script.region.span;
            regions.push((
                span.start,
                span.end,
                format!("script ({})", script.language().extension()),
                SymbolKind::NAMESPACE,
            ));
        }
        regions.sort_by_key(|region| region.0);

        regions
            .into_iter()
            .filter_map(|(start, end, name, kind)| {
                let range = ctx.range(start..end)?;
                Some(DocumentSymbol {
                    name,
                    detail: None,
                    kind,
                    tags: None,
                    deprecated: None,
                    range,
                    selection_range: range,
                    children: None,
                })
            })
            .collect()
    }

    fn name(span: &Span) -> String {
        match span.kind {
            RegionKind::Template => "template".to_string(),
            RegionKind::Script => "script".to_string(),
            RegionKind::TemplateLiteral => {
                let preview: String = span
                    .content
                    .trim()
                    .chars()
                    .take_while(|c| *c != '\n')
                    .take(32)
                    .collect();
                format!("template: {}", preview)
            }
        }
    }
}
