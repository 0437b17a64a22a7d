//! Structural strategy: parse the document with oxc and walk the syntax tree.
//!
//! Precise where the pattern scan guesses, but a single syntax error anywhere
//! in the file makes the whole result unusable, so callers treat `None` as
//! "fall back to the pattern strategy".

use blits_carton::FxHashSet;
use oxc_allocator::Allocator;
use oxc_ast::ast::{
    Argument, CallExpression, Expression, ObjectExpression, ObjectPropertyKind, PropertyKey,
};
use oxc_ast_visit::{walk, Visit};
use oxc_parser::Parser;
use oxc_span::SourceType;

use crate::heuristic::looks_like_template;
use crate::types::{DocumentKind, RegionKind, Span};

/// Collect `template:` values from a script document's syntax tree.
///
/// The config object of `Blits.Component(name, config)` and
/// `Blits.Application(config)` is trusted as-is; any other object literal
/// only contributes values that pass [`looks_like_template`]. Template
/// literals contribute their first static chunk as content.
///
/// Returns `None` for mixed-content documents and whenever the parser
/// reports an error.
pub fn extract_structural_spans(text: &str, kind: DocumentKind) -> Option<Vec<Span>> {
    let source_type = match kind {
        DocumentKind::Blits => return None,
        DocumentKind::JavaScript => SourceType::mjs(),
        DocumentKind::TypeScript => SourceType::ts(),
    };

    let allocator = Allocator::default();
    let ret = Parser::new(&allocator, text, source_type).parse();

    if ret.panicked || !ret.errors.is_empty() {
        tracing::debug!(
            errors = ret.errors.len(),
            "structural parse failed, deferring to pattern scan"
        );
        return None;
    }

    let mut collector = TemplateCollector::default();
    collector.visit_program(&ret.program);

    let mut spans = collector.spans;
    spans.sort_by_key(|span| span.start);
    Some(spans)
}

#[derive(Default)]
struct TemplateCollector {
    spans: Vec<Span>,
    seen: FxHashSet<(usize, usize)>,
}

impl TemplateCollector {
    fn collect(&mut self, object: &ObjectExpression<'_>, require_template_shape: bool) {
        for property in &object.properties {
            let ObjectPropertyKind::ObjectProperty(property) = property else {
                continue;
            };
            if property.computed || property_key_name(&property.key) != Some("template") {
                continue;
            }

            let Some((outer, content)) = literal_value(&property.value) else {
                continue;
            };

            // Strip the delimiters.
            let start = outer.start as usize + 1;
            let end = (outer.end as usize).saturating_sub(1);
            if end < start || self.seen.contains(&(start, end)) {
                continue;
            }
            if require_template_shape && !looks_like_template(&content) {
                continue;
            }

            self.seen.insert((start, end));
            self.spans.push(Span {
                start,
                end,
                content,
                kind: RegionKind::TemplateLiteral,
            });
        }
    }
}

impl<'a> Visit<'a> for TemplateCollector {
    fn visit_call_expression(&mut self, call: &CallExpression<'a>) {
        if let Some(index) = blits_config_argument(&call.callee) {
            if let Some(Argument::ObjectExpression(config)) = call.arguments.get(index) {
                self.collect(config, false);
            }
        }
        walk::walk_call_expression(self, call);
    }

    fn visit_object_expression(&mut self, object: &ObjectExpression<'a>) {
        self.collect(object, true);
        walk::walk_object_expression(self, object);
    }
}

/// Index of the config argument for `Blits.Component` / `Blits.Application`.
fn blits_config_argument(callee: &Expression<'_>) -> Option<usize> {
    let Expression::StaticMemberExpression(member) = callee else {
        return None;
    };
    let Expression::Identifier(object) = &member.object else {
        return None;
    };
    if object.name.as_str() != "Blits" {
        return None;
    }
    match member.property.name.as_str() {
        "Component" => Some(1),
        "Application" => Some(0),
        _ => None,
    }
}

fn property_key_name<'k>(key: &'k PropertyKey<'_>) -> Option<&'k str> {
    match key {
        PropertyKey::StaticIdentifier(id) => Some(id.name.as_str()),
        PropertyKey::StringLiteral(s) => Some(s.value.as_str()),
        _ => None,
    }
}

/// Outer span and content of a string or template literal.
fn literal_value(value: &Expression<'_>) -> Option<(oxc_span::Span, String)> {
    match value {
        Expression::StringLiteral(s) => Some((s.span, s.value.to_string())),
        Expression::TemplateLiteral(t) => {
            let first = t.quasis.first()?;
            Some((t.span, first.value.raw.to_string()))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blits_component_template_is_trusted() {
        let text = "export default Blits.Component('Poster', {\n  template: `Loading`,\n})\n";
        let spans = extract_structural_spans(text, DocumentKind::JavaScript).unwrap();

        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].content, "Loading");
        assert_eq!(&text[spans[0].start..spans[0].end], "Loading");
    }

    #[test]
    fn test_application_config_is_first_argument() {
        let text = "Blits.Application({ template: '<Element />', routes: [] })";
        let spans = extract_structural_spans(text, DocumentKind::JavaScript).unwrap();
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].content, "<Element />");
    }

    #[test]
    fn test_generic_object_requires_template_shape() {
        let text = "const a = { template: 'main' }\nconst b = { 'template': \"<Text />\" }\n";
        let spans = extract_structural_spans(text, DocumentKind::JavaScript).unwrap();
        let contents: Vec<_> = spans.iter().map(|s| s.content.as_str()).collect();
        assert_eq!(contents, vec!["<Text />"]);
    }

    #[test]
    fn test_interpolated_literal_keeps_first_chunk() {
        let text = "const c: any = { template: `<Text content=\"${title}\" />` }\n";
        let spans = extract_structural_spans(text, DocumentKind::TypeScript).unwrap();

        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].content, "<Text content=\"");
        assert_eq!(
            &text[spans[0].start..spans[0].end],
            "<Text content=\"${title}\" />"
        );
    }

    #[test]
    fn test_syntax_error_yields_none() {
        let text = "Blits.Component('A', { template: '<Element />' ";
        assert!(extract_structural_spans(text, DocumentKind::JavaScript).is_none());
        assert!(extract_structural_spans("<template></template>", DocumentKind::Blits).is_none());
    }
}
