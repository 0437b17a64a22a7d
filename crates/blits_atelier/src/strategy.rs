//! Strategy selection for template extraction.

use blits_carton::FxHashSet;

use crate::block::extract_template_region;
use crate::pattern::extract_all_template_like_spans;
use crate::structural::extract_structural_spans;
use crate::types::{DocumentKind, Extraction, Span, Strategy};

/// All template regions of a document.
///
/// Mixed-content documents yield their `<template>` block (tags included).
/// Script documents always get the pattern scan; when the structural parse
/// also succeeds its spans win and pattern-only spans are merged in, and the
/// result is tagged [`Strategy::Structural`].
pub fn extract_templates(text: &str, kind: DocumentKind) -> Extraction {
    if kind.is_mixed_content() {
        return Extraction {
            via: Strategy::Pattern,
            spans: extract_template_region(text, true).into_iter().collect(),
        };
    }

    let pattern_spans = extract_all_template_like_spans(text);

    match extract_structural_spans(text, kind) {
        Some(structural_spans) => Extraction {
            via: Strategy::Structural,
            spans: merge(structural_spans, pattern_spans),
        },
        None => Extraction {
            via: Strategy::Pattern,
            spans: pattern_spans,
        },
    }
}

fn merge(primary: Vec<Span>, secondary: Vec<Span>) -> Vec<Span> {
    let known: FxHashSet<(usize, usize)> = primary.iter().map(|s| (s.start, s.end)).collect();

    let mut merged = primary;
    merged.extend(
        secondary
            .into_iter()
            .filter(|span| !known.contains(&(span.start, span.end))),
    );
    merged.sort_by_key(|span| span.start);
    merged
}
