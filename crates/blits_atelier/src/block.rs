//! Top-level `<template>` / `<script>` blocks of a `.blits` document.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::types::{RegionKind, ScriptLanguage, ScriptRegion, Span};

static TEMPLATE_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<template>(.*?)</template>").expect("template block regex"));

static SCRIPT_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<script([^>]*)>(.*?)</script>").expect("script block regex"));

/// A standalone `lang` attribute whose whole value is `ts` or `js`.
static LANG_ATTR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?:^|\s)lang\s*=\s*(?:"(ts|js)"|'(ts|js)'|(ts|js)(?:\s|$))"#)
        .expect("lang attribute regex")
});

/// Locate the first `<template>` block.
///
/// By default the span covers only the text between the tags; with
/// `tag_inclusive` it covers the tags as well.
pub fn extract_template_region(text: &str, tag_inclusive: bool) -> Option<Span> {
    let captures = TEMPLATE_BLOCK.captures(text)?;

    let matched = if tag_inclusive {
        captures.get(0)?
    } else {
        captures.get(1)?
    };

    Some(Span {
        start: matched.start(),
        end: matched.end(),
        content: matched.as_str().to_string(),
        kind: RegionKind::Template,
    })
}

/// Locate the first `<script>` block and its declared language.
///
/// A missing or unrecognized `lang` attribute means JavaScript.
pub fn extract_script_region(text: &str) -> Option<ScriptRegion> {
    let captures = SCRIPT_BLOCK.captures(text)?;
    let attributes = captures.get(1).map_or("", |m| m.as_str());
    let body = captures.get(2)?;

    let language = LANG_ATTR
        .captures(attributes)
        .and_then(|lang| lang.iter().skip(1).flatten().next())
        .and_then(|lang| ScriptLanguage::from_attr(lang.as_str()))
        .unwrap_or_default();

    Some(ScriptRegion {
        span: Span {
            start: body.start(),
            end: body.end(),
            content: body.as_str().to_string(),
            kind: RegionKind::Script,
        },
        language,
    })
}
