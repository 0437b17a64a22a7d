//! Template-likeness heuristic.
//!
//! A `template:` key alone does not make a string a template; this predicate
//! decides whether the value reads like Blits markup. It stays tolerant of
//! truncated input so a template the user is still typing keeps registering.

use once_cell::sync::Lazy;
use regex::Regex;

/// `:prop=` or `@event=` style attribute.
static BINDING_ATTRIBUTE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[:@][a-zA-Z][^=]*=").expect("binding attribute regex"));

/// Opening, self-closing, closing or truncated tag.
static TAG_SHAPE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"</?[a-zA-Z][a-zA-Z0-9_-]*").expect("tag shape regex"));

/// Whether `candidate` looks like a Blits template.
///
/// Accepts, after trimming:
/// - text starting with a `<!--` comment,
/// - text containing a `:name=` or `@name=` attribute,
/// - text containing something tag-shaped, as long as no prose precedes the
///   first `<`.
pub fn looks_like_template(candidate: &str) -> bool {
    let text = candidate.trim();
    if text.is_empty() {
        return false;
    }

    if text.starts_with("<!--") {
        return true;
    }

    if (text.contains(':') || text.contains('@')) && BINDING_ATTRIBUTE.is_match(text) {
        return true;
    }

    if !TAG_SHAPE.is_match(text) {
        return false;
    }

    match text.find('<') {
        Some(first_tag) => text[..first_tag].trim().is_empty(),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_markup() {
        assert!(looks_like_template("<Element w=\"10\">hi</Element>"));
        assert!(looks_like_template("\n    <Element>\n      <Text />\n    </Element>\n  "));
        assert!(looks_like_template("<Element />"));
        assert!(looks_like_template("</Element>"));
    }

    #[test]
    fn test_accepts_comment_and_bindings() {
        assert!(looks_like_template("<!-- todo -->"));
        assert!(looks_like_template(":x=\"$x\""));
        assert!(looks_like_template("@loaded=\"$onLoad\""));
    }

    #[test]
    fn test_accepts_truncated_tag() {
        assert!(looks_like_template("<Element w=\"10\" "));
        assert!(looks_like_template("<Elem"));
    }

    #[test]
    fn test_rejects_plain_strings() {
        assert!(!looks_like_template(""));
        assert!(!looks_like_template("   "));
        assert!(!looks_like_template("main"));
        assert!(!looks_like_template("a < b"));
        assert!(!looks_like_template("price: 10"));
    }

    #[test]
    fn test_rejects_prose_before_markup() {
        assert!(!looks_like_template("Hello <b>world</b>"));
        assert!(looks_like_template("   <b>world</b>"));
    }
}
