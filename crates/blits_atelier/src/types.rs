//! Region types shared by every extraction strategy.

use std::path::Path;

use serde::Serialize;

/// What a located region holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RegionKind {
    /// A `<template>` block of a `.blits` document.
    Template,
    /// A `<script>` block of a `.blits` document.
    Script,
    /// A `template:` string value inside script code.
    TemplateLiteral,
}

/// A located region within a document's full text.
///
/// `start` and `end` are byte offsets into the document. For quoted values
/// they delimit the text between the quotes, so `end` is the offset of the
/// closing quote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub content: String,
    pub kind: RegionKind,
}

impl Span {
    /// Whether `offset` falls inside the region (end inclusive, so a cursor
    /// sitting right before the closing delimiter still counts).
    pub fn contains(&self, offset: usize) -> bool {
        self.start <= offset && offset <= self.end
    }

    /// Length of the region in bytes.
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Declared sub-language of a script region.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScriptLanguage {
    #[default]
    Js,
    Ts,
}

impl ScriptLanguage {
    /// Parse a `lang` attribute value. Unknown values yield `None`.
    pub fn from_attr(value: &str) -> Option<Self> {
        match value {
            "js" => Some(Self::Js),
            "ts" => Some(Self::Ts),
            _ => None,
        }
    }

    /// File extension a script engine sniffs to pick its grammar.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Js => "js",
            Self::Ts => "ts",
        }
    }

    /// LSP language identifier.
    pub fn language_id(self) -> &'static str {
        match self {
            Self::Js => "javascript",
            Self::Ts => "typescript",
        }
    }
}

/// A script region plus its declared sub-language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScriptRegion {
    #[serde(flatten)]
    pub span: Span,
    pub language: ScriptLanguage,
}

/// Dominant language of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    /// Mixed-content `.blits` component.
    Blits,
    JavaScript,
    TypeScript,
}

impl DocumentKind {
    /// Resolve an LSP language id.
    pub fn from_language_id(id: &str) -> Option<Self> {
        match id {
            "blits" => Some(Self::Blits),
            "javascript" | "javascriptreact" => Some(Self::JavaScript),
            "typescript" | "typescriptreact" => Some(Self::TypeScript),
            _ => None,
        }
    }

    /// Resolve from a file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()? {
            "blits" => Some(Self::Blits),
            "js" | "mjs" | "cjs" | "jsx" => Some(Self::JavaScript),
            "ts" | "mts" | "cts" | "tsx" => Some(Self::TypeScript),
            _ => None,
        }
    }

    pub fn is_mixed_content(self) -> bool {
        matches!(self, Self::Blits)
    }
}

/// Which strategy produced an [`Extraction`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    Structural,
    Pattern,
}

/// Template regions of a document, tagged with the strategy that found them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Extraction {
    pub via: Strategy,
    pub spans: Vec<Span>,
}

impl Extraction {
    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    /// The region containing `offset`, if any.
    pub fn span_at(&self, offset: usize) -> Option<&Span> {
        self.spans.iter().find(|span| span.contains(offset))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_script_language_default_and_attr() {
        assert_eq!(ScriptLanguage::default(), ScriptLanguage::Js);
        assert_eq!(ScriptLanguage::from_attr("ts"), Some(ScriptLanguage::Ts));
        assert_eq!(ScriptLanguage::from_attr("coffee"), None);
        assert_eq!(ScriptLanguage::Ts.extension(), "ts");
        assert_eq!(ScriptLanguage::Js.language_id(), "javascript");
    }

    #[test]
    fn test_document_kind_resolution() {
        assert_eq!(
            DocumentKind::from_language_id("blits"),
            Some(DocumentKind::Blits)
        );
        assert_eq!(
            DocumentKind::from_path(Path::new("/p/src/App.ts")),
            Some(DocumentKind::TypeScript)
        );
        assert_eq!(DocumentKind::from_path(Path::new("/p/README.md")), None);
        assert!(DocumentKind::Blits.is_mixed_content());
    }

    #[test]
    fn test_span_contains_is_end_inclusive() {
        let span = Span {
            start: 4,
            end: 8,
            content: "abcd".to_string(),
            kind: RegionKind::Script,
        };
        assert!(span.contains(4));
        assert!(span.contains(8));
        assert!(!span.contains(9));
        assert_eq!(span.len(), 4);
    }
}
