//! The script engine contract.
//!
//! Every query addresses a virtual document by name and a byte offset into
//! that document's text. Results come back in the same coordinates, so
//! callers only have to translate between the real document and the script
//! region once.

use std::ops::Range;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;

use crate::error::EngineError;

/// Hover text for a symbol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuickInfo {
    pub contents: String,
    /// Whether `contents` is already markdown; plain text is a type display.
    pub is_markdown: bool,
    /// Span of the symbol the info is about.
    pub span: Option<Range<usize>>,
}

/// Broad kind of a completion entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum CompletionKind {
    Text,
    Method,
    Function,
    Constructor,
    Field,
    Variable,
    Class,
    Interface,
    Module,
    Property,
    Keyword,
    Snippet,
    Constant,
    Other,
}

impl CompletionKind {
    /// Map an LSP `CompletionItemKind` number.
    pub fn from_lsp(kind: u32) -> Self {
        match kind {
            1 => Self::Text,
            2 => Self::Method,
            3 => Self::Function,
            4 => Self::Constructor,
            5 => Self::Field,
            6 => Self::Variable,
            7 => Self::Class,
            8 => Self::Interface,
            9 => Self::Module,
            10 => Self::Property,
            14 => Self::Keyword,
            15 => Self::Snippet,
            21 => Self::Constant,
            _ => Self::Other,
        }
    }
}

/// A single completion suggestion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionEntry {
    pub label: String,
    pub kind: CompletionKind,
    pub detail: Option<String>,
    pub documentation: Option<String>,
    pub insert_text: Option<String>,
    pub sort_text: Option<String>,
}

impl CompletionEntry {
    pub fn new(label: impl Into<String>, kind: CompletionKind) -> Self {
        Self {
            label: label.into(),
            kind,
            detail: None,
            documentation: None,
            insert_text: None,
            sort_text: None,
        }
    }
}

/// A zero-based line/character position, as LSP counts them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TextPosition {
    pub line: u32,
    pub character: u32,
}

/// Where a definition lives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum DefinitionTarget {
    /// Inside a virtual document synced to the engine.
    Virtual { name: String, span: Range<usize> },
    /// In a file the engine read from disk.
    External {
        uri: String,
        start: TextPosition,
        end: TextPosition,
    },
}

/// One callable signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignatureInfo {
    pub label: String,
    pub documentation: Option<String>,
    pub parameters: Vec<String>,
}

/// Signatures applicable at a call site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignatureHelp {
    pub signatures: Vec<SignatureInfo>,
    pub active_signature: u32,
    pub active_parameter: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Information,
    Hint,
}

impl Severity {
    /// Map an LSP `DiagnosticSeverity` number; unknown values are errors.
    pub fn from_lsp(severity: Option<u8>) -> Self {
        match severity {
            Some(2) => Self::Warning,
            Some(3) => Self::Information,
            Some(4) => Self::Hint,
            _ => Self::Error,
        }
    }
}

/// A problem reported for a virtual document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineDiagnostic {
    pub span: Range<usize>,
    pub severity: Severity,
    pub code: Option<String>,
    pub message: String,
}

/// A script-analysis engine scoped to one project root.
#[async_trait]
pub trait ScriptEngine: Send + Sync {
    /// Project root the engine resolves modules against.
    fn root(&self) -> &Path;

    /// Open `name` with `text`, or replace its text if already open.
    async fn sync_document(&self, name: &str, text: &str) -> Result<(), EngineError>;

    async fn close_document(&self, name: &str) -> Result<(), EngineError>;

    async fn completions(
        &self,
        name: &str,
        offset: usize,
    ) -> Result<Vec<CompletionEntry>, EngineError>;

    async fn quick_info(&self, name: &str, offset: usize) -> Result<Option<QuickInfo>, EngineError>;

    async fn definition(
        &self,
        name: &str,
        offset: usize,
    ) -> Result<Vec<DefinitionTarget>, EngineError>;

    async fn signature_help(
        &self,
        name: &str,
        offset: usize,
    ) -> Result<Option<SignatureHelp>, EngineError>;

    async fn diagnostics(&self, name: &str) -> Result<Vec<EngineDiagnostic>, EngineError>;

    /// Whether the engine can still answer. A dead engine is replaced on
    /// next use.
    fn is_alive(&self) -> bool {
        true
    }

    /// Release the engine. Queries after shutdown fail with
    /// [`EngineError::NotInitialized`].
    async fn shutdown(&self);
}

/// Creates engines for project roots.
#[async_trait]
pub trait ScriptEngineFactory: Send + Sync {
    async fn create(&self, root: &Path) -> Result<Arc<dyn ScriptEngine>, EngineError>;
}
