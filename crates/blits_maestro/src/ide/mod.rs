//! IDE features for the LSP server.
//!
//! Every provider works on an [`IdeContext`] snapshot of one document and
//! reaches the script engine through the router's [`ServiceInstance`], so a
//! document outside any active project simply gets empty answers.
//!
//! [`ServiceInstance`]: crate::router::ServiceInstance

pub mod completion;
pub mod definition;
pub mod diagnostics;
pub mod hover;
pub mod signature_help;
pub mod symbols;

pub use completion::{block_snippets, CompletionService};
pub use definition::DefinitionService;
pub use diagnostics::DiagnosticService;
pub use hover::HoverService;
pub use signature_help::SignatureHelpService;
pub use symbols::SymbolService;

use std::ops::Range as ByteRange;
use std::path::PathBuf;

use blits_atelier::DocumentKind;
use ropey::Rope;
use tower_lsp::lsp_types::{Position, Range, Url};

use crate::document::{Document, DocumentStore};
use crate::utils::{offset_to_position, offsets_to_range};
use crate::virtual_code::VirtualScript;

/// Snapshot of a document plus the cursor, taken once per request.
pub struct IdeContext {
    /// Document URI
    pub uri: Url,
    /// File path, for `file` URIs only
    pub path: Option<PathBuf>,
    /// Document content
    pub text: String,
    pub rope: Rope,
    pub kind: Option<DocumentKind>,
    /// Cursor offset in the document
    pub offset: usize,
    /// Script block of a `.blits` document
    pub script: Option<VirtualScript>,
}

impl IdeContext {
    /// Snapshot `uri` with the cursor at `position`.
    pub fn new(documents: &DocumentStore, uri: &Url, position: Position) -> Option<Self> {
        let doc = documents.get(uri)?;
        let offset = doc.offset_at(position)?;
        Some(Self::from_document(&doc, offset))
    }

    /// Snapshot `uri` without a meaningful cursor.
    pub fn whole(documents: &DocumentStore, uri: &Url) -> Option<Self> {
        let doc = documents.get(uri)?;
        Some(Self::from_document(&doc, 0))
    }

    fn from_document(doc: &Document, offset: usize) -> Self {
        let text = doc.text();
        let path = doc.path();
        let kind = doc.kind();

        let script = match (&path, kind) {
            (Some(path), Some(kind)) if kind.is_mixed_content() => {
                VirtualScript::extract(path, &text)
            }
            _ => None,
        };

        Self {
            uri: doc.uri.clone(),
            path,
            rope: doc.content.clone(),
            text,
            kind,
            offset,
            script,
        }
    }

    /// Whether this is a mixed-content `.blits` component.
    #[inline]
    pub fn is_blits(&self) -> bool {
        self.kind.is_some_and(DocumentKind::is_mixed_content)
    }

    /// The script block and the cursor translated into it, when the cursor
    /// sits inside the block.
    pub fn script_at_cursor(&self) -> Option<(&VirtualScript, usize)> {
        let script = self.script.as_ref()?;
        let offset = script.to_virtual(self.offset)?;
        Some((script, offset))
    }

    /// LSP range of a byte range in this document.
    pub fn range(&self, range: ByteRange<usize>) -> Option<Range> {
        offsets_to_range(&self.rope, range)
    }

    /// LSP range of a byte range in the script block.
    pub fn script_range(&self, range: ByteRange<usize>) -> Option<Range> {
        let script = self.script.as_ref()?;
        self.range(script.to_document(range.start)..script.to_document(range.end))
    }

    pub fn position(&self, offset: usize) -> Option<Position> {
        offset_to_position(&self.rope, offset)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) const COMPONENT: &str = "<template>\n  <Element w=\"$width\" />\n</template>\n<script>\nexport default Blits.Component('Home', {\n  state() { return { width: 10 } },\n})\n</script>\n";

    pub(crate) fn context_at(text: &str, path: &str, needle: &str) -> (DocumentStore, IdeContext) {
        let documents = DocumentStore::new();
        let uri = Url::from_file_path(path).unwrap();
        documents.open(uri.clone(), text.to_string(), 1, String::new());

        let offset = text.find(needle).unwrap();
        let position = offset_to_position(&Rope::from_str(text), offset).unwrap();
        let ctx = IdeContext::new(&documents, &uri, position).unwrap();
        (documents, ctx)
    }

    #[test]
    fn test_context_in_script() {
        let (_documents, ctx) = context_at(COMPONENT, "/ws/app/Home.blits", "Component");

        assert!(ctx.is_blits());
        let (script, offset) = ctx.script_at_cursor().unwrap();
        assert_eq!(script.name, "/ws/app/Home.blits.__script.js");
        assert_eq!(&script.content()[offset..offset + 9], "Component");
    }

    #[test]
    fn test_context_in_template() {
        let (_documents, ctx) = context_at(COMPONENT, "/ws/app/Home.blits", "Element");

        assert!(ctx.script.is_some());
        assert!(ctx.script_at_cursor().is_none());
    }

    #[test]
    fn test_script_documents_have_no_script_block() {
        let text = "export default { template: `<Element />` }";
        let (_documents, ctx) = context_at(text, "/ws/app/Home.js", "Element");

        assert_eq!(ctx.kind, Some(DocumentKind::JavaScript));
        assert!(ctx.script.is_none());
    }

    #[test]
    fn test_script_range_maps_back() {
        let (_documents, ctx) = context_at(COMPONENT, "/ws/app/Home.blits", "export");
        let script = ctx.script.as_ref().unwrap();
        let start = script.content().find("Blits").unwrap();

        let range = ctx.script_range(start..start + 5).unwrap();
        assert_eq!(range.start, Position::new(4, 15));
        assert_eq!(range.end, Position::new(4, 20));
    }
}
