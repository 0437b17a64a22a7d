//! Document store implementation using Rope for efficient text operations.

use std::path::{Path, PathBuf};

use blits_atelier::DocumentKind;
use dashmap::DashMap;
use ropey::Rope;
use tokio::sync::broadcast;
use tower_lsp::lsp_types::{Position, TextDocumentContentChangeEvent, Url};

use crate::utils::position_to_offset;

/// A document managed by the LSP server.
#[derive(Debug)]
pub struct Document {
    /// Document URI
    pub uri: Url,
    /// Document version
    pub version: i32,
    /// Document content stored as a rope for efficient editing
    pub content: Rope,
    /// Language ID (e.g., "blits", "javascript")
    pub language_id: String,
}

impl Document {
    /// Create a new document.
    pub fn new(uri: Url, content: String, version: i32, language_id: String) -> Self {
        Self {
            uri,
            version,
            content: Rope::from_str(&content),
            language_id,
        }
    }

    /// Get the document content as a string.
    pub fn text(&self) -> String {
        self.content.to_string()
    }

    /// Get the number of lines in the document.
    pub fn line_count(&self) -> usize {
        self.content.len_lines()
    }

    /// File system path, for `file:` documents only.
    pub fn path(&self) -> Option<PathBuf> {
        if self.uri.scheme() != "file" {
            return None;
        }
        self.uri.to_file_path().ok()
    }

    /// Dominant language, from the language id or else the file extension.
    pub fn kind(&self) -> Option<DocumentKind> {
        DocumentKind::from_language_id(&self.language_id)
            .or_else(|| DocumentKind::from_path(Path::new(self.uri.path())))
    }

    pub fn offset_at(&self, position: Position) -> Option<usize> {
        position_to_offset(&self.content, position)
    }

    /// Apply an incremental change to the document.
    pub fn apply_change(&mut self, change: &TextDocumentContentChangeEvent, new_version: i32) {
        self.version = new_version;

        if let Some(range) = change.range {
            // Incremental change
            let start_offset = position_to_offset(&self.content, range.start);
            let end_offset = position_to_offset(&self.content, range.end);

            if let (Some(start), Some(end)) = (start_offset, end_offset) {
                if let (Ok(start_char), Ok(end_char)) = (
                    self.content.try_byte_to_char(start),
                    self.content.try_byte_to_char(end),
                ) {
                    self.content.remove(start_char..end_char);
                    self.content.insert(start_char, &change.text);
                }
            }
        } else {
            // Full content replacement
            self.content = Rope::from_str(&change.text);
        }
    }
}

/// Open/close notifications from a [`DocumentStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentEvent {
    Opened(Url),
    Closed(Url),
}

/// Thread-safe document store.
pub struct DocumentStore {
    documents: DashMap<Url, Document>,
    events: broadcast::Sender<DocumentEvent>,
}

impl Default for DocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentStore {
    /// Create a new document store.
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(64);
        Self {
            documents: DashMap::new(),
            events,
        }
    }

    /// Open a new document.
    pub fn open(&self, uri: Url, content: String, version: i32, language_id: String) {
        let doc = Document::new(uri.clone(), content, version, language_id);
        self.documents.insert(uri.clone(), doc);
        // No subscribers is fine.
        let _ = self.events.send(DocumentEvent::Opened(uri));
    }

    /// Close a document.
    pub fn close(&self, uri: &Url) {
        if self.documents.remove(uri).is_some() {
            let _ = self.events.send(DocumentEvent::Closed(uri.clone()));
        }
    }

    /// Listen for documents being opened and closed.
    pub fn subscribe(&self) -> broadcast::Receiver<DocumentEvent> {
        self.events.subscribe()
    }

    /// Get a document by URI.
    pub fn get(&self, uri: &Url) -> Option<dashmap::mapref::one::Ref<'_, Url, Document>> {
        self.documents.get(uri)
    }

    /// Apply changes to a document.
    pub fn apply_changes(
        &self,
        uri: &Url,
        changes: Vec<TextDocumentContentChangeEvent>,
        version: i32,
    ) {
        if let Some(mut doc) = self.documents.get_mut(uri) {
            for change in changes {
                doc.apply_change(&change, version);
            }
        }
    }

    /// Check if a document exists.
    pub fn contains(&self, uri: &Url) -> bool {
        self.documents.contains_key(uri)
    }

    /// Get all document URIs.
    pub fn uris(&self) -> Vec<Url> {
        self.documents.iter().map(|r| r.key().clone()).collect()
    }

    /// Get the number of open documents.
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Check if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}
