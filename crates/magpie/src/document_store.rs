//
// document_store.rs
//
// Process-wide cache of open-document buffer contents. Always reflects
// the latest in-editor text, not the on-disk file. The completion core
// only ever reads from it.
//

use dashmap::DashMap;
use tower_lsp::lsp_types::Url;

/// One open document's current buffer state.
#[derive(Debug, Clone)]
pub struct Document {
    pub text: String,
    pub version: Option<i32>,
}

/// Shared map of open documents, full-text sync.
#[derive(Debug, Default)]
pub struct DocumentStore {
    docs: DashMap<Url, Document>,
}

impl DocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(&self, uri: Url, text: String, version: Option<i32>) {
        self.docs.insert(uri, Document { text, version });
    }

    /// Replace a document's content (full-text sync). Unknown documents
    /// are inserted, so a missed didOpen does not wedge the session.
    pub fn update(&self, uri: &Url, text: String, version: Option<i32>) {
        self.docs.insert(uri.clone(), Document { text, version });
    }

    pub fn close(&self, uri: &Url) {
        self.docs.remove(uri);
    }

    pub fn get_text(&self, uri: &Url) -> Option<String> {
        self.docs.get(uri).map(|doc| doc.text.clone())
    }

    pub fn version(&self, uri: &Url) -> Option<i32> {
        self.docs.get(uri).and_then(|doc| doc.version)
    }

    pub fn contains(&self, uri: &Url) -> bool {
        self.docs.contains_key(uri)
    }

    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }
}
