//
// state.rs
//
// Server-wide state shared across requests: the open-document store and
// the client capability snapshot taken at initialization.
//

use tower_lsp::lsp_types::InitializeParams;

use crate::document_store::DocumentStore;

/// Client capabilities relevant to this server, captured once during
/// `initialize` and never mutated afterward.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClientCaps {
    pub configuration: bool,
    pub workspace_folders: bool,
    pub snippet_support: bool,
}

impl ClientCaps {
    pub fn from_initialize(params: &InitializeParams) -> Self {
        let workspace = params.capabilities.workspace.as_ref();
        let configuration = workspace.and_then(|w| w.configuration).unwrap_or(false);
        let workspace_folders = workspace.and_then(|w| w.workspace_folders).unwrap_or(false);
        let snippet_support = params
            .capabilities
            .text_document
            .as_ref()
            .and_then(|t| t.completion.as_ref())
            .and_then(|c| c.completion_item.as_ref())
            .and_then(|i| i.snippet_support)
            .unwrap_or(false);
        Self {
            configuration,
            workspace_folders,
            snippet_support,
        }
    }
}

pub struct WorldState {
    pub documents: DocumentStore,
    pub client_caps: ClientCaps,
}

impl WorldState {
    pub fn new() -> Self {
        Self {
            documents: DocumentStore::new(),
            client_caps: ClientCaps::default(),
        }
    }
}

impl Default for WorldState {
    fn default() -> Self {
        Self::new()
    }
}
