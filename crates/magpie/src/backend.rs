//
// backend.rs
//
// tower-lsp transport layer: wires protocol requests to the handlers and
// owns the shared state. Import warnings surface to the user through
// window/showMessage, out-of-band from the completion response.
//

use std::sync::Arc;

use tokio::sync::RwLock;
use tower_lsp::jsonrpc::{self, Result};
use tower_lsp::lsp_types::*;
use tower_lsp::Client;
use tower_lsp::LanguageServer;
use tower_lsp::LspService;
use tower_lsp::Server;

use crate::handlers;
use crate::state::{ClientCaps, WorldState};

pub struct Backend {
    client: Client,
    state: Arc<RwLock<WorldState>>,
}

impl Backend {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            state: Arc::new(RwLock::new(WorldState::new())),
        }
    }

    async fn publish_diagnostics(&self, uri: Url) {
        let (diags, version) = {
            let state = self.state.read().await;
            (
                handlers::diagnostics(&state, &uri),
                state.documents.version(&uri),
            )
        };
        self.client.publish_diagnostics(uri, diags, version).await;
    }
}

#[tower_lsp::async_trait]
impl LanguageServer for Backend {
    async fn initialize(&self, params: InitializeParams) -> Result<InitializeResult> {
        log::info!("initializing magpie");

        // Capability snapshot: computed once here, read-only afterward.
        {
            let mut state = self.state.write().await;
            state.client_caps = ClientCaps::from_initialize(&params);
            log::info!("client capabilities: {:?}", state.client_caps);
        }

        Ok(InitializeResult {
            capabilities: ServerCapabilities {
                text_document_sync: Some(TextDocumentSyncCapability::Kind(
                    TextDocumentSyncKind::FULL,
                )),
                completion_provider: Some(CompletionOptions {
                    resolve_provider: Some(true),
                    ..Default::default()
                }),
                ..Default::default()
            },
            server_info: Some(ServerInfo {
                name: String::from("magpie"),
                version: Some(String::from(env!("CARGO_PKG_VERSION"))),
            }),
        })
    }

    async fn initialized(&self, _: InitializedParams) {
        log::info!("magpie initialized");
    }

    async fn shutdown(&self) -> Result<()> {
        log::info!("magpie shutting down");
        Ok(())
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        let uri = params.text_document.uri;
        {
            let state = self.state.read().await;
            state.documents.open(
                uri.clone(),
                params.text_document.text,
                Some(params.text_document.version),
            );
        }
        self.publish_diagnostics(uri).await;
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        let uri = params.text_document.uri;
        let version = params.text_document.version;
        // Full sync: the last change event carries the entire document.
        if let Some(change) = params.content_changes.into_iter().last() {
            let state = self.state.read().await;
            state.documents.update(&uri, change.text, Some(version));
        }
        self.publish_diagnostics(uri).await;
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        let uri = params.text_document.uri;
        {
            let state = self.state.read().await;
            state.documents.close(&uri);
        }
        self.client.publish_diagnostics(uri, Vec::new(), None).await;
    }

    async fn completion(&self, params: CompletionParams) -> Result<Option<CompletionResponse>> {
        let uri = params.text_document_position.text_document.uri;
        let position = params.text_document_position.position;

        let outcome = {
            let state = self.state.read().await;
            handlers::completion(&state, &uri, position)
        };

        match outcome {
            Ok(outcome) => {
                for warning in &outcome.warnings {
                    self.client
                        .show_message(MessageType::WARNING, warning)
                        .await;
                }
                Ok(Some(CompletionResponse::Array(outcome.items)))
            }
            Err(err) => {
                log::error!("completion failed for {uri}: {err:#}");
                Err(jsonrpc::Error::invalid_params(format!("{err:#}")))
            }
        }
    }

    async fn completion_resolve(&self, item: CompletionItem) -> Result<CompletionItem> {
        Ok(handlers::resolve_completion_item(item))
    }
}

pub async fn start_lsp() -> anyhow::Result<()> {
    let stdin = tokio::io::stdin();
    let stdout = tokio::io::stdout();

    let (service, socket) = LspService::new(Backend::new);
    Server::new(stdin, stdout, socket).serve(service).await;

    Ok(())
}
