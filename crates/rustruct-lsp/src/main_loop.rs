//! Main event loop for the LSP server.
//!
//! One synchronous loop owns everything: notifications apply document
//! changes and re-run the pipeline end-to-end, requests answer from the
//! cached result. There is no incremental reuse; the pipeline is cheap
//! enough to re-run on every keystroke.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crossbeam_channel::{Receiver, Sender};
use lsp_types::notification::{
    DidChangeTextDocument, DidCloseTextDocument, DidOpenTextDocument, DidSaveTextDocument,
    Notification, PublishDiagnostics,
};
use lsp_types::request::{Completion, Formatting, Initialize, InlayHintRequest, Request, Shutdown};
use lsp_types::{
    CompletionOptions, DocumentFormattingParams, InitializeParams, InitializeResult,
    InlayHintParams, OneOf, PublishDiagnosticsParams, ServerCapabilities, ServerInfo,
    TextDocumentSyncCapability, TextDocumentSyncKind, Uri,
};
use parking_lot::RwLock;
use rustruct_parser::{lex, parse, Analysis, FsIncluder, SemanticAnalyser};

use crate::handlers::diagnostics::group_by_source;
use crate::handlers::formatting::handle_formatting;
use crate::handlers::inlay_hints::handle_inlay_hints;
use crate::vfs::Vfs;

/// Convert a URI to a file path.
#[cfg(not(windows))]
fn uri_to_path(uri: &Uri) -> Option<PathBuf> {
    uri.as_str().strip_prefix("file://").map(PathBuf::from)
}

/// Convert a URI to a file path (Windows version).
#[cfg(windows)]
fn uri_to_path(uri: &Uri) -> Option<PathBuf> {
    uri.as_str()
        .strip_prefix("file://")
        .map(|p| p.strip_prefix('/').unwrap_or(p))
        .map(PathBuf::from)
}

/// State managed by the main loop.
pub struct MainLoopState {
    /// Virtual file system for open documents.
    pub vfs: Arc<RwLock<Vfs>>,
    /// Sender for outgoing LSP messages.
    pub sender: Sender<lsp_server::Message>,
    /// Diagnostics published in the last round, per URI, so stale ones can
    /// be cleared.
    pub diagnostics: HashMap<Uri, Vec<lsp_types::Diagnostic>>,
    /// Whether `initialize` has been answered.
    pub initialized: bool,
    /// Whether shutdown was requested.
    pub shutdown_requested: bool,
    includer: FsIncluder,
    analyser: SemanticAnalyser,
}

impl MainLoopState {
    /// Create a new main loop state.
    pub fn new(sender: Sender<lsp_server::Message>) -> Self {
        Self {
            vfs: Arc::new(RwLock::new(Vfs::new())),
            sender,
            diagnostics: HashMap::new(),
            initialized: false,
            shutdown_requested: false,
            includer: FsIncluder::new(),
            analyser: SemanticAnalyser::new(),
        }
    }

    /// Run the whole pipeline over one document.
    fn run_pipeline(&self, path: &Path, text: &str) -> Analysis {
        let source = path.to_string_lossy();
        let (tokens, mut diagnostics) = lex(&source, text, &self.includer);
        let (mut ast, parse_diagnostics) = parse(tokens);
        diagnostics.extend(parse_diagnostics);
        let (workspace, semantic_diagnostics) = self.analyser.analyse(&mut ast);
        diagnostics.extend(semantic_diagnostics);
        Analysis {
            workspace,
            ast,
            diagnostics,
        }
    }

    /// Handle an LSP message.
    fn handle_message(&mut self, msg: lsp_server::Message) {
        match msg {
            lsp_server::Message::Request(req) => self.handle_request(req),
            lsp_server::Message::Notification(notif) => self.handle_notification(notif),
            lsp_server::Message::Response(_resp) => {
                // We don't currently send requests to the client.
            }
        }
    }

    /// Handle an LSP request (expects a response).
    fn handle_request(&mut self, req: lsp_server::Request) {
        let id = req.id.clone();

        if !self.initialized && req.method != Initialize::METHOD {
            self.send(lsp_server::Message::Response(lsp_server::Response::new_err(
                id,
                lsp_server::ErrorCode::ServerNotInitialized as i32,
                "Not initialized".to_string(),
            )));
            return;
        }

        let result = match req.method.as_str() {
            Initialize::METHOD => self.handle_initialize(req),
            Shutdown::METHOD => {
                self.shutdown_requested = true;
                Ok(serde_json::Value::Null)
            }
            Formatting::METHOD => self.handle_formatting_request(req),
            InlayHintRequest::METHOD => self.handle_inlay_hint_request(req),
            // Advertised for future completion support; an empty result
            // keeps clients happy meanwhile.
            Completion::METHOD => Ok(serde_json::Value::Null),
            "$/cancellation" => Ok(serde_json::Value::Null),
            _ => {
                tracing::warn!("Unhandled request: {}", req.method);
                Err((
                    lsp_server::ErrorCode::MethodNotFound as i32,
                    "Method not found".to_string(),
                ))
            }
        };

        let response = match result {
            Ok(value) => lsp_server::Response::new_ok(id, value),
            Err((code, message)) => lsp_server::Response::new_err(id, code, message),
        };
        self.send(lsp_server::Message::Response(response));
    }

    /// Handle the initialize request.
    fn handle_initialize(
        &mut self,
        req: lsp_server::Request,
    ) -> Result<serde_json::Value, (i32, String)> {
        let _params: InitializeParams =
            serde_json::from_value(req.params).map_err(invalid_params)?;

        self.initialized = true;

        let capabilities = ServerCapabilities {
            text_document_sync: Some(TextDocumentSyncCapability::Kind(TextDocumentSyncKind::FULL)),
            document_formatting_provider: Some(OneOf::Left(true)),
            inlay_hint_provider: Some(OneOf::Left(true)),
            completion_provider: Some(CompletionOptions {
                resolve_provider: Some(true),
                ..Default::default()
            }),
            ..Default::default()
        };

        let result = InitializeResult {
            capabilities,
            server_info: Some(ServerInfo {
                name: "rustruct-lsp".to_string(),
                version: Some(crate::VERSION.to_string()),
            }),
        };

        serde_json::to_value(result).map_err(internal_error)
    }

    /// Handle the textDocument/formatting request.
    fn handle_formatting_request(
        &mut self,
        req: lsp_server::Request,
    ) -> Result<serde_json::Value, (i32, String)> {
        let params: DocumentFormattingParams =
            serde_json::from_value(req.params).map_err(invalid_params)?;

        let text = uri_to_path(&params.text_document.uri)
            .and_then(|path| self.vfs.read().get_content(&path));
        let Some(text) = text else {
            return Err((1, "Cannot format without content".to_string()));
        };

        let edits = handle_formatting(&params, &text);
        serde_json::to_value(edits).map_err(internal_error)
    }

    /// Handle the textDocument/inlayHint request.
    fn handle_inlay_hint_request(
        &mut self,
        req: lsp_server::Request,
    ) -> Result<serde_json::Value, (i32, String)> {
        let params: InlayHintParams = serde_json::from_value(req.params).map_err(invalid_params)?;

        let analysis = uri_to_path(&params.text_document.uri)
            .and_then(|path| self.vfs.read().get_analysis(&path));
        let Some(analysis) = analysis else {
            return Err((1, "Content not found".to_string()));
        };

        let hints = handle_inlay_hints(&params, &analysis.ast);
        serde_json::to_value(hints).map_err(internal_error)
    }

    /// Handle an LSP notification (no response expected).
    fn handle_notification(&mut self, notif: lsp_server::Notification) {
        match notif.method.as_str() {
            DidOpenTextDocument::METHOD => {
                if let Ok(params) =
                    serde_json::from_value::<lsp_types::DidOpenTextDocumentParams>(notif.params)
                {
                    self.on_did_open(params);
                }
            }
            DidChangeTextDocument::METHOD => {
                if let Ok(params) =
                    serde_json::from_value::<lsp_types::DidChangeTextDocumentParams>(notif.params)
                {
                    self.on_did_change(params);
                }
            }
            DidSaveTextDocument::METHOD | DidCloseTextDocument::METHOD => {
                // Saves and closes change nothing the pipeline cares about.
            }
            "initialized" => {
                tracing::info!("Client initialized");
            }
            "exit" => {
                tracing::info!("Exit notification received");
                std::process::exit(if self.shutdown_requested { 0 } else { 1 });
            }
            _ => {
                tracing::debug!("Unhandled notification: {}", notif.method);
            }
        }
    }

    /// Handle textDocument/didOpen.
    fn on_did_open(&mut self, params: lsp_types::DidOpenTextDocumentParams) {
        let uri = params.text_document.uri;
        let text = params.text_document.text;
        let version = params.text_document.version;

        tracing::info!("Document opened: {}", uri.as_str());

        let Some(path) = uri_to_path(&uri) else {
            return;
        };
        self.vfs.write().open(path.clone(), text.clone(), version);
        self.analyse_and_publish(&uri, &path, &text);
    }

    /// Handle textDocument/didChange. With full sync the last change
    /// carries the whole document.
    fn on_did_change(&mut self, params: lsp_types::DidChangeTextDocumentParams) {
        let uri = params.text_document.uri;
        let version = params.text_document.version;

        let Some(change) = params.content_changes.into_iter().last() else {
            return;
        };
        let text = change.text;

        tracing::debug!("Document changed: {}", uri.as_str());

        let Some(path) = uri_to_path(&uri) else {
            return;
        };
        self.vfs.write().update(&path, text.clone(), version);
        self.analyse_and_publish(&uri, &path, &text);
    }

    /// Run the pipeline, cache its output and publish diagnostics, grouped
    /// per source file so included files highlight in their own buffers.
    fn analyse_and_publish(&mut self, uri: &Uri, path: &Path, text: &str) {
        let analysis = self.run_pipeline(path, text);
        let mut grouped = group_by_source(&analysis.diagnostics);
        self.vfs.write().set_analysis(path, Arc::new(analysis));

        // The document itself is always published, empty lists included, so
        // stale squiggles clear.
        let own_source = path.to_string_lossy().into_owned();
        grouped.entry(own_source.clone()).or_default();

        let mut published: HashMap<Uri, Vec<lsp_types::Diagnostic>> = HashMap::new();
        for (source, diagnostics) in grouped {
            let target = if source == own_source {
                uri.clone()
            } else {
                let Ok(parsed) = format!("file://{source}").parse::<Uri>() else {
                    continue;
                };
                parsed
            };
            tracing::debug!(
                "Publishing {} diagnostics for {}",
                diagnostics.len(),
                target.as_str()
            );
            self.send_diagnostics(&target, diagnostics.clone());
            published.insert(target, diagnostics);
        }

        // Clear URIs that had diagnostics last round but none now.
        let stale: Vec<Uri> = self
            .diagnostics
            .keys()
            .filter(|known| !published.contains_key(known))
            .cloned()
            .collect();
        for uri in stale {
            self.send_diagnostics(&uri, Vec::new());
        }
        self.diagnostics = published;
    }

    /// Send diagnostics to the client.
    fn send_diagnostics(&self, uri: &Uri, diagnostics: Vec<lsp_types::Diagnostic>) {
        let params = PublishDiagnosticsParams {
            uri: uri.clone(),
            diagnostics,
            version: None,
        };
        let notif = lsp_server::Notification::new(PublishDiagnostics::METHOD.to_string(), params);
        self.send(lsp_server::Message::Notification(notif));
    }

    /// Send a message to the client.
    fn send(&self, msg: lsp_server::Message) {
        if let Err(e) = self.sender.send(msg) {
            tracing::error!("Failed to send message: {}", e);
        }
    }
}

fn invalid_params(error: serde_json::Error) -> (i32, String) {
    (
        lsp_server::ErrorCode::InvalidParams as i32,
        error.to_string(),
    )
}

fn internal_error(error: serde_json::Error) -> (i32, String) {
    (
        lsp_server::ErrorCode::InternalError as i32,
        error.to_string(),
    )
}

/// Run the main event loop until the connection closes.
pub fn run_main_loop(receiver: Receiver<lsp_server::Message>, sender: Sender<lsp_server::Message>) {
    let mut state = MainLoopState::new(sender);

    tracing::info!("Main loop started");

    for msg in receiver {
        state.handle_message(msg);
    }

    tracing::info!("Main loop ended");
}
