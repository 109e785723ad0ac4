//
// handlers.rs
//
// Per-request orchestration of the completion pipeline:
// parse -> resolve imports -> build symbol table -> locate cursor ->
// generate suggestions -> format protocol items.
//

use anyhow::{Context, Result};
use tower_lsp::lsp_types::{
    CompletionItem, CompletionItemKind, Diagnostic, DiagnosticSeverity, Position, Range, Url,
};
use tree_sitter::{Node, Point};

use crate::imports;
use crate::parser_pool;
use crate::path_resolve;
use crate::state::WorldState;
use crate::suggest::{self, SuggestConfig, Suggestion, SuggestionKind};
use crate::symbols::{self, SymbolTable};

/// Completion items plus the non-fatal warnings gathered while resolving
/// imports. Warnings are delivered out-of-band from the response.
#[derive(Debug, Default)]
pub struct CompletionOutcome {
    pub items: Vec<CompletionItem>,
    pub warnings: Vec<String>,
}

/// Build completion candidates for the given document and cursor position.
///
/// Every request parses fresh and builds its own symbol table; nothing is
/// cached across requests. A malformed document location is the only
/// fatal error; unresolved imports degrade to warnings.
pub fn completion(state: &WorldState, uri: &Url, position: Position) -> Result<CompletionOutcome> {
    let path = path_resolve::resolve(uri.as_str())?;

    let Some(text) = state.documents.get_text(uri) else {
        log::trace!("completion: no open document for {uri}");
        return Ok(CompletionOutcome::default());
    };

    let tree = parser_pool::with_parser(|p| p.parse(&text, None))
        .context("grammar engine produced no parse tree")?;

    // Local declarations first, then each import in declaration order.
    let mut table = SymbolTable::new();
    symbols::collect_symbols(&tree, &text, &path, &mut table);

    let mut warnings = Vec::new();
    let import_refs = imports::extract_imports(&tree, &text);
    imports::resolve_imports(&import_refs, &path, &mut table, &mut warnings);

    // Translate the protocol's 0-based UTF-16 position into the grammar
    // engine's byte-column point before locating the cursor.
    let point = position_to_point(&text, position);
    let config = SuggestConfig::default();
    let suggestions = suggest::suggest(&tree, &text, &table, point, &config);

    log::trace!(
        "completion for {}:{}:{}: {} candidates, {} warnings",
        uri,
        position.line,
        position.character,
        suggestions.len(),
        warnings.len()
    );

    let items = suggestions.into_iter().map(to_completion_item).collect();
    Ok(CompletionOutcome { items, warnings })
}

/// completionItem/resolve is a pass-through: items carry everything at
/// creation and no lazy enrichment is performed.
pub fn resolve_completion_item(item: CompletionItem) -> CompletionItem {
    item
}

fn to_completion_item(suggestion: Suggestion) -> CompletionItem {
    let kind = match suggestion.kind {
        SuggestionKind::Keyword => CompletionItemKind::KEYWORD,
        SuggestionKind::Value => CompletionItemKind::VARIABLE,
        SuggestionKind::Function => CompletionItemKind::FUNCTION,
        SuggestionKind::Type => CompletionItemKind::CLASS,
    };
    CompletionItem {
        label: suggestion.label,
        kind: Some(kind),
        ..Default::default()
    }
}

/// Simple syntax diagnostics: one entry per error or missing node the
/// recovering parser reports.
pub fn diagnostics(state: &WorldState, uri: &Url) -> Vec<Diagnostic> {
    let Some(text) = state.documents.get_text(uri) else {
        return Vec::new();
    };
    let Some(tree) = parser_pool::with_parser(|p| p.parse(&text, None)) else {
        return Vec::new();
    };

    let mut out = Vec::new();
    collect_syntax_errors(tree.root_node(), &text, &mut out);
    out
}

fn collect_syntax_errors(node: Node, text: &str, out: &mut Vec<Diagnostic>) {
    if node.is_error() {
        out.push(syntax_diagnostic(node, text, "syntax error".to_string()));
        return; // one diagnostic per error region
    }
    if node.is_missing() {
        out.push(syntax_diagnostic(
            node,
            text,
            format!("missing '{}'", node.kind()),
        ));
        return;
    }
    if !node.has_error() {
        return;
    }
    for i in 0..node.child_count() {
        if let Some(child) = node.child(i) {
            collect_syntax_errors(child, text, out);
        }
    }
}

fn syntax_diagnostic(node: Node, text: &str, message: String) -> Diagnostic {
    Diagnostic {
        range: Range {
            start: point_to_position(text, node.start_position()),
            end: point_to_position(text, node.end_position()),
        },
        severity: Some(DiagnosticSeverity::ERROR),
        source: Some("magpie".to_string()),
        message,
        ..Default::default()
    }
}

/// Protocol position (0-based line, UTF-16 character) to engine point
/// (0-based row, byte column).
pub fn position_to_point(text: &str, position: Position) -> Point {
    let row = position.line as usize;
    let line = text.lines().nth(row).unwrap_or("");
    let target = position.character as usize;

    let mut utf16 = 0usize;
    let mut byte = 0usize;
    for ch in line.chars() {
        if utf16 >= target {
            break;
        }
        utf16 += ch.len_utf16();
        byte += ch.len_utf8();
    }
    Point::new(row, byte)
}

/// Engine point back to a protocol position.
pub fn point_to_position(text: &str, point: Point) -> Position {
    let line = text.lines().nth(point.row).unwrap_or("");
    let mut utf16 = 0usize;
    let mut byte = 0usize;
    for ch in line.chars() {
        if byte >= point.column {
            break;
        }
        byte += ch.len_utf8();
        utf16 += ch.len_utf16();
    }
    Position::new(point.row as u32, utf16 as u32)
}
