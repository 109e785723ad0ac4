//
// suggest.rs
//
// Produces the completion candidate set for a cursor position: the
// grammar's valid next tokens, with the identifier category expanded to
// the names in the symbol table, narrowed by a pluggable token filter.
//

use std::collections::HashSet;

use tree_sitter::{Point, Tree};

use crate::cursor::{self, CursorContext, IDENTIFIER_KIND};
use crate::parser_pool;
use crate::symbols::{SymKind, SymbolTable};

/// Display category of a candidate. Attached for protocol icons only;
/// never used for filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuggestionKind {
    Keyword,
    Value,
    Function,
    Type,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suggestion {
    pub label: String,
    pub kind: SuggestionKind,
}

/// Matching policy applied to candidate text against the partially typed
/// prefix at the cursor. Swappable per call through `SuggestConfig`.
pub trait TokenFilter {
    fn matches(&self, candidate: &str, typed: &str) -> bool;
}

/// Case-insensitive subsequence match (default policy).
pub struct FuzzyFilter;

impl TokenFilter for FuzzyFilter {
    fn matches(&self, candidate: &str, typed: &str) -> bool {
        let mut candidates = candidate.chars().map(|c| c.to_ascii_lowercase());
        typed
            .chars()
            .map(|c| c.to_ascii_lowercase())
            .all(|t| candidates.any(|c| c == t))
    }
}

/// Exact prefix match.
pub struct PrefixFilter;

impl TokenFilter for PrefixFilter {
    fn matches(&self, candidate: &str, typed: &str) -> bool {
        candidate.starts_with(typed)
    }
}

/// No narrowing at all.
pub struct NoFilter;

impl TokenFilter for NoFilter {
    fn matches(&self, _candidate: &str, _typed: &str) -> bool {
        true
    }
}

static FUZZY: FuzzyFilter = FuzzyFilter;

/// Per-call suggestion configuration. Holds the filtering strategy
/// explicitly instead of a process-wide hook.
pub struct SuggestConfig<'a> {
    pub filter: &'a dyn TokenFilter,
}

impl Default for SuggestConfig<'_> {
    fn default() -> Self {
        Self { filter: &FUZZY }
    }
}

/// Generate completion candidates for `point`.
///
/// Candidates come from two sources, in this order: terminals the grammar
/// accepts from the cursor's state (keywords and spellable literal
/// tokens), then the symbol table's names whenever the grammar accepts an
/// identifier there. The result never repeats a label.
pub fn suggest(
    tree: &Tree,
    text: &str,
    table: &SymbolTable,
    point: Point,
    config: &SuggestConfig,
) -> Vec<Suggestion> {
    let ctx = cursor::locate(tree, text, point);
    suggest_at(&ctx, table, config)
}

/// Generate candidates for an already-located cursor context.
pub fn suggest_at(
    ctx: &CursorContext,
    table: &SymbolTable,
    config: &SuggestConfig,
) -> Vec<Suggestion> {
    let language = parser_pool::language();
    let typed = ctx.partial.as_deref().unwrap_or("");
    let state = ctx.state.unwrap_or_else(start_state);

    let mut out: Vec<Suggestion> = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();

    // A partial identifier under the cursor, or an error-recovered region,
    // means identifiers are necessarily valid here even when the recorded
    // state does not say so.
    let mut expects_identifier = ctx.partial.is_some() || ctx.in_error;

    if let Some(lookahead) = language.lookahead_iterator(state) {
        for symbol in lookahead {
            if symbol == 0 {
                continue; // end-of-input marker
            }
            let Some(name) = language.node_kind_for_id(symbol) else {
                continue;
            };
            if name == IDENTIFIER_KIND {
                expects_identifier = true;
                continue;
            }
            let display = if language.node_kind_is_named(symbol) {
                // Named terminals are token categories (string, integer, ...)
                // with no single spelling, except the literal keywords.
                match literal_display(name) {
                    Some(display) => display,
                    None => continue,
                }
            } else if word_like(name) {
                name
            } else {
                continue; // punctuation and operators
            };
            push_candidate(&mut out, &mut seen, display, SuggestionKind::Keyword, typed, config);
        }
    }

    if expects_identifier {
        for entry in table.iter_first() {
            let kind = match entry.kind {
                SymKind::Value => SuggestionKind::Value,
                SymKind::Function => SuggestionKind::Function,
                SymKind::Type => SuggestionKind::Type,
            };
            push_candidate(&mut out, &mut seen, &entry.name, kind, typed, config);
        }
    }

    out
}

fn push_candidate(
    out: &mut Vec<Suggestion>,
    seen: &mut HashSet<String>,
    label: &str,
    kind: SuggestionKind,
    typed: &str,
    config: &SuggestConfig,
) {
    if !config.filter.matches(label, typed) {
        return;
    }
    if !seen.insert(label.to_string()) {
        return;
    }
    out.push(Suggestion {
        label: label.to_string(),
        kind,
    });
}

/// Source spellings of named literal tokens whose grammar name differs
/// from how they are written.
fn literal_display(name: &str) -> Option<&'static str> {
    match name {
        "true" => Some("True"),
        "false" => Some("False"),
        "none" => Some("None"),
        "ellipsis" => Some("..."),
        _ => None,
    }
}

fn word_like(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic())
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// The grammar's start state. tree-sitter does not expose it directly, so
/// it is recovered from the first terminal of a one-token probe program.
fn start_state() -> u16 {
    let probe = "pass";
    let state = parser_pool::with_parser(|p| p.parse(probe, None)).and_then(|tree| {
        let root = tree.root_node();
        let leaf = root.descendant_for_byte_range(0, 1)?;
        let state = leaf.parse_state();
        (state != 0).then_some(state)
    });
    // Generated parsers reserve state 0 and begin in state 1.
    state.unwrap_or(1)
}
