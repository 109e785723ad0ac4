//
// symbols.rs
//
// Accumulates declared names from parse trees into a per-request symbol
// table. Invoked once for the primary file and once per resolved import,
// all into the same table. Later declarations of a name never displace
// earlier ones.
//

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use tree_sitter::{Node, Tree};

/// Kind of a declared symbol, used for display categorization only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymKind {
    Value,
    Function,
    Type,
}

/// A declared name plus its kind and declaring location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolEntry {
    pub name: String,
    pub kind: SymKind,
    pub origin: PathBuf,
    pub line: usize,
}

/// Insertion-ordered mapping from name to every declaration of that name.
///
/// Built fresh for every completion request; never cached across requests.
#[derive(Debug, Default)]
pub struct SymbolTable {
    entries: IndexMap<String, Vec<SymbolEntry>>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, entry: SymbolEntry) {
        self.entries
            .entry(entry.name.clone())
            .or_default()
            .push(entry);
    }

    /// Declared names in first-declaration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// The first declaration of each name, in first-declaration order.
    pub fn iter_first(&self) -> impl Iterator<Item = &SymbolEntry> {
        self.entries.values().filter_map(|v| v.first())
    }

    /// Every declaration recorded under `name`, oldest first.
    pub fn declarations(&self, name: &str) -> &[SymbolEntry] {
        self.entries.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Total number of declarations, duplicates included.
    pub fn len(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Walk a parse tree and record every declaration into `table`.
pub fn collect_symbols(tree: &Tree, text: &str, origin: &Path, table: &mut SymbolTable) {
    visit(tree.root_node(), text, origin, table);
}

fn visit(node: Node, text: &str, origin: &Path, table: &mut SymbolTable) {
    match node.kind() {
        "function_definition" => {
            if let Some(name) = node.child_by_field_name("name") {
                push_entry(name, text, SymKind::Function, origin, table);
            }
        }
        "class_definition" => {
            if let Some(name) = node.child_by_field_name("name") {
                push_entry(name, text, SymKind::Type, origin, table);
            }
        }
        "assignment" => {
            if let Some(left) = node.child_by_field_name("left") {
                collect_assignment_targets(left, text, origin, table);
            }
        }
        _ => {}
    }

    for i in 0..node.child_count() {
        if let Some(child) = node.child(i) {
            visit(child, text, origin, table);
        }
    }
}

/// The left side of an assignment is either a single identifier or a
/// pattern list (`a, b = ...`); anything else declares nothing.
fn collect_assignment_targets(left: Node, text: &str, origin: &Path, table: &mut SymbolTable) {
    match left.kind() {
        "identifier" => push_entry(left, text, SymKind::Value, origin, table),
        "pattern_list" | "tuple_pattern" => {
            for i in 0..left.child_count() {
                if let Some(child) = left.child(i) {
                    if child.kind() == "identifier" {
                        push_entry(child, text, SymKind::Value, origin, table);
                    }
                }
            }
        }
        _ => {}
    }
}

fn push_entry(name_node: Node, text: &str, kind: SymKind, origin: &Path, table: &mut SymbolTable) {
    let Some(name) = text.get(name_node.byte_range()) else {
        return;
    };
    table.insert(SymbolEntry {
        name: name.to_string(),
        kind,
        origin: origin.to_path_buf(),
        line: name_node.start_position().row,
    });
}
