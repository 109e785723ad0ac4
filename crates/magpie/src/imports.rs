//
// imports.rs
//
// Resolves `import name` declarations to sibling files by naming
// convention and feeds each resolved file into the symbol table. A bad
// import is a warning, never a failed request. Imports of an imported
// file are not followed.
//

use std::fs;
use std::path::{Path, PathBuf};

use tree_sitter::{Node, Tree};

use crate::parser_pool;
use crate::symbols::{self, SymbolTable};

/// Fixed extension of the sibling-file naming convention.
pub const SOURCE_EXTENSION: &str = "py";

/// An identifier extracted from a top-level import declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportReference {
    pub name: String,
    pub line: usize,
}

/// Extract the top-level import declarations of a parse tree.
///
/// Only single-segment names participate in the sibling-file convention;
/// dotted imports are outside the teaching subset and are skipped.
pub fn extract_imports(tree: &Tree, text: &str) -> Vec<ImportReference> {
    let root = tree.root_node();
    let mut out = Vec::new();

    for i in 0..root.child_count() {
        let Some(statement) = root.child(i) else {
            continue;
        };
        if statement.kind() != "import_statement" {
            continue;
        }
        for j in 0..statement.child_count() {
            let Some(part) = statement.child(j) else {
                continue;
            };
            match part.kind() {
                "dotted_name" => push_simple_name(part, text, &mut out),
                "aliased_import" => {
                    if let Some(name) = part.child_by_field_name("name") {
                        push_simple_name(name, text, &mut out);
                    }
                }
                _ => {}
            }
        }
    }
    out
}

fn push_simple_name(dotted: Node, text: &str, out: &mut Vec<ImportReference>) {
    let mut idents = Vec::new();
    for i in 0..dotted.child_count() {
        if let Some(child) = dotted.child(i) {
            if child.kind() == "identifier" {
                idents.push(child);
            }
        }
    }
    if let [ident] = idents[..] {
        if let Some(name) = text.get(ident.byte_range()) {
            out.push(ImportReference {
                name: name.to_string(),
                line: ident.start_position().row,
            });
        }
    }
}

/// Resolve each import against the owner file's directory and accumulate
/// the declarations of every resolvable file into `table`.
///
/// Misses and read failures each append one message to `warnings` and the
/// remaining imports still resolve (partial-failure semantics).
pub fn resolve_imports(
    imports: &[ImportReference],
    owner: &Path,
    table: &mut SymbolTable,
    warnings: &mut Vec<String>,
) {
    let directory = owner.parent().map(Path::to_path_buf).unwrap_or_default();

    for import in imports {
        let target = directory.join(format!("{}.{}", import.name, SOURCE_EXTENSION));
        if !target.is_file() {
            log::trace!("import '{}' not found at {}", import.name, target.display());
            warnings.push(format!(
                "unresolved import '{}': {} does not exist",
                import.name,
                target.display()
            ));
            continue;
        }

        let source = match fs::read_to_string(&target) {
            Ok(source) => source,
            Err(err) => {
                warnings.push(format!(
                    "cannot read import '{}' ({}): {}",
                    import.name,
                    target.display(),
                    err
                ));
                continue;
            }
        };

        let Some(tree) = parser_pool::with_parser(|p| p.parse(&source, None)) else {
            warnings.push(format!(
                "cannot parse import '{}' ({})",
                import.name,
                target.display()
            ));
            continue;
        };

        log::trace!("resolved import '{}' -> {}", import.name, target.display());
        symbols::collect_symbols(&tree, &source, &target, table);
    }
}

/// Resolve the conventional target path of an import without touching disk.
pub fn import_target(owner: &Path, name: &str) -> PathBuf {
    let directory = owner.parent().map(Path::to_path_buf).unwrap_or_default();
    directory.join(format!("{name}.{SOURCE_EXTENSION}"))
}
