//
// cursor.rs
//
// Maps a cursor position onto the grammar token context it falls inside.
// Positions are engine-convention points (0-based row, byte column);
// protocol positions are translated by the request handler before they
// reach this module.
//

use tree_sitter::{Node, Point, Tree};

pub const IDENTIFIER_KIND: &str = "identifier";

/// The token context a cursor position resolves to.
///
/// When the cursor sits inside (or at the end boundary of) an identifier
/// token, `token_index` is the located index minus one and `partial` holds
/// the text typed so far, so suggestion generation treats the cursor as
/// sitting before the partial identifier rather than after a completed
/// token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CursorContext {
    /// Index into the token stream, after the identifier adjustment.
    pub token_index: usize,
    /// Grammar state to enumerate continuations from. `None` means the
    /// start of the document (or a tree too malformed to yield a state).
    pub state: Option<u16>,
    /// Partially typed identifier text between token start and cursor.
    pub partial: Option<String>,
    /// Whether the located token sits in an error-recovered region.
    pub in_error: bool,
}

/// Locate the token context for `point`.
///
/// Finds the deepest terminal whose span contains the point, falling back
/// to the nearest preceding terminal when the point is in a gap. Tolerates
/// error-recovered trees: invalid parse states are skipped by walking back
/// through earlier terminals.
pub fn locate(tree: &Tree, text: &str, point: Point) -> CursorContext {
    let leaves = collect_leaves(tree.root_node());

    let mut containing: Option<usize> = None;
    let mut preceding: Option<usize> = None;
    for (i, leaf) in leaves.iter().enumerate() {
        if leaf.end_position() <= point {
            preceding = Some(i);
            continue;
        }
        if leaf.start_position() <= point {
            containing = Some(i);
        }
        break;
    }

    // A cursor at the exact end boundary of an identifier counts as inside
    // it: the user is mid-word, not after a completed token.
    if containing.is_none() {
        if let Some(p) = preceding {
            if leaves[p].kind() == IDENTIFIER_KIND && leaves[p].end_position() == point {
                containing = Some(p);
            }
        }
    }

    match containing {
        Some(i) if leaves[i].kind() == IDENTIFIER_KIND && point > leaves[i].start_position() => {
            CursorContext {
                token_index: i.saturating_sub(1),
                state: state_before(&leaves, i),
                partial: partial_text(leaves[i], text, point),
                in_error: in_error_context(leaves[i]),
            }
        }
        Some(i) => CursorContext {
            token_index: i,
            state: state_before(&leaves, i),
            partial: None,
            in_error: in_error_context(leaves[i]),
        },
        None => match preceding {
            Some(p) => CursorContext {
                token_index: p,
                state: state_after(&leaves, p),
                partial: None,
                in_error: in_error_context(leaves[p]),
            },
            None => CursorContext {
                token_index: 0,
                state: None,
                partial: None,
                in_error: false,
            },
        },
    }
}

/// Terminal tokens in source order, skipping extras (comments) and
/// zero-width missing tokens inserted by error recovery.
fn collect_leaves(root: Node) -> Vec<Node> {
    let mut leaves = Vec::new();
    walk_leaves(root, &mut leaves);
    leaves
}

fn walk_leaves<'t>(node: Node<'t>, leaves: &mut Vec<Node<'t>>) {
    if node.child_count() == 0 {
        if !node.is_extra() && !node.is_missing() {
            leaves.push(node);
        }
        return;
    }
    for i in 0..node.child_count() {
        if let Some(child) = node.child(i) {
            walk_leaves(child, leaves);
        }
    }
}

/// The grammar state in effect just before token `i`.
fn state_before(leaves: &[Node], i: usize) -> Option<u16> {
    let state = leaves[i].parse_state();
    if state != 0 {
        return Some(state);
    }
    if i == 0 {
        None
    } else {
        state_after(leaves, i - 1)
    }
}

/// The grammar state in effect just after token `i`, walking back past
/// tokens whose states were invalidated by error recovery.
fn state_after(leaves: &[Node], i: usize) -> Option<u16> {
    for j in (0..=i).rev() {
        let state = leaves[j].next_parse_state();
        if state != 0 {
            return Some(state);
        }
    }
    None
}

fn partial_text(leaf: Node, text: &str, point: Point) -> Option<String> {
    let start = leaf.start_position();
    if point.row != start.row || point.column < start.column {
        return None;
    }
    let len = leaf.end_byte() - leaf.start_byte();
    let offset = (point.column - start.column).min(len);
    text.get(leaf.start_byte()..leaf.start_byte() + offset)
        .map(str::to_string)
}

fn in_error_context(leaf: Node) -> bool {
    let mut current = Some(leaf);
    while let Some(node) = current {
        if node.is_error() || node.is_missing() {
            return true;
        }
        current = node.parent();
    }
    // A recovery node right next to the token still marks it as sitting at
    // the boundary of the broken region.
    leaf.prev_sibling()
        .is_some_and(|s| s.is_error() || s.is_missing())
        || leaf
            .next_sibling()
            .is_some_and(|s| s.is_error() || s.is_missing())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser_pool;

    fn parse(text: &str) -> Tree {
        parser_pool::with_parser(|p| p.parse(text, None)).expect("parse")
    }

    #[test]
    fn test_inside_identifier_decrements_token_index() {
        // Tokens: x(0) =(1) abc(2); cursor inside "abc".
        let text = "x = abc";
        let tree = parse(text);
        let ctx = locate(&tree, text, Point::new(0, 6));
        assert_eq!(ctx.token_index, 1, "index must be located index minus one");
        assert_eq!(ctx.partial.as_deref(), Some("ab"));
    }

    #[test]
    fn test_identifier_end_boundary_counts_as_inside() {
        let text = "x = abc";
        let tree = parse(text);
        let ctx = locate(&tree, text, Point::new(0, 7));
        assert_eq!(ctx.token_index, 1);
        assert_eq!(ctx.partial.as_deref(), Some("abc"));
    }

    #[test]
    fn test_gap_falls_back_to_preceding_token() {
        let text = "x = 1 ";
        let tree = parse(text);
        let ctx = locate(&tree, text, Point::new(0, 6));
        assert_eq!(ctx.token_index, 2);
        assert_eq!(ctx.partial, None);
        assert!(ctx.state.is_some());
    }

    #[test]
    fn test_empty_document_yields_start_context() {
        let text = "";
        let tree = parse(text);
        let ctx = locate(&tree, text, Point::new(0, 0));
        assert_eq!(ctx.token_index, 0);
        assert_eq!(ctx.state, None);
        assert_eq!(ctx.partial, None);
        assert!(!ctx.in_error);
    }

    #[test]
    fn test_clean_tree_produces_valid_states() {
        let text = "x = abc";
        let tree = parse(text);
        for col in 0..=7 {
            let ctx = locate(&tree, text, Point::new(0, col));
            if col > 0 {
                assert!(ctx.state.is_some(), "column {col} should have a state");
            }
        }
    }

    #[test]
    fn test_incomplete_assignment_is_error_context() {
        let text = "x = 1\ny = ";
        let tree = parse(text);
        let ctx = locate(&tree, text, Point::new(1, 4));
        assert!(ctx.in_error || ctx.state.is_some());
    }

    #[test]
    fn test_error_in_sibling_subtree_does_not_flag_clean_token() {
        // The error lives in the right-hand side; "x" itself is intact.
        let text = "x = (:)";
        let tree = parse(text);
        let ctx = locate(&tree, text, Point::new(0, 1));
        assert_eq!(ctx.partial.as_deref(), Some("x"));
        assert!(!ctx.in_error);
    }

    #[test]
    fn test_position_past_end_of_document() {
        let text = "x = 1\n";
        let tree = parse(text);
        let ctx = locate(&tree, text, Point::new(5, 0));
        // Falls back to the last token.
        assert_eq!(ctx.token_index, 2);
    }
}
