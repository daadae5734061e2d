use tree_sitter::{Node, Parser, Tree};

use crate::caller::Dialect;
use crate::error::DbgrError;

/// The callee identifier the matcher looks for, case-sensitive.
const DBGR_IDENTIFIER: &str = "dbgr";

/// Node kinds that count as a function-valued expression argument.
/// Covers arrow functions, `function` expressions (named or anonymous) and
/// generators; `function` is the pre-0.21 grammar name kept for safety.
const FUNCTION_KINDS: &[&str] = &[
    "arrow_function",
    "function_expression",
    "function",
    "generator_function",
    "generator_function_expression",
];

/// Parse source text into a syntax tree.
///
/// tree-sitter's parser is error-recovering: syntactically broken input (a
/// file saved mid-edit) still yields a tree, with `ERROR` nodes around the
/// damage. That is exactly the tolerance the change loop needs.
///
/// # Errors
/// Returns [`DbgrError::Parse`] only when tree-sitter yields no tree at all,
/// which signals an internal failure rather than invalid input.
pub fn parse_source(source: &str, dialect: Dialect) -> Result<Tree, DbgrError> {
    let mut parser = Parser::new();
    parser
        .set_language(&dialect.language())
        .map_err(|_| DbgrError::Parse)?;
    parser.parse(source, None).ok_or(DbgrError::Parse)
}

/// The matched `dbgr(...)` call: its first two (function-valued) arguments.
pub struct DbgrCall<'tree> {
    /// Argument 0 — the hook function expression whose source gets extracted.
    pub hook: Node<'tree>,
    /// Argument 1 — the script-side eval callback, kept for the shape check.
    pub eval_callback: Node<'tree>,
}

/// Find the `dbgr(...)` call in document order.
///
/// Pre-order walk over the whole tree, testing every node on the way down and
/// halting on the first `dbgr` call — a single-match short-circuiting search,
/// not a collection pass. The first matching call decides the outcome: if its
/// arguments are malformed the search fails rather than continuing to a later
/// call.
///
/// # Errors
/// - [`DbgrError::CallNotFound`] — no call with a bare `dbgr` callee exists
///   (member accesses like `debug.dbgr(...)` do not match)
/// - [`DbgrError::MissingHook`] — argument 0 absent or not a function expression
/// - [`DbgrError::MissingEvalCallback`] — argument 1 absent or not a function
///   expression
pub fn find_dbgr_call<'tree>(
    tree: &'tree Tree,
    source: &str,
) -> Result<DbgrCall<'tree>, DbgrError> {
    let src = source.as_bytes();
    let mut cursor = tree.walk();
    loop {
        if let Some(result) = match_dbgr_call(cursor.node(), src) {
            return result;
        }
        if cursor.goto_first_child() {
            continue;
        }
        loop {
            if cursor.goto_next_sibling() {
                break;
            }
            if !cursor.goto_parent() {
                return Err(DbgrError::CallNotFound);
            }
        }
    }
}

/// Test a single node against the `dbgr(hook, evalCallback, ...)` pattern.
///
/// `None` means "not our call, keep walking"; `Some(Err(..))` means the call
/// was found but malformed, which aborts the search.
fn match_dbgr_call<'tree>(
    node: Node<'tree>,
    source: &[u8],
) -> Option<Result<DbgrCall<'tree>, DbgrError>> {
    if node.kind() != "call_expression" {
        return None;
    }
    let callee = node.child_by_field_name("function")?;
    if callee.kind() != "identifier" || node_text(callee, source) != DBGR_IDENTIFIER {
        return None;
    }
    let arguments = node.child_by_field_name("arguments")?;

    let mut cursor = arguments.walk();
    let args: Vec<Node<'tree>> = arguments
        .named_children(&mut cursor)
        .filter(|n| n.kind() != "comment")
        .collect();

    let hook = match args.first() {
        Some(n) if is_function_expression(*n) => *n,
        _ => return Some(Err(DbgrError::MissingHook)),
    };
    let eval_callback = match args.get(1) {
        Some(n) if is_function_expression(*n) => *n,
        _ => return Some(Err(DbgrError::MissingEvalCallback)),
    };

    Some(Ok(DbgrCall { hook, eval_callback }))
}

fn is_function_expression(node: Node) -> bool {
    FUNCTION_KINDS.contains(&node.kind())
}

fn node_text<'a>(node: Node<'a>, source: &'a [u8]) -> &'a str {
    node.utf8_text(source).unwrap_or("")
}
