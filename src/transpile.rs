use std::ops::Range;

use tree_sitter::Node;

use crate::caller::Dialect;
use crate::error::DbgrError;
use crate::parse::parse_source;

/// Make a hook snippet directly executable for its dialect.
///
/// Plain JavaScript passes through untouched. TypeScript snippets are
/// type-stripped: erasing type syntax is the only transform a hook snippet
/// needs to become runnable JS, and it keeps the remaining text byte-for-byte
/// identical to what the developer wrote (no re-serialization, no renumbered
/// whitespace).
///
/// Stripped constructs:
/// - parameter / return type annotations (`x: T`, `(): T =>`)
/// - type parameter lists (`<T>` on functions)
/// - `as` / `satisfies` suffixes
/// - angle-bracket type assertions (`<T>expr`)
/// - optional-parameter markers (`x?: T`)
/// - non-null assertions (`expr!`)
///
/// # Errors
/// Returns [`DbgrError::Parse`] if tree-sitter fails to produce a tree for
/// the snippet (internal failure only).
pub fn strip_types(snippet: &str, dialect: Dialect) -> Result<String, DbgrError> {
    if !dialect.requires_transform() {
        return Ok(snippet.to_owned());
    }

    let tree = parse_source(snippet, dialect)?;
    let mut removals: Vec<Range<usize>> = Vec::new();
    collect_removals(tree.root_node(), &mut removals);

    if removals.is_empty() {
        return Ok(snippet.to_owned());
    }

    removals.sort_by_key(|r| r.start);
    let mut out = String::with_capacity(snippet.len());
    let mut pos = 0;
    for range in removals {
        if range.start > pos {
            out.push_str(&snippet[pos..range.start]);
        }
        pos = pos.max(range.end);
    }
    out.push_str(&snippet[pos..]);
    Ok(out)
}

/// Recursively collect byte ranges of type-only syntax.
fn collect_removals(node: Node, removals: &mut Vec<Range<usize>>) {
    match node.kind() {
        // Whole subtree is type syntax — remove and don't descend.
        "type_annotation" | "opting_type_annotation" | "omitting_type_annotation"
        | "type_parameters" => {
            removals.push(node.byte_range());
            return;
        }
        // `expr as T` / `expr satisfies T` — keep the expression, drop the rest.
        "as_expression" | "satisfies_expression" => {
            if let Some(value) = node.child(0) {
                removals.push(value.end_byte()..node.end_byte());
            }
        }
        // `<T>expr` — drop everything before the expression.
        "type_assertion" => {
            let count = node.named_child_count();
            if count > 0
                && let Some(expr) = node.named_child((count - 1) as u32)
            {
                removals.push(node.start_byte()..expr.start_byte());
            }
        }
        // `expr!` — drop the trailing `!`.
        "non_null_expression" => {
            if let Some(value) = node.child(0) {
                removals.push(value.end_byte()..node.end_byte());
            }
        }
        // `x?: T` — the annotation is handled above; also drop the `?`.
        "optional_parameter" => {
            let mut cursor = node.walk();
            for child in node.children(&mut cursor) {
                if child.kind() == "?" {
                    removals.push(child.byte_range());
                }
            }
        }
        _ => {}
    }

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        collect_removals(child, removals);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_javascript_passes_through() {
        let snippet = "(function (resume) { resume(); })";
        assert_eq!(
            strip_types(snippet, Dialect::JavaScript).unwrap(),
            snippet
        );
    }

    #[test]
    fn test_typescript_without_types_is_unchanged() {
        let snippet = "(function (resume) { resume(); })";
        assert_eq!(
            strip_types(snippet, Dialect::TypeScript).unwrap(),
            snippet
        );
    }

    #[test]
    fn test_strips_parameter_and_return_annotations() {
        let snippet = "((resume: () => void): void => { resume(); })";
        assert_eq!(
            strip_types(snippet, Dialect::TypeScript).unwrap(),
            "((resume) => { resume(); })"
        );
    }

    #[test]
    fn test_strips_as_expression() {
        let snippet = "((r) => { const n = r as unknown; n; })";
        assert_eq!(
            strip_types(snippet, Dialect::TypeScript).unwrap(),
            "((r) => { const n = r; n; })"
        );
    }

    #[test]
    fn test_strips_type_parameters() {
        let snippet = "(function go<T>(resume: T) { resume; })";
        assert_eq!(
            strip_types(snippet, Dialect::TypeScript).unwrap(),
            "(function go(resume) { resume; })"
        );
    }

    #[test]
    fn test_strips_optional_parameter_marker() {
        let snippet = "((a?: number) => { a; })";
        assert_eq!(
            strip_types(snippet, Dialect::TypeScript).unwrap(),
            "((a) => { a; })"
        );
    }

    #[test]
    fn test_strips_non_null_assertion() {
        let snippet = "((r) => { r!(); })";
        assert_eq!(
            strip_types(snippet, Dialect::TypeScript).unwrap(),
            "((r) => { r(); })"
        );
    }

    #[test]
    fn test_preserves_comments_and_formatting() {
        let snippet = "((resume: Fn) => {\n  // keep me\n  resume();\n})";
        assert_eq!(
            strip_types(snippet, Dialect::TypeScript).unwrap(),
            "((resume) => {\n  // keep me\n  resume();\n})"
        );
    }
}
