use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;

use crate::caller::Dialect;
use crate::error::DbgrError;
use crate::parse::{find_dbgr_call, parse_source};
use crate::transpile::strip_types;

// Shape cache (compiled once via OnceLock)
static EVAL_CALLBACK_SHAPE: OnceLock<Regex> = OnceLock::new();

/// Lenient pattern for the script-side eval callback: `(_) => eval(_)`,
/// tolerating optional parens around the parameter and optional single
/// spaces around the arrow.
fn eval_callback_shape() -> &'static Regex {
    EVAL_CALLBACK_SHAPE.get_or_init(|| {
        Regex::new(r"\(?_\)?\s?=>\s?eval\(_\)").expect("invalid eval callback shape regex")
    })
}

/// Read the caller file's current contents.
///
/// Called fresh every time current content is needed — the file is expected
/// to change under us, so nothing is cached.
///
/// # Errors
/// Returns [`DbgrError::Read`] if the path is missing or unreadable.
pub fn load_source(path: &Path) -> Result<String, DbgrError> {
    std::fs::read_to_string(path).map_err(|source| DbgrError::Read {
        path: path.to_path_buf(),
        source,
    })
}

/// Extract the current hook snippet from the caller file's source text.
///
/// Runs parse → match, validates the script-side eval callback's shape, then
/// slices the original text at the hook node's byte range — preserving the
/// developer's exact formatting and comments, unlike re-serializing the tree.
/// The slice is wrapped in parentheses so a `function` declaration form
/// evaluates as an expression, and type-stripped for TypeScript dialects.
///
/// # Errors
/// Propagates matcher errors ([`DbgrError::CallNotFound`],
/// [`DbgrError::MissingHook`], [`DbgrError::MissingEvalCallback`]) and fails
/// with [`DbgrError::InvalidEvalCallback`] when the second argument does not
/// have the `(_) => eval(_)` shape.
pub fn extract_hook(source: &str, dialect: Dialect) -> Result<String, DbgrError> {
    let tree = parse_source(source, dialect)?;
    let call = find_dbgr_call(&tree, source)?;

    let eval_cb_text = &source[call.eval_callback.byte_range()];
    if !eval_callback_shape().is_match(eval_cb_text) {
        return Err(DbgrError::InvalidEvalCallback {
            found: eval_cb_text.to_owned(),
        });
    }

    let wrapped = format!("({})", &source[call.hook.byte_range()]);
    strip_types(&wrapped, dialect)
}

#[cfg(test)]
mod tests {
    use super::*;

    const JS_SOURCE: &str = "\
const answer = 42;
dbgr(function (resume) {
    // paused
    resume(answer);
}, (_) => eval(_));
";

    #[test]
    fn test_extracts_wrapped_hook() {
        let snippet = extract_hook(JS_SOURCE, Dialect::JavaScript).unwrap();
        assert!(snippet.starts_with("(function (resume)"));
        assert!(snippet.ends_with("})"));
        assert!(snippet.contains("// paused"));
        assert!(snippet.contains("resume(answer);"));
    }

    #[test]
    fn test_extraction_is_idempotent_on_stable_source() {
        let first = extract_hook(JS_SOURCE, Dialect::JavaScript).unwrap();
        let second = extract_hook(JS_SOURCE, Dialect::JavaScript).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_eval_callback_shape_variants_accepted() {
        for cb in ["(_) => eval(_)", "_ => eval(_)", "(_)=>eval(_)"] {
            let src = format!("dbgr((r) => {{ r(); }}, {cb});");
            extract_hook(&src, Dialect::JavaScript).unwrap();
        }
    }

    #[test]
    fn test_wrong_shape_eval_callback_rejected() {
        let src = "dbgr((r) => { r(); }, (s) => eval(s));";
        match extract_hook(src, Dialect::JavaScript) {
            Err(DbgrError::InvalidEvalCallback { found }) => {
                assert_eq!(found, "(s) => eval(s)");
            }
            other => panic!("expected InvalidEvalCallback, got {other:?}"),
        }
    }

    #[test]
    fn test_typescript_hook_is_type_stripped() {
        let src = "dbgr((resume: () => void): void => { resume(); }, (_) => eval(_));";
        let snippet = extract_hook(src, Dialect::TypeScript).unwrap();
        assert_eq!(snippet, "((resume) => { resume(); })");
    }

    #[test]
    fn test_load_source_missing_file() {
        let err = load_source(Path::new("/nonexistent/dbgr-fixture.js")).unwrap_err();
        assert!(matches!(err, DbgrError::Read { .. }));
    }
}
