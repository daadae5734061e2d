use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced by [`crate::run`] and the extraction pipeline.
///
/// Startup-phase variants (`CallNotFound`, `MissingHook`, `MissingEvalCallback`,
/// `InvalidEvalCallback`, `UnsupportedDialect`, `Read`, `Parse`) all fire before
/// any file watch is registered. Failures inside the change loop are logged and
/// skipped instead of propagating — a mid-edit save is expected to be broken
/// sometimes and must not tear the session down.
#[derive(Debug, Error)]
pub enum DbgrError {
    /// No `dbgr(...)` call expression was found anywhere in the script.
    #[error("dbgr call not found")]
    CallNotFound,

    /// A `dbgr(...)` call was found but its first argument is missing or not
    /// a function expression.
    #[error("dbgr hook function is missing")]
    MissingHook,

    /// A `dbgr(...)` call was found but its second argument is missing or not
    /// a function expression.
    #[error("eval callback function is missing")]
    MissingEvalCallback,

    /// The script-side eval callback does not have the fixed
    /// `(_) => eval(_)` shape.
    #[error("invalid eval callback: expected `(_) => eval(_)`, found `{found}`")]
    InvalidEvalCallback { found: String },

    /// The caller file's extension is not one of `.js`/`.jsx`/`.ts`/`.tsx`.
    #[error("unsupported source dialect: {}", path.display())]
    UnsupportedDialect { path: PathBuf },

    /// The caller file could not be read.
    #[error("failed to read {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// tree-sitter returned no tree. The grammar is error-recovering, so this
    /// only happens on internal failure (e.g. a cancelled parse), never on
    /// merely invalid input.
    #[error("tree-sitter failed to produce a syntax tree")]
    Parse,

    /// Registering the file watch failed.
    #[error("failed to watch caller file")]
    Watch(#[source] notify::Error),
}
