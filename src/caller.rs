use std::path::{Path, PathBuf};

use tree_sitter::Language;

use crate::error::DbgrError;

/// Source dialect of the caller file, selected by extension.
///
/// Uses a plain enum (not trait objects) — cheap to copy and pattern-matched
/// at dispatch boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    JavaScript,
    Jsx,
    TypeScript,
    Tsx,
}

impl Dialect {
    /// Detect the dialect from a file extension, or `None` if unsupported.
    pub fn from_extension(ext: &str) -> Option<Dialect> {
        match ext {
            "js" => Some(Dialect::JavaScript),
            "jsx" => Some(Dialect::Jsx),
            "ts" => Some(Dialect::TypeScript),
            "tsx" => Some(Dialect::Tsx),
            _ => None,
        }
    }

    /// Return the tree-sitter [`Language`] for this dialect.
    ///
    /// # Grammar selection rules
    /// - `.ts`  -> TypeScript grammar (`LANGUAGE_TYPESCRIPT`)
    /// - `.tsx` -> TSX grammar        (`LANGUAGE_TSX`)
    ///   These MUST be different: the TypeScript grammar cannot parse JSX, and
    ///   the TSX grammar breaks angle-bracket type assertions (`<T>expr`).
    /// - `.js`/`.jsx` -> JavaScript grammar (`LANGUAGE`)
    pub fn language(&self) -> Language {
        match self {
            Dialect::TypeScript => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
            Dialect::Tsx => tree_sitter_typescript::LANGUAGE_TSX.into(),
            Dialect::JavaScript | Dialect::Jsx => tree_sitter_javascript::LANGUAGE.into(),
        }
    }

    /// Whether snippets in this dialect need a type-stripping transform before
    /// they are directly executable.
    pub fn requires_transform(&self) -> bool {
        matches!(self, Dialect::TypeScript | Dialect::Tsx)
    }
}

/// Identifies the script file containing the `dbgr(...)` call.
///
/// The original design located the caller by inspecting live stack frames;
/// that is fragile and environment-dependent, so the caller names its own
/// file explicitly. The host layer that binds the script's `dbgr` call to
/// [`crate::run`] is expected to construct this from the script path it is
/// already executing.
#[derive(Debug, Clone)]
pub struct CallerContext {
    path: PathBuf,
    dialect: Dialect,
}

impl CallerContext {
    /// Build a context for the given script path, detecting the dialect from
    /// the file extension.
    ///
    /// # Errors
    /// Returns [`DbgrError::UnsupportedDialect`] when the extension is not
    /// `.js`, `.jsx`, `.ts` or `.tsx`.
    pub fn new(path: impl Into<PathBuf>) -> Result<Self, DbgrError> {
        let path = path.into();
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        let dialect = Dialect::from_extension(ext)
            .ok_or_else(|| DbgrError::UnsupportedDialect { path: path.clone() })?;
        Ok(CallerContext { path, dialect })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dialect_from_extension() {
        assert_eq!(Dialect::from_extension("js"), Some(Dialect::JavaScript));
        assert_eq!(Dialect::from_extension("jsx"), Some(Dialect::Jsx));
        assert_eq!(Dialect::from_extension("ts"), Some(Dialect::TypeScript));
        assert_eq!(Dialect::from_extension("tsx"), Some(Dialect::Tsx));
        assert_eq!(Dialect::from_extension("rs"), None);
        assert_eq!(Dialect::from_extension(""), None);
    }

    #[test]
    fn test_requires_transform() {
        assert!(Dialect::TypeScript.requires_transform());
        assert!(Dialect::Tsx.requires_transform());
        assert!(!Dialect::JavaScript.requires_transform());
        assert!(!Dialect::Jsx.requires_transform());
    }

    #[test]
    fn test_caller_context_detects_dialect() {
        let ctx = CallerContext::new("/tmp/app/session.ts").unwrap();
        assert_eq!(ctx.dialect(), Dialect::TypeScript);
        assert_eq!(ctx.path(), Path::new("/tmp/app/session.ts"));
    }

    #[test]
    fn test_caller_context_rejects_unknown_extension() {
        let err = CallerContext::new("/tmp/app/session.py").unwrap_err();
        assert!(matches!(err, DbgrError::UnsupportedDialect { .. }));
    }
}
