//! Compilation diagnostics.
//!
//! The compiler produces exactly two kinds of diagnostic: a syntax error at
//! a specific token and an unclosed grouping symbol. A diagnostic aborts the
//! current compilation unit; no phase attempts recovery, and partially built
//! AST storage is released by drop on the way out.

use thiserror::Error;

use crate::{SourceLoc, SourceRegistry};

/// Result type alias used throughout the lexing and parsing phases.
pub type Result<T> = std::result::Result<T, Diagnostic>;

/// A fatal compilation diagnostic.
///
/// The `Display` form omits the file path (only the compilation session
/// knows the registry); [`render`](Diagnostic::render) produces the full
/// user-visible message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Diagnostic {
    /// An unexpected token, including unclosed string/char literals.
    #[error("SyntaxException at {loc}\nNear: {near}")]
    Syntax {
        /// Location of the offending lexeme.
        loc: SourceLoc,
        /// The offending lexeme text.
        near: String,
    },

    /// A `(`, `{`, or `[` without a matching closer within scope.
    #[error("UnclosedGroupException at {loc}")]
    UnclosedGroup {
        /// Location of the opening symbol.
        loc: SourceLoc,
    },
}

impl Diagnostic {
    /// A syntax error at `loc`, reporting the lexeme `near`.
    pub fn syntax(loc: SourceLoc, near: impl Into<String>) -> Self {
        Diagnostic::Syntax {
            loc,
            near: near.into(),
        }
    }

    /// An unclosed-group error at the opener's location.
    pub fn unclosed_group(loc: SourceLoc) -> Self {
        Diagnostic::UnclosedGroup { loc }
    }

    /// Location the diagnostic points at.
    pub fn loc(&self) -> SourceLoc {
        match self {
            Diagnostic::Syntax { loc, .. } => *loc,
            Diagnostic::UnclosedGroup { loc } => *loc,
        }
    }

    /// Render the user-visible message:
    ///
    /// ```text
    /// <Kind>Exception at <path>:<line>:<col>
    /// Near: <raw-lexeme>
    /// ```
    ///
    /// The `Near:` line appears for syntax errors only. No source snippet,
    /// no caret, no color.
    pub fn render(&self, files: &SourceRegistry) -> String {
        match self {
            Diagnostic::Syntax { loc, near } => format!(
                "SyntaxException at {}:{}:{}\nNear: {}",
                files.path(loc.file),
                loc.line,
                loc.col,
                near
            ),
            Diagnostic::UnclosedGroup { loc } => format!(
                "UnclosedGroupException at {}:{}:{}",
                files.path(loc.file),
                loc.line,
                loc.col
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FileId;

    fn loc(line: u32, col: u32) -> SourceLoc {
        SourceLoc::new(line, col, FileId(0))
    }

    #[test]
    fn test_render_syntax() {
        let mut files = SourceRegistry::new();
        files.register("main.dt");
        let diag = Diagnostic::syntax(loc(4, 12), ";");
        assert_eq!(diag.render(&files), "SyntaxException at main.dt:4:12\nNear: ;");
    }

    #[test]
    fn test_render_unclosed_group() {
        let mut files = SourceRegistry::new();
        files.register("main.dt");
        let diag = Diagnostic::unclosed_group(loc(2, 9));
        assert_eq!(diag.render(&files), "UnclosedGroupException at main.dt:2:9");
    }

    #[test]
    fn test_display_without_registry() {
        let diag = Diagnostic::syntax(loc(1, 1), "+");
        assert_eq!(diag.to_string(), "SyntaxException at 1:1\nNear: +");
    }
}
