//! Registry of source file paths.

use crate::FileId;

/// An append-only mapping from [`FileId`] to file path.
///
/// Indices are assigned in registration order and never reused. Tokens and
/// AST nodes store only the compact [`FileId`]; the registry is consulted
/// once, when a diagnostic is rendered for the user.
///
/// The registry is owned by the compilation session rather than being a
/// process-wide table, so independent compilations never share state.
///
/// # Example
///
/// ```
/// use dtc_util::SourceRegistry;
///
/// let mut files = SourceRegistry::new();
/// let id = files.register("main.dt");
/// assert_eq!(files.path(id), "main.dt");
/// ```
#[derive(Debug, Default)]
pub struct SourceRegistry {
    paths: Vec<String>,
}

impl SourceRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a file path, returning its stable index.
    pub fn register(&mut self, path: impl Into<String>) -> FileId {
        let id = FileId(self.paths.len() as u32);
        self.paths.push(path.into());
        id
    }

    /// Look up the path for a registered file.
    ///
    /// Returns `"<unknown>"` for an id that was never registered; ids are
    /// only ever minted by [`register`](Self::register), so this arises from
    /// a default-constructed location at worst.
    pub fn path(&self, id: FileId) -> &str {
        self.paths.get(id.index()).map_or("<unknown>", String::as_str)
    }

    /// Number of registered files.
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// Returns true if no file has been registered.
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}
