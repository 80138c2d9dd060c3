//! Per-directive context.

use std::fs::File;
use std::path::{Path, PathBuf};

/// Where a directive sits: the document it belongs to and its line.
///
/// ```
/// use std::path::Path;
/// use astadoc_renderer::directive::DirectiveContext;
///
/// let ctx = DirectiveContext {
///     source_path: Some(Path::new("docs/guide/setup.md")),
///     base_dir: Path::new("docs/guide"),
///     line: 12,
/// };
///
/// assert_eq!(ctx.resolve_path("model.asta"), Path::new("docs/guide/model.asta"));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct DirectiveContext<'a> {
    /// Document being rendered, if it came from a file.
    pub source_path: Option<&'a Path>,
    /// Directory relative references are resolved against (the document's directory).
    pub base_dir: &'a Path,
    /// 1-based line of the directive.
    pub line: usize,
}

impl DirectiveContext<'_> {
    /// Resolve a reference against the document directory.
    ///
    /// Absolute references are returned unchanged.
    #[must_use]
    pub fn resolve_path(&self, reference: &str) -> PathBuf {
        self.base_dir.join(reference)
    }

    /// Whether `path` is a regular file that can be opened for reading.
    #[must_use]
    pub fn is_readable(&self, path: &Path) -> bool {
        path.is_file() && File::open(path).is_ok()
    }
}
