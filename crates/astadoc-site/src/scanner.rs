//! Document discovery by filesystem walking.

use std::fs;
use std::path::{Path, PathBuf};

/// A Markdown source file and the name it is built under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDoc {
    /// Path relative to the source directory without `.md`, `/`-separated
    /// (e.g., "index", "guide/setup").
    pub docname: String,
    /// Full path to the `.md` file.
    pub path: PathBuf,
}

impl SourceDoc {
    /// Output path of the page relative to the site root.
    #[must_use]
    pub fn page_url(&self) -> String {
        format!("{}.html", self.docname)
    }
}

/// Find every `.md` file under `source_dir`, skipping hidden files and
/// directories. Results are sorted by document name.
///
/// Returns an empty Vec if the source directory doesn't exist.
pub(crate) fn scan(source_dir: &Path) -> Vec<SourceDoc> {
    let mut docs = Vec::new();
    scan_directory(source_dir, "", &mut docs);
    docs.sort_by(|a, b| a.docname.cmp(&b.docname));
    docs
}

fn scan_directory(dir: &Path, prefix: &str, docs: &mut Vec<SourceDoc>) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };

    for entry in entries.filter_map(Result::ok) {
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.starts_with('.') {
            continue;
        }

        let path = entry.path();
        let child = if prefix.is_empty() {
            name.clone()
        } else {
            format!("{prefix}/{name}")
        };

        if entry.file_type().is_ok_and(|t| t.is_dir()) {
            scan_directory(&path, &child, docs);
        } else if let Some(docname) = child.strip_suffix(".md") {
            docs.push(SourceDoc {
                docname: docname.to_owned(),
                path,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn docnames(docs: &[SourceDoc]) -> Vec<&str> {
        docs.iter().map(|d| d.docname.as_str()).collect()
    }

    #[test]
    fn test_scan_nested() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("guide/deep")).unwrap();
        fs::write(dir.path().join("index.md"), "# Home").unwrap();
        fs::write(dir.path().join("guide/setup.md"), "# Setup").unwrap();
        fs::write(dir.path().join("guide/deep/index.md"), "# Deep").unwrap();
        fs::write(dir.path().join("guide/model.asta"), "asta").unwrap();

        let docs = scan(dir.path());
        assert_eq!(docnames(&docs), ["guide/deep/index", "guide/setup", "index"]);
        assert_eq!(docs[1].path, dir.path().join("guide/setup.md"));
        assert_eq!(docs[1].page_url(), "guide/setup.html");
    }

    #[test]
    fn test_scan_skips_hidden() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join(".astadoc")).unwrap();
        fs::write(dir.path().join(".astadoc/notes.md"), "").unwrap();
        fs::write(dir.path().join(".draft.md"), "").unwrap();
        fs::write(dir.path().join("visible.md"), "").unwrap();

        assert_eq!(docnames(&scan(dir.path())), ["visible"]);
    }

    #[test]
    fn test_scan_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        assert!(scan(&dir.path().join("missing")).is_empty());
    }
}
