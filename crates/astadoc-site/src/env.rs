//! Build environment: what the previous build saw.
//!
//! For every document the builder records the files it depended on and
//! their modification times, stamped with the document's own modification
//! time, plus the images it embeds. A document needs rebuilding when that
//! record is missing or stale, or when one of its images is gone (including
//! images whose conversion failed).

use std::fs;
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

use astadoc_cache::{Bucket, BucketExt, Store};
use serde::{Deserialize, Serialize};

const DOCS_KEY: &str = "docs";

/// A dependency as it was when the page was built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct DependencyStamp {
    path: PathBuf,
    /// `None` when the file did not exist.
    mtime: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct DocRecord {
    dependencies: Vec<DependencyStamp>,
    #[serde(default)]
    outputs: Vec<PathBuf>,
}

/// Modification time of `path` in nanoseconds since the epoch, as text.
pub(crate) fn mtime_stamp(path: &Path) -> Option<String> {
    let modified = fs::metadata(path).and_then(|m| m.modified()).ok()?;
    let nanos = modified.duration_since(UNIX_EPOCH).map_or(0, |d| d.as_nanos());
    Some(nanos.to_string())
}

/// Per-document records and the list of documents of the last build.
pub(crate) struct BuildEnv {
    docs: Box<dyn Bucket>,
    index: Box<dyn Bucket>,
}

impl BuildEnv {
    pub(crate) fn new(store: &dyn Store) -> Self {
        Self {
            docs: store.bucket("env"),
            index: store.bucket("index"),
        }
    }

    fn key(docname: &str) -> String {
        format!("{docname}.json")
    }

    /// Whether the record for `docname` matches its source, every
    /// dependency still has the recorded modification time and every
    /// generated image exists.
    pub(crate) fn is_current(&self, docname: &str, source_stamp: &str) -> bool {
        let Some(record) = self
            .docs
            .get_json::<DocRecord>(&Self::key(docname), source_stamp)
        else {
            return false;
        };
        record
            .dependencies
            .iter()
            .all(|dep| mtime_stamp(&dep.path) == dep.mtime)
            && record.outputs.iter().all(|path| path.is_file())
    }

    /// Remember what `docname` was built from.
    pub(crate) fn record(
        &self,
        docname: &str,
        source_stamp: &str,
        dependencies: &[PathBuf],
        outputs: &[PathBuf],
    ) {
        let record = DocRecord {
            outputs: outputs.to_vec(),
            dependencies: dependencies
                .iter()
                .map(|path| DependencyStamp {
                    mtime: mtime_stamp(path),
                    path: path.clone(),
                })
                .collect(),
        };
        self.docs
            .set_json(&Self::key(docname), source_stamp, &record);
    }

    pub(crate) fn forget(&self, docname: &str) {
        self.docs.remove(&Self::key(docname));
    }

    /// Documents of the previous build.
    pub(crate) fn previous_docs(&self) -> Vec<String> {
        self.index.get_json(DOCS_KEY, "").unwrap_or_default()
    }

    pub(crate) fn save_docs(&self, docnames: &[String]) {
        self.index.set_json(DOCS_KEY, "", &docnames);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use astadoc_cache::{FileStore, NullStore};
    use pretty_assertions::assert_eq;
    use std::fs::File;
    use std::time::{Duration, SystemTime};

    fn store(dir: &Path) -> FileStore {
        FileStore::new(dir.join("cache"), "test")
    }

    fn touch(path: &Path, secs: u64) {
        File::options()
            .write(true)
            .open(path)
            .unwrap()
            .set_modified(SystemTime::UNIX_EPOCH + Duration::from_secs(secs))
            .unwrap();
    }

    #[test]
    fn test_mtime_stamp() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a.md");
        fs::write(&file, "").unwrap();
        touch(&file, 2);
        assert_eq!(mtime_stamp(&file).as_deref(), Some("2000000000"));
        assert_eq!(mtime_stamp(&dir.path().join("missing")), None);
    }

    #[test]
    fn test_record_and_check() {
        let dir = tempfile::tempdir().unwrap();
        let diagram = dir.path().join("model.asta");
        fs::write(&diagram, "asta").unwrap();
        touch(&diagram, 100);

        let store = store(dir.path());
        let env = BuildEnv::new(&store);
        assert!(!env.is_current("guide/intro", "1"));

        env.record("guide/intro", "1", std::slice::from_ref(&diagram), &[]);
        assert!(env.is_current("guide/intro", "1"));
        assert!(!env.is_current("guide/intro", "2"));

        touch(&diagram, 200);
        assert!(!env.is_current("guide/intro", "1"));

        env.record("guide/intro", "1", std::slice::from_ref(&diagram), &[]);
        fs::remove_file(&diagram).unwrap();
        assert!(!env.is_current("guide/intro", "1"));
    }

    #[test]
    fn test_missing_image_makes_doc_outdated() {
        let dir = tempfile::tempdir().unwrap();
        let image = dir.path().join("site/_images/astah-0.png");
        fs::create_dir_all(image.parent().unwrap()).unwrap();

        let store = store(dir.path());
        let env = BuildEnv::new(&store);

        // Conversion failed: the image was never written.
        env.record("index", "1", &[], std::slice::from_ref(&image));
        assert!(!env.is_current("index", "1"));

        fs::write(&image, "png").unwrap();
        assert!(env.is_current("index", "1"));

        fs::remove_file(&image).unwrap();
        assert!(!env.is_current("index", "1"));
    }

    #[test]
    fn test_parent_and_child_docnames_coexist() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path());
        let env = BuildEnv::new(&store);

        env.record("guide", "1", &[], &[]);
        env.record("guide/intro", "1", &[], &[]);
        assert!(env.is_current("guide", "1"));
        assert!(env.is_current("guide/intro", "1"));

        env.forget("guide");
        assert!(!env.is_current("guide", "1"));
        assert!(env.is_current("guide/intro", "1"));
    }

    #[test]
    fn test_doc_index() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path());
        let env = BuildEnv::new(&store);
        assert!(env.previous_docs().is_empty());

        env.save_docs(&["index".to_owned(), "guide/setup".to_owned()]);
        assert_eq!(BuildEnv::new(&store).previous_docs(), ["index", "guide/setup"]);
    }

    #[test]
    fn test_null_store_forgets() {
        let env = BuildEnv::new(&NullStore);
        env.record("index", "1", &[], &[]);
        env.save_docs(&["index".to_owned()]);
        assert!(!env.is_current("index", "1"));
        assert!(env.previous_docs().is_empty());
    }
}
