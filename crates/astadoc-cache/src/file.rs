//! On-disk [`Store`].
//!
//! Each bucket is a directory and each record a file named after its key.
//! Keys may contain `/`, which maps to nested directories, so a document name
//! like `guide/intro` can be used as a key directly.
//!
//! Record layout:
//!
//! ```text
//! [stamp_len: u32 LE][stamp bytes][payload]
//! ```
//!
//! Records are written to a temporary file in the bucket directory and
//! renamed into place, so a reader never sees a half-written record even when
//! pages are rendered in parallel.
//!
//! The store root holds a `VERSION` file. When it is missing or differs from
//! the version passed to [`FileStore::new`] the root is wiped.

use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use crate::{Bucket, Store};

/// File-backed [`Store`].
///
/// ```text
/// {root}/
/// +-- VERSION
/// +-- env/
/// |   +-- guide/intro
/// +-- index/
///     +-- docs
/// ```
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Open (or initialize) a store at `root` for the given format version.
    ///
    /// I/O problems are logged, never returned: a broken store degrades to
    /// one that misses on every read.
    #[must_use]
    pub fn new(root: PathBuf, version: &str) -> Self {
        ensure_version(&root, version);
        Self { root }
    }
}

impl Store for FileStore {
    fn bucket(&self, name: &str) -> Box<dyn Bucket> {
        Box::new(FileBucket {
            dir: self.root.join(name),
        })
    }
}

struct FileBucket {
    dir: PathBuf,
}

impl FileBucket {
    fn write_record(&self, key: &str, stamp: &str, value: &[u8]) -> std::io::Result<()> {
        let path = self.dir.join(key);
        let parent = path.parent().unwrap_or(&self.dir);
        fs::create_dir_all(parent)?;

        let stamp_len = u32::try_from(stamp.len())
            .map_err(|_| std::io::Error::other("stamp too long"))?;

        let mut tmp = tempfile::NamedTempFile::new_in(parent)?;
        tmp.write_all(&stamp_len.to_le_bytes())?;
        tmp.write_all(stamp.as_bytes())?;
        tmp.write_all(value)?;
        tmp.persist(&path).map_err(|e| e.error)?;
        Ok(())
    }
}

impl Bucket for FileBucket {
    fn get(&self, key: &str, stamp: &str) -> Option<Vec<u8>> {
        let mut file = File::open(self.dir.join(key)).ok()?;

        let mut len_buf = [0u8; 4];
        file.read_exact(&mut len_buf).ok()?;
        let stamp_len = usize::try_from(u32::from_le_bytes(len_buf)).ok()?;

        let mut stored = vec![0u8; stamp_len];
        file.read_exact(&mut stored).ok()?;
        if !stamp.is_empty() && stored != stamp.as_bytes() {
            return None;
        }

        let mut payload = Vec::new();
        file.read_to_end(&mut payload).ok()?;
        Some(payload)
    }

    fn set(&self, key: &str, stamp: &str, value: &[u8]) {
        if let Err(e) = self.write_record(key, stamp, value) {
            tracing::warn!(key, dir = %self.dir.display(), error = %e, "failed to write record");
        }
    }

    fn remove(&self, key: &str) {
        match fs::remove_file(self.dir.join(key)) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!(key, error = %e, "failed to remove record"),
        }
    }
}

/// Wipe `root` unless its `VERSION` file holds `version`.
fn ensure_version(root: &Path, version: &str) {
    let version_file = root.join("VERSION");

    match fs::read_to_string(&version_file) {
        Ok(stored) if stored == version => {
            tracing::debug!(version, "build state version matches");
            return;
        }
        Ok(stored) => {
            tracing::info!(stored, version, "build state version changed, discarding");
        }
        Err(_) => {
            tracing::debug!(root = %root.display(), "initializing build state");
        }
    }

    if root.exists()
        && let Err(e) = fs::remove_dir_all(root)
    {
        tracing::warn!(error = %e, "failed to remove build state directory");
    }
    if let Err(e) = fs::create_dir_all(root) {
        tracing::warn!(error = %e, "failed to create build state directory");
        return;
    }
    if let Err(e) = fs::write(&version_file, version) {
        tracing::warn!(error = %e, "failed to write build state VERSION file");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn open(tmp: &TempDir, version: &str) -> FileStore {
        FileStore::new(tmp.path().join("state"), version)
    }

    #[test]
    fn test_stamp_must_match() {
        let tmp = TempDir::new().unwrap();
        let bucket = open(&tmp, "1").bucket("env");

        bucket.set("intro", "100", b"record");

        assert_eq!(bucket.get("intro", "100"), Some(b"record".to_vec()));
        assert_eq!(bucket.get("intro", "101"), None);
        assert_eq!(bucket.get("intro", ""), Some(b"record".to_vec()));
    }

    #[test]
    fn test_nested_key_and_overwrite() {
        let tmp = TempDir::new().unwrap();
        let bucket = open(&tmp, "1").bucket("env");

        bucket.set("guide/setup", "1", b"old");
        bucket.set("guide/setup", "2", b"new");

        assert_eq!(bucket.get("guide/setup", "1"), None);
        assert_eq!(bucket.get("guide/setup", "2"), Some(b"new".to_vec()));
    }

    #[test]
    fn test_remove() {
        let tmp = TempDir::new().unwrap();
        let bucket = open(&tmp, "1").bucket("env");

        bucket.set("intro", "1", b"record");
        bucket.remove("intro");
        bucket.remove("never-written");

        assert_eq!(bucket.get("intro", ""), None);
    }

    #[test]
    fn test_buckets_are_isolated() {
        let tmp = TempDir::new().unwrap();
        let store = open(&tmp, "1");

        store.bucket("env").set("docs", "", b"env");
        store.bucket("index").set("docs", "", b"index");

        assert_eq!(store.bucket("env").get("docs", ""), Some(b"env".to_vec()));
        assert_eq!(
            store.bucket("index").get("docs", ""),
            Some(b"index".to_vec())
        );
    }

    #[test]
    fn test_same_version_keeps_records() {
        let tmp = TempDir::new().unwrap();
        open(&tmp, "1").bucket("env").set("intro", "", b"kept");

        let reopened = open(&tmp, "1");
        assert_eq!(
            reopened.bucket("env").get("intro", ""),
            Some(b"kept".to_vec())
        );
    }

    #[test]
    fn test_version_change_discards_records() {
        let tmp = TempDir::new().unwrap();
        open(&tmp, "1").bucket("env").set("intro", "", b"stale");

        let reopened = open(&tmp, "2");
        assert_eq!(reopened.bucket("env").get("intro", ""), None);
        assert_eq!(
            fs::read_to_string(tmp.path().join("state/VERSION")).unwrap(),
            "2"
        );
    }

    #[test]
    fn test_truncated_record_is_a_miss() {
        let tmp = TempDir::new().unwrap();
        let store = open(&tmp, "1");
        fs::create_dir_all(tmp.path().join("state/env")).unwrap();
        fs::write(tmp.path().join("state/env/broken"), [9, 0]).unwrap();

        assert_eq!(store.bucket("env").get("broken", ""), None);
    }
}
