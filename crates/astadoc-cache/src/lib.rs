//! Persistent build-state storage for astadoc.
//!
//! The site builder remembers, between runs, which documents it rendered and
//! which files each of them depended on. This crate hides where that memory
//! lives behind two traits:
//!
//! - [`Store`]: Factory for named [`Bucket`]s
//! - [`Bucket`]: Key-value records guarded by a stamp
//!
//! # Implementations
//!
//! - [`NullStore`]: Remembers nothing, every build is a full build
//! - [`FileStore`]: Records on disk, wiped when the format version changes
//!
//! # Example
//!
//! ```
//! use astadoc_cache::{NullStore, Store};
//!
//! let store = NullStore;
//! let bucket = store.bucket("env");
//! bucket.set("index", "1700000000", b"{}");
//! assert_eq!(bucket.get("index", "1700000000"), None);
//! ```

mod ext;
mod file;

pub use ext::BucketExt;
pub use file::FileStore;

/// A named partition within a [`Store`].
///
/// Every record carries a stamp chosen by the caller, usually a modification
/// time. A lookup hits only when the stored stamp equals the requested one,
/// so a changed source file invalidates its record without an explicit purge.
pub trait Bucket: Send + Sync {
    /// Read a record.
    ///
    /// Returns `None` when the key is absent or was stored under another
    /// stamp. An empty `stamp` matches any stored stamp.
    fn get(&self, key: &str, stamp: &str) -> Option<Vec<u8>>;

    /// Write a record, replacing whatever was stored under `key`.
    ///
    /// Failures are logged and swallowed: losing a record only costs a
    /// rebuild.
    fn set(&self, key: &str, stamp: &str, value: &[u8]);

    /// Forget a record. Missing keys are ignored.
    fn remove(&self, key: &str);
}

/// Factory for isolated [`Bucket`]s.
pub trait Store: Send + Sync {
    /// Open a named bucket (e.g., "env", "index").
    fn bucket(&self, name: &str) -> Box<dyn Bucket>;
}

/// [`Bucket`] that stores nothing.
pub struct NullBucket;

impl Bucket for NullBucket {
    fn get(&self, _key: &str, _stamp: &str) -> Option<Vec<u8>> {
        None
    }

    fn set(&self, _key: &str, _stamp: &str, _value: &[u8]) {}

    fn remove(&self, _key: &str) {}
}

/// [`Store`] used when persistence is disabled.
pub struct NullStore;

impl Store for NullStore {
    fn bucket(&self, _name: &str) -> Box<dyn Bucket> {
        Box::new(NullBucket)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_store_forgets_everything() {
        let store = NullStore;
        let bucket = store.bucket("env");

        bucket.set("index", "1", b"[\"intro\"]");
        assert_eq!(bucket.get("index", "1"), None);
        assert_eq!(bucket.get("index", ""), None);

        bucket.remove("index");
        assert_eq!(bucket.get("index", ""), None);
    }
}
