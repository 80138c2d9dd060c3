//! Typed access to [`Bucket`] records.

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::Bucket;

/// JSON helpers layered over the byte-oriented [`Bucket`] API.
///
/// Kept as an extension trait so [`Bucket`] stays object-safe.
///
/// ```
/// use astadoc_cache::{BucketExt, NullStore, Store};
///
/// let store = NullStore;
/// let bucket = store.bucket("env");
/// bucket.set_json("guide/intro", "42", &vec!["diagrams/model.asta"]);
/// let deps: Option<Vec<String>> = bucket.get_json("guide/intro", "42");
/// assert!(deps.is_none());
/// ```
pub trait BucketExt: Bucket {
    /// Read and deserialize a record.
    ///
    /// A record that no longer deserializes (e.g., written by an older build
    /// with a different shape) is treated as a miss.
    fn get_json<T: DeserializeOwned>(&self, key: &str, stamp: &str) -> Option<T> {
        let bytes = self.get(key, stamp)?;
        match serde_json::from_slice(&bytes) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::debug!(key, error = %e, "discarding undecodable record");
                None
            }
        }
    }

    /// Serialize and write a record.
    fn set_json<T: Serialize>(&self, key: &str, stamp: &str, value: &T) {
        match serde_json::to_vec(value) {
            Ok(bytes) => self.set(key, stamp, &bytes),
            Err(e) => tracing::warn!(key, error = %e, "failed to encode record"),
        }
    }
}

impl<B: Bucket + ?Sized> BucketExt for B {}
