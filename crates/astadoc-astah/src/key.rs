//! Cache file naming.
//!
//! Provides [`DiagramKey`] for computing the fingerprint that names a
//! converted sheet.

use sha1::{Digest, Sha1};

/// Diagram parameters for cache file naming.
///
/// Two references produce the same file exactly when they name the same
/// diagram path and the same sheet.
#[derive(Debug, Clone, Copy)]
pub struct DiagramKey<'a> {
    /// Diagram path relative to the documentation source root, `/`-separated.
    pub path: &'a str,
    /// Sheet name; empty selects the first sheet.
    pub sheet: &'a str,
}

impl<'a> DiagramKey<'a> {
    #[must_use]
    pub fn new(path: &'a str, sheet: &'a str) -> Self {
        Self { path, sheet }
    }

    /// Hex SHA-1 of `path` immediately followed by `sheet`.
    #[must_use]
    pub fn compute_hash(&self) -> String {
        let mut hasher = Sha1::new();
        hasher.update(self.path.as_bytes());
        hasher.update(self.sheet.as_bytes());
        hex::encode(hasher.finalize())
    }

    /// File name of the converted image: `astah-<hash>.png`.
    ///
    /// ```
    /// use astadoc_astah::DiagramKey;
    ///
    /// let name = DiagramKey::new("diagram.asta", "").file_name();
    /// assert!(name.starts_with("astah-") && name.ends_with(".png"));
    /// assert_eq!(name.len(), "astah-".len() + 40 + ".png".len());
    /// ```
    #[must_use]
    pub fn file_name(&self) -> String {
        format!("astah-{}.png", self.compute_hash())
    }
}
