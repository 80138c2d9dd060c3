use std::fmt;

/// A diagram file plus the sheet to show, written `path` or `path#sheet`.
///
/// ```
/// use astadoc_astah::DiagramRef;
///
/// let reference = DiagramRef::parse("models/shop.asta#Order #2");
/// assert_eq!(reference.path, "models/shop.asta");
/// assert_eq!(reference.sheet(), "Order #2");
///
/// assert_eq!(DiagramRef::parse("shop.asta").sheet, None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagramRef {
    pub path: String,
    /// `None` selects the first sheet.
    pub sheet: Option<String>,
}

impl DiagramRef {
    /// Split on the first `#`. An empty sheet name is the same as none.
    #[must_use]
    pub fn parse(reference: &str) -> Self {
        let (path, sheet) = match reference.split_once('#') {
            Some((path, sheet)) => (path, Some(sheet)),
            None => (reference, None),
        };
        Self {
            path: path.trim().to_owned(),
            sheet: sheet.filter(|s| !s.is_empty()).map(str::to_owned),
        }
    }

    /// Sheet name, or `""` for the first sheet.
    #[must_use]
    pub fn sheet(&self) -> &str {
        self.sheet.as_deref().unwrap_or("")
    }
}

impl fmt::Display for DiagramRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.sheet {
            Some(sheet) => write!(f, "{}#{sheet}", self.path),
            None => f.write_str(&self.path),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_without_sheet() {
        let reference = DiagramRef::parse("diagram.asta");
        assert_eq!(reference.path, "diagram.asta");
        assert_eq!(reference.sheet, None);
        assert_eq!(reference.sheet(), "");
    }

    #[test]
    fn test_splits_on_first_hash() {
        let reference = DiagramRef::parse("diagram.asta#Class Diagram#2");
        assert_eq!(reference.path, "diagram.asta");
        assert_eq!(reference.sheet.as_deref(), Some("Class Diagram#2"));
    }

    #[test]
    fn test_trailing_hash_means_first_sheet() {
        assert_eq!(DiagramRef::parse("diagram.asta#").sheet, None);
    }

    #[test]
    fn test_display_round_trips() {
        assert_eq!(DiagramRef::parse("a/b.asta#Seq").to_string(), "a/b.asta#Seq");
        assert_eq!(DiagramRef::parse("a/b.asta").to_string(), "a/b.asta");
    }
}
