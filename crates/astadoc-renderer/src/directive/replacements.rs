//! Placeholder substitution for post-processing.

/// Placeholder-to-HTML substitutions collected from every handler and
/// applied together once rendering is done.
///
/// ```
/// use astadoc_renderer::directive::Replacements;
///
/// let mut html = "<p>{{ASTAH_IMAGE_0}}</p>".to_owned();
/// let mut replacements = Replacements::new();
/// replacements.add("{{ASTAH_IMAGE_0}}", r#"<img src="_images/astah-1.png">"#);
/// replacements.apply(&mut html);
///
/// assert_eq!(html, r#"<p><img src="_images/astah-1.png"></p>"#);
/// ```
#[derive(Debug, Default)]
pub struct Replacements {
    items: Vec<(String, String)>,
}

impl Replacements {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a substitution of every occurrence of `from` with `to`.
    ///
    /// Substitutions run in registration order.
    pub fn add(&mut self, from: impl Into<String>, to: impl Into<String>) {
        self.items.push((from.into(), to.into()));
    }

    /// Apply all substitutions to `html`.
    pub fn apply(self, html: &mut String) {
        for (from, to) in self.items {
            if html.contains(&from) {
                *html = html.replace(&from, &to);
            }
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }
}
