//! Event-tracking state for the renderer.

use std::collections::HashMap;

use pulldown_cmark::Alignment;

/// Text collected while inside a fenced or indented code block.
#[derive(Default)]
pub(crate) struct CodeBlockState {
    language: Option<Option<String>>,
    buffer: String,
}

impl CodeBlockState {
    pub(crate) fn start(&mut self, language: Option<String>) {
        self.language = Some(language);
        self.buffer.clear();
    }

    /// Close the block, returning its language and text.
    pub(crate) fn end(&mut self) -> (Option<String>, String) {
        let language = self.language.take().flatten();
        (language, std::mem::take(&mut self.buffer))
    }

    pub(crate) fn is_active(&self) -> bool {
        self.language.is_some()
    }

    pub(crate) fn push_str(&mut self, text: &str) {
        self.buffer.push_str(text);
    }
}

/// Column alignment and header tracking for GFM tables.
#[derive(Default)]
pub(crate) struct TableState {
    alignments: Vec<Alignment>,
    in_head: bool,
    cell: usize,
}

impl TableState {
    pub(crate) fn start(&mut self, alignments: Vec<Alignment>) {
        self.alignments = alignments;
        self.in_head = false;
        self.cell = 0;
    }

    pub(crate) fn set_head(&mut self, in_head: bool) {
        self.in_head = in_head;
        self.cell = 0;
    }

    pub(crate) fn start_row(&mut self) {
        self.cell = 0;
    }

    pub(crate) fn next_cell(&mut self) {
        self.cell += 1;
    }

    pub(crate) fn cell_tag(&self) -> &'static str {
        if self.in_head { "th" } else { "td" }
    }

    pub(crate) fn alignment_attr(&self) -> &'static str {
        match self.alignments.get(self.cell) {
            Some(Alignment::Left) => r#" style="text-align:left""#,
            Some(Alignment::Center) => r#" style="text-align:center""#,
            Some(Alignment::Right) => r#" style="text-align:right""#,
            Some(Alignment::None) | None => "",
        }
    }
}

/// An image whose alt text is still being collected.
pub(crate) struct PendingImage {
    pub(crate) src: String,
    pub(crate) title: String,
    pub(crate) alt: String,
}

/// Table of contents entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TocEntry {
    /// Heading level (1-6).
    pub level: u8,
    /// Plain heading text.
    pub title: String,
    /// Anchor id.
    pub id: String,
}

/// Heading capture, id allocation and title extraction.
#[derive(Default)]
pub(crate) struct HeadingState {
    extract_title: bool,
    title: Option<String>,
    level: Option<u8>,
    text: String,
    html: String,
    toc: Vec<TocEntry>,
    ids: HashMap<String, usize>,
}

impl HeadingState {
    pub(crate) fn new(extract_title: bool) -> Self {
        Self {
            extract_title,
            ..Self::default()
        }
    }

    pub(crate) fn is_active(&self) -> bool {
        self.level.is_some()
    }

    pub(crate) fn start(&mut self, level: u8) {
        self.level = Some(level);
        self.text.clear();
        self.html.clear();
    }

    /// Plain text feeds the slug and the ToC.
    pub(crate) fn push_text(&mut self, text: &str) {
        self.text.push_str(text);
    }

    /// Rendered inline HTML of the heading.
    pub(crate) fn push_html(&mut self, html: &str) {
        self.html.push_str(html);
    }

    /// Finish the heading and return `(level, id, html)`.
    ///
    /// The first H1 becomes the page title (when enabled) and stays out of
    /// the ToC; it is still rendered.
    pub(crate) fn finish(&mut self) -> Option<(u8, String, String)> {
        let level = self.level.take()?;
        let text = std::mem::take(&mut self.text);
        let text = text.trim();
        let id = self.unique_id(text);

        if self.extract_title && level == 1 && self.title.is_none() {
            self.title = Some(text.to_owned());
        } else {
            self.toc.push(TocEntry {
                level,
                title: text.to_owned(),
                id: id.clone(),
            });
        }

        Some((level, id, std::mem::take(&mut self.html)))
    }

    fn unique_id(&mut self, text: &str) -> String {
        let base = slugify(text);
        let seen = self.ids.entry(base.clone()).or_default();
        let id = if *seen == 0 {
            base
        } else {
            format!("{base}-{seen}")
        };
        *seen += 1;
        id
    }

    pub(crate) fn take_title(&mut self) -> Option<String> {
        self.title.take()
    }

    pub(crate) fn take_toc(&mut self) -> Vec<TocEntry> {
        std::mem::take(&mut self.toc)
    }
}

/// Lowercase ASCII slug with single dashes.
#[must_use]
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    for c in text.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if (c.is_whitespace() || c == '-' || c == '_')
            && !slug.is_empty()
            && !slug.ends_with('-')
        {
            slug.push('-');
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}

/// Escape text for HTML element content and attribute values.
#[must_use]
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Class Diagram"), "class-diagram");
        assert_eq!(slugify("  What's new?  "), "whats-new");
        assert_eq!(slugify("snake_case -- name"), "snake-case-name");
        assert_eq!(slugify("---"), "");
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html(r#"<a href="x">&'"#), "&lt;a href=&quot;x&quot;&gt;&amp;&#x27;");
    }

    #[test]
    fn test_heading_ids_are_unique() {
        let mut state = HeadingState::new(false);
        let mut ids = Vec::new();
        for _ in 0..3 {
            state.start(2);
            state.push_text("Usage");
            ids.push(state.finish().unwrap().1);
        }
        assert_eq!(ids, ["usage", "usage-1", "usage-2"]);
    }

    #[test]
    fn test_first_h1_becomes_title() {
        let mut state = HeadingState::new(true);
        state.start(1);
        state.push_text("Architecture");
        state.finish();
        state.start(1);
        state.push_text("Second");
        state.finish();

        assert_eq!(state.take_title().as_deref(), Some("Architecture"));
        let toc = state.take_toc();
        assert_eq!(toc.len(), 1);
        assert_eq!(toc[0].title, "Second");
    }

    #[test]
    fn test_code_block_state() {
        let mut state = CodeBlockState::default();
        state.start(None);
        assert!(state.is_active());
        state.push_str("plain");
        assert_eq!(state.end(), (None, "plain".to_owned()));
        assert!(!state.is_active());
    }

    #[test]
    fn test_table_alignment() {
        let mut table = TableState::default();
        table.start(vec![Alignment::None, Alignment::Right]);
        table.set_head(true);
        assert_eq!(table.cell_tag(), "th");
        assert_eq!(table.alignment_attr(), "");
        table.next_cell();
        assert_eq!(table.alignment_attr(), r#" style="text-align:right""#);
        table.set_head(false);
        assert_eq!(table.cell_tag(), "td");
    }
}
