//! What a directive hands back to the processor.

/// Result of handling a directive line.
///
/// ```
/// use astadoc_renderer::directive::DirectiveOutput;
///
/// assert_eq!(
///     DirectiveOutput::html("{{ASTAH_IMAGE_0}}"),
///     DirectiveOutput::Html("{{ASTAH_IMAGE_0}}".to_owned()),
/// );
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DirectiveOutput {
    /// Replace the line with this text; it goes through the Markdown
    /// renderer, so block-level HTML or placeholders are typical.
    Html(String),
    /// The directive failed. The line produces no output and the message
    /// is recorded as a page warning with the line number.
    Error(String),
    /// Not handled; keep the line as written.
    Skip,
}

impl DirectiveOutput {
    /// HTML (or placeholder) output.
    #[must_use]
    pub fn html(s: impl Into<String>) -> Self {
        Self::Html(s.into())
    }

    /// Error output.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error(message.into())
    }
}
