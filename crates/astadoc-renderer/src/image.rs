//! Image processor trait.
//!
//! Lets plugins take over Markdown images (`![alt](src "title")`) whose target
//! they recognize, for instance a source file that must be converted before it
//! can be shown.
//!
//! Processors are consulted in registration order when an image is complete;
//! the first one that does not return [`ProcessResult::PassThrough`] wins.
//!
//! ```
//! use std::path::PathBuf;
//! use astadoc_renderer::{ImageProcessor, MarkdownRenderer, ProcessResult};
//!
//! #[derive(Default)]
//! struct SvgOnly {
//!     deps: Vec<PathBuf>,
//! }
//!
//! impl ImageProcessor for SvgOnly {
//!     fn process(&mut self, src: &str, alt: &str, _title: &str, _index: usize) -> ProcessResult {
//!         if !src.ends_with(".svg") {
//!             return ProcessResult::PassThrough;
//!         }
//!         self.deps.push(PathBuf::from(src));
//!         ProcessResult::Inline(format!(r#"<object data="{src}">{alt}</object>"#))
//!     }
//!
//!     fn dependencies(&self) -> &[PathBuf] {
//!         &self.deps
//!     }
//! }
//!
//! let mut renderer = MarkdownRenderer::new().with_image_processor(SvgOnly::default());
//! let result = renderer.render_markdown("![logo](logo.svg)");
//! assert!(result.html.contains(r#"<object data="logo.svg">logo</object>"#));
//! assert_eq!(result.dependencies, [PathBuf::from("logo.svg")]);
//! ```

use std::path::PathBuf;

/// Outcome of offering an image to a processor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProcessResult {
    /// Emit this placeholder now; the processor substitutes it in
    /// [`ImageProcessor::post_process`].
    Placeholder(String),
    /// Emit this HTML instead of the `<img>`.
    Inline(String),
    /// Not ours; render a plain `<img>`.
    PassThrough,
}

/// Takes over selected Markdown images.
pub trait ImageProcessor: Send {
    /// Offer an image. `index` counts images in the document, from zero.
    fn process(&mut self, src: &str, alt: &str, title: &str, index: usize) -> ProcessResult;

    /// Substitute placeholders in the rendered page.
    fn post_process(&mut self, _html: &mut String) {}

    /// Warnings produced while processing.
    fn warnings(&self) -> &[String] {
        &[]
    }

    /// Files the rendered page depends on.
    fn dependencies(&self) -> &[PathBuf] {
        &[]
    }

    /// Files generated for the page, such as converted images.
    fn outputs(&self) -> &[PathBuf] {
        &[]
    }
}
