//! Markdown rendering for astadoc.
//!
//! - [`MarkdownRenderer`] turns pulldown-cmark events into HTML5 and hands
//!   images to registered [`ImageProcessor`]s
//! - [`directive`] rewrites `::leaf` and `:::container` directive lines before
//!   parsing and substitutes their placeholders afterwards
//!
//! # Example
//!
//! ```
//! use astadoc_renderer::MarkdownRenderer;
//!
//! let result = MarkdownRenderer::new()
//!     .with_title_extraction()
//!     .render_markdown("# Architecture\n\nSee the **model**.");
//!
//! assert_eq!(result.title.as_deref(), Some("Architecture"));
//! assert!(result.html.contains("<strong>model</strong>"));
//! ```

pub mod directive;
mod image;
mod renderer;
mod state;
mod util;

pub use image::{ImageProcessor, ProcessResult};
pub use renderer::{MarkdownRenderer, RenderResult};
pub use state::{TocEntry, escape_html, slugify};
pub use util::relative_path;
