//! Astah diagram embedding for astadoc.
//!
//! Sheets of `.asta` files are rasterized to PNG by the `astah-command`
//! tool that ships with Astah, cached under the site's image directory and
//! embedded in pages:
//!
//! - [`AstahConverter`] runs the tool and keeps converted images current
//! - [`AstahImageDirective`] and [`AstahFigureDirective`] handle
//!   `::astah-image[...]` and `:::astah-figure[...]`
//! - [`AstahImageProcessor`] handles Markdown images of `.asta` files
//!
//! Each converted sheet is stored as `astah-<sha1(path + sheet)>.png`, where
//! `path` is the diagram path relative to the documentation source
//! directory. An image is regenerated only when the diagram is newer.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use astadoc_astah::{
//!     AstahConfig, AstahContext, AstahConverter, AstahFigureDirective, AstahImageDirective,
//! };
//! use astadoc_renderer::MarkdownRenderer;
//! use astadoc_renderer::directive::{DirectiveProcessor, DirectiveProcessorConfig};
//!
//! let converter = AstahConverter::new(AstahConfig::default());
//! let context = Arc::new(AstahContext::new(converter, "docs", "_build/html", "_images"));
//!
//! let mut directives =
//!     DirectiveProcessor::new(DirectiveProcessorConfig::for_document("docs/index.md"))
//!         .with_leaf(AstahImageDirective::new(Arc::clone(&context), "index.html"))
//!         .with_container(AstahFigureDirective::new(context, "index.html"));
//!
//! let markdown = directives.process("::astah-image[model.asta#Overview]\n");
//! let mut html = MarkdownRenderer::new().render_markdown(&markdown).html;
//! directives.post_process(&mut html);
//! ```

mod converter;
mod directive;
mod image;
mod key;
mod options;
mod reference;
mod resolver;
#[cfg(all(test, unix))]
mod testing;

pub use converter::{AstahConfig, AstahConverter, Conversion, ConvertError, is_outdated};
pub use directive::{AstahFigureDirective, AstahImageDirective};
pub use image::AstahImageProcessor;
pub use key::DiagramKey;
pub use options::{Align, DiagramOptions, FigureOptions, ImageOptions, Length};
pub use reference::DiagramRef;
pub use resolver::{AstahContext, PendingConversion, PendingConversions, Resolved};
