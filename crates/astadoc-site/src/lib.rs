//! Static site builder for astadoc.
//!
//! Scans a directory of Markdown sources, renders each document through the
//! Astah directives and image processor, and writes one HTML page per
//! document. Builds are incremental: see [`SiteBuilder::build`].

mod builder;
mod env;
mod page;
mod scanner;
mod template;

pub use builder::{BuildConfig, BuildError, BuildReport, SiteBuilder};
pub use scanner::SourceDoc;
pub use template::{PageData, render_page};
