//! Block-level directives for Markdown.
//!
//! Two directive shapes are supported:
//!
//! - **Leaf** ([`LeafDirective`]): `::name[content]{attrs}` on a line of its own
//! - **Container** ([`ContainerDirective`]): `:::name[content]{attrs}` ... `:::`
//!
//! Processing happens in two phases around the Markdown renderer:
//!
//! 1. [`DirectiveProcessor::process`] rewrites directive lines before parsing,
//!    usually into placeholders, and lets handlers record pending work.
//! 2. [`DirectiveProcessor::post_process`] collects the final HTML for every
//!    placeholder into [`Replacements`] and applies them to the rendered page.
//!
//! ```
//! use astadoc_renderer::directive::{
//!     DirectiveArgs, DirectiveContext, DirectiveOutput, DirectiveProcessor,
//!     DirectiveProcessorConfig, LeafDirective, Replacements,
//! };
//!
//! #[derive(Default)]
//! struct Upper {
//!     pending: Vec<String>,
//! }
//!
//! impl LeafDirective for Upper {
//!     fn name(&self) -> &str { "upper" }
//!
//!     fn process(&mut self, args: DirectiveArgs, _ctx: &DirectiveContext) -> DirectiveOutput {
//!         self.pending.push(args.content);
//!         DirectiveOutput::html(format!("{{{{UPPER_{}}}}}", self.pending.len() - 1))
//!     }
//!
//!     fn post_process(&mut self, replacements: &mut Replacements) {
//!         for (i, text) in self.pending.drain(..).enumerate() {
//!             replacements.add(format!("{{{{UPPER_{i}}}}}"), text.to_uppercase());
//!         }
//!     }
//! }
//!
//! let mut processor = DirectiveProcessor::new(DirectiveProcessorConfig::default())
//!     .with_leaf(Upper::default());
//! let mut page = processor.process("::upper[shout]");
//! processor.post_process(&mut page);
//! assert_eq!(page, "SHOUT");
//! ```

mod args;
mod container;
mod context;
mod fence;
mod leaf;
mod output;
mod parser;
mod processor;
mod replacements;

pub use args::DirectiveArgs;
pub use container::ContainerDirective;
pub use context::DirectiveContext;
pub use leaf::LeafDirective;
pub use output::DirectiveOutput;
pub use processor::{DirectiveProcessor, DirectiveProcessorConfig};
pub use replacements::Replacements;
