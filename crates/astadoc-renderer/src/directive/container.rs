//! Container directive trait.

use std::path::PathBuf;

use super::{DirectiveArgs, DirectiveContext, DirectiveOutput, Replacements};

/// Handler for `:::name[content]{attrs}` ... `:::` blocks.
///
/// The lines between the opening and closing markers are ordinary Markdown
/// and are rendered in place; the handler only supplies what goes before
/// ([`start`](Self::start)) and after ([`end`](Self::end)).
///
/// The processor calls `end` only for containers whose `start` returned
/// [`DirectiveOutput::Html`].
///
/// ```
/// use astadoc_renderer::directive::{
///     ContainerDirective, DirectiveArgs, DirectiveContext, DirectiveOutput,
/// };
///
/// struct Aside;
///
/// impl ContainerDirective for Aside {
///     fn name(&self) -> &str { "aside" }
///
///     fn start(&mut self, _args: DirectiveArgs, _ctx: &DirectiveContext) -> DirectiveOutput {
///         DirectiveOutput::html("<aside>\n")
///     }
///
///     fn end(&mut self, _line: usize) -> Option<String> {
///         Some("</aside>\n".to_owned())
///     }
/// }
/// ```
pub trait ContainerDirective: Send {
    /// Name matched against `:::name`.
    fn name(&self) -> &str;

    /// Handle the opening line.
    fn start(&mut self, args: DirectiveArgs, ctx: &DirectiveContext) -> DirectiveOutput;

    /// Handle the closing `:::`; `None` emits nothing.
    fn end(&mut self, line: usize) -> Option<String>;

    /// Register placeholder substitutions once the page has been rendered.
    fn post_process(&mut self, _replacements: &mut Replacements) {}

    /// Warnings produced while handling directives.
    fn warnings(&self) -> &[String] {
        &[]
    }

    /// Files the rendered page depends on, for rebuild tracking.
    fn dependencies(&self) -> &[PathBuf] {
        &[]
    }

    /// Files generated for the page; the page is outdated when one is missing.
    fn outputs(&self) -> &[PathBuf] {
        &[]
    }
}
