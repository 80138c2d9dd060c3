//! Leaf directive trait.

use std::path::PathBuf;

use super::{DirectiveArgs, DirectiveContext, DirectiveOutput, Replacements};

/// Handler for `::name[content]{attrs}` lines.
///
/// A leaf directive stands alone, like a void HTML element. Handlers that
/// need work done after rendering emit a placeholder from
/// [`process`](Self::process) and register its final HTML in
/// [`post_process`](Self::post_process).
///
/// Each document gets its own handler instances, so handlers are `Send`
/// but need not be `Sync`.
///
/// ```
/// use astadoc_renderer::directive::{
///     DirectiveArgs, DirectiveContext, DirectiveOutput, LeafDirective,
/// };
///
/// struct Badge;
///
/// impl LeafDirective for Badge {
///     fn name(&self) -> &str { "badge" }
///
///     fn process(&mut self, args: DirectiveArgs, _ctx: &DirectiveContext) -> DirectiveOutput {
///         DirectiveOutput::html(format!(r#"<span class="badge">{}</span>"#, args.content))
///     }
/// }
/// ```
pub trait LeafDirective: Send {
    /// Name matched against `::name`.
    fn name(&self) -> &str;

    /// Handle one occurrence.
    fn process(&mut self, args: DirectiveArgs, ctx: &DirectiveContext) -> DirectiveOutput;

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
