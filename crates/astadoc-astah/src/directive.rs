//! `astah-image` and `astah-figure` directives.
//!
//! ```text
//! ::astah-image[models/shop.asta#Order]{width=480 alt="Order flow"}
//!
//! :::astah-figure[models/shop.asta]{#fig-shop figclass=wide}
//! The shop domain model.
//! :::
//! ```
//!
//! Both resolve the diagram path against the document's directory, record
//! it as a page dependency and leave a placeholder that is replaced by the
//! image once the page is rendered. A diagram that cannot be read fails the
//! directive: the page gets a warning and the directive produces nothing.

use std::path::PathBuf;
use std::sync::Arc;

use astadoc_renderer::directive::{
    ContainerDirective, DirectiveArgs, DirectiveContext, DirectiveOutput, LeafDirective,
    Replacements,
};

use crate::options::{DiagramOptions, ImageOptions};
use crate::reference::DiagramRef;
use crate::resolver::{AstahContext, PendingConversion, PendingConversions};

/// Bookkeeping shared by everything that embeds diagrams on one page.
pub(crate) struct DiagramDirectiveCore {
    context: Arc<AstahContext>,
    page_url: String,
    pending: PendingConversions,
    dependencies: Vec<PathBuf>,
    /// Cache images the page embeds.
    outputs: Vec<PathBuf>,
    warnings: Vec<String>,
}

impl DiagramDirectiveCore {
    pub(crate) fn new(context: Arc<AstahContext>, page_url: String) -> Self {
        Self {
            context,
            page_url,
            pending: PendingConversions::new(),
            dependencies: Vec::new(),
            outputs: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Check and queue one diagram reference under `placeholder`.
    ///
    /// On failure returns the message for the page warning.
    pub(crate) fn register(
        &mut self,
        placeholder: String,
        diagram: DiagramRef,
        ctx: &DirectiveContext,
        mut image: ImageOptions,
    ) -> Result<String, String> {
        if diagram.path.is_empty() {
            return Err("missing diagram path".to_owned());
        }

        let source = ctx.resolve_path(&diagram.path);
        if !ctx.is_readable(&source) {
            return Err(format!("astah file not readable: {}", source.display()));
        }

        if !self.dependencies.contains(&source) {
            self.dependencies.push(source.clone());
        }
        if image.alt.is_none() {
            image.alt = Some(diagram.to_string());
        }

        let entry = PendingConversion {
            placeholder: placeholder.clone(),
            key_path: self.context.fingerprint_path(&source),
            reference: diagram,
            source,
            image,
        };
        let target = self.context.image_path(&entry.key());
        if !self.outputs.contains(&target) {
            self.outputs.push(target);
        }
        self.pending.push(entry);
        Ok(placeholder)
    }

    pub(crate) fn warn(&mut self, line: usize, message: &str) {
        self.warnings.push(format!("line {line}: {message}"));
    }

    /// Convert everything queued and register the final HTML of each placeholder.
    pub(crate) fn resolve(&mut self, replacements: &mut Replacements) {
        for resolved in self
            .pending
            .resolve(&self.context, &self.page_url, &mut self.warnings)
        {
            replacements.add(resolved.placeholder, resolved.html);
        }
    }

    pub(crate) fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub(crate) fn dependencies(&self) -> &[PathBuf] {
        &self.dependencies
    }

    pub(crate) fn outputs(&self) -> &[PathBuf] {
        &self.outputs
    }
}

/// `::astah-image[path#sheet]{options}`
pub struct AstahImageDirective {
    core: DiagramDirectiveCore,
    count: usize,
}

impl AstahImageDirective {
    /// Handler for the page whose output is at `page_url` (from the site root).
    #[must_use]
    pub fn new(context: Arc<AstahContext>, page_url: impl Into<String>) -> Self {
        Self {
            core: DiagramDirectiveCore::new(context, page_url.into()),
            count: 0,
        }
    }
}

impl LeafDirective for AstahImageDirective {
    fn name(&self) -> &str {
        "astah-image"
    }

    fn process(&mut self, args: DirectiveArgs, ctx: &DirectiveContext) -> DirectiveOutput {
        let options = DiagramOptions::from_args(&args);
        for warning in &options.warnings {
            self.core.warn(ctx.line, warning);
        }
        if !options.figure.is_empty() {
            self.core.warn(ctx.line, "figure options ignored by astah-image");
        }

        let placeholder = format!("{{{{ASTAH_IMAGE_{}}}}}", self.count);
        self.count += 1;
        match self
            .core
            .register(placeholder, DiagramRef::parse(&args.content), ctx, options.image)
        {
            Ok(placeholder) => DirectiveOutput::Html(placeholder),
            Err(message) => DirectiveOutput::Error(message),
        }
    }

    fn post_process(&mut self, replacements: &mut Replacements) {
        self.core.resolve(replacements);
    }

    fn warnings(&self) -> &[String] {
        self.core.warnings()
    }

    fn dependencies(&self) -> &[PathBuf] {
        self.core.dependencies()
    }

    fn outputs(&self) -> &[PathBuf] {
        self.core.outputs()
    }
}

/// `:::astah-figure[path#sheet]{options}` ... `:::`; the body is the caption.
pub struct AstahFigureDirective {
    core: DiagramDirectiveCore,
    count: usize,
}

impl AstahFigureDirective {
    /// Handler for the page whose output is at `page_url` (from the site root).
    #[must_use]
    pub fn new(context: Arc<AstahContext>, page_url: impl Into<String>) -> Self {
        Self {
            core: DiagramDirectiveCore::new(context, page_url.into()),
            count: 0,
        }
    }
}

impl ContainerDirective for AstahFigureDirective {
    fn name(&self) -> &str {
        "astah-figure"
    }

    fn start(&mut self, args: DirectiveArgs, ctx: &DirectiveContext) -> DirectiveOutput {
        let mut options = DiagramOptions::from_args(&args);
        for warning in &options.warnings {
            self.core.warn(ctx.line, warning);
        }
        // `{#id}` names the figure, not the image inside it.
        let id = options.image.id.take();

        let placeholder = format!("{{{{ASTAH_FIGURE_{}}}}}", self.count);
        self.count += 1;
        match self
            .core
            .register(placeholder, DiagramRef::parse(&args.content), ctx, options.image)
        {
            // The blank line after this one lets the caption render as Markdown.
            Ok(placeholder) => DirectiveOutput::Html(format!(
                "{}{placeholder}<figcaption>\n",
                options.figure.open_tag(id.as_deref())
            )),
            Err(message) => DirectiveOutput::Error(message),
        }
    }

    fn end(&mut self, _line: usize) -> Option<String> {
        Some("</figcaption></figure>\n".to_owned())
    }

    fn post_process(&mut self, replacements: &mut Replacements) {
        self.core.resolve(replacements);
    }

    fn warnings(&self) -> &[String] {
        self.core.warnings()
    }

    fn dependencies(&self) -> &[PathBuf] {
        self.core.dependencies()
    }

    fn outputs(&self) -> &[PathBuf] {
        self.core.outputs()
    }
}
