//! Plain Markdown images of `.asta` files.
//!
//! `![Order flow](models/shop.asta#Sequence "Orders")` embeds a sheet like
//! `::astah-image` does, with the alt text and title taken from the image.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use astadoc_renderer::directive::{DirectiveContext, Replacements};
use astadoc_renderer::{ImageProcessor, ProcessResult};
use percent_encoding::percent_decode_str;

use crate::directive::DiagramDirectiveCore;
use crate::options::ImageOptions;
use crate::reference::DiagramRef;
use crate::resolver::AstahContext;

/// [`ImageProcessor`] that takes over images whose target is an `.asta` file.
pub struct AstahImageProcessor {
    core: DiagramDirectiveCore,
    base_dir: PathBuf,
    errors: Vec<String>,
    warnings: Vec<String>,
}

impl AstahImageProcessor {
    /// Processor for the page whose output is at `page_url`; image targets
    /// are resolved against `base_dir`, the document's directory.
    #[must_use]
    pub fn new(
        context: Arc<AstahContext>,
        page_url: impl Into<String>,
        base_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            core: DiagramDirectiveCore::new(context, page_url.into()),
            base_dir: base_dir.into(),
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }
}

fn is_asta(path: &str) -> bool {
    Path::new(path)
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("asta"))
}

impl ImageProcessor for AstahImageProcessor {
    fn process(&mut self, src: &str, alt: &str, title: &str, index: usize) -> ProcessResult {
        // Split before decoding: `%23` is part of a name, not a sheet separator.
        let (path, sheet) = match src.split_once('#') {
            Some((path, sheet)) => (path, Some(sheet)),
            None => (src, None),
        };
        let path = percent_decode_str(path).decode_utf8_lossy();
        if !is_asta(&path) {
            return ProcessResult::PassThrough;
        }
        let diagram = DiagramRef {
            path: path.into_owned(),
            sheet: sheet
                .filter(|s| !s.is_empty())
                .map(|s| percent_decode_str(s).decode_utf8_lossy().into_owned()),
        };

        let image = ImageOptions {
            alt: (!alt.is_empty()).then(|| alt.to_owned()),
            title: (!title.is_empty()).then(|| title.to_owned()),
            ..ImageOptions::default()
        };
        let ctx = DirectiveContext {
            source_path: None,
            base_dir: &self.base_dir,
            line: 0,
        };

        let placeholder = format!("{{{{ASTAH_INLINE_{index}}}}}");
        match self.core.register(placeholder, diagram, &ctx, image) {
            Ok(placeholder) => ProcessResult::Placeholder(placeholder),
            Err(message) => {
                self.errors.push(format!("image {src}: {message}"));
                ProcessResult::Inline(String::new())
            }
        }
    }

    fn post_process(&mut self, html: &mut String) {
        let mut replacements = Replacements::new();
        self.core.resolve(&mut replacements);
        replacements.apply(html);

        self.warnings = self
            .errors
            .iter()
            .chain(self.core.warnings())
            .cloned()
            .collect();
    }

    fn warnings(&self) -> &[String] {
        &self.warnings
    }

    fn dependencies(&self) -> &[PathBuf] {
        self.core.dependencies()
    }

    fn outputs(&self) -> &[PathBuf] {
        self.core.outputs()
    }
}
