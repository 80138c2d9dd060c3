//! Rendering one document.
//!
//! Directive lines are rewritten to placeholders first, then the Markdown is
//! rendered (Astah images become placeholders too), and finally every
//! placeholder is resolved to its converted image.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use astadoc_astah::{AstahContext, AstahFigureDirective, AstahImageDirective, AstahImageProcessor};
use astadoc_renderer::directive::{DirectiveProcessor, DirectiveProcessorConfig};
use astadoc_renderer::{MarkdownRenderer, TocEntry};

use crate::builder::BuildError;
use crate::scanner::SourceDoc;

/// A rendered document before it is put into the page template.
#[derive(Debug)]
pub(crate) struct RenderedPage {
    pub(crate) html: String,
    pub(crate) title: Option<String>,
    pub(crate) toc: Vec<TocEntry>,
    pub(crate) warnings: Vec<String>,
    /// Files besides the source whose change requires a rebuild.
    pub(crate) dependencies: Vec<PathBuf>,
    /// Images the page embeds; a missing one requires a rebuild.
    pub(crate) outputs: Vec<PathBuf>,
}

pub(crate) fn render_document(
    doc: &SourceDoc,
    context: &Arc<AstahContext>,
) -> Result<RenderedPage, BuildError> {
    let markdown = fs::read_to_string(&doc.path).map_err(|source| BuildError::Io {
        path: doc.path.clone(),
        source,
    })?;
    let page_url = doc.page_url();

    let config = DirectiveProcessorConfig::for_document(&doc.path);
    let base_dir = config.base_dir.clone();
    let mut directives = DirectiveProcessor::new(config)
        .with_leaf(AstahImageDirective::new(Arc::clone(context), &page_url))
        .with_container(AstahFigureDirective::new(Arc::clone(context), &page_url));
    let preprocessed = directives.process(&markdown);

    let mut renderer = MarkdownRenderer::new()
        .with_gfm(true)
        .with_title_extraction()
        .with_image_processor(AstahImageProcessor::new(
            Arc::clone(context),
            &page_url,
            base_dir,
        ));
    let mut result = renderer.render_markdown(&preprocessed);
    directives.post_process(&mut result.html);

    let mut warnings = directives.warnings();
    warnings.extend(result.warnings);

    let mut dependencies = directives.dependencies();
    for dep in result.dependencies {
        if !dependencies.contains(&dep) {
            dependencies.push(dep);
        }
    }

    let mut outputs = directives.outputs();
    for out in result.outputs {
        if !outputs.contains(&out) {
            outputs.push(out);
        }
    }

    Ok(RenderedPage {
        html: result.html,
        title: result.title,
        toc: result.toc,
        warnings,
        dependencies,
        outputs,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use astadoc_astah::{AstahConfig, AstahConverter, DiagramKey};
    use pretty_assertions::assert_eq;

    fn context(docs: &std::path::Path) -> Arc<AstahContext> {
        let converter = AstahConverter::new(AstahConfig {
            command_path: None,
            search_patterns: Vec::new(),
        });
        Arc::new(AstahContext::new(converter, docs, docs.join("_out"), "_images"))
    }

    #[test]
    fn test_render_plain_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("index.md");
        fs::write(&path, "# Welcome\n\n## Usage\n\nText.").unwrap();
        let doc = SourceDoc {
            docname: "index".to_owned(),
            path,
        };

        let page = render_document(&doc, &context(dir.path())).unwrap();
        assert_eq!(page.title.as_deref(), Some("Welcome"));
        assert_eq!(page.toc.len(), 1);
        assert!(page.html.contains("<p>Text.</p>"));
        assert!(page.warnings.is_empty());
        assert!(page.dependencies.is_empty());
        assert!(page.outputs.is_empty());
    }

    #[test]
    fn test_dependencies_from_directives_and_images() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.asta"), "a").unwrap();
        fs::write(dir.path().join("b.asta"), "b").unwrap();
        let path = dir.path().join("index.md");
        fs::write(
            &path,
            "::astah-image[a.asta]\n\n![b](b.asta)\n\n![again](a.asta#Sequence)\n",
        )
        .unwrap();
        let doc = SourceDoc {
            docname: "index".to_owned(),
            path,
        };

        let page = render_document(&doc, &context(dir.path())).unwrap();
        assert_eq!(
            page.dependencies,
            [dir.path().join("a.asta"), dir.path().join("b.asta")]
        );
        let images = dir.path().join("_out/_images");
        assert_eq!(
            page.outputs,
            [
                images.join(DiagramKey::new("a.asta", "").file_name()),
                images.join(DiagramKey::new("b.asta", "").file_name()),
                images.join(DiagramKey::new("a.asta", "Sequence").file_name()),
            ]
        );
        // No tool: each of the three conversions fails with a warning.
        assert_eq!(page.warnings.len(), 3);
        assert!(!page.html.contains("{{ASTAH_"));
    }

    #[test]
    fn test_missing_source() {
        let dir = tempfile::tempdir().unwrap();
        let doc = SourceDoc {
            docname: "gone".to_owned(),
            path: dir.path().join("gone.md"),
        };
        let err = render_document(&doc, &context(dir.path())).unwrap_err();
        assert!(matches!(err, BuildError::Io { .. }));
    }
}
