//! Second phase: turning pending conversions into `<img>` tags.
//!
//! While a page is preprocessed and rendered, every diagram reference leaves
//! a placeholder in the HTML and a [`PendingConversion`] behind. Once the
//! page is rendered, [`PendingConversions::resolve`] converts each diagram
//! (or finds it current) and yields the final HTML for every placeholder:
//! an image on success, nothing on failure.

use std::fs::File;
use std::io::Read;
use std::path::{Component, Path, PathBuf};

use astadoc_renderer::relative_path;

use crate::converter::AstahConverter;
use crate::key::DiagramKey;
use crate::options::ImageOptions;
use crate::reference::DiagramRef;

/// Build-wide settings shared by every page, usually behind an `Arc`.
#[derive(Debug)]
pub struct AstahContext {
    converter: AstahConverter,
    source_dir: PathBuf,
    output_dir: PathBuf,
    image_dir: String,
}

impl AstahContext {
    /// `image_dir` is relative to `output_dir`, `/`-separated.
    #[must_use]
    pub fn new(
        converter: AstahConverter,
        source_dir: impl Into<PathBuf>,
        output_dir: impl Into<PathBuf>,
        image_dir: impl Into<String>,
    ) -> Self {
        Self {
            converter,
            source_dir: source_dir.into(),
            output_dir: output_dir.into(),
            image_dir: image_dir.into().trim_matches('/').to_owned(),
        }
    }

    #[must_use]
    pub fn converter(&self) -> &AstahConverter {
        &self.converter
    }

    /// Path of a diagram as it enters the fingerprint: relative to the
    /// source directory with `/` separators, or the whole normalized path
    /// for diagrams outside it.
    #[must_use]
    pub fn fingerprint_path(&self, diagram: &Path) -> String {
        let diagram = normalize(diagram);
        let root = normalize(&self.source_dir);
        let relative = diagram.strip_prefix(&root).unwrap_or(&diagram);
        relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/")
    }

    /// Where the converted image is written.
    #[must_use]
    pub fn image_path(&self, key: &DiagramKey<'_>) -> PathBuf {
        self.output_dir.join(&self.image_dir).join(key.file_name())
    }

    /// URL of the converted image relative to the site root.
    #[must_use]
    pub fn image_url(&self, key: &DiagramKey<'_>) -> String {
        if self.image_dir.is_empty() {
            key.file_name()
        } else {
            format!("{}/{}", self.image_dir, key.file_name())
        }
    }
}

/// Lexically resolve `.` and `..` components.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push("..");
                }
            }
            other => out.push(other),
        }
    }
    out
}

/// A diagram reference waiting for its image.
#[derive(Debug, Clone)]
pub struct PendingConversion {
    /// Text in the rendered HTML that the result replaces.
    pub placeholder: String,
    pub reference: DiagramRef,
    /// Diagram file on disk.
    pub source: PathBuf,
    /// Diagram path used in the fingerprint.
    pub key_path: String,
    pub image: ImageOptions,
}

impl PendingConversion {
    #[must_use]
    pub fn key(&self) -> DiagramKey<'_> {
        DiagramKey::new(&self.key_path, self.reference.sheet())
    }
}

/// Conversions collected for one page, in document order.
#[derive(Debug, Default)]
pub struct PendingConversions {
    entries: Vec<PendingConversion>,
}

/// Final HTML for one placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    pub placeholder: String,
    /// Empty when the conversion failed.
    pub html: String,
}

impl PendingConversions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: PendingConversion) {
        self.entries.push(entry);
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Convert every entry and produce its HTML.
    ///
    /// `page_url` is the page's path from the site root (`guide/index.html`);
    /// image URLs are made relative to it. Entries are drained, so each
    /// placeholder resolves exactly once. Failures are appended to `warnings`.
    pub fn resolve(
        &mut self,
        context: &AstahContext,
        page_url: &str,
        warnings: &mut Vec<String>,
    ) -> Vec<Resolved> {
        self.entries
            .drain(..)
            .map(|entry| {
                let html = resolve_one(&entry, context, page_url, warnings);
                Resolved {
                    placeholder: entry.placeholder,
                    html,
                }
            })
            .collect()
    }
}

fn resolve_one(
    entry: &PendingConversion,
    context: &AstahContext,
    page_url: &str,
    warnings: &mut Vec<String>,
) -> String {
    let key = entry.key();
    let target = context.image_path(&key);

    if let Err(e) = context
        .converter()
        .try_convert(&entry.source, &target, entry.reference.sheet.as_deref())
    {
        tracing::warn!(
            diagram = %entry.reference,
            error = %e,
            "Failed to convert Astah diagram"
        );
        warnings.push(format!("{}: {e}", entry.reference));
        return String::new();
    }

    let src = relative_path(page_url, &context.image_url(&key));
    let dimensions = entry
        .image
        .scale
        .and_then(|_| png_dimensions(&target));
    entry.image.to_html(&src, dimensions)
}

/// Width and height from the IHDR chunk of a PNG file.
fn png_dimensions(path: &Path) -> Option<(u32, u32)> {
    let mut data = [0u8; 24];
    File::open(path).ok()?.read_exact(&mut data).ok()?;

    if &data[0..8] != b"\x89PNG\r\n\x1a\n" {
        return None;
    }
    let width = u32::from_be_bytes([data[16], data[17], data[18], data[19]]);
    let height = u32::from_be_bytes([data[20], data[21], data[22], data[23]]);
    Some((width, height))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    use crate::converter::AstahConfig;

    fn context(source_dir: &Path, output_dir: &Path, tool: Option<&Path>) -> AstahContext {
        let converter =
            AstahConverter::new(AstahConfig::with_command_path(tool.map(Path::to_path_buf)));
        AstahContext::new(converter, source_dir, output_dir, "_images")
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize(Path::new("docs/api/../model.asta")), PathBuf::from("docs/model.asta"));
        assert_eq!(normalize(Path::new("./docs/./a")), PathBuf::from("docs/a"));
        assert_eq!(normalize(Path::new("../a")), PathBuf::from("../a"));
    }

    #[test]
    fn test_fingerprint_path() {
        let ctx = context(Path::new("docs"), Path::new("out"), None);
        assert_eq!(ctx.fingerprint_path(Path::new("docs/diagram.asta")), "diagram.asta");
        assert_eq!(
            ctx.fingerprint_path(Path::new("docs/guide/../models/shop.asta")),
            "models/shop.asta"
        );
        assert_eq!(ctx.fingerprint_path(Path::new("other/x.asta")), "other/x.asta");
    }

    #[test]
    fn test_image_location() {
        let ctx = context(Path::new("docs"), Path::new("out"), None);
        let key = DiagramKey::new("abc", "");
        assert_eq!(
            ctx.image_path(&key),
            PathBuf::from("out/_images/astah-a9993e364706816aba3e25717850c26c9cd0d89d.png")
        );
        assert_eq!(
            ctx.image_url(&key),
            "_images/astah-a9993e364706816aba3e25717850c26c9cd0d89d.png"
        );

        let flat = AstahContext::new(AstahConverter::default(), "docs", "out", "/");
        assert_eq!(flat.image_url(&key), key.file_name());
    }

    #[test]
    fn test_png_dimensions() {
        let dir = tempfile::tempdir().unwrap();
        let png = dir.path().join("a.png");
        let mut data = b"\x89PNG\r\n\x1a\n\0\0\0\x0dIHDR".to_vec();
        data.extend_from_slice(&640u32.to_be_bytes());
        data.extend_from_slice(&480u32.to_be_bytes());
        std::fs::write(&png, &data).unwrap();
        assert_eq!(png_dimensions(&png), Some((640, 480)));

        std::fs::write(&png, b"not a png at all, but long enough").unwrap();
        assert_eq!(png_dimensions(&png), None);
        assert_eq!(png_dimensions(&dir.path().join("missing.png")), None);
    }

    fn pending(ctx: &AstahContext, source: &Path, reference: &str, n: usize) -> PendingConversion {
        PendingConversion {
            placeholder: format!("{{{{ASTAH_IMAGE_{n}}}}}"),
            reference: DiagramRef::parse(reference),
            source: source.to_path_buf(),
            key_path: ctx.fingerprint_path(source),
            image: ImageOptions::default(),
        }
    }

    #[test]
    fn test_failure_resolves_to_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("diagram.asta");
        std::fs::write(&source, b"asta").unwrap();
        let ctx = AstahContext::new(
            AstahConverter::new(AstahConfig {
                command_path: None,
                search_patterns: Vec::new(),
            }),
            dir.path(),
            dir.path().join("out"),
            "_images",
        );

        let mut pending_list = PendingConversions::new();
        pending_list.push(pending(&ctx, &source, "diagram.asta", 0));
        let mut warnings = Vec::new();
        let resolved = pending_list.resolve(&ctx, "index.html", &mut warnings);

        assert_eq!(
            resolved,
            [Resolved {
                placeholder: "{{ASTAH_IMAGE_0}}".to_owned(),
                html: String::new(),
            }]
        );
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].starts_with("diagram.asta: astah-command not found"));
        assert!(pending_list.is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_resolves_relative_to_page() {
        use crate::testing::fake_tool;

        let dir = tempfile::tempdir().unwrap();
        let source_dir = dir.path().join("docs");
        std::fs::create_dir(&source_dir).unwrap();
        let source = source_dir.join("diagram.asta");
        std::fs::write(&source, b"asta").unwrap();
        let out = dir.path().join("out");
        let ctx = context(&source_dir, &out, Some(fake_tool()));

        let mut pending_list = PendingConversions::new();
        pending_list.push(pending(&ctx, &source, "diagram.asta#Sequence", 0));
        pending_list.push(pending(&ctx, &source, "diagram.asta#Class Diagram", 1));
        assert_eq!(pending_list.len(), 2);
        let mut warnings = Vec::new();
        let resolved = pending_list.resolve(&ctx, "guide/index.html", &mut warnings);

        assert!(warnings.is_empty(), "{warnings:?}");
        let sequence = DiagramKey::new("diagram.asta", "Sequence").file_name();
        let class = DiagramKey::new("diagram.asta", "Class Diagram").file_name();
        assert_eq!(
            resolved[0].html,
            format!(r#"<img src="../_images/{sequence}" alt="">"#)
        );
        assert_eq!(
            resolved[1].html,
            format!(r#"<img src="../_images/{class}" alt="">"#)
        );
        assert!(out.join("_images").join(&sequence).is_file());
        assert!(out.join("_images").join(&class).is_file());
    }
}
