//! Markdown to HTML renderer.

use std::borrow::Cow;
use std::fmt::Write;
use std::path::PathBuf;

use pulldown_cmark::{CodeBlockKind, Event, Options, Parser, Tag, TagEnd};

use crate::image::{ImageProcessor, ProcessResult};
use crate::state::{
    CodeBlockState, HeadingState, PendingImage, TableState, TocEntry, escape_html,
};
use crate::util::heading_level_to_num;

/// Result of rendering one document.
#[derive(Clone, Debug)]
pub struct RenderResult {
    /// Rendered HTML body.
    pub html: String,
    /// Text of the first H1, when title extraction is enabled.
    pub title: Option<String>,
    /// Headings other than the title.
    pub toc: Vec<TocEntry>,
    /// Warnings from image processors.
    pub warnings: Vec<String>,
    /// Files reported by image processors as inputs of this page.
    pub dependencies: Vec<PathBuf>,
    /// Files image processors generated for this page.
    pub outputs: Vec<PathBuf>,
}

/// Event-driven Markdown renderer producing HTML5.
///
/// Relative links to `.md` files are rewritten to the `.html` page the site
/// builder writes for them. Images can be taken over by
/// [`ImageProcessor`]s.
pub struct MarkdownRenderer {
    output: String,
    code: CodeBlockState,
    table: TableState,
    heading: HeadingState,
    image: Option<PendingImage>,
    image_index: usize,
    processors: Vec<Box<dyn ImageProcessor>>,
    gfm: bool,
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl MarkdownRenderer {
    /// Renderer with GitHub Flavored Markdown enabled.
    #[must_use]
    pub fn new() -> Self {
        Self {
            output: String::with_capacity(4096),
            code: CodeBlockState::default(),
            table: TableState::default(),
            heading: HeadingState::new(false),
            image: None,
            image_index: 0,
            processors: Vec::new(),
            gfm: true,
        }
    }

    /// Report the first H1 as the page title.
    #[must_use]
    pub fn with_title_extraction(mut self) -> Self {
        self.heading = HeadingState::new(true);
        self
    }

    /// Toggle tables, strikethrough and task lists.
    #[must_use]
    pub fn with_gfm(mut self, enabled: bool) -> Self {
        self.gfm = enabled;
        self
    }

    /// Register an image processor; processors are tried in order.
    #[must_use]
    pub fn with_image_processor<P: ImageProcessor + 'static>(mut self, processor: P) -> Self {
        self.processors.push(Box::new(processor));
        self
    }

    fn parser_options(&self) -> Options {
        if self.gfm {
            Options::ENABLE_TABLES
                | Options::ENABLE_STRIKETHROUGH
                | Options::ENABLE_TASKLISTS
                | Options::ENABLE_GFM
        } else {
            Options::empty()
        }
    }

    /// Parse and render `markdown`.
    pub fn render_markdown(&mut self, markdown: &str) -> RenderResult {
        let parser = Parser::new_ext(markdown, self.parser_options());
        self.render(parser)
    }

    /// Render a stream of events, then let processors substitute their
    /// placeholders.
    pub fn render<'a, I>(&mut self, events: I) -> RenderResult
    where
        I: Iterator<Item = Event<'a>>,
    {
        for event in events {
            self.event(event);
        }

        let mut html = std::mem::take(&mut self.output);
        for processor in &mut self.processors {
            processor.post_process(&mut html);
        }

        let mut dependencies: Vec<PathBuf> = Vec::new();
        for dep in self.processors.iter().flat_map(|p| p.dependencies()) {
            if !dependencies.contains(dep) {
                dependencies.push(dep.clone());
            }
        }
        let mut outputs: Vec<PathBuf> = Vec::new();
        for out in self.processors.iter().flat_map(|p| p.outputs()) {
            if !outputs.contains(out) {
                outputs.push(out.clone());
            }
        }

        RenderResult {
            html,
            title: self.heading.take_title(),
            toc: self.heading.take_toc(),
            warnings: self
                .processors
                .iter()
                .flat_map(|p| p.warnings())
                .cloned()
                .collect(),
            dependencies,
            outputs,
        }
    }

    fn event(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start_tag(tag),
            Event::End(tag) => self.end_tag(tag),
            Event::Text(text) => self.text(&text),
            Event::Code(code) => self.inline_code(&code),
            Event::Html(html) | Event::InlineHtml(html) => self.push(&html),
            Event::SoftBreak => self.text("\n"),
            Event::HardBreak => self.push("<br>"),
            Event::Rule => self.output.push_str("<hr>"),
            Event::TaskListMarker(checked) => self.output.push_str(if checked {
                r#"<input type="checkbox" checked disabled>"#
            } else {
                r#"<input type="checkbox" disabled>"#
            }),
            Event::FootnoteReference(_) | Event::InlineMath(_) | Event::DisplayMath(_) => {}
        }
    }

    /// Write inline HTML to the heading being captured or to the page.
    ///
    /// Markup inside an image's alt text is dropped; only its text is kept.
    fn push(&mut self, html: &str) {
        if self.image.is_some() {
            return;
        }
        if self.heading.is_active() {
            self.heading.push_html(html);
        } else {
            self.output.push_str(html);
        }
    }

    fn start_tag(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Paragraph => self.output.push_str("<p>"),
            Tag::Heading { level, .. } => self.heading.start(heading_level_to_num(level)),
            Tag::BlockQuote(_) => self.output.push_str("<blockquote>"),
            Tag::CodeBlock(kind) => {
                let language = match kind {
                    CodeBlockKind::Fenced(info) => info
                        .split_whitespace()
                        .next()
                        .map(str::to_owned),
                    CodeBlockKind::Indented => None,
                };
                self.code.start(language);
            }
            Tag::List(Some(1)) => self.output.push_str("<ol>"),
            Tag::List(Some(start)) => {
                let _ = write!(self.output, r#"<ol start="{start}">"#);
            }
            Tag::List(None) => self.output.push_str("<ul>"),
            Tag::Item => self.output.push_str("<li>"),
            Tag::DefinitionList => self.output.push_str("<dl>"),
            Tag::DefinitionListTitle => self.output.push_str("<dt>"),
            Tag::DefinitionListDefinition => self.output.push_str("<dd>"),
            Tag::Table(alignments) => {
                self.table.start(alignments);
                self.output.push_str("<table>");
            }
            Tag::TableHead => {
                self.table.set_head(true);
                self.output.push_str("<thead><tr>");
            }
            Tag::TableRow => {
                self.table.start_row();
                self.output.push_str("<tr>");
            }
            Tag::TableCell => {
                let _ = write!(
                    self.output,
                    "<{}{}>",
                    self.table.cell_tag(),
                    self.table.alignment_attr()
                );
            }
            Tag::Emphasis => self.push("<em>"),
            Tag::Strong => self.push("<strong>"),
            Tag::Strikethrough => self.push("<s>"),
            Tag::Superscript => self.push("<sup>"),
            Tag::Subscript => self.push("<sub>"),
            Tag::Link { dest_url, title, .. } => {
                let mut open = format!(r#"<a href="{}""#, escape_html(&rewrite_link(&dest_url)));
                if !title.is_empty() {
                    let _ = write!(open, r#" title="{}""#, escape_html(&title));
                }
                open.push('>');
                self.push(&open);
            }
            Tag::Image {
                dest_url, title, ..
            } => {
                self.image = Some(PendingImage {
                    src: dest_url.into_string(),
                    title: title.into_string(),
                    alt: String::new(),
                });
            }
            Tag::FootnoteDefinition(_) | Tag::HtmlBlock | Tag::MetadataBlock(_) => {}
        }
    }

    fn end_tag(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph => self.output.push_str("</p>"),
            TagEnd::Heading(_) => {
                if let Some((level, id, html)) = self.heading.finish() {
                    let _ = write!(self.output, r#"<h{level} id="{id}">{}</h{level}>"#, html.trim());
                }
            }
            TagEnd::BlockQuote(_) => self.output.push_str("</blockquote>"),
            TagEnd::CodeBlock => {
                let (language, content) = self.code.end();
                match language {
                    Some(lang) => {
                        let _ = write!(
                            self.output,
                            r#"<pre><code class="language-{}">{}</code></pre>"#,
                            escape_html(&lang),
                            escape_html(&content)
                        );
                    }
                    None => {
                        let _ = write!(
                            self.output,
                            "<pre><code>{}</code></pre>",
                            escape_html(&content)
                        );
                    }
                }
            }
            TagEnd::List(ordered) => self.output.push_str(if ordered { "</ol>" } else { "</ul>" }),
            TagEnd::Item => self.output.push_str("</li>"),
            TagEnd::DefinitionList => self.output.push_str("</dl>"),
            TagEnd::DefinitionListTitle => self.output.push_str("</dt>"),
            TagEnd::DefinitionListDefinition => self.output.push_str("</dd>"),
            TagEnd::Table => self.output.push_str("</tbody></table>"),
            TagEnd::TableHead => {
                self.table.set_head(false);
                self.output.push_str("</tr></thead><tbody>");
            }
            TagEnd::TableRow => self.output.push_str("</tr>"),
            TagEnd::TableCell => {
                let _ = write!(self.output, "</{}>", self.table.cell_tag());
                self.table.next_cell();
            }
            TagEnd::Emphasis => self.push("</em>"),
            TagEnd::Strong => self.push("</strong>"),
            TagEnd::Strikethrough => self.push("</s>"),
            TagEnd::Superscript => self.push("</sup>"),
            TagEnd::Subscript => self.push("</sub>"),
            TagEnd::Link => self.push("</a>"),
            TagEnd::Image => self.finish_image(),
            TagEnd::FootnoteDefinition | TagEnd::HtmlBlock | TagEnd::MetadataBlock(_) => {}
        }
    }

    fn finish_image(&mut self) {
        let Some(image) = self.image.take() else {
            return;
        };
        let index = self.image_index;
        self.image_index += 1;

        for processor in &mut self.processors {
            match processor.process(&image.src, &image.alt, &image.title, index) {
                ProcessResult::Placeholder(html) | ProcessResult::Inline(html) => {
                    self.push(&html);
                    return;
                }
                ProcessResult::PassThrough => {}
            }
        }

        let mut tag = format!(r#"<img src="{}" alt="{}""#, escape_html(&image.src), escape_html(&image.alt));
        if !image.title.is_empty() {
            let _ = write!(tag, r#" title="{}""#, escape_html(&image.title));
        }
        tag.push('>');
        self.push(&tag);
    }

    fn text(&mut self, text: &str) {
        if self.code.is_active() {
            self.code.push_str(text);
        } else if let Some(image) = &mut self.image {
            image.alt.push_str(text);
        } else if self.heading.is_active() {
            self.heading.push_text(text);
            self.heading.push_html(&escape_html(text));
        } else {
            self.output.push_str(&escape_html(text));
        }
    }

    fn inline_code(&mut self, code: &str) {
        if let Some(image) = &mut self.image {
            image.alt.push_str(code);
            return;
        }
        if self.heading.is_active() {
            self.heading.push_text(code);
        }
        self.push(&format!("<code>{}</code>", escape_html(code)));
    }
}

/// Point relative links at `.md` sources to the generated `.html` pages.
fn rewrite_link(url: &str) -> Cow<'_, str> {
    let is_local = !(url.contains("://")
        || url.starts_with("mailto:")
        || url.starts_with('#')
        || url.starts_with('/'));
    if !is_local {
        return Cow::Borrowed(url);
    }

    let (path, fragment) = url.split_once('#').map_or((url, None), |(p, f)| (p, Some(f)));
    let Some(stem) = path.strip_suffix(".md") else {
        return Cow::Borrowed(url);
    };

    Cow::Owned(match fragment {
        Some(fragment) => format!("{stem}.html#{fragment}"),
        None => format!("{stem}.html"),
    })
}
