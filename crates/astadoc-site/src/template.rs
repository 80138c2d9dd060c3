//! HTML page template.

use std::fmt::Write;

use astadoc_renderer::{TocEntry, escape_html};

/// All data needed to render a page.
pub struct PageData<'a> {
    pub title: &'a str,
    pub html_content: &'a str,
    pub toc: &'a [TocEntry],
}

/// Render a complete HTML page.
pub fn render_page(page: &PageData<'_>) -> String {
    let mut html = String::with_capacity(page.html_content.len() + 2048);

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    let _ = writeln!(html, "<title>{}</title>", escape_html(page.title));
    html.push_str("<style>\n");
    html.push_str("body { margin: 0 auto; padding: 1rem 2rem; max-width: 56rem; font-family: sans-serif; }\n");
    html.push_str("nav.toc li.nested { margin-left: 1rem; }\n");
    html.push_str("figure.astah-figure img, img.align-center { display: block; margin: 0 auto; }\n");
    html.push_str("</style>\n");
    html.push_str("</head>\n<body>\n");

    html.push_str("<main>\n");
    render_toc(&mut html, page.toc);
    html.push_str("<article>\n");
    html.push_str(page.html_content);
    html.push_str("\n</article>\n</main>\n");

    html.push_str("</body>\n</html>\n");
    html
}

fn render_toc(html: &mut String, toc: &[TocEntry]) {
    if toc.is_empty() {
        return;
    }
    html.push_str("<nav class=\"toc\">\n<h2>On this page</h2>\n<ul>\n");
    for entry in toc {
        let indent = if entry.level >= 3 { " class=\"nested\"" } else { "" };
        let _ = writeln!(
            html,
            "<li{indent}><a href=\"#{}\">{}</a></li>",
            escape_html(&entry.id),
            escape_html(&entry.title),
        );
    }
    html.push_str("</ul>\n</nav>\n");
}
