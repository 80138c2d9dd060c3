//! Shared helpers.

use pulldown_cmark::HeadingLevel;

/// Relative URL from the page at `from` to the resource at `to`.
///
/// Both are slash-separated paths from the site root. The last segment of
/// `from` is the page itself, so only its directories count.
///
/// ```
/// use astadoc_renderer::relative_path;
///
/// assert_eq!(relative_path("index.html", "_images/astah-1.png"), "_images/astah-1.png");
/// assert_eq!(relative_path("api/index.html", "_images/astah-1.png"), "../_images/astah-1.png");
/// assert_eq!(relative_path("a/b/page.html", "a/c/other.html"), "../c/other.html");
/// ```
#[must_use]
pub fn relative_path(from: &str, to: &str) -> String {
    let from_segs: Vec<&str> = from.split('/').filter(|s| !s.is_empty()).collect();
    let to_segs: Vec<&str> = to.split('/').filter(|s| !s.is_empty()).collect();

    let from_dir = if from.ends_with('/') {
        &from_segs[..]
    } else {
        &from_segs[..from_segs.len().saturating_sub(1)]
    };

    let common = from_dir
        .iter()
        .zip(&to_segs)
        .take_while(|(a, b)| a == b)
        .count();

    let mut url = "../".repeat(from_dir.len() - common);
    url.push_str(&to_segs[common..].join("/"));
    if url.is_empty() {
        "./".to_owned()
    } else {
        url
    }
}

pub(crate) fn heading_level_to_num(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_page_to_image() {
        assert_eq!(
            relative_path("index.html", "_images/astah-abc.png"),
            "_images/astah-abc.png"
        );
    }

    #[test]
    fn test_nested_page_to_image() {
        assert_eq!(
            relative_path("subdir/index.html", "_images/astah-abc.png"),
            "../_images/astah-abc.png"
        );
        assert_eq!(
            relative_path("a/b/c.html", "_images/x.png"),
            "../../_images/x.png"
        );
    }

    #[test]
    fn test_shared_prefix() {
        assert_eq!(relative_path("guide/setup.html", "guide/img/x.png"), "img/x.png");
    }

    #[test]
    fn test_directory_base() {
        assert_eq!(relative_path("guide/", "guide/x.png"), "x.png");
        assert_eq!(relative_path("guide/", "guide"), "./");
    }

    #[test]
    fn test_empty() {
        assert_eq!(relative_path("", ""), "./");
        assert_eq!(relative_path("", "_images/x.png"), "_images/x.png");
    }
}
