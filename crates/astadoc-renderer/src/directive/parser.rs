//! Line-level directive syntax.
//!
//! Directives are block-level: a directive occupies a whole line.
//!
//! - `::name[content]{attrs}` is a leaf directive
//! - `:::name[content]{attrs}` opens a container
//! - `:::` closes the innermost open container

use super::DirectiveArgs;

/// Directive recognized on a line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ParsedDirective {
    Leaf { name: String, args: DirectiveArgs },
    ContainerStart { name: String, args: DirectiveArgs },
    ContainerEnd,
}

/// Recognize a directive line.
///
/// Returns `None` for ordinary Markdown, including lines where text follows
/// the directive's closing bracket or brace.
pub(crate) fn parse_line(line: &str) -> Option<ParsedDirective> {
    let trimmed = line.trim();
    let colons = trimmed.chars().take_while(|&c| c == ':').count();
    if colons < 2 {
        return None;
    }

    let body = &trimmed[colons..];
    if colons >= 3 && body.is_empty() {
        return Some(ParsedDirective::ContainerEnd);
    }

    // `::: name` is accepted for containers, leaves must be tight.
    let body = if colons >= 3 { body.trim_start() } else { body };
    let name_len = body
        .find(|c: char| !(c.is_alphanumeric() || c == '-' || c == '_'))
        .unwrap_or(body.len());
    if name_len == 0 {
        return None;
    }
    let (name, rest) = body.split_at(name_len);

    let (content, rest) = delimited(rest, '[', ']')?;
    let (attrs, rest) = delimited(rest.trim_start(), '{', '}')?;
    if !rest.trim().is_empty() {
        return None;
    }

    let name = name.to_owned();
    let args = DirectiveArgs::parse(content, attrs);
    Some(if colons == 2 {
        ParsedDirective::Leaf { name, args }
    } else {
        ParsedDirective::ContainerStart { name, args }
    })
}

/// Take an optional balanced `open ... close` group off the front of `s`.
///
/// An absent group yields `("", s)`; an unterminated one yields `None`.
fn delimited(s: &str, open: char, close: char) -> Option<(&str, &str)> {
    if !s.starts_with(open) {
        return Some(("", s));
    }

    let mut depth = 0usize;
    for (i, c) in s.char_indices() {
        if c == open {
            depth += 1;
        } else if c == close {
            depth -= 1;
            if depth == 0 {
                return Some((&s[1..i], &s[i + 1..]));
            }
        }
    }
    None
}
