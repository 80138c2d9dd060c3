//! Directive argument parsing.
//!
//! Handles the `[content]{#id .class key="value"}` tail of a directive line.

use std::collections::HashMap;

/// Content and attributes of a directive.
///
/// ```
/// use astadoc_renderer::directive::DirectiveArgs;
///
/// let args = DirectiveArgs::parse("model.asta#Overview", r#"#fig-1 .wide width=480 alt="Domain model""#);
/// assert_eq!(args.content, "model.asta#Overview");
/// assert_eq!(args.id.as_deref(), Some("fig-1"));
/// assert_eq!(args.classes, ["wide"]);
/// assert_eq!(args.get("width"), Some("480"));
/// assert_eq!(args.get("alt"), Some("Domain model"));
/// ```
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DirectiveArgs {
    /// Text inside `[...]`, empty when absent.
    pub content: String,
    /// `{#id}`; the last one wins.
    pub id: Option<String>,
    /// `{.class}` entries in order of appearance.
    pub classes: Vec<String>,
    /// `{key=value}` entries; values may be double-quoted, single-quoted or bare.
    pub attrs: HashMap<String, String>,
}

impl DirectiveArgs {
    /// Build arguments from bracket content and the inside of the braces.
    ///
    /// Tokens that are neither `#id`, `.class` nor `key=value` are ignored.
    #[must_use]
    pub fn parse(content: &str, attrs: &str) -> Self {
        let mut args = Self {
            content: content.trim().to_owned(),
            ..Self::default()
        };

        let mut rest = attrs.trim_start();
        while let Some(first) = rest.chars().next() {
            rest = match first {
                '#' | '.' => {
                    let (name, tail) = split_name(&rest[1..]);
                    if !name.is_empty() {
                        if first == '#' {
                            args.id = Some(name.to_owned());
                        } else {
                            args.classes.push(name.to_owned());
                        }
                    }
                    tail
                }
                _ => match split_pair(rest) {
                    Some((key, value, tail)) => {
                        args.attrs.insert(key.to_owned(), value.to_owned());
                        tail
                    }
                    None => skip_token(rest),
                },
            }
            .trim_start();
        }

        args
    }

    /// Attribute value by key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.attrs.get(key).map(String::as_str)
    }
}

/// Split an `#id` or `.class` name off the front of `s`.
fn split_name(s: &str) -> (&str, &str) {
    let end = s
        .find(|c: char| c.is_whitespace() || c == '.' || c == '#')
        .unwrap_or(s.len());
    s.split_at(end)
}

/// Split a `key=value` pair off the front of `s`.
fn split_pair(s: &str) -> Option<(&str, &str, &str)> {
    let key_end = s.find(|c: char| c == '=' || c.is_whitespace())?;
    let (key, after_key) = s.split_at(key_end);
    let after_eq = after_key.strip_prefix('=')?;
    if key.is_empty() {
        return None;
    }

    match after_eq.chars().next() {
        Some(quote @ ('"' | '\'')) => {
            let body = &after_eq[1..];
            let close = body.find(quote)?;
            Some((key, &body[..close], &body[close + 1..]))
        }
        _ => {
            let end = after_eq.find(char::is_whitespace).unwrap_or(after_eq.len());
            Some((key, &after_eq[..end], &after_eq[end..]))
        }
    }
}

/// Drop one unrecognized whitespace-delimited token.
fn skip_token(s: &str) -> &str {
    let end = s.find(char::is_whitespace).unwrap_or(s.len());
    &s[end..]
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty() {
        assert_eq!(DirectiveArgs::parse("", ""), DirectiveArgs::default());
    }

    #[test]
    fn test_content_is_trimmed() {
        let args = DirectiveArgs::parse("  diagrams/model.asta  ", "");
        assert_eq!(args.content, "diagrams/model.asta");
    }

    #[test]
    fn test_id_and_compact_classes() {
        let args = DirectiveArgs::parse("", "#overview.wide.center");
        assert_eq!(args.id.as_deref(), Some("overview"));
        assert_eq!(args.classes, ["wide", "center"]);
    }

    #[test]
    fn test_quoted_and_bare_values() {
        let args = DirectiveArgs::parse("", r#"alt="Class diagram" title='Model' width=50%"#);
        assert_eq!(args.get("alt"), Some("Class diagram"));
        assert_eq!(args.get("title"), Some("Model"));
        assert_eq!(args.get("width"), Some("50%"));
    }

    #[test]
    fn test_value_may_contain_equals_and_ampersand() {
        let args = DirectiveArgs::parse("", r#"options="width=200&align=center""#);
        assert_eq!(args.get("options"), Some("width=200&align=center"));
    }

    #[test]
    fn test_empty_quoted_value() {
        let args = DirectiveArgs::parse("", r#"alt="""#);
        assert_eq!(args.get("alt"), Some(""));
    }

    #[test]
    fn test_garbage_tokens_are_skipped() {
        let args = DirectiveArgs::parse("", r#"lonely =x .ok broken="unterminated"#);
        assert_eq!(args.classes, ["ok"]);
        assert_eq!(args.get("lonely"), None);
        assert_eq!(args.get("broken"), None);
    }

    #[test]
    fn test_missing_key() {
        let args = DirectiveArgs::parse("", "width=1");
        assert_eq!(args.get("height"), None);
    }
}
