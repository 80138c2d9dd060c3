//! Code fence tracking.
//!
//! Directive lines inside fenced code blocks are documentation about
//! directives, not directives, so the processor must leave them alone.

/// An open fence: marker character and run length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Fence {
    marker: char,
    len: usize,
}

/// Follows fenced code blocks while a document is scanned line by line.
///
/// A fence opens with three or more backticks or tildes and closes with a
/// run of the same character that is at least as long and carries nothing
/// but trailing whitespace.
#[derive(Debug, Default)]
pub(crate) struct FenceTracker {
    open: Option<Fence>,
}

impl FenceTracker {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Feed the next line; returns whether the line itself is part of a
    /// fenced block (including its delimiters).
    pub(crate) fn feed(&mut self, line: &str) -> bool {
        let run = marker_run(line.trim_start());

        match (self.open, run) {
            (Some(open), Some(close))
                if close.marker == open.marker
                    && close.len >= open.len
                    && line.trim_start()[close.len..].trim().is_empty() =>
            {
                self.open = None;
                true
            }
            (Some(_), _) => true,
            (None, Some(fence)) => {
                self.open = Some(fence);
                true
            }
            (None, None) => false,
        }
    }
}

/// Leading run of three or more fence markers.
fn marker_run(trimmed: &str) -> Option<Fence> {
    let marker = trimmed.chars().next().filter(|c| matches!(c, '`' | '~'))?;
    let len = trimmed.chars().take_while(|&c| c == marker).count();
    (len >= 3).then_some(Fence { marker, len })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed_all(lines: &[&str]) -> Vec<bool> {
        let mut tracker = FenceTracker::new();
        lines.iter().map(|line| tracker.feed(line)).collect()
    }

    #[test]
    fn test_plain_lines_are_outside() {
        assert_eq!(
            feed_all(&["text", "::astah-image[a.asta]", ":::"]),
            [false, false, false]
        );
    }

    #[test]
    fn test_backtick_block() {
        assert_eq!(
            feed_all(&["```markdown", "::astah-image[a.asta]", "```", "after"]),
            [true, true, true, false]
        );
    }

    #[test]
    fn test_tilde_block_not_closed_by_backticks() {
        assert_eq!(
            feed_all(&["~~~", "```", "still code", "~~~", "after"]),
            [true, true, true, true, false]
        );
    }

    #[test]
    fn test_closing_run_must_be_long_enough() {
        assert_eq!(
            feed_all(&["````", "```", "still code", "`````", "after"]),
            [true, true, true, true, false]
        );
    }

    #[test]
    fn test_closing_run_with_info_string_does_not_close() {
        assert_eq!(
            feed_all(&["```", "```rust", "still code"]),
            [true, true, true]
        );
    }

    #[test]
    fn test_indented_fences_and_trailing_space() {
        assert_eq!(
            feed_all(&["   ```text", "code", "  ```   ", "after"]),
            [true, true, true, false]
        );
    }

    #[test]
    fn test_two_backticks_are_inline_code() {
        assert_eq!(feed_all(&["``code``"]), [false]);
    }
}
