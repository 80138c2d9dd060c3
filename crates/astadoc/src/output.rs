//! Colored terminal output on stderr.

use console::{Style, Term};

/// Terminal output formatter.
pub(crate) struct Output {
    term: Term,
    green: Style,
    yellow: Style,
    red: Style,
}

impl Output {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self {
            term: Term::stderr(),
            green: Style::new().green(),
            yellow: Style::new().yellow().bold(),
            red: Style::new().red().bold(),
        }
    }

    pub(crate) fn info(&self, msg: &str) {
        let _ = self.term.write_line(msg);
    }

    /// Print a success message (green).
    pub(crate) fn success(&self, msg: &str) {
        let _ = self.term.write_line(&self.green.apply_to(msg).to_string());
    }

    /// Print `warning: <msg>` with a yellow label.
    pub(crate) fn warning(&self, msg: &str) {
        let label = self.yellow.apply_to("warning:");
        let _ = self.term.write_line(&format!("{label} {msg}"));
    }

    /// Print `error: <msg>` with a red label.
    pub(crate) fn error(&self, msg: &str) {
        let label = self.red.apply_to("error:");
        let _ = self.term.write_line(&format!("{label} {msg}"));
    }
}
