//! Colored terminal output utilities.

use console::{Style, Term};

/// Width of the label column in [`Output::field`] lines.
const LABEL_WIDTH: usize = 14;

/// Terminal output formatter.
///
/// Writes to stderr so the rendered report paths and summaries never mix
/// with data piped from stdout.
pub(crate) struct Output {
    term: Term,
    green: Style,
    yellow: Style,
    red: Style,
    bold: Style,
    cyan_bold: Style,
}

impl Output {
    /// Create a new output formatter.
    #[must_use]
    pub(crate) fn new() -> Self {
        Self {
            term: Term::stderr(),
            green: Style::new().green(),
            yellow: Style::new().yellow(),
            red: Style::new().red(),
            bold: Style::new().bold(),
            cyan_bold: Style::new().cyan().bold(),
        }
    }

    /// Print an info message.
    pub(crate) fn info(&self, msg: &str) {
        let _ = self.term.write_line(msg);
    }

    /// Print a `Label:  value` summary line with a bold label.
    pub(crate) fn field(&self, label: &str, value: &str) {
        let label = format!("{label}:");
        let line = format!(
            "{} {value}",
            self.bold.apply_to(format!("{label:<LABEL_WIDTH$}"))
        );
        let _ = self.term.write_line(&line);
    }

    /// Print a success message (green).
    pub(crate) fn success(&self, msg: &str) {
        let _ = self.term.write_line(&self.green.apply_to(msg).to_string());
    }

    /// Print a warning message (yellow).
    pub(crate) fn warning(&self, msg: &str) {
        let _ = self.term.write_line(&self.yellow.apply_to(msg).to_string());
    }

    /// Print an error message (red).
    pub(crate) fn error(&self, msg: &str) {
        let _ = self.term.write_line(&self.red.apply_to(msg).to_string());
    }

    /// Print a highlighted message (cyan bold).
    pub(crate) fn highlight(&self, msg: &str) {
        let _ = self
            .term
            .write_line(&self.cyan_bold.apply_to(msg).to_string());
    }
}
