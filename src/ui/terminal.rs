//! Styled terminal UI.

use console::Term;
use std::io::Write;

use super::{should_use_colors, CookTheme, OutputMode, UserInterface};

/// Terminal UI writing status to stdout and errors to stderr.
pub struct TerminalUI {
    out: Term,
    err: Term,
    theme: CookTheme,
    mode: OutputMode,
}

impl TerminalUI {
    /// Create a new terminal UI.
    pub fn new(mode: OutputMode) -> Self {
        let theme = if should_use_colors() {
            CookTheme::new()
        } else {
            CookTheme::plain()
        };

        Self {
            out: Term::stdout(),
            err: Term::stderr(),
            theme,
            mode,
        }
    }
}

impl UserInterface for TerminalUI {
    fn output_mode(&self) -> OutputMode {
        self.mode
    }

    fn message(&mut self, msg: &str) {
        if self.mode.shows_status() {
            writeln!(self.out, "{}", msg).ok();
        }
    }

    fn success(&mut self, msg: &str) {
        writeln!(self.out, "{}", self.theme.format_success(msg)).ok();
    }

    fn warning(&mut self, msg: &str) {
        if self.mode.shows_status() {
            writeln!(self.out, "{}", self.theme.format_warning(msg)).ok();
        }
    }

    fn error(&mut self, msg: &str) {
        writeln!(self.err, "{}", self.theme.format_error(msg)).ok();
    }

    fn show_header(&mut self, title: &str) {
        if self.mode.shows_status() {
            writeln!(self.out, "{}", self.theme.format_header(title)).ok();
        }
    }

    fn show_progress(&mut self, current: usize, total: usize, label: &str) {
        if self.mode.shows_status() {
            writeln!(
                self.out,
                "{}",
                self.theme.format_progress(current, total, label)
            )
            .ok();
        }
    }
}
