//! Mock UI implementation for testing.
//!
//! `MockUI` implements the `UserInterface` trait and captures all
//! interactions for later assertion.

use super::{OutputMode, UserInterface};

/// Captures all UI output.
#[derive(Debug, Default)]
pub struct MockUI {
    mode: OutputMode,
    messages: Vec<String>,
    successes: Vec<String>,
    warnings: Vec<String>,
    errors: Vec<String>,
    headers: Vec<String>,
    progress: Vec<(usize, usize, String)>,
}

impl MockUI {
    /// Create a new MockUI with Normal output mode.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a MockUI with a specific output mode.
    pub fn with_mode(mode: OutputMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    pub fn successes(&self) -> &[String] {
        &self.successes
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn progress(&self) -> &[(usize, usize, String)] {
        &self.progress
    }

    /// Check if any message contains the given text.
    pub fn has_message(&self, msg: &str) -> bool {
        self.messages.iter().any(|m| m.contains(msg))
    }

    /// Check if any success message contains the given text.
    pub fn has_success(&self, msg: &str) -> bool {
        self.successes.iter().any(|m| m.contains(msg))
    }

    /// Check if any error message contains the given text.
    pub fn has_error(&self, msg: &str) -> bool {
        self.errors.iter().any(|m| m.contains(msg))
    }

    /// Check if any warning message contains the given text.
    pub fn has_warning(&self, msg: &str) -> bool {
        self.warnings.iter().any(|m| m.contains(msg))
    }
}

impl UserInterface for MockUI {
    fn output_mode(&self) -> OutputMode {
        self.mode
    }

    fn message(&mut self, msg: &str) {
        self.messages.push(msg.to_string());
    }

    fn success(&mut self, msg: &str) {
        self.successes.push(msg.to_string());
    }

    fn warning(&mut self, msg: &str) {
        self.warnings.push(msg.to_string());
    }

    fn error(&mut self, msg: &str) {
        self.errors.push(msg.to_string());
    }

    fn show_header(&mut self, title: &str) {
        self.headers.push(title.to_string());
    }

    fn show_progress(&mut self, current: usize, total: usize, label: &str) {
        self.progress.push((current, total, label.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn captures_each_kind() {
        let mut ui = MockUI::new();
        ui.message("hello");
        ui.success("done");
        ui.warning("careful");
        ui.error("broken");
        ui.show_header("apply");
        ui.show_progress(1, 2, "example_com");

        assert!(ui.has_message("hello"));
        assert!(ui.has_success("done"));
        assert!(ui.has_warning("careful"));
        assert!(ui.has_error("broken"));
        assert_eq!(ui.headers(), &["apply".to_string()]);
        assert_eq!(ui.progress(), &[(1, 2, "example_com".to_string())]);
    }

    #[test]
    fn with_mode_sets_mode() {
        let ui = MockUI::with_mode(OutputMode::Quiet);
        assert_eq!(ui.output_mode(), OutputMode::Quiet);
    }
}
