//! User-facing terminal output.
//!
//! This module provides:
//! - [`UserInterface`] trait for UI abstraction
//! - [`TerminalUI`] for styled terminal output
//! - [`MockUI`] for capturing output in tests
//!
//! Diagnostic logging goes through `tracing`; this module is only for what
//! the operator is meant to read.
//!
//! # Example
//!
//! ```
//! use hostcook::ui::{MockUI, UserInterface};
//!
//! let mut ui = MockUI::new();
//! ui.show_header("apply example_com on web1");
//! ui.success("example_com applied");
//! assert!(ui.has_success("applied"));
//! ```

pub mod mock;
pub mod output;
pub mod terminal;
pub mod theme;

pub use mock::MockUI;
pub use output::{format_duration, OutputMode};
pub use terminal::TerminalUI;
pub use theme::{should_use_colors, CookTheme};

/// Trait for user interface interactions.
///
/// This trait allows mocking the UI in tests.
pub trait UserInterface {
    /// Get the current output mode.
    fn output_mode(&self) -> OutputMode;

    /// Display a message to the user.
    fn message(&mut self, msg: &str);

    /// Display a success message.
    fn success(&mut self, msg: &str);

    /// Display a warning message.
    fn warning(&mut self, msg: &str);

    /// Display an error message. Always shown.
    fn error(&mut self, msg: &str);

    /// Show a header/banner.
    fn show_header(&mut self, title: &str);

    /// Show progress (e.g., "[2/3] example_com").
    fn show_progress(&mut self, current: usize, total: usize, label: &str);
}
