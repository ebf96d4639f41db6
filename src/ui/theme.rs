//! Visual theme and styling.

use console::Style;

/// Terminal styles for hostcook output.
#[derive(Debug, Clone)]
pub struct CookTheme {
    /// Style for success messages (green).
    pub success: Style,
    /// Style for warning messages (yellow).
    pub warning: Style,
    /// Style for error messages (red bold).
    pub error: Style,
    /// Style for dim/secondary text.
    pub dim: Style,
    /// Style for headers (cyan bold).
    pub header: Style,
    /// Style for progress counters (dim).
    pub counter: Style,
}

impl Default for CookTheme {
    fn default() -> Self {
        Self::new()
    }
}

impl CookTheme {
    /// Create the default colored theme.
    pub fn new() -> Self {
        Self {
            success: Style::new().green(),
            warning: Style::new().yellow(),
            error: Style::new().red().bold(),
            dim: Style::new().dim(),
            header: Style::new().cyan().bold(),
            counter: Style::new().dim(),
        }
    }

    /// Create a theme without colors (for non-TTY or --no-color).
    pub fn plain() -> Self {
        Self {
            success: Style::new(),
            warning: Style::new(),
            error: Style::new(),
            dim: Style::new(),
            header: Style::new(),
            counter: Style::new(),
        }
    }

    pub fn format_success(&self, msg: &str) -> String {
        format!("{}", self.success.apply_to(format!("✓ {}", msg)))
    }

    pub fn format_warning(&self, msg: &str) -> String {
        format!("{}", self.warning.apply_to(format!("⚠ {}", msg)))
    }

    pub fn format_error(&self, msg: &str) -> String {
        format!("{}", self.error.apply_to(format!("✗ {}", msg)))
    }

    pub fn format_header(&self, title: &str) -> String {
        format!("{}", self.header.apply_to(format!("▸ {}", title)))
    }

    pub fn format_progress(&self, current: usize, total: usize, label: &str) -> String {
        format!(
            "{} {}",
            self.counter.apply_to(format!("[{}/{}]", current, total)),
            label
        )
    }
}

/// Check if colors should be enabled.
pub fn should_use_colors() -> bool {
    // https://no-color.org/
    if std::env::var("NO_COLOR").is_ok() {
        return false;
    }

    console::Term::stdout().is_term()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_theme_formats_icons() {
        let theme = CookTheme::plain();
        assert_eq!(theme.format_success("done"), "✓ done");
        assert_eq!(theme.format_warning("careful"), "⚠ careful");
        assert_eq!(theme.format_error("failed"), "✗ failed");
        assert_eq!(theme.format_header("apply"), "▸ apply");
    }

    #[test]
    fn plain_theme_formats_progress() {
        let theme = CookTheme::plain();
        assert_eq!(theme.format_progress(2, 3, "example_com"), "[2/3] example_com");
    }
}
