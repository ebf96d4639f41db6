//! Output mode and formatting helpers.

use std::str::FromStr;
use std::time::Duration;

/// Output verbosity mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// Show everything, including per-recipe timings.
    Verbose,
    /// Show progress and status.
    #[default]
    Normal,
    /// Show only errors and the final result.
    Quiet,
}

impl FromStr for OutputMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "verbose" => Ok(Self::Verbose),
            "normal" => Ok(Self::Normal),
            "quiet" => Ok(Self::Quiet),
            _ => Err(format!("unknown output mode: {}", s)),
        }
    }
}

impl OutputMode {
    /// Check if this mode shows progress and status messages.
    pub fn shows_status(&self) -> bool {
        !matches!(self, Self::Quiet)
    }

    /// Check if this mode shows timings and other detail.
    pub fn shows_detail(&self) -> bool {
        matches!(self, Self::Verbose)
    }
}

/// Format a duration for display: `850ms`, `3.2s`, `2m 05s`.
pub fn format_duration(duration: Duration) -> String {
    let millis = duration.as_millis();
    if millis < 1000 {
        format!("{}ms", millis)
    } else if millis < 60_000 {
        format!("{:.1}s", duration.as_secs_f64())
    } else {
        let secs = duration.as_secs();
        format!("{}m {:02}s", secs / 60, secs % 60)
    }
}
