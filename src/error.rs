//! Error types for hostcook operations.
//!
//! This module defines [`CookError`], the primary error type used throughout
//! the crate, and a [`Result`] type alias for convenience.
//!
//! # Error Handling Strategy
//!
//! - Recipes raise `RecipeValidation` from their pre-apply checks and never
//!   catch provisioner errors; those propagate unmodified
//! - Use `anyhow::Error` (via `CookError::Other`) for unexpected errors
//! - All errors should provide actionable messages for users

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for hostcook operations.
#[derive(Debug, Error)]
pub enum CookError {
    /// A recipe precondition does not hold for the current environment.
    #[error("Recipe '{recipe}' validation failed: {message}")]
    RecipeValidation { recipe: String, message: String },

    /// Configuration file not found at expected location.
    #[error("Configuration not found: {path}")]
    ConfigNotFound { path: PathBuf },

    /// Failed to parse configuration file.
    #[error("Failed to parse config at {path}: {message}")]
    ConfigParseError { path: PathBuf, message: String },

    /// No recipe registered under this name.
    #[error("Unknown recipe: {name}")]
    UnknownRecipe { name: String },

    /// Named file set has no directory under the package dir.
    #[error("File set '{name}' not found at {path}")]
    FileSetNotFound { name: String, path: PathBuf },

    /// A file set template could not be rendered.
    #[error("Failed to render {file}: {message}")]
    TemplateError { file: String, message: String },

    /// Shell command failed.
    #[error("Command failed with exit code {code:?}: {command}{}", format_stderr(.stderr))]
    CommandFailed {
        command: String,
        code: Option<i32>,
        stderr: String,
    },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

fn format_stderr(stderr: &str) -> String {
    let trimmed = stderr.trim();
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("\n{}", trimmed)
    }
}

impl CookError {
    /// Shorthand for a recipe validation failure.
    pub fn validation(recipe: impl Into<String>, message: impl Into<String>) -> Self {
        Self::RecipeValidation {
            recipe: recipe.into(),
            message: message.into(),
        }
    }
}

/// Result type alias for hostcook operations.
pub type Result<T> = std::result::Result<T, CookError>;
