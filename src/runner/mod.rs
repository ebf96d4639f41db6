//! Recipe execution orchestration.

pub mod operation;

pub use operation::{Operation, RecipeOutcome, RecipeRunner, RecipeStatus, RunProgress, RunReport};
