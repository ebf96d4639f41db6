//! Running an operation across an ordered list of recipes.
//!
//! For [`Operation::Apply`] every recipe's pre-apply checks run before any
//! recipe's `apply`, so a validation failure anywhere leaves the host
//! untouched. Execution stops at the first failure.

use std::fmt;
use std::str::FromStr;
use std::time::{Duration, Instant};

use crate::error::CookError;
use crate::recipe::Recipe;

/// What to do with the selected recipes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Pre-apply checks, then apply.
    Apply,
    /// Teardown.
    Cleanup,
    /// Pre-apply checks only.
    Check,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Apply => "apply",
            Self::Cleanup => "cleanup",
            Self::Check => "check",
        };
        f.write_str(name)
    }
}

impl FromStr for Operation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "apply" => Ok(Self::Apply),
            "cleanup" => Ok(Self::Cleanup),
            "check" => Ok(Self::Check),
            _ => Err(format!("unknown operation: {}", s)),
        }
    }
}

/// Final state of one recipe in a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecipeStatus {
    /// Pre-apply checks passed (check-only run, or apply never reached).
    Checked,
    Applied,
    CleanedUp,
    Failed,
}

/// Outcome of one recipe.
#[derive(Debug, Clone)]
pub struct RecipeOutcome {
    pub name: String,
    pub status: RecipeStatus,
    pub duration: Duration,
}

/// Progress events emitted while running.
#[derive(Debug)]
pub enum RunProgress<'a> {
    /// Pre-apply checks are about to run for a recipe.
    Checking { name: &'a str },
    /// A recipe's main step is about to start.
    Starting {
        name: &'a str,
        index: usize,
        total: usize,
    },
    /// A recipe finished (successfully or not).
    Finished { outcome: &'a RecipeOutcome },
}

/// Result of running an operation.
#[derive(Debug)]
pub struct RunReport {
    pub operation: Operation,
    pub computer: String,
    /// Outcomes in execution order; recipes never reached are absent.
    pub recipes: Vec<RecipeOutcome>,
    /// The error that stopped the run.
    pub error: Option<CookError>,
    pub duration: Duration,
}

impl RunReport {
    pub fn success(&self) -> bool {
        self.error.is_none()
    }

    /// The failing recipe, if any.
    pub fn failed_recipe(&self) -> Option<&str> {
        self.recipes
            .iter()
            .find(|r| r.status == RecipeStatus::Failed)
            .map(|r| r.name.as_str())
    }

    /// Turn a failed report into its error.
    pub fn into_result(self) -> crate::error::Result<Self> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(self),
        }
    }
}

/// Runs recipes against one computer.
pub struct RecipeRunner<'a> {
    recipes: &'a [Box<dyn Recipe>],
}

impl<'a> RecipeRunner<'a> {
    pub fn new(recipes: &'a [Box<dyn Recipe>]) -> Self {
        Self { recipes }
    }

    /// Run `operation` on `computer`.
    pub fn run(&self, operation: Operation, computer: &str) -> RunReport {
        self.run_with_progress(operation, computer, |_| {})
    }

    /// Run `operation` on `computer`, reporting progress.
    pub fn run_with_progress(
        &self,
        operation: Operation,
        computer: &str,
        mut on_progress: impl FnMut(RunProgress<'_>),
    ) -> RunReport {
        let start = Instant::now();
        let mut report = RunReport {
            operation,
            computer: computer.to_string(),
            recipes: Vec::new(),
            error: None,
            duration: Duration::ZERO,
        };

        tracing::info!(
            "{} {} recipe(s) on {}",
            operation,
            self.recipes.len(),
            computer
        );

        if matches!(operation, Operation::Apply | Operation::Check) {
            self.check_all(computer, &mut report, &mut on_progress);
        }

        if report.error.is_none() && operation != Operation::Check {
            self.execute_all(operation, computer, &mut report, &mut on_progress);
        }

        report.duration = start.elapsed();
        report
    }

    fn check_all(
        &self,
        computer: &str,
        report: &mut RunReport,
        on_progress: &mut impl FnMut(RunProgress<'_>),
    ) {
        for recipe in self.recipes {
            on_progress(RunProgress::Checking {
                name: recipe.name(),
            });
            let started = Instant::now();

            let result = recipe.pre_apply_checks(computer);
            let status = if result.is_ok() {
                RecipeStatus::Checked
            } else {
                RecipeStatus::Failed
            };
            let outcome = RecipeOutcome {
                name: recipe.name().to_string(),
                status,
                duration: started.elapsed(),
            };

            if let Err(err) = result {
                tracing::error!("{}: pre-apply checks failed: {}", recipe.name(), err);
                on_progress(RunProgress::Finished { outcome: &outcome });
                report.recipes.push(outcome);
                report.error = Some(err);
                return;
            }

            report.recipes.push(outcome);
        }
    }

    fn execute_all(
        &self,
        operation: Operation,
        computer: &str,
        report: &mut RunReport,
        on_progress: &mut impl FnMut(RunProgress<'_>),
    ) {
        // Check outcomes are replaced by the main step's outcome.
        report.recipes.clear();
        let total = self.recipes.len();

        for (index, recipe) in self.recipes.iter().enumerate() {
            on_progress(RunProgress::Starting {
                name: recipe.name(),
                index: index + 1,
                total,
            });
            let started = Instant::now();

            let (result, done) = match operation {
                Operation::Apply => (recipe.apply(computer), RecipeStatus::Applied),
                Operation::Cleanup => (recipe.cleanup(computer), RecipeStatus::CleanedUp),
                Operation::Check => (Ok(()), RecipeStatus::Checked),
            };

            let outcome = RecipeOutcome {
                name: recipe.name().to_string(),
                status: if result.is_ok() { done } else { RecipeStatus::Failed },
                duration: started.elapsed(),
            };
            on_progress(RunProgress::Finished { outcome: &outcome });
            report.recipes.push(outcome);

            if let Err(err) = result {
                tracing::error!("{}: {} failed: {}", recipe.name(), operation, err);
                report.error = Some(err);
                return;
            }

            tracing::info!("{}: {} done", recipe.name(), operation);
        }
    }
}
