//! Error and reporting types.

use std::fmt;
use thiserror::Error;

/// Error raised by a command, a warmup or a teardown.
///
/// This is the "thrown" channel of the command contract: a `check` or `run`
/// returning `Err` is contained by the runner and folded into the boolean
/// trial outcome, while metrics record it separately from a plain `false`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct CommandError {
    message: String,
}

impl CommandError {
    pub fn new(message: impl Into<String>) -> Self {
        CommandError {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<String> for CommandError {
    fn from(message: String) -> Self {
        CommandError::new(message)
    }
}

impl From<&str> for CommandError {
    fn from(message: &str) -> Self {
        CommandError::new(message)
    }
}

/// One accepted step of the shrink search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShrinkStep {
    /// Rendered form of the counterexample at this step.
    pub rendered: String,
    /// The step number (0 = original failure, 1+ = accepted shrinks).
    pub step: usize,
}

/// Outcome of a trial batch.
#[derive(Debug, Clone)]
pub enum TestResult<V> {
    /// Every trial passed.
    Pass { tests_run: usize },

    /// Some trial failed; `counterexample` is the smallest failing value found.
    Fail {
        counterexample: V,
        rendered: String,
        tests_run: usize,
        shrinks_performed: usize,
        /// The shrinking progression that led to the minimal counterexample.
        shrink_steps: Vec<ShrinkStep>,
    },
}

impl<V> TestResult<V> {
    pub fn is_pass(&self) -> bool {
        matches!(self, TestResult::Pass { .. })
    }
}

impl<V> fmt::Display for TestResult<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TestResult::Pass { tests_run } => {
                write!(f, "  ✓ passed {} tests.", tests_run)
            }
            TestResult::Fail {
                rendered,
                tests_run,
                shrinks_performed,
                shrink_steps,
                ..
            } => {
                writeln!(
                    f,
                    "  ✗ failed after {} tests and {} shrinks.",
                    tests_run, shrinks_performed
                )?;

                if !shrink_steps.is_empty() {
                    writeln!(f)?;
                    writeln!(f, "    Shrinking progression:")?;
                    for step in shrink_steps {
                        if step.step == 0 {
                            writeln!(f, "      │ Original: {}", step.rendered)?;
                        } else {
                            writeln!(f, "      │ Step {}: {}", step.step, step.rendered)?;
                        }
                    }
                    writeln!(f)?;
                }

                write!(f, "    Minimal counterexample: {}", rendered)
            }
        }
    }
}
