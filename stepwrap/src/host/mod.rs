//! A minimal in-process execution host.
//!
//! The pipeline engine normally plays this role. [`StepRunner`] does the same
//! job for embedders and tests: it builds one carrier per invocation,
//! validates the script's declared names, runs the script and reports the
//! outcome.

mod config;
mod outcome;
mod runner;

pub use config::RunnerConfig;
pub use outcome::{StepOutcome, StepStatus};
pub use runner::{StepInvocation, StepRunner, StepScript};

#[cfg(test)]
pub use runner::MockStepScript;
