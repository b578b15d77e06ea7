//! Context values handed to a step script.
//!
//! This module provides:
//! - The ordered library configuration
//! - Hook, stage and step metadata
//! - The bundle that groups them for one invocation
//! - The identity of the run the step belongs to

mod bundle;
mod config;
#[cfg(test)]
mod context_tests;
mod identity;
mod metadata;

pub use bundle::{
    ExecutionContextBundle, CONFIG_BINDING, HOOK_CONTEXT_BINDING, STAGE_CONTEXT_BINDING,
    STEP_CONTEXT_BINDING,
};
pub use config::LibraryConfig;
pub use identity::RunIdentity;
pub use metadata::{HookContext, StageContext, StepContext};
