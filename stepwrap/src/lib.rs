//! # Stepwrap
//!
//! The execution context a pipeline host hands to a library step script.
//!
//! A step script runs with four ambient context values and one resource
//! accessor already bound:
//!
//! - **`config`**: the library's configuration block
//! - **`hookContext`**: what triggered a lifecycle hook, if anything did
//! - **`stageContext`**: the enclosing stage, if the step runs inside one
//! - **`stepContext`**: the step's own identity
//! - **`resource`**: reads text files shipped alongside the library, confined
//!   to the library's resource directory
//!
//! These names are reserved: a script that declares any of them at top level
//! is rejected before it runs.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use stepwrap::prelude::*;
//!
//! let runner = StepRunner::new(RunnerConfig::default());
//! let invocation = StepInvocation::new("/libraries/maven/resources").with_bundle(
//!     ExecutionContextBundle::new()
//!         .with_config(LibraryConfig::new().with("goal", serde_json::json!("package")))
//!         .with_step_context(StepContext::for_step("maven", "build")),
//! );
//!
//! let outcome = runner.run(&my_script, invocation).await;
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod context;
pub mod errors;
pub mod host;
pub mod observability;
pub mod reserved;
pub mod resources;
pub mod script;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::context::{
        ExecutionContextBundle, HookContext, LibraryConfig, RunIdentity, StageContext,
        StepContext,
    };
    pub use crate::errors::{
        RegistryError, ReservedVariableError, ResourceError, StepError,
    };
    pub use crate::host::{
        RunnerConfig, StepInvocation, StepOutcome, StepRunner, StepScript, StepStatus,
    };
    pub use crate::observability::{init_tracing, LogFormat};
    pub use crate::reserved::{ReservedNameRegistry, RESERVED_NAMES};
    pub use crate::resources::{ResourceConfig, ResourceResolver};
    pub use crate::script::{Bindings, StepScriptContext};
}
