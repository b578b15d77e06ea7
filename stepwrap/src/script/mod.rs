//! The per-invocation carrier handed to a step script.
//!
//! A step script never reaches ambient pipeline state directly. It receives
//! a [`StepScriptContext`] and sees exactly the bindings the carrier
//! exposes.

mod bindings;
mod carrier;

pub use bindings::{Binding, Bindings, RESOURCE_BINDING};
pub use carrier::{StepScriptContext, DEFAULT_MAX_DEPTH};
