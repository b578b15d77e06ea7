//! Reserved variable names.
//!
//! The platform owns the bindings for a handful of names inside every step
//! script. This module records them, and rejects scripts that try to
//! declare one of them at top level.

mod registry;

pub use registry::{ReservedName, ReservedNameRegistry, DEFAULT_RESERVATIONS, RESERVED_NAMES};
