//! Sandboxed access to library resource files.
//!
//! Resources live under a base directory owned by the library that defines
//! the step. Every lookup is relative to that directory and can never leave
//! it.

mod config;
mod path;
mod resolver;

pub use config::ResourceConfig;
pub use path::resolve_relative;
pub use resolver::ResourceResolver;
