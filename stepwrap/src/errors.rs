//! Error types for step execution.
//!
//! Every error here is an authoring defect in a step script or in the
//! library that ships it. None of them are retried: the host reports them
//! verbatim and marks the step failed.

use std::collections::HashMap;
use std::path::PathBuf;
use thiserror::Error;

/// The main error type for a step invocation.
#[derive(Debug, Error)]
pub enum StepError {
    /// The script tried to bind a reserved name.
    #[error("{0}")]
    ReservedVariable(#[from] ReservedVariableError),

    /// A resource lookup failed.
    #[error("{0}")]
    Resource(#[from] ResourceError),

    /// A nested step invocation exceeded the configured depth.
    #[error("Maximum nested step depth ({max_depth}) exceeded by step '{step}'")]
    NestingTooDeep {
        /// The step that attempted the nested invocation.
        step: String,
        /// The configured limit.
        max_depth: u32,
    },

    /// The script body itself failed.
    #[error("Step script failed: {0}")]
    Script(#[from] anyhow::Error),
}

impl StepError {
    /// Creates a nesting depth error.
    #[must_use]
    pub fn nesting_too_deep(step: impl Into<String>, max_depth: u32) -> Self {
        Self::NestingTooDeep {
            step: step.into(),
            max_depth,
        }
    }

    /// Returns a stable type tag for failure reporting.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ReservedVariable(_) => "ReservedVariableError",
            Self::Resource(err) => err.kind(),
            Self::NestingTooDeep { .. } => "NestingTooDeepError",
            Self::Script(_) => "StepScriptError",
        }
    }

    /// Converts to a dictionary representation.
    #[must_use]
    pub fn to_dict(&self) -> HashMap<String, serde_json::Value> {
        let mut map = match self {
            Self::ReservedVariable(err) => err.to_dict(),
            Self::Resource(err) => err.to_dict(),
            Self::NestingTooDeep { step, max_depth } => {
                let mut map = HashMap::new();
                map.insert("step".to_string(), serde_json::json!(step));
                map.insert("max_depth".to_string(), serde_json::json!(max_depth));
                map
            }
            Self::Script(_) => HashMap::new(),
        };
        map.insert("type".to_string(), serde_json::json!(self.kind()));
        map.insert("message".to_string(), serde_json::json!(self.to_string()));
        map
    }
}

/// Error raised when a script declares a name owned by the platform.
#[derive(Debug, Clone, Error)]
#[error("Cannot bind reserved variable '{name}': {reason}")]
pub struct ReservedVariableError {
    /// The reserved name the script tried to bind.
    pub name: String,
    /// The reason registered for the name.
    pub reason: String,
}

impl ReservedVariableError {
    /// Creates a new reserved variable error.
    #[must_use]
    pub fn new(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Converts to a dictionary representation.
    #[must_use]
    pub fn to_dict(&self) -> HashMap<String, serde_json::Value> {
        let mut map = HashMap::new();
        map.insert("type".to_string(), serde_json::json!("ReservedVariableError"));
        map.insert("name".to_string(), serde_json::json!(self.name));
        map.insert("reason".to_string(), serde_json::json!(self.reason));
        map.insert("message".to_string(), serde_json::json!(self.to_string()));
        map
    }
}

/// Errors raised while building the reserved name registry.
#[derive(Debug, Clone, Error)]
pub enum RegistryError {
    /// Two registrations claimed the same name.
    #[error("{0}")]
    Duplicate(#[from] DuplicateReservationError),

    /// The name is not a valid script identifier.
    #[error("Invalid reserved name '{name}': names must be valid identifiers")]
    InvalidName {
        /// The rejected name.
        name: String,
    },
}

/// Error raised when a reserved name is registered twice.
#[derive(Debug, Clone, Error)]
#[error("Variable name '{name}' is already reserved: {existing_reason}")]
pub struct DuplicateReservationError {
    /// The contested name.
    pub name: String,
    /// The reason held by the first registration.
    pub existing_reason: String,
}

impl DuplicateReservationError {
    /// Creates a new duplicate reservation error.
    #[must_use]
    pub fn new(name: impl Into<String>, existing_reason: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            existing_reason: existing_reason.into(),
        }
    }
}

/// Errors raised by the resource resolver.
///
/// Paths are reported exactly as the step requested them so the library
/// author can find the offending call.
#[derive(Debug, Error)]
pub enum ResourceError {
    /// The requested path was absolute.
    #[error("library step requested a resource that is not a relative path: '{path}'")]
    AbsolutePath {
        /// The requested path.
        path: String,
    },

    /// The requested path climbs outside the resource root.
    #[error("library step requested a resource '{path}' outside of the library resources directory")]
    PathTraversal {
        /// The requested path.
        path: String,
    },

    /// Nothing exists at the requested path.
    #[error("library step requested a resource '{path}' that does not exist")]
    NotFound {
        /// The requested path.
        path: String,
    },

    /// The requested path is a directory.
    #[error("library step requested a resource '{path}' that is not a file")]
    IsDirectory {
        /// The requested path.
        path: String,
    },

    /// The requested path exists but is neither a directory nor a regular
    /// file (a FIFO, socket or device node).
    #[error("library step requested a resource '{path}' that is not a file")]
    NotAFile {
        /// The requested path.
        path: String,
    },

    /// The file exceeds the configured read limit.
    #[error("library step requested a resource '{path}' of {size} bytes, limit is {limit}")]
    TooLarge {
        /// The requested path.
        path: String,
        /// Size of the file on disk.
        size: u64,
        /// Configured limit.
        limit: u64,
    },

    /// Reading the file failed.
    #[error("failed to read resource '{path}': {source}")]
    Io {
        /// The requested path.
        path: String,
        /// Resolved location on disk.
        location: PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },
}

impl ResourceError {
    /// Creates an absolute path error.
    #[must_use]
    pub fn absolute_path(path: impl Into<String>) -> Self {
        Self::AbsolutePath { path: path.into() }
    }

    /// Creates a path traversal error.
    #[must_use]
    pub fn path_traversal(path: impl Into<String>) -> Self {
        Self::PathTraversal { path: path.into() }
    }

    /// Creates a not found error.
    #[must_use]
    pub fn not_found(path: impl Into<String>) -> Self {
        Self::NotFound { path: path.into() }
    }

    /// Creates an is-directory error.
    #[must_use]
    pub fn is_directory(path: impl Into<String>) -> Self {
        Self::IsDirectory { path: path.into() }
    }

    /// Creates a not-a-file error.
    #[must_use]
    pub fn not_a_file(path: impl Into<String>) -> Self {
        Self::NotAFile { path: path.into() }
    }

    /// Creates a too-large error.
    #[must_use]
    pub fn too_large(path: impl Into<String>, size: u64, limit: u64) -> Self {
        Self::TooLarge {
            path: path.into(),
            size,
            limit,
        }
    }

    /// Creates an IO error.
    #[must_use]
    pub fn io(path: impl Into<String>, location: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            location: location.into(),
            source,
        }
    }

    /// Returns the requested path.
    #[must_use]
    pub fn path(&self) -> &str {
        match self {
            Self::AbsolutePath { path }
            | Self::PathTraversal { path }
            | Self::NotFound { path }
            | Self::IsDirectory { path }
            | Self::NotAFile { path }
            | Self::TooLarge { path, .. }
            | Self::Io { path, .. } => path,
        }
    }

    /// Returns a stable type tag for failure reporting.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::AbsolutePath { .. } => "AbsolutePathError",
            Self::PathTraversal { .. } => "PathTraversalError",
            Self::NotFound { .. } => "ResourceNotFoundError",
            Self::IsDirectory { .. } => "ResourceIsDirectoryError",
            Self::NotAFile { .. } => "ResourceNotAFileError",
            Self::TooLarge { .. } => "ResourceTooLargeError",
            Self::Io { .. } => "ResourceIoError",
        }
    }

    /// Converts to a dictionary representation.
    #[must_use]
    pub fn to_dict(&self) -> HashMap<String, serde_json::Value> {
        let mut map = HashMap::new();
        map.insert("type".to_string(), serde_json::json!(self.kind()));
        map.insert("path".to_string(), serde_json::json!(self.path()));

        match self {
            Self::TooLarge { size, limit, .. } => {
                map.insert("size".to_string(), serde_json::json!(size));
                map.insert("limit".to_string(), serde_json::json!(limit));
            }
            Self::Io { location, .. } => {
                map.insert(
                    "location".to_string(),
                    serde_json::json!(location.display().to_string()),
                );
            }
            _ => {}
        }

        map.insert("message".to_string(), serde_json::json!(self.to_string()));
        map
    }
}
