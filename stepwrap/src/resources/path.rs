use crate::errors::ResourceError;
use std::path::{Component, Path, PathBuf};

/// Lexically resolves a requested resource path against `base`.
///
/// `.` segments are dropped and `..` segments are applied, but never above
/// `base`. Does not touch the filesystem.
///
/// # Errors
///
/// Returns `ResourceError::AbsolutePath` if `request` starts with a path
/// separator or is absolute, and `ResourceError::PathTraversal` if a `..`
/// would climb above `base`.
pub fn resolve_relative(base: &Path, request: &str) -> Result<PathBuf, ResourceError> {
    if request.starts_with(['/', '\\']) || Path::new(request).is_absolute() {
        return Err(ResourceError::absolute_path(request));
    }

    let mut resolved = base.to_path_buf();
    let mut depth = 0usize;

    for component in Path::new(request).components() {
        match component {
            Component::Prefix(_) | Component::RootDir => {
                return Err(ResourceError::absolute_path(request));
            }
            Component::CurDir => {}
            Component::ParentDir => {
                if depth == 0 {
                    return Err(ResourceError::path_traversal(request));
                }
                depth -= 1;
                resolved.pop();
            }
            Component::Normal(segment) => {
                depth += 1;
                resolved.push(segment);
            }
        }
    }

    Ok(resolved)
}
