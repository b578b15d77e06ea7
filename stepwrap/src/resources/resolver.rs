//! Resolves and reads library resource files.

use super::{resolve_relative, ResourceConfig};
use crate::errors::ResourceError;
use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Path, PathBuf};

/// Reads resource files from beneath a fixed base directory.
///
/// Nothing is cached: every call resolves and reads the file again.
#[derive(Debug, Clone)]
pub struct ResourceResolver {
    base_dir: PathBuf,
    config: ResourceConfig,
}

impl ResourceResolver {
    /// Creates a resolver rooted at `base_dir`.
    #[must_use]
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            config: ResourceConfig::default(),
        }
    }

    /// Sets the read limits.
    #[must_use]
    pub fn with_config(mut self, config: ResourceConfig) -> Self {
        self.config = config;
        self
    }

    /// Returns the base directory.
    #[must_use]
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Returns the read limits.
    #[must_use]
    pub fn config(&self) -> &ResourceConfig {
        &self.config
    }

    /// Resolves `path` to an existing location inside the base directory.
    ///
    /// Symlinks are followed, but the final location must still sit under
    /// the (canonicalized) base directory.
    ///
    /// # Errors
    ///
    /// Returns `AbsolutePath`, `PathTraversal` or `NotFound` as appropriate,
    /// and `Io` if the base directory itself cannot be resolved.
    pub fn resolve(&self, path: &str) -> Result<PathBuf, ResourceError> {
        let lexical = resolve_relative(&self.base_dir, path)?;
        let canonical_base = fs::canonicalize(&self.base_dir)
            .map_err(|err| ResourceError::io(path, &self.base_dir, err))?;

        let canonical = match fs::canonicalize(&lexical) {
            Ok(canonical) => canonical,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Err(ResourceError::not_found(path));
            }
            Err(err) => return Err(ResourceError::io(path, lexical, err)),
        };

        if !canonical.starts_with(&canonical_base) {
            return Err(ResourceError::path_traversal(path));
        }

        Ok(canonical)
    }

    /// Reads the resource at `path` as text.
    ///
    /// # Errors
    ///
    /// Fails with the resolution errors of [`resolve`](Self::resolve), plus
    /// `IsDirectory`, `NotAFile`, `TooLarge`, or `Io` (which covers invalid
    /// UTF-8).
    pub fn read(&self, path: &str) -> Result<String, ResourceError> {
        let result = self.read_inner(path);
        match &result {
            Ok(contents) => {
                tracing::debug!(path = %path, bytes = contents.len(), "Resource read");
            }
            Err(err) => {
                tracing::warn!(path = %path, error = %err, "Resource request rejected");
            }
        }
        result
    }

    /// Reads the resource at `path` on the blocking thread pool.
    ///
    /// # Errors
    ///
    /// Same as [`read`](Self::read).
    pub async fn read_async(&self, path: &str) -> Result<String, ResourceError> {
        let resolver = self.clone();
        let request = path.to_string();

        tokio::task::spawn_blocking(move || resolver.read(&request))
            .await
            .map_err(|err| ResourceError::io(path, &self.base_dir, io::Error::other(err)))?
    }

    fn read_inner(&self, path: &str) -> Result<String, ResourceError> {
        let location = self.resolve(path)?;
        let limit = self.config.max_bytes;

        let metadata =
            fs::metadata(&location).map_err(|err| ResourceError::io(path, &location, err))?;
        if metadata.is_dir() {
            return Err(ResourceError::is_directory(path));
        }
        // Opening a FIFO blocks until a writer appears.
        if !metadata.is_file() {
            return Err(ResourceError::not_a_file(path));
        }
        if metadata.len() > limit {
            return Err(ResourceError::too_large(path, metadata.len(), limit));
        }

        let file = File::open(&location).map_err(|err| ResourceError::io(path, &location, err))?;
        read_bounded(file, limit).map_err(|err| match err {
            BoundedReadError::TooLarge(size) => ResourceError::too_large(path, size, limit),
            BoundedReadError::Io(err) => ResourceError::io(path, &location, err),
        })
    }
}

enum BoundedReadError {
    TooLarge(u64),
    Io(io::Error),
}

// The stat above can be stale or report 0, so the read itself is capped.
fn read_bounded(reader: impl Read, limit: u64) -> Result<String, BoundedReadError> {
    let mut buffer = Vec::new();
    reader
        .take(limit.saturating_add(1))
        .read_to_end(&mut buffer)
        .map_err(BoundedReadError::Io)?;

    let size = buffer.len() as u64;
    if size > limit {
        return Err(BoundedReadError::TooLarge(size));
    }

    String::from_utf8(buffer)
        .map_err(|err| BoundedReadError::Io(io::Error::new(io::ErrorKind::InvalidData, err)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn fixture() -> (TempDir, ResourceResolver) {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("a")).unwrap();
        fs::create_dir_all(dir.path().join("subdir")).unwrap();
        fs::write(dir.path().join("a/b.txt"), "line one\nline two\n").unwrap();
        fs::write(dir.path().join("top.txt"), "top").unwrap();
        let resolver = ResourceResolver::new(dir.path());
        (dir, resolver)
    }

    #[test]
    fn test_reads_nested_file() {
        let (_dir, resolver) = fixture();
        assert_eq!(resolver.read("a/b.txt").unwrap(), "line one\nline two\n");
    }

    #[test]
    fn test_absolute_path_rejected_even_if_present() {
        let (dir, resolver) = fixture();
        fs::create_dir_all(dir.path().join("etc")).unwrap();
        fs::write(dir.path().join("etc/passwd"), "root").unwrap();

        assert!(matches!(
            resolver.read("/etc/passwd"),
            Err(ResourceError::AbsolutePath { .. })
        ));
    }

    #[test]
    fn test_missing_file() {
        let (_dir, resolver) = fixture();
        let err = resolver.read("missing.txt").unwrap_err();

        assert!(matches!(err, ResourceError::NotFound { .. }));
        assert!(err.to_string().contains("'missing.txt'"));
    }

    #[test]
    fn test_directory_rejected() {
        let (_dir, resolver) = fixture();
        assert!(matches!(
            resolver.read("subdir"),
            Err(ResourceError::IsDirectory { .. })
        ));
    }

    #[test]
    fn test_traversal_rejected_when_target_exists() {
        let outer = TempDir::new().unwrap();
        let base = outer.path().join("resources");
        fs::create_dir_all(&base).unwrap();
        fs::write(outer.path().join("secrets.txt"), "hunter2").unwrap();
        let resolver = ResourceResolver::new(&base);

        assert!(matches!(
            resolver.read("../secrets.txt"),
            Err(ResourceError::PathTraversal { .. })
        ));
        assert!(matches!(
            resolver.read("a/../../secrets.txt"),
            Err(ResourceError::PathTraversal { .. })
        ));
    }

    #[test]
    fn test_dot_segments_inside_base() {
        let (_dir, resolver) = fixture();
        assert_eq!(resolver.read("./a/../top.txt").unwrap(), "top");
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_escape_rejected() {
        let outer = TempDir::new().unwrap();
        let base = outer.path().join("resources");
        fs::create_dir_all(&base).unwrap();
        fs::write(outer.path().join("secrets.txt"), "hunter2").unwrap();
        std::os::unix::fs::symlink(outer.path().join("secrets.txt"), base.join("link.txt"))
            .unwrap();
        let resolver = ResourceResolver::new(&base);

        assert!(matches!(
            resolver.read("link.txt"),
            Err(ResourceError::PathTraversal { .. })
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_inside_base_allowed() {
        let (dir, resolver) = fixture();
        std::os::unix::fs::symlink(dir.path().join("top.txt"), dir.path().join("alias.txt"))
            .unwrap();

        assert_eq!(resolver.read("alias.txt").unwrap(), "top");
    }

    #[test]
    fn test_too_large() {
        let (_dir, resolver) = fixture();
        let resolver = resolver.with_config(ResourceConfig::new().with_max_bytes(2));

        assert!(matches!(
            resolver.read("top.txt"),
            Err(ResourceError::TooLarge { size: 3, limit: 2, .. })
        ));
    }

    #[test]
    fn test_read_is_capped_when_stat_underreports() {
        let size = match read_bounded(io::Cursor::new("abcdef"), 4) {
            Err(BoundedReadError::TooLarge(size)) => size,
            _ => panic!("expected the capped read to overflow"),
        };
        assert_eq!(size, 5);

        assert_eq!(
            read_bounded(io::Cursor::new("abcd"), 4).ok().as_deref(),
            Some("abcd")
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_fifo_rejected_without_blocking() {
        let (dir, resolver) = fixture();
        let status = std::process::Command::new("mkfifo")
            .arg(dir.path().join("pipe"))
            .status()
            .unwrap();
        assert!(status.success());

        let (tx, rx) = std::sync::mpsc::channel();
        std::thread::spawn(move || {
            let _ = tx.send(resolver.read("pipe"));
        });
        let result = rx
            .recv_timeout(std::time::Duration::from_secs(3))
            .expect("reading a FIFO must not block");

        let err = result.unwrap_err();
        assert!(matches!(err, ResourceError::NotAFile { .. }));
        assert!(err.to_string().contains("that is not a file"));
    }

    #[test]
    fn test_missing_base_is_io_error() {
        let outer = TempDir::new().unwrap();
        let resolver = ResourceResolver::new(outer.path().join("not-there"));

        assert!(matches!(resolver.read("a.txt"), Err(ResourceError::Io { .. })));
    }

    #[test]
    fn test_relative_base_dir() {
        let dir = TempDir::new_in(".").unwrap();
        assert!(dir.path().is_relative());
        fs::write(dir.path().join("top.txt"), "top").unwrap();
        let resolver = ResourceResolver::new(dir.path());

        assert_eq!(resolver.read("top.txt").unwrap(), "top");
    }

    #[test]
    fn test_invalid_utf8_is_io_error() {
        let (dir, resolver) = fixture();
        fs::write(dir.path().join("blob.bin"), [0xff, 0xfe, 0x00]).unwrap();

        assert!(matches!(resolver.read("blob.bin"), Err(ResourceError::Io { .. })));
    }

    #[test]
    fn test_no_caching() {
        let (dir, resolver) = fixture();
        assert_eq!(resolver.read("top.txt").unwrap(), "top");

        fs::write(dir.path().join("top.txt"), "changed").unwrap();
        assert_eq!(resolver.read("top.txt").unwrap(), "changed");
    }

    #[tokio::test]
    async fn test_read_async() {
        let (_dir, resolver) = fixture();
        assert_eq!(resolver.read_async("top.txt").await.unwrap(), "top");
        assert!(matches!(
            resolver.read_async("nope").await,
            Err(ResourceError::NotFound { .. })
        ));
    }
}
