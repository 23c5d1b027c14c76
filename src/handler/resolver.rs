//! Media path resolution module
//!
//! Turns a raw request path into a canonical file path confined to the base
//! directory. Traversal is blocked twice: a textual check for `..` before the
//! filesystem is touched, and a containment check on the canonical path that
//! also catches symlinks leading out of the base directory.

use crate::error::MediaError;
use crate::logger;
use percent_encoding::percent_decode_str;
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Path prefix stripped from requests arriving on local development hosts
///
/// Lets `http://localhost/<prefix>/clip.mp4` address the same file that
/// production serves at `http://<prefix>/clip.mp4`.
#[derive(Debug, Clone)]
pub struct LocalPrefix {
    hosts: Vec<String>,
    prefix: String,
}

impl LocalPrefix {
    /// Returns `None` when there is nothing to strip
    pub fn new(hosts: Vec<String>, prefix: &str) -> Option<Self> {
        let prefix = prefix.trim_matches('/');
        if prefix.is_empty() || hosts.is_empty() {
            return None;
        }
        Some(Self {
            hosts,
            prefix: prefix.to_string(),
        })
    }

    /// Host matches when it contains any configured marker
    pub fn applies_to(&self, host: &str) -> bool {
        self.hosts.iter().any(|marker| host.contains(marker.as_str()))
    }

    fn strip<'a>(&self, path: &'a str) -> &'a str {
        if path == self.prefix {
            return "";
        }
        path.strip_prefix(self.prefix.as_str())
            .and_then(|rest| rest.strip_prefix('/'))
            .map_or(path, |rest| rest.trim_start_matches('/'))
    }
}

/// A regular file inside the base directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedFile {
    path: PathBuf,
    requested: String,
}

impl ResolvedFile {
    /// Canonical absolute path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path as the client asked for it, relative to the base directory
    pub fn requested(&self) -> &str {
        &self.requested
    }
}

#[derive(Debug, Clone)]
pub struct PathResolver {
    base_dir: PathBuf,
    local_prefix: Option<LocalPrefix>,
}

impl PathResolver {
    /// Fails if the base directory cannot be canonicalized
    pub fn new(base_dir: impl AsRef<Path>, local_prefix: Option<LocalPrefix>) -> io::Result<Self> {
        let base_dir = base_dir.as_ref().canonicalize()?;
        if !base_dir.is_dir() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("media base is not a directory: {}", base_dir.display()),
            ));
        }
        Ok(Self {
            base_dir,
            local_prefix,
        })
    }

    /// Canonical base directory
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Normalise the URI path into a path relative to the base directory
    ///
    /// Decodes percent-escapes, trims slashes and applies the local host
    /// prefix. An empty result means no file was requested. A path that is
    /// not valid UTF-8 is still checked for `..` before being reported as
    /// missing.
    pub fn requested_path(&self, uri_path: &str, host: Option<&str>) -> Result<String, MediaError> {
        let raw = percent_decode_str(uri_path);
        let Ok(decoded) = raw.clone().decode_utf8() else {
            if raw.decode_utf8_lossy().contains("..") {
                logger::log_warning(&format!("Path traversal attempt blocked: {uri_path}"));
                return Err(MediaError::Traversal);
            }
            return Err(MediaError::NotFound(uri_path.trim_matches('/').to_string()));
        };
        let mut path = decoded.trim_matches('/');

        if let (Some(local), Some(host)) = (&self.local_prefix, host) {
            if local.applies_to(host) {
                path = local.strip(path);
            }
        }

        if path.is_empty() {
            return Err(MediaError::NotSpecified);
        }
        Ok(path.to_string())
    }

    /// Resolve a request to a file under the base directory
    pub async fn resolve(
        &self,
        uri_path: &str,
        host: Option<&str>,
    ) -> Result<ResolvedFile, MediaError> {
        let requested = self.requested_path(uri_path, host)?;

        let joined = format!("{}/{}", self.base_dir.display(), requested).replace('\\', "/");
        if joined.contains("..") {
            logger::log_warning(&format!("Path traversal attempt blocked: {uri_path}"));
            return Err(MediaError::Traversal);
        }

        let Ok(path) = fs::canonicalize(self.base_dir.join(&requested)).await else {
            return Err(MediaError::NotFound(requested));
        };

        if !path.starts_with(&self.base_dir) {
            logger::log_warning(&format!(
                "Path traversal attempt blocked: {} -> {}",
                uri_path,
                path.display()
            ));
            return Err(MediaError::OutsideBase);
        }

        match fs::metadata(&path).await {
            Ok(meta) if meta.is_file() => Ok(ResolvedFile { path, requested }),
            _ => Err(MediaError::NotAFile(requested)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn media_dir() -> TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("videos")).unwrap();
        std::fs::write(dir.path().join("videos/clip.mp4"), b"mp4").unwrap();
        std::fs::write(dir.path().join("cover.jpg"), b"jpg").unwrap();
        dir
    }

    fn local_prefix() -> Option<LocalPrefix> {
        LocalPrefix::new(vec!["localhost".to_string()], "media.example")
    }

    #[test]
    fn test_local_prefix_requires_prefix_and_hosts() {
        assert!(LocalPrefix::new(vec!["localhost".to_string()], "").is_none());
        assert!(LocalPrefix::new(vec!["localhost".to_string()], "/").is_none());
        assert!(LocalPrefix::new(Vec::new(), "media.example").is_none());
    }

    #[test]
    fn test_requested_path_trims_and_decodes() {
        let dir = media_dir();
        let resolver = PathResolver::new(dir.path(), None).unwrap();
        assert_eq!(
            resolver.requested_path("/videos/clip.mp4/", None).unwrap(),
            "videos/clip.mp4"
        );
        assert_eq!(
            resolver.requested_path("/my%20song.mp3", None).unwrap(),
            "my song.mp3"
        );
        assert!(matches!(
            resolver.requested_path("///", None),
            Err(MediaError::NotSpecified)
        ));
        assert!(matches!(
            resolver.requested_path("/%FF.mp3", None),
            Err(MediaError::NotFound(_))
        ));
        assert!(matches!(
            resolver.requested_path("/../%FF.mp3", None),
            Err(MediaError::Traversal)
        ));
    }

    #[test]
    fn test_local_prefix_stripping() {
        let dir = media_dir();
        let resolver = PathResolver::new(dir.path(), local_prefix()).unwrap();

        let local = Some("localhost:8080");
        assert_eq!(
            resolver.requested_path("/media.example/cover.jpg", local).unwrap(),
            "cover.jpg"
        );
        assert!(matches!(
            resolver.requested_path("/media.example", local),
            Err(MediaError::NotSpecified)
        ));
        assert!(matches!(
            resolver.requested_path("/media.example/", local),
            Err(MediaError::NotSpecified)
        ));
        // Only whole segments are stripped
        assert_eq!(
            resolver.requested_path("/media.examples/cover.jpg", local).unwrap(),
            "media.examples/cover.jpg"
        );
        // Production hosts keep the path untouched
        assert_eq!(
            resolver
                .requested_path("/media.example/cover.jpg", Some("media.example"))
                .unwrap(),
            "media.example/cover.jpg"
        );
        assert_eq!(
            resolver.requested_path("/media.example/cover.jpg", None).unwrap(),
            "media.example/cover.jpg"
        );
    }

    #[tokio::test]
    async fn test_resolve_regular_file() {
        let dir = media_dir();
        let resolver = PathResolver::new(dir.path(), None).unwrap();
        let file = resolver.resolve("/videos/clip.mp4", None).await.unwrap();
        assert_eq!(file.requested(), "videos/clip.mp4");
        assert!(file.path().starts_with(resolver.base_dir()));
        assert!(file.path().is_absolute());
    }

    #[tokio::test]
    async fn test_resolve_with_dot_segment() {
        let dir = media_dir();
        let resolver = PathResolver::new(dir.path(), None).unwrap();
        let file = resolver.resolve("/./videos/./clip.mp4", None).await.unwrap();
        assert!(file.path().ends_with("videos/clip.mp4"));
    }

    #[tokio::test]
    async fn test_traversal_rejected_before_filesystem() {
        let dir = media_dir();
        let resolver = PathResolver::new(dir.path().join("videos"), None).unwrap();
        for path in [
            "/../cover.jpg",
            "/../missing.jpg",
            "/%2e%2e/cover.jpg",
            "/a/..%5Ccover.jpg",
            "/clip..mp4",
            "/../%FF.mp4",
            "/%2e%2e/%C0%AF.mp4",
        ] {
            assert!(
                matches!(resolver.resolve(path, None).await, Err(MediaError::Traversal)),
                "{path}"
            );
        }
    }

    #[tokio::test]
    async fn test_missing_and_directory() {
        let dir = media_dir();
        let resolver = PathResolver::new(dir.path(), None).unwrap();
        match resolver.resolve("/nope.mp4", None).await {
            Err(MediaError::NotFound(p)) => assert_eq!(p, "nope.mp4"),
            other => panic!("expected NotFound, got {other:?}"),
        }
        match resolver.resolve("/videos", None).await {
            Err(MediaError::NotAFile(p)) => assert_eq!(p, "videos"),
            other => panic!("expected NotAFile, got {other:?}"),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_symlink_escape_rejected() {
        let outside = tempfile::tempdir().unwrap();
        std::fs::write(outside.path().join("secret.txt"), b"secret").unwrap();

        let dir = media_dir();
        std::os::unix::fs::symlink(outside.path().join("secret.txt"), dir.path().join("link.txt"))
            .unwrap();
        std::os::unix::fs::symlink(dir.path().join("cover.jpg"), dir.path().join("alias.jpg"))
            .unwrap();

        let resolver = PathResolver::new(dir.path(), None).unwrap();
        assert!(matches!(
            resolver.resolve("/link.txt", None).await,
            Err(MediaError::OutsideBase)
        ));
        // Links that stay inside the base directory are fine
        let file = resolver.resolve("/alias.jpg", None).await.unwrap();
        assert!(file.path().ends_with("cover.jpg"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_sibling_with_shared_prefix_rejected() {
        let root = tempfile::tempdir().unwrap();
        std::fs::create_dir(root.path().join("media")).unwrap();
        std::fs::create_dir(root.path().join("media2")).unwrap();
        std::fs::write(root.path().join("media2/x.mp4"), b"x").unwrap();
        std::os::unix::fs::symlink(root.path().join("media2"), root.path().join("media/sub"))
            .unwrap();

        let resolver = PathResolver::new(root.path().join("media"), None).unwrap();
        assert!(matches!(
            resolver.resolve("/sub/x.mp4", None).await,
            Err(MediaError::OutsideBase)
        ));
    }

    #[test]
    fn test_base_dir_must_exist() {
        let dir = media_dir();
        assert!(PathResolver::new(dir.path().join("missing"), None).is_err());
        assert!(PathResolver::new(dir.path().join("cover.jpg"), None).is_err());
    }
}
