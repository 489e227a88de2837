use crate::Result;
use camino::{Utf8Path, Utf8PathBuf};
use ohno::IntoAppError;
use std::fs;
use std::sync::OnceLock;

/// One leaf file from a run's artifact tree.
///
/// The content is read from disk on first access and cached for the
/// lifetime of the artifact.
#[derive(Debug)]
pub struct Artifact {
    name: String,
    path: Utf8PathBuf,
    content: OnceLock<Vec<u8>>,
}

impl Artifact {
    /// Create an artifact from its name relative to the artifact root and its
    /// location on disk.
    #[must_use]
    pub fn new(name: impl Into<String>, path: impl Into<Utf8PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            content: OnceLock::new(),
        }
    }

    /// Create an artifact whose content is already known.
    #[must_use]
    pub fn with_content(name: impl Into<String>, path: impl Into<Utf8PathBuf>, content: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            content: OnceLock::from(content),
        }
    }

    /// Path relative to the artifact root, with `/` separators.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    /// The artifact's bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read.
    pub fn content(&self) -> Result<&[u8]> {
        if let Some(content) = self.content.get() {
            return Ok(content);
        }

        let data = fs::read(&self.path).into_app_err_with(|| format!("reading artifact '{}'", self.path))?;
        Ok(self.content.get_or_init(|| data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_is_read_lazily() {
        let dir = tempfile::tempdir().unwrap();
        let path = Utf8PathBuf::from_path_buf(dir.path().join("out.txt")).unwrap();
        fs::write(&path, "first").unwrap();

        let artifact = Artifact::new("out.txt", path.clone());
        fs::write(&path, "second").unwrap();
        assert_eq!(artifact.content().unwrap(), b"second");

        // once read, the content does not change
        fs::write(&path, "third").unwrap();
        assert_eq!(artifact.content().unwrap(), b"second");
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let artifact = Artifact::new("gone.txt", "/nonexistent/benchfacts/gone.txt");
        let err = artifact.content().unwrap_err();
        assert!(err.to_string().contains("reading artifact"));
    }

    #[test]
    fn test_with_content() {
        let artifact = Artifact::with_content("nested/a.json", "/unused", b"{}".to_vec());
        assert_eq!(artifact.name(), "nested/a.json");
        assert_eq!(artifact.content().unwrap(), b"{}");
    }
}
