//! Where license text comes from.

use crate::error::{LicenseError, LicenseResult};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Supplies raw license text and, for hashed licenses, its published digest.
pub trait LicenseSource {
    /// Reads the license text.
    fn read_license(&self) -> LicenseResult<String>;

    /// Reads the hex SHA-256 digest published with the license, if any.
    fn read_digest(&self) -> LicenseResult<Option<String>> {
        Ok(None)
    }
}

/// License stored in a file. The digest, when present, sits next to it with
/// a `.sha256` extension appended (`app.lic` → `app.lic.sha256`).
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn digest_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(".sha256");
        PathBuf::from(name)
    }
}

impl LicenseSource for FileSource {
    fn read_license(&self) -> LicenseResult<String> {
        match fs::read_to_string(&self.path) {
            Ok(text) => Ok(text),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Err(LicenseError::InvalidArgument(
                format!("license file not found: {}", self.path.display()),
            )),
            Err(e) => Err(e.into()),
        }
    }

    fn read_digest(&self) -> LicenseResult<Option<String>> {
        match fs::read_to_string(self.digest_path()) {
            Ok(text) => Ok(Some(text.trim().to_string())),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

/// License held in memory.
#[derive(Debug, Clone, Default)]
pub struct TextSource {
    text: String,
    digest: Option<String>,
}

impl TextSource {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            digest: None,
        }
    }

    #[must_use]
    pub fn with_digest(mut self, digest: impl Into<String>) -> Self {
        self.digest = Some(digest.into());
        self
    }
}

impl LicenseSource for TextSource {
    fn read_license(&self) -> LicenseResult<String> {
        Ok(self.text.clone())
    }

    fn read_digest(&self) -> LicenseResult<Option<String>> {
        Ok(self.digest.clone())
    }
}
