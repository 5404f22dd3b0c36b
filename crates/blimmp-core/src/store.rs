//! Durable per-user state: the uploaded node override and the threshold value.
//!
//! Both live as small JSON files under a state directory, each under a fixed name.

use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::sanitize::sanitize_non_finite_literals;
use crate::source::NodeSource;

pub const OVERRIDE_FILE: &str = "override-nodes.json";
pub const THRESHOLD_FILE: &str = "threshold.json";

#[derive(Debug, Clone)]
pub struct StateStore {
    dir: PathBuf,
}

impl StateStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn override_path(&self) -> PathBuf {
        self.dir.join(OVERRIDE_FILE)
    }

    pub fn threshold_path(&self) -> PathBuf {
        self.dir.join(THRESHOLD_FILE)
    }

    /// Sanitizes and parses an uploaded node source, then persists the sanitized text.
    ///
    /// A document that does not parse leaves any previously stored override in place.
    pub fn save_override(&self, raw: &str) -> Result<NodeSource> {
        let sanitized = sanitize_non_finite_literals(raw);
        let source = NodeSource::parse(&sanitized).map_err(|e| Error::MalformedOverride {
            message: e.to_string(),
        })?;
        self.write(&self.override_path(), &sanitized)?;
        tracing::debug!(modules = source.len(), "stored node override");
        Ok(source)
    }

    pub fn load_override(&self) -> Result<Option<NodeSource>> {
        let path = self.override_path();
        let Some(text) = self.read_optional(&path)? else {
            return Ok(None);
        };
        match NodeSource::parse(&text) {
            Ok(source) => Ok(Some(source)),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable stored override");
                Ok(None)
            }
        }
    }

    /// Removes the stored override. Returns whether one existed.
    pub fn clear_override(&self) -> Result<bool> {
        let path = self.override_path();
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(source) => Err(Error::StateWrite { path, source }),
        }
    }

    pub fn save_threshold(&self, value: f64) -> Result<()> {
        let text = serde_json::to_string(&value)?;
        self.write(&self.threshold_path(), &text)
    }

    pub fn load_threshold(&self) -> Result<Option<f64>> {
        let Some(text) = self.read_optional(&self.threshold_path())? else {
            return Ok(None);
        };
        Ok(serde_json::from_str::<Option<f64>>(&text)?)
    }

    fn write(&self, path: &Path, text: &str) -> Result<()> {
        std::fs::create_dir_all(&self.dir).map_err(|source| Error::StateWrite {
            path: self.dir.clone(),
            source,
        })?;
        std::fs::write(path, text).map_err(|source| Error::StateWrite {
            path: path.to_path_buf(),
            source,
        })
    }

    fn read_optional(&self, path: &Path) -> Result<Option<String>> {
        match std::fs::read_to_string(path) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(Error::SourceRead {
                path: path.to_path_buf(),
                source,
            }),
        }
    }
}
