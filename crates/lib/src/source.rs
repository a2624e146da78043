//! Where raw documents come from.
//!
//! The loader only sees the [`DocumentSource`] trait, so a collection can
//! be backed by a directory, by text embedded in the binary, or by
//! anything else that can hand over `(id, text)` pairs.

use camino::{Utf8Path, Utf8PathBuf};
use tracing::debug;

use crate::fs;

/// A document as read, before parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawDocument {
    pub source_id: Utf8PathBuf,
    pub text: String,
}

impl RawDocument {
    pub fn new(source_id: impl Into<Utf8PathBuf>, text: impl Into<String>) -> Self {
        Self {
            source_id: source_id.into(),
            text: text.into(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("Failed to list documents in {dir}: {source}")]
    ListDir {
        dir: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to read document {path}: {source}")]
    Read {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub trait DocumentSource: Send + Sync {
    /// Every document the source currently offers, in a stable order.
    fn read_documents(&self) -> Result<Vec<RawDocument>, SourceError>;

    /// Whether a change at `path` could alter what this source offers.
    fn contains(&self, _path: &Utf8Path) -> bool {
        false
    }

    /// A directory to watch for changes, if the source lives on disk.
    fn watch_root(&self) -> Option<&Utf8Path> {
        None
    }
}

/// The matching files directly inside one directory.
#[derive(Debug, Clone)]
pub struct DirSource {
    dir: Utf8PathBuf,
    extensions: Vec<String>,
}

impl DirSource {
    pub fn new(dir: impl Into<Utf8PathBuf>, extensions: Vec<String>) -> Self {
        Self {
            dir: dir.into(),
            extensions,
        }
    }

    /// The canonical directory, so that two spellings of the same
    /// directory produce the same source ids.
    fn resolved_dir(&self) -> Utf8PathBuf {
        self.dir
            .canonicalize_utf8()
            .unwrap_or_else(|_| self.dir.clone())
    }
}

impl DocumentSource for DirSource {
    fn read_documents(&self) -> Result<Vec<RawDocument>, SourceError> {
        let dir = self.resolved_dir();
        let paths = fs::files_with_extensions(&dir, &self.extensions).map_err(|source| {
            SourceError::ListDir {
                dir: dir.clone(),
                source,
            }
        })?;
        debug!("Reading {} documents from {dir}", paths.len());
        paths
            .into_iter()
            .map(|path| match std::fs::read_to_string(&path) {
                Ok(text) => Ok(RawDocument {
                    source_id: path,
                    text,
                }),
                Err(source) => Err(SourceError::Read { path, source }),
            })
            .collect()
    }

    fn contains(&self, path: &Utf8Path) -> bool {
        if !fs::path_has_extensions(path, &self.extensions) {
            return false;
        }
        path.parent().is_some_and(|parent| {
            parent == self.dir.as_path() || parent == self.resolved_dir().as_path()
        })
    }

    fn watch_root(&self) -> Option<&Utf8Path> {
        Some(&self.dir)
    }
}

/// Documents held in memory, e.g. embedded with `include_str!`.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    documents: Vec<RawDocument>,
}

impl MemorySource {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, source_id: impl Into<Utf8PathBuf>, text: impl Into<String>) -> Self {
        self.documents.push(RawDocument::new(source_id, text));
        self
    }
}

impl<I: Into<Utf8PathBuf>, T: Into<String>> FromIterator<(I, T)> for MemorySource {
    fn from_iter<It: IntoIterator<Item = (I, T)>>(iter: It) -> Self {
        Self {
            documents: iter
                .into_iter()
                .map(|(id, text)| RawDocument::new(id, text))
                .collect(),
        }
    }
}

impl DocumentSource for MemorySource {
    fn read_documents(&self) -> Result<Vec<RawDocument>, SourceError> {
        Ok(self.documents.clone())
    }
}
