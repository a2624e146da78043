//! The `bulletin.yaml` file: which collections exist and where their
//! documents live.

use std::collections::BTreeMap;

use camino::{Utf8Path, Utf8PathBuf};
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::coerce::{Coercer, DEFAULT_CATEGORY};
use crate::list::SortBy;
use crate::source::{DirSource, DocumentSource};

pub const DEFAULT_CONFIG_FILE: &str = "bulletin.yaml";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config ({path}): {source}")]
    Read {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid config ({path}): {source}")]
    Parse {
        path: Utf8PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub collections: BTreeMap<String, CollectionConfig>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CollectionConfig {
    /// Earlier directories win slug collisions.
    pub sources: Vec<Utf8PathBuf>,
    #[serde(default)]
    pub sort: SortBy,
    #[serde(default = "default_category")]
    pub default_category: String,
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
}

fn default_category() -> String {
    DEFAULT_CATEGORY.to_owned()
}

fn default_extensions() -> Vec<String> {
    vec!["md".to_owned()]
}

impl Config {
    /// Relative source paths are taken relative to the config file.
    pub fn from_path(path: &Utf8Path) -> Result<Self, ConfigError> {
        let read_err = |source: std::io::Error| ConfigError::Read {
            path: path.to_owned(),
            source,
        };
        let yaml = std::fs::read_to_string(path).map_err(read_err)?;
        let root = path
            .canonicalize_utf8()
            .map_err(read_err)?
            .parent()
            .map(ToOwned::to_owned)
            .unwrap_or_default();
        Self::from_yaml(&yaml, &root).map_err(|source| ConfigError::Parse {
            path: path.to_owned(),
            source,
        })
    }

    pub fn from_yaml(yaml: &str, root: &Utf8Path) -> Result<Self, serde_yaml::Error> {
        let mut config: Config = serde_yaml::from_str(yaml)?;
        for collection in config.collections.values_mut() {
            for dir in &mut collection.sources {
                if dir.is_relative() {
                    *dir = root.join(&*dir);
                }
            }
        }
        Ok(config)
    }
}

impl CollectionConfig {
    #[must_use]
    pub fn document_sources(&self) -> Vec<Box<dyn DocumentSource>> {
        self.sources
            .iter()
            .map(|dir| {
                Box::new(DirSource::new(dir.clone(), self.extensions.clone()))
                    as Box<dyn DocumentSource>
            })
            .collect()
    }

    #[must_use]
    pub fn coercer(&self, now: DateTime<Utc>) -> Coercer {
        Coercer::new(now).with_default_category(self.default_category.clone())
    }
}
