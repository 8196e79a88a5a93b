use serde_json::Value;
use std::collections::hash_map::DefaultHasher;
use std::fs;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};
use thiserror::Error;

use super::{PolicyError, PolicyStore};

/// Errors that can occur while loading policy files from disk.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Policy(#[from] PolicyError),
}

/// Load a policy store from a single YAML file.
pub fn load_policy_file(path: impl AsRef<Path>) -> Result<PolicyStore, LoadError> {
    let content = fs::read_to_string(path)?;
    let source: Value = serde_yaml::from_str(&content)?;
    Ok(PolicyStore::load(&source)?)
}

/// Load and merge several policy files, argument order preserved.
///
/// All-or-nothing: any unreadable or malformed file fails the whole load.
pub fn load_policy_files<I, P>(paths: I) -> Result<PolicyStore, LoadError>
where
    I: IntoIterator<Item = P>,
    P: AsRef<Path>,
{
    let mut sources = Vec::new();
    for path in paths {
        let content = fs::read_to_string(path)?;
        sources.push(serde_yaml::from_str::<Value>(&content)?);
    }
    Ok(PolicyStore::merge_sources(&sources)?)
}

/// Loader bound to a fixed set of policy files, used by the hot-reload
/// watcher.
#[derive(Debug, Clone)]
pub struct PolicyLoader {
    paths: Vec<PathBuf>,
}

impl PolicyLoader {
    pub fn new<I, P>(paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        PolicyLoader {
            paths: paths.into_iter().map(Into::into).collect(),
        }
    }

    /// Load and merge all configured files into a fresh store.
    pub fn load(&self) -> Result<PolicyStore, LoadError> {
        load_policy_files(&self.paths)
    }

    /// Fingerprint of the raw file contents, for change detection.
    pub fn fingerprint(&self) -> Result<u64, LoadError> {
        let mut hasher = DefaultHasher::new();
        for path in &self.paths {
            fs::read(path)?.hash(&mut hasher);
        }
        Ok(hasher.finish())
    }

    /// The configured file paths.
    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }
}
