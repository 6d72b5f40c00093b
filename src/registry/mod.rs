//! Artifact registry: the two operations the cleaner needs from the
//! outside world, plus a filesystem-backed implementation.

pub mod local;

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use local::LocalRegistry;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("artifact '{0}' not found")]
    NotFound(String),

    #[error("invalid artifact reference '{reference}': {reason}")]
    InvalidReference { reference: String, reason: String },

    #[error("invalid artifact name '{0}'")]
    InvalidName(String),

    #[error("artifact '{name}' has type '{existing}', cannot publish as '{requested}'")]
    TypeMismatch {
        name: String,
        existing: String,
        requested: String,
    },

    #[error("registry index {} is corrupted: {message}", .path.display())]
    Corrupted { path: PathBuf, message: String },

    #[error("registry I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Resolve artifacts to local files and publish new ones.
pub trait ArtifactRegistry {
    /// Materialise `reference` as a readable local file.
    fn resolve(&self, reference: &str) -> Result<PathBuf, RegistryError>;

    /// Store the file at `local_path` as a new version of `spec.name`.
    fn publish(&self, local_path: &Path, spec: &ArtifactSpec)
        -> Result<ArtifactVersion, RegistryError>;
}

impl<R: ArtifactRegistry + ?Sized> ArtifactRegistry for &R {
    fn resolve(&self, reference: &str) -> Result<PathBuf, RegistryError> {
        (**self).resolve(reference)
    }

    fn publish(
        &self,
        local_path: &Path,
        spec: &ArtifactSpec,
    ) -> Result<ArtifactVersion, RegistryError> {
        (**self).publish(local_path, spec)
    }
}

/// Name, type and description attached to a published artifact, plus
/// free-form run metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactSpec {
    pub name: String,
    #[serde(rename = "type")]
    pub artifact_type: String,
    pub description: String,
    #[serde(default)]
    pub metadata: BTreeMap<String, serde_json::Value>,
}

impl ArtifactSpec {
    pub fn new(
        name: impl Into<String>,
        artifact_type: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        ArtifactSpec {
            name: name.into(),
            artifact_type: artifact_type.into(),
            description: description.into(),
            metadata: BTreeMap::new(),
        }
    }

    pub fn with_metadata(mut self, key: &str, value: impl Into<serde_json::Value>) -> Self {
        self.metadata.insert(key.to_string(), value.into());
        self
    }
}

/// A stored version as reported back by `publish`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactVersion {
    pub name: String,
    pub version: u32,
    pub digest: String,
}

impl fmt::Display for ArtifactVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:v{}", self.name, self.version)
    }
}

// ---------------------------------------------------------------------------
// References: `name`, `name:latest`, `name:v3`
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alias {
    Latest,
    Version(u32),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactRef {
    pub name: String,
    pub alias: Alias,
}

impl ArtifactRef {
    pub fn parse(reference: &str) -> Result<Self, RegistryError> {
        let invalid = |reason: &str| RegistryError::InvalidReference {
            reference: reference.to_string(),
            reason: reason.to_string(),
        };

        let (name, alias) = match reference.rsplit_once(':') {
            Some((name, "latest")) => (name, Alias::Latest),
            Some((name, tag)) => {
                let number = tag
                    .strip_prefix('v')
                    .and_then(|n| n.parse::<u32>().ok())
                    .ok_or_else(|| invalid("alias must be 'latest' or 'v<N>'"))?;
                (name, Alias::Version(number))
            }
            None => (reference, Alias::Latest),
        };

        validate_name(name).map_err(|_| invalid("bad artifact name"))?;
        Ok(ArtifactRef {
            name: name.to_string(),
            alias,
        })
    }
}

/// Names become directory names, so no separators and no dot entries.
pub fn validate_name(name: &str) -> Result<(), RegistryError> {
    let bad = name.trim().is_empty()
        || name == "."
        || name == ".."
        || name.contains(['/', '\\'])
        || name.contains('\0');
    if bad {
        Err(RegistryError::InvalidName(name.to_string()))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_aliases() {
        let r = ArtifactRef::parse("sample.csv").unwrap();
        assert_eq!(r.name, "sample.csv");
        assert_eq!(r.alias, Alias::Latest);

        let r = ArtifactRef::parse("sample.csv:latest").unwrap();
        assert_eq!(r.alias, Alias::Latest);

        let r = ArtifactRef::parse("sample.csv:v12").unwrap();
        assert_eq!(r.alias, Alias::Version(12));
    }

    #[test]
    fn rejects_bad_references() {
        assert!(matches!(
            ArtifactRef::parse("sample.csv:newest"),
            Err(RegistryError::InvalidReference { .. })
        ));
        assert!(ArtifactRef::parse(":v1").is_err());
        assert!(ArtifactRef::parse("").is_err());
        assert!(ArtifactRef::parse("../etc:latest").is_err());
    }

    #[test]
    fn version_display() {
        let v = ArtifactVersion {
            name: "clean_sample.csv".into(),
            version: 3,
            digest: "ab".into(),
        };
        assert_eq!(v.to_string(), "clean_sample.csv:v3");
    }
}
