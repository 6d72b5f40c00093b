//! Filesystem registry.
//!
//! Layout under the root directory:
//! ```text
//! <root>/<name>/index.json
//! <root>/<name>/v0/<file>
//! <root>/<name>/v1/<file>
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use log::debug;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::{
    validate_name, Alias, ArtifactRef, ArtifactRegistry, ArtifactSpec, ArtifactVersion,
    RegistryError,
};

const INDEX_FILE: &str = "index.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
struct VersionEntry {
    version: u32,
    digest: String,
    file: String,
    description: String,
    #[serde(default)]
    metadata: BTreeMap<String, serde_json::Value>,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ArtifactIndex {
    name: String,
    #[serde(rename = "type")]
    artifact_type: String,
    #[serde(default)]
    versions: Vec<VersionEntry>,
}

pub struct LocalRegistry {
    root: PathBuf,
}

impl LocalRegistry {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn artifact_dir(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    fn index_path(&self, name: &str) -> PathBuf {
        self.artifact_dir(name).join(INDEX_FILE)
    }

    fn load_index(&self, name: &str) -> Result<Option<ArtifactIndex>, RegistryError> {
        let path = self.index_path(name);
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&path)?;
        serde_json::from_str(&content)
            .map(Some)
            .map_err(|e| RegistryError::Corrupted {
                path,
                message: e.to_string(),
            })
    }

    fn save_index(&self, index: &ArtifactIndex) -> Result<(), RegistryError> {
        let path = self.index_path(&index.name);
        let content =
            serde_json::to_string_pretty(index).map_err(|e| RegistryError::Corrupted {
                path: path.clone(),
                message: e.to_string(),
            })?;
        // Replace atomically.
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, content)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    /// All stored version numbers of `name`, oldest first.
    pub fn versions(&self, name: &str) -> Result<Vec<u32>, RegistryError> {
        validate_name(name)?;
        Ok(self
            .load_index(name)?
            .map(|idx| idx.versions.iter().map(|v| v.version).collect())
            .unwrap_or_default())
    }

    /// Description and metadata recorded for a stored version.
    pub fn spec_of(&self, reference: &str) -> Result<ArtifactSpec, RegistryError> {
        let (index, entry) = self.lookup(reference)?;
        Ok(ArtifactSpec {
            name: index.name,
            artifact_type: index.artifact_type,
            description: entry.description,
            metadata: entry.metadata,
        })
    }

    fn lookup(&self, reference: &str) -> Result<(ArtifactIndex, VersionEntry), RegistryError> {
        let parsed = ArtifactRef::parse(reference)?;
        let index = self
            .load_index(&parsed.name)?
            .ok_or_else(|| RegistryError::NotFound(reference.to_string()))?;
        let entry = match parsed.alias {
            Alias::Latest => index.versions.last(),
            Alias::Version(n) => index.versions.iter().find(|v| v.version == n),
        }
        .cloned()
        .ok_or_else(|| RegistryError::NotFound(reference.to_string()))?;
        Ok((index, entry))
    }
}

impl ArtifactRegistry for LocalRegistry {
    fn resolve(&self, reference: &str) -> Result<PathBuf, RegistryError> {
        let (index, entry) = self.lookup(reference)?;
        let path = self
            .artifact_dir(&index.name)
            .join(format!("v{}", entry.version))
            .join(&entry.file);
        if !path.is_file() {
            return Err(RegistryError::Corrupted {
                path,
                message: "indexed file is missing".to_string(),
            });
        }
        debug!("resolved {reference} to {}", path.display());
        Ok(path)
    }

    fn publish(
        &self,
        local_path: &Path,
        spec: &ArtifactSpec,
    ) -> Result<ArtifactVersion, RegistryError> {
        validate_name(&spec.name)?;
        let file = local_path
            .file_name()
            .and_then(|f| f.to_str())
            .ok_or_else(|| RegistryError::InvalidName(local_path.display().to_string()))?
            .to_string();

        let bytes = fs::read(local_path)?;
        let digest = hex::encode(Sha256::digest(&bytes));

        let mut index = match self.load_index(&spec.name)? {
            Some(idx) if idx.artifact_type != spec.artifact_type => {
                return Err(RegistryError::TypeMismatch {
                    name: spec.name.clone(),
                    existing: idx.artifact_type,
                    requested: spec.artifact_type.clone(),
                });
            }
            Some(idx) => idx,
            None => ArtifactIndex {
                name: spec.name.clone(),
                artifact_type: spec.artifact_type.clone(),
                versions: Vec::new(),
            },
        };

        if let Some(latest) = index.versions.last() {
            if latest.digest == digest {
                debug!("{} unchanged, reusing v{}", spec.name, latest.version);
                return Ok(ArtifactVersion {
                    name: spec.name.clone(),
                    version: latest.version,
                    digest,
                });
            }
        }

        let version = index
            .versions
            .last()
            .map(|v| v.version + 1)
            .unwrap_or(0);
        let dir = self.artifact_dir(&spec.name).join(format!("v{version}"));
        fs::create_dir_all(&dir)?;
        fs::write(dir.join(&file), &bytes)?;

        index.versions.push(VersionEntry {
            version,
            digest: digest.clone(),
            file,
            description: spec.description.clone(),
            metadata: spec.metadata.clone(),
            created_at: Utc::now(),
        });
        self.save_index(&index)?;

        Ok(ArtifactVersion {
            name: spec.name.clone(),
            version,
            digest,
        })
    }
}
