use async_trait::async_trait;
use orgview_model::{Collection, ModelError, SnapshotSource};
use serde_json::Value;
use std::io::ErrorKind;
use std::path::PathBuf;

/// Reads one `<collection>.json` file per collection from a directory.
/// A missing file is an empty collection.
pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl SnapshotSource for DirectorySource {
    async fn fetch(&self, collection: Collection) -> orgview_model::Result<Value> {
        let path = self.root.join(collection.file_name());
        let raw = match tokio::fs::read_to_string(&path).await {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                log::debug!("{} not found; treating {collection} as empty", path.display());
                return Ok(Value::Array(Vec::new()));
            }
            Err(err) => {
                return Err(ModelError::fetch(
                    collection,
                    format!("{}: {err}", path.display()),
                ))
            }
        };

        serde_json::from_str(&raw).map_err(|source| ModelError::InvalidJson { collection, source })
    }
}
