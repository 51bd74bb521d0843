use crate::models::{IngestionOptions, SearchIndexEntry, Volume};
use crate::traits::ArtifactSource;
use crate::LoadError;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};

/// Reads the artifacts written by ingestion from a local directory.
pub struct FileArtifactSource {
    hierarchy_path: PathBuf,
    search_index_path: PathBuf,
}

impl FileArtifactSource {
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        let options = IngestionOptions::default();
        let data_dir = data_dir.as_ref();
        Self {
            hierarchy_path: data_dir.join(options.hierarchy_file),
            search_index_path: data_dir.join(options.search_index_file),
        }
    }
}

async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, LoadError> {
    let bytes = tokio::fs::read(path).await?;
    Ok(serde_json::from_slice(&bytes)?)
}

#[async_trait]
impl ArtifactSource for FileArtifactSource {
    async fn fetch_hierarchy(&self) -> Result<Vec<Volume>, LoadError> {
        read_json(&self.hierarchy_path).await
    }

    async fn fetch_search_index(&self) -> Result<Vec<SearchIndexEntry>, LoadError> {
        read_json(&self.search_index_path).await
    }
}
