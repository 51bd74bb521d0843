use crate::models::{SearchIndexEntry, Volume};
use crate::{LoadError, StoreError};
use async_trait::async_trait;

/// Where the ingested artifacts are read from at runtime.
#[async_trait]
pub trait ArtifactSource {
    async fn fetch_hierarchy(&self) -> Result<Vec<Volume>, LoadError>;

    async fn fetch_search_index(&self) -> Result<Vec<SearchIndexEntry>, LoadError>;
}

/// Local key/value persistence for reader state.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    fn remove(&self, key: &str) -> Result<(), StoreError>;
}
