use crate::models::{IngestionOptions, SearchIndexEntry, Volume};
use crate::traits::ArtifactSource;
use crate::LoadError;
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use url::Url;

/// Fetches the artifacts from a static host, e.g. `https://host/data/`.
pub struct HttpArtifactSource {
    client: Client,
    hierarchy_url: Url,
    search_index_url: Url,
}

impl HttpArtifactSource {
    pub fn new(base_url: &str) -> Result<Self, LoadError> {
        let mut base = Url::parse(base_url)?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        let options = IngestionOptions::default();
        Ok(Self {
            client: Client::new(),
            hierarchy_url: base.join(options.hierarchy_file)?,
            search_index_url: base.join(options.search_index_file)?,
        })
    }

    pub fn hierarchy_url(&self) -> &Url {
        &self.hierarchy_url
    }

    pub fn search_index_url(&self) -> &Url {
        &self.search_index_url
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &Url) -> Result<T, LoadError> {
        let response = self.client.get(url.clone()).send().await?;

        if !response.status().is_success() {
            return Err(LoadError::Status {
                artifact: url.to_string(),
                status: response.status().as_u16(),
            });
        }

        Ok(response.json::<T>().await?)
    }
}

#[async_trait]
impl ArtifactSource for HttpArtifactSource {
    async fn fetch_hierarchy(&self) -> Result<Vec<Volume>, LoadError> {
        self.get_json(&self.hierarchy_url).await
    }

    async fn fetch_search_index(&self) -> Result<Vec<SearchIndexEntry>, LoadError> {
        self.get_json(&self.search_index_url).await
    }
}
