use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use reqwest::Client;
use shared::{
    domain::{Draft, Record, RecordId},
    protocol::FirebaseCreateResponse,
};
use tracing::{debug, info};
use url::Url;

use crate::{
    adapter::{adapter_for, BackendShape, RecordAdapter},
    config::Settings,
    error::StoreError,
};

const COLLECTION_SEGMENT: &str = "movies";

/// Remote document store holding the movie collection.
#[async_trait]
pub trait MovieStore: Send + Sync {
    async fn list(&self) -> Result<Vec<Record>, StoreError>;
    async fn create(&self, draft: &Draft) -> Result<(), StoreError>;
    async fn delete(&self, id: &RecordId) -> Result<(), StoreError>;
}

pub struct HttpMovieStore {
    http: Client,
    base_url: Url,
    adapter: Arc<dyn RecordAdapter>,
}

impl HttpMovieStore {
    pub fn new(base_url: &str, shape: BackendShape) -> Result<Self, StoreError> {
        Self::with_client(Client::new(), base_url, adapter_for(shape))
    }

    pub fn from_settings(settings: &Settings) -> Result<Self, StoreError> {
        let http = build_http_client(settings.request_timeout())?;
        Self::with_client(http, &settings.base_url, adapter_for(settings.backend_shape))
    }

    pub fn with_client(
        http: Client,
        base_url: &str,
        adapter: Arc<dyn RecordAdapter>,
    ) -> Result<Self, StoreError> {
        let base_url = Url::parse(base_url.trim())?;
        if base_url.cannot_be_a_base() {
            return Err(StoreError::InvalidUrl(format!(
                "'{base_url}' cannot carry a path"
            )));
        }
        Ok(Self {
            http,
            base_url,
            adapter,
        })
    }

    pub fn collection_url(&self) -> Url {
        self.url_with_last_segment(&format!("{COLLECTION_SEGMENT}.json"), None)
    }

    pub fn item_url(&self, id: &RecordId) -> Url {
        self.url_with_last_segment(&format!("{id}.json"), Some(COLLECTION_SEGMENT))
    }

    fn url_with_last_segment(&self, last: &str, parent: Option<&str>) -> Url {
        let mut url = self.base_url.clone();
        // checked in `with_client`
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty();
            if let Some(parent) = parent {
                segments.push(parent);
            }
            segments.push(last);
        }
        url
    }
}

fn build_http_client(timeout: Duration) -> Result<Client, StoreError> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|err| StoreError::Transport(format!("failed to build http client: {err}")))
}

#[async_trait]
impl MovieStore for HttpMovieStore {
    async fn list(&self) -> Result<Vec<Record>, StoreError> {
        let url = self.collection_url();
        let body = self
            .http
            .get(url.clone())
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;
        let records = self.adapter.decode_collection(&body)?;
        debug!(url = %url, count = records.len(), "store: fetched collection");
        Ok(records)
    }

    async fn create(&self, draft: &Draft) -> Result<(), StoreError> {
        let body = self
            .http
            .post(self.collection_url())
            .json(draft)
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;
        match serde_json::from_slice::<FirebaseCreateResponse>(&body) {
            Ok(created) => info!(id = %created.name, title = %draft.title, "store: record created"),
            Err(_) => info!(title = %draft.title, "store: record created"),
        }
        Ok(())
    }

    async fn delete(&self, id: &RecordId) -> Result<(), StoreError> {
        self.http
            .delete(self.item_url(id))
            .send()
            .await?
            .error_for_status()?;
        info!(id = %id, "store: record deleted");
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/store_tests.rs"]
mod tests;
