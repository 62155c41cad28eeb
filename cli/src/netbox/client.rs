//! HTTP client for the NetBox REST API.

use super::models::{ManufacturerRecord, Page, TagRecord};
use crate::config::{Config, ConfigError};
use crate::error::Result;
use async_trait::async_trait;
use dcim_sync_engine::{
    remote::RemoteResult, Changes, ExistingRecord, ManufacturerApi, Payload, RecordId,
    RemoteError, TagApi, TagRef,
};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

const MANUFACTURERS: &str = "dcim/manufacturers/";
const TAGS: &str = "extras/tags/";

/// NetBox collaborator for the reconciliation engine.
pub struct NetBoxClient {
    http: Client,
    base: String,
}

impl NetBoxClient {
    /// Create a client with token authentication.
    pub fn new(config: &Config) -> Result<Self> {
        let mut auth = HeaderValue::from_str(&format!("Token {}", config.token))
            .map_err(|_| ConfigError::InvalidToken)?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .danger_accept_invalid_certs(!config.verify_tls)
            .build()?;

        Ok(Self {
            http,
            base: config.netbox_url.as_str().trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/api/{}", self.base, path)
    }

    fn manufacturer(&self, id: RecordId) -> String {
        self.endpoint(&format!("{MANUFACTURERS}{id}/"))
    }

    /// Fetch every page of a filtered list.
    async fn list<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> RemoteResult<Vec<T>> {
        let mut page: Page<T> = self
            .send(self.http.get(self.endpoint(path)).query(query))
            .await?;
        let mut results = std::mem::take(&mut page.results);
        while let Some(next) = page.next.take() {
            page = self.send(self.http.get(&next)).await?;
            results.append(&mut page.results);
        }
        Ok(results)
    }

    /// First result of a filtered list.
    async fn first<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> RemoteResult<Option<T>> {
        let page: Page<T> = self
            .send(self.http.get(self.endpoint(path)).query(query))
            .await?;
        Ok(page.results.into_iter().next())
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> RemoteResult<T> {
        let response = check(dispatch(request).await?).await?;
        response
            .json()
            .await
            .map_err(|e| RemoteError::new(format!("invalid response body: {e}")))
    }
}

async fn dispatch(request: RequestBuilder) -> RemoteResult<Response> {
    let response = request
        .send()
        .await
        .map_err(|e| RemoteError::new(format!("request failed: {e}")))?;
    debug!(url = %response.url(), status = %response.status(), "netbox response");
    Ok(response)
}

/// Turn a non-success status into a [`RemoteError`] carrying the body.
async fn check(response: Response) -> RemoteResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let detail = serde_json::from_str(&body).unwrap_or(serde_json::Value::String(body));
    Err(RemoteError::new(status.to_string()).with_detail(detail))
}

#[async_trait]
impl ManufacturerApi for NetBoxClient {
    async fn get_by_id(&self, id: RecordId) -> RemoteResult<Option<ExistingRecord>> {
        let response = dispatch(self.http.get(self.manufacturer(id))).await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let record: ManufacturerRecord = check(response)
            .await?
            .json()
            .await
            .map_err(|e| RemoteError::new(format!("invalid response body: {e}")))?;
        Ok(Some(record.into()))
    }

    async fn get_by_slug(&self, slug: &str) -> RemoteResult<Option<ExistingRecord>> {
        let record: Option<ManufacturerRecord> =
            self.first(MANUFACTURERS, &[("slug", slug)]).await?;
        Ok(record.map(Into::into))
    }

    async fn filter_by_name(&self, name: &str) -> RemoteResult<Vec<ExistingRecord>> {
        let records: Vec<ManufacturerRecord> = self.list(MANUFACTURERS, &[("name", name)]).await?;
        Ok(records.into_iter().map(Into::into).collect())
    }

    async fn create(&self, payload: &Payload) -> RemoteResult<ExistingRecord> {
        let record: ManufacturerRecord = self
            .send(self.http.post(self.endpoint(MANUFACTURERS)).json(payload))
            .await?;
        Ok(record.into())
    }

    async fn update(&self, id: RecordId, changes: &Changes) -> RemoteResult<bool> {
        check(dispatch(self.http.patch(self.manufacturer(id)).json(changes)).await?).await?;
        Ok(true)
    }

    async fn delete(&self, id: RecordId) -> RemoteResult<()> {
        check(dispatch(self.http.delete(self.manufacturer(id))).await?).await?;
        Ok(())
    }
}

#[async_trait]
impl TagApi for NetBoxClient {
    async fn find_tag_by_slug(&self, slug: &str) -> RemoteResult<Option<TagRef>> {
        let tag: Option<TagRecord> = self.first(TAGS, &[("slug", slug)]).await?;
        Ok(tag.map(Into::into))
    }

    async fn find_tag_by_name(&self, name: &str) -> RemoteResult<Option<TagRef>> {
        let tag: Option<TagRecord> = self.first(TAGS, &[("name", name)]).await?;
        Ok(tag.map(Into::into))
    }
}
