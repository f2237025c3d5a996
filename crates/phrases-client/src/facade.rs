use async_trait::async_trait;
use phrases_core::store::{require_id, require_id_and_text, require_text, segment_url};
use phrases_core::{Archived, Phrase, PhraseStore, StoreError};
use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, warn};

/// [`PhraseStore`] that talks to a running facade instead of the
/// external service.
pub struct FacadeStore {
    client: reqwest::Client,
    base: String,
}

impl FacadeStore {
    /// `base` is the collection URL, e.g. `http://localhost:3001/api/phrases`.
    pub fn new(base: impl Into<String>) -> Result<Self, StoreError> {
        let client = reqwest::Client::builder()
            .user_agent(format!("phrases-client/{}", env!("CARGO_PKG_VERSION")))
            .connect_timeout(Duration::from_secs(3))
            .pool_idle_timeout(Duration::from_secs(90))
            .build()
            .map_err(|e| StoreError::Transport(format!("http client: {e}")))?;
        Ok(Self::with_client(base, client))
    }

    pub fn with_client(base: impl Into<String>, client: reqwest::Client) -> Self {
        let base = base.into().trim_end_matches('/').to_string();
        Self { client, base }
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    fn request(&self, method: Method, id: Option<&str>) -> Result<RequestBuilder, StoreError> {
        let url = segment_url(&self.base, id.as_slice())?;
        Ok(self.client.request(method, url))
    }

    async fn send<T: DeserializeOwned>(
        &self,
        op: &'static str,
        req: RequestBuilder,
    ) -> Result<T, StoreError> {
        let response = req.send().await.map_err(|err| {
            warn!(target: "phrases::client", op, error = %err, "facade request failed");
            StoreError::from(err)
        })?;
        let status = response.status();
        let bytes = response.bytes().await.map_err(StoreError::from)?;
        if !status.is_success() {
            let message = serde_json::from_slice::<Value>(&bytes)
                .ok()
                .and_then(|body| body.get("error").and_then(Value::as_str).map(str::to_string))
                .unwrap_or_else(|| String::from_utf8_lossy(&bytes).into_owned());
            if status.as_u16() == 400 {
                return Err(StoreError::Validation(message));
            }
            return Err(StoreError::Upstream {
                status: status.as_u16(),
                message,
            });
        }
        debug!(target: "phrases::client", op, status = status.as_u16(), "facade request ok");
        serde_json::from_slice(&bytes)
            .map_err(|e| StoreError::malformed(format!("invalid json from facade: {e}")))
    }
}

#[async_trait]
impl PhraseStore for FacadeStore {
    async fn list(&self) -> Result<Vec<Phrase>, StoreError> {
        self.send("list", self.request(Method::GET, None)?).await
    }

    async fn create(&self, text: &str) -> Result<Phrase, StoreError> {
        require_text(text)?;
        let req = self
            .request(Method::POST, None)?
            .json(&json!({ "text": text }));
        self.send("create", req).await
    }

    async fn update(&self, id: &str, text: &str) -> Result<Phrase, StoreError> {
        require_id_and_text(id, text)?;
        let req = self
            .request(Method::PATCH, Some(id))?
            .json(&json!({ "text": text }));
        self.send("update", req).await
    }

    async fn archive(&self, id: &str) -> Result<Archived, StoreError> {
        require_id(id)?;
        self.send("archive", self.request(Method::DELETE, Some(id))?)
            .await
    }
}
