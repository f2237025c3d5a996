use async_trait::async_trait;
use reqwest::{header, IntoUrl, Method, RequestBuilder};
use serde::Serialize;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, warn};

use crate::normalize::{normalize_page, normalize_results};
use crate::store::{now_iso, require_id, require_id_and_text, require_text, segment_url};
use crate::{Archived, Phrase, PhraseStore, PhrasesConfig, StoreError};

fn user_agent() -> String {
    format!("phrases/{}", env!("CARGO_PKG_VERSION"))
}

/// Client builder with the shared defaults. No whole-request timeout unless
/// the config asks for one.
pub fn client_builder(config: &PhrasesConfig) -> reqwest::ClientBuilder {
    let mut builder = reqwest::Client::builder()
        .user_agent(user_agent())
        .connect_timeout(config.connect_timeout)
        .tcp_keepalive(Duration::from_secs(60))
        .pool_idle_timeout(Duration::from_secs(90));
    if let Some(timeout) = config.request_timeout {
        builder = builder.timeout(timeout);
    }
    builder
}

/// A database property as reported by the service.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Column {
    pub name: String,
    pub kind: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnSource {
    Database,
    SampleItem,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Inspection {
    pub source: ColumnSource,
    pub columns: Vec<Column>,
}

fn columns_of(properties: Option<&Value>) -> Vec<Column> {
    properties
        .and_then(Value::as_object)
        .map(|map| {
            map.iter()
                .map(|(name, prop)| Column {
                    name: name.clone(),
                    kind: prop
                        .get("type")
                        .and_then(Value::as_str)
                        .unwrap_or("unknown")
                        .to_string(),
                })
                .collect()
        })
        .unwrap_or_default()
}

/// Remote store backed by a Notion database.
#[derive(Clone)]
pub struct NotionStore {
    client: reqwest::Client,
    config: PhrasesConfig,
}

impl NotionStore {
    pub fn new(config: PhrasesConfig) -> Result<Self, StoreError> {
        let client = client_builder(&config)
            .build()
            .map_err(|e| StoreError::Transport(format!("http client: {e}")))?;
        Ok(Self { client, config })
    }

    pub fn with_client(config: PhrasesConfig, client: reqwest::Client) -> Self {
        Self { client, config }
    }

    pub fn config(&self) -> &PhrasesConfig {
        &self.config
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url, path)
    }

    fn page_url(&self, id: &str) -> Result<reqwest::Url, StoreError> {
        segment_url(&self.config.base_url, &["pages", id])
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.request_to(method, self.url(path))
    }

    fn request_to<U: IntoUrl>(&self, method: Method, url: U) -> RequestBuilder {
        self.client
            .request(method, url)
            .bearer_auth(&self.config.secret)
            .header("Notion-Version", &self.config.notion_version)
            .header(header::CONTENT_TYPE, "application/json")
    }

    async fn send(&self, op: &'static str, req: RequestBuilder) -> Result<Value, StoreError> {
        let response = req.send().await.map_err(|err| {
            warn!(target: "phrases::store", op, error = %err, "notion request failed");
            StoreError::from(err)
        })?;
        let status = response.status();
        let bytes = response.bytes().await.map_err(StoreError::from)?;
        if !status.is_success() {
            let message = serde_json::from_slice::<Value>(&bytes)
                .ok()
                .and_then(|body| {
                    body.get("message")
                        .and_then(Value::as_str)
                        .map(str::to_string)
                })
                .unwrap_or_else(|| String::from_utf8_lossy(&bytes).into_owned());
            warn!(
                target: "phrases::store",
                op,
                status = status.as_u16(),
                %message,
                "notion rejected request"
            );
            return Err(StoreError::Upstream {
                status: status.as_u16(),
                message,
            });
        }
        debug!(target: "phrases::store", op, status = status.as_u16(), "notion request ok");
        serde_json::from_slice(&bytes)
            .map_err(|e| StoreError::malformed(format!("invalid json from notion: {e}")))
    }

    fn title_property(&self, text: &str) -> Value {
        json!({ "title": [ { "text": { "content": text } } ] })
    }

    /// Properties of the database itself.
    pub async fn retrieve_columns(&self) -> Result<Vec<Column>, StoreError> {
        let path = format!("/databases/{}", self.config.database_id);
        let body = self
            .send("retrieve_database", self.request(Method::GET, &path))
            .await?;
        Ok(columns_of(body.get("properties")))
    }

    /// Properties of the first item in the database, if there is one.
    pub async fn sample_columns(&self) -> Result<Vec<Column>, StoreError> {
        let path = format!("/databases/{}/query", self.config.database_id);
        let body = self
            .send(
                "sample_item",
                self.request(Method::POST, &path)
                    .json(&json!({ "page_size": 1 })),
            )
            .await?;
        let first = body
            .get("results")
            .and_then(Value::as_array)
            .and_then(|items| items.first());
        Ok(columns_of(first.and_then(|item| item.get("properties"))))
    }

    /// Discover column names, preferring the database schema and falling
    /// back to a sample item when the schema is not readable.
    pub async fn inspect(&self) -> Result<Inspection, StoreError> {
        match self.retrieve_columns().await {
            Ok(columns) if !columns.is_empty() => {
                return Ok(Inspection {
                    source: ColumnSource::Database,
                    columns,
                })
            }
            Ok(_) => debug!(target: "phrases::store", "database schema had no properties"),
            Err(StoreError::Transport(msg)) => return Err(StoreError::Transport(msg)),
            Err(err) => debug!(target: "phrases::store", error = %err, "retrieve database failed"),
        }
        Ok(Inspection {
            source: ColumnSource::SampleItem,
            columns: self.sample_columns().await?,
        })
    }
}

#[async_trait]
impl PhraseStore for NotionStore {
    async fn list(&self) -> Result<Vec<Phrase>, StoreError> {
        let path = format!("/databases/{}/query", self.config.database_id);
        let query = json!({
            "sorts": [
                { "property": self.config.fields.date, "direction": "descending" }
            ]
        });
        let body = self
            .send("list", self.request(Method::POST, &path).json(&query))
            .await?;
        normalize_results(&body, &self.config.fields)
    }

    async fn create(&self, text: &str) -> Result<Phrase, StoreError> {
        require_text(text)?;
        let mut properties = serde_json::Map::new();
        properties.insert(self.config.fields.title.clone(), self.title_property(text));
        properties.insert(
            self.config.fields.date.clone(),
            json!({ "date": { "start": now_iso() } }),
        );
        let payload = json!({
            "parent": { "database_id": self.config.database_id },
            "properties": properties,
        });
        let body = self
            .send("create", self.request(Method::POST, "/pages").json(&payload))
            .await?;
        normalize_page(&body, &self.config.fields)
    }

    async fn update(&self, id: &str, text: &str) -> Result<Phrase, StoreError> {
        require_id_and_text(id, text)?;
        let mut properties = serde_json::Map::new();
        properties.insert(self.config.fields.title.clone(), self.title_property(text));
        let payload = json!({ "properties": properties });
        let url = self.page_url(id)?;
        let body = self
            .send(
                "update",
                self.request_to(Method::PATCH, url).json(&payload),
            )
            .await?;
        normalize_page(&body, &self.config.fields)
    }

    async fn archive(&self, id: &str) -> Result<Archived, StoreError> {
        require_id(id)?;
        let url = self.page_url(id)?;
        let body = self
            .send(
                "archive",
                self.request_to(Method::PATCH, url)
                    .json(&json!({ "archived": true })),
            )
            .await?;
        let echoed = body.get("id").and_then(Value::as_str).unwrap_or(id);
        Ok(Archived::new(echoed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn columns_default_unknown_type() {
        let props = json!({
            "Frase ": {"type": "title"},
            "fecha": {"type": "date"},
            "odd": {}
        });
        let cols = columns_of(Some(&props));
        assert_eq!(cols.len(), 3);
        assert!(cols.contains(&Column {
            name: "Frase ".into(),
            kind: "title".into()
        }));
        assert!(cols.contains(&Column {
            name: "odd".into(),
            kind: "unknown".into()
        }));
    }

    #[test]
    fn columns_of_missing_properties_is_empty() {
        assert!(columns_of(None).is_empty());
        assert!(columns_of(Some(&json!("nope"))).is_empty());
    }

    #[tokio::test]
    async fn validation_happens_before_any_request() {
        let cfg = PhrasesConfig {
            base_url: "http://127.0.0.1:9".into(),
            ..PhrasesConfig::default()
        };
        let store = NotionStore::new(cfg).expect("store");
        assert!(store.create("  ").await.unwrap_err().is_validation());
        assert!(store.update("", "x").await.unwrap_err().is_validation());
        assert!(store.archive("").await.unwrap_err().is_validation());
    }
}
