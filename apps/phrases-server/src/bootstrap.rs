use std::sync::Arc;

use anyhow::Context;
use phrases_core::{MemoryStore, NotionStore, PhraseStore, PhrasesConfig};
use tracing::{info, warn};

use crate::{access_log, router::build_router, AppState};

#[derive(Debug, thiserror::Error)]
pub(crate) enum HttpConfigError {
    #[error("invalid PHRASES_HTTP_MAX_CONC: {0}")]
    InvalidConcurrency(String),
    #[error("invalid port: {0}")]
    InvalidPort(String),
    #[error("invalid PHRASES_BIND: {0}")]
    InvalidBind(String),
    #[error("unknown PHRASES_BACKEND: {0} (expected notion or memory)")]
    UnknownBackend(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Backend {
    Notion,
    Memory,
}

#[derive(Debug)]
pub(crate) struct HttpConfig {
    pub addr: std::net::SocketAddr,
    pub concurrency_limit: usize,
    pub backend: Backend,
}

pub(crate) fn http_config_from_lookup<F>(lookup: F) -> Result<HttpConfig, HttpConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let concurrency_limit = lookup("PHRASES_HTTP_MAX_CONC")
        .map(|raw| {
            raw.parse::<usize>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or(HttpConfigError::InvalidConcurrency(raw))
        })
        .transpose()?
        .unwrap_or(256);

    let bind = lookup("PHRASES_BIND").unwrap_or_else(|| "127.0.0.1".into());
    let port_raw = lookup("PHRASES_PORT")
        .or_else(|| lookup("PORT"))
        .unwrap_or_else(|| "3001".into());
    let port: u16 = port_raw
        .trim()
        .parse()
        .map_err(|_| HttpConfigError::InvalidPort(port_raw.clone()))?;

    let addr = format!("{}:{}", bind, port)
        .parse()
        .map_err(|_| HttpConfigError::InvalidBind(bind.clone()))?;

    let backend = match lookup("PHRASES_BACKEND")
        .map(|v| v.trim().to_ascii_lowercase())
        .as_deref()
    {
        None | Some("") | Some("notion") => Backend::Notion,
        Some("memory") => Backend::Memory,
        Some(other) => return Err(HttpConfigError::UnknownBackend(other.to_string())),
    };

    Ok(HttpConfig {
        addr,
        concurrency_limit,
        backend,
    })
}

pub(crate) fn http_config_from_env() -> Result<HttpConfig, HttpConfigError> {
    http_config_from_lookup(|key| std::env::var(key).ok())
}

pub(crate) fn build_store(backend: Backend) -> anyhow::Result<Arc<dyn PhraseStore>> {
    match backend {
        Backend::Notion => {
            let config = PhrasesConfig::from_env().context("loading notion config")?;
            info!(
                target: "phrases::server",
                base_url = %config.base_url,
                database_id = %config.database_id,
                title_field = ?config.fields.title,
                date_field = ?config.fields.date,
                "using notion backend"
            );
            let store = NotionStore::new(config).context("building notion client")?;
            Ok(Arc::new(store))
        }
        Backend::Memory => {
            warn!(target: "phrases::server", "using in-memory backend; nothing is persisted");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}

pub(crate) fn build_app(state: AppState, concurrency_limit: usize) -> axum::Router<()> {
    attach_global_layers(attach_http_layers(
        build_router().with_state(state),
        concurrency_limit,
    ))
}

pub(crate) fn attach_http_layers(
    router: axum::Router<()>,
    concurrency_limit: usize,
) -> axum::Router<()> {
    use tower::limit::ConcurrencyLimitLayer;
    use tower_http::trace::TraceLayer;

    router
        .layer(TraceLayer::new_for_http())
        .layer(ConcurrencyLimitLayer::new(concurrency_limit))
}

pub(crate) fn attach_global_layers(router: axum::Router<()>) -> axum::Router<()> {
    router.layer(axum::middleware::from_fn(access_log::access_log_mw))
}
