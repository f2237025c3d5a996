use std::{net::SocketAddr, sync::Arc};

use phrases_core::PhraseStore;
use tracing::{error, info};

mod access_log;
mod api;
mod bootstrap;
mod router;

#[derive(Clone)]
pub(crate) struct AppState {
    store: Arc<dyn PhraseStore>,
}

impl AppState {
    pub(crate) fn new(store: Arc<dyn PhraseStore>) -> Self {
        Self { store }
    }

    pub(crate) fn store(&self) -> &dyn PhraseStore {
        self.store.as_ref()
    }
}

#[tokio::main]
async fn main() {
    phrases_otel::init();

    let http_cfg = match bootstrap::http_config_from_env() {
        Ok(cfg) => cfg,
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(2);
        }
    };

    let store = match bootstrap::build_store(http_cfg.backend) {
        Ok(store) => store,
        Err(err) => {
            eprintln!("error: {err:#}");
            std::process::exit(2);
        }
    };

    let app = bootstrap::build_app(AppState::new(store), http_cfg.concurrency_limit);

    let listener = match tokio::net::TcpListener::bind(http_cfg.addr).await {
        Ok(listener) => listener,
        Err(err) => {
            eprintln!("error: failed to bind {}: {err}", http_cfg.addr);
            std::process::exit(1);
        }
    };
    info!(target: "phrases::server", addr = %http_cfg.addr, "phrases facade listening");

    let server = axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal());

    if let Err(err) = server.await {
        error!(target: "phrases::server", "http server exited with error: {err}");
    }
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {},
                    _ = term.recv() => {},
                }
            }
            Err(err) => {
                error!(target: "phrases::server", "SIGTERM handler unavailable: {err}");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }

    info!(target: "phrases::server", "shutdown signal received");
}
