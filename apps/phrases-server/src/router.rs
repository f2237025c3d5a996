use axum::{routing::any, Router};

use crate::{api, AppState};

pub(crate) mod paths {
    pub const PHRASES: &str = "/api/phrases";
    pub const PHRASES_SLASH: &str = "/api/phrases/";
    pub const PHRASES_ID: &str = "/api/phrases/{id}";
}

/// Every method is routed to the facade, which owns method dispatch so that
/// 405 and preflight replies match the per-invocation host.
pub(crate) fn build_router() -> Router<AppState> {
    Router::new()
        .route(paths::PHRASES, any(api::phrases_collection))
        .route(paths::PHRASES_SLASH, any(api::phrases_collection))
        .route(paths::PHRASES_ID, any(api::phrases_item))
        .fallback(api::fallback)
}
