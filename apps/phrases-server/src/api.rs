use axum::body::{Body, Bytes};
use axum::extract::rejection::{BytesRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::{Method as HttpMethod, StatusCode};
use axum::response::{IntoResponse, Response};
use phrases_facade::{handle, not_found, parse_body, FacadeRequest, Method, Reply, Respond};
use tracing::debug;

use crate::AppState;

/// Encodes facade replies as axum responses.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct AxumResponder;

impl Respond for AxumResponder {
    type Output = Response;

    fn respond(
        self,
        status: u16,
        headers: &[(&'static str, &'static str)],
        body: Option<Vec<u8>>,
    ) -> Response {
        let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let mut builder = Response::builder().status(status);
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        let body = body.map(Body::from).unwrap_or_else(Body::empty);
        builder
            .body(body)
            .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response())
    }
}

fn facade_request(method: &HttpMethod, id: Option<String>, body: &Bytes) -> FacadeRequest {
    FacadeRequest {
        method: Method::parse(method.as_str()),
        id,
        body: parse_body(body),
    }
}

/// Extractor failures still answer through the facade so the CORS headers
/// are attached.
fn rejected(status: StatusCode, message: String) -> Response {
    debug!(target: "phrases::server", status = status.as_u16(), %message, "request rejected");
    Reply::error(status.as_u16(), message).send(AxumResponder)
}

/// Any method on `/api/phrases`.
pub(crate) async fn phrases_collection(
    State(state): State<AppState>,
    method: HttpMethod,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    let body = match body {
        Ok(body) => body,
        Err(rejection) => return rejected(rejection.status(), rejection.body_text()),
    };
    let request = facade_request(&method, None, &body);
    handle(state.store(), request, AxumResponder).await
}

/// Any method on `/api/phrases/{id}`.
pub(crate) async fn phrases_item(
    State(state): State<AppState>,
    id: Result<Path<String>, PathRejection>,
    method: HttpMethod,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    let id = match id {
        Ok(Path(id)) => id,
        Err(rejection) => return rejected(rejection.status(), rejection.body_text()),
    };
    let body = match body {
        Ok(body) => body,
        Err(rejection) => return rejected(rejection.status(), rejection.body_text()),
    };
    let request = facade_request(&method, Some(id), &body);
    handle(state.store(), request, AxumResponder).await
}

pub(crate) async fn fallback() -> Response {
    not_found(AxumResponder)
}
