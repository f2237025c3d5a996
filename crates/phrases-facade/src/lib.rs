//! Host-independent HTTP surface for the phrases store.
//!
//! Both deployments (the long-running server and the per-invocation
//! function) parse their native request into a [`FacadeRequest`], call
//! [`handle`], and supply a [`Respond`] sink that writes the result back in
//! their own format.

mod request;
mod respond;

pub use request::{parse_body, FacadeRequest, Method, RESOURCE_PATH};
pub use respond::{Respond, CORS_HEADERS};

use phrases_core::store::{is_blank, ID_AND_TEXT_REQUIRED, ID_REQUIRED, TEXT_REQUIRED};
use phrases_core::{PhraseStore, StoreError};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, error};

pub const METHOD_NOT_ALLOWED: &str = "Method not allowed";
pub const NOT_FOUND: &str = "Not found";

/// Status plus optional JSON body, before any host-specific encoding.
#[derive(Clone, Debug, PartialEq)]
pub struct Reply {
    pub status: u16,
    pub body: Option<Value>,
}

impl Reply {
    pub fn json<T: Serialize>(status: u16, body: &T) -> Self {
        match serde_json::to_value(body) {
            Ok(value) => Self {
                status,
                body: Some(value),
            },
            Err(err) => Self::error(500, err.to_string()),
        }
    }

    pub fn error(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            body: Some(json!({ "error": message.into() })),
        }
    }

    pub fn no_content() -> Self {
        Self {
            status: 204,
            body: None,
        }
    }

    /// Encode through `responder`, attaching the CORS headers.
    pub fn send<R: Respond>(self, responder: R) -> R::Output {
        let body = self
            .body
            .map(|value| serde_json::to_vec(&value).unwrap_or_else(|_| b"{}".to_vec()));
        let mut headers: Vec<(&'static str, &'static str)> = CORS_HEADERS.to_vec();
        if body.is_some() {
            headers.push(("Content-Type", "application/json"));
        }
        responder.respond(self.status, &headers, body)
    }
}

fn body_str<'a>(body: Option<&'a Value>, key: &str) -> Option<&'a str> {
    body.and_then(|b| b.get(key))
        .and_then(Value::as_str)
        .filter(|s| !is_blank(s))
}

fn store_failure(op: &'static str, err: StoreError) -> Reply {
    match err {
        StoreError::Validation(message) => Reply::error(400, message),
        other => {
            error!(target: "phrases::facade", op, error = %other, "store call failed");
            Reply::error(500, other.to_string())
        }
    }
}

/// Map one request onto the store and produce the reply.
pub async fn dispatch<S>(store: &S, request: FacadeRequest) -> Reply
where
    S: PhraseStore + ?Sized,
{
    let FacadeRequest { method, id, body } = request;
    debug!(target: "phrases::facade", method = %method, id = ?id, "dispatch");
    let body = body.as_ref();
    // Path id wins over a body id.
    let id = id
        .filter(|s| !is_blank(s))
        .or_else(|| body_str(body, "id").map(str::to_string));

    match method {
        Method::Options => Reply::no_content(),
        Method::Get => match store.list().await {
            Ok(phrases) => Reply::json(200, &phrases),
            Err(err) => store_failure("list", err),
        },
        Method::Post => {
            let Some(text) = body_str(body, "text") else {
                return Reply::error(400, TEXT_REQUIRED);
            };
            match store.create(text).await {
                Ok(phrase) => Reply::json(200, &phrase),
                Err(err) => store_failure("create", err),
            }
        }
        Method::Patch => {
            let (Some(id), Some(text)) = (id, body_str(body, "text")) else {
                return Reply::error(400, ID_AND_TEXT_REQUIRED);
            };
            match store.update(&id, text).await {
                Ok(phrase) => Reply::json(200, &phrase),
                Err(err) => store_failure("update", err),
            }
        }
        Method::Delete => {
            let Some(id) = id else {
                return Reply::error(400, ID_REQUIRED);
            };
            match store.archive(&id).await {
                Ok(archived) => Reply::json(200, &archived),
                Err(err) => store_failure("archive", err),
            }
        }
        Method::Other(_) => Reply::error(405, METHOD_NOT_ALLOWED),
    }
}

/// Handle one request end to end.
pub async fn handle<S, R>(store: &S, request: FacadeRequest, responder: R) -> R::Output
where
    S: PhraseStore + ?Sized,
    R: Respond,
{
    dispatch(store, request).await.send(responder)
}

/// Reply for paths outside the resource, still carrying the CORS headers.
pub fn not_found<R: Respond>(responder: R) -> R::Output {
    Reply::error(404, NOT_FOUND).send(responder)
}
