use std::io::{self, Read, Write};

use phrases_core::PhraseStore;
use phrases_facade::{handle, not_found, FacadeRequest, Respond, RESOURCE_PATH};
use tracing::debug;

/// Request metadata handed over by the CGI host.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct CgiEnv {
    pub method: String,
    pub path: String,
    pub content_length: usize,
}

impl CgiEnv {
    pub(crate) fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let method = lookup("REQUEST_METHOD").unwrap_or_else(|| "GET".into());
        let path = resource_path(lookup("PATH_INFO").as_deref().unwrap_or_default());
        let content_length = lookup("CONTENT_LENGTH")
            .and_then(|raw| raw.trim().parse().ok())
            .unwrap_or(0);
        Self {
            method,
            path,
            content_length,
        }
    }

    pub(crate) fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read at most `CONTENT_LENGTH` bytes of body. The buffer grows with
    /// what actually arrives, not with the declared length.
    pub(crate) fn read_body<R: Read>(&self, input: R) -> io::Result<Vec<u8>> {
        let mut body = Vec::new();
        input
            .take(self.content_length as u64)
            .read_to_end(&mut body)?;
        Ok(body)
    }
}

/// `PATH_INFO` may be absolute or relative to the mounted resource.
fn resource_path(path_info: &str) -> String {
    if path_info.starts_with(RESOURCE_PATH) {
        path_info.to_string()
    } else if path_info.is_empty() || path_info == "/" {
        RESOURCE_PATH.to_string()
    } else {
        format!("{RESOURCE_PATH}{path_info}")
    }
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        204 => "No Content",
        400 => "Bad Request",
        404 => "Not Found",
        405 => "Method Not Allowed",
        500 => "Internal Server Error",
        502 => "Bad Gateway",
        _ => "",
    }
}

/// Writes a reply in CGI response form.
pub(crate) struct CgiResponder<W> {
    out: W,
}

impl<W: Write> CgiResponder<W> {
    pub(crate) fn new(out: W) -> Self {
        Self { out }
    }
}

impl<W: Write> Respond for CgiResponder<W> {
    type Output = io::Result<()>;

    fn respond(
        mut self,
        status: u16,
        headers: &[(&'static str, &'static str)],
        body: Option<Vec<u8>>,
    ) -> io::Result<()> {
        write!(self.out, "Status: {} {}\r\n", status, reason(status))?;
        for (name, value) in headers {
            write!(self.out, "{name}: {value}\r\n")?;
        }
        self.out.write_all(b"\r\n")?;
        if let Some(body) = body {
            self.out.write_all(&body)?;
        }
        self.out.flush()
    }
}

/// Serve one invocation against `store`.
pub(crate) async fn invoke<S, W>(store: &S, env: &CgiEnv, body: &[u8], out: W) -> io::Result<()>
where
    S: PhraseStore + ?Sized,
    W: Write,
{
    debug!(target: "phrases::function", method = %env.method, path = %env.path, "invocation");
    match FacadeRequest::from_parts(&env.method, &env.path, body) {
        Some(request) => handle(store, request, CgiResponder::new(out)).await,
        None => not_found(CgiResponder::new(out)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use phrases_core::{MemoryStore, Phrase};
    use serde_json::{json, Value};
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> CgiEnv {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        CgiEnv::from_lookup(|key| map.get(key).cloned())
    }

    fn split(output: &[u8]) -> (String, Value) {
        let text = String::from_utf8(output.to_vec()).expect("utf8");
        let (head, body) = text.split_once("\r\n\r\n").expect("header terminator");
        let body = if body.is_empty() {
            Value::Null
        } else {
            serde_json::from_str(body).expect("json")
        };
        (head.to_string(), body)
    }

    #[test]
    fn env_defaults_and_paths() {
        let e = env(&[]);
        assert_eq!(e.method, "GET");
        assert_eq!(e.path, "/api/phrases");
        assert_eq!(e.content_length, 0);

        assert_eq!(env(&[("PATH_INFO", "/abc")]).path, "/api/phrases/abc");
        assert_eq!(
            env(&[("PATH_INFO", "/api/phrases/abc")]).path,
            "/api/phrases/abc"
        );
        assert_eq!(env(&[("CONTENT_LENGTH", "nope")]).content_length, 0);
    }

    #[test]
    fn body_is_capped_at_content_length() {
        let e = env(&[("CONTENT_LENGTH", "4")]);
        let body = e.read_body(&b"abcdefgh"[..]).expect("read");
        assert_eq!(body, b"abcd");
        let e = env(&[]);
        assert!(e.read_body(&b"ignored"[..]).expect("read").is_empty());
    }

    #[test]
    fn huge_content_length_reads_what_arrives() {
        let e = env(&[("CONTENT_LENGTH", usize::MAX.to_string().as_str())]);
        assert_eq!(e.content_length, usize::MAX);
        assert_eq!(e.read_body(&br#"{"text":"x"}"#[..]).expect("read"), br#"{"text":"x"}"#);

        let e = env(&[("CONTENT_LENGTH", "1000000000000")]);
        assert_eq!(e.read_body(&b"abc"[..]).expect("read"), b"abc");
    }

    #[tokio::test]
    async fn post_writes_status_headers_and_body() {
        let store = MemoryStore::new();
        let e = env(&[("REQUEST_METHOD", "POST")]);
        let mut out = Vec::new();
        invoke(&store, &e, br#"{"text":"Hola"}"#, &mut out)
            .await
            .expect("invoke");
        let (head, body) = split(&out);
        assert!(head.starts_with("Status: 200 OK\r\n"));
        assert!(head.contains("Access-Control-Allow-Origin: *"));
        assert!(head.contains("Content-Type: application/json"));
        assert_eq!(body["text"], "Hola");
        assert_eq!(store.len_all().await, 1);
    }

    #[tokio::test]
    async fn preflight_has_no_body() {
        let store = MemoryStore::new();
        let mut out = Vec::new();
        invoke(&store, &env(&[("REQUEST_METHOD", "OPTIONS")]), b"", &mut out)
            .await
            .expect("invoke");
        let (head, body) = split(&out);
        assert!(head.starts_with("Status: 204 No Content"));
        assert!(!head.contains("Content-Type"));
        assert_eq!(body, Value::Null);
    }

    #[tokio::test]
    async fn delete_takes_id_from_body() {
        let store = MemoryStore::new();
        store
            .insert(Phrase {
                id: "p1".into(),
                text: "uno".into(),
                date: None,
            })
            .await;
        let mut out = Vec::new();
        invoke(
            &store,
            &env(&[("REQUEST_METHOD", "DELETE")]),
            br#"{"id":"p1"}"#,
            &mut out,
        )
        .await
        .expect("invoke");
        let (_, body) = split(&out);
        assert_eq!(body, json!({"id": "p1", "archived": true}));
    }

    #[tokio::test]
    async fn errors_and_foreign_paths() {
        let store = MemoryStore::new();
        let mut out = Vec::new();
        invoke(&store, &env(&[("REQUEST_METHOD", "PATCH")]), b"{}", &mut out)
            .await
            .expect("invoke");
        let (head, body) = split(&out);
        assert!(head.starts_with("Status: 400 Bad Request"));
        assert_eq!(body, json!({"error": "ID and text are required"}));

        let mut out = Vec::new();
        invoke(&store, &env(&[("REQUEST_METHOD", "PUT")]), b"", &mut out)
            .await
            .expect("invoke");
        assert!(split(&out).0.starts_with("Status: 405"));

        let mut out = Vec::new();
        invoke(&store, &env(&[("PATH_INFO", "/a/b")]), b"", &mut out)
            .await
            .expect("invoke");
        let (head, body) = split(&out);
        assert!(head.starts_with("Status: 404 Not Found"));
        assert_eq!(body, json!({"error": "Not found"}));
    }
}
