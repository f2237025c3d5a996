use serde_json::Value;
use std::fmt;

pub const RESOURCE_PATH: &str = "/api/phrases";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Patch,
    Delete,
    Options,
    Other(String),
}

impl Method {
    /// Method tokens are case-sensitive; `get` is not `GET`.
    pub fn parse(raw: &str) -> Self {
        match raw {
            "GET" => Method::Get,
            "POST" => Method::Post,
            "PATCH" => Method::Patch,
            "DELETE" => Method::Delete,
            "OPTIONS" => Method::Options,
            other => Method::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
            Method::Options => "OPTIONS",
            Method::Other(raw) => raw,
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Decode a request body. Empty or non-JSON bodies count as absent.
pub fn parse_body(bytes: &[u8]) -> Option<Value> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return None;
    }
    serde_json::from_slice(bytes).ok()
}

#[derive(Clone, Debug, PartialEq)]
pub struct FacadeRequest {
    pub method: Method,
    /// Id taken from the `/{id}` path segment, if any.
    pub id: Option<String>,
    pub body: Option<Value>,
}

impl FacadeRequest {
    pub fn new(method: Method) -> Self {
        Self {
            method,
            id: None,
            body: None,
        }
    }

    pub fn with_id(mut self, id: String) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Build from raw parts. Returns `None` when `path` is not the resource
    /// path or a single segment below it.
    pub fn from_parts(method: &str, path: &str, body: &[u8]) -> Option<Self> {
        let path = path.split('?').next().unwrap_or_default();
        let rest = path.strip_prefix(RESOURCE_PATH)?;
        let id = match rest {
            "" | "/" => None,
            seg => {
                let seg = seg.strip_prefix('/')?;
                if seg.is_empty() || seg.contains('/') {
                    return None;
                }
                Some(seg.to_string())
            }
        };
        Some(Self {
            method: Method::parse(method),
            id,
            body: parse_body(body),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_collection_and_item_paths() {
        let req = FacadeRequest::from_parts("GET", "/api/phrases", b"").expect("collection");
        assert_eq!(req.method, Method::Get);
        assert_eq!(req.id, None);

        let req = FacadeRequest::from_parts("PATCH", "/api/phrases/abc-123", br#"{"text":"x"}"#)
            .expect("item");
        assert_eq!(req.id.as_deref(), Some("abc-123"));
        assert_eq!(req.body, Some(json!({"text": "x"})));

        let req = FacadeRequest::from_parts("GET", "/api/phrases?x=1", b"").expect("query");
        assert_eq!(req.id, None);
    }

    #[test]
    fn rejects_foreign_paths() {
        assert!(FacadeRequest::from_parts("GET", "/api/phrasesX", b"").is_none());
        assert!(FacadeRequest::from_parts("GET", "/api/phrases/a/b", b"").is_none());
        assert!(FacadeRequest::from_parts("GET", "/api/phrases/a/", b"").is_none());
        assert!(FacadeRequest::from_parts("GET", "/api/phrases/", b"").is_some());
        assert!(FacadeRequest::from_parts("GET", "/", b"").is_none());
    }

    #[test]
    fn invalid_body_is_absent() {
        assert_eq!(parse_body(b"not json"), None);
        assert_eq!(parse_body(b"  \n"), None);
        assert_eq!(parse_body(b"{\"id\":\"1\"}"), Some(json!({"id": "1"})));
    }

    #[test]
    fn other_methods_keep_their_name() {
        assert_eq!(Method::parse("PUT"), Method::Other("PUT".into()));
        assert_eq!(Method::parse("put").to_string(), "put");
    }

    #[test]
    fn method_tokens_are_case_sensitive() {
        assert_eq!(Method::parse("GET"), Method::Get);
        assert_eq!(Method::parse("get"), Method::Other("get".into()));
        assert_eq!(Method::parse("Delete"), Method::Other("Delete".into()));
        let req = FacadeRequest::from_parts("options", "/api/phrases", b"").expect("collection");
        assert_eq!(req.method, Method::Other("options".into()));
    }
}
