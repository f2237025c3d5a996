use axum::extract::{ConnectInfo, MatchedPath};
use axum::http::{header, HeaderMap, Request};
use axum::middleware::Next;
use axum::response::Response;
use once_cell::sync::Lazy;
use phrases_otel::ACCESS_TARGET;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

#[derive(Clone, Debug)]
struct AccessCfg {
    enabled: bool,
    sample_n: u64,
    user_agent: bool,
    trust_forward: bool,
}

impl AccessCfg {
    fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let flag = |key: &str| lookup(key).as_deref().map(str::trim) == Some("1");
        Self {
            enabled: flag("PHRASES_ACCESS_LOG"),
            sample_n: lookup("PHRASES_ACCESS_SAMPLE_N")
                .and_then(|s| s.trim().parse().ok())
                .unwrap_or(1)
                .max(1),
            user_agent: flag("PHRASES_ACCESS_UA"),
            trust_forward: flag("PHRASES_TRUST_FORWARD_HEADERS"),
        }
    }
}

static CFG: Lazy<AccessCfg> = Lazy::new(|| AccessCfg::from_lookup(|k| std::env::var(k).ok()));

static COUNTER: AtomicU64 = AtomicU64::new(0);

fn forwarded_for(headers: &HeaderMap) -> Option<String> {
    let raw = headers.get("x-forwarded-for")?.to_str().ok()?;
    let first = raw.split(',').next()?.trim();
    (!first.is_empty()).then(|| first.to_string())
}

fn peer_ip<B>(req: &Request<B>) -> Option<String> {
    req.extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|c| c.0.ip().to_string())
}

fn access_record(
    method: &str,
    path: &str,
    status: u16,
    dur_ms: u64,
    remote: Option<String>,
    user_agent: Option<&str>,
) -> serde_json::Value {
    let mut obj = serde_json::json!({
        "ts": chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
        "method": method,
        "path": path,
        "status": status,
        "dur_ms": dur_ms,
    });
    if let Some(ip) = remote {
        obj["remote"] = serde_json::Value::String(ip);
    }
    if let Some(ua) = user_agent {
        obj["ua"] = serde_json::Value::String(ua.to_string());
    }
    obj
}

/// One JSON line per request on the `http.access` target when
/// `PHRASES_ACCESS_LOG=1`.
pub(crate) async fn access_log_mw(req: Request<axum::body::Body>, next: Next) -> Response {
    if !CFG.enabled {
        return next.run(req).await;
    }
    let started = Instant::now();
    let method = req.method().clone();
    let path = req
        .extensions()
        .get::<MatchedPath>()
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| req.uri().path().to_string());
    let remote = if CFG.trust_forward {
        forwarded_for(req.headers()).or_else(|| peer_ip(&req))
    } else {
        peer_ip(&req)
    };
    let user_agent = if CFG.user_agent {
        req.headers()
            .get(header::USER_AGENT)
            .and_then(|h| h.to_str().ok())
            .map(str::to_string)
    } else {
        None
    };

    let res = next.run(req).await;

    let n = COUNTER.fetch_add(1, Ordering::Relaxed) + 1;
    if CFG.sample_n > 1 && n % CFG.sample_n != 0 {
        return res;
    }
    let record = access_record(
        method.as_str(),
        &path,
        res.status().as_u16(),
        started.elapsed().as_millis() as u64,
        remote,
        user_agent.as_deref(),
    );
    tracing::info!(target: ACCESS_TARGET, "{}", record);
    res
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn cfg_reads_flags() {
        let cfg = AccessCfg::from_lookup(|k| match k {
            "PHRASES_ACCESS_LOG" => Some("1".into()),
            "PHRASES_ACCESS_SAMPLE_N" => Some("0".into()),
            _ => None,
        });
        assert!(cfg.enabled);
        assert_eq!(cfg.sample_n, 1);
        assert!(!cfg.user_agent);
        assert!(!cfg.trust_forward);
    }

    #[test]
    fn forwarded_for_takes_first_hop() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("203.0.113.7, 10.0.0.1"),
        );
        assert_eq!(forwarded_for(&headers).as_deref(), Some("203.0.113.7"));
        assert_eq!(forwarded_for(&HeaderMap::new()), None);
    }

    #[test]
    fn record_has_optional_fields() {
        let rec = access_record("GET", "/api/phrases", 200, 4, None, None);
        assert_eq!(rec["status"], 200);
        assert!(rec.get("remote").is_none());
        let rec = access_record("GET", "/", 404, 1, Some("::1".into()), Some("curl"));
        assert_eq!(rec["remote"], "::1");
        assert_eq!(rec["ua"], "curl");
    }
}
