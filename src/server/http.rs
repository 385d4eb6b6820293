//! Streamable HTTP transport
//!
//! The MCP endpoint lives at [`MCP_PATH`]: `POST` carries JSON-RPC messages,
//! `GET` opens the server-to-client SSE stream and `DELETE` ends a session.
//! The request head reaches the handler through the request extensions.

use crate::server::handler::KagiHandler;
use crate::server::{KagiMcpServer, ServerConfig};
use axum::{
    body::Body,
    extract::{Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::{self, Next},
    response::Response,
    Router,
};
use rmcp::transport::streamable_http_server::{
    session::local::LocalSessionManager, tower::StreamableHttpService,
};
use rmcp::transport::StreamableHttpServerConfig;
use std::sync::Arc;

/// Path of the MCP endpoint
pub const MCP_PATH: &str = "/mcp";

/// Accepted `Host` and `Origin` values
#[derive(Debug, Clone)]
struct OriginPolicy {
    hosts: Vec<String>,
    origins: Vec<String>,
}

impl OriginPolicy {
    fn from_config(config: &ServerConfig) -> Self {
        Self {
            hosts: config
                .allowed_hosts
                .iter()
                .map(|host| host.to_ascii_lowercase())
                .collect(),
            origins: config.allowed_origins.clone(),
        }
    }

    fn allows_host(&self, headers: &HeaderMap) -> bool {
        if self.hosts.is_empty() {
            return true;
        }
        let Some(host) = headers.get(header::HOST).and_then(|v| v.to_str().ok()) else {
            return false;
        };
        let host = strip_port(host).to_ascii_lowercase();
        self.hosts.iter().any(|allowed| *allowed == host)
    }

    fn allows_origin(&self, headers: &HeaderMap) -> bool {
        // Non-browser clients send no Origin.
        let Some(origin) = headers.get(header::ORIGIN) else {
            return true;
        };
        let Ok(origin) = origin.to_str() else {
            return false;
        };
        self.origins
            .iter()
            .any(|allowed| allowed == "*" || allowed.eq_ignore_ascii_case(origin))
    }
}

/// Host part of a `Host` header value
fn strip_port(host: &str) -> &str {
    if let Some(rest) = host.strip_prefix('[') {
        // [::1]:8080
        return rest.split(']').next().unwrap_or(rest);
    }
    match host.rsplit_once(':') {
        Some((name, port)) if port.chars().all(|c| c.is_ascii_digit()) => name,
        _ => host,
    }
}

async fn guard_origin(
    State(policy): State<Arc<OriginPolicy>>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, StatusCode> {
    if !policy.allows_host(req.headers()) {
        tracing::warn!(host = ?req.headers().get(header::HOST), "rejected request host");
        return Err(StatusCode::FORBIDDEN);
    }
    if !policy.allows_origin(req.headers()) {
        tracing::warn!(origin = ?req.headers().get(header::ORIGIN), "rejected request origin");
        return Err(StatusCode::FORBIDDEN);
    }
    Ok(next.run(req).await)
}

/// Build the HTTP router
pub fn router(server: Arc<KagiMcpServer>) -> Router {
    let policy = Arc::new(OriginPolicy::from_config(server.config()));
    let handler = KagiHandler::new(server);

    let service = StreamableHttpService::new(
        move || Ok(handler.clone()),
        LocalSessionManager::default().into(),
        StreamableHttpServerConfig::default(),
    );

    Router::new()
        .nest_service(MCP_PATH, service)
        .layer(middleware::from_fn_with_state(policy, guard_origin))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(pairs: &[(header::HeaderName, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(name.clone(), value.parse().unwrap());
        }
        map
    }

    fn policy(hosts: &[&str], origins: &[&str]) -> OriginPolicy {
        OriginPolicy {
            hosts: hosts.iter().map(ToString::to_string).collect(),
            origins: origins.iter().map(ToString::to_string).collect(),
        }
    }

    #[test]
    fn test_strip_port() {
        assert_eq!(strip_port("localhost:8080"), "localhost");
        assert_eq!(strip_port("127.0.0.1"), "127.0.0.1");
        assert_eq!(strip_port("[::1]:8080"), "::1");
    }

    #[test]
    fn test_host_allow_list() {
        let policy = policy(&["localhost", "127.0.0.1"], &["*"]);
        assert!(policy.allows_host(&headers(&[(header::HOST, "127.0.0.1:8080")])));
        assert!(policy.allows_host(&headers(&[(header::HOST, "LOCALHOST")])));
        assert!(!policy.allows_host(&headers(&[(header::HOST, "evil.example")])));
        assert!(!policy.allows_host(&HeaderMap::new()));
    }

    #[test]
    fn test_empty_host_list_allows_any() {
        let policy = policy(&[], &["*"]);
        assert!(policy.allows_host(&headers(&[(header::HOST, "evil.example")])));
    }

    #[test]
    fn test_origin_allow_list() {
        let policy = policy(&[], &["http://localhost:3000"]);
        assert!(policy.allows_origin(&HeaderMap::new()));
        assert!(policy.allows_origin(&headers(&[(header::ORIGIN, "http://localhost:3000")])));
        assert!(!policy.allows_origin(&headers(&[(header::ORIGIN, "https://evil.example")])));
    }
}
