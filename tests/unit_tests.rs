//! Unit tests

use kagi_mcp::{
    config::AppConfig,
    credential::{CallContext, Credential, CredentialResolver, API_KEY_HEADER},
    kagi::{
        SearchOutcome, SearchQuery, SearchResultItem, SummarizeRequest, SummaryEngine,
        SummaryOutcome, SummaryType, DEFAULT_SEARCH_LIMIT,
    },
    server::transport::TransportMode,
    tools::{format, input_schema, search, summarize, with_enum},
    Error,
};
use serde_json::json;

fn item(title: &str, url: &str, snippet: &str, published_at: &str) -> SearchResultItem {
    SearchResultItem {
        title: title.to_string(),
        url: url.to_string(),
        snippet: snippet.to_string(),
        published_at: published_at.to_string(),
    }
}

// ============================================================================
// Result formatting
// ============================================================================

/// Full search rendering, byte for byte
#[test]
fn test_render_search_layout() {
    let outcome = SearchOutcome {
        items: vec![
            item("First", "https://example.com/1", "one", "2024-01-01"),
            item("Second", "https://example.com/2", "two", ""),
        ],
        related_terms: vec!["alpha".to_string(), "beta".to_string()],
    };

    let text = format::render_search("rust async", &outcome);

    assert_eq!(
        text,
        "Search results for 'rust async':\n\n\
         1. First\n   URL: https://example.com/1\n   Published: 2024-01-01\n   one\n\n\
         2. Second\n   URL: https://example.com/2\n   two\n\n\
         Related searches:\n1. alpha\n2. beta\n"
    );
}

/// Every item is numbered from 1 in the original order
#[test]
fn test_render_search_numbers_items_in_order() {
    let items: Vec<_> = (0..7)
        .map(|i| item(&format!("Title {i}"), &format!("https://example.com/{i}"), "", ""))
        .collect();
    let outcome = SearchOutcome {
        items,
        related_terms: vec![],
    };

    let text = format::render_search("q", &outcome);

    let mut last = 0;
    for i in 0..7 {
        let entry = format!("{}. Title {i}\n", i + 1);
        let position = text.find(&entry).expect("entry missing");
        assert!(position >= last, "entry {i} out of order");
        last = position;
    }
    assert!(!text.contains("8. "));
}

/// The Published line appears only for dated items
#[test]
fn test_render_search_published_line() {
    let dated = SearchOutcome {
        items: vec![item("A", "https://a", "s", "2023-05-06")],
        related_terms: vec![],
    };
    let undated = SearchOutcome {
        items: vec![item("A", "https://a", "s", "")],
        related_terms: vec![],
    };

    assert_eq!(
        format::render_search("q", &dated).matches("Published:").count(),
        1
    );
    assert!(!format::render_search("q", &undated).contains("Published:"));
}

/// No related section without related terms
#[test]
fn test_render_search_without_related_terms() {
    let outcome = SearchOutcome {
        items: vec![item("A", "https://a", "s", "")],
        related_terms: vec![],
    };

    let text = format::render_search("q", &outcome);
    assert!(!text.contains("Related searches:"));
    assert!(text.ends_with("   s\n\n"));
}

/// An empty outcome renders only the header
#[test]
fn test_render_search_empty() {
    let text = format::render_search("nothing", &SearchOutcome::default());
    assert_eq!(text, "Search results for 'nothing':\n\n");
}

/// Text passes through untouched
#[test]
fn test_render_search_passes_text_through() {
    let outcome = SearchOutcome {
        items: vec![item("<b>Ünïcode</b> & co", "https://例え.jp", "'quoted' \"text\"", "")],
        related_terms: vec!["日本語".to_string()],
    };

    let text = format::render_search("naïve 'query'", &outcome);
    assert!(text.starts_with("Search results for 'naïve 'query'':"));
    assert!(text.contains("1. <b>Ünïcode</b> & co\n"));
    assert!(text.contains("   URL: https://例え.jp\n"));
    assert!(text.contains("   'quoted' \"text\"\n"));
    assert!(text.contains("1. 日本語\n"));
}

/// Summary rendering
#[test]
fn test_render_summary() {
    let outcome = SummaryOutcome {
        text: "This is a test summary.".to_string(),
    };

    assert_eq!(
        format::render_summary("https://example.com/article", &outcome),
        "Summary of https://example.com/article:\n\nThis is a test summary."
    );
}

/// Summary text is not trimmed
#[test]
fn test_render_summary_keeps_whitespace() {
    let outcome = SummaryOutcome {
        text: "  - point one\n  - point two\n".to_string(),
    };

    assert_eq!(
        format::render_summary("https://x", &outcome),
        "Summary of https://x:\n\n  - point one\n  - point two\n"
    );
}

// ============================================================================
// Argument binding
// ============================================================================

/// Search query with explicit limit
#[test]
fn test_bind_search_arguments() {
    let query = search::bind_arguments(&json!({"query": "test query", "limit": 3})).unwrap();
    assert_eq!(query, SearchQuery::new("test query").with_limit(3));
}

/// Limit falls back to 5 when absent or not a number
#[test]
fn test_bind_search_limit_defaults() {
    for arguments in [
        json!({"query": "q"}),
        json!({"query": "q", "limit": "7"}),
        json!({"query": "q", "limit": null}),
        json!({"query": "q", "limit": [1]}),
    ] {
        let query = search::bind_arguments(&arguments).unwrap();
        assert_eq!(query.limit, DEFAULT_SEARCH_LIMIT, "arguments: {arguments}");
    }
}

/// Numeric limits are truncated, not bounded
#[test]
fn test_bind_search_limit_numeric_forms() {
    let cases = [
        (json!(3.9), 3),
        (json!(10), 10),
        (json!(25), 25),
        (json!(-4), 0),
        (json!(0), 0),
    ];

    for (limit, expected) in cases {
        let query = search::bind_arguments(&json!({"query": "q", "limit": limit})).unwrap();
        assert_eq!(query.limit, expected, "limit: {limit}");
    }
}

/// Missing, empty or non-string queries are rejected
#[test]
fn test_bind_search_rejects_bad_query() {
    for arguments in [
        json!(null),
        json!({}),
        json!({"query": ""}),
        json!({"query": 42}),
        json!({"limit": 5}),
    ] {
        let result = search::bind_arguments(&arguments);
        assert!(
            matches!(result, Err(Error::InvalidParameter(_))),
            "arguments: {arguments}"
        );
    }
}

/// Summarize defaults
#[test]
fn test_bind_summarize_defaults() {
    let request = summarize::bind_arguments(&json!({"url": "https://example.com"})).unwrap();

    assert_eq!(request, SummarizeRequest::new("https://example.com"));
    assert_eq!(request.engine, SummaryEngine::Agnes);
    assert_eq!(request.summary_type, SummaryType::Summary);
}

/// Explicit engine and summary type
#[test]
fn test_bind_summarize_explicit() {
    let request = summarize::bind_arguments(&json!({
        "url": "https://example.com",
        "engine": "muriel",
        "summary_type": "takeaway"
    }))
    .unwrap();

    assert_eq!(request.engine, SummaryEngine::Muriel);
    assert_eq!(request.summary_type, SummaryType::Takeaway);
}

/// Non-string engine values fall back to the default
#[test]
fn test_bind_summarize_non_string_engine() {
    let request =
        summarize::bind_arguments(&json!({"url": "https://example.com", "engine": 3})).unwrap();
    assert_eq!(request.engine, SummaryEngine::Agnes);
}

/// Unknown enumeration values and missing URLs are rejected
#[test]
fn test_bind_summarize_rejects_bad_arguments() {
    for arguments in [
        json!({}),
        json!({"url": ""}),
        json!({"url": 1}),
        json!({"url": "https://example.com", "engine": "daphne"}),
        json!({"url": "https://example.com", "summary_type": "bullets"}),
    ] {
        let result = summarize::bind_arguments(&arguments);
        assert!(
            matches!(result, Err(Error::InvalidParameter(_))),
            "arguments: {arguments}"
        );
    }
}

/// Unrecognized engine and summary type names are refused locally instead of
/// being forwarded to Kagi
#[test]
fn test_bind_summarize_unknown_engine_is_refused_not_forwarded() {
    let err = summarize::bind_arguments(&json!({"url": "https://example.com", "engine": "daphne"}))
        .unwrap_err();
    assert!(matches!(&err, Error::InvalidParameter(message) if message.contains("daphne")));

    let err = summarize::bind_arguments(
        &json!({"url": "https://example.com", "summary_type": "bullets"}),
    )
    .unwrap_err();
    assert!(matches!(&err, Error::InvalidParameter(message) if message.contains("bullets")));
}

/// Enumerations round-trip through their wire names
#[test]
fn test_summary_enums_wire_names() {
    for engine in SummaryEngine::ALL {
        assert_eq!(engine.as_str().parse::<SummaryEngine>().unwrap(), engine);
        assert_eq!(engine.to_string(), engine.as_str());
    }
    for kind in SummaryType::ALL {
        assert_eq!(kind.as_str().parse::<SummaryType>().unwrap(), kind);
    }
    assert!("Agnes".parse::<SummaryEngine>().is_err());
}

// ============================================================================
// Credentials
// ============================================================================

/// Empty tokens are not credentials
#[test]
fn test_credential_rejects_empty() {
    assert!(Credential::new("").is_none());
    assert_eq!(Credential::new("abc").unwrap().expose(), "abc");
}

/// Credentials never show up in debug output
#[test]
fn test_credential_debug_is_redacted() {
    let credential = Credential::new("super-secret").unwrap();
    let ctx = CallContext::new(Some(credential.clone()));

    assert!(!format!("{credential:?}").contains("super-secret"));
    assert!(!format!("{ctx:?}").contains("super-secret"));

    let mut config = AppConfig::default();
    config.kagi.api_key = Some("super-secret".to_string());
    assert!(!format!("{config:?}").contains("super-secret"));
}

/// Stdio calls always use the process-wide key
#[test]
fn test_resolver_stdio_uses_default() {
    let resolver = CredentialResolver::new(Credential::new("default-key"));
    let ctx = resolver.for_stdio();
    assert_eq!(ctx.credential().unwrap().expose(), "default-key");
}

/// The header overrides the default key
#[test]
fn test_resolver_header_override() {
    let resolver = CredentialResolver::new(Credential::new("default-key"));
    let mut headers = axum::http::HeaderMap::new();
    headers.insert(API_KEY_HEADER, "override-key".parse().unwrap());

    let ctx = resolver.from_headers(&headers);
    assert_eq!(ctx.credential().unwrap().expose(), "override-key");
}

/// Missing or empty headers fall back to the default key
#[test]
fn test_resolver_header_fallback() {
    let resolver = CredentialResolver::new(Credential::new("default-key"));

    let ctx = resolver.from_headers(&axum::http::HeaderMap::new());
    assert_eq!(ctx.credential().unwrap().expose(), "default-key");

    let mut headers = axum::http::HeaderMap::new();
    headers.insert(API_KEY_HEADER, "".parse().unwrap());
    let ctx = resolver.from_headers(&headers);
    assert_eq!(ctx.credential().unwrap().expose(), "default-key");
}

/// Without any key the context reports the credential as missing
#[test]
fn test_resolver_without_default() {
    let resolver = CredentialResolver::default();

    assert!(matches!(
        resolver.for_stdio().credential(),
        Err(Error::CredentialMissing)
    ));
    assert!(matches!(
        resolver.from_headers(&axum::http::HeaderMap::new()).credential(),
        Err(Error::CredentialMissing)
    ));
}

// ============================================================================
// Transport mode
// ============================================================================

/// Transport mode parsing
#[test]
fn test_transport_mode_from_str() {
    use std::str::FromStr;

    let modes = [
        ("stdio", TransportMode::Stdio),
        ("STDIO", TransportMode::Stdio),
        ("http", TransportMode::Http),
        ("HTTP", TransportMode::Http),
    ];

    for (input, expected) in modes {
        assert_eq!(TransportMode::from_str(input).unwrap(), expected);
    }

    assert!(TransportMode::from_str("websocket").is_err());
}

/// Only stdio and streamable HTTP are served; there is no `sse` mode
#[test]
fn test_transport_mode_rejects_sse() {
    use std::str::FromStr;

    let err = TransportMode::from_str("sse").unwrap_err();
    assert!(err.contains("expected stdio or http"));
}

/// Transport mode display
#[test]
fn test_transport_mode_display() {
    assert_eq!(TransportMode::Stdio.to_string(), "stdio");
    assert_eq!(TransportMode::Http.to_string(), "http");
}

// ============================================================================
// Configuration
// ============================================================================

fn valid_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.kagi.api_key = Some("key".to_string());
    config
}

/// Default configuration values
#[test]
fn test_app_config_default() {
    let config = AppConfig::default();
    assert_eq!(config.server.host, "127.0.0.1");
    assert_eq!(config.server.port, 8080);
    assert_eq!(config.server.transport_mode, "stdio");
    assert_eq!(config.server.allowed_hosts, vec!["localhost", "127.0.0.1"]);
    assert_eq!(config.server.allowed_origins, vec!["*"]);
    assert_eq!(config.kagi.base_url, "https://kagi.com");
    assert!(config.kagi.api_key.is_none());
    assert_eq!(config.logging.level, "info");
    assert!(!config.logging.enable_file);
}

/// A configured key makes the defaults valid
#[test]
fn test_config_validation_ok() {
    assert!(valid_config().validate().is_ok());
}

/// Missing or empty key is fatal
#[test]
fn test_config_validation_missing_api_key() {
    let mut config = AppConfig::default();
    let err = config.validate().unwrap_err();
    assert!(err.to_string().contains("Kagi API key not provided"));

    config.kagi.api_key = Some(String::new());
    assert!(config.validate().is_err());
}

/// Unknown transport mode is fatal
#[test]
fn test_config_validation_invalid_transport_mode() {
    let mut config = valid_config();
    config.server.transport_mode = "carrier-pigeon".to_string();
    let err = config.validate().unwrap_err();
    assert!(err.to_string().contains("Unknown transport mode"));
}

/// Other invalid values
#[test]
fn test_config_validation_invalid_values() {
    let mut config = valid_config();
    config.server.port = 0;
    assert!(config.validate().is_err());

    let mut config = valid_config();
    config.server.host = String::new();
    assert!(config.validate().is_err());

    let mut config = valid_config();
    config.logging.level = "loud".to_string();
    assert!(config
        .validate()
        .unwrap_err()
        .to_string()
        .contains("Invalid log level"));

    let mut config = valid_config();
    config.kagi.base_url = "not a url".to_string();
    assert!(config.validate().is_err());
}

/// Partial TOML files keep defaults for missing keys
#[test]
fn test_config_from_partial_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        r#"
[server]
port = 9090
transport_mode = "http"

[kagi]
api_key = "file-key"
"#,
    )
    .unwrap();

    let config = AppConfig::from_file(&path).unwrap();
    assert_eq!(config.server.port, 9090);
    assert_eq!(config.server.transport_mode, "http");
    assert_eq!(config.server.host, "127.0.0.1");
    assert_eq!(config.kagi.api_key.as_deref(), Some("file-key"));
    assert_eq!(config.kagi.base_url, "https://kagi.com");
    assert!(config.validate().is_ok());
    assert_eq!(config.transport_mode().unwrap(), TransportMode::Http);
}

/// Broken TOML is a configuration error
#[test]
fn test_config_from_invalid_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[server\nport = ").unwrap();

    assert!(matches!(AppConfig::from_file(&path), Err(Error::Config(_))));
}

/// The API key is never written back out
#[test]
fn test_config_serialization_skips_api_key() {
    let config = valid_config();
    let text = toml::to_string(&config).unwrap();
    assert!(!text.contains("api_key"));
}

/// Environment overrides file values
#[test]
fn test_config_load_applies_env() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[kagi]\napi_key = \"file-key\"\n").unwrap();

    temp_env::with_vars(
        [
            ("KAGI_API_KEY", Some("env-key")),
            ("KAGI_MCP_PORT", Some("9191")),
            ("KAGI_MCP_TRANSPORT_MODE", Some("http")),
            ("KAGI_MCP_LOG_LEVEL", Some("debug")),
        ],
        || {
            let config = AppConfig::load(&path).unwrap();
            assert_eq!(config.kagi.api_key.as_deref(), Some("env-key"));
            assert_eq!(config.server.port, 9191);
            assert_eq!(config.server.transport_mode, "http");
            assert_eq!(config.logging.level, "debug");
        },
    );
}

/// A missing file means defaults plus environment
#[test]
fn test_config_load_missing_file() {
    temp_env::with_vars(
        [("KAGI_API_KEY", Some("env-key")), ("KAGI_MCP_PORT", None)],
        || {
            let config = AppConfig::load("/nonexistent/kagi-mcp.toml").unwrap();
            assert_eq!(config.kagi.api_key.as_deref(), Some("env-key"));
            assert_eq!(config.server.port, 8080);
        },
    );
}

/// Invalid port in the environment
#[test]
fn test_config_from_env_invalid_port() {
    temp_env::with_var("KAGI_MCP_PORT", Some("eighty"), || {
        assert!(matches!(AppConfig::from_env(), Err(Error::Config(_))));
    });
}

// ============================================================================
// Errors
// ============================================================================

/// Error messages
#[test]
fn test_error_variants_display() {
    let err = Error::Upstream {
        status: 500,
        body: "server error".to_string(),
    };
    assert_eq!(
        err.to_string(),
        "API request failed with status 500: server error"
    );

    assert_eq!(
        Error::CredentialMissing.to_string(),
        "kagi API key not found in call context"
    );
    assert_eq!(
        Error::InvalidParameter("invalid query parameter".to_string()).to_string(),
        "invalid query parameter"
    );
    assert!(Error::ResponseDecode("eof".to_string())
        .to_string()
        .contains("failed to decode response"));
    assert_eq!(Error::Cancelled.to_string(), "request cancelled");
}

/// Conversion from std::io::Error
#[test]
fn test_error_from_io_error() {
    let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
    let error: Error = io_error.into();
    assert!(matches!(error, Error::Io(_)));
}

// ============================================================================
// Tool definitions
// ============================================================================

fn registry() -> kagi_mcp::tools::ToolRegistry {
    let client = std::sync::Arc::new(kagi_mcp::kagi::KagiClient::new().unwrap());
    kagi_mcp::tools::create_default_registry(&client)
}

/// Both tools are advertised, in order
#[test]
fn test_registry_lists_tools() {
    let registry = registry();
    let names: Vec<_> = registry.get_tools().into_iter().map(|t| t.name).collect();

    assert_eq!(names, vec!["kagi_search", "kagi_summarize"]);
    assert!(registry.has_tool("kagi_search"));
    assert!(!registry.has_tool("kagi_translate"));
}

/// Search schema: required query and a bounded limit
#[test]
fn test_search_tool_schema() {
    let tool = registry()
        .get_tools()
        .into_iter()
        .find(|t| t.name == "kagi_search")
        .unwrap();
    let value = serde_json::to_value(&tool).unwrap();
    let schema = &value["inputSchema"];

    assert_eq!(schema["required"], json!(["query"]));
    assert_eq!(schema["properties"]["query"]["type"], "string");
    assert_eq!(schema["properties"]["limit"]["minimum"].as_f64(), Some(1.0));
    assert_eq!(schema["properties"]["limit"]["maximum"].as_f64(), Some(10.0));
}

/// Summarize schema: required url, enumerated engine and summary type
#[test]
fn test_summarize_tool_schema() {
    let tool = registry()
        .get_tools()
        .into_iter()
        .find(|t| t.name == "kagi_summarize")
        .unwrap();
    let value = serde_json::to_value(&tool).unwrap();
    let properties = &value["inputSchema"]["properties"];

    assert_eq!(value["inputSchema"]["required"], json!(["url"]));
    assert_eq!(
        properties["engine"]["enum"],
        json!(["cecil", "agnes", "muriel"])
    );
    assert_eq!(properties["summary_type"]["enum"], json!(["summary", "takeaway"]));
}

/// Unknown properties leave the schema untouched
#[test]
fn test_with_enum_unknown_property() {
    let original = input_schema::<search::KagiSearchTool>();
    let mut schema = original.clone();

    assert!(!with_enum(&mut schema, "missing", &["a"]));
    assert_eq!(schema, original);

    assert!(with_enum(&mut schema, "query", &["a", "b"]));
    assert_eq!(schema["properties"]["query"]["enum"], json!(["a", "b"]));
}

/// Tools are annotated read-only and open-world
#[test]
fn test_tool_annotations() {
    for tool in registry().get_tools() {
        let annotations = tool.annotations.unwrap();
        assert_eq!(annotations.read_only_hint, Some(true), "{}", tool.name);
        assert_eq!(annotations.open_world_hint, Some(true), "{}", tool.name);
        assert!(tool.title.is_some());
    }
}

/// Schema documents the defaults
#[test]
fn test_tool_schema_defaults() {
    let search = input_schema::<search::KagiSearchTool>();
    assert_eq!(search["properties"]["limit"]["default"], json!(5));

    let summarize = input_schema::<summarize::KagiSummarizeTool>();
    assert_eq!(summarize["properties"]["engine"]["default"], json!("agnes"));
    assert_eq!(summarize["properties"]["summary_type"]["default"], json!("summary"));
    assert!(summarize.get("$schema").is_none());
}

/// Search tool parameters struct
#[test]
fn test_search_tool_params() {
    let params = search::KagiSearchTool {
        query: "rust".to_string(),
        limit: Some(3),
    };
    assert_eq!(params.query, "rust");
    assert_eq!(params.limit, Some(3));
}

/// A path prefix in the base URL survives endpoint resolution
#[test]
fn test_client_base_url_keeps_prefix() {
    let client = kagi_mcp::kagi::KagiClient::builder()
        .base_url("http://localhost:9000/proxy")
        .build()
        .unwrap();
    assert_eq!(client.base_url().as_str(), "http://localhost:9000/proxy/");

    assert!(kagi_mcp::kagi::KagiClient::builder()
        .base_url("not a url")
        .build()
        .is_err());
}

/// Version and name constants
#[test]
fn test_constants() {
    assert!(!kagi_mcp::VERSION.is_empty());
    assert_eq!(kagi_mcp::NAME, "kagi-mcp");
}
