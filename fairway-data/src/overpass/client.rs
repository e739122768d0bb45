//! Reqwest-backed `CourseSource` for the Overpass API.

use std::time::Duration;

use fairway_core::{CourseSource, NetworkError, RadiusQuery, RawElement};
use log::debug;
use reqwest::{Client, StatusCode};
use thiserror::Error;
use tokio::runtime::{Handle, Runtime, RuntimeFlavor};

use super::{dto::OverpassResponseDto, query::build_query};

/// Public Overpass interpreter endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://overpass-api.de/api/interpreter";

/// Default user agent for Overpass requests.
pub const DEFAULT_USER_AGENT: &str = "fairway/0.1";

/// Default HTTP request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Default server-side query timeout in seconds.
pub const DEFAULT_QUERY_TIMEOUT_SECS: u32 = 25;

const PREVIEW_CHAR_LIMIT: usize = 160;

/// Error raised when constructing an [`OverpassClient`].
#[derive(Debug, Error)]
pub enum OverpassBuildError {
    /// Failed to build the HTTP client.
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),
    /// Failed to build the Tokio runtime.
    #[error("failed to build Tokio runtime: {0}")]
    Runtime(#[source] std::io::Error),
}

/// Configuration for [`OverpassClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverpassConfig {
    /// Interpreter URL receiving the POST.
    pub endpoint: String,
    /// HTTP request timeout.
    pub timeout: Duration,
    /// User agent string for requests.
    pub user_agent: String,
    /// Timeout directive embedded in the query text.
    pub query_timeout_secs: u32,
}

impl Default for OverpassConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_owned(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            query_timeout_secs: DEFAULT_QUERY_TIMEOUT_SECS,
        }
    }
}

impl OverpassConfig {
    /// Configuration for a non-default endpoint.
    #[must_use]
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            ..Self::default()
        }
    }

    /// Set the request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the user agent string.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Set the query timeout directive.
    #[must_use]
    pub const fn with_query_timeout_secs(mut self, secs: u32) -> Self {
        self.query_timeout_secs = secs;
        self
    }
}

/// Overpass client issuing one blocking request per fetch.
///
/// # Runtime behaviour
///
/// Outside any Tokio runtime, and inside a `current_thread` runtime, the
/// client blocks on its own runtime. Inside a multi-threaded runtime it
/// blocks on the ambient handle via [`tokio::task::block_in_place`].
pub struct OverpassClient {
    client: Client,
    config: OverpassConfig,
    runtime: Runtime,
}

impl std::fmt::Debug for OverpassClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OverpassClient")
            .field("config", &self.config)
            .field("runtime", &"<tokio::runtime::Runtime>")
            .finish_non_exhaustive()
    }
}

impl OverpassClient {
    /// Client against the public endpoint with default settings.
    ///
    /// # Errors
    /// Returns an error if the HTTP client or Tokio runtime fails to build.
    pub fn new() -> Result<Self, OverpassBuildError> {
        Self::with_config(OverpassConfig::default())
    }

    /// Client with explicit configuration.
    ///
    /// # Errors
    /// Returns an error if the HTTP client or Tokio runtime fails to build.
    pub fn with_config(config: OverpassConfig) -> Result<Self, OverpassBuildError> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .connect_timeout(config.timeout)
            .timeout(config.timeout)
            .build()
            .map_err(OverpassBuildError::HttpClient)?;
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(OverpassBuildError::Runtime)?;
        Ok(Self {
            client,
            config,
            runtime,
        })
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &OverpassConfig {
        &self.config
    }

    async fn fetch_async(&self, query: &RadiusQuery) -> Result<Vec<RawElement>, NetworkError> {
        let url = self.config.endpoint.as_str();
        let text = build_query(query, self.config.query_timeout_secs);
        debug!("POST {url} ({} byte query)", text.len());

        let response = self
            .client
            .post(url)
            .header(reqwest::header::ACCEPT, "application/json")
            .form(&[("data", text)])
            .send()
            .await
            .map_err(|err| self.convert_reqwest_error(&err))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|err| self.convert_reqwest_error(&err))?;
        if !status.is_success() {
            return Err(self.convert_status(status, body.as_ref()));
        }
        parse_elements(body.as_ref())
    }

    fn convert_reqwest_error(&self, error: &reqwest::Error) -> NetworkError {
        let url = self.config.endpoint.clone();
        if error.is_timeout() {
            return NetworkError::Timeout {
                url,
                timeout_secs: self.config.timeout.as_secs(),
            };
        }
        if let Some(status) = error.status() {
            return NetworkError::Http {
                url,
                status: status.as_u16(),
                message: error.to_string(),
            };
        }
        NetworkError::Transport {
            url,
            message: error.to_string(),
        }
    }

    fn convert_status(&self, status: StatusCode, body: &[u8]) -> NetworkError {
        let url = self.config.endpoint.clone();
        match status {
            StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => NetworkError::Timeout {
                url,
                timeout_secs: self.config.timeout.as_secs(),
            },
            _ => NetworkError::Http {
                url,
                status: status.as_u16(),
                message: body_preview(body),
            },
        }
    }
}

impl CourseSource for OverpassClient {
    /// Fetch golf course elements within the query radius.
    ///
    /// Inside a `current_thread` Tokio runtime the client falls back to its
    /// own runtime, which blocks the caller's runtime for the duration of the
    /// request.
    fn fetch(&self, query: &RadiusQuery) -> Result<Vec<RawElement>, NetworkError> {
        let future = self.fetch_async(query);
        match Handle::try_current() {
            Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
                tokio::task::block_in_place(|| handle.block_on(future))
            }
            _ => self.runtime.block_on(future),
        }
    }
}

fn parse_elements(body: &[u8]) -> Result<Vec<RawElement>, NetworkError> {
    let decoded: OverpassResponseDto =
        serde_json::from_slice(body).map_err(|err| NetworkError::Decode {
            message: format!("invalid Overpass JSON payload: {err}"),
        })?;
    Ok(decoded.into_raw_elements())
}

fn body_preview(body: &[u8]) -> String {
    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fairway_core::SourceKind;
    use geo::Coord;
    use rstest::{fixture, rstest};
    use std::net::TcpListener;

    #[fixture]
    fn client() -> OverpassClient {
        OverpassClient::with_config(OverpassConfig::new("http://overpass.test/api/interpreter"))
            .expect("client should build")
    }

    #[fixture]
    fn query() -> RadiusQuery {
        RadiusQuery::new(Coord { x: -75.1652, y: 39.9526 }, 48_280).expect("valid query")
    }

    #[rstest]
    fn default_client_targets_public_interpreter() {
        let client = OverpassClient::new().expect("client should build");
        assert_eq!(client.config(), &OverpassConfig::default());
        assert_eq!(client.config().endpoint, DEFAULT_ENDPOINT);
        assert_eq!(client.config().query_timeout_secs, DEFAULT_QUERY_TIMEOUT_SECS);
    }

    #[rstest]
    #[case(StatusCode::REQUEST_TIMEOUT)]
    #[case(StatusCode::GATEWAY_TIMEOUT)]
    fn timeout_statuses_map_to_timeout(client: OverpassClient, #[case] status: StatusCode) {
        let err = client.convert_status(status, b"");
        assert_eq!(
            err,
            NetworkError::Timeout {
                url: "http://overpass.test/api/interpreter".into(),
                timeout_secs: DEFAULT_TIMEOUT_SECS,
            }
        );
    }

    #[rstest]
    #[case(StatusCode::TOO_MANY_REQUESTS)]
    #[case(StatusCode::BAD_REQUEST)]
    #[case(StatusCode::INTERNAL_SERVER_ERROR)]
    fn other_statuses_keep_code_and_preview(client: OverpassClient, #[case] status: StatusCode) {
        let err = client.convert_status(status, b"{\n  \"remark\": \"runtime error\"\n}");
        match err {
            NetworkError::Http {
                status: code,
                message,
                ..
            } => {
                assert_eq!(code, status.as_u16());
                assert_eq!(message, "{ \"remark\": \"runtime error\" }");
            }
            other => panic!("expected Http error, got {other:?}"),
        }
    }

    #[rstest]
    fn long_bodies_are_truncated() {
        let body = "x".repeat(PREVIEW_CHAR_LIMIT + 10);
        let preview = body_preview(body.as_bytes());
        assert_eq!(preview.chars().count(), PREVIEW_CHAR_LIMIT + 3);
        assert!(preview.ends_with("..."));
    }

    #[rstest]
    fn malformed_json_is_a_decode_error() {
        let err = parse_elements(b"<html>busy</html>").expect_err("not JSON");
        assert!(matches!(err, NetworkError::Decode { .. }));
    }

    #[rstest]
    fn parses_elements_from_body() {
        let elements = parse_elements(
            br#"{"elements":[{"type":"way","id":9,"center":{"lat":40.0,"lon":-75.0},"tags":{"name":"Karakung"}}]}"#,
        )
        .expect("valid body");
        assert_eq!(elements.len(), 1);
        assert_eq!(elements[0].source_ref().kind, SourceKind::Way);
        assert_eq!(elements[0].location(), Some(Coord { x: -75.0, y: 40.0 }));
    }

    #[rstest]
    fn closed_port_is_a_transport_error(query: RadiusQuery) {
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").expect("bind ephemeral port");
            listener.local_addr().expect("local addr").port()
        };
        let endpoint = format!("http://127.0.0.1:{port}/api/interpreter");
        let client = OverpassClient::with_config(
            OverpassConfig::new(endpoint.clone()).with_timeout(Duration::from_secs(2)),
        )
        .expect("client should build");
        let err = client.fetch(&query).expect_err("nothing listens on the port");
        match err {
            NetworkError::Transport { url, .. } => assert_eq!(url, endpoint),
            other => panic!("expected Transport error, got {other:?}"),
        }
    }

    #[rstest]
    fn config_builder_pattern() {
        let config = OverpassConfig::new("http://example.com/api/interpreter")
            .with_timeout(Duration::from_secs(10))
            .with_user_agent("test-agent/1.0")
            .with_query_timeout_secs(5);
        assert_eq!(config.endpoint, "http://example.com/api/interpreter");
        assert_eq!(config.timeout, Duration::from_secs(10));
        assert_eq!(config.user_agent, "test-agent/1.0");
        assert_eq!(config.query_timeout_secs, 5);
    }
}
