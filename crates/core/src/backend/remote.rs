use super::{QueryExecutor, StatementOutput};
use async_trait::async_trait;
use plansweep_common::config::{ProxySettings, RetrySettings};
use plansweep_common::retry::retry_async;
use plansweep_error::{ErrorCode, ErrorContext, Result, SweepError};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Client for the HTTP query proxy (`POST /query`, `GET /ping`).
pub struct RemoteBackend {
    client: Client,
    base_url: String,
    ping_timeout: Duration,
    retry: RetrySettings,
}

#[derive(Serialize)]
struct QueryRequest<'a> {
    sql: &'a str,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

#[derive(Deserialize)]
struct PingBody {
    #[serde(default)]
    ok: bool,
    error: Option<String>,
}

impl RemoteBackend {
    pub fn new(settings: &ProxySettings) -> Result<Self> {
        reqwest::Url::parse(&settings.url).map_err(|e| {
            SweepError::config(
                ErrorCode::InvalidProxyUrl,
                format!("Invalid proxy URL '{}': {}", settings.url, e),
            )
        })?;

        let client = Client::builder()
            .timeout(Duration::from_millis(settings.request_timeout_ms))
            .build()
            .map_err(|e| {
                SweepError::new(
                    ErrorCode::Internal,
                    format!("Failed to build HTTP client: {e}"),
                )
            })?;

        Ok(Self {
            client,
            base_url: settings.url.trim_end_matches('/').to_string(),
            ping_timeout: Duration::from_millis(settings.ping_timeout_ms),
            retry: settings.retry,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }
}

#[async_trait]
impl QueryExecutor for RemoteBackend {
    async fn run_statement(&self, sql: &str) -> Result<StatementOutput> {
        let url = self.endpoint("query");
        let body = QueryRequest { sql };

        let response = retry_async(
            "proxy query",
            self.retry,
            || self.client.post(&url).json(&body).send(),
            is_transient,
        )
        .await
        .map_err(|e| transport_error(&url, &e))?;

        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| transport_error(&url, &e))?;

        if status.is_success() {
            return serde_json::from_slice(&bytes).map_err(|e| {
                SweepError::connectivity(
                    ErrorCode::MalformedResponse,
                    format!("Proxy returned an unreadable result: {e}"),
                )
                .with_context(http_context(&url, Some(status)))
            });
        }

        // The proxy reports engine failures as `{ "error": ... }` with a 5xx status.
        match serde_json::from_slice::<ErrorBody>(&bytes)
            .ok()
            .and_then(|b| b.error)
        {
            Some(message) => Err(SweepError::execution(message).with_context(ErrorContext::Statement {
                sql: sql.to_string(),
            })),
            None => Err(status_error(&url, status)),
        }
    }

    async fn ping(&self) -> Result<()> {
        let url = self.endpoint("ping");
        let response = self
            .client
            .get(&url)
            .query(&[("backend", "proxy")])
            .timeout(self.ping_timeout)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    SweepError::connectivity(
                        ErrorCode::ConnectionTimeout,
                        format!("Connection timed out ({})", format_timeout(self.ping_timeout)),
                    )
                    .with_context(http_context(&url, None))
                } else {
                    transport_error(&url, &e)
                }
            })?;

        let status = response.status();
        let bytes = response.bytes().await.unwrap_or_default();

        if !status.is_success() {
            return Err(match serde_json::from_slice::<PingBody>(&bytes)
                .ok()
                .and_then(|b| b.error)
            {
                Some(error) => SweepError::connectivity(
                    ErrorCode::HttpStatus,
                    format!("Server error: {error}"),
                )
                .with_context(http_context(&url, Some(status))),
                None => status_error(&url, status),
            });
        }

        let body: PingBody = serde_json::from_slice(&bytes).map_err(|e| {
            SweepError::connectivity(
                ErrorCode::MalformedResponse,
                format!("Proxy returned an unreadable ping response: {e}"),
            )
            .with_context(http_context(&url, Some(status)))
        })?;

        if body.ok {
            return Ok(());
        }
        let message = match body.error {
            Some(error) => format!("Server error: {error}"),
            None => "Unknown error".to_string(),
        };
        Err(SweepError::connectivity(ErrorCode::HttpStatus, message)
            .with_context(http_context(&url, Some(status))))
    }

    fn name(&self) -> &'static str {
        "proxy"
    }
}

// Only a failed connect guarantees the proxy never saw the statement. A
// timed-out request may still have run, and statements are not idempotent.
fn is_transient(e: &reqwest::Error) -> bool {
    e.is_connect()
}

fn transport_error(url: &str, e: &reqwest::Error) -> SweepError {
    let code = if e.is_timeout() {
        ErrorCode::ConnectionTimeout
    } else if e.is_decode() || e.is_body() {
        ErrorCode::MalformedResponse
    } else {
        ErrorCode::ProxyUnreachable
    };
    SweepError::connectivity(code, e.to_string())
        .with_context(http_context(url, e.status()))
        .with_hint("Check that the query proxy is running and reachable")
}

fn status_error(url: &str, status: StatusCode) -> SweepError {
    SweepError::connectivity(
        ErrorCode::HttpStatus,
        format!("HTTP error: {}", status.as_u16()),
    )
    .with_context(http_context(url, Some(status)))
}

fn http_context(url: &str, status: Option<StatusCode>) -> ErrorContext {
    ErrorContext::Http {
        url: url.to_string(),
        status: status.map(|s| s.as_u16()),
    }
}

fn format_timeout(timeout: Duration) -> String {
    if timeout.subsec_millis() == 0 {
        format!("{}s", timeout.as_secs())
    } else {
        format!("{}ms", timeout.as_millis())
    }
}
