//! Threat intelligence API client
//!
//! This module provides an async HTTP client for the check endpoint. Each
//! call is a single GET with no retries and no caching; the underlying
//! `reqwest::Client` is shared and safe to use from concurrent tasks.

use crate::core::config::ClientConfig;
use crate::core::constants::{endpoint, header};
use crate::core::provider::{ThreatError, ThreatProvider};
use crate::models::threat::{ApiErrorInfo, ThreatQuery, ThreatResult};
use async_trait::async_trait;
use reqwest::header::{ACCEPT, USER_AGENT};
use reqwest::{Client, Url};
use tracing::debug;

/// Client for the threat intelligence check endpoint
#[derive(Debug, Clone)]
pub struct ThreatQueryClient {
    client: Client,
    config: ClientConfig,
}

impl ThreatQueryClient {
    /// Create a client for the production endpoint with a 10 second timeout
    ///
    /// # Arguments
    ///
    /// * `api_key` - API key sent as `X-API-Key`
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::from_config(ClientConfig::new(api_key))
    }

    /// Create a client from explicit settings
    pub fn from_config(config: ClientConfig) -> Self {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self::with_http_client(config, client)
    }

    /// Create a client around a caller-supplied transport
    ///
    /// `config.timeout` is not applied to `client`; configure it on the
    /// transport itself.
    pub fn with_http_client(config: ClientConfig, client: Client) -> Self {
        Self { client, config }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Check a domain and/or IP; empty strings are treated as absent
    ///
    /// # Errors
    ///
    /// Returns `ThreatError::InvalidArgument` when both are empty, before
    /// any request is made.
    pub async fn check(&self, domain: &str, ip: &str) -> Result<ThreatResult, ThreatError> {
        self.check_query(&ThreatQuery::new(domain, ip)).await
    }

    /// Quick check whether the target's risk score is at least 80
    pub async fn is_malicious(&self, domain: &str, ip: &str) -> Result<bool, ThreatError> {
        ThreatProvider::is_malicious(self, &ThreatQuery::new(domain, ip)).await
    }

    /// Signals detected for the target
    pub async fn signals(&self, domain: &str, ip: &str) -> Result<Vec<String>, ThreatError> {
        ThreatProvider::signals(self, &ThreatQuery::new(domain, ip)).await
    }

    /// URL the check endpoint would be called with for `query`
    pub fn request_url(&self, query: &ThreatQuery) -> Result<Url, ThreatError> {
        query.validate()?;

        let base = format!(
            "{}/{}",
            self.config.trimmed_base_url(),
            endpoint::CHECK_PATH
        );

        Url::parse_with_params(&base, query.params())
            .map_err(|e| ThreatError::InvalidArgument(format!("invalid base URL {}: {}", base, e)))
    }

    /// Check a typed query against the API
    ///
    /// # Errors
    ///
    /// * `InvalidArgument` - the query names no target
    /// * `Transport` - connect, DNS, TLS or timeout failure
    /// * `Api` - status >= 400, carrying the server's `detail` or `HTTP <status>`
    /// * `Decode` - a success body that is not a threat report
    pub async fn check_query(&self, query: &ThreatQuery) -> Result<ThreatResult, ThreatError> {
        let url = self.request_url(query)?;

        debug!(url = %url, "Querying threat intelligence API");

        let response = self
            .client
            .get(url)
            .header(header::API_KEY, &self.config.api_key)
            .header(ACCEPT, header::ACCEPT_JSON)
            .header(USER_AGENT, header::USER_AGENT)
            .send()
            .await?;

        let status = response.status();
        let body = response.bytes().await?;

        if status.as_u16() >= 400 {
            let message = ApiErrorInfo::detail_from(&body)
                .unwrap_or_else(|| format!("HTTP {}", status.as_u16()));
            return Err(ThreatError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let result: ThreatResult = serde_json::from_slice(&body)?;

        debug!(
            risk_score = result.risk_score,
            verdict = %result.verdict,
            "Threat lookup complete"
        );

        Ok(result)
    }
}

#[async_trait]
impl ThreatProvider for ThreatQueryClient {
    async fn lookup(&self, query: &ThreatQuery) -> Result<ThreatResult, ThreatError> {
        self.check_query(query).await
    }

    fn provider_name(&self) -> &str {
        "cyberapi"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use std::time::Duration;
    use tracing_test::traced_test;

    fn test_client(url: &str) -> ThreatQueryClient {
        ThreatQueryClient::from_config(ClientConfig::new("test-key").with_base_url(url))
    }

    fn domain_query(domain: &str) -> Matcher {
        Matcher::UrlEncoded("domain".into(), domain.into())
    }

    #[test]
    fn test_new_uses_defaults() {
        let client = ThreatQueryClient::new("k");
        assert_eq!(client.config().base_url, "https://threats.cyberapi.io/api/v1");
        assert_eq!(client.config().timeout, Duration::from_secs(10));
        assert_eq!(client.provider_name(), "cyberapi");
    }

    #[test]
    fn test_request_url_encodes_both_params() {
        let client = test_client("http://localhost:1234/api/v1/");
        let query = ThreatQuery::new("example.com", "1.2.3.4");
        let url = client.request_url(&query).unwrap();
        assert_eq!(url.path(), "/api/v1/check");
        assert_eq!(url.query(), Some("domain=example.com&ip=1.2.3.4"));

        let query = ThreatQuery::domain("a b&c=d.example");
        let url = client.request_url(&query).unwrap();
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(
            pairs,
            vec![("domain".to_string(), "a b&c=d.example".to_string())]
        );
    }

    #[test]
    fn test_request_url_rejects_bad_base() {
        let client = test_client("not a url");
        let err = client
            .request_url(&ThreatQuery::domain("example.com"))
            .unwrap_err();
        assert!(matches!(err, ThreatError::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn test_empty_query_fails_before_network() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/check")
            .match_query(Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let client = test_client(&server.url());
        let err = client.check("", "").await.unwrap_err();
        assert!(matches!(err, ThreatError::InvalidArgument(_)));
        mock.assert_async().await;
    }

    #[tokio::test]
    #[traced_test]
    async fn test_check_success() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/check")
            .match_query(domain_query("evil.example"))
            .match_header("x-api-key", "test-key")
            .match_header("accept", "application/json")
            .match_header("user-agent", Matcher::Regex("^CyberAPI-Rust/".into()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"risk_score": 87, "verdict": "malicious"}"#)
            .create_async()
            .await;

        let client = test_client(&server.url());
        let result = client.check("evil.example", "").await.unwrap();
        assert_eq!(result.risk_score, 87);
        assert_eq!(result.verdict, "malicious");
        assert!(result.geo.is_none());
        assert!(result.signals.is_none());
        assert!(result.details.is_none());
        mock.assert_async().await;
        assert!(logs_contain("Querying threat intelligence API"));
    }

    #[tokio::test]
    async fn test_check_sends_domain_and_ip() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/check")
            .match_query(Matcher::AllOf(vec![
                domain_query("example.com"),
                Matcher::UrlEncoded("ip".into(), "1.2.3.4".into()),
            ]))
            .with_status(200)
            .with_body(r#"{"risk_score": 5, "verdict": "clean", "domain": "example.com", "ip": "1.2.3.4"}"#)
            .create_async()
            .await;

        // trailing slash on the base URL must not double up
        let client = test_client(&format!("{}/", server.url()));
        let result = client.check("example.com", "1.2.3.4").await.unwrap();
        assert_eq!(result.domain.as_deref(), Some("example.com"));
        assert_eq!(result.ip.as_deref(), Some("1.2.3.4"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_api_error_with_detail() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/check")
            .match_query(Matcher::Any)
            .with_status(403)
            .with_body(r#"{"detail": "invalid api key"}"#)
            .create_async()
            .await;

        let client = test_client(&server.url());
        let err = client.check("example.com", "").await.unwrap_err();
        match &err {
            ThreatError::Api { status, message } => {
                assert_eq!(*status, 403);
                assert_eq!(message, "invalid api key");
            }
            other => panic!("expected api error, got {:?}", other),
        }
        assert_eq!(err.to_string(), "invalid api key");
        assert!(err.is_client_error());
    }

    #[tokio::test]
    async fn test_api_error_without_detail() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/check")
            .match_query(Matcher::Any)
            .with_status(500)
            .with_body("Internal Server Error")
            .create_async()
            .await;

        let client = test_client(&server.url());
        let err = client.check("", "1.2.3.4").await.unwrap_err();
        assert!(matches!(
            &err,
            ThreatError::Api { status: 500, message } if message == "HTTP 500"
        ));
        assert!(err.is_server_error());
        assert_eq!(err.status_code(), Some(500));
    }

    #[tokio::test]
    async fn test_api_error_with_detail_less_json() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/check")
            .match_query(Matcher::Any)
            .with_status(429)
            .with_body(r#"{"error": "slow down"}"#)
            .create_async()
            .await;

        let client = test_client(&server.url());
        let err = client.check("example.com", "").await.unwrap_err();
        assert_eq!(err.to_string(), "HTTP 429");
    }

    #[tokio::test]
    async fn test_malformed_body_is_decode_error() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/check")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"risk_score": 87, "verdict": "#)
            .create_async()
            .await;

        let client = test_client(&server.url());
        let err = client.check("example.com", "").await.unwrap_err();
        assert!(matches!(err, ThreatError::Decode(_)));
    }

    #[tokio::test]
    async fn test_repeated_checks_are_independent() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/check")
            .match_query(domain_query("example.com"))
            .with_status(200)
            .with_body(
                r#"{"risk_score": 40, "verdict": "suspicious",
                    "geo": {"country": "NL"}, "signals": ["young_domain"],
                    "details": {"registrar": "x", "age_days": 3}}"#,
            )
            .expect(2)
            .create_async()
            .await;

        let client = test_client(&server.url());
        let first = client.check("example.com", "").await.unwrap();
        let second = client.check("example.com", "").await.unwrap();
        assert_eq!(first, second);
        assert_eq!(first.country(), Some("NL"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_concurrent_checks_share_client() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/check")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"risk_score": 1, "verdict": "clean"}"#)
            .expect(3)
            .create_async()
            .await;

        let client = test_client(&server.url());
        let (a, b, c) = tokio::join!(
            client.check("a.example", ""),
            client.check("b.example", ""),
            client.check("", "9.9.9.9"),
        );
        assert!(a.is_ok() && b.is_ok() && c.is_ok());
    }

    #[tokio::test]
    async fn test_is_malicious_and_signals() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/check")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"risk_score": 80, "verdict": "malicious", "signals": ["phishing"]}"#)
            .create_async()
            .await;

        let client = test_client(&server.url());
        assert!(client.is_malicious("evil.example", "").await.unwrap());
        assert_eq!(
            client.signals("evil.example", "").await.unwrap(),
            vec!["phishing".to_string()]
        );
    }

    #[tokio::test]
    async fn test_connection_failure_is_transport_error() {
        // nothing listens on port 1
        let client = test_client("http://127.0.0.1:1");
        let err = client.check("example.com", "").await.unwrap_err();
        assert!(matches!(err, ThreatError::Transport(_)));
        assert!(err.status_code().is_none());
        assert!(!err.is_timeout());
    }

    #[tokio::test]
    async fn test_slow_server_is_transport_timeout() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        // accept and hold the connection without ever answering
        let server = tokio::spawn(async move {
            let (_socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(5)).await;
        });

        let client = ThreatQueryClient::from_config(
            ClientConfig::new("test-key")
                .with_base_url(format!("http://{}", addr))
                .with_timeout(Duration::from_millis(200)),
        );
        let err = client.check("example.com", "").await.unwrap_err();
        assert!(matches!(err, ThreatError::Transport(_)));
        assert!(err.is_timeout());
        assert!(err.status_code().is_none());
        server.abort();
    }
}
