//! Provider abstraction for threat intelligence lookups
//!
//! This module defines the error taxonomy shared by every lookup and a
//! common trait so applications can swap the HTTP client for a fake.

use crate::core::constants::MALICIOUS_THRESHOLD;
use crate::models::threat::{ThreatQuery, ThreatResult};
use async_trait::async_trait;
use thiserror::Error;

/// Error types for threat lookups
#[derive(Debug, Error)]
pub enum ThreatError {
    /// Neither domain nor ip was supplied, or the base URL is unusable
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// DNS, connect, TLS or timeout failure
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered with status >= 400
    #[error("{message}")]
    Api { status: u16, message: String },

    /// A success response whose body is not a threat report
    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ThreatError {
    /// HTTP status of an API error
    pub fn status_code(&self) -> Option<u16> {
        match self {
            ThreatError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// True for 4xx API errors
    pub fn is_client_error(&self) -> bool {
        matches!(self, ThreatError::Api { status, .. } if (400..500).contains(status))
    }

    /// True for 5xx API errors
    pub fn is_server_error(&self) -> bool {
        matches!(self, ThreatError::Api { status, .. } if *status >= 500)
    }

    /// True when the transport gave up after the request timeout
    pub fn is_timeout(&self) -> bool {
        matches!(self, ThreatError::Transport(e) if e.is_timeout())
    }
}

/// Trait for threat intelligence sources
#[async_trait]
pub trait ThreatProvider: Send + Sync {
    /// Look up the reputation of a domain and/or IP
    async fn lookup(&self, query: &ThreatQuery) -> Result<ThreatResult, ThreatError>;

    /// Get the provider name
    fn provider_name(&self) -> &str;

    /// Whether the target's risk score reaches the malicious threshold
    async fn is_malicious(&self, query: &ThreatQuery) -> Result<bool, ThreatError> {
        let result = self.lookup(query).await?;
        Ok(result.risk_score >= MALICIOUS_THRESHOLD)
    }

    /// Signals reported for the target, empty when the server sent none
    async fn signals(&self, query: &ThreatQuery) -> Result<Vec<String>, ThreatError> {
        let result = self.lookup(query).await?;
        Ok(result.signals.unwrap_or_default())
    }
}
