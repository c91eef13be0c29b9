//! Threat intelligence API data models
//!
//! This module defines the query sent to the check endpoint and the
//! structures decoded from its responses.

use crate::core::constants::param;
use crate::core::provider::ThreatError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Target of a threat check
///
/// At least one of `domain` or `ip` must be non-empty. Both may be set, in
/// which case they are sent as independent query parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ThreatQuery {
    pub domain: Option<String>,
    pub ip: Option<String>,
}

impl ThreatQuery {
    /// Build a query from raw inputs, treating empty strings as absent
    pub fn new(domain: &str, ip: &str) -> Self {
        let non_empty = |s: &str| (!s.is_empty()).then(|| s.to_string());
        Self {
            domain: non_empty(domain),
            ip: non_empty(ip),
        }
    }

    /// Query for a single domain
    pub fn domain(domain: impl Into<String>) -> Self {
        Self {
            domain: Some(domain.into()),
            ip: None,
        }
    }

    /// Query for a single IP address
    pub fn ip(ip: impl Into<String>) -> Self {
        Self {
            domain: None,
            ip: Some(ip.into()),
        }
    }

    /// Add an IP address to this query
    pub fn with_ip(mut self, ip: impl Into<String>) -> Self {
        self.ip = Some(ip.into());
        self
    }

    /// Query parameters in wire order (domain first), skipping empty values
    pub fn params(&self) -> Vec<(&'static str, &str)> {
        let mut params = Vec::with_capacity(2);
        if let Some(domain) = self.domain.as_deref().filter(|d| !d.is_empty()) {
            params.push((param::DOMAIN, domain));
        }
        if let Some(ip) = self.ip.as_deref().filter(|i| !i.is_empty()) {
            params.push((param::IP, ip));
        }
        params
    }

    /// Ensure the query names at least one target
    ///
    /// # Errors
    ///
    /// Returns `ThreatError::InvalidArgument` when both fields are empty.
    pub fn validate(&self) -> Result<(), ThreatError> {
        if self.params().is_empty() {
            return Err(ThreatError::InvalidArgument(
                "either domain or ip must be provided".to_string(),
            ));
        }
        Ok(())
    }
}

/// Threat report returned by the check endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThreatResult {
    pub risk_score: i64,
    pub verdict: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geo: Option<HashMap<String, serde_json::Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signals: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<HashMap<String, serde_json::Value>>,
    /// Echo of the queried domain, when the server includes it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    /// Echo of the queried IP, when the server includes it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,
    /// Whether the server answered from its own cache
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cached: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub process_time_ms: Option<u64>,
}

impl ThreatResult {
    /// Country reported in the geo block, if any
    pub fn country(&self) -> Option<&str> {
        self.geo.as_ref()?.get("country")?.as_str()
    }

    /// Signals as a slice, empty when the server sent none
    pub fn signal_list(&self) -> &[String] {
        self.signals.as_deref().unwrap_or_default()
    }
}

/// Error body returned with a 4xx/5xx status
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiErrorInfo {
    #[serde(default)]
    pub detail: Option<String>,
}

impl ApiErrorInfo {
    /// Extract the `detail` string from an error body, if it has one
    pub fn detail_from(body: &[u8]) -> Option<String> {
        serde_json::from_slice::<ApiErrorInfo>(body)
            .ok()
            .and_then(|info| info.detail)
    }
}
