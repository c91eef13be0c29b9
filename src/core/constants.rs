//! Constants for the threat intelligence API
//!
//! Endpoint defaults, wire field names and the thresholds applied on top of
//! the server's risk score.

use std::time::Duration;

/// Endpoint constants
pub mod endpoint {
    /// Production API base URL
    pub const DEFAULT_BASE_URL: &str = "https://threats.cyberapi.io/api/v1";

    /// Path segment of the check endpoint
    pub const CHECK_PATH: &str = "check";
}

/// Request header constants
pub mod header {
    /// Header carrying the API key
    pub const API_KEY: &str = "X-API-Key";

    /// Accepted response media type
    pub const ACCEPT_JSON: &str = "application/json";

    /// User agent sent with every request
    pub const USER_AGENT: &str = concat!("CyberAPI-Rust/", env!("CARGO_PKG_VERSION"));
}

/// Query parameter constants
pub mod param {
    pub const DOMAIN: &str = "domain";
    pub const IP: &str = "ip";
}

/// Total request timeout applied to the transport
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Risk score at or above which a target counts as malicious
pub const MALICIOUS_THRESHOLD: i64 = 80;

/// Environment variable the binary reads the API key from
pub const API_KEY_ENV: &str = "CYBERAPI_KEY";

/// Key used when no API key is configured anywhere
pub const PLACEHOLDER_API_KEY: &str = "demo";
