//! Client for the CyberAPI threat intelligence service
//!
//! Sends one authenticated GET to the check endpoint per call and decodes
//! the JSON report into a [`ThreatResult`].
//!
//! ```no_run
//! # async fn run() -> Result<(), cyberapi::ThreatError> {
//! let client = cyberapi::ThreatQueryClient::new("your_api_key");
//! let result = client.check("example.com", "").await?;
//! println!("{} ({})", result.verdict, result.risk_score);
//! # Ok(())
//! # }
//! ```

pub mod core;
pub mod models;

pub use crate::core::client::ThreatQueryClient;
pub use crate::core::config::ClientConfig;
pub use crate::core::provider::{ThreatError, ThreatProvider};
pub use crate::models::threat::{ApiErrorInfo, ThreatQuery, ThreatResult};
