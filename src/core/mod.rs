//! Core library modules
//!
//! This module contains configuration, constants, logging, the provider
//! abstraction and the HTTP client.

pub mod client;
pub mod config;
pub mod constants;
pub mod logging;
pub mod provider;
