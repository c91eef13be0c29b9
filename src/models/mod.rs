//! API data models
//!
//! This module contains data structures for the threat intelligence API.

pub mod threat;
