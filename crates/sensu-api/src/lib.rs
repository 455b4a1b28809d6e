//! Typed client for the Sensu check results API.
#![forbid(unsafe_code)]
//!
//! `sensu-api` decodes the `GET /results` endpoint of a Sensu API server into
//! [`CheckResult`] records. It performs exactly one request per call and
//! never retries; callers decide what a failure means for them.
//!
//! # Example
//!
//! ```rust,no_run
//! use sensu_api::{ClientConfig, SensuClient};
//! use std::time::Duration;
//!
//! # async fn run() -> sensu_api::Result<()> {
//! let config = ClientConfig::new("http://localhost:4567")
//!     .with_timeout(Duration::from_secs(5));
//! let client = SensuClient::new(config)?;
//!
//! for result in client.fetch_results().await? {
//!     println!("{} {} -> {}", result.client, result.check.name, result.check.status);
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod client;
pub mod error;
pub mod types;

pub use client::{ClientConfig, SensuClient, DEFAULT_API_URL, DEFAULT_TIMEOUT, RESULTS_PATH};
pub use error::{ApiError, Result};
pub use types::{Check, CheckResult};
