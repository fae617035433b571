//! # scholarpipe
//!
//! Automated literature search, ranking, export and delivery pipeline.
//!
//! ## Modules
//!
//! - [`search`] - SerpAPI Google Scholar client for both channels
//! - [`record`] - Paper record model and raw-item normalization
//! - [`rank`] - Deduplication, filtering and Top-N ranking
//! - [`export`] - CSV and BibTeX writers
//! - [`download`] - Idempotent, retried PDF fetch
//! - [`archive`] - Zip bundling of downloaded PDFs
//! - [`notify`] - Report email over authenticated SMTP
//! - [`retry`] - Bounded fixed-delay retry helper
//! - [`config`] - Immutable run configuration
//! - [`error`] - Custom error types
//!
//! ## Usage
//!
//! ```rust,no_run
//! use scholarpipe::record::Source;
//! use scholarpipe::search::SearchClient;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = SearchClient::new("api-key".to_string(), 2018, 10)?;
//!     let results = client.search("photon point cloud", 5, Source::Scholar).await;
//!     println!("Found {} results", results.len());
//!     Ok(())
//! }
//! ```

pub mod archive;
pub mod config;
pub mod download;
pub mod error;
pub mod export;
pub mod notify;
pub mod rank;
pub mod record;
pub mod retry;
pub mod search;

pub use error::{PipelineError, Result};
