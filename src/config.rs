//! Run configuration assembled from CLI flags and environment.
//!
//! One immutable structure passed by reference into each stage, so the
//! stages stay independently testable.

use std::path::PathBuf;

/// Mail relay settings. The whole block is optional; without it the report
/// email stage is skipped.
#[derive(Debug, Clone)]
pub struct MailConfig {
    /// Sender address, also the SMTP username
    pub sender: String,
    /// Password or provider authorization code
    pub password: String,
    pub receiver: String,
    pub smtp_host: String,
    pub smtp_port: u16,
}

/// Immutable configuration for one pipeline run.
#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: String,
    pub queries: Vec<String>,
    /// Earliest acceptable publication year
    pub min_year: i32,
    /// Minimum citation threshold
    pub min_citations: u32,
    pub scholar_pages: u32,
    pub arxiv_pages: u32,
    /// Retained record cap after ranking
    pub top_n: usize,
    pub output_dir: PathBuf,
    pub mail: Option<MailConfig>,
}

impl Config {
    /// Directory the PDFs land in.
    pub fn pdf_dir(&self) -> PathBuf {
        self.output_dir.join("pdfs")
    }

    /// Path of the zip bundle.
    pub fn archive_path(&self) -> PathBuf {
        self.output_dir.join("pdfs.zip")
    }

    /// Path of a dated export file, e.g. `papers_top100_20260825.csv`.
    pub fn export_path(&self, date: &str, extension: &str) -> PathBuf {
        self.output_dir
            .join(format!("papers_top{}_{}.{}", self.top_n, date, extension))
    }
}
