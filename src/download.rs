//! PDF retrieval with bounded retry and idempotent resume.
//!
//! Downloads are streamed to disk in chunks; the destination file is only
//! created after a 200 response, and a mid-stream failure removes the
//! partial file, so a failed attempt never leaves anything behind.

use crate::error::{PipelineError, Result};
use crate::record::PaperRecord;
use crate::retry;
use futures::StreamExt;
use reqwest::StatusCode;
use std::path::Path;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

/// Browser-like identity; some hosts refuse default client agents.
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64)";

const ATTEMPTS: u32 = 3;
const RETRY_DELAY: Duration = Duration::from_secs(2);

/// Sanitized filename components are capped at this length.
const MAX_FILENAME_CHARS: usize = 100;

/// Streaming HTTP downloader for binary artifacts.
pub struct Downloader {
    http: reqwest::Client,
}

impl Downloader {
    pub fn new() -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| PipelineError::Config(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { http })
    }

    /// Fetch `url` into `dest`, returning whether the file is present.
    ///
    /// An existing destination is reported as success with zero network I/O,
    /// which makes interrupted runs safely resumable. Otherwise up to three
    /// attempts are made with a fixed pause between them; exhausted retries
    /// leave no file at the destination.
    pub async fn fetch(&self, url: &str, dest: &Path) -> bool {
        if dest.exists() {
            debug!(dest = %dest.display(), "Already downloaded, skipping");
            return true;
        }

        let result = retry::with_attempts(ATTEMPTS, RETRY_DELAY, || self.try_download(url, dest)).await;

        match result {
            Ok(()) => true,
            Err(e) => {
                warn!(url = %url, error = %e, "Download failed after retries");
                false
            }
        }
    }

    async fn try_download(&self, url: &str, dest: &Path) -> Result<()> {
        let response = self.http.get(url).send().await?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(PipelineError::Api {
                code: status.as_u16() as i32,
                message: format!("HTTP error: {}", status),
            });
        }

        if let Err(e) = stream_to_file(response, dest).await {
            // A failed attempt must not leave a partial file.
            let _ = tokio::fs::remove_file(dest).await;
            return Err(e);
        }
        Ok(())
    }
}

/// Stream the response body to `dest` in chunks.
async fn stream_to_file(response: reqwest::Response, dest: &Path) -> Result<()> {
    let mut file = tokio::fs::File::create(dest).await?;
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let bytes = chunk?;
        file.write_all(&bytes).await?;
    }
    file.flush().await?;
    Ok(())
}

/// Replace characters illegal on common filesystems with `_`, collapse
/// whitespace runs, and cap the length.
pub fn safe_filename(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| match c {
            '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*' => '_',
            c if (c as u32) < 0x20 => '_',
            c => c,
        })
        .collect();
    let collapsed = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed.chars().take(MAX_FILENAME_CHARS).collect()
}

/// Compose the on-disk name for a record's PDF:
/// `{year}_{firstAuthor}_{title}.pdf`.
pub fn pdf_filename(record: &PaperRecord) -> String {
    let first_author = record.authors.split(',').next().unwrap_or_default();
    format!(
        "{}_{}_{}.pdf",
        record.year,
        safe_filename(first_author),
        safe_filename(&record.title)
    )
}
