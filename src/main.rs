//! scholarpipe - Automated literature search, ranking, export and delivery.
//!
//! Sequential batch pipeline: query -> fetch -> normalize -> dedup/filter/rank
//! -> export -> download -> archive -> notify.
//!
//! ## Usage
//!
//! ```bash
//! export SERPAPI_KEY=...
//! scholarpipe -q '"ICESat-2" "deep learning"' -q '"photon point cloud"'
//! ```

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use scholarpipe::config::{Config, MailConfig};
use scholarpipe::record::{PaperRecord, Source};
use scholarpipe::search::SearchClient;
use scholarpipe::{archive, download, export, notify, rank};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, Level};
use tracing_subscriber::{fmt, EnvFilter};

/// Courtesy delay after every attempted download
const DOWNLOAD_DELAY: Duration = Duration::from_secs(1);

/// Automated literature search, ranking, export and delivery pipeline
#[derive(Parser)]
#[command(name = "scholarpipe")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Search query (repeatable; each runs on both channels)
    #[arg(short, long = "query", required = true)]
    queries: Vec<String>,

    /// SerpAPI key
    #[arg(long, env = "SERPAPI_KEY")]
    api_key: String,

    /// Earliest acceptable publication year
    #[arg(long, default_value_t = 2018)]
    min_year: i32,

    /// Minimum citation count
    #[arg(long, default_value_t = 10)]
    min_citations: u32,

    /// Pages fetched per query on the scholar channel
    #[arg(long, default_value_t = 5)]
    scholar_pages: u32,

    /// Pages fetched per query on the arXiv channel
    #[arg(long, default_value_t = 5)]
    arxiv_pages: u32,

    /// Number of records retained after ranking
    #[arg(long, default_value_t = 100)]
    top_n: usize,

    /// Output directory
    #[arg(short, long, default_value = "retrieved_papers")]
    output: PathBuf,

    /// Sender address for the report email
    #[arg(long, env = "MAIL_SENDER")]
    mail_sender: Option<String>,

    /// SMTP password or provider authorization code
    #[arg(long, env = "MAIL_PASSWORD")]
    mail_password: Option<String>,

    /// Recipient of the report email
    #[arg(long, env = "MAIL_RECEIVER")]
    mail_receiver: Option<String>,

    /// SMTP relay host
    #[arg(long, default_value = "smtp.qq.com")]
    smtp_host: String,

    /// SMTP relay port (explicit STARTTLS)
    #[arg(long, default_value_t = 587)]
    smtp_port: u16,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

impl Cli {
    fn into_config(self) -> Config {
        let mail = match (self.mail_sender, self.mail_password, self.mail_receiver) {
            (Some(sender), Some(password), Some(receiver)) => Some(MailConfig {
                sender,
                password,
                receiver,
                smtp_host: self.smtp_host,
                smtp_port: self.smtp_port,
            }),
            _ => None,
        };

        Config {
            api_key: self.api_key,
            queries: self.queries,
            min_year: self.min_year,
            min_citations: self.min_citations,
            scholar_pages: self.scholar_pages,
            arxiv_pages: self.arxiv_pages,
            top_n: self.top_n,
            output_dir: self.output,
            mail,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.debug { Level::DEBUG } else { Level::INFO };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level.to_string()));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .init();

    let config = cli.into_config();
    run_pipeline(&config).await
}

async fn run_pipeline(config: &Config) -> Result<()> {
    std::fs::create_dir_all(config.pdf_dir()).context("Failed to create output directory")?;

    let client = SearchClient::new(config.api_key.clone(), config.min_year, config.min_citations)?;

    // ===========================================
    // STAGE 1 & 2: Search both channels
    // ===========================================
    let mut corpus: Vec<PaperRecord> = Vec::new();

    println!("--- Stage 1: Scholar Search ---");
    for query in &config.queries {
        println!("  Query: {}", query);
        corpus.extend(client.search(query, config.scholar_pages, Source::Scholar).await);
    }

    println!("\n--- Stage 2: arXiv Search ---");
    for query in &config.queries {
        println!("  Query: {}", query);
        corpus.extend(client.search(query, config.arxiv_pages, Source::Arxiv).await);
    }

    if corpus.is_empty() {
        println!("\nNo papers found.");
        return Ok(());
    }
    println!("\nCollected {} raw records.", corpus.len());

    // ===========================================
    // STAGE 3: Rank and truncate
    // ===========================================
    let top = rank::rank(corpus, config.min_year, config.top_n);
    println!("Retained {} papers after ranking.", top.len());

    // ===========================================
    // STAGE 4: Export table and bibliography
    // ===========================================
    let date = Local::now().format("%Y%m%d").to_string();
    let csv_path = config.export_path(&date, "csv");
    let bib_path = config.export_path(&date, "bib");
    export::write_csv(&csv_path, &top)?;
    export::write_bibtex(&bib_path, &top)?;

    // ===========================================
    // STAGE 5: Download PDFs
    // ===========================================
    println!("\n--- Stage 5: PDF Download ---");
    let downloader = download::Downloader::new()?;
    let pdf_dir = config.pdf_dir();

    let mut attempted = 0;
    let mut fetched = 0;
    for record in &top {
        if record.pdf_link.is_empty() {
            continue;
        }
        attempted += 1;
        let dest = pdf_dir.join(download::pdf_filename(record));
        if dest.exists() {
            fetched += 1;
            continue;
        }
        if downloader.fetch(&record.pdf_link, &dest).await {
            fetched += 1;
        }
        tokio::time::sleep(DOWNLOAD_DELAY).await;
    }
    println!("Downloaded {}/{} PDFs.", fetched, attempted);

    // ===========================================
    // STAGE 6: Archive
    // ===========================================
    let archive_path = config.archive_path();
    let entries = archive::archive_dir(&pdf_dir, &archive_path)?;
    println!("Archived {} files into {}.", entries, archive_path.display());

    // ===========================================
    // STAGE 7: Report email
    // ===========================================
    if let Some(mail) = &config.mail {
        println!("\nSending report to {}...", mail.receiver);
        let notifier = notify::Notifier::new(mail.clone());
        notifier
            .send_report(config.top_n, top.len(), &[&csv_path, &bib_path, &archive_path])
            .await;
    } else {
        info!("Mail settings not configured, skipping report email");
    }

    println!("\n✓ Pipeline complete. Results in: {}", config.output_dir.display());
    Ok(())
}
