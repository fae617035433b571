//! Report email delivery over authenticated SMTP.
//!
//! Composes a multipart message with the run's artifacts attached and
//! delivers it through a STARTTLS relay. Delivery failure is logged after
//! retries are exhausted but never propagated; the run still completes.

use crate::config::MailConfig;
use crate::error::{PipelineError, Result};
use crate::retry;
use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::path::Path;
use std::time::Duration;
use tracing::{info, warn};

const SEND_ATTEMPTS: u32 = 3;
const SEND_DELAY: Duration = Duration::from_secs(3);

/// Sends the end-of-run report email.
pub struct Notifier {
    config: MailConfig,
}

impl Notifier {
    pub fn new(config: MailConfig) -> Self {
        Self { config }
    }

    /// Send the run report with the given attachments.
    ///
    /// `top_n` is the configured record cap (embedded in the subject),
    /// `batch` the number of records actually retained. Attachment paths
    /// that do not exist on disk are silently omitted.
    pub async fn send_report(&self, top_n: usize, batch: usize, attachments: &[&Path]) {
        let date = chrono::Local::now().format("%Y%m%d");
        let subject = format!("Top {} cited papers - {}", top_n, date);
        let body = format!("Attached are the {} top-cited papers from this run.", batch);

        let message = match self.build_message(&subject, &body, attachments) {
            Ok(message) => message,
            Err(e) => {
                warn!(error = %e, "Failed to build report email");
                return;
            }
        };

        let result =
            retry::with_attempts(SEND_ATTEMPTS, SEND_DELAY, || self.try_send(&message)).await;

        match result {
            Ok(()) => info!(receiver = %self.config.receiver, "Report email sent"),
            Err(e) => warn!(error = %e, "Report email failed after retries"),
        }
    }

    fn build_message(&self, subject: &str, body: &str, attachments: &[&Path]) -> Result<Message> {
        let from = parse_mailbox(&self.config.sender, "sender")?;
        let to = parse_mailbox(&self.config.receiver, "receiver")?;

        let mut multipart = MultiPart::mixed().singlepart(SinglePart::plain(body.to_string()));

        for path in attachments {
            if !path.exists() {
                continue;
            }
            let filename = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "attachment".to_string());
            let content = std::fs::read(path)?;
            let content_type = ContentType::parse("application/octet-stream")
                .map_err(|e| PipelineError::Mail(e.to_string()))?;
            multipart = multipart.singlepart(Attachment::new(filename).body(content, content_type));
        }

        Message::builder()
            .from(from)
            .to(to)
            .subject(subject)
            .multipart(multipart)
            .map_err(|e| PipelineError::Mail(e.to_string()))
    }

    async fn try_send(&self, message: &Message) -> Result<()> {
        let creds = Credentials::new(self.config.sender.clone(), self.config.password.clone());

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.config.smtp_host)
            .map_err(|e| PipelineError::Mail(e.to_string()))?
            .port(self.config.smtp_port)
            .credentials(creds)
            .build();

        mailer
            .send(message.clone())
            .await
            .map_err(|e| PipelineError::Mail(e.to_string()))?;
        Ok(())
    }
}

fn parse_mailbox(address: &str, role: &str) -> Result<Mailbox> {
    address
        .parse::<Mailbox>()
        .map_err(|e| PipelineError::Mail(format!("Invalid {} address '{}': {}", role, address, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn notifier() -> Notifier {
        Notifier::new(MailConfig {
            sender: "sender@example.com".to_string(),
            password: "secret".to_string(),
            receiver: "receiver@example.com".to_string(),
            smtp_host: "smtp.example.com".to_string(),
            smtp_port: 587,
        })
    }

    #[test]
    fn test_missing_attachments_silently_omitted() {
        let dir = tempfile::tempdir().expect("tempdir");
        let present = dir.path().join("papers.csv");
        std::fs::write(&present, b"title\n").expect("write");
        let missing = dir.path().join("pdfs.zip");

        let message = notifier()
            .build_message("subject", "body", &[&present, &missing])
            .expect("message");

        let formatted = String::from_utf8_lossy(&message.formatted()).to_string();
        assert!(formatted.contains("papers.csv"));
        assert!(!formatted.contains("pdfs.zip"));
    }

    #[test]
    fn test_subject_and_body_present() {
        let message = notifier()
            .build_message("Top 100 cited papers - 20260825", "42 papers", &[])
            .expect("message");

        let formatted = String::from_utf8_lossy(&message.formatted()).to_string();
        assert!(formatted.contains("Subject: Top 100 cited papers - 20260825"));
        assert!(formatted.contains("42 papers"));
    }

    #[test]
    fn test_invalid_address_rejected() {
        let mut bad = notifier();
        bad.config.sender = "not an address".to_string();
        assert!(bad.build_message("s", "b", &[]).is_err());
    }
}
