//! Outbound Email
//!
//! The `Mailer` trait used by the reset-token manager, plus three backends:
//!
//! - **`SmtpMailer`** (`smtp`) - async SMTP delivery via lettre
//! - **`LogMailer`** - logs the message instead of sending; the fallback
//!   when SMTP is not configured so the server still starts
//! - **`MemoryMailer`** - records messages for inspection in tests
//!
//! Delivery failures are reported to the caller, who logs and moves on:
//! mail is never retried and never rolls back an account mutation that
//! already happened.

use std::sync::Mutex;

use async_trait::async_trait;
use thiserror::Error;

pub mod smtp;

pub use smtp::SmtpMailer;

/// Errors from an email backend.
#[derive(Debug, Error)]
pub enum MailError {
    #[error("invalid email address: {0}")]
    Address(String),

    #[error("email transport failure: {0}")]
    Transport(String),
}

/// Outbound message dispatcher.
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Send one HTML message. Failures are terminal for the message.
    async fn send(&self, to: &str, subject: &str, html_body: &str) -> Result<(), MailError>;
}

/// Logs outbound messages at info level without delivering them.
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, to: &str, subject: &str, _html_body: &str) -> Result<(), MailError> {
        tracing::info!(to = %to, subject = %subject, "SMTP not configured; logging email instead of sending");
        Ok(())
    }
}

/// A message captured by [`MemoryMailer`].
#[derive(Debug, Clone)]
pub struct SentMail {
    pub to: String,
    pub subject: String,
    pub html_body: String,
}

/// Records every message for later inspection. Test backend.
#[derive(Default)]
pub struct MemoryMailer {
    sent: Mutex<Vec<SentMail>>,
}

impl MemoryMailer {
    pub fn new() -> Self {
        Self::default()
    }

    /// All messages sent so far, in order.
    pub fn sent(&self) -> Vec<SentMail> {
        self.sent.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

#[async_trait]
impl Mailer for MemoryMailer {
    async fn send(&self, to: &str, subject: &str, html_body: &str) -> Result<(), MailError> {
        self.sent
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(SentMail {
                to: to.to_string(),
                subject: subject.to_string(),
                html_body: html_body.to_string(),
            });
        Ok(())
    }
}
