//! Email channel — SMTP submission over STARTTLS.
//!
//! Sends one `multipart/alternative` message (plain text + HTML) from the
//! SMTP login to the configured recipient. Subject is
//! `"{title} — YYYY-MM-DD"`.

use async_trait::async_trait;
use lettre::message::{Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use minion_config::EmailConfig;
use minion_core::channel::Channel;
use minion_core::digest::Digest;
use minion_core::error::ChannelError;
use std::time::Duration;
use tracing::{debug, info};

use crate::render::{render_html, render_text};

const SMTP_TIMEOUT: Duration = Duration::from_secs(30);

pub struct EmailChannel {
    host: String,
    port: u16,
    username: String,
    password: String,
    from: Mailbox,
    to: Mailbox,
}

impl EmailChannel {
    /// Requires username, password and recipient; addresses must parse.
    pub fn new(config: &EmailConfig) -> Result<Self, ChannelError> {
        let required = |value: &Option<String>, what: &str| {
            value
                .clone()
                .ok_or_else(|| ChannelError::NotConfigured(format!("delivery.email.{what} is not set")))
        };
        let username = required(&config.username, "username")?;
        let password = required(&config.password, "password")?;
        let recipient = required(&config.recipient, "recipient")?;

        let from = parse_mailbox(&username)?;
        let to = parse_mailbox(&recipient)?;

        Ok(Self {
            host: config.smtp_host.clone(),
            port: config.smtp_port,
            username,
            password,
            from,
            to,
        })
    }

    /// The message sent for `digest`.
    pub fn message(&self, digest: &Digest) -> Result<Message, ChannelError> {
        let subject = format!("{} — {}", digest.title, digest.date.format("%Y-%m-%d"));
        Message::builder()
            .from(self.from.clone())
            .to(self.to.clone())
            .subject(subject)
            .multipart(MultiPart::alternative_plain_html(
                render_text(digest),
                render_html(digest),
            ))
            .map_err(|e| self.failed(e.to_string()))
    }

    fn transport(&self) -> Result<AsyncSmtpTransport<Tokio1Executor>, ChannelError> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.host)
            .map_err(|e| self.failed(e.to_string()))?
            .port(self.port)
            .credentials(Credentials::new(self.username.clone(), self.password.clone()))
            .timeout(Some(SMTP_TIMEOUT))
            .build();
        Ok(transport)
    }

    fn failed(&self, reason: String) -> ChannelError {
        ChannelError::DeliveryFailed {
            channel: "email".into(),
            reason,
        }
    }
}

fn parse_mailbox(address: &str) -> Result<Mailbox, ChannelError> {
    address
        .parse()
        .map_err(|e| ChannelError::NotConfigured(format!("invalid email address '{address}': {e}")))
}

#[async_trait]
impl Channel for EmailChannel {
    fn name(&self) -> &str {
        "email"
    }

    async fn deliver(&self, digest: &Digest) -> Result<(), ChannelError> {
        let message = self.message(digest)?;
        debug!(host = %self.host, port = self.port, to = %self.to, "Sending digest");

        self.transport()?
            .send(message)
            .await
            .map_err(|e| self.failed(e.to_string()))?;

        info!(to = %self.to, sections = digest.sections.len(), "Digest emailed");
        Ok(())
    }

    async fn health_check(&self) -> Result<bool, ChannelError> {
        self.transport()?
            .test_connection()
            .await
            .map_err(|e| self.failed(e.to_string()))
    }
}
