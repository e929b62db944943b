//! Outbound email.
//!
//! The auth flow only needs `send(to, subject, body)`; [`Mailer`] is that
//! capability. [`SmtpMailer`] delivers over SMTP and [`LogMailer`] writes
//! the message to the log when SMTP is disabled in development.

use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::{debug, info, instrument, warn};

use liceum_config::EmailConfig;

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, to: &str, subject: &str, body: &str) -> anyhow::Result<()>;
}

pub struct SmtpMailer {
    from: String,
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpMailer {
    pub fn new(config: &EmailConfig) -> anyhow::Result<Self> {
        let transport = if config.smtp_username.is_empty() {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.smtp_host)
                .port(config.smtp_port)
                .build()
        } else {
            let creds = Credentials::new(
                config.smtp_username.clone(),
                config.smtp_password.clone(),
            );

            AsyncSmtpTransport::<Tokio1Executor>::relay(&config.smtp_host)
                .context("Failed to create SMTP relay")?
                .port(config.smtp_port)
                .credentials(creds)
                .build()
        };

        Ok(Self {
            from: format!("{} <{}>", config.from_name, config.from_email),
            transport,
        })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    #[instrument(skip(self, body))]
    async fn send(&self, to: &str, subject: &str, body: &str) -> anyhow::Result<()> {
        let email = Message::builder()
            .from(self.from.parse().context("Invalid from email")?)
            .to(to.parse().context("Invalid to email")?)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())
            .context("Failed to build email")?;

        self.transport
            .send(email)
            .await
            .context("Failed to send email")?;

        debug!(email.to = %to, "Email sent");
        Ok(())
    }
}

/// Logs messages instead of sending them.
#[derive(Debug, Default)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> anyhow::Result<()> {
        info!(email.to = %to, email.subject = %subject, "SMTP disabled, email not sent");
        debug!(email.body = %body, "Email body");
        Ok(())
    }
}

pub fn mailer_from_config(config: &EmailConfig) -> anyhow::Result<Arc<dyn Mailer>> {
    if config.enabled {
        Ok(Arc::new(SmtpMailer::new(config)?))
    } else {
        warn!("SMTP_ENABLED is false; auth codes will only be written to the log");
        Ok(Arc::new(LogMailer))
    }
}
