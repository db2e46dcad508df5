//! Mail transports for contact email.

use async_trait::async_trait;
use lettre::message::{header::ContentType, Mailbox};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crm_core::email::{Mailer, OutgoingEmail};
use crm_core::{Error, Result};

use crate::config::SmtpConfig;

/// Sends through an SMTP relay. Port 465 uses implicit TLS, any other port
/// STARTTLS.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    pub fn new(config: &SmtpConfig) -> anyhow::Result<Self> {
        let builder = if config.port == 465 {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)?
        };
        let transport = builder
            .port(config.port)
            .credentials(Credentials::new(config.user.clone(), config.password.clone()))
            .build();
        let from: Mailbox = format!("{} <{}>", config.from_name, config.user).parse()?;

        Ok(Self { transport, from })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, email: OutgoingEmail) -> Result<()> {
        let to: Mailbox = email
            .to
            .parse()
            .map_err(|err| Error::Mail(format!("invalid recipient '{}': {}", email.to, err)))?;
        let message = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(email.subject)
            .header(ContentType::TEXT_HTML)
            .body(email.html)
            .map_err(|err| Error::Mail(err.to_string()))?;

        self.transport.send(message).await.map_err(|err| {
            tracing::warn!(error = %err, "smtp send failed");
            Error::Mail(err.to_string())
        })?;
        Ok(())
    }
}

/// Used when SMTP is not configured: the message is logged and dropped.
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, email: OutgoingEmail) -> Result<()> {
        tracing::info!(to = %email.to, subject = %email.subject, "smtp not configured, email logged only");
        Ok(())
    }
}
