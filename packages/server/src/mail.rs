use async_trait::async_trait;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use thiserror::Error;
use tracing::info;

use crate::config::MailConfig;

#[derive(Debug, Error)]
pub enum MailError {
    #[error("invalid mail configuration: {0}")]
    Config(String),
    #[error("failed to build message: {0}")]
    Build(#[from] lettre::error::Error),
    #[error("SMTP send failed: {0}")]
    Send(#[from] lettre::transport::smtp::Error),
}

/// Outbound mail. Only the anonymous contact form uses this; tracked support
/// goes through tickets instead.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send_contact_message(
        &self,
        name: &str,
        reply_to: &str,
        message: &str,
    ) -> Result<(), MailError>;
}

/// Relays contact messages to the support inbox over SMTP.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    inbox: Mailbox,
}

impl SmtpMailer {
    pub fn new(config: &MailConfig) -> Result<Self, MailError> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&config.smtp_host)
            .map_err(|e| MailError::Config(e.to_string()))?
            .credentials(Credentials::new(
                config.smtp_username.clone(),
                config.smtp_password.clone(),
            ))
            .build();
        let from = config
            .from
            .parse()
            .map_err(|_| MailError::Config(format!("bad sender address '{}'", config.from)))?;
        let inbox = config.contact_inbox.parse().map_err(|_| {
            MailError::Config(format!("bad inbox address '{}'", config.contact_inbox))
        })?;
        Ok(Self {
            transport,
            from,
            inbox,
        })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send_contact_message(
        &self,
        name: &str,
        reply_to: &str,
        message: &str,
    ) -> Result<(), MailError> {
        let mut builder = Message::builder()
            .from(self.from.clone())
            .to(self.inbox.clone())
            .subject(format!("Сообщение с сайта от {name}"));

        // Reply-To lets support answer the visitor directly; a malformed
        // address just drops the header instead of failing the relay.
        if let Ok(mailbox) = reply_to.parse::<Mailbox>() {
            builder = builder.reply_to(mailbox);
        }

        let email = builder.body(message.to_string())?;
        self.transport.send(email).await?;
        Ok(())
    }
}

/// Used when outbound mail is disabled (local development, tests): logs the
/// message and reports success.
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send_contact_message(
        &self,
        name: &str,
        reply_to: &str,
        message: &str,
    ) -> Result<(), MailError> {
        info!(
            name,
            reply_to,
            len = message.len(),
            "mail disabled; contact message logged, not sent"
        );
        Ok(())
    }
}
