//! A mail client for sending UPS notifications.

use crate::config::{MailConfig, MailTransportKind};
use crate::core::Mailer;
use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Mailbox},
    transport::smtp::authentication::Credentials,
    AsyncSendmailTransport, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use std::time::Duration;
use tracing::{debug, instrument};

enum Transport {
    Sendmail(AsyncSendmailTransport<Tokio1Executor>),
    Smtp(AsyncSmtpTransport<Tokio1Executor>),
}

/// Sends notifications through the local sendmail binary or an SMTP relay.
pub struct LettreMailer {
    from: String,
    transport: Transport,
    timeout: Duration,
}

impl LettreMailer {
    /// Creates a mailer from the `[mail]` configuration section.
    pub fn from_config(config: &MailConfig) -> Result<Self> {
        let timeout = Duration::from_secs(config.timeout_seconds);
        let transport = match config.transport {
            MailTransportKind::Sendmail => Transport::Sendmail(
                AsyncSendmailTransport::<Tokio1Executor>::new_with_command(
                    config.sendmail_command.clone(),
                ),
            ),
            MailTransportKind::Smtp => {
                let smtp = &config.smtp;
                let mut builder = if smtp.starttls {
                    AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&smtp.host)
                        .with_context(|| format!("invalid SMTP relay {}", smtp.host))?
                } else {
                    AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&smtp.host)
                };
                builder = builder.port(smtp.port).timeout(Some(timeout));
                if let (Some(username), Some(password)) = (&smtp.username, &smtp.password) {
                    builder = builder.credentials(Credentials::new(
                        username.clone(),
                        password.clone(),
                    ));
                }
                Transport::Smtp(builder.build())
            }
        };

        Ok(Self {
            from: config.from.clone(),
            transport,
            timeout,
        })
    }

    async fn deliver(&self, message: Message) -> Result<()> {
        match &self.transport {
            Transport::Sendmail(transport) => {
                transport.send(message).await?;
            }
            Transport::Smtp(transport) => {
                transport.send(message).await?;
            }
        }
        Ok(())
    }
}

/// Builds a plain-text message addressed to every recipient in `recipient`.
///
/// Addresses may be separated by `;` or `,`. At least one is required.
pub fn build_message(from: &str, recipient: &str, subject: &str, body: &str) -> Result<Message> {
    let from: Mailbox = from
        .parse()
        .with_context(|| format!("invalid sender address: {from}"))?;

    let mut builder = Message::builder()
        .from(from)
        .subject(subject)
        .header(ContentType::TEXT_PLAIN);

    let mut recipients = 0;
    for address in recipient
        .split([';', ','])
        .map(str::trim)
        .filter(|a| !a.is_empty())
    {
        let to: Mailbox = address
            .parse()
            .with_context(|| format!("invalid recipient address: {address}"))?;
        builder = builder.to(to);
        recipients += 1;
    }
    if recipients == 0 {
        bail!("no recipient address configured");
    }

    builder
        .body(body.to_string())
        .context("cannot build notification email")
}

#[async_trait]
impl Mailer for LettreMailer {
    #[instrument(skip(self, body), fields(to = %recipient))]
    async fn send(&self, subject: &str, body: &str, recipient: &str) -> Result<()> {
        let message = build_message(&self.from, recipient, subject, body)?;

        match tokio::time::timeout(self.timeout, self.deliver(message)).await {
            Ok(Ok(())) => {
                debug!("Notification email handed to the transport");
                Ok(())
            }
            Ok(Err(e)) => {
                debug!(error = %e, "Mail transport rejected the notification");
                Err(e)
            }
            Err(_) => bail!("mail transport timed out after {:?}", self.timeout),
        }
    }
}
