// Outbound email delivery for password-reset links

use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Mailbox},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};

use crate::config::SmtpConfig;

/// Errors raised while building or sending a message
#[derive(Debug, thiserror::Error)]
pub enum MailError {
    #[error("invalid address: {0}")]
    Address(#[from] lettre::address::AddressError),

    #[error("could not build message: {0}")]
    Build(#[from] lettre::error::Error),

    #[error("smtp transport error: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),
}

/// Notification sender
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Deliver an HTML email. Success means the transport accepted it.
    async fn send(&self, to: &str, subject: &str, html_body: &str) -> Result<(), MailError>;
}

/// SMTP mailer (STARTTLS relay with account credentials)
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    /// Build the transport; no connection is opened until the first send
    pub fn new(config: &SmtpConfig) -> Result<Self, MailError> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)?
            .port(config.port)
            .credentials(Credentials::new(
                config.username.clone(),
                config.password.clone(),
            ))
            .timeout(Some(config.timeout))
            .build();

        let from = format!("Filmatik Support <{}>", config.username).parse()?;

        Ok(Self { transport, from })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, to: &str, subject: &str, html_body: &str) -> Result<(), MailError> {
        let message = Message::builder()
            .from(self.from.clone())
            .to(to.parse()?)
            .subject(subject)
            .header(ContentType::TEXT_HTML)
            .body(html_body.to_string())?;

        self.transport.send(message).await?;
        tracing::debug!("Mail '{}' handed to SMTP relay", subject);
        Ok(())
    }
}

/// Mailer used when no SMTP account is configured.
/// Only records that a message would have been sent.
#[derive(Debug, Default)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, _to: &str, subject: &str, _html_body: &str) -> Result<(), MailError> {
        tracing::warn!("SMTP not configured, dropping mail '{}'", subject);
        Ok(())
    }
}

/// Body of the password-reset email
pub fn reset_email_body(reset_link: &str, ttl_minutes: i64) -> String {
    format!(
        r#"<p>Hello,</p>
<p>We received a request to reset your Filmatik password. Click the link below to proceed:</p>
<p><a href="{link}">Reset Password</a></p>
<p><strong>Note:</strong> This link is valid for {ttl} minutes and can be used once.</p>
<p>If you didn't request this, please ignore this email.</p>
<p>The Filmatik Team</p>"#,
        link = reset_link,
        ttl = ttl_minutes,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_reset_email_body_contains_link() {
        let body = reset_email_body("https://filmatik.app/reset-password/abc", 15);
        assert!(body.contains(r#"href="https://filmatik.app/reset-password/abc""#));
        assert!(body.contains("15 minutes"));
    }

    #[tokio::test]
    async fn test_smtp_mailer_builds_without_connecting() {
        let mailer = SmtpMailer::new(&SmtpConfig {
            host: "smtp.example.com".to_string(),
            port: 587,
            username: "support@example.com".to_string(),
            password: "app-password".to_string(),
            timeout: Duration::from_secs(5),
        })
        .unwrap();
        assert_eq!(mailer.from.email.to_string(), "support@example.com");
    }

    #[tokio::test]
    async fn test_smtp_mailer_rejects_bad_recipient() {
        let mailer = SmtpMailer::new(&SmtpConfig {
            host: "smtp.example.com".to_string(),
            port: 587,
            username: "support@example.com".to_string(),
            password: "app-password".to_string(),
            timeout: Duration::from_secs(5),
        })
        .unwrap();

        let result = mailer.send("not an address", "subject", "<p>hi</p>").await;
        assert!(matches!(result, Err(MailError::Address(_))));
    }
}
