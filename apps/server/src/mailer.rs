//! # Outbound Email
//!
//! ```text
//! action ──► Email::verification_code / Email::invitation
//!                 │
//!                 ▼
//!          Arc<dyn Mailer>
//!           ├── HttpMailer  POST {from, to, subject, text} to MAIL_API_URL
//!           └── LogMailer   info! the message (no mail API configured)
//! ```

use async_trait::async_trait;
use biztrack_core::VerificationPurpose;
use serde::Serialize;
use tracing::info;

use crate::config::MailConfig;

/// One plain-text message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Email {
    pub to: String,
    pub subject: String,
    pub text: String,
}

impl Email {
    pub fn verification_code(
        to: &str,
        code: &str,
        purpose: VerificationPurpose,
        ttl_minutes: i64,
    ) -> Self {
        let (subject, intro) = match purpose {
            VerificationPurpose::Signup => (
                "Verify your BizTrack account",
                "Welcome to BizTrack! Use this code to verify your email address:",
            ),
            VerificationPurpose::PasswordReset => (
                "Reset your BizTrack password",
                "Use this code to reset your password:",
            ),
        };

        Email {
            to: to.to_string(),
            subject: subject.to_string(),
            text: format!(
                "{intro}\n\n    {code}\n\nThe code expires in {ttl_minutes} minutes. \
                 If you did not request it, you can ignore this email."
            ),
        }
    }

    pub fn invitation(to: &str, employee_name: &str, business_name: &str, link: &str) -> Self {
        Email {
            to: to.to_string(),
            subject: format!("You have been added to {business_name} on BizTrack"),
            text: format!(
                "Hi {employee_name},\n\n{business_name} has added you to their team on BizTrack.\n\
                 Create your account here: {link}\n"
            ),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum MailError {
    #[error("Mail API request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Mail API rejected the message with status {0}")]
    Rejected(u16),
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: Email) -> Result<(), MailError>;
}

// =============================================================================
// HTTP mail API
// =============================================================================

pub struct HttpMailer {
    client: reqwest::Client,
    config: MailConfig,
}

#[derive(Serialize)]
struct MailRequest<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    text: &'a str,
}

impl HttpMailer {
    pub fn new(client: reqwest::Client, config: MailConfig) -> Self {
        HttpMailer { client, config }
    }
}

#[async_trait]
impl Mailer for HttpMailer {
    async fn send(&self, email: Email) -> Result<(), MailError> {
        let mut request = self.client.post(&self.config.api_url).json(&MailRequest {
            from: &self.config.from,
            to: &email.to,
            subject: &email.subject,
            text: &email.text,
        });
        if let Some(key) = &self.config.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(MailError::Rejected(response.status().as_u16()));
        }

        info!(to = %email.to, subject = %email.subject, "Email sent");
        Ok(())
    }
}

// =============================================================================
// Log-only
// =============================================================================

/// Writes messages to the log. Default when no mail API is configured, so
/// development signups can read their code from the console.
#[derive(Debug, Default)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, email: Email) -> Result<(), MailError> {
        info!(to = %email.to, subject = %email.subject, body = %email.text, "Email (not sent, no mail API configured)");
        Ok(())
    }
}
