use gmail::{GmailClient, Message};

use crate::config::MailConfig;
use crate::domain::MailBody;
use crate::errors::DigestResult;

/// Mail transport capability
#[cfg_attr(test, mockall::automock)]
pub trait Mailer: Send + Sync {
    fn send(&self, to: &str, subject: &str, body: &MailBody) -> DigestResult<()>;
}

/// Sends mail through Gmail with a token refreshed at connect time
pub struct GmailMailer {
    client: GmailClient,
    from: String,
}

impl GmailMailer {
    /// Fails with `DigestError::Auth` when the refresh token is rejected
    pub fn connect(config: &MailConfig) -> DigestResult<Self> {
        let client = GmailClient::connect(&config.credentials())?;
        tracing::debug!("Refreshed Gmail access token");

        Ok(Self {
            client,
            from: config.from_email.clone(),
        })
    }
}

impl Mailer for GmailMailer {
    fn send(&self, to: &str, subject: &str, body: &MailBody) -> DigestResult<()> {
        let message = Message {
            from: self.from.clone(),
            to: to.to_string(),
            subject: subject.to_string(),
            text: body.text.clone(),
            html: body.html.clone(),
        };

        let sent = self.client.send(&message)?;
        tracing::debug!(message_id = %sent.id, "Gmail accepted message");
        Ok(())
    }
}
