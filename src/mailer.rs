use std::future::Future;

use anyhow::Context;
use lettre::address::AddressError;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use secrecy::ExposeSecret;
use url::Url;

use crate::configuration::SmtpSettings;

/// Mail delivery error type
#[derive(thiserror::Error, Debug)]
pub enum MailError {
    #[error("Invalid email address `{0}`")]
    InvalidAddress(String, #[source] AddressError),
    #[error("Failed to build the message")]
    Build(#[from] lettre::error::Error),
    #[error("SMTP transport failure")]
    Transport(#[from] lettre::transport::smtp::Error),
}

/// Anything that can deliver one newsletter message to one recipient
pub trait Mailer {
    /// Send `subject` and HTML `body` to `recipient`, with an unsubscribe footer appended
    fn send(
        &self,
        recipient: &str,
        subject: &str,
        body: &str,
    ) -> impl Future<Output = Result<(), MailError>>;
}

/// How the SMTP session is protected
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SmtpSecurity {
    /// Implicit TLS from the first byte (SMTPS, usually port 465)
    Tls,
    /// Plain connection upgraded with STARTTLS (usually port 587)
    StartTls,
    /// No encryption, only meant for local development relays
    None,
}

/// SMTP mailer.
///
/// The transport is built without connection pooling, so every call to
/// [`Mailer::send`] opens, authenticates and closes its own session.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    sender: Mailbox,
    base_url: Url,
}

impl SmtpMailer {
    /// Build an SMTP mailer from settings and the public base URL used for unsubscribe links
    pub fn new(settings: &SmtpSettings, base_url: Url) -> anyhow::Result<Self> {
        let sender: Mailbox = settings
            .sender_email()
            .parse()
            .context("Invalid sender email address")?;

        let builder = match settings.security {
            SmtpSecurity::Tls => AsyncSmtpTransport::<Tokio1Executor>::relay(&settings.host)
                .context("Failed to set up TLS for the SMTP relay")?,
            SmtpSecurity::StartTls => {
                AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.host)
                    .context("Failed to set up STARTTLS for the SMTP relay")?
            }
            SmtpSecurity::None => {
                AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&settings.host)
            }
        };
        let transport = builder
            .port(settings.port)
            .credentials(Credentials::new(
                settings.username.clone(),
                settings.password.expose_secret().to_string(),
            ))
            .timeout(Some(settings.timeout()))
            .build();

        Ok(Self {
            transport,
            sender,
            base_url,
        })
    }

    /// Build the unsubscribe link for a recipient
    pub fn unsubscribe_link(&self, recipient: &str) -> Url {
        let mut link = self.base_url.clone();
        if let Ok(mut segments) = link.path_segments_mut() {
            segments.pop_if_empty().push("unsubscribe");
        }
        link.query_pairs_mut()
            .clear()
            .append_pair("email", recipient);
        link
    }

    /// Compose the HTML message for a recipient
    pub fn compose(&self, recipient: &str, subject: &str, body: &str) -> Result<Message, MailError> {
        let to: Mailbox = recipient
            .parse()
            .map_err(|e| MailError::InvalidAddress(recipient.to_string(), e))?;
        let html_body = build_html_body(body, self.unsubscribe_link(recipient).as_str());

        Ok(Message::builder()
            .from(self.sender.clone())
            .to(to)
            .subject(subject)
            .header(ContentType::TEXT_HTML)
            .body(html_body)?)
    }
}

impl Mailer for SmtpMailer {
    #[tracing::instrument(name = "Send newsletter email", skip(self, subject, body))]
    async fn send(&self, recipient: &str, subject: &str, body: &str) -> Result<(), MailError> {
        let outcome = match self.compose(recipient, subject, body) {
            Ok(message) => self
                .transport
                .send(message)
                .await
                .map(|_| ())
                .map_err(MailError::from),
            Err(e) => Err(e),
        };

        match &outcome {
            Ok(()) => tracing::info!("Update email sent"),
            Err(e) => tracing::error!(
                error.cause_chain = ?e,
                error.message = %e,
                "Failed to send update email"
            ),
        }
        outcome
    }
}

/// Append the unsubscribe footer, keeping it inside the document when `body` is a full HTML page
pub fn build_html_body(body: &str, unsubscribe_link: &str) -> String {
    let footer = format!(
        "<br><br><hr><p style='font-size: 12px; color: #666;'>If you ever wish to unsubscribe, \
        please click <a href=\"{unsubscribe_link}\">here</a>.</p>"
    );

    // ASCII lowercasing preserves byte offsets
    let lowercase = body.to_ascii_lowercase();
    let insert_at = lowercase
        .find("</body>")
        .or_else(|| lowercase.find("</html>"));

    match insert_at {
        Some(idx) => {
            let mut html = String::with_capacity(body.len() + footer.len());
            html.push_str(&body[..idx]);
            html.push_str(&footer);
            html.push_str(&body[idx..]);
            html
        }
        None => format!("{body}{footer}"),
    }
}
