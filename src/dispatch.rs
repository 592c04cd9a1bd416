use std::fmt;

use sqlx::PgPool;

use crate::mailer::Mailer;
use crate::{newsletter_log, subscribers};

/// Result of a broadcast
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BroadcastOutcome {
    /// Nobody to mail, the mailer was never contacted
    NoSubscribers,
    /// Delivery stopped at this recipient; everyone before it was already mailed
    SendFailed { recipient: String },
    /// Every recipient was mailed but the newsletter could not be recorded
    RecordFailed,
    /// Every recipient was mailed and the newsletter was recorded
    AllSent { recipients: usize },
}

impl BroadcastOutcome {
    /// Whether the broadcast is reported as a success
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::AllSent { .. })
    }
}

impl fmt::Display for BroadcastOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoSubscribers => write!(f, "No subscribers found."),
            Self::SendFailed { recipient } => write!(f, "Failed to send to {recipient}"),
            Self::RecordFailed => write!(
                f,
                "Failed to send email: the newsletter could not be recorded"
            ),
            Self::AllSent { .. } => write!(f, "Email has been sent to all subscribers."),
        }
    }
}

/// Send `subject` and `body` to every current subscriber, one at a time.
///
/// Delivery is fail-fast: the first failed send aborts the broadcast and
/// nothing is recorded. Recipients mailed before the failure are not tracked,
/// so sending the same broadcast again mails them a second time.
#[allow(clippy::future_not_send)]
#[tracing::instrument(
    name = "Broadcast newsletter",
    skip(body, mailer, db_pool),
    fields(recipients = tracing::field::Empty)
)]
pub async fn broadcast<M>(
    subject: &str,
    body: &str,
    mailer: &M,
    db_pool: &PgPool,
) -> BroadcastOutcome
where
    M: Mailer,
{
    let emails = subscribers::list_emails(db_pool).await;
    if emails.is_empty() {
        return BroadcastOutcome::NoSubscribers;
    }
    tracing::Span::current().record("recipients", emails.len());

    for email in &emails {
        if mailer.send(email, subject, body).await.is_err() {
            tracing::warn!(
                failed_recipient = %email,
                "Aborting broadcast after the first delivery failure"
            );
            return BroadcastOutcome::SendFailed {
                recipient: email.clone(),
            };
        }
    }

    match newsletter_log::record(subject, body, db_pool).await {
        Ok(_) => BroadcastOutcome::AllSent {
            recipients: emails.len(),
        },
        Err(e) => {
            tracing::error!(
                error.cause_chain = ?e,
                "Newsletter was delivered to every subscriber but could not be recorded"
            );
            BroadcastOutcome::RecordFailed
        }
    }
}
