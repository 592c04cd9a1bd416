//! Subscriber store.
//!
//! Every operation runs a single statement and contains its own failures:
//! errors are logged and turned into an empty list or `false`.

use sqlx::PgPool;

use crate::domain::SubscriberEmail;

/// Return every subscriber email in insertion order, or an empty list if the store is unreachable
#[tracing::instrument(name = "List subscriber emails", skip(db_pool))]
pub async fn list_emails(db_pool: &PgPool) -> Vec<String> {
    sqlx::query_scalar::<_, String>(
        r"
        SELECT email FROM subscribers
        ORDER BY id
        ",
    )
    .fetch_all(db_pool)
    .await
    .unwrap_or_else(|e| {
        tracing::error!(error.cause_chain = ?e, "Failed to retrieve subscriber emails");
        Vec::new()
    })
}

/// Insert a new subscriber, returning `false` if the email is already present or the insert fails
#[tracing::instrument(
    name = "Adding a new subscriber",
    skip(email, db_pool),
    fields(subscriber_email = %email)
)]
pub async fn add(email: &SubscriberEmail, db_pool: &PgPool) -> bool {
    let result = sqlx::query(
        r"
        INSERT INTO subscribers (email)
        VALUES ($1)
        ",
    )
    .bind(email.as_ref())
    .execute(db_pool)
    .await;

    match result {
        Ok(_) => {
            tracing::info!("Subscriber added");
            true
        }
        Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
            tracing::warn!("Attempted to add a duplicate subscriber");
            false
        }
        Err(e) => {
            tracing::error!(error.cause_chain = ?e, "Failed to add subscriber");
            false
        }
    }
}

/// Delete a subscriber by exact email match, returning whether a row was removed
#[tracing::instrument(name = "Removing a subscriber", skip(db_pool))]
pub async fn remove(email: &str, db_pool: &PgPool) -> bool {
    let result = sqlx::query(
        r"
        DELETE FROM subscribers
        WHERE email = $1
        ",
    )
    .bind(email)
    .execute(db_pool)
    .await;

    match result {
        Ok(r) => {
            let removed = r.rows_affected() > 0;
            tracing::info!(removed, "Subscriber removal processed");
            removed
        }
        Err(e) => {
            tracing::error!(error.cause_chain = ?e, "Failed to remove subscriber");
            false
        }
    }
}
