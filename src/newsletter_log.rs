use anyhow::Context;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

/// Newsletter that was delivered to every subscriber
#[derive(Debug, sqlx::FromRow)]
pub struct NewsletterRecord {
    pub id: i32,
    pub subject: String,
    pub body: String,
    pub sent_at: DateTime<Utc>,
}

/// Append a newsletter to the audit log and return its id
#[tracing::instrument(name = "Record newsletter", skip(body, db_pool))]
pub async fn record(subject: &str, body: &str, db_pool: &PgPool) -> anyhow::Result<i32> {
    let id = sqlx::query_scalar::<_, i32>(
        r"
        INSERT INTO newsletters (subject, body, sent_at)
        VALUES ($1, $2, now())
        RETURNING id
        ",
    )
    .bind(subject)
    .bind(body)
    .fetch_one(db_pool)
    .await
    .context("Failed to insert newsletter record")?;

    Ok(id)
}

/// Fetch the most recently sent newsletters, newest first
#[tracing::instrument(name = "Get recent newsletters", skip(db_pool))]
pub async fn recent(limit: i64, db_pool: &PgPool) -> anyhow::Result<Vec<NewsletterRecord>> {
    let records = sqlx::query_as::<_, NewsletterRecord>(
        r"
        SELECT id, subject, body, sent_at
        FROM newsletters
        ORDER BY sent_at DESC, id DESC
        LIMIT $1
        ",
    )
    .bind(limit)
    .fetch_all(db_pool)
    .await
    .context("Failed to fetch recent newsletters")?;

    Ok(records)
}
