/// Subscriptions between users
///
/// A subscriber follows an author's recipes. Unique per (subscriber, author).
/// Subscribing to oneself is refused by the API before it reaches the table.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE subscriptions (
///     subscriber_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     author_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     PRIMARY KEY (subscriber_id, author_id)
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// A subscription row
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Subscription {
    pub subscriber_id: Uuid,
    pub author_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl Subscription {
    /// Subscribes `subscriber_id` to `author_id`
    ///
    /// Returns `None` if the subscription already existed.
    pub async fn create(
        pool: &PgPool,
        subscriber_id: Uuid,
        author_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Subscription>(
            r#"
            INSERT INTO subscriptions (subscriber_id, author_id)
            VALUES ($1, $2)
            ON CONFLICT (subscriber_id, author_id) DO NOTHING
            RETURNING subscriber_id, author_id, created_at
            "#,
        )
        .bind(subscriber_id)
        .bind(author_id)
        .fetch_optional(pool)
        .await
    }

    /// Removes a subscription
    ///
    /// Returns false if there was none.
    pub async fn delete(pool: &PgPool, subscriber_id: Uuid, author_id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM subscriptions WHERE subscriber_id = $1 AND author_id = $2")
            .bind(subscriber_id)
            .bind(author_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Whether `subscriber_id` follows `author_id`
    pub async fn exists(pool: &PgPool, subscriber_id: Uuid, author_id: Uuid) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM subscriptions WHERE subscriber_id = $1 AND author_id = $2)",
        )
        .bind(subscriber_id)
        .bind(author_id)
        .fetch_one(pool)
        .await
    }

    /// Authors followed by a subscriber, oldest subscription first
    pub async fn author_ids(pool: &PgPool, subscriber_id: Uuid) -> Result<Vec<Uuid>, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT author_id FROM subscriptions WHERE subscriber_id = $1 ORDER BY created_at, author_id",
        )
        .bind(subscriber_id)
        .fetch_all(pool)
        .await
    }
}
