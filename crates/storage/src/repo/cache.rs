use crate::{models::SqlCachedResponse, Db};
use chrono::Utc;
use std::time::Duration;

impl Db {
    // Cached body for `key`, unless it is older than `ttl`
    pub async fn cached_response(&self, key: &str, ttl: Duration) -> anyhow::Result<Option<String>> {
        let ttl = chrono::Duration::from_std(ttl)?;
        let threshold = Utc::now().naive_utc() - ttl;

        let row = sqlx::query_as::<_, SqlCachedResponse>(
            r#"
            SELECT body, fetched_at
            FROM lookup_cache
            WHERE key = ?
            "#,
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.filter(|r| r.fetched_at > threshold).map(|r| r.body))
    }

    pub async fn store_response(&self, key: &str, body: &str) -> anyhow::Result<()> {
        let now = Utc::now().naive_utc();

        sqlx::query(
            r#"
            INSERT INTO lookup_cache (key, body, fetched_at)
            VALUES (?, ?, ?)
            ON CONFLICT(key) DO UPDATE SET
                body = excluded.body,
                fetched_at = excluded.fetched_at
            "#,
        )
        .bind(key)
        .bind(body)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Drops entries older than `ttl`; returns how many were removed.
    pub async fn prune_responses(&self, ttl: Duration) -> anyhow::Result<u64> {
        let threshold = Utc::now().naive_utc() - chrono::Duration::from_std(ttl)?;
        let result = sqlx::query("DELETE FROM lookup_cache WHERE fetched_at <= ?")
            .bind(threshold)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
