use crate::Db;
use tracing::debug;

impl Db {
    // Ledger: once recorded, a comment id is never handled again.
    pub async fn record_comment(&self, id: &str) -> anyhow::Result<()> {
        debug!("Recording comment {} as processed", id);
        sqlx::query("INSERT OR IGNORE INTO comments (id) VALUES (?)")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn has_comment(&self, id: &str) -> anyhow::Result<bool> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM comments WHERE id = ?")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count > 0)
    }
}
