use crate::{models::SqlAlias, Db};
use domain::Alias;
use tracing::info;

impl Db {
    /// First mapping wins: returns false when `alias` is already taken.
    pub async fn add_alias(&self, alias: &str, canonical: &str) -> anyhow::Result<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO aliases (alias, gamename)
            VALUES (?, ?)
            ON CONFLICT(alias) DO NOTHING
            "#,
        )
        .bind(alias)
        .bind(canonical)
        .execute(&self.pool)
        .await?;

        let inserted = result.rows_affected() > 0;
        if inserted {
            info!("Added alias {} == {}", alias, canonical);
        }
        Ok(inserted)
    }

    pub async fn resolve_alias(&self, alias: &str) -> anyhow::Result<Option<String>> {
        let row: Option<String> =
            sqlx::query_scalar("SELECT gamename FROM aliases WHERE alias = ?")
                .bind(alias)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row)
    }

    pub async fn list_aliases(&self) -> anyhow::Result<Vec<Alias>> {
        let rows = sqlx::query_as::<_, SqlAlias>(
            "SELECT gamename, alias FROM aliases ORDER BY alias ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }
}
