use crate::Db;

impl Db {
    pub async fn is_admin(&self, user: &str) -> anyhow::Result<bool> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(ruid) FROM bot_admins WHERE ruid = ?")
            .bind(user)
            .fetch_one(&self.pool)
            .await?;
        Ok(count > 0)
    }

    pub async fn add_admin(&self, user: &str) -> anyhow::Result<()> {
        sqlx::query("INSERT OR IGNORE INTO bot_admins (ruid) VALUES (?)")
            .bind(user)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Users whose comments are recorded but never answered.
    pub async fn is_ignored(&self, user: &str) -> anyhow::Result<bool> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(ruid) FROM ignored_users WHERE ruid = ?")
                .bind(user)
                .fetch_one(&self.pool)
                .await?;
        Ok(count > 0)
    }

    pub async fn ignore_user(&self, user: &str) -> anyhow::Result<()> {
        sqlx::query("INSERT OR IGNORE INTO ignored_users (ruid) VALUES (?)")
            .bind(user)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::Db;

    #[tokio::test]
    async fn test_seed_admins() {
        let db = Db::in_memory().await.unwrap();
        assert!(db.is_admin("phil_s_stein").await.unwrap());
        assert!(db.is_admin("timotab").await.unwrap());
        assert!(!db.is_admin("random_redditor").await.unwrap());
    }

    #[tokio::test]
    async fn test_add_admin_and_ignore() {
        let db = Db::in_memory().await.unwrap();
        db.add_admin("new_mod").await.unwrap();
        db.add_admin("new_mod").await.unwrap();
        assert!(db.is_admin("new_mod").await.unwrap());

        assert!(!db.is_ignored("AutoModerator").await.unwrap());
        db.ignore_user("AutoModerator").await.unwrap();
        assert!(db.is_ignored("AutoModerator").await.unwrap());
    }
}
