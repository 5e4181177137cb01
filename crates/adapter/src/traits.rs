use anyhow::Result;
use async_trait::async_trait;
use domain::{Comment, GameRecord, LookupError, SearchHit};

/// The parts of the Reddit API the bot talks to.
#[async_trait]
pub trait RedditApi: Send + Sync {
    /// Newest comments across `subreddits` (joined into one multireddit).
    async fn subreddit_comments(&self, subreddits: &[String]) -> Result<Vec<Comment>>;

    /// Unread username mentions from the inbox.
    async fn unread_mentions(&self) -> Result<Vec<Comment>>;

    async fn mark_read(&self, fullnames: &[String]) -> Result<()>;

    async fn comment(&self, fullname: &str) -> Result<Option<Comment>>;

    async fn reply(&self, parent_fullname: &str, text: &str) -> Result<Comment>;

    async fn edit(&self, fullname: &str, text: &str) -> Result<Comment>;
}

/// Board-game metadata service. Every failure is a `LookupError`.
#[async_trait]
pub trait GameLookup: Send + Sync {
    async fn search(&self, name: &str) -> Result<Vec<SearchHit>, LookupError>;

    async fn game(&self, id: u64) -> Result<GameRecord, LookupError>;
}
