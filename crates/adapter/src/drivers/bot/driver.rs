use anyhow::Result;
use domain::{Comment, CommentKind, Invocation, Scan};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::handlers::{handle, Outcome};
use super::BotContext;

pub struct BotDriver {
    ctx: BotContext,
}

impl BotDriver {
    pub fn new(ctx: BotContext) -> Self {
        Self { ctx }
    }

    /// Ledger check, ignore list, grammar, then the command handler.
    /// A comment is recorded before its handler runs, so it is never
    /// answered twice even if the handler fails halfway.
    pub async fn process(&self, comment: Comment) -> Result<Outcome> {
        let ctx = &self.ctx;

        if comment.kind == CommentKind::Mention {
            if let Err(e) = ctx.reddit.mark_read(&[comment.fullname.clone()]).await {
                warn!("Failed to mark mention {} as read: {:?}", comment.id, e);
            }
        }

        if ctx.db.has_comment(&comment.id).await? {
            debug!("Comment {} already processed", comment.id);
            return Ok(Outcome::AlreadyProcessed);
        }
        ctx.db.record_comment(&comment.id).await?;

        let author = match comment.author.as_deref() {
            Some(a) => a,
            None => return Ok(Outcome::Ignored("deleted author")),
        };
        if author.eq_ignore_ascii_case(&ctx.bot_name) {
            return Ok(Outcome::Ignored("own comment"));
        }
        if ctx.db.is_ignored(author).await? {
            debug!("Ignoring comment {} from ignored user {}", comment.id, author);
            return Ok(Outcome::Ignored("ignored user"));
        }

        match Invocation::scan(&comment.body, &ctx.bot_name) {
            Scan::Found(inv) => {
                info!("Found command {} in {}", inv.command, comment);
                handle(ctx, &inv, &comment).await
            }
            Scan::Unknown(tokens) => {
                info!("Unknown command(s) {:?} in comment {}", tokens, comment.id);
                Ok(Outcome::Ignored("unknown command"))
            }
            Scan::NotAddressed => Ok(Outcome::Ignored("not addressed")),
        }
    }

    /// Drains the comment queue until it closes or `cancel_token` fires.
    pub async fn run(&self, mut rx: mpsc::Receiver<Comment>, cancel_token: CancellationToken) -> Result<()> {
        info!("Bot {} is listening for commands", self.ctx.bot_name);
        loop {
            tokio::select! {
                item = rx.recv() => {
                    let comment = match item {
                        Some(c) => c,
                        None => break,
                    };
                    let id = comment.id.clone();
                    match self.process(comment).await {
                        Ok(outcome) => debug!("Comment {} -> {:?}", id, outcome),
                        Err(e) => error!("Failed to handle comment {}: {:?}", id, e),
                    }
                },
                _ = cancel_token.cancelled() => break,
            }
        }
        info!("Bot driver stopped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::ReplyPipeline;
    use crate::testing::{comment, game, FakeLookup, FakeReddit};
    use domain::Renderer;
    use std::sync::Arc;
    use storage::Db;

    async fn driver(lookup: FakeLookup) -> (BotDriver, Arc<FakeReddit>, Db) {
        let db = Db::in_memory().await.unwrap();
        let reddit = Arc::new(FakeReddit::default());
        let renderer = Renderer::new("r2d8");
        let ctx = BotContext {
            bot_name: "r2d8".to_string(),
            reddit: reddit.clone(),
            db: db.clone(),
            pipeline: ReplyPipeline::new(Arc::new(lookup), db.clone(), renderer.clone()),
            renderer,
        };
        (BotDriver::new(ctx), reddit, db)
    }

    #[tokio::test]
    async fn test_same_comment_is_answered_once() {
        let lookup = FakeLookup::default().with_game(game(7, "Brass", 2007));
        let (driver, reddit, db) = driver(lookup).await;
        let c = comment("dup", "t3_post", "alice", "/u/r2d8 getinfo **Brass**");

        assert_eq!(driver.process(c.clone()).await.unwrap(), Outcome::Replied);
        assert_eq!(driver.process(c).await.unwrap(), Outcome::AlreadyProcessed);
        assert_eq!(reddit.replies().len(), 1);
        assert!(db.has_comment("dup").await.unwrap());
    }

    #[tokio::test]
    async fn test_unaddressed_comment_is_still_recorded() {
        let (driver, reddit, db) = driver(FakeLookup::default()).await;
        let c = comment("plain", "t3_post", "alice", "**Brass** is great");
        assert_eq!(
            driver.process(c).await.unwrap(),
            Outcome::Ignored("not addressed")
        );
        assert!(db.has_comment("plain").await.unwrap());
        assert!(reddit.replies().is_empty());
    }

    #[tokio::test]
    async fn test_own_and_ignored_authors_are_skipped() {
        let lookup = FakeLookup::default().with_game(game(7, "Brass", 2007));
        let (driver, reddit, db) = driver(lookup).await;
        db.ignore_user("AutoModerator").await.unwrap();

        let own = comment("own", "t3_post", "R2D8", "/u/r2d8 getinfo **Brass**");
        let bot = comment("am", "t3_post", "AutoModerator", "/u/r2d8 getinfo **Brass**");
        assert_eq!(driver.process(own).await.unwrap(), Outcome::Ignored("own comment"));
        assert_eq!(driver.process(bot).await.unwrap(), Outcome::Ignored("ignored user"));
        assert!(reddit.replies().is_empty());
    }

    #[tokio::test]
    async fn test_mentions_are_marked_read() {
        let (driver, reddit, _) = driver(FakeLookup::default()).await;
        let mut c = comment("m1", "t3_post", "alice", "/u/r2d8 xyzzy");
        c.kind = CommentKind::Mention;
        assert_eq!(driver.process(c).await.unwrap(), Outcome::Replied);
        assert_eq!(reddit.read.lock().unwrap().clone(), vec!["t1_m1".to_string()]);
    }

    #[tokio::test]
    async fn test_run_drains_until_cancelled() {
        let (driver, reddit, _) = driver(FakeLookup::default()).await;
        let (tx, rx) = mpsc::channel(8);
        let cancel = CancellationToken::new();

        tx.send(comment("r1", "t3_post", "alice", "/u/r2d8 xyzzy")).await.unwrap();
        tx.send(comment("r1", "t3_post", "alice", "/u/r2d8 xyzzy")).await.unwrap();
        drop(tx);

        driver.run(rx, cancel).await.unwrap();
        assert_eq!(reddit.replies().len(), 1);
    }
}
