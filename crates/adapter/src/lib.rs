mod drivers;
pub mod pipeline;
mod traits;

#[cfg(test)]
mod testing;

pub use drivers::bgg::{BggClient, BggConfig};
pub use drivers::bot::{BotContext, BotDriver, Outcome};
pub use drivers::reddit::{
    spawn_comment_source, Producers, RedditClient, RedditCredentials, SourceConfig,
};
pub use pipeline::{InfoRequest, ReplyPipeline};
pub use traits::{GameLookup, RedditApi};

use domain::Renderer;
use std::sync::Arc;
use storage::Db;
use tokio_util::sync::CancellationToken;
use tracing::info;

#[derive(Clone)]
pub struct BotConfig {
    pub bot_name: String,
    pub source: SourceConfig,
}

/// Runs producers and the command driver until `cancel_token` fires, then
/// waits for the producers to finish their current poll.
pub async fn start_with_cancel_token(
    config: BotConfig,
    db: Db,
    reddit: Arc<dyn RedditApi>,
    lookup: Arc<dyn GameLookup>,
    cancel_token: CancellationToken,
) -> anyhow::Result<()> {
    let renderer = Renderer::new(config.bot_name.clone());
    let ctx = BotContext {
        bot_name: config.bot_name.clone(),
        reddit: reddit.clone(),
        db: db.clone(),
        pipeline: ReplyPipeline::new(lookup, db, renderer.clone()),
        renderer,
    };

    let (rx, producers) = spawn_comment_source(reddit, config.source, cancel_token.clone())?;
    let driver = BotDriver::new(ctx);
    let result = driver.run(rx, cancel_token.clone()).await;

    info!("Stopping comment producers...");
    cancel_token.cancel();
    producers.join().await;
    result
}
