//! Prints the merged comment stream (watched subreddits and mentions) to
//! stdout without answering anything. Useful to check credentials and the
//! subreddit list.

use anyhow::Context;
use clap::Parser;
use dotenvy::dotenv;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;

use adapter::{spawn_comment_source, RedditClient};
use r2d8::cli::{Args, LogLevel};
use r2d8::config::Settings;
use r2d8::logging;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    let args = Args::parse();
    logging::init(match args.loglevel {
        LogLevel::None => LogLevel::Debug,
        level => level,
    });

    let mut settings = Settings::new(args.config.as_deref()).context("Failed to load configuration")?;
    args.apply(&mut settings);

    let reddit = RedditClient::new(settings.reddit_credentials())?;
    reddit.login().await.context("Failed to log in to reddit")?;

    let cancel_token = CancellationToken::new();
    let (mut rx, producers) =
        spawn_comment_source(Arc::new(reddit), settings.source_config(), cancel_token.clone())?;

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            item = rx.recv() => match item {
                Some(comment) => println!("read item ({:?}): {}", comment.kind, comment),
                None => break,
            },
        }
    }

    info!("Stopping comment producers...");
    cancel_token.cancel();
    drop(rx);
    producers.join().await;
    Ok(())
}
