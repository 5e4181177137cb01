use anyhow::Context;
use clap::Parser;
use dotenvy::dotenv;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use adapter::{BggClient, BotConfig, RedditClient};
use r2d8::cli::Args;
use r2d8::config::Settings;
use r2d8::logging;
use storage::Db;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    let args = Args::parse();
    logging::init(args.loglevel);

    let mut settings = Settings::new(args.config.as_deref()).context("Failed to load configuration")?;
    args.apply(&mut settings);

    let db = Db::open(&settings.database.path)
        .await
        .with_context(|| format!("Failed to open database {}", settings.database.path))?;
    settings
        .register_users(&db)
        .await
        .context("Failed to register configured users")?;

    let bgg_config = settings.bgg_config();
    match db.prune_responses(bgg_config.cache_ttl).await {
        Ok(0) => {}
        Ok(n) => info!("Pruned {} expired BGG responses", n),
        Err(e) => warn!("Failed to prune BGG response cache: {:?}", e),
    }

    let reddit = RedditClient::new(settings.reddit_credentials())?;
    reddit.login().await.context("Failed to log in to reddit")?;
    let lookup = BggClient::new(bgg_config, Some(db.clone()))?;

    let config = BotConfig {
        bot_name: reddit.username().to_string(),
        source: settings.source_config(),
    };

    let cancel_token = CancellationToken::new();
    let signal_token = cancel_token.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        signal_token.cancel();
    });

    info!("Starting {} bot", config.bot_name);
    if let Err(e) = adapter::start_with_cancel_token(
        config,
        db,
        Arc::new(reddit),
        Arc::new(lookup),
        cancel_token,
    )
    .await
    {
        error!("Bot stopped with error: {:?}", e);
        return Err(e);
    }

    info!("Bot exited cleanly");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match (signal(SignalKind::terminate()), signal(SignalKind::quit())) {
            (Ok(mut term), Ok(mut quit)) => {
                tokio::select! {
                    _ = term.recv() => {},
                    _ = quit.recv() => {},
                }
            }
            (Err(e), _) | (_, Err(e)) => {
                error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down gracefully...");
        },
        _ = terminate => {
            info!("Received termination signal, shutting down gracefully...");
        },
    }
}
