use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use crate::config::Settings;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Reddit bot that answers with board game details from BoardGameGeek", long_about = None)]
pub struct Args {
    /// Extra configuration file (TOML), read after config.toml
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Path of the bot database (ledger, aliases, admins, lookup cache)
    #[arg(short, long)]
    pub database: Option<PathBuf>,

    /// Reddit account to run the bot as
    #[arg(short, long)]
    pub user: Option<String>,

    /// Subreddit to watch. Can be given several times
    #[arg(short = 's', long = "subreddit")]
    pub subreddits: Vec<String>,

    /// Do not read username mentions from the inbox
    #[arg(long)]
    pub no_mentions: bool,

    /// The level at which to log. Mostly used for debugging
    #[arg(short, long, value_enum, default_value_t = LogLevel::None)]
    pub loglevel: LogLevel,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    None,
    All,
    Debug,
    Info,
    Warning,
    Error,
    Critical,
}

impl Args {
    /// Command-line flags win over every configuration source.
    pub fn apply(&self, settings: &mut Settings) {
        if let Some(path) = &self.database {
            settings.database.path = path.display().to_string();
        }
        if let Some(user) = &self.user {
            settings.reddit.username = user.clone();
        }
        if !self.subreddits.is_empty() {
            settings.bot.subreddits = self.subreddits.clone();
        }
        if self.no_mentions {
            settings.bot.mentions = false;
        }
    }
}
