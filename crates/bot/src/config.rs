use adapter::{BggConfig, RedditCredentials, SourceConfig};
use config::builder::{ConfigBuilder, DefaultState};
use config::ConfigError;
use serde::{Deserialize, Deserializer};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;
use storage::Db;
use tracing::info;

const ENV_PREFIX: &str = "R2D8_";

#[derive(Deserialize, Clone, Debug)]
pub struct Settings {
    pub bot: BotSettings,
    pub database: DatabaseSettings,
    pub reddit: RedditSettings,
    pub bgg: BggSettings,
}

#[derive(Deserialize, Clone, Debug)]
pub struct BotSettings {
    #[serde(default, deserialize_with = "string_or_list")]
    pub subreddits: Vec<String>,
    pub mentions: bool,
    pub comment_interval_secs: u64,
    pub mention_interval_secs: u64,
    pub retry_delay_secs: u64,
    /// Added to the seeded admins at startup.
    #[serde(default, deserialize_with = "string_or_list")]
    pub admins: Vec<String>,
    /// Comments from these accounts are recorded but never answered.
    #[serde(default, deserialize_with = "string_or_list")]
    pub ignored_users: Vec<String>,
}

#[derive(Deserialize, Clone, Debug)]
pub struct DatabaseSettings {
    pub path: String,
}

#[derive(Deserialize, Clone, Debug)]
pub struct RedditSettings {
    /// Also the name the bot answers to in `/u/<name>` invocations.
    pub username: String,
    pub password: String,
    pub client_id: String,
    pub client_secret: String,
    pub user_agent: Option<String>,
}

#[derive(Deserialize, Clone, Debug)]
pub struct BggSettings {
    pub base_url: String,
    pub token: Option<String>,
    pub cache_ttl_secs: u64,
    pub retries: usize,
    pub retry_delay_secs: u64,
}

impl Settings {
    /// Defaults, then `config.toml` and `config.<RUN_MODE>.toml`, then the
    /// optional `extra` file, then `R2D8_*` environment variables.
    pub fn new(extra: Option<&Path>) -> Result<Self, ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());
        let env_json = serde_json::to_string(&collect_env_vars(std::env::vars()))
            .map_err(|e| ConfigError::Foreign(Box::new(e)))?;

        let mut builder = with_defaults(config::Config::builder())?
            .add_source(config::File::with_name("config").required(false))
            .add_source(config::File::with_name(&format!("config.{}", run_mode)).required(false));

        if let Some(path) = extra {
            builder = builder.add_source(config::File::from(path).required(true));
        }

        builder
            .add_source(config::File::from_str(&env_json, config::FileFormat::Json))
            .build()?
            .try_deserialize()
    }

    /// Writes the configured admins and ignored users into the store.
    pub async fn register_users(&self, db: &Db) -> anyhow::Result<()> {
        for admin in &self.bot.admins {
            db.add_admin(admin).await?;
        }
        for user in &self.bot.ignored_users {
            db.ignore_user(user).await?;
        }
        if !self.bot.ignored_users.is_empty() {
            info!("Ignoring comments from {}", self.bot.ignored_users.join(", "));
        }
        Ok(())
    }

    pub fn user_agent(&self) -> String {
        self.reddit.user_agent.clone().unwrap_or_else(|| {
            format!(
                "{} bot v{} by /u/{}",
                self.reddit.username,
                env!("CARGO_PKG_VERSION"),
                self.reddit.username
            )
        })
    }

    pub fn reddit_credentials(&self) -> RedditCredentials {
        RedditCredentials {
            client_id: self.reddit.client_id.clone(),
            client_secret: self.reddit.client_secret.clone(),
            username: self.reddit.username.clone(),
            password: self.reddit.password.clone(),
            user_agent: self.user_agent(),
        }
    }

    pub fn source_config(&self) -> SourceConfig {
        SourceConfig {
            subreddits: self.bot.subreddits.clone(),
            mentions: self.bot.mentions,
            comment_interval: Duration::from_secs(self.bot.comment_interval_secs),
            mention_interval: Duration::from_secs(self.bot.mention_interval_secs),
            retry_delay: Duration::from_secs(self.bot.retry_delay_secs),
        }
    }

    pub fn bgg_config(&self) -> BggConfig {
        BggConfig {
            base_url: self.bgg.base_url.trim_end_matches('/').to_string(),
            token: self.bgg.token.clone().filter(|t| !t.is_empty()),
            user_agent: self.user_agent(),
            cache_ttl: Duration::from_secs(self.bgg.cache_ttl_secs),
            retries: self.bgg.retries,
            retry_delay: Duration::from_secs(self.bgg.retry_delay_secs),
        }
    }
}

fn with_defaults(
    builder: ConfigBuilder<DefaultState>,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    builder
        .set_default("bot.subreddits", Vec::<String>::new())?
        .set_default("bot.mentions", true)?
        .set_default("bot.comment_interval_secs", 5)?
        .set_default("bot.mention_interval_secs", 2)?
        .set_default("bot.retry_delay_secs", 30)?
        .set_default("database.path", "r2d8.db")?
        .set_default("reddit.username", "r2d8")?
        .set_default("reddit.password", "")?
        .set_default("reddit.client_id", "")?
        .set_default("reddit.client_secret", "")?
        .set_default("bgg.base_url", "https://boardgamegeek.com/xmlapi2")?
        .set_default("bgg.cache_ttl_secs", 86400)?
        .set_default("bgg.retries", 3)?
        .set_default("bgg.retry_delay_secs", 5)
}

/// `R2D8_REDDIT__CLIENT_ID` becomes `reddit.client_id`.
fn collect_env_vars(vars: impl Iterator<Item = (String, String)>) -> HashMap<String, String> {
    vars.filter(|(k, _)| k.starts_with(ENV_PREFIX))
        .map(|(k, v)| {
            let new_key = k
                .trim_start_matches(ENV_PREFIX)
                .replace("__", ".")
                .to_lowercase();
            (new_key, v)
        })
        .collect()
}

/// Lists come from TOML arrays or from comma-separated environment values.
fn string_or_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrList {
        One(String),
        Many(Vec<String>),
    }

    let items = match StringOrList::deserialize(deserializer)? {
        StringOrList::One(s) => s.split(',').map(str::to_string).collect(),
        StringOrList::Many(v) => v,
    };
    Ok(items
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect())
}
