use async_trait::async_trait;
use backon::{ConstantBuilder, Retryable};
use domain::{GameRecord, LookupError, SearchHit, BOARDGAME_KIND};
use reqwest::StatusCode;
use std::time::Duration;
use storage::Db;
use tracing::{debug, warn};

use super::xml;
use crate::traits::GameLookup;

#[derive(Debug, Clone)]
pub struct BggConfig {
    pub base_url: String,
    /// Bearer token for registered applications.
    pub token: Option<String>,
    pub user_agent: String,
    pub cache_ttl: Duration,
    pub retries: usize,
    pub retry_delay: Duration,
}

impl Default for BggConfig {
    fn default() -> Self {
        Self {
            base_url: "https://boardgamegeek.com/xmlapi2".to_string(),
            token: None,
            user_agent: format!("r2d8/{}", env!("CARGO_PKG_VERSION")),
            cache_ttl: Duration::from_secs(86400),
            retries: 3,
            retry_delay: Duration::from_secs(5),
        }
    }
}

pub struct BggClient {
    http: reqwest::Client,
    config: BggConfig,
    cache: Option<Db>,
}

impl BggClient {
    pub fn new(config: BggConfig, cache: Option<Db>) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self {
            http,
            config,
            cache,
        })
    }

    fn request_key(endpoint: &str, query: &[(&str, String)]) -> String {
        let query = query
            .iter()
            .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&");
        format!("{}?{}", endpoint, query)
    }

    async fn fetch_once(&self, url: &str) -> Result<String, LookupError> {
        let mut req = self.http.get(url);
        if let Some(token) = &self.config.token {
            req = req.bearer_auth(token);
        }
        let resp = req
            .send()
            .await
            .map_err(|e| LookupError::Transport(e.to_string()))?;

        let status = resp.status();
        // BGG answers 202 while it prepares a thing response
        if status == StatusCode::ACCEPTED {
            return Err(LookupError::Queued);
        }
        if !status.is_success() {
            return Err(LookupError::Status {
                status: status.as_u16(),
            });
        }
        resp.text()
            .await
            .map_err(|e| LookupError::Transport(e.to_string()))
    }

    async fn fetch(&self, endpoint: &str, query: &[(&str, String)]) -> Result<String, LookupError> {
        let key = Self::request_key(endpoint, query);

        if let Some(db) = &self.cache {
            match db.cached_response(&key, self.config.cache_ttl).await {
                Ok(Some(body)) => {
                    debug!("BGG cache hit for {}", key);
                    return Ok(body);
                }
                Ok(None) => {}
                Err(e) => warn!("BGG cache read failed for {}: {:?}", key, e),
            }
        }

        let url = format!("{}/{}", self.config.base_url.trim_end_matches('/'), key);
        let backoff = ConstantBuilder::default()
            .with_delay(self.config.retry_delay)
            .with_max_times(self.config.retries);
        let body = (|| self.fetch_once(&url))
            .retry(backoff)
            .when(LookupError::is_transient)
            .notify(|e: &LookupError, dur: Duration| {
                warn!("BGG request {} failed: {}. Retrying in {:?}", key, e, dur);
            })
            .await?;

        if let Some(db) = &self.cache {
            if let Err(e) = db.store_response(&key, &body).await {
                warn!("BGG cache write failed for {}: {:?}", key, e);
            }
        }
        Ok(body)
    }
}

#[async_trait]
impl GameLookup for BggClient {
    async fn search(&self, name: &str) -> Result<Vec<SearchHit>, LookupError> {
        let body = self
            .fetch(
                "search",
                &[
                    ("query", name.to_string()),
                    ("type", BOARDGAME_KIND.to_string()),
                ],
            )
            .await?;
        xml::parse_search(&body)
    }

    async fn game(&self, id: u64) -> Result<GameRecord, LookupError> {
        let body = self
            .fetch("thing", &[("id", id.to_string()), ("stats", "1".to_string())])
            .await?;
        xml::parse_thing(&body, id)
    }
}
