use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use domain::{Comment, CommentKind};
use serde::de::DeserializeOwned;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, info};

use super::models::{Listing, PostResponse, TokenResponse};
use crate::traits::RedditApi;

const AUTH_URL: &str = "https://www.reddit.com/api/v1/access_token";
const API_URL: &str = "https://oauth.reddit.com";
// refresh a little before Reddit expires the token
const TOKEN_SLACK: Duration = Duration::from_secs(60);

#[derive(Clone)]
pub struct RedditCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub username: String,
    pub password: String,
    pub user_agent: String,
}

struct AccessToken {
    value: String,
    expires_at: Instant,
}

/// Script-app OAuth client for the handful of endpoints the bot needs.
pub struct RedditClient {
    http: reqwest::Client,
    creds: RedditCredentials,
    token: Mutex<Option<AccessToken>>,
    auth_url: String,
    api_url: String,
}

impl RedditClient {
    pub fn new(creds: RedditCredentials) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(creds.user_agent.clone())
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self {
            http,
            creds,
            token: Mutex::new(None),
            auth_url: AUTH_URL.to_string(),
            api_url: API_URL.to_string(),
        })
    }

    pub fn username(&self) -> &str {
        &self.creds.username
    }

    /// Fetches a token up front so bad credentials fail at startup.
    pub async fn login(&self) -> Result<()> {
        info!("Connecting to reddit as {}", self.creds.username);
        self.access_token().await.map(|_| ())
    }

    async fn access_token(&self) -> Result<String> {
        let mut guard = self.token.lock().await;
        if let Some(token) = guard.as_ref() {
            if token.expires_at > Instant::now() {
                return Ok(token.value.clone());
            }
        }

        debug!("Requesting new reddit access token");
        let resp: TokenResponse = self
            .http
            .post(&self.auth_url)
            .basic_auth(&self.creds.client_id, Some(&self.creds.client_secret))
            .form(&[
                ("grant_type", "password"),
                ("username", self.creds.username.as_str()),
                ("password", self.creds.password.as_str()),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let value = match resp.access_token {
            Some(v) => v,
            None => bail!(
                "Reddit login failed: {}",
                resp.error.unwrap_or_else(|| "no token in response".to_string())
            ),
        };
        let lifetime = Duration::from_secs(resp.expires_in.unwrap_or(3600));
        *guard = Some(AccessToken {
            value: value.clone(),
            expires_at: Instant::now() + lifetime.saturating_sub(TOKEN_SLACK),
        });
        Ok(value)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, &str)]) -> Result<T> {
        let token = self.access_token().await?;
        let url = format!("{}{}", self.api_url, path);
        let resp = self
            .http
            .get(&url)
            .bearer_auth(token)
            .query(query)
            .query(&[("raw_json", "1")])
            .send()
            .await?
            .error_for_status()
            .with_context(|| format!("GET {}", path))?;
        Ok(resp.json().await?)
    }

    async fn post<T: DeserializeOwned>(&self, path: &str, form: &[(&str, &str)]) -> Result<T> {
        let token = self.access_token().await?;
        let url = format!("{}{}", self.api_url, path);
        let resp = self
            .http
            .post(&url)
            .bearer_auth(token)
            .form(form)
            .send()
            .await?
            .error_for_status()
            .with_context(|| format!("POST {}", path))?;
        Ok(resp.json().await?)
    }

    async fn submit_text(&self, path: &str, thing_id: &str, text: &str) -> Result<Comment> {
        let resp: PostResponse = self
            .post(
                path,
                &[("api_type", "json"), ("thing_id", thing_id), ("text", text)],
            )
            .await?;
        if !resp.json.errors.is_empty() {
            bail!("{} on {} rejected: {:?}", path, thing_id, resp.json.errors);
        }
        resp.json
            .data
            .and_then(|d| d.things.into_iter().next())
            .map(|t| t.data.into_comment(CommentKind::Comment))
            .ok_or_else(|| anyhow!("{} on {} returned no comment", path, thing_id))
    }
}

#[async_trait]
impl RedditApi for RedditClient {
    async fn subreddit_comments(&self, subreddits: &[String]) -> Result<Vec<Comment>> {
        let path = format!("/r/{}/comments", subreddits.join("+"));
        let listing: Listing = self.get(&path, &[("limit", "100")]).await?;
        Ok(listing.into_comments(CommentKind::Comment))
    }

    async fn unread_mentions(&self) -> Result<Vec<Comment>> {
        let listing: Listing = self.get("/message/unread", &[("limit", "100")]).await?;
        Ok(listing.into_mentions())
    }

    async fn mark_read(&self, fullnames: &[String]) -> Result<()> {
        if fullnames.is_empty() {
            return Ok(());
        }
        let ids = fullnames.join(",");
        let token = self.access_token().await?;
        self.http
            .post(format!("{}/api/read_message", self.api_url))
            .bearer_auth(token)
            .form(&[("id", ids.as_str())])
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    async fn comment(&self, fullname: &str) -> Result<Option<Comment>> {
        let listing: Listing = self.get("/api/info", &[("id", fullname)]).await?;
        Ok(listing.into_comments(CommentKind::Comment).into_iter().next())
    }

    async fn reply(&self, parent_fullname: &str, text: &str) -> Result<Comment> {
        self.submit_text("/api/comment", parent_fullname, text).await
    }

    async fn edit(&self, fullname: &str, text: &str) -> Result<Comment> {
        self.submit_text("/api/editusertext", fullname, text).await
    }
}
