//! Two polling producers (subreddit comments, username mentions) feeding one queue.

use anyhow::{bail, Result};
use domain::Comment;
use std::collections::{HashSet, VecDeque};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::traits::RedditApi;

const QUEUE_CAPACITY: usize = 100;
const RECENT_WINDOW: usize = 1000;

#[derive(Debug, Clone)]
pub struct SourceConfig {
    pub subreddits: Vec<String>,
    pub mentions: bool,
    pub comment_interval: Duration,
    pub mention_interval: Duration,
    /// Fixed pause after a failed poll.
    pub retry_delay: Duration,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            subreddits: Vec::new(),
            mentions: true,
            comment_interval: Duration::from_secs(5),
            mention_interval: Duration::from_secs(2),
            retry_delay: Duration::from_secs(30),
        }
    }
}

/// Bounded memory of ids already queued, so overlapping polls do not re-queue.
struct RecentIds {
    order: VecDeque<String>,
    set: HashSet<String>,
    cap: usize,
}

impl RecentIds {
    fn new(cap: usize) -> Self {
        Self {
            order: VecDeque::with_capacity(cap),
            set: HashSet::with_capacity(cap),
            cap,
        }
    }

    fn insert(&mut self, id: &str) -> bool {
        if self.set.contains(id) {
            return false;
        }
        if self.order.len() == self.cap {
            if let Some(old) = self.order.pop_front() {
                self.set.remove(&old);
            }
        }
        self.order.push_back(id.to_string());
        self.set.insert(id.to_string());
        true
    }
}

pub struct Producers {
    handles: Vec<JoinHandle<()>>,
}

impl Producers {
    pub async fn join(self) {
        for handle in self.handles {
            if let Err(e) = handle.await {
                warn!("Comment producer panicked: {}", e);
            }
        }
    }
}

pub fn spawn_comment_source(
    reddit: Arc<dyn RedditApi>,
    config: SourceConfig,
    cancel_token: CancellationToken,
) -> Result<(mpsc::Receiver<Comment>, Producers)> {
    let (tx, rx) = mpsc::channel(QUEUE_CAPACITY);
    let mut handles = Vec::new();

    if !config.subreddits.is_empty() {
        let reddit = reddit.clone();
        let subreddits = config.subreddits.clone();
        info!("Watching comments in r/{}", subreddits.join("+"));
        handles.push(tokio::spawn(produce(
            "subreddit",
            tx.clone(),
            config.comment_interval,
            config.retry_delay,
            cancel_token.clone(),
            move || {
                let reddit = reddit.clone();
                let subreddits = subreddits.clone();
                async move { reddit.subreddit_comments(&subreddits).await }
            },
        )));
    }

    if config.mentions {
        let reddit = reddit.clone();
        info!("Watching username mentions");
        handles.push(tokio::spawn(produce(
            "mentions",
            tx.clone(),
            config.mention_interval,
            config.retry_delay,
            cancel_token.clone(),
            move || {
                let reddit = reddit.clone();
                async move { reddit.unread_mentions().await }
            },
        )));
    }

    if handles.is_empty() {
        bail!("Nothing to scan for comments: no subreddits and mentions disabled");
    }
    Ok((rx, Producers { handles }))
}

// An in-flight poll is allowed to finish; cancellation is checked between polls.
async fn produce<F, Fut>(
    name: &'static str,
    tx: mpsc::Sender<Comment>,
    interval: Duration,
    retry_delay: Duration,
    cancel_token: CancellationToken,
    mut poll: F,
) where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = Result<Vec<Comment>>> + Send,
{
    let mut recent = RecentIds::new(RECENT_WINDOW);

    while !cancel_token.is_cancelled() {
        let delay = match poll().await {
            Ok(items) => {
                let mut queued = 0;
                for comment in items {
                    if !recent.insert(&comment.id) {
                        continue;
                    }
                    if tx.send(comment).await.is_err() {
                        debug!("{} producer: queue closed", name);
                        return;
                    }
                    queued += 1;
                }
                if queued > 0 {
                    debug!("{} producer queued {} new item(s)", name, queued);
                }
                interval
            }
            Err(e) => {
                error!("{} poll failed: {:?}. Retrying in {:?}", name, e, retry_delay);
                retry_delay
            }
        };

        tokio::select! {
            _ = tokio::time::sleep(delay) => {},
            _ = cancel_token.cancelled() => break,
        }
    }
    info!("{} producer exiting", name);
}
