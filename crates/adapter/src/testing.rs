//! In-memory stand-ins for the Reddit and BGG collaborators.

use crate::traits::{GameLookup, RedditApi};
use anyhow::Result;
use async_trait::async_trait;
use domain::{Comment, CommentKind, GameRecord, LookupError, SearchHit, BOARDGAME_KIND};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

pub fn game(id: u64, name: &str, year: i32) -> GameRecord {
    GameRecord {
        id,
        name: name.to_string(),
        year: Some(year),
        designers: vec!["Somebody".to_string()],
        mechanics: vec!["Hand Management".to_string()],
        rating_average: 7.5,
        users_rated: 1200,
        ranks: Vec::new(),
        description: format!("All about {}.", name),
        min_players: Some(2),
        max_players: Some(4),
        playing_time: Some(60),
    }
}

pub fn comment(id: &str, parent_id: &str, author: &str, body: &str) -> Comment {
    Comment {
        id: id.to_string(),
        fullname: format!("t1_{}", id),
        body: body.to_string(),
        author: Some(author.to_string()),
        subreddit: "boardgames".to_string(),
        parent_id: parent_id.to_string(),
        link_id: "t3_post".to_string(),
        kind: CommentKind::Comment,
    }
}

#[derive(Default)]
pub struct FakeLookup {
    hits: HashMap<String, Vec<SearchHit>>,
    games: HashMap<u64, GameRecord>,
    failing: HashSet<String>,
    calls: AtomicUsize,
}

impl FakeLookup {
    pub fn with_game(self, record: GameRecord) -> Self {
        let name = record.name.clone();
        self.with_alternate(record.id, &name, record)
    }

    /// `hit_name` finds `record` through search even if its primary name differs.
    pub fn with_alternate(mut self, id: u64, hit_name: &str, record: GameRecord) -> Self {
        self.hits
            .entry(hit_name.to_string())
            .or_default()
            .push(SearchHit {
                id,
                name: hit_name.to_string(),
                kind: BOARDGAME_KIND.to_string(),
            });
        self.games.insert(record.id, record);
        self
    }

    pub fn failing(mut self, name: &str) -> Self {
        self.failing.insert(name.to_string());
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GameLookup for FakeLookup {
    async fn search(&self, name: &str) -> Result<Vec<SearchHit>, LookupError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.contains(name) {
            return Err(LookupError::Transport("connection reset".to_string()));
        }
        Ok(self.hits.get(name).cloned().unwrap_or_default())
    }

    async fn game(&self, id: u64) -> Result<GameRecord, LookupError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.games.get(&id).cloned().ok_or(LookupError::Missing(id))
    }
}

#[derive(Default)]
pub struct FakeReddit {
    pub comments: Mutex<HashMap<String, Comment>>,
    pub stream: Mutex<Vec<Comment>>,
    pub mentions: Mutex<Vec<Comment>>,
    pub replies: Mutex<Vec<(String, String)>>,
    pub edits: Mutex<Vec<(String, String)>>,
    pub read: Mutex<Vec<String>>,
    pub failures: AtomicUsize,
    next_id: AtomicUsize,
}

impl FakeReddit {
    pub fn with_comment(self, c: Comment) -> Self {
        self.comments
            .lock()
            .unwrap()
            .insert(c.fullname.clone(), c);
        self
    }

    pub fn replies(&self) -> Vec<(String, String)> {
        self.replies.lock().unwrap().clone()
    }

    pub fn edits(&self) -> Vec<(String, String)> {
        self.edits.lock().unwrap().clone()
    }
}

#[async_trait]
impl RedditApi for FakeReddit {
    async fn subreddit_comments(&self, _subreddits: &[String]) -> Result<Vec<Comment>> {
        if self.failures.load(Ordering::SeqCst) > 0 {
            self.failures.fetch_sub(1, Ordering::SeqCst);
            anyhow::bail!("503 Service Unavailable");
        }
        Ok(self.stream.lock().unwrap().clone())
    }

    async fn unread_mentions(&self) -> Result<Vec<Comment>> {
        Ok(self.mentions.lock().unwrap().clone())
    }

    async fn mark_read(&self, fullnames: &[String]) -> Result<()> {
        self.read.lock().unwrap().extend(fullnames.iter().cloned());
        Ok(())
    }

    async fn comment(&self, fullname: &str) -> Result<Option<Comment>> {
        Ok(self.comments.lock().unwrap().get(fullname).cloned())
    }

    async fn reply(&self, parent_fullname: &str, text: &str) -> Result<Comment> {
        self.replies
            .lock()
            .unwrap()
            .push((parent_fullname.to_string(), text.to_string()));
        let n = self.next_id.fetch_add(1, Ordering::SeqCst);
        Ok(comment(&format!("reply{}", n), parent_fullname, "r2d8", text))
    }

    async fn edit(&self, fullname: &str, text: &str) -> Result<Comment> {
        self.edits
            .lock()
            .unwrap()
            .push((fullname.to_string(), text.to_string()));
        let mut comments = self.comments.lock().unwrap();
        let edited = comments
            .get_mut(fullname)
            .ok_or_else(|| anyhow::anyhow!("no such comment {}", fullname))?;
        edited.body = text.to_string();
        Ok(edited.clone())
    }
}
