use serde::{Deserialize, Serialize};
use std::fmt;

pub const BOARDGAME_KIND: &str = "boardgame";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CommentKind {
    /// Seen in a subreddit comment stream.
    Comment,
    /// Delivered through the inbox as a username mention.
    Mention,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: String,
    pub fullname: String,
    pub body: String,
    // None for deleted accounts
    pub author: Option<String>,
    pub subreddit: String,
    pub parent_id: String,
    pub link_id: String,
    pub kind: CommentKind,
}

impl Comment {
    /// A comment directly under a submission has a `t3_` parent.
    pub fn is_root(&self) -> bool {
        self.parent_id.starts_with("t3_")
    }

    pub fn is_authored_by(&self, user: &str) -> bool {
        self.author
            .as_deref()
            .map(|a| a.eq_ignore_ascii_case(user))
            .unwrap_or(false)
    }
}

impl fmt::Display for Comment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} by {} in r/{}",
            self.fullname,
            self.author.as_deref().unwrap_or("[deleted]"),
            self.subreddit
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alias {
    pub canonical: String,
    pub alias: String,
}

/// One row of a name search. `name` is whichever name matched, primary or alternate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit {
    pub id: u64,
    pub name: String,
    pub kind: String,
}

impl SearchHit {
    pub fn is_boardgame(&self) -> bool {
        self.kind == BOARDGAME_KIND
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rank {
    pub friendly_name: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GameRecord {
    pub id: u64,
    pub name: String,
    pub year: Option<i32>,
    pub designers: Vec<String>,
    pub mechanics: Vec<String>,
    pub rating_average: f64,
    pub users_rated: u64,
    pub ranks: Vec<Rank>,
    pub description: String,
    pub min_players: Option<u32>,
    pub max_players: Option<u32>,
    pub playing_time: Option<u32>,
}

impl GameRecord {
    pub fn url(&self) -> String {
        format!("https://boardgamegeek.com/boardgame/{}", self.id)
    }
}
