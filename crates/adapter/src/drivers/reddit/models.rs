use domain::{Comment, CommentKind};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Listing {
    pub data: ListingData,
}

#[derive(Debug, Deserialize)]
pub struct ListingData {
    #[serde(default)]
    pub children: Vec<Thing>,
}

#[derive(Debug, Deserialize)]
pub struct Thing {
    pub kind: String,
    pub data: RawComment,
}

/// The subset of a `t1` (or inbox message) the bot reads.
#[derive(Debug, Deserialize)]
pub struct RawComment {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub body: String,
    pub author: Option<String>,
    pub subreddit: Option<String>,
    pub parent_id: Option<String>,
    pub link_id: Option<String>,
    pub subject: Option<String>,
}

impl RawComment {
    pub fn into_comment(self, kind: CommentKind) -> Comment {
        let author = self.author.filter(|a| a != "[deleted]");
        Comment {
            id: self.id,
            fullname: self.name,
            body: self.body.replace("\r\n", "\n"),
            author,
            subreddit: self.subreddit.unwrap_or_default(),
            parent_id: self.parent_id.unwrap_or_default(),
            link_id: self.link_id.unwrap_or_default(),
            kind,
        }
    }
}

impl Listing {
    /// Comments only, oldest first.
    pub fn into_comments(self, kind: CommentKind) -> Vec<Comment> {
        let mut out: Vec<Comment> = self
            .data
            .children
            .into_iter()
            .filter(|t| t.kind == "t1")
            .map(|t| t.data.into_comment(kind))
            .collect();
        out.reverse();
        out
    }

    pub fn into_mentions(self) -> Vec<Comment> {
        let mut out: Vec<Comment> = self
            .data
            .children
            .into_iter()
            .filter(|t| t.kind == "t1" && t.data.subject.as_deref() == Some("username mention"))
            .map(|t| t.data.into_comment(CommentKind::Mention))
            .collect();
        out.reverse();
        out
    }
}

#[derive(Debug, Deserialize)]
pub struct PostResponse {
    pub json: PostJson,
}

#[derive(Debug, Deserialize)]
pub struct PostJson {
    #[serde(default)]
    pub errors: Vec<serde_json::Value>,
    pub data: Option<PostData>,
}

#[derive(Debug, Deserialize)]
pub struct PostData {
    #[serde(default)]
    pub things: Vec<Thing>,
}

#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: Option<String>,
    pub expires_in: Option<u64>,
    pub error: Option<String>,
}
