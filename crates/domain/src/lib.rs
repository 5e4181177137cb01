mod commands;
mod error;
mod models;
pub mod protocol;
pub mod render;

pub use commands::{BotCommand, Invocation, Scan};
pub use error::LookupError;
pub use models::{Alias, Comment, CommentKind, GameRecord, Rank, SearchHit, BOARDGAME_KIND};
pub use render::{Mode, Renderer};
