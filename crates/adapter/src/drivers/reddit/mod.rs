mod client;
mod models;
pub mod source;

pub use client::{RedditClient, RedditCredentials};
pub use source::{spawn_comment_source, Producers, SourceConfig};
