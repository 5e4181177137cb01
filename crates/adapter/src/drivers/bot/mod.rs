mod driver;
mod handlers;

pub use driver::BotDriver;
pub use handlers::Outcome;

use crate::pipeline::ReplyPipeline;
use crate::traits::RedditApi;
use domain::Renderer;
use std::sync::Arc;
use storage::Db;

/// What every command handler gets to work with.
#[derive(Clone)]
pub struct BotContext {
    pub bot_name: String,
    pub reddit: Arc<dyn RedditApi>,
    pub db: Db,
    pub pipeline: ReplyPipeline,
    pub renderer: Renderer,
}
