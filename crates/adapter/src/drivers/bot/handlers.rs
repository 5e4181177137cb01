use anyhow::Result;
use domain::{protocol, Alias, BotCommand, Comment, Invocation};
use tracing::{debug, error, info, warn};

use super::BotContext;
use crate::pipeline::InfoRequest;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Replied,
    Edited,
    /// Handled, but there was nothing worth posting.
    NothingToSay,
    AlreadyProcessed,
    Ignored(&'static str),
}

pub async fn handle(ctx: &BotContext, inv: &Invocation, comment: &Comment) -> Result<Outcome> {
    match inv.command {
        BotCommand::GetInfo => execute_getinfo(ctx, inv, comment).await,
        BotCommand::GetParentInfo => execute_getparentinfo(ctx, inv, comment).await,
        BotCommand::Repair => execute_repair(ctx, comment).await,
        BotCommand::Alias => execute_alias(ctx, comment).await,
        BotCommand::GetAliases => execute_getaliases(ctx, comment).await,
        BotCommand::Xyzzy => execute_xyzzy(ctx, comment).await,
    }
}

async fn execute_getinfo(ctx: &BotContext, inv: &Invocation, comment: &Comment) -> Result<Outcome> {
    let request = InfoRequest {
        body: &comment.body,
        subreddit: &comment.subreddit,
        mode: inv.mode(),
    };
    match ctx.pipeline.build_reply(request).await? {
        Some(reply) => {
            ctx.reddit.reply(&comment.fullname, &reply).await?;
            info!("Replied to info request for comment {}", comment.id);
            Ok(Outcome::Replied)
        }
        None => {
            warn!("Did not find anything to reply to in comment {}", comment.id);
            Ok(Outcome::NothingToSay)
        }
    }
}

async fn execute_getparentinfo(
    ctx: &BotContext,
    inv: &Invocation,
    comment: &Comment,
) -> Result<Outcome> {
    if comment.is_root() {
        info!("Got getparentinfo on root comment {}, ignoring.", comment.id);
        return Ok(Outcome::Ignored("no parent comment"));
    }
    let parent = match ctx.reddit.comment(&comment.parent_id).await? {
        Some(p) => p,
        None => {
            warn!("Parent {} of comment {} not found", comment.parent_id, comment.id);
            return Ok(Outcome::Ignored("parent not found"));
        }
    };

    let request = InfoRequest {
        body: &parent.body,
        subreddit: &parent.subreddit,
        mode: inv.mode(),
    };
    match ctx.pipeline.build_reply(request).await? {
        Some(reply) => {
            ctx.reddit.reply(&comment.fullname, &reply).await?;
            info!(
                "Replied to parent info request for comment {} (parent {})",
                comment.id, parent.id
            );
            Ok(Outcome::Replied)
        }
        None => {
            warn!("Did not find anything to reply to in parent {}", parent.id);
            Ok(Outcome::NothingToSay)
        }
    }
}

/// Rewrites the bot's earlier reply with corrected names and replaces it in place.
async fn execute_repair(ctx: &BotContext, comment: &Comment) -> Result<Outcome> {
    debug!("Got repair request, id {}", comment.id);

    if comment.is_root() {
        info!("Got a repair comment as root, ignoring.");
        return Ok(Outcome::Ignored("repair on root comment"));
    }

    let parent = match ctx.reddit.comment(&comment.parent_id).await? {
        Some(p) if p.is_authored_by(&ctx.bot_name) => p,
        _ => {
            info!("Parent of repair comment is not authored by the bot, ignoring.");
            return Ok(Outcome::Ignored("parent is not a bot reply"));
        }
    };

    let mut repairs = Vec::new();
    for (wrong, right) in protocol::parse_pairs(&comment.body) {
        let target = ctx.db.resolve_alias(&right).await?.unwrap_or_else(|| right.clone());
        if ctx.pipeline.game_exists(&target).await {
            repairs.push((wrong, right));
        } else {
            info!("Repair target {} is not a known game, skipping", right);
        }
    }

    let body = protocol::rewrite_for_repair(&parent.body, &repairs);

    // the original request's mode survives the repair
    let mode = if parent.is_root() {
        None
    } else {
        match ctx.reddit.comment(&parent.parent_id).await? {
            Some(gp) => Invocation::find(&gp.body, &ctx.bot_name).and_then(|inv| inv.mode()),
            None => {
                error!("Cannot find original GP post. Assuming normal mode.");
                None
            }
        }
    };

    let request = InfoRequest {
        body: &body,
        subreddit: &parent.subreddit,
        mode,
    };
    match ctx.pipeline.build_reply(request).await? {
        Some(new_reply) => {
            debug!("Replacing bot comment {} with: {}", parent.id, new_reply);
            ctx.reddit.edit(&parent.fullname, &new_reply).await?;
            info!("Repaired bot comment {}", parent.id);
            Ok(Outcome::Edited)
        }
        None => {
            warn!("Repair of {} produced nothing, leaving it alone", parent.id);
            Ok(Outcome::NothingToSay)
        }
    }
}

async fn execute_alias(ctx: &BotContext, comment: &Comment) -> Result<Outcome> {
    let author = comment.author.as_deref().unwrap_or_default();
    if !ctx.db.is_admin(author).await? {
        info!("Non-admin {} tried to add aliases, ignoring.", author);
        return Ok(Outcome::Ignored("not an admin"));
    }

    let pairs = protocol::parse_pairs(&comment.body);
    if pairs.is_empty() {
        warn!("Got alias command without any **from**=**to** pairs in {}", comment.id);
        return Ok(Outcome::NothingToSay);
    }

    let mut added = Vec::new();
    for (alias, canonical) in pairs {
        if ctx.db.add_alias(&alias, &canonical).await? {
            added.push(Alias { canonical, alias });
        } else {
            info!("Alias {} already defined, keeping existing mapping", alias);
        }
    }

    if added.is_empty() {
        return Ok(Outcome::NothingToSay);
    }
    ctx.reddit
        .reply(&comment.fullname, &ctx.renderer.render_added_aliases(&added))
        .await?;
    Ok(Outcome::Replied)
}

async fn execute_getaliases(ctx: &BotContext, comment: &Comment) -> Result<Outcome> {
    let aliases = ctx.db.list_aliases().await?;
    ctx.reddit
        .reply(&comment.fullname, &ctx.renderer.render_aliases(&aliases))
        .await?;
    info!("Sent {} aliases in reply to {}", aliases.len(), comment.id);
    Ok(Outcome::Replied)
}

async fn execute_xyzzy(ctx: &BotContext, comment: &Comment) -> Result<Outcome> {
    ctx.reddit.reply(&comment.fullname, "Nothing happens.").await?;
    Ok(Outcome::Replied)
}
