use crate::traits::GameLookup;
use domain::{protocol, GameRecord, LookupError, Mode, Renderer};
use rand::seq::SliceRandom;
use std::collections::HashSet;
use std::sync::Arc;
use storage::Db;
use tracing::{debug, error, info, warn};

/// Posts here get a random pick instead of what they asked for.
pub const JOKE_SUBREDDIT: &str = "boardgamescirclejerk";
pub const JOKE_TITLES: [&str; 3] = [
    "Dead of Winter: A Crossroads Game",
    "Ginkgopolis",
    "Machi Koro",
];

pub struct InfoRequest<'a> {
    pub body: &'a str,
    pub subreddit: &'a str,
    pub mode: Option<Mode>,
}

/// A bolded name as written, and the name it is looked up under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub written: String,
    pub name: String,
}

#[derive(Clone)]
pub struct ReplyPipeline {
    lookup: Arc<dyn GameLookup>,
    db: Db,
    renderer: Renderer,
}

impl ReplyPipeline {
    pub fn new(lookup: Arc<dyn GameLookup>, db: Db, renderer: Renderer) -> Self {
        Self {
            lookup,
            db,
            renderer,
        }
    }

    /// Bolded names with aliases applied, deduplicated by the resolved name.
    pub async fn candidates(&self, body: &str) -> anyhow::Result<Vec<Candidate>> {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for written in protocol::extract_candidates(body) {
            let name = match self.db.resolve_alias(&written).await? {
                Some(canonical) => {
                    debug!("Resolved alias {} -> {}", written, canonical);
                    canonical
                }
                None => written.clone(),
            };
            if seen.insert(name.clone()) {
                out.push(Candidate { written, name });
            }
        }
        Ok(out)
    }

    /// Every board game whose primary name is exactly `name`, newest first.
    pub async fn lookup(&self, name: &str) -> Result<Vec<GameRecord>, LookupError> {
        let hits = self.lookup.search(name).await?;
        let mut ids = HashSet::new();
        let mut games = Vec::new();
        for hit in hits.iter().filter(|h| h.is_boardgame() && h.name == name) {
            if !ids.insert(hit.id) {
                continue;
            }
            // search also matches alternate names
            let game = self.lookup.game(hit.id).await?;
            if game.name == name {
                games.push(game);
            }
        }
        games.sort_by(|a, b| b.year.cmp(&a.year));
        Ok(games)
    }

    pub async fn game_exists(&self, name: &str) -> bool {
        match self.lookup(name).await {
            Ok(games) => !games.is_empty(),
            Err(e) => {
                error!("Error checking BGG for {}: {}", name, e);
                false
            }
        }
    }

    /// The rendered reply for a request, or `None` when there is nothing to post.
    pub async fn build_reply(&self, req: InfoRequest<'_>) -> anyhow::Result<Option<String>> {
        let mut candidates = self.candidates(req.body).await?;
        if candidates.is_empty() {
            warn!("Got an info request, but nothing is bolded. Ignoring comment.");
            debug!("comment was: {}", req.body);
            return Ok(None);
        }

        let joke = req.subreddit.eq_ignore_ascii_case(JOKE_SUBREDDIT);
        let asked_for: Vec<String> = candidates.iter().map(|c| c.written.clone()).collect();
        if joke {
            let title = pick_joke_title().to_string();
            candidates = vec![Candidate {
                written: title.clone(),
                name: title,
            }];
        }

        let mut games = Vec::new();
        let mut seen_ids = HashSet::new();
        let mut not_found = Vec::new();
        for candidate in &candidates {
            info!("Asking BGG for info on {}", candidate.name);
            match self.lookup(&candidate.name).await {
                Ok(found) if !found.is_empty() => {
                    for game in found {
                        if seen_ids.insert(game.id) {
                            games.push(game);
                        }
                    }
                }
                Ok(_) => not_found.push(candidate.written.clone()),
                Err(e) => {
                    error!("Error getting info from BGG on {}: {}", candidate.name, e);
                    not_found.push(candidate.written.clone());
                }
            }
        }

        if joke {
            not_found = asked_for;
        }

        if !not_found.is_empty() {
            debug!("not found: {}", not_found.join(", "));
        }
        if games.is_empty() {
            warn!("Found no games for {} candidate(s)", candidates.len());
        } else {
            debug!(
                "Found games {}",
                games
                    .iter()
                    .map(|g| format!("{} ({:?})", g.name, g.year))
                    .collect::<Vec<_>>()
                    .join(", ")
            );
        }

        let mode = Mode::select(req.mode, games.len());
        Ok(self.renderer.render(mode, &games, &not_found))
    }
}

fn pick_joke_title() -> &'static str {
    JOKE_TITLES
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or(JOKE_TITLES[0])
}
