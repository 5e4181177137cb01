use crate::models::{Alias, GameRecord};
use crate::protocol::not_found_link;

/// More games than this and the reply falls back to one line each.
pub const SHORT_MODE_THRESHOLD: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Short,
    Standard,
    Long,
}

impl Mode {
    /// Only `short` and `long` can be requested; `standard` is the default.
    pub fn from_argument(arg: &str) -> Option<Self> {
        match arg.to_ascii_lowercase().as_str() {
            "short" => Some(Self::Short),
            "long" => Some(Self::Long),
            _ => None,
        }
    }

    pub fn select(requested: Option<Mode>, found: usize) -> Self {
        match requested {
            Some(mode) => mode,
            None if found > SHORT_MODE_THRESHOLD => Self::Short,
            None => Self::Standard,
        }
    }

    fn separator(&self) -> &'static str {
        match self {
            Self::Short => "\n",
            Self::Standard | Self::Long => "-----\n",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Renderer {
    bot_name: String,
}

impl Renderer {
    pub fn new(bot_name: impl Into<String>) -> Self {
        Self {
            bot_name: bot_name.into(),
        }
    }

    pub fn header(&self) -> String {
        format!(
            "*^({} issues a series of sophisticated bleeps and whistles...)*\n\n",
            self.bot_name
        )
    }

    pub fn footer(&self) -> String {
        format!(
            "\n\n-------------\n\
             ^({} is a bot. Looks a little like a trash can, but you shouldn't hold that against him.) \
             [^Submit ^questions, ^abuse, ^and ^bug ^reports ^here.](/r/r2d8)",
            self.bot_name
        )
    }

    pub fn wrap(&self, body: &str) -> String {
        format!("{}{}{}", self.header(), body, self.footer())
    }

    /// Full reply for a set of games, or `None` when there is nothing to say.
    pub fn render(&self, mode: Mode, games: &[GameRecord], not_found: &[String]) -> Option<String> {
        let mut blocks: Vec<String> = games
            .iter()
            .map(|g| match mode {
                Mode::Short => short_block(g),
                Mode::Standard => standard_block(g, "Details for"),
                Mode::Long => long_block(g),
            })
            .collect();

        if !not_found.is_empty() {
            let links = not_found
                .iter()
                .map(|n| not_found_link(n))
                .collect::<Vec<_>>()
                .join(", ");
            let block = match mode {
                Mode::Short => format!("\n\n-----\nBolded items not found at BGG: {}\n\n", links),
                _ => format!("Bolded items not found at BGG: {}\n\n", links),
            };
            blocks.push(block);
        }

        if blocks.is_empty() {
            return None;
        }
        Some(self.wrap(&blocks.join(mode.separator())))
    }

    pub fn render_aliases(&self, aliases: &[Alias]) -> String {
        if aliases.is_empty() {
            return self.wrap("No aliases are defined.");
        }
        let lines = aliases
            .iter()
            .map(|a| format!(" * {} → {}", a.alias, a.canonical))
            .collect::<Vec<_>>()
            .join("\n");
        self.wrap(&format!("Current aliases:\n\n{}", lines))
    }

    pub fn render_added_aliases(&self, added: &[Alias]) -> String {
        let lines = added
            .iter()
            .map(|a| format!(" * **{}** → **{}**", a.alias, a.canonical))
            .collect::<Vec<_>>()
            .join("\n");
        self.wrap(&format!("Added aliases:\n\n{}", lines))
    }
}

fn designers(game: &GameRecord) -> String {
    if game.designers.is_empty() {
        "Unknown".to_string()
    } else {
        game.designers.join(", ")
    }
}

fn year(game: &GameRecord) -> String {
    game.year
        .map(|y| y.to_string())
        .unwrap_or_else(|| "?".to_string())
}

fn short_block(game: &GameRecord) -> String {
    format!(
        " * [**{}**]({})  ({}) by {}",
        game.name,
        game.url(),
        year(game),
        designers(game)
    )
}

fn stats_lines(game: &GameRecord) -> String {
    let mut info = String::new();
    if !game.mechanics.is_empty() {
        info.push_str(&format!(" * Mechanics: {}\n", game.mechanics.join(", ")));
    }
    let people = if game.users_rated > 1 { "people" } else { "person" };
    info.push_str(&format!(
        " * Average rating is {:.2}; rated by {} {}\n",
        game.rating_average, game.users_rated, people
    ));
    if !game.ranks.is_empty() {
        let ranks = game
            .ranks
            .iter()
            .map(|r| format!("{}: {}", r.friendly_name, r.value))
            .collect::<Vec<_>>()
            .join(", ");
        info.push_str(&format!(" * {}\n", ranks));
    }
    info
}

fn standard_block(game: &GameRecord, lead: &str) -> String {
    format!(
        "{} [**{}**]({})  ({}) by {}\n\n{}\n",
        lead,
        game.name,
        game.url(),
        year(game),
        designers(game),
        stats_lines(game)
    )
}

fn players_line(game: &GameRecord) -> Option<String> {
    let players = match (game.min_players, game.max_players) {
        (Some(min), Some(max)) if min == max => format!("{}", min),
        (Some(min), Some(max)) => format!("{}-{}", min, max),
        _ => return None,
    };
    Some(match game.playing_time {
        Some(t) if t > 0 => format!(" * Players: {}; playing time {} minutes\n", players, t),
        _ => format!(" * Players: {}\n", players),
    })
}

fn long_block(game: &GameRecord) -> String {
    let mut info = format!(
        "Details about [**{}**]({})  ({}) by {}\n\n{}",
        game.name,
        game.url(),
        year(game),
        designers(game),
        stats_lines(game)
    );
    if let Some(line) = players_line(game) {
        info.push_str(&line);
    }
    info.push('\n');
    info.push_str(&format!("Description:\n\n{}\n\n", game.description.trim()));
    info
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Rank;

    fn caverna() -> GameRecord {
        GameRecord {
            id: 102794,
            name: "Caverna: The Cave Farmers".to_string(),
            year: Some(2013),
            designers: vec!["Uwe Rosenberg".to_string()],
            mechanics: vec!["Worker Placement".to_string(), "Tile Placement".to_string()],
            rating_average: 8.05,
            users_rated: 41000,
            ranks: vec![
                Rank {
                    friendly_name: "Board Game Rank".to_string(),
                    value: "40".to_string(),
                },
                Rank {
                    friendly_name: "Strategy Game Rank".to_string(),
                    value: "33".to_string(),
                },
            ],
            description: "Dwarves in caves.".to_string(),
            min_players: Some(1),
            max_players: Some(7),
            playing_time: Some(210),
        }
    }

    #[test]
    fn test_mode_selection() {
        assert_eq!(Mode::select(None, 6), Mode::Standard);
        assert_eq!(Mode::select(None, 7), Mode::Short);
        assert_eq!(Mode::select(Some(Mode::Long), 20), Mode::Long);
        assert_eq!(Mode::from_argument("LONG"), Some(Mode::Long));
        assert_eq!(Mode::from_argument("standard"), None);
    }

    #[test]
    fn test_short_block() {
        assert_eq!(
            short_block(&caverna()),
            " * [**Caverna: The Cave Farmers**](https://boardgamegeek.com/boardgame/102794)  (2013) by Uwe Rosenberg"
        );
    }

    #[test]
    fn test_standard_block() {
        let expected = "Details for [**Caverna: The Cave Farmers**](https://boardgamegeek.com/boardgame/102794)  (2013) by Uwe Rosenberg\n\n \
* Mechanics: Worker Placement, Tile Placement\n \
* Average rating is 8.05; rated by 41000 people\n \
* Board Game Rank: 40, Strategy Game Rank: 33\n\n";
        assert_eq!(standard_block(&caverna(), "Details for"), expected);
    }

    #[test]
    fn test_single_rater_and_missing_designers() {
        let game = GameRecord {
            id: 1,
            name: "Obscure".to_string(),
            users_rated: 1,
            rating_average: 6.0,
            ..Default::default()
        };
        let block = standard_block(&game, "Details for");
        assert!(block.contains("(?) by Unknown"));
        assert!(block.contains("rated by 1 person\n"));
        assert!(!block.contains("Mechanics"));
    }

    #[test]
    fn test_long_block_has_description_and_players() {
        let block = long_block(&caverna());
        assert!(block.starts_with("Details about [**Caverna: The Cave Farmers**]"));
        assert!(block.contains(" * Players: 1-7; playing time 210 minutes\n"));
        assert!(block.ends_with("Description:\n\nDwarves in caves.\n\n"));
    }

    #[test]
    fn test_render_nothing() {
        let r = Renderer::new("r2d8");
        assert_eq!(r.render(Mode::Standard, &[], &[]), None);
    }

    #[test]
    fn test_render_short_with_not_found() {
        let r = Renderer::new("r2d8");
        let reply = r
            .render(Mode::Short, &[caverna()], &["Agricoola".to_string()])
            .unwrap();
        assert!(reply.starts_with(&r.header()));
        assert!(reply.ends_with(&r.footer()));
        assert!(reply.contains("by Uwe Rosenberg\n\n\n-----\nBolded items not found at BGG: [Agricoola]("));
    }

    #[test]
    fn test_render_standard_joins_blocks() {
        let r = Renderer::new("r2d8");
        let mut other = caverna();
        other.id = 2;
        other.name = "Caverna: Cave vs Cave".to_string();
        let reply = r.render(Mode::Standard, &[caverna(), other], &[]).unwrap();
        assert_eq!(reply.matches("-----\nDetails for").count(), 1);
        assert!(reply.contains("r2d8 issues a series"));
    }

    #[test]
    fn test_render_not_found_only() {
        let r = Renderer::new("r2d8");
        let reply = r
            .render(Mode::Standard, &[], &["Nope".to_string()])
            .unwrap();
        assert!(reply.contains("Bolded items not found at BGG: [Nope]("));
    }

    #[test]
    fn test_render_aliases() {
        let r = Renderer::new("r2d8");
        let aliases = vec![Alias {
            canonical: "7 Wonders".to_string(),
            alias: "Seven Wonders".to_string(),
        }];
        assert!(r.render_aliases(&aliases).contains(" * Seven Wonders → 7 Wonders"));
        assert!(r.render_aliases(&[]).contains("No aliases are defined."));
    }
}
