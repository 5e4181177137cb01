//! Serde mappings for the BGG XML API v2 `search` and `thing` responses.

use domain::{GameRecord, LookupError, Rank, SearchHit};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct ValueNode {
    #[serde(rename = "@value")]
    value: String,
}

impl ValueNode {
    fn parse<T: std::str::FromStr>(&self) -> Option<T> {
        self.value.trim().parse().ok()
    }
}

#[derive(Debug, Deserialize)]
struct NameNode {
    #[serde(rename = "@type", default)]
    kind: String,
    #[serde(rename = "@value")]
    value: String,
}

#[derive(Debug, Deserialize)]
struct SearchItems {
    #[serde(rename = "item", default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    #[serde(rename = "@type")]
    kind: String,
    #[serde(rename = "@id")]
    id: u64,
    name: Option<NameNode>,
}

#[derive(Debug, Deserialize)]
struct ThingItems {
    #[serde(rename = "item", default)]
    items: Vec<ThingItem>,
}

#[derive(Debug, Deserialize)]
struct ThingItem {
    #[serde(rename = "@id")]
    id: u64,
    #[serde(rename = "name", default)]
    names: Vec<NameNode>,
    description: Option<String>,
    yearpublished: Option<ValueNode>,
    minplayers: Option<ValueNode>,
    maxplayers: Option<ValueNode>,
    playingtime: Option<ValueNode>,
    #[serde(rename = "link", default)]
    links: Vec<LinkNode>,
    statistics: Option<Statistics>,
}

#[derive(Debug, Deserialize)]
struct LinkNode {
    #[serde(rename = "@type")]
    kind: String,
    #[serde(rename = "@value")]
    value: String,
}

#[derive(Debug, Deserialize)]
struct Statistics {
    ratings: Ratings,
}

#[derive(Debug, Deserialize)]
struct Ratings {
    usersrated: Option<ValueNode>,
    average: Option<ValueNode>,
    ranks: Option<Ranks>,
}

#[derive(Debug, Deserialize)]
struct Ranks {
    #[serde(rename = "rank", default)]
    ranks: Vec<RankNode>,
}

#[derive(Debug, Deserialize)]
struct RankNode {
    #[serde(rename = "@friendlyname")]
    friendly_name: String,
    #[serde(rename = "@value")]
    value: String,
}

pub fn parse_search(xml: &str) -> Result<Vec<SearchHit>, LookupError> {
    let parsed: SearchItems =
        quick_xml::de::from_str(xml).map_err(|e| LookupError::Parse(e.to_string()))?;
    Ok(parsed
        .items
        .into_iter()
        .filter_map(|item| {
            item.name.map(|name| SearchHit {
                id: item.id,
                name: name.value,
                kind: item.kind,
            })
        })
        .collect())
}

pub fn parse_thing(xml: &str, id: u64) -> Result<GameRecord, LookupError> {
    let parsed: ThingItems =
        quick_xml::de::from_str(xml).map_err(|e| LookupError::Parse(e.to_string()))?;
    parsed
        .items
        .into_iter()
        .find(|item| item.id == id)
        .map(into_record)
        .ok_or(LookupError::Missing(id))
}

fn links_of(links: &[LinkNode], kind: &str) -> Vec<String> {
    links
        .iter()
        .filter(|l| l.kind == kind)
        .map(|l| l.value.clone())
        .collect()
}

// BGG double-escapes entities, so they survive XML unescaping
fn clean_description(raw: &str) -> String {
    html_escape::decode_html_entities(raw)
        .replace("\r\n", "\n")
        .trim()
        .to_string()
}

fn positive(node: &Option<ValueNode>) -> Option<u32> {
    node.as_ref().and_then(|n| n.parse::<u32>()).filter(|v| *v > 0)
}

fn into_record(item: ThingItem) -> GameRecord {
    let name = item
        .names
        .iter()
        .find(|n| n.kind == "primary")
        .or_else(|| item.names.first())
        .map(|n| n.value.clone())
        .unwrap_or_default();

    let (rating_average, users_rated, ranks) = match &item.statistics {
        Some(stats) => {
            let r = &stats.ratings;
            let ranks = r
                .ranks
                .as_ref()
                .map(|rs| {
                    rs.ranks
                        .iter()
                        .map(|rank| Rank {
                            friendly_name: rank.friendly_name.clone(),
                            value: rank.value.clone(),
                        })
                        .collect()
                })
                .unwrap_or_default();
            (
                r.average.as_ref().and_then(|v| v.parse()).unwrap_or(0.0),
                r.usersrated.as_ref().and_then(|v| v.parse()).unwrap_or(0),
                ranks,
            )
        }
        None => (0.0, 0, Vec::new()),
    };

    GameRecord {
        id: item.id,
        name,
        year: item
            .yearpublished
            .as_ref()
            .and_then(|v| v.parse::<i32>())
            .filter(|y| *y != 0),
        designers: links_of(&item.links, "boardgamedesigner"),
        mechanics: links_of(&item.links, "boardgamemechanic"),
        rating_average,
        users_rated,
        ranks,
        description: clean_description(item.description.as_deref().unwrap_or_default()),
        min_players: positive(&item.minplayers),
        max_players: positive(&item.maxplayers),
        playing_time: positive(&item.playingtime),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEARCH: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<items total="3" termsofuse="https://boardgamegeek.com/xmlapi/termsofuse">
    <item type="boardgame" id="102794">
        <name type="primary" value="Caverna: The Cave Farmers"/>
        <yearpublished value="2013" />
    </item>
    <item type="boardgame" id="172225">
        <name type="primary" value="Caverna: Cave vs Cave"/>
        <yearpublished value="2017" />
    </item>
    <item type="boardgameexpansion" id="181279">
        <name type="primary" value="Caverna: The Forgotten Folk"/>
    </item>
</items>"#;

    const THING: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<items termsofuse="https://boardgamegeek.com/xmlapi/termsofuse">
    <item type="boardgame" id="102794">
        <thumbnail>https://cf.geekdo-images.com/thumb.jpg</thumbnail>
        <name type="primary" sortindex="1" value="Caverna: The Cave Farmers" />
        <name type="alternate" sortindex="1" value="Caverna" />
        <description>Caverna is a game about dwarves &amp;#10;&amp;#10;It plays 1&amp;ndash;7.</description>
        <yearpublished value="2013" />
        <minplayers value="1" />
        <maxplayers value="7" />
        <poll name="suggested_numplayers" title="User Suggested Number of Players" totalvotes="0">
            <results numplayers="1"><result value="Best" numvotes="0" /></results>
        </poll>
        <playingtime value="210" />
        <link type="boardgamecategory" id="1089" value="Animals" />
        <link type="boardgamemechanic" id="2001" value="Worker Placement" />
        <link type="boardgamemechanic" id="2002" value="Tile Placement" />
        <link type="boardgamedesigner" id="10" value="Uwe Rosenberg" />
        <link type="boardgamepublisher" id="2" value="Lookout Games" />
        <statistics page="1">
            <ratings>
                <usersrated value="41234" />
                <average value="8.04231" />
                <bayesaverage value="7.7" />
                <ranks>
                    <rank type="subtype" id="1" name="boardgame" friendlyname="Board Game Rank" value="40" bayesaverage="7.7" />
                    <rank type="family" id="5497" name="strategygames" friendlyname="Strategy Game Rank" value="Not Ranked" bayesaverage="Not Ranked" />
                </ranks>
                <stddev value="1.3" />
            </ratings>
        </statistics>
    </item>
</items>"#;

    #[test]
    fn test_parse_search() {
        let hits = parse_search(SEARCH).unwrap();
        assert_eq!(hits.len(), 3);
        assert_eq!(hits[0].id, 102794);
        assert_eq!(hits[0].name, "Caverna: The Cave Farmers");
        assert!(hits[0].is_boardgame());
        assert!(!hits[2].is_boardgame());
    }

    #[test]
    fn test_parse_empty_search() {
        let xml = r#"<items total="0" termsofuse="https://boardgamegeek.com/xmlapi/termsofuse"></items>"#;
        assert!(parse_search(xml).unwrap().is_empty());
    }

    #[test]
    fn test_parse_thing() {
        let game = parse_thing(THING, 102794).unwrap();
        assert_eq!(game.name, "Caverna: The Cave Farmers");
        assert_eq!(game.year, Some(2013));
        assert_eq!(game.designers, vec!["Uwe Rosenberg"]);
        assert_eq!(game.mechanics, vec!["Worker Placement", "Tile Placement"]);
        assert_eq!(game.users_rated, 41234);
        assert!((game.rating_average - 8.04231).abs() < 1e-9);
        assert_eq!(game.ranks.len(), 2);
        assert_eq!(game.ranks[1].value, "Not Ranked");
        assert_eq!(game.min_players, Some(1));
        assert_eq!(game.max_players, Some(7));
        assert_eq!(game.playing_time, Some(210));
        assert_eq!(
            game.description,
            "Caverna is a game about dwarves \n\nIt plays 1\u{2013}7."
        );
    }

    #[test]
    fn test_thing_missing_id() {
        assert!(matches!(
            parse_thing(THING, 1),
            Err(LookupError::Missing(1))
        ));
    }

    #[test]
    fn test_garbage_is_parse_error() {
        assert!(matches!(
            parse_search(r#"<items><item type="boardgame" id="abc"><name value="x"/></item></items>"#),
            Err(LookupError::Parse(_))
        ));
    }

    #[test]
    fn test_description_entities_are_decoded() {
        let xml = r#"<items><item type="boardgame" id="5">
            <name type="primary" value="Pokemon"/>
            <description>Pok&amp;eacute;mon&amp;#039;s &amp;lsquo;x&amp;rsquo; &amp;amp; more</description>
        </item></items>"#;
        let game = parse_thing(xml, 5).unwrap();
        assert_eq!(game.description, "Pok\u{e9}mon's \u{2018}x\u{2019} & more");
    }
}
