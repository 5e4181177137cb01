//! Reddit markdown conventions the bot reads and writes: bolded game names,
//! `**from**=**to**` pairs and the BGG search links it leaves for names it
//! could not find.

use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;

pub const SEARCH_URL_PREFIX: &str = "http://boardgamegeek.com/geeksearch.php";

fn bold_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\*\*([^*]+)\*\*").expect("bold pattern is valid"))
}

fn pair_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\*\*([^*]+)\*\*\s*=\s*\*\*([^*]+)\*\*").expect("pair pattern is valid")
    })
}

fn search_link_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(&format!(
            r"\[([^\]]+)\]\({}",
            regex::escape(SEARCH_URL_PREFIX)
        ))
        .expect("search link pattern is valid")
    })
}

/// Every distinct bolded run in `body`, in order of first appearance.
pub fn extract_candidates(body: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    bold_re()
        .captures_iter(body)
        .map(|c| c[1].trim().to_string())
        .filter(|name| !name.is_empty())
        .filter(|name| seen.insert(name.clone()))
        .collect()
}

/// `**left**=**right**` pairs, used by both `alias` and `repair`.
pub fn parse_pairs(body: &str) -> Vec<(String, String)> {
    pair_re()
        .captures_iter(body)
        .map(|c| (c[1].trim().to_string(), c[2].trim().to_string()))
        .filter(|(l, r)| !l.is_empty() && !r.is_empty())
        .collect()
}

pub fn search_url(name: &str) -> String {
    format!(
        "{}?action=search&objecttype=boardgame&q={}&B1=Go",
        SEARCH_URL_PREFIX,
        urlencoding::encode(name)
    )
}

pub fn not_found_link(name: &str) -> String {
    format!("[{}]({})", name, search_url(name))
}

/// Names the bot previously reported as not found in one of its replies.
pub fn not_found_names(reply_body: &str) -> Vec<String> {
    search_link_re()
        .captures_iter(reply_body)
        .map(|c| c[1].to_string())
        .collect()
}

/// Turns a previous bot reply back into something the reply pipeline can read:
/// each `[wrong]` link becomes `**right**`, and every name still reported as
/// not found is bolded again so it gets another lookup.
pub fn rewrite_for_repair(reply_body: &str, repairs: &[(String, String)]) -> String {
    let mut body = reply_body.to_string();
    for (wrong, right) in repairs {
        body = body.replace(&format!("[{}]", wrong), &format!("**{}**", right));
    }
    for name in not_found_names(&body) {
        body.push_str(&format!(" **{}**", name));
    }
    body
}
