use crate::render::Mode;
use regex::Regex;
use std::fmt;

/// Everything the bot answers to. Matched case-insensitively after `/u/<bot>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BotCommand {
    GetInfo,
    GetParentInfo,
    Repair,
    Alias,
    GetAliases,
    Xyzzy,
}

impl BotCommand {
    pub fn parse(token: &str) -> Option<Self> {
        match token.to_ascii_lowercase().as_str() {
            "getinfo" => Some(Self::GetInfo),
            "getparentinfo" => Some(Self::GetParentInfo),
            "repair" => Some(Self::Repair),
            "alias" => Some(Self::Alias),
            "getaliases" => Some(Self::GetAliases),
            "xyzzy" => Some(Self::Xyzzy),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GetInfo => "getinfo",
            Self::GetParentInfo => "getparentinfo",
            Self::Repair => "repair",
            Self::Alias => "alias",
            Self::GetAliases => "getaliases",
            Self::Xyzzy => "xyzzy",
        }
    }
}

impl fmt::Display for BotCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub command: BotCommand,
    pub argument: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scan {
    Found(Invocation),
    /// The bot was addressed, but none of the tokens is a command.
    Unknown(Vec<String>),
    NotAddressed,
}

impl Invocation {
    /// Finds the first recognised `u/<bot> <command> [argument]` in `body`.
    pub fn scan(body: &str, bot_name: &str) -> Scan {
        let pattern = format!(
            r"(?i)\bu/{}\b[ \t]+(\w+)(?:[ \t]+(\w+))?",
            regex::escape(bot_name)
        );
        let re = match Regex::new(&pattern) {
            Ok(re) => re,
            Err(_) => return Scan::NotAddressed,
        };

        let mut unknown = Vec::new();
        for caps in re.captures_iter(body) {
            let token = &caps[1];
            match BotCommand::parse(token) {
                Some(command) => {
                    return Scan::Found(Invocation {
                        command,
                        argument: caps.get(2).map(|m| m.as_str().to_ascii_lowercase()),
                    })
                }
                None => unknown.push(token.to_string()),
            }
        }

        if unknown.is_empty() {
            Scan::NotAddressed
        } else {
            Scan::Unknown(unknown)
        }
    }

    pub fn find(body: &str, bot_name: &str) -> Option<Self> {
        match Self::scan(body, bot_name) {
            Scan::Found(inv) => Some(inv),
            _ => None,
        }
    }

    /// Explicit `short` / `long` argument, if one was given.
    pub fn mode(&self) -> Option<Mode> {
        self.argument.as_deref().and_then(Mode::from_argument)
    }
}
