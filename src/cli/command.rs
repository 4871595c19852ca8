use std::str::FromStr;

use thiserror::Error;

use crate::models::{AgeRating, FilterError, RatingRange, YearRange};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CommandError {
    #[error("Unknown command: {0} (type `help`)")]
    Unknown(String),

    #[error("Missing argument for `{0}`")]
    MissingArgument(&'static str),

    #[error("Invalid argument for `{command}`: {value}")]
    InvalidArgument { command: &'static str, value: String },

    #[error(transparent)]
    Filter(#[from] FilterError),
}

/// 终端命令
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// 按名称搜索；空文本表示清除搜索
    Search(String),
    Genres(Vec<String>),
    Country(Option<String>),
    Age(Option<AgeRating>),
    Rating(Option<RatingRange>),
    Years(Option<YearRange>),
    Limit(u32),
    More,
    /// 模拟滚动到底部
    Scroll,
    Reset,
    Refresh,
    List,
    Url,
    Open(String),
    Show(u64),
    Cast { id: u64, page: usize },
    Favorite(u64),
    Favorites,
    Unfavorite(u64),
    ClearFavorites,
    History,
    Forget(String),
    ClearHistory,
    Options,
    Studios(u32),
    Help,
    Quit,
}

pub const HELP: &str = "\
Commands:
  search <text>          search by name (empty text clears the search)
  genres <a, b, ...>     filter by genres (no argument clears)
  country <name>         filter by country (no argument clears)
  age <n>                filter by age rating, e.g. 16 or 16+
  rating <lo-hi>         filter by IMDb rating, e.g. 7-10
  years <start-end>      filter by release years, e.g. 1990-2000
  limit <n>              change page size
  more | scroll          load the next page
  reset                  clear all filters
  refresh | list         refetch / redraw the list
  url                    print the shareable query string
  open <url>             restore state from a url or query string
  show <id>              movie details
  cast <id> <page>       cast list page
  fav <id> | unfav <id>  toggle / remove a favorite
  favs | clear-favs      list / clear favorites
  history | forget <q> | clear-history
  options                genre and country option lists
  studios [page]         studios list
  help | quit";

fn optional_arg(rest: &str) -> Option<&str> {
    Some(rest.trim()).filter(|r| !r.is_empty())
}

fn parse_id(command: &'static str, rest: &str) -> Result<u64, CommandError> {
    let raw = optional_arg(rest).ok_or(CommandError::MissingArgument(command))?;
    raw.parse().map_err(|_| CommandError::InvalidArgument {
        command,
        value: raw.to_string(),
    })
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (name, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let rest = rest.trim();

        let command = match name.to_lowercase().as_str() {
            "search" | "s" => Command::Search(rest.to_string()),
            "genres" | "genre" => Command::Genres(
                rest.split(',')
                    .map(str::trim)
                    .filter(|g| !g.is_empty())
                    .map(str::to_string)
                    .collect(),
            ),
            "country" => Command::Country(optional_arg(rest).map(str::to_string)),
            "age" => Command::Age(optional_arg(rest).map(str::parse).transpose()?),
            "rating" => Command::Rating(optional_arg(rest).map(str::parse).transpose()?),
            "years" => Command::Years(optional_arg(rest).map(str::parse).transpose()?),
            "limit" => {
                let raw = optional_arg(rest).ok_or(CommandError::MissingArgument("limit"))?;
                Command::Limit(raw.parse().map_err(|_| CommandError::InvalidArgument {
                    command: "limit",
                    value: raw.to_string(),
                })?)
            }
            "more" => Command::More,
            "scroll" => Command::Scroll,
            "reset" => Command::Reset,
            "refresh" => Command::Refresh,
            "list" | "ls" => Command::List,
            "url" => Command::Url,
            "open" => Command::Open(
                optional_arg(rest)
                    .ok_or(CommandError::MissingArgument("open"))?
                    .to_string(),
            ),
            "show" => Command::Show(parse_id("show", rest)?),
            "cast" => {
                let mut parts = rest.split_whitespace();
                let id = parse_id("cast", parts.next().unwrap_or_default())?;
                let page = match parts.next() {
                    Some(raw) => raw
                        .parse::<usize>()
                        .ok()
                        .filter(|p| *p >= 1)
                        .ok_or_else(|| CommandError::InvalidArgument {
                            command: "cast",
                            value: raw.to_string(),
                        })?,
                    None => 1,
                };
                Command::Cast { id, page }
            }
            "fav" => Command::Favorite(parse_id("fav", rest)?),
            "favs" | "favorites" => Command::Favorites,
            "unfav" => Command::Unfavorite(parse_id("unfav", rest)?),
            "clear-favs" => Command::ClearFavorites,
            "history" => Command::History,
            "forget" => Command::Forget(
                optional_arg(rest)
                    .ok_or(CommandError::MissingArgument("forget"))?
                    .to_string(),
            ),
            "clear-history" => Command::ClearHistory,
            "options" => Command::Options,
            "studios" => Command::Studios(match optional_arg(rest) {
                Some(raw) => raw.parse().ok().filter(|p| *p >= 1).ok_or_else(|| {
                    CommandError::InvalidArgument {
                        command: "studios",
                        value: raw.to_string(),
                    }
                })?,
                None => 1,
            }),
            "help" | "?" => Command::Help,
            "quit" | "exit" | "q" => Command::Quit,
            other => return Err(CommandError::Unknown(other.to_string())),
        };
        Ok(command)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(line: &str) -> Result<Command, CommandError> {
        line.parse()
    }

    #[test]
    fn test_filter_commands() {
        assert_eq!(parse("search the matrix"), Ok(Command::Search("the matrix".to_string())));
        assert_eq!(parse("search"), Ok(Command::Search(String::new())));
        assert_eq!(
            parse("genres драма, комедия ,"),
            Ok(Command::Genres(vec!["драма".to_string(), "комедия".to_string()]))
        );
        assert_eq!(parse("genres"), Ok(Command::Genres(vec![])));
        assert_eq!(parse("country США"), Ok(Command::Country(Some("США".to_string()))));
        assert_eq!(parse("country"), Ok(Command::Country(None)));
        assert_eq!(parse("age 18+"), Ok(Command::Age(Some(AgeRating(18)))));
        assert_eq!(
            parse("rating 7-9"),
            Ok(Command::Rating(Some(RatingRange::new(7.0, 9.0).unwrap())))
        );
        assert_eq!(
            parse("years 1990-2000"),
            Ok(Command::Years(Some(YearRange::new(1990, 2000).unwrap())))
        );
        assert_eq!(parse("limit 20"), Ok(Command::Limit(20)));
    }

    #[test]
    fn test_navigation_commands() {
        assert_eq!(parse("  MORE "), Ok(Command::More));
        assert_eq!(parse("show 301"), Ok(Command::Show(301)));
        assert_eq!(parse("cast 301 2"), Ok(Command::Cast { id: 301, page: 2 }));
        assert_eq!(parse("cast 301"), Ok(Command::Cast { id: 301, page: 1 }));
        assert_eq!(parse("studios"), Ok(Command::Studios(1)));
        assert_eq!(parse("studios 3"), Ok(Command::Studios(3)));
        assert_eq!(
            parse("open ?page=2&genre=Drama"),
            Ok(Command::Open("?page=2&genre=Drama".to_string()))
        );
        assert_eq!(parse("forget alien"), Ok(Command::Forget("alien".to_string())));
        assert_eq!(parse("quit"), Ok(Command::Quit));
    }

    #[test]
    fn test_invalid_input() {
        assert_eq!(parse("dance"), Err(CommandError::Unknown("dance".to_string())));
        assert_eq!(parse("show"), Err(CommandError::MissingArgument("show")));
        assert!(matches!(parse("show abc"), Err(CommandError::InvalidArgument { .. })));
        assert!(matches!(parse("cast 1 0"), Err(CommandError::InvalidArgument { .. })));
        assert!(matches!(parse("rating 9-3"), Err(CommandError::Filter(_))));
        assert!(matches!(parse("years 2000"), Ok(Command::Years(Some(_)))));
        assert!(matches!(parse("limit lots"), Err(CommandError::InvalidArgument { .. })));
    }
}
