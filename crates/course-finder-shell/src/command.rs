// SPDX-License-Identifier: AGPL-3.0
// Course Finder Shell - Commands

use std::str::FromStr;

pub const HELP: &str = "\
Commands:
  login <username> <password>   sign in
  logout                        sign out and clear favourites
  whoami                        show the current session
  avatar <image>                set the profile image
  search [query]                load courses (default: computer science)
  filter [text]                 filter loaded courses locally
  show <n>                      course details
  fav <n>                       add or remove course n from favourites
  unfav <key>                   remove a favourite by key
  favs                          list favourites
  clearfavs                     remove all favourites
  theme                         toggle light/dark theme
  help                          this text
  quit                          exit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Login { username: String, password: String },
    Logout,
    WhoAmI,
    Avatar(String),
    Search(Option<String>),
    Filter(Option<String>),
    Show(usize),
    Fav(usize),
    Unfav(String),
    Favs,
    ClearFavs,
    Theme,
    Help,
    Quit,
}

fn rest(args: &str) -> Option<String> {
    let args = args.trim();
    (!args.is_empty()).then(|| args.to_string())
}

fn index(args: &str) -> Result<usize, String> {
    match args.trim().parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(format!("Expected a course number, got {:?}", args.trim())),
    }
}

impl FromStr for Command {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (name, args) = line.split_once(char::is_whitespace).unwrap_or((line, ""));

        match name.to_lowercase().as_str() {
            "login" => {
                let mut parts = args.split_whitespace();
                match (parts.next(), parts.next(), parts.next()) {
                    (Some(username), Some(password), None) => Ok(Self::Login {
                        username: username.to_string(),
                        password: password.to_string(),
                    }),
                    _ => Err("Usage: login <username> <password>".to_string()),
                }
            }
            "logout" => Ok(Self::Logout),
            "whoami" => Ok(Self::WhoAmI),
            "avatar" => rest(args)
                .map(Self::Avatar)
                .ok_or_else(|| "Usage: avatar <image>".to_string()),
            "search" => Ok(Self::Search(rest(args))),
            "filter" => Ok(Self::Filter(rest(args))),
            "show" => index(args).map(Self::Show),
            "fav" => index(args).map(Self::Fav),
            "unfav" => rest(args)
                .map(Self::Unfav)
                .ok_or_else(|| "Usage: unfav <key>".to_string()),
            "favs" => Ok(Self::Favs),
            "clearfavs" => Ok(Self::ClearFavs),
            "theme" => Ok(Self::Theme),
            "help" | "?" => Ok(Self::Help),
            "quit" | "exit" => Ok(Self::Quit),
            "" => Err(String::new()),
            other => Err(format!("Unknown command '{}', try 'help'", other)),
        }
    }
}
