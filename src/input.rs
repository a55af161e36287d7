//! Terminal command parsing.

use crate::events::UserCommand;
use crate::query::Media;

pub const HELP: &str = "\
commands:
  get                      search with the current term and media
  search [media] <term>    search for <term>; media is one of music, movie, podcast, musicVideo
  media <media>            change the selected media type
  play | pause | toggle    start or stop the slideshow
  grid                     list the images in every slot
  help                     show this text
  quit                     exit";

/// What the query field and media selector currently hold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prefill {
    pub term: String,
    pub media: Media,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Parsed {
    Command(UserCommand),
    Help,
    /// Input only changed the prefill.
    Updated,
    Empty,
}

/// Parses one line. `search` updates `prefill` the way typing into the
/// controls would. Without a term it reuses the prefilled one, which the app
/// still rejects if blank.
pub fn parse_line(line: &str, prefill: &mut Prefill) -> Result<Parsed, String> {
    let line = line.trim();
    let (verb, rest) = line
        .split_once(char::is_whitespace)
        .map(|(verb, rest)| (verb, rest.trim()))
        .unwrap_or((line, ""));

    let parsed = match verb {
        "" => Parsed::Empty,
        "get" => Parsed::Command(UserCommand::Search {
            term: prefill.term.clone(),
            media: prefill.media,
        }),
        "search" => {
            let (first, remainder) = rest
                .split_once(char::is_whitespace)
                .unwrap_or((rest, ""));
            let term = match first.parse::<Media>() {
                Ok(media) => {
                    prefill.media = media;
                    remainder.trim()
                }
                Err(_) => rest,
            };
            // no term typed: search again with what the field already holds
            if !term.is_empty() {
                prefill.term = term.to_string();
            }
            Parsed::Command(UserCommand::Search {
                term: prefill.term.clone(),
                media: prefill.media,
            })
        }
        "media" => {
            prefill.media = rest.parse::<Media>().map_err(|e| e.to_string())?;
            Parsed::Updated
        }
        "play" | "pause" | "toggle" => Parsed::Command(UserCommand::TogglePlay),
        "grid" => Parsed::Command(UserCommand::ShowGrid),
        "help" | "?" => Parsed::Help,
        "quit" | "exit" => Parsed::Command(UserCommand::Quit),
        other => return Err(format!("unknown command {other:?}; type `help`")),
    };
    Ok(parsed)
}
