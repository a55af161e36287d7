use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::Deserialize;
use serde::de::{self, Deserializer};

use crate::error::QueryError;

/// Media categories the search API accepts for the `media` parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Media {
    #[default]
    Music,
    Movie,
    Podcast,
    MusicVideo,
}

impl Media {
    pub const ALL: &'static [Self] = &[Self::Music, Self::Movie, Self::Podcast, Self::MusicVideo];
    const NAMES: &'static [&'static str] = &["music", "movie", "podcast", "musicVideo"];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Music => "music",
            Self::Movie => "movie",
            Self::Podcast => "podcast",
            Self::MusicVideo => "musicVideo",
        }
    }
}

impl fmt::Display for Media {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Media {
    type Err = QueryError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|media| media.as_str() == raw)
            .ok_or_else(|| QueryError::UnknownMedia(raw.to_string()))
    }
}

impl<'de> Deserialize<'de> for Media {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse()
            .map_err(|_| de::Error::unknown_variant(&raw, Self::NAMES))
    }
}

/// A validated search: trimmed, non-empty term plus a media selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    term: String,
    media: Media,
}

impl SearchQuery {
    pub fn new(term: &str, media: Media) -> Result<Self, QueryError> {
        let term = term.trim();
        if term.is_empty() {
            return Err(QueryError::EmptyTerm);
        }
        Ok(Self {
            term: term.to_string(),
            media,
        })
    }

    pub fn term(&self) -> &str {
        &self.term
    }

    pub fn media(&self) -> Media {
        self.media
    }
}

/// Opaque reference to a remotely fetchable image. Compared by value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArtworkLocator(Arc<str>);

impl ArtworkLocator {
    pub fn new(raw: impl Into<Arc<str>>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ArtworkLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ArtworkLocator {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<String> for ArtworkLocator {
    fn from(raw: String) -> Self {
        Self::new(raw)
    }
}
