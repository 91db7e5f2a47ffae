use serde::{Deserialize, Serialize};
use std::fmt::Display;

pub mod feedback;

pub use feedback::FeedbackRecord;

/// Sentinel label meaning "no genre filtering"
pub const ALL_GENRES: &str = "All";

/// One catalog row, immutable after load
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Anime {
    pub title: String,
    /// Comma-delimited genre labels, empty when the source had none
    pub genres: String,
    /// Mean user score, `None` when the source value was not numeric
    pub mean: Option<f64>,
    pub image: String,
    pub num_episodes: u32,
    pub rank: Option<u32>,
}

impl Anime {
    /// Individual genre labels of this item, in source order
    pub fn genre_labels(&self) -> impl Iterator<Item = &str> {
        self.genres
            .split(',')
            .map(str::trim)
            .filter(|label| !label.is_empty())
    }
}

/// Optional post-ranking genre predicate
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum GenreFilter {
    #[default]
    All,
    Genre(String),
}

impl GenreFilter {
    /// Parses a selector value; the sentinel "All" or a blank value disables filtering
    pub fn parse(value: &str) -> Self {
        let value = value.trim();
        if value.is_empty() || value == ALL_GENRES {
            GenreFilter::All
        } else {
            GenreFilter::Genre(value.to_string())
        }
    }

    /// True when `anime` passes the filter
    pub fn matches(&self, anime: &Anime) -> bool {
        match self {
            GenreFilter::All => true,
            GenreFilter::Genre(label) => anime.genres.contains(label.as_str()),
        }
    }
}

impl From<Option<String>> for GenreFilter {
    fn from(value: Option<String>) -> Self {
        value.map(|v| GenreFilter::parse(&v)).unwrap_or_default()
    }
}

impl Display for GenreFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GenreFilter::All => write!(f, "{}", ALL_GENRES),
            GenreFilter::Genre(label) => write!(f, "{}", label),
        }
    }
}

#[cfg(test)]
pub(crate) fn anime(title: &str, genres: &str) -> Anime {
    Anime {
        title: title.to_string(),
        genres: genres.to_string(),
        mean: None,
        image: String::new(),
        num_episodes: 0,
        rank: None,
    }
}
