// src/app/types.rs
use chrono::{Datelike, NaiveDate};

pub const YOUTUBE_BASE_URL: &str = "https://www.youtube.com/watch?v=";

// ---- list selection ----
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MovieQuery {
    Popular,
    TopRated,
    Favorites,
}

impl MovieQuery {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Popular => "popular",
            Self::TopRated => "top_rated",
            Self::Favorites => "favorites",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "popular" => Some(Self::Popular),
            "top_rated" | "top-rated" | "toprated" => Some(Self::TopRated),
            "favorites" | "favourites" | "favorite" => Some(Self::Favorites),
            _ => None,
        }
    }

    /// Remote list backing this query; favorites never leave the device.
    pub const fn remote(self) -> Option<RemoteList> {
        match self {
            Self::Popular => Some(RemoteList::Popular),
            Self::TopRated => Some(RemoteList::TopRated),
            Self::Favorites => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RemoteList {
    Popular,
    TopRated,
}

impl RemoteList {
    /// Path segment under `/movie/`.
    pub const fn segment(self) -> &'static str {
        match self {
            Self::Popular => "popular",
            Self::TopRated => "top_rated",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PosterSize {
    W92,  // detail thumbnail
    W185, // grid poster
}

impl PosterSize {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::W92 => "w92",
            Self::W185 => "w185",
        }
    }

    pub const fn width(self) -> u32 {
        match self {
            Self::W92 => 92,
            Self::W185 => 185,
        }
    }
}

// ---- records ----
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Trailer {
    pub trailer_id: String,
    pub key: String,
    pub name: String,
    pub site: String,
    pub kind: String,
}

impl Trailer {
    pub fn playback_url(&self) -> Option<String> {
        if self.site.eq_ignore_ascii_case("youtube") && !self.key.is_empty() {
            Some(format!("{YOUTUBE_BASE_URL}{}", self.key))
        } else {
            None
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Review {
    pub review_id: String,
    pub author: String,
    pub content: String,
    pub url: String,
}

/// A movie as shown in lists and the detail view.
///
/// Movies decoded from TMDb carry no poster bytes and `favorite == false`;
/// movies read back from the local store carry both poster blobs and
/// `favorite == true`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Movie {
    pub movie_id: i64,
    pub poster_path: String,
    pub small_poster: Option<Vec<u8>>,
    pub large_poster: Option<Vec<u8>>,
    pub overview: String,
    pub release_date: String,
    pub title: String,
    pub runtime: i64,
    pub vote_average: f64,
    pub trailers: Vec<Trailer>,
    pub reviews: Vec<Review>,
    pub favorite: bool,
}

impl Movie {
    pub fn release_year(&self) -> Option<i32> {
        NaiveDate::parse_from_str(self.release_date.trim(), "%Y-%m-%d")
            .ok()
            .map(|d| d.year())
    }

    /// "Title (YYYY)" when the release date parses.
    pub fn display_title(&self) -> String {
        match self.release_year() {
            Some(y) => format!("{} ({})", self.title, y),
            None => self.title.clone(),
        }
    }

    pub fn has_posters(&self) -> bool {
        self.small_poster.as_ref().is_some_and(|b| !b.is_empty())
            && self.large_poster.as_ref().is_some_and(|b| !b.is_empty())
    }
}

/// Encoded thumbnails handed to the favorite workflow.
#[derive(Clone, Debug, Default)]
pub struct PosterBytes {
    pub small: Vec<u8>,
    pub large: Option<Vec<u8>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_parses_cli_spellings() {
        assert_eq!(MovieQuery::from_str("top-rated"), Some(MovieQuery::TopRated));
        assert_eq!(MovieQuery::from_str(" Popular "), Some(MovieQuery::Popular));
        assert_eq!(MovieQuery::from_str("favourites"), Some(MovieQuery::Favorites));
        assert_eq!(MovieQuery::from_str("upcoming"), None);
        assert_eq!(MovieQuery::Favorites.remote(), None);
        assert_eq!(MovieQuery::TopRated.remote().map(RemoteList::segment), Some("top_rated"));
    }

    #[test]
    fn release_year_and_title() {
        let movie = Movie {
            title: "Fight Club".into(),
            release_date: "1999-10-15".into(),
            ..Movie::default()
        };
        assert_eq!(movie.release_year(), Some(1999));
        assert_eq!(movie.display_title(), "Fight Club (1999)");

        let undated = Movie {
            title: "Untitled".into(),
            release_date: String::new(),
            ..Movie::default()
        };
        assert_eq!(undated.display_title(), "Untitled");
    }

    #[test]
    fn only_youtube_trailers_have_playback_url() {
        let yt = Trailer {
            key: "SUXWAEX2jlg".into(),
            site: "YouTube".into(),
            ..Trailer::default()
        };
        assert_eq!(
            yt.playback_url().as_deref(),
            Some("https://www.youtube.com/watch?v=SUXWAEX2jlg")
        );
        let vimeo = Trailer {
            key: "123".into(),
            site: "Vimeo".into(),
            ..Trailer::default()
        };
        assert_eq!(vimeo.playback_url(), None);
    }
}
