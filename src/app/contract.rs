// src/app/contract.rs
//! Table names, column names and the resource paths that address them.
//!
//! A path is `movies`, `trailers` or `reviews`, optionally followed by a
//! movie id segment (`trailers/550`) that scopes the call to one movie.
use std::fmt;

use crate::app::error::{AppError, Result};

pub const AUTHORITY: &str = "popmovies";

pub const COLUMN_ROW_ID: &str = "_id";
pub const COLUMN_MOVIE_ID: &str = "movie_id";

pub mod movies {
    pub const TABLE: &str = "movies";
    pub const OVERVIEW: &str = "overview";
    pub const RELEASE_DATE: &str = "release_date";
    pub const TITLE: &str = "title";
    pub const RUNTIME: &str = "runtime";
    pub const VOTE_AVERAGE: &str = "vote_average";
    pub const W92_POSTER: &str = "w92_poster";
    pub const W185_POSTER: &str = "w185_poster";
    pub const POSTER_PATH: &str = "poster_path";
    pub const FAVORITE: &str = "favorite";
}

pub mod trailers {
    pub const TABLE: &str = "trailers";
    pub const TRAILER_ID: &str = "trailer_id";
    pub const KEY: &str = "key";
    pub const NAME: &str = "name";
    pub const SITE: &str = "site";
    pub const TYPE: &str = "type";
}

pub mod reviews {
    pub const TABLE: &str = "reviews";
    pub const REVIEW_ID: &str = "review_id";
    pub const AUTHOR: &str = "author";
    pub const CONTENT: &str = "content";
    pub const URL: &str = "url";
}

const MOVIE_COLUMNS: &[&str] = &[
    COLUMN_ROW_ID,
    COLUMN_MOVIE_ID,
    movies::OVERVIEW,
    movies::RELEASE_DATE,
    movies::TITLE,
    movies::RUNTIME,
    movies::VOTE_AVERAGE,
    movies::W92_POSTER,
    movies::W185_POSTER,
    movies::POSTER_PATH,
    movies::FAVORITE,
];

const TRAILER_COLUMNS: &[&str] = &[
    COLUMN_ROW_ID,
    trailers::TRAILER_ID,
    trailers::KEY,
    trailers::NAME,
    trailers::SITE,
    trailers::TYPE,
    COLUMN_MOVIE_ID,
];

const REVIEW_COLUMNS: &[&str] = &[
    COLUMN_ROW_ID,
    reviews::REVIEW_ID,
    reviews::AUTHOR,
    reviews::CONTENT,
    reviews::URL,
    COLUMN_MOVIE_ID,
];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Resource {
    Movies,
    Trailers,
    Reviews,
}

impl Resource {
    pub const ALL: [Self; 3] = [Self::Movies, Self::Trailers, Self::Reviews];

    pub const fn table(self) -> &'static str {
        match self {
            Self::Movies => movies::TABLE,
            Self::Trailers => trailers::TABLE,
            Self::Reviews => reviews::TABLE,
        }
    }

    pub const fn columns(self) -> &'static [&'static str] {
        match self {
            Self::Movies => MOVIE_COLUMNS,
            Self::Trailers => TRAILER_COLUMNS,
            Self::Reviews => REVIEW_COLUMNS,
        }
    }

    pub fn from_segment(s: &str) -> Option<Self> {
        match s {
            "movies" => Some(Self::Movies),
            "trailers" => Some(Self::Trailers),
            "reviews" => Some(Self::Reviews),
            _ => None,
        }
    }

    /// Resolve a caller-supplied column name to the static one, rejecting
    /// anything the table does not declare.
    pub fn column(self, name: &str) -> Result<&'static str> {
        self.columns()
            .iter()
            .copied()
            .find(|c| *c == name)
            .ok_or_else(|| AppError::UnknownColumn {
                table: self.table(),
                column: name.to_string(),
            })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ResourcePath {
    pub resource: Resource,
    pub movie_id: Option<i64>,
}

impl ResourcePath {
    pub const fn all(resource: Resource) -> Self {
        Self {
            resource,
            movie_id: None,
        }
    }

    pub const fn for_movie(resource: Resource, movie_id: i64) -> Self {
        Self {
            resource,
            movie_id: Some(movie_id),
        }
    }

    pub const fn movies() -> Self {
        Self::all(Resource::Movies)
    }

    pub const fn movie(movie_id: i64) -> Self {
        Self::for_movie(Resource::Movies, movie_id)
    }

    pub const fn trailers_of(movie_id: i64) -> Self {
        Self::for_movie(Resource::Trailers, movie_id)
    }

    pub const fn reviews_of(movie_id: i64) -> Self {
        Self::for_movie(Resource::Reviews, movie_id)
    }

    pub const fn is_scoped(&self) -> bool {
        self.movie_id.is_some()
    }

    /// True when a change at one path concerns an observer on the other:
    /// same resource and either side bare or both on the same movie.
    pub fn overlaps(&self, other: &Self) -> bool {
        self.resource == other.resource
            && match (self.movie_id, other.movie_id) {
                (Some(a), Some(b)) => a == b,
                _ => true,
            }
    }

    /// Parse `movies`, `trailers/550`, optionally prefixed with
    /// `content://popmovies/`.
    pub fn parse(raw: &str) -> Result<Self> {
        let unsupported = || AppError::UnsupportedResource(raw.to_string());
        let trimmed = raw.trim();
        let path = trimmed
            .strip_prefix("content://")
            .map(|rest| rest.strip_prefix(AUTHORITY).unwrap_or(rest))
            .unwrap_or(trimmed)
            .trim_matches('/');

        let mut segments = path.split('/');
        let resource = segments
            .next()
            .and_then(Resource::from_segment)
            .ok_or_else(unsupported)?;
        let movie_id = match segments.next() {
            None => None,
            Some(seg) => Some(seg.parse::<i64>().map_err(|_| unsupported())?),
        };
        if segments.next().is_some() {
            return Err(unsupported());
        }
        Ok(Self { resource, movie_id })
    }
}

impl fmt::Display for ResourcePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.movie_id {
            Some(id) => write!(f, "{}/{}", self.resource.table(), id),
            None => f.write_str(self.resource.table()),
        }
    }
}

/// Reference to a single inserted row, returned by `MovieStore::insert`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RowUri {
    pub resource: Resource,
    pub row_id: i64,
}

impl fmt::Display for RowUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "content://{AUTHORITY}/{}/{}",
            self.resource.table(),
            self.row_id
        )
    }
}
