// src/app/favorites.rs
//! Mark/unmark favorites. A movie row exists in the store exactly while the
//! movie is a favorite; its trailer and review rows are written alongside.
use tracing::{debug, info, warn};

use crate::app::contract::{
    movies, reviews, trailers, Resource, ResourcePath, RowUri, COLUMN_MOVIE_ID,
};
use crate::app::error::{AppError, Result};
use crate::app::store::MovieStore;
use crate::app::types::{Movie, PosterBytes, Review, Trailer};
use crate::app::values::{ContentValues, RowView};

/// Children handling when a favorite is removed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChildPolicy {
    /// Delete trailer and review rows together with the movie row.
    Cascade,
    /// Delete only the movie row; children stay behind as orphans.
    Orphan,
}

impl ChildPolicy {
    pub const fn from_cascade(cascade: bool) -> Self {
        if cascade {
            Self::Cascade
        } else {
            Self::Orphan
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Removed {
    pub movies: usize,
    pub trailers: usize,
    pub reviews: usize,
}

pub(crate) fn movie_values(movie: &Movie, small: &[u8], large: &[u8]) -> ContentValues {
    ContentValues::new()
        .with(COLUMN_MOVIE_ID, movie.movie_id)
        .with(movies::OVERVIEW, movie.overview.clone())
        .with(movies::RELEASE_DATE, movie.release_date.clone())
        .with(movies::TITLE, movie.title.clone())
        .with(movies::RUNTIME, movie.runtime)
        .with(movies::VOTE_AVERAGE, movie.vote_average)
        .with(movies::W92_POSTER, small.to_vec())
        .with(movies::W185_POSTER, large.to_vec())
        .with(movies::POSTER_PATH, movie.poster_path.clone())
        .with(movies::FAVORITE, true)
}

pub(crate) fn trailer_values(movie_id: i64, t: &Trailer) -> ContentValues {
    ContentValues::new()
        .with(trailers::TRAILER_ID, t.trailer_id.clone())
        .with(trailers::KEY, t.key.clone())
        .with(trailers::NAME, t.name.clone())
        .with(trailers::SITE, t.site.clone())
        .with(trailers::TYPE, t.kind.clone())
        .with(COLUMN_MOVIE_ID, movie_id)
}

pub(crate) fn review_values(movie_id: i64, r: &Review) -> ContentValues {
    ContentValues::new()
        .with(reviews::REVIEW_ID, r.review_id.clone())
        .with(reviews::AUTHOR, r.author.clone())
        .with(reviews::CONTENT, r.content.clone())
        .with(reviews::URL, r.url.clone())
        .with(COLUMN_MOVIE_ID, movie_id)
}

/// Persist `movie` plus its trailers and reviews. The movie insert and the
/// two child batches are separate writes; each batch is atomic on its own.
/// When no large poster is supplied the small one fills both columns.
pub fn mark_favorite(store: &MovieStore, movie: &mut Movie, posters: PosterBytes) -> Result<RowUri> {
    if posters.small.is_empty() {
        return Err(AppError::MissingPoster(movie.movie_id));
    }
    let large = posters
        .large
        .filter(|b| !b.is_empty())
        .unwrap_or_else(|| posters.small.clone());

    let uri = store.insert(
        &ResourcePath::movies(),
        &movie_values(movie, &posters.small, &large),
    )?;
    debug!(movie_id = movie.movie_id, %uri, "movie inserted");

    let trailer_rows: Vec<ContentValues> = movie
        .trailers
        .iter()
        .map(|t| trailer_values(movie.movie_id, t))
        .collect();
    let n_trailers = store.bulk_insert(&ResourcePath::all(Resource::Trailers), &trailer_rows)?;

    let review_rows: Vec<ContentValues> = movie
        .reviews
        .iter()
        .map(|r| review_values(movie.movie_id, r))
        .collect();
    let n_reviews = store.bulk_insert(&ResourcePath::all(Resource::Reviews), &review_rows)?;

    info!(
        movie_id = movie.movie_id,
        trailers = n_trailers,
        reviews = n_reviews,
        "marked favorite"
    );
    movie.small_poster = Some(posters.small);
    movie.large_poster = Some(large);
    movie.favorite = true;
    Ok(uri)
}

/// Remove `movie` from the store. A favorite whose row is already gone is a
/// consistency violation, not a no-op.
pub fn unmark_favorite(store: &MovieStore, movie: &mut Movie, policy: ChildPolicy) -> Result<Removed> {
    let id = movie.movie_id;
    let removed_movies = store.delete(&ResourcePath::movie(id), None)?;
    if removed_movies == 0 {
        return Err(AppError::ConsistencyViolation(format!(
            "favorite movie {id} had no row to delete"
        )));
    }

    let (removed_trailers, removed_reviews) = match policy {
        ChildPolicy::Cascade => (
            store.delete(&ResourcePath::trailers_of(id), None)?,
            store.delete(&ResourcePath::reviews_of(id), None)?,
        ),
        ChildPolicy::Orphan => {
            warn!(movie_id = id, "leaving trailer/review rows behind");
            (0, 0)
        }
    };

    info!(
        movie_id = id,
        trailers = removed_trailers,
        reviews = removed_reviews,
        "unmarked favorite"
    );
    movie.favorite = false;
    movie.small_poster = None;
    movie.large_poster = None;
    Ok(Removed {
        movies: removed_movies,
        trailers: removed_trailers,
        reviews: removed_reviews,
    })
}

pub(crate) fn movie_from_row(row: &RowView<'_>) -> Result<Movie> {
    Ok(Movie {
        movie_id: row.get_i64(COLUMN_MOVIE_ID)?,
        poster_path: row.get_string(movies::POSTER_PATH)?,
        small_poster: row.get_blob(movies::W92_POSTER)?,
        large_poster: row.get_blob(movies::W185_POSTER)?,
        overview: row.get_string(movies::OVERVIEW)?,
        release_date: row.get_string(movies::RELEASE_DATE)?,
        title: row.get_string(movies::TITLE)?,
        runtime: row.get_i64(movies::RUNTIME)?,
        vote_average: row.get_f64(movies::VOTE_AVERAGE)?,
        trailers: Vec::new(),
        reviews: Vec::new(),
        favorite: row.get_bool(movies::FAVORITE)?,
    })
}

pub(crate) fn trailer_from_row(row: &RowView<'_>) -> Result<Trailer> {
    Ok(Trailer {
        trailer_id: row.get_string(trailers::TRAILER_ID)?,
        key: row.get_string(trailers::KEY)?,
        name: row.get_string(trailers::NAME)?,
        site: row.get_string(trailers::SITE)?,
        kind: row.get_string(trailers::TYPE)?,
    })
}

pub(crate) fn review_from_row(row: &RowView<'_>) -> Result<Review> {
    Ok(Review {
        review_id: row.get_string(reviews::REVIEW_ID)?,
        author: row.get_string(reviews::AUTHOR)?,
        content: row.get_string(reviews::CONTENT)?,
        url: row.get_string(reviews::URL)?,
    })
}

/// Every stored favorite with its poster blobs; children are not loaded.
pub fn list_favorites(store: &MovieStore) -> Result<Vec<Movie>> {
    let rows = store.query(&ResourcePath::movies(), None, None, None)?;
    let movies = rows
        .iter()
        .map(|row| movie_from_row(&row))
        .collect::<Result<Vec<_>>>()?;
    debug!(count = movies.len(), "local favorites loaded");
    Ok(movies)
}

pub fn is_favorite(store: &MovieStore, movie_id: i64) -> Result<bool> {
    let rows = store.query(
        &ResourcePath::movie(movie_id),
        Some(&[COLUMN_MOVIE_ID][..]),
        None,
        None,
    )?;
    Ok(!rows.is_empty())
}
