// src/app/detail.rs
//! Detail resolution is local-first: a stored favorite is served from the
//! store with its trailers and reviews and never touches the network.
use tracing::debug;

use crate::app::contract::ResourcePath;
use crate::app::error::Result;
use crate::app::favorites::{movie_from_row, review_from_row, trailer_from_row};
use crate::app::store::MovieStore;
use crate::app::tmdb::MovieSource;
use crate::app::types::{Movie, Review, Trailer};

/// Stored favorite `movie_id` with its children, or `None` if not stored.
pub fn load_local(store: &MovieStore, movie_id: i64) -> Result<Option<Movie>> {
    let rows = store.query(&ResourcePath::movie(movie_id), None, None, None)?;
    let Some(row) = rows.first() else {
        return Ok(None);
    };
    let mut movie = movie_from_row(&row)?;

    let trailer_rows = store.query(&ResourcePath::trailers_of(movie_id), None, None, None)?;
    movie.trailers = trailer_rows
        .iter()
        .map(|r| trailer_from_row(&r))
        .collect::<Result<Vec<Trailer>>>()?;

    let review_rows = store.query(&ResourcePath::reviews_of(movie_id), None, None, None)?;
    movie.reviews = review_rows
        .iter()
        .map(|r| review_from_row(&r))
        .collect::<Result<Vec<Review>>>()?;

    Ok(Some(movie))
}

pub fn resolve_detail(store: &MovieStore, source: &dyn MovieSource, movie_id: i64) -> Result<Movie> {
    if let Some(movie) = load_local(store, movie_id)? {
        debug!(movie_id, "detail served from local store");
        return Ok(movie);
    }
    debug!(movie_id, "detail not stored, asking remote");
    source.fetch_detail(movie_id)
}
