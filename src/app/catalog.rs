// src/app/catalog.rs
use tracing::debug;

use crate::app::error::Result;
use crate::app::favorites::list_favorites;
use crate::app::store::MovieStore;
use crate::app::tmdb::MovieSource;
use crate::app::types::{Movie, MovieQuery};

/// Movies for one list screen. Favorites come from the store with their
/// posters; the other lists are fetched remotely (first page only).
pub fn load_movies(store: &MovieStore, source: &dyn MovieSource, query: MovieQuery) -> Result<Vec<Movie>> {
    let movies = match query.remote() {
        Some(list) => source.fetch_movies(list)?,
        None => list_favorites(store)?,
    };
    debug!(query = query.as_str(), count = movies.len(), "movie list loaded");
    Ok(movies)
}
