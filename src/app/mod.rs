// src/app/mod.rs: local movie cache, remote client and the favorite workflow

// ---- Local modules ----
pub mod catalog;
pub mod contract;
pub mod detail;
pub mod error;
pub mod favorites;
pub mod json;
pub mod net;
pub mod posters;
pub mod schema;
pub mod store;
pub mod tasks;
pub mod tmdb;
pub mod types;
pub mod values;

// ---- Standard lib imports ----
use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

pub use crate::app::contract::{Resource, ResourcePath, RowUri};
pub use crate::app::error::{AppError, Result};
pub use crate::app::favorites::{ChildPolicy, Removed};
pub use crate::app::store::MovieStore;
pub use crate::app::tmdb::MovieSource;
pub use crate::app::types::{Movie, MovieQuery, PosterBytes, PosterSize};
pub use crate::app::values::{ContentValues, RowSet, Selection};

use crate::app::net::{Gated, TcpProbe};
use crate::app::tmdb::TmdbClient;
use crate::config::AppConfig;

/// Outcome of a favorite toggle.
#[derive(Clone, Debug, PartialEq)]
pub enum FavoriteChange {
    Added(RowUri),
    Removed(Removed),
}

/// Process-wide wiring: one store, one (connectivity-gated) remote source.
/// Cheap to clone into background tasks.
#[derive(Clone)]
pub struct MoviesApp {
    store: MovieStore,
    remote: Arc<dyn MovieSource>,
    children: ChildPolicy,
}

impl MoviesApp {
    pub fn new(cfg: &AppConfig) -> Result<Self> {
        let store = MovieStore::open(&cfg.db_path())?;
        let probe = TcpProbe::new(
            cfg.probe_addr.clone(),
            Duration::from_millis(cfg.probe_timeout_ms),
        );
        let remote = Gated::new(probe, TmdbClient::new(cfg));
        info!(db = %cfg.db_path().display(), "movies app ready");
        Ok(Self::with_parts(
            store,
            Arc::new(remote),
            ChildPolicy::from_cascade(cfg.cascade_unfavorite),
        ))
    }

    pub fn with_parts(store: MovieStore, remote: Arc<dyn MovieSource>, children: ChildPolicy) -> Self {
        Self {
            store,
            remote,
            children,
        }
    }

    pub fn store(&self) -> &MovieStore {
        &self.store
    }

    pub fn load_movies(&self, query: MovieQuery) -> Result<Vec<Movie>> {
        catalog::load_movies(&self.store, self.remote.as_ref(), query)
    }

    pub fn movie_detail(&self, movie_id: i64) -> Result<Movie> {
        detail::resolve_detail(&self.store, self.remote.as_ref(), movie_id)
    }

    /// Download both poster sizes for `movie`. A missing large poster is
    /// tolerated; the small one is required.
    pub fn fetch_posters(&self, movie: &Movie) -> Result<PosterBytes> {
        if movie.poster_path.is_empty() {
            return Err(AppError::MissingPoster(movie.movie_id));
        }
        let small = self.remote.fetch_poster(&movie.poster_path, PosterSize::W92)?;
        let large = match self.remote.fetch_poster(&movie.poster_path, PosterSize::W185) {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                warn!(movie_id = movie.movie_id, "large poster unavailable: {e}");
                None
            }
        };
        Ok(PosterBytes { small, large })
    }

    /// Flip `movie` between stored favorite and transient remote movie.
    /// `movie` should carry its trailers and reviews (a detail result).
    pub fn toggle_favorite(&self, movie: &mut Movie) -> Result<FavoriteChange> {
        if movie.favorite {
            let removed = favorites::unmark_favorite(&self.store, movie, self.children)?;
            Ok(FavoriteChange::Removed(removed))
        } else {
            let posters = self.fetch_posters(movie)?;
            let uri = favorites::mark_favorite(&self.store, movie, posters)?;
            Ok(FavoriteChange::Added(uri))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::favorites::tests::fight_club;
    use crate::app::types::RemoteList;

    /// Remote with posters; the large size can be made to fail.
    struct Posters {
        large_ok: bool,
    }

    impl MovieSource for Posters {
        fn fetch_movies(&self, _list: RemoteList) -> Result<Vec<Movie>> {
            Ok(vec![fight_club()])
        }
        fn fetch_detail(&self, _movie_id: i64) -> Result<Movie> {
            Ok(fight_club())
        }
        fn fetch_poster(&self, _poster_path: &str, size: PosterSize) -> Result<Vec<u8>> {
            match size {
                PosterSize::W92 => Ok(vec![9, 2]),
                PosterSize::W185 if self.large_ok => Ok(vec![1, 8, 5]),
                PosterSize::W185 => Err(AppError::HttpStatus {
                    status: 404,
                    url: "w185".into(),
                }),
            }
        }
    }

    fn app(large_ok: bool, children: ChildPolicy) -> MoviesApp {
        MoviesApp::with_parts(
            MovieStore::open_in_memory().unwrap(),
            Arc::new(Posters { large_ok }),
            children,
        )
    }

    #[test]
    fn toggle_round_trip_through_the_store() {
        let app = app(true, ChildPolicy::Cascade);
        let mut movie = app.movie_detail(550).unwrap();
        assert!(!movie.favorite);

        let added = app.toggle_favorite(&mut movie).unwrap();
        assert!(matches!(added, FavoriteChange::Added(ref uri) if uri.resource == Resource::Movies));
        let stored = app.movie_detail(550).unwrap();
        assert!(stored.favorite);
        assert_eq!(stored.small_poster, Some(vec![9, 2]));
        assert_eq!(stored.large_poster, Some(vec![1, 8, 5]));
        assert_eq!(stored.trailers.len(), 2);

        let mut stored = stored;
        let removed = app.toggle_favorite(&mut stored).unwrap();
        assert_eq!(
            removed,
            FavoriteChange::Removed(Removed {
                movies: 1,
                trailers: 2,
                reviews: 1
            })
        );
        assert!(app.load_movies(MovieQuery::Favorites).unwrap().is_empty());
    }

    #[test]
    fn failed_large_poster_falls_back_to_small() {
        let app = app(false, ChildPolicy::Cascade);
        let mut movie = fight_club();
        app.toggle_favorite(&mut movie).unwrap();
        let stored = app.movie_detail(550).unwrap();
        assert_eq!(stored.large_poster, Some(vec![9, 2]));
    }

    #[test]
    fn movie_without_poster_path_cannot_be_favorited() {
        let app = app(true, ChildPolicy::Cascade);
        let mut movie = Movie {
            poster_path: String::new(),
            ..fight_club()
        };
        assert!(matches!(
            app.toggle_favorite(&mut movie),
            Err(AppError::MissingPoster(550))
        ));
    }

    #[test]
    fn clones_share_one_store() {
        let app = app(true, ChildPolicy::Orphan);
        let worker = app.clone();
        let rx = tasks::spawn_task("favorite", move || {
            let mut movie = fight_club();
            worker.toggle_favorite(&mut movie).map(|_| movie.movie_id)
        });
        assert_eq!(tasks::wait(&rx).unwrap().unwrap(), 550);
        assert_eq!(app.load_movies(MovieQuery::Favorites).unwrap().len(), 1);
    }
}
