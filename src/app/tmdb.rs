// src/app/tmdb.rs
use std::time::Duration;

use once_cell::sync::OnceCell;
use reqwest::blocking::Client;
use tracing::debug;

use crate::app::error::{AppError, Result};
use crate::app::json::{movie_from_json, movies_from_json};
use crate::app::posters::encode_thumbnail;
use crate::app::types::{Movie, PosterSize, RemoteList};
use crate::config::AppConfig;

const API_KEY_PARAM: &str = "api_key";
// Trailers and reviews ride along with the detail request.
const APPEND_TO_RESPONSE: &str = "append_to_response=videos,reviews";

/// Remote side of the app: lists, details and poster thumbnails.
pub trait MovieSource: Send + Sync {
    fn fetch_movies(&self, list: RemoteList) -> Result<Vec<Movie>>;
    fn fetch_detail(&self, movie_id: i64) -> Result<Movie>;
    /// Poster bytes re-encoded as a JPEG thumbnail of `size`.
    fn fetch_poster(&self, poster_path: &str, size: PosterSize) -> Result<Vec<u8>>;
}

pub fn movies_url(api_base: &str, api_key: &str, list: RemoteList) -> String {
    format!(
        "{}/movie/{}?{API_KEY_PARAM}={}",
        api_base.trim_end_matches('/'),
        list.segment(),
        urlencoding::encode(api_key)
    )
}

pub fn movie_url(api_base: &str, api_key: &str, movie_id: i64) -> String {
    format!(
        "{}/movie/{}?{API_KEY_PARAM}={}&{APPEND_TO_RESPONSE}",
        api_base.trim_end_matches('/'),
        movie_id,
        urlencoding::encode(api_key)
    )
}

pub fn poster_url(image_base: &str, size: PosterSize, poster_path: &str) -> String {
    format!(
        "{}/{}/{}",
        image_base.trim_end_matches('/'),
        size.as_str(),
        poster_path.trim_start_matches('/')
    )
}

/// Drop the query string so API keys never reach the logs.
fn redact(url: &str) -> &str {
    url.split_once('?').map_or(url, |(path, _)| path)
}

pub struct TmdbClient {
    api_key: Option<String>,
    api_base: String,
    image_base: String,
    connect_timeout: Duration,
    read_timeout: Duration,
    http: OnceCell<Client>,
}

impl TmdbClient {
    pub fn new(cfg: &AppConfig) -> Self {
        Self {
            api_key: cfg.tmdb_api_key.clone(),
            api_base: cfg.api_base_url.clone(),
            image_base: cfg.image_base_url.clone(),
            connect_timeout: Duration::from_secs(cfg.connect_timeout_secs),
            read_timeout: Duration::from_secs(cfg.read_timeout_secs),
            http: OnceCell::new(),
        }
    }

    // Built on first use so offline runs never touch TLS setup.
    fn http(&self) -> Result<&Client> {
        self.http.get_or_try_init(|| {
            Ok(Client::builder()
                .user_agent(concat!("popmovies/", env!("CARGO_PKG_VERSION")))
                .connect_timeout(self.connect_timeout)
                .timeout(self.connect_timeout + self.read_timeout)
                .build()?)
        })
    }

    fn api_key(&self) -> Result<&str> {
        self.api_key.as_deref().ok_or(AppError::MissingApiKey)
    }

    fn get(&self, url: &str) -> Result<reqwest::blocking::Response> {
        debug!("GET {}", redact(url));
        let resp = self.http()?.get(url).send()?;
        if !resp.status().is_success() {
            return Err(AppError::HttpStatus {
                status: resp.status().as_u16(),
                url: redact(url).to_string(),
            });
        }
        Ok(resp)
    }

    pub fn get_text(&self, url: &str) -> Result<String> {
        Ok(self.get(url)?.text()?)
    }

    pub fn get_bytes(&self, url: &str) -> Result<Vec<u8>> {
        Ok(self.get(url)?.bytes()?.to_vec())
    }
}

impl MovieSource for TmdbClient {
    fn fetch_movies(&self, list: RemoteList) -> Result<Vec<Movie>> {
        let url = movies_url(&self.api_base, self.api_key()?, list);
        let movies = movies_from_json(&self.get_text(&url)?)?;
        debug!(list = list.segment(), count = movies.len(), "movie list downloaded");
        Ok(movies)
    }

    fn fetch_detail(&self, movie_id: i64) -> Result<Movie> {
        let url = movie_url(&self.api_base, self.api_key()?, movie_id);
        let movie = movie_from_json(&self.get_text(&url)?)?;
        debug!(movie_id, "movie details downloaded");
        Ok(movie)
    }

    fn fetch_poster(&self, poster_path: &str, size: PosterSize) -> Result<Vec<u8>> {
        let url = poster_url(&self.image_base, size, poster_path);
        let raw = self.get_bytes(&url)?;
        encode_thumbnail(&raw, size.width())
    }
}
