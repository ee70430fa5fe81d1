// src/app/json.rs
//! TMDb response bodies -> `Movie` records.
use serde::Deserialize;

use crate::app::error::Result;
use crate::app::types::{Movie, Review, Trailer};

#[derive(Debug, Deserialize)]
struct MovieListResponse {
    results: Vec<MovieSummaryDto>,
}

#[derive(Debug, Deserialize)]
struct MovieSummaryDto {
    id: i64,
    poster_path: Option<String>,
    overview: String,
    release_date: String,
    title: String,
    vote_average: f64,
}

#[derive(Debug, Deserialize)]
struct MovieDetailDto {
    id: i64,
    poster_path: Option<String>,
    overview: String,
    release_date: String,
    title: String,
    runtime: Option<i64>,
    vote_average: f64,
    videos: ResultsDto<VideoDto>,
    reviews: ResultsDto<ReviewDto>,
}

#[derive(Debug, Deserialize)]
struct ResultsDto<T> {
    results: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct VideoDto {
    id: String,
    key: String,
    name: String,
    site: String,
    #[serde(rename = "type")]
    kind: String,
}

#[derive(Debug, Deserialize)]
struct ReviewDto {
    id: String,
    author: String,
    content: String,
    url: String,
}

/// Decode `/movie/popular` or `/movie/top_rated`. List entries carry no
/// runtime, trailers or reviews.
pub fn movies_from_json(raw: &str) -> Result<Vec<Movie>> {
    let parsed: MovieListResponse = serde_json::from_str(raw)?;
    Ok(parsed
        .results
        .into_iter()
        .map(|m| Movie {
            movie_id: m.id,
            poster_path: m.poster_path.unwrap_or_default(),
            overview: m.overview,
            release_date: m.release_date,
            title: m.title,
            vote_average: m.vote_average,
            ..Movie::default()
        })
        .collect())
}

/// Decode `/movie/{id}?append_to_response=videos,reviews`.
pub fn movie_from_json(raw: &str) -> Result<Movie> {
    let m: MovieDetailDto = serde_json::from_str(raw)?;
    let trailers = m
        .videos
        .results
        .into_iter()
        .map(|v| Trailer {
            trailer_id: v.id,
            key: v.key,
            name: v.name,
            site: v.site,
            kind: v.kind,
        })
        .collect();
    let reviews = m
        .reviews
        .results
        .into_iter()
        .map(|r| Review {
            review_id: r.id,
            author: r.author,
            content: r.content,
            url: r.url,
        })
        .collect();

    Ok(Movie {
        movie_id: m.id,
        poster_path: m.poster_path.unwrap_or_default(),
        small_poster: None,
        large_poster: None,
        overview: m.overview,
        release_date: m.release_date,
        title: m.title,
        runtime: m.runtime.unwrap_or(0),
        vote_average: m.vote_average,
        trailers,
        reviews,
        favorite: false,
    })
}
