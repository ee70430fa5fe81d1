// src/main.rs
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing::{error, warn};
use tracing_subscriber::EnvFilter;

use popmovies::app::detail::load_local;
use popmovies::app::tasks::{spawn_task, wait};
use popmovies::app::{AppError, FavoriteChange, Movie, MovieQuery, MoviesApp, Result};
use popmovies::config::{load_config, API_KEY_ENV};

#[derive(Parser)]
#[command(author, version, about = "Popular and top-rated movies with an offline favorites cache")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List popular, top-rated or favorite movies
    List {
        #[arg(default_value = "popular", value_parser = parse_query)]
        query: MovieQuery,
    },
    /// Show one movie with its trailers and reviews
    Show { id: i64 },
    /// Store a movie (posters, trailers, reviews) for offline use
    Favorite { id: i64 },
    /// Drop a stored movie
    Unfavorite { id: i64 },
}

fn parse_query(raw: &str) -> std::result::Result<MovieQuery, String> {
    MovieQuery::from_str(raw).ok_or_else(|| format!("unknown list '{raw}' (popular, top-rated, favorites)"))
}

fn main() -> ExitCode {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init();

    let args = Args::parse();
    let cfg = load_config();
    let app = match MoviesApp::new(&cfg) {
        Ok(app) => app,
        Err(e) => {
            error!("could not open the movie store: {e}");
            return ExitCode::FAILURE;
        }
    };

    let worker = app.clone();
    let rx = spawn_task("cli", move || run(&worker, args.command));
    match wait(&rx) {
        Some(Ok(())) => ExitCode::SUCCESS,
        Some(Err(e)) => report(e),
        None => {
            error!("background task died");
            ExitCode::FAILURE
        }
    }
}

fn run(app: &MoviesApp, command: Command) -> Result<()> {
    match command {
        Command::List { query } => {
            let movies = match app.load_movies(query) {
                Ok(movies) => movies,
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => {
                    render_soft_error(&e);
                    Vec::new()
                }
            };
            print_list(query, &movies);
        }
        Command::Show { id } => match app.movie_detail(id) {
            Ok(movie) => print_detail(&movie),
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => {
                render_soft_error(&e);
                println!("No details for movie {id}.");
            }
        },
        Command::Favorite { id } => {
            let mut movie = app.movie_detail(id)?;
            if movie.favorite {
                println!("{} is already a favorite.", movie.display_title());
                return Ok(());
            }
            if let FavoriteChange::Added(uri) = app.toggle_favorite(&mut movie)? {
                println!("Saved {} ({uri}).", movie.display_title());
            }
        }
        Command::Unfavorite { id } => {
            let Some(mut movie) = load_local(app.store(), id)? else {
                println!("Movie {id} is not a favorite.");
                return Ok(());
            };
            if let FavoriteChange::Removed(removed) = app.toggle_favorite(&mut movie)? {
                println!(
                    "Removed {} ({} trailers, {} reviews).",
                    movie.display_title(),
                    removed.trailers,
                    removed.reviews
                );
            }
        }
    }
    Ok(())
}

// Offline, transport and decode failures end up as empty views.
fn render_soft_error(e: &AppError) {
    match e {
        AppError::NetworkUnavailable => println!("No internet connection."),
        AppError::MissingApiKey => println!("No TMDb API key; set {API_KEY_ENV} or config.json."),
        other => warn!("remote request failed: {other}"),
    }
}

fn report(e: AppError) -> ExitCode {
    if e.is_fatal() {
        error!("{e}");
        return ExitCode::FAILURE;
    }
    render_soft_error(&e);
    ExitCode::FAILURE
}

fn print_list(query: MovieQuery, movies: &[Movie]) {
    if movies.is_empty() {
        println!("No {} movies.", query.as_str().replace('_', "-"));
        return;
    }
    for m in movies {
        let star = if m.favorite { "*" } else { " " };
        println!("{star} {:>8}  {:<48} {:>4.1}", m.movie_id, m.display_title(), m.vote_average);
    }
}

fn print_detail(m: &Movie) {
    println!("{}{}", m.display_title(), if m.favorite { "  [favorite]" } else { "" });
    if m.runtime > 0 {
        println!("Runtime: {} min", m.runtime);
    }
    println!("Rating:  {:.1}/10", m.vote_average);
    if !m.overview.is_empty() {
        println!("\n{}", m.overview);
    }
    if !m.trailers.is_empty() {
        println!("\nTrailers:");
        for t in &m.trailers {
            match t.playback_url() {
                Some(url) => println!("  {} [{}] {url}", t.name, t.kind),
                None => println!("  {} [{}] on {}", t.name, t.kind, t.site),
            }
        }
    }
    if !m.reviews.is_empty() {
        println!("\nReviews:");
        for r in &m.reviews {
            println!("  {}: {}", r.author, r.content.lines().next().unwrap_or_default());
        }
    }
}
