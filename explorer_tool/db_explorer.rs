use std::env;
use std::fs;

use popmovies::app::{MovieStore, ResourcePath, Result};
use popmovies::config::load_config;
use rusqlite::types::Value;

fn render(value: &Value) -> String {
    match value {
        Value::Null => "NULL".to_string(),
        Value::Integer(i) => i.to_string(),
        Value::Real(f) => f.to_string(),
        Value::Text(s) => s.clone(),
        Value::Blob(b) => format!("<BLOB {} bytes>", b.len()),
    }
}

fn main() -> Result<()> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: cargo run --bin db_explorer <movies|trailers|reviews>[/movie_id] [limit] [--out file]");
        std::process::exit(1);
    }

    let path = ResourcePath::parse(&args[1])?;
    let limit: usize = if args.len() > 2 && !args[2].starts_with("--") {
        args[2].parse().unwrap_or(5)
    } else {
        5
    };

    let out_file: Option<String> = args
        .iter()
        .position(|a| a == "--out")
        .and_then(|i| args.get(i + 1).cloned());

    let db_path = load_config().db_path();
    println!("Opening movie store: {}", db_path.display());

    let store = MovieStore::open_read_only(&db_path)?;
    let rows = store.query(&path, None, None, None)?;

    let mut output = String::new();
    output.push_str(&format!("--- {} ({} rows) ---\n", path, rows.len()));
    output.push_str(&format!("Columns: {:?}\n", rows.columns()));

    for row in rows.iter().take(limit) {
        let values = rows
            .columns()
            .iter()
            .map(|c| row.value(c).map(render))
            .collect::<Result<Vec<String>>>()?;
        output.push_str(&format!("{:?}\n", values));
    }

    if let Some(out) = out_file {
        fs::write(&out, output.as_bytes())?;
        println!("Exported results to {}", out);
    } else {
        print!("{}", output);
    }

    Ok(())
}
