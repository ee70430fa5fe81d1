// src/app/schema.rs
use rusqlite::Connection;
use tracing::{info, warn};

use crate::app::contract::Resource;
use crate::app::error::Result;

/// Bump whenever the DDL below changes. Upgrades are destructive.
pub const SCHEMA_VERSION: i64 = 1;

// A movie has 0..n trailers and reviews. Natural ids are unique and a
// conflicting insert replaces the old row.
const CREATE_TABLES: &str = r#"
CREATE TABLE IF NOT EXISTS movies (
  _id INTEGER PRIMARY KEY AUTOINCREMENT,
  movie_id INTEGER NOT NULL,
  overview TEXT NOT NULL,
  release_date TEXT NOT NULL,
  title TEXT NOT NULL,
  runtime INTEGER NOT NULL,
  vote_average REAL NOT NULL,
  w92_poster BLOB NOT NULL,
  w185_poster BLOB NOT NULL,
  poster_path TEXT NOT NULL,
  favorite INTEGER NOT NULL,
  UNIQUE (movie_id) ON CONFLICT REPLACE
);

CREATE TABLE IF NOT EXISTS trailers (
  _id INTEGER PRIMARY KEY AUTOINCREMENT,
  trailer_id TEXT NOT NULL,
  key TEXT NOT NULL,
  name TEXT NOT NULL,
  site TEXT NOT NULL,
  type TEXT NOT NULL,
  movie_id INTEGER NOT NULL,
  FOREIGN KEY (movie_id) REFERENCES movies(movie_id),
  UNIQUE (trailer_id) ON CONFLICT REPLACE
);

CREATE TABLE IF NOT EXISTS reviews (
  _id INTEGER PRIMARY KEY AUTOINCREMENT,
  review_id TEXT NOT NULL,
  author TEXT NOT NULL,
  content TEXT NOT NULL,
  url TEXT NOT NULL,
  movie_id INTEGER NOT NULL,
  FOREIGN KEY (movie_id) REFERENCES movies(movie_id),
  UNIQUE (review_id) ON CONFLICT REPLACE
);

CREATE INDEX IF NOT EXISTS idx_trailers_movie ON trailers(movie_id);
CREATE INDEX IF NOT EXISTS idx_reviews_movie ON reviews(movie_id);
"#;

pub(crate) fn table_exists(conn: &Connection, name: &str) -> bool {
    conn.query_row(
        "SELECT 1 FROM sqlite_master WHERE type='table' AND name=?1",
        [name],
        |_row| Ok(()),
    )
    .is_ok()
}

pub(crate) fn user_version(conn: &Connection) -> Result<i64> {
    Ok(conn.query_row("PRAGMA user_version", [], |row| row.get(0))?)
}

pub(crate) fn foreign_keys_enabled(conn: &Connection) -> Result<bool> {
    let on: i64 = conn.query_row("PRAGMA foreign_keys", [], |row| row.get(0))?;
    Ok(on != 0)
}

/// Create the tables on a fresh database, or drop and recreate them when the
/// stored version differs from `SCHEMA_VERSION`. Returns true if an existing
/// schema was discarded.
pub fn ensure_schema(conn: &Connection) -> Result<bool> {
    // Child rows may outlive their movie; the bundled SQLite enforces FKs
    // unless told otherwise.
    conn.execute_batch("PRAGMA foreign_keys = OFF;")?;

    let stored = user_version(conn)?;
    let has_tables = Resource::ALL
        .iter()
        .any(|r| table_exists(conn, r.table()));

    let upgraded = if stored != SCHEMA_VERSION && has_tables {
        warn!(
            from = stored,
            to = SCHEMA_VERSION,
            "schema version changed; dropping cached favorites"
        );
        drop_tables(conn)?;
        true
    } else {
        false
    };

    conn.execute_batch(CREATE_TABLES)?;
    conn.execute_batch(&format!("PRAGMA user_version = {SCHEMA_VERSION};"))?;
    if upgraded || !has_tables {
        info!(version = SCHEMA_VERSION, "movie tables created");
    }
    Ok(upgraded)
}

fn drop_tables(conn: &Connection) -> Result<()> {
    // Children first, so the drop never trips over a movie reference.
    for resource in Resource::ALL.iter().rev() {
        conn.execute_batch(&format!("DROP TABLE IF EXISTS {};", resource.table()))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn creates_tables_and_stamps_version() {
        let conn = Connection::open_in_memory().unwrap();
        assert!(!ensure_schema(&conn).unwrap());
        for r in Resource::ALL {
            assert!(table_exists(&conn, r.table()), "{} missing", r.table());
        }
        assert_eq!(user_version(&conn).unwrap(), SCHEMA_VERSION);
        // Second run is a no-op.
        assert!(!ensure_schema(&conn).unwrap());
    }

    #[test]
    fn version_mismatch_drops_existing_rows() {
        let conn = Connection::open_in_memory().unwrap();
        ensure_schema(&conn).unwrap();
        conn.execute(
            "INSERT INTO trailers (trailer_id, key, name, site, type, movie_id)
             VALUES ('t1', 'k', 'n', 'YouTube', 'Trailer', 550)",
            [],
        )
        .unwrap();
        conn.execute_batch("PRAGMA user_version = 99;").unwrap();

        assert!(ensure_schema(&conn).unwrap());
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM trailers", [], |r| r.get(0))
            .unwrap();
        assert_eq!(count, 0);
        assert_eq!(user_version(&conn).unwrap(), SCHEMA_VERSION);
    }

    fn rows_in(conn: &Connection, table: &str) -> i64 {
        conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |r| r.get(0))
            .unwrap()
    }

    #[test]
    fn upgrade_on_disk_drops_favorite_with_children() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("popular_movies.db");
        {
            let conn = Connection::open(&path).unwrap();
            ensure_schema(&conn).unwrap();
            conn.execute_batch(
                "INSERT INTO movies (movie_id, overview, release_date, title, runtime,
                     vote_average, w92_poster, w185_poster, poster_path, favorite)
                 VALUES (550, 'o', '1999-10-15', 'Fight Club', 139, 8.4, x'01', x'02', '/p.jpg', 1);
                 INSERT INTO trailers (trailer_id, key, name, site, type, movie_id)
                 VALUES ('t1', 'k', 'n', 'YouTube', 'Trailer', 550);
                 INSERT INTO reviews (review_id, author, content, url, movie_id)
                 VALUES ('r1', 'a', 'c', 'u', 550);
                 PRAGMA user_version = 0;",
            )
            .unwrap();
        }

        let conn = Connection::open(&path).unwrap();
        conn.execute_batch("PRAGMA foreign_keys = ON;").unwrap();
        assert!(ensure_schema(&conn).unwrap());
        for r in Resource::ALL {
            assert_eq!(rows_in(&conn, r.table()), 0, "{} not emptied", r.table());
        }
        assert_eq!(user_version(&conn).unwrap(), SCHEMA_VERSION);
    }

    #[test]
    fn foreign_keys_are_switched_off() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("PRAGMA foreign_keys = ON;").unwrap();
        ensure_schema(&conn).unwrap();
        assert!(!foreign_keys_enabled(&conn).unwrap());

        // A child row without a parent is accepted.
        conn.execute(
            "INSERT INTO reviews (review_id, author, content, url, movie_id)
             VALUES ('r1', 'a', 'c', 'u', 404)",
            [],
        )
        .unwrap();
        conn.execute_batch("DROP TABLE movies;").unwrap();
    }
}
