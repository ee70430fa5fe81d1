// src/app/store.rs
//! CRUD gateway over the movies/trailers/reviews tables.
//!
//! One `MovieStore` is opened at startup and cloned into every consumer; the
//! clones share a single connection behind a mutex. Every mutation that
//! touches at least one row is announced to observers whose path overlaps
//! the changed one: the same path, its bare parent, or (for a change on a
//! bare path) any movie under it.
use std::path::Path;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::{fs, iter};

use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection, OpenFlags};
use tracing::debug;

use crate::app::contract::{Resource, ResourcePath, RowUri, COLUMN_MOVIE_ID, COLUMN_ROW_ID};
use crate::app::error::{AppError, Result};
use crate::app::schema::ensure_schema;
use crate::app::values::{ContentValues, RowSet, Selection};

struct Observer {
    path: ResourcePath,
    tx: Sender<ResourcePath>,
}

#[derive(Clone)]
pub struct MovieStore {
    conn: Arc<Mutex<Connection>>,
    observers: Arc<Mutex<Vec<Observer>>>,
}

impl MovieStore {
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(path)?;
        debug!("opened movie store at {}", path.display());
        Self::from_connection(conn)
    }

    /// Open an existing database for inspection. Nothing is created or
    /// migrated, and every write fails.
    pub fn open_read_only(path: &Path) -> Result<Self> {
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        debug!("opened movie store read-only at {}", path.display());
        Ok(Self::wrap(conn))
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    pub fn from_connection(conn: Connection) -> Result<Self> {
        ensure_schema(&conn)?;
        Ok(Self::wrap(conn))
    }

    fn wrap(conn: Connection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
            observers: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn with_conn<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T>,
    {
        let mut guard = self.conn.lock().map_err(|_| AppError::LockPoisoned)?;
        f(&mut guard)
    }

    // ---- observers ----

    /// Receive the path of every change overlapping `path`.
    pub fn subscribe(&self, path: ResourcePath) -> Receiver<ResourcePath> {
        let (tx, rx) = mpsc::channel();
        if let Ok(mut observers) = self.observers.lock() {
            observers.push(Observer { path, tx });
        }
        rx
    }

    fn notify_change(&self, changed: ResourcePath) {
        let Ok(mut observers) = self.observers.lock() else {
            return;
        };
        // Drop observers whose receiver is gone.
        observers.retain(|o| !o.path.overlaps(&changed) || o.tx.send(changed).is_ok());
    }

    // ---- reads ----

    /// Rows of `path`'s table. A scoped path restricts to `movie_id = ID`;
    /// `selection` is ANDed on top. `projection` defaults to every column and
    /// `sort_order` (`column [ASC|DESC]`) to insertion order.
    pub fn query(
        &self,
        path: &ResourcePath,
        projection: Option<&[&str]>,
        selection: Option<&Selection>,
        sort_order: Option<&str>,
    ) -> Result<RowSet> {
        let resource = path.resource;
        let columns: Vec<&'static str> = match projection {
            Some(cols) if !cols.is_empty() => cols
                .iter()
                .map(|c| resource.column(c))
                .collect::<Result<_>>()?,
            _ => resource.columns().to_vec(),
        };
        let order = match sort_order {
            Some(raw) => parse_sort_order(resource, raw)?,
            None => format!("{COLUMN_ROW_ID} ASC"),
        };
        let (where_sql, args) = where_clause(path, selection);
        let sql = format!(
            "SELECT {} FROM {}{} ORDER BY {}",
            columns.join(", "),
            resource.table(),
            where_sql,
            order
        );

        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&sql)?;
            let mut rows = stmt.query(params_from_iter(args.iter()))?;
            let mut out = Vec::new();
            while let Some(row) = rows.next()? {
                let mut values = Vec::with_capacity(columns.len());
                for i in 0..columns.len() {
                    values.push(row.get::<_, Value>(i)?);
                }
                out.push(values);
            }
            Ok(RowSet::new(
                columns.iter().map(|c| c.to_string()).collect(),
                out,
            ))
        })
    }

    // ---- writes ----

    /// Insert one row into a bare path. A row with the same natural id is
    /// replaced, not duplicated.
    pub fn insert(&self, path: &ResourcePath, values: &ContentValues) -> Result<RowUri> {
        if path.is_scoped() {
            return Err(AppError::UnsupportedResource(path.to_string()));
        }
        let row_id = self.with_conn(|conn| insert_row(conn, path.resource, values))?;
        debug!(resource = %path, row_id, "row inserted");
        self.notify_change(*path);
        Ok(RowUri {
            resource: path.resource,
            row_id,
        })
    }

    /// Insert trailer or review rows in one transaction; the first failing row
    /// rolls back the whole batch. Other paths fall back to one `insert` per
    /// row without a transaction.
    pub fn bulk_insert(&self, path: &ResourcePath, rows: &[ContentValues]) -> Result<usize> {
        match (path.resource, path.is_scoped()) {
            (Resource::Trailers | Resource::Reviews, false) => {
                let inserted = self.with_conn(|conn| {
                    let tx = conn.transaction()?;
                    for values in rows {
                        insert_row(&tx, path.resource, values)?;
                    }
                    tx.commit()?;
                    Ok(rows.len())
                })?;
                debug!(resource = %path, rows = inserted, "bulk insert committed");
                if inserted > 0 {
                    self.notify_change(*path);
                }
                Ok(inserted)
            }
            _ => {
                let mut inserted = 0usize;
                for values in rows {
                    self.insert(path, values)?;
                    inserted += 1;
                }
                Ok(inserted)
            }
        }
    }

    /// Delete the rows of one movie. Zero rows is a valid outcome.
    pub fn delete(&self, path: &ResourcePath, selection: Option<&Selection>) -> Result<usize> {
        if !path.is_scoped() {
            return Err(AppError::UnsupportedResource(path.to_string()));
        }
        let (where_sql, args) = where_clause(path, selection);
        let sql = format!("DELETE FROM {}{}", path.resource.table(), where_sql);
        let deleted =
            self.with_conn(|conn| Ok(conn.execute(&sql, params_from_iter(args.iter()))?))?;
        debug!(resource = %path, rows = deleted, "rows deleted");
        if deleted > 0 {
            self.notify_change(*path);
        }
        Ok(deleted)
    }

    pub fn update(
        &self,
        path: &ResourcePath,
        values: &ContentValues,
        selection: Option<&Selection>,
    ) -> Result<usize> {
        if !path.is_scoped() {
            return Err(AppError::UnsupportedResource(path.to_string()));
        }
        if values.is_empty() {
            return Ok(0);
        }
        let resource = path.resource;
        let mut assignments = Vec::with_capacity(values.len());
        for (column, _) in values.iter() {
            assignments.push(format!("{} = ?", resource.column(column)?));
        }
        let (where_sql, where_args) = where_clause(path, selection);
        let sql = format!(
            "UPDATE {} SET {}{}",
            resource.table(),
            assignments.join(", "),
            where_sql
        );
        let args: Vec<&Value> = values
            .iter()
            .map(|(_, v)| v)
            .chain(where_args.iter())
            .collect();
        let updated = self.with_conn(|conn| Ok(conn.execute(&sql, params_from_iter(args))?))?;
        debug!(resource = %path, rows = updated, "rows updated");
        if updated > 0 {
            self.notify_change(*path);
        }
        Ok(updated)
    }
}

fn insert_row(conn: &Connection, resource: Resource, values: &ContentValues) -> Result<i64> {
    let mut columns = Vec::with_capacity(values.len());
    for (column, _) in values.iter() {
        columns.push(resource.column(column)?);
    }
    let sql = if columns.is_empty() {
        format!("INSERT INTO {} DEFAULT VALUES", resource.table())
    } else {
        let placeholders: Vec<&str> = iter::repeat("?").take(columns.len()).collect();
        format!(
            "INSERT INTO {} ({}) VALUES ({})",
            resource.table(),
            columns.join(", "),
            placeholders.join(", ")
        )
    };
    conn.execute(&sql, params_from_iter(values.iter().map(|(_, v)| v)))?;
    Ok(conn.last_insert_rowid())
}

fn where_clause(path: &ResourcePath, selection: Option<&Selection>) -> (String, Vec<Value>) {
    let mut clauses = Vec::new();
    let mut args = Vec::new();
    if let Some(id) = path.movie_id {
        clauses.push(format!("{COLUMN_MOVIE_ID} = ?"));
        args.push(Value::Integer(id));
    }
    if let Some(sel) = selection.filter(|s| !s.clause.trim().is_empty()) {
        clauses.push(format!("({})", sel.clause));
        args.extend(sel.args.iter().cloned());
    }
    if clauses.is_empty() {
        (String::new(), args)
    } else {
        (format!(" WHERE {}", clauses.join(" AND ")), args)
    }
}

fn parse_sort_order(resource: Resource, raw: &str) -> Result<String> {
    let mut parts = raw.split_whitespace();
    let column = resource.column(parts.next().unwrap_or_default())?;
    let direction = match parts.next().map(str::to_ascii_uppercase).as_deref() {
        None | Some("ASC") => "ASC",
        Some("DESC") => "DESC",
        Some(_) => {
            return Err(AppError::UnknownColumn {
                table: resource.table(),
                column: raw.to_string(),
            })
        }
    };
    if parts.next().is_some() {
        return Err(AppError::UnknownColumn {
            table: resource.table(),
            column: raw.to_string(),
        });
    }
    Ok(format!("{column} {direction}"))
}
