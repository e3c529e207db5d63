use crate::grading::rows::{Cell, RowSet};
use crate::storage::Store;
use anyhow::Context;
use rusqlite::{Connection, OpenFlags};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Runs one SQL text and returns its rows. Implementations must not let the
/// statement change the database.
pub trait QueryExecutor: Send + Sync {
    fn fetch(&self, sql: &str) -> anyhow::Result<RowSet>;

    /// Instructor-authored SQL such as reference reads. Implementations may
    /// lift the row cap here; the read-only rule still holds.
    fn fetch_trusted(&self, sql: &str) -> anyhow::Result<RowSet> {
        self.fetch(sql)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryLimits {
    pub statement_timeout_ms: u64,
    pub max_rows: usize,
}

impl Default for QueryLimits {
    fn default() -> Self {
        Self {
            statement_timeout_ms: 2000,
            max_rows: 10_000,
        }
    }
}

/// Number of VM instructions between progress-handler callbacks.
const PROGRESS_STEPS: i32 = 1000;

#[derive(Clone)]
pub struct SqliteExecutor {
    conn: Arc<Mutex<Connection>>,
    limits: QueryLimits,
}

impl SqliteExecutor {
    /// Shares the store's connection. Every statement runs with `query_only` on.
    pub fn from_store(store: &Store, limits: QueryLimits) -> Self {
        Self {
            conn: store.conn.clone(),
            limits,
        }
    }

    /// Opens a separate connection that SQLite itself refuses to write through.
    pub fn open_read_only(path: &Path, limits: QueryLimits) -> anyhow::Result<Self> {
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .with_context(|| format!("failed to open {} read-only", path.display()))?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            limits,
        })
    }
}

impl QueryExecutor for SqliteExecutor {
    fn fetch(&self, sql: &str) -> anyhow::Result<RowSet> {
        self.run(sql, Some(self.limits.max_rows))
    }

    fn fetch_trusted(&self, sql: &str) -> anyhow::Result<RowSet> {
        self.run(sql, None)
    }
}

impl SqliteExecutor {
    fn run(&self, sql: &str, max_rows: Option<usize>) -> anyhow::Result<RowSet> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| anyhow::anyhow!("database connection lock poisoned"))?;

        conn.pragma_update(None, "query_only", true)?;
        let deadline = Instant::now() + Duration::from_millis(self.limits.statement_timeout_ms);
        conn.progress_handler(PROGRESS_STEPS, Some(move || Instant::now() >= deadline));

        let result = run_bounded(&conn, sql, max_rows);

        conn.progress_handler(0, None::<fn() -> bool>);
        conn.pragma_update(None, "query_only", false)?;

        result.map_err(|e| {
            if Instant::now() >= deadline {
                anyhow::anyhow!(
                    "statement timed out after {} ms",
                    self.limits.statement_timeout_ms
                )
            } else {
                e
            }
        })
    }
}

fn run_bounded(conn: &Connection, sql: &str, max_rows: Option<usize>) -> anyhow::Result<RowSet> {
    let mut stmt = conn.prepare(sql)?;
    if !stmt.readonly() {
        anyhow::bail!("statement would modify the database");
    }

    let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
    let width = columns.len();

    let mut out = Vec::new();
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        if let Some(cap) = max_rows.filter(|cap| out.len() >= *cap) {
            anyhow::bail!("result exceeds the {} row limit", cap);
        }
        let mut cells = Vec::with_capacity(width);
        for i in 0..width {
            cells.push(Cell::from_value_ref(row.get_ref(i)?));
        }
        out.push(cells);
    }

    Ok(RowSet::new(columns, out))
}
