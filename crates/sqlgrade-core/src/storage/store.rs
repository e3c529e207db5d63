use crate::model::{LedgerRow, NewLedgerRow, StatsRow, SubmissionFilter};
use anyhow::Context;
use rusqlite::{params, params_from_iter, Connection, TransactionBehavior};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Handle to the course database: roster, ledger, outbox and the coursework
/// tables the graded queries run against.
#[derive(Clone)]
pub struct Store {
    pub(crate) conn: Arc<Mutex<Connection>>,
}

/// Result of the transactional quota re-check at insert time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuotaInsert {
    Recorded { id: i64, done: u32 },
    Exhausted { used: u32 },
}

impl Store {
    pub fn open(path: &Path) -> anyhow::Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("failed to open sqlite db {}", path.display()))?;
        conn.busy_timeout(Duration::from_secs(5))?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn memory() -> anyhow::Result<Self> {
        let conn = Connection::open_in_memory().context("failed to open in-memory sqlite db")?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub(crate) fn lock(&self) -> anyhow::Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow::anyhow!("database connection lock poisoned"))
    }

    pub fn init_schema(&self) -> anyhow::Result<()> {
        let conn = self.lock()?;
        conn.execute_batch(crate::storage::schema::DDL)?;
        migrate_results_columns(&conn)?;
        conn.execute_batch(crate::storage::schema::INDEXES)?;
        Ok(())
    }

    /// Runs trusted SQL (schema setup, seeding coursework tables).
    pub fn execute_batch(&self, sql: &str) -> anyhow::Result<()> {
        let conn = self.lock()?;
        conn.execute_batch(sql)?;
        Ok(())
    }

    // ledger

    pub fn submission_count(&self, student_id: &str, assignment: &str) -> anyhow::Result<u32> {
        let conn = self.lock()?;
        count_for(&conn, student_id, assignment)
    }

    /// Counts and inserts inside one IMMEDIATE transaction so two concurrent
    /// submissions cannot both take the last slot.
    pub fn record_result_within_quota(
        &self,
        row: &NewLedgerRow<'_>,
        limit: u32,
    ) -> anyhow::Result<QuotaInsert> {
        let mut conn = self.lock()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let used = count_for(&tx, row.student_id, row.assignment)?;
        if used >= limit {
            tx.rollback()?;
            return Ok(QuotaInsert::Exhausted { used });
        }
        insert_result(&tx, row)?;
        let id = tx.last_insert_rowid();
        tx.commit()?;
        Ok(QuotaInsert::Recorded { id, done: used + 1 })
    }

    pub fn list_submissions(&self, filter: &SubmissionFilter) -> anyhow::Result<Vec<LedgerRow>> {
        let conn = self.lock()?;
        let mut sql = String::from(
            "SELECT id, student_id, name, major, hw, correct_count, total_count,
                    fingerprint, submission_time
             FROM student_results
             WHERE 1=1",
        );
        let mut args: Vec<&str> = Vec::new();
        if let Some(track) = filter.track.as_deref() {
            args.push(track);
            sql.push_str(&format!(" AND major = ?{}", args.len()));
        }
        if let Some(hw) = filter.assignment.as_deref() {
            args.push(hw);
            sql.push_str(&format!(" AND hw = ?{}", args.len()));
        }
        if let Some(sid) = filter.student_id.as_deref() {
            args.push(sid);
            sql.push_str(&format!(" AND student_id = ?{}", args.len()));
        }
        sql.push_str(" ORDER BY submission_time DESC, id DESC");

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(args.iter()), |row| {
            Ok(LedgerRow {
                id: row.get(0)?,
                student_id: row.get(1)?,
                name: row.get(2)?,
                track: row.get(3)?,
                assignment: row.get(4)?,
                correct_count: row.get(5)?,
                total_count: row.get(6)?,
                fingerprint: row.get(7)?,
                submitted_at: row.get(8)?,
            })
        })?;

        let mut results = Vec::new();
        for r in rows {
            results.push(r?);
        }
        Ok(results)
    }

    pub fn stats(&self) -> anyhow::Result<Vec<StatsRow>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT major, hw, COUNT(*) AS submissions, AVG(correct_count) AS avg_correct
             FROM student_results
             GROUP BY major, hw
             ORDER BY major, hw",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(StatsRow {
                track: row.get(0)?,
                assignment: row.get(1)?,
                submissions: row.get(2)?,
                avg_correct: row.get::<_, Option<f64>>(3)?.unwrap_or(0.0),
            })
        })?;

        let mut results = Vec::new();
        for r in rows {
            results.push(r?);
        }
        Ok(results)
    }

    /// Submission counts for one student, keyed by assignment.
    pub fn usage_for(&self, student_id: &str) -> anyhow::Result<Vec<(String, u32)>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT hw, COUNT(*) FROM student_results WHERE student_id = ?1 GROUP BY hw ORDER BY hw",
        )?;
        let rows = stmt.query_map(params![student_id], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, u32>(1)?))
        })?;
        let mut out = Vec::new();
        for r in rows {
            out.push(r?);
        }
        Ok(out)
    }
}

fn count_for(conn: &Connection, student_id: &str, assignment: &str) -> anyhow::Result<u32> {
    let n: u32 = conn.query_row(
        "SELECT COUNT(*) FROM student_results WHERE student_id = ?1 AND hw = ?2",
        params![student_id, assignment],
        |r| r.get(0),
    )?;
    Ok(n)
}

fn insert_result(conn: &Connection, row: &NewLedgerRow<'_>) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO student_results
            (student_id, name, major, hw, correct_count, total_count, fingerprint, submission_time)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            row.student_id,
            row.name,
            row.track,
            row.assignment,
            row.correct_count as i64,
            row.total_count as i64,
            row.fingerprint,
            row.submitted_at,
        ],
    )?;
    Ok(())
}

pub fn now_utc_string() -> String {
    chrono::Utc::now().format(TIMESTAMP_FORMAT).to_string()
}

// Older course databases predate these columns.
fn migrate_results_columns(conn: &Connection) -> anyhow::Result<()> {
    let cols = get_columns(conn, "student_results")?;
    add_column_if_missing(conn, &cols, "student_results", "total_count", "INTEGER")?;
    add_column_if_missing(conn, &cols, "student_results", "fingerprint", "TEXT")?;
    Ok(())
}

fn get_columns(
    conn: &Connection,
    table: &str,
) -> anyhow::Result<std::collections::HashSet<String>> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({})", table))?;
    let rows = stmt.query_map([], |row| row.get::<_, String>(1))?;
    let mut out = std::collections::HashSet::new();
    for r in rows {
        out.insert(r?);
    }
    Ok(out)
}

fn add_column_if_missing(
    conn: &Connection,
    cols: &std::collections::HashSet<String>,
    table: &str,
    col: &str,
    ty: &str,
) -> anyhow::Result<()> {
    if !cols.contains(col) {
        let sql = format!("ALTER TABLE {} ADD COLUMN {} {}", table, col, ty);
        conn.execute(&sql, [])?;
    }
    Ok(())
}
