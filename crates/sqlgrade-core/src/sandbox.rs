//! Practice runner: students try SELECTs against the sandbox table and can
//! forward a query with its output to the instructor.

use crate::auth::Session;
use crate::config::CourseConfig;
use crate::grading::{guard, QueryExecutor, RowSet};
use crate::storage::Store;

pub fn run_test_query<E: QueryExecutor + ?Sized>(
    executor: &E,
    config: &CourseConfig,
    sql: &str,
) -> anyhow::Result<RowSet> {
    let sql = sql.trim();
    guard::check_sandbox(sql, &config.settings.sandbox_table)?;
    executor.fetch(sql)
}

/// Stores the query (and its output, when it ran) in the instructor outbox.
pub fn send_to_teacher(
    store: &Store,
    session: &Session,
    query: &str,
    output: Option<&RowSet>,
) -> anyhow::Result<i64> {
    let payload = output.map(RowSet::to_json);
    let id = store.send_to_teacher(session.student(), query.trim(), payload.as_ref())?;
    tracing::info!(student_id = %session.student_id(), id, "query sent to teacher");
    Ok(id)
}
