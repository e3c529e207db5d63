//! Instructor operations. Each takes an `AdminSession` as proof of login.

use crate::auth::AdminSession;
use crate::grading::{Cell, RowSet};
use crate::model::{LedgerRow, StatsRow, Student, SubmissionFilter, TeacherQuery};
use crate::storage::Store;

#[derive(Debug, Clone, PartialEq)]
pub enum AdminOutcome {
    Rows(RowSet),
    Affected(usize),
}

pub fn stats(store: &Store, _admin: &AdminSession) -> anyhow::Result<Vec<StatsRow>> {
    store.stats()
}

pub fn submissions(
    store: &Store,
    _admin: &AdminSession,
    filter: &SubmissionFilter,
) -> anyhow::Result<Vec<LedgerRow>> {
    store.list_submissions(filter)
}

pub fn teacher_queries(
    store: &Store,
    _admin: &AdminSession,
    track: Option<&str>,
) -> anyhow::Result<Vec<TeacherQuery>> {
    store.list_teacher_queries(track)
}

/// Runs any SQL the instructor types, writes included. Statements that
/// return columns come back as rows.
pub fn run_query(store: &Store, admin: &AdminSession, sql: &str) -> anyhow::Result<AdminOutcome> {
    let sql = sql.trim();
    if sql.is_empty() {
        anyhow::bail!("query is empty");
    }
    tracing::info!(admin = %admin.username(), sql = %sql, "admin query");

    let conn = store.lock()?;
    let mut stmt = conn.prepare(sql)?;
    let width = stmt.column_count();
    if width == 0 {
        let n = stmt.execute([])?;
        return Ok(AdminOutcome::Affected(n));
    }

    let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
    let mut rows = stmt.query([])?;
    let mut out = Vec::new();
    while let Some(row) = rows.next()? {
        let mut cells = Vec::with_capacity(width);
        for i in 0..width {
            cells.push(Cell::from_value_ref(row.get_ref(i)?));
        }
        out.push(cells);
    }
    Ok(AdminOutcome::Rows(RowSet::new(columns, out)))
}

pub fn list_users(store: &Store, _admin: &AdminSession) -> anyhow::Result<Vec<Student>> {
    store.list_students()
}

pub fn add_user(
    store: &Store,
    admin: &AdminSession,
    student: &Student,
    password: &str,
) -> anyhow::Result<()> {
    if student.student_id.trim().is_empty() || password.trim().is_empty() {
        anyhow::bail!("student id and password are required");
    }
    store.add_student(student, password.trim())?;
    tracing::info!(admin = %admin.username(), student_id = %student.student_id, "student added");
    Ok(())
}

/// Returns the student's name on success.
pub fn reset_password(
    store: &Store,
    admin: &AdminSession,
    student_id: &str,
    new_password: &str,
) -> anyhow::Result<String> {
    if student_id.trim().is_empty() || new_password.trim().is_empty() {
        anyhow::bail!("student id and new password are required");
    }
    let student = store
        .find_student(student_id.trim())?
        .ok_or_else(|| anyhow::anyhow!("no student with id {}", student_id.trim()))?;
    store.set_password(&student.student_id, new_password.trim())?;
    tracing::info!(admin = %admin.username(), student_id = %student.student_id, "password reset");
    Ok(student.name)
}

/// Returns false when the student did not exist.
pub fn delete_user(store: &Store, admin: &AdminSession, student_id: &str) -> anyhow::Result<bool> {
    let deleted = store.delete_student(student_id)?;
    if deleted {
        tracing::info!(admin = %admin.username(), student_id = %student_id, "student deleted");
    }
    Ok(deleted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{admin_login, AdminCredentials};

    fn admin() -> AdminSession {
        let creds = AdminCredentials {
            username: "prof".into(),
            password: "pw".into(),
        };
        admin_login(Some(&creds), "prof", "pw").unwrap()
    }

    #[test]
    fn raw_query_returns_rows_or_affected_count() {
        let store = Store::memory().unwrap();
        store.init_schema().unwrap();
        let a = admin();

        assert_eq!(
            run_query(&store, &a, "CREATE TABLE t(x INTEGER)").unwrap(),
            AdminOutcome::Affected(0)
        );
        assert_eq!(
            run_query(&store, &a, "INSERT INTO t VALUES (1), (2)").unwrap(),
            AdminOutcome::Affected(2)
        );
        match run_query(&store, &a, "SELECT x FROM t ORDER BY x").unwrap() {
            AdminOutcome::Rows(rs) => {
                assert_eq!(rs.columns, vec!["x"]);
                assert_eq!(rs.rows, vec![vec![Cell::Integer(1)], vec![Cell::Integer(2)]]);
            }
            other => panic!("expected rows, got {other:?}"),
        }
        assert!(run_query(&store, &a, "SELEC nonsense").is_err());
        assert!(run_query(&store, &a, "  ").is_err());
    }

    #[test]
    fn manage_users() {
        let store = Store::memory().unwrap();
        store.init_schema().unwrap();
        let a = admin();
        let s = Student {
            student_id: "77".into(),
            name: "Mina".into(),
            track: "آمار".into(),
            email: None,
        };
        add_user(&store, &a, &s, "init").unwrap();
        assert_eq!(list_users(&store, &a).unwrap(), vec![s]);

        assert_eq!(reset_password(&store, &a, "77", "next").unwrap(), "Mina");
        assert!(store.authenticate("77", "next").unwrap().is_some());
        assert!(reset_password(&store, &a, "78", "x").is_err());

        assert!(delete_user(&store, &a, "77").unwrap());
        assert!(!delete_user(&store, &a, "77").unwrap());
    }
}
