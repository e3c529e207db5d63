use super::store::{now_utc_string, Store};
use crate::model::{Student, TeacherQuery};
use rusqlite::{params, params_from_iter};

impl Store {
    /// Queues a practice query and its output for the instructor.
    pub fn send_to_teacher(
        &self,
        student: &Student,
        query: &str,
        output: Option<&serde_json::Value>,
    ) -> anyhow::Result<i64> {
        let output_json = output.map(serde_json::to_string).transpose()?;
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO teacher_queries (student_id, student_name, major, query, output, submission_time)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                student.student_id,
                student.name,
                student.track,
                query,
                output_json,
                now_utc_string()
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn list_teacher_queries(&self, track: Option<&str>) -> anyhow::Result<Vec<TeacherQuery>> {
        let conn = self.lock()?;
        let mut sql = String::from(
            "SELECT id, student_id, student_name, major, query, output, submission_time
             FROM teacher_queries WHERE 1=1",
        );
        let mut args = Vec::new();
        if let Some(t) = track {
            args.push(t);
            sql.push_str(" AND major = ?1");
        }
        sql.push_str(" ORDER BY submission_time DESC, id DESC");

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(args.iter()), |row| {
            let output: Option<String> = row.get(5)?;
            Ok(TeacherQuery {
                id: row.get(0)?,
                student_id: row.get(1)?,
                student_name: row.get(2)?,
                track: row.get(3)?,
                query: row.get(4)?,
                // unparseable payloads read as None
                output: output.and_then(|s| serde_json::from_str(&s).ok()),
                submitted_at: row.get(6)?,
            })
        })?;

        let mut out = Vec::new();
        for r in rows {
            out.push(r?);
        }
        Ok(out)
    }
}
