use super::store::Store;
use crate::model::Student;
use rusqlite::{params, OptionalExtension};

// Passwords are stored and compared as plain text. Other tools read the
// same `pass` column.

impl Store {
    pub fn add_student(&self, student: &Student, password: &str) -> anyhow::Result<()> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO students (student_id, name, major, pass, email) VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(student_id) DO UPDATE SET
                name=excluded.name, major=excluded.major, pass=excluded.pass, email=excluded.email",
            params![
                student.student_id,
                student.name,
                student.track,
                password,
                student.email
            ],
        )?;
        Ok(())
    }

    pub fn find_student(&self, student_id: &str) -> anyhow::Result<Option<Student>> {
        let conn = self.lock()?;
        let s = conn
            .query_row(
                "SELECT student_id, name, major, email FROM students WHERE student_id = ?1",
                params![student_id],
                |row| {
                    Ok(Student {
                        student_id: row.get(0)?,
                        name: row.get(1)?,
                        track: row.get(2)?,
                        email: row.get(3)?,
                    })
                },
            )
            .optional()?;
        Ok(s)
    }

    /// Returns the student only when both id and password match.
    pub fn authenticate(&self, student_id: &str, password: &str) -> anyhow::Result<Option<Student>> {
        let conn = self.lock()?;
        let s = conn
            .query_row(
                "SELECT student_id, name, major, email FROM students
                 WHERE student_id = ?1 AND pass = ?2",
                params![student_id, password],
                |row| {
                    Ok(Student {
                        student_id: row.get(0)?,
                        name: row.get(1)?,
                        track: row.get(2)?,
                        email: row.get(3)?,
                    })
                },
            )
            .optional()?;
        Ok(s)
    }

    pub fn stored_password(&self, student_id: &str) -> anyhow::Result<Option<String>> {
        let conn = self.lock()?;
        let p = conn
            .query_row(
                "SELECT pass FROM students WHERE student_id = ?1",
                params![student_id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(p)
    }

    /// Returns false when no such student exists.
    pub fn set_password(&self, student_id: &str, password: &str) -> anyhow::Result<bool> {
        let conn = self.lock()?;
        let n = conn.execute(
            "UPDATE students SET pass = ?1 WHERE student_id = ?2",
            params![password, student_id],
        )?;
        Ok(n > 0)
    }

    pub fn set_email(&self, student_id: &str, email: &str) -> anyhow::Result<bool> {
        let conn = self.lock()?;
        let n = conn.execute(
            "UPDATE students SET email = ?1 WHERE student_id = ?2",
            params![email, student_id],
        )?;
        Ok(n > 0)
    }

    pub fn delete_student(&self, student_id: &str) -> anyhow::Result<bool> {
        let conn = self.lock()?;
        let n = conn.execute(
            "DELETE FROM students WHERE student_id = ?1",
            params![student_id],
        )?;
        Ok(n > 0)
    }

    pub fn list_students(&self) -> anyhow::Result<Vec<Student>> {
        let conn = self.lock()?;
        let mut stmt =
            conn.prepare("SELECT student_id, name, major, email FROM students ORDER BY student_id")?;
        let rows = stmt.query_map([], |row| {
            Ok(Student {
                student_id: row.get(0)?,
                name: row.get(1)?,
                track: row.get(2)?,
                email: row.get(3)?,
            })
        })?;
        let mut out = Vec::new();
        for r in rows {
            out.push(r?);
        }
        Ok(out)
    }
}
