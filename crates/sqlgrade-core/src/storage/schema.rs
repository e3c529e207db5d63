// Column names follow the legacy course database (`pass`, `major`,
// `student_results.hw`) so an existing one can be opened in place.
pub const DDL: &str = r#"
CREATE TABLE IF NOT EXISTS students (
  student_id TEXT PRIMARY KEY,
  name TEXT NOT NULL,
  major TEXT NOT NULL,
  pass TEXT NOT NULL,
  email TEXT
);

CREATE TABLE IF NOT EXISTS student_results (
  id INTEGER PRIMARY KEY AUTOINCREMENT,
  student_id TEXT NOT NULL,
  name TEXT NOT NULL,
  major TEXT NOT NULL,
  hw TEXT NOT NULL,
  correct_count INTEGER NOT NULL,
  submission_time TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
);

CREATE TABLE IF NOT EXISTS teacher_queries (
  id INTEGER PRIMARY KEY AUTOINCREMENT,
  student_id TEXT NOT NULL,
  student_name TEXT NOT NULL,
  major TEXT NOT NULL,
  query TEXT NOT NULL,
  output TEXT,
  submission_time TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
);
"#;

pub const INDEXES: &str = r#"
CREATE INDEX IF NOT EXISTS idx_results_student_hw ON student_results(student_id, hw);
CREATE INDEX IF NOT EXISTS idx_teacher_queries_major ON teacher_queries(major);
"#;
