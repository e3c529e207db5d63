pub const GITIGNORE: &str = ".sqlgrade/\nreceipts/\n";

/// Seeded by `init --demo`: one student per track, the practice table and
/// reference answers for the first three questions of assignment 3.
pub const DEMO_COURSEWORK: &str = r#"
INSERT OR IGNORE INTO students (student_id, name, major, pass)
VALUES ('40001', 'Demo Student', 'علوم کامپیوتر', 'demo'),
       ('40002', 'Demo Statistician', 'آمار', 'demo');

CREATE TABLE IF NOT EXISTS test (id INTEGER PRIMARY KEY, name TEXT, score INTEGER);
INSERT OR IGNORE INTO test VALUES (1, 'Ali', 17), (2, 'Sara', 19), (3, 'Reza', 12);

CREATE TABLE IF NOT EXISTS hw3_q1_cs_reference AS
    SELECT name FROM test WHERE score >= 15;
CREATE TABLE IF NOT EXISTS hw3_q2_cs_reference AS
    SELECT count(*) AS n FROM test;
CREATE TABLE IF NOT EXISTS hw3_q3_cs_reference AS
    SELECT max(score) AS best FROM test;

CREATE TABLE IF NOT EXISTS hw3_q1_stat_reference AS
    SELECT avg(score) AS mean FROM test;
"#;

pub const DEMO_SUBMISSION: &str = "# number 1
SELECT name FROM test WHERE score > 14;

# number 2
SELECT count(id) FROM test;

# number 3
SELECT score FROM test ORDER BY score DESC LIMIT 1;
";
