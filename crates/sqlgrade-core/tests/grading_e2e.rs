use sqlgrade_core::auth::{login, Session};
use sqlgrade_core::config::CourseConfig;
use sqlgrade_core::grading::{
    split_queries, CompareMode, Grader, QueryLimits, SqliteExecutor,
};
use sqlgrade_core::model::{QueryOutcome, Student, SubmissionFilter};
use sqlgrade_core::service::{SubmissionService, SubmissionSource};
use sqlgrade_core::storage::Store;

const COURSEWORK: &str = r#"
CREATE TABLE students_data (id INTEGER, name TEXT, major TEXT);
INSERT INTO students_data VALUES (1, 'Ali', 'cs'), (2, 'Sara', 'stat'), (3, 'Reza', 'cs');

CREATE TABLE hw3_q1_cs_reference (v INTEGER);
INSERT INTO hw3_q1_cs_reference VALUES (1);
CREATE TABLE hw3_q2_cs_reference (v INTEGER);
INSERT INTO hw3_q2_cs_reference VALUES (9);
CREATE TABLE hw3_q3_cs_reference (id INTEGER, name TEXT);
INSERT INTO hw3_q3_cs_reference VALUES (1, 'Ali'), (3, 'Reza');

CREATE TABLE hw4_q1_stat_reference (name TEXT);
INSERT INTO hw4_q1_stat_reference VALUES ('Sara');
"#;

fn setup() -> (Store, SqliteExecutor) {
    let store = Store::memory().unwrap();
    store.init_schema().unwrap();
    store.execute_batch(COURSEWORK).unwrap();
    for (id, name, track) in [("cs1", "Ali", "علوم کامپیوتر"), ("st1", "Sara", "آمار")] {
        store
            .add_student(
                &Student {
                    student_id: id.into(),
                    name: name.into(),
                    track: track.into(),
                    email: None,
                },
                "pw",
            )
            .unwrap();
    }
    let exec = SqliteExecutor::from_store(&store, QueryLimits::default());
    (store, exec)
}

fn session(store: &Store, id: &str) -> Session {
    login(store, id, "pw").unwrap()
}

#[test]
fn end_to_end_example_submission() -> anyhow::Result<()> {
    let (store, exec) = setup();
    let cfg = CourseConfig::default();
    let s = session(&store, "cs1");

    let text = "# number 1\nSELECT 1;\n\n# number 2\nSELECT 2;";
    assert_eq!(split_queries(text), vec!["SELECT 1;", "SELECT 2;"]);

    let receipt = SubmissionService::new(&store, &exec, &cfg).submit(
        &s,
        "3",
        SubmissionSource::Text(text),
    )?;

    assert_eq!(receipt.total, 2);
    assert_eq!(receipt.correct, 1);
    assert_eq!(receipt.incorrect, vec![2]);
    assert_eq!(receipt.done, 1);
    assert_eq!(receipt.remaining, 9);

    let rows = store.list_submissions(&SubmissionFilter::default())?;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].correct_count, 1);
    assert_eq!(rows[0].total_count, Some(2));
    assert_eq!(rows[0].track, "علوم کامپیوتر");
    assert_eq!(rows[0].fingerprint.as_deref(), Some(receipt.fingerprint.as_str()));
    Ok(())
}

#[test]
fn order_and_duplicates_do_not_change_a_set_verdict() {
    let (_store, exec) = setup();
    let cfg = CourseConfig::default();
    let grader = Grader::new(&exec, &cfg);

    let queries = vec![
        "SELECT 1;".to_string(),
        "SELECT 9 UNION ALL SELECT 9;".to_string(),
        "SELECT id, name FROM students_data WHERE major = 'cs' ORDER BY id DESC;".to_string(),
    ];
    let v = grader.grade(&queries, "3", "علوم کامپیوتر");
    assert_eq!(v.correct, 3, "{:?}", v.outcomes);
    assert!(v.incorrect.is_empty());
}

#[test]
fn bag_mode_counts_duplicates() {
    let (_store, exec) = setup();
    let mut cfg = CourseConfig::default();
    cfg.settings.compare = CompareMode::Bag;
    let v = Grader::new(&exec, &cfg).grade(
        &["SELECT 1;".into(), "SELECT 9 UNION ALL SELECT 9;".into()],
        "3",
        "علوم کامپیوتر",
    );
    assert_eq!(v.incorrect, vec![2]);
}

#[test]
fn failing_middle_query_does_not_block_the_rest() {
    let (_store, exec) = setup();
    let cfg = CourseConfig::default();
    let v = Grader::new(&exec, &cfg).grade(
        &[
            "SELECT 1;".into(),
            "SELECT * FROM no_such_table;".into(),
            "SELECT id, name FROM students_data WHERE major = 'cs';".into(),
        ],
        "3",
        "علوم کامپیوتر",
    );
    assert_eq!(v.total, 3);
    assert_eq!(v.correct, 2);
    assert_eq!(v.incorrect, vec![2]);
    assert!(matches!(v.outcomes[1], QueryOutcome::ExecutionError { .. }));
}

#[test]
fn missing_reference_object_is_a_per_query_failure() {
    let (_store, exec) = setup();
    let cfg = CourseConfig::default();
    // hw3 has three reference tables; the fourth sub-question has none
    let v = Grader::new(&exec, &cfg).grade(
        &[
            "SELECT 1;".into(),
            "SELECT 9;".into(),
            "SELECT 1, 'Ali' UNION SELECT 3, 'Reza';".into(),
            "SELECT 4;".into(),
        ],
        "3",
        "علوم کامپیوتر",
    );
    assert_eq!(v.correct, 3);
    assert_eq!(v.incorrect, vec![4]);
    match &v.outcomes[3] {
        QueryOutcome::ExecutionError { message } => {
            assert!(message.contains("hw3_q4_cs_reference"), "{message}")
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn track_selects_reference_suffix() -> anyhow::Result<()> {
    let (store, exec) = setup();
    let cfg = CourseConfig::default();
    let s = session(&store, "st1");
    let receipt = SubmissionService::new(&store, &exec, &cfg).submit(
        &s,
        "4",
        SubmissionSource::Text("# number 1\nSELECT name FROM students_data WHERE major = 'stat'"),
    )?;
    assert_eq!((receipt.correct, receipt.total), (1, 1));
    Ok(())
}

#[test]
fn student_writes_are_refused_and_data_survives() -> anyhow::Result<()> {
    let (store, exec) = setup();
    let cfg = CourseConfig::default();
    let s = session(&store, "cs1");
    let receipt = SubmissionService::new(&store, &exec, &cfg).submit(
        &s,
        "3",
        SubmissionSource::Text(
            "# number 1\nDELETE FROM hw3_q1_cs_reference;\n# number 2\nSELECT 9; DROP TABLE students_data;",
        ),
    )?;
    assert_eq!(receipt.correct, 0);
    assert_eq!(receipt.incorrect, vec![1, 2]);

    let after = Grader::new(&exec, &cfg).grade(&["SELECT 1;".into()], "3", "علوم کامپیوتر");
    assert_eq!(after.correct, 1);
    Ok(())
}

#[test]
fn upload_file_is_graded() -> anyhow::Result<()> {
    let (store, exec) = setup();
    let cfg = CourseConfig::default();
    let s = session(&store, "cs1");
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("hw3.sql");
    std::fs::write(&path, "# number 1\nselect 1\n")?;
    let receipt = SubmissionService::new(&store, &exec, &cfg).submit(
        &s,
        "3",
        SubmissionSource::File(&path),
    )?;
    assert_eq!((receipt.correct, receipt.total), (1, 1));
    Ok(())
}

#[test]
fn lone_terminator_answer_keeps_later_answers_aligned() {
    let (_store, exec) = setup();
    let cfg = CourseConfig::default();
    let queries = split_queries("# number 1\n;\n# number 2\nSELECT 9;");
    assert_eq!(queries, vec![";", "SELECT 9;"]);

    let v = Grader::new(&exec, &cfg).grade(&queries, "3", "علوم کامپیوتر");
    assert_eq!((v.total, v.correct), (2, 1));
    assert_eq!(v.incorrect, vec![1]);
}

#[test]
fn reference_larger_than_row_cap_still_grades() {
    let store = Store::memory().unwrap();
    store
        .execute_batch(
            "CREATE TABLE hw3_q1_cs_reference (v INTEGER);
             INSERT INTO hw3_q1_cs_reference VALUES (1), (1), (1);",
        )
        .unwrap();
    let exec = SqliteExecutor::from_store(
        &store,
        QueryLimits {
            statement_timeout_ms: 2000,
            max_rows: 2,
        },
    );
    let cfg = CourseConfig::default();

    let v = Grader::new(&exec, &cfg).grade(&["SELECT 1;".into()], "3", "علوم کامپیوتر");
    assert_eq!(v.outcomes, vec![QueryOutcome::Correct]);

    // the cap still binds the student side
    let v = Grader::new(&exec, &cfg).grade(
        &["SELECT 1 UNION ALL SELECT 1 UNION ALL SELECT 1;".into()],
        "3",
        "علوم کامپیوتر",
    );
    assert!(matches!(v.outcomes[0], QueryOutcome::ExecutionError { .. }));
}
