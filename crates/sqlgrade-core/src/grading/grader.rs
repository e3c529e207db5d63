use crate::config::CourseConfig;
use crate::grading::executor::QueryExecutor;
use crate::grading::guard;
use crate::grading::rows::CompareMode;
use crate::model::{QueryOutcome, Verdict};

/// Grades a batch of sub-queries against the instructor's reference tables.
pub struct Grader<'a, E: QueryExecutor + ?Sized> {
    executor: &'a E,
    config: &'a CourseConfig,
}

impl<'a, E: QueryExecutor + ?Sized> Grader<'a, E> {
    pub fn new(executor: &'a E, config: &'a CourseConfig) -> Self {
        Self { executor, config }
    }

    pub fn compare_mode(&self) -> CompareMode {
        self.config.settings.compare
    }

    /// One verdict entry per query, in order. A failing sub-query never stops
    /// the rest of the batch.
    pub fn grade(&self, queries: &[String], assignment: &str, track: &str) -> Verdict {
        let outcomes = queries
            .iter()
            .enumerate()
            .map(|(i, q)| self.grade_one(q, assignment, i + 1, track))
            .collect();
        Verdict::from_outcomes(outcomes)
    }

    fn grade_one(&self, query: &str, assignment: &str, index: usize, track: &str) -> QueryOutcome {
        let reference = self.config.reference_table(assignment, index, track);
        match self.compare(query, &reference) {
            Ok(true) => QueryOutcome::Correct,
            Ok(false) => QueryOutcome::Incorrect,
            Err(e) => {
                tracing::warn!(
                    assignment = %assignment,
                    index,
                    reference = %reference,
                    error = %format!("{e:#}"),
                    "sub-query failed to execute"
                );
                QueryOutcome::ExecutionError {
                    message: format!("{e:#}"),
                }
            }
        }
    }

    fn compare(&self, query: &str, reference: &str) -> anyhow::Result<bool> {
        guard::check_read_only(query)?;
        let student = self.executor.fetch(query)?;
        let expected = self
            .executor
            .fetch_trusted(&format!("SELECT * FROM {}", quote_ident(reference)))
            .map_err(|e| anyhow::anyhow!("reference '{}' unavailable: {:#}", reference, e))?;
        Ok(student.matches(&expected, self.compare_mode()))
    }
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grading::rows::{Cell, RowSet};
    use std::collections::HashMap;

    /// Answers from a fixed map; anything else is an execution error.
    struct Canned(HashMap<String, RowSet>);

    impl QueryExecutor for Canned {
        fn fetch(&self, sql: &str) -> anyhow::Result<RowSet> {
            self.0
                .get(sql)
                .cloned()
                .ok_or_else(|| anyhow::anyhow!("no such table for: {sql}"))
        }
    }

    fn ints(vals: &[i64]) -> RowSet {
        RowSet::new(
            vec!["v".into()],
            vals.iter().map(|v| vec![Cell::Integer(*v)]).collect(),
        )
    }

    #[test]
    fn grades_each_query_against_its_reference() {
        let mut m = HashMap::new();
        m.insert("SELECT 1;".to_string(), ints(&[1]));
        m.insert("SELECT 2;".to_string(), ints(&[2]));
        m.insert("SELECT * FROM \"hw3_q1_cs_reference\"".to_string(), ints(&[1]));
        m.insert("SELECT * FROM \"hw3_q2_cs_reference\"".to_string(), ints(&[9]));
        let exec = Canned(m);
        let cfg = CourseConfig::default();

        let v = Grader::new(&exec, &cfg).grade(
            &["SELECT 1;".into(), "SELECT 2;".into()],
            "3",
            "علوم کامپیوتر",
        );
        assert_eq!(v.total, 2);
        assert_eq!(v.correct, 1);
        assert_eq!(v.incorrect, vec![2]);
        assert_eq!(v.outcomes[1], QueryOutcome::Incorrect);
    }

    #[test]
    fn empty_answer_does_not_shift_later_references() {
        let mut m = HashMap::new();
        m.insert("SELECT 2;".to_string(), ints(&[2]));
        m.insert("SELECT * FROM \"hw3_q1_cs_reference\"".to_string(), ints(&[1]));
        m.insert("SELECT * FROM \"hw3_q2_cs_reference\"".to_string(), ints(&[2]));
        let exec = Canned(m);
        let cfg = CourseConfig::default();

        let queries = crate::grading::split_queries("# number 1\n;\n# number 2\nSELECT 2;");
        let v = Grader::new(&exec, &cfg).grade(&queries, "3", "علوم کامپیوتر");
        assert_eq!(v.total, 2);
        assert_eq!(v.correct, 1);
        assert_eq!(v.incorrect, vec![1]);
        assert!(matches!(v.outcomes[0], QueryOutcome::ExecutionError { .. }));
        assert_eq!(v.outcomes[1], QueryOutcome::Correct);
    }

    #[test]
    fn rejected_statement_is_an_execution_error() {
        let exec = Canned(HashMap::new());
        let cfg = CourseConfig::default();
        let v = Grader::new(&exec, &cfg).grade(&["DELETE FROM t;".into()], "3", "آمار");
        assert_eq!(v.incorrect, vec![1]);
        match &v.outcomes[0] {
            QueryOutcome::ExecutionError { message } => {
                assert!(message.contains("only SELECT"), "{message}")
            }
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    #[test]
    fn quotes_reference_identifiers() {
        assert_eq!(quote_ident("hw3_q1_cs_reference"), "\"hw3_q1_cs_reference\"");
        assert_eq!(quote_ident("a\"b"), "\"a\"\"b\"");
    }
}
