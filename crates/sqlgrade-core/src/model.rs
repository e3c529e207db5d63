use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum QueryOutcome {
    Correct,
    Incorrect,
    ExecutionError { message: String },
}

impl QueryOutcome {
    pub fn is_correct(&self) -> bool {
        matches!(self, QueryOutcome::Correct)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            QueryOutcome::Correct => "correct",
            QueryOutcome::Incorrect => "incorrect",
            QueryOutcome::ExecutionError { .. } => "error",
        }
    }
}

/// Graded result of one submission. `incorrect` holds 1-based sub-query indices.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Verdict {
    pub outcomes: Vec<QueryOutcome>,
    pub total: usize,
    pub correct: usize,
    pub incorrect: Vec<usize>,
}

impl Verdict {
    pub fn from_outcomes(outcomes: Vec<QueryOutcome>) -> Self {
        let total = outcomes.len();
        let correct = outcomes.iter().filter(|o| o.is_correct()).count();
        let incorrect = outcomes
            .iter()
            .enumerate()
            .filter(|(_, o)| !o.is_correct())
            .map(|(i, _)| i + 1)
            .collect();
        Self {
            outcomes,
            total,
            correct,
            incorrect,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Student {
    pub student_id: String,
    pub name: String,
    pub track: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// A submission as received, before grading.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Submission {
    pub student_id: String,
    pub assignment: String,
    pub text: String,
    pub submitted_at: String,
}

/// One `student_results` row.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LedgerRow {
    pub id: i64,
    pub student_id: String,
    pub name: String,
    pub track: String,
    pub assignment: String,
    pub correct_count: i64,
    pub total_count: Option<i64>,
    pub fingerprint: Option<String>,
    pub submitted_at: String,
}

/// Values written to the ledger for a graded submission.
#[derive(Debug, Clone)]
pub struct NewLedgerRow<'a> {
    pub student_id: &'a str,
    pub name: &'a str,
    pub track: &'a str,
    pub assignment: &'a str,
    pub correct_count: usize,
    pub total_count: usize,
    pub fingerprint: &'a str,
    pub submitted_at: &'a str,
}

#[derive(Debug, Clone, Default)]
pub struct SubmissionFilter {
    pub track: Option<String>,
    pub assignment: Option<String>,
    pub student_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StatsRow {
    pub track: String,
    pub assignment: String,
    pub submissions: i64,
    pub avg_correct: f64,
}

/// What the caller gets back after a recorded submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Receipt {
    pub student_id: String,
    pub name: String,
    pub track: String,
    pub assignment: String,
    pub total: usize,
    pub correct: usize,
    pub incorrect: Vec<usize>,
    pub outcomes: Vec<QueryOutcome>,
    pub done: u32,
    pub remaining: u32,
    pub fingerprint: String,
    pub submitted_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeacherQuery {
    pub id: i64,
    pub student_id: String,
    pub student_name: String,
    pub track: String,
    pub query: String,
    pub output: Option<serde_json::Value>,
    pub submitted_at: String,
}
