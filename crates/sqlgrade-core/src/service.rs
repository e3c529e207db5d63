use crate::auth::Session;
use crate::config::CourseConfig;
use crate::errors::SubmitError;
use crate::fingerprint;
use crate::grading::split::count_markers;
use crate::grading::{split_queries, Grader, QueryExecutor};
use crate::model::{NewLedgerRow, Receipt, Submission};
use crate::storage::store::{now_utc_string, QuotaInsert};
use crate::storage::Store;
use std::path::Path;

/// Where the submission text comes from.
#[derive(Debug, Clone, Copy)]
pub enum SubmissionSource<'a> {
    Text(&'a str),
    File(&'a Path),
}

/// Reads an uploaded answer file. Only `.sql` files in UTF-8 are accepted.
pub fn read_upload(path: &Path) -> Result<String, SubmitError> {
    let invalid = |reason: String| SubmitError::InvalidUpload {
        path: path.display().to_string(),
        reason,
    };
    let is_sql = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("sql"));
    if !is_sql {
        return Err(invalid("expected a .sql file".into()));
    }
    let bytes = std::fs::read(path).map_err(|e| invalid(e.to_string()))?;
    String::from_utf8(bytes).map_err(|_| invalid("file is not valid UTF-8".into()))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuotaStatus {
    pub used: u32,
    pub limit: u32,
}

impl QuotaStatus {
    pub fn remaining(&self) -> u32 {
        self.limit.saturating_sub(self.used)
    }

    pub fn is_exhausted(&self) -> bool {
        self.used >= self.limit
    }
}

/// Quota gate, grading and ledger write for one request.
pub struct SubmissionService<'a, E: QueryExecutor + ?Sized> {
    store: &'a Store,
    executor: &'a E,
    config: &'a CourseConfig,
}

impl<'a, E: QueryExecutor + ?Sized> SubmissionService<'a, E> {
    pub fn new(store: &'a Store, executor: &'a E, config: &'a CourseConfig) -> Self {
        Self {
            store,
            executor,
            config,
        }
    }

    pub fn quota(&self, student_id: &str, assignment: &str) -> anyhow::Result<QuotaStatus> {
        Ok(QuotaStatus {
            used: self.store.submission_count(student_id, assignment)?,
            limit: self.config.settings.max_submissions,
        })
    }

    pub fn submit(
        &self,
        session: &Session,
        assignment: &str,
        source: SubmissionSource<'_>,
    ) -> Result<Receipt, SubmitError> {
        let student = session.student();

        if !self.config.is_known_assignment(assignment) {
            return Err(SubmitError::UnknownAssignment {
                assignment: assignment.to_string(),
                allowed: self.config.assignments.join(", "),
            });
        }

        let quota = self.quota(&student.student_id, assignment)?;
        if quota.is_exhausted() {
            tracing::info!(
                student_id = %student.student_id,
                assignment = %assignment,
                used = quota.used,
                "submission rejected: quota exhausted"
            );
            return Err(SubmitError::QuotaExhausted {
                assignment: assignment.to_string(),
                used: quota.used,
                limit: quota.limit,
            });
        }

        let text = match source {
            SubmissionSource::Text(t) => t.to_string(),
            SubmissionSource::File(p) => read_upload(p)?,
        };
        if text.trim().is_empty() {
            return Err(SubmitError::EmptySubmission);
        }
        let submission = Submission {
            student_id: student.student_id.clone(),
            assignment: assignment.to_string(),
            text,
            submitted_at: now_utc_string(),
        };

        let queries = split_queries(&submission.text);
        if queries.is_empty() {
            return Err(SubmitError::NoQueries);
        }
        let markers = count_markers(&submission.text);
        if markers > queries.len() {
            tracing::debug!(
                student_id = %submission.student_id,
                markers,
                queries = queries.len(),
                "blank answers dropped"
            );
        }

        let verdict = Grader::new(self.executor, self.config).grade(
            &queries,
            assignment,
            session.track(),
        );

        let fp = fingerprint::submission(assignment, &queries);
        let row = NewLedgerRow {
            student_id: &student.student_id,
            name: &student.name,
            track: &student.track,
            assignment,
            correct_count: verdict.correct,
            total_count: verdict.total,
            fingerprint: &fp,
            submitted_at: &submission.submitted_at,
        };

        let done = match self
            .store
            .record_result_within_quota(&row, quota.limit)
        {
            Ok(QuotaInsert::Recorded { done, .. }) => done,
            Ok(QuotaInsert::Exhausted { used }) => {
                tracing::warn!(
                    student_id = %student.student_id,
                    assignment = %assignment,
                    used,
                    "quota filled by a concurrent submission; verdict discarded"
                );
                return Err(SubmitError::QuotaExhausted {
                    assignment: assignment.to_string(),
                    used,
                    limit: quota.limit,
                });
            }
            Err(e) => {
                tracing::error!(
                    student_id = %student.student_id,
                    assignment = %assignment,
                    correct = verdict.correct,
                    total = verdict.total,
                    error = %format!("{e:#}"),
                    "failed to record graded submission"
                );
                return Err(SubmitError::Ledger(e));
            }
        };

        tracing::info!(
            student_id = %student.student_id,
            assignment = %assignment,
            correct = verdict.correct,
            total = verdict.total,
            done,
            "submission recorded"
        );

        Ok(Receipt {
            student_id: student.student_id.clone(),
            name: student.name.clone(),
            track: student.track.clone(),
            assignment: assignment.to_string(),
            total: verdict.total,
            correct: verdict.correct,
            incorrect: verdict.incorrect,
            outcomes: verdict.outcomes,
            done,
            remaining: quota.limit.saturating_sub(done),
            fingerprint: fp,
            submitted_at: submission.submitted_at,
        })
    }
}
