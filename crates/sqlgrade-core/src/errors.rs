use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError(pub String);

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "config error: {}", self.0)
    }
}

impl std::error::Error for ConfigError {}

/// Reasons a submission is not recorded. Per-query failures are not errors;
/// they show up as outcomes in the verdict.
#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    #[error("unknown assignment '{assignment}' (expected one of: {allowed})")]
    UnknownAssignment { assignment: String, allowed: String },

    #[error("invalid upload {path}: {reason}")]
    InvalidUpload { path: String, reason: String },

    #[error("submission text is empty")]
    EmptySubmission,

    #[error("no queries found in submission")]
    NoQueries,

    #[error("you have already submitted assignment {assignment} {used} times (limit {limit})")]
    QuotaExhausted {
        assignment: String,
        used: u32,
        limit: u32,
    },

    #[error("graded but failed to record the submission: {0:#}")]
    Ledger(anyhow::Error),

    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

impl SubmitError {
    /// Rejections leave the ledger untouched.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            SubmitError::UnknownAssignment { .. }
                | SubmitError::InvalidUpload { .. }
                | SubmitError::EmptySubmission
                | SubmitError::NoQueries
                | SubmitError::QuotaExhausted { .. }
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("student id and password are required")]
    MissingCredentials,
    #[error("wrong student id or password")]
    InvalidCredentials,
    #[error("wrong admin username or password")]
    InvalidAdmin,
    #[error("admin credentials are not configured")]
    AdminNotConfigured,
    #[error("all password fields are required")]
    MissingFields,
    #[error("new password and confirmation do not match")]
    ConfirmationMismatch,
    #[error("current password is wrong")]
    WrongOldPassword,
}
