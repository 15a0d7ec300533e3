use bbs_validate::ValidationReport;

#[derive(Debug, thiserror::Error)]
pub enum DomainError {
    #[error("User not found: {id}")]
    NotFound { id: i64 },

    #[error("Invalid user: {}", .0.errors.join("; "))]
    Invalid(ValidationReport),

    #[error("Database error: {0}")]
    Database(#[from] anyhow::Error),
}

impl DomainError {
    #[must_use]
    pub fn not_found(id: i64) -> Self {
        Self::NotFound { id }
    }

    #[must_use]
    pub fn invalid(report: ValidationReport) -> Self {
        Self::Invalid(report)
    }
}
