use ppecheck_core::AppError;
use thiserror::Error;

/// Failure of one pipeline stage.
///
/// Fetch and analysis failures end the invocation. Persistence and
/// notification failures are recorded as diagnostics on a successful result.
#[derive(Debug, Error)]
pub enum StageError {
    /// The uploaded object could not be retrieved.
    #[error("failed to fetch uploaded object: {0}")]
    Fetch(#[source] AppError),

    /// The vision model call failed.
    #[error("vision analysis failed: {0}")]
    Analysis(#[source] AppError),

    /// The compliance record could not be appended to the analytic table.
    #[error("failed to persist compliance record: {0}")]
    Persistence(#[source] AppError),

    /// The compliance alert could not be delivered.
    #[error("failed to send compliance notification: {0}")]
    Notification(#[source] AppError),
}

impl StageError {
    /// Returns whether the error aborts the invocation.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Fetch(_) | Self::Analysis(_))
    }

    /// Returns a stable category name for logs and payloads.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Fetch(_) => "fetch",
            Self::Analysis(_) => "analysis",
            Self::Persistence(_) => "persistence",
            Self::Notification(_) => "notification",
        }
    }
}

#[cfg(test)]
mod tests {
    use ppecheck_core::AppError;

    use super::StageError;

    #[test]
    fn only_fetch_and_analysis_are_fatal() {
        let error = || AppError::Internal("boom".to_owned());

        assert!(StageError::Fetch(error()).is_fatal());
        assert!(StageError::Analysis(error()).is_fatal());
        assert!(!StageError::Persistence(error()).is_fatal());
        assert!(!StageError::Notification(error()).is_fatal());
    }

    #[test]
    fn stage_error_message_wraps_cause() {
        let error = StageError::Fetch(AppError::NotFound("gs://bucket/a.jpg".to_owned()));
        assert_eq!(
            error.to_string(),
            "failed to fetch uploaded object: not found: gs://bucket/a.jpg"
        );
        assert_eq!(error.kind(), "fetch");
    }
}
